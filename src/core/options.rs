//! Engine configuration

/// Tuning knobs for a [DDManager](crate::core::bdd_manager::DDManager).
///
/// Cache capacities are `node capacity / divider`, recomputed whenever the
/// node table grows; larger dividers mean smaller caches.
#[derive(Clone)]
pub struct Options {
    /// Run the Shannon operations on an explicit frame stack instead of the
    /// call stack. Results are identical; deep BDDs cannot overflow.
    pub iterative: bool,
    /// Initial node table capacity; rounded up to a prime >= 128.
    pub initial_size: usize,
    /// Capacity multiplier on growth, >= 1.5.
    pub growth_factor: f32,
    /// The table grows when, after collection, the free-slot ratio falls
    /// below this threshold (0..1).
    pub growth_threshold: f32,
    pub cache_negation_divider: usize,
    pub cache_binary_divider: usize,
    pub cache_ternary_divider: usize,
    pub cache_satisfaction_divider: usize,
    pub cache_compose_divider: usize,
    /// Log the statistics report at info level when the manager is dropped.
    pub log_statistics_on_shutdown: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            iterative: false,
            initial_size: 1021,
            growth_factor: 2.0,
            growth_threshold: 1.0 / 8.0,
            cache_negation_divider: 16,
            cache_binary_divider: 8,
            cache_ternary_divider: 16,
            cache_satisfaction_divider: 32,
            cache_compose_divider: 16,
            log_statistics_on_shutdown: false,
        }
    }
}

impl Options {
    #[allow(unused)]
    pub fn with_iterative(mut self) -> Options {
        self.iterative = true;
        self
    }

    #[allow(unused)]
    pub fn with_initial_size(mut self, size: usize) -> Options {
        self.initial_size = size;
        self
    }

    #[allow(unused)]
    pub fn with_growth(mut self, factor: f32, threshold: f32) -> Options {
        self.growth_factor = factor;
        self.growth_threshold = threshold;
        self
    }

    #[allow(unused)]
    pub fn with_statistics_on_shutdown(mut self) -> Options {
        self.log_statistics_on_shutdown = true;
        self
    }

    /// Panics on values the engine cannot run with.
    pub(crate) fn validate(&self) {
        if self.growth_factor < 1.5 {
            panic!("growth factor {} is below 1.5", self.growth_factor);
        }
        if !(self.growth_threshold > 0.0 && self.growth_threshold < 1.0) {
            panic!("growth threshold {} outside (0, 1)", self.growth_threshold);
        }
        let dividers = [
            self.cache_negation_divider,
            self.cache_binary_divider,
            self.cache_ternary_divider,
            self.cache_satisfaction_divider,
            self.cache_compose_divider,
        ];
        if dividers.contains(&0) {
            panic!("cache dividers must be >= 1");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Options;

    #[test]
    fn builders_chain() {
        let opts = Options::default()
            .with_iterative()
            .with_initial_size(4093)
            .with_growth(3.0, 0.25)
            .with_statistics_on_shutdown();
        assert!(opts.iterative);
        assert_eq!(opts.initial_size, 4093);
        assert_eq!(opts.growth_factor, 3.0);
        assert!(opts.log_statistics_on_shutdown);
        opts.validate();
    }

    #[test]
    #[should_panic(expected = "growth factor")]
    fn rejects_small_growth_factor() {
        Options::default().with_growth(1.0, 0.125).validate();
    }

    #[test]
    #[should_panic(expected = "cache dividers")]
    fn rejects_zero_divider() {
        let mut opts = Options::default();
        opts.cache_binary_divider = 0;
        opts.validate();
    }
}
