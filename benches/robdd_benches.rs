use criterion::criterion_main;

mod queens;

criterion_main!(queens::queens);
