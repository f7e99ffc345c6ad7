use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use vecmat::{Vector3, Vector4};

pub fn bench_vector3_cross_and_normalize(c: &mut Criterion) {
    let a = Vector3::new(1.0_f32, 2.0, 3.0);
    let b = Vector3::new(-0.5_f32, 4.0, 0.25);
    c.bench_function("vector3_cross_and_normalize", |bencher| {
        bencher.iter(|| black_box(&a).cross(black_box(&b)).normalized())
    });
}

pub fn bench_vector4_arithmetic(c: &mut Criterion) {
    let a = Vector4::new(1.0_f32, 2.0, 3.0, 4.0);
    let b = Vector4::new(0.5_f32, -1.0, 2.0, 1.0);
    c.bench_function("vector4_arithmetic", |bencher| {
        bencher.iter(|| {
            let a = black_box(&a);
            let b = black_box(&b);
            (a + b) * 0.5 - a.component_mul(b)
        })
    });
}

pub fn bench_vector3_swizzle_and_dot(c: &mut Criterion) {
    let a = Vector3::new(1.0_f64, 2.0, 3.0);
    c.bench_function("vector3_swizzle_and_dot", |bencher| {
        bencher.iter(|| {
            let a = black_box(&a);
            a.zyx().dot(&a.yzx())
        })
    });
}

criterion_group!(
    benches,
    bench_vector3_cross_and_normalize,
    bench_vector4_arithmetic,
    bench_vector3_swizzle_and_dot
);
criterion_main!(benches);
