use std::any::Any;

use divan::Bencher;
use sized_any::{any_cast_ref, SizedAny};

fn main() {
    divan::main();
}

#[divan::bench(consts = [32, 64])]
fn sized_any_empty<const N: usize>() {
    divan::black_box(SizedAny::<N>::empty());
}

#[divan::bench]
fn box_any_empty() {
    divan::black_box(Option::<Box<dyn Any>>::None);
}

#[divan::bench(consts = [32, 64])]
fn sized_any_small_value<const N: usize>() {
    divan::black_box(SizedAny::<N>::new(divan::black_box(42i32)));
}

#[divan::bench(consts = [32, 64])]
fn sized_any_large_value<const N: usize>() {
    divan::black_box(SizedAny::<N>::new(divan::black_box([0usize; 16])));
}

#[divan::bench]
fn box_any_small_value() {
    divan::black_box(Box::new(divan::black_box(42i32)) as Box<dyn Any>);
}

#[divan::bench]
fn box_any_large_value() {
    divan::black_box(Box::new(divan::black_box([0usize; 16])) as Box<dyn Any>);
}

#[divan::bench(consts = [32, 64])]
fn sized_any_copy<const N: usize>(bencher: Bencher) {
    let a = SizedAny::<N>::new(String::from("copied"));
    bencher.bench_local(|| divan::black_box(a.clone()));
}

#[divan::bench(consts = [32, 64])]
fn sized_any_swap<const N: usize>(bencher: Bencher) {
    bencher
        .with_inputs(|| (SizedAny::<N>::new(1i32), SizedAny::<N>::new(2i32)))
        .bench_local_refs(|(a, b)| a.swap(b));
}

#[divan::bench]
fn box_any_swap(bencher: Bencher) {
    bencher
        .with_inputs(|| (Box::new(1i32) as Box<dyn Any>, Box::new(2i32) as Box<dyn Any>))
        .bench_local_refs(|(a, b)| std::mem::swap(a, b));
}

#[divan::bench(consts = [32, 64])]
fn sized_any_move_and_swap<const N: usize>(bencher: Bencher) {
    bencher
        .with_inputs(|| SizedAny::<N>::new(1i32))
        .bench_local_values(|mut a| {
            let mut b = a.take();
            a.set(2i32);
            a.swap(&mut b);
            divan::black_box((a, b))
        });
}

#[divan::bench(consts = [32, 64])]
fn sized_any_swap_across_capacities<const N: usize>(bencher: Bencher) {
    bencher
        .with_inputs(|| {
            (
                SizedAny::<N>::new([1usize; 3]),
                SizedAny::<16>::new(String::from("narrow")),
            )
        })
        .bench_local_refs(|(a, b)| a.swap_with(b));
}

#[divan::bench(consts = [32, 64])]
fn sized_any_cast<const N: usize>(bencher: Bencher) {
    let a = SizedAny::<N>::new(42i32);
    bencher.bench_local(|| divan::black_box(any_cast_ref::<i32, N>(divan::black_box(&a)).ok()));
}

#[divan::bench]
fn box_any_cast(bencher: Bencher) {
    let a: Box<dyn Any> = Box::new(42i32);
    bencher.bench_local(|| divan::black_box(divan::black_box(&a).downcast_ref::<i32>()));
}
