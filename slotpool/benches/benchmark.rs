use std::collections::VecDeque;

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};

use slotpool::SlotAllocator;

static ALLOCATOR: SlotAllocator = SlotAllocator::new();

//  Single-Thread Round-Trip.
//
//  This benchmark repeatedly allocates and immediately deallocates one small object on a single
//  thread.
//
//  This is the best-case scenario for the free list: every allocation is served by the slot just
//  freed, and measures the lower-bound of allocator latency.
fn single_threaded_round_trip(c: &mut Criterion) {
    c.bench_function("ST Round-trip - sys", |b| b.iter(|| {
        let _ = black_box(SysCell::new(32));
    }));
    c.bench_function("ST Round-trip - pool", |b| b.iter(|| {
        let _ = black_box(PoolCell::new(32));
    }));
}

//  Single-Thread Batch Allocation.
//
//  This benchmark allocates a batch of small objects before deallocating any, exercising the
//  bump path and slab growth rather than free-list reuse.
fn single_threaded_batch(c: &mut Criterion) {
    fn bencher<T: Cell>(name: &'static str, c: &mut Criterion, number_iterations: usize) {
        c.bench_function(name, |b| b.iter_batched_ref(
            || Vec::<T>::with_capacity(number_iterations),
            |v| v.push(black_box(T::new(32))),
            BatchSize::NumIterations(number_iterations as u64)
        ));
    }

    const NUMBER_ITERATIONS: usize = 1024;

    bencher::<SysCell>("ST Batch Allocation - sys", c, NUMBER_ITERATIONS);

    bencher::<PoolCell>("ST Batch Allocation - pool", c, NUMBER_ITERATIONS);
}

//  Single-Thread Ring Round-Trip.
//
//  This benchmark keeps a full ring of live objects, allocating one and deallocating the oldest
//  on each iteration, mixing free-list reuse with a realistic number of live slots.
fn single_threaded_ring(c: &mut Criterion) {
    fn bencher<T: Cell>(name: &'static str, c: &mut Criterion, number_iterations: usize) {
        c.bench_function(name, |b| b.iter_batched_ref(
            || {
                let mut ring = VecDeque::<T>::with_capacity(number_iterations);
                ring.resize_with(number_iterations - 1, || black_box(T::new(32)));
                ring
            },
            |ring| {
                ring.push_back(black_box(T::new(32)));
                ring.pop_front()
            },
            BatchSize::NumIterations(number_iterations as u64)
        ));
    }

    const NUMBER_ITERATIONS: usize = 1024;

    bencher::<SysCell>("ST Ring Round-trip - sys", c, NUMBER_ITERATIONS);

    bencher::<PoolCell>("ST Ring Round-trip - pool", c, NUMBER_ITERATIONS);
}

criterion_group!(
    single_threaded,
    single_threaded_round_trip,
    single_threaded_batch,
    single_threaded_ring
);

criterion_main!(single_threaded);

//
//  Implementation Details
//

trait Cell: Sized {
    fn new(size: usize) -> Self;
}

//  A heap allocation served by the system allocator.
struct SysCell(#[allow(dead_code)] Box<[u8]>);

impl Cell for SysCell {
    fn new(size: usize) -> SysCell { SysCell(vec![0u8; size].into_boxed_slice()) }
}

//  A heap allocation served by the pool allocator.
struct PoolCell {
    pointer: std::ptr::NonNull<u8>,
    size: usize,
}

impl Cell for PoolCell {
    fn new(size: usize) -> PoolCell {
        let pointer = ALLOCATOR.allocate(size).expect("Allocated");

        PoolCell { pointer, size }
    }
}

impl Drop for PoolCell {
    fn drop(&mut self) {
        //  Safety:
        //  -   `self.pointer` was allocated with `self.size`, and is deallocated exactly once.
        unsafe { ALLOCATOR.deallocate(self.pointer, self.size) }
    }
}

//  Safety:
//  -   The cell's storage is exclusively owned.
unsafe impl Send for PoolCell {}
