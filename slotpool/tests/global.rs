//! End-to-end check of the `GlobalAlloc` implementation: the whole test binary, collections and
//! all, runs on top of the pool allocator.

use slotpool::SlotAllocator;

#[global_allocator]
static GLOBAL: SlotAllocator = SlotAllocator::new();

#[test]
fn collections_round_trip() {
    let mut values: Vec<String> = (0..256).map(|i| i.to_string()).collect();

    values.reverse();

    for (index, value) in values.into_iter().rev().enumerate() {
        assert_eq!(Ok(index), value.parse());
    }
}

#[test]
fn growth_beyond_pooled_range() {
    //  A growing vector crosses from pooled slots into the system fallback, and back on shrink.
    let mut bytes = Vec::new();

    for i in 0..4096usize {
        bytes.push(i as u8);
    }

    for (i, byte) in bytes.iter().enumerate() {
        assert_eq!(i as u8, *byte);
    }

    bytes.shrink_to_fit();
    bytes.truncate(16);
    bytes.shrink_to_fit();

    assert_eq!(16, bytes.len());
}

#[test]
fn over_aligned_allocation() {
    //  Alignments stricter than the granularity bypass the pools, and must still round-trip.
    #[repr(align(64))]
    struct OverAligned([u8; 64]);

    let boxed = Box::new(OverAligned([7; 64]));

    let pointer: *const OverAligned = &*boxed;

    assert_eq!(0, pointer as usize % 64);
    assert_eq!(7, boxed.0[63]);
}

#[test]
fn threaded_collections() {
    let threads: Vec<_> = (0..4)
        .map(|thread_index: usize| std::thread::spawn(move || {
            (0..100)
                .map(|i| (thread_index * 1000 + i).to_string())
                .collect::<Vec<_>>()
                .into_iter()
                .map(|value| value.parse::<usize>().unwrap())
                .sum::<usize>()
        }))
        .collect();

    for (thread_index, thread) in threads.into_iter().enumerate() {
        let expected = (0..100).map(|i| thread_index * 1000 + i).sum::<usize>();

        assert_eq!(expected, thread.join().unwrap());
    }
}
