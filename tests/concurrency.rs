use randset::{sync::RandomHashSet, Error};

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Barrier,
    },
    thread,
};

const NUM_THREADS: u32 = 8;
const PER_THREAD: u32 = 5_000;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn disjoint_inserts_and_removes() {
    init_logger();

    let set = Arc::new(
        RandomHashSet::builder()
            .shards(NUM_THREADS as usize)
            .build()
            .unwrap(),
    );
    let barrier = Arc::new(Barrier::new(NUM_THREADS as usize));

    // https://rust-lang.github.io/rust-clippy/master/index.html#needless_collect
    #[allow(clippy::needless_collect)]
    let handles = (0..NUM_THREADS)
        .map(|id| {
            let set = Arc::clone(&set);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let base = id * PER_THREAD;
                for i in base..base + PER_THREAD {
                    assert!(set.insert(i));
                    assert!(set.contains(&i));
                }
                // Remove every other element, which shrinks the table again.
                for i in (base..base + PER_THREAD).step_by(2) {
                    assert!(set.remove(&i));
                    assert!(!set.contains(&i));
                }
            })
        })
        .collect::<Vec<_>>();

    handles.into_iter().for_each(|h| h.join().expect("Failed"));

    let expected = (NUM_THREADS * PER_THREAD / 2) as usize;
    assert_eq!(set.len(), expected);
    assert_eq!(set.iter().count(), expected);
    for i in 0..NUM_THREADS * PER_THREAD {
        assert_eq!(set.contains(&i), i % 2 == 1);
    }
}

#[test]
fn sampling_while_mutating() {
    init_logger();

    let set = Arc::new(RandomHashSet::with_seed(9));
    set.insert_all(0..1000u32);
    let done = Arc::new(AtomicBool::new(false));

    let samplers = (0..4)
        .map(|_| {
            let set = Arc::clone(&set);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                while !done.load(Ordering::Acquire) {
                    match set.random_element() {
                        // Elements below 1000 are never removed.
                        Ok(e) => assert!(e < 1000 || e % 2 == 0),
                        Err(e) => panic!("unexpected error: {e}"),
                    }
                }
            })
        })
        .collect::<Vec<_>>();

    let writers = (0..4u32)
        .map(|id| {
            let set = Arc::clone(&set);
            thread::spawn(move || {
                for round in 0..5 {
                    let base = 10_000 * (id + 1) + round * 2000;
                    set.insert_all((base..base + 2000).map(|e| e * 2));
                    let added = (base..base + 2000).map(|e| e * 2).collect::<Vec<_>>();
                    set.remove_all(&added);
                }
            })
        })
        .collect::<Vec<_>>();

    writers.into_iter().for_each(|h| h.join().expect("Failed"));
    done.store(true, Ordering::Release);
    samplers.into_iter().for_each(|h| h.join().expect("Failed"));

    assert_eq!(set.len(), 1000);
}

#[test]
fn whole_table_operations_do_not_deadlock() {
    init_logger();

    let set = Arc::new(RandomHashSet::new());
    let barrier = Arc::new(Barrier::new(4));

    let handles = (0..4u32)
        .map(|id| {
            let set = Arc::clone(&set);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for round in 0..50u32 {
                    match id {
                        0 => {
                            set.insert_all(round * 100..round * 100 + 100);
                        }
                        1 => {
                            set.retain(|e| e % 7 != 0);
                        }
                        2 => {
                            let copy = (*set).clone();
                            assert_eq!(copy.iter().count(), copy.len());
                        }
                        _ => {
                            if round % 10 == 0 {
                                set.clear();
                            }
                            let _ = set.random_element();
                        }
                    }
                }
            })
        })
        .collect::<Vec<_>>();

    handles.into_iter().for_each(|h| h.join().expect("Failed"));

    let count = set.iter().count();
    assert_eq!(count, set.len());
}

#[test]
fn iterating_while_other_threads_insert() {
    const NUM_KEYS: u32 = 1024;

    let set = Arc::new(RandomHashSet::builder().shards(4).build().unwrap());
    set.insert_all(0..NUM_KEYS);

    let handles = (0..8u32)
        .map(|n| {
            let set = Arc::clone(&set);
            if n % 2 == 0 {
                thread::spawn(move || {
                    for key in 0..NUM_KEYS {
                        // Already present; never changes the set.
                        assert!(!set.insert(key));
                    }
                })
            } else {
                thread::spawn(move || {
                    let mut seen = std::collections::HashSet::new();
                    let mut iter = set.iter();
                    loop {
                        match iter.try_next() {
                            Ok(key) => assert!(seen.insert(key)),
                            Err(Error::NoSuchElement) => break,
                            Err(e) => panic!("unexpected error: {e}"),
                        }
                    }
                    assert_eq!(seen.len(), NUM_KEYS as usize);
                })
            }
        })
        .collect::<Vec<_>>();

    handles.into_iter().for_each(|h| h.join().expect("Failed"));
}
