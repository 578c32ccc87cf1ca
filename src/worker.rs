//! Bounded worker-pool helper.
//!
//! Caps in-flight work to at most `workers` items concurrently, using
//! `std::thread::scope` for the join-before-return guarantee and a
//! bounded `mpsc::sync_channel` as a counting semaphore. Each call owns
//! its pool and join set; there is no hidden global state shared across
//! calls.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;

/// Run `f(item)` for every item in `items`, bounded to at most `workers`
/// concurrently in flight, joining all of them before returning. Output
/// order matches input order regardless of completion order, since each
/// worker writes to its own independent output cell.
pub fn for_each_bounded<T, R, F>(items: Vec<T>, workers: usize, f: F) -> Vec<R>
where
    T: Send,
    R: Send,
    F: Fn(usize, T) -> R + Sync,
{
    let workers = workers.max(1);
    let len = items.len();
    let mut results: Vec<Option<R>> = (0..len).map(|_| None).collect();

    let (permit_tx, permit_rx) = mpsc::sync_channel::<()>(workers);
    for _ in 0..workers {
        permit_tx.send(()).expect("permit channel has capacity for all workers");
    }

    thread::scope(|scope| {
        let permit_rx = &permit_rx;
        let permit_tx = &permit_tx;
        let f = &f;
        let mut slots: Vec<Option<&mut Option<R>>> = results.iter_mut().map(Some).collect();

        for (index, item) in items.into_iter().enumerate() {
            permit_rx.recv().expect("worker pool outlives its permits");
            let slot = slots[index].take().expect("each index visited once");
            scope.spawn(move || {
                *slot = Some(f(index, item));
                let _ = permit_tx.send(());
            });
        }
    });

    results
        .into_iter()
        .map(|r| r.expect("every index was visited exactly once"))
        .collect()
}

/// First-success-wins search: runs `predicate` over `items` bounded to
/// `workers` in flight, checking a shared "found" flag before starting
/// each predicate so work queued behind an already-found result is
/// skipped rather than run to completion regardless of outcome. Returns
/// the first index (by completion, not necessarily by input order) for
/// which `predicate` returned true.
pub fn find_first_bounded<T, F>(items: Vec<T>, workers: usize, predicate: F) -> Option<usize>
where
    T: Send,
    F: Fn(usize, &T) -> bool + Sync,
{
    let workers = workers.max(1);
    let found = AtomicBool::new(false);
    let found_index = AtomicUsize::new(usize::MAX);

    let (permit_tx, permit_rx) = mpsc::sync_channel::<()>(workers);
    for _ in 0..workers {
        permit_tx.send(()).expect("permit channel has capacity for all workers");
    }

    thread::scope(|scope| {
        let permit_rx = &permit_rx;
        let permit_tx = &permit_tx;
        let predicate = &predicate;
        let found = &found;
        let found_index = &found_index;

        for (index, item) in items.into_iter().enumerate() {
            if found.load(Ordering::Acquire) {
                break;
            }
            permit_rx.recv().expect("worker pool outlives its permits");
            if found.load(Ordering::Acquire) {
                let _ = permit_tx.send(());
                break;
            }
            scope.spawn(move || {
                if !found.load(Ordering::Acquire) && predicate(index, &item) {
                    if found
                        .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                        .is_ok()
                    {
                        found_index.store(index, Ordering::Release);
                    }
                }
                let _ = permit_tx.send(());
            });
        }
    });

    let index = found_index.load(Ordering::Acquire);
    (index != usize::MAX).then_some(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn results_are_in_input_order() {
        let items: Vec<usize> = (0..37).collect();
        let results = for_each_bounded(items, 4, |_idx, x| x * 2);
        let expected: Vec<usize> = (0..37).map(|x| x * 2).collect();
        assert_eq!(results, expected);
    }

    #[test]
    fn never_exceeds_worker_cap() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));
        let items: Vec<usize> = (0..40).collect();
        let in_flight_c = in_flight.clone();
        let max_seen_c = max_seen.clone();

        let _ = for_each_bounded(items, 5, move |_idx, _x| {
            let current = in_flight_c.fetch_add(1, Ordering::SeqCst) + 1;
            max_seen_c.fetch_max(current, Ordering::SeqCst);
            std::thread::sleep(std::time::Duration::from_millis(2));
            in_flight_c.fetch_sub(1, Ordering::SeqCst);
            0usize
        });

        assert!(max_seen.load(Ordering::SeqCst) <= 5);
    }

    #[test]
    fn find_first_bounded_locates_the_only_match() {
        let items: Vec<usize> = (0..50).collect();
        let found = find_first_bounded(items, 4, |_idx, x| *x == 17);
        assert_eq!(found, Some(17));
    }

    #[test]
    fn find_first_bounded_returns_none_on_miss() {
        let items: Vec<usize> = (0..20).collect();
        let found = find_first_bounded(items, 4, |_idx, _x| false);
        assert_eq!(found, None);
    }
}
