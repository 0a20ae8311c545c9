//! One thread per output element.

use std::thread;

use crate::matrix::naive::dot_element;
use crate::Element;

/// Multi-threaded multiplication that spawns one thread per element of C.
///
/// This is the over-fine-grained baseline: `m * n` threads, each doing a
/// single k-long dot product. Thread creation dominates the runtime, but
/// the result is exact. All threads are joined before returning.
///
/// # Panics
///
/// Panics if the slice sizes don't match m, n, k, or if a thread can't be
/// spawned or panics.
pub fn matmul_thread_per_element<T: Element>(
    a: &[T],
    b: &[T],
    c: &mut [T],
    m: usize,
    n: usize,
    k: usize,
) {
    assert_eq!(a.len(), m * k, "A: expected {}x{}={} elements", m, k, m * k);
    assert_eq!(b.len(), k * n, "B: expected {}x{}={} elements", k, n, k * n);
    assert_eq!(c.len(), m * n, "C: expected {}x{}={} elements", m, n, m * n);

    thread::scope(|s| {
        for (idx, out) in c.iter_mut().enumerate() {
            s.spawn(move || {
                *out = dot_element(a, b, idx / n, idx % n, n, k);
            });
        }
    });
}
