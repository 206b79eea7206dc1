use std::{sync::Barrier, thread};

/// Runs `f` concurrently from `count` threads, releasing them together via a barrier so the
/// race being tested starts from a synchronized point rather than racing on thread-spawn
/// overhead.
///
/// `f` receives the zero-based index of the calling thread.
pub fn run_concurrently<F>(count: usize, f: F)
where
    F: Fn(usize) + Send + Sync,
{
    let barrier = Barrier::new(count);
    thread::scope(|scope| {
        for i in 0..count {
            let barrier = &barrier;
            let f = &f;
            scope.spawn(move || {
                barrier.wait();
                f(i);
            });
        }
    });
}
