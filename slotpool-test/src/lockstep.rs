//! A lock-step test-runner for flushing out data-races and race-conditions.

use std::{
    mem,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    thread::{self, JoinHandle},
};

/// LockstepBuilder, a builder for a `Lockstep` run.
///
/// A lock-step run coordinates N threads so that each registered step starts as simultaneously
/// as possible on every thread: between steps, all threads spin on a shared barrier, then
/// release in a burst. Racy code which would rarely interleave under free-running threads is
/// thereby hammered at its most contended points.
///
/// The user registers:
///
/// -   A Global state, shared across all threads.
/// -   N instances of a Local state, each dedicated to a single thread.
/// -   S steps, each run on every thread, in lock-step with the other threads.
///
/// #   Example
///
/// ```
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use slotpool_test::LockstepBuilder;
///
/// let mut builder = LockstepBuilder::new(AtomicUsize::new(0), vec!(1usize, 10));
///
/// builder.add_step(|| |global: &AtomicUsize, local: &mut usize| {
///     global.fetch_add(*local, Ordering::Relaxed);
/// });
///
/// let (global, locals) = builder.launch(4).join();
///
/// assert_eq!(44, global.load(Ordering::Relaxed));
/// assert_eq!(vec!(1, 10), locals);
/// ```
pub struct LockstepBuilder<Global, Local> {
    global: Arc<Global>,
    locals: Vec<Local>,
    steps: Vec<Vec<Box<dyn FnMut(&Global, &mut Local) + Send + 'static>>>,
}

impl<Global, Local> LockstepBuilder<Global, Local>
    where
        Global: Send + Sync + 'static,
        Local: Send + 'static,
{
    /// Creates a new instance of LockstepBuilder; one thread per element of `locals`.
    pub fn new(global: Global, locals: Vec<Local>) -> Self {
        assert!(!locals.is_empty());

        let global = Arc::new(global);
        let steps = {
            let mut steps = vec!();
            steps.resize_with(locals.len(), || vec!());
            steps
        };

        Self { global, locals, steps, }
    }

    /// Adds a step to run on each thread, in lock-step with the other threads.
    ///
    /// The step is created by invoking `factory` once per thread.
    pub fn add_step<Factory, Step>(&mut self, mut factory: Factory)
        where
            Factory: FnMut() -> Step,
            Step: FnMut(&Global, &mut Local) + Send + 'static,
    {
        for serie in &mut self.steps {
            serie.push(Box::new(factory()));
        }
    }

    /// Spawns the threads, which run the full serie of steps `iterations` times.
    ///
    /// The threads start immediately.
    pub fn launch(self, iterations: usize) -> Lockstep<Global, Local> {
        assert!(!self.steps[0].is_empty(), "Cannot launch a lock-step run without a single step");

        let barrier = Arc::new(SpinBarrier::new(self.locals.len()));

        let mut threads = vec!();

        for (mut local, mut serie) in self.locals.into_iter().zip(self.steps.into_iter()) {
            let global = self.global.clone();
            let barrier = barrier.clone();

            threads.push(thread::spawn(move || {
                //  Should this thread panic mid-run, poison the barrier, so that the other
                //  threads do not spin forever waiting for it.
                let guard = PoisonGuard(barrier.clone());

                for _ in 0..iterations {
                    for step in &mut serie {
                        barrier.wait();

                        step(&*global, &mut local);
                    }
                }

                guard.dismiss();

                local
            }));
        }

        Lockstep { global: self.global, threads, }
    }
}

/// Lockstep, the running threads of a lock-step run.
pub struct Lockstep<Global, Local> {
    global: Arc<Global>,
    threads: Vec<JoinHandle<Local>>,
}

impl<Global, Local> Lockstep<Global, Local> {
    /// Joins the threads, and returns the Global state and the Local states, in spawn order.
    ///
    /// #   Panics
    ///
    /// If any of the threads being joined panicked.
    pub fn join(self) -> (Global, Vec<Local>) {
        let locals: Vec<_> = self.threads.into_iter()
            .map(|handle| handle.join().expect("lock-step thread panicked"))
            .collect();

        let global = match Arc::try_unwrap(self.global) {
            Ok(global) => global,
            //  All threads were joined above, so this Arc is the last one standing.
            Err(_) => unreachable!("global state still shared after join"),
        };

        (global, locals)
    }
}

//
//  Implementation details
//

//  A reusable sense-reversing spin barrier.
//
//  Threads spin rather than park, so that a full set of waiters releases in a burst, without OS
//  wake-up delays spreading the threads back out.
struct SpinBarrier {
    remaining: AtomicUsize,
    generation: AtomicUsize,
    poisoned: AtomicBool,
    threads: usize,
}

impl SpinBarrier {
    fn new(threads: usize) -> Self {
        Self {
            remaining: AtomicUsize::new(threads),
            generation: AtomicUsize::new(0),
            poisoned: AtomicBool::new(false),
            threads,
        }
    }

    fn wait(&self) {
        let generation = self.generation.load(Ordering::Acquire);

        if self.remaining.fetch_sub(1, Ordering::AcqRel) == 1 {
            //  Last arrival: rearm for the next round, then release everyone.
            //
            //  The rearm is ordered before the Release bump, and waiters only proceed after
            //  Acquire-loading the bumped generation, so no waiter can observe a stale count.
            self.remaining.store(self.threads, Ordering::Relaxed);
            self.generation.fetch_add(1, Ordering::Release);

            return;
        }

        while self.generation.load(Ordering::Acquire) == generation {
            if self.poisoned.load(Ordering::Relaxed) {
                panic!("a lock-step thread panicked, abandoning the run");
            }

            std::hint::spin_loop();
        }
    }

    fn poison(&self) { self.poisoned.store(true, Ordering::Relaxed); }
}

//  If a single thread panics, the others must be flushed out of their spin loops.
struct PoisonGuard(Arc<SpinBarrier>);

impl PoisonGuard {
    fn dismiss(self) { mem::forget(self); }
}

impl Drop for PoisonGuard {
    fn drop(&mut self) {
        self.0.poison();
    }
}

// mod tests
