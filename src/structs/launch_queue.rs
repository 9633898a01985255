// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # Launch Queue
//!
//! Asynchronous front end for the dispatcher.
//!
//! [`Stream::launch`] borrows the output mutably for the duration of the call,
//! so it has to finish before returning. A [`LaunchQueue`] lifts that
//! restriction inside a [`rayon::Scope`]: buffers are borrowed for the scope
//! lifetime `'s`, each dispatch is recorded and handed to the pool, and the
//! call returns at once. Launches on one queue run one after another in
//! enqueue order. All of them have completed when the scope ends.
//!
//! ```rust
//! use minbroadcast::{LaunchQueue, RayonStream};
//!
//! let lhs: Vec<f32> = (0..4096).map(|v| v as f32).collect();
//! let rhs = vec![2.0f32; 4096];
//! let mut sum = vec![0.0f32; 4096];
//! let mut product = vec![0.0f32; 4096];
//!
//! rayon::scope(|s| {
//!     let queue = LaunchQueue::new(s, RayonStream::new());
//!     queue.dispatch_no_broadcast(&lhs, &rhs, &mut sum, 4096, |a, b| a + b);
//!     queue.dispatch_no_broadcast(&lhs, &rhs, &mut product, 4096, |a, b| a * b);
//!     // both launches are in flight here
//! });
//! assert_eq!(sum[10], 12.0);
//! assert_eq!(product[10], 20.0);
//! ```

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use rayon::Scope;
use tracing::trace;

use crate::kernels::routing::dispatch::Dispatcher;
use crate::structs::broadcast_args::BroadcastArgs;
use crate::traits::stream::Stream;
use crate::traits::type_unions::Primitive;

type Job<'s> = Box<dyn FnOnce() + Send + 's>;

#[derive(Default)]
struct Pending<'s> {
    jobs: VecDeque<Job<'s>>,
    draining: bool,
}

/// In-order, non-blocking launch queue bound to a Rayon scope.
///
/// At most one drain task is alive per queue, which is what serialises the
/// launches. Each launch still spreads its thread groups over `S`.
pub struct LaunchQueue<'a, 's, S> {
    scope: &'a Scope<'s>,
    stream: Arc<S>,
    dispatcher: Dispatcher,
    pending: Arc<Mutex<Pending<'s>>>,
}

impl<'a, 's, S> LaunchQueue<'a, 's, S>
where
    S: Stream + Send + 's,
{
    /// Queue on `scope` with the default tunables.
    pub fn new(scope: &'a Scope<'s>, stream: S) -> Self {
        Self::with_dispatcher(scope, stream, Dispatcher::default())
    }

    pub fn with_dispatcher(scope: &'a Scope<'s>, stream: S, dispatcher: Dispatcher) -> Self {
        Self {
            scope,
            stream: Arc::new(stream),
            dispatcher,
            pending: Arc::new(Mutex::new(Pending::default())),
        }
    }

    #[inline]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Enqueues [`Dispatcher::dispatch`] and returns without waiting for it.
    #[allow(clippy::too_many_arguments)]
    pub fn dispatch<T1, T2, T, F>(
        &self,
        args: &'s BroadcastArgs,
        lhs: &'s [T1],
        rhs: &'s [T2],
        output: &'s mut [T],
        count: usize,
        f: F,
    ) where
        T1: Primitive,
        T2: Primitive,
        T: Primitive,
        F: Fn(T1, T2) -> T + Send + Sync + 's,
    {
        let stream = Arc::clone(&self.stream);
        let dispatcher = self.dispatcher;
        self.push(Box::new(move || {
            dispatcher.dispatch(&*stream, args, lhs, rhs, output, count, f)
        }));
    }

    /// Enqueues [`Dispatcher::dispatch_no_broadcast`] and returns without waiting for it.
    pub fn dispatch_no_broadcast<T1, T2, T, F>(
        &self,
        lhs: &'s [T1],
        rhs: &'s [T2],
        output: &'s mut [T],
        count: usize,
        f: F,
    ) where
        T1: Primitive,
        T2: Primitive,
        T: Primitive,
        F: Fn(T1, T2) -> T + Send + Sync + 's,
    {
        let stream = Arc::clone(&self.stream);
        let dispatcher = self.dispatcher;
        self.push(Box::new(move || {
            dispatcher.dispatch_no_broadcast(&*stream, lhs, rhs, output, count, f)
        }));
    }

    fn push(&self, job: Job<'s>) {
        let mut pending = self.pending.lock();
        pending.jobs.push_back(job);
        trace!(queued = pending.jobs.len(), "launch enqueued");
        if pending.draining {
            return;
        }
        pending.draining = true;
        drop(pending);

        let shared = Arc::clone(&self.pending);
        self.scope.spawn(move |_| drain(&shared));
    }
}

/// Runs queued launches until the queue is empty, then retires.
fn drain(pending: &Mutex<Pending<'_>>) {
    loop {
        let job = {
            let mut pending = pending.lock();
            match pending.jobs.pop_front() {
                Some(job) => job,
                None => {
                    pending.draining = false;
                    return;
                }
            }
        };
        job();
    }
}
