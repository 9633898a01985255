// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # Stream Trait Module
//!
//! Execution queue that kernel launches are enqueued onto.
//!
//! A launch hands the stream its grid and the output slice. The stream splits
//! the output into one disjoint span per thread group and runs the group
//! kernel on each, so no two groups ever see the same output element.
//!
//! Launches on one stream complete in the order they were enqueued. Both
//! streams here finish a launch before `launch` returns, since the output is
//! only borrowed for the call. That gives the ordering for free. For launches
//! that return to the caller before completing, enqueue them on a
//! `LaunchQueue` (feature `parallel_proc`), which borrows buffers for a Rayon
//! scope instead. Ordering across streams is the caller's concern.

#[cfg(feature = "parallel_proc")]
use std::sync::Arc;

#[cfg(feature = "parallel_proc")]
use rayon::ThreadPool;
#[cfg(feature = "parallel_proc")]
use rayon::iter::{IndexedParallelIterator, ParallelIterator};
#[cfg(feature = "parallel_proc")]
use rayon::slice::ParallelSliceMut;

use crate::structs::launch::LaunchGeometry;

/// Execution queue for kernel launches.
pub trait Stream: Sync {
    /// Runs `kernel(group_index, group_output)` once per thread group.
    ///
    /// `output.len()` equals `geometry.count`.
    fn launch<T, K>(&self, geometry: &LaunchGeometry, output: &mut [T], kernel: K)
    where
        T: Send,
        K: Fn(usize, &mut [T]) + Sync;
}

impl<S: Stream> Stream for &S {
    #[inline]
    fn launch<T, K>(&self, geometry: &LaunchGeometry, output: &mut [T], kernel: K)
    where
        T: Send,
        K: Fn(usize, &mut [T]) + Sync,
    {
        (**self).launch(geometry, output, kernel)
    }
}

/// Runs thread groups one after another on the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialStream;

impl Stream for SerialStream {
    fn launch<T, K>(&self, geometry: &LaunchGeometry, output: &mut [T], kernel: K)
    where
        T: Send,
        K: Fn(usize, &mut [T]) + Sync,
    {
        debug_assert_eq!(output.len(), geometry.count);
        for (g, group) in output.chunks_mut(geometry.span()).enumerate() {
            kernel(g, group);
        }
    }
}

/// Runs thread groups on a Rayon pool.
///
/// Uses the global pool unless built with [`RayonStream::with_pool`].
#[cfg(feature = "parallel_proc")]
#[derive(Debug, Clone, Default)]
pub struct RayonStream {
    pool: Option<Arc<ThreadPool>>,
}

#[cfg(feature = "parallel_proc")]
impl RayonStream {
    pub fn new() -> Self {
        Self { pool: None }
    }

    pub fn with_pool(pool: Arc<ThreadPool>) -> Self {
        Self { pool: Some(pool) }
    }
}

#[cfg(feature = "parallel_proc")]
impl Stream for RayonStream {
    fn launch<T, K>(&self, geometry: &LaunchGeometry, output: &mut [T], kernel: K)
    where
        T: Send,
        K: Fn(usize, &mut [T]) + Sync,
    {
        debug_assert_eq!(output.len(), geometry.count);
        let span = geometry.span();
        let mut run = || {
            output
                .par_chunks_mut(span)
                .enumerate()
                .for_each(|(g, group)| kernel(g, group));
        };
        match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        }
    }
}
