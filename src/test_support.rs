// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! Test helpers shared by unit tests, integration tests and benches.
//!
//! [`naive_broadcast`] is the reference every kernel is checked against: it
//! decomposes each output index with native `/` and `%` and has no fast paths.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::structs::launch::LaunchGeometry;
use crate::traits::stream::{SerialStream, Stream};

/// Serial stream that counts launches and thread groups.
#[derive(Debug, Default)]
pub struct RecordingStream {
    launches: AtomicUsize,
    groups: AtomicUsize,
}

impl RecordingStream {
    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    pub fn groups(&self) -> usize {
        self.groups.load(Ordering::SeqCst)
    }
}

impl Stream for RecordingStream {
    fn launch<T, K>(&self, geometry: &LaunchGeometry, output: &mut [T], kernel: K)
    where
        T: Send,
        K: Fn(usize, &mut [T]) + Sync,
    {
        self.launches.fetch_add(1, Ordering::SeqCst);
        SerialStream.launch(geometry, output, |g, out| {
            self.groups.fetch_add(1, Ordering::SeqCst);
            kernel(g, out)
        });
    }
}

/// Broadcast output shape of two shapes, aligning trailing dimensions.
pub fn naive_output_shape(lhs_shape: &[usize], rhs_shape: &[usize]) -> Option<Vec<usize>> {
    let rank = lhs_shape.len().max(rhs_shape.len());
    let dim = |shape: &[usize], d: usize| {
        let pad = rank - shape.len();
        if d < pad { 1 } else { shape[d - pad] }
    };
    (0..rank)
        .map(|d| match (dim(lhs_shape, d), dim(rhs_shape, d)) {
            (a, b) if a == b => Some(a),
            (1, b) => Some(b),
            (a, 1) => Some(a),
            _ => None,
        })
        .collect()
}

/// Reference broadcasting evaluation. Panics on incompatible shapes.
pub fn naive_broadcast<T1, T2, T, F>(
    lhs: &[T1],
    lhs_shape: &[usize],
    rhs: &[T2],
    rhs_shape: &[usize],
    f: F,
) -> (Vec<T>, Vec<usize>)
where
    T1: Copy,
    T2: Copy,
    F: Fn(T1, T2) -> T,
{
    let out_shape = naive_output_shape(lhs_shape, rhs_shape)
        .unwrap_or_else(|| panic!("cannot broadcast {lhs_shape:?} with {rhs_shape:?}"));
    let rank = out_shape.len();
    let count: usize = out_shape.iter().product();

    let source_index = |shape: &[usize], coords: &[usize]| {
        let pad = rank - shape.len();
        let mut index = 0;
        for (d, &extent) in shape.iter().enumerate() {
            let c = if extent == 1 { 0 } else { coords[pad + d] };
            index = index * extent + c;
        }
        index
    };

    let mut out = Vec::with_capacity(count);
    let mut coords = vec![0usize; rank];
    for i in 0..count {
        let mut rem = i;
        for d in (0..rank).rev() {
            coords[d] = rem % out_shape[d];
            rem /= out_shape[d];
        }
        out.push(f(
            lhs[source_index(lhs_shape, &coords)],
            rhs[source_index(rhs_shape, &coords)],
        ));
    }
    (out, out_shape)
}
