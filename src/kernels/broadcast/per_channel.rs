// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # Per-Channel Kernels
//!
//! Right operand broadcast along batch and spatial dimensions, varying only
//! along the channel dimension. This is the bias/scale pattern of an
//! `[N, C, H...]` feature map against a `[C]` vector.
//!
//! The left operand always has the output shape.

use crate::structs::fast_divmod::FastDivmod;
use crate::structs::launch::LaunchGeometry;
use crate::traits::stream::Stream;
use crate::traits::type_unions::Primitive;

/// One group of `out[i] = f(lhs[i], rhs[i / H])`.
#[inline]
pub fn per_channel_batch1_group<T1, T2, T, F>(
    lhs: &[T1],
    rhs: &[T2],
    spatial: FastDivmod,
    base: usize,
    out: &mut [T],
    f: &F,
) where
    T1: Primitive,
    T2: Primitive,
    F: Fn(T1, T2) -> T,
{
    for (k, o) in out.iter_mut().enumerate() {
        let i = base + k;
        let c = spatial.div(i as u32) as usize;
        *o = f(lhs[i], rhs[c]);
    }
}

/// One group of `out[i] = f(lhs[i], rhs[(i / H) % C])`.
#[inline]
pub fn per_channel_batch_n_group<T1, T2, T, F>(
    lhs: &[T1],
    rhs: &[T2],
    spatial: FastDivmod,
    channels: FastDivmod,
    base: usize,
    out: &mut [T],
    f: &F,
) where
    T1: Primitive,
    T2: Primitive,
    F: Fn(T1, T2) -> T,
{
    for (k, o) in out.iter_mut().enumerate() {
        let i = base + k;
        let (_batch, c) = channels.divmod(spatial.div(i as u32));
        *o = f(lhs[i], rhs[c as usize]);
    }
}

pub fn launch_per_channel_batch1<S, T1, T2, T, F>(
    stream: &S,
    geometry: &LaunchGeometry,
    lhs: &[T1],
    rhs: &[T2],
    spatial: FastDivmod,
    output: &mut [T],
    f: &F,
) where
    S: Stream,
    T1: Primitive,
    T2: Primitive,
    T: Primitive,
    F: Fn(T1, T2) -> T + Sync,
{
    let span = geometry.span();
    stream.launch(geometry, output, |g, out| {
        per_channel_batch1_group(lhs, rhs, spatial, g * span, out, f)
    });
}

#[allow(clippy::too_many_arguments)]
pub fn launch_per_channel_batch_n<S, T1, T2, T, F>(
    stream: &S,
    geometry: &LaunchGeometry,
    lhs: &[T1],
    rhs: &[T2],
    spatial: FastDivmod,
    channels: FastDivmod,
    output: &mut [T],
    f: &F,
) where
    S: Stream,
    T1: Primitive,
    T2: Primitive,
    T: Primitive,
    F: Fn(T1, T2) -> T + Sync,
{
    let span = geometry.span();
    stream.launch(geometry, output, |g, out| {
        per_channel_batch_n_group(lhs, rhs, spatial, channels, g * span, out, f)
    });
}
