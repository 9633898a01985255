// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # General N-D Kernel
//!
//! Arbitrary broadcasting. Each output index is decomposed into coordinates
//! with one [`FastDivmod`](crate::structs::fast_divmod::FastDivmod) per output
//! dimension, and each strided operand's source offset is the dot product of
//! those coordinates with its padded strides.
//!
//! Which operands need the walk is a pair of const flags, so an operand that
//! already has the output shape costs nothing beyond reading it at `i`.

use crate::structs::broadcast_args::BroadcastArgs;
use crate::structs::launch::LaunchGeometry;
use crate::traits::stream::Stream;
use crate::traits::type_unions::Primitive;

/// Source offsets of output index `i` for both operands.
#[inline(always)]
pub fn source_offsets<const LHS: bool, const RHS: bool>(
    args: &BroadcastArgs,
    lhs_strides: &[i64],
    rhs_strides: &[i64],
    i: usize,
) -> (usize, usize) {
    let mut lhs_index: i64 = if LHS { 0 } else { i as i64 };
    let mut rhs_index: i64 = if RHS { 0 } else { i as i64 };
    let mut offset = i as u32;
    for (dim, fdm) in args.output_stride_divmods().iter().enumerate() {
        let (q, r) = fdm.divmod(offset);
        if LHS {
            lhs_index += lhs_strides[dim] * q as i64;
        }
        if RHS {
            rhs_index += rhs_strides[dim] * q as i64;
        }
        offset = r;
    }
    (lhs_index as usize, rhs_index as usize)
}

/// One thread group of the general walk.
#[inline]
pub fn general_group<T1, T2, T, F, const LHS: bool, const RHS: bool>(
    args: &BroadcastArgs,
    lhs: &[T1],
    rhs: &[T2],
    base: usize,
    out: &mut [T],
    f: &F,
) where
    T1: Primitive,
    T2: Primitive,
    F: Fn(T1, T2) -> T,
{
    let lhs_strides = args.lhs.strides().map(|s| s.as_slice()).unwrap_or(&[]);
    let rhs_strides = args.rhs.strides().map(|s| s.as_slice()).unwrap_or(&[]);
    for (k, o) in out.iter_mut().enumerate() {
        let (li, ri) = source_offsets::<LHS, RHS>(args, lhs_strides, rhs_strides, base + k);
        *o = f(lhs[li], rhs[ri]);
    }
}

/// Launches the general walk for the operands flagged as strided.
///
/// The flags come from the launch plan and must agree with `args`. Callers
/// route the both-direct case to the direct kernel instead.
#[allow(clippy::too_many_arguments)]
pub fn launch_general<S, T1, T2, T, F>(
    stream: &S,
    geometry: &LaunchGeometry,
    args: &BroadcastArgs,
    lhs_strided: bool,
    rhs_strided: bool,
    lhs: &[T1],
    rhs: &[T2],
    output: &mut [T],
    f: &F,
) where
    S: Stream,
    T1: Primitive,
    T2: Primitive,
    T: Primitive,
    F: Fn(T1, T2) -> T + Sync,
{
    debug_assert_eq!(lhs_strided, args.lhs.is_strided());
    debug_assert_eq!(rhs_strided, args.rhs.is_strided());
    let span = geometry.span();
    match (lhs_strided, rhs_strided) {
        (true, true) => stream.launch(geometry, output, |g, out| {
            general_group::<T1, T2, T, F, true, true>(args, lhs, rhs, g * span, out, f)
        }),
        (true, false) => stream.launch(geometry, output, |g, out| {
            general_group::<T1, T2, T, F, true, false>(args, lhs, rhs, g * span, out, f)
        }),
        (false, true) => stream.launch(geometry, output, |g, out| {
            general_group::<T1, T2, T, F, false, true>(args, lhs, rhs, g * span, out, f)
        }),
        (false, false) => stream.launch(geometry, output, |g, out| {
            general_group::<T1, T2, T, F, false, false>(args, lhs, rhs, g * span, out, f)
        }),
    }
}
