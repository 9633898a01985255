// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # Direct Kernels
//!
//! No-broadcast and scalar-operand kernels. Neither operand needs coordinate
//! recomputation: each is either read at the output index or is a single
//! value splatted across the output.
//!
//! The operand access pattern is a type parameter ([`Contiguous`] or
//! [`Splat`]), so each of the three classifications gets its own
//! monomorphized loop with no per-element branch.

use crate::structs::launch::LaunchGeometry;
use crate::traits::stream::Stream;
use crate::traits::type_unions::Primitive;

/// Read access to one operand of a direct kernel.
pub trait Source<T: Primitive>: Copy + Sync {
    /// Element feeding output index `i`.
    fn at(&self, i: usize) -> T;

    /// `VEC` elements feeding outputs `i..i + VEC`, as one wide read.
    fn load<const VEC: usize>(&self, i: usize) -> [T; VEC];
}

/// Operand already shaped like the output.
#[derive(Debug, Clone, Copy)]
pub struct Contiguous<'a, T>(pub &'a [T]);

/// Single-element operand.
#[derive(Debug, Clone, Copy)]
pub struct Splat<T>(pub T);

impl<T: Primitive> Source<T> for Contiguous<'_, T> {
    #[inline(always)]
    fn at(&self, i: usize) -> T {
        self.0[i]
    }

    #[inline(always)]
    fn load<const VEC: usize>(&self, i: usize) -> [T; VEC] {
        let mut v = [T::default(); VEC];
        v.copy_from_slice(&self.0[i..i + VEC]);
        v
    }
}

impl<T: Primitive> Source<T> for Splat<T> {
    #[inline(always)]
    fn at(&self, _i: usize) -> T {
        self.0
    }

    #[inline(always)]
    fn load<const VEC: usize>(&self, _i: usize) -> [T; VEC] {
        [self.0; VEC]
    }
}

/// One thread group, one element at a time.
#[inline]
pub fn direct_group<T1, T2, T, L, R, F>(lhs: L, rhs: R, base: usize, out: &mut [T], f: &F)
where
    T1: Primitive,
    T2: Primitive,
    L: Source<T1>,
    R: Source<T2>,
    F: Fn(T1, T2) -> T,
{
    for (k, o) in out.iter_mut().enumerate() {
        let i = base + k;
        *o = f(lhs.at(i), rhs.at(i));
    }
}

/// One thread group, `VEC` elements per read and write.
///
/// `out.len()` must be a multiple of `VEC`, which holds whenever `N` and the
/// group span both are.
#[inline]
pub fn vectorized_group<T1, T2, T, L, R, F, const VEC: usize>(
    lhs: L,
    rhs: R,
    base: usize,
    out: &mut [T],
    f: &F,
) where
    T1: Primitive,
    T2: Primitive,
    T: Primitive,
    L: Source<T1>,
    R: Source<T2>,
    F: Fn(T1, T2) -> T,
{
    debug_assert_eq!(out.len() % VEC, 0);
    for (v, o) in out.chunks_exact_mut(VEC).enumerate() {
        let i = base + v * VEC;
        let a = lhs.load::<VEC>(i);
        let b = rhs.load::<VEC>(i);
        let mut r = [T::default(); VEC];
        for j in 0..VEC {
            r[j] = f(a[j], b[j]);
        }
        o.copy_from_slice(&r);
    }
}

/// Launches the direct kernel, vectorized at `vector_width` if given.
///
/// Widths without a monomorphized kernel fall back to the scalar loop.
pub fn launch_direct<S, T1, T2, T, L, R, F>(
    stream: &S,
    geometry: &LaunchGeometry,
    vector_width: Option<usize>,
    lhs: L,
    rhs: R,
    output: &mut [T],
    f: &F,
) where
    S: Stream,
    T1: Primitive,
    T2: Primitive,
    T: Primitive,
    L: Source<T1>,
    R: Source<T2>,
    F: Fn(T1, T2) -> T + Sync,
{
    let span = geometry.span();
    match vector_width {
        Some(2) => stream.launch(geometry, output, |g, out| {
            vectorized_group::<T1, T2, T, L, R, F, 2>(lhs, rhs, g * span, out, f)
        }),
        Some(4) => stream.launch(geometry, output, |g, out| {
            vectorized_group::<T1, T2, T, L, R, F, 4>(lhs, rhs, g * span, out, f)
        }),
        Some(8) => stream.launch(geometry, output, |g, out| {
            vectorized_group::<T1, T2, T, L, R, F, 8>(lhs, rhs, g * span, out, f)
        }),
        _ => stream.launch(geometry, output, |g, out| {
            direct_group(lhs, rhs, g * span, out, f)
        }),
    }
}
