// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # Binary Map Module
//!
//! Generic binary function application with broadcasting support.

use vec64::Vec64;

use crate::enums::error::KernelError;
use crate::kernels::routing::broadcast::BroadcastPlan;
use crate::kernels::routing::dispatch::Dispatcher;
use crate::traits::stream::Stream;
use crate::traits::type_unions::Primitive;

/// Apply a binary function element-wise with broadcasting.
///
/// Plans the pair of shapes, allocates a 64-byte aligned output and
/// dispatches the matching kernel on `stream`. Returns the output together
/// with its shape.
///
/// # Errors
/// - `ShapeMismatch` if the shapes do not broadcast.
/// - `LengthMismatch` if a buffer's length disagrees with its shape.
/// - `RankExceedsCapacity` / `DividendOutOfRange` for outputs the kernels cannot index.
///
/// # Example
/// ```rust
/// use minbroadcast::{SerialStream, broadcast_binary};
///
/// // [2, 1] + [3] -> [2, 3]
/// let (out, shape) = broadcast_binary(&SerialStream, &[1, 2], &[2, 1], &[10, 20, 30], &[3], |a: i32, b: i32| a + b).unwrap();
/// assert_eq!(shape, vec![2, 3]);
/// assert_eq!(out.as_slice(), &[11, 21, 31, 12, 22, 32]);
/// ```
pub fn broadcast_binary<S, T1, T2, T, F>(
    stream: &S,
    lhs: &[T1],
    lhs_shape: &[usize],
    rhs: &[T2],
    rhs_shape: &[usize],
    f: F,
) -> Result<(Vec64<T>, Vec<usize>), KernelError>
where
    S: Stream,
    T1: Primitive,
    T2: Primitive,
    T: Primitive,
    F: Fn(T1, T2) -> T + Sync,
{
    broadcast_binary_with(&Dispatcher::default(), stream, lhs, lhs_shape, rhs, rhs_shape, f)
}

/// [`broadcast_binary`] under a caller-supplied dispatcher.
pub fn broadcast_binary_with<S, T1, T2, T, F>(
    dispatcher: &Dispatcher,
    stream: &S,
    lhs: &[T1],
    lhs_shape: &[usize],
    rhs: &[T2],
    rhs_shape: &[usize],
    f: F,
) -> Result<(Vec64<T>, Vec<usize>), KernelError>
where
    S: Stream,
    T1: Primitive,
    T2: Primitive,
    T: Primitive,
    F: Fn(T1, T2) -> T + Sync,
{
    check_len("lhs", lhs.len(), lhs_shape)?;
    check_len("rhs", rhs.len(), rhs_shape)?;
    let plan = BroadcastPlan::new(lhs_shape, rhs_shape)?;

    let mut out: Vec64<T> = (0..plan.count).map(|_| T::default()).collect();
    dispatcher.dispatch(stream, &plan.args, lhs, rhs, &mut out[..], plan.count, f);
    Ok((out, plan.output_shape))
}

fn check_len(side: &str, len: usize, shape: &[usize]) -> Result<(), KernelError> {
    let expected: usize = shape.iter().product();
    if len != expected {
        return Err(KernelError::LengthMismatch(format!(
            "{side} buffer has {len} elements but shape {shape:?} needs {expected}"
        )));
    }
    Ok(())
}
