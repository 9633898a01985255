// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # Operator Routing
//!
//! Runtime-selected arithmetic and comparison over broadcast operands.
//! The operator is resolved to a monomorphic functor once, before launch.

use vec64::Vec64;

use crate::enums::error::KernelError;
use crate::enums::operators::{ArithmeticOperator, ComparisonOperator};
use crate::kernels::routing::binary_map::broadcast_binary;
use crate::traits::stream::Stream;
use crate::traits::type_unions::{Numeric, Primitive};

/// `lhs <op> rhs` with broadcasting.
pub fn resolve_binary_arithmetic<S, T>(
    stream: &S,
    op: ArithmeticOperator,
    lhs: &[T],
    lhs_shape: &[usize],
    rhs: &[T],
    rhs_shape: &[usize],
) -> Result<(Vec64<T>, Vec<usize>), KernelError>
where
    S: Stream,
    T: Numeric,
{
    broadcast_binary(stream, lhs, lhs_shape, rhs, rhs_shape, op.functor::<T>())
}

/// `lhs <cmp> rhs` with broadcasting, producing a boolean mask.
pub fn resolve_binary_comparison<S, T>(
    stream: &S,
    op: ComparisonOperator,
    lhs: &[T],
    lhs_shape: &[usize],
    rhs: &[T],
    rhs_shape: &[usize],
) -> Result<(Vec64<bool>, Vec<usize>), KernelError>
where
    S: Stream,
    T: Primitive + PartialOrd,
{
    broadcast_binary(stream, lhs, lhs_shape, rhs, rhs_shape, op.functor::<T>())
}
