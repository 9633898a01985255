// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # Error Module - Custom *Kernel* Error Type
//!
//! Defines the unified error type for building launch inputs.
//!
//! ## Features
//! - Covers divisor range violations, rank overflow, incompatible shapes,
//! unknown classification codes and invalid launch tunables.
//! - Kernels never return this type. Everything here is raised while the
//! calling layer builds the classification, strides and divisors, before
//! anything is launched.

use thiserror::Error;

/// Catch all error type for `minbroadcast`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KernelError {
    /// A `FastDivmod` was requested for a divisor of zero.
    #[error("Divisor error: fast divmod requires a positive divisor.")]
    ZeroDivisor,

    #[error("Divisor error: {divisor} exceeds the supported maximum of {max}.")]
    DivisorOutOfRange { divisor: u64, max: u64 },

    /// An element count or extent exceeds what fast divmod can decompose.
    #[error("Index error: {value} exceeds the largest decomposable index {max}.")]
    DividendOutOfRange { value: u64, max: u64 },

    #[error("Rank error: rank {rank} exceeds the stride capacity of {capacity}.")]
    RankExceedsCapacity { rank: usize, capacity: usize },

    #[error("Shape mismatch: cannot broadcast {lhs:?} against {rhs:?}.")]
    ShapeMismatch { lhs: Vec<usize>, rhs: Vec<usize> },

    #[error("Length mismatch: {0}")]
    LengthMismatch(String),

    /// Raw classification code outside the known set.
    #[error("Unknown broadcast classification code {0}.")]
    UnknownBroadcastKind(i32),

    #[error("Invalid launch configuration: {0}")]
    InvalidLaunchConfig(String),
}
