// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # FastDivmod
//!
//! Division and modulo by a divisor fixed at construction, computed with a
//! precomputed reciprocal multiplier and a shift instead of a hardware divide.
//!
//! Converting a linear output index back into coordinates costs one division
//! per dimension per element. Every worker does this for every element on the
//! general broadcasting path, so removing the divide is the main lever there.
//!
//! ## Range
//! Both the divisor and the dividend are limited to `1..=i32::MAX` and
//! `0..=i32::MAX` respectively. Within that range `(M * n) >> 32` plus `n`
//! never overflows `u64`, and the result matches native `/` and `%` exactly.

use crate::enums::error::KernelError;

/// Largest divisor and dividend supported by [`FastDivmod`].
pub const FAST_DIVMOD_MAX: u32 = i32::MAX as u32;

/// Precomputed divisor.
///
/// Immutable once built, `Copy`, and safe to share across every worker of a launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FastDivmod {
    divisor: u32,
    multiplier: u32,
    shift: u32,
}

impl FastDivmod {
    /// Builds the reciprocal constants for `divisor`.
    ///
    /// `shift` is the smallest `l` with `2^l >= d`, and the multiplier is
    /// `floor(2^32 * (2^l - d) / d) + 1`, which fits in 32 bits for every `d`
    /// in range.
    pub fn new(divisor: u32) -> Result<Self, KernelError> {
        if divisor == 0 {
            return Err(KernelError::ZeroDivisor);
        }
        if divisor > FAST_DIVMOD_MAX {
            return Err(KernelError::DivisorOutOfRange {
                divisor: divisor as u64,
                max: FAST_DIVMOD_MAX as u64,
            });
        }

        let mut shift = 0u32;
        while shift < 32 && (1u64 << shift) < divisor as u64 {
            shift += 1;
        }

        let d = divisor as u64;
        let multiplier = ((1u64 << 32) * ((1u64 << shift) - d)) / d + 1;
        debug_assert!(multiplier <= u32::MAX as u64);

        Ok(Self {
            divisor,
            multiplier: multiplier as u32,
            shift,
        })
    }

    /// Builds from a `usize` extent, as produced by shape arithmetic.
    pub fn from_extent(extent: usize) -> Result<Self, KernelError> {
        let divisor = u32::try_from(extent).map_err(|_| KernelError::DivisorOutOfRange {
            divisor: extent as u64,
            max: FAST_DIVMOD_MAX as u64,
        })?;
        Self::new(divisor)
    }

    #[inline(always)]
    pub fn divisor(&self) -> u32 {
        self.divisor
    }

    /// `n / d`
    #[inline(always)]
    pub fn div(&self, n: u32) -> u32 {
        debug_assert!(n <= FAST_DIVMOD_MAX, "dividend {n} outside fast divmod range");
        let t = ((self.multiplier as u64 * n as u64) >> 32) as u32;
        // t + n < 2^32 while n <= i32::MAX
        (t + n) >> self.shift
    }

    /// `(n / d, n % d)`
    #[inline(always)]
    pub fn divmod(&self, n: u32) -> (u32, u32) {
        let q = self.div(n);
        (q, n - q * self.divisor)
    }
}

/// Divisor of one, which makes `div` the identity. Used to fill unused slots.
impl Default for FastDivmod {
    fn default() -> Self {
        Self {
            divisor: 1,
            multiplier: 1,
            shift: 0,
        }
    }
}
