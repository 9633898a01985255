// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # Stride Descriptor
//!
//! Fixed-capacity per-dimension strides for one operand, padded to the output
//! rank. A zero at dimension `d` means the operand is replicated along `d`.

use std::ops::Index;

use crate::enums::error::KernelError;

/// Maximum output rank the kernels can walk.
pub const MAX_RANK: usize = 8;

/// Padded strides of one operand, aligned with the output dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StrideDescriptor {
    strides: [i64; MAX_RANK],
    rank: usize,
}

impl StrideDescriptor {
    /// Errors if `strides` is longer than [`MAX_RANK`].
    pub fn new(strides: &[i64]) -> Result<Self, KernelError> {
        if strides.len() > MAX_RANK {
            return Err(KernelError::RankExceedsCapacity {
                rank: strides.len(),
                capacity: MAX_RANK,
            });
        }
        let mut out = [0i64; MAX_RANK];
        out[..strides.len()].copy_from_slice(strides);
        Ok(Self {
            strides: out,
            rank: strides.len(),
        })
    }

    /// Padded strides for an operand of `shape` against an output of rank
    /// `output_rank`, aligning trailing dimensions.
    ///
    /// Size-1 dimensions and leading padding get stride 0.
    pub fn padded(shape: &[usize], output_rank: usize) -> Result<Self, KernelError> {
        if output_rank > MAX_RANK || shape.len() > output_rank {
            return Err(KernelError::RankExceedsCapacity {
                rank: output_rank.max(shape.len()),
                capacity: MAX_RANK,
            });
        }
        let offset = output_rank - shape.len();
        let mut strides = [0i64; MAX_RANK];
        let mut running = 1i64;
        for (d, &extent) in shape.iter().enumerate().rev() {
            if extent != 1 {
                strides[offset + d] = running;
            }
            running *= extent as i64;
        }
        Ok(Self {
            strides,
            rank: output_rank,
        })
    }

    #[inline(always)]
    pub fn rank(&self) -> usize {
        self.rank
    }

    #[inline(always)]
    pub fn as_slice(&self) -> &[i64] {
        &self.strides[..self.rank]
    }

    /// True if the operand is replicated along `dim`.
    #[inline]
    pub fn is_broadcast(&self, dim: usize) -> bool {
        self.strides[dim] == 0
    }
}

impl Index<usize> for StrideDescriptor {
    type Output = i64;

    #[inline(always)]
    fn index(&self, dim: usize) -> &i64 {
        &self.strides[dim]
    }
}
