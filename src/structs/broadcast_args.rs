// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # Broadcast Arguments
//!
//! Everything the planner hands the dispatcher besides the buffers and the
//! functor: the classification, per-operand indexing, and the precomputed
//! divisors each kernel needs. Built once per operation, `Copy`, read-only
//! during the launch.

use crate::enums::broadcast_kind::BroadcastKind;
use crate::enums::error::KernelError;
use crate::enums::operand_indexing::OperandIndexing;
use crate::structs::fast_divmod::FastDivmod;
use crate::structs::strides::{MAX_RANK, StrideDescriptor};

/// Launch inputs for one binary elementwise operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastArgs {
    pub kind: BroadcastKind,
    /// Output rank, only meaningful for [`BroadcastKind::GeneralND`].
    pub rank: usize,
    pub lhs: OperandIndexing,
    pub rhs: OperandIndexing,
    /// One divisor per output dimension, sized to that dimension's row-major stride.
    pub output_stride_divmods: [FastDivmod; MAX_RANK],
    /// Sized to the spatial extent `H` that each channel value spans.
    pub channel_divmod: FastDivmod,
    /// Sized to the channel count `C`.
    pub batch_divmod: FastDivmod,
}

impl BroadcastArgs {
    fn with_kind(kind: BroadcastKind) -> Self {
        Self {
            kind,
            rank: 0,
            lhs: OperandIndexing::Direct,
            rhs: OperandIndexing::Direct,
            output_stride_divmods: [FastDivmod::default(); MAX_RANK],
            channel_divmod: FastDivmod::default(),
            batch_divmod: FastDivmod::default(),
        }
    }

    pub fn no_broadcast() -> Self {
        Self::with_kind(BroadcastKind::NoBroadcast)
    }

    pub fn left_scalar() -> Self {
        Self::with_kind(BroadcastKind::LeftScalar)
    }

    pub fn right_scalar() -> Self {
        Self::with_kind(BroadcastKind::RightScalar)
    }

    /// `rhs[i / spatial]`
    pub fn right_per_channel_batch1(spatial: usize) -> Result<Self, KernelError> {
        let mut args = Self::with_kind(BroadcastKind::RightPerChannelBatch1);
        args.channel_divmod = FastDivmod::from_extent(spatial)?;
        Ok(args)
    }

    /// `rhs[(i / spatial) % channels]`
    pub fn right_per_channel_batch_n(spatial: usize, channels: usize) -> Result<Self, KernelError> {
        let mut args = Self::with_kind(BroadcastKind::RightPerChannelBatchN);
        args.channel_divmod = FastDivmod::from_extent(spatial)?;
        args.batch_divmod = FastDivmod::from_extent(channels)?;
        Ok(args)
    }

    /// General N-D walk over `output_shape`.
    ///
    /// Strided operands must have the same rank as the output. A zero-sized
    /// output dimension is allowed; such an output has no elements and is
    /// never launched, so its strides are computed as if the dimension were 1.
    pub fn general(
        output_shape: &[usize],
        lhs: OperandIndexing,
        rhs: OperandIndexing,
    ) -> Result<Self, KernelError> {
        let rank = output_shape.len();
        if rank > MAX_RANK {
            return Err(KernelError::RankExceedsCapacity {
                rank,
                capacity: MAX_RANK,
            });
        }
        for side in [&lhs, &rhs] {
            if let Some(strides) = side.strides() {
                check_rank(strides, rank)?;
            }
        }

        let mut args = Self::with_kind(BroadcastKind::GeneralND);
        args.rank = rank;
        args.lhs = lhs;
        args.rhs = rhs;
        let mut running = 1usize;
        for d in (0..rank).rev() {
            args.output_stride_divmods[d] = FastDivmod::from_extent(running)?;
            running = running.saturating_mul(output_shape[d].max(1));
        }
        Ok(args)
    }

    #[inline]
    pub fn output_stride_divmods(&self) -> &[FastDivmod] {
        &self.output_stride_divmods[..self.rank]
    }
}

fn check_rank(strides: &StrideDescriptor, rank: usize) -> Result<(), KernelError> {
    if strides.rank() != rank {
        return Err(KernelError::LengthMismatch(format!(
            "stride descriptor has rank {} but the output has rank {}",
            strides.rank(),
            rank
        )));
    }
    Ok(())
}
