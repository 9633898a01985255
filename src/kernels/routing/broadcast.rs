// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # Broadcast Planner
//!
//! Reference shape planner. Aligns two shapes on their trailing dimensions,
//! computes the output shape, and classifies the pair into the cheapest
//! kernel that reproduces plain broadcasting.
//!
//! Classification order:
//! 1. Both operands have the output's element count: `NoBroadcast`.
//! 2. One operand has a single element: `LeftScalar` / `RightScalar`.
//! 3. Left has the output shape and right has exactly one non-1 dimension `C`:
//!    per-channel, with `H` the product of the output dims after `C`.
//!    `Batch1` when the product of the output dims before `C` is 1, else `BatchN`.
//! 4. Otherwise `GeneralND`, walking only the operands that differ from the output.

use tracing::trace;

use crate::enums::broadcast_kind::BroadcastKind;
use crate::enums::error::KernelError;
use crate::enums::operand_indexing::OperandIndexing;
use crate::structs::broadcast_args::BroadcastArgs;
use crate::structs::fast_divmod::FAST_DIVMOD_MAX;
use crate::structs::strides::{MAX_RANK, StrideDescriptor};

/// Output shape and launch arguments for one operand pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastPlan {
    pub output_shape: Vec<usize>,
    /// Output element count, `N`.
    pub count: usize,
    pub args: BroadcastArgs,
}

impl BroadcastPlan {
    pub fn new(lhs_shape: &[usize], rhs_shape: &[usize]) -> Result<Self, KernelError> {
        let output_shape = broadcast_shape(lhs_shape, rhs_shape)?;
        let count = checked_count(&output_shape)?;
        let lhs_count: usize = lhs_shape.iter().product();
        let rhs_count: usize = rhs_shape.iter().product();

        let args = if count == 0 || (lhs_count == count && rhs_count == count) {
            // empty outputs never launch, so any classification will do
            BroadcastArgs::no_broadcast()
        } else if lhs_count == 1 {
            BroadcastArgs::left_scalar()
        } else if rhs_count == 1 {
            BroadcastArgs::right_scalar()
        } else if let Some(args) = per_channel(&output_shape, lhs_count == count, rhs_shape)? {
            args
        } else {
            let rank = output_shape.len();
            let side = |shape: &[usize], n: usize| -> Result<OperandIndexing, KernelError> {
                if n == count {
                    Ok(OperandIndexing::Direct)
                } else {
                    Ok(OperandIndexing::Strided(StrideDescriptor::padded(shape, rank)?))
                }
            };
            BroadcastArgs::general(
                &output_shape,
                side(lhs_shape, lhs_count)?,
                side(rhs_shape, rhs_count)?,
            )?
        };

        trace!(?lhs_shape, ?rhs_shape, ?output_shape, kind = %args.kind, "planned broadcast");
        Ok(Self {
            output_shape,
            count,
            args,
        })
    }

    #[inline]
    pub fn kind(&self) -> BroadcastKind {
        self.args.kind
    }
}

/// Broadcast output shape, aligning trailing dimensions.
pub fn broadcast_shape(lhs: &[usize], rhs: &[usize]) -> Result<Vec<usize>, KernelError> {
    let rank = lhs.len().max(rhs.len());
    if rank > MAX_RANK {
        return Err(KernelError::RankExceedsCapacity {
            rank,
            capacity: MAX_RANK,
        });
    }
    let mismatch = || KernelError::ShapeMismatch {
        lhs: lhs.to_vec(),
        rhs: rhs.to_vec(),
    };
    let (lpad, rpad) = (rank - lhs.len(), rank - rhs.len());
    let mut out = Vec::with_capacity(rank);
    for d in 0..rank {
        let l = if d < lpad { 1 } else { lhs[d - lpad] };
        let r = if d < rpad { 1 } else { rhs[d - rpad] };
        out.push(match (l, r) {
            _ if l == r => l,
            (1, r) => r,
            (l, 1) => l,
            _ => return Err(mismatch()),
        });
    }
    Ok(out)
}

/// Element count, bounded by what fast divmod can decompose.
fn checked_count(shape: &[usize]) -> Result<usize, KernelError> {
    let too_large = || KernelError::DividendOutOfRange {
        value: u64::MAX,
        max: FAST_DIVMOD_MAX as u64,
    };
    let count = shape
        .iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .ok_or_else(too_large)?;
    if count > FAST_DIVMOD_MAX as usize {
        return Err(KernelError::DividendOutOfRange {
            value: count as u64,
            max: FAST_DIVMOD_MAX as u64,
        });
    }
    Ok(count)
}

/// Per-channel arguments if the right operand varies along one dimension only.
fn per_channel(
    output_shape: &[usize],
    lhs_is_output: bool,
    rhs_shape: &[usize],
) -> Result<Option<BroadcastArgs>, KernelError> {
    if !lhs_is_output {
        return Ok(None);
    }
    let mut non_unit = rhs_shape.iter().enumerate().filter(|&(_, &d)| d != 1);
    let (Some((pos, &channels)), None) = (non_unit.next(), non_unit.next()) else {
        return Ok(None);
    };
    let dim_c = pos + output_shape.len() - rhs_shape.len();
    let batch: usize = output_shape[..dim_c].iter().product();
    let spatial: usize = output_shape[dim_c + 1..].iter().product();
    if batch == 1 {
        BroadcastArgs::right_per_channel_batch1(spatial).map(Some)
    } else {
        BroadcastArgs::right_per_channel_batch_n(spatial, channels).map(Some)
    }
}
