// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # BroadcastKind Enum Module
//!
//! Shape relationship between the two operands and the output, as decided by
//! the planner before dispatch. Each variant routes to exactly one kernel.

use std::fmt;

use crate::enums::error::KernelError;

/// Broadcast classification of a binary operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BroadcastKind {
    /// Both operands already have the output shape.
    NoBroadcast,

    /// Left operand holds a single element.
    LeftScalar,

    /// Right operand holds a single element.
    RightScalar,

    /// Right operand varies once per `H` contiguous output elements,
    /// with a single batch, i.e. `rhs[i / H]`.
    RightPerChannelBatch1,

    /// Right operand cycles over `C` channels after collapsing spans of `H`,
    /// i.e. `rhs[(i / H) % C]`.
    RightPerChannelBatchN,

    /// Anything else. Walks all output dimensions.
    GeneralND,
}

impl BroadcastKind {
    /// Classifications served by the contiguous/scalar kernels, and so
    /// eligible for vectorized access.
    #[inline]
    pub fn is_direct(self) -> bool {
        matches!(
            self,
            BroadcastKind::NoBroadcast | BroadcastKind::LeftScalar | BroadcastKind::RightScalar
        )
    }
}

/// Raw planner codes, in declaration order.
///
/// An unknown code means the planner and the dispatcher disagree, which
/// callers should treat as fatal.
impl TryFrom<i32> for BroadcastKind {
    type Error = KernelError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(BroadcastKind::NoBroadcast),
            1 => Ok(BroadcastKind::LeftScalar),
            2 => Ok(BroadcastKind::RightScalar),
            3 => Ok(BroadcastKind::RightPerChannelBatch1),
            4 => Ok(BroadcastKind::RightPerChannelBatchN),
            5 => Ok(BroadcastKind::GeneralND),
            other => Err(KernelError::UnknownBroadcastKind(other)),
        }
    }
}

impl fmt::Display for BroadcastKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BroadcastKind::NoBroadcast => "no_broadcast",
            BroadcastKind::LeftScalar => "left_scalar",
            BroadcastKind::RightScalar => "right_scalar",
            BroadcastKind::RightPerChannelBatch1 => "right_per_channel_batch1",
            BroadcastKind::RightPerChannelBatchN => "right_per_channel_batch_n",
            BroadcastKind::GeneralND => "general_nd",
        };
        f.write_str(name)
    }
}
