// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # OperandIndexing Enum Module
//!
//! How the general N-D kernel finds an operand's source element.

use crate::structs::strides::StrideDescriptor;

/// Per-operand indexing mode for the general N-D walk.
///
/// `Direct` operands already have the output shape, so the output linear
/// index is their source index and no coordinate accumulation is done for
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OperandIndexing {
    #[default]
    Direct,
    Strided(StrideDescriptor),
}

impl OperandIndexing {
    #[inline]
    pub fn is_strided(&self) -> bool {
        matches!(self, OperandIndexing::Strided(_))
    }

    #[inline]
    pub fn strides(&self) -> Option<&StrideDescriptor> {
        match self {
            OperandIndexing::Direct => None,
            OperandIndexing::Strided(s) => Some(s),
        }
    }
}
