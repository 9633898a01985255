// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # Launch Configuration and Geometry
//!
//! Tuning constants shared by every classification, and the grid they
//! produce for a given element count.
//!
//! A launch is a grid of `groups` thread groups. Group `g` owns the output
//! span `[g * span, (g + 1) * span)` where `span = group_size * elements_per_thread`,
//! and thread `t` of that group handles `base + t + k * group_size` for
//! `k in 0..elements_per_thread`. Taken over all threads of a group that is
//! exactly the span, in order, so kernels walk each span linearly.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::enums::error::KernelError;

/// Workers per thread group.
pub const DEFAULT_GROUP_SIZE: usize = 256;

/// Output elements handled by each worker.
pub const DEFAULT_ELEMENTS_PER_THREAD: usize = 4;

/// Elements per wide load/store on the vectorized path.
pub const DEFAULT_VECTOR_WIDTH: usize = 4;

/// Element widths at or above this many bytes use the scalar loop.
pub const DEFAULT_WIDE_ELEMENT_BYTES: usize = 8;

/// Vector widths with a monomorphized kernel. `1` disables vectorization.
pub const SUPPORTED_VECTOR_WIDTHS: [usize; 4] = [1, 2, 4, 8];

/// Launch tunables.
///
/// These affect throughput only. Every setting produces identical output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LaunchConfig {
    pub group_size: usize,
    pub elements_per_thread: usize,
    pub vector_width: usize,
    pub wide_element_bytes: usize,
}

impl LaunchConfig {
    /// Validated constructor.
    ///
    /// `vector_width` must be one of [`SUPPORTED_VECTOR_WIDTHS`] and divide the
    /// group span, so no wide access straddles two groups.
    pub fn new(
        group_size: usize,
        elements_per_thread: usize,
        vector_width: usize,
        wide_element_bytes: usize,
    ) -> Result<Self, KernelError> {
        let cfg = Self {
            group_size,
            elements_per_thread,
            vector_width,
            wide_element_bytes,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Checks a config built by hand or deserialized.
    pub fn validate(&self) -> Result<(), KernelError> {
        if self.group_size == 0 || self.elements_per_thread == 0 {
            return Err(KernelError::InvalidLaunchConfig(format!(
                "group_size ({}) and elements_per_thread ({}) must be positive",
                self.group_size, self.elements_per_thread
            )));
        }
        if !SUPPORTED_VECTOR_WIDTHS.contains(&self.vector_width) {
            return Err(KernelError::InvalidLaunchConfig(format!(
                "vector_width {} is not one of {:?}",
                self.vector_width, SUPPORTED_VECTOR_WIDTHS
            )));
        }
        if self.span() % self.vector_width != 0 {
            return Err(KernelError::InvalidLaunchConfig(format!(
                "vector_width {} does not divide the group span {}",
                self.vector_width,
                self.span()
            )));
        }
        Ok(())
    }

    /// Output elements covered by one thread group.
    #[inline]
    pub fn span(&self) -> usize {
        self.group_size * self.elements_per_thread
    }

    /// Grid for `count` output elements.
    #[inline]
    pub fn geometry(&self, count: usize) -> LaunchGeometry {
        let span = self.span();
        LaunchGeometry {
            groups: count.div_ceil(span),
            group_size: self.group_size,
            elements_per_thread: self.elements_per_thread,
            count,
        }
    }

    /// Vectorization eligibility for element widths `widths` and `count` outputs.
    #[inline]
    pub fn vectorizable(&self, count: usize, widths: &[usize]) -> bool {
        self.vector_width > 1
            && count % self.vector_width == 0
            && widths.iter().all(|&w| w < self.wide_element_bytes)
    }
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            group_size: DEFAULT_GROUP_SIZE,
            elements_per_thread: DEFAULT_ELEMENTS_PER_THREAD,
            vector_width: DEFAULT_VECTOR_WIDTH,
            wide_element_bytes: DEFAULT_WIDE_ELEMENT_BYTES,
        }
    }
}

/// Grid computed for one launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchGeometry {
    pub groups: usize,
    pub group_size: usize,
    pub elements_per_thread: usize,
    /// Total output elements, `N`.
    pub count: usize,
}

impl LaunchGeometry {
    #[inline]
    pub fn span(&self) -> usize {
        self.group_size * self.elements_per_thread
    }

    /// Output range owned by group `g`. The last group may be short.
    #[inline]
    pub fn group_range(&self, g: usize) -> std::ops::Range<usize> {
        let start = g * self.span();
        start..(start + self.span()).min(self.count)
    }
}
