// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # Kernels Module
//!
//! Broadcast-aware binary elementwise kernels and the routing that picks one.

pub mod broadcast;
pub mod routing;
