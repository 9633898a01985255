// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # Routing Module
//!
//! Kernel selection and launch, plus the reference planner and allocating
//! entry points built on top of it.

#[cfg(feature = "planner")]
pub mod arithmetic;
#[cfg(feature = "planner")]
pub mod binary_map;
#[cfg(feature = "planner")]
pub mod broadcast;
pub mod dispatch;

#[cfg(feature = "planner")]
pub use arithmetic::{resolve_binary_arithmetic, resolve_binary_comparison};
#[cfg(feature = "planner")]
pub use binary_map::{broadcast_binary, broadcast_binary_with};
#[cfg(feature = "planner")]
pub use broadcast::{BroadcastPlan, broadcast_shape};
pub use dispatch::{
    Dispatcher, KernelVariant, LaunchPlan, binary_elementwise, binary_elementwise_no_broadcast,
};
