// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # Broadcast Kernel Variants
//!
//! One parallel execution strategy per broadcast classification.
//!
//! Every variant partitions `[0, N)` into thread-group spans through the
//! [`Stream`](crate::traits::stream::Stream), and every output element is
//! written exactly once by the group that owns it. Variants never read
//! another group's results, so there is no synchronization inside a launch.
//!
//! - [`direct`]: no broadcast and scalar operands, with a vectorized sub-variant.
//! - [`per_channel`]: right operand broadcast per channel, batch 1 or N.
//! - [`general`]: arbitrary N-D broadcasting via fast divmod coordinate walks.

pub mod direct;
pub mod general;
pub mod per_channel;

pub use direct::{Contiguous, Source, Splat, launch_direct};
pub use general::launch_general;
pub use per_channel::{launch_per_channel_batch1, launch_per_channel_batch_n};
