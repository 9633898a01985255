//! Copyright © 2025 Peter Garfield Bower. All rights reserved.
//!
//! # minbroadcast
//!
//! Broadcast-aware dispatch for elementwise binary kernels.
//!
//! Given a broadcast classification, padded strides and an output element
//! count, the [`Dispatcher`] picks the cheapest kernel that reproduces plain
//! broadcasting and launches it on a [`Stream`]:
//!
//! - matching shapes and scalar operands read operands directly, with a
//!   vectorized path for narrow element types,
//! - per-channel right operands index with one or two [`FastDivmod`]s,
//! - everything else walks the output coordinates with one [`FastDivmod`]
//!   per dimension.
//!
//! Every path writes each output element exactly once and produces the same
//! result as the naive evaluation.
//!
//! ```rust
//! use minbroadcast::{BroadcastArgs, SerialStream, binary_elementwise};
//!
//! // [2, 3, 4] feature map plus a [3] bias
//! let lhs: Vec<f32> = (0..24).map(|v| v as f32).collect();
//! let bias = [10.0f32, 20.0, 30.0];
//! let args = BroadcastArgs::right_per_channel_batch_n(4, 3).unwrap();
//! let mut out = vec![0.0f32; 24];
//! binary_elementwise(&SerialStream, &args, &lhs, &bias, &mut out, 24, |a, b| a + b);
//! assert_eq!(out[5], 25.0);
//! ```

pub mod enums {
    pub mod broadcast_kind;
    pub mod error;
    pub mod operand_indexing;
    pub mod operators;
}

pub mod structs {
    pub mod broadcast_args;
    pub mod fast_divmod;
    pub mod launch;
    #[cfg(feature = "parallel_proc")]
    pub mod launch_queue;
    pub mod strides;
}

pub mod traits {
    pub mod stream;
    pub mod type_unions;
}

pub mod kernels;

#[doc(hidden)]
pub mod test_support;

pub use enums::broadcast_kind::BroadcastKind;
pub use enums::error::KernelError;
pub use enums::operand_indexing::OperandIndexing;
pub use enums::operators::{ArithmeticOperator, ComparisonOperator};

pub use structs::broadcast_args::BroadcastArgs;
pub use structs::fast_divmod::{FAST_DIVMOD_MAX, FastDivmod};
pub use structs::launch::{LaunchConfig, LaunchGeometry};
#[cfg(feature = "parallel_proc")]
pub use structs::launch_queue::LaunchQueue;
pub use structs::strides::{MAX_RANK, StrideDescriptor};

#[cfg(feature = "parallel_proc")]
pub use traits::stream::RayonStream;
pub use traits::stream::{SerialStream, Stream};
pub use traits::type_unions::{Numeric, Primitive};

pub use kernels::routing::{
    Dispatcher, KernelVariant, LaunchPlan, binary_elementwise, binary_elementwise_no_broadcast,
};
#[cfg(feature = "planner")]
pub use kernels::routing::{
    BroadcastPlan, broadcast_binary, broadcast_binary_with, broadcast_shape,
    resolve_binary_arithmetic, resolve_binary_comparison,
};
