// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # Dispatch Module
//!
//! Picks the kernel variant and launch geometry for one binary elementwise
//! operation and enqueues it on a stream.
//!
//! The dispatcher trusts its inputs. Buffer lengths, stride ranks and divisor
//! sizes are the planner's responsibility and are only `debug_assert!`ed
//! here; a violation in release builds panics on slice bounds.
//!
//! ```rust
//! use minbroadcast::{BroadcastArgs, SerialStream, binary_elementwise};
//!
//! let lhs: Vec<i32> = (0..12).collect();
//! let mut out = vec![0i32; 12];
//! binary_elementwise(&SerialStream, &BroadcastArgs::right_scalar(), &lhs, &[2], &mut out, 12, |a, b| a * b);
//! assert_eq!(out[11], 22);
//! ```

use tracing::{debug, trace};

use crate::enums::broadcast_kind::BroadcastKind;
use crate::enums::error::KernelError;
use crate::kernels::broadcast::{
    Contiguous, Splat, launch_direct, launch_general, launch_per_channel_batch_n,
    launch_per_channel_batch1,
};
use crate::structs::broadcast_args::BroadcastArgs;
use crate::structs::fast_divmod::FAST_DIVMOD_MAX;
use crate::structs::launch::{LaunchConfig, LaunchGeometry};
use crate::traits::stream::Stream;
use crate::traits::type_unions::Primitive;

/// Kernel chosen for a launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelVariant {
    /// Direct kernel with `width` elements per wide access.
    Vectorized { width: usize },
    /// Direct kernel, one element at a time.
    Direct,
    PerChannelBatch1,
    PerChannelBatchN,
    GeneralND { lhs_strided: bool, rhs_strided: bool },
}

/// Variant and grid for one launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchPlan {
    pub variant: KernelVariant,
    pub geometry: LaunchGeometry,
}

/// Kernel selection and launch under one set of tunables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dispatcher {
    config: LaunchConfig,
}

impl Dispatcher {
    pub fn new(config: LaunchConfig) -> Result<Self, KernelError> {
        config.validate()?;
        Ok(Self { config })
    }

    #[inline]
    pub fn config(&self) -> &LaunchConfig {
        &self.config
    }

    /// Kernel variant for `args` over `count` outputs of these element types.
    ///
    /// A general classification whose operands are both direct has nothing to
    /// walk, and is served by the direct kernel.
    pub fn select<T1, T2, T>(&self, args: &BroadcastArgs, count: usize) -> KernelVariant
    where
        T1: Primitive,
        T2: Primitive,
        T: Primitive,
    {
        match args.kind {
            BroadcastKind::NoBroadcast | BroadcastKind::LeftScalar | BroadcastKind::RightScalar => {
                if self.config.vectorizable(count, &[T1::WIDTH, T2::WIDTH, T::WIDTH]) {
                    KernelVariant::Vectorized {
                        width: self.config.vector_width,
                    }
                } else {
                    KernelVariant::Direct
                }
            }
            BroadcastKind::RightPerChannelBatch1 => KernelVariant::PerChannelBatch1,
            BroadcastKind::RightPerChannelBatchN => KernelVariant::PerChannelBatchN,
            BroadcastKind::GeneralND => {
                let (lhs_strided, rhs_strided) = (args.lhs.is_strided(), args.rhs.is_strided());
                if lhs_strided || rhs_strided {
                    KernelVariant::GeneralND {
                        lhs_strided,
                        rhs_strided,
                    }
                } else {
                    KernelVariant::Direct
                }
            }
        }
    }

    /// Variant and grid, or `None` when there is nothing to launch.
    pub fn plan<T1, T2, T>(&self, args: &BroadcastArgs, count: usize) -> Option<LaunchPlan>
    where
        T1: Primitive,
        T2: Primitive,
        T: Primitive,
    {
        if count == 0 {
            return None;
        }
        Some(LaunchPlan {
            variant: self.select::<T1, T2, T>(args, count),
            geometry: self.config.geometry(count),
        })
    }

    /// Enqueues `output[i] = f(lhs[..], rhs[..])` for `i in 0..count`.
    ///
    /// `count == 0` is a no-op: nothing is launched and `output` is untouched.
    /// Elements of `output` past `count` are never written.
    #[allow(clippy::too_many_arguments)]
    pub fn dispatch<S, T1, T2, T, F>(
        &self,
        stream: &S,
        args: &BroadcastArgs,
        lhs: &[T1],
        rhs: &[T2],
        output: &mut [T],
        count: usize,
        f: F,
    ) where
        S: Stream,
        T1: Primitive,
        T2: Primitive,
        T: Primitive,
        F: Fn(T1, T2) -> T + Sync,
    {
        let Some(plan) = self.plan::<T1, T2, T>(args, count) else {
            trace!(kind = %args.kind, "empty output, skipping launch");
            return;
        };
        debug!(
            kind = %args.kind,
            count,
            groups = plan.geometry.groups,
            variant = ?plan.variant,
            "binary elementwise launch"
        );
        debug_assert!(
            count <= FAST_DIVMOD_MAX as usize,
            "element count {count} exceeds the fast divmod range (i32::MAX)"
        );
        debug_assert!(output.len() >= count, "output shorter than element count");
        let output = &mut output[..count];
        let geometry = &plan.geometry;

        match plan.variant {
            KernelVariant::Vectorized { width } => {
                Self::launch_direct_kind(stream, geometry, Some(width), args.kind, lhs, rhs, output, &f)
            }
            KernelVariant::Direct => {
                Self::launch_direct_kind(stream, geometry, None, args.kind, lhs, rhs, output, &f)
            }
            KernelVariant::PerChannelBatch1 => {
                debug_assert!(lhs.len() >= count);
                launch_per_channel_batch1(stream, geometry, lhs, rhs, args.channel_divmod, output, &f)
            }
            KernelVariant::PerChannelBatchN => {
                debug_assert!(lhs.len() >= count);
                launch_per_channel_batch_n(
                    stream,
                    geometry,
                    lhs,
                    rhs,
                    args.channel_divmod,
                    args.batch_divmod,
                    output,
                    &f,
                )
            }
            KernelVariant::GeneralND {
                lhs_strided,
                rhs_strided,
            } => launch_general(
                stream,
                geometry,
                args,
                lhs_strided,
                rhs_strided,
                lhs,
                rhs,
                output,
                &f,
            ),
        }
    }

    /// Same as [`Dispatcher::dispatch`] with no broadcasting.
    pub fn dispatch_no_broadcast<S, T1, T2, T, F>(
        &self,
        stream: &S,
        lhs: &[T1],
        rhs: &[T2],
        output: &mut [T],
        count: usize,
        f: F,
    ) where
        S: Stream,
        T1: Primitive,
        T2: Primitive,
        T: Primitive,
        F: Fn(T1, T2) -> T + Sync,
    {
        self.dispatch(stream, &BroadcastArgs::no_broadcast(), lhs, rhs, output, count, f)
    }

    /// Binds the operand sources for the direct kinds. A direct general
    /// classification reads both operands at the output index.
    #[allow(clippy::too_many_arguments)]
    fn launch_direct_kind<S, T1, T2, T, F>(
        stream: &S,
        geometry: &LaunchGeometry,
        vector_width: Option<usize>,
        kind: BroadcastKind,
        lhs: &[T1],
        rhs: &[T2],
        output: &mut [T],
        f: &F,
    ) where
        S: Stream,
        T1: Primitive,
        T2: Primitive,
        T: Primitive,
        F: Fn(T1, T2) -> T + Sync,
    {
        match kind {
            BroadcastKind::LeftScalar => {
                debug_assert!(!lhs.is_empty() && rhs.len() >= geometry.count);
                launch_direct(stream, geometry, vector_width, Splat(lhs[0]), Contiguous(rhs), output, f)
            }
            BroadcastKind::RightScalar => {
                debug_assert!(!rhs.is_empty() && lhs.len() >= geometry.count);
                launch_direct(stream, geometry, vector_width, Contiguous(lhs), Splat(rhs[0]), output, f)
            }
            _ => {
                debug_assert!(lhs.len() >= geometry.count && rhs.len() >= geometry.count);
                launch_direct(stream, geometry, vector_width, Contiguous(lhs), Contiguous(rhs), output, f)
            }
        }
    }
}

/// Full broadcasting entry point with the default tunables.
pub fn binary_elementwise<S, T1, T2, T, F>(
    stream: &S,
    args: &BroadcastArgs,
    lhs: &[T1],
    rhs: &[T2],
    output: &mut [T],
    count: usize,
    f: F,
) where
    S: Stream,
    T1: Primitive,
    T2: Primitive,
    T: Primitive,
    F: Fn(T1, T2) -> T + Sync,
{
    Dispatcher::default().dispatch(stream, args, lhs, rhs, output, count, f)
}

/// Fast path for operands that already share the output shape.
pub fn binary_elementwise_no_broadcast<S, T1, T2, T, F>(
    stream: &S,
    lhs: &[T1],
    rhs: &[T2],
    output: &mut [T],
    count: usize,
    f: F,
) where
    S: Stream,
    T1: Primitive,
    T2: Primitive,
    T: Primitive,
    F: Fn(T1, T2) -> T + Sync,
{
    Dispatcher::default().dispatch_no_broadcast(stream, lhs, rhs, output, count, f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::operand_indexing::OperandIndexing;
    use crate::structs::strides::StrideDescriptor;
    use crate::test_support::RecordingStream;
    use crate::traits::stream::SerialStream;

    #[test]
    fn test_select_direct_kinds() {
        let d = Dispatcher::default();
        let scalar = BroadcastArgs::right_scalar();
        assert_eq!(
            d.select::<f32, f32, f32>(&scalar, 12),
            KernelVariant::Vectorized { width: 4 }
        );
        assert_eq!(d.select::<f32, f32, f32>(&scalar, 13), KernelVariant::Direct);
        assert_eq!(d.select::<f64, f64, f64>(&scalar, 12), KernelVariant::Direct);
        assert_eq!(d.select::<i32, i32, i64>(&scalar, 12), KernelVariant::Direct);
        assert_eq!(
            d.select::<f32, f32, bool>(&BroadcastArgs::no_broadcast(), 8),
            KernelVariant::Vectorized { width: 4 }
        );
    }

    #[test]
    fn test_select_broadcast_kinds() {
        let d = Dispatcher::default();
        let batch_n = BroadcastArgs::right_per_channel_batch_n(4, 3).unwrap();
        assert_eq!(d.select::<f32, f32, f32>(&batch_n, 24), KernelVariant::PerChannelBatchN);

        let rhs = StrideDescriptor::padded(&[1, 3], 2).unwrap();
        let general =
            BroadcastArgs::general(&[2, 3], OperandIndexing::Direct, OperandIndexing::Strided(rhs))
                .unwrap();
        assert_eq!(
            d.select::<f32, f32, f32>(&general, 6),
            KernelVariant::GeneralND {
                lhs_strided: false,
                rhs_strided: true
            }
        );

        let degenerate =
            BroadcastArgs::general(&[2, 3], OperandIndexing::Direct, OperandIndexing::Direct)
                .unwrap();
        assert_eq!(d.select::<f32, f32, f32>(&degenerate, 6), KernelVariant::Direct);
    }

    #[test]
    fn test_zero_count_launches_nothing() {
        let stream = RecordingStream::default();
        let mut out = vec![-1i32; 4];
        binary_elementwise(
            &stream,
            &BroadcastArgs::no_broadcast(),
            &[1, 2, 3, 4],
            &[1, 2, 3, 4],
            &mut out,
            0,
            |a: i32, b: i32| a + b,
        );
        assert_eq!(stream.launches(), 0);
        assert_eq!(out, vec![-1; 4]);
        assert!(Dispatcher::default().plan::<i32, i32, i32>(&BroadcastArgs::no_broadcast(), 0).is_none());
    }

    #[test]
    fn test_count_bounds_the_write() {
        let stream = RecordingStream::default();
        let mut out = vec![0u8; 6];
        binary_elementwise_no_broadcast(&stream, &[1u8; 6], &[2u8; 6], &mut out, 4, |a, b| a + b);
        assert_eq!(out, vec![3, 3, 3, 3, 0, 0]);
        assert_eq!(stream.launches(), 1);
    }

    #[test]
    fn test_scalar_multiply() {
        let lhs: Vec<i32> = (0..12).collect();
        let mut out = vec![0i32; 12];
        binary_elementwise(
            &SerialStream,
            &BroadcastArgs::right_scalar(),
            &lhs,
            &[2],
            &mut out,
            12,
            |a, b| a * b,
        );
        let expected: Vec<i32> = lhs.iter().map(|v| v * 2).collect();
        assert_eq!(out, expected);
    }

    #[test]
    fn test_left_scalar_subtract() {
        let rhs = [1.0f32, 2.0, 3.0];
        let mut out = [0.0f32; 3];
        binary_elementwise(
            &SerialStream,
            &BroadcastArgs::left_scalar(),
            &[10.0f32],
            &rhs,
            &mut out,
            3,
            |a, b| a - b,
        );
        assert_eq!(out, [9.0, 8.0, 7.0]);
    }

    #[test]
    fn test_custom_config_spans_many_groups() {
        let d = Dispatcher::new(LaunchConfig::new(3, 2, 2, 8).unwrap()).unwrap();
        let lhs: Vec<u16> = (0..50).collect();
        let rhs: Vec<u16> = (0..50).rev().collect();
        let stream = RecordingStream::default();
        let mut out = vec![0u16; 50];
        d.dispatch_no_broadcast(&stream, &lhs, &rhs, &mut out, 50, |a, b| a + b);
        assert!(out.iter().all(|&v| v == 49));
        assert_eq!(stream.launches(), 1);
        assert_eq!(stream.groups(), 9);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "exceeds the fast divmod range")]
    fn test_count_past_divmod_range_is_caught() {
        let mut out = [0u8; 4];
        let count = FAST_DIVMOD_MAX as usize + 1;
        binary_elementwise_no_broadcast(&SerialStream, &[1u8; 4], &[1u8; 4], &mut out, count, |a, b| a + b);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let cfg = LaunchConfig {
            vector_width: 5,
            ..LaunchConfig::default()
        };
        assert!(matches!(
            Dispatcher::new(cfg),
            Err(KernelError::InvalidLaunchConfig(_))
        ));
    }
}
