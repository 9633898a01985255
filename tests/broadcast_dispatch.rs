//! End-to-end checks of every kernel variant against the naive reference.

use minbroadcast::test_support::{RecordingStream, naive_broadcast};
use minbroadcast::{
    BroadcastArgs, BroadcastKind, BroadcastPlan, Dispatcher, KernelVariant, LaunchConfig,
    OperandIndexing, SerialStream, StrideDescriptor, binary_elementwise, broadcast_binary,
    broadcast_binary_with,
};
use proptest::prelude::*;

/// `RUST_LOG=minbroadcast=trace cargo test` shows each launch.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn general_args(out_shape: &[usize], lhs_shape: &[usize], rhs_shape: &[usize]) -> BroadcastArgs {
    let rank = out_shape.len();
    BroadcastArgs::general(
        out_shape,
        OperandIndexing::Strided(StrideDescriptor::padded(lhs_shape, rank).unwrap()),
        OperandIndexing::Strided(StrideDescriptor::padded(rhs_shape, rank).unwrap()),
    )
    .unwrap()
}

#[test]
fn per_channel_batch_n_bias() {
    init_tracing();
    let lhs: Vec<i32> = (0..24).collect();
    let rhs = [10, 20, 30];
    let args = BroadcastArgs::right_per_channel_batch_n(4, 3).unwrap();
    let mut out = vec![0i32; 24];
    binary_elementwise(&SerialStream, &args, &lhs, &rhs, &mut out, 24, |a, b| a + b);

    assert_eq!(out[5], 25);
    for (i, v) in out.iter().enumerate() {
        assert_eq!(*v, lhs[i] + rhs[(i / 4) % 3]);
    }
}

#[test]
fn general_nd_outer_sum() {
    let lhs: Vec<i32> = (0..8).collect();
    let rhs = [100, 200, 300];
    let args = general_args(&[2, 3, 4], &[2, 1, 4], &[1, 3, 1]);
    let mut out = vec![0i32; 24];
    binary_elementwise(&SerialStream, &args, &lhs, &rhs, &mut out, 24, |a, b| a + b);

    // output[1, 2, 3]
    assert_eq!(out[12 + 8 + 3], 307);
    let (expected, _) = naive_broadcast(&lhs, &[2, 1, 4], &rhs, &[1, 3, 1], |a, b| a + b);
    assert_eq!(out, expected);
}

#[test]
fn right_scalar_multiply() {
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
    assert_eq!(out, lhs.iter().map(|v| v * 2).collect::<Vec<_>>());
}

#[test]
fn scalar_kinds_match_general_with_zero_strides() {
    let lhs: Vec<f32> = (0..12).map(|v| v as f32 * 1.25).collect();
    let scalar = [3.0f32];
    let f = |a: f32, b: f32| a / b - a;

    let mut fast = vec![0.0f32; 12];
    binary_elementwise(&SerialStream, &BroadcastArgs::right_scalar(), &lhs, &scalar, &mut fast, 12, f);

    let mut walked = vec![0.0f32; 12];
    let args = general_args(&[3, 4], &[3, 4], &[1, 1]);
    assert_eq!(args.rhs.strides().unwrap().as_slice(), &[0, 0]);
    binary_elementwise(&SerialStream, &args, &lhs, &scalar, &mut walked, 12, f);
    assert_eq!(fast, walked);

    let mut left_fast = vec![0.0f32; 12];
    binary_elementwise(&SerialStream, &BroadcastArgs::left_scalar(), &scalar, &lhs, &mut left_fast, 12, f);
    let mut left_walked = vec![0.0f32; 12];
    let args = general_args(&[3, 4], &[1, 1], &[3, 4]);
    binary_elementwise(&SerialStream, &args, &scalar, &lhs, &mut left_walked, 12, f);
    assert_eq!(left_fast, left_walked);
}

#[test]
fn per_channel_kinds_match_general() {
    let lhs: Vec<i64> = (0..60).map(|v| v * 7 - 100).collect();
    let rhs: Vec<i64> = vec![3, -4, 5];
    let f = |a: i64, b: i64| a * b + 1;

    // [1, 3, 20] against [3, 1]
    let mut fast = vec![0i64; 60];
    let args = BroadcastArgs::right_per_channel_batch1(20).unwrap();
    binary_elementwise(&SerialStream, &args, &lhs, &rhs, &mut fast, 60, f);
    let mut walked = vec![0i64; 60];
    let args = general_args(&[1, 3, 20], &[1, 3, 20], &[1, 3, 1]);
    binary_elementwise(&SerialStream, &args, &lhs, &rhs, &mut walked, 60, f);
    assert_eq!(fast, walked);

    // [4, 3, 5] against [3, 1]
    let mut fast = vec![0i64; 60];
    let args = BroadcastArgs::right_per_channel_batch_n(5, 3).unwrap();
    binary_elementwise(&SerialStream, &args, &lhs, &rhs, &mut fast, 60, f);
    let mut walked = vec![0i64; 60];
    let args = general_args(&[4, 3, 5], &[4, 3, 5], &[1, 3, 1]);
    binary_elementwise(&SerialStream, &args, &lhs, &rhs, &mut walked, 60, f);
    assert_eq!(fast, walked);
}

#[test]
fn vectorized_matches_scalar_loop() {
    let vectorized = Dispatcher::default();
    let scalar_only = Dispatcher::new(LaunchConfig::new(256, 4, 1, 8).unwrap()).unwrap();
    let lhs: Vec<i16> = (0..4096).map(|v| (v % 311) as i16).collect();
    let rhs: Vec<i16> = (0..4096).map(|v| (v % 17) as i16 - 8).collect();
    let args = BroadcastArgs::no_broadcast();
    assert_eq!(
        vectorized.select::<i16, i16, i16>(&args, 4096),
        KernelVariant::Vectorized { width: 4 }
    );
    assert_eq!(scalar_only.select::<i16, i16, i16>(&args, 4096), KernelVariant::Direct);

    let f = |a: i16, b: i16| a.wrapping_mul(b).wrapping_sub(a);
    let mut a = vec![0i16; 4096];
    let mut b = vec![0i16; 4096];
    vectorized.dispatch(&SerialStream, &args, &lhs, &rhs, &mut a, 4096, f);
    scalar_only.dispatch(&SerialStream, &args, &lhs, &rhs, &mut b, 4096, f);
    assert_eq!(a, b);
}

#[test]
fn wide_types_take_scalar_loop() {
    let d = Dispatcher::default();
    let args = BroadcastArgs::left_scalar();
    assert_eq!(d.select::<f64, f64, f64>(&args, 16), KernelVariant::Direct);
    assert_eq!(d.select::<u64, u8, u8>(&args, 16), KernelVariant::Direct);
    assert_eq!(d.select::<u8, u8, u8>(&args, 16), KernelVariant::Vectorized { width: 4 });
}

#[test]
fn zero_count_is_a_no_op() {
    let stream = RecordingStream::default();
    let mut out = vec![9u8; 3];
    let args = general_args(&[2, 0, 3], &[2, 1, 3], &[1, 0, 1]);
    binary_elementwise(&stream, &args, &[1u8; 6], &[], &mut out, 0, |a: u8, b: u8| a + b);
    assert_eq!(stream.launches(), 0);
    assert_eq!(out, vec![9, 9, 9]);
}

#[test]
fn planner_kinds_over_common_shapes() {
    let cases: &[(&[usize], &[usize], BroadcastKind)] = &[
        (&[3, 4], &[3, 4], BroadcastKind::NoBroadcast),
        (&[], &[3, 4], BroadcastKind::LeftScalar),
        (&[3, 4], &[1, 1], BroadcastKind::RightScalar),
        (&[1, 8, 5, 5], &[8, 1, 1], BroadcastKind::RightPerChannelBatch1),
        (&[2, 8, 5, 5], &[8, 1, 1], BroadcastKind::RightPerChannelBatchN),
        (&[2, 1, 5], &[3, 1], BroadcastKind::GeneralND),
    ];
    for (l, r, kind) in cases {
        let plan = BroadcastPlan::new(l, r).unwrap();
        assert_eq!(plan.kind(), *kind, "{l:?} vs {r:?}");
    }
}

#[test]
fn many_groups_cover_every_element_once() {
    init_tracing();
    let d = Dispatcher::new(LaunchConfig::new(8, 2, 2, 8).unwrap()).unwrap();
    let stream = RecordingStream::default();
    let lhs: Vec<u32> = (0..1000).collect();
    let rhs: Vec<u32> = (0..10).collect();
    let (out, shape) =
        broadcast_binary_with(&d, &stream, &lhs, &[100, 10], &rhs, &[10], |a, b| a * 10 + b).unwrap();
    assert_eq!(shape, vec![100, 10]);
    assert_eq!(stream.launches(), 1);
    assert_eq!(stream.groups(), 1000usize.div_ceil(16));
    let (expected, _) = naive_broadcast(&lhs, &[100, 10], &rhs, &[10], |a, b| a * 10 + b);
    assert_eq!(out.as_slice(), expected.as_slice());
}

#[cfg(feature = "parallel_proc")]
#[test]
fn rayon_stream_matches_serial() {
    use minbroadcast::RayonStream;

    let lhs: Vec<f32> = (0..2 * 16 * 33).map(|v| v as f32).collect();
    let rhs: Vec<f32> = (0..16).map(|v| v as f32 * 0.5).collect();
    let (serial, _) =
        broadcast_binary(&SerialStream, &lhs, &[2, 16, 33], &rhs, &[16, 1], |a, b| a - b).unwrap();
    let (parallel, _) =
        broadcast_binary(&RayonStream::new(), &lhs, &[2, 16, 33], &rhs, &[16, 1], |a, b| a - b)
            .unwrap();
    assert_eq!(serial.as_slice(), parallel.as_slice());
}

/// Shape pairs that broadcast: each dim is shared, or 1 on one side.
fn broadcastable_shapes() -> impl Strategy<Value = (Vec<usize>, Vec<usize>)> {
    prop::collection::vec((1usize..5, 0u8..4), 0..=5).prop_flat_map(|dims| {
        let lhs: Vec<usize> = dims
            .iter()
            .map(|&(d, mode)| if mode == 1 { 1 } else { d })
            .collect();
        let rhs: Vec<usize> = dims
            .iter()
            .map(|&(d, mode)| if mode == 2 { 1 } else { d })
            .collect();
        (0..=rhs.len()).prop_map(move |drop| (lhs.clone(), rhs[drop..].to_vec()))
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_any_broadcast_matches_naive((lhs_shape, rhs_shape) in broadcastable_shapes()) {
        let ln: usize = lhs_shape.iter().product();
        let rn: usize = rhs_shape.iter().product();
        let lhs: Vec<i32> = (0..ln as i32).map(|v| v * 3 - 7).collect();
        let rhs: Vec<i32> = (0..rn as i32).map(|v| 11 - v).collect();
        let f = |a: i32, b: i32| a * 31 + b;

        let (expected, expected_shape) = naive_broadcast(&lhs, &lhs_shape, &rhs, &rhs_shape, f);
        let (out, shape) = broadcast_binary(&SerialStream, &lhs, &lhs_shape, &rhs, &rhs_shape, f).unwrap();
        prop_assert_eq!(shape, expected_shape);
        prop_assert_eq!(out.as_slice(), expected.as_slice());

        // Swapped operands exercise the left-side strided and scalar paths
        let (expected, _) = naive_broadcast(&rhs, &rhs_shape, &lhs, &lhs_shape, f);
        let (out, _) = broadcast_binary(&SerialStream, &rhs, &rhs_shape, &lhs, &lhs_shape, f).unwrap();
        prop_assert_eq!(out.as_slice(), expected.as_slice());
    }

    #[test]
    fn prop_general_walk_matches_planned_kernel((lhs_shape, rhs_shape) in broadcastable_shapes()) {
        let plan = BroadcastPlan::new(&lhs_shape, &rhs_shape).unwrap();
        let out_shape = plan.output_shape.clone();
        let ln: usize = lhs_shape.iter().product();
        let rn: usize = rhs_shape.iter().product();
        let lhs: Vec<u16> = (0..ln as u16).collect();
        let rhs: Vec<u16> = (0..rn as u16).map(|v| v.wrapping_mul(3)).collect();
        let f = |a: u16, b: u16| a.wrapping_add(b.wrapping_mul(5));

        let mut planned = vec![0u16; plan.count];
        binary_elementwise(&SerialStream, &plan.args, &lhs, &rhs, &mut planned, plan.count, f);

        let mut walked = vec![0u16; plan.count];
        let args = general_args(&out_shape, &lhs_shape, &rhs_shape);
        binary_elementwise(&SerialStream, &args, &lhs, &rhs, &mut walked, plan.count, f);
        prop_assert_eq!(planned, walked);
    }
}
