use num_traits::{Num, NumCast, ToPrimitive};

/// Trait for types valid as kernel elements, i.e., floats, integers, and booleans.
///
/// Useful when specifying `my_fn::<T: Primitive>() {}`.
///
/// `Send + Sync` because operands are read concurrently by every worker of a launch.
pub trait Primitive: Copy + Default + PartialEq + Send + Sync + 'static {
    /// Element width in bytes, used by the vectorization eligibility test.
    const WIDTH: usize = std::mem::size_of::<Self>();
}
impl Primitive for f32 {}
impl Primitive for f64 {}
impl Primitive for i8 {}
impl Primitive for i16 {}
impl Primitive for i32 {}
impl Primitive for i64 {}
impl Primitive for u8 {}
impl Primitive for u16 {}
impl Primitive for u32 {}
impl Primitive for u64 {}
impl Primitive for bool {}

/// Trait for types valid as numerical.
///
/// Useful when specifying `my_fn::<T: Numeric>() {}`.
///
/// Extends and constrains the *num-traits* `Num` implementation to fit the crate's type universe.
pub trait Numeric: Primitive + Num + NumCast + ToPrimitive {}
impl Numeric for f32 {}
impl Numeric for f64 {}
impl Numeric for i8 {}
impl Numeric for i16 {}
impl Numeric for i32 {}
impl Numeric for i64 {}
impl Numeric for u8 {}
impl Numeric for u16 {}
impl Numeric for u32 {}
impl Numeric for u64 {}
