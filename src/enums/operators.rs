// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # Operators Module
//!
//! Ready-made elementwise functors. The kernels treat every functor as an
//! opaque pure `Fn(T1, T2) -> T`; these enums are a convenience for callers
//! that select the operation at runtime.
//!
//! ```rust
//! use minbroadcast::ArithmeticOperator;
//!
//! let add = ArithmeticOperator::Add.functor::<i32>();
//! assert_eq!(add(2, 3), 5);
//! ```

use crate::traits::type_unions::{Numeric, Primitive};

/// Arithmetic operators producing the operand type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithmeticOperator {
    Add,
    Subtract,
    Multiply,
    /// Integer division by zero panics, as with the native operator.
    Divide,
    Remainder,
}

impl ArithmeticOperator {
    #[inline(always)]
    pub fn apply<T: Numeric>(self, lhs: T, rhs: T) -> T {
        match self {
            ArithmeticOperator::Add => lhs + rhs,
            ArithmeticOperator::Subtract => lhs - rhs,
            ArithmeticOperator::Multiply => lhs * rhs,
            ArithmeticOperator::Divide => lhs / rhs,
            ArithmeticOperator::Remainder => lhs % rhs,
        }
    }

    /// Monomorphic closure for one operator, so the match is resolved once
    /// per launch rather than per element.
    pub fn functor<T: Numeric>(self) -> fn(T, T) -> T {
        match self {
            ArithmeticOperator::Add => |a, b| a + b,
            ArithmeticOperator::Subtract => |a, b| a - b,
            ArithmeticOperator::Multiply => |a, b| a * b,
            ArithmeticOperator::Divide => |a, b| a / b,
            ArithmeticOperator::Remainder => |a, b| a % b,
        }
    }
}

/// Comparison operators producing `bool`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOperator {
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

impl ComparisonOperator {
    #[inline(always)]
    pub fn apply<T: Primitive + PartialOrd>(self, lhs: T, rhs: T) -> bool {
        match self {
            ComparisonOperator::Equal => lhs == rhs,
            ComparisonOperator::NotEqual => lhs != rhs,
            ComparisonOperator::Less => lhs < rhs,
            ComparisonOperator::LessEqual => lhs <= rhs,
            ComparisonOperator::Greater => lhs > rhs,
            ComparisonOperator::GreaterEqual => lhs >= rhs,
        }
    }

    pub fn functor<T: Primitive + PartialOrd>(self) -> fn(T, T) -> bool {
        match self {
            ComparisonOperator::Equal => |a, b| a == b,
            ComparisonOperator::NotEqual => |a, b| a != b,
            ComparisonOperator::Less => |a, b| a < b,
            ComparisonOperator::LessEqual => |a, b| a <= b,
            ComparisonOperator::Greater => |a, b| a > b,
            ComparisonOperator::GreaterEqual => |a, b| a >= b,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arithmetic_apply_matches_functor() {
        let ops = [
            ArithmeticOperator::Add,
            ArithmeticOperator::Subtract,
            ArithmeticOperator::Multiply,
            ArithmeticOperator::Divide,
            ArithmeticOperator::Remainder,
        ];
        for op in ops {
            let f = op.functor::<i64>();
            assert_eq!(op.apply(17i64, 5), f(17, 5), "{op:?}");
        }
        assert_eq!(ArithmeticOperator::Remainder.apply(17i64, 5), 2);
        assert_eq!(ArithmeticOperator::Divide.apply(7.0f32, 2.0), 3.5);
    }

    #[test]
    fn test_comparisons() {
        assert!(ComparisonOperator::Less.apply(1.0f64, 2.0));
        assert!(!ComparisonOperator::Greater.apply(1u8, 2));
        assert!(ComparisonOperator::GreaterEqual.functor::<i16>()(3, 3));
        // NaN compares unequal to itself
        assert!(ComparisonOperator::NotEqual.apply(f32::NAN, f32::NAN));
    }
}
