use std::fmt::{Debug, Display};

/// A trait that represents a type that can be used as a node value in this library.
///
/// Implementations for `f32` and `f64` are provided by the crate. Gradients are
/// always accumulated in `f64` regardless of the value type, so an implementation
/// only needs to say how a value widens into a gradient with `to_f64`.
///
/// This crate does not use popular trait libraries such as num-traits, so you need
/// to implement `is_zero` and `to_f64` yourself for a custom type.
pub trait Scalar:
    std::ops::Add<Self, Output = Self>
    + std::ops::Sub<Self, Output = Self>
    + std::ops::Mul<Self, Output = Self>
    + std::ops::Div<Self, Output = Self>
    + std::ops::Neg<Output = Self>
    + Copy
    + PartialEq
    + Default
    + Display
    + Debug
{
    fn is_zero(&self) -> bool;
    fn to_f64(&self) -> f64;
}

macro_rules! impl_scalar_float {
    ($ty:ty) => {
        impl Scalar for $ty {
            fn is_zero(&self) -> bool {
                *self == 0.
            }

            fn to_f64(&self) -> f64 {
                *self as f64
            }
        }
    };
}

impl_scalar_float!(f32);
impl_scalar_float!(f64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_zero_is_zero() {
        assert!((-0.0f64).is_zero());
        assert!((-0.0f32).is_zero());
        assert!(!f64::MIN_POSITIVE.is_zero());
    }

    #[test]
    fn widening() {
        assert_eq!(2.5f32.to_f64(), 2.5);
        assert_eq!(f32::MAX.to_f64(), f32::MAX as f64);
    }
}
