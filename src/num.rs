//! Numbers and numerics.

use bytemuck::Pod;
use num_traits as nt;
use std::fmt::Debug;

/// Any numeric type that can be stored in a vector, matrix or quaternion.
///
/// Every scalar has an associated floating point type [`Scalar::Real`] that is
/// at least single precision. Quantities involving a square root (such as the
/// norm of a vector) are computed and returned in this type, so that they are
/// meaningful also for integer components.
pub trait Scalar:
    Copy
    + PartialEq
    + PartialOrd
    + Debug
    + Default
    + nt::Num
    + nt::NumAssign
    + nt::NumCast
    + Pod
    + 'static
{
    /// The floating point type used for quantities that are not closed under
    /// the component type.
    type Real: Float;

    /// Converts the value to the associated floating point type.
    fn to_real(self) -> Self::Real;
}

/// Gathers traits useful for working with generic floating point types.
pub trait Float:
    Scalar<Real = Self>
    + nt::Float
    + approx::AbsDiffEq<Epsilon = Self>
    + approx::RelativeEq
{
    const ZERO: Self;
    const ONE: Self;
    const NEG_ONE: Self;
    const TWO: Self;
    const FOUR: Self;
    const ONE_HALF: Self;
    const PI: Self;
    const FRAC_PI_2: Self;

    /// Converts a double precision constant to this type, rounding if needed.
    fn from_f64(value: f64) -> Self;
}

macro_rules! impl_float {
    ($f:tt) => {
        impl Scalar for $f {
            type Real = Self;

            #[inline]
            fn to_real(self) -> Self {
                self
            }
        }

        impl Float for $f {
            const ZERO: Self = 0.0;
            const ONE: Self = 1.0;
            const NEG_ONE: Self = -1.0;
            const TWO: Self = 2.0;
            const FOUR: Self = 4.0;
            const ONE_HALF: Self = 0.5;
            const PI: Self = std::$f::consts::PI;
            const FRAC_PI_2: Self = std::$f::consts::FRAC_PI_2;

            #[inline]
            #[allow(clippy::cast_possible_truncation)]
            fn from_f64(value: f64) -> Self {
                value as $f
            }
        }
    };
}

macro_rules! impl_integer_scalar {
    ($($i:ty),*) => {
        $(
            impl Scalar for $i {
                type Real = f32;

                #[inline]
                #[allow(clippy::cast_precision_loss)]
                fn to_real(self) -> f32 {
                    self as f32
                }
            }
        )*
    };
}

impl_float!(f32);
impl_float!(f64);

impl_integer_scalar!(i8, i16, i32, i64, u8, u16, u32, u64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converting_integers_to_real_gives_f32() {
        let real: f32 = 7_i32.to_real();
        assert_eq!(real, 7.0);
        let real: f32 = 255_u8.to_real();
        assert_eq!(real, 255.0);
    }

    #[test]
    fn converting_floats_to_real_is_identity() {
        assert_eq!(1.5_f32.to_real(), 1.5_f32);
        assert_eq!(0.1_f64.to_real(), 0.1_f64);
    }

    #[test]
    fn float_constants_have_expected_values() {
        assert_eq!(<f64 as Float>::TWO * <f64 as Float>::ONE_HALF, 1.0);
        assert_eq!(<f32 as Float>::PI, std::f32::consts::PI);
        assert_eq!(<f64 as Float>::NEG_ONE + <f64 as Float>::ONE, 0.0);
        assert_eq!(<f32 as Float>::from_f64(0.25), 0.25_f32);
    }
}
