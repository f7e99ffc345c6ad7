//! Quaternions.

use crate::{
    matrix::Matrix4,
    num::Float,
    vector::{Vector3, Vector4},
};
use bytemuck::{Pod, Zeroable};
use std::fmt;

/// A quaternion `w + xi + yj + zk` with real part `w` and imaginary part
/// `(x, y, z)`.
///
/// Only quaternions of unit norm represent rotations. The constructors for
/// rotations ([`Self::from_axis_angle`], [`Self::from_rotation_matrix`] etc.)
/// always produce unit quaternions, but component-wise addition and
/// subtraction do not preserve the norm, so the result must be
/// [normalized](Self::normalized) before it is used as a rotation.
///
/// The default quaternion is the identity rotation.
#[repr(C)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quaternion<T> {
    w: T,
    x: T,
    y: T,
    z: T,
}

pub type Quaternionf = Quaternion<f32>;
pub type Quaterniond = Quaternion<f64>;

// SAFETY: `Quaternion` is `repr(C)` with four fields of the same type, so it
// has no padding.
unsafe impl<T: Zeroable> Zeroable for Quaternion<T> {}
unsafe impl<T: Pod> Pod for Quaternion<T> {}

impl<T: Float> Quaternion<T> {
    /// Creates a quaternion with the given real part `w` and imaginary
    /// components `x`, `y` and `z`.
    #[inline]
    pub const fn new(w: T, x: T, y: T, z: T) -> Self {
        Self { w, x, y, z }
    }

    /// Creates a quaternion with the given real and imaginary parts.
    #[inline]
    pub fn from_parts(real: T, imag: Vector3<T>) -> Self {
        Self::new(real, imag.x(), imag.y(), imag.z())
    }

    /// Creates a quaternion with the given imaginary part and zero real part.
    #[inline]
    pub fn from_imag(imag: Vector3<T>) -> Self {
        Self::from_parts(T::ZERO, imag)
    }

    /// The identity rotation.
    #[inline]
    pub const fn identity() -> Self {
        Self::new(T::ONE, T::ZERO, T::ZERO, T::ZERO)
    }

    /// Creates the rotation by `angle` radians about `axis`, following the
    /// right-hand rule. The axis is normalized first, so it need not have
    /// unit length. A zero axis gives a non-finite quaternion.
    #[inline]
    pub fn from_axis_angle(axis: &Vector3<T>, angle: T) -> Self {
        let axis = axis.normalized();
        let (sin_half_angle, cos_half_angle) = (angle * T::ONE_HALF).sin_cos();
        Self::from_parts(cos_half_angle, &axis * sin_half_angle)
    }

    /// Creates the rotation given by the Euler angles, applied as a rotation
    /// of `roll` about the x-axis, then `pitch` about the y-axis, then `yaw`
    /// about the z-axis (all extrinsic).
    pub fn from_euler_angles(roll: T, pitch: T, yaw: T) -> Self {
        let (sr, cr) = (roll * T::ONE_HALF).sin_cos();
        let (sp, cp) = (pitch * T::ONE_HALF).sin_cos();
        let (sy, cy) = (yaw * T::ONE_HALF).sin_cos();

        Self::new(
            cr * cp * cy + sr * sp * sy,
            sr * cp * cy - cr * sp * sy,
            cr * sp * cy + sr * cp * sy,
            cr * cp * sy - sr * sp * cy,
        )
    }

    /// Creates the shortest rotation taking the direction of `a` to the
    /// direction of `b`.
    ///
    /// If the directions are parallel or anti-parallel (the absolute cosine
    /// of the angle between them is at least 0.999), the identity is returned.
    /// For anti-parallel input this is not a rotation from `a` to `b`, since
    /// the rotation axis is not unique.
    pub fn rotation_between(a: &Vector3<T>, b: &Vector3<T>) -> Self {
        let a = a.normalized();
        let b = b.normalized();
        let cos_angle = a.dot(&b);

        if cos_angle.abs() >= T::from_f64(0.999) {
            return Self::identity();
        }
        Self::from_parts(T::ONE + cos_angle, a.cross(&b)).normalized()
    }

    /// Extracts the rotation from the upper left 3x3 block of the given
    /// matrix, which should be orthonormal.
    ///
    /// The real part is computed from the trace and the imaginary part from
    /// the off-diagonal differences divided by `4w`. This loses precision when
    /// the trace term approaches zero, which happens for rotations near 180
    /// degrees, and breaks down entirely if it is not positive.
    pub fn from_rotation_matrix(matrix: &Matrix4<T>) -> Self {
        let m = matrix.as_slice();

        let trace_term = T::ONE + m[0] + m[5] + m[10];
        if trace_term <= T::ZERO {
            log::debug!(
                "Extracting quaternion from matrix with non-positive trace term {trace_term:?}"
            );
        }

        let w = trace_term.sqrt() * T::ONE_HALF;
        let inv_4w = T::ONE / (T::FOUR * w);

        Self::new(
            w,
            (m[6] - m[9]) * inv_4w,
            (m[8] - m[2]) * inv_4w,
            (m[1] - m[4]) * inv_4w,
        )
        .normalized()
    }

    /// The real part `w`.
    #[inline]
    pub const fn w(&self) -> T {
        self.w
    }

    /// The first imaginary component.
    #[inline]
    pub const fn x(&self) -> T {
        self.x
    }

    /// The second imaginary component.
    #[inline]
    pub const fn y(&self) -> T {
        self.y
    }

    /// The third imaginary component.
    #[inline]
    pub const fn z(&self) -> T {
        self.z
    }

    /// A mutable reference to the real component.
    #[inline]
    pub const fn w_mut(&mut self) -> &mut T {
        &mut self.w
    }

    /// A mutable reference to the first imaginary component.
    #[inline]
    pub const fn x_mut(&mut self) -> &mut T {
        &mut self.x
    }

    /// A mutable reference to the second imaginary component.
    #[inline]
    pub const fn y_mut(&mut self) -> &mut T {
        &mut self.y
    }

    /// A mutable reference to the third imaginary component.
    #[inline]
    pub const fn z_mut(&mut self) -> &mut T {
        &mut self.z
    }

    /// The real part of the quaternion.
    #[inline]
    pub const fn real(&self) -> T {
        self.w
    }

    /// The imaginary part of the quaternion.
    #[inline]
    pub const fn imag(&self) -> Vector3<T> {
        Vector3::new(self.x, self.y, self.z)
    }

    /// The components in `(x, y, z, w)` order.
    #[inline]
    pub const fn to_xyzw(&self) -> Vector4<T> {
        Vector4::new(self.x, self.y, self.z, self.w)
    }

    /// Returns the conjugate, which has the imaginary part negated. For unit
    /// quaternions this is the inverse rotation.
    #[inline]
    pub fn conjugate(&self) -> Self {
        Self::new(self.w, -self.x, -self.y, -self.z)
    }

    /// Returns the multiplicative inverse.
    #[inline]
    pub fn inverse(&self) -> Self {
        self.conjugate() / self.norm_squared()
    }

    /// Returns the quaternion with all components negated. This represents
    /// the same rotation.
    #[inline]
    pub fn negated(&self) -> Self {
        Self::new(-self.w, -self.x, -self.y, -self.z)
    }

    /// Computes the four-dimensional dot product.
    #[inline]
    pub fn dot(&self, other: &Self) -> T {
        self.w * other.w + self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Computes the squared norm.
    #[inline]
    pub fn norm_squared(&self) -> T {
        self.dot(self)
    }

    /// Computes the norm. Unit quaternions represent rotations.
    #[inline]
    pub fn norm(&self) -> T {
        self.norm_squared().sqrt()
    }

    /// Returns the quaternion divided by its norm. A zero quaternion gives
    /// NaN components.
    #[inline]
    pub fn normalized(&self) -> Self {
        self / self.norm()
    }

    /// Returns the normalized quaternion if its norm exceeds the given
    /// threshold. Otherwise, returns [`None`].
    pub fn normalized_if_above(&self, min_norm: T) -> Option<Self> {
        let norm_squared = self.norm_squared();
        if norm_squared > min_norm * min_norm {
            Some(self / norm_squared.sqrt())
        } else {
            log::trace!("Refusing to normalize quaternion {self:?} with norm not above {min_norm:?}");
            None
        }
    }

    /// Rotates the given vector. The quaternion is assumed to have unit norm.
    #[inline]
    pub fn transform_vector(&self, vector: &Vector3<T>) -> Vector3<T> {
        let imag = self.imag();
        let t = imag.cross(vector) * T::TWO;
        vector + t * self.w + imag.cross(&t)
    }

    /// Converts the rotation to a 4x4 matrix with no translation. The
    /// quaternion is assumed to have unit norm.
    #[inline]
    pub fn to_rotation_matrix(&self) -> Matrix4<T> {
        self.to_homogeneous_matrix(&Vector3::zeros())
    }

    /// Converts the rotation followed by the given translation to a 4x4
    /// matrix. The quaternion is assumed to have unit norm.
    pub fn to_homogeneous_matrix(&self, translation: &Vector3<T>) -> Matrix4<T> {
        let Self { w, x, y, z } = *self;
        let (one, two) = (T::ONE, T::TWO);

        Matrix4::from_row_major_elements([
            one - two * (y * y + z * z),
            two * (x * y - z * w),
            two * (x * z + y * w),
            translation.x(),
            two * (x * y + z * w),
            one - two * (x * x + z * z),
            two * (y * z - x * w),
            translation.y(),
            two * (x * z - y * w),
            two * (y * z + x * w),
            one - two * (x * x + y * y),
            translation.z(),
            T::ZERO,
            T::ZERO,
            T::ZERO,
            one,
        ])
    }

    /// Interpolates linearly between the components of `a` and `b` and
    /// normalizes the result.
    pub fn lerp(a: &Self, b: &Self, t: T) -> Self {
        (a + (b - a) * t).normalized()
    }

    /// Interpolates spherically between the unit quaternions `a` and `b`
    /// along the shorter arc, with constant angular velocity. Falls back to
    /// [`Self::lerp`] when the quaternions are nearly parallel.
    pub fn slerp(a: &Self, b: &Self, t: T) -> Self {
        let mut dot = a.dot(b);

        // Negating one quaternion gives the same rotation along the shorter
        // path
        let b = if dot < T::ZERO {
            dot = -dot;
            b.negated()
        } else {
            *b
        };

        let dot = dot.min(T::ONE);

        if dot > T::from_f64(0.9995) {
            return Self::lerp(a, &b, t);
        }

        let theta = dot.acos();
        let sin_theta = theta.sin();
        let s0 = ((T::ONE - t) * theta).sin() / sin_theta;
        let s1 = (t * theta).sin() / sin_theta;

        a * s0 + b * s1
    }
}

impl<T: Float> Default for Quaternion<T> {
    #[inline]
    fn default() -> Self {
        Self::identity()
    }
}

impl_binop!([T: Float], Add, add, Quaternion<T>, Quaternion<T>, Quaternion<T>, |a, b| {
    Quaternion::new(a.w + b.w, a.x + b.x, a.y + b.y, a.z + b.z)
});

impl_binop!([T: Float], Sub, sub, Quaternion<T>, Quaternion<T>, Quaternion<T>, |a, b| {
    Quaternion::new(a.w - b.w, a.x - b.x, a.y - b.y, a.z - b.z)
});

// Hamilton product. As a rotation, `a * b` applies `b` first.
impl_binop!([T: Float], Mul, mul, Quaternion<T>, Quaternion<T>, Quaternion<T>, |a, b| {
    Quaternion::new(
        a.w * b.w - a.x * b.x - a.y * b.y - a.z * b.z,
        a.w * b.x + a.x * b.w + a.y * b.z - a.z * b.y,
        a.w * b.y - a.x * b.z + a.y * b.w + a.z * b.x,
        a.w * b.z + a.x * b.y - a.y * b.x + a.z * b.w,
    )
});

impl_binop!([T: Float], Mul, mul, Quaternion<T>, Vector3<T>, Vector3<T>, |a, b| {
    a.transform_vector(b)
});

impl_binop!([T: Float], Mul, mul, Quaternion<T>, T, Quaternion<T>, |a, b| {
    Quaternion::new(a.w * *b, a.x * *b, a.y * *b, a.z * *b)
});

impl_binop!([T: Float], Div, div, Quaternion<T>, T, Quaternion<T>, |a, b| {
    Quaternion::new(a.w / *b, a.x / *b, a.y / *b, a.z / *b)
});

impl_scalar_lhs_mul!([], Quaternion<_>; f32, f64);

impl_binop_assign!([T: Float], AddAssign, add_assign, Quaternion<T>, Quaternion<T>, |a, b| {
    *a = &*a + b;
});

impl_binop_assign!([T: Float], SubAssign, sub_assign, Quaternion<T>, Quaternion<T>, |a, b| {
    *a = &*a - b;
});

impl_binop_assign!([T: Float], MulAssign, mul_assign, Quaternion<T>, Quaternion<T>, |a, b| {
    *a = &*a * b;
});

impl_binop_assign!([T: Float], MulAssign, mul_assign, Quaternion<T>, T, |a, b| {
    *a = &*a * b;
});

impl_unary_op!([T: Float], Neg, neg, Quaternion<T>, Quaternion<T>, |val| {
    val.negated()
});

impl_abs_diff_eq!([T: Float], Quaternion<T>, |a, b, epsilon| {
    a.w.abs_diff_eq(&b.w, epsilon)
        && a.x.abs_diff_eq(&b.x, epsilon)
        && a.y.abs_diff_eq(&b.y, epsilon)
        && a.z.abs_diff_eq(&b.z, epsilon)
});

impl_relative_eq!([T: Float], Quaternion<T>, |a, b, epsilon, max_relative| {
    a.w.relative_eq(&b.w, epsilon, max_relative)
        && a.x.relative_eq(&b.x, epsilon, max_relative)
        && a.y.relative_eq(&b.y, epsilon, max_relative)
        && a.z.relative_eq(&b.z, epsilon, max_relative)
});

/// Formats the quaternion as `(w; x, y, z)`, with two decimals unless another
/// precision is requested.
impl<T: Float + fmt::Display> fmt::Display for Quaternion<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let precision = f.precision().unwrap_or(2);
        write!(
            f,
            "({:.p$}; {:.p$}, {:.p$}, {:.p$})",
            self.w,
            self.x,
            self.y,
            self.z,
            p = precision
        )
    }
}
