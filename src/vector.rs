//! Vectors.

use crate::num::{Float, Scalar};
use anyhow::{Result, bail};
use bytemuck::{Pod, Zeroable};
use num_traits as nt;
use std::{
    fmt,
    ops::{Index, IndexMut, Neg},
};

/// A vector with `N` components of type `T`.
///
/// The components are stored contiguously in a single array, and the named
/// accessors (`x`/`y`/`z`/`w` and the color aliases `r`/`g`/`b`/`a`) are
/// different views of the same storage slots. Swizzles like
/// [`Vector3::zyx`] always return new vectors and never alias the source.
#[repr(transparent)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[derive(Clone, Copy, PartialEq)]
pub struct Vector<T, const N: usize> {
    components: [T; N],
}

/// A 2-dimensional vector.
pub type Vector2<T> = Vector<T, 2>;

/// A 3-dimensional vector.
pub type Vector3<T> = Vector<T, 3>;

/// A 4-dimensional vector.
pub type Vector4<T> = Vector<T, 4>;

pub type Vector2f = Vector2<f32>;
pub type Vector3f = Vector3<f32>;
pub type Vector4f = Vector4<f32>;

pub type Vector2d = Vector2<f64>;
pub type Vector3d = Vector3<f64>;
pub type Vector4d = Vector4<f64>;

pub type Vector2i = Vector2<i32>;
pub type Vector3i = Vector3<i32>;
pub type Vector4i = Vector4<i32>;

pub type Vector2u = Vector2<u32>;
pub type Vector3u = Vector3<u32>;
pub type Vector4u = Vector4<u32>;

// SAFETY: `Vector` is a transparent wrapper around `[T; N]`, which is
// zeroable and plain-old-data whenever `T` is.
unsafe impl<T: Zeroable, const N: usize> Zeroable for Vector<T, N> {}
unsafe impl<T: Pod, const N: usize> Pod for Vector<T, N> {}

impl<T: Scalar, const N: usize> Vector<T, N> {
    /// The number of components.
    pub const DIMENSION: usize = N;

    /// Creates a vector with the given components.
    #[inline]
    pub const fn from_array(components: [T; N]) -> Self {
        Self { components }
    }

    /// Creates a new vector with all zeros.
    #[inline]
    pub fn zeros() -> Self {
        Self::same(T::zero())
    }

    /// Creates a new vector with the same value for all components.
    #[inline]
    pub const fn same(value: T) -> Self {
        Self::from_array([value; N])
    }

    /// Creates a vector whose component `i` is `f(i)`.
    #[inline]
    pub fn from_fn(f: impl FnMut(usize) -> T) -> Self {
        Self::from_array(std::array::from_fn(f))
    }

    /// The components as an array.
    #[inline]
    pub const fn to_array(&self) -> [T; N] {
        self.components
    }

    /// A reference to the component array.
    #[inline]
    pub const fn as_array(&self) -> &[T; N] {
        &self.components
    }

    /// The components as a slice, in storage order.
    #[inline]
    pub const fn as_slice(&self) -> &[T] {
        &self.components
    }

    /// The components as a mutable slice, in storage order.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.components
    }

    /// Computes the dot product of this vector with another.
    #[inline]
    pub fn dot(&self, other: &Self) -> T {
        self.components
            .iter()
            .zip(&other.components)
            .fold(T::zero(), |sum, (&a, &b)| sum + a * b)
    }

    /// Computes the square of the norm of the vector. This avoids the square
    /// root and stays in the component type.
    #[inline]
    pub fn norm_squared(&self) -> T {
        self.dot(self)
    }

    /// Computes the norm (length) of the vector.
    ///
    /// The computation is done in [`Scalar::Real`], so the result is at least
    /// single precision also for integer vectors.
    #[inline]
    pub fn norm(&self) -> T::Real {
        let norm_squared = self
            .components
            .iter()
            .fold(<T::Real as Float>::ZERO, |sum, &c| {
                let c = c.to_real();
                sum + c * c
            });
        nt::Float::sqrt(norm_squared)
    }

    /// Computes the distance between this vector and another, treating both as
    /// points.
    #[inline]
    pub fn distance(&self, other: &Self) -> T::Real {
        (other - self).norm()
    }

    /// Multiplies each component by the corresponding component in another
    /// vector.
    #[inline]
    pub fn component_mul(&self, other: &Self) -> Self {
        self.zip_map(other, |a, b| a * b)
    }

    /// Returns a vector where each component is the minimum of the
    /// corresponding component in this and another vector.
    #[inline]
    pub fn component_min(&self, other: &Self) -> Self {
        self.zip_map(other, |a, b| if b < a { b } else { a })
    }

    /// Returns a vector where each component is the maximum of the
    /// corresponding component in this and another vector.
    #[inline]
    pub fn component_max(&self, other: &Self) -> Self {
        self.zip_map(other, |a, b| if b > a { b } else { a })
    }

    /// Returns a vector with the given closure applied to each component.
    #[inline]
    pub fn mapped(&self, f: impl FnMut(T) -> T) -> Self {
        Self::from_array(self.components.map(f))
    }

    /// Returns the smallest component in the vector.
    #[inline]
    pub fn min_component(&self) -> T {
        self.components
            .iter()
            .copied()
            .fold(self.components[0], |min, c| if c < min { c } else { min })
    }

    /// Returns the largest component in the vector.
    #[inline]
    pub fn max_component(&self) -> T {
        self.components
            .iter()
            .copied()
            .fold(self.components[0], |max, c| if c > max { c } else { max })
    }

    /// Creates a new vector by picking the components at the given indices, in
    /// the given order. Indices may repeat.
    ///
    /// # Panics
    /// If any index is not smaller than `N`.
    #[inline]
    pub fn swizzle<const M: usize>(&self, indices: [usize; M]) -> Vector<T, M> {
        Vector::from_array(indices.map(|i| self.components[i]))
    }

    #[inline]
    fn zip_map(&self, other: &Self, mut f: impl FnMut(T, T) -> T) -> Self {
        Self::from_fn(|i| f(self.components[i], other.components[i]))
    }
}

impl<T: Float, const N: usize> Vector<T, N> {
    /// Computes the normalized version of the vector.
    ///
    /// The vector is divided by its norm without any check, so a zero vector
    /// gives NaN components. Use [`Self::normalized_if_above`] when the input
    /// may be degenerate.
    #[inline]
    pub fn normalized(&self) -> Self {
        self / self.norm()
    }

    /// Computes the normalized version of the vector if its norm exceeds the
    /// given threshold. Otherwise, returns [`None`].
    #[inline]
    pub fn normalized_if_above(&self, min_norm: T) -> Option<Self> {
        let norm_squared = self.norm_squared();
        if norm_squared > min_norm * min_norm {
            Some(self / norm_squared.sqrt())
        } else {
            log::trace!("Refusing to normalize vector {self:?} with norm not above {min_norm:?}");
            None
        }
    }

    /// Whether all components are finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.components.iter().all(|c| c.is_finite())
    }
}

macro_rules! component_accessors {
    ($($name:ident, $name_mut:ident => $index:literal, $doc:literal;)*) => {
        $(
            #[doc = concat!("The ", $doc, ".")]
            #[inline]
            pub const fn $name(&self) -> T {
                self.components[$index]
            }

            #[doc = concat!("A mutable reference to the ", $doc, ".")]
            #[inline]
            pub const fn $name_mut(&mut self) -> &mut T {
                &mut self.components[$index]
            }
        )*
    };
}

macro_rules! swizzles {
    ($($name:ident => $n:literal [$($index:literal),*];)*) => {
        $(
            #[doc = concat!("Swizzle returning a new vector with the components `", stringify!($name), "`.")]
            #[inline]
            pub const fn $name(&self) -> Vector<T, $n> {
                Vector::from_array([$(self.components[$index]),*])
            }
        )*
    };
}

impl<T: Scalar> Vector2<T> {
    /// Creates a new vector with the given components.
    #[inline]
    pub const fn new(x: T, y: T) -> Self {
        Self::from_array([x, y])
    }

    /// The x-axis unit vector.
    #[inline]
    pub fn unit_x() -> Self {
        Self::new(T::one(), T::zero())
    }

    /// The y-axis unit vector.
    #[inline]
    pub fn unit_y() -> Self {
        Self::new(T::zero(), T::one())
    }

    component_accessors! {
        x, x_mut => 0, "x-component";
        y, y_mut => 1, "y-component";
        u, u_mut => 0, "u texture coordinate (same slot as x)";
        v, v_mut => 1, "v texture coordinate (same slot as y)";
        s, s_mut => 0, "s texture coordinate (same slot as x)";
        t, t_mut => 1, "t texture coordinate (same slot as y)";
    }

    swizzles! {
        yx => 2 [1, 0];
    }

    /// Converts the vector to 3D by appending the given z-component.
    #[inline]
    pub const fn extended(&self, z: T) -> Vector3<T> {
        Vector3::new(self.x(), self.y(), z)
    }
}

impl<T: Scalar> Vector3<T> {
    /// Creates a new vector with the given components.
    #[inline]
    pub const fn new(x: T, y: T, z: T) -> Self {
        Self::from_array([x, y, z])
    }

    /// The x-axis unit vector.
    #[inline]
    pub fn unit_x() -> Self {
        Self::new(T::one(), T::zero(), T::zero())
    }

    /// The y-axis unit vector.
    #[inline]
    pub fn unit_y() -> Self {
        Self::new(T::zero(), T::one(), T::zero())
    }

    /// The z-axis unit vector.
    #[inline]
    pub fn unit_z() -> Self {
        Self::new(T::zero(), T::zero(), T::one())
    }

    component_accessors! {
        x, x_mut => 0, "x-component";
        y, y_mut => 1, "y-component";
        z, z_mut => 2, "z-component";
        r, r_mut => 0, "red component (same slot as x)";
        g, g_mut => 1, "green component (same slot as y)";
        b, b_mut => 2, "blue component (same slot as z)";
    }

    swizzles! {
        xy => 2 [0, 1];
        yx => 2 [1, 0];
        xz => 2 [0, 2];
        zx => 2 [2, 0];
        yz => 2 [1, 2];
        zy => 2 [2, 1];
        rg => 2 [0, 1];
        gb => 2 [1, 2];
        xzy => 3 [0, 2, 1];
        yxz => 3 [1, 0, 2];
        yzx => 3 [1, 2, 0];
        zxy => 3 [2, 0, 1];
        zyx => 3 [2, 1, 0];
    }

    /// Computes the cross product of this vector with another.
    #[inline]
    pub fn cross(&self, other: &Self) -> Self {
        let (a, b) = (self, other);
        Self::new(
            a.y() * b.z() - a.z() * b.y(),
            a.z() * b.x() - a.x() * b.z(),
            a.x() * b.y() - a.y() * b.x(),
        )
    }

    /// Converts the vector to 4D by appending the given w-component.
    #[inline]
    pub const fn extended(&self, w: T) -> Vector4<T> {
        Vector4::new(self.x(), self.y(), self.z(), w)
    }

    /// Drops the z-component.
    #[inline]
    pub const fn truncated(&self) -> Vector2<T> {
        self.xy()
    }
}

impl<T: Scalar> Vector4<T> {
    /// Creates a new vector with the given components.
    #[inline]
    pub const fn new(x: T, y: T, z: T, w: T) -> Self {
        Self::from_array([x, y, z, w])
    }

    /// The x-axis unit vector.
    #[inline]
    pub fn unit_x() -> Self {
        Self::new(T::one(), T::zero(), T::zero(), T::zero())
    }

    /// The y-axis unit vector.
    #[inline]
    pub fn unit_y() -> Self {
        Self::new(T::zero(), T::one(), T::zero(), T::zero())
    }

    /// The z-axis unit vector.
    #[inline]
    pub fn unit_z() -> Self {
        Self::new(T::zero(), T::zero(), T::one(), T::zero())
    }

    /// The w-axis unit vector.
    #[inline]
    pub fn unit_w() -> Self {
        Self::new(T::zero(), T::zero(), T::zero(), T::one())
    }

    component_accessors! {
        x, x_mut => 0, "x-component";
        y, y_mut => 1, "y-component";
        z, z_mut => 2, "z-component";
        w, w_mut => 3, "w-component";
        r, r_mut => 0, "red component (same slot as x)";
        g, g_mut => 1, "green component (same slot as y)";
        b, b_mut => 2, "blue component (same slot as z)";
        a, a_mut => 3, "alpha component (same slot as w)";
    }

    swizzles! {
        xy => 2 [0, 1];
        yz => 2 [1, 2];
        zw => 2 [2, 3];
        rg => 2 [0, 1];
        gb => 2 [1, 2];
        ba => 2 [2, 3];
        xyz => 3 [0, 1, 2];
        rgb => 3 [0, 1, 2];
    }

    /// Computes the cross product of the xyz-parts of this vector and
    /// another. The w-component of the result is zero.
    #[inline]
    pub fn cross(&self, other: &Self) -> Self {
        self.xyz().cross(&other.xyz()).extended(T::zero())
    }

    /// Drops the w-component.
    #[inline]
    pub const fn truncated(&self) -> Vector3<T> {
        self.xyz()
    }
}

impl<T: Scalar, const N: usize> Default for Vector<T, N> {
    #[inline]
    fn default() -> Self {
        Self::zeros()
    }
}

impl<T: Scalar, const N: usize> From<[T; N]> for Vector<T, N> {
    #[inline]
    fn from(components: [T; N]) -> Self {
        Self::from_array(components)
    }
}

impl<T: Scalar, const N: usize> From<Vector<T, N>> for [T; N] {
    #[inline]
    fn from(vector: Vector<T, N>) -> Self {
        vector.components
    }
}

impl<T: Scalar, const N: usize> TryFrom<&[T]> for Vector<T, N> {
    type Error = anyhow::Error;

    fn try_from(values: &[T]) -> Result<Self> {
        if values.len() != N {
            bail!(
                "Got {} values for a vector with {N} components",
                values.len()
            );
        }
        let components: [T; N] = values.try_into()?;
        Ok(Self::from_array(components))
    }
}

impl<T: Scalar, const N: usize> AsRef<[T]> for Vector<T, N> {
    #[inline]
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl_binop!([T: Scalar, const N: usize], Add, add, Vector<T, N>, Vector<T, N>, Vector<T, N>, |a, b| {
    a.zip_map(b, |a, b| a + b)
});

impl_binop!([T: Scalar, const N: usize], Sub, sub, Vector<T, N>, Vector<T, N>, Vector<T, N>, |a, b| {
    a.zip_map(b, |a, b| a - b)
});

impl_binop!([T: Scalar, const N: usize], Mul, mul, Vector<T, N>, T, Vector<T, N>, |a, b| {
    a.mapped(|c| c * *b)
});

impl_binop!([T: Scalar, const N: usize], Div, div, Vector<T, N>, T, Vector<T, N>, |a, b| {
    a.mapped(|c| c / *b)
});

impl_scalar_lhs_mul!([const N: usize], Vector<_, N>; f32, f64, i8, i16, i32, i64, u8, u16, u32, u64);

impl_binop_assign!([T: Scalar, const N: usize], AddAssign, add_assign, Vector<T, N>, Vector<T, N>, |a, b| {
    for (a, &b) in a.components.iter_mut().zip(&b.components) {
        *a += b;
    }
});

impl_binop_assign!([T: Scalar, const N: usize], SubAssign, sub_assign, Vector<T, N>, Vector<T, N>, |a, b| {
    for (a, &b) in a.components.iter_mut().zip(&b.components) {
        *a -= b;
    }
});

impl_binop_assign!([T: Scalar, const N: usize], MulAssign, mul_assign, Vector<T, N>, T, |a, b| {
    for a in &mut a.components {
        *a *= *b;
    }
});

impl_binop_assign!([T: Scalar, const N: usize], DivAssign, div_assign, Vector<T, N>, T, |a, b| {
    for a in &mut a.components {
        *a /= *b;
    }
});

impl_unary_op!([T: Scalar + Neg<Output = T>, const N: usize], Neg, neg, Vector<T, N>, Vector<T, N>, |val| {
    val.mapped(|c| -c)
});

impl<T: Scalar, const N: usize> Index<usize> for Vector<T, N> {
    type Output = T;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        &self.components[index]
    }
}

impl<T: Scalar, const N: usize> IndexMut<usize> for Vector<T, N> {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.components[index]
    }
}

impl_abs_diff_eq!([T: Scalar, const N: usize], Vector<T, N>, |a, b, epsilon| {
    a.components
        .iter()
        .zip(&b.components)
        .all(|(a, b)| a.abs_diff_eq(b, epsilon))
});

impl_relative_eq!([T: Scalar, const N: usize], Vector<T, N>, |a, b, epsilon, max_relative| {
    a.components
        .iter()
        .zip(&b.components)
        .all(|(a, b)| a.relative_eq(b, epsilon, max_relative))
});

const AXIS_NAMES: [&str; 4] = ["x", "y", "z", "w"];

impl<T: fmt::Debug, const N: usize> fmt::Debug for Vector<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = format!("Vector{N}");
        let mut s = f.debug_struct(&name);
        for (name, c) in AXIS_NAMES.iter().zip(&self.components) {
            s.field(name, c);
        }
        s.finish()
    }
}

/// Formats the vector as `(x, y, ...)`, with two decimals unless another
/// precision is requested.
impl<T: fmt::Display, const N: usize> fmt::Display for Vector<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let precision = f.precision().unwrap_or(2);
        write!(f, "(")?;
        for (i, c) in self.components.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{c:.precision$}")?;
        }
        write!(f, ")")
    }
}

#[cfg(feature = "serde")]
pub(crate) mod serde_array {
    //! (De)serialization of const-size arrays as sequences.

    use serde::{
        Deserialize, Deserializer, Serialize, Serializer,
        de::{self, SeqAccess, Visitor},
        ser::SerializeTuple,
    };
    use std::{fmt, marker::PhantomData};

    pub fn serialize<E: Serialize, S: Serializer, const N: usize>(
        values: &[E; N],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(N)?;
        for value in values {
            tuple.serialize_element(value)?;
        }
        tuple.end()
    }

    pub fn deserialize<'de, E, D, const N: usize>(deserializer: D) -> Result<[E; N], D::Error>
    where
        E: Deserialize<'de> + Default + Copy,
        D: Deserializer<'de>,
    {
        struct ArrayVisitor<E, const N: usize>(PhantomData<E>);

        impl<'de, E, const N: usize> Visitor<'de> for ArrayVisitor<E, N>
        where
            E: Deserialize<'de> + Default + Copy,
        {
            type Value = [E; N];

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "a sequence of {N} elements")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<[E; N], A::Error> {
                let mut values = [E::default(); N];
                for (i, value) in values.iter_mut().enumerate() {
                    *value = seq
                        .next_element()?
                        .ok_or_else(|| de::Error::invalid_length(i, &self))?;
                }
                if seq.next_element::<de::IgnoredAny>()?.is_some() {
                    return Err(de::Error::invalid_length(N + 1, &self));
                }
                Ok(values)
            }
        }

        deserializer.deserialize_tuple(N, ArrayVisitor::<E, N>(PhantomData))
    }
}

#[cfg(feature = "serde")]
impl<T: Scalar + serde::Serialize, const N: usize> serde::Serialize for Vector<T, N> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serde_array::serialize(&self.components, serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de, T: Scalar + serde::Deserialize<'de>, const N: usize> serde::Deserialize<'de>
    for Vector<T, N>
{
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_array::deserialize(deserializer).map(Self::from_array)
    }
}
