//! Matrices.

use crate::{
    num::{Float, Scalar},
    vector::{Vector, Vector3, Vector4},
};
use anyhow::{Result, bail};
use bytemuck::{Pod, Zeroable};
use std::{
    fmt,
    ops::{Index, IndexMut, Neg},
};

/// A square `N`x`N` matrix with elements of type `T`.
///
/// The elements are stored in column-major order: the element in row `i` and
/// column `j` lives at index `j * N + i` of [`Self::as_slice`]. Equivalently,
/// the matrix is an array of `N` column vectors. For 4x4 matrices representing
/// affine transforms, the upper left 3x3 block holds the basis vectors as
/// columns and the first three rows of the fourth column hold the translation.
///
/// The default matrix is the identity.
#[repr(transparent)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Matrix<T, const N: usize> {
    columns: [Vector<T, N>; N],
}

/// A 3x3 matrix.
pub type Matrix3<T> = Matrix<T, 3>;

/// A 4x4 matrix.
pub type Matrix4<T> = Matrix<T, 4>;

pub type Matrix3f = Matrix3<f32>;
pub type Matrix4f = Matrix4<f32>;

pub type Matrix3d = Matrix3<f64>;
pub type Matrix4d = Matrix4<f64>;

// SAFETY: `Matrix` is a transparent wrapper around `N` contiguous vectors,
// each of which is a transparent wrapper around `[T; N]`.
unsafe impl<T: Zeroable, const N: usize> Zeroable for Matrix<T, N> {}
unsafe impl<T: Pod, const N: usize> Pod for Matrix<T, N> {}

impl<T: Scalar, const N: usize> Matrix<T, N> {
    /// Creates an identity matrix.
    #[inline]
    pub fn identity() -> Self {
        Self::from_diagonal(&Vector::same(T::one()))
    }

    /// Creates a matrix with all zeros.
    #[inline]
    pub fn zeros() -> Self {
        Self::from_columns([Vector::zeros(); N])
    }

    /// Creates a diagonal matrix with the given vector on the diagonal.
    #[inline]
    pub fn from_diagonal(diagonal: &Vector<T, N>) -> Self {
        Self::from_fn(|i, j| if i == j { diagonal[i] } else { T::zero() })
    }

    /// Creates a matrix with the given columns.
    #[inline]
    pub const fn from_columns(columns: [Vector<T, N>; N]) -> Self {
        Self { columns }
    }

    /// Creates a matrix from an array of column arrays.
    #[inline]
    pub fn from_column_major(columns: [[T; N]; N]) -> Self {
        Self::from_columns(columns.map(Vector::from_array))
    }

    /// Creates a matrix from an array of row arrays.
    #[inline]
    pub fn from_row_major(rows: [[T; N]; N]) -> Self {
        Self::from_fn(|i, j| rows[i][j])
    }

    /// Creates a matrix from `N * N` elements listed in row-major order, which
    /// are transposed into the column-major storage.
    ///
    /// # Errors
    /// Returns an error if the slice does not contain exactly `N * N` elements.
    pub fn try_from_row_major_slice(elements: &[T]) -> Result<Self> {
        if elements.len() != N * N {
            bail!(
                "Got {} elements for a {N}x{N} matrix, expected {}",
                elements.len(),
                N * N
            );
        }
        Ok(Self::from_row_major_elements_unchecked(elements))
    }

    /// Creates a matrix whose element in row `i` and column `j` is `f(i, j)`.
    #[inline]
    pub fn from_fn(mut f: impl FnMut(usize, usize) -> T) -> Self {
        Self::from_columns(std::array::from_fn(|j| Vector::from_fn(|i| f(i, j))))
    }

    /// The columns of the matrix.
    #[inline]
    pub const fn columns(&self) -> &[Vector<T, N>; N] {
        &self.columns
    }

    /// Returns a reference to column `j`.
    ///
    /// # Panics
    /// If `j` is outside the matrix.
    #[inline]
    pub const fn column(&self, j: usize) -> &Vector<T, N> {
        &self.columns[j]
    }

    /// Returns a mutable reference to column `j`.
    ///
    /// # Panics
    /// If `j` is outside the matrix.
    #[inline]
    pub fn column_mut(&mut self, j: usize) -> &mut Vector<T, N> {
        &mut self.columns[j]
    }

    /// Sets column `j` to the given vector.
    ///
    /// # Panics
    /// If `j` is outside the matrix.
    #[inline]
    pub fn set_column(&mut self, j: usize, column: Vector<T, N>) {
        self.columns[j] = column;
    }

    /// Returns a copy of row `i`.
    ///
    /// # Panics
    /// If `i` is outside the matrix.
    #[inline]
    pub fn row(&self, i: usize) -> Vector<T, N> {
        Vector::from_fn(|j| self.columns[j][i])
    }

    /// Returns the element at row `i` and column `j`.
    ///
    /// # Panics
    /// If the indices are outside the matrix.
    #[inline]
    pub fn element(&self, i: usize, j: usize) -> T {
        self.columns[j][i]
    }

    /// Returns a mutable reference to the element at row `i` and column `j`.
    ///
    /// # Panics
    /// If the indices are outside the matrix.
    #[inline]
    pub fn element_mut(&mut self, i: usize, j: usize) -> &mut T {
        &mut self.columns[j][i]
    }

    /// The elements in column-major order.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        bytemuck::cast_slice(&self.columns)
    }

    /// The elements in column-major order, mutably.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        bytemuck::cast_slice_mut(&mut self.columns)
    }

    /// Returns the transpose of this matrix.
    #[inline]
    pub fn transposed(&self) -> Self {
        Self::from_fn(|i, j| self.element(j, i))
    }

    /// Returns a matrix with the given closure applied to each element.
    #[inline]
    pub fn mapped(&self, mut f: impl FnMut(T) -> T) -> Self {
        Self::from_columns(self.columns.map(|column| column.mapped(&mut f)))
    }

    /// Returns the diagonal of this matrix as a vector.
    #[inline]
    pub fn diagonal(&self) -> Vector<T, N> {
        Vector::from_fn(|i| self.element(i, i))
    }

    /// Returns the sum of the diagonal elements.
    #[inline]
    pub fn trace(&self) -> T {
        (0..N).fold(T::zero(), |sum, i| sum + self.element(i, i))
    }

    /// Returns the smallest element in the matrix.
    #[inline]
    pub fn min_element(&self) -> T {
        self.columns
            .iter()
            .map(Vector::min_component)
            .fold(self.element(0, 0), |min, c| if c < min { c } else { min })
    }

    /// Returns the largest element in the matrix.
    #[inline]
    pub fn max_element(&self) -> T {
        self.columns
            .iter()
            .map(Vector::max_component)
            .fold(self.element(0, 0), |max, c| if c > max { c } else { max })
    }

    /// Expects exactly `N * N` elements.
    fn from_row_major_elements_unchecked(elements: &[T]) -> Self {
        // Row-major input index `k` maps to storage index `(k / N) + (k % N) * N`
        Self::from_fn(|i, j| elements[i * N + j])
    }

    #[inline]
    fn zip_map(&self, other: &Self, mut f: impl FnMut(T, T) -> T) -> Self {
        Self::from_fn(|i, j| f(self.element(i, j), other.element(i, j)))
    }
}

impl<T: Scalar> Matrix3<T> {
    /// Creates a matrix from nine elements listed in row-major order.
    #[inline]
    pub fn from_row_major_elements(elements: [T; 9]) -> Self {
        Self::from_row_major_elements_unchecked(&elements)
    }

    /// Computes the determinant of the matrix.
    pub fn determinant(&self) -> T {
        let m = |i, j| self.element(i, j);
        m(0, 0) * (m(1, 1) * m(2, 2) - m(1, 2) * m(2, 1))
            - m(0, 1) * (m(1, 0) * m(2, 2) - m(1, 2) * m(2, 0))
            + m(0, 2) * (m(1, 0) * m(2, 1) - m(1, 1) * m(2, 0))
    }

    /// Embeds the matrix as the upper left block of a 4x4 matrix with no
    /// translation.
    pub fn to_homogeneous(&self) -> Matrix4<T> {
        Matrix4::from_fn(|i, j| match (i, j) {
            (3, 3) => T::one(),
            (3, _) | (_, 3) => T::zero(),
            _ => self.element(i, j),
        })
    }
}

impl<T: Float> Matrix3<T> {
    /// Creates the matrix for an active right-handed rotation by `angle`
    /// radians about `axis` (Rodrigues' rotation formula). The axis is
    /// normalized first.
    pub fn from_axis_angle(axis: &Vector3<T>, angle: T) -> Self {
        let (s, c) = angle.sin_cos();
        let t = T::ONE - c;
        let axis = axis.normalized();
        let (x, y, z) = (axis.x(), axis.y(), axis.z());

        Self::from_row_major_elements([
            t * x * x + c,
            t * x * y - z * s,
            t * x * z + y * s,
            t * x * y + z * s,
            t * y * y + c,
            t * y * z - x * s,
            t * x * z - y * s,
            t * y * z + x * s,
            t * z * z + c,
        ])
    }

    /// Returns the inverse of this matrix. If the matrix is not invertible, the
    /// result will be non-finite.
    pub fn inverted(&self) -> Self {
        let m = |i, j| self.element(i, j);
        let adjugate = Self::from_row_major_elements([
            m(1, 1) * m(2, 2) - m(1, 2) * m(2, 1),
            m(0, 2) * m(2, 1) - m(0, 1) * m(2, 2),
            m(0, 1) * m(1, 2) - m(0, 2) * m(1, 1),
            m(1, 2) * m(2, 0) - m(1, 0) * m(2, 2),
            m(0, 0) * m(2, 2) - m(0, 2) * m(2, 0),
            m(0, 2) * m(1, 0) - m(0, 0) * m(1, 2),
            m(1, 0) * m(2, 1) - m(1, 1) * m(2, 0),
            m(0, 1) * m(2, 0) - m(0, 0) * m(2, 1),
            m(0, 0) * m(1, 1) - m(0, 1) * m(1, 0),
        ]);
        adjugate * (T::ONE / self.determinant())
    }
}

impl<T: Scalar> Matrix4<T> {
    /// Creates a matrix from sixteen elements listed in row-major order.
    #[inline]
    pub fn from_row_major_elements(elements: [T; 16]) -> Self {
        Self::from_row_major_elements_unchecked(&elements)
    }

    /// Creates a matrix with the given basis vectors as the first three
    /// columns and no translation.
    pub fn from_basis(a: &Vector3<T>, b: &Vector3<T>, c: &Vector3<T>) -> Self {
        Self::from_basis_and_translation(a, b, c, &Vector3::zeros())
    }

    /// Creates a matrix with the given basis vectors as the first three
    /// columns and the given translation in the fourth column.
    pub fn from_basis_and_translation(
        a: &Vector3<T>,
        b: &Vector3<T>,
        c: &Vector3<T>,
        translation: &Vector3<T>,
    ) -> Self {
        Self::from_columns([
            a.extended(T::zero()),
            b.extended(T::zero()),
            c.extended(T::zero()),
            translation.extended(T::one()),
        ])
    }

    /// The first basis vector (upper three elements of the first column).
    #[inline]
    pub fn basis_a(&self) -> Vector3<T> {
        self.columns[0].xyz()
    }

    /// The second basis vector (upper three elements of the second column).
    #[inline]
    pub fn basis_b(&self) -> Vector3<T> {
        self.columns[1].xyz()
    }

    /// The third basis vector (upper three elements of the third column).
    #[inline]
    pub fn basis_c(&self) -> Vector3<T> {
        self.columns[2].xyz()
    }

    /// The translation (upper three elements of the fourth column).
    #[inline]
    pub fn translation(&self) -> Vector3<T> {
        self.columns[3].xyz()
    }

    /// Replaces the translation part of the matrix.
    #[inline]
    pub fn set_translation(&mut self, translation: &Vector3<T>) {
        *self.columns[3].x_mut() = translation.x();
        *self.columns[3].y_mut() = translation.y();
        *self.columns[3].z_mut() = translation.z();
    }

    /// Returns the upper left 3x3 block of the matrix.
    #[inline]
    pub fn linear_part(&self) -> Matrix3<T> {
        Matrix3::from_fn(|i, j| self.element(i, j))
    }

    /// Transforms the given point, including translation.
    #[inline]
    pub fn transform_point(&self, point: &Vector3<T>) -> Vector3<T> {
        (self * point.extended(T::one())).xyz()
    }

    /// Transforms the given direction vector, ignoring translation.
    #[inline]
    pub fn transform_vector(&self, vector: &Vector3<T>) -> Vector3<T> {
        (self * vector.extended(T::zero())).xyz()
    }

    /// Multiplies the homogeneous vector built from the given 3D vector and
    /// `w`, returning the full 4D result.
    #[inline]
    pub fn transform_homogeneous(&self, vector: &Vector3<T>, w: T) -> Vector4<T> {
        self * vector.extended(w)
    }

    /// Computes the determinant of the matrix.
    pub fn determinant(&self) -> T {
        self.adjugate_and_determinant().1
    }

    /// Computes the adjugate (transposed cofactor matrix) in column-major
    /// order together with the determinant.
    ///
    /// The 2x2 sub-determinants of the lower and upper halves are computed as
    /// twelve shared pairwise products, each reused by several cofactors.
    fn adjugate_and_determinant(&self) -> ([T; 16], T) {
        let m = self.as_slice();

        // Row-major copy, `src[4 * i + j]` is the element in row `i` and
        // column `j`
        let mut src = [T::zero(); 16];
        for i in 0..4 {
            src[i] = m[i * 4];
            src[i + 4] = m[i * 4 + 1];
            src[i + 8] = m[i * 4 + 2];
            src[i + 12] = m[i * 4 + 3];
        }

        let mut dst = [T::zero(); 16];

        // Pairs from rows 2 and 3
        let mut tmp = [
            src[10] * src[15],
            src[11] * src[14],
            src[9] * src[15],
            src[11] * src[13],
            src[9] * src[14],
            src[10] * src[13],
            src[8] * src[15],
            src[11] * src[12],
            src[8] * src[14],
            src[10] * src[12],
            src[8] * src[13],
            src[9] * src[12],
        ];

        dst[0] = (tmp[0] * src[5] + tmp[3] * src[6] + tmp[4] * src[7])
            - (tmp[1] * src[5] + tmp[2] * src[6] + tmp[5] * src[7]);
        dst[1] = (tmp[1] * src[4] + tmp[6] * src[6] + tmp[9] * src[7])
            - (tmp[0] * src[4] + tmp[7] * src[6] + tmp[8] * src[7]);
        dst[2] = (tmp[2] * src[4] + tmp[7] * src[5] + tmp[10] * src[7])
            - (tmp[3] * src[4] + tmp[6] * src[5] + tmp[11] * src[7]);
        dst[3] = (tmp[5] * src[4] + tmp[8] * src[5] + tmp[11] * src[6])
            - (tmp[4] * src[4] + tmp[9] * src[5] + tmp[10] * src[6]);
        dst[4] = (tmp[1] * src[1] + tmp[2] * src[2] + tmp[5] * src[3])
            - (tmp[0] * src[1] + tmp[3] * src[2] + tmp[4] * src[3]);
        dst[5] = (tmp[0] * src[0] + tmp[7] * src[2] + tmp[8] * src[3])
            - (tmp[1] * src[0] + tmp[6] * src[2] + tmp[9] * src[3]);
        dst[6] = (tmp[3] * src[0] + tmp[6] * src[1] + tmp[11] * src[3])
            - (tmp[2] * src[0] + tmp[7] * src[1] + tmp[10] * src[3]);
        dst[7] = (tmp[4] * src[0] + tmp[9] * src[1] + tmp[10] * src[2])
            - (tmp[5] * src[0] + tmp[8] * src[1] + tmp[11] * src[2]);

        // Pairs from rows 0 and 1
        tmp = [
            src[2] * src[7],
            src[3] * src[6],
            src[1] * src[7],
            src[3] * src[5],
            src[1] * src[6],
            src[2] * src[5],
            src[0] * src[7],
            src[3] * src[4],
            src[0] * src[6],
            src[2] * src[4],
            src[0] * src[5],
            src[1] * src[4],
        ];

        dst[8] = (tmp[0] * src[13] + tmp[3] * src[14] + tmp[4] * src[15])
            - (tmp[1] * src[13] + tmp[2] * src[14] + tmp[5] * src[15]);
        dst[9] = (tmp[1] * src[12] + tmp[6] * src[14] + tmp[9] * src[15])
            - (tmp[0] * src[12] + tmp[7] * src[14] + tmp[8] * src[15]);
        dst[10] = (tmp[2] * src[12] + tmp[7] * src[13] + tmp[10] * src[15])
            - (tmp[3] * src[12] + tmp[6] * src[13] + tmp[11] * src[15]);
        dst[11] = (tmp[5] * src[12] + tmp[8] * src[13] + tmp[11] * src[14])
            - (tmp[4] * src[12] + tmp[9] * src[13] + tmp[10] * src[14]);
        dst[12] = (tmp[2] * src[10] + tmp[5] * src[11] + tmp[1] * src[9])
            - (tmp[4] * src[11] + tmp[0] * src[9] + tmp[3] * src[10]);
        dst[13] = (tmp[8] * src[11] + tmp[0] * src[8] + tmp[7] * src[10])
            - (tmp[6] * src[10] + tmp[9] * src[11] + tmp[1] * src[8]);
        dst[14] = (tmp[6] * src[9] + tmp[11] * src[11] + tmp[3] * src[8])
            - (tmp[10] * src[11] + tmp[2] * src[8] + tmp[7] * src[9]);
        dst[15] = (tmp[10] * src[10] + tmp[4] * src[8] + tmp[9] * src[9])
            - (tmp[8] * src[9] + tmp[11] * src[10] + tmp[5] * src[8]);

        let determinant = src[0] * dst[0] + src[1] * dst[1] + src[2] * dst[2] + src[3] * dst[3];

        (dst, determinant)
    }
}

impl<T: Float> Matrix4<T> {
    /// Returns the inverse of this matrix, computed by cofactor expansion.
    ///
    /// There is no check for singularity: if the determinant is zero, every
    /// element of the result will be non-finite. Use [`Self::try_inverted`]
    /// to detect this.
    pub fn inverted(&self) -> Self {
        let (adjugate, determinant) = self.adjugate_and_determinant();
        let inverse_determinant = T::ONE / determinant;
        Self::from_column_major_elements(adjugate.map(|element| element * inverse_determinant))
    }

    /// Returns the inverse of this matrix if the absolute value of its
    /// determinant exceeds the given threshold.
    ///
    /// # Errors
    /// Returns an error if the matrix is singular or too close to singular.
    pub fn try_inverted(&self, min_abs_determinant: T) -> Result<Self> {
        let (adjugate, determinant) = self.adjugate_and_determinant();

        // Negated comparison so that a NaN determinant is rejected too
        if !(determinant.abs() > min_abs_determinant) {
            log::trace!(
                "Refusing to invert matrix with determinant {determinant:?} (threshold {min_abs_determinant:?})"
            );
            bail!(
                "Matrix is not invertible: determinant {determinant:?} is not above {min_abs_determinant:?} in magnitude"
            );
        }

        let inverse_determinant = T::ONE / determinant;
        Ok(Self::from_column_major_elements(
            adjugate.map(|element| element * inverse_determinant),
        ))
    }

    fn from_column_major_elements(elements: [T; 16]) -> Self {
        Self::from_fn(|i, j| elements[j * 4 + i])
    }
}

impl<T: Scalar, const N: usize> Default for Matrix<T, N> {
    #[inline]
    fn default() -> Self {
        Self::identity()
    }
}

impl<T: Scalar, const N: usize> From<[[T; N]; N]> for Matrix<T, N> {
    /// Interprets the inner arrays as columns.
    #[inline]
    fn from(columns: [[T; N]; N]) -> Self {
        Self::from_column_major(columns)
    }
}

impl<T: Scalar, const N: usize> Index<(usize, usize)> for Matrix<T, N> {
    type Output = T;

    /// Indexes by `(row, column)`.
    #[inline]
    fn index(&self, (i, j): (usize, usize)) -> &Self::Output {
        &self.columns[j][i]
    }
}

impl<T: Scalar, const N: usize> IndexMut<(usize, usize)> for Matrix<T, N> {
    #[inline]
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut Self::Output {
        &mut self.columns[j][i]
    }
}

impl_binop!([T: Scalar, const N: usize], Add, add, Matrix<T, N>, Matrix<T, N>, Matrix<T, N>, |a, b| {
    a.zip_map(b, |a, b| a + b)
});

impl_binop!([T: Scalar, const N: usize], Sub, sub, Matrix<T, N>, Matrix<T, N>, Matrix<T, N>, |a, b| {
    a.zip_map(b, |a, b| a - b)
});

impl_binop!([T: Scalar, const N: usize], Mul, mul, Matrix<T, N>, Matrix<T, N>, Matrix<T, N>, |a, b| {
    Matrix::from_fn(|i, j| {
        (0..N).fold(T::zero(), |sum, k| sum + a.element(i, k) * b.element(k, j))
    })
});

impl_binop!([T: Scalar, const N: usize], Mul, mul, Matrix<T, N>, Vector<T, N>, Vector<T, N>, |a, b| {
    Vector::from_fn(|i| {
        (0..N).fold(T::zero(), |sum, k| sum + a.element(i, k) * b[k])
    })
});

impl_binop!([T: Scalar, const N: usize], Mul, mul, Matrix<T, N>, T, Matrix<T, N>, |a, b| {
    a.mapped(|element| element * *b)
});

impl_binop!([T: Scalar, const N: usize], Div, div, Matrix<T, N>, T, Matrix<T, N>, |a, b| {
    a.mapped(|element| element / *b)
});

impl_scalar_lhs_mul!([const N: usize], Matrix<_, N>; f32, f64, i8, i16, i32, i64, u8, u16, u32, u64);

impl_binop_assign!([T: Scalar, const N: usize], AddAssign, add_assign, Matrix<T, N>, Matrix<T, N>, |a, b| {
    *a = &*a + b;
});

impl_binop_assign!([T: Scalar, const N: usize], SubAssign, sub_assign, Matrix<T, N>, Matrix<T, N>, |a, b| {
    *a = &*a - b;
});

impl_binop_assign!([T: Scalar, const N: usize], MulAssign, mul_assign, Matrix<T, N>, Matrix<T, N>, |a, b| {
    *a = &*a * b;
});

impl_binop_assign!([T: Scalar, const N: usize], MulAssign, mul_assign, Matrix<T, N>, T, |a, b| {
    for column in &mut a.columns {
        *column *= b;
    }
});

impl_binop_assign!([T: Scalar, const N: usize], DivAssign, div_assign, Matrix<T, N>, T, |a, b| {
    for column in &mut a.columns {
        *column /= b;
    }
});

impl_unary_op!([T: Scalar + Neg<Output = T>, const N: usize], Neg, neg, Matrix<T, N>, Matrix<T, N>, |val| {
    val.mapped(|element| -element)
});

impl_abs_diff_eq!([T: Scalar, const N: usize], Matrix<T, N>, |a, b, epsilon| {
    a.columns
        .iter()
        .zip(&b.columns)
        .all(|(a, b)| a.abs_diff_eq(b, epsilon))
});

impl_relative_eq!([T: Scalar, const N: usize], Matrix<T, N>, |a, b, epsilon, max_relative| {
    a.columns
        .iter()
        .zip(&b.columns)
        .all(|(a, b)| a.relative_eq(b, epsilon, max_relative))
});

/// Formats the matrix as one bracketed row per line, with two decimals unless
/// another precision is requested.
impl<T: Scalar + fmt::Display, const N: usize> fmt::Display for Matrix<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let precision = f.precision().unwrap_or(2);
        for i in 0..N {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "[")?;
            for j in 0..N {
                write!(f, " {:.precision$}", self.element(i, j))?;
            }
            write!(f, " ]")?;
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
impl<T: Scalar + serde::Serialize, const N: usize> serde::Serialize for Matrix<T, N> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        crate::vector::serde_array::serialize(&self.columns, serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de, T: Scalar + serde::Deserialize<'de>, const N: usize> serde::Deserialize<'de>
    for Matrix<T, N>
{
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        crate::vector::serde_array::deserialize(deserializer).map(Self::from_columns)
    }
}

impl<T: Scalar> From<Matrix3<T>> for Matrix4<T> {
    #[inline]
    fn from(matrix: Matrix3<T>) -> Self {
        matrix.to_homogeneous()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::op_ref)]

    use super::*;
    use crate::vector::Vector4f;
    use approx::{assert_abs_diff_eq, assert_abs_diff_ne};
    use proptest::prelude::*;
    use std::f64::consts::FRAC_PI_2;

    const EPSILON: f32 = 1e-6;

    prop_compose! {
        fn matrix4_strategy(max: f32)(
            elements in prop::array::uniform16(-max..max),
        ) -> Matrix4f {
            Matrix4::from_row_major_elements(elements)
        }
    }

    prop_compose! {
        fn invertible_matrix4_strategy()(
            matrix in matrix4_strategy(10.0),
            diagonal in prop::array::uniform4(50.0_f32..100.0),
        ) -> Matrix4f {
            // Strict diagonal dominance guarantees invertibility
            &matrix + &Matrix4::from_diagonal(&Vector4::from_array(diagonal))
        }
    }

    prop_compose! {
        fn vector4_strategy(max: f32)(
            components in prop::array::uniform4(-max..max),
        ) -> Vector4f {
            Vector4::from_array(components)
        }
    }

    fn sample_matrix4() -> Matrix4f {
        Matrix4::from_row_major_elements([
            2.0, 0.0, 1.0, 3.0, //
            1.0, 3.0, 0.0, -1.0, //
            0.0, 1.0, 4.0, 2.0, //
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    #[test]
    fn creating_matrix3_identity_gives_identity_matrix() {
        let identity = Matrix3f::identity();
        for i in 0..3 {
            for j in 0..3 {
                assert_eq!(identity.element(i, j), if i == j { 1.0 } else { 0.0 });
            }
        }
        assert_eq!(Matrix3f::default(), identity);
    }

    #[test]
    fn creating_matrix4_zeros_gives_zero_matrix() {
        let zeros = Matrix4f::zeros();
        assert!(zeros.as_slice().iter().all(|&element| element == 0.0));
    }

    #[test]
    fn creating_matrix4_from_diagonal_works() {
        let matrix = Matrix4::from_diagonal(&Vector4::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(matrix.diagonal(), Vector4::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(matrix.element(0, 1), 0.0);
        assert_eq!(matrix.trace(), 10.0);
    }

    #[test]
    fn creating_matrix3_from_row_major_elements_transposes_into_storage() {
        let matrix = Matrix3::from_row_major_elements([1, 2, 3, 4, 5, 6, 7, 8, 9]);

        assert_eq!(matrix.element(0, 1), 2);
        assert_eq!(matrix.element(1, 0), 4);
        assert_eq!(matrix.row(2), Vector3::new(7, 8, 9));
        assert_eq!(matrix.column(0), &Vector3::new(1, 4, 7));
        assert_eq!(matrix.as_slice(), &[1, 4, 7, 2, 5, 8, 3, 6, 9]);

        for k in 0..9 {
            let transposed_index = (k / 3) + (k % 3) * 3;
            assert_eq!(matrix.as_slice()[transposed_index], k as i32 + 1);
        }
    }

    #[test]
    fn creating_matrix_from_rows_and_columns_agree() {
        let from_rows = Matrix3::from_row_major([[1, 2, 3], [4, 5, 6], [7, 8, 9]]);
        let from_columns = Matrix3::from_column_major([[1, 4, 7], [2, 5, 8], [3, 6, 9]]);
        assert_eq!(from_rows, from_columns);
        assert_eq!(Matrix3::from([[1, 4, 7], [2, 5, 8], [3, 6, 9]]), from_rows);
    }

    #[test]
    fn creating_matrix_from_slice_checks_length() {
        let values: Vec<f32> = (0..16).map(|k| k as f32).collect();
        let matrix = Matrix4f::try_from_row_major_slice(&values).unwrap();
        assert_eq!(matrix.element(1, 2), 6.0);

        assert!(Matrix4f::try_from_row_major_slice(&values[..15]).is_err());
        assert!(Matrix3f::try_from_row_major_slice(&values).is_err());
    }

    #[test]
    fn setting_matrix4_columns_works() {
        let mut matrix = Matrix4f::identity();
        matrix.set_column(2, Vector4::new(1.0, 2.0, 3.0, 4.0));
        *matrix.column_mut(0).w_mut() = 5.0;
        *matrix.element_mut(1, 1) = 7.0;
        matrix[(0, 3)] = 8.0;

        assert_eq!(matrix.column(2), &Vector4::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(matrix[(3, 0)], 5.0);
        assert_eq!(matrix[(1, 1)], 7.0);
        assert_eq!(matrix.element(0, 3), 8.0);
    }

    #[test]
    #[should_panic]
    fn accessing_element_outside_matrix_panics() {
        let matrix = Matrix3f::identity();
        let _ = matrix.element(0, 3);
    }

    #[test]
    fn transposing_matrix3_works() {
        let matrix = Matrix3::from_row_major_elements([1, 2, 3, 4, 5, 6, 7, 8, 9]);
        let transposed = matrix.transposed();
        assert_eq!(transposed.row(0), Vector3::new(1, 4, 7));
        assert_eq!(transposed.element(2, 1), 6);
    }

    #[test]
    fn mapping_matrix4_elements_works() {
        let matrix = Matrix4::from_diagonal(&Vector4::new(1.0, 2.0, 3.0, 4.0));
        let mapped = matrix.mapped(|x| x * 2.0);
        assert_eq!(mapped.diagonal(), Vector4::new(2.0, 4.0, 6.0, 8.0));
        assert_eq!(mapped.min_element(), 0.0);
        assert_eq!(mapped.max_element(), 8.0);
    }

    #[test]
    fn multiplying_matrices_composes_right_to_left() {
        let a = Matrix3::from_row_major_elements([1, 2, 0, 0, 1, 0, 0, 0, 1]);
        let b = Matrix3::from_row_major_elements([1, 0, 0, 3, 1, 0, 0, 0, 1]);
        let v = Vector3::new(1, 1, 1);

        assert_eq!(&(&a * &b) * &v, &a * &(&b * &v));
        assert_eq!(
            &a * &b,
            Matrix3::from_row_major_elements([7, 2, 0, 3, 1, 0, 0, 0, 1])
        );
    }

    #[test]
    fn matrix4_arithmetic_operations_work() {
        let m1 = Matrix4::from_diagonal(&Vector4::new(1.0_f64, 2.0, 3.0, 4.0));
        let m2 = Matrix4::from_diagonal(&Vector4::new(2.0, 3.0, 4.0, 5.0));

        assert_eq!((&m1 + &m2).diagonal(), Vector4::new(3.0, 5.0, 7.0, 9.0));
        assert_eq!((&m2 - &m1).diagonal(), Vector4::same(1.0));
        assert_eq!((&m1 * &m2).diagonal(), Vector4::new(2.0, 6.0, 12.0, 20.0));
        assert_eq!((-m1).diagonal(), Vector4::new(-1.0, -2.0, -3.0, -4.0));
        assert_eq!((2.0 * &m1).diagonal(), Vector4::new(2.0, 4.0, 6.0, 8.0));
        assert_eq!((&m1 / 2.0).diagonal(), Vector4::new(0.5, 1.0, 1.5, 2.0));
    }

    #[test]
    fn matrix4_assignment_operations_work() {
        let mut matrix = Matrix4::from_diagonal(&Vector4::new(1.0, 2.0, 3.0, 4.0));
        matrix += Matrix4::identity();
        assert_eq!(matrix.diagonal(), Vector4::new(2.0, 3.0, 4.0, 5.0));
        matrix -= &Matrix4::identity();
        assert_eq!(matrix.diagonal(), Vector4::new(1.0, 2.0, 3.0, 4.0));
        matrix *= 2.0;
        assert_eq!(matrix.diagonal(), Vector4::new(2.0, 4.0, 6.0, 8.0));
        matrix /= 2.0;
        matrix *= Matrix4::from_diagonal(&Vector4::same(3.0));
        assert_eq!(matrix.diagonal(), Vector4::new(3.0, 6.0, 9.0, 12.0));
    }

    #[test]
    fn multiplying_homogeneous_vector_applies_translation_only_to_points() {
        let matrix = Matrix4::from_basis_and_translation(
            &Vector3::unit_x(),
            &Vector3::unit_y(),
            &Vector3::unit_z(),
            &Vector3::new(1.0, 2.0, 3.0),
        );
        let point = Vector4::new(1.0, 1.0, 1.0, 1.0);
        let direction = Vector4::new(1.0, 1.0, 1.0, 0.0);

        assert_eq!(&matrix * &point, Vector4::new(2.0, 3.0, 4.0, 1.0));
        assert_eq!(&matrix * &direction, direction);

        assert_eq!(
            matrix.transform_point(&Vector3::new(1.0, 1.0, 1.0)),
            Vector3::new(2.0, 3.0, 4.0)
        );
        assert_eq!(
            matrix.transform_vector(&Vector3::new(1.0, 1.0, 1.0)),
            Vector3::new(1.0, 1.0, 1.0)
        );
        assert_eq!(
            matrix.transform_homogeneous(&Vector3::new(1.0, 1.0, 1.0), 1.0),
            Vector4::new(2.0, 3.0, 4.0, 1.0)
        );
    }

    #[test]
    fn matrix4_basis_accessors_work() {
        let a = Vector3::new(1.0, 2.0, 3.0);
        let b = Vector3::new(4.0, 5.0, 6.0);
        let c = Vector3::new(7.0, 8.0, 9.0);
        let mut matrix = Matrix4::from_basis(&a, &b, &c);

        assert_eq!(matrix.basis_a(), a);
        assert_eq!(matrix.basis_b(), b);
        assert_eq!(matrix.basis_c(), c);
        assert_eq!(matrix.translation(), Vector3::zeros());
        assert_eq!(matrix.row(3), Vector4::new(0.0, 0.0, 0.0, 1.0));
        assert_eq!(&matrix.as_slice()[..3], &[1.0, 2.0, 3.0]);

        matrix.set_translation(&Vector3::new(-1.0, -2.0, -3.0));
        assert_eq!(&matrix.as_slice()[12..], &[-1.0, -2.0, -3.0, 1.0]);
        assert_eq!(matrix.linear_part().column(2), &c);
    }

    #[test]
    fn embedding_matrix3_in_matrix4_works() {
        let matrix = Matrix3::from_row_major_elements([1, 2, 3, 4, 5, 6, 7, 8, 9]);
        let homogeneous = Matrix4::from(matrix);
        assert_eq!(homogeneous.linear_part(), matrix);
        assert_eq!(homogeneous.row(3), Vector4::new(0, 0, 0, 1));
        assert_eq!(homogeneous.column(3), &Vector4::new(0, 0, 0, 1));
    }

    #[test]
    fn computing_determinants_works() {
        let matrix3 = Matrix3::from_row_major_elements([2, 0, 1, 1, 3, 2, 1, 1, 1]);
        assert_eq!(matrix3.determinant(), 2 * (3 - 2) + (1 - 3));

        assert_abs_diff_eq!(sample_matrix4().determinant(), 25.0, epsilon = 1e-5);
        assert_eq!(Matrix4::<i32>::identity().determinant(), 1);
    }

    #[test]
    fn inverting_matrix4_identity_gives_identity() {
        assert_eq!(Matrix4f::identity().inverted(), Matrix4f::identity());
    }

    #[test]
    fn inverting_matrix4_works() {
        let matrix = sample_matrix4();
        let inverted = matrix.inverted();
        assert_abs_diff_eq!(&matrix * &inverted, Matrix4::identity(), epsilon = 1e-5);
        assert_abs_diff_eq!(&inverted * &matrix, Matrix4::identity(), epsilon = 1e-5);
    }

    #[test]
    fn inverting_translation_matrix_negates_translation() {
        let mut matrix = Matrix4f::identity();
        matrix.set_translation(&Vector3::new(1.0, -2.0, 3.0));
        let inverted = matrix.inverted();
        assert_abs_diff_eq!(
            inverted.translation(),
            Vector3::new(-1.0, 2.0, -3.0),
            epsilon = EPSILON
        );
        assert_abs_diff_eq!(inverted.linear_part(), Matrix3::identity(), epsilon = EPSILON);
    }

    #[test]
    fn inverting_singular_matrix4_gives_non_finite_elements() {
        let inverted = Matrix4f::zeros().inverted();
        assert!(inverted.as_slice().iter().all(|element| !element.is_finite()));
    }

    #[test]
    fn checked_inversion_of_singular_matrix4_fails() {
        let singular = Matrix4::from_row_major_elements([
            1.0, 2.0, 3.0, 4.0, //
            2.0, 4.0, 6.0, 8.0, //
            0.0, 1.0, 0.0, 1.0, //
            1.0, 0.0, 1.0, 0.0,
        ]);
        assert!(singular.try_inverted(1e-6).is_err());
        assert!(Matrix4f::zeros().try_inverted(0.0).is_err());

        let inverted = sample_matrix4().try_inverted(1e-6).unwrap();
        assert_abs_diff_eq!(inverted, sample_matrix4().inverted(), epsilon = EPSILON);
    }

    #[test]
    fn inverting_matrix3_works() {
        let matrix = Matrix3::from_row_major_elements([2.0, 0.0, 1.0, 1.0, 3.0, 2.0, 1.0, 1.0, 2.0]);
        assert_abs_diff_eq!(matrix.determinant(), 6.0, epsilon = 1e-12);
        let inverted = matrix.inverted();
        assert_abs_diff_eq!(&matrix * &inverted, Matrix3::identity(), epsilon = 1e-5);
    }

    #[test]
    fn rotating_x_axis_about_z_axis_gives_y_axis() {
        let rotation = Matrix3::from_axis_angle(&Vector3::unit_z(), FRAC_PI_2);
        let rotated = &rotation * &Vector3::unit_x();
        assert_abs_diff_eq!(rotated, Vector3::unit_y(), epsilon = 1e-12);
    }

    #[test]
    fn axis_angle_matrix_normalizes_axis() {
        let from_unit = Matrix3::from_axis_angle(&Vector3::new(0.0, 0.0, 1.0), 0.3);
        let from_long = Matrix3::from_axis_angle(&Vector3::new(0.0, 0.0, 5.0), 0.3);
        assert_abs_diff_eq!(from_unit, from_long, epsilon = 1e-12);
        assert_abs_diff_eq!(from_unit.determinant(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn formatting_matrix_prints_one_row_per_line() {
        let matrix = Matrix3::from_row_major_elements([1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
        assert_eq!(
            format!("{matrix}"),
            "[ 1.00 2.00 3.00 ]\n[ 4.00 5.00 6.00 ]\n[ 7.00 8.00 9.00 ]"
        );
        assert_eq!(
            format!("{:.0}", Matrix3f::identity()),
            "[ 1 0 0 ]\n[ 0 1 0 ]\n[ 0 0 1 ]"
        );
    }

    #[test]
    fn raw_storage_is_column_major_bytes() {
        let matrix = sample_matrix4();
        let bytes: &[u8] = bytemuck::bytes_of(&matrix);
        let elements: &[f32] = bytemuck::cast_slice(bytes);
        assert_eq!(elements, matrix.as_slice());
        assert_eq!(elements[4], 0.0);
        assert_eq!(elements[12], 3.0);
    }

    #[test]
    fn nearly_equal_matrices_compare_unequal_exactly() {
        let a = sample_matrix4();
        let mut b = a;
        *b.element_mut(2, 2) += 1e-3;
        assert_ne!(a, b);
        assert_abs_diff_ne!(a, b, epsilon = 1e-4);
        assert_abs_diff_eq!(a, b, epsilon = 1e-2);
    }

    proptest! {
        #[test]
        fn multiplying_vector_by_identity_gives_same_vector(v in vector4_strategy(1e3)) {
            prop_assert_eq!(&Matrix4::identity() * &v, v);
        }
    }

    proptest! {
        #[test]
        fn transposing_twice_gives_original(matrix in matrix4_strategy(1e3)) {
            prop_assert_eq!(matrix.transposed().transposed(), matrix);
        }
    }

    proptest! {
        #[test]
        fn multiplying_matrix_by_its_inverse_gives_identity(matrix in invertible_matrix4_strategy()) {
            let product = &matrix * &matrix.inverted();
            prop_assert!(
                approx::abs_diff_eq!(product, Matrix4::identity(), epsilon = 1e-4),
                "M * M^-1 = {product:?}"
            );
        }
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serializing_matrix_writes_columns_and_round_trips() {
        let matrix = Matrix3::from_row_major_elements([1, 2, 3, 4, 5, 6, 7, 8, 9]);
        let json = serde_json::to_string(&matrix).unwrap();
        assert_eq!(json, "[[1,4,7],[2,5,8],[3,6,9]]");
        assert_eq!(serde_json::from_str::<Matrix3<i32>>(&json).unwrap(), matrix);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserializing_matrix_with_wrong_column_count_fails() {
        assert!(serde_json::from_str::<Matrix3<i32>>("[[1,4,7],[2,5,8]]").is_err());
        assert!(serde_json::from_str::<Matrix3<i32>>("[[1,4,7],[2,5,8],[3,6,9],[0,0,0]]").is_err());
        assert!(serde_json::from_str::<Matrix3<i32>>("[[1,4,7],[2,5],[3,6,9]]").is_err());
    }
}
