//! Fixed-size vectors, matrices and quaternions for transforms.
//!
//! Matrices are column-major and act on column vectors, so `a * b` applies
//! `b` first. The same holds for the Hamilton product of quaternions.

#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]
#![warn(clippy::cast_lossless)]

#[macro_use]
mod macros;

pub mod matrix;
pub mod num;
pub mod quaternion;
pub mod transform;
pub mod vector;

pub use matrix::{Matrix, Matrix3, Matrix3d, Matrix3f, Matrix4, Matrix4d, Matrix4f};
pub use num::{Float, Scalar};
pub use quaternion::{Quaternion, Quaterniond, Quaternionf};
pub use vector::{
    Vector, Vector2, Vector2d, Vector2f, Vector2i, Vector2u, Vector3, Vector3d, Vector3f,
    Vector3i, Vector3u, Vector4, Vector4d, Vector4f, Vector4i, Vector4u,
};
