//! Construction of transformation matrices.
//!
//! All matrices act on column vectors, so `a * b` applies `b` first. View and
//! projection matrices follow the OpenGL conventions: the camera looks down
//! the negative z-axis and clip space depth spans `[-1, 1]`.

use crate::{
    matrix::{Matrix3, Matrix4},
    num::Float,
    quaternion::Quaternion,
    vector::Vector3,
};
use anyhow::{Result, anyhow};

/// Creates the 3x3 matrix rotating by `angle` radians about `axis` following
/// the right-hand rule. The axis is normalized first.
#[inline]
pub fn matrix_from_axis_angle<T: Float>(axis: &Vector3<T>, angle: T) -> Matrix3<T> {
    Matrix3::from_axis_angle(axis, angle)
}

/// Creates the 4x4 matrix that applies the rotation of the given unit
/// quaternion followed by the given translation.
#[inline]
pub fn matrix_from_quaternion<T: Float>(
    rotation: &Quaternion<T>,
    translation: &Vector3<T>,
) -> Matrix4<T> {
    rotation.to_homogeneous_matrix(translation)
}

/// Extracts the rotation in the given orthonormal rotation (and translation)
/// matrix as a unit quaternion. See [`Quaternion::from_rotation_matrix`] for
/// precision caveats.
#[inline]
pub fn quaternion_from_matrix<T: Float>(matrix: &Matrix4<T>) -> Quaternion<T> {
    Quaternion::from_rotation_matrix(matrix)
}

/// Creates the perspective projection matrix for the view frustum with the
/// given clip planes. `left`, `right`, `bottom` and `top` are measured on
/// the near plane, and `near` and `far` are positive distances along the
/// view direction.
pub fn projection<T: Float>(left: T, right: T, bottom: T, top: T, near: T, far: T) -> Matrix4<T> {
    let two = T::TWO;
    let zero = T::ZERO;
    Matrix4::from_row_major_elements([
        two * near / (right - left),
        zero,
        (right + left) / (right - left),
        zero,
        zero,
        two * near / (top - bottom),
        (top + bottom) / (top - bottom),
        zero,
        zero,
        zero,
        -(far + near) / (far - near),
        -two * far * near / (far - near),
        zero,
        zero,
        T::NEG_ONE,
        zero,
    ])
}

/// Creates the symmetric perspective projection matrix with the given
/// vertical field of view (in radians) and width-to-height aspect ratio.
pub fn perspective<T: Float>(vertical_field_of_view: T, aspect_ratio: T, near: T, far: T) -> Matrix4<T> {
    let zero = T::ZERO;
    let focal_length = T::ONE / (vertical_field_of_view * T::ONE_HALF).tan();
    Matrix4::from_row_major_elements([
        focal_length / aspect_ratio,
        zero,
        zero,
        zero,
        zero,
        focal_length,
        zero,
        zero,
        zero,
        zero,
        (far + near) / (near - far),
        T::TWO * far * near / (near - far),
        zero,
        zero,
        T::NEG_ONE,
        zero,
    ])
}

/// Creates the orthographic projection matrix mapping the given box to the
/// clip space cube.
pub fn orthographic<T: Float>(left: T, right: T, bottom: T, top: T, near: T, far: T) -> Matrix4<T> {
    let two = T::TWO;
    let zero = T::ZERO;
    Matrix4::from_row_major_elements([
        two / (right - left),
        zero,
        zero,
        -(right + left) / (right - left),
        zero,
        two / (top - bottom),
        zero,
        -(top + bottom) / (top - bottom),
        zero,
        zero,
        -two / (far - near),
        -(far + near) / (far - near),
        zero,
        zero,
        zero,
        T::ONE,
    ])
}

/// Creates a view matrix for a camera at `eye` looking at `target`.
///
/// The first three rows hold the orthonormal camera basis: the side vector
/// `normalize(up x forward)`, the true up vector
/// `normalize(forward x side)` and the forward vector
/// `normalize(target - eye)`. The fourth column holds `eye` itself rather
/// than its projection onto the basis.
///
/// Nothing is checked, so `eye == target` or `up` parallel to the view
/// direction gives NaN elements. Use [`look_at_checked`] to detect this.
pub fn look_at<T: Float>(eye: &Vector3<T>, target: &Vector3<T>, up: &Vector3<T>) -> Matrix4<T> {
    let forward = (target - eye).normalized();
    let side = up.cross(&forward).normalized();
    let true_up = forward.cross(&side).normalized();
    view_matrix_from_basis(eye, &side, &true_up, &forward)
}

/// Like [`look_at`], but fails instead of producing NaN.
///
/// # Errors
/// Returns an error if `eye` and `target` coincide relative to their
/// magnitude, or if `up` is zero or parallel to the view direction.
pub fn look_at_checked<T: Float>(
    eye: &Vector3<T>,
    target: &Vector3<T>,
    up: &Vector3<T>,
) -> Result<Matrix4<T>> {
    let min_norm = T::epsilon().sqrt();
    let position_scale = eye.norm().max(target.norm());

    let forward = (target - eye)
        .normalized_if_above(min_norm * position_scale)
        .ok_or_else(|| {
            log::trace!("Rejecting look-at with eye {eye:?} at target {target:?}");
            anyhow!("Camera position {eye:?} coincides with target {target:?}")
        })?;

    // |up x forward| = |up| sin(angle) for unit forward
    let side = up
        .cross(&forward)
        .normalized_if_above(min_norm * up.norm())
        .ok_or_else(|| {
            log::trace!("Rejecting look-at with up {up:?} along view direction {forward:?}");
            anyhow!("Up direction {up:?} is parallel to view direction {forward:?}")
        })?;

    let true_up = forward.cross(&side).normalized();

    Ok(view_matrix_from_basis(eye, &side, &true_up, &forward))
}

/// Creates the matrix translating by the given displacement.
pub fn translation<T: Float>(displacement: &Vector3<T>) -> Matrix4<T> {
    let mut matrix = Matrix4::identity();
    matrix.set_translation(displacement);
    matrix
}

/// Creates the matrix scaling each axis by the corresponding factor.
pub fn scaling<T: Float>(factors: &Vector3<T>) -> Matrix4<T> {
    Matrix4::from_diagonal(&factors.extended(T::ONE))
}

/// Creates the 4x4 matrix rotating by `angle` radians about `axis`.
pub fn rotation<T: Float>(axis: &Vector3<T>, angle: T) -> Matrix4<T> {
    matrix_from_axis_angle(axis, angle).to_homogeneous()
}

fn view_matrix_from_basis<T: Float>(
    eye: &Vector3<T>,
    side: &Vector3<T>,
    true_up: &Vector3<T>,
    forward: &Vector3<T>,
) -> Matrix4<T> {
    let zero = T::ZERO;
    Matrix4::from_row_major_elements([
        side.x(),
        side.y(),
        side.z(),
        eye.x(),
        true_up.x(),
        true_up.y(),
        true_up.z(),
        eye.y(),
        forward.x(),
        forward.y(),
        forward.z(),
        eye.z(),
        zero,
        zero,
        zero,
        T::ONE,
    ])
}

#[cfg(test)]
mod tests {
    #![allow(clippy::op_ref)]

    use super::*;
    use crate::vector::Vector4;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_3, PI};

    const EPSILON: f32 = 1e-6;

    prop_compose! {
        fn unit_axis_strategy()(
            phi in 0.0..2.0 * PI,
            cos_theta in -1.0_f32..1.0,
        ) -> Vector3<f32> {
            let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();
            Vector3::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta)
        }
    }

    fn project(matrix: &Matrix4<f32>, point: &Vector3<f32>) -> Vector3<f32> {
        let clip = matrix * point.extended(1.0);
        clip.xyz() / clip.w()
    }

    #[test]
    fn rotating_x_axis_about_z_axis_by_right_angle_gives_y_axis() {
        let rotation = matrix_from_axis_angle(&Vector3::new(0.0, 0.0, 1.0), FRAC_PI_2);
        let rotated = &rotation * &Vector3::new(1.0, 0.0, 0.0);
        assert_abs_diff_eq!(rotated, Vector3::new(0.0, 1.0, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn axis_angle_matrix_agrees_with_quaternion() {
        let axis = Vector3::new(-0.3_f32, 0.8, 0.2);
        let angle = 2.1_f32;
        let from_quaternion =
            matrix_from_quaternion(&Quaternion::from_axis_angle(&axis, angle), &Vector3::zeros());
        assert_abs_diff_eq!(from_quaternion, rotation(&axis, angle), epsilon = EPSILON);
    }

    #[test]
    fn look_at_third_basis_row_is_forward_direction() {
        let view = look_at(
            &Vector3::new(0.0_f32, 0.0, 5.0),
            &Vector3::zeros(),
            &Vector3::new(0.0, 1.0, 0.0),
        );
        assert_abs_diff_eq!(view.row(2).xyz(), Vector3::new(0.0, 0.0, -1.0), epsilon = EPSILON);
        assert_abs_diff_eq!(view.row(0).xyz(), Vector3::new(-1.0, 0.0, 0.0), epsilon = EPSILON);
        assert_abs_diff_eq!(view.row(1).xyz(), Vector3::new(0.0, 1.0, 0.0), epsilon = EPSILON);
        assert_eq!(view.column(3), &Vector4::new(0.0, 0.0, 5.0, 1.0));
    }

    #[test]
    fn look_at_basis_is_orthonormal() {
        let view = look_at(
            &Vector3::new(1.0, 2.0, 3.0),
            &Vector3::new(-2.0, 0.5, 1.0),
            &Vector3::new(0.1, 1.0, 0.0),
        );
        let basis = view.linear_part();
        assert_abs_diff_eq!(&basis * &basis.transposed(), Matrix3::identity(), epsilon = 1e-5);
        assert_abs_diff_eq!(basis.determinant(), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn look_at_with_degenerate_input_gives_nan() {
        let eye = Vector3::new(1.0_f32, 1.0, 1.0);
        let view = look_at(&eye, &eye, &Vector3::unit_y());
        assert!(view.element(2, 0).is_nan());
    }

    #[test]
    fn checked_look_at_rejects_degenerate_input() {
        let eye = Vector3::new(1.0_f32, 1.0, 1.0);
        assert!(look_at_checked(&eye, &eye, &Vector3::unit_y()).is_err());
        assert!(
            look_at_checked(&Vector3::zeros(), &Vector3::new(0.0, 3.0, 0.0), &Vector3::unit_y())
                .is_err()
        );

        let target = Vector3::zeros();
        let up = Vector3::unit_y();
        let view = look_at_checked(&eye, &target, &up).unwrap();
        assert_abs_diff_eq!(view, look_at(&eye, &target, &up), epsilon = EPSILON);
    }

    #[test]
    fn checked_look_at_accepts_short_up_and_nearby_target() {
        let eye = Vector3::new(0.0_f32, 0.0, 5.0);
        let target = Vector3::zeros();
        let short_up = Vector3::new(0.0, 1e-4, 0.0);
        let view = look_at_checked(&eye, &target, &short_up).unwrap();
        assert_abs_diff_eq!(view, look_at(&eye, &target, &Vector3::unit_y()), epsilon = EPSILON);

        let eye = Vector3::new(0.0_f32, 0.0, 1e-5);
        let view = look_at_checked(&eye, &target, &Vector3::unit_y()).unwrap();
        assert_abs_diff_eq!(view.row(2).xyz(), Vector3::new(0.0, 0.0, -1.0), epsilon = EPSILON);

        assert!(look_at_checked(&eye, &target, &Vector3::zeros()).is_err());
    }

    #[test]
    fn projection_maps_near_and_far_planes_to_clip_depth_bounds() {
        let matrix = projection(-1.0, 1.0, -1.0, 1.0, 1.0, 10.0);

        let on_near = project(&matrix, &Vector3::new(1.0, 1.0, -1.0));
        assert_abs_diff_eq!(on_near, Vector3::new(1.0, 1.0, -1.0), epsilon = 1e-5);

        let on_far = project(&matrix, &Vector3::new(-10.0, 0.0, -10.0));
        assert_abs_diff_eq!(on_far, Vector3::new(-1.0, 0.0, 1.0), epsilon = 1e-5);
    }

    #[test]
    fn asymmetric_projection_shifts_center() {
        let matrix = projection(0.0, 2.0, 0.0, 1.0, 1.0, 100.0);
        let center = project(&matrix, &Vector3::new(1.0, 0.5, -1.0));
        assert_abs_diff_eq!(center.xy(), crate::vector::Vector2::zeros(), epsilon = 1e-5);
    }

    #[test]
    fn perspective_matches_symmetric_projection() {
        let (fov, aspect, near, far) = (FRAC_PI_3, 1.5, 0.1, 50.0);
        let top = near * (fov / 2.0).tan();
        let right = top * aspect;
        assert_abs_diff_eq!(
            perspective(fov, aspect, near, far),
            projection(-right, right, -top, top, near, far),
            epsilon = 1e-4
        );
    }

    #[test]
    fn orthographic_maps_box_to_clip_cube() {
        let matrix = orthographic(-2.0, 4.0, -1.0, 1.0, 0.5, 10.0);
        assert_abs_diff_eq!(
            project(&matrix, &Vector3::new(-2.0, -1.0, -0.5)),
            Vector3::new(-1.0, -1.0, -1.0),
            epsilon = 1e-5
        );
        assert_abs_diff_eq!(
            project(&matrix, &Vector3::new(4.0, 1.0, -10.0)),
            Vector3::new(1.0, 1.0, 1.0),
            epsilon = 1e-5
        );
    }

    #[test]
    fn translation_and_scaling_matrices_work() {
        let point = Vector3::new(1.0, 2.0, 3.0);
        assert_eq!(
            translation(&Vector3::new(1.0, -1.0, 0.5)).transform_point(&point),
            Vector3::new(2.0, 1.0, 3.5)
        );
        assert_eq!(
            translation(&Vector3::new(1.0, -1.0, 0.5)).transform_vector(&point),
            point
        );
        assert_eq!(
            scaling(&Vector3::new(2.0, 3.0, 4.0)).transform_point(&point),
            Vector3::new(2.0, 6.0, 12.0)
        );
    }

    #[test]
    fn composed_transforms_apply_right_to_left() {
        let transform = &translation(&Vector3::new(10.0, 0.0, 0.0))
            * &rotation(&Vector3::unit_z(), FRAC_PI_2);
        assert_abs_diff_eq!(
            transform.transform_point(&Vector3::unit_x()),
            Vector3::new(10.0, 1.0, 0.0),
            epsilon = EPSILON
        );
    }

    proptest! {
        #[test]
        fn converting_axis_angle_matrix_to_quaternion_and_back_gives_same_matrix(
            axis in unit_axis_strategy(),
            angle in -2.5_f32..2.5,
        ) {
            let matrix = rotation(&axis, angle);
            let round_tripped = matrix_from_quaternion(&quaternion_from_matrix(&matrix), &Vector3::zeros());
            prop_assert!(approx::abs_diff_eq!(round_tripped, matrix, epsilon = 1e-4));
        }
    }

    proptest! {
        #[test]
        fn axis_angle_matrix_is_orthonormal(
            axis in unit_axis_strategy(),
            angle in -PI..PI,
        ) {
            let matrix = matrix_from_axis_angle(&axis, angle);
            prop_assert!(approx::abs_diff_eq!(
                &matrix * &matrix.transposed(),
                Matrix3::identity(),
                epsilon = 1e-5
            ));
        }
    }
}
