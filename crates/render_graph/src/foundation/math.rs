//! Minimal math vocabulary.
//!
//! Transform composition, perspective/look-at construction, and the rest of
//! "transform math" are left to an external collaborator: the render
//! graph only consumes already-computed view/projection matrices and
//! Phong color vectors. This module keeps just the type aliases the
//! teacher's `foundation::math` exposes for that purpose.

pub use nalgebra::{Matrix3, Matrix4, Vector2, Vector3, Vector4};

/// 2D vector type.
pub type Vec2 = Vector2<f32>;
/// 3D vector type.
pub type Vec3 = Vector3<f32>;
/// 4D vector type, used for Phong colors (`diffuse`, `specular`, `emission`).
pub type Vec4 = Vector4<f32>;
/// 3x3 matrix type.
pub type Mat3 = Matrix3<f32>;
/// 4x4 matrix type, used for view/projection and per-instance model matrices.
pub type Mat4 = Matrix4<f32>;
