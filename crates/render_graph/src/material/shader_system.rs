//! The shader system interface materials write through. The graph
//! consumes this trait but does not implement it.

use crate::foundation::math::{Mat4, Vec4};
use crate::pipeline::InstanceStateHandle;
use crate::texture::TextureHandle;

/// A uniform value written via [`ShaderSystem::uniform_set`].
#[derive(Debug, Clone, Copy)]
pub enum UniformValue {
    /// A four-component vector (colors, positions-as-homogeneous).
    Vec4(Vec4),
    /// A 4x4 matrix (view/projection/model).
    Mat4(Mat4),
    /// A scalar float.
    F32(f32),
    /// A scalar unsigned integer (flags, ids, counts).
    U32(u32),
}

/// The uniform/sampler-setting surface a bound shader program exposes.
pub trait ShaderSystem {
    /// Select the named shader program as active.
    fn use_shader(&mut self, name: &str) -> bool;
    /// Write a named uniform.
    fn uniform_set(&mut self, name: &str, value: UniformValue);
    /// Bind a named sampler to a texture handle.
    fn sampler_set(&mut self, name: &str, texture: TextureHandle);
    /// Flush the global descriptor set.
    fn apply_global(&mut self) -> bool;
    /// Flush the per-instance descriptor set.
    fn apply_instance(&mut self) -> bool;
    /// Bind per-draw descriptor state before `apply_instance`.
    fn bind_instance(&mut self, local_state: InstanceStateHandle);
}
