//! Per-domain global uniforms written by `apply_global`.

use crate::foundation::math::{Mat4, Vec3, Vec4};
use crate::pipeline::PipelineDomain;

/// View/projection/lighting uniforms for world-space domains.
#[derive(Debug, Clone, Copy)]
pub struct WorldGlobals {
    /// Camera view matrix.
    pub view: Mat4,
    /// Camera projection matrix.
    pub projection: Mat4,
    /// Scene ambient color.
    pub ambient_color: Vec4,
    /// Camera world-space position.
    pub view_position: Vec3,
    /// Coarse render-mode selector (e.g. lit/unlit/wireframe).
    pub render_mode: u32,
}

impl Default for WorldGlobals {
    fn default() -> Self {
        Self {
            view: Mat4::identity(),
            projection: Mat4::identity(),
            ambient_color: Vec4::new(0.1, 0.1, 0.1, 1.0),
            view_position: Vec3::zeros(),
            render_mode: 0,
        }
    }
}

/// View/projection uniforms for the UI domain, which has no lighting terms.
#[derive(Debug, Clone, Copy)]
pub struct UiGlobals {
    /// Orthographic (usually) view matrix.
    pub view: Mat4,
    /// Orthographic projection matrix.
    pub projection: Mat4,
}

impl Default for UiGlobals {
    fn default() -> Self {
        Self {
            view: Mat4::identity(),
            projection: Mat4::identity(),
        }
    }
}

/// The two global uniform sets `apply_global` chooses between by domain.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalUniforms {
    /// World/world-transparent/shadow/post globals.
    pub world: WorldGlobals,
    /// UI globals.
    pub ui: UiGlobals,
}

impl GlobalUniforms {
    /// Whether `domain` uses [`Self::ui`] instead of [`Self::world`].
    pub const fn is_ui_domain(domain: PipelineDomain) -> bool {
        matches!(domain, PipelineDomain::Ui)
    }
}
