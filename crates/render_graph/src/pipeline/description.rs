//! Graphics pipeline descriptions and shader-config lowering.
//!
//! Grounded on `render::pipeline::pipeline_config` (cull
//! mode enum, per-pipeline depth/blend flags) generalized away from a
//! fixed `PipelineType` enum toward free-form named pipelines.

use super::domain::PipelineDomain;

/// Rasterizer culling mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullMode {
    /// No culling.
    None,
    /// Cull front faces.
    Front,
    /// Cull back faces.
    Back,
}

/// An explicit, backend-ready graphics pipeline description, as passed
/// to [`super::registry::PipelineRegistry::create_graphics_pipeline`].
#[derive(Debug, Clone)]
pub struct GraphicsPipelineDescription {
    /// Pipeline domain, used to classify the pipeline in
    /// [`super::registry::PipelineRegistry`]'s per-domain lists.
    pub domain: PipelineDomain,
    /// Path to the compiled vertex shader.
    pub vertex_shader_path: String,
    /// Path to the compiled fragment shader.
    pub fragment_shader_path: String,
    /// Enable the depth test.
    pub depth_test: bool,
    /// Enable depth writes.
    pub depth_write: bool,
    /// Enable alpha blending.
    pub blend_enabled: bool,
    /// Rasterizer cull mode.
    pub cull_mode: CullMode,
}

/// A higher-level shader configuration (vertex attributes, descriptor
/// layout, blend/depth/raster flags) that [`lower`] turns into an
/// explicit [`GraphicsPipelineDescription`].
#[derive(Debug, Clone)]
pub struct ShaderConfig {
    /// Path to the vertex shader source/SPIR-V.
    pub vertex_shader_path: String,
    /// Path to the fragment shader source/SPIR-V.
    pub fragment_shader_path: String,
    /// Enable depth testing and writes.
    pub depth_enabled: bool,
    /// Enable alpha blending (for transparent domains).
    pub blend_enabled: bool,
    /// Rasterizer cull mode.
    pub cull_mode: CullMode,
}

/// Lower a [`ShaderConfig`] plus a target [`PipelineDomain`] into an
/// explicit [`GraphicsPipelineDescription`].
pub fn lower(config: &ShaderConfig, domain: PipelineDomain) -> GraphicsPipelineDescription {
    GraphicsPipelineDescription {
        domain,
        vertex_shader_path: config.vertex_shader_path.clone(),
        fragment_shader_path: config.fragment_shader_path.clone(),
        depth_test: config.depth_enabled,
        depth_write: config.depth_enabled && domain != PipelineDomain::WorldTransparent,
        blend_enabled: config.blend_enabled,
        cull_mode: config.cull_mode,
    }
}
