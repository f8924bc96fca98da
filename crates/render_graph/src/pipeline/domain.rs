//! The coarse domain tag selecting pass configuration and material
//! binding path.

/// Selects pass configurations and material binding paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineDomain {
    /// Opaque world-space geometry.
    World,
    /// Alpha-blended world-space geometry.
    WorldTransparent,
    /// Screen-space UI.
    Ui,
    /// Shadow cascade depth-only rendering.
    Shadow,
    /// Full-screen post-processing.
    Post,
}
