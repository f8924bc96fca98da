//! Per-frame pipeline binding state.

use super::domain::PipelineDomain;
use super::registry::PipelineHandle;

/// Caches which pipeline is currently bound and per-frame bind statistics.
#[derive(Debug, Default)]
pub struct PipelineState {
    current_pipeline: PipelineHandle,
    current_domain: Option<PipelineDomain>,
    global_state_dirty: bool,
    pipeline_bound: bool,
    frame_pipeline_changes: u32,
    frame_redundant_binds_avoided: u32,
}

impl PipelineState {
    /// A fresh state with no pipeline bound.
    pub fn new() -> Self {
        Self::default()
    }

    /// The currently bound pipeline, or [`PipelineHandle::INVALID`] if none.
    pub const fn current_pipeline(&self) -> PipelineHandle {
        self.current_pipeline
    }

    /// The domain of the currently bound pipeline, if any.
    pub const fn current_domain(&self) -> Option<PipelineDomain> {
        self.current_domain
    }

    /// Whether global uniforms need to be re-applied before the next draw.
    pub const fn global_state_dirty(&self) -> bool {
        self.global_state_dirty
    }

    pub(super) fn record_redundant_bind(&mut self) {
        self.frame_redundant_binds_avoided += 1;
    }

    pub(super) fn record_bind(&mut self, handle: PipelineHandle, domain: PipelineDomain) {
        self.current_pipeline = handle;
        self.current_domain = Some(domain);
        self.pipeline_bound = true;
        self.global_state_dirty = true;
        self.frame_pipeline_changes += 1;
    }

    /// Mark global state as freshly applied.
    pub fn clear_global_dirty(&mut self) {
        self.global_state_dirty = false;
    }

    /// Reset the per-frame counters. Called at the start of each frame.
    pub fn begin_frame(&mut self) {
        self.frame_pipeline_changes = 0;
        self.frame_redundant_binds_avoided = 0;
    }

    /// Pipeline changes recorded so far this frame.
    pub const fn frame_pipeline_changes(&self) -> u32 {
        self.frame_pipeline_changes
    }

    /// Redundant binds avoided so far this frame.
    pub const fn frame_redundant_binds_avoided(&self) -> u32 {
        self.frame_redundant_binds_avoided
    }
}
