//! Per-draw descriptor state, needed for Vulkan's dynamic descriptor
//! write pattern.

use crate::handle::Handle;

/// Opaque marker type for per-instance descriptor state handles.
pub struct InstanceState;

/// A handle to the per-draw descriptor state allocated for one pipeline.
pub type InstanceStateHandle = Handle<InstanceState>;

/// Tracks, per [`InstanceStateHandle`], the last frame its per-instance
/// uniforms were written — so `update_instance_state` can skip redundant
/// writes within the same frame.
#[derive(Default)]
pub struct InstanceStateTracker {
    last_render_frame: std::collections::HashMap<InstanceStateHandle, u64>,
}

impl InstanceStateTracker {
    /// An empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `handle`'s uniforms were already written this frame.
    pub fn already_written(&self, handle: InstanceStateHandle, current_frame: u64) -> bool {
        self.last_render_frame.get(&handle) == Some(&current_frame)
    }

    /// Record that `handle`'s uniforms were just written for `current_frame`.
    pub fn mark_written(&mut self, handle: InstanceStateHandle, current_frame: u64) {
        self.last_render_frame.insert(handle, current_frame);
    }

    /// Drop bookkeeping for a released instance state.
    pub fn forget(&mut self, handle: InstanceStateHandle) {
        self.last_render_frame.remove(&handle);
    }
}
