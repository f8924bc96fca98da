//! The pipeline registry.
//!
//! Grounded on `render::pipeline::pipeline_manager`
//! (`PipelineManager` storing pipelines in a map, tracking the active
//! pipeline) generalized from a fixed `PipelineType` enum to a
//! name-keyed, ref-counted, aliasable registry.

use std::collections::HashMap;

use crate::error::{RenderGraphError, Result};
use crate::handle::{GenerationalArena, Handle};

use super::description::GraphicsPipelineDescription;
use super::domain::PipelineDomain;
use super::instance_state::InstanceStateHandle;
use super::state::PipelineState;

/// Opaque marker type for pipeline handles.
pub struct Pipeline;

/// A handle to a compiled graphics pipeline.
pub type PipelineHandle = Handle<Pipeline>;

/// Backend hooks the registry drives but does not implement — the
/// opaque handle-producing operations a real Vulkan backend performs.
pub trait PipelineBackend {
    /// Compile `desc` into a backend pipeline object.
    fn create_pipeline(&mut self, desc: &GraphicsPipelineDescription) -> BackendPipelineHandle;
    /// Destroy a previously compiled pipeline.
    fn destroy_pipeline(&mut self, handle: BackendPipelineHandle);
    /// Bind a pipeline as the active one for subsequent draws.
    fn bind_pipeline(&mut self, handle: BackendPipelineHandle);
    /// Allocate per-draw descriptor state for `pipeline`.
    fn create_instance_state(&mut self, pipeline: BackendPipelineHandle) -> InstanceStateHandle;
    /// Release previously allocated per-draw descriptor state.
    fn release_instance_state(&mut self, state: InstanceStateHandle);
}

/// Opaque handle to a backend-compiled pipeline object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendPipelineHandle(pub u64);

struct PipelineSlot {
    description: GraphicsPipelineDescription,
    backend_handle: BackendPipelineHandle,
    domain: PipelineDomain,
}

struct PipelineRefs {
    handle: PipelineHandle,
    ref_count: u32,
    auto_release: bool,
    domain: PipelineDomain,
}

/// Dense-array pipeline storage with a name-to-entry ref-count protocol.
/// Multiple names may alias one entry; its single `ref_count` gates
/// releases.
pub struct PipelineRegistry<B: PipelineBackend> {
    slots: GenerationalArena<Pipeline, PipelineSlot>,
    by_name: HashMap<String, PipelineHandle>,
    refs: HashMap<u32, PipelineRefs>,
    by_domain: HashMap<PipelineDomain, Vec<PipelineHandle>>,
    state: PipelineState,
    backend: B,
}

impl<B: PipelineBackend> PipelineRegistry<B> {
    /// Create an empty registry backed by `backend`.
    pub fn new(backend: B) -> Self {
        Self {
            slots: GenerationalArena::new(),
            by_name: HashMap::new(),
            refs: HashMap::new(),
            by_domain: HashMap::new(),
            state: PipelineState::new(),
            backend,
        }
    }

    /// The live binding state (current pipeline, per-frame counters).
    pub const fn state(&self) -> &PipelineState {
        &self.state
    }

    /// Create a pipeline from an explicit description, `ref_count = 1`.
    pub fn create_graphics_pipeline(
        &mut self,
        desc: GraphicsPipelineDescription,
        name: impl Into<String>,
    ) -> PipelineHandle {
        let name = name.into();
        let backend_handle = self.backend.create_pipeline(&desc);
        let domain = desc.domain;
        let handle = self.slots.insert(PipelineSlot {
            description: desc,
            backend_handle,
            domain,
        });
        self.refs.insert(
            handle.id(),
            PipelineRefs {
                handle,
                ref_count: 1,
                auto_release: true,
                domain,
            },
        );
        self.by_name.insert(name, handle);
        self.by_domain.entry(domain).or_default().push(handle);
        handle
    }

    /// Lower `config` for `domain` and create the resulting pipeline.
    pub fn create_from_shader_config(
        &mut self,
        config: &super::description::ShaderConfig,
        domain: PipelineDomain,
        name: impl Into<String>,
    ) -> PipelineHandle {
        let desc = super::description::lower(config, domain);
        self.create_graphics_pipeline(desc, name)
    }

    /// Increment an existing entry's `ref_count`. Fails with
    /// [`RenderGraphError::ResourceNotLoaded`] if `name` has no entry.
    pub fn acquire_by_name(&mut self, name: &str, auto_release: bool) -> Result<PipelineHandle> {
        let handle = *self
            .by_name
            .get(name)
            .ok_or_else(|| RenderGraphError::ResourceNotLoaded(name.to_string()))?;
        if let Some(refs) = self.refs.get_mut(&handle.id()) {
            refs.ref_count += 1;
            refs.auto_release = auto_release;
        }
        Ok(handle)
    }

    /// Insert an additional name pointing at the same pipeline id (e.g.
    /// `shader.default.world`). Does not change `ref_count`.
    pub fn alias_pipeline_name(&mut self, handle: PipelineHandle, alias: impl Into<String>) {
        self.by_name.insert(alias.into(), handle);
    }

    /// Decrement `ref_count`; at zero with `auto_release` set, destroys
    /// the backend pipeline and frees the slot. A release past zero logs
    /// a warning and does not underflow.
    pub fn release(&mut self, handle: PipelineHandle) {
        let Some(refs) = self.refs.get_mut(&handle.id()) else {
            return;
        };
        if refs.ref_count == 0 {
            log::warn!("pipeline {:?} over-released", handle);
            return;
        }
        refs.ref_count -= 1;
        if refs.ref_count == 0 && refs.auto_release {
            let domain = refs.domain;
            self.refs.remove(&handle.id());
            self.by_name.retain(|_, h| *h != handle);
            if let Some(list) = self.by_domain.get_mut(&domain) {
                list.retain(|h| *h != handle);
            }
            if let Some(slot) = self.slots.remove(handle) {
                self.backend.destroy_pipeline(slot.backend_handle);
            }
        }
    }

    /// Current `ref_count` for `handle`'s entry, or `0` if unknown.
    pub fn ref_count(&self, handle: PipelineHandle) -> u32 {
        self.refs.get(&handle.id()).map_or(0, |r| r.ref_count)
    }

    /// Bind `handle` as the active pipeline, skipping the backend call if
    /// it is already bound.
    pub fn bind_pipeline(&mut self, handle: PipelineHandle) {
        if self.state.current_pipeline() == handle {
            self.state.record_redundant_bind();
            return;
        }
        let Some(slot) = self.slots.get(handle) else {
            return;
        };
        self.backend.bind_pipeline(slot.backend_handle);
        self.state.record_bind(handle, slot.domain);
    }

    /// Allocate per-draw descriptor state for `pipeline`.
    pub fn acquire_instance_state(&mut self, pipeline: PipelineHandle) -> Option<InstanceStateHandle> {
        let slot = self.slots.get(pipeline)?;
        Some(self.backend.create_instance_state(slot.backend_handle))
    }

    /// Release per-draw descriptor state.
    pub fn release_instance_state(&mut self, state: InstanceStateHandle) {
        self.backend.release_instance_state(state);
    }

    /// Write global uniforms for the currently bound pipeline, skipping
    /// the call if nothing is dirty.
    pub fn update_global_state(&mut self, apply: impl FnOnce()) {
        if self.state.global_state_dirty() {
            apply();
            self.state.clear_global_dirty();
        }
    }

    /// Handles belonging to `domain`, in creation order.
    pub fn handles_in_domain(&self, domain: PipelineDomain) -> &[PipelineHandle] {
        self.by_domain.get(&domain).map_or(&[], |v| v.as_slice())
    }

    /// Reset per-frame bind counters. Called at the start of each frame.
    pub fn begin_frame(&mut self) {
        self.state.begin_frame();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct StubBackend {
        next: u64,
    }
    impl PipelineBackend for StubBackend {
        fn create_pipeline(&mut self, _desc: &GraphicsPipelineDescription) -> BackendPipelineHandle {
            self.next += 1;
            BackendPipelineHandle(self.next)
        }
        fn destroy_pipeline(&mut self, _handle: BackendPipelineHandle) {}
        fn bind_pipeline(&mut self, _handle: BackendPipelineHandle) {}
        fn create_instance_state(&mut self, _pipeline: BackendPipelineHandle) -> InstanceStateHandle {
            InstanceStateHandle::default()
        }
        fn release_instance_state(&mut self, _state: InstanceStateHandle) {}
    }

    fn desc() -> GraphicsPipelineDescription {
        GraphicsPipelineDescription {
            domain: PipelineDomain::World,
            vertex_shader_path: "v.spv".into(),
            fragment_shader_path: "f.spv".into(),
            depth_test: true,
            depth_write: true,
            blend_enabled: false,
            cull_mode: super::super::description::CullMode::Back,
        }
    }

    #[test]
    fn refcount_returns_to_zero_and_does_not_underflow_on_over_release() {
        let mut registry = PipelineRegistry::new(StubBackend::default());
        let handle = registry.create_graphics_pipeline(desc(), "shader.default.world");
        for _ in 0..3 {
            registry.acquire_by_name("shader.default.world", true).unwrap();
        }
        assert_eq!(registry.ref_count(handle), 4);
        for _ in 0..4 {
            registry.release(handle);
        }
        assert_eq!(registry.ref_count(handle), 0);
        registry.release(handle); // over-release: warns, stays at 0.
        assert_eq!(registry.ref_count(handle), 0);
    }

    #[test]
    fn redundant_bind_is_counted_and_skips_backend_call() {
        let mut registry = PipelineRegistry::new(StubBackend::default());
        let handle = registry.create_graphics_pipeline(desc(), "p");
        registry.bind_pipeline(handle);
        registry.bind_pipeline(handle);
        assert_eq!(registry.state().frame_redundant_binds_avoided(), 1);
        assert_eq!(registry.state().frame_pipeline_changes(), 1);
    }

    #[test]
    fn acquire_unknown_name_fails_not_loaded() {
        let mut registry = PipelineRegistry::new(StubBackend::default());
        let err = registry.acquire_by_name("missing", true).unwrap_err();
        assert!(matches!(err, RenderGraphError::ResourceNotLoaded(_)));
    }

    #[test]
    fn alias_shares_ref_count_with_original_name() {
        let mut registry = PipelineRegistry::new(StubBackend::default());
        let handle = registry.create_graphics_pipeline(desc(), "shader.world");
        registry.alias_pipeline_name(handle, "shader.default.world");
        let via_alias = registry.acquire_by_name("shader.default.world", true).unwrap();
        assert_eq!(via_alias, handle);
        assert_eq!(registry.ref_count(handle), 2);
    }
}
