//! The render graph itself: declaration, the ephemeral pass builder, and
//! the state compile/execute operate on.

use std::collections::HashMap;

use crate::error::RenderGraphError;

use super::barrier::Barrier;
use super::execute::{PassContext, PassTiming};
use super::pass::{AttachmentUse, Pass, PassFlags, PassType};
use super::resource::{GraphBackend, GraphBufferHandle, ImageHandle, ResourceArena};

/// A compiled, executable schedule. Produced by
/// [`RenderGraph::compile`] and consumed by [`RenderGraph::execute`].
pub struct CompiledSchedule {
    /// Pass indices in execution order, post-cull.
    pub(super) pass_order: Vec<usize>,
    /// One barrier list per entry in `pass_order`.
    pub(super) barriers: Vec<Vec<Barrier>>,
    /// Transient aliasing: maps an image to the handle that actually owns
    /// its physical backing.
    pub(super) pool_owner: HashMap<ImageHandle, ImageHandle>,
}

/// The declarative render graph. Generic over the backend so tests can
/// swap in an in-memory stub.
pub struct RenderGraph<B: GraphBackend> {
    pub(super) resources: ResourceArena,
    pub(super) passes: Vec<Pass>,
    pub(super) present_image: Option<ImageHandle>,
    pub(super) exported_images: Vec<ImageHandle>,
    pub(super) exported_buffers: Vec<GraphBufferHandle>,
    pub(super) executors: HashMap<String, Box<dyn FnMut(&mut PassContext<'_>)>>,
    pub(super) schedule: Option<CompiledSchedule>,
    pub(super) backend: B,
    pub(super) timings: Vec<PassTiming>,
}

impl<B: GraphBackend> RenderGraph<B> {
    /// An empty, uncompiled graph sized for `image_count` swapchain images.
    pub fn new(backend: B, image_count: usize) -> Self {
        Self {
            resources: ResourceArena::new(image_count),
            passes: Vec::new(),
            present_image: None,
            exported_images: Vec::new(),
            exported_buffers: Vec::new(),
            executors: HashMap::new(),
            schedule: None,
            backend,
            timings: Vec::new(),
        }
    }

    /// The graph's declared resources.
    pub const fn resources(&self) -> &ResourceArena {
        &self.resources
    }

    /// Mutable access to the graph's declared resources, for `create_image`/
    /// `import_*` calls before passes reference them.
    pub fn resources_mut(&mut self) -> &mut ResourceArena {
        &mut self.resources
    }

    /// Whether the graph currently holds a valid compiled schedule.
    pub const fn is_compiled(&self) -> bool {
        self.schedule.is_some()
    }

    /// Declare a new pass and return a builder to populate it. The
    /// builder borrows the graph mutably, so (per the design note on
    /// ephemeral builders) it is a compile error to call `add_pass` again
    /// or to hold the builder across a `compile` call — the borrow
    /// checker enforces the "valid only until the next `add_pass` or
    /// `compile`" rule for us.
    pub fn add_pass(&mut self, ty: PassType, name: impl Into<String>) -> PassBuilder<'_, B> {
        self.schedule = None;
        let index = self.passes.len();
        self.passes.push(Pass::new(name, ty));
        PassBuilder { graph: self, index }
    }

    /// Register a named executor callback, resolved against passes whose
    /// `execute_name` is set and whose `execute` is `None`.
    pub fn register_executor(
        &mut self,
        name: impl Into<String>,
        callback: impl FnMut(&mut PassContext<'_>) + 'static,
    ) {
        self.executors.insert(name.into(), Box::new(callback));
    }

    /// Mark `image` as the present target. Must be a color attachment of
    /// some pass; checked at compile.
    pub fn set_present_image(&mut self, image: ImageHandle) {
        self.schedule = None;
        self.present_image = Some(image);
    }

    /// Mark `image` as an output that must retain its final layout/access
    /// beyond this graph's execution.
    pub fn export_image(&mut self, image: ImageHandle) {
        self.schedule = None;
        self.exported_images.push(image);
    }

    /// Mark `buffer` as an output that must retain its final access
    /// beyond this graph's execution.
    pub fn export_buffer(&mut self, buffer: GraphBufferHandle) {
        self.schedule = None;
        self.exported_buffers.push(buffer);
    }

    /// Timings recorded by the most recent `execute` call.
    pub fn pass_timings(&self) -> &[PassTiming] {
        &self.timings
    }

    /// Number of passes declared so far, regardless of compile/cull state.
    pub fn pass_count(&self) -> usize {
        self.passes.len()
    }

    /// The depth attachment's `slice.base_layer` for the declared pass
    /// named `name`, if it has one. Exposed for tests asserting on
    /// JSON-loader repeat expansion.
    pub fn pass_depth_base_layer(&self, name: &str) -> Option<u32> {
        self.passes
            .iter()
            .find(|pass| pass.name == name)
            .and_then(|pass| pass.depth_attachment.as_ref())
            .map(|attachment| attachment.slice.base_layer)
    }

    /// The names of scheduled passes, in execution order, after a
    /// successful compile. `None` if the graph isn't currently compiled.
    pub fn scheduled_pass_names(&self) -> Option<Vec<&str>> {
        let schedule = self.schedule.as_ref()?;
        Some(
            schedule
                .pass_order
                .iter()
                .map(|&index| self.passes[index].name.as_str())
                .collect(),
        )
    }

    /// The barriers precomputed for the scheduled pass named `name`.
    pub fn barriers_for(&self, name: &str) -> Option<&[Barrier]> {
        let schedule = self.schedule.as_ref()?;
        schedule
            .pass_order
            .iter()
            .position(|&index| self.passes[index].name == name)
            .map(|position| schedule.barriers[position].as_slice())
    }

    /// How many distinct physical backing slots transient images were
    /// folded onto by the most recent compile — the upper bound on
    /// concurrently live transients.
    pub fn transient_pool_slot_count(&self) -> Option<usize> {
        let schedule = self.schedule.as_ref()?;
        let mut owners: Vec<u32> = schedule.pool_owner.values().map(|h| h.id()).collect();
        owners.sort_unstable();
        owners.dedup();
        Some(owners.len())
    }
}

/// The ephemeral per-pass declaration handle returned by
/// [`RenderGraph::add_pass`]. Borrows the graph mutably, so it is only
/// valid until the next `add_pass` or `compile` call.
pub struct PassBuilder<'a, B: GraphBackend> {
    graph: &'a mut RenderGraph<B>,
    index: usize,
}

impl<'a, B: GraphBackend> PassBuilder<'a, B> {
    fn pass(&mut self) -> &mut Pass {
        &mut self.graph.passes[self.index]
    }

    /// Set the pass's direct execute callback. Wins over `execute_name`
    /// if both are set.
    pub fn set_execute(mut self, callback: impl FnMut(&mut PassContext<'_>) + 'static) -> Self {
        self.pass().execute = Some(Box::new(callback));
        self
    }

    /// Bind this pass to a named executor, resolved at compile time.
    pub fn set_execute_name(mut self, name: impl Into<String>) -> Self {
        self.pass().execute_name = Some(name.into());
        self
    }

    /// Set scheduling flags.
    pub fn set_flags(mut self, flags: PassFlags) -> Self {
        self.pass().flags = flags;
        self
    }

    /// Set the pipeline domain this pass renders.
    pub fn set_domain(mut self, domain: crate::pipeline::PipelineDomain) -> Self {
        self.pass().domain = Some(domain);
        self
    }

    /// Append a color attachment.
    pub fn add_color_attachment(mut self, attachment: AttachmentUse) -> Self {
        self.pass().color_attachments.push(attachment);
        self
    }

    /// Set the depth attachment.
    pub fn set_depth_attachment(mut self, attachment: AttachmentUse) -> Self {
        self.pass().read_only_depth = attachment.read_only;
        self.pass().depth_attachment = Some(attachment);
        self
    }

    /// Declare a non-attachment image read.
    pub fn read_image(mut self, image: ImageHandle) -> Self {
        self.pass().image_reads.push(image);
        self
    }

    /// Declare a non-attachment image write.
    pub fn write_image(mut self, image: ImageHandle) -> Self {
        self.pass().image_writes.push(image);
        self
    }

    /// Declare a buffer read.
    pub fn read_buffer(mut self, buffer: GraphBufferHandle) -> Self {
        self.pass().buffer_reads.push(buffer);
        self
    }

    /// Declare a buffer write.
    pub fn write_buffer(mut self, buffer: GraphBufferHandle) -> Self {
        self.pass().buffer_writes.push(buffer);
        self
    }
}

pub(super) fn compile_err(msg: impl Into<String>) -> RenderGraphError {
    RenderGraphError::Compile(msg.into())
}
