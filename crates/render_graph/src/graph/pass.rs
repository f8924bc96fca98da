//! Pass declarations.

use bitflags::bitflags;

use crate::pipeline::PipelineDomain;

use super::resource::{GraphBufferHandle, ImageHandle};

/// The kind of GPU work a pass performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassType {
    /// Renders into attachments inside a render pass.
    Graphics,
    /// Dispatches compute work outside a render pass.
    Compute,
    /// Copies/blits without binding a pipeline.
    Transfer,
}

bitflags! {
    /// Per-pass scheduling flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PassFlags: u32 {
        /// Keep this pass even if culling finds no reachable consumer.
        const NO_CULL  = 1 << 0;
        /// Skip this pass at execute time without removing it from the schedule.
        const DISABLED = 1 << 1;
    }
}

/// Attachment load behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOp {
    /// Preserve the attachment's existing contents.
    Load,
    /// Clear to `clear_value` at the start of the pass.
    Clear,
    /// Contents are undefined at the start of the pass.
    DontCare,
}

/// Attachment store behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    /// Preserve the attachment's contents after the pass.
    Store,
    /// Contents may be discarded after the pass.
    DontCare,
}

/// A clear value for a color or depth/stencil attachment.
#[derive(Debug, Clone, Copy)]
pub enum ClearValue {
    /// RGBA clear color.
    Color([f32; 4]),
    /// Depth/stencil clear value.
    DepthStencil { depth: f32, stencil: u32 },
}

/// A mip/layer sub-range of an image.
#[derive(Debug, Clone, Copy)]
pub struct ImageSlice {
    /// Mip level.
    pub mip: u32,
    /// First array layer.
    pub base_layer: u32,
    /// Number of array layers.
    pub layer_count: u32,
}

impl Default for ImageSlice {
    fn default() -> Self {
        Self {
            mip: 0,
            base_layer: 0,
            layer_count: 1,
        }
    }
}

/// One attachment binding on a graphics pass.
#[derive(Debug, Clone)]
pub struct AttachmentUse {
    /// The bound image.
    pub image_handle: ImageHandle,
    /// Mip/layer sub-range.
    pub slice: ImageSlice,
    /// Load behavior.
    pub load_op: LoadOp,
    /// Store behavior.
    pub store_op: StoreOp,
    /// Clear value, meaningful only when `load_op == Clear`.
    pub clear_value: ClearValue,
    /// Whether the attachment is bound read-only (depth only).
    pub read_only: bool,
}

/// A declared unit of GPU work.
pub struct Pass {
    /// Declaration-time name.
    pub name: String,
    /// Graphics/compute/transfer.
    pub ty: PassType,
    /// Scheduling flags.
    pub flags: PassFlags,
    /// Pipeline domain this pass renders, if any.
    pub domain: Option<PipelineDomain>,
    /// Color attachments in binding order.
    pub color_attachments: Vec<AttachmentUse>,
    /// Optional depth attachment.
    pub depth_attachment: Option<AttachmentUse>,
    /// Whether the depth attachment is bound read-only.
    pub read_only_depth: bool,
    /// Images read but not written (aside from attachment reads).
    pub image_reads: Vec<ImageHandle>,
    /// Images written (aside from attachment writes, which are implicit writes).
    pub image_writes: Vec<ImageHandle>,
    /// Buffers read.
    pub buffer_reads: Vec<GraphBufferHandle>,
    /// Buffers written.
    pub buffer_writes: Vec<GraphBufferHandle>,
    /// Direct execute callback, if set.
    pub execute: Option<Box<dyn FnMut(&mut super::execute::PassContext<'_>)>>,
    /// Name to resolve against the executor registry at compile time.
    pub execute_name: Option<String>,
}

impl Pass {
    pub(super) fn new(name: impl Into<String>, ty: PassType) -> Self {
        Self {
            name: name.into(),
            ty,
            flags: PassFlags::empty(),
            domain: None,
            color_attachments: Vec::new(),
            depth_attachment: None,
            read_only_depth: false,
            image_reads: Vec::new(),
            image_writes: Vec::new(),
            buffer_reads: Vec::new(),
            buffer_writes: Vec::new(),
            execute: None,
            execute_name: None,
        }
    }

    /// Every image this pass writes, including implicit attachment writes.
    pub fn all_image_writes(&self) -> impl Iterator<Item = ImageHandle> + '_ {
        self.color_attachments
            .iter()
            .filter(|a| !a.read_only)
            .map(|a| a.image_handle)
            .chain(
                self.depth_attachment
                    .iter()
                    .filter(|a| !a.read_only)
                    .map(|a| a.image_handle),
            )
            .chain(self.image_writes.iter().copied())
    }

    /// Every image this pass reads, including attachment reads (read-only
    /// depth, and loaded-not-cleared attachments).
    pub fn all_image_reads(&self) -> impl Iterator<Item = ImageHandle> + '_ {
        self.depth_attachment
            .iter()
            .filter(|a| a.read_only)
            .map(|a| a.image_handle)
            .chain(self.image_reads.iter().copied())
    }
}
