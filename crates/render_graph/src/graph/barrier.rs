//! Barrier inference: deriving the layout/access transitions a compiled
//! schedule needs from the image uses each pass declares.

use ash::vk;
use std::collections::HashMap;

use super::pass::Pass;
use super::resource::{ImageHandle, ResourceArena};

/// The purpose an image is put to by one pass, which determines its
/// target layout/access/stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageAccess {
    /// Written as a color attachment.
    ColorAttachmentWrite,
    /// Written as a depth attachment.
    DepthAttachmentWrite,
    /// Read as a depth attachment, never cleared.
    DepthReadOnly,
    /// Sampled by a shader.
    ShaderReadOnly,
    /// Source of a transfer (copy/blit) operation.
    TransferSrc,
    /// Destination of a transfer operation.
    TransferDst,
    /// The final layout required for presentation.
    Present,
}

impl ImageAccess {
    /// The Vulkan layout this access requires.
    pub const fn layout(self) -> vk::ImageLayout {
        match self {
            Self::ColorAttachmentWrite => vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
            Self::DepthAttachmentWrite => vk::ImageLayout::DEPTH_ATTACHMENT_OPTIMAL,
            Self::DepthReadOnly => vk::ImageLayout::DEPTH_STENCIL_READ_ONLY_OPTIMAL,
            Self::ShaderReadOnly => vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
            Self::TransferSrc => vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
            Self::TransferDst => vk::ImageLayout::TRANSFER_DST_OPTIMAL,
            Self::Present => vk::ImageLayout::PRESENT_SRC_KHR,
        }
    }

    /// The access mask this use performs.
    pub const fn access_mask(self) -> vk::AccessFlags {
        match self {
            Self::ColorAttachmentWrite => vk::AccessFlags::COLOR_ATTACHMENT_WRITE,
            Self::DepthAttachmentWrite => vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE,
            Self::DepthReadOnly => vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_READ,
            Self::ShaderReadOnly => vk::AccessFlags::SHADER_READ,
            Self::TransferSrc => vk::AccessFlags::TRANSFER_READ,
            Self::TransferDst => vk::AccessFlags::TRANSFER_WRITE,
            Self::Present => vk::AccessFlags::empty(),
        }
    }

    /// The pipeline stage this use executes in.
    pub const fn stage(self) -> vk::PipelineStageFlags {
        match self {
            Self::ColorAttachmentWrite => vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT,
            Self::DepthAttachmentWrite | Self::DepthReadOnly => {
                vk::PipelineStageFlags::EARLY_FRAGMENT_TESTS
            }
            Self::ShaderReadOnly => vk::PipelineStageFlags::FRAGMENT_SHADER,
            Self::TransferSrc | Self::TransferDst => vk::PipelineStageFlags::TRANSFER,
            Self::Present => vk::PipelineStageFlags::BOTTOM_OF_PIPE,
        }
    }
}

/// A single layout/access transition to emit before a pass runs.
#[derive(Debug, Clone, Copy)]
pub struct Barrier {
    /// The image being transitioned.
    pub image: ImageHandle,
    /// Stage to wait on.
    pub src_stage: vk::PipelineStageFlags,
    /// Stage that performs the new access.
    pub dst_stage: vk::PipelineStageFlags,
    /// Access mask being waited on.
    pub src_access: vk::AccessFlags,
    /// Access mask of the new use.
    pub dst_access: vk::AccessFlags,
    /// Layout before the transition.
    pub old_layout: vk::ImageLayout,
    /// Layout after the transition.
    pub new_layout: vk::ImageLayout,
}

/// Per-image transition state tracked while walking the schedule.
#[derive(Debug, Clone, Copy)]
struct TrackedState {
    layout: vk::ImageLayout,
    access: vk::AccessFlags,
    stage: vk::PipelineStageFlags,
}

/// Compute, for `uses` (in the order they're touched by this pass), the
/// barriers needed to bring each image from its previously tracked state
/// into `access`. Updates `tracked` in place. The first use of an image
/// coming from an unset/imported-undefined state sources from `UNDEFINED`.
fn infer_pass_barriers(
    uses: &[(ImageHandle, ImageAccess)],
    resources: &ResourceArena,
    tracked: &mut HashMap<ImageHandle, TrackedState>,
) -> Vec<Barrier> {
    let mut barriers = Vec::new();
    for &(image, access) in uses {
        let prior = tracked.entry(image).or_insert_with(|| {
            let initial_layout = resources
                .image(image)
                .and_then(|img| img.import.as_ref())
                .map_or(vk::ImageLayout::UNDEFINED, |import| import.initial_layout);
            TrackedState {
                layout: initial_layout,
                access: vk::AccessFlags::empty(),
                stage: vk::PipelineStageFlags::TOP_OF_PIPE,
            }
        });
        let needs_transition = prior.layout != access.layout() || !prior.access.is_empty();
        if needs_transition {
            barriers.push(Barrier {
                image,
                src_stage: prior.stage,
                dst_stage: access.stage(),
                src_access: prior.access,
                dst_access: access.access_mask(),
                old_layout: prior.layout,
                new_layout: access.layout(),
            });
        }
        prior.layout = access.layout();
        prior.access = access.access_mask();
        prior.stage = access.stage();
    }
    barriers
}

/// Walk a full schedule in order, returning one barrier list per
/// scheduled pass.
pub fn infer_schedule_barriers(
    schedule: &[usize],
    passes: &[Pass],
    resources: &ResourceArena,
) -> Vec<Vec<Barrier>> {
    let mut tracked: HashMap<ImageHandle, TrackedState> = HashMap::new();
    schedule
        .iter()
        .map(|&pass_index| {
            let uses = pass_image_uses(&passes[pass_index]);
            infer_pass_barriers(&uses, resources, &mut tracked)
        })
        .collect()
}

/// Derive the `(image, access)` uses a pass performs, in write-then-read
/// order, for barrier inference.
fn pass_image_uses(pass: &Pass) -> Vec<(ImageHandle, ImageAccess)> {
    let mut uses = Vec::new();
    for attachment in &pass.color_attachments {
        uses.push((attachment.image_handle, ImageAccess::ColorAttachmentWrite));
    }
    if let Some(depth) = &pass.depth_attachment {
        let access = if depth.read_only {
            ImageAccess::DepthReadOnly
        } else {
            ImageAccess::DepthAttachmentWrite
        };
        uses.push((depth.image_handle, access));
    }
    for &image in &pass.image_writes {
        uses.push((
            image,
            if pass.ty == super::pass::PassType::Transfer {
                ImageAccess::TransferDst
            } else {
                ImageAccess::ShaderReadOnly
            },
        ));
    }
    for &image in &pass.image_reads {
        uses.push((
            image,
            if pass.ty == super::pass::PassType::Transfer {
                ImageAccess::TransferSrc
            } else {
                ImageAccess::ShaderReadOnly
            },
        ));
    }
    uses
}
