//! The per-frame executor: runs the compiled schedule, recording barriers
//! and invoking each pass's callback in order.

use crate::error::{RenderGraphError, Result};
use crate::foundation::time::Stopwatch;

use super::barrier::{Barrier, ImageAccess};
use super::frame::FrameInfo;
use super::graph::RenderGraph;
use super::pass::{Pass, PassType};
use super::resource::GraphBackend;

/// A render-target bundle for one pass at one swapchain image index —
/// just the attachment list; the executor/host resolves these into real
/// backend image views.
pub struct RenderTarget<'a> {
    /// The pass's color attachments, in binding order.
    pub colors: &'a [super::pass::AttachmentUse],
    /// The pass's depth attachment, if any.
    pub depth: Option<&'a super::pass::AttachmentUse>,
}

/// The state handed to a pass's execute callback.
pub struct PassContext<'a> {
    /// This pass's declaration, including its attachment/read/write sets.
    pub pass: &'a Pass,
    /// This pass's index within the declared (not scheduled) pass list.
    pub pass_index: usize,
    /// The render target for graphics passes.
    pub render_target: Option<RenderTarget<'a>>,
    /// The barriers precomputed at compile time to run before this pass.
    pub barriers: &'a [Barrier],
    /// Current frame/image index and timing.
    pub frame: &'a FrameInfo,
}

/// CPU timing recorded for one executed pass.
#[derive(Debug, Clone)]
pub struct PassTiming {
    /// The pass's declaration-time name.
    pub pass_name: String,
    /// Wall-clock CPU time spent inside this pass's execute callback.
    pub cpu_micros: u64,
}

impl<B: GraphBackend> RenderGraph<B> {
    /// Run one frame through the compiled schedule.
    ///
    /// `execute` is a fatal error before the graph has been compiled.
    /// Transitions the present/exported images to their final layout
    /// after the last pass runs.
    pub fn execute(&mut self, frame: &FrameInfo) -> Result<()> {
        let Some(schedule) = self.schedule.take() else {
            return Err(RenderGraphError::InvalidParameter(
                "execute called before compile".to_string(),
            ));
        };

        self.timings.clear();
        for (position, &pass_index) in schedule.pass_order.iter().enumerate() {
            if self.passes[pass_index].flags.contains(super::pass::PassFlags::DISABLED) {
                continue;
            }

            let barriers = &schedule.barriers[position];

            // The boxed callback is moved out for the call so the pass
            // itself can be borrowed immutably to build the context; it
            // is always put back afterward regardless of which branch ran.
            let mut direct = self.passes[pass_index].execute.take();
            let execute_name = self.passes[pass_index].execute_name.clone();

            let stopwatch = Stopwatch::start_new();
            if let Some(callback) = direct.as_mut() {
                let pass_ref = &self.passes[pass_index];
                let mut ctx = PassContext {
                    pass: pass_ref,
                    pass_index,
                    render_target: (pass_ref.ty == PassType::Graphics).then(|| RenderTarget {
                        colors: &pass_ref.color_attachments,
                        depth: pass_ref.depth_attachment.as_ref(),
                    }),
                    barriers,
                    frame,
                };
                callback(&mut ctx);
            } else if let Some(name) = execute_name {
                if let Some(callback) = self.executors.get_mut(&name) {
                    let pass_ref = &self.passes[pass_index];
                    let mut ctx = PassContext {
                        pass: pass_ref,
                        pass_index,
                        render_target: (pass_ref.ty == PassType::Graphics).then(|| RenderTarget {
                            colors: &pass_ref.color_attachments,
                            depth: pass_ref.depth_attachment.as_ref(),
                        }),
                        barriers,
                        frame,
                    };
                    callback(&mut ctx);
                }
            }
            self.passes[pass_index].execute = direct;

            self.timings.push(PassTiming {
                pass_name: self.passes[pass_index].name.clone(),
                cpu_micros: (stopwatch.elapsed_secs() * 1_000_000.0) as u64,
            });
        }

        let image_index = frame.image_index as usize;
        for &image in self.exported_images.iter().chain(self.present_image.iter()) {
            if let Some(resource) = self.resources.image_mut(image) {
                let target = if Some(image) == self.present_image {
                    ImageAccess::Present
                } else {
                    ImageAccess::ShaderReadOnly
                };
                if let Some(layout) = resource.layout_per_image.get_mut(image_index) {
                    *layout = target.layout();
                }
            }
        }

        self.schedule = Some(schedule);
        Ok(())
    }
}
