//! # render_graph
//!
//! The core of a real-time graphics engine built around a declarative,
//! compiled render graph: a typed memory allocator with scoped
//! temporaries, a pipeline registry, a Phong-style material system, and
//! the render graph itself (resource arena, builder, compiler, executor).
//! A JSON loader lowers authored graphs into the in-memory form, and a
//! layer system attaches passes to it per view (world, UI, shadow, ...).
//!
//! The Vulkan backend proper, asset loading, and platform windowing are
//! out of scope: this crate defines the traits
//! ([`texture::TextureBackend`], [`buffer::BufferBackend`],
//! [`graph::resource::GraphBackend`], [`pipeline::registry::PipelineBackend`])
//! those collaborators implement, and ships in-memory stub
//! implementations for tests and [`demo_host`](../demo_host)-style hosts.
//!
//! ## Quick start
//!
//! ```no_run
//! use render_graph::graph::{FrameInfo, PassType, RenderGraph};
//! use render_graph::graph::resource::{BackendBufferHandle, BackendImageHandle, GraphBackend, ImageDesc};
//!
//! struct NullBackend;
//! impl GraphBackend for NullBackend {
//!     fn create_image(&mut self, _desc: &ImageDesc) -> BackendImageHandle { BackendImageHandle(1) }
//!     fn destroy_image(&mut self, _handle: BackendImageHandle) {}
//!     fn create_buffer(&mut self, _desc: &render_graph::graph::resource::BufferDesc) -> BackendBufferHandle { BackendBufferHandle(1) }
//!     fn destroy_buffer(&mut self, _handle: BackendBufferHandle) {}
//! }
//!
//! let mut graph = RenderGraph::new(NullBackend, 2);
//! let present = graph.resources_mut().import_swapchain("swapchain", 1920, 1080, ash::vk::Format::B8G8R8A8_UNORM);
//! graph.add_pass(PassType::Graphics, "clear")
//!     .add_color_attachment(render_graph::graph::pass::AttachmentUse {
//!         image_handle: present,
//!         slice: render_graph::graph::pass::ImageSlice::default(),
//!         load_op: render_graph::graph::pass::LoadOp::Clear,
//!         store_op: render_graph::graph::pass::StoreOp::Store,
//!         clear_value: render_graph::graph::pass::ClearValue::Color([0.1, 0.2, 0.3, 1.0]),
//!         read_only: false,
//!     })
//!     .set_execute(|_ctx| {});
//! graph.set_present_image(present);
//! graph.compile().unwrap();
//! graph.execute(&FrameInfo::default()).unwrap();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod buffer;
pub mod core;
pub mod error;
pub mod foundation;
pub mod graph;
pub mod handle;
pub mod material;
pub mod pipeline;
pub mod texture;
pub mod view;

pub use error::{ErrorKind, RenderGraphError, Result};
pub use handle::{GenerationalArena, Handle};

/// Common imports for hosts embedding this crate.
pub mod prelude {
    pub use crate::buffer::{BufferBackend, BufferHandle, RetiredBufferRing};
    pub use crate::error::{ErrorKind, RenderGraphError, Result};
    pub use crate::foundation::math::{Mat4, Vec3, Vec4};
    pub use crate::graph::{FrameInfo, PassType, RenderGraph};
    pub use crate::handle::{GenerationalArena, Handle};
    pub use crate::material::{MaterialHandle, MaterialSystem};
    pub use crate::pipeline::{PipelineDomain, PipelineHandle, PipelineRegistry};
    pub use crate::texture::{TextureBackend, TextureHandle};
    pub use crate::view::{LayerHandle, LayerSystem};
}
