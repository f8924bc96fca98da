//! The render graph: declaration, compiler, executor, and JSON loader.

pub mod barrier;
pub mod compile;
pub mod execute;
pub mod frame;
pub mod graph;
pub mod json;
pub mod pass;
pub mod resource;

pub use barrier::{Barrier, ImageAccess};
pub use execute::{PassContext, PassTiming, RenderTarget};
pub use frame::FrameInfo;
pub use graph::{CompiledSchedule, PassBuilder, RenderGraph};
pub use json::{load_graph_document, GraphDocument};
pub use pass::{AttachmentUse, ClearValue, ImageSlice, LoadOp, Pass, PassFlags, PassType, StoreOp};
pub use resource::{
    BackendBufferHandle, BackendImageHandle, BufferDesc, ExtentMode, GraphBackend,
    GraphBufferHandle, ImageDesc, ImageHandle, ImportInfo, ResourceArena, ResourceFlags,
    ResourceStats,
};
