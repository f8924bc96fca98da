//! Pipeline registry: shader/pipeline families and per-instance
//! descriptor state.

pub mod description;
pub mod domain;
pub mod instance_state;
pub mod registry;
pub mod state;

pub use description::{CullMode, GraphicsPipelineDescription, ShaderConfig};
pub use domain::PipelineDomain;
pub use instance_state::{InstanceState, InstanceStateHandle, InstanceStateTracker};
pub use registry::{BackendPipelineHandle, Pipeline, PipelineBackend, PipelineHandle, PipelineRegistry};
pub use state::PipelineState;
