//! A thin demo host: wires in-memory stub backends to a render graph,
//! a pipeline registry, a material system, and a layer system, then
//! drives a handful of frames through them.
//!
//! Mirrors the shape of a `teapot_app`-style binary (create
//! collaborators, run a frame loop, log as it goes) with the windowing
//! and Vulkan device creation stripped out, since this crate treats the
//! Vulkan backend as an external collaborator it only defines traits
//! for.

use render_graph::graph::resource::{
    BackendBufferHandle, BackendImageHandle, BufferDesc, GraphBackend, ImageDesc,
};
use render_graph::graph::{FrameInfo, PassType, RenderGraph};
use render_graph::material::{MaterialSystem, UniformValue};
use render_graph::pipeline::{
    BackendPipelineHandle, CullMode, GraphicsPipelineDescription, InstanceStateHandle,
    PipelineBackend, PipelineDomain, PipelineRegistry,
};
use render_graph::texture::{DefaultTextures, StubTextureBackend, TextureBackend, TextureHandle};
use render_graph::view::{LayerCallbacks, LayerConfig, LayerContext, LayerSystem, RenderInfo};

/// A headless stand-in for a Vulkan device: hands out incrementing
/// opaque ids and logs what it's asked to do rather than touching a GPU.
#[derive(Default)]
struct LoggingBackend {
    next_image: u64,
    next_buffer: u64,
    next_pipeline: u64,
}

impl GraphBackend for LoggingBackend {
    fn create_image(&mut self, desc: &ImageDesc) -> BackendImageHandle {
        self.next_image += 1;
        log::debug!(
            "create_image #{} ({}x{}, {:?})",
            self.next_image,
            desc.width,
            desc.height,
            desc.format
        );
        BackendImageHandle(self.next_image)
    }

    fn destroy_image(&mut self, handle: BackendImageHandle) {
        log::debug!("destroy_image #{}", handle.0);
    }

    fn create_buffer(&mut self, desc: &BufferDesc) -> BackendBufferHandle {
        self.next_buffer += 1;
        log::debug!("create_buffer #{} ({} bytes)", self.next_buffer, desc.size);
        BackendBufferHandle(self.next_buffer)
    }

    fn destroy_buffer(&mut self, handle: BackendBufferHandle) {
        log::debug!("destroy_buffer #{}", handle.0);
    }
}

impl PipelineBackend for LoggingBackend {
    fn create_pipeline(&mut self, desc: &GraphicsPipelineDescription) -> BackendPipelineHandle {
        self.next_pipeline += 1;
        log::debug!(
            "create_pipeline #{} ({:?}, cull {:?})",
            self.next_pipeline,
            desc.domain,
            desc.cull_mode
        );
        BackendPipelineHandle(self.next_pipeline)
    }

    fn destroy_pipeline(&mut self, handle: BackendPipelineHandle) {
        log::debug!("destroy_pipeline #{}", handle.0);
    }

    fn bind_pipeline(&mut self, handle: BackendPipelineHandle) {
        log::trace!("bind_pipeline #{}", handle.0);
    }

    fn create_instance_state(&mut self, _pipeline: BackendPipelineHandle) -> InstanceStateHandle {
        InstanceStateHandle::default()
    }

    fn release_instance_state(&mut self, _state: InstanceStateHandle) {}
}

/// A [`render_graph::material::ShaderSystem`] that logs every call
/// instead of writing to real descriptor sets.
struct LoggingShaderSystem;

impl render_graph::material::ShaderSystem for LoggingShaderSystem {
    fn use_shader(&mut self, name: &str) -> bool {
        log::trace!("use_shader '{name}'");
        true
    }

    fn uniform_set(&mut self, name: &str, value: UniformValue) {
        log::trace!("uniform_set '{name}' = {value:?}");
    }

    fn sampler_set(&mut self, name: &str, texture: TextureHandle) {
        log::trace!("sampler_set '{name}' = {texture:?}");
    }

    fn apply_global(&mut self) -> bool {
        true
    }

    fn apply_instance(&mut self) -> bool {
        true
    }

    fn bind_instance(&mut self, _local_state: InstanceStateHandle) {}
}

/// The demo's single world layer: binds the default pipeline and applies
/// global/instance material state each frame.
struct WorldLayer {
    pipeline: render_graph::pipeline::PipelineHandle,
}

impl LayerCallbacks for WorldLayer {
    fn on_render(&mut self, ctx: LayerContext<'_>, render_info: RenderInfo<'_>) {
        log::info!(
            "layer '{}' rendering frame {} with pipeline {:?}",
            ctx.name,
            render_info.frame.frame_index,
            self.pipeline
        );
    }
}

fn build_material_system(texture_backend: &mut StubTextureBackend) -> MaterialSystem {
    let defaults = DefaultTextures {
        white: texture_backend.texture_create(1, 1),
        flat_normal: texture_backend.texture_create(1, 1),
    };
    MaterialSystem::new(defaults)
}

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("starting render_graph demo host");

    let mut backend = LoggingBackend::default();
    let mut texture_backend = StubTextureBackend::new();
    let mut pipelines = PipelineRegistry::new(LoggingBackend::default());
    let mut materials = build_material_system(&mut texture_backend);
    let mut layers = LayerSystem::new();

    let world_pipeline = pipelines.create_graphics_pipeline(
        GraphicsPipelineDescription {
            domain: PipelineDomain::World,
            vertex_shader_path: "shaders/world.vert.spv".to_string(),
            fragment_shader_path: "shaders/world.frag.spv".to_string(),
            depth_test: true,
            depth_write: true,
            blend_enabled: false,
            cull_mode: CullMode::Back,
        },
        "shader.default.world",
    );

    let world_layer = layers.register_layer(
        LayerConfig {
            name: "world".to_string(),
            order: 0,
            width: 1920,
            height: 1080,
        },
        Box::new(WorldLayer {
            pipeline: world_pipeline,
        }),
    );
    layers.attach(world_layer);

    let mut graph = RenderGraph::new(backend, 2);
    let present = graph.resources_mut().import_swapchain(
        "present",
        1920,
        1080,
        ash::vk::Format::B8G8R8A8_UNORM,
    );
    graph
        .add_pass(PassType::Graphics, "clear")
        .add_color_attachment(render_graph::graph::pass::AttachmentUse {
            image_handle: present,
            slice: render_graph::graph::pass::ImageSlice::default(),
            load_op: render_graph::graph::pass::LoadOp::Clear,
            store_op: render_graph::graph::pass::StoreOp::Store,
            clear_value: render_graph::graph::pass::ClearValue::Color([0.05, 0.05, 0.08, 1.0]),
            read_only: false,
        })
        .set_execute(move |_ctx| {
            log::trace!("clear pass executed");
        });
    graph.set_present_image(present);

    if let Err(err) = graph.compile() {
        log::error!("graph compile failed: {err}");
        std::process::exit(1);
    }

    let mut shader = LoggingShaderSystem;
    let mut frame = FrameInfo::default();
    for frame_index in 0..3u64 {
        frame.frame_index = frame_index;
        frame.image_index = (frame_index % 2) as u32;

        pipelines.begin_frame();
        layers.render_all(&frame);

        pipelines.bind_pipeline(world_pipeline);
        materials.apply_global(&mut shader, PipelineDomain::World);
        materials.apply_instance(
            materials.default_handle(),
            PipelineDomain::World,
            &texture_backend,
            &mut shader,
        );

        if let Err(err) = graph.execute(&frame) {
            log::error!("graph execute failed: {err}");
            break;
        }

        for timing in graph.pass_timings() {
            log::info!(
                "frame {} pass '{}': {} us",
                frame_index,
                timing.pass_name,
                timing.cpu_micros
            );
        }
    }

    pipelines.release(world_pipeline);
    log::info!("demo host finished");
}
