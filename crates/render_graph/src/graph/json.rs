//! The JSON render-graph document format: a versioned document that
//! lowers into the builder calls on [`super::graph::RenderGraph`].
//!
//! Grounded on `core::config`'s pattern of a serde struct plus a
//! `load_from_file` entry point, generalized from TOML/RON onto
//! `serde_json` since this document format is JSON rather than a config
//! file.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use ash::vk;
use serde::Deserialize;

use crate::error::{RenderGraphError, Result};
use crate::pipeline::PipelineDomain;

use super::frame::FrameInfo;
use super::graph::RenderGraph;
use super::pass::{AttachmentUse, ClearValue, ImageSlice, LoadOp, PassFlags, PassType, StoreOp};
use super::resource::{
    BufferDesc, ExtentMode, GraphBackend, GraphBufferHandle, ImageDesc, ImageHandle, ResourceFlags,
};

/// `resources[].condition` / `passes[].condition`.
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// Always included.
    #[default]
    None,
    /// Only when [`FrameInfo::editor_enabled`] is `true`.
    EditorEnabled,
    /// Only when [`FrameInfo::editor_enabled`] is `false`.
    EditorDisabled,
}

impl Condition {
    fn evaluate(self, frame: &FrameInfo) -> bool {
        match self {
            Self::None => true,
            Self::EditorEnabled => frame.editor_enabled,
            Self::EditorDisabled => !frame.editor_enabled,
        }
    }
}

/// A value that may be authored as a literal integer or a token resolved
/// against [`FrameInfo`].
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IntOrToken {
    /// An authored literal, used as-is without touching `FrameInfo`.
    Literal(u32),
    /// A name resolved against `FrameInfo` at lowering time.
    Token(String),
}

fn resolve_token(frame: &FrameInfo, token: &str) -> Result<u32> {
    match token {
        "shadow_cascade_count" => Ok(frame.shadow_cascade_count),
        "window_w" => Ok(frame.window_w),
        "window_h" => Ok(frame.window_h),
        "viewport_w" => Ok(frame.viewport_w),
        "viewport_h" => Ok(frame.viewport_h),
        other => Err(RenderGraphError::InvalidParameter(format!(
            "unknown frame-info token '{other}'"
        ))),
    }
}

impl IntOrToken {
    /// Resolve to a concrete value. A [`Self::Literal`] is used directly
    /// without consulting `frame` at all, on the theory that a literal
    /// count was already expanded by whoever authored the document; only
    /// [`Self::Token`] is looked up against `FrameInfo`.
    pub fn resolve(&self, frame: &FrameInfo) -> Result<u32> {
        match self {
            Self::Literal(value) => Ok(*value),
            Self::Token(token) => resolve_token(frame, token),
        }
    }
}

/// `resources[].repeat` / `passes[].repeat`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RepeatDecl {
    /// The repeat count, literal or token. Absent means "not repeated".
    pub count: Option<IntOrToken>,
}

impl RepeatDecl {
    fn count(&self, frame: &FrameInfo) -> Result<u32> {
        match &self.count {
            Some(value) => value.resolve(frame),
            None => Ok(1),
        }
    }
}

/// `resources[].image.extent`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ExtentDecl {
    /// Extent interpretation mode.
    pub mode: ExtentModeDecl,
    /// Authored width; meaning depends on `mode`.
    #[serde(default)]
    pub width: u32,
    /// Authored height.
    #[serde(default)]
    pub height: u32,
    /// For `mode: square`, which of `width`/`height` the square edge is
    /// taken from.
    #[serde(default)]
    pub size_source: Option<String>,
}

/// `extent.mode`.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtentModeDecl {
    /// Matches the current window size.
    Window,
    /// Matches the current render viewport size.
    Viewport,
    /// A fixed `width`/`height`.
    Fixed,
    /// Square, sized from `size_source`.
    Square,
}

impl From<ExtentModeDecl> for ExtentMode {
    fn from(value: ExtentModeDecl) -> Self {
        match value {
            ExtentModeDecl::Window => Self::Window,
            ExtentModeDecl::Viewport => Self::Viewport,
            ExtentModeDecl::Fixed => Self::Fixed,
            ExtentModeDecl::Square => Self::Square,
        }
    }
}

/// `resources[].image`.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageDecl {
    /// Whether this image is imported rather than created.
    #[serde(default)]
    pub is_import: bool,
    /// Name of the externally-owned image to import, when `is_import`.
    #[serde(default)]
    pub import_name: Option<String>,
    /// `"swapchain"` resolves against the active frame's swapchain
    /// format; any other string names a `VK_FORMAT_*` enumerant with the
    /// `VK_FORMAT_` prefix dropped.
    #[serde(default)]
    pub format: Option<String>,
    /// Usage flag tokens (e.g. `"color_attachment"`, `"sampled"`).
    #[serde(default)]
    pub usage: Vec<String>,
    /// Array layer count, literal or token.
    #[serde(default)]
    pub layers: Option<IntOrToken>,
    /// Mip level count.
    #[serde(default = "default_mips")]
    pub mips: u32,
    pub extent: ExtentDecl,
}

const fn default_mips() -> u32 {
    1
}

/// `resources[].buffer`.
#[derive(Debug, Clone, Deserialize)]
pub struct BufferDecl {
    /// Size in bytes.
    pub size: u64,
    /// Usage flag tokens (e.g. `"vertex"`, `"index"`, `"uniform"`).
    #[serde(default)]
    pub usage: Vec<String>,
}

/// `resources[]`.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceDecl {
    /// Declaration-time name. Repeat-expanded copies get `{i}` substituted.
    pub name: String,
    /// `"image"` or `"buffer"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Inclusion condition.
    #[serde(default)]
    pub condition: Condition,
    /// Repeat expansion.
    #[serde(default)]
    pub repeat: RepeatDecl,
    /// Resource flag tokens (e.g. `"transient"`, `"per_image"`).
    #[serde(default)]
    pub flags: Vec<String>,
    /// Populated when `type == "image"`.
    pub image: Option<ImageDecl>,
    /// Populated when `type == "buffer"`.
    pub buffer: Option<BufferDecl>,
}

/// `passes[].attachments.colors[]` / `.depth`.
#[derive(Debug, Clone, Deserialize)]
pub struct AttachmentDecl {
    /// Name of the image resource (post repeat-expansion) bound here.
    pub image: String,
    /// Load behavior token (`"load"`, `"clear"`, `"dont_care"`).
    #[serde(default = "default_load_op")]
    pub load_op: String,
    /// Store behavior token (`"store"`, `"dont_care"`).
    #[serde(default = "default_store_op")]
    pub store_op: String,
    /// Clear color, meaningful only when `load_op == "clear"`.
    #[serde(default)]
    pub clear_color: Option<[f32; 4]>,
    /// Clear depth, meaningful only for the depth attachment.
    #[serde(default)]
    pub clear_depth: Option<f32>,
    /// Clear stencil, meaningful only for the depth attachment.
    #[serde(default)]
    pub clear_stencil: Option<u32>,
    /// Whether this attachment is bound read-only.
    #[serde(default)]
    pub read_only: bool,
}

fn default_load_op() -> String {
    "dont_care".to_string()
}

fn default_store_op() -> String {
    "store".to_string()
}

fn parse_load_op(token: &str) -> Result<LoadOp> {
    match token {
        "load" => Ok(LoadOp::Load),
        "clear" => Ok(LoadOp::Clear),
        "dont_care" => Ok(LoadOp::DontCare),
        other => Err(RenderGraphError::InvalidParameter(format!(
            "unknown load_op '{other}'"
        ))),
    }
}

fn parse_store_op(token: &str) -> Result<StoreOp> {
    match token {
        "store" => Ok(StoreOp::Store),
        "dont_care" => Ok(StoreOp::DontCare),
        other => Err(RenderGraphError::InvalidParameter(format!(
            "unknown store_op '{other}'"
        ))),
    }
}

/// `passes[].attachments`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AttachmentsDecl {
    /// Color attachments in binding order.
    #[serde(default)]
    pub colors: Vec<AttachmentDecl>,
    /// Optional depth attachment.
    #[serde(default)]
    pub depth: Option<AttachmentDecl>,
}

/// `passes[]`.
#[derive(Debug, Clone, Deserialize)]
pub struct PassDecl {
    /// Declaration-time name. Repeat-expanded copies get `{i}` substituted.
    pub name: String,
    /// `"graphics"`, `"compute"`, or `"transfer"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Pass flag tokens (e.g. `"no_cull"`, `"disabled"`).
    #[serde(default)]
    pub flags: Vec<String>,
    /// Pipeline domain token, if the pass renders one.
    #[serde(default)]
    pub domain: Option<String>,
    /// Inclusion condition.
    #[serde(default)]
    pub condition: Condition,
    /// Repeat expansion.
    #[serde(default)]
    pub repeat: RepeatDecl,
    /// Non-attachment image/buffer reads, by resource name.
    #[serde(default)]
    pub reads: Vec<String>,
    /// Non-attachment image/buffer writes, by resource name.
    #[serde(default)]
    pub writes: Vec<String>,
    /// Attachment bindings.
    #[serde(default)]
    pub attachments: AttachmentsDecl,
    /// Name of the executor this pass resolves its callback from.
    #[serde(default)]
    pub execute: Option<String>,
}

fn parse_pass_type(token: &str) -> Result<PassType> {
    match token {
        "graphics" => Ok(PassType::Graphics),
        "compute" => Ok(PassType::Compute),
        "transfer" => Ok(PassType::Transfer),
        other => Err(RenderGraphError::InvalidParameter(format!(
            "unknown pass type '{other}'"
        ))),
    }
}

fn parse_domain(token: &str) -> Result<PipelineDomain> {
    match token {
        "world" => Ok(PipelineDomain::World),
        "world_transparent" => Ok(PipelineDomain::WorldTransparent),
        "ui" => Ok(PipelineDomain::Ui),
        "shadow" => Ok(PipelineDomain::Shadow),
        "post" => Ok(PipelineDomain::Post),
        other => Err(RenderGraphError::InvalidParameter(format!(
            "unknown pipeline domain '{other}'"
        ))),
    }
}

fn parse_format(token: &str) -> Result<vk::Format> {
    match token {
        "r8g8b8a8_unorm" => Ok(vk::Format::R8G8B8A8_UNORM),
        "b8g8r8a8_unorm" => Ok(vk::Format::B8G8R8A8_UNORM),
        "r16g16b16a16_sfloat" => Ok(vk::Format::R16G16B16A16_SFLOAT),
        "r32g32b32a32_sfloat" => Ok(vk::Format::R32G32B32A32_SFLOAT),
        "d32_sfloat" => Ok(vk::Format::D32_SFLOAT),
        "d24_unorm_s8_uint" => Ok(vk::Format::D24_UNORM_S8_UINT),
        other => Err(RenderGraphError::InvalidParameter(format!(
            "unknown format '{other}'"
        ))),
    }
}

fn parse_image_usage(tokens: &[String]) -> Result<vk::ImageUsageFlags> {
    let mut flags = vk::ImageUsageFlags::empty();
    for token in tokens {
        flags |= match token.as_str() {
            "color_attachment" => vk::ImageUsageFlags::COLOR_ATTACHMENT,
            "depth_stencil_attachment" => vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT,
            "sampled" => vk::ImageUsageFlags::SAMPLED,
            "storage" => vk::ImageUsageFlags::STORAGE,
            "transfer_src" => vk::ImageUsageFlags::TRANSFER_SRC,
            "transfer_dst" => vk::ImageUsageFlags::TRANSFER_DST,
            other => {
                return Err(RenderGraphError::InvalidParameter(format!(
                    "unknown image usage '{other}'"
                )))
            }
        };
    }
    Ok(flags)
}

fn parse_buffer_usage(tokens: &[String]) -> Result<vk::BufferUsageFlags> {
    let mut flags = vk::BufferUsageFlags::empty();
    for token in tokens {
        flags |= match token.as_str() {
            "vertex" => vk::BufferUsageFlags::VERTEX_BUFFER,
            "index" => vk::BufferUsageFlags::INDEX_BUFFER,
            "uniform" => vk::BufferUsageFlags::UNIFORM_BUFFER,
            "storage" => vk::BufferUsageFlags::STORAGE_BUFFER,
            "transfer_src" => vk::BufferUsageFlags::TRANSFER_SRC,
            "transfer_dst" => vk::BufferUsageFlags::TRANSFER_DST,
            other => {
                return Err(RenderGraphError::InvalidParameter(format!(
                    "unknown buffer usage '{other}'"
                )))
            }
        };
    }
    Ok(flags)
}

fn parse_resource_flags(tokens: &[String]) -> Result<ResourceFlags> {
    let mut flags = ResourceFlags::empty();
    for token in tokens {
        flags |= match token.as_str() {
            "transient" => ResourceFlags::TRANSIENT,
            "persistent" => ResourceFlags::PERSISTENT,
            "external" => ResourceFlags::EXTERNAL,
            "per_image" => ResourceFlags::PER_IMAGE,
            "resizable" => ResourceFlags::RESIZABLE,
            "force_array" => ResourceFlags::FORCE_ARRAY,
            other => {
                return Err(RenderGraphError::InvalidParameter(format!(
                    "unknown resource flag '{other}'"
                )))
            }
        };
    }
    Ok(flags)
}

fn parse_pass_flags(tokens: &[String]) -> Result<PassFlags> {
    let mut flags = PassFlags::empty();
    for token in tokens {
        flags |= match token.as_str() {
            "no_cull" => PassFlags::NO_CULL,
            "disabled" => PassFlags::DISABLED,
            other => {
                return Err(RenderGraphError::InvalidParameter(format!(
                    "unknown pass flag '{other}'"
                )))
            }
        };
    }
    Ok(flags)
}

/// `outputs`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct OutputsDecl {
    /// Name of the resource designated the present target.
    pub present: Option<String>,
    /// Names of images that must retain their final layout beyond this graph.
    #[serde(default)]
    pub export_images: Vec<String>,
    /// Names of buffers that must retain their final access beyond this graph.
    #[serde(default)]
    pub export_buffers: Vec<String>,
}

/// The authored JSON render-graph document.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphDocument {
    /// Document schema version.
    pub version: u32,
    /// Human-readable graph name.
    pub name: String,
    /// Declared resources, before condition/repeat expansion.
    #[serde(default)]
    pub resources: Vec<ResourceDecl>,
    /// Declared passes, before condition/repeat expansion.
    #[serde(default)]
    pub passes: Vec<PassDecl>,
    /// Graph outputs.
    #[serde(default)]
    pub outputs: OutputsDecl,
}

/// Parse a document from its JSON text. Does not resolve tokens or expand
/// repeats — call [`build`] against a [`FrameInfo`] for that.
pub fn parse(text: &str) -> Result<GraphDocument> {
    serde_json::from_str(text).map_err(|e| RenderGraphError::InvalidParameter(e.to_string()))
}

/// Load and parse a document from `path`.
pub fn load_graph_document(path: impl AsRef<Path>) -> Result<GraphDocument> {
    let text = fs::read_to_string(path).map_err(|e| RenderGraphError::Backend(e.to_string()))?;
    parse(&text)
}

/// Expand `name`'s `{i}` template against repeat index `i`, for names that
/// contain the placeholder; names without it are returned unchanged so
/// singly-repeated (or unrepeated) declarations don't need the
/// placeholder.
fn expand_name(name: &str, index: u32) -> String {
    if name.contains("{i}") {
        name.replace("{i}", &index.to_string())
    } else {
        name.to_string()
    }
}

fn build_image_desc(decl: &ImageDecl, frame: &FrameInfo) -> Result<ImageDesc> {
    let format = match decl.format.as_deref() {
        None | Some("swapchain") => None,
        Some(other) => Some(parse_format(other)?),
    };
    let layers = match &decl.layers {
        Some(value) => value.resolve(frame)?,
        None => 1,
    };
    let (width, height) = match decl.extent.mode {
        ExtentModeDecl::Window => (frame.window_w, frame.window_h),
        ExtentModeDecl::Viewport => (frame.viewport_w, frame.viewport_h),
        ExtentModeDecl::Fixed => (decl.extent.width, decl.extent.height),
        ExtentModeDecl::Square => {
            let edge = match decl.extent.size_source.as_deref() {
                Some("height") => frame.viewport_h,
                _ => frame.viewport_w,
            };
            (edge, edge)
        }
    };
    Ok(ImageDesc {
        width,
        height,
        extent_mode: decl.extent.mode.into(),
        format,
        usage: parse_image_usage(&decl.usage)?,
        samples: vk::SampleCountFlags::TYPE_1,
        layers,
        mips: decl.mips,
    })
}

/// Resolve `doc` against `frame` and build it into `graph`: evaluate
/// conditions, expand repeats, and issue the corresponding
/// `resources_mut()`/`add_pass` builder calls.
pub fn build<B: GraphBackend>(
    graph: &mut RenderGraph<B>,
    doc: &GraphDocument,
    frame: &FrameInfo,
) -> Result<()> {
    let mut images: HashMap<String, ImageHandle> = HashMap::new();
    let mut buffers: HashMap<String, GraphBufferHandle> = HashMap::new();

    for decl in &doc.resources {
        if !decl.condition.evaluate(frame) {
            continue;
        }
        let count = decl.repeat.count(frame)?;
        let flags = parse_resource_flags(&decl.flags)?;
        for index in 0..count {
            let name = expand_name(&decl.name, index);
            match decl.kind.as_str() {
                "image" => {
                    let image_decl = decl.image.as_ref().ok_or_else(|| {
                        RenderGraphError::InvalidParameter(format!(
                            "resource '{name}' declares type image without an image body"
                        ))
                    })?;
                    let desc = build_image_desc(image_decl, frame)?;
                    let handle = if image_decl.is_import {
                        graph.resources_mut().import_image(
                            &name,
                            desc,
                            vk::ImageLayout::UNDEFINED,
                            vk::AccessFlags::empty(),
                        )
                    } else {
                        graph.resources_mut().create_image(&name, desc, flags)
                    };
                    images.insert(name, handle);
                }
                "buffer" => {
                    let buffer_decl = decl.buffer.as_ref().ok_or_else(|| {
                        RenderGraphError::InvalidParameter(format!(
                            "resource '{name}' declares type buffer without a buffer body"
                        ))
                    })?;
                    let desc = BufferDesc {
                        size: buffer_decl.size,
                        usage: parse_buffer_usage(&buffer_decl.usage)?,
                    };
                    let handle = graph.resources_mut().create_buffer(&name, desc, flags);
                    buffers.insert(name, handle);
                }
                other => {
                    return Err(RenderGraphError::InvalidParameter(format!(
                        "unknown resource type '{other}'"
                    )))
                }
            }
        }
    }

    let resolve_image = |name: &str| -> Result<ImageHandle> {
        images.get(name).copied().ok_or_else(|| {
            RenderGraphError::InvalidParameter(format!("pass references unknown image '{name}'"))
        })
    };
    let resolve_buffer = |name: &str| -> Result<GraphBufferHandle> {
        buffers.get(name).copied().ok_or_else(|| {
            RenderGraphError::InvalidParameter(format!("pass references unknown buffer '{name}'"))
        })
    };

    for decl in &doc.passes {
        if !decl.condition.evaluate(frame) {
            continue;
        }
        let count = decl.repeat.count(frame)?;
        let ty = parse_pass_type(&decl.kind)?;
        let flags = parse_pass_flags(&decl.flags)?;
        let domain = decl.domain.as_deref().map(parse_domain).transpose()?;

        for index in 0..count {
            let name = expand_name(&decl.name, index);
            let mut builder = graph.add_pass(ty, name).set_flags(flags);
            if let Some(domain) = domain {
                builder = builder.set_domain(domain);
            }
            if let Some(execute_name) = &decl.execute {
                builder = builder.set_execute_name(execute_name.clone());
            }
            for color in &decl.attachments.colors {
                let image_name = expand_name(&color.image, index);
                builder = builder.add_color_attachment(AttachmentUse {
                    image_handle: resolve_image(&image_name)?,
                    slice: ImageSlice {
                        base_layer: index,
                        ..ImageSlice::default()
                    },
                    load_op: parse_load_op(&color.load_op)?,
                    store_op: parse_store_op(&color.store_op)?,
                    clear_value: ClearValue::Color(color.clear_color.unwrap_or([0.0; 4])),
                    read_only: color.read_only,
                });
            }
            if let Some(depth) = &decl.attachments.depth {
                let image_name = expand_name(&depth.image, index);
                builder = builder.set_depth_attachment(AttachmentUse {
                    image_handle: resolve_image(&image_name)?,
                    slice: ImageSlice {
                        base_layer: index,
                        ..ImageSlice::default()
                    },
                    load_op: parse_load_op(&depth.load_op)?,
                    store_op: parse_store_op(&depth.store_op)?,
                    clear_value: ClearValue::DepthStencil {
                        depth: depth.clear_depth.unwrap_or(1.0),
                        stencil: depth.clear_stencil.unwrap_or(0),
                    },
                    read_only: depth.read_only,
                });
            }
            for read in &decl.reads {
                let read_name = expand_name(read, index);
                if let Some(&image) = images.get(&read_name) {
                    builder = builder.read_image(image);
                } else {
                    builder = builder.read_buffer(resolve_buffer(&read_name)?);
                }
            }
            for write in &decl.writes {
                let write_name = expand_name(write, index);
                if let Some(&image) = images.get(&write_name) {
                    builder = builder.write_image(image);
                } else {
                    builder = builder.write_buffer(resolve_buffer(&write_name)?);
                }
            }
            let _ = builder;
        }
    }

    if let Some(present) = &doc.outputs.present {
        graph.set_present_image(resolve_image(present)?);
    }
    for name in &doc.outputs.export_images {
        graph.export_image(resolve_image(name)?);
    }
    for name in &doc.outputs.export_buffers {
        graph.export_buffer(resolve_buffer(name)?);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::resource::{BackendBufferHandle, BackendImageHandle};

    struct NullBackend;
    impl GraphBackend for NullBackend {
        fn create_image(&mut self, _desc: &ImageDesc) -> BackendImageHandle {
            BackendImageHandle(1)
        }
        fn destroy_image(&mut self, _handle: BackendImageHandle) {}
        fn create_buffer(&mut self, _desc: &BufferDesc) -> BackendBufferHandle {
            BackendBufferHandle(1)
        }
        fn destroy_buffer(&mut self, _handle: BackendBufferHandle) {}
    }

    const SOLO_PRESENT_JSON: &str = r#"
    {
        "version": 1,
        "name": "solo_present",
        "resources": [
            {
                "name": "present",
                "type": "image",
                "image": {
                    "is_import": true,
                    "format": "swapchain",
                    "usage": ["color_attachment"],
                    "extent": { "mode": "window" }
                }
            }
        ],
        "passes": [
            {
                "name": "clear",
                "type": "graphics",
                "attachments": {
                    "colors": [
                        { "image": "present", "load_op": "clear", "store_op": "store", "clear_color": [0.1, 0.2, 0.3, 1.0] }
                    ]
                }
            }
        ],
        "outputs": { "present": "present" }
    }
    "#;

    #[test]
    fn parses_solo_present_document() {
        let doc = parse(SOLO_PRESENT_JSON).unwrap();
        assert_eq!(doc.version, 1);
        assert_eq!(doc.passes.len(), 1);
    }

    #[test]
    fn builds_solo_present_graph_and_compiles() {
        let doc = parse(SOLO_PRESENT_JSON).unwrap();
        let mut graph = RenderGraph::new(NullBackend, 2);
        let frame = FrameInfo::default();
        build(&mut graph, &doc, &frame).unwrap();
        graph.compile().unwrap();
        assert_eq!(graph.scheduled_pass_names().unwrap(), vec!["clear"]);
    }

    const SHADOW_REPEAT_JSON: &str = r#"
    {
        "version": 1,
        "name": "shadow_cascades",
        "resources": [
            {
                "name": "shadow_map_{i}",
                "type": "image",
                "repeat": { "count": "shadow_cascade_count" },
                "flags": ["transient"],
                "image": {
                    "format": "d32_sfloat",
                    "usage": ["depth_stencil_attachment"],
                    "extent": { "mode": "fixed", "width": 2048, "height": 2048 }
                }
            }
        ],
        "passes": [
            {
                "name": "shadow_cascade_{i}",
                "type": "graphics",
                "repeat": { "count": "shadow_cascade_count" },
                "domain": "shadow",
                "attachments": {
                    "depth": { "image": "shadow_map_{i}", "load_op": "clear", "store_op": "store" }
                }
            }
        ],
        "outputs": {}
    }
    "#;

    #[test]
    fn repeat_expansion_produces_one_pass_per_cascade() {
        let doc = parse(SHADOW_REPEAT_JSON).unwrap();
        let mut graph = RenderGraph::new(NullBackend, 1);
        let frame = FrameInfo {
            shadow_cascade_count: 4,
            ..FrameInfo::default()
        };
        build(&mut graph, &doc, &frame).unwrap();

        // Declared pass count: one per cascade, each a distinct name and
        // each carrying a distinct array_index via slice.base_layer.
        assert_eq!(graph.pass_count(), 4);
        for index in 0..4 {
            let expected_name = format!("shadow_cascade_{index}");
            let base_layer = graph.pass_depth_base_layer(&expected_name);
            assert_eq!(base_layer, Some(index));
        }
    }

    #[test]
    fn editor_condition_excludes_resource_when_disabled() {
        const DOC: &str = r#"
        {
            "version": 1,
            "name": "editor_gated",
            "resources": [
                {
                    "name": "editor_overlay",
                    "type": "image",
                    "condition": "editor_enabled",
                    "image": { "format": "swapchain", "usage": ["color_attachment"], "extent": { "mode": "window" } }
                }
            ],
            "passes": [],
            "outputs": {}
        }
        "#;
        let doc = parse(DOC).unwrap();
        let mut graph = RenderGraph::new(NullBackend, 1);
        let mut frame = FrameInfo::default();
        frame.editor_enabled = false;
        build(&mut graph, &doc, &frame).unwrap();
        assert_eq!(graph.resources().stats().live_images, 0);
    }

    #[test]
    fn literal_repeat_count_does_not_consult_frame_info() {
        let decl = RepeatDecl {
            count: Some(IntOrToken::Literal(3)),
        };
        let frame = FrameInfo::default();
        assert_eq!(decl.count(&frame).unwrap(), 3);
    }

    #[test]
    fn unknown_token_is_an_error() {
        let frame = FrameInfo::default();
        let err = resolve_token(&frame, "not_a_real_token").unwrap_err();
        assert!(matches!(err, RenderGraphError::InvalidParameter(_)));
    }
}
