//! The resource arena: image and buffer resources tracked by the render
//! graph.
//!
//! Grounded on `render::vulkan::core::texture`'s pattern of a
//! name-carrying, flag-tagged resource record, generalized onto the
//! graph's image/buffer duality and its import/transient/per-image flags.

use ash::vk;
use bitflags::bitflags;

use crate::handle::{GenerationalArena, Handle};

bitflags! {
    /// Lifetime/ownership flags for a graph resource.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ResourceFlags: u32 {
        /// May be aliased with other transients whose lifetime doesn't overlap.
        const TRANSIENT   = 1 << 0;
        /// Survives recompiles; not destroyed and recreated per frame.
        const PERSISTENT  = 1 << 1;
        /// Owned by the caller; the graph only reads/writes layout and access.
        const EXTERNAL    = 1 << 2;
        /// One physical resource per swapchain image index.
        const PER_IMAGE   = 1 << 3;
        /// Physical image is recreated on `begin_frame` if window/viewport size changed.
        const RESIZABLE   = 1 << 4;
        /// Always allocate as an array image even with `layers == 1`.
        const FORCE_ARRAY = 1 << 5;
    }
}

/// How an image's extent is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtentMode {
    /// Matches the current window size.
    Window,
    /// Matches the current viewport size.
    Viewport,
    /// A fixed `width`/`height`.
    Fixed,
    /// Square, sized from a single source dimension.
    Square,
}

/// An image resource's static description.
#[derive(Debug, Clone)]
pub struct ImageDesc {
    /// Width in texels (meaning depends on `extent_mode`).
    pub width: u32,
    /// Height in texels.
    pub height: u32,
    /// How `width`/`height` are interpreted at allocation time.
    pub extent_mode: ExtentMode,
    /// Pixel format; `None` means "resolve against the swapchain format".
    pub format: Option<vk::Format>,
    /// Usage bitmask.
    pub usage: vk::ImageUsageFlags,
    /// MSAA sample count.
    pub samples: vk::SampleCountFlags,
    /// Array layer count.
    pub layers: u32,
    /// Mip level count.
    pub mips: u32,
}

impl Default for ImageDesc {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            extent_mode: ExtentMode::Fixed,
            format: None,
            usage: vk::ImageUsageFlags::empty(),
            samples: vk::SampleCountFlags::TYPE_1,
            layers: 1,
            mips: 1,
        }
    }
}

/// A buffer resource's static description.
#[derive(Debug, Clone, Copy)]
pub struct BufferDesc {
    /// Size in bytes.
    pub size: u64,
    /// Usage bitmask.
    pub usage: vk::BufferUsageFlags,
}

/// Opaque backend handle to a physically allocated image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendImageHandle(pub u64);

/// Opaque backend handle to a physically allocated buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendBufferHandle(pub u64);

/// Backend hooks the compiler/executor drive but do not implement.
pub trait GraphBackend {
    /// Allocate a physical image matching `desc`.
    fn create_image(&mut self, desc: &ImageDesc) -> BackendImageHandle;
    /// Destroy a physical image created by [`Self::create_image`].
    fn destroy_image(&mut self, handle: BackendImageHandle);
    /// Allocate a physical buffer matching `desc`.
    fn create_buffer(&mut self, desc: &BufferDesc) -> BackendBufferHandle;
    /// Destroy a physical buffer created by [`Self::create_buffer`].
    fn destroy_buffer(&mut self, handle: BackendBufferHandle);
}

/// Marker type for image resource handles.
pub struct ImageTag;
/// A handle to an image resource declared in the graph.
pub type ImageHandle = Handle<ImageTag>;

/// Marker type for buffer resource handles.
pub struct GraphBufferTag;
/// A handle to a buffer resource declared in the graph.
pub type GraphBufferHandle = Handle<GraphBufferTag>;

/// Import metadata recorded for `EXTERNAL` images.
#[derive(Debug, Clone)]
pub struct ImportInfo {
    /// Initial layout the imported image is assumed to be in.
    pub initial_layout: vk::ImageLayout,
    /// Initial access mask the imported image is assumed to have been left in.
    pub initial_access: vk::AccessFlags,
}

/// A declared image resource: description, flags, per-image-index current
/// layout/access, and (once compiled) its physical backing.
#[derive(Debug, Clone)]
pub struct ImageResource {
    /// Declaration-time name.
    pub name: String,
    /// Static description.
    pub desc: ImageDesc,
    /// Lifetime/ownership flags.
    pub flags: ResourceFlags,
    /// Set for imported (including swapchain/depth) images.
    pub import: Option<ImportInfo>,
    /// Current layout, one entry per swapchain image index.
    pub layout_per_image: Vec<vk::ImageLayout>,
    /// Current access mask, one entry per swapchain image index.
    pub access_per_image: Vec<vk::AccessFlags>,
    /// Physical backing, one entry per swapchain image index once compiled.
    pub physical: Vec<Option<BackendImageHandle>>,
}

/// A declared buffer resource.
#[derive(Debug, Clone)]
pub struct BufferResource {
    /// Declaration-time name.
    pub name: String,
    /// Static description.
    pub desc: BufferDesc,
    /// Lifetime/ownership flags.
    pub flags: ResourceFlags,
    /// Set for imported buffers.
    pub import: Option<BackendBufferHandle>,
    /// Current access mask.
    pub access: vk::AccessFlags,
    /// Physical backing once compiled.
    pub physical: Option<BackendBufferHandle>,
}

/// Live/peak resource counters.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResourceStats {
    /// Currently live physical images.
    pub live_images: u32,
    /// Largest `live_images` has ever been.
    pub peak_images: u32,
    /// Currently live physical buffers.
    pub live_buffers: u32,
    /// Largest `live_buffers` has ever been.
    pub peak_buffers: u32,
}

/// Declared-resource storage for one render graph instance.
#[derive(Default)]
pub struct ResourceArena {
    images: GenerationalArena<ImageTag, ImageResource>,
    buffers: GenerationalArena<GraphBufferTag, BufferResource>,
    stats: ResourceStats,
    image_count: usize,
}

impl ResourceArena {
    /// An empty arena sized for `image_count` swapchain images.
    pub fn new(image_count: usize) -> Self {
        Self {
            images: GenerationalArena::new(),
            buffers: GenerationalArena::new(),
            stats: ResourceStats::default(),
            image_count: image_count.max(1),
        }
    }

    /// Declare a new, non-imported image. Physical allocation is deferred
    /// to compile.
    pub fn create_image(&mut self, name: impl Into<String>, desc: ImageDesc, flags: ResourceFlags) -> ImageHandle {
        self.images.insert(ImageResource {
            name: name.into(),
            desc,
            flags,
            import: None,
            layout_per_image: vec![vk::ImageLayout::UNDEFINED; self.image_count],
            access_per_image: vec![vk::AccessFlags::empty(); self.image_count],
            physical: vec![None; self.image_count],
        })
    }

    /// Declare a new, non-imported buffer.
    pub fn create_buffer(&mut self, name: impl Into<String>, desc: BufferDesc, flags: ResourceFlags) -> GraphBufferHandle {
        self.buffers.insert(BufferResource {
            name: name.into(),
            desc,
            flags,
            import: None,
            access: vk::AccessFlags::empty(),
            physical: None,
        })
    }

    /// Import an externally-owned image. Sets `EXTERNAL`, records the
    /// caller-supplied current layout/access, and skips physical
    /// allocation.
    pub fn import_image(
        &mut self,
        name: impl Into<String>,
        desc: ImageDesc,
        initial_layout: vk::ImageLayout,
        initial_access: vk::AccessFlags,
    ) -> ImageHandle {
        self.images.insert(ImageResource {
            name: name.into(),
            desc,
            flags: ResourceFlags::EXTERNAL,
            import: Some(ImportInfo {
                initial_layout,
                initial_access,
            }),
            layout_per_image: vec![initial_layout; self.image_count],
            access_per_image: vec![initial_access; self.image_count],
            physical: vec![None; self.image_count],
        })
    }

    /// Import the swapchain color image (`UNDEFINED` initial layout —
    /// the presentation engine owns its prior contents).
    pub fn import_swapchain(&mut self, name: impl Into<String>, width: u32, height: u32, format: vk::Format) -> ImageHandle {
        let desc = ImageDesc {
            width,
            height,
            extent_mode: ExtentMode::Window,
            format: Some(format),
            usage: vk::ImageUsageFlags::COLOR_ATTACHMENT,
            ..ImageDesc::default()
        };
        self.import_image(name, desc, vk::ImageLayout::UNDEFINED, vk::AccessFlags::empty())
    }

    /// Import a depth image owned outside the graph (already-allocated
    /// depth buffer reused across frames).
    pub fn import_depth(&mut self, name: impl Into<String>, width: u32, height: u32, format: vk::Format) -> ImageHandle {
        let desc = ImageDesc {
            width,
            height,
            extent_mode: ExtentMode::Window,
            format: Some(format),
            usage: vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT,
            ..ImageDesc::default()
        };
        self.import_image(name, desc, vk::ImageLayout::UNDEFINED, vk::AccessFlags::empty())
    }

    /// Import an externally-owned buffer.
    pub fn import_buffer(&mut self, name: impl Into<String>, desc: BufferDesc, backend: BackendBufferHandle) -> GraphBufferHandle {
        self.buffers.insert(BufferResource {
            name: name.into(),
            desc,
            flags: ResourceFlags::EXTERNAL,
            import: Some(backend),
            access: vk::AccessFlags::empty(),
            physical: Some(backend),
        })
    }

    /// Borrow an image by handle.
    pub fn image(&self, handle: ImageHandle) -> Option<&ImageResource> {
        self.images.get(handle)
    }

    /// Mutably borrow an image by handle.
    pub fn image_mut(&mut self, handle: ImageHandle) -> Option<&mut ImageResource> {
        self.images.get_mut(handle)
    }

    /// Borrow a buffer by handle.
    pub fn buffer(&self, handle: GraphBufferHandle) -> Option<&BufferResource> {
        self.buffers.get(handle)
    }

    /// Mutably borrow a buffer by handle.
    pub fn buffer_mut(&mut self, handle: GraphBufferHandle) -> Option<&mut BufferResource> {
        self.buffers.get_mut(handle)
    }

    /// Number of swapchain image indices this arena sizes `PER_IMAGE`
    /// resources for.
    pub const fn image_count(&self) -> usize {
        self.image_count
    }

    /// Current live/peak counters.
    pub const fn stats(&self) -> ResourceStats {
        self.stats
    }

    /// Allocate physical backing for a non-external image through
    /// `backend`, updating live/peak statistics.
    pub fn allocate_image(&mut self, handle: ImageHandle, index: usize, backend: &mut dyn GraphBackend) {
        let Some(image) = self.images.get_mut(handle) else {
            return;
        };
        if image.flags.contains(ResourceFlags::EXTERNAL) {
            return;
        }
        if image.physical[index].is_none() {
            image.physical[index] = Some(backend.create_image(&image.desc));
            self.stats.live_images += 1;
            self.stats.peak_images = self.stats.peak_images.max(self.stats.live_images);
        }
    }

    /// Release physical backing for a non-external image, updating live
    /// statistics. Peak is never decreased.
    pub fn free_image(&mut self, handle: ImageHandle, index: usize, backend: &mut dyn GraphBackend) {
        let Some(image) = self.images.get_mut(handle) else {
            return;
        };
        if let Some(physical) = image.physical[index].take() {
            backend.destroy_image(physical);
            self.stats.live_images = self.stats.live_images.saturating_sub(1);
        }
    }

    /// Allocate physical backing for a non-external buffer.
    pub fn allocate_buffer(&mut self, handle: GraphBufferHandle, backend: &mut dyn GraphBackend) {
        let Some(buffer) = self.buffers.get_mut(handle) else {
            return;
        };
        if buffer.flags.contains(ResourceFlags::EXTERNAL) {
            return;
        }
        if buffer.physical.is_none() {
            buffer.physical = Some(backend.create_buffer(&buffer.desc));
            self.stats.live_buffers += 1;
            self.stats.peak_buffers = self.stats.peak_buffers.max(self.stats.live_buffers);
        }
    }
}
