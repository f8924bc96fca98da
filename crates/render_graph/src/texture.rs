//! Texture handles and the backend interface that produces them.
//!
//! Grounded on `render::material::texture_manager`
//! (`TextureHandle`, filter/wrap enums) generalized onto this crate's
//! [`Handle`] type and reduced to the four tags the material system
//! actually substitutes defaults for.

use crate::handle::Handle;

/// Opaque marker type for texture handles.
pub struct Texture;

/// A handle to a 2D texture, generation-checked like every other resource.
pub type TextureHandle = Handle<Texture>;

/// The texture roles the material system understands: the fixed four-slot
/// `textures[4]` assignment every material carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    /// Base color / albedo.
    Diffuse,
    /// Tangent-space normal map.
    Normal,
    /// Specular reflectance.
    Specular,
    /// Emissive color.
    Emission,
}

impl TextureSlot {
    /// All four fixed slots, in declaration order.
    pub const ALL: [TextureSlot; 4] = [
        TextureSlot::Diffuse,
        TextureSlot::Normal,
        TextureSlot::Specular,
        TextureSlot::Emission,
    ];
}

/// Texture minification/magnification filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    /// Nearest-neighbor sampling.
    Nearest,
    /// Bilinear sampling.
    Linear,
}

/// Texture coordinate wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapMode {
    /// Repeat the texture.
    Repeat,
    /// Mirror the texture at each edge.
    MirroredRepeat,
    /// Clamp to the edge texel.
    ClampToEdge,
}

/// The backend operations the graph and material system consume but do
/// not implement. A real implementation talks to the Vulkan device; tests
/// use [`StubTextureBackend`].
pub trait TextureBackend {
    /// Create a 2D texture and return its handle.
    fn texture_create(&mut self, width: u32, height: u32) -> TextureHandle;
    /// Destroy a previously created texture.
    fn texture_destroy(&mut self, handle: TextureHandle);
    /// Resize a texture in place, invalidating its contents.
    fn texture_resize(&mut self, handle: TextureHandle, width: u32, height: u32);
    /// Upload the full contents of a texture.
    fn texture_write(&mut self, handle: TextureHandle, pixels: &[u8]);
    /// Upload a sub-region of a texture.
    fn texture_write_region(
        &mut self,
        handle: TextureHandle,
        x: u32,
        y: u32,
        w: u32,
        h: u32,
        pixels: &[u8],
    );
    /// Whether `handle` currently resolves to a live 2D texture.
    fn is_live(&self, handle: TextureHandle) -> bool;
}

/// The tag-specific fallback textures the material system substitutes
/// when a material's texture handle fails to resolve.
#[derive(Debug, Clone, Copy)]
pub struct DefaultTextures {
    /// Opaque white, used for [`TextureSlot::Diffuse`], [`TextureSlot::Specular`], and [`TextureSlot::Emission`].
    pub white: TextureHandle,
    /// Flat tangent-space normal (0.5, 0.5, 1.0), used for [`TextureSlot::Normal`].
    pub flat_normal: TextureHandle,
}

impl DefaultTextures {
    /// The fallback for a given slot.
    pub const fn for_slot(&self, slot: TextureSlot) -> TextureHandle {
        match slot {
            TextureSlot::Normal => self.flat_normal,
            TextureSlot::Diffuse | TextureSlot::Specular | TextureSlot::Emission => self.white,
        }
    }
}

/// Resolve `handle` for `slot`, falling back to `defaults` when the handle
/// is invalid or the backend reports it isn't a live 2D texture. This
/// substitution never writes back to the material record — the caller
/// keeps passing the original (possibly stale) handle on every frame.
pub fn resolve_or_default(
    handle: TextureHandle,
    slot: TextureSlot,
    backend: &dyn TextureBackend,
    defaults: DefaultTextures,
) -> (TextureHandle, bool) {
    if handle.is_valid() && backend.is_live(handle) {
        (handle, true)
    } else {
        (defaults.for_slot(slot), false)
    }
}

/// An in-memory stand-in for a real GPU texture backend, used by tests and
/// [`crate::demo_host`]-style hosts.
#[derive(Default)]
pub struct StubTextureBackend {
    live: crate::handle::GenerationalArena<Texture, (u32, u32)>,
}

impl StubTextureBackend {
    /// Create an empty stub backend.
    pub fn new() -> Self {
        Self::default()
    }
}

impl TextureBackend for StubTextureBackend {
    fn texture_create(&mut self, width: u32, height: u32) -> TextureHandle {
        self.live.insert((width, height))
    }

    fn texture_destroy(&mut self, handle: TextureHandle) {
        self.live.remove(handle);
    }

    fn texture_resize(&mut self, handle: TextureHandle, width: u32, height: u32) {
        if let Some(slot) = self.live.get_mut(handle) {
            *slot = (width, height);
        }
    }

    fn texture_write(&mut self, _handle: TextureHandle, _pixels: &[u8]) {}

    fn texture_write_region(
        &mut self,
        _handle: TextureHandle,
        _x: u32,
        _y: u32,
        _w: u32,
        _h: u32,
        _pixels: &[u8],
    ) {
    }

    fn is_live(&self, handle: TextureHandle) -> bool {
        self.live.contains(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn material_fallback_substitutes_default_without_mutating_handle() {
        let mut backend = StubTextureBackend::new();
        let live = backend.texture_create(4, 4);
        let stale = live;
        backend.texture_destroy(live);
        let defaults = DefaultTextures {
            white: backend.texture_create(1, 1),
            flat_normal: backend.texture_create(1, 1),
        };
        let (resolved, was_real) = resolve_or_default(stale, TextureSlot::Diffuse, &backend, defaults);
        assert!(!was_real);
        assert_eq!(resolved, defaults.white);
        // The original stale handle value itself is untouched.
        assert_eq!(stale, live);
    }

    #[test]
    fn live_texture_resolves_to_itself() {
        let mut backend = StubTextureBackend::new();
        let handle = backend.texture_create(8, 8);
        let defaults = DefaultTextures {
            white: backend.texture_create(1, 1),
            flat_normal: backend.texture_create(1, 1),
        };
        let (resolved, was_real) = resolve_or_default(handle, TextureSlot::Specular, &backend, defaults);
        assert!(was_real);
        assert_eq!(resolved, handle);
    }
}
