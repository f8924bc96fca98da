//! The material record.
//!
//! Grounded on `render::resources::materials::material`
//! (`Material` struct with textures + id + name, builder-style
//! `with_*_texture` methods) narrowed to a fixed four-slot,
//! Phong-only property set.

use crate::foundation::math::Vec4;
use crate::pipeline::PipelineHandle;
use crate::texture::{TextureHandle, TextureSlot};

/// Phong-style shading properties written by `apply_instance`.
#[derive(Debug, Clone, Copy)]
pub struct PhongProperties {
    /// Diffuse (base) color.
    pub diffuse: Vec4,
    /// Specular color.
    pub specular: Vec4,
    /// Emissive color.
    pub emission: Vec4,
    /// Specular exponent.
    pub shininess: f32,
}

impl Default for PhongProperties {
    fn default() -> Self {
        Self {
            diffuse: Vec4::new(1.0, 1.0, 1.0, 1.0),
            specular: Vec4::new(1.0, 1.0, 1.0, 1.0),
            emission: Vec4::new(0.0, 0.0, 0.0, 0.0),
            shininess: 8.0,
        }
    }
}

/// One of the material's four fixed texture bindings.
#[derive(Debug, Clone, Copy)]
pub struct MaterialTextureEntry {
    /// Which fixed slot this entry fills.
    pub slot: TextureSlot,
    /// The bound texture handle, possibly invalid or stale.
    pub handle: TextureHandle,
    /// Whether this slot carries real authored data vs. being left at
    /// its default.
    pub enabled: bool,
}

/// A material: Phong properties, a fixed four-texture binding set, and
/// the pipeline it renders with.
#[derive(Debug, Clone)]
pub struct Material {
    /// Display/lookup name.
    pub name: String,
    /// The pipeline this material renders with.
    pub pipeline_id: PipelineHandle,
    /// Phong shading properties.
    pub phong: PhongProperties,
    /// Exactly one entry per [`TextureSlot`], in [`TextureSlot::ALL`] order.
    pub textures: [MaterialTextureEntry; 4],
    /// The named shader program this material selects.
    pub shader_name: String,
}

impl Material {
    /// A material with every texture slot disabled (bound to
    /// [`TextureHandle::INVALID`]) and default Phong properties.
    pub fn blank(name: impl Into<String>, pipeline_id: PipelineHandle) -> Self {
        Self {
            name: name.into(),
            pipeline_id,
            phong: PhongProperties::default(),
            textures: TextureSlot::ALL.map(|slot| MaterialTextureEntry {
                slot,
                handle: TextureHandle::INVALID,
                enabled: false,
            }),
            shader_name: String::new(),
        }
    }

    /// Borrow the entry for `slot`.
    pub fn texture(&self, slot: TextureSlot) -> &MaterialTextureEntry {
        self.textures
            .iter()
            .find(|t| t.slot == slot)
            .expect("every TextureSlot has an entry")
    }

    /// Mutably borrow the entry for `slot`.
    pub fn texture_mut(&mut self, slot: TextureSlot) -> &mut MaterialTextureEntry {
        self.textures
            .iter_mut()
            .find(|t| t.slot == slot)
            .expect("every TextureSlot has an entry")
    }

    /// Set `slot`'s texture, marking it enabled.
    pub fn with_texture(mut self, slot: TextureSlot, handle: TextureHandle) -> Self {
        self.texture_mut(slot).handle = handle;
        self.texture_mut(slot).enabled = true;
        self
    }
}
