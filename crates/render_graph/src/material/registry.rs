//! The material system.
//!
//! Grounded on `render::resources::materials::material`
//! plus `render::vulkan::core::texture`'s shared default-texture pattern
//! (`create_default_white/normal/...`), generalized into a
//! fallback-on-apply rule.

use std::collections::HashMap;

use crate::error::RenderGraphError;
use crate::handle::{GenerationalArena, Handle};
use crate::pipeline::PipelineDomain;
use crate::texture::{resolve_or_default, DefaultTextures, TextureBackend, TextureSlot};

use super::globals::GlobalUniforms;
use super::material::{Material, PhongProperties};
use super::shader_system::{ShaderSystem, UniformValue};
use super::shadow::{ShadowCascades, SHADOW_CASCADE_COUNT_MAX};
use crate::pipeline::InstanceStateHandle;
use crate::texture::TextureHandle;

/// A handle to a material.
pub type MaterialHandle = Handle<Material>;

struct MaterialRefs {
    ref_count: u32,
    auto_release: bool,
    protected: bool,
}

/// Dense-array material storage mirroring [`crate::pipeline::PipelineRegistry`]'s
/// ref-count protocol, plus the shadow cascade cache and global uniform sets.
pub struct MaterialSystem {
    slots: GenerationalArena<Material>,
    by_name: HashMap<String, MaterialHandle>,
    refs: HashMap<u32, MaterialRefs>,
    default_handle: MaterialHandle,
    shadow: ShadowCascades,
    globals: GlobalUniforms,
    defaults: DefaultTextures,
}

impl MaterialSystem {
    /// Create the system and immediately populate slot 0 with the default
    /// material: white albedo, unit specular, no emission, shininess 8,
    /// diffuse/normal/specular wired to the texture system's defaults.
    pub fn new(defaults: DefaultTextures) -> Self {
        let mut slots = GenerationalArena::new();
        let default_material = Material::blank("default", crate::pipeline::PipelineHandle::INVALID)
            .with_texture(TextureSlot::Diffuse, defaults.white)
            .with_texture(TextureSlot::Normal, defaults.flat_normal)
            .with_texture(TextureSlot::Specular, defaults.white);
        let default_handle = slots.insert(default_material);
        let mut refs = HashMap::new();
        refs.insert(
            default_handle.id(),
            MaterialRefs {
                ref_count: 1,
                auto_release: false,
                protected: true,
            },
        );
        let mut by_name = HashMap::new();
        by_name.insert("default".to_string(), default_handle);
        Self {
            slots,
            by_name,
            refs,
            default_handle,
            shadow: ShadowCascades::default(),
            globals: GlobalUniforms::default(),
            defaults,
        }
    }

    /// The protected slot-0 default material.
    pub const fn default_handle(&self) -> MaterialHandle {
        self.default_handle
    }

    /// Create a material with a flat diffuse color and no textures bound.
    pub fn create_colored(
        &mut self,
        name: impl Into<String>,
        diffuse: crate::foundation::math::Vec4,
    ) -> MaterialHandle {
        let name = name.into();
        let mut material = Material::blank(&name, crate::pipeline::PipelineHandle::INVALID);
        material.phong.diffuse = diffuse;
        let handle = self.slots.insert(material);
        self.refs.insert(
            handle.id(),
            MaterialRefs {
                ref_count: 1,
                auto_release: true,
                protected: false,
            },
        );
        self.by_name.insert(name, handle);
        handle
    }

    /// Acquire by name, incrementing `ref_count`. Unknown names return the
    /// default material handle alongside a
    /// [`RenderGraphError::ResourceNotLoaded`], rather than failing
    /// outright the way the pipeline registry does.
    pub fn acquire(
        &mut self,
        name: &str,
        auto_release: bool,
    ) -> (MaterialHandle, Option<RenderGraphError>) {
        match self.by_name.get(name).copied() {
            Some(handle) => {
                if let Some(refs) = self.refs.get_mut(&handle.id()) {
                    refs.ref_count += 1;
                    refs.auto_release = auto_release;
                }
                (handle, None)
            }
            None => (
                self.default_handle,
                Some(RenderGraphError::ResourceNotLoaded(name.to_string())),
            ),
        }
    }

    /// Increment `ref_count` directly, without a name lookup.
    pub fn add_ref(&mut self, handle: MaterialHandle) {
        if let Some(refs) = self.refs.get_mut(&handle.id()) {
            refs.ref_count += 1;
        }
    }

    /// Current `ref_count`, or `0` if unknown.
    pub fn ref_count(&self, handle: MaterialHandle) -> u32 {
        self.refs.get(&handle.id()).map_or(0, |r| r.ref_count)
    }

    /// Decrement `ref_count`; frees the slot at zero with `auto_release`
    /// set. The default material is protected and never released.
    pub fn release(&mut self, handle: MaterialHandle) {
        let Some(refs) = self.refs.get_mut(&handle.id()) else {
            return;
        };
        if refs.protected {
            return;
        }
        if refs.ref_count == 0 {
            log::warn!("material {:?} over-released", handle);
            return;
        }
        refs.ref_count -= 1;
        if refs.ref_count == 0 && refs.auto_release {
            self.refs.remove(&handle.id());
            self.by_name.retain(|_, h| *h != handle);
            self.slots.remove(handle);
        }
    }

    /// Replace the cached shadow cascade samplers.
    pub fn set_shadow_maps(&mut self, textures: &[TextureHandle], count: usize, enabled: bool) {
        self.shadow.set(textures, count, enabled);
    }

    /// The global uniform sets (mutable, for setting up view/projection
    /// before a frame).
    pub fn globals_mut(&mut self) -> &mut GlobalUniforms {
        &mut self.globals
    }

    /// Write global uniforms for `domain` into the currently bound
    /// pipeline and flush them.
    pub fn apply_global(&self, shader: &mut dyn ShaderSystem, domain: PipelineDomain) {
        if GlobalUniforms::is_ui_domain(domain) {
            shader.uniform_set("view", UniformValue::Mat4(self.globals.ui.view));
            shader.uniform_set("projection", UniformValue::Mat4(self.globals.ui.projection));
        } else {
            let w = &self.globals.world;
            shader.uniform_set("view", UniformValue::Mat4(w.view));
            shader.uniform_set("projection", UniformValue::Mat4(w.projection));
            shader.uniform_set("ambient_color", UniformValue::Vec4(w.ambient_color));
            shader.uniform_set(
                "view_position",
                UniformValue::Vec4(crate::foundation::math::Vec4::new(
                    w.view_position.x,
                    w.view_position.y,
                    w.view_position.z,
                    0.0,
                )),
            );
            shader.uniform_set("render_mode", UniformValue::U32(w.render_mode));
        }
        shader.apply_global();
    }

    /// Resolve and write `material`'s per-instance uniforms/samplers,
    /// falling back to tag-specific defaults for any texture slot that
    /// doesn't resolve to a live 2D texture. Returns the `texture_flags`
    /// bitmask (bit0 diffuse, bit1 specular, bit2 normal).
    pub fn apply_instance(
        &self,
        material: MaterialHandle,
        domain: PipelineDomain,
        texture_backend: &dyn TextureBackend,
        shader: &mut dyn ShaderSystem,
    ) -> u32 {
        let Some(mat) = self.slots.get(material) else {
            return 0;
        };
        shader.uniform_set("diffuse", UniformValue::Vec4(mat.phong.diffuse));
        shader.uniform_set("specular", UniformValue::Vec4(mat.phong.specular));
        shader.uniform_set("emission", UniformValue::Vec4(mat.phong.emission));
        shader.uniform_set("shininess", UniformValue::F32(mat.phong.shininess));

        let mut texture_flags = 0u32;
        for slot in TextureSlot::ALL {
            let entry = mat.texture(slot);
            let (resolved, is_real) =
                resolve_or_default(entry.handle, slot, texture_backend, self.defaults);
            let sampler_name = match slot {
                TextureSlot::Diffuse => "diffuse_sampler",
                TextureSlot::Normal => "normal_sampler",
                TextureSlot::Specular => "specular_sampler",
                TextureSlot::Emission => "emission_sampler",
            };
            shader.sampler_set(sampler_name, resolved);
            match slot {
                TextureSlot::Diffuse if is_real => texture_flags |= 1 << 0,
                TextureSlot::Specular if is_real => texture_flags |= 1 << 1,
                TextureSlot::Normal if is_real => texture_flags |= 1 << 2,
                _ => {}
            }
        }

        if matches!(
            domain,
            PipelineDomain::World | PipelineDomain::WorldTransparent
        ) {
            for cascade in 0..SHADOW_CASCADE_COUNT_MAX {
                let sampler = self.shadow.sampler(cascade);
                let resolved = if sampler.is_valid() {
                    sampler
                } else {
                    self.defaults.white
                };
                shader.sampler_set(&format!("shadow_map_{cascade}"), resolved);
            }
        }

        shader.uniform_set("texture_flags", UniformValue::U32(texture_flags));
        shader.apply_instance();
        texture_flags
    }

    /// Create a material from a parsed `.mt` file, resolving each
    /// authored texture path through `load_texture`. Unset color fields
    /// keep [`PhongProperties::default`]'s values.
    pub fn create_from_mt(
        &mut self,
        mt: &super::mt::MtFile,
        mut load_texture: impl FnMut(&str) -> TextureHandle,
    ) -> MaterialHandle {
        let diffuse = mt
            .diffuse_color
            .map_or(PhongProperties::default().diffuse, |c| {
                crate::foundation::math::Vec4::new(c[0], c[1], c[2], c[3])
            });
        let handle = self.create_colored(&mt.name, diffuse);
        let material = self
            .slots
            .get_mut(handle)
            .expect("just-created material is live");

        if let Some(specular) = mt.specular_color {
            material.phong.specular = crate::foundation::math::Vec4::new(
                specular[0],
                specular[1],
                specular[2],
                specular[3],
            );
        }
        if let Some(emission) = mt.emission_color {
            material.phong.emission =
                crate::foundation::math::Vec4::new(emission[0], emission[1], emission[2], 0.0);
        }
        if let Some(shininess) = mt.shininess {
            material.phong.shininess = shininess;
        }
        for (path, slot) in [
            (&mt.base_color, TextureSlot::Diffuse),
            (&mt.normal_map, TextureSlot::Normal),
            (&mt.specular_map, TextureSlot::Specular),
            (&mt.emission_map, TextureSlot::Emission),
        ] {
            if let Some(path) = path {
                let texture = load_texture(path);
                let entry = material.texture_mut(slot);
                entry.handle = texture;
                entry.enabled = true;
            }
        }

        handle
    }

    /// Write per-instance `model`/`object_id` uniforms for the current
    /// draw.
    pub fn apply_local(
        &self,
        local_state: InstanceStateHandle,
        model: crate::foundation::math::Mat4,
        object_id: u32,
        shader: &mut dyn ShaderSystem,
    ) {
        shader.bind_instance(local_state);
        shader.uniform_set("model", UniformValue::Mat4(model));
        shader.uniform_set("object_id", UniformValue::U32(object_id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec4;
    use crate::texture::StubTextureBackend;

    struct RecordingShader {
        uniforms: Vec<(String, UniformValue)>,
    }
    impl RecordingShader {
        fn new() -> Self {
            Self { uniforms: Vec::new() }
        }
    }
    impl ShaderSystem for RecordingShader {
        fn use_shader(&mut self, _name: &str) -> bool {
            true
        }
        fn uniform_set(&mut self, name: &str, value: UniformValue) {
            self.uniforms.push((name.to_string(), value));
        }
        fn sampler_set(&mut self, _name: &str, _texture: TextureHandle) {}
        fn apply_global(&mut self) -> bool {
            true
        }
        fn apply_instance(&mut self) -> bool {
            true
        }
        fn bind_instance(&mut self, _local_state: InstanceStateHandle) {}
    }

    fn defaults(backend: &mut StubTextureBackend) -> DefaultTextures {
        DefaultTextures {
            white: backend.texture_create(1, 1),
            flat_normal: backend.texture_create(1, 1),
        }
    }

    #[test]
    fn refcount_returns_to_zero_without_underflow() {
        let mut backend = StubTextureBackend::new();
        let d = defaults(&mut backend);
        let mut materials = MaterialSystem::new(d);
        let handle = materials.create_colored("red", Vec4::new(1.0, 0.0, 0.0, 1.0));
        materials.add_ref(handle);
        materials.add_ref(handle);
        assert_eq!(materials.ref_count(handle), 3);
        materials.release(handle);
        materials.release(handle);
        materials.release(handle);
        assert_eq!(materials.ref_count(handle), 0);
        materials.release(handle);
        assert_eq!(materials.ref_count(handle), 0);
    }

    #[test]
    fn default_material_is_never_released() {
        let mut backend = StubTextureBackend::new();
        let d = defaults(&mut backend);
        let mut materials = MaterialSystem::new(d);
        let default_handle = materials.default_handle();
        materials.release(default_handle);
        assert_eq!(materials.ref_count(default_handle), 1);
    }

    #[test]
    fn create_from_mt_wires_colors_and_textures() {
        let mut backend = StubTextureBackend::new();
        let d = defaults(&mut backend);
        let mut materials = MaterialSystem::new(d);
        let mt = crate::material::mt::parse(
            std::path::Path::new("brick.mt"),
            "diffuse_color = 0.5, 0.4, 0.3, 1.0\nshininess = 16\nbase_color = brick_diffuse.png\n",
        );

        let loaded = std::cell::RefCell::new(Vec::new());
        let handle = materials.create_from_mt(&mt, |path| {
            loaded.borrow_mut().push(path.to_string());
            backend.texture_create(4, 4)
        });

        assert_eq!(loaded.into_inner(), vec!["brick_diffuse.png"]);
        let material = materials.slots.get(handle).unwrap();
        assert_eq!(material.name, "brick");
        assert_eq!(material.phong.diffuse, Vec4::new(0.5, 0.4, 0.3, 1.0));
        assert_eq!(material.phong.shininess, 16.0);
        assert!(material.texture(TextureSlot::Diffuse).enabled);
    }

    #[test]
    fn apply_instance_falls_back_on_stale_texture_and_reports_flags() {
        let mut backend = StubTextureBackend::new();
        let d = defaults(&mut backend);
        let mut materials = MaterialSystem::new(d);
        let live_specular = backend.texture_create(4, 4);
        let live_normal = backend.texture_create(4, 4);
        let stale_diffuse = backend.texture_create(4, 4);
        backend.texture_destroy(stale_diffuse);

        let handle = materials.create_colored("m", Vec4::new(1.0, 1.0, 1.0, 1.0));
        {
            let material = materials.slots.get_mut(handle).unwrap();
            material.texture_mut(TextureSlot::Diffuse).handle = stale_diffuse;
            material.texture_mut(TextureSlot::Diffuse).enabled = true;
            material.texture_mut(TextureSlot::Specular).handle = live_specular;
            material.texture_mut(TextureSlot::Specular).enabled = true;
            material.texture_mut(TextureSlot::Normal).handle = live_normal;
            material.texture_mut(TextureSlot::Normal).enabled = true;
        }

        let mut shader = RecordingShader::new();
        let flags = materials.apply_instance(handle, PipelineDomain::World, &backend, &mut shader);
        assert_eq!(flags & 0b1, 0); // diffuse fell back.
        assert_eq!(flags & 0b10, 0b10); // specular is real.
        assert_eq!(flags & 0b100, 0b100); // normal is real.
    }
}
