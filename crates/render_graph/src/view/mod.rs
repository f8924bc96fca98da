//! View layers: ordered, named attachment points for per-view rendering
//! (world, UI, shadow, ...) that drive the graph's passes without
//! touching the compiler directly.
//!
//! Grounded on `ecs::system::System`'s trait shape — a single
//! `fn run(&mut self, world: &mut World)` a caller owns and drives —
//! generalized into the fuller create/attach/resize/render/detach/destroy
//! lifecycle a view layer needs, plus `ecs::scheduler::SystemPhase`'s
//! ascending-order execution idiom (without its parallel
//! dependency-graph machinery, which this strictly ordered,
//! single-threaded layer list doesn't need).

use crate::foundation::math::Mat4;
use crate::graph::FrameInfo;
use crate::handle::{GenerationalArena, Handle};

/// Declaration-time configuration for a layer.
#[derive(Debug, Clone)]
pub struct LayerConfig {
    /// Layer name, used for lookup and the graph pass names it owns.
    pub name: String,
    /// Ascending sort key; layers render lowest-order first.
    pub order: i32,
    /// Render target width in texels.
    pub width: u32,
    /// Render target height in texels.
    pub height: u32,
}

/// One render-pass binding a layer owns.
#[derive(Debug, Clone)]
pub struct PassConfig {
    /// Name of the graph pass this layer's render callback drives.
    pub pass_name: String,
    /// Names of the color resources this pass renders into.
    pub color_targets: Vec<String>,
    /// Name of the depth resource this pass renders into, if any.
    pub depth_target: Option<String>,
}

/// The render-relevant state handed to [`LayerCallbacks::on_render`].
#[derive(Debug, Clone, Copy)]
pub struct RenderInfo<'a> {
    /// The frame currently being rendered.
    pub frame: &'a FrameInfo,
}

/// Per-call context identifying which layer is being driven.
#[derive(Debug, Clone, Copy)]
pub struct LayerContext<'a> {
    /// This layer's declaration-time name.
    pub name: &'a str,
    /// This layer's current view matrix.
    pub view_matrix: Mat4,
    /// This layer's current projection matrix.
    pub projection_matrix: Mat4,
}

/// A layer's lifecycle hooks. Only `on_render` is
/// required; the rest default to no-ops, matching the single-method
/// `System` trait shape for callers that don't need the full
/// lifecycle.
pub trait LayerCallbacks {
    /// Called once when the layer is registered.
    fn on_create(&mut self, _ctx: LayerContext<'_>) {}
    /// Called when the layer is attached to the active view system.
    fn on_attach(&mut self, _ctx: LayerContext<'_>) {}
    /// Called when the layer's render target is resized.
    fn on_resize(&mut self, _ctx: LayerContext<'_>, _width: u32, _height: u32) {}
    /// Called once per frame, in ascending `order`. This is where
    /// pipelines get bound and draws submitted; the layer does not talk
    /// to the graph compiler directly — its passes are registered with
    /// the graph by the host.
    fn on_render(&mut self, ctx: LayerContext<'_>, render_info: RenderInfo<'_>);
    /// Called when the layer is detached.
    fn on_detach(&mut self, _ctx: LayerContext<'_>) {}
    /// Called once when the layer is unregistered.
    fn on_destroy(&mut self, _ctx: LayerContext<'_>) {}
}

/// A registered layer: its configuration, matrices, pass bindings, and
/// callback implementation.
pub struct Layer {
    config: LayerConfig,
    view_matrix: Mat4,
    projection_matrix: Mat4,
    pass_configs: Vec<PassConfig>,
    attached: bool,
    callbacks: Box<dyn LayerCallbacks>,
}

impl Layer {
    /// This layer's declaration-time name.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// This layer's ascending sort key.
    pub const fn order(&self) -> i32 {
        self.config.order
    }

    /// This layer's declared pass bindings.
    pub fn pass_configs(&self) -> &[PassConfig] {
        &self.pass_configs
    }

    /// Append a pass binding to this layer.
    pub fn add_pass_config(&mut self, pass_config: PassConfig) {
        self.pass_configs.push(pass_config);
    }

    /// Replace this layer's view/projection matrices.
    pub fn set_matrices(&mut self, view_matrix: Mat4, projection_matrix: Mat4) {
        self.view_matrix = view_matrix;
        self.projection_matrix = projection_matrix;
    }

}

/// Marker type for layer handles.
pub struct LayerTag;
/// A handle to a registered layer.
pub type LayerHandle = Handle<LayerTag>;

/// Owns the set of registered layers and renders them in ascending
/// `order` each frame.
#[derive(Default)]
pub struct LayerSystem {
    layers: GenerationalArena<LayerTag, Layer>,
    /// Cached ascending-`order` draw list, rebuilt whenever the set of
    /// registered layers changes.
    render_order: Vec<LayerHandle>,
}

/// Build a `LayerContext` from `$layer`'s fields directly (rather than via
/// `Layer::context`, a `&self` method), so the borrow checker sees disjoint
/// field borrows and the caller can still mutably borrow `$layer.callbacks`
/// in the same statement or right after.
macro_rules! layer_context {
    ($layer:expr) => {
        LayerContext {
            name: &$layer.config.name,
            view_matrix: $layer.view_matrix,
            projection_matrix: $layer.projection_matrix,
        }
    };
}

impl LayerSystem {
    /// An empty layer system.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new layer and call its `on_create` hook.
    pub fn register_layer(
        &mut self,
        config: LayerConfig,
        callbacks: Box<dyn LayerCallbacks>,
    ) -> LayerHandle {
        let mut layer = Layer {
            view_matrix: Mat4::identity(),
            projection_matrix: Mat4::identity(),
            pass_configs: Vec::new(),
            attached: false,
            callbacks,
            config,
        };
        layer.callbacks.on_create(layer_context!(layer));
        let handle = self.layers.insert(layer);
        self.rebuild_order();
        handle
    }

    /// Unregister a layer, calling `on_detach` (if attached) then
    /// `on_destroy`.
    pub fn unregister_layer(&mut self, handle: LayerHandle) {
        if let Some(mut layer) = self.layers.remove(handle) {
            if layer.attached {
                let ctx = layer_context!(layer);
                layer.callbacks.on_detach(ctx);
            }
            let ctx = layer_context!(layer);
            layer.callbacks.on_destroy(ctx);
        }
        self.rebuild_order();
    }

    /// Attach a registered layer, calling its `on_attach` hook. A no-op
    /// if the layer is already attached.
    pub fn attach(&mut self, handle: LayerHandle) {
        if let Some(layer) = self.layers.get_mut(handle) {
            if !layer.attached {
                layer.attached = true;
                let ctx = layer_context!(layer);
                layer.callbacks.on_attach(ctx);
            }
        }
    }

    /// Resize a layer's render target, calling its `on_resize` hook.
    pub fn resize(&mut self, handle: LayerHandle, width: u32, height: u32) {
        if let Some(layer) = self.layers.get_mut(handle) {
            layer.config.width = width;
            layer.config.height = height;
            let ctx = layer_context!(layer);
            layer.callbacks.on_resize(ctx, width, height);
        }
    }

    /// Borrow a layer by handle.
    pub fn layer(&self, handle: LayerHandle) -> Option<&Layer> {
        self.layers.get(handle)
    }

    /// Mutably borrow a layer by handle.
    pub fn layer_mut(&mut self, handle: LayerHandle) -> Option<&mut Layer> {
        self.layers.get_mut(handle)
    }

    /// Render every attached layer's `on_render`, in ascending `order`.
    pub fn render_all(&mut self, frame: &FrameInfo) {
        for &handle in &self.render_order {
            let Some(layer) = self.layers.get_mut(handle) else {
                continue;
            };
            if !layer.attached {
                continue;
            }
            let ctx = layer_context!(layer);
            layer.callbacks.on_render(ctx, RenderInfo { frame });
        }
    }

    /// The names of attached layers, in the order they will render.
    pub fn render_order_names(&self) -> Vec<&str> {
        self.render_order
            .iter()
            .filter_map(|&handle| self.layers.get(handle))
            .filter(|layer| layer.attached)
            .map(Layer::name)
            .collect()
    }

    fn rebuild_order(&mut self) {
        let mut order: Vec<(LayerHandle, i32, u32)> = self
            .layers
            .iter()
            .map(|(handle, layer)| (handle, layer.order(), handle.id()))
            .collect();
        // Declaration-order tie-break among equal `order` values, matching
        // the determinism the graph compiler's own scheduler promises.
        order.sort_by_key(|&(_, key, id)| (key, id));
        self.render_order = order.into_iter().map(|(handle, _, _)| handle).collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct RecordingLayer {
        rendered: std::rc::Rc<std::cell::RefCell<Vec<String>>>,
    }

    impl LayerCallbacks for RecordingLayer {
        fn on_render(&mut self, ctx: LayerContext<'_>, _render_info: RenderInfo<'_>) {
            self.rendered.borrow_mut().push(ctx.name.to_string());
        }
    }

    fn layer(name: &str, order: i32, log: &std::rc::Rc<std::cell::RefCell<Vec<String>>>) -> (LayerConfig, Box<dyn LayerCallbacks>) {
        (
            LayerConfig {
                name: name.to_string(),
                order,
                width: 1920,
                height: 1080,
            },
            Box::new(RecordingLayer {
                rendered: log.clone(),
            }),
        )
    }

    #[test]
    fn layers_render_in_ascending_order_regardless_of_registration_order() {
        let log = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let mut system = LayerSystem::new();

        let (cfg, cb) = layer("ui", 10, &log);
        let ui = system.register_layer(cfg, cb);
        let (cfg, cb) = layer("world", 0, &log);
        let world = system.register_layer(cfg, cb);
        let (cfg, cb) = layer("shadow", -5, &log);
        let shadow = system.register_layer(cfg, cb);

        system.attach(ui);
        system.attach(world);
        system.attach(shadow);

        system.render_all(&FrameInfo::default());

        assert_eq!(*log.borrow(), vec!["shadow", "world", "ui"]);
    }

    #[test]
    fn unattached_layers_do_not_render() {
        let log = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let mut system = LayerSystem::new();
        let (cfg, cb) = layer("detached", 0, &log);
        system.register_layer(cfg, cb);

        system.render_all(&FrameInfo::default());

        assert!(log.borrow().is_empty());
    }

    #[test]
    fn unregistering_a_layer_removes_it_from_the_render_order() {
        let log = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let mut system = LayerSystem::new();
        let (cfg, cb) = layer("world", 0, &log);
        let world = system.register_layer(cfg, cb);
        system.attach(world);

        system.unregister_layer(world);
        system.render_all(&FrameInfo::default());

        assert!(log.borrow().is_empty());
        assert!(system.render_order_names().is_empty());
    }

    #[test]
    fn resize_forwards_new_dimensions_to_the_layer() {
        struct ResizeRecorder {
            last: std::rc::Rc<std::cell::Cell<(u32, u32)>>,
        }
        impl LayerCallbacks for ResizeRecorder {
            fn on_render(&mut self, _ctx: LayerContext<'_>, _render_info: RenderInfo<'_>) {}
            fn on_resize(&mut self, _ctx: LayerContext<'_>, width: u32, height: u32) {
                self.last.set((width, height));
            }
        }

        let last = std::rc::Rc::new(std::cell::Cell::new((0, 0)));
        let mut system = LayerSystem::new();
        let handle = system.register_layer(
            LayerConfig {
                name: "world".to_string(),
                order: 0,
                width: 800,
                height: 600,
            },
            Box::new(ResizeRecorder { last: last.clone() }),
        );

        system.resize(handle, 1920, 1080);

        assert_eq!(last.get(), (1920, 1080));
    }
}
