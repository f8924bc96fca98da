//! Per-frame input to compile/execute.

use ash::vk;

/// The information the graph resolves window/swapchain-relative
/// quantities and JSON `format: "swapchain"`/token repeats against.
#[derive(Debug, Clone, Copy)]
pub struct FrameInfo {
    /// Monotonically increasing frame counter.
    pub frame_index: u64,
    /// Index into the swapchain image array for this frame.
    pub image_index: u32,
    /// Seconds since the previous frame.
    pub delta_time: f32,
    /// OS window width in pixels.
    pub window_w: u32,
    /// OS window height in pixels.
    pub window_h: u32,
    /// Render viewport width (may differ from window size with an editor UI).
    pub viewport_w: u32,
    /// Render viewport height.
    pub viewport_h: u32,
    /// Whether an editor viewport is active.
    pub editor_enabled: bool,
    /// Swapchain color format.
    pub swapchain_format: vk::Format,
    /// Swapchain depth format.
    pub swapchain_depth_format: vk::Format,
    /// Shadow pass depth format.
    pub shadow_depth_format: vk::Format,
    /// Shadow map resolution (square).
    pub shadow_map_size: u32,
    /// Active shadow cascade count.
    pub shadow_cascade_count: u32,
}

impl Default for FrameInfo {
    fn default() -> Self {
        Self {
            frame_index: 0,
            image_index: 0,
            delta_time: 0.0,
            window_w: 1920,
            window_h: 1080,
            viewport_w: 1920,
            viewport_h: 1080,
            editor_enabled: false,
            swapchain_format: vk::Format::B8G8R8A8_UNORM,
            swapchain_depth_format: vk::Format::D32_SFLOAT,
            shadow_depth_format: vk::Format::D32_SFLOAT,
            shadow_map_size: 2048,
            shadow_cascade_count: 4,
        }
    }
}
