//! Dynamic GPU buffers and the retirement ring that defers their
//! destruction past in-flight frames.

use crate::handle::Handle;

/// Opaque marker type for buffer handles.
pub struct Buffer;

/// A handle to a GPU buffer.
pub type BufferHandle = Handle<Buffer>;

/// The backend operations the graph consumes but does not implement.
pub trait BufferBackend {
    /// Create a dynamic vertex buffer of `size` bytes.
    fn vertex_buffer_create_dynamic(&mut self, size: usize) -> BufferHandle;
    /// Create a dynamic index buffer of `size` bytes.
    fn index_buffer_create_dynamic(&mut self, size: usize) -> BufferHandle;
    /// Upload new contents, growing the buffer if `data` no longer fits.
    fn update(&mut self, handle: BufferHandle, data: &[u8]);
    /// Destroy a buffer immediately. Callers are responsible for routing
    /// this through a [`RetiredBufferRing`] if the buffer may still be
    /// referenced by an in-flight command buffer.
    fn destroy(&mut self, handle: BufferHandle);
    /// Bind as the active vertex buffer.
    fn bind_vertex_buffer(&mut self, handle: BufferHandle);
    /// Bind as the active index buffer.
    fn bind_index_buffer(&mut self, handle: BufferHandle);
    /// Issue an indexed draw call.
    fn draw_indexed(
        &mut self,
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        vertex_offset: i32,
        first_instance: u32,
    );
    /// Block until the device has finished all submitted work.
    fn wait_idle(&mut self);
}

struct RetiredEntry {
    handle: BufferHandle,
    retire_at_frame: u64,
}

/// Defers destruction of buffers that a growing dynamic buffer has
/// outgrown, until `frame_index` has advanced past `retire_at_frame + k`
/// frames, so a buffer still referenced by an in-flight command buffer is
/// never freed out from under it.
pub struct RetiredBufferRing {
    k: u64,
    entries: Vec<RetiredEntry>,
}

impl RetiredBufferRing {
    /// Create a ring with retirement delay `k` frames (default `3`).
    pub const fn new(k: u64) -> Self {
        Self {
            k,
            entries: Vec::new(),
        }
    }

    /// Queue `handle` for destruction once `frame_index` passes
    /// `current_frame + k`.
    pub fn retire(&mut self, handle: BufferHandle, current_frame: u64) {
        self.entries.push(RetiredEntry {
            handle,
            retire_at_frame: current_frame + self.k,
        });
    }

    /// Destroy every entry whose retirement frame has passed, via
    /// `backend`. Returns the handles actually destroyed, oldest first.
    pub fn collect(
        &mut self,
        frame_index: u64,
        backend: &mut dyn BufferBackend,
    ) -> Vec<BufferHandle> {
        let mut destroyed = Vec::new();
        self.entries.retain(|entry| {
            if frame_index > entry.retire_at_frame {
                backend.destroy(entry.handle);
                destroyed.push(entry.handle);
                false
            } else {
                true
            }
        });
        destroyed
    }

    /// Number of buffers still waiting to be destroyed.
    pub fn pending_count(&self) -> usize {
        self.entries.len()
    }
}

/// An in-memory stand-in for a real GPU buffer backend.
#[derive(Default)]
pub struct StubBufferBackend {
    live: crate::handle::GenerationalArena<Buffer, Vec<u8>>,
}

impl StubBufferBackend {
    /// Create an empty stub backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `handle` currently names a live buffer.
    pub fn is_live(&self, handle: BufferHandle) -> bool {
        self.live.contains(handle)
    }
}

impl BufferBackend for StubBufferBackend {
    fn vertex_buffer_create_dynamic(&mut self, size: usize) -> BufferHandle {
        self.live.insert(vec![0u8; size])
    }

    fn index_buffer_create_dynamic(&mut self, size: usize) -> BufferHandle {
        self.live.insert(vec![0u8; size])
    }

    fn update(&mut self, handle: BufferHandle, data: &[u8]) {
        if let Some(buf) = self.live.get_mut(handle) {
            buf.clear();
            buf.extend_from_slice(data);
        }
    }

    fn destroy(&mut self, handle: BufferHandle) {
        self.live.remove(handle);
    }

    fn bind_vertex_buffer(&mut self, _handle: BufferHandle) {}
    fn bind_index_buffer(&mut self, _handle: BufferHandle) {}
    fn draw_indexed(&mut self, _: u32, _: u32, _: u32, _: i32, _: u32) {}
    fn wait_idle(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retired_buffer_destroyed_only_after_frame_n_plus_k() {
        let mut backend = StubBufferBackend::new();
        let mut ring = RetiredBufferRing::new(3);
        let b0 = backend.vertex_buffer_create_dynamic(16);
        ring.retire(b0, 0);

        for frame in 0..=3 {
            let destroyed = ring.collect(frame, &mut backend);
            assert!(destroyed.is_empty(), "must not destroy at frame {frame}");
            assert!(backend.is_live(b0));
        }
        let destroyed = ring.collect(4, &mut backend);
        assert_eq!(destroyed, vec![b0]);
        assert!(!backend.is_live(b0));
    }

    #[test]
    fn growing_buffer_four_times_retires_old_generations_currently_bound_one_survives() {
        let mut backend = StubBufferBackend::new();
        let mut ring = RetiredBufferRing::new(3);

        let mut current = backend.vertex_buffer_create_dynamic(16);
        for frame in 0..4u64 {
            let grown = backend.vertex_buffer_create_dynamic(16 * (frame as usize + 2));
            ring.retire(current, frame);
            current = grown;
            ring.collect(frame, &mut backend);
        }
        // The currently bound (most recently grown) buffer is never retired.
        let destroyed_by_4 = ring.collect(4, &mut backend);
        assert!(!destroyed_by_4.contains(&current));
        assert!(backend.is_live(current));
    }
}
