use crate::foundation::core::Extent;
use crate::render::buffer::{PixelBuffer, PixelBufferAttributes};

/// Driver-supplied allocator and policy for output pixel buffers.
///
/// The compositor replaces the active context as a whole value whenever the driver
/// calls [`render_context_changed`](crate::FrameCompositor::render_context_changed);
/// implementations are never mutated in place by the core.
pub trait RenderContext: Send + Sync {
    /// Allocate a blank output buffer, or `None` under resource exhaustion.
    fn new_pixel_buffer(&self) -> Option<PixelBuffer>;

    /// Attributes of the buffers this context produces.
    fn pixel_buffer_attributes(&self) -> PixelBufferAttributes;
}

/// Heap-allocating reference context producing blank BGRA buffers of a fixed size.
#[derive(Clone, Copy, Debug)]
pub struct HeapBufferContext {
    extent: Extent,
}

impl HeapBufferContext {
    /// Create a context allocating buffers of `extent`.
    pub fn new(extent: Extent) -> Self {
        Self { extent }
    }

    /// Output buffer dimensions.
    pub fn extent(&self) -> Extent {
        self.extent
    }
}

impl RenderContext for HeapBufferContext {
    fn new_pixel_buffer(&self) -> Option<PixelBuffer> {
        Some(PixelBuffer::blank(self.extent))
    }

    fn pixel_buffer_attributes(&self) -> PixelBufferAttributes {
        PixelBufferAttributes::bgra_hardware()
    }
}
