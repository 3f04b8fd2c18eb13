use crate::foundation::core::Extent;
use crate::foundation::error::{FramelayError, FramelayResult};

/// Fixed output pixel layout: 8-bit-per-channel BGRA.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum PixelFormat {
    Bgra8,
}

/// Buffer attributes the compositor requires from source frames and from the
/// render context's output buffers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PixelBufferAttributes {
    /// Channel layout of the buffer.
    pub pixel_format: PixelFormat,
    /// Buffers must be shareable with a hardware surface.
    pub hardware_surface_compatible: bool,
}

impl PixelBufferAttributes {
    /// The one supported configuration: premultiplied BGRA8, hardware compatible.
    pub fn bgra_hardware() -> Self {
        Self {
            pixel_format: PixelFormat::Bgra8,
            hardware_surface_compatible: true,
        }
    }
}

/// Owned BGRA8 frame storage, `width * height * 4` bytes, row-major from the top.
#[derive(Clone, Debug)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

impl PixelBuffer {
    /// A zeroed (transparent black) buffer of the given extent.
    pub fn blank(extent: Extent) -> Self {
        Self {
            width: extent.width,
            height: extent.height,
            data: vec![0u8; extent.byte_len()],
            premultiplied: true,
        }
    }

    /// Wrap existing premultiplied BGRA8 bytes, validating the byte length.
    pub fn from_bgra8(extent: Extent, data: Vec<u8>) -> FramelayResult<Self> {
        if data.len() != extent.byte_len() {
            return Err(FramelayError::validation(
                "PixelBuffer data must be width * height * 4 bytes",
            ));
        }
        Ok(Self {
            width: extent.width,
            height: extent.height,
            data,
            premultiplied: true,
        })
    }

    /// Pixel dimensions of the buffer.
    pub fn extent(&self) -> Extent {
        Extent::new(self.width, self.height)
    }
}
