use crate::foundation::error::{FramelayError, FramelayResult};

pub use kurbo::{Affine, BezPath, Point, Rect, Vec2};

/// Identifier of a source media track.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct TrackId(pub i32);

/// Rational presentation timestamp `value / timescale` seconds.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct MediaTime {
    /// Tick count.
    pub value: i64,
    /// Ticks per second, must be non-zero.
    pub timescale: u32,
}

impl MediaTime {
    /// Zero seconds.
    pub const ZERO: MediaTime = MediaTime {
        value: 0,
        timescale: 1,
    };

    /// Create a validated timestamp with `timescale > 0`.
    pub fn new(value: i64, timescale: u32) -> FramelayResult<Self> {
        if timescale == 0 {
            return Err(FramelayError::validation("MediaTime timescale must be > 0"));
        }
        Ok(Self { value, timescale })
    }

    /// Convert to floating-point seconds.
    pub fn as_secs_f64(self) -> f64 {
        self.value as f64 / f64::from(self.timescale)
    }
}

// Timestamps with different timescales compare by the instant they denote, so
// equality and ordering go through cross-multiplication rather than field derives.
impl PartialEq for MediaTime {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for MediaTime {}

impl PartialOrd for MediaTime {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MediaTime {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        let lhs = i128::from(self.value) * i128::from(other.timescale);
        let rhs = i128::from(other.value) * i128::from(self.timescale);
        lhs.cmp(&rhs)
    }
}

/// Half-open presentation interval `[start, end)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TimeRange {
    /// Inclusive interval start.
    pub start: MediaTime,
    /// Exclusive interval end.
    pub end: MediaTime,
}

impl TimeRange {
    /// Create a validated interval with `start <= end`.
    pub fn new(start: MediaTime, end: MediaTime) -> FramelayResult<Self> {
        if start > end {
            return Err(FramelayError::validation("TimeRange start must be <= end"));
        }
        Ok(Self { start, end })
    }

    /// Return `true` when the interval covers no time.
    pub fn is_empty(self) -> bool {
        self.start == self.end
    }

    /// Return `true` when `t` is inside `[start, end)`.
    pub fn contains(self, t: MediaTime) -> bool {
        self.start <= t && t < self.end
    }

    /// Interval length in seconds.
    pub fn duration_secs(self) -> f64 {
        (self.end.as_secs_f64() - self.start.as_secs_f64()).max(0.0)
    }
}

/// Pixel dimensions of a frame, layer, or raster surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Extent {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Extent {
    /// Create an extent.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Return `true` when either dimension is zero.
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Byte length of a 4-byte-per-pixel raster of this extent.
    pub fn byte_len(self) -> usize {
        (self.width as usize)
            .saturating_mul(self.height as usize)
            .saturating_mul(4)
    }
}
