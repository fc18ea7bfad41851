use super::domain::Domain;

/// One decoded frame of native pixel data.
///
/// `pixels` holds one entry per pixel in row-major order; each entry carries
/// the pixel's channel values. Only channel 0 is used for greyscale output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PixelFrame {
    pub rows: u32,
    pub cols: u32,
    pub pixels: Vec<Vec<i64>>,
}

impl PixelFrame {
    pub fn new(rows: u32, cols: u32, pixels: Vec<Vec<i64>>) -> Self {
        Self { rows, cols, pixels }
    }

    /// Build a frame from an interleaved sample buffer
    pub fn from_interleaved(rows: u32, cols: u32, samples_per_pixel: usize, samples: &[i64]) -> Self {
        let pixels = if samples_per_pixel == 0 {
            Vec::new()
        } else {
            samples
                .chunks(samples_per_pixel)
                .map(<[i64]>::to_vec)
                .collect()
        };
        Self { rows, cols, pixels }
    }

    /// Channel 0 of pixel `idx`, if present
    pub fn first_channel(&self, idx: usize) -> Option<i64> {
        self.pixels.get(idx).and_then(|px| px.first().copied())
    }
}

/// Returns the domain bounding channel 0 of every pixel in `frame`.
///
/// An empty frame, or one whose first pixel carries no channels, yields the
/// zero domain `{0, 0}`. That is indistinguishable from a frame whose values
/// are all zero. Pixels without channels are skipped.
pub fn find_bounds(frame: &PixelFrame) -> Domain {
    let Some(seed) = frame.first_channel(0) else {
        return Domain::default();
    };

    frame
        .pixels
        .iter()
        .filter_map(|px| px.first().copied())
        .fold(Domain::new(seed, seed), |bounds, val| {
            Domain::new(bounds.min.min(val), bounds.max.max(val))
        })
}
