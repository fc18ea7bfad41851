use super::domain::{map_value, TARGET_PIXEL_DOMAIN};
use super::frame::{find_bounds, PixelFrame};
use image::{GrayImage, Luma};
use rayon::prelude::*;
use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("DICOM file has no pixel data element")]
    NoPixelData,

    #[error("failed to get pixel data info for DICOM file: {0}")]
    CorruptPixelData(String),
}

/// Anything that can hand out decoded frames of native pixel data.
pub trait PixelDataSource {
    /// Whether a pixel data element is present at all
    fn has_pixel_data(&self) -> bool;

    /// Interpret the pixel data element as frames.
    ///
    /// Implementations backed by third-party decoders may panic on malformed
    /// input; callers must not let that unwind further.
    fn pixel_frames(&self) -> Result<Vec<PixelFrame>, String>;
}

/// Generate one 8-bit greyscale image per frame of `source`.
///
/// With `remap` each frame is rescaled from its own value bounds onto
/// `0..=255`. Without it, channel 0 is truncated straight to a byte, which is
/// only useful for inspecting raw data.
pub fn generate_images<S>(source: &S, remap: bool) -> Result<Vec<GrayImage>, RenderError>
where
    S: PixelDataSource + ?Sized,
{
    if !source.has_pixel_data() {
        return Err(RenderError::NoPixelData);
    }

    let frames = panic::catch_unwind(AssertUnwindSafe(|| source.pixel_frames()))
        .map_err(|payload| RenderError::CorruptPixelData(panic_message(payload.as_ref())))?
        .map_err(RenderError::CorruptPixelData)?;

    tracing::debug!("rendering {} frame(s), remap={}", frames.len(), remap);

    Ok(frames
        .par_iter()
        .map(|frame| render_frame(frame, remap))
        .collect())
}

fn render_frame(frame: &PixelFrame, remap: bool) -> GrayImage {
    let source_domain = remap.then(|| find_bounds(frame));
    let mut out = GrayImage::new(frame.cols, frame.rows);

    let cols = frame.cols as usize;
    let total = cols * frame.rows as usize;

    for idx in 0..frame.pixels.len().min(total) {
        let x = (idx % cols) as u32;
        let y = (idx / cols) as u32;

        let value = frame.first_channel(idx).unwrap_or(0);
        let mapped = match source_domain {
            Some(source) => map_value(value, source, TARGET_PIXEL_DOMAIN),
            None => value,
        };

        // truncation is intended on the raw path
        out.put_pixel(x, y, Luma([mapped as u8]));
    }

    out
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "pixel data decoder panicked".to_string()
    }
}
