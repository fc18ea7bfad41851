use super::frame::PixelFrame;
use super::render::PixelDataSource;
use bytes::{Buf, Bytes};
use dicom_core::Tag;
use dicom_dictionary_std::tags;
use dicom_object::mem::InMemElement;
use dicom_object::{DefaultDicomObject, OpenFileOptions, ReadError};
use dicom_pixeldata::{ConvertOptions, ModalityLutOption, PixelDecoder};
use thiserror::Error;

/// Length of the Part 10 preamble that precedes the `DICM` magic code
const PREAMBLE_LEN: usize = 128;
const MAGIC: &[u8; 4] = b"DICM";

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("declared size {declared} does not match content length {actual}")]
    SizeMismatch { declared: u64, actual: u64 },

    #[error("failed to parse DICOM file: {0}")]
    Parse(#[from] ReadError),
}

/// Parses raw container bytes into a structured dataset.
pub trait DicomDecoder: Send + Sync + std::fmt::Debug {
    /// Decode `content`, whose length the caller declares as `size`
    fn decode(&self, content: Bytes, size: u64) -> Result<DicomDataset, DecodeError>;
}

/// Decoder for DICOM Part 10 files, with or without the 128 byte preamble
#[derive(Debug, Default, Clone, Copy)]
pub struct Part10Decoder;

impl DicomDecoder for Part10Decoder {
    fn decode(&self, content: Bytes, size: u64) -> Result<DicomDataset, DecodeError> {
        let actual = content.len() as u64;
        if actual != size {
            return Err(DecodeError::SizeMismatch {
                declared: size,
                actual,
            });
        }

        let has_preamble = content.len() >= PREAMBLE_LEN + MAGIC.len()
            && &content[PREAMBLE_LEN..PREAMBLE_LEN + MAGIC.len()] == MAGIC;
        let stream = if has_preamble {
            content.slice(PREAMBLE_LEN..)
        } else {
            content
        };

        let object = OpenFileOptions::new().from_reader(stream.reader())?;
        Ok(DicomDataset::new(object))
    }
}

/// Group of the file meta information elements
const META_GROUP: u16 = 0x0002;

/// A decoded DICOM file
#[derive(Debug, Clone)]
pub struct DicomDataset {
    object: DefaultDicomObject,
    /// File meta group as plain elements, in tag order
    meta: Vec<InMemElement>,
}

impl DicomDataset {
    pub fn new(object: DefaultDicomObject) -> Self {
        let meta = object
            .meta()
            .to_element_iter()
            .filter_map(|element| {
                let header = *element.header();
                element
                    .into_value()
                    .into_primitive()
                    .map(|value| InMemElement::new(header.tag, header.vr, value))
            })
            .collect();
        Self { object, meta }
    }

    /// Look up a single element by tag, file meta group included
    pub fn element(&self, tag: Tag) -> Option<&InMemElement> {
        if tag.group() == META_GROUP {
            self.meta.iter().find(|element| element.header().tag == tag)
        } else {
            self.object.element(tag).ok()
        }
    }

    /// File meta elements followed by the main dataset, in tag order
    pub fn elements(&self) -> impl Iterator<Item = &InMemElement> + '_ {
        self.meta.iter().chain(self.object.iter())
    }
}

impl PixelDataSource for DicomDataset {
    fn has_pixel_data(&self) -> bool {
        self.element(tags::PIXEL_DATA).is_some()
    }

    fn pixel_frames(&self) -> Result<Vec<PixelFrame>, String> {
        let pixel_data = self
            .object
            .decode_pixel_data()
            .map_err(|e| e.to_string())?;

        let rows = pixel_data.rows() as u32;
        let cols = pixel_data.columns() as u32;
        let samples_per_pixel = pixel_data.samples_per_pixel() as usize;

        // stored sample values, without rescale
        let options = ConvertOptions::new().with_modality_lut(ModalityLutOption::None);

        (0..pixel_data.number_of_frames() as u32)
            .map(|frame| {
                let samples: Vec<i32> = pixel_data
                    .to_vec_frame_with_options(frame, &options)
                    .map_err(|e| format!("frame {frame}: {e}"))?;
                let samples: Vec<i64> = samples.into_iter().map(i64::from).collect();
                Ok(PixelFrame::from_interleaved(
                    rows,
                    cols,
                    samples_per_pixel,
                    &samples,
                ))
            })
            .collect()
    }
}
