//! DICOM file handling: parsing, pixel remapping and greyscale rendering.

pub mod decoder;
pub mod domain;
pub mod file;
pub mod frame;
pub mod render;

#[cfg(test)]
#[path = "../../tests/common/mod.rs"]
pub(crate) mod fixtures;

pub use decoder::{DecodeError, DicomDataset, DicomDecoder, Part10Decoder};
pub use domain::{map_value, Domain, TARGET_PIXEL_DOMAIN};
pub use file::{DicomFile, ElementLookup, FileError};
pub use frame::{find_bounds, PixelFrame};
pub use render::{generate_images, PixelDataSource, RenderError};
