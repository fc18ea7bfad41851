#[path = "../common/mod.rs"]
mod common;

use bytes::Bytes;
use dicom_dictionary_std::tags;
use dicomviewer::dicom::{
    generate_images, DecodeError, DicomDataset, DicomDecoder, DicomFile, FileError,
    Part10Decoder, RenderError,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
struct CountingDecoder {
    calls: AtomicUsize,
}

impl DicomDecoder for CountingDecoder {
    fn decode(&self, content: Bytes, size: u64) -> Result<DicomDataset, DecodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Part10Decoder.decode(content, size)
    }
}

fn file_from(content: Vec<u8>) -> DicomFile {
    DicomFile::new("test", content.len() as u64, content)
}

#[test]
fn remapped_two_by_two_image() {
    let image = file_from(common::two_by_two()).image_default().unwrap();
    assert_eq!(image.dimensions(), (2, 2));
    assert_eq!(image.as_raw(), &vec![0u8, 63, 191, 255]);
}

#[test]
fn decodes_files_without_preamble() {
    let content = common::strip_preamble(&common::two_by_two());
    let image = file_from(content).image(true).unwrap();
    assert_eq!(image.as_raw(), &vec![0u8, 63, 191, 255]);
}

#[test]
fn first_frame_is_cached_per_mode() {
    let content = common::two_frames();
    let decoder = Arc::new(CountingDecoder::default());
    let file = DicomFile::with_decoder("multi", content.len() as u64, content, decoder.clone());

    let remapped = file.image(true).unwrap();
    assert_eq!(remapped.dimensions(), (2, 1));
    assert_eq!(remapped.as_raw(), &vec![0u8, 255]);

    let raw = file.image(false).unwrap();
    assert_eq!(raw.as_raw(), &vec![100u8, 200]);

    assert!(Arc::ptr_eq(&remapped, &file.image(true).unwrap()));
    assert!(Arc::ptr_eq(&raw, &file.image(false).unwrap()));
    assert_eq!(decoder.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn every_frame_is_materialized() {
    let file = file_from(common::two_frames());
    let dataset = file.dataset().unwrap();

    let images = generate_images(dataset.as_ref(), true).unwrap();
    assert_eq!(images.len(), 2);
    assert_eq!(images[0].as_raw(), &vec![0u8, 255]);
    assert_eq!(images[1].as_raw(), &vec![0u8, 255]);

    let raw = generate_images(dataset.as_ref(), false).unwrap();
    assert_eq!(raw[1].as_raw(), &vec![7u8, 9]);
}

#[test]
fn file_without_pixel_data() {
    let file = file_from(common::without_pixel_data());
    assert!(matches!(
        file.image_default(),
        Err(FileError::Render(RenderError::NoPixelData))
    ));

    // attributes still work
    let lookup = file.find_elements(&[tags::MODALITY]).unwrap();
    assert!(lookup["(0008,0060)"].is_some());
}

#[test]
fn garbage_is_a_decode_error() {
    let file = file_from(b"definitely not a dicom file".to_vec());
    assert!(matches!(file.dataset(), Err(FileError::Decode(DecodeError::Parse(_)))));
    assert!(matches!(file.image_default(), Err(FileError::Decode(_))));
    assert!(matches!(file.all_elements(), Err(FileError::Decode(_))));
}

#[test]
fn lookup_has_one_entry_per_requested_tag() {
    let file = file_from(common::two_by_two());
    let requested = [tags::PATIENT_NAME, tags::ROWS, tags::STUDY_DATE, tags::PATIENT_NAME];

    let lookup = file.find_elements(&requested).unwrap();

    assert_eq!(lookup.len(), 3);
    assert!(lookup["(0010,0010)"].is_some());
    assert!(lookup["(0028,0010)"].is_some());
    assert!(lookup["(0008,0020)"].is_none());
}
