use super::decoder::{DecodeError, DicomDataset, DicomDecoder, Part10Decoder};
use super::render::{generate_images, RenderError};
use bytes::Bytes;
use dicom_core::Tag;
use dicom_object::mem::InMemElement;
use image::GrayImage;
use once_cell::sync::OnceCell;
use std::collections::BTreeMap;
use std::io::Cursor;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FileError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("file does not contain any images")]
    NoImages,
}

/// Elements keyed by their tag string, e.g. `(0010,0010)`.
///
/// `None` marks a requested tag the file does not carry.
pub type ElementLookup = BTreeMap<String, Option<InMemElement>>;

/// A DICOM file with a read-through cache for its parsed dataset and
/// rendered images.
///
/// Cloning is cheap and clones share the cache, so a parse or render done
/// through one handle is visible through every other.
#[derive(Clone)]
pub struct DicomFile {
    inner: Arc<Inner>,
}

struct Inner {
    id: String,
    size: u64,
    content: Bytes,
    decoder: Arc<dyn DicomDecoder>,
    dataset: OnceCell<Arc<DicomDataset>>,
    remapped: OnceCell<Arc<GrayImage>>,
    unmapped: OnceCell<Arc<GrayImage>>,
}

impl DicomFile {
    pub fn new(id: impl Into<String>, size: u64, content: impl Into<Bytes>) -> Self {
        Self::with_decoder(id, size, content, Arc::new(Part10Decoder))
    }

    pub fn with_decoder(
        id: impl Into<String>,
        size: u64,
        content: impl Into<Bytes>,
        decoder: Arc<dyn DicomDecoder>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                id: id.into(),
                size,
                content: content.into(),
                decoder,
                dataset: OnceCell::new(),
                remapped: OnceCell::new(),
                unmapped: OnceCell::new(),
            }),
        }
    }

    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// Declared size of the file contents
    pub fn size(&self) -> u64 {
        self.inner.size
    }

    /// The raw file contents, positioned at the start
    pub fn raw(&self) -> Cursor<Bytes> {
        Cursor::new(self.inner.content.clone())
    }

    pub fn content(&self) -> Bytes {
        self.inner.content.clone()
    }

    /// Parsed dataset of the file. Parsing happens at most once.
    pub fn dataset(&self) -> Result<Arc<DicomDataset>, FileError> {
        self.inner
            .dataset
            .get_or_try_init(|| {
                tracing::debug!("parsing DICOM file {} ({} bytes)", self.inner.id, self.inner.size);
                self.inner
                    .decoder
                    .decode(self.inner.content.clone(), self.inner.size)
                    .map(Arc::new)
            })
            .cloned()
            .map_err(FileError::from)
    }

    /// Greyscale image of the first frame, remapped for visibility
    pub fn image_default(&self) -> Result<Arc<GrayImage>, FileError> {
        self.image(true)
    }

    /// Greyscale image of the first frame.
    ///
    /// Each render mode is computed at most once per file.
    pub fn image(&self, remap: bool) -> Result<Arc<GrayImage>, FileError> {
        let slot = if remap {
            &self.inner.remapped
        } else {
            &self.inner.unmapped
        };

        slot.get_or_try_init(|| {
            let dataset = self.dataset()?;
            let images = generate_images(dataset.as_ref(), remap)?;
            tracing::debug!("rendered {} image(s) for {}", images.len(), self.inner.id);
            images
                .into_iter()
                .next()
                .map(Arc::new)
                .ok_or(FileError::NoImages)
        })
        .cloned()
    }

    /// Look up the given tags. Every requested tag gets an entry.
    pub fn find_elements(&self, tags: &[Tag]) -> Result<ElementLookup, FileError> {
        let dataset = self.dataset()?;
        Ok(tags
            .iter()
            .map(|tag| (tag.to_string(), dataset.element(*tag).cloned()))
            .collect())
    }

    /// Every element of the dataset keyed by tag
    pub fn all_elements(&self) -> Result<ElementLookup, FileError> {
        let dataset = self.dataset()?;
        Ok(dataset
            .elements()
            .map(|element| (element.header().tag.to_string(), Some(element.clone())))
            .collect())
    }
}

impl std::fmt::Debug for DicomFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DicomFile")
            .field("id", &self.inner.id)
            .field("size", &self.inner.size)
            .field("parsed", &self.inner.dataset.get().is_some())
            .finish()
    }
}
