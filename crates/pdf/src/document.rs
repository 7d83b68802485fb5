use flate2::read::ZlibDecoder;
use image::{DynamicImage, GrayImage, RgbImage};
use lopdf::{Document, ObjectId};
use std::io::{Cursor, Read};
use thiserror::Error;
use tracing::debug;

use crate::layout::{detect_tables, TextTable};

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Failed to read PDF: {0}")]
    Load(#[from] lopdf::Error),
    #[error("PDF is encrypted")]
    Encrypted,
    #[error("Failed to decode page image: {0}")]
    Image(String),
}

/// A loaded PDF statement.
pub struct PdfDocument {
    doc: Document,
}

impl PdfDocument {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PdfError> {
        let doc = Document::load_mem(bytes)?;
        if doc.is_encrypted() {
            return Err(PdfError::Encrypted);
        }
        Ok(Self { doc })
    }

    /// Pages in document order.
    pub fn pages(&self) -> Vec<PdfPage<'_>> {
        self.doc
            .get_pages()
            .into_iter()
            .map(|(number, id)| PdfPage {
                doc: &self.doc,
                number,
                id,
            })
            .collect()
    }
}

/// One page of a [`PdfDocument`]. `number` is 1-based.
pub struct PdfPage<'a> {
    doc: &'a Document,
    number: u32,
    id: ObjectId,
}

impl PdfPage<'_> {
    pub fn number(&self) -> u32 {
        self.number
    }

    /// Extracted text, one line per text object. `None` for pages without text.
    pub fn text(&self) -> Result<Option<String>, PdfError> {
        let text = self.doc.extract_text(&[self.number])?;
        Ok(if text.trim().is_empty() { None } else { Some(text) })
    }

    /// Column-aligned tables in the page text.
    pub fn tables(&self) -> Result<Vec<TextTable>, PdfError> {
        Ok(self.text()?.map(|t| detect_tables(&t)).unwrap_or_default())
    }

    /// The page as an image for OCR: its largest embedded picture, which on a
    /// scanned statement is the scan itself. `None` when there is nothing usable.
    pub fn render_png(&self) -> Result<Option<Vec<u8>>, PdfError> {
        let images = match self.doc.get_page_images(self.id) {
            Ok(images) => images,
            Err(e) => {
                debug!(page = self.number, error = %e, "no image resources");
                return Ok(None);
            }
        };
        let Some(image) = images.iter().max_by_key(|img| img.width.saturating_mul(img.height)) else {
            return Ok(None);
        };

        let width = u32::try_from(image.width).map_err(|_| PdfError::Image("bad width".into()))?;
        let height = u32::try_from(image.height).map_err(|_| PdfError::Image("bad height".into()))?;
        let filters = image.filters.clone().unwrap_or_default();
        let color_space = image.color_space.as_deref().unwrap_or("DeviceRGB");
        let bits = image.bits_per_component.unwrap_or(8);

        match filters.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
            // JPEG streams decode as they are.
            ["DCTDecode"] => Ok(Some(image.content.to_vec())),
            ["FlateDecode"] => {
                let raw = inflate(image.content)?;
                raw_to_png(raw, width, height, color_space, bits)
            }
            [] => raw_to_png(image.content.to_vec(), width, height, color_space, bits),
            other => {
                debug!(page = self.number, filters = ?other, "unsupported image encoding");
                Ok(None)
            }
        }
    }
}

fn inflate(data: &[u8]) -> Result<Vec<u8>, PdfError> {
    let mut out = Vec::new();
    ZlibDecoder::new(data)
        .read_to_end(&mut out)
        .map_err(|e| PdfError::Image(e.to_string()))?;
    Ok(out)
}

/// Rebuild 8-bit gray or RGB samples as PNG. Other layouts yield `None`.
fn raw_to_png(
    raw: Vec<u8>,
    width: u32,
    height: u32,
    color_space: &str,
    bits: i64,
) -> Result<Option<Vec<u8>>, PdfError> {
    if bits != 8 {
        return Ok(None);
    }
    let mismatch = || PdfError::Image(format!("pixel data does not fill {width}x{height}"));
    let img = match color_space {
        "DeviceGray" | "CalGray" => DynamicImage::ImageLuma8(GrayImage::from_raw(width, height, raw).ok_or_else(mismatch)?),
        "DeviceRGB" | "CalRGB" => DynamicImage::ImageRgb8(RgbImage::from_raw(width, height, raw).ok_or_else(mismatch)?),
        _ => return Ok(None),
    };

    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| PdfError::Image(e.to_string()))?;
    Ok(Some(buf))
}
