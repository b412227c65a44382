//! Metadata extraction from image containers
//!
//! The WebUI stores its generation parameters as a PNG text chunk keyed
//! `parameters` (tEXt for latin-1 payloads, iTXt for anything wider). Only
//! the chunk metadata is decoded here; pixel data is never touched.

use crate::error::Result;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Text-chunk keyword the WebUI writes its payload under
pub const PARAMETERS_KEYWORD: &str = "parameters";

/// Source of raw metadata payloads, one per image file.
///
/// `Ok(None)` means the file is a valid image without a payload; an `Err`
/// means the file could not be opened or decoded at all. Callers record
/// both in the index instead of aborting a run.
pub trait MetadataReader {
    fn read_parameters(&self, path: &Path) -> Result<Option<String>>;
}

/// Reads the `parameters` chunk from PNG files on disk
#[derive(Debug, Clone, Copy, Default)]
pub struct PngReader;

impl MetadataReader for PngReader {
    fn read_parameters(&self, path: &Path) -> Result<Option<String>> {
        let file = File::open(path)?;
        let decoder = png::Decoder::new(BufReader::new(file));
        let reader = decoder.read_info()?;
        let info = reader.info();

        for chunk in &info.uncompressed_latin1_text {
            if chunk.keyword == PARAMETERS_KEYWORD {
                return Ok(Some(chunk.text.clone()));
            }
        }

        for chunk in &info.utf8_text {
            if chunk.keyword == PARAMETERS_KEYWORD {
                let text = chunk
                    .get_text()
                    .map_err(|e| crate::error::Error::Png(e.to_string()))?;
                return Ok(Some(text));
            }
        }

        Ok(None)
    }
}

/// Test helper: write a 1x1 PNG, optionally carrying a `parameters` chunk.
#[cfg(test)]
pub(crate) fn write_test_png(path: &Path, parameters: Option<&str>) {
    let file = File::create(path).unwrap();
    let mut encoder = png::Encoder::new(file, 1, 1);
    encoder.set_color(png::ColorType::Grayscale);
    encoder.set_depth(png::BitDepth::Eight);
    if let Some(text) = parameters {
        encoder
            .add_text_chunk(PARAMETERS_KEYWORD.to_string(), text.to_string())
            .unwrap();
    }
    let mut writer = encoder.write_header().unwrap();
    writer.write_image_data(&[0]).unwrap();
}
