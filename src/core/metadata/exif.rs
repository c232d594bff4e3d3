//! EXIF date tag reader backed by `kamadak-exif`.

use super::traits::{DateTag, ImageTagReader, ImageTags};
use crate::error::MetadataError;
use exif::{In, Reader, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Reads date tags from JPEG, TIFF, HEIF, PNG and WebP containers.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExifTagReader;

impl ExifTagReader {
    fn exif_tag(tag: DateTag) -> Tag {
        match tag {
            DateTag::Original => Tag::DateTimeOriginal,
            DateTag::Digitized => Tag::DateTimeDigitized,
            DateTag::Modified => Tag::DateTime,
        }
    }
}

impl ImageTagReader for ExifTagReader {
    fn read_date_tags(&self, path: &Path) -> Result<ImageTags, MetadataError> {
        let file = File::open(path).map_err(|source| MetadataError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let mut bufreader = BufReader::new(file);
        let exif = Reader::new()
            .read_from_container(&mut bufreader)
            .map_err(|e| MetadataError::Exif {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let mut tags = ImageTags::new();
        for tag in DateTag::PRIORITY {
            if let Some(field) = exif.get_field(Self::exif_tag(tag), In::PRIMARY) {
                if let Some(value) = ascii_value(&field.value) {
                    tags.insert(tag, value);
                }
            }
        }

        Ok(tags)
    }
}

/// First ASCII component of a field, without trailing NULs.
///
/// Non-ASCII date fields are not valid EXIF and are reported as absent.
fn ascii_value(value: &Value) -> Option<String> {
    let Value::Ascii(ref vec) = value else {
        return None;
    };
    let bytes = vec.first()?;
    let s = std::str::from_utf8(bytes).ok()?;
    Some(s.trim_end_matches('\0').to_string())
}
