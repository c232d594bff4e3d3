//! Seams between the timestamp resolver and the metadata libraries.

use crate::error::MetadataError;
use std::collections::BTreeMap;
use std::path::Path;

/// EXIF date tags, declared in resolution priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DateTag {
    /// `DateTimeOriginal`: when the shutter fired
    Original,
    /// `DateTimeDigitized`: when the image was stored digitally
    Digitized,
    /// IFD0 `DateTime`: last modification of the file
    Modified,
}

impl DateTag {
    /// Every tag, highest priority first
    pub const PRIORITY: [DateTag; 3] = [DateTag::Original, DateTag::Digitized, DateTag::Modified];
}

/// Raw date tag values read from one image, keyed by tag.
///
/// Values are kept verbatim; parsing happens in the resolver so that a
/// malformed value can be told apart from a missing one.
pub type ImageTags = BTreeMap<DateTag, String>;

/// Reads the date tags embedded in an image.
///
/// Implement this trait to plug in another EXIF decoder (or a fake in tests).
pub trait ImageTagReader: Send + Sync {
    /// Return whichever date tags are present. An empty map means the
    /// metadata block was readable but carried no dates.
    fn read_date_tags(&self, path: &Path) -> Result<ImageTags, MetadataError>;
}

/// Probes a media container for its structured metadata.
pub trait VideoProber: Send + Sync {
    /// Return the probe output as a JSON document (ffprobe's
    /// `-print_format json -show_format` layout).
    fn probe(&self, path: &Path) -> Result<serde_json::Value, MetadataError>;
}
