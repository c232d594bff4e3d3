//! # Metadata Module
//!
//! Readers for the capture metadata embedded in media files.
//!
//! ## Sources
//! - EXIF date tags in still images (via `kamadak-exif`)
//! - The container `format.tags` block of videos (via `ffprobe`)
//!
//! Both are I/O-bound and may fail on any given file. Callers get a
//! [`MetadataError`](crate::error::MetadataError) and decide how to degrade;
//! the timestamp resolver treats every failure as "no timestamp".

mod exif;
mod ffprobe;
mod traits;

pub use exif::ExifTagReader;
pub use ffprobe::{FfprobeProber, DEFAULT_PROBE_TIMEOUT};
pub use traits::{DateTag, ImageTagReader, ImageTags, VideoProber};
