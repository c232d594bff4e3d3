//! # Timestamp Module
//!
//! Resolves the capture time of a media file from whatever metadata it has.
//!
//! ## Resolution Order
//! 1. The first present image date tag of `DateTimeOriginal`,
//!    `DateTimeDigitized` and `DateTime`, parsed as `YYYY:MM:DD HH:MM:SS`.
//!    If that value does not parse, the image path yields nothing.
//! 2. The container's `creation_time` (RFC 3339), converted into the target zone
//! 3. Otherwise [`CaptureTimestamp::Unresolved`]
//!
//! The order is fixed and does not look at the extension: a mislabelled or
//! corrupt file simply falls through both readers. Missing, malformed and
//! unreadable metadata all end in `Unresolved`, never in an error.

mod zone;

pub use zone::TargetZone;

use crate::core::metadata::{
    DateTag, ExifTagReader, FfprobeProber, ImageTagReader, VideoProber,
};
use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// EXIF date format
pub const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Container `creation_time` format with a `+HHMM` offset, accepted when the
/// value is not RFC 3339
pub const CREATION_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%z";

/// Which metadata a timestamp was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampSource {
    ExifOriginal,
    ExifDigitized,
    ExifDateTime,
    VideoCreationTime,
}

impl From<DateTag> for TimestampSource {
    fn from(tag: DateTag) -> Self {
        match tag {
            DateTag::Original => TimestampSource::ExifOriginal,
            DateTag::Digitized => TimestampSource::ExifDigitized,
            DateTag::Modified => TimestampSource::ExifDateTime,
        }
    }
}

impl std::fmt::Display for TimestampSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimestampSource::ExifOriginal => write!(f, "EXIF DateTimeOriginal"),
            TimestampSource::ExifDigitized => write!(f, "EXIF DateTimeDigitized"),
            TimestampSource::ExifDateTime => write!(f, "EXIF DateTime"),
            TimestampSource::VideoCreationTime => write!(f, "container creation_time"),
        }
    }
}

/// Outcome of timestamp resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureTimestamp {
    /// A capture time was found
    Resolved {
        time: DateTime<FixedOffset>,
        source: TimestampSource,
    },
    /// No usable metadata
    Unresolved,
}

impl CaptureTimestamp {
    /// The resolved time, if any
    pub fn time(&self) -> Option<DateTime<FixedOffset>> {
        match self {
            CaptureTimestamp::Resolved { time, .. } => Some(*time),
            CaptureTimestamp::Unresolved => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, CaptureTimestamp::Resolved { .. })
    }
}

/// Resolves capture timestamps through pluggable metadata readers.
pub struct TimestampResolver {
    image: Box<dyn ImageTagReader>,
    video: Box<dyn VideoProber>,
    zone: TargetZone,
}

impl TimestampResolver {
    /// Resolver using the EXIF reader and ffprobe with its default timeout
    pub fn new(zone: TargetZone) -> Self {
        Self {
            image: Box::new(ExifTagReader),
            video: Box::new(FfprobeProber::new()),
            zone,
        }
    }

    /// Bound each container probe to `timeout`
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.video = Box::new(FfprobeProber::new().with_timeout(timeout));
        self
    }

    /// Replace the image tag reader
    pub fn with_image_reader(mut self, reader: Box<dyn ImageTagReader>) -> Self {
        self.image = reader;
        self
    }

    /// Replace the container prober
    pub fn with_video_prober(mut self, prober: Box<dyn VideoProber>) -> Self {
        self.video = prober;
        self
    }

    pub fn zone(&self) -> TargetZone {
        self.zone
    }

    /// Resolve the capture timestamp of `path`
    pub fn resolve(&self, path: &Path) -> CaptureTimestamp {
        if let Some(timestamp) = self.resolve_image(path) {
            return timestamp;
        }
        if let Some(timestamp) = self.resolve_video(path) {
            return timestamp;
        }
        tracing::debug!(path = %path.display(), "no capture timestamp");
        CaptureTimestamp::Unresolved
    }

    fn resolve_image(&self, path: &Path) -> Option<CaptureTimestamp> {
        let tags = match self.image.read_date_tags(path) {
            Ok(tags) => tags,
            Err(e) => {
                tracing::debug!(error = %e, "image metadata unavailable");
                return None;
            }
        };

        let (tag, raw) = DateTag::PRIORITY
            .into_iter()
            .find_map(|tag| tags.get(&tag).map(|raw| (tag, raw)))?;
        match parse_exif_datetime(raw) {
            Some(naive) => Some(CaptureTimestamp::Resolved {
                time: self.zone.localize(naive),
                source: tag.into(),
            }),
            None => {
                tracing::debug!(path = %path.display(), ?tag, value = %raw, "malformed EXIF date");
                None
            }
        }
    }

    fn resolve_video(&self, path: &Path) -> Option<CaptureTimestamp> {
        let probe = match self.video.probe(path) {
            Ok(probe) => probe,
            Err(e) => {
                tracing::debug!(error = %e, "container metadata unavailable");
                return None;
            }
        };

        let raw = creation_time_field(&probe)?;
        match parse_creation_time(raw) {
            Some(time) => Some(CaptureTimestamp::Resolved {
                time: self.zone.convert(time),
                source: TimestampSource::VideoCreationTime,
            }),
            None => {
                tracing::debug!(path = %path.display(), value = %raw, "malformed creation_time");
                None
            }
        }
    }
}

/// `format.tags.creation_time` of an ffprobe document
fn creation_time_field(probe: &serde_json::Value) -> Option<&str> {
    probe.get("format")?.get("tags")?.get("creation_time")?.as_str()
}

/// Parse an EXIF date value. `None` for anything that is not a real date in
/// `YYYY:MM:DD HH:MM:SS` form, including the all-zero placeholder.
pub fn parse_exif_datetime(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim_matches(|c: char| c == '\0' || c.is_whitespace());
    NaiveDateTime::parse_from_str(s, EXIF_DATETIME_FORMAT).ok()
}

/// Parse a container `creation_time` such as `2023-01-05T05:30:00.000000Z`
/// or `2023-01-05T14:30:00.000000+09:00`
pub fn parse_creation_time(raw: &str) -> Option<DateTime<FixedOffset>> {
    let s = raw.trim();
    DateTime::parse_from_rfc3339(s)
        .or_else(|_| DateTime::parse_from_str(s, CREATION_TIME_FORMAT))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::metadata::ImageTags;
    use crate::error::MetadataError;
    use chrono::{NaiveDate, Timelike};
    use serde_json::json;
    use std::path::PathBuf;

    struct FakeTags(Result<Vec<(DateTag, &'static str)>, ()>);

    impl ImageTagReader for FakeTags {
        fn read_date_tags(&self, path: &Path) -> Result<ImageTags, MetadataError> {
            match &self.0 {
                Ok(tags) => Ok(tags.iter().map(|(t, v)| (*t, v.to_string())).collect()),
                Err(()) => Err(MetadataError::Exif {
                    path: path.to_path_buf(),
                    reason: "corrupt".to_string(),
                }),
            }
        }
    }

    struct FakeProbe(Option<serde_json::Value>);

    impl VideoProber for FakeProbe {
        fn probe(&self, path: &Path) -> Result<serde_json::Value, MetadataError> {
            self.0.clone().ok_or_else(|| MetadataError::ProbeFailed {
                path: path.to_path_buf(),
                status: "exit status: 1".to_string(),
            })
        }
    }

    fn utc() -> TargetZone {
        TargetZone::Fixed(FixedOffset::east_opt(0).unwrap())
    }

    fn resolver(tags: Result<Vec<(DateTag, &'static str)>, ()>, probe: Option<serde_json::Value>) -> TimestampResolver {
        TimestampResolver::new(utc())
            .with_image_reader(Box::new(FakeTags(tags)))
            .with_video_prober(Box::new(FakeProbe(probe)))
    }

    fn file() -> PathBuf {
        PathBuf::from("/inbox/IMG_0001.jpg")
    }

    fn naive(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn original_tag_wins() {
        let r = resolver(
            Ok(vec![
                (DateTag::Modified, "2024:03:01 08:00:00"),
                (DateTag::Original, "2023:01:05 14:30:00"),
                (DateTag::Digitized, "2023:01:06 09:00:00"),
            ]),
            None,
        );
        match r.resolve(&file()) {
            CaptureTimestamp::Resolved { time, source } => {
                assert_eq!(time.naive_local(), naive(2023, 1, 5, 14, 30, 0));
                assert_eq!(source, TimestampSource::ExifOriginal);
            }
            other => panic!("expected resolved, got {:?}", other),
        }
    }

    #[test]
    fn digitized_used_without_original() {
        let r = resolver(Ok(vec![(DateTag::Digitized, "2022:07:14 18:45:12")]), None);
        let ts = r.resolve(&file());
        assert_eq!(ts.time().unwrap().naive_local(), naive(2022, 7, 14, 18, 45, 12));
        assert!(matches!(
            ts,
            CaptureTimestamp::Resolved {
                source: TimestampSource::ExifDigitized,
                ..
            }
        ));
    }

    #[test]
    fn modification_tag_is_last_resort() {
        let r = resolver(Ok(vec![(DateTag::Modified, "2020:02:29 23:59:59")]), None);
        let ts = r.resolve(&file());
        assert_eq!(ts.time().unwrap().naive_local(), naive(2020, 2, 29, 23, 59, 59));
    }

    #[test]
    fn malformed_first_tag_ends_image_lookup() {
        let r = resolver(
            Ok(vec![
                (DateTag::Original, "garbage"),
                (DateTag::Digitized, "2021:11:02 07:15:00"),
            ]),
            None,
        );
        assert_eq!(r.resolve(&file()), CaptureTimestamp::Unresolved);
    }

    #[test]
    fn malformed_image_tag_falls_through_to_video() {
        let r = resolver(
            Ok(vec![(DateTag::Original, "0000:00:00 00:00:00")]),
            Some(json!({"format": {"tags": {"creation_time": "2023-01-05T14:30:00Z"}}})),
        );
        match r.resolve(&file()) {
            CaptureTimestamp::Resolved { source, .. } => {
                assert_eq!(source, TimestampSource::VideoCreationTime)
            }
            other => panic!("expected resolved, got {:?}", other),
        }
    }

    #[test]
    fn falls_back_to_video_when_image_unreadable() {
        let r = resolver(
            Err(()),
            Some(json!({"format": {"tags": {"creation_time": "2023-01-05T14:30:00.000000Z"}}})),
        );
        match r.resolve(&file()) {
            CaptureTimestamp::Resolved { time, source } => {
                assert_eq!(source, TimestampSource::VideoCreationTime);
                assert_eq!(time.naive_local(), naive(2023, 1, 5, 14, 30, 0));
            }
            other => panic!("expected resolved, got {:?}", other),
        }
    }

    #[test]
    fn falls_back_to_video_when_image_has_no_dates() {
        let r = resolver(
            Ok(vec![]),
            Some(json!({"format": {"tags": {"creation_time": "2019-08-01T10:00:00.000000Z"}}})),
        );
        assert!(r.resolve(&file()).is_resolved());
    }

    #[test]
    fn video_time_converted_into_target_zone() {
        let tokyo = TargetZone::Fixed(FixedOffset::east_opt(9 * 3600).unwrap());
        let r = TimestampResolver::new(tokyo)
            .with_image_reader(Box::new(FakeTags(Err(()))))
            .with_video_prober(Box::new(FakeProbe(Some(json!({
                "format": {"tags": {"creation_time": "2023-01-05T20:30:00.000000Z"}}
            })))));

        let time = r.resolve(&file()).time().unwrap();
        assert_eq!(time.naive_local(), naive(2023, 1, 6, 5, 30, 0));
        assert_eq!(time.offset().local_minus_utc(), 9 * 3600);
    }

    #[test]
    fn missing_tags_block_is_unresolved() {
        let r = resolver(Err(()), Some(json!({"format": {"filename": "clip.mp4"}})));
        assert_eq!(r.resolve(&file()), CaptureTimestamp::Unresolved);
    }

    #[test]
    fn non_string_creation_time_is_unresolved() {
        let r = resolver(Err(()), Some(json!({"format": {"tags": {"creation_time": 12345}}})));
        assert_eq!(r.resolve(&file()), CaptureTimestamp::Unresolved);
    }

    #[test]
    fn malformed_creation_time_is_unresolved() {
        let r = resolver(Err(()), Some(json!({"format": {"tags": {"creation_time": "yesterday"}}})));
        assert_eq!(r.resolve(&file()), CaptureTimestamp::Unresolved);
    }

    #[test]
    fn nothing_available_is_unresolved() {
        let r = resolver(Err(()), None);
        assert_eq!(r.resolve(&file()), CaptureTimestamp::Unresolved);
    }

    #[test]
    fn resolution_is_deterministic() {
        let r = resolver(Ok(vec![(DateTag::Original, "2023:01:05 14:30:00")]), None);
        assert_eq!(r.resolve(&file()), r.resolve(&file()));
    }

    #[test]
    fn parse_exif_datetime_rejects_other_layouts() {
        assert_eq!(
            parse_exif_datetime("2023:01:05 14:30:00\0"),
            Some(naive(2023, 1, 5, 14, 30, 0))
        );
        assert_eq!(parse_exif_datetime("2023-01-05 14:30:00"), None);
        assert_eq!(parse_exif_datetime("2023:13:05 14:30:00"), None);
        assert_eq!(parse_exif_datetime(""), None);
    }

    #[test]
    fn parse_creation_time_accepts_offsets() {
        let z = parse_creation_time("2023-01-05T05:30:00.000000Z").unwrap();
        assert_eq!(z.offset().local_minus_utc(), 0);

        let colon = parse_creation_time("2023-01-05T14:30:00.123456+09:00").unwrap();
        assert_eq!(colon.offset().local_minus_utc(), 9 * 3600);
        assert_eq!(colon.nanosecond(), 123_456_000);

        let compact = parse_creation_time("2023-01-05T14:30:00.000000-0500").unwrap();
        assert_eq!(compact.offset().local_minus_utc(), -5 * 3600);

        assert!(parse_creation_time("2023-01-05 14:30:00").is_none());
    }
}
