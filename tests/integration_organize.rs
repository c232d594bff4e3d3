use assert_fs::prelude::*;
use chrono::FixedOffset;
use media_foldering::core::metadata::{DateTag, ImageTagReader, ImageTags, VideoProber};
use media_foldering::core::organize::{FileOutcome, OrganizeConfig, Organizer};
use media_foldering::core::timestamp::{TargetZone, TimestampResolver};
use media_foldering::error::{ConfigError, FolderingError, MetadataError};
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Treats a file's text as its DateTimeOriginal tag
struct TextDate;

impl ImageTagReader for TextDate {
    fn read_date_tags(&self, path: &Path) -> Result<ImageTags, MetadataError> {
        let text = fs::read_to_string(path).map_err(|source| MetadataError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let date = text.lines().next().unwrap_or_default().to_string();
        Ok([(DateTag::Original, date)].into_iter().collect())
    }
}

/// Container metadata: a `creation_time` on the file's second line, if any
struct TextCreationTime;

impl VideoProber for TextCreationTime {
    fn probe(&self, path: &Path) -> Result<serde_json::Value, MetadataError> {
        let text = fs::read_to_string(path).unwrap_or_default();
        match text.lines().nth(1) {
            Some(time) => Ok(serde_json::json!({ "format": { "tags": { "creation_time": time } } })),
            None => Err(MetadataError::ProbeFailed {
                path: path.to_path_buf(),
                status: "exit status: 1".to_string(),
            }),
        }
    }
}

fn utc_resolver() -> TimestampResolver {
    TimestampResolver::new(TargetZone::Fixed(FixedOffset::east_opt(0).unwrap()))
        .with_image_reader(Box::new(TextDate))
        .with_video_prober(Box::new(TextCreationTime))
}

fn organize(input: &Path, output: &Path) -> media_foldering::core::OrganizeReport {
    Organizer::new(OrganizeConfig::new(input, output))
        .with_resolver(utc_resolver())
        .run()
        .unwrap()
}

#[test]
fn files_land_under_pattern_path() {
    let input = assert_fs::TempDir::new().unwrap();
    let output = assert_fs::TempDir::new().unwrap();
    input.child("IMG_0001.jpg").write_str("2023:01:05 14:30:00").unwrap();

    let report = organize(input.path(), output.path());

    assert_eq!(report.moved, 1);
    input.child("IMG_0001.jpg").assert(predicate::path::missing());
    output
        .child("2023/01/05/2023-01-05 14-30 000.jpg")
        .assert("2023:01:05 14:30:00");
}

#[test]
fn video_creation_time_is_converted_to_target_zone() {
    let input = assert_fs::TempDir::new().unwrap();
    let output = assert_fs::TempDir::new().unwrap();
    input
        .child("clip.mov")
        .write_str("not exif\n2023-06-30T23:30:00.000000Z")
        .unwrap();

    let report = Organizer::new(OrganizeConfig::new(input.path(), output.path()))
        .with_resolver(
            TimestampResolver::new(TargetZone::Fixed(FixedOffset::east_opt(2 * 3600).unwrap()))
                .with_image_reader(Box::new(TextDate))
                .with_video_prober(Box::new(TextCreationTime)),
        )
        .run()
        .unwrap();

    assert_eq!(report.moved, 1);
    output
        .child("2023/07/01/2023-07-01 01-30 000.mov")
        .assert(predicate::path::is_file());
}

#[test]
fn identical_inputs_are_moved_once() {
    let input = assert_fs::TempDir::new().unwrap();
    let output = assert_fs::TempDir::new().unwrap();
    input.child("a.jpg").write_str("2023:01:05 14:30:00").unwrap();
    input.child("b.jpg").write_str("2023:01:05 14:30:00").unwrap();

    let report = organize(input.path(), output.path());

    assert_eq!(report.moved, 1);
    assert_eq!(report.duplicates, 1);
    input.child("a.jpg").assert(predicate::path::missing());
    input.child("b.jpg").assert(predicate::path::exists());
    output
        .child("2023/01/05/2023-01-05 14-30 000.jpg")
        .assert(predicate::path::exists());
    output
        .child("2023/01/05/2023-01-05 14-30 001.jpg")
        .assert(predicate::path::missing());
}

#[test]
fn content_already_in_output_is_left_in_place() {
    let input = assert_fs::TempDir::new().unwrap();
    let output = assert_fs::TempDir::new().unwrap();
    output
        .child("2019/archive/old name.jpg")
        .write_str("2023:01:05 14:30:00")
        .unwrap();
    input.child("a.jpg").write_str("2023:01:05 14:30:00").unwrap();
    input.child("b.jpg").write_str("2023:01:05 14:30:00").unwrap();

    let report = organize(input.path(), output.path());

    assert_eq!(report.moved, 0);
    assert_eq!(report.duplicates, 2);
    input.child("a.jpg").assert(predicate::path::exists());
    input.child("b.jpg").assert(predicate::path::exists());
    output.child("2023").assert(predicate::path::missing());
}

#[test]
fn same_bytes_with_other_extension_are_not_duplicates() {
    let input = assert_fs::TempDir::new().unwrap();
    let output = assert_fs::TempDir::new().unwrap();
    output
        .child("2023/01/05/2023-01-05 14-30 000.jpg")
        .write_str("2023:01:05 14:30:00")
        .unwrap();
    input.child("a.png").write_str("2023:01:05 14:30:00").unwrap();

    let report = organize(input.path(), output.path());

    assert_eq!(report.duplicates, 0);
    assert_eq!(report.moved, 1);
    output
        .child("2023/01/05/2023-01-05 14-30 000.png")
        .assert(predicate::path::exists());
}

#[test]
fn existing_destination_is_never_overwritten() {
    let input = assert_fs::TempDir::new().unwrap();
    let output = assert_fs::TempDir::new().unwrap();
    output
        .child("2023/01/05/2023-01-05 14-30 000.jpg")
        .write_str("an unrelated photo")
        .unwrap();
    input.child("a.jpg").write_str("2023:01:05 14:30:00").unwrap();

    organize(input.path(), output.path());

    output
        .child("2023/01/05/2023-01-05 14-30 000.jpg")
        .assert("an unrelated photo");
    output
        .child("2023/01/05/2023-01-05 14-30 001.jpg")
        .assert("2023:01:05 14:30:00");
}

#[test]
fn undated_files_go_to_no_exif_bucket() {
    let input = assert_fs::TempDir::new().unwrap();
    let output = assert_fs::TempDir::new().unwrap();
    input.child("holiday.jpg").write_str("corrupt header").unwrap();

    let report = organize(input.path(), output.path());

    assert_eq!(report.unresolved, 1);
    output
        .child("No EXIF/holiday 000.jpg")
        .assert("corrupt header");
}

#[test]
fn corrupt_file_with_real_readers_goes_to_no_exif_bucket() {
    let input = assert_fs::TempDir::new().unwrap();
    let output = assert_fs::TempDir::new().unwrap();
    input
        .child("broken.jpg")
        .write_binary(&[0xFF, 0xD8, 0xFF, 0xE1, 0x00, 0x04, 0x13, 0x37])
        .unwrap();

    let config = OrganizeConfig::new(input.path(), output.path())
        .with_probe_timeout(Duration::from_secs(5));
    let report = Organizer::new(config).run().unwrap();

    assert_eq!(report.moved, 1);
    assert_eq!(report.unresolved, 1);
    output
        .child("No EXIF/broken 000.jpg")
        .assert(predicate::path::is_file());
}

/// Organize a fixed input set and return destinations relative to the output
fn organized_layout() -> Vec<PathBuf> {
    let input = assert_fs::TempDir::new().unwrap();
    let output = assert_fs::TempDir::new().unwrap();
    input.child("z.jpg").write_str("2022:12:31 23:59:00").unwrap();
    input.child("a/b.jpg").write_str("2022:12:31 23:59:30").unwrap();
    input.child("c.mov").write_str("x\n2021-03-04T05:06:07Z").unwrap();
    input.child("d.heic").write_str("nothing useful").unwrap();

    let report = organize(input.path(), output.path());
    let root = fs::canonicalize(output.path()).unwrap();
    report
        .outcomes
        .iter()
        .filter_map(|o| match o {
            FileOutcome::Moved { to, .. } => Some(to.strip_prefix(&root).unwrap().to_path_buf()),
            _ => None,
        })
        .collect()
}

#[test]
fn same_input_gives_same_layout() {
    let first = organized_layout();

    assert_eq!(first.len(), 4);
    assert_eq!(first, organized_layout());
    assert_eq!(first[0], Path::new("2022/12/31/2022-12-31 23-59 000.jpg"));
    assert_eq!(first[1], Path::new("2021/03/04/2021-03-04 05-06 000.mov"));
    assert_eq!(first[2], Path::new("No EXIF/d 000.heic"));
    assert_eq!(first[3], Path::new("2022/12/31/2022-12-31 23-59 001.jpg"));
}

#[test]
fn missing_output_aborts_without_touching_input() {
    let input = assert_fs::TempDir::new().unwrap();
    input.child("a.jpg").write_str("2023:01:05 14:30:00").unwrap();

    let result = Organizer::new(OrganizeConfig::new(input.path(), input.path().join("missing")))
        .with_resolver(utc_resolver())
        .run();

    assert!(matches!(
        result,
        Err(FolderingError::Config(ConfigError::OutputNotFound { .. }))
    ));
    input.child("a.jpg").assert("2023:01:05 14:30:00");
    input.child("missing").assert(predicate::path::missing());
}

#[test]
fn dry_run_leaves_everything_in_place() {
    let input = assert_fs::TempDir::new().unwrap();
    let output = assert_fs::TempDir::new().unwrap();
    input.child("a.jpg").write_str("2023:01:05 14:30:00").unwrap();
    input.child("b.jpg").write_str("2023:01:05 14:30:45").unwrap();

    let report = Organizer::new(OrganizeConfig::new(input.path(), output.path()).with_dry_run(true))
        .with_resolver(utc_resolver())
        .run()
        .unwrap();

    assert_eq!(report.planned, 2);
    assert_eq!(report.moved, 0);
    input.child("a.jpg").assert(predicate::path::exists());
    input.child("b.jpg").assert(predicate::path::exists());
    output.child("2023").assert(predicate::path::missing());
}

#[test]
fn output_nested_in_input_is_not_reorganized() {
    let input = assert_fs::TempDir::new().unwrap();
    input.child("sorted/2020/01/01/2020-01-01 00-00 000.jpg")
        .write_str("2020:01:01 00:00:00")
        .unwrap();
    input.child("new.jpg").write_str("2023:01:05 14:30:00").unwrap();

    let report = organize(input.path(), &input.path().join("sorted"));

    assert_eq!(report.total_files(), 1);
    input
        .child("sorted/2020/01/01/2020-01-01 00-00 000.jpg")
        .assert(predicate::path::exists());
    input
        .child("sorted/2023/01/05/2023-01-05 14-30 000.jpg")
        .assert(predicate::path::exists());
}

#[test]
fn non_media_files_are_ignored_unless_configured() {
    let input = assert_fs::TempDir::new().unwrap();
    let output = assert_fs::TempDir::new().unwrap();
    input.child("notes.txt").write_str("2023:01:05 14:30:00").unwrap();

    let report = organize(input.path(), output.path());
    assert_eq!(report.total_files(), 0);
    input.child("notes.txt").assert(predicate::path::exists());

    let report = Organizer::new(
        OrganizeConfig::new(input.path(), output.path()).with_extensions(vec!["TXT".to_string()]),
    )
    .with_resolver(utc_resolver())
    .run()
    .unwrap();
    assert_eq!(report.moved, 1);
    output
        .child("2023/01/05/2023-01-05 14-30 000.txt")
        .assert(predicate::path::exists());
}
