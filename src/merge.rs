use std::{ffi::OsStr, fs, path::Path};

use miette::{bail, Context, IntoDiagnostic, Result};
use tracing::{debug, info, warn};

use crate::{
    io::list_files,
    types::{Attach, VideoDetails},
};

const TRANSCRIPT_EXTENSION: &str = "txt";

/// Counters of a merge run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MergeReport {
    /// Transcripts newly attached to their record
    pub added: usize,
    /// Transcripts whose record already had one
    pub already_present: usize,
    /// Transcripts without any corresponding record
    pub unmatched: usize,
}

/// Attach the transcripts of the directory to the video records.
///
/// A transcript `<video_id>.txt` is attached to the record with the exact same ID,
/// unless that record already has a transcript. Files are processed in name order.
/// A missing directory holds no transcript.
pub fn add_transcripts(details: &mut VideoDetails, transcripts_dir: &Path) -> Result<MergeReport> {
    let mut report = MergeReport::default();

    if !transcripts_dir.is_dir() {
        warn!(
            "Transcripts directory {} does not exist, nothing to merge",
            transcripts_dir.display()
        );
        return Ok(report);
    }

    let transcripts = list_files(transcripts_dir)?
        .into_iter()
        .filter(|p| p.extension() == Some(OsStr::new(TRANSCRIPT_EXTENSION)));

    for path in transcripts {
        let file_name = path.file_name().unwrap_or_default().to_string_lossy();

        let text = fs::read_to_string(&path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Could not read transcript {}", path.display()))?;

        let Some(video_id) = path.file_stem().and_then(OsStr::to_str) else {
            warn!("No matching video details found for transcript file {file_name}");
            report.unmatched += 1;
            continue;
        };

        match details.attach_transcript(video_id, text.trim())? {
            Attach::Added => {
                info!("Added transcript for video {video_id}");
                report.added += 1;
            }
            Attach::AlreadyPresent => {
                info!("Transcript already added for video {video_id}. Skipping it");
                report.already_present += 1;
            }
            Attach::Unmatched => {
                info!("No matching video details found for transcript file {file_name}");
                report.unmatched += 1;
            }
        }
    }

    Ok(report)
}

/// Load the video details, attach the transcripts and write the result to a new file.
///
/// Nothing is written if any input cannot be read.
pub fn merge_files(input: &Path, transcripts_dir: &Path, output: &Path) -> Result<MergeReport> {
    if is_same_file(input, output) {
        bail!(
            "The merge output {} must differ from its input",
            output.display()
        );
    }

    let mut details = VideoDetails::load(input)?;
    debug!("{} video records loaded from {}", details.len(), input.display());

    let report = add_transcripts(&mut details, transcripts_dir)?;

    details.save(output)?;
    info!(
        "{} transcripts added, {} already present, {} unmatched. Saved to {}",
        report.added,
        report.already_present,
        report.unmatched,
        output.display()
    );

    Ok(report)
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }

    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use indoc::indoc;
    use serde_json::{json, Value};

    use super::*;

    struct Fixture {
        _tmp: tempfile::TempDir,
        input: PathBuf,
        transcripts: PathBuf,
        output: PathBuf,
    }

    fn fixture(details: &str, transcripts: &[(&str, &str)]) -> Fixture {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("raw/video_details.json");
        let dir = tmp.path().join("raw/transcripts");
        fs::create_dir_all(&dir).unwrap();
        fs::write(&input, details).unwrap();
        for (name, text) in transcripts {
            fs::write(dir.join(name), text).unwrap();
        }

        Fixture {
            input,
            transcripts: dir,
            output: tmp.path().join("processed/out.json"),
            _tmp: tmp,
        }
    }

    fn read_json(path: &Path) -> Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn successful_match() {
        let f = fixture(r#"{"v1": {"title": "A"}}"#, &[("v1.txt", "Hello world")]);

        let report = merge_files(&f.input, &f.transcripts, &f.output).unwrap();

        assert_eq!(report.added, 1);
        assert_eq!(
            read_json(&f.output),
            json!({"v1": {"title": "A", "transcript": "Hello world"}})
        );
    }

    #[test]
    fn unmatched_transcript_is_dropped() {
        let f = fixture(r#"{"v1": {"title": "A"}}"#, &[("v2.txt", "Other")]);

        let report = merge_files(&f.input, &f.transcripts, &f.output).unwrap();

        assert_eq!(
            report,
            MergeReport {
                added: 0,
                already_present: 0,
                unmatched: 1
            }
        );
        assert_eq!(read_json(&f.output), json!({"v1": {"title": "A"}}));
    }

    #[test]
    fn transcript_is_trimmed_and_other_files_ignored() {
        let f = fixture(
            r#"{"v1": {}, "v2": {}}"#,
            &[("v1.txt", "\n  some text \n\n"), ("v2.srt", "subtitles"), ("v2.TXT", "upper")],
        );

        let report = merge_files(&f.input, &f.transcripts, &f.output).unwrap();

        assert_eq!(report.added, 1);
        assert_eq!(
            read_json(&f.output),
            json!({"v1": {"transcript": "some text"}, "v2": {}})
        );
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_transcript_is_merged() {
        let f = fixture(r#"{"v1": {}}"#, &[]);
        let target = f.transcripts.with_file_name("shared.txt");
        fs::write(&target, "linked text").unwrap();
        std::os::unix::fs::symlink(&target, f.transcripts.join("v1.txt")).unwrap();

        let report = merge_files(&f.input, &f.transcripts, &f.output).unwrap();

        assert_eq!(report.added, 1);
        assert_eq!(
            read_json(&f.output),
            json!({"v1": {"transcript": "linked text"}})
        );
    }

    #[test]
    fn merge_is_idempotent() {
        let f = fixture(
            indoc! {r#"
                {
                  "v1": {"title": "A"},
                  "v2": {"title": "B"}
                }
            "#},
            &[("v1.txt", "first version")],
        );
        merge_files(&f.input, &f.transcripts, &f.output).unwrap();
        let run1 = read_json(&f.output);

        // Change the transcript and add a new one, then merge the previous output
        fs::write(f.transcripts.join("v1.txt"), "second version").unwrap();
        fs::write(f.transcripts.join("v2.txt"), "new").unwrap();
        let output2 = f.output.with_file_name("out2.json");
        let report = merge_files(&f.output, &f.transcripts, &output2).unwrap();
        let run2 = read_json(&output2);

        assert_eq!(
            report,
            MergeReport {
                added: 1,
                already_present: 1,
                unmatched: 0
            }
        );
        assert_eq!(run2["v1"], run1["v1"]);
        assert_eq!(run2["v2"]["transcript"], "new");
    }

    #[test]
    fn raw_input_is_never_overwritten() {
        let raw = r#"{"v1": {"title": "A"}}"#;
        let f = fixture(raw, &[("v1.txt", "Hello")]);

        merge_files(&f.input, &f.transcripts, &f.output).unwrap();
        assert_eq!(fs::read_to_string(&f.input).unwrap(), raw);

        assert!(merge_files(&f.input, &f.transcripts, &f.input).is_err());
        assert_eq!(fs::read_to_string(&f.input).unwrap(), raw);
    }

    #[test]
    fn malformed_input_writes_nothing() {
        let f = fixture(r#"{"v1": {"title": "A"}"#, &[("v1.txt", "Hello")]);

        assert!(merge_files(&f.input, &f.transcripts, &f.output).is_err());
        assert!(!f.output.exists());
    }

    #[test]
    fn unreadable_transcript_writes_nothing() {
        let f = fixture(r#"{"v1": {}}"#, &[]);
        fs::write(f.transcripts.join("v1.txt"), [0xff, 0xfe, 0x00]).unwrap();

        assert!(merge_files(&f.input, &f.transcripts, &f.output).is_err());
        assert!(!f.output.exists());
    }

    #[test]
    fn missing_transcripts_dir_merges_nothing() {
        let f = fixture(r#"{"v1": {}}"#, &[]);
        fs::remove_dir(&f.transcripts).unwrap();

        let report = merge_files(&f.input, &f.transcripts, &f.output).unwrap();

        assert_eq!(report, MergeReport::default());
        assert_eq!(read_json(&f.output), json!({"v1": {}}));
    }
}
