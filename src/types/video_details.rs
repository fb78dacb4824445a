use std::{fs, ops::Deref, path::Path};

use miette::{bail, Context, IntoDiagnostic, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::io::write_atomic;

/// Record field holding the full transcript text
pub const TRANSCRIPT_FIELD: &str = "transcript";

/// Video records keyed by video ID.
///
/// Records are kept as raw JSON objects as their fields are set by
/// whoever produced the file. Key order is preserved from the input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoDetails(Map<String, Value>);

/// Outcome of attaching a transcript to a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attach {
    Added,
    AlreadyPresent,
    Unmatched,
}

impl VideoDetails {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Could not read {}", path.display()))?;

        serde_json::from_str(&content)
            .into_diagnostic()
            .wrap_err_with(|| format!("Malformed video details file {}", path.display()))
    }

    /// Write the records as indented JSON, replacing the file atomically
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut json = serde_json::to_string_pretty(self)
            .into_diagnostic()
            .wrap_err("Could not serialize video details")?;
        json.push('\n');

        write_atomic(path, json.as_bytes())
    }

    /// Set the transcript of the video, unless it already has one.
    ///
    /// Fails if the record of the video is not a JSON object.
    pub fn attach_transcript(&mut self, video_id: &str, transcript: &str) -> Result<Attach> {
        let Some(record) = self.0.get_mut(video_id) else {
            return Ok(Attach::Unmatched);
        };

        let Value::Object(record) = record else {
            bail!("Record of video '{video_id}' is not a JSON object");
        };

        if record.contains_key(TRANSCRIPT_FIELD) {
            return Ok(Attach::AlreadyPresent);
        }

        record.insert(TRANSCRIPT_FIELD.to_owned(), transcript.into());
        Ok(Attach::Added)
    }
}

impl Deref for VideoDetails {
    type Target = Map<String, Value>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use serde_json::json;

    use super::*;

    fn details(value: Value) -> VideoDetails {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn attach_to_matching_record() {
        let mut videos = details(json!({"v1": {"title": "A"}}));

        let res = videos.attach_transcript("v1", "Hello world").unwrap();

        assert_eq!(res, Attach::Added);
        assert_eq!(
            videos,
            details(json!({"v1": {"title": "A", "transcript": "Hello world"}}))
        );
    }

    #[test]
    fn never_overwrite_transcript() {
        let mut videos = details(json!({"v1": {"title": "A", "transcript": "old"}}));

        let res = videos.attach_transcript("v1", "new").unwrap();

        assert_eq!(res, Attach::AlreadyPresent);
        assert_eq!(videos["v1"]["transcript"], "old");
    }

    #[test]
    fn unknown_id_adds_nothing() {
        let mut videos = details(json!({"v1": {"title": "A"}}));

        let res = videos.attach_transcript("v2", "text").unwrap();

        assert_eq!(res, Attach::Unmatched);
        assert_eq!(videos, details(json!({"v1": {"title": "A"}})));
    }

    #[test]
    fn ids_are_case_sensitive() {
        let mut videos = details(json!({"abc": {}}));
        assert_eq!(
            videos.attach_transcript("ABC", "text").unwrap(),
            Attach::Unmatched
        );
    }

    #[test]
    fn non_object_record_fails() {
        let mut videos = details(json!({"v1": "not a record"}));
        assert!(videos.attach_transcript("v1", "text").is_err());
    }

    #[test]
    fn save_keeps_key_order() {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("in.json");
        let output = tmp.path().join("out.json");
        fs::write(
            &input,
            indoc! {r#"
                {
                  "zz": {"title": "Z", "date": "2020"},
                  "aa": {"title": "A"}
                }
            "#},
        )
        .unwrap();

        let mut videos = VideoDetails::load(&input).unwrap();
        videos.attach_transcript("zz", "text").unwrap();
        videos.save(&output).unwrap();

        let expected = indoc! {r#"
            {
              "zz": {
                "title": "Z",
                "date": "2020",
                "transcript": "text"
              },
              "aa": {
                "title": "A"
              }
            }
        "#};
        assert_eq!(fs::read_to_string(&output).unwrap(), expected);
    }

    #[test]
    fn load_rejects_malformed_json() {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("in.json");

        fs::write(&input, "{\"v1\": ").unwrap();
        assert!(VideoDetails::load(&input).is_err());

        fs::write(&input, "[1, 2]").unwrap();
        assert!(VideoDetails::load(&input).is_err());
    }
}
