use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use config::{Config, Environment, File};
use miette::{Context, IntoDiagnostic, Result};
use serde::Deserialize;

use crate::types::ListingStrategy;

const ENV_PREFIX: &str = "SERMON";
const ENV_SEPARATOR: &str = "__";

const VIDEO_DETAILS_FILE: &str = "video_details_cache.json";
const PROCESSED_FILE: &str = "video_details_cache_with_transcripts.json";

/// Application settings, loaded once at startup
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Root of the local data layout
    pub data_dir: PathBuf,

    /// Timeout of every remote request. No timeout if unset
    pub timeout_secs: Option<u64>,

    pub remote: RemoteSettings,
}

/// Location of the remote repository and of the files in it
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RemoteSettings {
    pub api_base: String,
    pub raw_base: String,
    pub owner: String,
    pub repo: String,
    pub branch: String,

    /// Path of the video details file, from the repository root
    pub video_details_path: String,

    /// Directory of the transcripts, from the repository root
    pub transcripts_dir: String,

    pub listing: ListingStrategy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            timeout_secs: None,
            remote: RemoteSettings::default(),
        }
    }
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            api_base: "https://api.github.com".to_owned(),
            raw_base: "https://raw.githubusercontent.com".to_owned(),
            owner: "lawwu".to_owned(),
            repo: "berean_transcripts".to_owned(),
            branch: "main".to_owned(),
            video_details_path: "data/video_details_cache.json".to_owned(),
            transcripts_dir: "data/transcripts".to_owned(),
            listing: ListingStrategy::default(),
        }
    }
}

impl Settings {
    /// Load the settings by layering, from lowest to highest priority:
    /// the defaults, the optional TOML file, the `SERMON__*` environment variables
    /// and the data directory override.
    pub fn load(file: Option<&Path>, data_dir: Option<&Path>) -> Result<Self> {
        Self::load_with_env(file, data_dir, Environment::default())
    }

    fn load_with_env(
        file: Option<&Path>,
        data_dir: Option<&Path>,
        env: Environment,
    ) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(file) = file {
            builder = builder.add_source(File::from(file).required(true));
        }

        builder = builder.add_source(
            env.prefix(ENV_PREFIX)
                .prefix_separator(ENV_SEPARATOR)
                .separator(ENV_SEPARATOR),
        );

        if let Some(data_dir) = data_dir {
            builder = builder
                .set_override("data_dir", data_dir.to_string_lossy().into_owned())
                .into_diagnostic()?;
        }

        builder
            .build()
            .into_diagnostic()
            .wrap_err("Could not load settings")?
            .try_deserialize()
            .into_diagnostic()
            .wrap_err("Invalid settings")
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Local data layout, derived from the data directory
#[derive(Debug, Clone)]
pub struct Paths {
    pub processed_dir: PathBuf,
    pub video_details_dir: PathBuf,
    pub transcripts_dir: PathBuf,
}

impl Paths {
    pub fn new(data_dir: &Path) -> Self {
        let raw_dir = data_dir.join("raw");
        Self {
            processed_dir: data_dir.join("processed"),
            video_details_dir: raw_dir.join("video_details"),
            transcripts_dir: raw_dir.join("transcripts"),
        }
    }

    /// The raw video details file, as downloaded
    pub fn video_details_file(&self) -> PathBuf {
        self.video_details_dir.join(VIDEO_DETAILS_FILE)
    }

    /// The video details file with the transcripts merged in
    pub fn processed_file(&self) -> PathBuf {
        self.processed_dir.join(PROCESSED_FILE)
    }
}
