//! Book configuration loaded from `config/book.yml`

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Location of the configuration file relative to the project root
pub const CONFIG_PATH: &str = "config/book.yml";

/// Immutable book configuration, loaded once per build
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookConfig {
    /// Book title
    pub title: String,

    /// Author name as it should appear in the book
    pub author: String,

    /// Ordered chapter list
    #[serde(default)]
    pub chapters: Vec<Chapter>,

    /// Language code (ISO 639-1)
    #[serde(default = "default_language")]
    pub language: String,

    /// Unique identifier used by the package documents
    #[serde(default = "default_identifier")]
    pub identifier: String,

    /// External tool settings
    #[serde(default, skip_serializing_if = "ToolConfig::is_default")]
    pub tools: ToolConfig,

    /// Every other top-level key
    #[serde(flatten)]
    pub metadata: BTreeMap<String, serde_yaml::Value>,
}

fn default_language() -> String {
    "en".to_string()
}

fn default_identifier() -> String {
    format!("urn:uuid:{}", uuid::Uuid::new_v4())
}

impl BookConfig {
    /// Create a configuration with the required fields
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            chapters: Vec::new(),
            language: default_language(),
            identifier: default_identifier(),
            tools: ToolConfig::default(),
            metadata: BTreeMap::new(),
        }
    }

    /// Add a chapter
    pub fn with_chapter(mut self, chapter: Chapter) -> Self {
        self.chapters.push(chapter);
        self
    }

    /// Set a free-form metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<serde_yaml::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Parse a configuration document; `origin` is only used for error messages
    pub fn from_yaml(source: &str, origin: &Path) -> Result<Self, ConfigError> {
        let config: BookConfig =
            serde_yaml::from_str(source).map_err(|e| ConfigError::Malformed {
                path: origin.to_path_buf(),
                message: e.to_string(),
            })?;

        if config.title.trim().is_empty() {
            return Err(ConfigError::MissingField("title".to_string()));
        }
        Ok(config)
    }

    /// Load `config/book.yml` beneath the project root
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let path = root.join(CONFIG_PATH);
        let source = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::NotFound(path.clone()),
            _ => ConfigError::Io {
                path: path.clone(),
                source: e,
            },
        })?;

        let config = Self::from_yaml(&source, &path)?;
        tracing::debug!(
            "Loaded '{}' with {} chapters from {}",
            config.title,
            config.chapters.len(),
            path.display()
        );
        Ok(config)
    }
}

/// A single chapter entry
///
/// Accepts either a bare title string or a mapping:
///
/// ```yaml
/// chapters:
///   - Preface
///   - title: The Beginning
///     file: chapters/01.html.erb
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(from = "ChapterRepr")]
pub struct Chapter {
    /// Chapter title
    pub title: String,

    /// Optional template path for the chapter body
    pub file: Option<String>,

    /// Any additional per-chapter keys
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl Chapter {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            file: None,
            extra: BTreeMap::new(),
        }
    }

    /// Set the chapter template path
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ChapterRepr {
    Title(String),
    Full {
        title: String,
        #[serde(default)]
        file: Option<String>,
        #[serde(flatten)]
        extra: BTreeMap<String, serde_yaml::Value>,
    },
}

impl From<ChapterRepr> for Chapter {
    fn from(repr: ChapterRepr) -> Self {
        match repr {
            ChapterRepr::Title(title) => Chapter::new(title),
            ChapterRepr::Full { title, file, extra } => Chapter { title, file, extra },
        }
    }
}

/// Commands and limits for the external tools the pipeline drives
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ToolConfig {
    /// Ebook validator command; the artifact path is appended
    pub epubcheck: Vec<String>,

    /// Device converter executable per host platform
    pub kindlegen: KindlegenConfig,

    /// HTML-to-PDF renderer command; `<input> -o <output>` is appended
    pub prince: Vec<String>,

    /// Kill tools that run longer than this; unset blocks until exit
    pub timeout_secs: Option<u64>,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            epubcheck: vec![
                "java".to_string(),
                "-jar".to_string(),
                "script/epubcheck/epubcheck.jar".to_string(),
            ],
            kindlegen: KindlegenConfig::default(),
            prince: vec!["prince".to_string(), "-v".to_string()],
            timeout_secs: None,
        }
    }
}

impl ToolConfig {
    fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Timeout as a duration, if configured
    pub fn timeout(&self) -> Option<std::time::Duration> {
        self.timeout_secs.map(std::time::Duration::from_secs)
    }
}

/// Platform-specific converter executables
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct KindlegenConfig {
    pub linux: PathBuf,
    pub macos: PathBuf,
    pub windows: PathBuf,
}

impl Default for KindlegenConfig {
    fn default() -> Self {
        Self {
            linux: PathBuf::from("script/kindlegen/kindlegen_linux"),
            macos: PathBuf::from("script/kindlegen/kindlegen_mac"),
            windows: PathBuf::from("script/kindlegen/kindlegen.exe"),
        }
    }
}
