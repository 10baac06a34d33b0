//! Output format enumeration

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the publishable artifact kinds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Html,
    Epub,
    Mobi,
    Pdf,
}

impl OutputFormat {
    /// Every format, in registry order
    pub const ALL: [OutputFormat; 4] = [Self::Html, Self::Epub, Self::Mobi, Self::Pdf];

    /// Canonical lowercase name, as used on the command line and in templates
    pub fn name(&self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Epub => "epub",
            Self::Mobi => "mobi",
            Self::Pdf => "pdf",
        }
    }

    /// Stylesheet shipped for this format under `assets/css/`
    pub fn stylesheet(&self) -> String {
        format!("stylesheet.{}.css", self.name())
    }

    /// Formats built from the EPUB container layout
    pub fn is_epub_family(&self) -> bool {
        matches!(self, Self::Epub | Self::Mobi)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
