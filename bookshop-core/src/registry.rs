//! Format registry
//!
//! Maps a format name (or alias) to a static [`FormatSpec`] describing the
//! ordered stages and output locations of that format's build.

use crate::error::UnknownFormatError;
use crate::types::OutputFormat;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Rendered book body, relative to the content directory
pub const RENDERED_BOOK: &str = "book.html";

/// One step of a format's build pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    /// Empty the build subdirectory
    Clean,
    /// Copy `META-INF/` and `mimetype`, create `OEBPS/`
    ScaffoldContainer,
    RenderBook,
    RenderCover,
    RenderNav,
    RenderPackageDocument,
    #[serde(rename = "render-ncx")]
    RenderNavigationControlFile,
    /// Copy shared assets, pruning stylesheets of other formats where required
    CopyAssets,
    /// Zip the container: `mimetype` stored first, everything else deflated
    Package,
    /// Run the ebook validator; failures are reported, not fatal
    Validate,
    /// Run the platform-specific device converter
    ConvertToDevice,
    /// Run the HTML-to-PDF renderer
    ConvertToPdf,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Clean => "clean",
            Stage::ScaffoldContainer => "scaffold-container",
            Stage::RenderBook => "render-book",
            Stage::RenderCover => "render-cover",
            Stage::RenderNav => "render-nav",
            Stage::RenderPackageDocument => "render-package-document",
            Stage::RenderNavigationControlFile => "render-ncx",
            Stage::CopyAssets => "copy-assets",
            Stage::Package => "package",
            Stage::Validate => "validate",
            Stage::ConvertToDevice => "convert-to-device",
            Stage::ConvertToPdf => "convert-to-pdf",
        }
    }

    /// Template rendered by this stage and the file it writes, relative to the content directory
    pub fn render_target(&self) -> Option<(&'static str, &'static str)> {
        match self {
            Stage::RenderBook => Some(("book.html.erb", RENDERED_BOOK)),
            Stage::RenderCover => Some(("frontmatter/cover.html.erb", "cover.html")),
            Stage::RenderNav => Some(("frontmatter/toc.html.erb", "toc.html")),
            Stage::RenderPackageDocument => Some(("epub/OEBPS/content.opf.erb", "content.opf")),
            Stage::RenderNavigationControlFile => Some(("epub/OEBPS/toc.ncx.erb", "toc.ncx")),
            _ => None,
        }
    }

    /// Stages whose failure is logged but does not halt the build
    pub fn is_advisory(&self) -> bool {
        matches!(self, Stage::Validate)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const HTML_STAGES: &[Stage] = &[Stage::Clean, Stage::RenderBook, Stage::CopyAssets];

const EPUB_STAGES: &[Stage] = &[
    Stage::Clean,
    Stage::ScaffoldContainer,
    Stage::RenderBook,
    Stage::RenderCover,
    Stage::RenderNav,
    Stage::RenderPackageDocument,
    Stage::RenderNavigationControlFile,
    Stage::CopyAssets,
    Stage::Package,
    Stage::Validate,
];

const MOBI_STAGES: &[Stage] = &[
    Stage::Clean,
    Stage::ScaffoldContainer,
    Stage::RenderBook,
    Stage::RenderCover,
    Stage::RenderNav,
    Stage::RenderPackageDocument,
    Stage::RenderNavigationControlFile,
    Stage::CopyAssets,
    Stage::Package,
    Stage::Validate,
    Stage::ConvertToDevice,
];

const PDF_STAGES: &[Stage] = &[
    Stage::Clean,
    Stage::RenderBook,
    Stage::CopyAssets,
    Stage::ConvertToPdf,
];

/// Static description of one output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FormatSpec {
    pub format: OutputFormat,
    pub aliases: &'static [&'static str],
    pub stages: &'static [Stage],
    /// Build subdirectory relative to the project root
    pub build_dir: &'static str,
    /// Where rendered pages and assets go, relative to `build_dir`
    pub content_dir: &'static str,
    /// Intermediate EPUB container, relative to `build_dir`
    pub archive: Option<&'static str>,
    /// Final artifact, relative to `build_dir`
    pub artifact: &'static str,
}

impl FormatSpec {
    pub fn name(&self) -> &'static str {
        self.format.name()
    }

    /// Artifact path relative to the project root, e.g. `builds/pdf/book.pdf`
    pub fn artifact_path(&self) -> PathBuf {
        PathBuf::from(self.build_dir).join(self.artifact)
    }

    /// Stylesheets removed from the staged assets after copying
    pub fn pruned_stylesheets(&self) -> Vec<String> {
        if !self.format.is_epub_family() {
            return Vec::new();
        }
        OutputFormat::ALL
            .iter()
            .filter(|f| **f != self.format)
            .map(|f| f.stylesheet())
            .collect()
    }
}

static FORMATS: [FormatSpec; 4] = [
    FormatSpec {
        format: OutputFormat::Html,
        aliases: &[],
        stages: HTML_STAGES,
        build_dir: "builds/html",
        content_dir: "",
        archive: None,
        artifact: "book.html",
    },
    FormatSpec {
        format: OutputFormat::Epub,
        aliases: &[],
        stages: EPUB_STAGES,
        build_dir: "builds/epub",
        content_dir: "OEBPS",
        archive: Some("book.epub"),
        artifact: "book.epub",
    },
    FormatSpec {
        format: OutputFormat::Mobi,
        aliases: &[],
        stages: MOBI_STAGES,
        build_dir: "builds/mobi",
        content_dir: "OEBPS",
        archive: Some("book.epub"),
        artifact: "book.mobi",
    },
    FormatSpec {
        format: OutputFormat::Pdf,
        aliases: &["p"],
        stages: PDF_STAGES,
        build_dir: "builds/pdf",
        content_dir: "",
        archive: None,
        artifact: "book.pdf",
    },
];

/// Every registered format, in usage order
pub fn formats() -> &'static [FormatSpec] {
    &FORMATS
}

/// Find the format for a name or alias
pub fn lookup(name: &str) -> Result<&'static FormatSpec, UnknownFormatError> {
    FORMATS
        .iter()
        .find(|spec| spec.name() == name || spec.aliases.contains(&name))
        .ok_or_else(|| UnknownFormatError {
            name: name.to_string(),
        })
}

/// The spec for an already-typed format
pub fn spec_for(format: OutputFormat) -> &'static FormatSpec {
    match format {
        OutputFormat::Html => &FORMATS[0],
        OutputFormat::Epub => &FORMATS[1],
        OutputFormat::Mobi => &FORMATS[2],
        OutputFormat::Pdf => &FORMATS[3],
    }
}

/// Usage text listing every buildable format
pub fn usage() -> String {
    let mut text = String::from(
        "Usage: bookshop build [ARGS]\n\nThe most common build commands are:\n",
    );
    for spec in formats() {
        text.push_str(&format!(
            " {:<12} Builds a new {:<4} at /{}\n",
            spec.name(),
            spec.name(),
            spec.artifact_path().display()
        ));
    }
    text.push_str("\nAll commands can be run with -h for more information.\n");
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_lookup_canonical_names() {
        for format in OutputFormat::ALL {
            assert_eq!(lookup(format.name()).unwrap().format, format);
        }
    }

    #[test]
    fn test_alias_matches_canonical() {
        assert_eq!(lookup("p").unwrap(), lookup("pdf").unwrap());
    }

    #[test]
    fn test_unknown_format() {
        let err = lookup("docx").unwrap_err();
        assert_eq!(err.name, "docx");
        assert!(lookup("PDF").is_err());
        assert!(lookup("--help").is_err());
    }

    #[test]
    fn test_every_stage_list_starts_with_clean() {
        for spec in formats() {
            assert!(!spec.stages.is_empty());
            assert_eq!(spec.stages[0], Stage::Clean, "{}", spec.name());
        }
    }

    #[test]
    fn test_mobi_extends_epub() {
        let epub = lookup("epub").unwrap();
        let mobi = lookup("mobi").unwrap();
        assert_eq!(&mobi.stages[..epub.stages.len()], epub.stages);
        assert_eq!(mobi.stages.last(), Some(&Stage::ConvertToDevice));
    }

    #[test]
    fn test_artifact_paths() {
        assert_eq!(lookup("html").unwrap().artifact_path(), PathBuf::from("builds/html/book.html"));
        assert_eq!(lookup("epub").unwrap().artifact_path(), PathBuf::from("builds/epub/book.epub"));
        assert_eq!(lookup("mobi").unwrap().artifact_path(), PathBuf::from("builds/mobi/book.mobi"));
        assert_eq!(lookup("p").unwrap().artifact_path(), PathBuf::from("builds/pdf/book.pdf"));
    }

    #[test]
    fn test_stylesheet_pruning_per_format() {
        assert_eq!(
            lookup("epub").unwrap().pruned_stylesheets(),
            vec!["stylesheet.html.css", "stylesheet.mobi.css", "stylesheet.pdf.css"]
        );
        assert_eq!(
            lookup("mobi").unwrap().pruned_stylesheets(),
            vec!["stylesheet.html.css", "stylesheet.epub.css", "stylesheet.pdf.css"]
        );
        assert!(lookup("html").unwrap().pruned_stylesheets().is_empty());
        assert!(lookup("pdf").unwrap().pruned_stylesheets().is_empty());
    }

    #[test]
    fn test_spec_for_matches_lookup() {
        for format in OutputFormat::ALL {
            assert_eq!(spec_for(format), lookup(format.name()).unwrap());
        }
    }

    #[test]
    fn test_stage_serializes_as_its_name() {
        for spec in formats() {
            for stage in spec.stages {
                assert_eq!(serde_json::to_value(stage).unwrap(), stage.name());
            }
        }
    }

    #[test]
    fn test_usage_lists_all_formats() {
        let text = usage();
        assert!(text.starts_with("Usage: bookshop build"));
        for spec in formats() {
            assert!(text.contains(&spec.artifact_path().display().to_string()));
        }
    }

    proptest! {
        #[test]
        fn lookup_never_panics(name in "\\PC*") {
            if let Ok(spec) = lookup(&name) {
                prop_assert!(spec.name() == name || spec.aliases.contains(&name.as_str()));
                prop_assert_eq!(lookup(spec.name()).unwrap(), spec);
            }
        }
    }
}
