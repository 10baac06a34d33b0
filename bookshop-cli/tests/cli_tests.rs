//! Integration tests for the Bookshop CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs::{self, File};
use std::path::Path;
use tempfile::TempDir;

// The validator points at a command that cannot exist
const BOOK_YML: &str = r#"title: Flatland
author: Edwin A. Abbott
chapters:
  - Of the Nature of Flatland
tools:
  epubcheck: [script/missing/epubcheck]
"#;

/// Lay out a minimal project that builds without external tools
fn create_project() -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let files: &[(&str, &str)] = &[
        ("config/book.yml", BOOK_YML),
        (
            "book/book.html.erb",
            "<h1><%= title %></h1>\n<% for c in chapters %><h2><%= c.title %></h2><% end %>\n",
        ),
        ("book/frontmatter/cover.html.erb", "<p><%= author %></p>\n"),
        ("book/frontmatter/toc.html.erb", "<ol></ol>\n"),
        ("book/epub/mimetype", "application/epub+zip"),
        ("book/epub/META-INF/container.xml", "<container/>\n"),
        ("book/epub/OEBPS/content.opf.erb", "<package><%= identifier %></package>\n"),
        ("book/epub/OEBPS/toc.ncx.erb", "<ncx/>\n"),
        ("book/assets/css/stylesheet.html.css", ""),
        ("book/assets/css/stylesheet.epub.css", ""),
        ("book/assets/css/stylesheet.mobi.css", ""),
        ("book/assets/css/stylesheet.pdf.css", ""),
    ];
    for (path, content) in files {
        let full = dir.path().join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, content).unwrap();
    }
    dir
}

fn bookshop(root: &Path) -> Command {
    let mut cmd = Command::cargo_bin("bookshop").unwrap();
    cmd.arg("--root").arg(root);
    cmd
}

#[test]
fn test_help() {
    let mut cmd = Command::cargo_bin("bookshop").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("build"));
}

#[test]
fn test_build_without_format_prints_usage() {
    let dir = create_project();
    bookshop(dir.path())
        .arg("build")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: bookshop build [ARGS]"))
        .stdout(predicate::str::contains("Builds a new epub at /builds/epub/book.epub"))
        .stdout(predicate::str::contains("Builds a new pdf  at /builds/pdf/book.pdf"));
    assert!(!dir.path().join("builds").exists());
}

#[test]
fn test_build_help_flags_print_usage() {
    for flag in ["-h", "--help"] {
        let dir = create_project();
        bookshop(dir.path())
            .args(["build", flag])
            .assert()
            .success()
            .stdout(predicate::str::contains("mobi"));
        assert!(!dir.path().join("builds").exists());
    }
}

#[test]
fn test_unknown_format() {
    let dir = create_project();
    bookshop(dir.path())
        .args(["build", "docx"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Error: Command not recognized"))
        .stderr(predicate::str::contains("Usage: bookshop build [ARGS]"));
    assert!(!dir.path().join("builds").exists());
}

#[test]
fn test_format_names_are_case_sensitive() {
    let dir = create_project();
    bookshop(dir.path()).args(["build", "HTML"]).assert().code(2);
}

#[test]
fn test_build_html() {
    let dir = create_project();
    bookshop(dir.path())
        .args(["build", "html"])
        .assert()
        .success()
        .stdout(predicate::str::contains("book.html"));

    let html = fs::read_to_string(dir.path().join("builds/html/book.html")).unwrap();
    assert_eq!(html, "<h1>Flatland</h1>\n<h2>Of the Nature of Flatland</h2>");
    assert!(dir.path().join("builds/html/assets/css/stylesheet.pdf.css").exists());
}

#[test]
fn test_build_epub_with_failing_validator() {
    let dir = create_project();
    bookshop(dir.path())
        .args(["build", "epub", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"format\": \"epub\""))
        .stdout(predicate::str::contains("\"stage\": \"validate\""));

    let archive = dir.path().join("builds/epub/book.epub");
    let mut zip = zip::ZipArchive::new(File::open(archive).unwrap()).unwrap();
    assert_eq!(zip.by_index(0).unwrap().name(), "mimetype");
    assert!(zip.by_name("OEBPS/assets/css/stylesheet.epub.css").is_ok());
    assert!(zip.by_name("OEBPS/assets/css/stylesheet.html.css").is_err());
}

#[test]
fn test_missing_config_fails() {
    let dir = create_project();
    fs::remove_file(dir.path().join("config/book.yml")).unwrap();
    bookshop(dir.path())
        .args(["build", "html"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to load project"));
    assert!(!dir.path().join("builds").exists());
}

#[test]
fn test_template_error_fails_build() {
    let dir = create_project();
    fs::write(dir.path().join("book/book.html.erb"), "<%= import('missing.erb') %>").unwrap();
    bookshop(dir.path())
        .args(["build", "html"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to build html"))
        .stderr(predicate::str::contains("render-book failed"));
}
