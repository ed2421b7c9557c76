use std::error::Error;
use std::fs;
use std::path::Path;
use std::thread::sleep;
use std::time::Duration;

use tempfile::tempdir;

use assetpipe::sync::{Comparison, dest_counterpart, is_stale};

type TestResult = Result<(), Box<dyn Error>>;

fn touch(path: &Path, contents: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)
}

#[test]
fn counterpart_is_the_same_relative_path() {
    let mapped = dest_counterpart(
        Path::new("src/fonts/sub/Roboto.woff"),
        Path::new("src/fonts"),
        Path::new("dist/fonts"),
    );
    assert_eq!(
        mapped.as_deref(),
        Some(Path::new("dist/fonts/sub/Roboto.woff"))
    );

    // A file outside the source root has no counterpart.
    assert!(dest_counterpart(Path::new("elsewhere/a"), Path::new("src"), Path::new("dist")).is_none());
}

#[test]
fn missing_destination_is_stale() -> TestResult {
    let dir = tempdir()?;
    let src_root = dir.path().join("src");
    let dest_root = dir.path().join("dest");
    let src = src_root.join("a.woff");
    touch(&src, "font")?;

    assert!(is_stale(&src, &src_root, &dest_root, Comparison::ModifiedTime));
    assert!(is_stale(&src, &src_root, &dest_root, Comparison::ContentHash));

    Ok(())
}

#[test]
fn newer_destination_is_fresh_by_mtime() -> TestResult {
    let dir = tempdir()?;
    let src_root = dir.path().join("src");
    let dest_root = dir.path().join("dest");
    let src = src_root.join("a.woff");

    touch(&src, "font")?;
    sleep(Duration::from_millis(30));
    touch(&dest_root.join("a.woff"), "font")?;

    assert!(!is_stale(&src, &src_root, &dest_root, Comparison::ModifiedTime));

    Ok(())
}

#[test]
fn rewritten_source_is_stale_by_mtime() -> TestResult {
    let dir = tempdir()?;
    let src_root = dir.path().join("src");
    let dest_root = dir.path().join("dest");
    let src = src_root.join("a.woff");

    touch(&dest_root.join("a.woff"), "font")?;
    sleep(Duration::from_millis(30));
    touch(&src, "font v2")?;

    assert!(is_stale(&src, &src_root, &dest_root, Comparison::ModifiedTime));

    Ok(())
}

#[test]
fn hash_mode_ignores_timestamps_and_tracks_content() -> TestResult {
    let dir = tempdir()?;
    let src_root = dir.path().join("src");
    let dest_root = dir.path().join("dest");
    let src = src_root.join("a.woff");

    // Destination older than source, but identical bytes: fresh.
    touch(&dest_root.join("a.woff"), "font")?;
    sleep(Duration::from_millis(30));
    touch(&src, "font")?;
    assert!(!is_stale(&src, &src_root, &dest_root, Comparison::ContentHash));

    // Different bytes: stale.
    touch(&src, "font v2")?;
    assert!(is_stale(&src, &src_root, &dest_root, Comparison::ContentHash));

    Ok(())
}
