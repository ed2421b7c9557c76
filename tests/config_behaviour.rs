use std::error::Error;
use std::fs;
use std::path::Path;

use tempfile::tempdir;

use assetpipe::assets::{AssetKind, StyleDialect, classes_from_config};
use assetpipe::config::{load_and_validate, validate_config};
use assetpipe::sync::Comparison;

type TestResult = Result<(), Box<dyn Error>>;

fn load_str(dir: &Path, contents: &str) -> anyhow::Result<assetpipe::config::ConfigFile> {
    let path = dir.join("Assetpipe.toml");
    fs::write(&path, contents).map_err(anyhow::Error::from)?;
    load_and_validate(&path)
}

#[test]
fn missing_config_file_falls_back_to_defaults() -> TestResult {
    let dir = tempdir()?;
    let cfg = load_and_validate(dir.path().join("Assetpipe.toml"))?;

    assert_eq!(cfg.project.source, "src");
    assert_eq!(cfg.project.dest, "dist");
    assert_eq!(cfg.server.port, 3000);
    assert_eq!(cfg.styles.effective_dialect(), StyleDialect::Scss);
    assert_eq!(cfg.scripts.entry, "main.js");
    assert!(!cfg.scripts.minify);
    assert_eq!(cfg.fonts.effective_comparison(), Comparison::ModifiedTime);

    Ok(())
}

#[test]
fn sections_override_defaults() -> TestResult {
    let dir = tempdir()?;
    let cfg = load_str(
        dir.path(),
        r#"
[project]
source = "web/src"
dest = "web/out"

[server]
port = 4000

[styles]
dialect = "sass"

[scripts]
entry = "app.js"
minify = true

[images]
compare = "hash"
"#,
    )?;

    assert_eq!(cfg.server.port, 4000);
    assert_eq!(cfg.styles.effective_dialect(), StyleDialect::Sass);
    assert!(cfg.scripts.minify);
    assert_eq!(cfg.images.effective_comparison(), Comparison::ContentHash);
    // Untouched sections keep their defaults.
    assert_eq!(cfg.fonts.effective_comparison(), Comparison::ModifiedTime);

    Ok(())
}

#[test]
fn dialect_selects_the_styles_source_tree_and_glob() -> TestResult {
    let dir = tempdir()?;
    let cfg = load_str(dir.path(), "[styles]\ndialect = \"sass\"\n")?;

    let classes = classes_from_config(&cfg);
    let styles = classes
        .iter()
        .find(|c| c.kind == AssetKind::Styles)
        .expect("styles class");

    assert!(styles.src_root.ends_with("sass"));
    assert_eq!(styles.glob, "**/*.sass");

    Ok(())
}

#[test]
fn invalid_values_are_rejected() -> TestResult {
    let dir = tempdir()?;

    assert!(load_str(dir.path(), "[styles]\ndialect = \"less\"\n").is_err());
    assert!(load_str(dir.path(), "[fonts]\ncompare = \"size\"\n").is_err());
    assert!(load_str(dir.path(), "[server]\nport = 0\n").is_err());
    assert!(load_str(dir.path(), "[server]\nport = 65535\n").is_err());
    assert!(load_str(dir.path(), "[scripts]\nentry = \"\"\n").is_err());
    assert!(load_str(dir.path(), "[scripts]\nentry = \"nested/main.js\"\n").is_err());
    assert!(
        load_str(
            dir.path(),
            "[project]\nsource = \"tree\"\ndest = \"tree\"\n"
        )
        .is_err()
    );

    Ok(())
}

#[test]
fn default_config_passes_validation() -> TestResult {
    validate_config(&assetpipe::config::ConfigFile::default())?;
    Ok(())
}
