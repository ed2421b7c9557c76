use std::error::Error;
use std::path::Path;

use assetpipe::assets::{AssetKind, ChangeKind, classes_from_config};
use assetpipe::config::ConfigFile;
use assetpipe::watch::{ClassWatchProfile, build_profiles};

type TestResult = Result<(), Box<dyn Error>>;

fn default_profiles() -> Result<Vec<ClassWatchProfile>, Box<dyn Error>> {
    let classes = classes_from_config(&ConfigFile::default());
    Ok(build_profiles(&classes)?)
}

fn profile(profiles: &[ClassWatchProfile], kind: AssetKind) -> &ClassWatchProfile {
    profiles
        .iter()
        .find(|p| p.kind() == kind)
        .unwrap_or_else(|| panic!("no profile for {kind}"))
}

#[test]
fn markup_watches_top_level_pages_on_content_changes_only() -> TestResult {
    let profiles = default_profiles()?;
    let markup = profile(&profiles, AssetKind::Markup);

    assert!(markup.matches(Path::new("src/index.html"), ChangeKind::Modified));
    // Nested markup is outside the class glob.
    assert!(!markup.matches(Path::new("src/pages/about.html"), ChangeKind::Modified));
    // Creations and deletions don't re-trigger markup.
    assert!(!markup.matches(Path::new("src/index.html"), ChangeKind::Created));
    assert!(!markup.matches(Path::new("src/index.html"), ChangeKind::Removed));

    Ok(())
}

#[test]
fn styles_watch_the_whole_dialect_subtree_for_any_change() -> TestResult {
    let profiles = default_profiles()?;
    let styles = profile(&profiles, AssetKind::Styles);

    assert!(styles.matches(Path::new("src/scss/style.scss"), ChangeKind::Modified));
    assert!(styles.matches(
        Path::new("src/scss/base/_variables.scss"),
        ChangeKind::Removed
    ));
    assert!(styles.matches(Path::new("src/scss/blocks/nav.scss"), ChangeKind::Created));
    // Other extensions under the same tree don't match.
    assert!(!styles.matches(Path::new("src/scss/readme.txt"), ChangeKind::Modified));

    Ok(())
}

#[test]
fn scripts_react_to_content_changes_in_nested_modules() -> TestResult {
    let profiles = default_profiles()?;
    let scripts = profile(&profiles, AssetKind::Scripts);

    assert!(scripts.matches(Path::new("src/js/main.js"), ChangeKind::Modified));
    assert!(scripts.matches(
        Path::new("src/js/modules/slider.js"),
        ChangeKind::Modified
    ));
    assert!(!scripts.matches(Path::new("src/js/main.js"), ChangeKind::Created));

    Ok(())
}

#[test]
fn static_classes_react_to_appearing_and_disappearing_files() -> TestResult {
    let profiles = default_profiles()?;
    let fonts = profile(&profiles, AssetKind::Fonts);
    let images = profile(&profiles, AssetKind::Images);

    assert!(fonts.matches(Path::new("src/fonts/Roboto.woff"), ChangeKind::Created));
    assert!(fonts.matches(
        Path::new("src/fonts/roboto/Bold.woff"),
        ChangeKind::Removed
    ));
    assert!(images.matches(Path::new("src/img/photo.png"), ChangeKind::Renamed));

    Ok(())
}

#[test]
fn paths_outside_a_class_subtree_never_match() -> TestResult {
    let profiles = default_profiles()?;

    for p in &profiles {
        assert!(!p.matches(Path::new("elsewhere/file.scss"), ChangeKind::Modified));
        assert!(!p.matches(Path::new("dist/css/style.min.css"), ChangeKind::Modified));
    }

    Ok(())
}
