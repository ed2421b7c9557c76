// src/config/validate.rs

use std::str::FromStr;

use anyhow::Result;

use crate::assets::StyleDialect;
use crate::config::model::{ConfigFile, StaticSection};
use crate::errors::PipelineError;
use crate::sync::changed::Comparison;

/// Run semantic validation against a loaded configuration.
///
/// This checks:
/// - the source and destination roots are distinct and non-empty
/// - the styles dialect is one of the two supported syntaxes
/// - the `compare` mode of each static class parses
/// - the server port leaves room for the control channel on port+1
/// - the scripts entry is a bare file name
///
/// Unrecoverable configuration errors crash the process by design: no task
/// can produce correct output against a broken class table.
pub fn validate_config(cfg: &ConfigFile) -> Result<()> {
    validate_roots(cfg)?;
    validate_styles(cfg)?;
    validate_scripts(cfg)?;
    validate_statics(cfg)?;
    validate_server(cfg)?;
    Ok(())
}

fn validate_roots(cfg: &ConfigFile) -> Result<()> {
    if cfg.project.source.trim().is_empty() {
        return Err(PipelineError::Config(
            "[project].source must not be empty".to_string(),
        )
        .into());
    }
    if cfg.project.dest.trim().is_empty() {
        return Err(PipelineError::Config(
            "[project].dest must not be empty".to_string(),
        )
        .into());
    }
    if cfg.project.source == cfg.project.dest {
        return Err(PipelineError::Config(format!(
            "[project].source and [project].dest must differ (both are {:?})",
            cfg.project.source
        ))
        .into());
    }
    Ok(())
}

fn validate_styles(cfg: &ConfigFile) -> Result<()> {
    StyleDialect::from_str(&cfg.styles.dialect)
        .map_err(|e| PipelineError::Config(format!("[styles].dialect: {e}")))?;
    Ok(())
}

fn validate_scripts(cfg: &ConfigFile) -> Result<()> {
    let entry = cfg.scripts.entry.trim();
    if entry.is_empty() {
        return Err(PipelineError::Config(
            "[scripts].entry must not be empty".to_string(),
        )
        .into());
    }
    if entry.contains('/') || entry.contains('\\') {
        return Err(PipelineError::Config(format!(
            "[scripts].entry must be a bare file name in the scripts root (got {entry:?})"
        ))
        .into());
    }
    Ok(())
}

fn validate_statics(cfg: &ConfigFile) -> Result<()> {
    for (section, table) in [
        (&cfg.fonts, "fonts"),
        (&cfg.icons, "icons"),
        (&cfg.images, "images"),
    ] {
        validate_comparison(section, table)?;
    }
    Ok(())
}

fn validate_comparison(section: &StaticSection, table: &str) -> Result<()> {
    Comparison::from_str(&section.compare)
        .map_err(|e| PipelineError::Config(format!("[{table}].compare: {e}")))?;
    Ok(())
}

fn validate_server(cfg: &ConfigFile) -> Result<()> {
    if cfg.server.port == 0 {
        return Err(PipelineError::Config(
            "[server].port must be >= 1".to_string(),
        )
        .into());
    }
    // The reload control channel binds port+1.
    if cfg.server.port == u16::MAX {
        return Err(PipelineError::Config(format!(
            "[server].port must be < {} so the reload channel can bind port+1",
            u16::MAX
        ))
        .into());
    }
    Ok(())
}
