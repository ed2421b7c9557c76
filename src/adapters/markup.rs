// src/adapters/markup.rs

use std::fs;
use std::path::PathBuf;

use tracing::debug;

use crate::adapters::{AdapterError, Transform};
use crate::assets::AssetClass;

/// Markup adapter: collapses whitespace and writes each page under the
/// destination root with its original name.
pub struct MarkupMinifier;

impl Transform for MarkupMinifier {
    fn apply(&self, inputs: &[PathBuf], class: &AssetClass) -> Result<Vec<PathBuf>, AdapterError> {
        let mut outputs = Vec::with_capacity(inputs.len());

        for input in inputs {
            let html = fs::read_to_string(input)
                .map_err(|e| AdapterError::new(input, format!("reading markup: {e}")))?;

            let minified = collapse_whitespace(&html);

            let file_name = input
                .file_name()
                .ok_or_else(|| AdapterError::new(input, "source path has no file name"))?;
            let dest = class.dest_root.join(file_name);

            fs::create_dir_all(&class.dest_root)
                .map_err(|e| AdapterError::new(input, format!("creating {:?}: {e}", class.dest_root)))?;
            fs::write(&dest, minified)
                .map_err(|e| AdapterError::new(input, format!("writing {:?}: {e}", dest)))?;

            debug!(src = ?input, dest = ?dest, "minified markup");
            outputs.push(dest);
        }

        Ok(outputs)
    }
}

/// Collapse runs of whitespace into a single space; whitespace between a
/// closing `>` and an opening `<` disappears entirely.
fn collapse_whitespace(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut pending_space = false;

    for ch in html.chars() {
        if ch.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space {
            if !out.is_empty() && !(out.ends_with('>') && ch == '<') {
                out.push(' ');
            }
            pending_space = false;
        }
        out.push(ch);
    }

    out
}
