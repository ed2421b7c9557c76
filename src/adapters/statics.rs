// src/adapters/statics.rs

use std::fs;
use std::path::PathBuf;

use tracing::debug;

use crate::adapters::{AdapterError, Transform};
use crate::assets::AssetClass;

/// Copy adapter for fonts, icons and images: every input is copied to the
/// same path relative to the destination root. Compression of the copied
/// bytes is a concern for a future adapter behind the same seam.
pub struct StaticCopy;

impl Transform for StaticCopy {
    fn apply(&self, inputs: &[PathBuf], class: &AssetClass) -> Result<Vec<PathBuf>, AdapterError> {
        let mut outputs = Vec::with_capacity(inputs.len());

        for input in inputs {
            let rel = input.strip_prefix(&class.src_root).map_err(|_| {
                AdapterError::new(input, format!("not under source root {:?}", class.src_root))
            })?;
            let dest = class.dest_root.join(rel);

            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)
                    .map_err(|e| AdapterError::new(input, format!("creating {:?}: {e}", parent)))?;
            }
            fs::copy(input, &dest)
                .map_err(|e| AdapterError::new(input, format!("copying to {:?}: {e}", dest)))?;

            debug!(src = ?input, dest = ?dest, "copied asset");
            outputs.push(dest);
        }

        Ok(outputs)
    }
}
