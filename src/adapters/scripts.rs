// src/adapters/scripts.rs

//! Script adapter.
//!
//! Bundles the module graph reachable from the configured entry file into a
//! single `bundle.js` under the destination root. Relative `import`
//! statements are inlined depth-first, each module at most once; an import
//! that cannot be resolved is an adapter failure attributed to the importing
//! file, and the previous bundle is left untouched.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::debug;

use crate::adapters::{AdapterError, Transform};
use crate::assets::AssetClass;

const BUNDLE_NAME: &str = "bundle.js";

const IMPORT_PATTERN: &str =
    r#"(?m)^\s*import\s+(?:[\w$*{},\s]+\s+from\s+)?['"]([^'"]+)['"]\s*;?\s*$"#;

pub struct ScriptBundler {
    entry: String,
    minify: bool,
}

impl ScriptBundler {
    pub fn new(entry: String, minify: bool) -> Self {
        Self { entry, minify }
    }

    /// Resolve an import specifier relative to the importing file. Only
    /// relative specifiers are supported; `name`, `name.js` and
    /// `name/index.js` are tried in that order.
    fn resolve_import(base_dir: &Path, spec: &str) -> Option<PathBuf> {
        if !spec.starts_with("./") && !spec.starts_with("../") {
            return None;
        }
        let raw = base_dir.join(spec);
        [
            raw.clone(),
            raw.with_extension("js"),
            raw.join("index.js"),
        ]
        .into_iter()
        .find(|c| c.is_file())
    }

    fn inline(
        &self,
        path: &Path,
        import_re: &Regex,
        visited: &mut HashSet<PathBuf>,
        out: &mut String,
    ) -> Result<(), AdapterError> {
        let id = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if !visited.insert(id) {
            return Ok(());
        }

        let source = fs::read_to_string(path)
            .map_err(|e| AdapterError::new(path, format!("reading script: {e}")))?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));

        for line in source.lines() {
            match import_re.captures(line) {
                Some(caps) => {
                    let spec = caps[1].to_string();
                    let resolved =
                        Self::resolve_import(base_dir, &spec).ok_or_else(|| {
                            AdapterError::new(path, format!("cannot resolve import {spec:?}"))
                        })?;
                    self.inline(&resolved, import_re, visited, out)?;
                }
                None => {
                    out.push_str(line);
                    out.push('\n');
                }
            }
        }

        Ok(())
    }
}

impl Transform for ScriptBundler {
    fn apply(&self, _inputs: &[PathBuf], class: &AssetClass) -> Result<Vec<PathBuf>, AdapterError> {
        let entry = class.src_root.join(&self.entry);
        if !entry.is_file() {
            return Err(AdapterError::new(&entry, "bundle entry not found"));
        }

        let import_re = Regex::new(IMPORT_PATTERN)
            .map_err(|e| AdapterError::new(&entry, format!("import pattern: {e}")))?;

        // Build the whole bundle in memory first: a failed module graph must
        // not clobber the previous bundle on disk.
        let mut bundle = String::new();
        let mut visited = HashSet::new();
        self.inline(&entry, &import_re, &mut visited, &mut bundle)?;

        if self.minify {
            bundle = strip_js(&bundle);
        }

        let dest = class.dest_root.join(BUNDLE_NAME);
        fs::create_dir_all(&class.dest_root)
            .map_err(|e| AdapterError::new(&entry, format!("creating {:?}: {e}", class.dest_root)))?;
        fs::write(&dest, bundle)
            .map_err(|e| AdapterError::new(&entry, format!("writing {:?}: {e}", dest)))?;

        debug!(entry = ?entry, dest = ?dest, modules = visited.len(), "bundled scripts");
        Ok(vec![dest])
    }
}

/// Production trim: drop comments and blank lines. The code itself is left
/// as written.
fn strip_js(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut in_block = false;

    for line in source.lines() {
        let mut kept = String::with_capacity(line.len());
        let mut chars = line.chars().peekable();
        let mut prev = '\0';

        while let Some(ch) = chars.next() {
            if in_block {
                if prev == '*' && ch == '/' {
                    in_block = false;
                    prev = '\0';
                    continue;
                }
                prev = ch;
                continue;
            }
            match ch {
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    in_block = true;
                    prev = '\0';
                }
                '/' if chars.peek() == Some(&'/') && prev != ':' => break,
                '"' | '\'' | '`' => {
                    kept.push(ch);
                    for c in chars.by_ref() {
                        kept.push(c);
                        if c == ch {
                            break;
                        }
                    }
                    prev = ch;
                }
                _ => {
                    kept.push(ch);
                    prev = ch;
                }
            }
        }

        if !kept.trim().is_empty() {
            out.push_str(kept.trim_end());
            out.push('\n');
        }
    }

    out
}
