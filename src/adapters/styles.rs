// src/adapters/styles.rs

//! Stylesheet adapter.
//!
//! Entry files are the non-partial sources of the configured dialect.
//! `@import` statements referencing partials (`_name.<ext>`) are inlined
//! recursively, comments are stripped and whitespace is minified; each entry
//! `name.<ext>` becomes `name.min.css` under the destination root. Partials
//! are consumed by inlining and never emitted standalone.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::debug;

use crate::adapters::{AdapterError, Transform};
use crate::assets::{AssetClass, StyleDialect};

const IMPORT_PATTERN: &str = r#"(?m)^[ \t]*@import\s+['"]?([^'";]+?)['"]?\s*;?\s*$"#;

pub struct StyleCompiler {
    dialect: StyleDialect,
}

impl StyleCompiler {
    pub fn new(dialect: StyleDialect) -> Self {
        Self { dialect }
    }

    /// Resolve an `@import` specifier relative to the importing file.
    ///
    /// The specifier may omit both the extension and the partial underscore
    /// prefix, so `base/fonts` tries `base/fonts.<ext>` and
    /// `base/_fonts.<ext>` (and the literal path itself).
    fn resolve_import(&self, base_dir: &Path, spec: &str) -> Option<PathBuf> {
        let ext = self.dialect.extension();
        let raw = base_dir.join(spec);

        let mut candidates = vec![raw.clone()];
        if raw.extension().is_none() {
            candidates.push(raw.with_extension(ext));
        }
        // Underscore-prefixed partial variants of every candidate so far.
        for candidate in candidates.clone() {
            if let (Some(parent), Some(name)) = (candidate.parent(), candidate.file_name()) {
                let mut underscored = std::ffi::OsString::from("_");
                underscored.push(name);
                candidates.push(parent.join(underscored));
            }
        }

        candidates.into_iter().find(|c| c.is_file())
    }

    /// Read a source file and splice in everything it imports, depth-first.
    /// Each file is included at most once per entry; a circular import is an
    /// adapter failure attributed to the file that closes the cycle.
    fn expand(
        &self,
        path: &Path,
        import_re: &Regex,
        visiting: &mut Vec<PathBuf>,
        included: &mut HashSet<PathBuf>,
    ) -> Result<String, AdapterError> {
        let id = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        if visiting.contains(&id) {
            return Err(AdapterError::new(path, "circular @import"));
        }
        if !included.insert(id.clone()) {
            return Ok(String::new());
        }
        visiting.push(id);

        let source = fs::read_to_string(path)
            .map_err(|e| AdapterError::new(path, format!("reading stylesheet: {e}")))?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));

        let mut result = String::with_capacity(source.len());
        for line in source.lines() {
            match import_re.captures(line) {
                Some(caps) => {
                    let spec = caps[1].trim().to_string();
                    let resolved = self.resolve_import(base_dir, &spec).ok_or_else(|| {
                        AdapterError::new(path, format!("cannot resolve @import {spec:?}"))
                    })?;
                    let inlined = self.expand(&resolved, import_re, visiting, included)?;
                    result.push_str(&inlined);
                }
                None => {
                    result.push_str(line);
                    result.push('\n');
                }
            }
        }

        visiting.pop();
        Ok(result)
    }
}

impl Transform for StyleCompiler {
    fn apply(&self, inputs: &[PathBuf], class: &AssetClass) -> Result<Vec<PathBuf>, AdapterError> {
        let entries: Vec<&PathBuf> = inputs.iter().filter(|p| !is_partial(p)).collect();

        let import_re = Regex::new(IMPORT_PATTERN)
            .map_err(|e| AdapterError::new(&class.src_root, format!("import pattern: {e}")))?;

        let mut outputs = Vec::with_capacity(entries.len());

        for entry in entries {
            let mut visiting = Vec::new();
            let mut included = HashSet::new();
            let expanded = self.expand(entry, &import_re, &mut visiting, &mut included)?;

            let css = minify_css(&strip_comments(&expanded));

            let stem = entry
                .file_stem()
                .ok_or_else(|| AdapterError::new(entry, "source path has no file stem"))?;
            let rel_parent = entry
                .strip_prefix(&class.src_root)
                .ok()
                .and_then(|rel| rel.parent().map(Path::to_path_buf))
                .unwrap_or_default();

            let dest_dir = class.dest_root.join(rel_parent);
            let dest = dest_dir.join(format!("{}.min.css", stem.to_string_lossy()));

            fs::create_dir_all(&dest_dir)
                .map_err(|e| AdapterError::new(entry, format!("creating {:?}: {e}", dest_dir)))?;
            fs::write(&dest, css)
                .map_err(|e| AdapterError::new(entry, format!("writing {:?}: {e}", dest)))?;

            debug!(src = ?entry, dest = ?dest, "compiled stylesheet");
            outputs.push(dest);
        }

        Ok(outputs)
    }
}

/// Partials (`_name.ext`) are import-only; they never produce standalone
/// output files.
fn is_partial(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().starts_with('_'))
        .unwrap_or(false)
}

/// Remove `/* ... */` and `// ...` comments, leaving string literals intact.
/// `//` directly after `:` is kept so protocol-relative URLs survive.
fn strip_comments(src: &str) -> String {
    let mut out = String::with_capacity(src.len());
    let mut chars = src.chars().peekable();
    let mut prev = '\0';

    while let Some(ch) = chars.next() {
        match ch {
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut last = '\0';
                for c in chars.by_ref() {
                    if last == '*' && c == '/' {
                        break;
                    }
                    last = c;
                }
            }
            '/' if chars.peek() == Some(&'/') && prev != ':' => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '"' | '\'' => {
                out.push(ch);
                for c in chars.by_ref() {
                    out.push(c);
                    if c == ch {
                        break;
                    }
                }
            }
            _ => out.push(ch),
        }
        prev = ch;
    }

    out
}

/// Collapse whitespace runs; spaces next to `{` `}` `;` `:` `,` disappear.
fn minify_css(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut pending_space = false;

    for ch in css.chars() {
        if ch.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space {
            let prev = out.chars().next_back();
            let glue_prev = matches!(prev, Some('{' | '}' | ';' | ':' | ','));
            let glue_next = matches!(ch, '{' | '}' | ';' | ':' | ',');
            if prev.is_some() && !glue_prev && !glue_next {
                out.push(' ');
            }
            pending_space = false;
        }
        out.push(ch);
    }

    out
}
