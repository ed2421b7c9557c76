// src/errors.rs

//! Crate-wide error taxonomy.
//!
//! Adapter and enumeration failures stay local to one task; bind and
//! configuration errors are fatal to the whole process.

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

use crate::adapters::AdapterError;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Adapter(#[from] AdapterError),

    #[error("enumerating sources under {root:?}")]
    Enumeration {
        root: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("binding {addr}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

pub use anyhow::Error;
pub type Result<T> = anyhow::Result<T>;
