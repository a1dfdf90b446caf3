//! Scene and mesh file loading.
//!
//! Both formats are line oriented. A scene file tolerates bad lines (they
//! are skipped and reported as [`Diagnostic`]s); a mesh data file is all or
//! nothing.

mod mesh_file;
mod scene_file;

pub use mesh_file::{load_mesh, parse_mesh};
pub use scene_file::{load_scene, load_scene_from_str};

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::Scene;

/// A malformed line, with its 1-based line number.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("line {line}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// Errors that stop a load.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid mesh data in {}: {source}", .path.display())]
    MeshFormat { path: PathBuf, source: ParseError },
}

/// Result type for loading operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// A scene line that was skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub line: usize,
    /// The offending line, trimmed
    pub text: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {} (\"{}\"), ignoring", self.line, self.message, self.text)
    }
}

/// A loaded scene plus whatever had to be skipped on the way.
pub struct LoadedScene {
    pub scene: Scene,
    pub diagnostics: Vec<Diagnostic>,
}
