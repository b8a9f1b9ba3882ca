//! Which invocations belong to the document under analysis

use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Decides whether a top-level invocation is reported, by the file it appeared in
///
/// Invocations the engine could not anchor to any file are never reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnchorFilter {
    /// Only invocations in one of these files (compared as paths, exactly)
    Files(HashSet<PathBuf>),
    /// Any invocation anchored in some file
    AnyFile,
}

impl AnchorFilter {
    pub fn files(files: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        AnchorFilter::Files(files.into_iter().map(Into::into).collect())
    }

    pub fn accepts(&self, file: Option<&Path>) -> bool {
        match (self, file) {
            (_, None) => false,
            (AnchorFilter::AnyFile, Some(_)) => true,
            (AnchorFilter::Files(files), Some(file)) => files.contains(file),
        }
    }
}
