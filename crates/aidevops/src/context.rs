//! Gather repository context from local folders.
//!
//! Every file under the configured folders whose extension is on the allow list is read in
//! full and appended to a single text blob, each file preceded by a `File: <path>` header.
//! Hidden files and directories are skipped. Folders that are missing or are not directories
//! contribute nothing.
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

pub const DEFAULT_EXTENSIONS: &[&str] = &["yaml", "yml", "ts", "js", "json", "md", "go"];

/// What to do when a file or directory cannot be read during gathering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadPolicy {
    /// Fail the whole gather
    #[default]
    Abort,
    /// Log the entry and carry on without it
    Skip,
}

#[derive(Debug, Error)]
pub enum ContextError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to walk {}: {source}", folder.display())]
    Walk {
        folder: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GatheredContext {
    pub text: String,
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ContextGatherer {
    folders: Vec<PathBuf>,
    extensions: Vec<String>,
    read_policy: ReadPolicy,
    max_bytes: Option<usize>,
}

impl ContextGatherer {
    pub fn new<I, P>(folders: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            folders: folders.into_iter().map(Into::into).collect(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            read_policy: ReadPolicy::default(),
            max_bytes: None,
        }
    }

    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_read_policy(mut self, read_policy: ReadPolicy) -> Self {
        self.read_policy = read_policy;
        self
    }

    /// Stop adding files once the gathered text would exceed `max_bytes`
    pub fn with_max_bytes(mut self, max_bytes: Option<usize>) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    pub fn folders(&self) -> &[PathBuf] {
        &self.folders
    }

    /// Walk every folder in order and collect the matching files.
    ///
    /// Traversal order within a folder is whatever the directory walk yields.
    pub fn gather(&self) -> Result<GatheredContext, ContextError> {
        let mut gathered = GatheredContext::default();

        for folder in &self.folders {
            if !folder.is_dir() {
                tracing::debug!("Context folder {} is not a directory", folder.display());
                continue;
            }

            let walker = WalkDir::new(folder)
                .follow_links(false)
                .into_iter()
                .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));

            for entry in walker {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(source) => {
                        self.on_error(ContextError::Walk {
                            folder: folder.clone(),
                            source,
                        })?;
                        continue;
                    }
                };

                let path = entry.path();
                if !path.is_file() || !self.matches_extension(path) {
                    continue;
                }

                let contents = match fs::read_to_string(path) {
                    Ok(contents) => contents,
                    Err(source) => {
                        self.on_error(ContextError::Read {
                            path: path.to_path_buf(),
                            source,
                        })?;
                        continue;
                    }
                };

                let section = format!("\n\nFile: {}\n{}", path.display(), contents);
                if let Some(max_bytes) = self.max_bytes {
                    if gathered.text.len() + section.len() > max_bytes {
                        tracing::warn!(
                            "Context limit of {} bytes reached at {}, remaining files are left out",
                            max_bytes,
                            path.display()
                        );
                        return Ok(gathered);
                    }
                }

                gathered.text.push_str(&section);
                gathered.files.push(path.to_path_buf());
            }
        }

        tracing::debug!("Gathered {} context files", gathered.files.len());
        Ok(gathered)
    }

    fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|allowed| allowed == ext))
    }

    fn on_error(&self, error: ContextError) -> Result<(), ContextError> {
        match self.read_policy {
            ReadPolicy::Abort => Err(error),
            ReadPolicy::Skip => {
                tracing::warn!("Skipping context entry: {}", error);
                Ok(())
            }
        }
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().as_encoded_bytes().first() == Some(&b'.')
}
