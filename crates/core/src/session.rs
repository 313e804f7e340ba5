//! Staged whole-file edits
//!
//! A [`ModSession`] reads each target file once, applies every edit in memory
//! and writes nothing until [`ModSession::commit`]. A pass that fails halfway
//! therefore leaves the native project exactly as it found it.

use crate::error::{Error, Result};
use crate::generated_code::{merge_contents, MergeResults, MergeSpec};
use serde::Serialize;
use similar::TextDiff;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
struct StagedFile {
    /// Content on disk when first read; `None` for files created by the pass
    original: Option<String>,
    contents: String,
}

impl StagedFile {
    fn is_changed(&self) -> bool {
        self.original.as_deref() != Some(self.contents.as_str())
    }
}

/// A pending or written change to one file
#[derive(Debug, Clone, Serialize)]
pub struct FileChange {
    /// Path relative to the session root
    pub path: PathBuf,
    /// The file did not exist before the pass
    pub created: bool,
    /// Unified diff from the original content
    pub diff: String,
}

/// A tagged merge aimed at one file
#[derive(Debug, Clone)]
pub struct PlannedMerge {
    /// Path relative to the session root
    pub path: PathBuf,
    pub spec: MergeSpec,
}

impl PlannedMerge {
    pub fn new(path: impl Into<PathBuf>, spec: MergeSpec) -> Self {
        Self {
            path: path.into(),
            spec,
        }
    }
}

/// In-memory staging area for one configuration pass
#[derive(Debug)]
pub struct ModSession {
    root: PathBuf,
    files: BTreeMap<PathBuf, StagedFile>,
}

fn read_staged(path: &Path, create_with: Option<&str>) -> Result<StagedFile> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(StagedFile {
            original: Some(contents.clone()),
            contents,
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => match create_with {
            Some(default) => Ok(StagedFile {
                original: None,
                contents: default.to_string(),
            }),
            None => Err(Error::file_not_found(path)),
        },
        Err(e) => Err(Error::from(e).with_context(format!("while reading {}", path.display()))),
    }
}

impl ModSession {
    /// Create a session rooted at the project directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            files: BTreeMap::new(),
        }
    }

    /// Whether a file exists on disk or has been staged
    pub fn exists(&self, rel: impl AsRef<Path>) -> bool {
        let rel = rel.as_ref();
        self.files.contains_key(rel) || self.root.join(rel).is_file()
    }

    fn load(&mut self, rel: &Path, create_with: Option<&str>) -> Result<&mut StagedFile> {
        match self.files.entry(rel.to_path_buf()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let staged = read_staged(&self.root.join(rel), create_with)?;
                Ok(entry.insert(staged))
            }
        }
    }

    /// Current (staged) content of a file
    pub fn read(&mut self, rel: impl AsRef<Path>) -> Result<&str> {
        Ok(self.load(rel.as_ref(), None)?.contents.as_str())
    }

    /// Rewrite a file through `edit`; returns whether the content changed
    pub fn update<F>(&mut self, rel: impl AsRef<Path>, edit: F) -> Result<bool>
    where
        F: FnOnce(&str) -> Result<String>,
    {
        self.update_inner(rel.as_ref(), None, edit)
    }

    /// Like [`update`](Self::update), starting from `default` when the file is missing
    pub fn update_or_create<F>(&mut self, rel: impl AsRef<Path>, default: &str, edit: F) -> Result<bool>
    where
        F: FnOnce(&str) -> Result<String>,
    {
        self.update_inner(rel.as_ref(), Some(default), edit)
    }

    fn update_inner<F>(&mut self, rel: &Path, create_with: Option<&str>, edit: F) -> Result<bool>
    where
        F: FnOnce(&str) -> Result<String>,
    {
        let file = self.load(rel, create_with)?;
        let updated = edit(&file.contents)
            .map_err(|e| e.with_context(format!("while modifying {}", rel.display())))?;
        let changed = updated != file.contents;
        file.contents = updated;
        Ok(changed)
    }

    /// Apply a tagged merge to a file
    pub fn merge(&mut self, rel: impl AsRef<Path>, spec: &MergeSpec) -> Result<MergeResults> {
        let rel = rel.as_ref();
        let file = self.load(rel, None)?;
        let results = merge_contents(&file.contents, spec)
            .map_err(|e| e.with_context(format!("while modifying {}", rel.display())))?;
        file.contents.clone_from(&results.contents);
        Ok(results)
    }

    /// Apply a planned merge
    pub fn apply(&mut self, planned: &PlannedMerge) -> Result<MergeResults> {
        self.merge(&planned.path, &planned.spec)
    }

    /// Files whose staged content differs from disk
    pub fn changes(&self) -> Vec<FileChange> {
        self.files
            .iter()
            .filter(|(_, file)| file.is_changed())
            .map(|(path, file)| {
                let original = file.original.as_deref().unwrap_or("");
                let old_name = format!("a/{}", path.display());
                let new_name = format!("b/{}", path.display());
                let diff = TextDiff::from_lines(original, file.contents.as_str())
                    .unified_diff()
                    .context_radius(3)
                    .header(&old_name, &new_name)
                    .to_string();

                FileChange {
                    path: path.clone(),
                    created: file.original.is_none(),
                    diff,
                }
            })
            .collect()
    }

    /// Write every changed file to disk
    pub fn commit(self) -> Result<Vec<FileChange>> {
        let changes = self.changes();

        for change in &changes {
            let path = self.root.join(&change.path);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let contents = &self.files[&change.path].contents;
            fs::write(&path, contents)
                .map_err(|e| Error::from(e).with_context(format!("while writing {}", path.display())))?;

            tracing::info!(path = %change.path.display(), created = change.created, "wrote file");
        }

        Ok(changes)
    }
}
