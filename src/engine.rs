//! The manifest engine: initialize, validate and reset a tree's manifest.
//!
//! Every operation runs synchronously on the calling thread. Running two
//! engines against the same root at the same time is not supported; the
//! results of doing so are unspecified.

use crate::checksum::{ChecksumError, checksum_file};
use crate::config::Config;
use crate::manifest::{CodecError, ManifestReader, ManifestWriter, Record, count_records};
use crate::path_filter::PathFilter;
use crate::progress::Progress;
use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

/// Reserved directory directly under the root that holds the manifest.
pub const MANIFEST_DIR_NAME: &str = ".treeseal";
/// Manifest file name inside [`MANIFEST_DIR_NAME`].
pub const MANIFEST_FILE_NAME: &str = "manifest";

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Source directory {0} doesn't exist")]
    SourceDirectoryMissing(PathBuf),
    #[error("Failed to create manifest directory {path}: {source}")]
    ManifestDirectoryCreate {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Directory {0} has already been initialized (use reset mode to start over)")]
    AlreadyInitialized(PathBuf),
    #[error("Directory {0} has not been initialized (use init mode first)")]
    NotInitialized(PathBuf),
    #[error("Failed to traverse {root}: {source}")]
    Traversal {
        root: PathBuf,
        source: walkdir::Error,
    },
    #[error("Failed to checksum {path}: {source}")]
    Checksum {
        path: String,
        source: ChecksumError,
    },
    #[error("Corrupt manifest {path}, line {line}: {content:?}")]
    CorruptManifest {
        path: PathBuf,
        line: u64,
        content: String,
    },
    #[error("File {0} doesn't exist")]
    MissingFile(String),
    #[error("Checksum mismatch for file {path} (expected {expected}, got {actual})")]
    ChecksumMismatch {
        path: String,
        expected: String,
        actual: String,
    },
    #[error("Path {0} cannot be stored in a manifest")]
    UnencodablePath(PathBuf),
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl EngineError {
    /// True when the tree itself failed validation, as opposed to the
    /// operation being unable to run.
    pub fn is_validation_failure(&self) -> bool {
        matches!(
            self,
            EngineError::MissingFile(_) | EngineError::ChecksumMismatch { .. }
        )
    }

    fn io(path: &Path, source: std::io::Error) -> Self {
        EngineError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct InitSummary {
    pub files_recorded: u64,
}

#[derive(Debug, PartialEq, Eq)]
pub struct ValidateSummary {
    pub files_validated: u64,
}

#[derive(Debug)]
pub struct Engine {
    root: PathBuf,
    manifest_dir: PathBuf,
    manifest_file: PathBuf,
    manifest_exists: bool,
    filter: PathFilter,
}

impl Engine {
    /// Binds an engine to `config.root`.
    ///
    /// The root must be an existing directory. The manifest directory is
    /// created if it is absent, and whether the manifest file exists is
    /// captured here.
    pub fn new(config: &Config) -> Result<Self, EngineError> {
        let root = config.root.clone();

        match fs::metadata(&root) {
            Ok(metadata) if metadata.is_dir() => {}
            Ok(_) => return Err(EngineError::SourceDirectoryMissing(root)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(EngineError::SourceDirectoryMissing(root));
            }
            Err(e) => return Err(EngineError::io(&root, e)),
        }

        let manifest_dir = root.join(MANIFEST_DIR_NAME);
        let manifest_file = manifest_dir.join(MANIFEST_FILE_NAME);

        if !manifest_dir.is_dir() {
            debug!("Creating {}", manifest_dir.display());
            fs::create_dir(&manifest_dir).map_err(|source| {
                EngineError::ManifestDirectoryCreate {
                    path: manifest_dir.clone(),
                    source,
                }
            })?;
        }

        let manifest_exists = manifest_file
            .try_exists()
            .map_err(|e| EngineError::io(&manifest_file, e))?;

        let filter = PathFilter::new(&root, &manifest_dir, &manifest_file);

        Ok(Engine {
            root,
            manifest_dir,
            manifest_file,
            manifest_exists,
            filter,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest_dir(&self) -> &Path {
        &self.manifest_dir
    }

    pub fn manifest_file(&self) -> &Path {
        &self.manifest_file
    }

    pub fn is_initialized(&self) -> bool {
        self.manifest_exists
    }

    /// Checksums every eligible file and writes the manifest.
    ///
    /// The tree is walked twice: once to count files for progress reporting,
    /// and once to checksum them. Records are streamed into a temporary file
    /// in the manifest directory which is only moved onto the manifest path
    /// once every file has been recorded. On failure no manifest is left
    /// behind.
    pub fn initialize(&mut self, on_progress: impl FnMut(u8)) -> Result<InitSummary, EngineError> {
        if self.manifest_exists {
            return Err(EngineError::AlreadyInitialized(self.root.clone()));
        }

        let total = self.count_eligible()?;
        info!("processing {} files", total);

        // A reset on this engine removes the directory.
        fs::create_dir_all(&self.manifest_dir).map_err(|source| {
            EngineError::ManifestDirectoryCreate {
                path: self.manifest_dir.clone(),
                source,
            }
        })?;

        let temp_file = tempfile::Builder::new()
            .prefix(".manifest-")
            .tempfile_in(&self.manifest_dir)
            .map_err(|e| EngineError::io(&self.manifest_dir, e))?;
        let mut writer = ManifestWriter::new(temp_file).map_err(|e| self.codec_error(e))?;
        let mut progress = Progress::new(total, on_progress);

        for entry in self.eligible_files() {
            let entry = entry?;
            let relative = self.relative_path(entry.path())?;
            let digest = checksum_file(entry.path()).map_err(|source| EngineError::Checksum {
                path: relative.clone(),
                source,
            })?;

            writer
                .write_record(&Record::new(relative, digest))
                .map_err(|e| self.codec_error(e))?;
            progress.advance();
        }

        let files_recorded = writer.records_written();
        let temp_file = writer.finish().map_err(|e| self.codec_error(e))?;
        temp_file
            .as_file()
            .sync_all()
            .map_err(|e| EngineError::io(temp_file.path(), e))?;
        temp_file
            .persist_noclobber(&self.manifest_file)
            .map_err(|e| {
                if e.error.kind() == ErrorKind::AlreadyExists {
                    EngineError::AlreadyInitialized(self.root.clone())
                } else {
                    EngineError::io(&self.manifest_file, e.error)
                }
            })?;
        self.manifest_exists = true;
        progress.finish();

        Ok(InitSummary { files_recorded })
    }

    /// Re-checksums every recorded file, in manifest order.
    ///
    /// Stops at the first missing file or checksum mismatch. Files present in
    /// the tree without a record are not reported.
    pub fn validate(&self, on_progress: impl FnMut(u8)) -> Result<ValidateSummary, EngineError> {
        let total = self.record_count()?;
        info!("validating {} files", total);

        let file =
            File::open(&self.manifest_file).map_err(|e| EngineError::io(&self.manifest_file, e))?;
        let reader = ManifestReader::new(file).map_err(|e| self.codec_error(e))?;
        let mut progress = Progress::new(total, on_progress);

        for item in reader {
            let (line, record) = item.map_err(|e| self.codec_error(e))?;
            let full_path = self.resolve(&record, line)?;

            match fs::metadata(&full_path) {
                Ok(metadata) if metadata.is_file() => {}
                Ok(_) => return Err(EngineError::MissingFile(record.path)),
                Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => {
                    return Err(EngineError::MissingFile(record.path));
                }
                Err(e) => return Err(EngineError::io(&full_path, e)),
            }

            let actual = checksum_file(&full_path).map_err(|source| EngineError::Checksum {
                path: record.path.clone(),
                source,
            })?;

            if actual != record.digest {
                return Err(EngineError::ChecksumMismatch {
                    path: record.path,
                    expected: record.digest,
                    actual,
                });
            }

            progress.advance();
        }

        Ok(ValidateSummary {
            files_validated: progress.finish(),
        })
    }

    /// Number of records in the manifest.
    pub fn record_count(&self) -> Result<u64, EngineError> {
        if !self.manifest_exists {
            return Err(EngineError::NotInitialized(self.root.clone()));
        }

        let file =
            File::open(&self.manifest_file).map_err(|e| EngineError::io(&self.manifest_file, e))?;
        count_records(file).map_err(|e| self.codec_error(e))
    }

    /// Removes the manifest directory, logging rather than returning any error.
    pub fn reset(&mut self) {
        if let Err(e) = self.try_reset() {
            warn!("{e}");
        }
    }

    /// Removes the manifest directory and everything in it.
    ///
    /// A manifest directory that is already gone is not an error.
    pub fn try_reset(&mut self) -> Result<(), EngineError> {
        match fs::remove_dir_all(&self.manifest_dir) {
            Ok(()) => debug!("Removed {}", self.manifest_dir.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(EngineError::io(&self.manifest_dir, e)),
        }
        self.manifest_exists = false;
        Ok(())
    }

    fn count_eligible(&self) -> Result<u64, EngineError> {
        self.eligible_files()
            .try_fold(0u64, |count, entry| entry.map(|_| count + 1))
    }

    /// Walks the tree in a stable order, yielding only eligible files.
    fn eligible_files(&self) -> impl Iterator<Item = Result<DirEntry, EngineError>> + '_ {
        let filter = &self.filter;
        WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| filter.should_visit(entry))
            .filter_map(move |entry| match entry {
                Ok(entry) if filter.is_eligible(&entry) => Some(Ok(entry)),
                Ok(_) => None,
                Err(source) => Some(Err(EngineError::Traversal {
                    root: self.root.clone(),
                    source,
                })),
            })
    }

    /// Path of `path` relative to the root, `/` separated.
    fn relative_path(&self, path: &Path) -> Result<String, EngineError> {
        let unencodable = || EngineError::UnencodablePath(path.to_path_buf());
        let relative = path.strip_prefix(&self.root).map_err(|_| unencodable())?;

        let mut out = String::new();
        for component in relative.components() {
            let Component::Normal(name) = component else {
                return Err(unencodable());
            };
            let name = name.to_str().ok_or_else(unencodable)?;
            if name.contains(['\n', '\r']) {
                return Err(unencodable());
            }
            if !out.is_empty() {
                out.push('/');
            }
            out.push_str(name);
        }

        if out.is_empty() {
            return Err(unencodable());
        }
        Ok(out)
    }

    /// Joins a recorded path onto the root. Records that would escape the
    /// root are treated as corruption.
    fn resolve(&self, record: &Record, line: u64) -> Result<PathBuf, EngineError> {
        let relative = Path::new(&record.path);
        let well_formed = !record.path.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));

        if !well_formed {
            return Err(EngineError::CorruptManifest {
                path: self.manifest_file.clone(),
                line,
                content: format!("{}:{}", record.path, record.digest),
            });
        }
        Ok(self.root.join(relative))
    }

    fn codec_error(&self, e: CodecError) -> EngineError {
        match e {
            CodecError::Io(source) => EngineError::io(&self.manifest_file, source),
            CodecError::CorruptLine { line, content } => EngineError::CorruptManifest {
                path: self.manifest_file.clone(),
                line,
                content,
            },
            CodecError::UnencodablePath(path) => EngineError::UnencodablePath(path.into()),
        }
    }
}

#[cfg(test)]
mod tests;
