//! Class bytes repository
//!
//! Maps Kotlin source names to raw class-file bytes across an ordered list of
//! class-path roots (JAR files and class directories). Lookups are cached;
//! archive handles stay open for the repository's lifetime and are released
//! exactly once on close.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::warn;
use zip::ZipArchive;

use crate::error::ApiError;

/// Lazily-reading, caching repository over class-path roots
pub struct ClassBytesRepository {
    roots: Vec<ClassPathRoot>,
    cache: HashMap<String, Option<Vec<u8>>>,
    closed: bool,
}

enum ClassPathRoot {
    Archive {
        path: PathBuf,
        archive: ZipArchive<File>,
        /// Class entry names in central-directory order
        entries: Vec<String>,
    },
    Directory {
        path: PathBuf,
    },
}

impl ClassBytesRepository {
    /// Open every root of the given class path.
    ///
    /// Paths that are neither a readable archive nor a directory are fatal:
    /// the class path is an explicit input and a broken entry is a caller
    /// mistake, not a per-class parse failure.
    pub fn open<P: AsRef<Path>>(class_path: &[P]) -> Result<Self, ApiError> {
        let mut roots = Vec::with_capacity(class_path.len());
        for path in class_path {
            let path = path.as_ref();
            if path.is_dir() {
                roots.push(ClassPathRoot::Directory {
                    path: path.to_path_buf(),
                });
            } else {
                let file = File::open(path)?;
                let mut archive = ZipArchive::new(file).map_err(|source| ApiError::Archive {
                    path: path.to_path_buf(),
                    source,
                })?;
                let entries = class_entries_of(path, &mut archive);
                roots.push(ClassPathRoot::Archive {
                    path: path.to_path_buf(),
                    archive,
                    entries,
                });
            }
        }
        Ok(Self {
            roots,
            cache: HashMap::new(),
            closed: false,
        })
    }

    /// Raw class bytes for a Kotlin source name, first root wins, memoized
    pub fn class_bytes_for(&mut self, source_name: &str) -> Result<Option<Vec<u8>>, ApiError> {
        self.ensure_open()?;
        if let Some(cached) = self.cache.get(source_name) {
            return Ok(cached.clone());
        }
        let mut found = None;
        'candidates: for candidate in class_file_path_candidates_for(source_name) {
            for root in &mut self.roots {
                if let Some(bytes) = root.bytes_for(&candidate) {
                    found = Some(bytes);
                    break 'candidates;
                }
            }
        }
        self.cache.insert(source_name.to_string(), found.clone());
        Ok(found)
    }

    /// Every discoverable class as a source name, in root order; JAR entries
    /// keep central-directory order, directory walks are sorted. The first
    /// root declaring a name wins.
    pub fn all_class_source_names(&mut self) -> Result<Vec<String>, ApiError> {
        self.ensure_open()?;
        let mut seen = HashMap::new();
        let mut names = Vec::new();
        for root in &self.roots {
            for entry in root.class_file_paths() {
                let source_name = source_name_of_class_file_path(&entry);
                if seen.insert(source_name.clone(), ()).is_none() {
                    names.push(source_name);
                }
            }
        }
        Ok(names)
    }

    /// Release all archive handles. Idempotent; every later operation fails
    /// with [`ApiError::RepositoryClosed`].
    pub fn close(&mut self) {
        self.roots.clear();
        self.cache.clear();
        self.closed = true;
    }

    /// Whether the repository has been closed
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn ensure_open(&self) -> Result<(), ApiError> {
        if self.closed {
            Err(ApiError::RepositoryClosed)
        } else {
            Ok(())
        }
    }
}

impl ClassPathRoot {
    fn bytes_for(&mut self, class_file_path: &str) -> Option<Vec<u8>> {
        match self {
            ClassPathRoot::Archive { path, archive, .. } => {
                let mut entry = archive.by_name(class_file_path).ok()?;
                let mut bytes = Vec::with_capacity(entry.size() as usize);
                match entry.read_to_end(&mut bytes) {
                    Ok(_) => Some(bytes),
                    Err(error) => {
                        warn!(archive = %path.display(), entry = class_file_path, %error,
                            "skipping unreadable archive entry");
                        None
                    }
                }
            }
            ClassPathRoot::Directory { path } => std::fs::read(path.join(class_file_path)).ok(),
        }
    }

    fn class_file_paths(&self) -> Vec<String> {
        match self {
            ClassPathRoot::Archive { entries, .. } => entries.clone(),
            ClassPathRoot::Directory { path } => directory_class_file_paths(path),
        }
    }
}

fn class_entries_of(path: &Path, archive: &mut ZipArchive<File>) -> Vec<String> {
    let mut entries = Vec::new();
    for index in 0..archive.len() {
        match archive.by_index(index) {
            Ok(entry) => {
                if entry.is_file() && is_candidate_class_file_path(entry.name()) {
                    entries.push(entry.name().to_string());
                }
            }
            Err(error) => {
                warn!(archive = %path.display(), index, %error,
                    "skipping unreadable archive entry");
            }
        }
    }
    entries
}

fn directory_class_file_paths(root: &Path) -> Vec<String> {
    // The root may itself contain glob metacharacters; only the trailing
    // `**/*.class` part is a pattern.
    let pattern = format!(
        "{}/**/*.class",
        glob::Pattern::escape(&root.to_string_lossy())
    );
    let mut paths = Vec::new();
    let walk = match glob::glob(&pattern) {
        Ok(walk) => walk,
        Err(error) => {
            warn!(root = %root.display(), %error, "skipping unwalkable class directory");
            return paths;
        }
    };
    for entry in walk.flatten() {
        if let Ok(relative) = entry.strip_prefix(root) {
            let joined = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            if is_candidate_class_file_path(&joined) {
                paths.push(joined);
            }
        }
    }
    paths
}

fn is_candidate_class_file_path(path: &str) -> bool {
    let Some(stem) = path.strip_suffix(".class") else {
        return false;
    };
    let simple = stem.rsplit(['/', '$']).next().unwrap_or(stem);
    simple != "module-info" && simple != "package-info"
}

/// Class-file path candidates for a Kotlin source name, most-likely first:
/// package separators, then nested-class splits, each with the Kotlin
/// file-class `Kt` suffix variant.
pub fn class_file_path_candidates_for(source_name: &str) -> Vec<String> {
    let mut candidates = Vec::new();
    let mut current = source_name.replace('.', "/");
    loop {
        candidates.push(format!("{current}.class"));
        candidates.push(format!("{current}Kt.class"));
        match current.rfind('/') {
            Some(index) => current.replace_range(index..index + 1, "$"),
            None => break,
        }
    }
    candidates
}

/// Kotlin source name for a class-file path: `foo/My$NestedKt.class`
/// becomes `foo.My.Nested`.
pub fn source_name_of_class_file_path(path: &str) -> String {
    let stem = path.strip_suffix(".class").unwrap_or(path);
    let stem = stem.strip_suffix("Kt").unwrap_or(stem);
    stem.replace(['/', '$'], ".")
}
