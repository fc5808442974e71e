//! Locating data files whose paths were recorded on another machine.
//!
//! A NeXus file written at the beamline points at its detector data with the
//! path that was valid at acquisition time, e.g.
//! `/dls/i07/data/2022/si1234/excalibur-123.h5`. Locally the same file usually
//! sits under a different mount point. If a file was recorded as
//! `/a1/a2/.../aN/file`, then for every local root `LD` we try
//! `LD/aj/.../aN/file` for all `j`, longest suffix first.

use std::path::Path;

use log::{debug, info};

use crate::error::NxError;

/// Searches a fixed set of root directories for nominal file paths.
///
/// The root list is the working directory, the extra search roots, and every
/// ancestor truncation of each of those, in that order.
#[derive(Clone, Debug)]
pub struct FileResolver {
    roots: Vec<String>,
}

impl FileResolver {
    /// Builds a resolver rooted at the process working directory.
    pub fn from_current_dir<R: AsRef<Path>>(search_roots: &[R]) -> Result<Self, NxError> {
        let cwd = std::env::current_dir().map_err(NxError::Io)?;
        Ok(Self::new(cwd, search_roots))
    }

    /// Builds a resolver with `cwd` as the implicit first root.
    pub fn new<C: AsRef<Path>, R: AsRef<Path>>(cwd: C, search_roots: &[R]) -> Self {
        let mut roots: Vec<String> = std::iter::once(path_string(cwd.as_ref()))
            .chain(search_roots.iter().map(|r| path_string(r.as_ref())))
            .collect();

        let start_count = roots.len();
        for i in 0..start_count {
            let segments: Vec<&str> = roots[i].split('/').collect();
            let ancestors: Vec<String> = (1..segments.len())
                .map(|dropped| segments[..segments.len() - dropped].join("/"))
                .collect();
            roots.extend(ancestors);
        }

        debug!("search roots: {:?}", roots);
        Self { roots }
    }

    /// The expanded list of root directories, in search order.
    pub fn roots(&self) -> &[String] {
        &self.roots
    }

    /// Resolves each nominal path to a file that exists locally.
    ///
    /// Output order matches input order. Resolution stops at the first name
    /// that cannot be found.
    ///
    /// # Errors
    /// [`NxError::FileNotFound`] naming the file and every candidate tried.
    pub fn resolve<F: AsRef<Path>>(&self, filenames: &[F]) -> Result<Vec<String>, NxError> {
        filenames
            .iter()
            .map(|name| self.resolve_one(name.as_ref()))
            .collect()
    }

    /// Resolves a single nominal path.
    pub fn resolve_one(&self, filename: &Path) -> Result<String, NxError> {
        let filename = path_string(filename);

        if Path::new(&filename).is_file() {
            return Ok(filename);
        }

        let candidates = self.candidates(&filename);
        if let Some(found) = candidates.iter().find(|c| Path::new(c.as_str()).is_file()) {
            info!("Data file found at {}.", found);
            return Ok(found.clone());
        }

        Err(NxError::FileNotFound {
            filename,
            candidates,
        })
    }

    /// Every candidate location for `filename`, longest suffix first and
    /// roots in order within each suffix.
    pub fn candidates(&self, filename: &str) -> Vec<String> {
        let segments: Vec<&str> = filename.split('/').collect();
        let mut candidates = Vec::with_capacity(segments.len() * self.roots.len());
        for j in 0..segments.len() {
            let suffix = segments[j..].join("/");
            for root in &self.roots {
                candidates.push(join_candidate(root, &suffix));
            }
        }
        candidates
    }
}

/// Resolves `filenames` against the working directory and `search_roots`.
///
/// Backslashes are treated as separators in both inputs.
pub fn find_files<F: AsRef<Path>, R: AsRef<Path>>(
    filenames: &[F],
    search_roots: &[R],
) -> Result<Vec<String>, NxError> {
    FileResolver::from_current_dir(search_roots)?.resolve(filenames)
}

/// Single-file form of [`find_files`].
pub fn find_file<F: AsRef<Path>, R: AsRef<Path>>(
    filename: F,
    search_roots: &[R],
) -> Result<String, NxError> {
    FileResolver::from_current_dir(search_roots)?.resolve_one(filename.as_ref())
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Joins like a POSIX path join: an absolute suffix wins and an empty root
/// leaves the suffix relative.
fn join_candidate(root: &str, suffix: &str) -> String {
    if suffix.starts_with('/') || root.is_empty() {
        suffix.to_string()
    } else if root.ends_with('/') {
        format!("{root}{suffix}")
    } else {
        format!("{root}/{suffix}")
    }
}
