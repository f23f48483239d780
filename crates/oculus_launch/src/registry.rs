//! Installed-package registry lookups

use std::path::{Path, PathBuf};

/// Environment variable holding the colon-separated install prefix list
pub const PREFIX_PATH_ENV: &str = "AMENT_PREFIX_PATH";

/// Resolves installed-package locations
///
/// Reifies the ambient package registry as an injected dependency so that
/// description builders can be exercised with a fake locator.
pub trait PackageLocator {
    /// Resolve the share directory of an installed package
    fn resolve_share_dir(&self, package: &str) -> Result<PathBuf, LocateError>;

    /// Resolve the full path of an executable installed by a package
    fn resolve_executable(&self, package: &str, executable: &str)
        -> Result<PathBuf, LocateError>;
}

/// Locator backed by an ordered list of install prefixes
///
/// A package's share directory lives at `<prefix>/share/<package>` and its
/// executables at `<prefix>/lib/<package>/<executable>`; the first prefix
/// that matches wins.
#[derive(Debug, Clone)]
pub struct PrefixPathLocator {
    prefixes: Vec<PathBuf>,
}

impl PrefixPathLocator {
    pub fn new(prefixes: Vec<PathBuf>) -> Self {
        Self { prefixes }
    }

    /// Build from a colon-separated prefix list
    pub fn from_path_list(list: &str) -> Self {
        let prefixes = list
            .split(':')
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .collect();
        Self { prefixes }
    }

    /// Build from the `AMENT_PREFIX_PATH` environment variable
    ///
    /// An unset variable yields an empty prefix list; every lookup then
    /// fails with [`LocateError::PackageNotFound`].
    pub fn from_env() -> Self {
        match std::env::var(PREFIX_PATH_ENV) {
            Ok(list) => Self::from_path_list(&list),
            Err(_) => Self::new(Vec::new()),
        }
    }

    pub fn prefixes(&self) -> &[PathBuf] {
        &self.prefixes
    }

    fn find(&self, relative: &Path, is_dir: bool) -> Option<PathBuf> {
        self.prefixes
            .iter()
            .map(|prefix| prefix.join(relative))
            .find(|candidate| {
                if is_dir {
                    candidate.is_dir()
                } else {
                    candidate.is_file()
                }
            })
    }
}

impl PackageLocator for PrefixPathLocator {
    fn resolve_share_dir(&self, package: &str) -> Result<PathBuf, LocateError> {
        let relative = Path::new("share").join(package);
        self.find(&relative, true)
            .ok_or_else(|| LocateError::PackageNotFound {
                package: package.to_string(),
                searched: self.prefixes.clone(),
            })
    }

    fn resolve_executable(
        &self,
        package: &str,
        executable: &str,
    ) -> Result<PathBuf, LocateError> {
        let relative = Path::new("lib").join(package).join(executable);
        self.find(&relative, false)
            .ok_or_else(|| LocateError::ExecutableNotFound {
                package: package.to_string(),
                executable: executable.to_string(),
                searched: self.prefixes.clone(),
            })
    }
}

/// Errors that can occur when resolving installed packages
#[derive(Debug, thiserror::Error)]
pub enum LocateError {
    #[error("Package '{package}' not found in install prefixes: {}", join_paths(.searched))]
    PackageNotFound {
        package: String,
        searched: Vec<PathBuf>,
    },

    #[error(
        "Executable '{executable}' of package '{package}' not found in install prefixes: {}",
        join_paths(.searched)
    )]
    ExecutableNotFound {
        package: String,
        executable: String,
        searched: Vec<PathBuf>,
    },
}

fn join_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "(none)".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
