//! Project discovery and structure

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::identity::EntityKind;

/// Name of the configuration directory marking a project root
pub const PROJECT_DIR: &str = ".mfgdocs";

/// Name of the directory holding the collection files
pub const DATA_DIR: &str = "data";

/// Represents an mfgdocs project
#[derive(Debug, Clone)]
pub struct Project {
    /// Root directory of the project (parent of .mfgdocs/)
    root: PathBuf,
}

impl Project {
    /// Find project root by walking up from the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let current = std::env::current_dir().map_err(|e| ProjectError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find project root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        loop {
            if current.join(PROJECT_DIR).is_dir() {
                tracing::debug!(root = %current.display(), "found project");
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(ProjectError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Create a new project structure at the given path
    pub fn init(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        if root.join(PROJECT_DIR).exists() {
            return Err(ProjectError::AlreadyExists(root));
        }

        Self::create_structure(root)
    }

    /// Initialize even if .mfgdocs/ exists
    ///
    /// The configuration is rewritten; existing collection files are kept.
    pub fn init_force(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        Self::create_structure(root)
    }

    fn create_structure(root: PathBuf) -> Result<Self, ProjectError> {
        let project = Self { root };

        std::fs::create_dir_all(project.mfgdocs_dir())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;
        std::fs::write(project.config_path(), Self::default_config())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        let data_dir = project.data_dir();
        std::fs::create_dir_all(&data_dir).map_err(|e| ProjectError::IoError(e.to_string()))?;

        for kind in EntityKind::all() {
            let path = data_dir.join(kind.file_name());
            if !path.exists() {
                std::fs::write(&path, "{}\n").map_err(|e| ProjectError::IoError(e.to_string()))?;
            }
        }

        Ok(project)
    }

    fn default_config() -> &'static str {
        r#"# mfgdocs project configuration

# Name of this documentation instance
# instance: playground

# Default output format (auto, yaml, tsv, json, csv, md, id, dot)
# default_format: auto

# Key prefixes used by `mfgdocs new`
# prefixes:
#   part: DS-001-
#   step: DS-WRK-
#   machine: DS-MAC-
#   tool: DS-TOL-
#   consumable: DS-CON-
#   role: DS-ROL-
#   location: DS-LOC-
"#
    }

    /// Get the project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .mfgdocs configuration directory
    pub fn mfgdocs_dir(&self) -> PathBuf {
        self.root.join(PROJECT_DIR)
    }

    /// Get the project configuration file
    pub fn config_path(&self) -> PathBuf {
        self.mfgdocs_dir().join("config.yaml")
    }

    /// Get the directory holding one JSON file per entity kind
    pub fn data_dir(&self) -> PathBuf {
        self.root.join(DATA_DIR)
    }

    /// Get the collection file for a kind
    pub fn collection_path(&self, kind: EntityKind) -> PathBuf {
        self.data_dir().join(kind.file_name())
    }
}

/// Errors that can occur during project operations
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("not an mfgdocs project (searched from {searched_from:?}). Run 'mfgdocs init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("mfgdocs project already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_project_init_creates_structure() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();

        assert!(project.mfgdocs_dir().is_dir());
        assert!(project.config_path().exists());
        assert!(project.data_dir().is_dir());
        for kind in EntityKind::all() {
            let content = std::fs::read_to_string(project.collection_path(*kind)).unwrap();
            assert_eq!(content.trim(), "{}");
        }
    }

    #[test]
    fn test_project_init_fails_if_exists() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path()).unwrap();

        let err = Project::init(tmp.path()).unwrap_err();
        assert!(matches!(err, ProjectError::AlreadyExists(_)));
    }

    #[test]
    fn test_project_init_force_keeps_data() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        let steps = project.collection_path(EntityKind::Step);
        std::fs::write(&steps, r#"{"S1": {"key": "S1"}}"#).unwrap();

        Project::init_force(tmp.path()).unwrap();
        assert!(std::fs::read_to_string(&steps).unwrap().contains("S1"));
    }

    #[test]
    fn test_project_discover_finds_mfgdocs_dir() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path()).unwrap();

        let subdir = tmp.path().join("some/nested/dir");
        std::fs::create_dir_all(&subdir).unwrap();

        let project = Project::discover_from(&subdir).unwrap();
        assert_eq!(
            project.root().canonicalize().unwrap(),
            tmp.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn test_project_discover_fails_without_mfgdocs_dir() {
        let tmp = tempdir().unwrap();
        let err = Project::discover_from(tmp.path()).unwrap_err();
        assert!(matches!(err, ProjectError::NotFound { .. }));
    }
}
