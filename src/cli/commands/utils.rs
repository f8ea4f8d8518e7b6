//! Shared utilities for CLI commands

use clap::ValueEnum;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::config::Config;
use crate::core::entity::EntityRef;
use crate::core::identity::EntityKind;
use crate::core::project::Project;
use crate::core::storage::Storage;
use crate::entities::Step;

/// A discovered project with its configuration and loaded storage
pub struct Workspace {
    pub project: Project,
    pub config: Config,
    pub storage: Storage,
}

impl Workspace {
    /// Discover the project, layer the configuration and load all collections
    ///
    /// Discovery starts at `--project`, else the configured workdir, else the
    /// current directory.
    pub fn open(global: &GlobalOpts) -> Result<Self> {
        let project = discover_project(global)?;
        let config = Config::load(Some(&project));
        let storage = Storage::load(&project.data_dir())?;

        tracing::debug!(
            instance = config.instance(),
            root = %project.root().display(),
            steps = storage.steps.len(),
            parts = storage.parts.len(),
            "opened workspace"
        );

        Ok(Self {
            project,
            config,
            storage,
        })
    }

    /// Write all collections back to the data directory
    pub fn save(&self) -> Result<()> {
        self.storage.save(&self.project.data_dir())?;
        Ok(())
    }

    /// The format to use when the user passed `auto`
    pub fn format(&self, global: &GlobalOpts, fallback: OutputFormat) -> OutputFormat {
        effective_format(global.format, self.config.default_format.as_deref(), fallback)
    }

    /// Find an entity or fail with a message naming the kind
    pub fn find(&self, kind: EntityKind, key: &str) -> Result<EntityRef<'_>> {
        self.storage
            .find(kind, key)
            .ok_or_else(|| miette::miette!("No {} found with key '{}'", kind, key))
    }

    pub fn step(&self, key: &str) -> Result<&Step> {
        self.storage
            .step(key)
            .ok_or_else(|| step_not_found(&self.storage, key))
    }

    /// Mutable access to a step by key, for in-place edits
    pub fn step_mut(&mut self, key: &str) -> Result<&mut Step> {
        let pk = self
            .storage
            .step_pk(key)
            .ok_or_else(|| step_not_found(&self.storage, key))?;
        Ok(self.storage.steps.get_mut(&pk)?)
    }
}

fn step_not_found(storage: &Storage, key: &str) -> miette::Report {
    match storage.steps_by_key(key).len() {
        0 => miette::miette!("No step found with key '{}'", key),
        n => miette::miette!("Key '{}' is shared by {} steps; it is ambiguous", key, n),
    }
}

fn discover_project(global: &GlobalOpts) -> Result<Project> {
    let start: PathBuf = match &global.project {
        Some(path) => path.clone(),
        None => match Config::load(None).workdir {
            Some(workdir) => workdir,
            None => std::env::current_dir().into_diagnostic()?,
        },
    };
    Project::discover_from(&start).map_err(|e| miette::miette!("{}", e))
}

/// Resolve `auto` through the configured default, then the command's fallback
pub fn effective_format(
    requested: OutputFormat,
    configured: Option<&str>,
    fallback: OutputFormat,
) -> OutputFormat {
    if requested != OutputFormat::Auto {
        return requested;
    }
    configured
        .and_then(|name| OutputFormat::from_str(name, true).ok())
        .filter(|format| *format != OutputFormat::Auto)
        .unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_format() {
        assert_eq!(
            effective_format(OutputFormat::Json, Some("yaml"), OutputFormat::Tsv),
            OutputFormat::Json
        );
        assert_eq!(
            effective_format(OutputFormat::Auto, Some("CSV"), OutputFormat::Tsv),
            OutputFormat::Csv
        );
        assert_eq!(
            effective_format(OutputFormat::Auto, Some("bogus"), OutputFormat::Yaml),
            OutputFormat::Yaml
        );
        assert_eq!(
            effective_format(OutputFormat::Auto, None, OutputFormat::Tsv),
            OutputFormat::Tsv
        );
    }
}
