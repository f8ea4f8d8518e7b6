//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::core::identity::EntityKind;
use crate::core::project::Project;

/// Built-in instance name
pub const DEFAULT_INSTANCE: &str = "playground";

/// Per-kind key prefixes used when generating new keys
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct Prefixes {
    pub part: Option<String>,
    pub step: Option<String>,
    pub machine: Option<String>,
    pub tool: Option<String>,
    pub consumable: Option<String>,
    pub role: Option<String>,
    pub location: Option<String>,
    pub action: Option<String>,
    pub company: Option<String>,
}

impl Prefixes {
    fn slot(&mut self, kind: EntityKind) -> &mut Option<String> {
        match kind {
            EntityKind::Part => &mut self.part,
            EntityKind::Step => &mut self.step,
            EntityKind::Machine => &mut self.machine,
            EntityKind::Tool => &mut self.tool,
            EntityKind::Consumable => &mut self.consumable,
            EntityKind::Role => &mut self.role,
            EntityKind::Location => &mut self.location,
            EntityKind::Action => &mut self.action,
            EntityKind::Company => &mut self.company,
        }
    }

    fn get(&self, kind: EntityKind) -> Option<&str> {
        let value = match kind {
            EntityKind::Part => &self.part,
            EntityKind::Step => &self.step,
            EntityKind::Machine => &self.machine,
            EntityKind::Tool => &self.tool,
            EntityKind::Consumable => &self.consumable,
            EntityKind::Role => &self.role,
            EntityKind::Location => &self.location,
            EntityKind::Action => &self.action,
            EntityKind::Company => &self.company,
        };
        value.as_deref()
    }

    fn merge(&mut self, mut other: Prefixes) {
        for &kind in EntityKind::all() {
            if let Some(prefix) = other.slot(kind).take() {
                *self.slot(kind) = Some(prefix);
            }
        }
    }

    /// Built-in prefix for a kind
    pub fn default_for(kind: EntityKind) -> &'static str {
        match kind {
            EntityKind::Part => "DS-001-",
            EntityKind::Step => "DS-WRK-",
            EntityKind::Machine => "DS-MAC-",
            EntityKind::Tool => "DS-TOL-",
            EntityKind::Consumable => "DS-CON-",
            EntityKind::Role => "DS-ROL-",
            EntityKind::Location => "DS-LOC-",
            EntityKind::Action => "DS-ACT-",
            EntityKind::Company => "DS-COM-",
        }
    }

    /// Environment variable overriding the prefix of a kind
    pub fn env_var(kind: EntityKind) -> &'static str {
        match kind {
            EntityKind::Part => "MFGDOCS_PREFIX_PART",
            EntityKind::Step => "MFGDOCS_PREFIX_WORK",
            EntityKind::Machine => "MFGDOCS_PREFIX_MACHINE",
            EntityKind::Tool => "MFGDOCS_PREFIX_TOOL",
            EntityKind::Consumable => "MFGDOCS_PREFIX_CONSUMABLE",
            EntityKind::Role => "MFGDOCS_PREFIX_ROLE",
            EntityKind::Location => "MFGDOCS_PREFIX_LOCATION",
            EntityKind::Action => "MFGDOCS_PREFIX_ACTION",
            EntityKind::Company => "MFGDOCS_PREFIX_COMPANY",
        }
    }
}

/// mfgdocs configuration with layered hierarchy
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Name of the documentation instance
    pub instance: Option<String>,

    /// Directory to start project discovery from
    pub workdir: Option<PathBuf>,

    /// Default output format
    pub default_format: Option<String>,

    /// Key prefixes for generated keys
    pub prefixes: Prefixes,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    ///
    /// Without a project only the global file and the environment apply.
    pub fn load(project: Option<&Project>) -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (accessor fallbacks)

        // 2. Global user config (~/.config/mfgdocs/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read_file(&global_path) {
                config.merge(global);
            }
        }

        // 3. Project config (.mfgdocs/config.yaml)
        if let Some(project) = project {
            if let Some(project_config) = Self::read_file(&project.config_path()) {
                config.merge(project_config);
            }
        }

        // 4. Environment variables, then a `.env` file for the unset ones
        let dotenv = Self::dotenv_path(project)
            .map(|path| read_dotenv(&path))
            .unwrap_or_default();
        config.apply_env(|name| std::env::var(name).ok().or_else(|| dotenv.get(name).cloned()));

        config
    }

    /// `.env` at the project root, or in the current directory before discovery
    fn dotenv_path(project: Option<&Project>) -> Option<PathBuf> {
        match project {
            Some(project) => Some(project.root().join(".env")),
            None => std::env::current_dir().ok().map(|dir| dir.join(".env")),
        }
    }

    fn read_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = std::fs::read_to_string(path).ok()?;
        if contents.lines().all(|line| {
            let line = line.trim();
            line.is_empty() || line.starts_with('#')
        }) {
            return None;
        }
        match serde_yml::from_str::<Config>(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config");
                None
            }
        }
    }

    fn apply_env<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(instance) = var("MFGDOCS_INSTANCE") {
            self.instance = Some(instance);
        }
        if let Some(workdir) = var("MFGDOCS_WORKDIR") {
            self.workdir = Some(PathBuf::from(workdir));
        }
        if let Some(format) = var("MFGDOCS_DEFAULT_FORMAT") {
            self.default_format = Some(format);
        }
        for &kind in EntityKind::all() {
            if let Some(prefix) = var(Prefixes::env_var(kind)) {
                *self.prefixes.slot(kind) = Some(prefix);
            }
        }
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "mfgdocs")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.instance.is_some() {
            self.instance = other.instance;
        }
        if other.workdir.is_some() {
            self.workdir = other.workdir;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
        self.prefixes.merge(other.prefixes);
    }

    /// Get the instance name
    pub fn instance(&self) -> &str {
        self.instance.as_deref().unwrap_or(DEFAULT_INSTANCE)
    }

    /// Key prefix for new entities of a kind
    pub fn key_prefix(&self, kind: EntityKind) -> &str {
        self.prefixes
            .get(kind)
            .unwrap_or_else(|| Prefixes::default_for(kind))
    }
}

/// `KEY=VALUE` pairs from a dotenv file; a missing file is empty
///
/// Blank lines and `#` comments are skipped, an `export ` prefix is allowed
/// and one pair of matching surrounding quotes is stripped from the value.
fn read_dotenv(path: &Path) -> HashMap<String, String> {
    let Ok(contents) = std::fs::read_to_string(path) else {
        return HashMap::new();
    };

    let mut vars = HashMap::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some((name, value)) = line.split_once('=') else {
            tracing::debug!(path = %path.display(), line, "skipping malformed .env line");
            continue;
        };
        let value = value.trim();
        let value = ['"', '\'']
            .iter()
            .find_map(|&q| value.strip_prefix(q).and_then(|v| v.strip_suffix(q)))
            .unwrap_or(value);
        vars.insert(name.trim().to_string(), value.to_string());
    }
    vars
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.instance(), "playground");
        assert_eq!(config.key_prefix(EntityKind::Part), "DS-001-");
        assert_eq!(config.key_prefix(EntityKind::Step), "DS-WRK-");
        assert_eq!(config.key_prefix(EntityKind::Role), "DS-ROL-");
        assert_eq!(config.key_prefix(EntityKind::Location), "DS-LOC-");
    }

    #[test]
    fn test_partial_merge_keeps_other_prefixes() {
        let mut config: Config = serde_yml::from_str("prefixes:\n  tool: T-\n").unwrap();
        let project: Config =
            serde_yml::from_str("instance: shopfloor\nprefixes:\n  part: P-\n").unwrap();
        config.merge(project);

        assert_eq!(config.instance(), "shopfloor");
        assert_eq!(config.key_prefix(EntityKind::Tool), "T-");
        assert_eq!(config.key_prefix(EntityKind::Part), "P-");
        assert_eq!(config.key_prefix(EntityKind::Machine), "DS-MAC-");
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("MFGDOCS_INSTANCE", "prod"),
            ("MFGDOCS_WORKDIR", "/srv/docs"),
            ("MFGDOCS_PREFIX_ROLE", "R-"),
            ("MFGDOCS_PREFIX_WORK", "W-"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.prefixes.part = Some("FILE-".to_string());
        config.apply_env(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.instance(), "prod");
        assert_eq!(config.workdir, Some(PathBuf::from("/srv/docs")));
        assert_eq!(config.key_prefix(EntityKind::Role), "R-");
        assert_eq!(config.key_prefix(EntityKind::Step), "W-");
        // the role prefix does not clobber the part prefix
        assert_eq!(config.key_prefix(EntityKind::Part), "FILE-");
    }

    #[test]
    fn test_project_config_file() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        std::fs::write(
            project.config_path(),
            "default_format: json\nprefixes:\n  machine: MC-\n",
        )
        .unwrap();

        let config = Config::read_file(&project.config_path()).unwrap();
        assert_eq!(config.default_format.as_deref(), Some("json"));
        assert_eq!(config.key_prefix(EntityKind::Machine), "MC-");
    }

    #[test]
    fn test_invalid_config_file_is_ignored() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(&path, "prefixes: [not, a, map]\n").unwrap();
        assert!(Config::read_file(&path).is_none());
    }

    #[test]
    fn test_commented_out_config_is_empty() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        assert!(Config::read_file(&project.config_path()).is_none());

        let config = Config::load(Some(&project));
        assert!(!config.key_prefix(EntityKind::Part).is_empty());
    }

    #[test]
    fn test_read_dotenv() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join(".env");
        std::fs::write(
            &path,
            "# shop settings\nMFGDOCS_INSTANCE=shopfloor\nexport MFGDOCS_PREFIX_TOOL=\"T-\"\n\nnot a pair\n",
        )
        .unwrap();

        let vars = read_dotenv(&path);
        assert_eq!(vars.len(), 2);
        assert_eq!(vars["MFGDOCS_INSTANCE"], "shopfloor");
        assert_eq!(vars["MFGDOCS_PREFIX_TOOL"], "T-");
        assert!(read_dotenv(&tmp.path().join("missing.env")).is_empty());
    }

    #[test]
    fn test_project_dotenv_applies_to_load() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        std::fs::write(tmp.path().join(".env"), "MFGDOCS_PREFIX_CONSUMABLE=GLUE-\n").unwrap();

        let config = Config::load(Some(&project));
        let expected = std::env::var("MFGDOCS_PREFIX_CONSUMABLE").unwrap_or("GLUE-".to_string());
        assert_eq!(config.key_prefix(EntityKind::Consumable), expected);
    }
}
