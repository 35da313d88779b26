//! Configuration file loading.
//!
//! # File layout
//!
//! ```yaml
//! services:
//!   portus-2.3:
//!     project: Virtualization:containers:Portus:2.3
//!     distribution: openSUSE_Leap_15.0   # optional
//!     architecture: x86_64               # optional
//!     package: portus
//!     repository: opensuse/portus
//!     tags: ["2.3", "latest"]
//!     local_build: false                 # optional
//! ```
//!
//! Each key under `services` becomes a [`Listener`] named after it. Credentials
//! and options never live in the file; they come from flags or the environment
//! and are merged here into one [`Configuration`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;
use crate::types::{
    ActionMode, Configuration, Credentials, Listener, ListenerName, Options,
    DEFAULT_ARCHITECTURE, DEFAULT_DISTRIBUTION,
};

// ---------------------------------------------------------------------------
// 1. Raw file shape
// ---------------------------------------------------------------------------

/// One entry under `services:`, exactly as written by the user.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceEntry {
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub distribution: String,
    #[serde(default)]
    pub architecture: String,
    #[serde(default)]
    pub package: String,
    #[serde(default)]
    pub repository: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, alias = "localbuild")]
    pub local_build: bool,
}

/// Root of the configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub services: BTreeMap<String, ServiceEntry>,
}

// ---------------------------------------------------------------------------
// 2. Load
// ---------------------------------------------------------------------------

/// Read the file at `path` and merge it with `credentials` and `options`.
///
/// Returns `ConfigError::NotFound` if the file is absent,
/// `ConfigError::Parse` (with path) if it is malformed YAML and
/// `ConfigError::MissingField` if a service lacks a mandatory field.
pub fn load(
    path: &Path,
    credentials: Credentials,
    options: Options,
) -> Result<Configuration, ConfigError> {
    let listeners = load_listeners(path)?;
    if listeners.is_empty() {
        tracing::warn!(path = %path.display(), "configuration declares no services");
    }
    Ok(Configuration {
        credentials,
        options,
        listeners,
    })
}

/// Read and sanitize the listeners declared in the file at `path`.
pub fn load_listeners(path: &Path) -> Result<Vec<Listener>, ConfigError> {
    let path = absolute(path)?;
    if !path.exists() {
        return Err(ConfigError::NotFound { path });
    }
    let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    parse_listeners(&contents, &path)
}

/// Parse YAML `contents`; `path` is only used for error context.
pub fn parse_listeners(contents: &str, path: &Path) -> Result<Vec<Listener>, ConfigError> {
    let file: ConfigFile = serde_yaml::from_str(contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    sanitize(file)
}

fn absolute(path: &Path) -> Result<PathBuf, ConfigError> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(cwd.join(path))
}

// ---------------------------------------------------------------------------
// 3. Sanitize
// ---------------------------------------------------------------------------

/// Validate every service and fill in defaults. Output is ordered by name.
pub fn sanitize(file: ConfigFile) -> Result<Vec<Listener>, ConfigError> {
    file.services
        .into_iter()
        .map(|(name, entry)| sanitize_entry(name, entry))
        .collect()
}

fn sanitize_entry(name: String, entry: ServiceEntry) -> Result<Listener, ConfigError> {
    // The name doubles as the listener's download directory.
    if !is_plain_name(&name) {
        return Err(ConfigError::InvalidName { service: name });
    }
    require(&name, "a project", !entry.project.trim().is_empty())?;
    require(&name, "a package", !entry.package.trim().is_empty())?;
    require(&name, "a repository", !entry.repository.trim().is_empty())?;
    require(&name, "tags", !entry.tags.is_empty())?;

    let distribution = if entry.distribution.trim().is_empty() {
        tracing::info!(
            service = %name,
            "service does not provide a distribution, assuming {DEFAULT_DISTRIBUTION}"
        );
        DEFAULT_DISTRIBUTION.to_string()
    } else {
        entry.distribution
    };

    let architecture = if entry.architecture.trim().is_empty() {
        tracing::info!(
            service = %name,
            "service does not provide an architecture, assuming {DEFAULT_ARCHITECTURE}"
        );
        DEFAULT_ARCHITECTURE.to_string()
    } else {
        entry.architecture
    };

    Ok(Listener {
        name: ListenerName::from(name),
        project: entry.project,
        distribution,
        architecture,
        package: entry.package,
        repository: entry.repository,
        tags: entry.tags,
        mode: ActionMode::from(entry.local_build),
    })
}

fn is_plain_name(name: &str) -> bool {
    !name.trim().is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

fn require(service: &str, field: &'static str, present: bool) -> Result<(), ConfigError> {
    if present {
        Ok(())
    } else {
        Err(ConfigError::MissingField {
            service: service.to_string(),
            field,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
