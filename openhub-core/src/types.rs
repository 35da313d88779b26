//! Domain types for openhub.
//!
//! A [`Listener`] pairs one package on the build service with a set of image
//! tags on the container registry. The [`Configuration`] bundles every listener
//! with the global [`Credentials`] and runtime [`Options`]; it is assembled once
//! at startup and never mutated afterwards.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Build service queried when no `--server` is given.
pub const DEFAULT_SERVER: &str = "https://api.opensuse.org";
/// Registry whose trigger webhooks are called in remote-trigger mode.
pub const DEFAULT_HUB_SERVER: &str = "https://registry.hub.docker.com";
/// Distribution assumed for services that omit one.
pub const DEFAULT_DISTRIBUTION: &str = "openSUSE_Leap_15.0";
/// Architecture assumed for services that omit one.
pub const DEFAULT_ARCHITECTURE: &str = "x86_64";
/// Time between two synchronization passes.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5 * 60);
/// Upper bound for every single HTTP request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
/// Scratch directory for downloaded image tarballs.
pub const DEFAULT_DOWNLOAD_DIR: &str = ".oh-downloads";
/// Container engine binary driven by the local build pipeline.
pub const DEFAULT_ENGINE: &str = "docker";

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Unique name of a listener, taken from its key under `services:`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerName(pub String);

impl fmt::Display for ListenerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ListenerName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ListenerName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Opaque identifier of a package's latest completed build.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Revision(pub String);

impl Revision {
    /// An empty revision carries no information and is never acted upon.
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for Revision {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Revision {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// What happens when a listener observes a new revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActionMode {
    /// Call the registry's trigger webhook once per tag.
    #[default]
    RemoteTrigger,
    /// Download the image tarball, load it into the local engine and push it.
    LocalBuild,
}

impl fmt::Display for ActionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionMode::RemoteTrigger => write!(f, "remote-trigger"),
            ActionMode::LocalBuild => write!(f, "local-build"),
        }
    }
}

impl From<bool> for ActionMode {
    fn from(local_build: bool) -> Self {
        if local_build {
            ActionMode::LocalBuild
        } else {
            ActionMode::RemoteTrigger
        }
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// A validated watch target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listener {
    pub name: ListenerName,
    pub project: String,
    pub distribution: String,
    pub architecture: String,
    pub package: String,
    /// Registry repository, e.g. `opensuse/portus`.
    pub repository: String,
    pub tags: Vec<String>,
    pub mode: ActionMode,
}

impl Listener {
    /// `repository:tag` reference for one of this listener's tags.
    pub fn image_reference(&self, tag: &str) -> String {
        format!("{}:{}", self.repository, tag)
    }

    /// Tags rendered for log lines: `'2.3', 'latest'`.
    pub fn quoted_tags(&self) -> String {
        self.tags
            .iter()
            .map(|tag| format!("'{tag}'"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Global credentials for the build service and the registry webhook.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub server: String,
    pub user: String,
    pub password: String,
    /// Registry trigger token.
    pub token: String,
    pub hub_server: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER.to_string(),
            user: String::new(),
            password: String::new(),
            token: String::new(),
            hub_server: DEFAULT_HUB_SERVER.to_string(),
        }
    }
}

// Keep secrets out of `{:?}` output; the whole configuration ends up in debug logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("server", &self.server)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("token", &"<redacted>")
            .field("hub_server", &self.hub_server)
            .finish()
    }
}

/// Runtime knobs that are not tied to a single listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Run exactly one pass, then return.
    pub single_shot: bool,
    pub interval: Duration,
    pub request_timeout: Duration,
    pub download_dir: PathBuf,
    pub engine: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            single_shot: false,
            interval: DEFAULT_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            download_dir: PathBuf::from(DEFAULT_DOWNLOAD_DIR),
            engine: DEFAULT_ENGINE.to_string(),
        }
    }
}

/// Everything the synchronization loop needs, validated and defaulted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Configuration {
    pub credentials: Credentials,
    pub options: Options,
    /// Ordered by listener name.
    pub listeners: Vec<Listener>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
