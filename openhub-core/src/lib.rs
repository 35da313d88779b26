//! openhub core library: domain types, configuration loading, errors.
//!
//! - [`types`]: listeners, credentials, options and the assembled [`Configuration`]
//! - [`config`]: parse and sanitize the `services:` YAML file
//! - [`error`]: [`ConfigError`]

pub mod config;
pub mod error;
pub mod types;

pub use error::ConfigError;
pub use types::{
    ActionMode, Configuration, Credentials, Listener, ListenerName, Options, Revision,
};
