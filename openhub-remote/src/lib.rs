//! # openhub-remote
//!
//! Collaborators of the synchronization loop: everything that talks to the
//! outside world.
//!
//! - [`obs::ObsClient`]: build status, revision and binary listing on the build service
//! - [`artifacts`]: tarball download and checksum verification
//! - [`engine::ContainerEngine`]: remove, load and push images through the engine CLI
//! - [`hub::HubClient`]: registry trigger webhook

pub mod artifacts;
pub mod engine;
pub mod error;
pub mod hub;
pub mod obs;
mod xml;

pub use artifacts::Artifacts;
pub use engine::ContainerEngine;
pub use error::RemoteError;
pub use hub::HubClient;
pub use obs::{BuildState, ObsClient};
