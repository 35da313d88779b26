//! Local container engine driven through its CLI (`docker` by default).

use std::path::Path;
use std::process::Output;

use tokio::process::Command;

use openhub_core::Listener;

use crate::error::RemoteError;

#[derive(Debug, Clone)]
pub struct ContainerEngine {
    program: String,
}

impl ContainerEngine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Force-remove `repository:tag` for every tag. Failures are only logged:
    /// the images usually do not exist yet.
    pub async fn remove_images(&self, listener: &Listener) {
        for tag in &listener.tags {
            let reference = listener.image_reference(tag);
            if let Err(err) = self.run(&["image", "rm", "--force", &reference]).await {
                tracing::debug!(image = %reference, error = %err, "image removal skipped");
            }
        }
    }

    /// Load an image tarball.
    pub async fn load(&self, tarball: &Path) -> Result<(), RemoteError> {
        let tarball = tarball.to_string_lossy();
        let output = self.run(&["load", "--input", tarball.as_ref()]).await?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        for line in stdout.lines().filter(|l| !l.trim().is_empty()) {
            tracing::info!("{}", line.trim());
        }
        Ok(())
    }

    /// Push `repository:tag` for every tag of `listener`.
    pub async fn push(&self, listener: &Listener) -> Result<(), RemoteError> {
        for tag in &listener.tags {
            let reference = listener.image_reference(tag);
            self.run(&["push", &reference]).await?;
            tracing::info!(image = %reference, "pushed image");
        }
        Ok(())
    }

    async fn run(&self, args: &[&str]) -> Result<Output, RemoteError> {
        let command = format!("{} {}", self.program, args.join(" "));
        let output = Command::new(&self.program)
            .args(args)
            .output()
            .await
            .map_err(|err| RemoteError::Engine {
                command: command.clone(),
                status: "spawn failed".to_string(),
                stderr: err.to_string(),
            })?;
        if !output.status.success() {
            return Err(RemoteError::Engine {
                command,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output)
    }
}
