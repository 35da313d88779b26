//! openhub: keeps registry images in step with build-service packages.
//!
//! # Usage
//!
//! ```text
//! openhub [--server URL] [--user U] [--password P] [--token T] [--single-shot] <config.yml>
//! ```

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use openhub_core::types::{
    DEFAULT_DOWNLOAD_DIR, DEFAULT_ENGINE, DEFAULT_HUB_SERVER, DEFAULT_SERVER,
};
use openhub_core::{config, Credentials, Options};

#[derive(Parser, Debug)]
#[command(
    name = "openhub",
    version,
    long_version = concat!(
        env!("OPENHUB_LONG_VERSION"),
        ".\n",
        "License GPLv3+: GNU GPL version 3 or later <https://gnu.org/licenses/gpl.html>.\n",
        "This is free software: you are free to change and redistribute it.\n",
        "There is NO WARRANTY, to the extent permitted by law."
    ),
    about = "Glue service between OBS and DockerHub",
    long_about = None,
)]
struct Cli {
    /// YAML file declaring the services to watch.
    config: PathBuf,

    /// Build service API endpoint.
    #[arg(short, long, env = "OPENHUB_OBS_SERVER", default_value = DEFAULT_SERVER)]
    server: String,

    /// Build service user name.
    #[arg(short, long, env = "OPENHUB_OBS_USER", default_value = "")]
    user: String,

    /// Build service password.
    #[arg(
        short,
        long,
        env = "OPENHUB_OBS_PASSWORD",
        default_value = "",
        hide_env_values = true
    )]
    password: String,

    /// Registry trigger token.
    #[arg(
        short,
        long,
        env = "OPENHUB_DOCKER_TOKEN",
        default_value = "",
        hide_env_values = true
    )]
    token: String,

    /// Run one synchronization pass and exit.
    #[arg(long, env = "OPENHUB_SINGLE_SHOT")]
    single_shot: bool,

    /// Registry base URL for build triggers.
    #[arg(long, env = "OPENHUB_HUB_SERVER", default_value = DEFAULT_HUB_SERVER)]
    hub_server: String,

    /// Seconds between synchronization passes.
    #[arg(
        long,
        env = "OPENHUB_INTERVAL",
        default_value_t = 300,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    interval: u64,

    /// Per-request timeout in seconds.
    #[arg(
        long,
        env = "OPENHUB_TIMEOUT",
        default_value_t = 15,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    timeout: u64,

    /// Where build artifacts are staged for local builds.
    #[arg(long, env = "OPENHUB_DOWNLOAD_DIR", default_value = DEFAULT_DOWNLOAD_DIR)]
    download_dir: PathBuf,

    /// Container engine binary used for local builds.
    #[arg(long, env = "OPENHUB_ENGINE", default_value = DEFAULT_ENGINE)]
    engine: String,
}

impl Cli {
    fn credentials(&self) -> Credentials {
        Credentials {
            server: self.server.clone(),
            user: self.user.clone(),
            password: self.password.clone(),
            token: self.token.clone(),
            hub_server: self.hub_server.clone(),
        }
    }

    fn options(&self) -> Options {
        Options {
            single_shot: self.single_shot,
            interval: Duration::from_secs(self.interval),
            request_timeout: Duration::from_secs(self.timeout),
            download_dir: self.download_dir.clone(),
            engine: self.engine.clone(),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    openhub_daemon::init_tracing();

    let configuration = config::load(&cli.config, cli.credentials(), cli.options())
        .with_context(|| format!("could not load {}", cli.config.display()))?;
    openhub_daemon::start_blocking(configuration).context("synchronization stopped")?;
    Ok(())
}
