//! Client configuration assembly: config file first, then flags and environment.

use anyhow::Context;
use arc_core::{AcceptPreference, RcClientConfig};

use crate::Cli;

/// Build the client configuration for this invocation.
///
/// Values given on the command line (or through `ARC_*` variables) override
/// those read from `--config`. Without a config file the server defaults to
/// `localhost`.
pub fn resolve(cli: &Cli) -> anyhow::Result<RcClientConfig> {
    let mut config = match &cli.config {
        Some(path) => RcClientConfig::from_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => RcClientConfig::default(),
    };

    if let Some(server) = &cli.server {
        config.server.clone_from(server);
    }
    if let Some(port) = cli.port {
        config = config.with_port(port);
    }
    if let Some(login) = &cli.login {
        config.login = Some(login.clone());
    }
    if let Some(password) = &cli.password {
        config.password = Some(password.clone());
    }
    if let Some(timeout) = cli.timeout {
        config = config.with_timeout(timeout);
    }
    if cli.yaml {
        config = config.with_accept(AcceptPreference::YamlFirst);
    }
    if cli.tls_verify {
        config = config.with_tls_verify(true);
    }

    // Flags bypass the checks `from_file` runs.
    config.validated().context("invalid client configuration")
}
