//! Environment configuration
//!
//! Panel credentials come from the process environment (or a local `.env`
//! file loaded before startup), never from command-line flags — the
//! password would otherwise leak into shell history and process listings.

use anyhow::{bail, Context};

use panel_orchestrator_client::PanelConfig;

const ENV_ENDPOINT: &str = "PANEL_ENDPOINT";
const ENV_USERNAME: &str = "PANEL_USERNAME";
const ENV_PASSWORD: &str = "PANEL_PASSWORD";
const ENV_INSECURE_TLS: &str = "PANEL_INSECURE_TLS";

/// Assemble the panel connection settings from the environment.
pub fn panel_config_from_env() -> anyhow::Result<PanelConfig> {
    Ok(PanelConfig {
        endpoint: required(ENV_ENDPOINT)?,
        username: required(ENV_USERNAME)?,
        password: required(ENV_PASSWORD)?,
        insecure_tls: flag(ENV_INSECURE_TLS),
    })
}

fn required(name: &str) -> anyhow::Result<String> {
    let value = std::env::var(name)
        .with_context(|| format!("missing required environment variable {name}"))?;
    if value.trim().is_empty() {
        bail!("environment variable {name} is empty");
    }
    Ok(value)
}

fn flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| matches!(v.trim(), "1" | "true" | "yes" | "y"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_rejects_empty_value() {
        std::env::set_var("PANEL_TEST_EMPTY_VAR", "   ");
        let result = required("PANEL_TEST_EMPTY_VAR");
        assert!(result.is_err());
    }

    #[test]
    fn flag_parses_truthy_values() {
        std::env::set_var("PANEL_TEST_FLAG_VAR", "true");
        assert!(flag("PANEL_TEST_FLAG_VAR"));
        std::env::set_var("PANEL_TEST_FLAG_VAR", "0");
        assert!(!flag("PANEL_TEST_FLAG_VAR"));
        assert!(!flag("PANEL_TEST_FLAG_UNSET_VAR"));
    }
}
