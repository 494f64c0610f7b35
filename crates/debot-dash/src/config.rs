//! CLI configuration: the shared `debot_config` types plus resolution
//! that respects `GlobalOpts` flag overrides (--gateway, --timeout, etc.).

use std::time::Duration;

use debot_config::ConfigError;
use debot_core::{DashboardConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use debot_config::{
    Config, DEFAULT_GATEWAY, Profile, config_path, load_config, save_config,
};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.active_profile_name(global.profile.as_deref())
}

/// Build a `DashboardConfig` from the config file, profile and CLI flags.
///
/// Flags beat profile values. Without a matching profile the gateway comes
/// from `--gateway`, else the local default; naming a profile that does not
/// exist is an error.
pub fn build_dashboard_config(
    global: &GlobalOpts,
    cfg: &Config,
) -> Result<DashboardConfig, CliError> {
    let profile_name = active_profile_name(global, cfg);

    let mut dashboard = match cfg.profiles.get(&profile_name) {
        Some(profile) => debot_config::profile_to_dashboard_config(profile, &cfg.defaults)?,
        None if global.profile.is_some() => {
            return Err(ConfigError::ProfileNotFound {
                available: cfg.profile_names(),
                name: profile_name,
            }
            .into());
        }
        None => {
            let fallback = Profile::new(global.gateway.as_deref().unwrap_or(DEFAULT_GATEWAY));
            debot_config::profile_to_dashboard_config(&fallback, &cfg.defaults)?
        }
    };

    if let Some(ref gateway) = global.gateway {
        dashboard.url = gateway.parse().map_err(|_| CliError::Validation {
            field: "gateway".into(),
            reason: format!("invalid URL: {gateway}"),
        })?;
    }
    if global.insecure {
        dashboard.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        dashboard.timeout = Duration::from_secs(secs);
    }

    tracing::debug!(profile = %profile_name, gateway = %dashboard.url, "resolved gateway");
    Ok(dashboard)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::cli::{ColorMode, OutputFormat};

    fn global() -> GlobalOpts {
        GlobalOpts {
            profile: None,
            gateway: None,
            output: OutputFormat::Table,
            color: ColorMode::Never,
            verbose: 0,
            quiet: false,
            insecure: false,
            timeout: None,
        }
    }

    fn config_with_lab() -> Config {
        let mut cfg = Config::default();
        let mut lab = Profile::new("http://10.0.0.5:8000");
        lab.timeout = Some(5);
        cfg.profiles.insert("lab".into(), lab);
        cfg
    }

    #[test]
    fn falls_back_to_local_gateway() {
        let dashboard = build_dashboard_config(&global(), &Config::default()).unwrap();
        assert_eq!(dashboard.url.as_str(), "http://127.0.0.1:8000/");
        assert_eq!(dashboard.tls, TlsVerification::SystemDefaults);
    }

    #[test]
    fn uses_named_profile() {
        let mut opts = global();
        opts.profile = Some("lab".into());
        let dashboard = build_dashboard_config(&opts, &config_with_lab()).unwrap();
        assert_eq!(dashboard.url.as_str(), "http://10.0.0.5:8000/");
        assert_eq!(dashboard.timeout, Duration::from_secs(5));
    }

    #[test]
    fn flags_override_profile() {
        let mut opts = global();
        opts.profile = Some("lab".into());
        opts.gateway = Some("http://192.168.1.9:9000".into());
        opts.insecure = true;
        opts.timeout = Some(2);

        let dashboard = build_dashboard_config(&opts, &config_with_lab()).unwrap();
        assert_eq!(dashboard.url.as_str(), "http://192.168.1.9:9000/");
        assert_eq!(dashboard.tls, TlsVerification::DangerAcceptInvalid);
        assert_eq!(dashboard.timeout, Duration::from_secs(2));
    }

    #[test]
    fn unknown_profile_is_an_error() {
        let mut opts = global();
        opts.profile = Some("nope".into());
        let err = build_dashboard_config(&opts, &config_with_lab()).unwrap_err();
        assert!(matches!(err, CliError::ProfileNotFound { ref name, .. } if name == "nope"));
    }

    #[test]
    fn invalid_gateway_flag_rejected() {
        let mut opts = global();
        opts.gateway = Some("::not a url".into());
        let err = build_dashboard_config(&opts, &Config::default()).unwrap_err();
        assert!(matches!(err, CliError::Validation { ref field, .. } if field == "gateway"));
    }
}
