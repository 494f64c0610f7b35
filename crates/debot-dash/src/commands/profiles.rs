//! Local profile handlers. These touch the config file only, never the
//! gateway.

use serde::Serialize;
use tabled::Tabled;

use crate::cli::{GlobalOpts, ProfilesArgs, ProfilesCommand};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct ProfileEntry {
    name: String,
    gateway: String,
    active: bool,
}

#[derive(Tabled)]
struct ProfileRow {
    #[tabled(rename = "")]
    marker: &'static str,
    #[tabled(rename = "Profile")]
    name: String,
    #[tabled(rename = "Gateway")]
    gateway: String,
}

fn entries(cfg: &Config, active: &str) -> Vec<ProfileEntry> {
    cfg.profile_names()
        .into_iter()
        .filter_map(|name| {
            let profile = cfg.profiles.get(&name)?;
            Some(ProfileEntry {
                active: name == active,
                gateway: profile.gateway.clone(),
                name,
            })
        })
        .collect()
}

pub fn handle(args: ProfilesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ProfilesCommand::List => {
            let cfg = config::load_config()?;
            let active = config::active_profile_name(global, &cfg);
            let list = entries(&cfg, &active);
            if list.is_empty() && !global.quiet {
                eprintln!(
                    "No profiles configured; using {} (add one in {})",
                    global.gateway.as_deref().unwrap_or(config::DEFAULT_GATEWAY),
                    config::config_path().display()
                );
            }
            let out = output::render_list(
                global.output,
                &list,
                |p| ProfileRow {
                    marker: if p.active { "*" } else { "" },
                    name: p.name.clone(),
                    gateway: p.gateway.clone(),
                },
                |p| p.name.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ProfilesCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), false);
            Ok(())
        }

        ProfilesCommand::Add {
            name,
            url: gateway,
            ca_cert,
            default,
        } => {
            if let Err(e) = gateway.parse::<url::Url>() {
                return Err(CliError::Validation {
                    field: "gateway".into(),
                    reason: format!("invalid URL {gateway}: {e}"),
                });
            }

            let mut cfg = config::load_config()?;
            let mut profile = Profile::new(gateway);
            profile.insecure = global.insecure.then_some(true);
            profile.ca_cert = ca_cert;
            cfg.profiles.insert(name.clone(), profile);
            if default || cfg.profiles.len() == 1 {
                cfg.default_profile = Some(name.clone());
            }
            config::save_config(&cfg)?;

            if !global.quiet {
                eprintln!("Profile '{name}' saved to {}", config::config_path().display());
            }
            Ok(())
        }

        ProfilesCommand::Use { name } => {
            let mut cfg = config::load_config()?;
            cfg.profile(&name)?;
            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;

            if !global.quiet {
                eprintln!("Default profile set to '{name}'");
            }
            Ok(())
        }
    }
}
