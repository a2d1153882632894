//! Config command - show or edit configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager, HandoffMode};
use crate::entrypoint::umask::parse_umask;
use crate::error::{HandoffError, HandoffResult};
use console::style;
use std::path::PathBuf;

/// Execute the config command
pub async fn execute(
    args: ConfigArgs,
    manager: &ConfigManager,
    config: &Config,
) -> HandoffResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(config)?,
        Some(ConfigAction::Path) => println!("{}", manager.path().display()),
        Some(ConfigAction::Init { force }) => init_config(manager, force).await?,
        Some(ConfigAction::Set { key, value }) => {
            let mut config = config.clone();
            set_value(&mut config, &key, &value)?;
            manager.save(&config).await?;
            println!("{} Set {} = {}", style("✓").green(), key, value);
        }
    }

    Ok(())
}

fn show_config(config: &Config) -> HandoffResult<()> {
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

async fn init_config(manager: &ConfigManager, force: bool) -> HandoffResult<()> {
    let path = manager.path();

    if path.exists() && !force {
        return Err(HandoffError::ConfigExists(path.to_path_buf()));
    }

    manager.save(&Config::default()).await?;
    println!(
        "{} Configuration initialized ({})",
        style("✓").green(),
        path.display()
    );

    Ok(())
}

/// Apply a dotted `section.key` assignment
fn set_value(config: &mut Config, key: &str, value: &str) -> HandoffResult<()> {
    let invalid = |reason: &str| HandoffError::ConfigKey {
        key: key.to_string(),
        reason: reason.to_string(),
    };
    let parse_id = |v: &str| v.parse::<u32>().map_err(|_| invalid("expected a numeric ID"));

    let parts: Vec<&str> = key.split('.').collect();
    match parts.as_slice() {
        ["general", "log_format"] => match value {
            "text" | "json" => config.general.log_format = value.to_string(),
            _ => return Err(invalid("expected text or json")),
        },

        ["account", "name"] => config.account.name = value.to_string(),
        ["account", "shell"] => config.account.shell = value.to_string(),
        ["account", "default_uid"] => config.account.default_uid = parse_id(value)?,
        ["account", "default_gid"] => config.account.default_gid = parse_id(value)?,
        ["account", "etc_dir"] => config.account.etc_dir = PathBuf::from(value),

        ["paths", "app_dir"] => config.paths.app_dir = PathBuf::from(value),
        ["paths", "config_dir"] => config.paths.config_dir = PathBuf::from(value),

        ["process", "umask"] => {
            parse_umask(value)?;
            config.process.umask = value.to_string();
        }
        ["process", "mode"] => {
            config.process.mode = match value {
                "exec" => HandoffMode::Exec,
                "supervise" => HandoffMode::Supervise,
                _ => return Err(invalid("expected exec or supervise")),
            }
        }
        ["process", "product_name"] => config.process.product_name = value.to_string(),

        ["cache", "root"] => config.cache.root = PathBuf::from(value),

        _ => return Err(invalid("unknown configuration key")),
    }

    Ok(())
}
