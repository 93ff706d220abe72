use std::{env, path::PathBuf};

use config::{Config, File};
use log::debug;
use serde::Deserialize;

use crate::cli::{Args, Command};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    pub mm_url: Option<String>,
    pub mm_token: Option<String>,
    pub channel_id: Option<String>,
    #[serde(default)]
    pub team: Vec<String>,
    pub max_age_days: Option<i64>,
    pub congrats_gif: Option<bool>,
    pub web_commit_url: Option<String>,
}

const CONFIG_FILE_NAME: &str = env!("CARGO_PKG_NAME");

fn get_xdg_config_path() -> Option<PathBuf> {
    if let Ok(xdg_config) = env::var("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg_config));
    }

    if let Ok(home) = env::var("HOME") {
        return Some(PathBuf::from(home).join(".config"));
    }

    None
}

/// `$XDG_CONFIG_HOME/mmdigest/config.toml`, when it exists.
pub fn load_settings() -> anyhow::Result<Settings> {
    let Some(config_path) = get_xdg_config_path()
        .map(|dir| dir.join(CONFIG_FILE_NAME).join("config.toml"))
        .filter(|path| path.exists())
    else {
        return Ok(Settings::default());
    };

    Config::builder()
        .add_source(File::from(config_path.clone()).required(false))
        .build()?
        .try_deserialize()
        .map_err(|e| {
            anyhow::anyhow!(
                "Failed to deserialize config file {}: {}",
                config_path.display(),
                e
            )
        })
}

pub fn merge_settings_with_args(args: &Args) -> anyhow::Result<Args> {
    let settings = load_settings()?;
    let merged = merge_settings(args, settings);
    debug!("merged config: {:?}", merged);
    Ok(merged)
}

/// Fills what the command line left unset with the config file values.
pub fn merge_settings(args: &Args, settings: Settings) -> Args {
    let mut new_args = args.clone();

    macro_rules! apply_if_none {
        ($target:expr, $value:expr) => {
            if $target.is_none() {
                $target = $value;
            }
        };
    }

    apply_if_none!(new_args.mm_url, settings.mm_url);
    apply_if_none!(new_args.mm_token, settings.mm_token);
    apply_if_none!(new_args.channel_id, settings.channel_id);

    match &mut new_args.command {
        Command::Requests(requests) => {
            if requests.team.is_empty() {
                requests.team = settings.team;
            }
            apply_if_none!(requests.max_age_days, settings.max_age_days);
            if !requests.gif && !requests.no_gif {
                requests.gif = settings.congrats_gif.unwrap_or(false);
            }
        }
        Command::Commits(commits) => {
            apply_if_none!(commits.web_commit_url, settings.web_commit_url);
        }
        Command::Builds(_) => {}
    }

    new_args
}
