//! Settings for the application: defaults, then an optional TOML file, then
//! `SHOP_FOR_PROGRESS_*` environment variables, then command line flags.
use chrono_tz::Tz;
use clap::{Parser, Subcommand, ValueEnum};
use engine::{Campaign, CampaignDirectory};
use serde::Deserialize;

use crate::error::{AppError, Result};

const DEFAULT_CONFIG_PATH: &str = "config/shop_for_progress.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where the ledger document lives.
    pub data_path: String,
    /// IANA timezone used to display record dates.
    pub timezone: String,
    /// Log level for the application and the engine.
    pub level: String,
    /// Replaces the built-in campaign list when not empty.
    pub campaigns: Vec<Campaign>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: "data/ledger.json".to_string(),
            timezone: "UTC".to_string(),
            level: "info".to_string(),
            campaigns: Vec::new(),
        }
    }
}

impl AppConfig {
    pub fn directory(&self) -> Result<CampaignDirectory> {
        if self.campaigns.is_empty() {
            return Ok(CampaignDirectory::default());
        }
        Ok(CampaignDirectory::new(self.campaigns.clone())?)
    }

    pub fn timezone(&self) -> Result<Tz> {
        self.timezone
            .trim()
            .parse::<Tz>()
            .map_err(|err| AppError::Timezone(format!("{}: {err}", self.timezone)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum HistoryKind {
    #[default]
    All,
    Purchases,
    Donations,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the guided purchase -> donation flow (default).
    Flow,
    /// Record a purchase outside the guided flow.
    Purchase {
        #[arg(allow_hyphen_values = true)]
        amount: String,
        /// Optional note (defaults to "Manual entry").
        #[arg(long)]
        note: Option<String>,
    },
    /// Record a donation of any amount outside the guided flow.
    Donate {
        #[arg(allow_hyphen_values = true)]
        amount: String,
        /// Campaign name, or "Other" together with `--other`.
        #[arg(long)]
        campaign: String,
        /// Name of an unlisted campaign.
        #[arg(long)]
        other: Option<String>,
    },
    /// Show total purchases and donations.
    Totals,
    /// List recorded purchases and/or donations.
    History {
        #[arg(value_enum, default_value_t = HistoryKind::All)]
        kind: HistoryKind,
    },
    /// List the campaigns a donation can go to.
    Campaigns,
    /// Erase every recorded purchase and donation.
    Clear {
        /// Required confirmation.
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Parser)]
#[command(
    name = "shop_for_progress",
    about = "Track non-essential purchases and the donations they inspire"
)]
struct Args {
    /// Optional config file path (TOML).
    #[arg(long)]
    config: Option<String>,
    /// Override the ledger file path.
    #[arg(long)]
    data_path: Option<String>,
    /// Override timezone (IANA name).
    #[arg(long)]
    timezone: Option<String>,
    /// Override log level (error, warn, info, debug, trace).
    #[arg(long)]
    level: Option<String>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug)]
pub struct Settings {
    pub config: AppConfig,
    pub command: Command,
}

pub fn load() -> Result<Settings> {
    let args = Args::parse();

    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix("SHOP_FOR_PROGRESS"));
    let mut config: AppConfig = builder.build()?.try_deserialize()?;

    if let Some(data_path) = args.data_path {
        config.data_path = data_path;
    }
    if let Some(timezone) = args.timezone {
        config.timezone = timezone;
    }
    if let Some(level) = args.level {
        config.level = level;
    }

    Ok(Settings {
        config,
        command: args.command.unwrap_or(Command::Flow),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_builtin_directory_and_utc() {
        let config = AppConfig::default();
        assert_eq!(config.directory().unwrap(), CampaignDirectory::default());
        assert_eq!(config.timezone().unwrap(), chrono_tz::UTC);
    }

    #[test]
    fn custom_campaigns_replace_builtin_list() {
        let config = AppConfig {
            campaigns: vec![Campaign::new("Local PAC", "Neighborhood organizing", None)],
            ..AppConfig::default()
        };
        let directory = config.directory().unwrap();
        let names: Vec<_> = directory.entries().map(|c| c.name.clone()).collect();
        assert_eq!(names, ["Local PAC", "Other"]);
    }

    #[test]
    fn invalid_timezone_is_reported() {
        let config = AppConfig {
            timezone: "Mars/Olympus".to_string(),
            ..AppConfig::default()
        };
        assert!(matches!(config.timezone(), Err(AppError::Timezone(_))));
    }

    #[test]
    fn negative_amounts_reach_the_engine() {
        let args = Args::try_parse_from(["shop_for_progress", "purchase", "-5"]).unwrap();
        assert!(matches!(
            args.command,
            Some(Command::Purchase { ref amount, .. }) if amount == "-5"
        ));
    }

    #[test]
    fn donate_parses_other_campaign() {
        let args = Args::try_parse_from([
            "shop_for_progress",
            "donate",
            "10",
            "--campaign",
            "Other",
            "--other",
            "Local PAC",
        ])
        .unwrap();
        let Some(Command::Donate {
            amount,
            campaign,
            other,
        }) = args.command
        else {
            panic!("expected donate command");
        };
        assert_eq!(amount, "10");
        assert_eq!(campaign, "Other");
        assert_eq!(other.as_deref(), Some("Local PAC"));
    }
}
