//! CLI argument definitions using clap derive macros.

use clap::Parser;

use valopro_core::SettingsOverrides;
use valopro_core::config::MAX_MINUTES;

/// Discord bot for the pro Valorant match schedule.
///
/// Reads DISCORD_TOKEN, ALERT_CHANNEL_ID, ALERT_LEAD_MINUTES,
/// ALERT_INTERVAL_MINUTES and VLR_API_BASE from the environment (or .env).
/// Flags below override the environment.
#[derive(Parser, Debug)]
#[command(name = "valopro")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Match API base URL (overrides VLR_API_BASE)
    #[arg(long, value_name = "URL")]
    pub api_base: Option<String>,

    /// Minutes before start when an alert may fire (0-1440)
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(0..=MAX_MINUTES))]
    pub alert_lead_minutes: Option<u64>,

    /// Minutes between alert checks (1-1440)
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..=MAX_MINUTES))]
    pub alert_interval_minutes: Option<u64>,

    /// Skip registering slash commands when the bot connects
    #[arg(long)]
    pub no_command_sync: bool,
}

impl Args {
    /// Default log filter when RUST_LOG is unset.
    pub fn default_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "info",
                1 => "debug",
                _ => "trace",
            }
        }
    }

    pub fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            api_base: self.api_base.clone(),
            alert_lead_minutes: self.alert_lead_minutes,
            alert_interval_minutes: self.alert_interval_minutes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_args_parses_successfully() {
        let args = Args::try_parse_from(["valopro"]).unwrap();
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
        assert!(!args.no_command_sync);
        assert_eq!(args.overrides(), SettingsOverrides::default());
        assert_eq!(args.default_log_level(), "info");
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let args = Args::try_parse_from(["valopro", "-v"]).unwrap();
        assert_eq!(args.default_log_level(), "debug");

        let args = Args::try_parse_from(["valopro", "-vv"]).unwrap();
        assert_eq!(args.verbose, 2);
        assert_eq!(args.default_log_level(), "trace");
    }

    #[test]
    fn test_cli_quiet_wins_over_verbose() {
        let args = Args::try_parse_from(["valopro", "-q", "-vv"]).unwrap();
        assert_eq!(args.default_log_level(), "error");
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        let err = Args::try_parse_from(["valopro", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_cli_version_flag_shows_version() {
        let err = Args::try_parse_from(["valopro", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_cli_invalid_flag_returns_error() {
        let err = Args::try_parse_from(["valopro", "--invalid-flag"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_cli_overrides_are_collected() {
        let args = Args::try_parse_from([
            "valopro",
            "--api-base",
            "http://localhost:9000",
            "--alert-lead-minutes",
            "0",
            "--alert-interval-minutes",
            "1440",
            "--no-command-sync",
        ])
        .unwrap();
        assert!(args.no_command_sync);
        assert_eq!(
            args.overrides(),
            SettingsOverrides {
                api_base: Some("http://localhost:9000".to_string()),
                alert_lead_minutes: Some(0),
                alert_interval_minutes: Some(1440),
            }
        );
    }

    #[test]
    fn test_cli_interval_zero_rejected() {
        let err = Args::try_parse_from(["valopro", "--alert-interval-minutes", "0"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_lead_over_max_rejected() {
        let err = Args::try_parse_from(["valopro", "--alert-lead-minutes", "1441"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }
}
