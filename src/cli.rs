//! Command-line interface parsing and validation
//!
//! This module handles CLI argument parsing using clap and validates
//! user inputs for correctness.

use crate::constants::MAX_RUN_SECONDS;
use crate::dom::Selector;
use crate::types::Permission;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "exam-buddy")]
#[command(version = "0.0.1")]
#[command(about = "Run Exam Buddy's page scripts against a server-rendered page", long_about = None)]
pub struct Cli {
    /// Path to the HTML page to run
    pub file: String,

    /// How long to keep the page open, in seconds
    #[arg(short = 'd', long, value_name = "SECS", default_value_t = 6)]
    pub duration: u64,

    /// Click the first element matching SELECTOR after boot (repeatable, in order)
    #[arg(short = 'c', long = "click", value_name = "SELECTOR")]
    pub clicks: Vec<String>,

    /// Notification permission: default, granted, denied or unsupported
    #[arg(short = 'p', long, value_name = "STATE", default_value = "default")]
    pub permission: String,

    /// Grant notification permission when the page asks for it
    #[arg(long)]
    pub grant_on_request: bool,

    /// Config file to use instead of the one in the config directory
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Write the resulting HTML here instead of stdout
    #[arg(short = 'o', long, value_name = "PATH")]
    pub output: Option<String>,

    /// Enable logging to specified file
    #[arg(short = 'l', long, value_name = "PATH")]
    pub log_file: Option<String>,

    /// Seed for quote selection
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,
}

impl Cli {
    /// Validate CLI arguments
    pub fn validate(&self) -> Result<(), String> {
        if self.duration > MAX_RUN_SECONDS {
            return Err(format!(
                "Duration too long (maximum {} seconds)",
                MAX_RUN_SECONDS
            ));
        }

        self.permission_state()?;

        for selector in &self.clicks {
            Selector::parse(selector).map_err(|e| e.to_string())?;
        }

        Ok(())
    }

    /// Permission the simulated platform starts with; `None` means no
    /// notification support
    pub fn permission_state(&self) -> Result<Option<Permission>, String> {
        if self.permission.eq_ignore_ascii_case("unsupported") {
            return Ok(None);
        }
        self.permission.parse().map(Some)
    }

    /// What the simulated user answers to a permission prompt
    pub fn request_answer(&self) -> Permission {
        if self.grant_on_request {
            Permission::Granted
        } else {
            Permission::Denied
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("exam-buddy").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&["page.html"]);
        assert_eq!(cli.duration, 6);
        assert!(cli.clicks.is_empty());
        assert_eq!(cli.permission_state(), Ok(Some(Permission::Default)));
        assert_eq!(cli.request_answer(), Permission::Denied);
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_repeated_clicks_keep_order() {
        let cli = parse(&["page.html", "-c", ".user-menu-toggle", "--click", "#content"]);
        assert_eq!(cli.clicks, vec![".user-menu-toggle", "#content"]);
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_permission_states() {
        let cli = parse(&["page.html", "--permission", "unsupported", "--grant-on-request"]);
        assert_eq!(cli.permission_state(), Ok(None));
        assert_eq!(cli.request_answer(), Permission::Granted);

        let cli = parse(&["page.html", "-p", "sometimes"]);
        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_input() {
        let cli = parse(&["page.html", "--click", "a >"]);
        assert!(cli.validate().is_err());

        let cli = parse(&["page.html", "--duration", "100000"]);
        assert!(cli.validate().is_err());
    }
}
