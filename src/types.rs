use crate::constants::{
    FLASH_FADE_DELAY_MS, FLASH_REMOVE_DELAY_MS, MIN_TIMER_MS, PROGRESS_RESTORE_DELAY_MS,
    PROGRESS_TRANSITION, QUOTE_INTERVAL_MS, REMINDER_BODY, REMINDER_ICON, REMINDER_INTERVAL_MS,
    REMINDER_TITLE, USER_MENU_TRIGGER_SELECTOR,
};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub text: String,
    pub author: String,
}

impl Quote {
    pub fn new(text: &str, author: &str) -> Self {
        Quote {
            text: text.to_string(),
            author: author.to_string(),
        }
    }

    /// Text as rendered into the quote text target
    pub fn display_text(&self) -> String {
        format!("\"{}\"", self.text)
    }

    /// Author line as rendered into the quote author target
    pub fn display_author(&self) -> String {
        format!("- {}", self.author)
    }
}

lazy_static! {
    /// Motivational quotes shown on the dashboard
    pub static ref DEFAULT_QUOTES: Vec<Quote> = vec![
        Quote::new(
            "Success is not the key to happiness. Happiness is the key to success.",
            "Albert Schweitzer",
        ),
        Quote::new(
            "The only way to do great work is to love what you do.",
            "Steve Jobs",
        ),
        Quote::new("You miss 100% of the shots you don't take.", "Wayne Gretzky"),
        Quote::new(
            "Education is the most powerful weapon which you can use to change the world.",
            "Nelson Mandela",
        ),
        Quote::new(
            "The future belongs to those who believe in the beauty of their dreams.",
            "Eleanor Roosevelt",
        ),
        Quote::new(
            "It is during our darkest moments that we must focus to see the light.",
            "Aristotle",
        ),
        Quote::new(
            "Success is not final, failure is not fatal: it is the courage to continue that counts.",
            "Winston Churchill",
        ),
        Quote::new(
            "The way to get started is to quit talking and begin doing.",
            "Walt Disney",
        ),
        Quote::new("Don't let yesterday take up too much of today.", "Will Rogers"),
        Quote::new("You learn more from failure than from success.", "Unknown"),
        Quote::new(
            "If you are working on something exciting, you don't have to be pushed.",
            "Steve Jobs",
        ),
        Quote::new(
            "Success is walking from failure to failure with no loss of enthusiasm.",
            "Winston Churchill",
        ),
    ];
}

/// Notification permission as reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Default,
    Granted,
    Denied,
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Permission::Default => "default",
            Permission::Granted => "granted",
            Permission::Denied => "denied",
        };
        f.write_str(name)
    }
}

impl FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(Permission::Default),
            "granted" => Ok(Permission::Granted),
            "denied" => Ok(Permission::Denied),
            other => Err(format!("Unknown permission state: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub flash_fade_delay_ms: u64,
    pub flash_remove_delay_ms: u64,
    pub progress_restore_delay_ms: u64,
    pub progress_transition: String,
    pub quote_interval_ms: u64,
    /// Replaces the built-in quotes when non-empty
    pub quotes: Vec<Quote>,
    pub reminder_interval_ms: u64,
    pub reminder_title: String,
    pub reminder_body: String,
    pub reminder_icon: String,
    /// Start reminders as soon as a permission request made during boot is granted,
    /// instead of waiting for the next page load
    pub start_reminders_on_grant: bool,
    pub user_menu_trigger: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            flash_fade_delay_ms: FLASH_FADE_DELAY_MS,
            flash_remove_delay_ms: FLASH_REMOVE_DELAY_MS,
            progress_restore_delay_ms: PROGRESS_RESTORE_DELAY_MS,
            progress_transition: PROGRESS_TRANSITION.to_string(),
            quote_interval_ms: QUOTE_INTERVAL_MS,
            quotes: Vec::new(),
            reminder_interval_ms: REMINDER_INTERVAL_MS,
            reminder_title: REMINDER_TITLE.to_string(),
            reminder_body: REMINDER_BODY.to_string(),
            reminder_icon: REMINDER_ICON.to_string(),
            start_reminders_on_grant: false,
            user_menu_trigger: USER_MENU_TRIGGER_SELECTOR.to_string(),
        }
    }
}

impl Config {
    /// Clamp timers to their minimum and restore blank strings to defaults
    pub fn validated(mut self) -> Self {
        let defaults = Config::default();

        self.flash_fade_delay_ms = self.flash_fade_delay_ms.max(MIN_TIMER_MS);
        self.flash_remove_delay_ms = self.flash_remove_delay_ms.max(MIN_TIMER_MS);
        self.progress_restore_delay_ms = self.progress_restore_delay_ms.max(MIN_TIMER_MS);
        self.quote_interval_ms = self.quote_interval_ms.max(MIN_TIMER_MS);
        self.reminder_interval_ms = self.reminder_interval_ms.max(MIN_TIMER_MS);

        if self.reminder_title.trim().is_empty() {
            self.reminder_title = defaults.reminder_title;
        }
        if self.user_menu_trigger.trim().is_empty() {
            self.user_menu_trigger = defaults.user_menu_trigger;
        }
        self.quotes
            .retain(|q| !q.text.trim().is_empty() && !q.author.trim().is_empty());

        self
    }

    /// Quotes the rotator draws from
    pub fn quote_list(&self) -> Vec<Quote> {
        if self.quotes.is_empty() {
            DEFAULT_QUOTES.clone()
        } else {
            self.quotes.clone()
        }
    }

    pub fn reminder_notification(&self) -> Notification {
        Notification {
            title: self.reminder_title.clone(),
            body: self.reminder_body.clone(),
            icon: self.reminder_icon.clone(),
        }
    }

    pub fn flash_fade_delay(&self) -> Duration {
        Duration::from_millis(self.flash_fade_delay_ms)
    }

    pub fn flash_remove_delay(&self) -> Duration {
        Duration::from_millis(self.flash_remove_delay_ms)
    }

    pub fn progress_restore_delay(&self) -> Duration {
        Duration::from_millis(self.progress_restore_delay_ms)
    }

    pub fn quote_interval(&self) -> Duration {
        Duration::from_millis(self.quote_interval_ms)
    }

    pub fn reminder_interval(&self) -> Duration {
        Duration::from_millis(self.reminder_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_constants() {
        let config = Config::default();
        assert_eq!(config.flash_fade_delay(), Duration::from_millis(5000));
        assert_eq!(config.flash_remove_delay(), Duration::from_millis(300));
        assert_eq!(config.progress_restore_delay(), Duration::from_millis(500));
        assert_eq!(config.quote_interval(), Duration::from_secs(10));
        assert_eq!(config.reminder_interval(), Duration::from_secs(30 * 60));
        assert!(!config.start_reminders_on_grant);
    }

    #[test]
    fn test_validated_clamps_zero_timers() {
        let config = Config {
            quote_interval_ms: 0,
            reminder_interval_ms: 0,
            ..Config::default()
        }
        .validated();
        assert_eq!(config.quote_interval_ms, MIN_TIMER_MS);
        assert_eq!(config.reminder_interval_ms, MIN_TIMER_MS);
    }

    #[test]
    fn test_quote_list_falls_back_to_defaults() {
        let config = Config {
            quotes: vec![Quote::new("  ", "Nobody")],
            ..Config::default()
        }
        .validated();
        assert_eq!(config.quote_list().len(), 12);

        let custom = Config {
            quotes: vec![Quote::new("Keep going.", "Me")],
            ..Config::default()
        };
        assert_eq!(custom.quote_list(), vec![Quote::new("Keep going.", "Me")]);
    }

    #[test]
    fn test_quote_display() {
        let quote = Quote::new("Learn.", "Someone");
        assert_eq!(quote.display_text(), "\"Learn.\"");
        assert_eq!(quote.display_author(), "- Someone");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"quote_interval_ms": 2000}"#).unwrap();
        assert_eq!(config.quote_interval_ms, 2000);
        assert_eq!(config.flash_fade_delay_ms, FLASH_FADE_DELAY_MS);
        assert_eq!(config.reminder_title, REMINDER_TITLE);
    }

    #[test]
    fn test_permission_parsing() {
        assert_eq!("Granted".parse::<Permission>(), Ok(Permission::Granted));
        assert_eq!("default".parse::<Permission>(), Ok(Permission::Default));
        assert!("maybe".parse::<Permission>().is_err());
        assert_eq!(Permission::Denied.to_string(), "denied");
    }
}
