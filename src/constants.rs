//! Page-wide constants shared with the server-rendered templates

/// Delay before a flash message starts fading out
pub const FLASH_FADE_DELAY_MS: u64 = 5000;

/// Delay between the fade and removing the flash message from the document
pub const FLASH_REMOVE_DELAY_MS: u64 = 300;

/// Delay before a progress bar is restored to its target width
pub const PROGRESS_RESTORE_DELAY_MS: u64 = 500;

/// Transition applied to progress bars when they are restored
pub const PROGRESS_TRANSITION: &str = "width 1s ease-in-out";

/// Width progress bars are reset to before animating
pub const PROGRESS_START_WIDTH: &str = "0%";

/// How often the quote rotator picks a new quote
pub const QUOTE_INTERVAL_MS: u64 = 10_000;

/// Period of the study reminder notification (30 minutes)
pub const REMINDER_INTERVAL_MS: u64 = 30 * 60 * 1000;

pub const REMINDER_TITLE: &str = "Study Reminder";
pub const REMINDER_BODY: &str = "Time to get back to studying! 📚";
pub const REMINDER_ICON: &str = "/static/favicon.ico";

/// Lower bound for every configurable delay or interval
pub const MIN_TIMER_MS: u64 = 1;

// Selectors and ids the server templates render
pub const FLASH_MESSAGE_SELECTOR: &str = ".flash-message";
pub const PROGRESS_FILL_SELECTOR: &str = ".progress-fill";
pub const USER_MENU_SELECTOR: &str = ".user-menu";
pub const USER_MENU_TRIGGER_SELECTOR: &str = r#".user-menu-toggle, [onclick="toggleUserMenu()"]"#;
pub const USER_DROPDOWN_ID: &str = "userDropdown";
pub const QUOTE_TEXT_ID: &str = "quote-text";
pub const QUOTE_AUTHOR_ID: &str = "quote-author";

/// Class marking the dropdown as open
pub const ACTIVE_CLASS: &str = "active";

/// Longest run the CLI accepts, in seconds
pub const MAX_RUN_SECONDS: u64 = 24 * 60 * 60;
