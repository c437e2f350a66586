pub mod flash;
pub mod progress;
pub mod quotes;
pub mod reminder;
pub mod user_menu;

pub use flash::FlashDismisser;
pub use progress::ProgressAnimator;
pub use quotes::QuoteRotator;
pub use reminder::{ReminderScheduler, ReminderSetup};
pub use user_menu::UserMenu;
