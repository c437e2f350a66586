use crate::components::{
    FlashDismisser, ProgressAnimator, QuoteRotator, ReminderScheduler, ReminderSetup, UserMenu,
};
use crate::page::Page;
use crate::types::Config;
use rand::rngs::StdRng;

/// What each page script did at boot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootReport {
    pub flash_messages: usize,
    pub progress_bars: usize,
    pub reminders: ReminderSetup,
    pub quotes_running: bool,
    pub menu_triggers: usize,
}

/// The page scripts running against one page. Dropping it unloads the page.
pub struct App {
    page: Page,
    config: Config,
    report: BootReport,
}

impl App {
    /// Install every page script, the equivalent of `DOMContentLoaded`.
    /// A script that cannot start is logged and skipped; the others still run.
    /// Must be called inside a tokio runtime.
    pub fn boot(page: Page, config: Config, rng: StdRng) -> Self {
        tracing::info!("Booting page scripts");

        let flash_messages = FlashDismisser::new(&config)
            .install(&page)
            .unwrap_or_else(|e| {
                tracing::warn!("Flash message dismisser disabled: {}", e);
                0
            });

        let reminders = ReminderScheduler::new(&config).install(&page);

        let progress_bars = ProgressAnimator::new(&config)
            .install(&page)
            .unwrap_or_else(|e| {
                tracing::warn!("Progress animator disabled: {}", e);
                0
            });

        let quotes_running = match QuoteRotator::new(&page, &config, rng) {
            Ok(rotator) => {
                rotator.start(&page);
                true
            }
            Err(e) => {
                tracing::debug!("Quote rotator not started: {}", e);
                false
            }
        };

        let menu_triggers = match UserMenu::new(&config) {
            Ok(menu) => menu.install(&page),
            Err(e) => {
                tracing::warn!("User menu disabled: {}", e);
                0
            }
        };

        let report = BootReport {
            flash_messages,
            progress_bars,
            reminders,
            quotes_running,
            menu_triggers,
        };
        tracing::info!(
            "Page scripts running: {} flash messages, {} progress bars, reminders {:?}, quotes {}, {} menu triggers",
            report.flash_messages,
            report.progress_bars,
            report.reminders,
            report.quotes_running,
            report.menu_triggers
        );

        App {
            page,
            config,
            report,
        }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn report(&self) -> &BootReport {
        &self.report
    }

    /// Unload the page: every timer stops
    pub fn shutdown(&self) {
        tracing::info!("Unloading page");
        self.page.shutdown();
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.page.shutdown();
    }
}
