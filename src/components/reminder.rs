//! Periodic study reminders through the notification platform
//!
//! Permission is checked once at boot. If it is undecided a request is
//! fired and not awaited; reminders only start when permission was already
//! granted at boot, unless `start_reminders_on_grant` is set.

use crate::page::Page;
use crate::types::{Config, Notification, Permission};
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};

/// What happened when the scheduler was installed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderSetup {
    /// No notification support on this platform
    Unsupported,
    /// Permission was undecided, a request is in flight
    PermissionRequested,
    /// Permission was granted, reminders are running
    Scheduled,
    Denied,
}

#[derive(Debug, Clone)]
pub struct ReminderScheduler {
    interval: Duration,
    notification: Notification,
    start_on_grant: bool,
}

impl ReminderScheduler {
    pub fn new(config: &Config) -> Self {
        ReminderScheduler {
            interval: config.reminder_interval(),
            notification: config.reminder_notification(),
            start_on_grant: config.start_reminders_on_grant,
        }
    }

    pub fn install(&self, page: &Page) -> ReminderSetup {
        let notifier = page.notifier();
        let Some(permission) = notifier.permission() else {
            tracing::debug!("Notifications unsupported, study reminders disabled");
            return ReminderSetup::Unsupported;
        };

        match permission {
            Permission::Default => {
                let scheduler = self.clone();
                let task_page = page.clone();
                page.spawn(async move {
                    match notifier.request_permission().await {
                        Ok(Permission::Granted) if scheduler.start_on_grant => {
                            tracing::info!("Notification permission granted, starting reminders");
                            scheduler.remind(task_page).await;
                        }
                        Ok(answer) => {
                            tracing::debug!("Notification permission request answered: {}", answer);
                        }
                        Err(e) => {
                            tracing::warn!("Notification permission request failed: {}", e);
                        }
                    }
                });
                ReminderSetup::PermissionRequested
            }
            Permission::Granted => {
                page.spawn(self.clone().remind(page.clone()));
                tracing::debug!("Study reminders every {:?}", self.interval);
                ReminderSetup::Scheduled
            }
            Permission::Denied => {
                tracing::debug!("Notification permission denied, study reminders disabled");
                ReminderSetup::Denied
            }
        }
    }

    // First reminder comes one full interval after start
    async fn remind(self, page: Page) {
        let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let notifier = page.notifier();
            if notifier.permission() != Some(Permission::Granted) {
                tracing::debug!("Permission revoked, skipping study reminder");
                continue;
            }
            if let Err(e) = notifier.show(&self.notification) {
                tracing::warn!("Failed to show study reminder: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{HeadlessNotifier, NotificationPlatform};
    use std::sync::Arc;

    const HALF_HOUR: Duration = Duration::from_secs(30 * 60);
    const PAGE: &str = "<html><body></body></html>";

    fn setup(permission: Option<Permission>, answer: Option<Permission>) -> (Page, Arc<HeadlessNotifier>) {
        let notifier = Arc::new(HeadlessNotifier::new(permission, answer));
        let page = Page::from_html(PAGE, notifier.clone());
        (page, notifier)
    }

    #[tokio::test(start_paused = true)]
    async fn test_granted_fires_every_half_hour() {
        let (page, notifier) = setup(Some(Permission::Granted), None);
        let setup = ReminderScheduler::new(&Config::default()).install(&page);
        assert_eq!(setup, ReminderSetup::Scheduled);
        assert_eq!(notifier.request_count(), 0);

        tokio::time::sleep(HALF_HOUR - Duration::from_millis(1)).await;
        assert!(notifier.shown().is_empty());

        tokio::time::sleep(Duration::from_millis(2)).await;
        let shown = notifier.shown();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].title, "Study Reminder");
        assert_eq!(shown[0].body, "Time to get back to studying! 📚");
        assert_eq!(shown[0].icon, "/static/favicon.ico");

        tokio::time::sleep(HALF_HOUR * 2).await;
        assert_eq!(notifier.shown().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_requests_once_without_scheduling() {
        let (page, notifier) = setup(Some(Permission::Default), Some(Permission::Granted));
        let setup = ReminderScheduler::new(&Config::default()).install(&page);
        assert_eq!(setup, ReminderSetup::PermissionRequested);

        tokio::time::sleep(HALF_HOUR * 3).await;
        assert_eq!(notifier.request_count(), 1);
        assert_eq!(notifier.permission(), Some(Permission::Granted));
        assert!(notifier.shown().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_on_grant_closes_the_gap() {
        let (page, notifier) = setup(Some(Permission::Default), Some(Permission::Granted));
        let config = Config {
            start_reminders_on_grant: true,
            ..Config::default()
        };
        ReminderScheduler::new(&config).install(&page);

        tokio::time::sleep(HALF_HOUR + Duration::from_millis(1)).await;
        assert_eq!(notifier.request_count(), 1);
        assert_eq!(notifier.shown().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_on_grant_respects_refusal() {
        let (page, notifier) = setup(Some(Permission::Default), Some(Permission::Denied));
        let config = Config {
            start_reminders_on_grant: true,
            ..Config::default()
        };
        ReminderScheduler::new(&config).install(&page);

        tokio::time::sleep(HALF_HOUR * 2).await;
        assert!(notifier.shown().is_empty());
        assert_eq!(page.active_tasks(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_denied_and_unsupported_do_nothing() {
        let (page, notifier) = setup(Some(Permission::Denied), None);
        assert_eq!(
            ReminderScheduler::new(&Config::default()).install(&page),
            ReminderSetup::Denied
        );

        let (unsupported_page, unsupported) = setup(None, None);
        assert_eq!(
            ReminderScheduler::new(&Config::default()).install(&unsupported_page),
            ReminderSetup::Unsupported
        );

        tokio::time::sleep(HALF_HOUR * 2).await;
        assert_eq!(notifier.request_count(), 0);
        assert_eq!(unsupported.request_count(), 0);
        assert!(notifier.shown().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_reminder_keeps_schedule() {
        let (page, notifier) = setup(Some(Permission::Granted), None);
        ReminderScheduler::new(&Config::default()).install(&page);

        notifier.set_fail_show(true);
        tokio::time::sleep(HALF_HOUR + Duration::from_millis(1)).await;
        assert!(notifier.shown().is_empty());

        notifier.set_fail_show(false);
        tokio::time::sleep(HALF_HOUR).await;
        assert_eq!(notifier.shown().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_revoked_permission_skips_reminders() {
        let (page, notifier) = setup(Some(Permission::Granted), None);
        ReminderScheduler::new(&Config::default()).install(&page);

        notifier.set_permission(Some(Permission::Denied));
        tokio::time::sleep(HALF_HOUR * 2 + Duration::from_millis(1)).await;
        assert!(notifier.shown().is_empty());
        assert_eq!(page.active_tasks(), 1);
    }
}
