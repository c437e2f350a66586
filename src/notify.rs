//! Desktop notification platform
//!
//! The page only ever reads and requests permission; the platform owns it.

use crate::error::{AppError, Result};
use crate::types::{Notification, Permission};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

#[async_trait]
pub trait NotificationPlatform: Send + Sync {
    /// Current permission, or `None` when the platform has no notification support
    fn permission(&self) -> Option<Permission>;

    /// Ask the user for permission. Resolves with the resulting state.
    async fn request_permission(&self) -> Result<Permission>;

    fn show(&self, notification: &Notification) -> Result<()>;
}

/// In-process platform: permission is scripted and shown notifications are
/// logged and recorded
pub struct HeadlessNotifier {
    permission: Mutex<Option<Permission>>,
    /// What the simulated user answers; `None` makes the request fail
    answer: Option<Permission>,
    requests: AtomicUsize,
    shown: Mutex<Vec<Notification>>,
    fail_show: AtomicBool,
}

impl HeadlessNotifier {
    pub fn new(permission: Option<Permission>, answer: Option<Permission>) -> Self {
        HeadlessNotifier {
            permission: Mutex::new(permission),
            answer,
            requests: AtomicUsize::new(0),
            shown: Mutex::new(Vec::new()),
            fail_show: AtomicBool::new(false),
        }
    }

    /// Platform without notification support
    pub fn unsupported() -> Self {
        Self::new(None, None)
    }

    pub fn set_permission(&self, permission: Option<Permission>) {
        *self.permission.lock().unwrap_or_else(PoisonError::into_inner) = permission;
    }

    /// Make every subsequent `show` call fail
    pub fn set_fail_show(&self, fail: bool) {
        self.fail_show.store(fail, Ordering::SeqCst);
    }

    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn shown(&self) -> Vec<Notification> {
        self.shown
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl NotificationPlatform for HeadlessNotifier {
    fn permission(&self) -> Option<Permission> {
        *self.permission.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn request_permission(&self) -> Result<Permission> {
        self.requests.fetch_add(1, Ordering::SeqCst);

        let mut permission = self.permission.lock().unwrap_or_else(PoisonError::into_inner);
        let current = permission.ok_or_else(|| {
            AppError::PermissionRequest("notifications are not supported".to_string())
        })?;

        // Only an undecided permission can change
        if current != Permission::Default {
            return Ok(current);
        }

        let answer = self.answer.ok_or_else(|| {
            AppError::PermissionRequest("permission prompt was dismissed".to_string())
        })?;
        *permission = Some(answer);
        tracing::info!("Notification permission changed: {} -> {}", current, answer);

        Ok(answer)
    }

    fn show(&self, notification: &Notification) -> Result<()> {
        if self.permission() != Some(Permission::Granted) {
            return Err(AppError::Notification(
                "permission has not been granted".to_string(),
            ));
        }
        if self.fail_show.load(Ordering::SeqCst) {
            return Err(AppError::Notification(
                "notification service unavailable".to_string(),
            ));
        }

        tracing::info!(
            title = %notification.title,
            body = %notification.body,
            icon = %notification.icon,
            "Notification shown"
        );
        self.shown
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification.clone());

        Ok(())
    }
}
