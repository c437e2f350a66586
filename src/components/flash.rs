//! Fades and removes server-rendered flash messages after a delay

use crate::constants::FLASH_MESSAGE_SELECTOR;
use crate::dom::{NodeId, Selector};
use crate::error::Result;
use crate::page::Page;
use crate::types::Config;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct FlashDismisser {
    fade_delay: Duration,
    remove_delay: Duration,
}

impl FlashDismisser {
    pub fn new(config: &Config) -> Self {
        FlashDismisser {
            fade_delay: config.flash_fade_delay(),
            remove_delay: config.flash_remove_delay(),
        }
    }

    /// Schedule fade-then-remove for every flash message present right now.
    /// Messages added later are not tracked.
    pub fn install(&self, page: &Page) -> Result<usize> {
        let selector = Selector::parse(FLASH_MESSAGE_SELECTOR)?;
        let messages = page.with_document(|doc| doc.query_selector_all(&selector));

        for &message in &messages {
            page.spawn(dismiss(
                page.clone(),
                message,
                self.fade_delay,
                self.remove_delay,
            ));
        }

        tracing::debug!("Scheduled dismissal of {} flash messages", messages.len());
        Ok(messages.len())
    }
}

// Fade and removal are one chained sequence, so fade always comes first
async fn dismiss(page: Page, message: NodeId, fade_delay: Duration, remove_delay: Duration) {
    tokio::time::sleep(fade_delay).await;

    let faded = page.with_document(|doc| {
        if !doc.is_connected(message) {
            return false;
        }
        doc.set_style(message, "opacity", "0");
        true
    });
    if !faded {
        tracing::debug!("Flash message {:?} already gone, skipping", message);
        return;
    }

    tokio::time::sleep(remove_delay).await;

    page.with_document(|doc| doc.remove(message));
    tracing::debug!("Flash message {:?} removed", message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::HeadlessNotifier;
    use std::sync::Arc;

    const PAGE: &str = r#"<html><body>
        <div class="flash-messages">
            <div class="flash-message success">Exam added!</div>
            <div class="flash-message error">Upload failed</div>
        </div>
        <main>Dashboard</main>
    </body></html>"#;

    fn setup() -> (Page, Vec<NodeId>) {
        let page = Page::from_html(PAGE, Arc::new(HeadlessNotifier::unsupported()));
        let selector = Selector::parse(".flash-message").unwrap();
        let messages = page.with_document(|doc| doc.query_selector_all(&selector));
        (page, messages)
    }

    async fn sleep_ms(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_fade_then_remove_timing() {
        let (page, messages) = setup();
        let scheduled = FlashDismisser::new(&Config::default()).install(&page).unwrap();
        assert_eq!(scheduled, 2);

        sleep_ms(4999).await;
        page.with_document(|doc| {
            for &m in &messages {
                assert_eq!(doc.style(m, "opacity"), "");
            }
        });

        // t = 5001
        sleep_ms(2).await;
        page.with_document(|doc| {
            for &m in &messages {
                assert_eq!(doc.style(m, "opacity"), "0");
                assert!(doc.is_connected(m));
            }
        });

        // t = 5299
        sleep_ms(298).await;
        page.with_document(|doc| assert!(messages.iter().all(|&m| doc.is_connected(m))));

        // t = 5301
        sleep_ms(2).await;
        page.with_document(|doc| {
            assert!(messages.iter().all(|&m| !doc.is_connected(m)));
            assert!(!doc.to_html().contains("Exam added!"));
            assert!(doc.to_html().contains("Dashboard"));
        });
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_flash_messages_is_noop() {
        let page = Page::from_html(
            "<html><body><p>Nothing to see</p></body></html>",
            Arc::new(HeadlessNotifier::unsupported()),
        );
        let scheduled = FlashDismisser::new(&Config::default()).install(&page).unwrap();
        assert_eq!(scheduled, 0);
        assert_eq!(page.active_tasks(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_message_removed_before_fade_is_skipped() {
        let (page, messages) = setup();
        FlashDismisser::new(&Config::default()).install(&page).unwrap();

        page.with_document(|doc| doc.remove(messages[0]));

        sleep_ms(6000).await;
        page.with_document(|doc| {
            assert_eq!(doc.style(messages[0], "opacity"), "");
            assert!(!doc.is_connected(messages[1]));
        });
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_delays() {
        let (page, messages) = setup();
        let config = Config {
            flash_fade_delay_ms: 100,
            flash_remove_delay_ms: 50,
            ..Config::default()
        };
        FlashDismisser::new(&config).install(&page).unwrap();

        sleep_ms(151).await;
        page.with_document(|doc| assert!(messages.iter().all(|&m| !doc.is_connected(m))));
    }
}
