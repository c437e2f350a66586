//! Replays the fill animation of progress bars after page load

use crate::constants::{PROGRESS_FILL_SELECTOR, PROGRESS_START_WIDTH};
use crate::dom::{NodeId, Selector};
use crate::error::Result;
use crate::page::Page;
use crate::types::Config;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ProgressAnimator {
    restore_delay: Duration,
    transition: String,
}

impl ProgressAnimator {
    pub fn new(config: &Config) -> Self {
        ProgressAnimator {
            restore_delay: config.progress_restore_delay(),
            transition: config.progress_transition.clone(),
        }
    }

    /// Reset every progress bar to empty and schedule the restore of its
    /// server-rendered width
    pub fn install(&self, page: &Page) -> Result<usize> {
        let selector = Selector::parse(PROGRESS_FILL_SELECTOR)?;

        let bars: Vec<(NodeId, String)> = page.with_document(|doc| {
            doc.query_selector_all(&selector)
                .into_iter()
                .map(|bar| {
                    let width = doc.style(bar, "width");
                    doc.set_style(bar, "width", PROGRESS_START_WIDTH);
                    (bar, width)
                })
                .collect()
        });

        for (bar, width) in &bars {
            page.spawn(restore(
                page.clone(),
                *bar,
                width.clone(),
                self.restore_delay,
                self.transition.clone(),
            ));
        }

        tracing::debug!("Animating {} progress bars", bars.len());
        Ok(bars.len())
    }
}

async fn restore(page: Page, bar: NodeId, width: String, delay: Duration, transition: String) {
    tokio::time::sleep(delay).await;

    page.with_document(|doc| {
        // An unset width stays at the start width
        if !width.is_empty() {
            doc.set_style(bar, "width", &width);
        }
        doc.set_style(bar, "transition", &transition);
    });
}
