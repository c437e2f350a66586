//! Rotating motivational quotes on the dashboard

use crate::constants::{QUOTE_AUTHOR_ID, QUOTE_TEXT_ID};
use crate::dom::NodeId;
use crate::error::{AppError, Result};
use crate::page::Page;
use crate::types::{Config, Quote};
use rand::Rng;
use rand::rngs::StdRng;
use std::time::Duration;
use tokio::time::Instant;

/// Picks a random quote on start and again every interval. Picks are
/// independent, so the same quote can show twice in a row.
pub struct QuoteRotator {
    quotes: Vec<Quote>,
    text_target: NodeId,
    author_target: NodeId,
    interval: Duration,
    rng: StdRng,
}

impl QuoteRotator {
    /// Fails when either output element is missing from the page
    pub fn new(page: &Page, config: &Config, rng: StdRng) -> Result<Self> {
        let (text_target, author_target) = page.with_document(|doc| {
            (
                doc.get_element_by_id(QUOTE_TEXT_ID),
                doc.get_element_by_id(QUOTE_AUTHOR_ID),
            )
        });

        let text_target =
            text_target.ok_or_else(|| AppError::ElementNotFound(format!("#{}", QUOTE_TEXT_ID)))?;
        let author_target = author_target
            .ok_or_else(|| AppError::ElementNotFound(format!("#{}", QUOTE_AUTHOR_ID)))?;

        let quotes = config.quote_list();
        if quotes.is_empty() {
            return Err(AppError::Config("quote list is empty".to_string()));
        }

        Ok(QuoteRotator {
            quotes,
            text_target,
            author_target,
            interval: config.quote_interval(),
            rng,
        })
    }

    pub fn quotes(&self) -> &[Quote] {
        &self.quotes
    }

    pub fn pick(&mut self) -> Quote {
        let idx = self.rng.random_range(0..self.quotes.len());
        self.quotes[idx].clone()
    }

    pub fn display_random_quote(&mut self, page: &Page) -> Quote {
        let quote = self.pick();
        page.with_document(|doc| {
            doc.set_text_content(self.text_target, &quote.display_text());
            doc.set_text_content(self.author_target, &quote.display_author());
        });
        quote
    }

    /// Show a quote now, then keep rotating for the life of the page
    pub fn start(mut self, page: &Page) {
        let first = self.display_random_quote(page);
        tracing::debug!("Showing quote by {}", first.author);

        let task_page = page.clone();
        page.spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
            loop {
                ticker.tick().await;
                self.display_random_quote(&task_page);
            }
        });
    }
}
