//! Shared page context: the document, click listeners, the notification
//! platform and every timer task the page scripts spawn.

use crate::dom::{Document, NodeId, Selector};
use crate::error::{AppError, Result};
use crate::notify::NotificationPlatform;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;

/// Where a click listener is attached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerTarget {
    Document,
    Element(NodeId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickEvent {
    /// Node the click landed on
    pub target: NodeId,
}

pub type ClickListener = Arc<dyn Fn(&mut Document, &ClickEvent) + Send + Sync>;

struct PageInner {
    document: Mutex<Document>,
    listeners: Mutex<Vec<(ListenerTarget, ClickListener)>>,
    notifier: Arc<dyn NotificationPlatform>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

/// Cheap to clone; all clones share one page
#[derive(Clone)]
pub struct Page {
    inner: Arc<PageInner>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Page {
    pub fn new(document: Document, notifier: Arc<dyn NotificationPlatform>) -> Self {
        Page {
            inner: Arc::new(PageInner {
                document: Mutex::new(document),
                listeners: Mutex::new(Vec::new()),
                notifier,
                tasks: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn from_html(html: &str, notifier: Arc<dyn NotificationPlatform>) -> Self {
        Self::new(Document::parse(html), notifier)
    }

    /// Run a closure against the document. Never hold this across an `.await`.
    pub fn with_document<R>(&self, f: impl FnOnce(&mut Document) -> R) -> R {
        f(&mut *lock(&self.inner.document))
    }

    pub fn notifier(&self) -> Arc<dyn NotificationPlatform> {
        Arc::clone(&self.inner.notifier)
    }

    pub fn add_click_listener(&self, target: ListenerTarget, listener: ClickListener) {
        lock(&self.inner.listeners).push((target, listener));
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.inner.listeners).len()
    }

    /// Click the first element matching `selector`
    pub fn click(&self, selector: &str) -> Result<()> {
        let parsed = Selector::parse(selector)?;
        let target = self
            .with_document(|doc| doc.query_selector(&parsed))
            .ok_or_else(|| AppError::ElementNotFound(selector.to_string()))?;
        self.click_node(target);
        Ok(())
    }

    /// Dispatch a click: listeners on the target and then each ancestor, then
    /// document listeners
    pub fn click_node(&self, target: NodeId) {
        let listeners = lock(&self.inner.listeners).clone();
        let event = ClickEvent { target };

        let mut doc = lock(&self.inner.document);

        let mut path = Vec::new();
        let mut current = Some(target);
        while let Some(node) = current {
            if doc.is_element(node) {
                path.push(node);
            }
            current = doc.parent(node);
        }

        tracing::debug!("Click on {:?} bubbling through {} elements", target, path.len());

        for node in path {
            for (attached, listener) in &listeners {
                if *attached == ListenerTarget::Element(node) {
                    listener(&mut *doc, &event);
                }
            }
        }

        for (attached, listener) in &listeners {
            if *attached == ListenerTarget::Document {
                listener(&mut *doc, &event);
            }
        }
    }

    /// Spawn a timer task owned by the page
    pub fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(future);
        let mut tasks = lock(&self.inner.tasks);
        tasks.retain(|task| !task.is_finished());
        tasks.push(handle);
    }

    /// Number of timer tasks still running
    pub fn active_tasks(&self) -> usize {
        lock(&self.inner.tasks)
            .iter()
            .filter(|task| !task.is_finished())
            .count()
    }

    /// Page unload: abort every timer
    pub fn shutdown(&self) {
        let tasks: Vec<_> = lock(&self.inner.tasks).drain(..).collect();
        if !tasks.is_empty() {
            tracing::debug!("Aborting {} page tasks", tasks.len());
        }
        for task in tasks {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::HeadlessNotifier;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    const PAGE: &str = r#"<html><body>
        <div id="outer"><span id="inner">x</span></div>
        <p id="elsewhere">y</p>
    </body></html>"#;

    fn page() -> Page {
        Page::from_html(PAGE, Arc::new(HeadlessNotifier::unsupported()))
    }

    #[test]
    fn test_click_bubbles_to_ancestors_then_document() {
        let page = page();
        let order = Arc::new(Mutex::new(Vec::new()));
        let outer = page.with_document(|doc| doc.get_element_by_id("outer")).unwrap();
        let inner = page.with_document(|doc| doc.get_element_by_id("inner")).unwrap();

        for (target, name) in [
            (ListenerTarget::Document, "document"),
            (ListenerTarget::Element(outer), "outer"),
            (ListenerTarget::Element(inner), "inner"),
        ] {
            let order = Arc::clone(&order);
            page.add_click_listener(
                target,
                Arc::new(move |_: &mut Document, _: &ClickEvent| {
                    order.lock().unwrap().push(name)
                }),
            );
        }

        page.click("#inner").unwrap();
        assert_eq!(*order.lock().unwrap(), vec!["inner", "outer", "document"]);

        order.lock().unwrap().clear();
        page.click("#elsewhere").unwrap();
        assert_eq!(*order.lock().unwrap(), vec!["document"]);
    }

    #[test]
    fn test_click_unknown_selector_is_error() {
        let page = page();
        assert!(matches!(
            page.click("#nope"),
            Err(AppError::ElementNotFound(_))
        ));
        assert!(matches!(
            page.click("##"),
            Err(AppError::InvalidSelector(_))
        ));
    }

    #[test]
    fn test_listener_receives_target() {
        let page = page();
        let hits = Arc::new(AtomicUsize::new(0));
        let inner = page.with_document(|doc| doc.get_element_by_id("inner")).unwrap();

        let seen = Arc::clone(&hits);
        page.add_click_listener(
            ListenerTarget::Document,
            Arc::new(move |doc: &mut Document, event: &ClickEvent| {
                if doc.attr(event.target, "id") == Some("inner") {
                    seen.fetch_add(1, Ordering::SeqCst);
                }
            }),
        );

        page.click_node(inner);
        page.click("#outer").unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_aborts_tasks() {
        let page = page();
        let ticks = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&ticks);
        page.spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_secs(1)).await;
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });
        assert_eq!(page.active_tasks(), 1);

        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 2);

        page.shutdown();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 2);
        assert_eq!(page.active_tasks(), 0);
    }
}
