//! User menu dropdown: toggled by its trigger, closed by clicks elsewhere

use crate::constants::{ACTIVE_CLASS, USER_DROPDOWN_ID, USER_MENU_SELECTOR};
use crate::dom::{Document, NodeId, Selector};
use crate::error::Result;
use crate::page::{ClickEvent, ListenerTarget, Page};
use crate::types::Config;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct UserMenu {
    trigger: Selector,
    menu: Selector,
}

impl UserMenu {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(UserMenu {
            trigger: Selector::parse(&config.user_menu_trigger)?,
            menu: Selector::parse(USER_MENU_SELECTOR)?,
        })
    }

    /// Attach the toggle to every trigger present now, plus one document-wide
    /// listener that closes the dropdown on outside clicks. Returns the number
    /// of triggers wired.
    pub fn install(&self, page: &Page) -> usize {
        let triggers = page.with_document(|doc| doc.query_selector_all(&self.trigger));

        for &trigger in &triggers {
            page.add_click_listener(
                ListenerTarget::Element(trigger),
                Arc::new(|doc: &mut Document, _: &ClickEvent| {
                    toggle_dropdown(doc);
                }),
            );
        }

        let menu = self.menu.clone();
        page.add_click_listener(
            ListenerTarget::Document,
            Arc::new(move |doc: &mut Document, event: &ClickEvent| {
                close_if_outside(doc, &menu, event.target);
            }),
        );

        tracing::debug!("User menu wired to {} triggers", triggers.len());
        triggers.len()
    }
}

/// Flip the dropdown's active state. `None` when there is no dropdown.
pub fn toggle_dropdown(doc: &mut Document) -> Option<bool> {
    let dropdown = doc.get_element_by_id(USER_DROPDOWN_ID)?;
    Some(doc.toggle_class(dropdown, ACTIVE_CLASS))
}

/// Close the dropdown when `target` lies outside both the menu and the
/// dropdown. Returns true if it was open and got closed.
pub fn close_if_outside(doc: &mut Document, menu: &Selector, target: NodeId) -> bool {
    let (Some(menu), Some(dropdown)) = (
        doc.query_selector(menu),
        doc.get_element_by_id(USER_DROPDOWN_ID),
    ) else {
        return false;
    };

    if doc.contains(menu, target) || doc.contains(dropdown, target) {
        return false;
    }

    doc.remove_class(dropdown, ACTIVE_CLASS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::HeadlessNotifier;

    const PAGE: &str = r#"<html><body>
        <nav>
            <a href="/" class="logo">Exam Buddy</a>
            <div class="user-menu">
                <button class="user-menu-toggle"><span class="avatar">EB</span></button>
            </div>
        </nav>
        <div id="userDropdown" class="dropdown">
            <a href="/settings" id="settings">Settings</a>
        </div>
        <main id="content"><p id="para">Dashboard</p></main>
    </body></html>"#;

    fn setup(html: &str) -> Page {
        let page = Page::from_html(html, Arc::new(HeadlessNotifier::unsupported()));
        UserMenu::new(&Config::default()).unwrap().install(&page);
        page
    }

    fn is_open(page: &Page) -> bool {
        page.with_document(|doc| {
            let dropdown = doc.get_element_by_id("userDropdown").unwrap();
            doc.has_class(dropdown, "active")
        })
    }

    #[test]
    fn test_trigger_toggles() {
        let page = setup(PAGE);
        assert!(!is_open(&page));

        page.click(".user-menu-toggle").unwrap();
        assert!(is_open(&page));

        // Clicks on the trigger's children bubble up to it
        page.click(".avatar").unwrap();
        assert!(!is_open(&page));
    }

    #[test]
    fn test_outside_click_closes() {
        let page = setup(PAGE);
        page.click(".user-menu-toggle").unwrap();

        page.click("#para").unwrap();
        assert!(!is_open(&page));

        // Closing an already closed dropdown is harmless
        page.click(".logo").unwrap();
        assert!(!is_open(&page));
    }

    #[test]
    fn test_click_inside_dropdown_keeps_it_open() {
        let page = setup(PAGE);
        page.click(".user-menu-toggle").unwrap();

        page.click("#settings").unwrap();
        assert!(is_open(&page));
        page.click("#userDropdown").unwrap();
        assert!(is_open(&page));
    }

    #[test]
    fn test_inline_onclick_trigger() {
        let page = setup(
            r#"<html><body>
                <div class="user-menu"><div onclick="toggleUserMenu()">Me</div></div>
                <div id="userDropdown"></div>
            </body></html>"#,
        );
        page.click(r#"[onclick="toggleUserMenu()"]"#).unwrap();
        assert!(is_open(&page));
    }

    #[test]
    fn test_missing_menu_never_closes() {
        let page = setup(
            r#"<html><body>
                <button class="user-menu-toggle">Me</button>
                <div id="userDropdown" class="active"></div>
                <p id="para">x</p>
            </body></html>"#,
        );
        page.click("#para").unwrap();
        assert!(is_open(&page));
    }

    #[test]
    fn test_missing_dropdown_is_noop() {
        let page = setup(
            r#"<html><body><div class="user-menu"><button class="user-menu-toggle">Me</button></div></body></html>"#,
        );
        page.click(".user-menu-toggle").unwrap();
        page.with_document(|doc| assert_eq!(toggle_dropdown(doc), None));
    }
}
