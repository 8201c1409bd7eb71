//! Scripted in-memory page engine.
//!
//! [`MockPage`] plays the role of a live browser page in tests: elements can
//! appear after a number of probes, sit hidden until revealed, shrug off
//! clicks while "covered", and react to clicks by mutating other elements.
//! Everything is deterministic, so the harness's tolerance for timing
//! variability can be exercised without a browser.
//!
//! [`storefront`] wires a full behavioral model of the demo shop out of
//! these pieces: credential-sensitive login, an error banner for rejects,
//! and an add/edit/remove cart lifecycle.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::{ClickOutcome, ElementState, EngineFactory, PageEngine};
use crate::config::HarnessConfig;
use crate::result::{ComprobarError, ComprobarResult};

/// Script for one element of the fake page
#[derive(Debug, Clone)]
pub struct MockElement {
    text: String,
    value: String,
    /// Number of probes before the element exists in the DOM
    appears_after: u32,
    /// Present but not rendered until revealed
    hidden: bool,
    /// Number of clicks that bounce off before one registers
    deflects_clicks: u32,
    /// Number of probes (after appearing) during which layout is moving
    unstable_for: u32,
    probes: u32,
}

impl Default for MockElement {
    fn default() -> Self {
        Self::new()
    }
}

impl MockElement {
    /// An element that is present and visible from the first probe
    #[must_use]
    pub fn new() -> Self {
        Self {
            text: String::new(),
            value: String::new(),
            appears_after: 0,
            hidden: false,
            deflects_clicks: 0,
            unstable_for: 0,
            probes: 0,
        }
    }

    /// A visible element with fixed text content
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::new()
        }
    }

    /// A form field with an initial value
    #[must_use]
    pub fn input(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Self::new()
        }
    }

    /// Delay DOM insertion by `probes` lookups
    #[must_use]
    pub const fn appearing_after(mut self, probes: u32) -> Self {
        self.appears_after = probes;
        self
    }

    /// Keep the element in the DOM but unrendered until revealed
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Make the first `clicks` click attempts bounce off an overlay
    #[must_use]
    pub const fn deflecting_clicks(mut self, clicks: u32) -> Self {
        self.deflects_clicks = clicks;
        self
    }

    /// Report unstable layout for the first `probes` lookups after appearing
    #[must_use]
    pub const fn unstable_for(mut self, probes: u32) -> Self {
        self.unstable_for = probes;
        self
    }

    fn observe(&mut self) -> Option<ElementState> {
        self.probes += 1;
        if self.probes <= self.appears_after {
            return None;
        }
        Some(ElementState {
            visible: !self.hidden,
            stable: !self.hidden && self.probes > self.appears_after + self.unstable_for,
            obstructed: self.deflects_clicks > 0,
            text: self.text.clone(),
            value: self.value.clone(),
        })
    }
}

/// Guard deciding whether a reaction fires
#[derive(Debug, Clone)]
pub enum Guard {
    /// Fire unconditionally
    Always,
    /// Fire when a field currently holds exactly this value
    ValueIs {
        /// Field selector
        selector: String,
        /// Required value
        expected: String,
    },
    /// Fire when a field holds anything but this value
    ValueIsNot {
        /// Field selector
        selector: String,
        /// Rejected value
        expected: String,
    },
}

/// Page mutation applied by a firing reaction
#[derive(Debug, Clone)]
pub enum Effect {
    /// Make a hidden element rendered (and present, if it was delayed)
    Reveal(String),
    /// Remove an element from the rendered page
    Hide(String),
    /// Replace an element's text content
    SetText(String, String),
    /// Replace an element's form value
    SetValue(String, String),
}

/// A click-triggered scripted page mutation
#[derive(Debug, Clone)]
pub struct Reaction {
    on: String,
    guard: Guard,
    effects: Vec<Effect>,
}

impl Reaction {
    /// React to clicks on `selector`
    #[must_use]
    pub fn on_click(selector: impl Into<String>) -> Self {
        Self {
            on: selector.into(),
            guard: Guard::Always,
            effects: Vec::new(),
        }
    }

    /// Only fire when a field holds exactly `expected`
    #[must_use]
    pub fn when_value(mut self, selector: impl Into<String>, expected: impl Into<String>) -> Self {
        self.guard = Guard::ValueIs {
            selector: selector.into(),
            expected: expected.into(),
        };
        self
    }

    /// Only fire when a field holds anything but `expected`
    #[must_use]
    pub fn unless_value(
        mut self,
        selector: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        self.guard = Guard::ValueIsNot {
            selector: selector.into(),
            expected: expected.into(),
        };
        self
    }

    /// Reveal an element when firing
    #[must_use]
    pub fn reveal(mut self, selector: impl Into<String>) -> Self {
        self.effects.push(Effect::Reveal(selector.into()));
        self
    }

    /// Hide an element when firing
    #[must_use]
    pub fn hide(mut self, selector: impl Into<String>) -> Self {
        self.effects.push(Effect::Hide(selector.into()));
        self
    }

    /// Replace an element's text when firing
    #[must_use]
    pub fn set_text(mut self, selector: impl Into<String>, text: impl Into<String>) -> Self {
        self.effects
            .push(Effect::SetText(selector.into(), text.into()));
        self
    }

    /// Replace an element's value when firing
    #[must_use]
    pub fn set_value(mut self, selector: impl Into<String>, value: impl Into<String>) -> Self {
        self.effects
            .push(Effect::SetValue(selector.into(), value.into()));
        self
    }
}

/// Record of an action that registered against the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionRecord {
    /// A click registered
    Click {
        /// Clicked selector
        selector: String,
    },
    /// A fill replaced a field's value
    Fill {
        /// Filled selector
        selector: String,
        /// New value
        text: String,
    },
    /// An element was scrolled into the viewport
    Scroll {
        /// Scrolled selector
        selector: String,
    },
}

#[derive(Debug, Default)]
struct PageModel {
    elements: HashMap<String, MockElement>,
    reactions: Vec<Reaction>,
    actions: Vec<ActionRecord>,
    visited: Vec<String>,
    nav_failure: Option<String>,
    idle_after_checks: u32,
    idle_checks: u32,
    close_count: u32,
}

impl PageModel {
    fn value_of(&self, selector: &str) -> Option<&str> {
        self.elements.get(selector).map(|el| el.value.as_str())
    }

    fn guard_holds(&self, guard: &Guard) -> bool {
        match guard {
            Guard::Always => true,
            Guard::ValueIs { selector, expected } => {
                self.value_of(selector) == Some(expected.as_str())
            }
            Guard::ValueIsNot { selector, expected } => {
                self.value_of(selector) != Some(expected.as_str())
            }
        }
    }

    fn apply(&mut self, effect: &Effect) {
        match effect {
            Effect::Reveal(selector) => {
                if let Some(el) = self.elements.get_mut(selector) {
                    el.hidden = false;
                    el.appears_after = 0;
                }
            }
            Effect::Hide(selector) => {
                if let Some(el) = self.elements.get_mut(selector) {
                    el.hidden = true;
                }
            }
            Effect::SetText(selector, text) => {
                if let Some(el) = self.elements.get_mut(selector) {
                    el.text = text.clone();
                }
            }
            Effect::SetValue(selector, value) => {
                if let Some(el) = self.elements.get_mut(selector) {
                    el.value = value.clone();
                }
            }
        }
    }

    fn react_to_click(&mut self, selector: &str) {
        let firing: Vec<Effect> = self
            .reactions
            .iter()
            .filter(|r| r.on == selector && self.guard_holds(&r.guard))
            .flat_map(|r| r.effects.clone())
            .collect();
        for effect in &firing {
            self.apply(effect);
        }
    }
}

/// Deterministic scripted page implementing [`PageEngine`]
#[derive(Debug, Default)]
pub struct MockPage {
    model: Mutex<PageModel>,
}

impl MockPage {
    /// An empty page with no elements
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a scripted element
    #[must_use]
    pub fn with_element(self, selector: impl Into<String>, element: MockElement) -> Self {
        self.model
            .lock()
            .unwrap()
            .elements
            .insert(selector.into(), element);
        self
    }

    /// Add a click reaction
    #[must_use]
    pub fn with_reaction(self, reaction: Reaction) -> Self {
        self.model.lock().unwrap().reactions.push(reaction);
        self
    }

    /// Make every navigation fail with this message
    #[must_use]
    pub fn with_navigation_failure(self, message: impl Into<String>) -> Self {
        self.model.lock().unwrap().nav_failure = Some(message.into());
        self
    }

    /// Report the network busy for the first `checks` idle probes
    #[must_use]
    pub fn with_idle_after(self, checks: u32) -> Self {
        self.model.lock().unwrap().idle_after_checks = checks;
        self
    }

    /// Reveal an element mid-test
    pub fn reveal(&self, selector: &str) {
        let mut model = self.model.lock().unwrap();
        model.apply(&Effect::Reveal(selector.to_string()));
    }

    /// Hide an element mid-test
    pub fn hide(&self, selector: &str) {
        let mut model = self.model.lock().unwrap();
        model.apply(&Effect::Hide(selector.to_string()));
    }

    /// Replace an element's text mid-test
    pub fn set_text(&self, selector: &str, text: &str) {
        let mut model = self.model.lock().unwrap();
        model.apply(&Effect::SetText(selector.to_string(), text.to_string()));
    }

    /// URLs this page navigated to, in order
    #[must_use]
    pub fn visited(&self) -> Vec<String> {
        self.model.lock().unwrap().visited.clone()
    }

    /// Actions that registered, in order
    #[must_use]
    pub fn actions(&self) -> Vec<ActionRecord> {
        self.model.lock().unwrap().actions.clone()
    }

    /// Current value of a field
    #[must_use]
    pub fn value_of(&self, selector: &str) -> Option<String> {
        self.model
            .lock()
            .unwrap()
            .value_of(selector)
            .map(String::from)
    }

    /// How many times the page was closed
    #[must_use]
    pub fn close_count(&self) -> u32 {
        self.model.lock().unwrap().close_count
    }
}

#[async_trait]
impl PageEngine for MockPage {
    async fn navigate(&self, url: &str) -> ComprobarResult<()> {
        let mut model = self.model.lock().unwrap();
        if let Some(ref message) = model.nav_failure {
            return Err(ComprobarError::Navigation {
                url: url.to_string(),
                message: message.clone(),
            });
        }
        model.visited.push(url.to_string());
        Ok(())
    }

    async fn probe(&self, selector: &str) -> ComprobarResult<Option<ElementState>> {
        let mut model = self.model.lock().unwrap();
        Ok(model
            .elements
            .get_mut(selector)
            .and_then(MockElement::observe))
    }

    async fn click(&self, selector: &str) -> ComprobarResult<ClickOutcome> {
        let mut model = self.model.lock().unwrap();
        let Some(el) = model.elements.get_mut(selector) else {
            return Ok(ClickOutcome::Blocked);
        };
        if el.hidden || el.probes <= el.appears_after {
            return Ok(ClickOutcome::Blocked);
        }
        if el.deflects_clicks > 0 {
            el.deflects_clicks -= 1;
            return Ok(ClickOutcome::Blocked);
        }
        model.actions.push(ActionRecord::Click {
            selector: selector.to_string(),
        });
        model.react_to_click(selector);
        Ok(ClickOutcome::Registered)
    }

    async fn fill(&self, selector: &str, text: &str) -> ComprobarResult<()> {
        let mut model = self.model.lock().unwrap();
        let Some(el) = model.elements.get_mut(selector) else {
            return Err(ComprobarError::engine(format!(
                "fill target '{selector}' is no longer attached"
            )));
        };
        el.value = text.to_string();
        model.actions.push(ActionRecord::Fill {
            selector: selector.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn scroll_into_view(&self, selector: &str) -> ComprobarResult<()> {
        let mut model = self.model.lock().unwrap();
        model.actions.push(ActionRecord::Scroll {
            selector: selector.to_string(),
        });
        Ok(())
    }

    async fn network_idle(&self) -> ComprobarResult<bool> {
        let mut model = self.model.lock().unwrap();
        model.idle_checks += 1;
        Ok(model.idle_checks > model.idle_after_checks)
    }

    async fn close(&self) -> ComprobarResult<()> {
        let mut model = self.model.lock().unwrap();
        model.close_count += 1;
        Ok(())
    }
}

/// Factory producing one fresh scripted page per scenario
pub struct MockFactory<F>
where
    F: Fn() -> MockPage + Send + Sync,
{
    build: F,
}

impl<F> MockFactory<F>
where
    F: Fn() -> MockPage + Send + Sync,
{
    /// Wrap a page builder
    pub fn new(build: F) -> Self {
        Self { build }
    }
}

impl<F> std::fmt::Debug for MockFactory<F>
where
    F: Fn() -> MockPage + Send + Sync,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockFactory").finish_non_exhaustive()
    }
}

#[async_trait]
impl<F> EngineFactory for MockFactory<F>
where
    F: Fn() -> MockPage + Send + Sync,
{
    async fn page(&self) -> ComprobarResult<Arc<dyn PageEngine>> {
        Ok(Arc::new((self.build)()))
    }
}

/// Behavioral model of the demo shop, wired to the configured selectors.
///
/// Login succeeds only with the configured valid password; rejected logins
/// reveal the error banner. The add button reveals the cart line item and
/// sets the total; the remove button clears both back to `$0`.
#[must_use]
pub fn storefront(config: &HarnessConfig) -> MockPage {
    let sel = &config.selectors;
    MockPage::new()
        .with_element(&sel.email_field, MockElement::input(""))
        .with_element(&sel.password_field, MockElement::input(""))
        .with_element(&sel.submit_button, MockElement::text("Submit"))
        .with_element(&sel.error_banner, MockElement::text("Bad credentials! Please try again!").hidden())
        .with_element(&sel.content_marker, MockElement::text("SHOPPING CART").hidden())
        .with_element(&sel.add_item_button, MockElement::text("Add to cart").hidden())
        .with_element(&sel.cart_item, MockElement::text("STUFFED FROG").hidden())
        .with_element(&sel.quantity_input, MockElement::input("1").hidden())
        .with_element(&sel.remove_button, MockElement::text("REMOVE").hidden())
        .with_element(&sel.cart_total, MockElement::text("$0").hidden())
        .with_reaction(
            Reaction::on_click(&sel.submit_button)
                .when_value(&sel.password_field, &config.valid.password)
                .reveal(&sel.content_marker)
                .reveal(&sel.add_item_button)
                .reveal(&sel.cart_total),
        )
        .with_reaction(
            Reaction::on_click(&sel.submit_button)
                .unless_value(&sel.password_field, &config.valid.password)
                .reveal(&sel.error_banner),
        )
        .with_reaction(
            Reaction::on_click(&sel.add_item_button)
                .reveal(&sel.cart_item)
                .reveal(&sel.quantity_input)
                .reveal(&sel.remove_button)
                .set_text(&sel.cart_total, "$9.99"),
        )
        .with_reaction(
            Reaction::on_click(&sel.remove_button)
                .hide(&sel.cart_item)
                .hide(&sel.quantity_input)
                .hide(&sel.remove_button)
                .set_text(&sel.cart_total, "$0"),
        )
        .with_idle_after(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    mod element_tests {
        use super::*;

        #[tokio::test]
        async fn test_element_appears_after_n_probes() {
            let page = MockPage::new()
                .with_element("div.cart-item > span", MockElement::text("item").appearing_after(2));
            assert!(page.probe("div.cart-item > span").await.unwrap().is_none());
            assert!(page.probe("div.cart-item > span").await.unwrap().is_none());
            let state = page.probe("div.cart-item > span").await.unwrap().unwrap();
            assert!(state.visible);
            assert_eq!(state.text, "item");
        }

        #[tokio::test]
        async fn test_unknown_selector_probes_none() {
            let page = MockPage::new();
            assert!(page.probe("div.missing").await.unwrap().is_none());
        }

        #[tokio::test]
        async fn test_hidden_element_is_present_not_visible() {
            let page = MockPage::new().with_element("div.alert-danger", MockElement::text("nope").hidden());
            let state = page.probe("div.alert-danger").await.unwrap().unwrap();
            assert!(!state.visible);
        }

        #[tokio::test]
        async fn test_unstable_element_settles() {
            let page =
                MockPage::new().with_element("button", MockElement::text("go").unstable_for(1));
            let first = page.probe("button").await.unwrap().unwrap();
            assert!(!first.stable);
            let second = page.probe("button").await.unwrap().unwrap();
            assert!(second.stable);
        }
    }

    mod action_tests {
        use super::*;

        #[tokio::test]
        async fn test_fill_replaces_value() {
            let page = MockPage::new()
                .with_element("input.cart-quantity-input", MockElement::input("1"));
            page.fill("input.cart-quantity-input", "").await.unwrap();
            page.fill("input.cart-quantity-input", "2").await.unwrap();
            assert_eq!(
                page.value_of("input.cart-quantity-input").as_deref(),
                Some("2")
            );
        }

        #[tokio::test]
        async fn test_fill_on_detached_element_errors() {
            let page = MockPage::new();
            let err = page.fill("input#email", "x").await.unwrap_err();
            assert!(err.to_string().contains("input#email"));
        }

        #[tokio::test]
        async fn test_click_deflected_then_registered() {
            let page =
                MockPage::new().with_element("button", MockElement::text("go").deflecting_clicks(1));
            // Element must have been observed at least once before a click lands
            page.probe("button").await.unwrap();
            assert_eq!(page.click("button").await.unwrap(), ClickOutcome::Blocked);
            assert_eq!(
                page.click("button").await.unwrap(),
                ClickOutcome::Registered
            );
            assert_eq!(
                page.actions(),
                vec![ActionRecord::Click {
                    selector: "button".to_string()
                }]
            );
        }

        #[tokio::test]
        async fn test_click_on_hidden_element_is_blocked() {
            let page = MockPage::new().with_element("button", MockElement::text("go").hidden());
            page.probe("button").await.unwrap();
            assert_eq!(page.click("button").await.unwrap(), ClickOutcome::Blocked);
        }
    }

    mod reaction_tests {
        use super::*;

        #[tokio::test]
        async fn test_guarded_reaction_fires_on_matching_value() {
            let page = MockPage::new()
                .with_element("input#password", MockElement::input(""))
                .with_element("button#go", MockElement::text("go"))
                .with_element("h2", MockElement::text("WELCOME").hidden())
                .with_reaction(
                    Reaction::on_click("button#go")
                        .when_value("input#password", "admin123")
                        .reveal("h2"),
                );
            page.fill("input#password", "admin123").await.unwrap();
            page.probe("button#go").await.unwrap();
            page.click("button#go").await.unwrap();
            let state = page.probe("h2").await.unwrap().unwrap();
            assert!(state.visible);
        }

        #[tokio::test]
        async fn test_anti_guard_fires_on_mismatch() {
            let page = MockPage::new()
                .with_element("input#password", MockElement::input("wrong"))
                .with_element("button#go", MockElement::text("go"))
                .with_element("div.alert", MockElement::text("nope").hidden())
                .with_reaction(
                    Reaction::on_click("button#go")
                        .unless_value("input#password", "admin123")
                        .reveal("div.alert"),
                );
            page.probe("button#go").await.unwrap();
            page.click("button#go").await.unwrap();
            assert!(page.probe("div.alert").await.unwrap().unwrap().visible);
        }
    }

    mod page_tests {
        use super::*;

        #[tokio::test]
        async fn test_navigation_failure() {
            let page = MockPage::new().with_navigation_failure("connection refused");
            let err = page.navigate("https://shop.test").await.unwrap_err();
            assert!(matches!(err, ComprobarError::Navigation { .. }));
            assert!(page.visited().is_empty());
        }

        #[tokio::test]
        async fn test_navigation_records_url() {
            let page = MockPage::new();
            page.navigate("https://shop.test/cart").await.unwrap();
            assert_eq!(page.visited(), vec!["https://shop.test/cart".to_string()]);
        }

        #[tokio::test]
        async fn test_network_settles_after_configured_checks() {
            let page = MockPage::new().with_idle_after(2);
            assert!(!page.network_idle().await.unwrap());
            assert!(!page.network_idle().await.unwrap());
            assert!(page.network_idle().await.unwrap());
        }

        #[tokio::test]
        async fn test_close_is_counted() {
            let page = MockPage::new();
            page.close().await.unwrap();
            assert_eq!(page.close_count(), 1);
        }
    }

    mod storefront_tests {
        use super::*;
        use crate::config::HarnessConfig;

        #[tokio::test]
        async fn test_storefront_valid_login_reveals_shop() {
            let config = HarnessConfig::default();
            let sel = config.selectors.clone();
            let page = storefront(&config);
            page.fill(&sel.email_field, &config.valid.username).await.unwrap();
            page.fill(&sel.password_field, &config.valid.password).await.unwrap();
            page.probe(&sel.submit_button).await.unwrap();
            page.click(&sel.submit_button).await.unwrap();
            assert!(page.probe(&sel.content_marker).await.unwrap().unwrap().visible);
            assert!(page.probe(&sel.error_banner).await.unwrap().map_or(false, |s| !s.visible));
        }

        #[tokio::test]
        async fn test_storefront_rejects_bad_password() {
            let config = HarnessConfig::default();
            let sel = config.selectors.clone();
            let page = storefront(&config);
            page.fill(&sel.password_field, "wrong").await.unwrap();
            page.probe(&sel.submit_button).await.unwrap();
            page.click(&sel.submit_button).await.unwrap();
            assert!(page.probe(&sel.error_banner).await.unwrap().unwrap().visible);
            assert!(!page.probe(&sel.content_marker).await.unwrap().unwrap().visible);
        }

        #[tokio::test]
        async fn test_storefront_cart_lifecycle() {
            let config = HarnessConfig::default();
            let sel = config.selectors.clone();
            let page = storefront(&config);
            page.fill(&sel.password_field, &config.valid.password).await.unwrap();
            page.probe(&sel.submit_button).await.unwrap();
            page.click(&sel.submit_button).await.unwrap();

            page.probe(&sel.add_item_button).await.unwrap();
            page.click(&sel.add_item_button).await.unwrap();
            assert!(page.probe(&sel.cart_item).await.unwrap().unwrap().visible);
            assert_eq!(page.probe(&sel.cart_total).await.unwrap().unwrap().text, "$9.99");

            page.probe(&sel.remove_button).await.unwrap();
            page.click(&sel.remove_button).await.unwrap();
            assert!(!page.probe(&sel.cart_item).await.unwrap().unwrap().visible);
            assert_eq!(page.probe(&sel.cart_total).await.unwrap().unwrap().text, "$0");
        }
    }
}
