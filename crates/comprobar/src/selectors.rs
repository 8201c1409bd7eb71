//! Named selector catalog.
//!
//! Scenario logic refers to page elements by role (`SubmitButton`,
//! `CartTotal`); the mapping from role to CSS selector is configuration
//! data. Swapping the catalog retargets the whole suite to different markup
//! without touching a single step.

use serde::{Deserialize, Serialize};

/// Semantic roles of the elements the scenarios interact with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SelectorName {
    /// Login email input
    EmailField,
    /// Login password input
    PasswordField,
    /// Login submit button
    SubmitButton,
    /// Banner shown for rejected credentials
    ErrorBanner,
    /// Heading that marks the post-login shop view
    ContentMarker,
    /// Button adding the sample product to the cart
    AddItemButton,
    /// Line item inside the cart
    CartItem,
    /// Quantity input of the cart line item
    QuantityInput,
    /// Button removing the line item
    RemoveButton,
    /// Cart total amount
    CartTotal,
}

impl SelectorName {
    /// Stable snake_case identifier, used in logs and diagnostics
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::EmailField => "email_field",
            Self::PasswordField => "password_field",
            Self::SubmitButton => "submit_button",
            Self::ErrorBanner => "error_banner",
            Self::ContentMarker => "content_marker",
            Self::AddItemButton => "add_item_button",
            Self::CartItem => "cart_item",
            Self::QuantityInput => "quantity_input",
            Self::RemoveButton => "remove_button",
            Self::CartTotal => "cart_total",
        }
    }
}

impl std::fmt::Display for SelectorName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// CSS selector for each [`SelectorName`].
///
/// Defaults target the public qa-practice demo shop; a config file can
/// override any subset of fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorCatalog {
    /// Login email input
    pub email_field: String,
    /// Login password input
    pub password_field: String,
    /// Login submit button
    pub submit_button: String,
    /// Banner shown for rejected credentials
    pub error_banner: String,
    /// Heading that marks the post-login shop view
    pub content_marker: String,
    /// Button adding the sample product to the cart
    pub add_item_button: String,
    /// Line item inside the cart
    pub cart_item: String,
    /// Quantity input of the cart line item
    pub quantity_input: String,
    /// Button removing the line item
    pub remove_button: String,
    /// Cart total amount
    pub cart_total: String,
}

impl Default for SelectorCatalog {
    fn default() -> Self {
        Self {
            email_field: "input#email".to_string(),
            password_field: "input#password".to_string(),
            submit_button: "button#submitLoginBtn".to_string(),
            error_banner: "div.alert-danger".to_string(),
            content_marker: "section.content-section > h2".to_string(),
            add_item_button: "div:nth-child(5) > div:nth-child(3) > button:nth-child(2)"
                .to_string(),
            cart_item: "div.cart-item > span".to_string(),
            quantity_input: "input.cart-quantity-input".to_string(),
            remove_button: "button.btn-danger".to_string(),
            cart_total: "div.cart-total > span".to_string(),
        }
    }
}

impl SelectorCatalog {
    /// Look up the CSS selector for a role
    #[must_use]
    pub fn selector(&self, name: SelectorName) -> &str {
        match name {
            SelectorName::EmailField => &self.email_field,
            SelectorName::PasswordField => &self.password_field,
            SelectorName::SubmitButton => &self.submit_button,
            SelectorName::ErrorBanner => &self.error_banner,
            SelectorName::ContentMarker => &self.content_marker,
            SelectorName::AddItemButton => &self.add_item_button,
            SelectorName::CartItem => &self.cart_item,
            SelectorName::QuantityInput => &self.quantity_input,
            SelectorName::RemoveButton => &self.remove_button,
            SelectorName::CartTotal => &self.cart_total,
        }
    }
}
