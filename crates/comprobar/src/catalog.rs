//! The canonical scenario catalog.
//!
//! Five test cases covering the authentication and shopping-cart flows of
//! the demo shop. Each sequence is explicit data; nothing is inferred at
//! run time, and every scenario is independently runnable.

use crate::assertion::TextMatch;
use crate::config::HarnessConfig;
use crate::scenario::{Check, Scenario};
use crate::selectors::SelectorName;
use crate::step::Step;

/// The shared prefix of every cart scenario: best-effort login, confirm the
/// cart view, put one item in the cart, and bring the line item on screen.
fn add_to_cart_steps() -> Vec<Step> {
    vec![
        Step::Authenticate,
        Step::ReachCartView,
        Step::ScrollIntoView {
            target: SelectorName::AddItemButton,
        },
        Step::Click {
            target: SelectorName::AddItemButton,
        },
        Step::ScrollIntoView {
            target: SelectorName::CartItem,
        },
    ]
}

/// Build the full catalog against a configuration.
///
/// Credentials are baked into the step data here so the scenarios stay
/// self-contained value objects.
#[must_use]
pub fn catalog(config: &HarnessConfig) -> Vec<Scenario> {
    let mut scenarios = Vec::new();

    scenarios.push(
        Scenario::new("valid-login", "Login with valid credentials")
            .step(Step::Authenticate)
            .check(Check::Visible {
                target: SelectorName::ContentMarker,
            }),
    );

    scenarios.push(
        Scenario::new("invalid-login", "Login with invalid credentials")
            .step(Step::Fill {
                target: SelectorName::EmailField,
                text: config.invalid.username.clone(),
            })
            .step(Step::Fill {
                target: SelectorName::PasswordField,
                text: config.invalid.password.clone(),
            })
            .step(Step::Click {
                target: SelectorName::SubmitButton,
            })
            .check(Check::Visible {
                target: SelectorName::ErrorBanner,
            }),
    );

    let mut add_to_cart = Scenario::new("add-to-cart", "Add a product to the cart");
    for step in add_to_cart_steps() {
        add_to_cart = add_to_cart.step(step);
    }
    scenarios.push(add_to_cart.check(Check::Visible {
        target: SelectorName::CartItem,
    }));

    let mut edit_quantity = Scenario::new("edit-quantity", "Edit the product quantity in the cart");
    for step in add_to_cart_steps() {
        edit_quantity = edit_quantity.step(step);
    }
    scenarios.push(
        edit_quantity
            .step(Step::ExpectVisible {
                target: SelectorName::CartItem,
            })
            .step(Step::Fill {
                target: SelectorName::QuantityInput,
                text: String::new(),
            })
            .step(Step::Fill {
                target: SelectorName::QuantityInput,
                text: "2".to_string(),
            })
            .check(Check::Value {
                target: SelectorName::QuantityInput,
                expected: "2".to_string(),
            }),
    );

    let mut remove = Scenario::new("remove-from-cart", "Remove the product from the cart");
    for step in add_to_cart_steps() {
        remove = remove.step(step);
    }
    scenarios.push(
        remove
            .step(Step::ExpectVisible {
                target: SelectorName::CartItem,
            })
            .step(Step::ScrollIntoView {
                target: SelectorName::RemoveButton,
            })
            .step(Step::Click {
                target: SelectorName::RemoveButton,
            })
            // The emptied cart must read exactly "$0"; "$0.00" or padded
            // variants are regressions
            .check(Check::Text {
                target: SelectorName::CartTotal,
                expected: "$0".to_string(),
                mode: TextMatch::Exact,
            }),
    );

    scenarios
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_has_five_scenarios() {
        let scenarios = catalog(&HarnessConfig::default());
        let names: Vec<&str> = scenarios.iter().map(Scenario::name).collect();
        assert_eq!(
            names,
            vec![
                "valid-login",
                "invalid-login",
                "add-to-cart",
                "edit-quantity",
                "remove-from-cart"
            ]
        );
    }

    #[test]
    fn test_invalid_login_uses_invalid_fixture_and_skips_helper() {
        let config = HarnessConfig::default();
        let scenarios = catalog(&config);
        let invalid = &scenarios[1];
        assert!(!invalid.steps().contains(&Step::Authenticate));
        assert!(invalid.steps().contains(&Step::Fill {
            target: SelectorName::PasswordField,
            text: config.invalid.password.clone(),
        }));
    }

    #[test]
    fn test_cart_scenarios_share_the_add_prefix() {
        let scenarios = catalog(&HarnessConfig::default());
        for scenario in &scenarios[2..] {
            assert_eq!(scenario.steps()[..5], add_to_cart_steps()[..]);
        }
    }

    #[test]
    fn test_remove_from_cart_checks_exact_zero_total() {
        let scenarios = catalog(&HarnessConfig::default());
        let remove = scenarios.last().unwrap();
        assert_eq!(
            remove.final_check(),
            Some(&Check::Text {
                target: SelectorName::CartTotal,
                expected: "$0".to_string(),
                mode: TextMatch::Exact,
            })
        );
    }

    #[test]
    fn test_edit_quantity_clears_then_types() {
        let scenarios = catalog(&HarnessConfig::default());
        let edit = &scenarios[3];
        let fills: Vec<&Step> = edit
            .steps()
            .iter()
            .filter(|s| matches!(s, Step::Fill { target, .. } if *target == SelectorName::QuantityInput))
            .collect();
        assert_eq!(
            fills,
            vec![
                &Step::Fill {
                    target: SelectorName::QuantityInput,
                    text: String::new(),
                },
                &Step::Fill {
                    target: SelectorName::QuantityInput,
                    text: "2".to_string(),
                },
            ]
        );
    }
}
