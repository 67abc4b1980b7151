use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Selector a capture verifies before taking a screenshot: a top-level
/// navigation element that carries no explicit accessibility label.
pub const DEFAULT_SELECTOR: &str = "nav:not([aria-label])";

/// A declarative description of the element a capture must find.
///
/// Re-evaluated in the page at query time; a node handle is never cached.
/// The capture requires the selector to resolve to exactly one element;
/// zero matches and multiple matches are both verification failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Locator {
    css: String,
}

impl Locator {
    /// Create a locator from a CSS selector
    pub fn css(selector: impl Into<String>) -> Self {
        Self {
            css: selector.into(),
        }
    }

    /// Navigation element without an explicit accessibility label
    pub fn unlabeled_navigation() -> Self {
        Self::css(DEFAULT_SELECTOR)
    }

    /// The raw CSS selector
    pub fn as_css(&self) -> &str {
        &self.css
    }

    /// Reject selectors the page-side probe cannot evaluate
    pub fn validate(&self) -> Result<()> {
        if self.css.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "selector must not be empty".to_string(),
            ));
        }
        if self.css.contains('\n') {
            return Err(Error::InvalidConfig(format!(
                "selector must be a single line: {:?}",
                self.css
            )));
        }
        Ok(())
    }
}

impl Default for Locator {
    fn default() -> Self {
        Self::unlabeled_navigation()
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.css)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_locator_targets_unlabeled_navigation() {
        let locator = Locator::default();
        assert_eq!(locator.as_css(), "nav:not([aria-label])");
        assert!(locator.validate().is_ok());
    }

    #[test]
    fn test_empty_selector_is_invalid() {
        let locator = Locator::css("   ");
        assert!(locator.validate().is_err());
    }

    #[test]
    fn test_multiline_selector_is_invalid() {
        let locator = Locator::css("nav\n.menu");
        assert!(locator.validate().is_err());
    }

    #[test]
    fn test_locator_serializes_as_plain_string() {
        let locator = Locator::css(".hero");
        let json = serde_json::to_string(&locator).unwrap();
        assert_eq!(json, "\".hero\"");

        let back: Locator = serde_json::from_str(&json).unwrap();
        assert_eq!(back, locator);
    }
}
