//! View switcher state machine.

use crate::product::DesignTemplates;
use crate::view::{ViewError, ViewKey};

/// Selects which of a product's views is active.
///
/// States are the product's available views; there is no terminal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewSwitcher {
    views: Vec<ViewKey>,
    active: ViewKey,
}

impl ViewSwitcher {
    /// Build from a product's template mapping. Returns `None` when the
    /// product offers no views.
    pub fn new(templates: &DesignTemplates) -> Option<Self> {
        let views = templates.available_views();
        let active = *views.first()?;
        Some(Self { views, active })
    }

    /// Views offered, in canonical order.
    pub fn views(&self) -> &[ViewKey] {
        &self.views
    }

    pub fn active(&self) -> ViewKey {
        self.active
    }

    pub fn offers(&self, view: ViewKey) -> bool {
        self.views.contains(&view)
    }

    /// Select a view. Views the product does not offer are rejected and the
    /// active view is left unchanged. Returns whether the active view changed.
    pub fn select(&mut self, view: ViewKey) -> Result<bool, ViewError> {
        if !self.offers(view) {
            return Err(ViewError::NotOffered(view));
        }
        let changed = self.active != view;
        self.active = view;
        Ok(changed)
    }

    /// Select by wire name (`"sleeveLeft"`).
    pub fn select_named(&mut self, name: &str) -> Result<bool, ViewError> {
        self.select(name.parse()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn front_back() -> DesignTemplates {
        DesignTemplates::default()
            .with(ViewKey::Back, "tshirt-back")
            .with(ViewKey::Front, "tshirt-front")
    }

    #[test]
    fn test_states_are_available_views() {
        let switcher = ViewSwitcher::new(&front_back()).unwrap();
        assert_eq!(switcher.views(), &[ViewKey::Front, ViewKey::Back]);
        assert_eq!(switcher.active(), ViewKey::Front);
    }

    #[test]
    fn test_initial_is_first_available() {
        let templates =
            DesignTemplates::default().with(ViewKey::SleeveRight, "tshirt-sleeve-right");
        let switcher = ViewSwitcher::new(&templates).unwrap();
        assert_eq!(switcher.active(), ViewKey::SleeveRight);
    }

    #[test]
    fn test_no_views() {
        assert!(ViewSwitcher::new(&DesignTemplates::default()).is_none());
    }

    #[test]
    fn test_not_offered_rejected() {
        let mut switcher = ViewSwitcher::new(&front_back()).unwrap();
        assert_eq!(
            switcher.select(ViewKey::SleeveLeft),
            Err(ViewError::NotOffered(ViewKey::SleeveLeft))
        );
        assert_eq!(switcher.active(), ViewKey::Front);
    }

    #[test]
    fn test_select_and_reselect() {
        let mut switcher = ViewSwitcher::new(&front_back()).unwrap();
        assert_eq!(switcher.select(ViewKey::Back), Ok(true));
        assert_eq!(switcher.select(ViewKey::Back), Ok(false));
        assert_eq!(switcher.select_named("front"), Ok(true));
        assert!(switcher.select_named("collar").is_err());
    }
}
