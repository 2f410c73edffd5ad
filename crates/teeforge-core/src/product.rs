//! Catalog product records as consumed by the designer.

use crate::color::GarmentColor;
use crate::view::ViewKey;
use serde::{Deserialize, Serialize};

/// Template identifiers per view, as stored on a product.
///
/// A view is available iff its entry is present and non-blank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignTemplates {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub front: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleeve_left: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleeve_right: Option<String>,
}

impl DesignTemplates {
    fn slot(&self, view: ViewKey) -> &Option<String> {
        match view {
            ViewKey::Front => &self.front,
            ViewKey::Back => &self.back,
            ViewKey::SleeveLeft => &self.sleeve_left,
            ViewKey::SleeveRight => &self.sleeve_right,
        }
    }

    fn slot_mut(&mut self, view: ViewKey) -> &mut Option<String> {
        match view {
            ViewKey::Front => &mut self.front,
            ViewKey::Back => &mut self.back,
            ViewKey::SleeveLeft => &mut self.sleeve_left,
            ViewKey::SleeveRight => &mut self.sleeve_right,
        }
    }

    /// Template identifier for a view, if one is assigned.
    pub fn get(&self, view: ViewKey) -> Option<&str> {
        self.slot(view)
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    pub fn set(&mut self, view: ViewKey, template: impl Into<String>) {
        *self.slot_mut(view) = Some(template.into());
    }

    /// Builder-style variant of [`DesignTemplates::set`].
    pub fn with(mut self, view: ViewKey, template: impl Into<String>) -> Self {
        self.set(view, template);
        self
    }

    pub fn is_available(&self, view: ViewKey) -> bool {
        self.get(view).is_some()
    }

    /// Available views in canonical order.
    pub fn available_views(&self) -> Vec<ViewKey> {
        ViewKey::ALL
            .into_iter()
            .filter(|view| self.is_available(*view))
            .collect()
    }
}

/// A product listed in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(alias = "_id")]
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: f64,
    pub offer_price: f64,
    /// Catalog image URLs.
    #[serde(default, rename = "image")]
    pub images: Vec<String>,
    /// Creation time in milliseconds since the Unix epoch.
    #[serde(default)]
    pub date: u64,
    #[serde(default)]
    pub design_templates: DesignTemplates,
    #[serde(default)]
    pub available_colors: Vec<GarmentColor>,
}

impl Product {
    /// Parse a product from its JSON record.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Views the designer can offer for this product.
    pub fn available_views(&self) -> Vec<ViewKey> {
        self.design_templates.available_views()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECORD: &str = r##"{
        "_id": "66a1",
        "userId": "seller_1",
        "name": "Classic Tee",
        "description": "Heavyweight cotton",
        "category": "Apparel",
        "price": 25,
        "offerPrice": 19.5,
        "image": ["https://cdn.example/a.png"],
        "date": 1700000000000,
        "designTemplates": { "front": "tshirt-front", "back": "tshirt-back", "sleeveLeft": "" },
        "availableColors": [ { "name": "Red", "hex": "#EF4444" } ]
    }"##;

    #[test]
    fn test_parse_record() {
        let product = Product::from_json(RECORD).unwrap();
        assert_eq!(product.id, "66a1");
        assert!((product.offer_price - 19.5).abs() < f64::EPSILON);
        assert_eq!(product.images.len(), 1);
        assert_eq!(product.available_colors[0].name, "Red");
    }

    #[test]
    fn test_empty_template_is_unavailable() {
        let product = Product::from_json(RECORD).unwrap();
        assert_eq!(product.available_views(), vec![ViewKey::Front, ViewKey::Back]);
        assert!(!product.design_templates.is_available(ViewKey::SleeveLeft));
        assert_eq!(product.design_templates.get(ViewKey::SleeveRight), None);
    }

    #[test]
    fn test_blank_template_is_unavailable() {
        let templates = DesignTemplates::default().with(ViewKey::Back, "   ");
        assert!(templates.available_views().is_empty());
    }

    #[test]
    fn test_missing_optional_fields() {
        let json = r#"{
            "id": "p", "userId": "u", "name": "n", "description": "d",
            "category": "c", "price": 1, "offerPrice": 1
        }"#;
        let product = Product::from_json(json).unwrap();
        assert!(product.available_views().is_empty());
        assert!(product.available_colors.is_empty());
    }

    #[test]
    fn test_json_uses_wire_names() {
        let product = Product::from_json(RECORD).unwrap();
        let json = product.to_json().unwrap();
        assert!(json.contains("\"offerPrice\""));
        assert!(json.contains("\"designTemplates\""));
        assert!(json.contains("\"sleeveLeft\""));
    }
}
