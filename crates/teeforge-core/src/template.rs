//! Template store: resolves template identifiers to vector resources.

use crate::product::Product;
use crate::view::ViewKey;
use thiserror::Error;

/// Template lookup errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("No template assigned to view: {0}")]
    Unassigned(ViewKey),
    #[error("Template not found: {0}")]
    NotFound(String),
}

/// Result type for template lookups.
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Where a template's markup comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    /// Markup compiled into the binary.
    Inline(&'static str),
    /// Markup fetched from a URL.
    Url(String),
}

/// A resolved vector template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorResource {
    /// Template key or URL it was resolved from.
    pub key: String,
    pub source: TemplateSource,
}

impl VectorResource {
    /// Stable identity of the resource's content location.
    ///
    /// Two resources with the same `src` share cached markup.
    pub fn src(&self) -> String {
        match &self.source {
            TemplateSource::Inline(_) => format!("builtin:{}", self.key),
            TemplateSource::Url(url) => url.clone(),
        }
    }

    /// Markup available without fetching.
    pub fn inline_markup(&self) -> Option<&'static str> {
        match self.source {
            TemplateSource::Inline(markup) => Some(markup),
            TemplateSource::Url(_) => None,
        }
    }
}

/// Garment outlines shipped with the designer.
const BUILTIN_TEMPLATES: [(&str, &str); 4] = [
    ("tshirt-front", include_str!("../assets/templates/tshirt-front.svg")),
    ("tshirt-back", include_str!("../assets/templates/tshirt-back.svg")),
    ("tshirt-sleeve-left", include_str!("../assets/templates/tshirt-sleeve-left.svg")),
    ("tshirt-sleeve-right", include_str!("../assets/templates/tshirt-sleeve-right.svg")),
];

/// `scheme://rest`, where the scheme is a letter followed by letters, digits,
/// `+`, `-` or `.`.
fn is_url(identifier: &str) -> bool {
    let Some((scheme, rest)) = identifier.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    let starts_alpha = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    starts_alpha
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        && !rest.is_empty()
}

/// Registry mapping template keys to vector resources.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    entries: Vec<(String, TemplateSource)>,
}

impl Default for TemplateStore {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TemplateStore {
    /// Registry holding the built-in garment templates.
    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN_TEMPLATES
                .iter()
                .map(|&(key, markup)| (key.to_string(), TemplateSource::Inline(markup)))
                .collect(),
        }
    }

    /// Registry with no entries; URLs still resolve.
    pub fn empty() -> Self {
        Self { entries: Vec::new() }
    }

    /// Register an additional template (replacing one with the same key).
    pub fn with_template(mut self, key: impl Into<String>, source: TemplateSource) -> Self {
        let key = key.into();
        self.entries.retain(|(existing, _)| *existing != key);
        self.entries.push((key, source));
        self
    }

    /// Registered keys.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// Resolve a template identifier.
    pub fn resolve(&self, key: &str) -> TemplateResult<VectorResource> {
        if let Some((key, source)) = self.entries.iter().find(|(k, _)| k == key) {
            return Ok(VectorResource {
                key: key.clone(),
                source: source.clone(),
            });
        }
        if is_url(key) {
            return Ok(VectorResource {
                key: key.to_string(),
                source: TemplateSource::Url(key.to_string()),
            });
        }
        Err(TemplateError::NotFound(key.to_string()))
    }

    /// Resolve the template a product assigns to a view.
    pub fn resolve_view(&self, product: &Product, view: ViewKey) -> TemplateResult<VectorResource> {
        let key = product
            .design_templates
            .get(view)
            .ok_or(TemplateError::Unassigned(view))?;
        self.resolve(key)
    }
}
