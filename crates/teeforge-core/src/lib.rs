//! Teeforge Core Library
//!
//! Platform-agnostic data structures and logic for the Teeforge garment
//! designer: products and their per-view templates, overlay layers, print-area
//! bounds, the transform controller and the per-product design session.

pub mod bounds;
pub mod catalog;
pub mod color;
pub mod config;
pub mod overlay;
pub mod product;
pub mod session;
pub mod switcher;
pub mod template;
pub mod transform;
pub mod view;

pub use bounds::{BoundsState, clamp_rect, is_within, remap_rect};
pub use catalog::{Catalog, CatalogError, ProductForm};
pub use color::{ColorError, GarmentColor, HexColor, swatches};
pub use config::DesignerConfig;
pub use overlay::{ImageFormat, ImageRef, OverlayLayer, UploadError, UploadedFile};
pub use product::{DesignTemplates, Product};
pub use session::{DesignSession, LayoutRequest, SessionError};
pub use switcher::ViewSwitcher;
pub use template::{TemplateError, TemplateSource, TemplateStore, VectorResource};
pub use transform::{DragTarget, EditOutcome, HandleKind, Modifiers, TransformController};
pub use view::{ViewError, ViewKey, ViewMap};

/// Fixtures for tests in this crate and, with the `test-support` feature,
/// in dependent crates.
#[cfg(any(test, feature = "test-support"))]
pub mod test_support {
    use crate::color::GarmentColor;
    use crate::product::{DesignTemplates, Product};
    use crate::view::ViewKey;

    /// Minimal PNG header carrying the given dimensions.
    pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        bytes.extend_from_slice(&[0, 0, 0, 13]);
        bytes.extend_from_slice(b"IHDR");
        bytes.extend_from_slice(&width.to_be_bytes());
        bytes.extend_from_slice(&height.to_be_bytes());
        bytes
    }

    /// Product offering front and back in red and black.
    pub fn product() -> Product {
        Product {
            id: "p1".to_string(),
            user_id: "seller-1".to_string(),
            name: "Classic Tee".to_string(),
            description: "Heavyweight cotton".to_string(),
            category: "T-Shirts".to_string(),
            price: 25.0,
            offer_price: 19.0,
            images: vec!["https://cdn.example.com/tee.png".to_string()],
            date: 1_700_000_000_000,
            design_templates: DesignTemplates::default()
                .with(ViewKey::Front, "tshirt-front")
                .with(ViewKey::Back, "tshirt-back"),
            available_colors: vec![
                GarmentColor::new("Red", "#EF4444"),
                GarmentColor::new("Black", "#1F2937"),
            ],
        }
    }
}
