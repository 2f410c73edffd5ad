//! Design session: the ephemeral per-product designer state.
//!
//! A session is created when the designer opens for a product and dropped
//! (or [`DesignSession::close`]d) when the user navigates away. It is owned by
//! the surrounding application and passed by reference to the canvas and the
//! transform controller. Nothing in it is ever persisted.

use crate::bounds::{BoundsState, clamp_rect, remap_rect};
use crate::color::{ColorError, GarmentColor, HexColor, swatches};
use crate::config::DesignerConfig;
use crate::overlay::{ImageRef, OverlayLayer, UploadError, UploadedFile};
use crate::product::Product;
use crate::switcher::ViewSwitcher;
use crate::view::{ViewError, ViewKey, ViewMap};
use thiserror::Error;

/// Session errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Product {0} has no design templates")]
    NoViews(String),
}

/// Ask the rendering layer to (re)compute bounds for a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutRequest {
    pub view: ViewKey,
}

/// Parts of the session the transform controller edits in one commit.
pub(crate) struct ActiveEdit<'a> {
    pub layer: &'a mut OverlayLayer,
    pub bounds: kurbo::Rect,
    pub config: &'a DesignerConfig,
}

/// Why an edit could not reach a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EditBlocked {
    NoLayer,
    BoundsUnavailable,
}

/// Designer state for one product.
#[derive(Debug)]
pub struct DesignSession {
    product_id: String,
    config: DesignerConfig,
    switcher: ViewSwitcher,
    colors: Vec<GarmentColor>,
    current_color: usize,
    designs: ViewMap<OverlayLayer>,
    bounds: ViewMap<BoundsState>,
    layout_pending: Option<ViewKey>,
}

impl DesignSession {
    /// Open the designer for a product.
    pub fn open(product: &Product, config: DesignerConfig) -> Result<Self, SessionError> {
        let switcher = ViewSwitcher::new(&product.design_templates)
            .ok_or_else(|| SessionError::NoViews(product.id.clone()))?;

        let mut colors: Vec<GarmentColor> = product
            .available_colors
            .iter()
            .filter(|c| match c.value() {
                Ok(_) => true,
                Err(e) => {
                    log::warn!("Product {}: skipping color {:?}: {}", product.id, c.name, e);
                    false
                }
            })
            .cloned()
            .collect();
        if colors.is_empty() {
            log::debug!("Product {} has no colors, using default swatch", product.id);
            colors = swatches().into_iter().take(1).collect();
        }

        let active = switcher.active();
        log::debug!("Opened design session for product {} on view {}", product.id, active);

        Ok(Self {
            product_id: product.id.clone(),
            config,
            switcher,
            colors,
            current_color: 0,
            designs: ViewMap::new(),
            bounds: ViewMap::new(),
            layout_pending: Some(active),
        })
    }

    /// Tear the session down, discarding all designs.
    pub fn close(self) {
        log::debug!(
            "Closing design session for product {} ({} designed views)",
            self.product_id,
            self.designs.len()
        );
    }

    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    pub fn config(&self) -> &DesignerConfig {
        &self.config
    }

    pub fn available_views(&self) -> &[ViewKey] {
        self.switcher.views()
    }

    pub fn active_view(&self) -> ViewKey {
        self.switcher.active()
    }

    /// Switch the active view. Other views' layers and bounds are untouched;
    /// the new view keeps its last bounds until layout recomputes them.
    pub fn select_view(&mut self, view: ViewKey) -> Result<LayoutRequest, ViewError> {
        if self.switcher.select(view)? {
            log::debug!("Active view -> {}", view);
        }
        self.layout_pending = Some(view);
        Ok(LayoutRequest { view })
    }

    /// View awaiting a bounds recomputation, if any.
    pub fn layout_pending(&self) -> Option<ViewKey> {
        self.layout_pending
    }

    /// Mark the active view as needing layout (resize, re-render).
    pub fn request_layout(&mut self) -> LayoutRequest {
        let view = self.active_view();
        self.layout_pending = Some(view);
        LayoutRequest { view }
    }

    pub fn colors(&self) -> &[GarmentColor] {
        &self.colors
    }

    pub fn current_color(&self) -> &GarmentColor {
        &self.colors[self.current_color]
    }

    /// Parsed value of the current color.
    pub fn current_color_value(&self) -> HexColor {
        // Colors are validated on open.
        self.current_color().value().unwrap_or(HexColor::new(255, 255, 255))
    }

    /// Select a color by value (`#EF4444`, case-insensitive, short form
    /// allowed). Colors the product does not offer are rejected and the
    /// current color is kept.
    pub fn select_color(&mut self, value: &str) -> Result<&GarmentColor, ColorError> {
        let wanted = HexColor::parse(value)?;
        let index = self
            .colors
            .iter()
            .position(|c| c.value().ok() == Some(wanted))
            .ok_or_else(|| ColorError::NotAvailable(value.to_string()))?;
        self.current_color = index;
        Ok(&self.colors[index])
    }

    /// Select a color by its display name.
    pub fn select_color_named(&mut self, name: &str) -> Result<&GarmentColor, ColorError> {
        let index = self
            .colors
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| ColorError::NotAvailable(name.to_string()))?;
        self.current_color = index;
        Ok(&self.colors[index])
    }

    pub fn bounds(&self, view: ViewKey) -> BoundsState {
        self.bounds.get(view).copied().unwrap_or_default()
    }

    pub fn active_bounds(&self) -> BoundsState {
        self.bounds(self.active_view())
    }

    /// Store freshly computed bounds for a view.
    ///
    /// An existing layer follows the change: remapped when the view already
    /// had bounds, otherwise clamped into the new bounds.
    pub fn set_bounds(&mut self, view: ViewKey, state: BoundsState) {
        let previous = self.bounds(view);
        if let (Some(layer), BoundsState::Available(new)) = (self.designs.get_mut(view), state) {
            let rect = match previous {
                BoundsState::Available(old) if old != new => remap_rect(layer.rect(), old, new),
                _ => layer.rect(),
            };
            layer.set_rect(clamp_rect(rect, new, self.config.lock_aspect_ratio));
        }
        if previous != state {
            log::debug!("Bounds for {}: {:?}", view, state);
        }
        self.bounds.insert(view, state);
        if self.layout_pending == Some(view) {
            self.layout_pending = None;
        }
    }

    /// Upload a file to the active view, replacing any existing layer.
    pub fn upload(&mut self, file: Option<UploadedFile>) -> Result<&OverlayLayer, UploadError> {
        let file = file
            .ok_or(UploadError::NoFile)
            .inspect_err(|e| log::debug!("Upload ignored: {}", e))?;
        let image =
            ImageRef::from_upload(file).inspect_err(|e| log::debug!("Upload ignored: {}", e))?;
        self.upload_image(image)
    }

    /// Place an already-wrapped image on the active view. Refused until the
    /// view's print-area bounds are available.
    pub fn upload_image(&mut self, image: ImageRef) -> Result<&OverlayLayer, UploadError> {
        let view = self.active_view();
        let bounds = match self.bounds(view) {
            BoundsState::Available(rect) => rect,
            BoundsState::Pending => {
                log::debug!("Upload to {} ignored: print area not resolved yet", view);
                return Err(UploadError::BoundsPending);
            }
            BoundsState::Unavailable => {
                log::warn!("Upload to {} ignored: print area unavailable", view);
                return Err(UploadError::BoundsUnavailable);
            }
        };

        let layer = OverlayLayer::place(image, bounds, &self.config);
        if self.designs.contains(view) {
            log::debug!("Replacing design on {}", view);
        }
        Ok(self.designs.put(view, layer))
    }

    pub fn layer(&self, view: ViewKey) -> Option<&OverlayLayer> {
        self.designs.get(view)
    }

    pub fn active_layer(&self) -> Option<&OverlayLayer> {
        self.layer(self.active_view())
    }

    /// Views that have a design.
    pub fn designed_views(&self) -> impl Iterator<Item = ViewKey> + '_ {
        self.designs.iter().map(|(view, _)| view)
    }

    /// Resolve the active view now and borrow what an edit needs.
    pub(crate) fn active_edit(&mut self) -> Result<ActiveEdit<'_>, EditBlocked> {
        let view = self.switcher.active();
        let bounds = self
            .bounds
            .get(view)
            .and_then(BoundsState::available)
            .ok_or(EditBlocked::BoundsUnavailable)?;
        let layer = self.designs.get_mut(view).ok_or(EditBlocked::NoLayer)?;
        Ok(ActiveEdit {
            layer,
            bounds,
            config: &self.config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::DesignTemplates;
    use crate::test_support::{png_bytes, product};
    use kurbo::Rect;

    fn session() -> DesignSession {
        DesignSession::open(&product(), DesignerConfig::default()).unwrap()
    }

    fn png(name: &str) -> Option<UploadedFile> {
        Some(UploadedFile::new(name, png_bytes(100, 100)))
    }

    #[test]
    fn test_open_defaults() {
        let s = session();
        assert_eq!(s.active_view(), ViewKey::Front);
        assert_eq!(s.current_color().name, "Red");
        assert_eq!(s.layout_pending(), Some(ViewKey::Front));
        assert_eq!(s.active_bounds(), BoundsState::Pending);
    }

    #[test]
    fn test_open_without_views_fails() {
        let mut p = product();
        p.design_templates = DesignTemplates::default();
        assert!(matches!(
            DesignSession::open(&p, DesignerConfig::default()),
            Err(SessionError::NoViews(_))
        ));
    }

    #[test]
    fn test_open_without_colors_uses_white() {
        let mut p = product();
        p.available_colors.clear();
        let s = DesignSession::open(&p, DesignerConfig::default()).unwrap();
        assert_eq!(s.current_color().hex, "#FFFFFF");
    }

    #[test]
    fn test_no_layer_until_upload() {
        let s = session();
        for view in ViewKey::ALL {
            assert!(s.layer(view).is_none());
        }
    }

    #[test]
    fn test_invalid_uploads_ignored() {
        let mut s = session();
        s.set_bounds(ViewKey::Front, BoundsState::Available(Rect::new(0.0, 0.0, 100.0, 100.0)));
        assert_eq!(s.upload(None).unwrap_err(), UploadError::NoFile);
        assert_eq!(
            s.upload(Some(UploadedFile::new("a.png", Vec::new()))).unwrap_err(),
            UploadError::Empty
        );
        assert!(s.active_layer().is_none());
    }

    #[test]
    fn test_invalid_upload_keeps_existing_layer() {
        let mut s = session();
        s.set_bounds(ViewKey::Front, BoundsState::Available(Rect::new(0.0, 0.0, 100.0, 100.0)));
        let id = s.upload(png("a.png")).unwrap().image.id();
        assert!(s.upload(Some(UploadedFile::new("b.png", Vec::new()))).is_err());
        assert_eq!(s.active_layer().unwrap().image.id(), id);
    }

    #[test]
    fn test_upload_refused_when_unavailable() {
        let mut s = session();
        s.set_bounds(ViewKey::Front, BoundsState::Unavailable);
        assert_eq!(s.upload(png("a.png")).unwrap_err(), UploadError::BoundsUnavailable);
        assert!(s.layer(ViewKey::Front).is_none());
    }

    #[test]
    fn test_reupload_replaces_layer() {
        let mut s = session();
        let bounds = Rect::new(0.0, 0.0, 200.0, 200.0);
        s.set_bounds(ViewKey::Front, BoundsState::Available(bounds));
        let first = s.upload(png("a.png")).unwrap().clone();

        let fresh = s.upload(png("b.png")).unwrap().clone();
        assert_ne!(first.image, fresh.image);
        assert_eq!(fresh.rect(), Rect::new(20.0, 20.0, 180.0, 180.0));
        assert!(fresh.rotation.abs() < f64::EPSILON);
    }

    #[test]
    fn test_color_selection() {
        let mut s = session();
        assert_eq!(s.select_color("#1f2937").unwrap().name, "Black");
        assert!(matches!(s.select_color("#00FF00"), Err(ColorError::NotAvailable(_))));
        assert!(s.select_color("not-a-color").is_err());
        assert_eq!(s.current_color().name, "Black");
        assert_eq!(s.select_color_named("Red").unwrap().hex, "#EF4444");
    }

    #[test]
    fn test_color_and_view_independent() {
        let mut s = session();
        s.select_color("#1F2937").unwrap();
        s.select_view(ViewKey::Back).unwrap();
        assert_eq!(s.current_color().name, "Black");
        s.select_color("#EF4444").unwrap();
        assert_eq!(s.active_view(), ViewKey::Back);
    }

    #[test]
    fn test_view_roundtrip_preserves_state() {
        let mut s = session();
        let front_bounds = Rect::new(10.0, 10.0, 110.0, 160.0);
        s.set_bounds(ViewKey::Front, BoundsState::Available(front_bounds));
        let front_layer = s.upload(png("a.png")).unwrap().clone();

        s.select_view(ViewKey::Back).unwrap();
        s.set_bounds(ViewKey::Back, BoundsState::Available(Rect::new(0.0, 0.0, 50.0, 50.0)));
        s.upload(png("b.png")).unwrap();

        s.select_view(ViewKey::Front).unwrap();
        assert_eq!(s.active_layer(), Some(&front_layer));
        assert_eq!(s.active_layer().unwrap().rect(), front_layer.rect());
        assert_eq!(s.active_bounds(), BoundsState::Available(front_bounds));
        assert_eq!(s.layout_pending(), Some(ViewKey::Front));
    }

    #[test]
    fn test_select_view_not_offered() {
        let mut s = session();
        assert!(s.select_view(ViewKey::SleeveLeft).is_err());
        assert_eq!(s.active_view(), ViewKey::Front);
    }

    #[test]
    fn test_bounds_change_remaps_layer() {
        let mut s = session();
        s.set_bounds(ViewKey::Front, BoundsState::Available(Rect::new(0.0, 0.0, 100.0, 100.0)));
        s.upload(png("a.png")).unwrap();
        assert_eq!(s.active_layer().unwrap().rect(), Rect::new(10.0, 10.0, 90.0, 90.0));

        s.set_bounds(ViewKey::Front, BoundsState::Available(Rect::new(0.0, 0.0, 200.0, 200.0)));
        assert_eq!(s.active_layer().unwrap().rect(), Rect::new(20.0, 20.0, 180.0, 180.0));
        assert_eq!(s.layout_pending(), None);
    }

    #[test]
    fn test_upload_refused_while_pending() {
        let mut s = session();
        assert_eq!(s.active_bounds(), BoundsState::Pending);
        assert_eq!(s.upload(png("a.png")).unwrap_err(), UploadError::BoundsPending);
        assert!(s.layer(ViewKey::Front).is_none());

        let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
        s.set_bounds(ViewKey::Front, BoundsState::Available(bounds));
        let rect = s.upload(png("a.png")).unwrap().rect();
        assert!(crate::bounds::is_within(rect, bounds));
    }

    #[test]
    fn test_bounds_lost_refuses_upload_on_that_view_only() {
        let mut s = session();
        s.set_bounds(ViewKey::Back, BoundsState::Available(Rect::new(0.0, 0.0, 80.0, 80.0)));
        s.set_bounds(ViewKey::Front, BoundsState::Unavailable);
        assert!(s.upload(png("a.png")).is_err());

        s.select_view(ViewKey::Back).unwrap();
        assert!(s.upload(png("b.png")).is_ok());
        assert!(s.layer(ViewKey::Front).is_none());
    }
}
