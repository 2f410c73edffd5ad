//! Designer canvas: drives template loading, recoloring and print-area
//! layout for the session's active view.
//!
//! The canvas never measures anything itself. The platform renders what
//! [`DesignerCanvas::render_active`] returns and reports the resulting
//! geometry through [`DesignerCanvas::on_layout`], or, where it cannot
//! observe render completion, through [`DesignerCanvas::poll_settle`].

use crate::document::{RenderError, RenderedTemplate, VectorDocument};
use crate::fetch::{FetchError, TemplateFetcher};
use crate::layout::{LayoutSignal, SettleTimer};
use crate::loader::{FetchRequest, FetchTicket, TemplateLoader};
use crate::resolver::{RenderedLayout, resolve_print_area};
use kurbo::Rect;
use std::sync::Arc;
use std::time::Instant;
use teeforge_core::bounds::BoundsState;
use teeforge_core::color::{ColorError, GarmentColor};
use teeforge_core::config::DesignerConfig;
use teeforge_core::overlay::OverlayLayer;
use teeforge_core::product::Product;
use teeforge_core::session::DesignSession;
use teeforge_core::template::TemplateStore;
use teeforge_core::view::{ViewError, ViewKey, ViewMap};

/// Placeholder shown when a view's template cannot be displayed.
pub const TEMPLATE_UNAVAILABLE: &str = "Design template not available for this view.";

#[derive(Debug, Clone)]
enum ViewDocument {
    Loading { src: String },
    Ready { src: String, document: Arc<VectorDocument> },
    Unavailable,
}

/// Where and how to draw the overlay image.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayPlacement {
    pub data_url: String,
    pub rect: Rect,
    /// Display rotation in degrees, in [-180, 180).
    pub rotation: f64,
}

impl From<&OverlayLayer> for OverlayPlacement {
    fn from(layer: &OverlayLayer) -> Self {
        Self {
            data_url: layer.image.data_url(),
            rect: layer.rect(),
            rotation: layer.display_rotation(),
        }
    }
}

/// What the platform should display for the active view.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderedView {
    /// Template markup is still being fetched.
    Loading { view: ViewKey },
    /// Recolored template and current bounds. The overlay is only present
    /// while the bounds are available.
    Template {
        view: ViewKey,
        template: RenderedTemplate,
        bounds: BoundsState,
        overlay: Option<OverlayPlacement>,
    },
    /// The template is missing or failed to load.
    Unavailable { view: ViewKey, message: &'static str },
}

/// Template pipeline for one product's design session.
#[derive(Debug)]
pub struct DesignerCanvas {
    store: TemplateStore,
    product: Product,
    loader: TemplateLoader,
    documents: ViewMap<ViewDocument>,
    settle: SettleTimer,
}

impl DesignerCanvas {
    pub fn new(store: TemplateStore, product: &Product, config: &DesignerConfig) -> Self {
        Self {
            store,
            product: product.clone(),
            loader: TemplateLoader::new(),
            documents: ViewMap::new(),
            settle: SettleTimer::new(config.settle_delay()),
        }
    }

    /// Prepare the active view's template. Returns a fetch for the platform
    /// to perform when the markup is neither built in nor cached.
    pub fn activate(&mut self, session: &mut DesignSession) -> Option<FetchRequest> {
        let view = session.active_view();
        let resource = match self.store.resolve_view(&self.product, view) {
            Ok(resource) => resource,
            Err(e) => {
                log::warn!("No template for {}: {}", view, e);
                self.mark_unavailable(session, view);
                return None;
            }
        };
        let src = resource.src();

        match self.documents.get(view) {
            Some(ViewDocument::Ready { src: current, .. }) if *current == src => {
                self.schedule_layout(session, view);
                return None;
            }
            Some(ViewDocument::Loading { src: current })
                if *current == src && self.loader.is_loading(view) =>
            {
                return None;
            }
            _ => {}
        }

        if let Some(document) = self.loader.cached(&src) {
            self.install(session, view, src, document);
            return None;
        }

        if let Some(markup) = resource.inline_markup() {
            match VectorDocument::parse(markup, &session.config().print_area_id) {
                Ok(document) => {
                    let document = Arc::new(document);
                    self.loader.store(src.clone(), document.clone());
                    self.install(session, view, src, document);
                }
                Err(e) => {
                    log::warn!("Built-in template {} failed to parse: {}", resource.key, e);
                    self.mark_unavailable(session, view);
                }
            }
            return None;
        }

        let ticket = self.loader.begin(view, &src);
        self.documents.insert(view, ViewDocument::Loading { src: src.clone() });
        log::debug!("Fetching template for {}: {}", view, src);
        Some(FetchRequest { ticket, url: src })
    }

    /// Apply a fetch result. Results for superseded tickets are dropped.
    /// Returns whether the result was applied.
    pub fn complete_fetch(
        &mut self,
        session: &mut DesignSession,
        ticket: FetchTicket,
        result: Result<String, FetchError>,
    ) -> bool {
        if !self.loader.is_current(&ticket) {
            log::debug!("Dropping stale template for {}: {}", ticket.view(), ticket.src());
            return false;
        }
        self.loader.finish(&ticket);

        let view = ticket.view();
        let parsed = result
            .map_err(RenderError::from)
            .and_then(|markup| VectorDocument::parse(&markup, &session.config().print_area_id));
        match parsed {
            Ok(document) => {
                let document = Arc::new(document);
                self.loader.store(ticket.src(), document.clone());
                self.install(session, view, ticket.src().to_string(), document);
            }
            Err(e) => {
                log::warn!("Template for {} unavailable: {}", view, e);
                self.mark_unavailable(session, view);
            }
        }
        true
    }

    /// Drop the active view's template and load it again.
    pub fn reload(&mut self, session: &mut DesignSession) -> Option<FetchRequest> {
        let view = session.active_view();
        self.loader.cancel(view);
        if let Some(ViewDocument::Ready { src, .. }) = self.documents.remove(view) {
            self.loader.evict(&src);
        }
        self.activate(session)
    }

    /// Recompute the active view's bounds from reported geometry.
    pub fn on_layout(&mut self, session: &mut DesignSession, signal: LayoutSignal) -> BoundsState {
        let view = session.active_view();
        self.settle.cancel();
        let state = match self.documents.get(view) {
            Some(ViewDocument::Ready { document, .. }) => {
                resolve_print_area(Some(document.as_ref()), signal.layout())
            }
            Some(ViewDocument::Unavailable) => BoundsState::Unavailable,
            Some(ViewDocument::Loading { .. }) | None => return session.bounds(view),
        };
        session.set_bounds(view, state);
        state
    }

    /// Fixed-delay fallback: once the settle delay has passed, read geometry
    /// via `measure` and recompute bounds.
    pub fn poll_settle(
        &mut self,
        session: &mut DesignSession,
        now: Instant,
        measure: impl FnOnce(ViewKey) -> Option<RenderedLayout>,
    ) -> Option<BoundsState> {
        let view = self.settle.poll(now)?;
        if view != session.active_view() {
            log::debug!("Settle timer expired for inactive view {}", view);
            return None;
        }
        let layout = measure(view)?;
        Some(self.on_layout(session, LayoutSignal::RenderComplete(layout)))
    }

    /// Switch views and prepare the new view's template.
    pub fn select_view(
        &mut self,
        session: &mut DesignSession,
        view: ViewKey,
    ) -> Result<Option<FetchRequest>, ViewError> {
        session.select_view(view)?;
        Ok(self.activate(session))
    }

    /// Change the garment color. The template re-renders, so bounds are
    /// scheduled for recomputation.
    pub fn select_color(
        &mut self,
        session: &mut DesignSession,
        value: &str,
    ) -> Result<GarmentColor, ColorError> {
        let color = session.select_color(value)?.clone();
        let view = session.active_view();
        self.schedule_layout(session, view);
        Ok(color)
    }

    /// What to display for the active view.
    pub fn render_active(&self, session: &DesignSession) -> RenderedView {
        let view = session.active_view();
        match self.documents.get(view) {
            Some(ViewDocument::Ready { document, .. }) => {
                let bounds = session.active_bounds();
                let overlay = match bounds {
                    BoundsState::Available(_) => session.active_layer().map(OverlayPlacement::from),
                    BoundsState::Pending | BoundsState::Unavailable => None,
                };
                RenderedView::Template {
                    view,
                    template: document.render(session.current_color_value()),
                    bounds,
                    overlay,
                }
            }
            Some(ViewDocument::Unavailable) => RenderedView::Unavailable {
                view,
                message: TEMPLATE_UNAVAILABLE,
            },
            Some(ViewDocument::Loading { .. }) | None => RenderedView::Loading { view },
        }
    }

    /// Activate the current view and, if needed, fetch its template with
    /// `fetcher`. Returns whether fetched markup was applied.
    pub async fn load_active(
        &mut self,
        session: &mut DesignSession,
        fetcher: &dyn TemplateFetcher,
    ) -> bool {
        let Some(request) = self.activate(session) else {
            return false;
        };
        let result = fetcher.fetch(&request.url).await;
        self.complete_fetch(session, request.ticket, result)
    }

    fn install(
        &mut self,
        session: &mut DesignSession,
        view: ViewKey,
        src: String,
        document: Arc<VectorDocument>,
    ) {
        self.documents.insert(view, ViewDocument::Ready { src, document });
        if view == session.active_view() {
            self.schedule_layout(session, view);
        }
    }

    fn mark_unavailable(&mut self, session: &mut DesignSession, view: ViewKey) {
        self.documents.insert(view, ViewDocument::Unavailable);
        session.set_bounds(view, BoundsState::Unavailable);
    }

    fn schedule_layout(&mut self, session: &mut DesignSession, view: ViewKey) {
        session.request_layout();
        self.settle.arm(view, Instant::now());
    }
}
