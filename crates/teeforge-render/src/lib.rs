//! Teeforge Render Library
//!
//! Template recoloring, print-area resolution and the designer canvas
//! pipeline. Templates are parsed once with `roxmltree`; geometry uses
//! `kurbo`.

pub mod canvas;
pub mod document;
pub mod fetch;
pub mod geometry;
pub mod layout;
pub mod loader;
pub mod resolver;

pub use canvas::{DesignerCanvas, OverlayPlacement, RenderedView, TEMPLATE_UNAVAILABLE};
pub use document::{RenderError, RenderResult, RenderedTemplate, VectorDocument};
pub use fetch::{FetchError, StaticTemplateFetcher, TemplateFetcher};
pub use layout::{LayoutSignal, SettleTimer};
pub use loader::{FetchRequest, FetchTicket, TemplateLoader};
pub use resolver::{RenderedLayout, resolve_print_area};
