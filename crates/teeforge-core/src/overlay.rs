//! Overlay layers: the user's uploaded image placed on a view.

use crate::bounds::clamp_rect;
use crate::config::DesignerConfig;
use kurbo::{Point, Rect, Size};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Upload errors. None of these create or replace a layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error("No file selected")]
    NoFile,
    #[error("Uploaded file is empty")]
    Empty,
    #[error("Print area not resolved yet")]
    BoundsPending,
    #[error("Print area unavailable for this view")]
    BoundsUnavailable,
}

/// Image format of an uploaded design.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    WebP,
    Gif,
    Svg,
}

impl ImageFormat {
    /// Get MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::WebP => "image/webp",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Svg => "image/svg+xml",
        }
    }

    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "webp" => Some(ImageFormat::WebP),
            "gif" => Some(ImageFormat::Gif),
            "svg" => Some(ImageFormat::Svg),
            _ => None,
        }
    }

    /// Detect format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 4 {
            return None;
        }

        // PNG: 89 50 4E 47
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Some(ImageFormat::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageFormat::Jpeg);
        }

        // WebP: RIFF....WEBP
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Some(ImageFormat::WebP);
        }

        if data.starts_with(b"GIF8") {
            return Some(ImageFormat::Gif);
        }

        let head = String::from_utf8_lossy(&data[..data.len().min(256)]);
        if head.trim_start().starts_with("<svg") || head.contains("<svg") {
            return Some(ImageFormat::Svg);
        }

        None
    }
}

/// Read intrinsic pixel dimensions from PNG or GIF headers.
fn header_dimensions(data: &[u8], format: Option<ImageFormat>) -> Option<Size> {
    match format? {
        ImageFormat::Png if data.len() >= 24 => {
            let w = u32::from_be_bytes([data[16], data[17], data[18], data[19]]);
            let h = u32::from_be_bytes([data[20], data[21], data[22], data[23]]);
            (w > 0 && h > 0).then(|| Size::new(w as f64, h as f64))
        }
        ImageFormat::Gif if data.len() >= 10 => {
            let w = u16::from_le_bytes([data[6], data[7]]);
            let h = u16::from_le_bytes([data[8], data[9]]);
            (w > 0 && h > 0).then(|| Size::new(w as f64, h as f64))
        }
        _ => None,
    }
}

/// A file picked by the user.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

/// Opaque handle to user-provided image bytes held in memory.
#[derive(Debug, Clone)]
pub struct ImageRef {
    id: Uuid,
    name: String,
    format: Option<ImageFormat>,
    pixel_size: Option<Size>,
    bytes: Arc<[u8]>,
}

impl PartialEq for ImageRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl ImageRef {
    /// Wrap an uploaded file. Empty files are rejected.
    pub fn from_upload(file: UploadedFile) -> Result<Self, UploadError> {
        if file.bytes.is_empty() {
            return Err(UploadError::Empty);
        }
        let format = ImageFormat::from_magic_bytes(&file.bytes).or_else(|| {
            file.name
                .rsplit_once('.')
                .and_then(|(_, ext)| ImageFormat::from_extension(ext))
        });
        let pixel_size = header_dimensions(&file.bytes, format);
        Ok(Self {
            id: Uuid::new_v4(),
            name: file.name,
            format,
            pixel_size,
            bytes: file.bytes.into(),
        })
    }

    /// Override the intrinsic size (e.g. after the platform decoded the image).
    pub fn with_pixel_size(mut self, size: Size) -> Self {
        self.pixel_size = (size.width > 0.0 && size.height > 0.0).then_some(size);
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn format(&self) -> Option<ImageFormat> {
        self.format
    }

    pub fn pixel_size(&self) -> Option<Size> {
        self.pixel_size
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// `data:` URL for display layers.
    pub fn data_url(&self) -> String {
        use base64::{Engine, engine::general_purpose::STANDARD};

        let mime = self
            .format
            .map(|f| f.mime_type())
            .unwrap_or("application/octet-stream");
        format!("data:{};base64,{}", mime, STANDARD.encode(&self.bytes))
    }
}

/// Wrap degrees into [-180, 180).
pub fn normalize_degrees(degrees: f64) -> f64 {
    (degrees + 180.0).rem_euclid(360.0) - 180.0
}

/// Placement of an uploaded image on one view.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayLayer {
    pub image: ImageRef,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Rotation in degrees around the layer center, unbounded.
    pub rotation: f64,
}

impl OverlayLayer {
    /// Default placement for a fresh upload: `fill_ratio` of the bounds,
    /// fitted to the image aspect and centered.
    pub fn place(image: ImageRef, bounds: Rect, config: &DesignerConfig) -> Self {
        let target = Size::new(
            bounds.width() * config.fill_ratio,
            bounds.height() * config.fill_ratio,
        );
        let size = match image.pixel_size() {
            Some(pixels) => fit_within(pixels, target),
            None => target,
        };
        let rect = clamp_rect(Rect::from_center_size(bounds.center(), size), bounds, true);

        Self {
            image,
            x: rect.x0,
            y: rect.y0,
            width: rect.width(),
            height: rect.height(),
            rotation: 0.0,
        }
    }

    /// Unrotated rectangle.
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    pub fn set_rect(&mut self, rect: Rect) {
        self.x = rect.x0;
        self.y = rect.y0;
        self.width = rect.width();
        self.height = rect.height();
    }

    pub fn center(&self) -> Point {
        self.rect().center()
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width / self.height.max(f64::EPSILON)
    }

    /// Rotation wrapped for display.
    pub fn display_rotation(&self) -> f64 {
        normalize_degrees(self.rotation)
    }
}

/// Scale `source` to the largest size fitting inside `target` with the same aspect.
fn fit_within(source: Size, target: Size) -> Size {
    let aspect = source.width / source.height;
    let target_aspect = target.width / target.height;

    if aspect > target_aspect {
        Size::new(target.width, target.width / aspect)
    } else {
        Size::new(target.height * aspect, target.height)
    }
}
