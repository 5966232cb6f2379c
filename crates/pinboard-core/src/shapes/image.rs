//! Image shape and the assets it displays.

use super::{Shape, ShapeProps};
use crate::handler::{ShapeCapabilities, ShapeHandler};
use kurbo::{Rect, Size};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Type tag for image shapes.
pub const IMAGE: &str = "image";

/// Unique identifier for assets.
pub type AssetId = Uuid;

/// Image format for stored image data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ImageFormat {
    #[default]
    Png,
    Jpeg,
    WebP,
}

impl ImageFormat {
    /// Get MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::WebP => "image/webp",
        }
    }

    /// Detect format from a MIME type.
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        match mime.to_lowercase().as_str() {
            "image/png" => Some(ImageFormat::Png),
            "image/jpeg" | "image/jpg" => Some(ImageFormat::Jpeg),
            "image/webp" => Some(ImageFormat::WebP),
            _ => None,
        }
    }

    /// Detect format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Some(ImageFormat::Png);
        }
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageFormat::Jpeg);
        }
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Some(ImageFormat::WebP);
        }
        None
    }
}

/// A stored image the host can display through image shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: AssetId,
    /// Image source, usually a `data:` URL.
    pub src: String,
    pub w: f64,
    pub h: f64,
    pub format: ImageFormat,
    pub name: String,
    #[serde(default)]
    pub is_animated: bool,
}

impl Asset {
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }
}

/// Properties of an image shape.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ImageProps {
    pub w: f64,
    pub h: f64,
    pub asset_id: Option<AssetId>,
}

impl ImageProps {
    pub fn new(asset_id: AssetId, w: f64, h: f64) -> Self {
        Self {
            w,
            h,
            asset_id: Some(asset_id),
        }
    }
}

/// Handler for [`IMAGE`] shapes.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageShapeHandler;

impl ShapeHandler for ImageShapeHandler {
    fn kind(&self) -> &'static str {
        IMAGE
    }

    fn default_props(&self) -> ShapeProps {
        ShapeProps::Image(ImageProps::default())
    }

    fn capabilities(&self) -> ShapeCapabilities {
        ShapeCapabilities {
            aspect_ratio_locked: true,
            ..ShapeCapabilities::default()
        }
    }

    fn geometry(&self, shape: &Shape) -> Rect {
        match &shape.props {
            ShapeProps::Image(props) => Rect::new(0.0, 0.0, props.w, props.h),
            _ => Rect::ZERO,
        }
    }

    fn on_resize(&self, shape: &Shape, size: Size) -> Option<ShapeProps> {
        match &shape.props {
            ShapeProps::Image(props) => Some(ShapeProps::Image(ImageProps {
                w: size.width.abs(),
                h: size.height.abs(),
                asset_id: props.asset_id,
            })),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(
            ImageFormat::from_magic_bytes(&[0x89, 0x50, 0x4E, 0x47, 0x0D]),
            Some(ImageFormat::Png)
        );
        assert_eq!(ImageFormat::from_magic_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_magic_bytes(b"GIF8"), None);
        assert_eq!(ImageFormat::from_mime_type("IMAGE/PNG"), Some(ImageFormat::Png));
    }

    #[test]
    fn test_image_is_aspect_locked() {
        assert!(ImageShapeHandler.capabilities().aspect_ratio_locked);
    }
}
