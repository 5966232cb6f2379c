//! Shape records and the built-in shape types.

mod card;
mod frame;
mod geo;
mod image;
mod pin;

pub use card::{CardProps, CardShapeHandler, CardView, SIZE_BUTTON};
pub use frame::{FRAME, FrameProps, FrameShapeHandler};
pub use geo::{GEO, GeoProps, GeoShapeHandler};
pub use image::{Asset, AssetId, IMAGE, ImageFormat, ImageProps, ImageShapeHandler};
pub use pin::{PIN, PIN_OFFSET_X, PIN_OFFSET_Y, PIN_SIZE, PinProps, PinShapeHandler};

use kurbo::Point;
use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for shapes.
pub type ShapeId = Uuid;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Format as a `#rrggbb` hex string.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Named color style from the default palette (light theme).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorStyle {
    #[default]
    Black,
    Grey,
    LightViolet,
    Violet,
    Blue,
    LightBlue,
    Yellow,
    Orange,
    Green,
    LightGreen,
    LightRed,
    Red,
    White,
}

impl ColorStyle {
    /// Full-strength variant used for text and strokes.
    pub fn solid(self) -> SerializableColor {
        match self {
            ColorStyle::Black => SerializableColor::rgb(0x1d, 0x1d, 0x1d),
            ColorStyle::Grey => SerializableColor::rgb(0x9f, 0xa8, 0xb2),
            ColorStyle::LightViolet => SerializableColor::rgb(0xe0, 0x85, 0xf4),
            ColorStyle::Violet => SerializableColor::rgb(0xae, 0x3e, 0xc9),
            ColorStyle::Blue => SerializableColor::rgb(0x44, 0x65, 0xe9),
            ColorStyle::LightBlue => SerializableColor::rgb(0x4b, 0xa1, 0xf1),
            ColorStyle::Yellow => SerializableColor::rgb(0xf1, 0xac, 0x4b),
            ColorStyle::Orange => SerializableColor::rgb(0xe1, 0x69, 0x19),
            ColorStyle::Green => SerializableColor::rgb(0x09, 0x92, 0x68),
            ColorStyle::LightGreen => SerializableColor::rgb(0x4c, 0xb0, 0x5e),
            ColorStyle::LightRed => SerializableColor::rgb(0xf8, 0x77, 0x77),
            ColorStyle::Red => SerializableColor::rgb(0xe0, 0x31, 0x31),
            ColorStyle::White => SerializableColor::rgb(0xff, 0xff, 0xff),
        }
    }

    /// Washed-out variant used for backgrounds.
    pub fn semi(self) -> SerializableColor {
        match self {
            ColorStyle::Black => SerializableColor::rgb(0xe8, 0xe8, 0xe8),
            ColorStyle::Grey => SerializableColor::rgb(0xec, 0xee, 0xf0),
            ColorStyle::LightViolet => SerializableColor::rgb(0xf5, 0xea, 0xfa),
            ColorStyle::Violet => SerializableColor::rgb(0xec, 0xdc, 0xf2),
            ColorStyle::Blue => SerializableColor::rgb(0xdc, 0xe1, 0xf8),
            ColorStyle::LightBlue => SerializableColor::rgb(0xdd, 0xed, 0xfa),
            ColorStyle::Yellow => SerializableColor::rgb(0xf9, 0xf0, 0xe6),
            ColorStyle::Orange => SerializableColor::rgb(0xf8, 0xe2, 0xd4),
            ColorStyle::Green => SerializableColor::rgb(0xd3, 0xe9, 0xe3),
            ColorStyle::LightGreen => SerializableColor::rgb(0xdb, 0xf0, 0xe0),
            ColorStyle::LightRed | ColorStyle::Red => SerializableColor::rgb(0xf4, 0xda, 0xdb),
            ColorStyle::White => SerializableColor::rgb(0xf5, 0xf5, 0xf5),
        }
    }
}

/// What a shape's position is relative to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ParentId {
    #[default]
    Page,
    Shape(ShapeId),
}

/// Type-specific shape properties. The serde tag is the shape's type tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ShapeProps {
    #[serde(rename = "geo")]
    Geo(GeoProps),
    #[serde(rename = "frame")]
    Frame(FrameProps),
    #[serde(rename = "image")]
    Image(ImageProps),
    #[serde(rename = "size-button")]
    Card(CardProps),
    #[serde(rename = "pin")]
    Pin(PinProps),
}

impl ShapeProps {
    /// The type tag handlers are registered under.
    pub fn kind(&self) -> &'static str {
        match self {
            ShapeProps::Geo(_) => GEO,
            ShapeProps::Frame(_) => FRAME,
            ShapeProps::Image(_) => IMAGE,
            ShapeProps::Card(_) => SIZE_BUTTON,
            ShapeProps::Pin(_) => PIN,
        }
    }
}

/// A shape record as stored by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub id: ShapeId,
    pub parent: ParentId,
    /// Origin in the parent's coordinate space.
    pub position: Point,
    /// Rotation in radians around the origin.
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub is_locked: bool,
    pub props: ShapeProps,
}

impl Shape {
    /// Create a shape on the page at the origin with a fresh ID.
    pub fn new(props: ShapeProps) -> Self {
        Self {
            id: Uuid::new_v4(),
            parent: ParentId::Page,
            position: Point::ZERO,
            rotation: 0.0,
            is_locked: false,
            props,
        }
    }

    pub fn with_id(mut self, id: ShapeId) -> Self {
        self.id = id;
        self
    }

    pub fn at(mut self, position: Point) -> Self {
        self.position = position;
        self
    }

    pub fn with_parent(mut self, parent: ParentId) -> Self {
        self.parent = parent;
        self
    }

    pub fn locked(mut self, is_locked: bool) -> Self {
        self.is_locked = is_locked;
        self
    }

    pub fn kind(&self) -> &'static str {
        self.props.kind()
    }

    pub fn is_pin(&self) -> bool {
        matches!(self.props, ShapeProps::Pin(_))
    }

    pub fn is_image(&self) -> bool {
        matches!(self.props, ShapeProps::Image(_))
    }
}

/// Partial update applied through the host's mutation API.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeUpdate {
    pub id: ShapeId,
    pub position: Option<Point>,
    pub rotation: Option<f64>,
    pub is_locked: Option<bool>,
    pub props: Option<ShapeProps>,
}

impl ShapeUpdate {
    pub fn new(id: ShapeId) -> Self {
        Self {
            id,
            position: None,
            rotation: None,
            is_locked: None,
            props: None,
        }
    }

    pub fn position(mut self, position: Point) -> Self {
        self.position = Some(position);
        self
    }

    pub fn rotation(mut self, rotation: f64) -> Self {
        self.rotation = Some(rotation);
        self
    }

    pub fn locked(mut self, is_locked: bool) -> Self {
        self.is_locked = Some(is_locked);
        self
    }

    pub fn props(mut self, props: ShapeProps) -> Self {
        self.props = Some(props);
        self
    }

    /// The record that results from applying this update to `shape`.
    pub fn apply(&self, shape: &Shape) -> Shape {
        let mut next = shape.clone();
        if let Some(position) = self.position {
            next.position = position;
        }
        if let Some(rotation) = self.rotation {
            next.rotation = rotation;
        }
        if let Some(is_locked) = self.is_locked {
            next.is_locked = is_locked;
        }
        if let Some(props) = &self.props {
            next.props = props.clone();
        }
        next
    }
}
