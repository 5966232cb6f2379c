//! Binding records and the built-in binding types.

mod pin;

pub use pin::{PIN_BINDING, PinBindingHandler, PinBindingProps, RelaxationGraph};

use crate::shapes::ShapeId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for bindings.
pub type BindingId = Uuid;

/// Type-specific binding properties. The serde tag is the binding's type tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BindingProps {
    #[serde(rename = "pin")]
    Pin(PinBindingProps),
}

impl BindingProps {
    pub fn kind(&self) -> &'static str {
        match self {
            BindingProps::Pin(_) => PIN_BINDING,
        }
    }
}

/// A directed, typed relation between two shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binding {
    pub id: BindingId,
    pub from_id: ShapeId,
    pub to_id: ShapeId,
    pub props: BindingProps,
}

impl Binding {
    pub fn kind(&self) -> &'static str {
        self.props.kind()
    }

    /// Whether either end of the binding is `id`.
    pub fn touches(&self, id: ShapeId) -> bool {
        self.from_id == id || self.to_id == id
    }
}

/// A binding to be created; the host assigns the ID.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBinding {
    pub from_id: ShapeId,
    pub to_id: ShapeId,
    pub props: BindingProps,
}

impl NewBinding {
    pub fn new(from_id: ShapeId, to_id: ShapeId, props: BindingProps) -> Self {
        Self {
            from_id,
            to_id,
            props,
        }
    }

    pub fn kind(&self) -> &'static str {
        self.props.kind()
    }

    /// Turn into a stored record with a fresh ID.
    pub fn into_binding(self) -> Binding {
        Binding {
            id: Uuid::new_v4(),
            from_id: self.from_id,
            to_id: self.to_id,
            props: self.props,
        }
    }
}
