//! Binding errors
//!
//! Runtime animation failures degrade quietly (a dead target simply stops
//! its animation); only mistakes in how a binding is requested surface as a
//! `Result`.

use thiserror::Error;

use crate::property::Property;
use crate::value::ValueKind;

/// Why an animation could not be bound to a (sink, property) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BindError {
    /// The target value's shape does not match the shape the sink reports
    /// for this property.
    #[error("property {property:?} expects a {expected:?} value, got {got:?}")]
    KindMismatch {
        property: Property,
        expected: ValueKind,
        got: ValueKind,
    },

    /// The sink does not expose this property at all.
    #[error("target object does not expose property {property:?}")]
    MissingProperty { property: Property },
}
