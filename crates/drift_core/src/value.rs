//! Animatable value types
//!
//! `AnimValue` is the closed set of value shapes the animation core can
//! drive: a bare scalar, a 2D vector, a 3D vector, or an RGBA color. Engines
//! operate on flat `f32` component lanes; this module is the single place
//! where typed values are packed into and unpacked from those lanes, so the
//! shape dispatch happens exactly once, at binding time.

use serde::{Deserialize, Serialize};

use crate::math::{Color, Vec2, Vec3};

/// The shape of an animatable value, identified by component count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    /// One component (rotation angle, opacity, ...)
    Scalar,
    /// Two components (2D position, 2D scale)
    Pair,
    /// Three components (3D translation, 3D scale)
    Triple,
    /// Four components (RGBA color)
    Quad,
}

impl ValueKind {
    /// Number of scalar components a value of this kind occupies.
    pub const fn components(self) -> usize {
        match self {
            ValueKind::Scalar => 1,
            ValueKind::Pair => 2,
            ValueKind::Triple => 3,
            ValueKind::Quad => 4,
        }
    }
}

/// A value that can be animated.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum AnimValue {
    Scalar(f32),
    Pair(Vec2),
    Triple(Vec3),
    Quad(Color),
}

impl AnimValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            AnimValue::Scalar(_) => ValueKind::Scalar,
            AnimValue::Pair(_) => ValueKind::Pair,
            AnimValue::Triple(_) => ValueKind::Triple,
            AnimValue::Quad(_) => ValueKind::Quad,
        }
    }

    pub fn component_count(&self) -> usize {
        self.kind().components()
    }

    /// Copy this value's components into the head of `out`.
    ///
    /// `out` must hold at least `component_count()` floats.
    pub fn write_components(&self, out: &mut [f32]) {
        match self {
            AnimValue::Scalar(v) => out[0] = *v,
            AnimValue::Pair(v) => {
                out[0] = v.x;
                out[1] = v.y;
            }
            AnimValue::Triple(v) => {
                out[0] = v.x;
                out[1] = v.y;
                out[2] = v.z;
            }
            AnimValue::Quad(c) => {
                out[0] = c.r;
                out[1] = c.g;
                out[2] = c.b;
                out[3] = c.a;
            }
        }
    }

    /// Rebuild a value of `kind` from flat components.
    ///
    /// Missing components read as 0.0; the call never fails.
    pub fn from_components(kind: ValueKind, components: &[f32]) -> AnimValue {
        let at = |i: usize| components.get(i).copied().unwrap_or(0.0);
        match kind {
            ValueKind::Scalar => AnimValue::Scalar(at(0)),
            ValueKind::Pair => AnimValue::Pair(Vec2::new(at(0), at(1))),
            ValueKind::Triple => AnimValue::Triple(Vec3::new(at(0), at(1), at(2))),
            ValueKind::Quad => AnimValue::Quad(Color::rgba(at(0), at(1), at(2), at(3))),
        }
    }

    /// Read one component by index (0.0 when out of range).
    pub fn component(&self, index: usize) -> f32 {
        let mut buf = [0.0f32; 4];
        self.write_components(&mut buf);
        buf.get(index).copied().unwrap_or(0.0)
    }
}

impl From<f32> for AnimValue {
    fn from(v: f32) -> Self {
        AnimValue::Scalar(v)
    }
}

impl From<Vec2> for AnimValue {
    fn from(v: Vec2) -> Self {
        AnimValue::Pair(v)
    }
}

impl From<Vec3> for AnimValue {
    fn from(v: Vec3) -> Self {
        AnimValue::Triple(v)
    }
}

impl From<Color> for AnimValue {
    fn from(c: Color) -> Self {
        AnimValue::Quad(c)
    }
}
