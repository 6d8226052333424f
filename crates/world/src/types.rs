use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a state in the scene, `0..N`.
pub type StateId = usize;

/// A position or a set of Euler angles.
///
/// Scene files store these as `[x, y, z]` arrays while task descriptions
/// use `{"x": .., "y": .., "z": ..}` objects, so both encodings deserialize.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec3Repr")]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl From<[f32; 3]> for Vec3 {
    fn from(v: [f32; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Vec3Repr {
    Array([f32; 3]),
    Object { x: f32, y: f32, z: f32 },
}

impl From<Vec3Repr> for Vec3 {
    fn from(repr: Vec3Repr) -> Self {
        match repr {
            Vec3Repr::Array(v) => v.into(),
            Vec3Repr::Object { x, y, z } => Self::new(x, y, z),
        }
    }
}

/// Pixel extents of one detected object instance, stored in the order the
/// scene exporter writes them: `[start_x, start_y, end_x, end_y]`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct BoundingBox(pub [f32; 4]);

impl BoundingBox {
    #[must_use]
    pub const fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self([x0, y0, x1, y1])
    }

    /// Area used for reward shaping.
    ///
    /// The height term adds the two vertical extents instead of subtracting
    /// them. Scene files and trained agents depend on this value, so it is
    /// kept as exported.
    #[must_use]
    pub fn shaping_area(&self) -> f32 {
        let [x0, y0, x1, y1] = self.0;
        (x0 - x1).abs() * (y0 + y1).abs()
    }

    /// Center point `(x, y)` in pixel coordinates.
    #[must_use]
    pub fn center(&self) -> (f32, f32) {
        let [x0, y0, x1, y1] = self.0;
        ((x0 + x1) / 2.0, (y0 + y1) / 2.0)
    }
}

impl From<[f32; 4]> for BoundingBox {
    fn from(v: [f32; 4]) -> Self {
        Self(v)
    }
}

impl From<BoundingBox> for [f32; 4] {
    fn from(b: BoundingBox) -> Self {
        b.0
    }
}

/// Object class part of a `"<objectClass>|<instanceId>"` bounding-box key.
#[must_use]
pub fn object_class(key: &str) -> &str {
    key.split('|').next().unwrap_or(key)
}

/// Discrete agent moves, in the column order of the transition graph.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    MoveAhead,
    RotateRight,
    RotateLeft,
    MoveBack,
    LookUp,
    LookDown,
    MoveRight,
    MoveLeft,
}

impl Action {
    /// Full catalog; environments expose a prefix of it.
    pub const ALL: [Action; 8] = [
        Action::MoveAhead,
        Action::RotateRight,
        Action::RotateLeft,
        Action::MoveBack,
        Action::LookUp,
        Action::LookDown,
        Action::MoveRight,
        Action::MoveLeft,
    ];

    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Action::MoveAhead => "MoveAhead",
            Action::RotateRight => "RotateRight",
            Action::RotateLeft => "RotateLeft",
            Action::MoveBack => "MoveBack",
            Action::LookUp => "LookUp",
            Action::LookDown => "LookDown",
            Action::MoveRight => "MoveRight",
            Action::MoveLeft => "MoveLeft",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One raw RGB frame, only used for debugging and rendering.
#[derive(Copy, Clone, Debug)]
pub struct Frame<'a> {
    pub height: usize,
    pub width: usize,
    pub channels: usize,
    pub data: &'a [u8],
}
