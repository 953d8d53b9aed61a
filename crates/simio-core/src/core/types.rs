use nalgebra::Vector3;
use serde::Deserialize;
use std::fmt;

/// In-memory real number. The on-disk width is chosen per handle by [`Precision`].
pub type Real = f64;

/// Simulation step counter, wide enough for runs longer than `i32::MAX` steps.
pub type Step = i64;

/// A 3-component real vector (coordinates, velocities, forces, box rows).
pub type RVec = Vector3<Real>;

/// A 3-component integer vector (grid sizes, periodic image shifts).
pub type IVec = Vector3<i32>;

/// Floating-point width used when a real item is put on disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Precision {
    #[default]
    Single,
    Double,
}

impl Precision {
    pub fn is_double(self) -> bool {
        matches!(self, Precision::Double)
    }

    /// Number of bytes one real occupies in the binary encodings.
    pub fn real_size(self) -> usize {
        match self {
            Precision::Single => 4,
            Precision::Double => 8,
        }
    }

    /// Rounds a value to what survives a round trip at this width.
    pub fn quantize(self, value: Real) -> Real {
        match self {
            Precision::Single => value as f32 as Real,
            Precision::Double => value,
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Precision::Single => write!(f, "single"),
            Precision::Double => write!(f, "double"),
        }
    }
}
