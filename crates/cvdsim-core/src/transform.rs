//! Color transforms: 3×3 linear matrices and the grayscale sentinel.

use glam::{DMat3, DVec3};
use serde::{Deserialize, Serialize};

/// A 3×3 matrix mapping true RGB to perceived RGB.
///
/// Stored row-major: output channel `c` is `rows[c] · input`. Coefficients
/// are kept exactly as given; rows are not normalized to sum to one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorMatrix {
    rows: [[f64; 3]; 3],
}

impl ColorMatrix {
    pub const IDENTITY: Self = Self::from_rows([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]);

    pub const fn from_rows(rows: [[f64; 3]; 3]) -> Self {
        Self { rows }
    }

    pub const fn rows(&self) -> [[f64; 3]; 3] {
        self.rows
    }

    /// Sum of each row. A sum of 1.0 preserves brightness of neutral grays.
    pub fn row_sums(&self) -> [f64; 3] {
        self.rows.map(|row| row.iter().sum())
    }

    /// Column-major `glam` form, ready for `mat * vec`.
    pub fn to_mat3(&self) -> DMat3 {
        DMat3::from_cols_array_2d(&self.rows).transpose()
    }

    /// Apply to one RGB triple without clipping.
    pub fn apply(&self, rgb: [f64; 3]) -> [f64; 3] {
        (self.to_mat3() * DVec3::from_array(rgb)).to_array()
    }
}

impl Default for ColorMatrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// How a condition alters an image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "matrix", rename_all = "snake_case")]
pub enum ColorTransform {
    /// Multiply every pixel by a fixed matrix.
    LinearMatrix(ColorMatrix),
    /// Replace every pixel with its luma, replicated across channels.
    Grayscale,
}

impl ColorTransform {
    pub const IDENTITY: Self = Self::LinearMatrix(ColorMatrix::IDENTITY);

    pub fn matrix(&self) -> Option<&ColorMatrix> {
        match self {
            Self::LinearMatrix(m) => Some(m),
            Self::Grayscale => None,
        }
    }

    pub fn is_grayscale(&self) -> bool {
        matches!(self, Self::Grayscale)
    }
}

impl From<ColorMatrix> for ColorTransform {
    fn from(matrix: ColorMatrix) -> Self {
        Self::LinearMatrix(matrix)
    }
}
