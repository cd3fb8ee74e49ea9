//! Built-in color-vision conditions and their transforms.
//!
//! The registry is a read-only map from [`Condition`] to [`ColorTransform`],
//! built once on first use. Coefficients are the commonly published
//! simulation matrices and are used literally.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::transform::{ColorMatrix, ColorTransform};

const PROTANOMALY: ColorMatrix =
    ColorMatrix::from_rows([[0.817, 0.183, 0.0], [0.333, 0.667, 0.0], [0.0, 0.125, 0.875]]);
const DEUTERANOMALY: ColorMatrix =
    ColorMatrix::from_rows([[0.8, 0.2, 0.0], [0.258, 0.742, 0.0], [0.0, 0.142, 0.858]]);
const TRITANOMALY: ColorMatrix =
    ColorMatrix::from_rows([[0.967, 0.033, 0.0], [0.0, 0.733, 0.267], [0.0, 0.183, 0.817]]);
const PROTANOPIA: ColorMatrix =
    ColorMatrix::from_rows([[0.567, 0.433, 0.0], [0.558, 0.442, 0.0], [0.0, 0.242, 0.758]]);
const DEUTERANOPIA: ColorMatrix =
    ColorMatrix::from_rows([[0.625, 0.375, 0.0], [0.7, 0.3, 0.0], [0.0, 0.3, 0.7]]);
const TRITANOPIA: ColorMatrix =
    ColorMatrix::from_rows([[0.95, 0.05, 0.0], [0.0, 0.433, 0.567], [0.0, 0.475, 0.525]]);

/// Broad family a condition belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    /// All three cone types working normally.
    Trichromatic,
    /// One cone type with shifted sensitivity.
    Anomalous,
    /// One cone type missing.
    Dichromatic,
    /// At most one cone type working.
    Monochromatic,
}

impl Category {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Trichromatic => "Trichromatic",
            Self::Anomalous => "Anomalous",
            Self::Dichromatic => "Dichromatic",
            Self::Monochromatic => "Monochromatic",
        }
    }
}

/// A simulated color-vision condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Condition {
    Normal,
    /// Mild red-weak.
    Protanomaly,
    /// Mild green-weak.
    Deuteranomaly,
    /// Mild blue-weak.
    Tritanomaly,
    /// Red-blind.
    Protanopia,
    /// Green-blind.
    Deuteranopia,
    /// Blue-yellow-blind.
    Tritanopia,
    /// Complete color blindness.
    Monochrome,
    /// Only blue cones functional. Rendered as grayscale.
    BlueConeMonochromacy,
}

impl Condition {
    /// Every condition, in registry order.
    pub const ALL: [Self; 9] = [
        Self::Normal,
        Self::Protanomaly,
        Self::Deuteranomaly,
        Self::Tritanomaly,
        Self::Protanopia,
        Self::Deuteranopia,
        Self::Tritanopia,
        Self::Monochrome,
        Self::BlueConeMonochromacy,
    ];

    /// Every condition, in registry order.
    pub const fn all() -> &'static [Self] {
        &Self::ALL
    }

    /// Short name for menus, status text, and file names.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Protanomaly => "Protanomaly",
            Self::Deuteranomaly => "Deuteranomaly",
            Self::Tritanomaly => "Tritanomaly",
            Self::Protanopia => "Protanopia",
            Self::Deuteranopia => "Deuteranopia",
            Self::Tritanopia => "Tritanopia",
            Self::Monochrome => "Monochrome",
            Self::BlueConeMonochromacy => "Blue Cone Monochromacy",
        }
    }

    pub const fn category(&self) -> Category {
        match self {
            Self::Normal => Category::Trichromatic,
            Self::Protanomaly | Self::Deuteranomaly | Self::Tritanomaly => Category::Anomalous,
            Self::Protanopia | Self::Deuteranopia | Self::Tritanopia => Category::Dichromatic,
            Self::Monochrome | Self::BlueConeMonochromacy => Category::Monochromatic,
        }
    }

    /// Caption used in the composite figure.
    pub fn title(&self) -> String {
        match self {
            Self::Monochrome => Category::Monochromatic.label().to_string(),
            Self::BlueConeMonochromacy => self.label().to_string(),
            _ => format!("{} ({})", self.label(), self.category().label()),
        }
    }

    /// Lowercase with spaces, dashes, and underscores removed.
    fn key(name: &str) -> String {
        name.chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect()
    }

    /// Transform registered for this condition.
    pub fn transform(&self) -> &'static ColorTransform {
        TransformRegistry::builtin().get(*self)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Condition {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = Self::key(s.trim());
        Self::all()
            .iter()
            .copied()
            .find(|c| Self::key(c.label()) == key)
            .ok_or_else(|| SimError::UnknownCondition(s.to_string()))
    }
}

/// Immutable condition → transform table, indexed by declaration order.
#[derive(Debug)]
pub struct TransformRegistry {
    entries: [ColorTransform; Condition::ALL.len()],
}

fn builtin_transform(condition: Condition) -> ColorTransform {
    match condition {
        Condition::Normal => ColorTransform::IDENTITY,
        Condition::Protanomaly => PROTANOMALY.into(),
        Condition::Deuteranomaly => DEUTERANOMALY.into(),
        Condition::Tritanomaly => TRITANOMALY.into(),
        Condition::Protanopia => PROTANOPIA.into(),
        Condition::Deuteranopia => DEUTERANOPIA.into(),
        Condition::Tritanopia => TRITANOPIA.into(),
        Condition::Monochrome | Condition::BlueConeMonochromacy => ColorTransform::Grayscale,
    }
}

static BUILTIN: LazyLock<TransformRegistry> = LazyLock::new(|| TransformRegistry {
    entries: Condition::ALL.map(builtin_transform),
});

impl TransformRegistry {
    /// The process-wide built-in table.
    pub fn builtin() -> &'static Self {
        &BUILTIN
    }

    /// Transform for `condition`. Every [`Condition`] has an entry.
    pub fn get(&self, condition: Condition) -> &ColorTransform {
        &self.entries[condition as usize]
    }

    /// Look up by display name, case-insensitively.
    pub fn lookup(&self, name: &str) -> Result<(Condition, &ColorTransform), SimError> {
        let condition: Condition = name.parse()?;
        Ok((condition, self.get(condition)))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Condition, &ColorTransform)> {
        Condition::ALL.into_iter().zip(&self.entries)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_condition_registered() {
        let registry = TransformRegistry::builtin();
        assert_eq!(registry.len(), Condition::all().len());
        let listed: Vec<_> = registry.iter().map(|(c, _)| c).collect();
        assert_eq!(listed, Condition::all());
    }

    #[test]
    fn test_declaration_order_matches_registry_order() {
        for (index, &condition) in Condition::ALL.iter().enumerate() {
            assert_eq!(condition as usize, index, "{condition} out of place");
        }
    }

    #[test]
    fn test_get_matches_builtin_table() {
        let registry = TransformRegistry::builtin();
        for (condition, transform) in registry.iter() {
            assert_eq!(*registry.get(condition), builtin_transform(condition));
            assert_eq!(*transform, builtin_transform(condition));
        }
        let expected = ColorTransform::from(DEUTERANOMALY);
        assert_eq!(*registry.get(Condition::Deuteranomaly), expected);
    }

    #[test]
    fn test_protanopia_coefficients_are_literal() {
        let m = Condition::Protanopia.transform().matrix().copied().unwrap();
        assert_eq!(
            m.rows(),
            [[0.567, 0.433, 0.0], [0.558, 0.442, 0.0], [0.0, 0.242, 0.758]]
        );
    }

    #[test]
    fn test_monochrome_conditions_use_grayscale() {
        assert!(Condition::Monochrome.transform().is_grayscale());
        assert!(Condition::BlueConeMonochromacy.transform().is_grayscale());
        assert_eq!(*Condition::Normal.transform(), ColorTransform::IDENTITY);
    }

    #[test]
    fn test_parse_is_lenient() {
        assert_eq!("Protanomaly ".parse::<Condition>().unwrap(), Condition::Protanomaly);
        assert_eq!("deuteranopia".parse::<Condition>().unwrap(), Condition::Deuteranopia);
        assert_eq!(
            "blue-cone_monochromacy".parse::<Condition>().unwrap(),
            Condition::BlueConeMonochromacy
        );
    }

    #[test]
    fn test_parse_unknown_fails() {
        let err = "Achromatopsia".parse::<Condition>().unwrap_err();
        assert!(matches!(err, SimError::UnknownCondition(name) if name == "Achromatopsia"));
    }

    #[test]
    fn test_lookup_returns_transform() {
        let (condition, transform) = TransformRegistry::builtin().lookup("TRITANOPIA").unwrap();
        assert_eq!(condition, Condition::Tritanopia);
        assert!(transform.matrix().is_some());
    }

    #[test]
    fn test_titles() {
        assert_eq!(Condition::Normal.title(), "Normal (Trichromatic)");
        assert_eq!(Condition::Protanomaly.title(), "Protanomaly (Anomalous)");
        assert_eq!(Condition::Tritanopia.title(), "Tritanopia (Dichromatic)");
        assert_eq!(Condition::Monochrome.title(), "Monochromatic");
        assert_eq!(Condition::BlueConeMonochromacy.title(), "Blue Cone Monochromacy");
    }
}
