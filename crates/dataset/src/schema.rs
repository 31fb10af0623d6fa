//! Column layout of the Wisconsin Diagnostic Breast Cancer data.
//!
//! Ten nuclear measurements are recorded per sample and each one appears three
//! times: the mean over all nuclei, its standard error, and the "worst" value
//! (mean of the three largest). The order below is the training order and the
//! order the served model expects.

use serde::{Deserialize, Serialize};

/// Number of numeric features per sample.
pub const FEATURE_COUNT: usize = 30;

/// Canonical feature names in training order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "mean radius",
    "mean texture",
    "mean perimeter",
    "mean area",
    "mean smoothness",
    "mean compactness",
    "mean concavity",
    "mean concave points",
    "mean symmetry",
    "mean fractal dimension",
    "radius error",
    "texture error",
    "perimeter error",
    "area error",
    "smoothness error",
    "compactness error",
    "concavity error",
    "concave points error",
    "symmetry error",
    "fractal dimension error",
    "worst radius",
    "worst texture",
    "worst perimeter",
    "worst area",
    "worst smoothness",
    "worst compactness",
    "worst concavity",
    "worst concave points",
    "worst symmetry",
    "worst fractal dimension",
];

/// Diagnosis encoded as a class index.
///
/// Malignant is class 0 and benign is class 1, matching the conventional
/// numeric encoding of this dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Diagnosis {
    Malignant = 0,
    Benign = 1,
}

impl Diagnosis {
    pub const ALL: [Diagnosis; 2] = [Diagnosis::Malignant, Diagnosis::Benign];

    pub fn class_index(self) -> usize {
        self as usize
    }

    pub fn from_class_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Diagnosis::Malignant),
            1 => Some(Diagnosis::Benign),
            _ => None,
        }
    }

    /// Parse the UCI diagnosis code (`M` / `B`).
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "M" | "m" => Some(Diagnosis::Malignant),
            "B" | "b" => Some(Diagnosis::Benign),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Diagnosis::Malignant => "malignant",
            Diagnosis::Benign => "benign",
        }
    }
}

/// Class labels indexed by class id.
pub fn class_labels() -> Vec<String> {
    Diagnosis::ALL.iter().map(|d| d.label().to_string()).collect()
}

/// Fold a feature name into its comparison form.
///
/// Lowercases and treats `_`, `-` and runs of whitespace as a single space, so
/// `Mean_Radius`, `mean-radius` and `mean radius` all compare equal.
pub fn normalize_feature_name(name: &str) -> String {
    name.split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_unique_after_normalization() {
        let mut seen = std::collections::HashSet::new();
        for name in FEATURE_NAMES {
            assert!(seen.insert(normalize_feature_name(name)), "{name}");
        }
        assert_eq!(seen.len(), FEATURE_COUNT);
    }

    #[test]
    fn normalization_folds_separators() {
        assert_eq!(normalize_feature_name("Mean_Radius"), "mean radius");
        assert_eq!(normalize_feature_name("mean-concave_points"), "mean concave points");
        assert_eq!(normalize_feature_name("  worst   area "), "worst area");
    }

    #[test]
    fn diagnosis_codes() {
        assert_eq!(Diagnosis::from_code("M"), Some(Diagnosis::Malignant));
        assert_eq!(Diagnosis::from_code(" B "), Some(Diagnosis::Benign));
        assert_eq!(Diagnosis::from_code("X"), None);
        assert_eq!(Diagnosis::Malignant.class_index(), 0);
        assert_eq!(Diagnosis::from_class_index(1), Some(Diagnosis::Benign));
        assert_eq!(Diagnosis::from_class_index(2), None);
    }

    #[test]
    fn labels_follow_class_order() {
        assert_eq!(class_labels(), vec!["malignant", "benign"]);
    }
}
