use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::CompareError;
use crate::model::Category;

/// Identifier column used when the config does not name one.
pub const DEFAULT_IDENTIFIER: &str = "rotas";

/// Marker placed between the old and new value of a changed cell.
pub const CHANGE_ARROW: &str = "➡️";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompareConfig {
    /// Business key column. An empty string disables identifier keying.
    pub identifier_column: String,
    pub locale: Locale,
    /// Original column positions whose changes are kept out of the change
    /// log and groups (the display table still shows them).
    pub suppressed_positions: BTreeSet<usize>,
    pub tolerance: ToleranceConfig,
    /// Checked in order; the first range containing a position wins.
    pub categories: Vec<CategoryRange>,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            identifier_column: DEFAULT_IDENTIFIER.to_string(),
            locale: Locale::default(),
            suppressed_positions: BTreeSet::new(),
            tolerance: ToleranceConfig::default(),
            categories: default_category_ranges(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tolerance
// ---------------------------------------------------------------------------

/// `|old - new| <= atol + rtol * |new|`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToleranceConfig {
    pub atol: f64,
    pub rtol: f64,
}

impl Default for ToleranceConfig {
    fn default() -> Self {
        Self {
            atol: 1e-8,
            rtol: 1e-5,
        }
    }
}

// ---------------------------------------------------------------------------
// Category ranges
// ---------------------------------------------------------------------------

/// Inclusive window of original column positions mapped to a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryRange {
    pub lo: usize,
    pub hi: usize,
    pub category: Category,
}

impl CategoryRange {
    pub fn new(lo: usize, hi: usize, category: Category) -> Self {
        Self { lo, hi, category }
    }

    pub fn contains(&self, position: usize) -> bool {
        self.lo <= position && position <= self.hi
    }
}

/// Columns E–P are branch data, U–Z transport, AA return freight.
pub fn default_category_ranges() -> Vec<CategoryRange> {
    vec![
        CategoryRange::new(4, 15, Category::BranchChange),
        CategoryRange::new(20, 25, Category::TransportChange),
        CategoryRange::new(26, 26, Category::ReturnFreightChange),
    ]
}

/// Positions {0,1,2,16,17,20,21} and 27..38, hidden from the change log by
/// the revision of the workbook layout that added bookkeeping columns.
pub fn legacy_suppressed_positions() -> BTreeSet<usize> {
    [0, 1, 2, 16, 17, 20, 21]
        .into_iter()
        .chain(27..38)
        .collect()
}

// ---------------------------------------------------------------------------
// Locale
// ---------------------------------------------------------------------------

/// Label preset for sentinels and category names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "en")]
    En,
    #[serde(rename = "pt-br", alias = "pt-BR")]
    PtBr,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::PtBr => "pt-br",
        }
    }

    /// Stands in for a null or blank cell in change markers.
    pub fn empty_label(&self) -> &'static str {
        match self {
            Self::En => "Empty",
            Self::PtBr => "Vazio",
        }
    }

    pub fn arrow(&self) -> &'static str {
        CHANGE_ARROW
    }

    pub fn category_label(&self, category: Category) -> &'static str {
        match (self, category) {
            (Self::En, Category::General) => "General",
            (Self::En, Category::BranchChange) => "Branch Change",
            (Self::En, Category::TransportChange) => "Transport Change",
            (Self::En, Category::ReturnFreightChange) => "Return Freight Change",
            (Self::PtBr, Category::General) => "Geral",
            (Self::PtBr, Category::BranchChange) => "Alterações Filiais",
            (Self::PtBr, Category::TransportChange) => "Alterações de Transporte",
            (Self::PtBr, Category::ReturnFreightChange) => "Alteração de Frete Retorno",
        }
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl CompareConfig {
    pub fn from_toml(input: &str) -> Result<Self, CompareError> {
        let config: CompareConfig =
            toml::from_str(input).map_err(|e| CompareError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, CompareError> {
        toml::to_string_pretty(self).map_err(|e| CompareError::ConfigParse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), CompareError> {
        let tol = &self.tolerance;
        if !tol.atol.is_finite() || tol.atol < 0.0 {
            return Err(CompareError::ConfigValidation(format!(
                "tolerance.atol must be a finite non-negative number, got {}",
                tol.atol
            )));
        }
        if !tol.rtol.is_finite() || tol.rtol < 0.0 {
            return Err(CompareError::ConfigValidation(format!(
                "tolerance.rtol must be a finite non-negative number, got {}",
                tol.rtol
            )));
        }

        for (i, range) in self.categories.iter().enumerate() {
            if range.lo > range.hi {
                return Err(CompareError::ConfigValidation(format!(
                    "categories[{i}]: lo ({}) is greater than hi ({})",
                    range.lo, range.hi
                )));
            }
        }

        Ok(())
    }

    /// The identifier column, or `None` when keying by identifier is off.
    pub fn identifier(&self) -> Option<&str> {
        let trimmed = self.identifier_column.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(self.identifier_column.as_str())
        }
    }

    pub fn with_identifier(mut self, column: impl Into<String>) -> Self {
        self.identifier_column = column.into();
        self
    }

    pub fn without_identifier(mut self) -> Self {
        self.identifier_column.clear();
        self
    }

    pub fn with_legacy_suppression(mut self) -> Self {
        self.suppressed_positions.extend(legacy_suppressed_positions());
        self
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
