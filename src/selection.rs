// 🎯 Selection State - (country, year) cursor + load status

use crate::dataset::Year;
use serde::{Deserialize, Serialize};

/// Current cursor every view is projected for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub country_code: String,
    pub year: Year,
}

impl Selection {
    pub fn new(country_code: &str, year: Year) -> Self {
        Selection {
            country_code: country_code.to_string(),
            year,
        }
    }

    pub fn with_country(mut self, country_code: &str) -> Self {
        self.country_code = country_code.to_string();
        self
    }

    pub fn with_year(mut self, year: Year) -> Self {
        self.year = year;
        self
    }
}

impl Default for Selection {
    fn default() -> Self {
        Selection::new("IT", 2023)
    }
}

/// Load lifecycle of the dataset model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum LoadStatus {
    Idle,
    Loading,
    Ready,
    Failed(String),
}

impl LoadStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadStatus::Loading)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, LoadStatus::Ready)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            LoadStatus::Failed(message) => Some(message),
            _ => None,
        }
    }
}

// ============================================================================
// YEAR RANGE
// ============================================================================

/// Global year range offered by year pickers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub min: Year,
    pub max: Year,
}

impl YearRange {
    pub fn new(min: Year, max: Year) -> Self {
        YearRange { min, max }
    }

    pub fn contains(&self, year: Year) -> bool {
        year >= self.min && year <= self.max
    }

    /// Newest first
    pub fn years_descending(&self) -> Vec<Year> {
        (self.min..=self.max).rev().collect()
    }

    pub fn years_ascending(&self) -> Vec<Year> {
        (self.min..=self.max).collect()
    }
}

impl Default for YearRange {
    fn default() -> Self {
        YearRange::new(1990, 2024)
    }
}

// ============================================================================
// TESTS
// ============================================================================
