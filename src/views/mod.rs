// 🔭 View Projectors - pure (DatasetModel, Selection) → view functions
//
// No projector performs I/O or mutates state, and none returns an error:
// a dataset that is absent and a selection that is not found both project to the
// same empty/None view.

pub mod hierarchy;
pub mod prices;
pub mod rankings;
pub mod sectors;
pub mod trade;

pub use hierarchy::{EndUseLeaf, HierarchyRoot, SectorNode};
pub use prices::PricePoint;
pub use rankings::RankingEntry;
pub use sectors::{NamedValue, SectorBreakdown};
pub use trade::{PartnerView, ProductionConsumptionView, TradeFlowView, TradeView};

use crate::codes::CountryCodeResolver;
use crate::dataset::{CountryRecord, DatasetModel, YearRecord};
use crate::selection::Selection;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Product carrying an end-use row's total
pub const TOTAL_FINAL_USE: &str = "Total final use (PJ)";

// ============================================================================
// SECTORS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sector {
    Industry,
    Residential,
    Transport,
    Service,
}

impl Sector {
    /// Presentation order
    pub const ALL: [Sector; 4] = [
        Sector::Industry,
        Sector::Residential,
        Sector::Transport,
        Sector::Service,
    ];

    /// Key used by the consumption source
    pub fn label(&self) -> &'static str {
        match self {
            Sector::Industry => "Industry",
            Sector::Residential => "Residential",
            Sector::Transport => "Transport",
            Sector::Service => "Service",
        }
    }

    /// End-use row that aggregates the whole sector
    pub fn rollup_label(&self) -> &'static str {
        match self {
            Sector::Industry => "Manufacturing",
            Sector::Residential => "Total residential",
            Sector::Transport => "Total passenger and freight transport",
            Sector::Service => "Total services",
        }
    }
}

// ============================================================================
// VIEW NAMES
// ============================================================================

/// Addressable views, as named by the CLI and the JSON API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewName {
    Dependency,
    Trade,
    ProductionConsumption,
    Sectors,
    Hierarchy,
    Prices,
    CarbonRanking,
    EmissionsRanking,
}

impl ViewName {
    pub const ALL: [ViewName; 8] = [
        ViewName::Dependency,
        ViewName::Trade,
        ViewName::ProductionConsumption,
        ViewName::Sectors,
        ViewName::Hierarchy,
        ViewName::Prices,
        ViewName::CarbonRanking,
        ViewName::EmissionsRanking,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewName::Dependency => "dependency",
            ViewName::Trade => "trade",
            ViewName::ProductionConsumption => "production-consumption",
            ViewName::Sectors => "sectors",
            ViewName::Hierarchy => "hierarchy",
            ViewName::Prices => "prices",
            ViewName::CarbonRanking => "carbon-ranking",
            ViewName::EmissionsRanking => "emissions-ranking",
        }
    }
}

impl fmt::Display for ViewName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('_', "-");
        ViewName::ALL
            .iter()
            .copied()
            .find(|name| name.as_str() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = ViewName::ALL.iter().map(|n| n.as_str()).collect();
                format!("unknown view '{}' (expected one of: {})", s, known.join(", "))
            })
    }
}

// ============================================================================
// LOOKUP HELPERS
// ============================================================================

/// Find a code-keyed entry tolerating case and Eurostat spellings
///
/// Sources disagree: the trade source keys Greece as "EL", the price source as "GR".
pub fn lookup_by_code<'a, V>(map: &'a BTreeMap<String, V>, code: &str) -> Option<(&'a str, &'a V)> {
    let resolver = CountryCodeResolver::global();
    let normalized = resolver.normalize(code);
    let candidates = [
        code.to_string(),
        code.trim().to_uppercase(),
        resolver.to_eurostat(&normalized),
        normalized,
    ];

    candidates
        .iter()
        .find_map(|candidate| map.get_key_value(candidate.as_str()))
        .map(|(k, v)| (k.as_str(), v))
}

/// Selected country in the dependency/trade source
pub fn selected_country<'a>(
    model: &'a DatasetModel,
    selection: &Selection,
) -> Option<(&'a str, &'a CountryRecord)> {
    lookup_by_code(&model.dependency.countries, &selection.country_code)
}

/// Selected (country, year) record
pub fn selected_year<'a>(model: &'a DatasetModel, selection: &Selection) -> Option<&'a YearRecord> {
    selected_country(model, selection)?.1.year(selection.year)
}

/// Resolve the selected country into the consumption source's name key space
///
/// Tries the display name, then a case-insensitive match, then the consumption
/// source's own spelling for the code. Anything else is "no data".
pub fn consumption_country_key<'a>(
    model: &'a DatasetModel,
    selection: &Selection,
) -> Option<&'a str> {
    let (code, country) = selected_country(model, selection)?;
    let countries = &model.consumption.countries;

    if let Some((key, _)) = countries.get_key_value(country.name.as_str()) {
        return Some(key);
    }

    if let Some(key) = countries
        .keys()
        .find(|key| !country.name.is_empty() && key.eq_ignore_ascii_case(&country.name))
    {
        return Some(key);
    }

    let alias = CountryCodeResolver::global().consumption_alias(code)?;
    countries.get_key_value(alias).map(|(key, _)| key.as_str())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::dataset::{ConsumptionDataset, DependencyDataset};
    use serde_json::json;

    /// Dependency + consumption model shared by the projector tests
    ///
    /// Consumption is given as text so end-use rows keep their document order.
    pub(crate) fn model_with_consumption(consumption: &str) -> DatasetModel {
        let dependency: DependencyDataset = serde_json::from_value(json!({
            "countries": {
                "IT": {"name": "Italy", "years": {"2021": {}}},
                "EL": {"name": "Greece", "years": {"2021": {}}},
                "CZ": {"name": "Czechia", "years": {"2021": {}}},
                "PT": {"name": "Portugal", "years": {"2021": {}}}
            }
        }))
        .unwrap();
        let consumption: ConsumptionDataset =
            serde_json::from_str(&format!(r#"{{"countries": {}}}"#, consumption)).unwrap();

        DatasetModel {
            dependency,
            consumption,
            prices: None,
            eco: None,
        }
    }

    #[test]
    fn test_view_name_parsing() {
        assert_eq!("sectors".parse::<ViewName>(), Ok(ViewName::Sectors));
        assert_eq!(
            "production_consumption".parse::<ViewName>(),
            Ok(ViewName::ProductionConsumption)
        );
        assert_eq!("Carbon-Ranking".parse::<ViewName>(), Ok(ViewName::CarbonRanking));
        assert!("pie".parse::<ViewName>().unwrap_err().contains("emissions-ranking"));

        for name in ViewName::ALL {
            assert_eq!(name.to_string().parse::<ViewName>(), Ok(name));
        }
    }

    #[test]
    fn test_lookup_by_code_tolerates_eurostat_keys() {
        let model = model_with_consumption("{}");

        let (key, country) = selected_country(&model, &Selection::new("GR", 2021)).unwrap();
        assert_eq!(key, "EL");
        assert_eq!(country.name, "Greece");

        let (key, _) = selected_country(&model, &Selection::new("it", 2021)).unwrap();
        assert_eq!(key, "IT");

        assert!(selected_country(&model, &Selection::new("DE", 2021)).is_none());
    }

    #[test]
    fn test_selected_year_miss_is_none() {
        let model = model_with_consumption("{}");
        assert!(selected_year(&model, &Selection::new("IT", 2021)).is_some());
        assert!(selected_year(&model, &Selection::new("IT", 1999)).is_none());
    }

    #[test]
    fn test_consumption_join_by_name() {
        let model = model_with_consumption(r#"{
            "Italy": {},
            "GREECE": {},
            "Czech Republic": {},
            "Portugál": {}
        }"#);

        // Exact display name
        assert_eq!(consumption_country_key(&model, &Selection::new("IT", 2021)), Some("Italy"));
        // Case drift
        assert_eq!(consumption_country_key(&model, &Selection::new("GR", 2021)), Some("GREECE"));
        // Source-specific spelling
        assert_eq!(
            consumption_country_key(&model, &Selection::new("CZ", 2021)),
            Some("Czech Republic")
        );
        // Diacritic drift is a silent miss, not an error
        assert_eq!(consumption_country_key(&model, &Selection::new("PT", 2021)), None);
    }
}
