// 🏆 Rankings - carbon intensity (precomputed) + emissions per capita
//
// Per-capita sums are done in decimal arithmetic over each reading's shortest
// decimal form, then rounded half away from zero to 2 places: 1.005 + 2 → 3.01.

use crate::codes::CountryCodeResolver;
use crate::dataset::{CarbonIntensityEntry, DatasetModel, SectorEmissions, Year};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub code: String,
    pub name: String,
    /// t CO2 per capita across residential, services, transport and industry
    pub value: f64,
    pub year: Option<Year>,
}

/// Precomputed upstream, passed through untouched
pub fn project_carbon_intensity(model: &DatasetModel) -> Vec<CarbonIntensityEntry> {
    model
        .eco
        .as_ref()
        .map(|eco| eco.carbon_intensity_ranking.clone())
        .unwrap_or_default()
}

/// Ascending by summed per-capita emissions; countries summing to ≤ 0 are skipped
pub fn project_emissions_per_capita(model: &DatasetModel) -> Vec<RankingEntry> {
    let Some(eco) = model.eco.as_ref() else {
        return Vec::new();
    };
    let resolver = CountryCodeResolver::global();

    let mut ranking: Vec<RankingEntry> = eco
        .countries
        .iter()
        .filter_map(|(code, country)| {
            let per_capita = country.emissions_per_capita.as_ref()?;
            let value = per_capita_total(per_capita)?;
            let name = country
                .name
                .clone()
                .or_else(|| resolver.display_name(code).map(str::to_string))
                .unwrap_or_else(|| code.clone());

            Some(RankingEntry {
                code: code.clone(),
                name,
                value,
                year: per_capita.year,
            })
        })
        .collect();

    ranking.sort_by(|a, b| a.value.total_cmp(&b.value));
    ranking
}

/// Rounded sum of the four sectors, None when the sum is ≤ 0
pub fn per_capita_total(emissions: &SectorEmissions) -> Option<f64> {
    let sum: Decimal = [
        emissions.residential,
        emissions.services,
        emissions.transport,
        emissions.industry,
    ]
    .iter()
    .map(|value| value.map(to_decimal).unwrap_or(Decimal::ZERO))
    .sum();

    if sum <= Decimal::ZERO {
        return None;
    }

    sum.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
}

/// Shortest round-trip decimal form of an f64 (1.005 stays 1.005)
fn to_decimal(value: f64) -> Decimal {
    Decimal::from_str(&value.to_string())
        .ok()
        .or_else(|| Decimal::from_f64(value))
        .unwrap_or(Decimal::ZERO)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::EcoDataset;
    use serde_json::json;

    fn model(eco: serde_json::Value) -> DatasetModel {
        DatasetModel {
            eco: Some(serde_json::from_value::<EcoDataset>(eco).unwrap()),
            ..Default::default()
        }
    }

    #[test]
    fn test_per_capita_rounds_half_away_from_zero() {
        let emissions = SectorEmissions {
            residential: Some(1.005),
            services: Some(0.0),
            transport: Some(2.0),
            industry: Some(0.0),
            year: Some(2022),
        };
        assert_eq!(per_capita_total(&emissions), Some(3.01));
    }

    #[test]
    fn test_missing_sectors_count_as_zero() {
        let emissions = SectorEmissions {
            residential: Some(0.4),
            transport: Some(1.2),
            ..Default::default()
        };
        assert_eq!(per_capita_total(&emissions), Some(1.6));
        assert_eq!(per_capita_total(&SectorEmissions::default()), None);
    }

    #[test]
    fn test_emissions_ranking_sorted_and_filtered() {
        let model = model(json!({
            "countries": {
                "DE": {
                    "name": "Germany",
                    "emissions_per_capita": {
                        "residential": 1.2, "services": 0.5, "transport": 2.1, "industry": 3.0,
                        "year": 2022
                    }
                },
                "SE": {
                    "name": "Sweden",
                    "emissions_per_capita": {"residential": 0.1, "transport": 1.1, "year": 2021}
                },
                "IS": {
                    "name": "Iceland",
                    "emissions_per_capita": {"residential": 0, "services": 0, "year": 2022}
                },
                "FR": {"name": "France", "carbon_intensity": {"latest_year": 2023, "latest_value": 56.0}},
                "NO": {"emissions_per_capita": {"residential": null, "industry": 0.5}}
            }
        }));

        let ranking = project_emissions_per_capita(&model);
        let codes: Vec<&str> = ranking.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["NO", "SE", "DE"]);
        assert_eq!(ranking[0].name, "Norway");
        assert_eq!(ranking[1].value, 1.2);
        assert_eq!(ranking[1].year, Some(2021));
        assert_eq!(ranking[2].value, 6.8);
    }

    #[test]
    fn test_carbon_intensity_passthrough() {
        let model = model(json!({
            "countries": {},
            "carbon_intensity_ranking": [
                {"code": "SE", "name": "Sweden", "value": 41.0, "year": 2023},
                {"code": "PL", "name": "Poland", "value": 662.0, "year": 2023}
            ]
        }));

        let ranking = project_carbon_intensity(&model);
        assert_eq!(ranking.len(), 2);
        assert_eq!(ranking[0].code, "SE");
        assert_eq!(ranking[1].value, Some(662.0));
    }

    #[test]
    fn test_absent_eco_dataset_is_empty() {
        let model = DatasetModel::default();
        assert!(project_carbon_intensity(&model).is_empty());
        assert!(project_emissions_per_capita(&model).is_empty());
    }
}
