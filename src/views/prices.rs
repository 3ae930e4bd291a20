// 💶 Price Series - annual electricity price + quarterly CPI0450 per year
//
// A price country object mixes 4-digit year keys with other keys, so only
// strict 4-digit keys are years. 0 is a valid reading: absence is null, never 0.

use super::lookup_by_code;
use crate::dataset::{coerce_number, DatasetModel, Year};
use crate::selection::Selection;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const ELECTRICITY_KEY: &str = "Price of electricity (US cents per kWh)";
pub const CPI_ELECTRICITY: &str = "CPI0450";
const QUARTERS: [&str; 4] = ["1", "2", "3", "4"];

static YEAR_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}$").expect("year key pattern is valid"));

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub year: Year,
    pub electricity: Option<f64>,
    /// Quarters 1..4
    #[serde(rename = "CPI0450")]
    pub cpi0450: [Option<f64>; 4],
}

pub fn project(model: &DatasetModel, selection: &Selection) -> Vec<PricePoint> {
    let Some(prices) = model.prices.as_ref() else {
        return Vec::new();
    };
    let Some((_, country)) = lookup_by_code(&prices.countries, &selection.country_code) else {
        return Vec::new();
    };

    let mut years: Vec<(Year, &Value)> = country
        .iter()
        .filter(|(key, _)| YEAR_KEY.is_match(key))
        .filter_map(|(key, data)| key.parse::<Year>().ok().map(|year| (year, data)))
        .collect();
    years.sort_by_key(|(year, _)| *year);

    years
        .into_iter()
        .map(|(year, data)| PricePoint {
            year,
            electricity: data.get(ELECTRICITY_KEY).and_then(coerce_number),
            cpi0450: QUARTERS.map(|q| {
                data.get(q)
                    .and_then(|quarter| quarter.get(CPI_ELECTRICITY))
                    .and_then(coerce_number)
            }),
        })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::PriceDataset;
    use serde_json::json;

    fn model(prices: Option<serde_json::Value>) -> DatasetModel {
        DatasetModel {
            prices: prices.map(|p| serde_json::from_value::<PriceDataset>(p).unwrap()),
            ..Default::default()
        }
    }

    #[test]
    fn test_year_keys_filtered_and_sorted() {
        let model = model(Some(json!({
            "countries": {
                "IT": {
                    "2020": {"Price of electricity (US cents per kWh)": 21.5, "1": {"CPI0450": 101.2}},
                    "meta": {"source": "EnergyCPI"},
                    "2019": {"1": {"CPI0450": "99.5"}, "2": {"CPI0450": 0}},
                    "20190": {}
                }
            }
        })));

        let series = project(&model, &Selection::new("IT", 2023));
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].year, 2019);
        assert_eq!(series[1].year, 2020);

        // Numeric strings coerced, zero kept, missing quarters null
        assert_eq!(series[0].cpi0450, [Some(99.5), Some(0.0), None, None]);
        assert_eq!(series[0].electricity, None);

        assert_eq!(series[1].electricity, Some(21.5));
        assert_eq!(series[1].cpi0450, [Some(101.2), None, None, None]);
    }

    #[test]
    fn test_absent_dataset_or_country_is_empty() {
        assert!(project(&model(None), &Selection::new("IT", 2023)).is_empty());

        let model = model(Some(json!({"countries": {"FR": {"2020": {}}}})));
        assert!(project(&model, &Selection::new("IT", 2023)).is_empty());
    }

    #[test]
    fn test_price_lookup_accepts_eurostat_selection() {
        let model = model(Some(json!({
            "countries": {"GR": {"2021": {"Price of electricity (US cents per kWh)": "18"}}}
        })));

        let series = project(&model, &Selection::new("EL", 2021));
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].electricity, Some(18.0));
    }

    #[test]
    fn test_serialized_field_names() {
        let point = PricePoint {
            year: 2020,
            electricity: None,
            cpi0450: [None, Some(1.0), None, None],
        };
        let json = serde_json::to_value(point).unwrap();
        assert_eq!(json["CPI0450"], json!([null, 1.0, null, null]));
        assert_eq!(json["electricity"], json!(null));
    }
}
