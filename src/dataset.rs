// 📦 Dataset Model - typed in-memory view of the four JSON sources
//
// Every field is optional or defaulted: absence means "not reported", never an
// error. Only a structurally broken document fails to load.
//
// Keying differs per source:
// - dependency/trade, prices, eco → alpha-2 code
// - consumption by sector → country DISPLAY NAME

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub type Year = i32;

// ============================================================================
// ORDERED MAP + NULL TOLERANCE
// ============================================================================

/// JSON object that keeps document order of its keys
///
/// End-use rows and product labels are presented in the order the source lists
/// them. A repeated key keeps its first position and takes the last value.
pub type OrderedMap<V> = IndexMap<String, V>;

/// A repaired `NaN` may sit where a string or a container is expected:
/// read null as the type's default instead of failing the whole source
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// String list with null entries dropped
fn strings_without_nulls<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<Option<String>>> = Option::deserialize(deserializer)?;
    Ok(raw.unwrap_or_default().into_iter().flatten().collect())
}

/// String map with null values dropped
fn string_map_without_nulls<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, Option<String>>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v)))
        .collect())
}

// ============================================================================
// DEPENDENCY / TRADE SOURCE (keyed by alpha-2)
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DependencyDataset {
    pub metadata: Option<DependencyMetadata>,
    #[serde(deserialize_with = "null_as_default")]
    pub countries: BTreeMap<String, CountryRecord>,
    #[serde(deserialize_with = "string_map_without_nulls")]
    pub country_lookup: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DependencyMetadata {
    pub generated: Option<String>,
    #[serde(deserialize_with = "strings_without_nulls")]
    pub sources: Vec<String>,
    pub time_range: Option<Value>,
    #[serde(deserialize_with = "strings_without_nulls")]
    pub energy_types: Vec<String>,
    #[serde(deserialize_with = "string_map_without_nulls")]
    pub energy_type_names: BTreeMap<String, String>,
    #[serde(deserialize_with = "string_map_without_nulls")]
    pub energy_type_units: BTreeMap<String, String>,
    pub production_consumption_unit: Option<String>,
}

impl DependencyMetadata {
    /// `generated` is written without a zone ("2025-01-14T10:22:31.123456")
    pub fn generated_at(&self) -> Option<NaiveDateTime> {
        let raw = self.generated.as_deref()?;
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").ok()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CountryRecord {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    /// Year keys are decimal strings ("2023")
    #[serde(deserialize_with = "null_as_default")]
    pub years: BTreeMap<String, YearRecord>,
}

impl CountryRecord {
    pub fn year(&self, year: Year) -> Option<&YearRecord> {
        self.years.get(&year.to_string())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct YearRecord {
    pub dependency: Option<DependencyRecord>,
    pub imports: Option<TradeFlow>,
    pub exports: Option<TradeFlow>,
    /// Energy type code (SFF, OIL, GAS, BIO, EH) → TWh
    pub production: Option<BTreeMap<String, Option<f64>>>,
    pub consumption: Option<BTreeMap<String, Option<f64>>>,
}

/// Import dependency in percent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DependencyRecord {
    pub overall: Option<f64>,
    pub third_countries: Option<f64>,
    #[serde(deserialize_with = "null_as_default")]
    pub by_fuel: BTreeMap<String, FuelDependency>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FuelDependency {
    pub overall: Option<f64>,
    pub third_countries: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TradeFlow {
    #[serde(deserialize_with = "null_as_default")]
    pub total_by_type: BTreeMap<String, TypeTotal>,
    /// Partner geo key (Eurostat format) → share of the flow in percent
    #[serde(deserialize_with = "null_as_default")]
    pub partners: Vec<PartnerShare>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeTotal {
    pub value: Option<f64>,
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartnerShare {
    /// Empty when the source has no key for the partner
    #[serde(deserialize_with = "null_as_default")]
    pub geo: String,
    pub name: Option<String>,
    pub share_pct: Option<f64>,
}

// ============================================================================
// CONSUMPTION SOURCE (keyed by display name)
// ============================================================================

/// sector → year → end-use rows (document order)
pub type ConsumptionCountry = BTreeMap<String, BTreeMap<String, OrderedMap<EndUse>>>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsumptionDataset {
    pub metadata: Option<Value>,
    #[serde(deserialize_with = "null_as_default")]
    pub countries: BTreeMap<String, ConsumptionCountry>,
}

impl ConsumptionDataset {
    /// End-use rows for (country name, sector, year)
    pub fn end_uses(&self, country: &str, sector: &str, year: Year) -> Option<&OrderedMap<EndUse>> {
        self.countries
            .get(country)?
            .get(sector)?
            .get(&year.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndUse {
    /// Product label ("Electricity (PJ)") → value, null when not reported
    #[serde(deserialize_with = "null_as_default")]
    pub products: OrderedMap<Option<f64>>,
}

// ============================================================================
// PRICE SOURCE (keyed by alpha-2, optional)
// ============================================================================

/// Per-country objects mix 4-digit year keys with arbitrary metadata keys,
/// so entries stay as raw JSON and are read defensively by the price projector.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceDataset {
    pub metadata: Option<Value>,
    #[serde(deserialize_with = "null_as_default")]
    pub countries: BTreeMap<String, BTreeMap<String, Value>>,
    #[serde(deserialize_with = "string_map_without_nulls")]
    pub country_lookup: BTreeMap<String, String>,
}

// ============================================================================
// ECO SOURCE (keyed by alpha-2, optional)
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EcoDataset {
    pub metadata: Option<Value>,
    #[serde(deserialize_with = "null_as_default")]
    pub countries: BTreeMap<String, EcoCountry>,
    /// Precomputed upstream, sorted cleanest first
    #[serde(deserialize_with = "null_as_default")]
    pub carbon_intensity_ranking: Vec<CarbonIntensityEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EcoCountry {
    pub name: Option<String>,
    pub carbon_intensity: Option<CarbonIntensity>,
    /// t CO2 per capita
    pub emissions_per_capita: Option<SectorEmissions>,
    /// kt CO2
    pub emissions_total_kt: Option<SectorEmissions>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarbonIntensity {
    pub latest_year: Option<Year>,
    /// g CO2 per kWh
    pub latest_value: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectorEmissions {
    pub residential: Option<f64>,
    pub services: Option<f64>,
    pub transport: Option<f64>,
    pub industry: Option<f64>,
    pub year: Option<Year>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarbonIntensityEntry {
    #[serde(deserialize_with = "null_as_default")]
    pub code: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    pub value: Option<f64>,
    pub year: Option<Year>,
}

// ============================================================================
// DATASET MODEL
// ============================================================================

/// Everything one load produced. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct DatasetModel {
    pub dependency: DependencyDataset,
    pub consumption: ConsumptionDataset,
    pub prices: Option<PriceDataset>,
    pub eco: Option<EcoDataset>,
}

// ============================================================================
// NUMBER COERCION
// ============================================================================

/// Read a JSON value as a number: numbers pass, numeric strings are parsed,
/// everything else (null, empty string, objects) is unknown
pub fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ordered_map_keeps_document_order() {
        let map: OrderedMap<i32> =
            serde_json::from_str(r#"{"zeta": 1, "alpha": 2, "mid": 3}"#).unwrap();

        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
        assert_eq!(map.get("alpha"), Some(&2));
        assert_eq!(map.get("missing"), None);
    }

    #[test]
    fn test_ordered_map_duplicate_key_last_value_wins() {
        let map: OrderedMap<i32> = serde_json::from_str(r#"{"a": 1, "b": 2, "a": 3}"#).unwrap();

        assert_eq!(map.len(), 2);
        let entries: Vec<(&str, &i32)> = map.iter().map(|(k, v)| (k.as_str(), v)).collect();
        assert_eq!(entries, vec![("a", &3), ("b", &2)]);
    }

    #[test]
    fn test_year_record_all_fields_optional() {
        let record: YearRecord = serde_json::from_str("{}").unwrap();
        assert!(record.dependency.is_none());
        assert!(record.imports.is_none());
        assert!(record.production.is_none());

        let record: YearRecord = serde_json::from_value(json!({
            "dependency": {"overall": 73.5, "third_countries": null},
            "imports": {
                "total_by_type": {"GAS": {"value": 1200.5, "unit": "TJ_GCV"}},
                "partners": [{"geo": "NO", "name": "Norway", "share_pct": 41.2}]
            },
            "production": {"GAS": 12.5, "OIL": null}
        }))
        .unwrap();

        let dependency = record.dependency.unwrap();
        assert_eq!(dependency.overall, Some(73.5));
        assert_eq!(dependency.third_countries, None);
        assert_eq!(record.imports.unwrap().partners[0].geo, "NO");
        assert_eq!(record.production.unwrap().get("OIL"), Some(&None));
    }

    #[test]
    fn test_repaired_nan_in_string_fields_reads_as_default() {
        let text = r#"{
            "metadata": {"sources": ["eurostat", null], "energy_type_names": {"GAS": "Gas", "OIL": NaN}},
            "countries": {
                "IT": {"name": NaN, "years": {"2023": {"imports": {"partners": [
                    {"geo": NaN, "name": "Unknown", "share_pct": 3.0},
                    {"geo": "NO", "name": NaN, "share_pct": 41.2}
                ]}}}}
            },
            "country_lookup": NaN
        }"#;

        let dataset: DependencyDataset =
            crate::ingest::parse_source(crate::ingest::SourceKind::Dependency, text).unwrap();

        let metadata = dataset.metadata.unwrap();
        assert_eq!(metadata.sources, vec!["eurostat".to_string()]);
        assert_eq!(metadata.energy_type_names.len(), 1);
        assert!(dataset.country_lookup.is_empty());

        let italy = &dataset.countries["IT"];
        assert_eq!(italy.name, "");
        let partners = &italy.year(2023).unwrap().imports.as_ref().unwrap().partners;
        assert_eq!(partners[0].geo, "");
        assert_eq!(partners[1].geo, "NO");
        assert_eq!(partners[1].name, None);
    }

    #[test]
    fn test_repaired_nan_in_carbon_ranking_entry() {
        let text = r#"{"carbon_intensity_ranking": [
            {"code": NaN, "name": NaN, "value": 120.0, "year": 2023},
            {"code": "SE", "name": "Sweden", "value": 8.5, "year": 2023}
        ]}"#;

        let eco: EcoDataset =
            crate::ingest::parse_source(crate::ingest::SourceKind::Eco, text).unwrap();
        assert_eq!(eco.carbon_intensity_ranking.len(), 2);
        assert_eq!(eco.carbon_intensity_ranking[0].code, "");
        assert_eq!(eco.carbon_intensity_ranking[1].name, "Sweden");
    }

    #[test]
    fn test_consumption_end_uses_lookup() {
        let dataset: ConsumptionDataset = serde_json::from_value(json!({
            "countries": {
                "Italy": {
                    "Industry": {
                        "2021": {
                            "Manufacturing": {"products": {"Steel (PJ)": 10.0}}
                        }
                    }
                }
            }
        }))
        .unwrap();

        assert!(dataset.end_uses("Italy", "Industry", 2021).is_some());
        assert!(dataset.end_uses("Italy", "Industry", 2020).is_none());
        assert!(dataset.end_uses("Italy", "Transport", 2021).is_none());
        assert!(dataset.end_uses("Germany", "Industry", 2021).is_none());
    }

    #[test]
    fn test_metadata_generated_at() {
        let metadata = DependencyMetadata {
            generated: Some("2025-01-14T10:22:31.123456".to_string()),
            ..Default::default()
        };
        let ts = metadata.generated_at().unwrap();
        assert_eq!(ts.format("%Y-%m-%d").to_string(), "2025-01-14");

        let broken = DependencyMetadata {
            generated: Some("yesterday".to_string()),
            ..Default::default()
        };
        assert!(broken.generated_at().is_none());
    }

    #[test]
    fn test_coerce_number() {
        assert_eq!(coerce_number(&json!(12.5)), Some(12.5));
        assert_eq!(coerce_number(&json!("234")), Some(234.0));
        assert_eq!(coerce_number(&json!(0)), Some(0.0));
        assert_eq!(coerce_number(&json!(null)), None);
        assert_eq!(coerce_number(&json!("")), None);
        assert_eq!(coerce_number(&json!("n/a")), None);
        assert_eq!(coerce_number(&json!({"CPI0450": 1})), None);
    }
}
