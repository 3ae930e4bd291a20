// 🥧 Sector Breakdown - flat per-sector product totals
//
// Only the sector's rollup row is read, so products are never counted twice
// (once in the rollup, once in its leaf rows).

use super::{consumption_country_key, Sector};
use crate::dataset::{DatasetModel, EndUse, OrderedMap};
use crate::selection::Selection;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedValue {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorBreakdown {
    pub name: String,
    #[serde(rename = "energyType")]
    pub energy_type: Vec<NamedValue>,
}

/// "Electricity (PJ)" → "Electricity"
pub fn product_display_name(label: &str) -> String {
    let trimmed = label.trim_end();
    trimmed
        .strip_suffix("(PJ)")
        .unwrap_or(trimmed)
        .trim()
        .to_string()
}

/// One entry per sector that has at least one product
pub fn project(model: &DatasetModel, selection: &Selection) -> Vec<SectorBreakdown> {
    let Some(country) = consumption_country_key(model, selection) else {
        return Vec::new();
    };

    Sector::ALL
        .iter()
        .filter_map(|sector| {
            let rows = model
                .consumption
                .end_uses(country, sector.label(), selection.year)?;
            breakdown_for(*sector, rows)
        })
        .collect()
}

fn breakdown_for(sector: Sector, rows: &OrderedMap<EndUse>) -> Option<SectorBreakdown> {
    let mut products: OrderedMap<f64> = OrderedMap::new();

    // Any sector's rollup label qualifies, matching the source's shared allow-list
    let is_rollup = |label: &str| Sector::ALL.iter().any(|s| label.contains(s.rollup_label()));

    for (end_use, data) in rows.iter() {
        if !is_rollup(end_use) {
            continue;
        }
        for (product, value) in data.products.iter() {
            if product.contains("Total") {
                continue;
            }
            products.insert(product_display_name(product), value.unwrap_or(0.0));
        }
    }

    if products.is_empty() {
        return None;
    }

    Some(SectorBreakdown {
        name: sector.label().to_string(),
        energy_type: products
            .iter()
            .map(|(name, value)| NamedValue {
                name: name.to_string(),
                value: *value,
            })
            .collect(),
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::tests::model_with_consumption;

    #[test]
    fn test_industry_manufacturing_products() {
        let model = model_with_consumption(r#"{
            "Italy": {
                "Industry": {
                    "2021": {
                        "Manufacturing": {
                            "products": {"Steel (PJ)": 10, "Total final use (PJ)": 10}
                        },
                        "Cement": {"products": {"Coal (PJ)": 4, "Total final use (PJ)": 4}}
                    }
                }
            }
        }"#);

        let view = project(&model, &Selection::new("IT", 2021));
        assert_eq!(
            view,
            vec![SectorBreakdown {
                name: "Industry".to_string(),
                energy_type: vec![NamedValue {
                    name: "Steel".to_string(),
                    value: 10.0
                }],
            }]
        );
    }

    #[test]
    fn test_null_product_defaults_to_zero_and_order_kept() {
        let model = model_with_consumption(r#"{
            "Italy": {
                "Residential": {
                    "2021": {
                        "Space heating": {"products": {"Gas (PJ)": 99}},
                        "Total residential": {
                            "products": {
                                "Oil (PJ)": null,
                                "Electricity (PJ)": 42.5,
                                "Total final use (PJ)": 42.5
                            }
                        }
                    }
                }
            }
        }"#);

        let view = project(&model, &Selection::new("IT", 2021));
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].name, "Residential");
        let names: Vec<&str> = view[0].energy_type.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Oil", "Electricity"]);
        assert_eq!(view[0].energy_type[0].value, 0.0);
        assert_eq!(view[0].energy_type[1].value, 42.5);
    }

    #[test]
    fn test_sectors_without_products_are_omitted() {
        let model = model_with_consumption(r#"{
            "Italy": {
                "Transport": {
                    "2021": {
                        "Total passenger and freight transport": {
                            "products": {"Total final use (PJ)": 900}
                        }
                    }
                },
                "Service": {
                    "2021": {
                        "Total services": {"products": {"Electricity (PJ)": 120}}
                    }
                }
            }
        }"#);

        let view = project(&model, &Selection::new("IT", 2021));
        let sectors: Vec<&str> = view.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(sectors, vec!["Service"]);
    }

    #[test]
    fn test_missing_join_is_empty() {
        let model = model_with_consumption("{}");
        assert!(project(&model, &Selection::new("IT", 2021)).is_empty());
        assert!(project(&model, &Selection::new("DE", 2021)).is_empty());
    }

    #[test]
    fn test_product_display_name() {
        assert_eq!(product_display_name("Steel (PJ)"), "Steel");
        assert_eq!(product_display_name("  Biofuels (PJ) "), "Biofuels");
        assert_eq!(product_display_name("Heat"), "Heat");
    }

    #[test]
    fn test_serialized_field_names() {
        let entry = SectorBreakdown {
            name: "Industry".to_string(),
            energy_type: vec![],
        };
        let json = serde_json::to_value(entry).unwrap();
        assert!(json.get("energyType").is_some());
    }
}
