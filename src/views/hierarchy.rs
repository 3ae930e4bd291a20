// 🌳 Hierarchical Breakdown - sector → end-use tree
//
// Each sector mixes leaf rows with aggregate rows, and each names its aggregates
// differently, so child selection is sector-specific:
//
// - Industry:    every row except "Manufacturing" (the aggregate)
// - Transport:   rows without "Total", plus trains/airplanes/ships which are
//                totals of disjoint leaf categories
// - Residential/Service: every row except "Total residential"/"Total services"
//
// Fallback totals only repair the sector's numeric value. They never add children,
// and a sector without children is dropped.

use super::{consumption_country_key, selected_country, Sector, TOTAL_FINAL_USE};
use crate::dataset::{DatasetModel, EndUse, OrderedMap};
use crate::selection::Selection;
use serde::{Deserialize, Serialize};

/// Transport totals that are leaf categories in their own right
const TRANSPORT_LEAF_TOTALS: [&str; 3] = ["Total trains", "Total airplanes", "Total ships"];

const RESIDENTIAL_SERVICE_AGGREGATES: [&str; 2] = ["Total residential", "Total services"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchyRoot {
    /// "<country> <year>"
    pub name: String,
    pub children: Vec<SectorNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorNode {
    pub name: String,
    pub value: f64,
    pub children: Vec<EndUseLeaf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndUseLeaf {
    pub name: String,
    pub value: f64,
}

/// Row total ("Total final use (PJ)"), unknown counts as 0
fn row_total(row: &EndUse) -> f64 {
    row.products
        .get(TOTAL_FINAL_USE)
        .copied()
        .flatten()
        .unwrap_or(0.0)
}

/// None when the country cannot be joined to the consumption source
pub fn project(model: &DatasetModel, selection: &Selection) -> Option<HierarchyRoot> {
    let (_, country) = selected_country(model, selection)?;
    let consumption_key = consumption_country_key(model, selection)?;

    let children = Sector::ALL
        .iter()
        .filter_map(|sector| {
            let rows = model
                .consumption
                .end_uses(consumption_key, sector.label(), selection.year)?;
            sector_node(*sector, rows)
        })
        .collect();

    Some(HierarchyRoot {
        name: format!("{} {}", country.name, selection.year),
        children,
    })
}

fn sector_node(sector: Sector, rows: &OrderedMap<EndUse>) -> Option<SectorNode> {
    let include: fn(&str) -> bool = match sector {
        Sector::Industry => |label| !label.contains("Manufacturing"),
        Sector::Transport => {
            |label| !label.contains("Total") || TRANSPORT_LEAF_TOTALS.contains(&label)
        }
        Sector::Residential | Sector::Service => {
            |label| !RESIDENTIAL_SERVICE_AGGREGATES.iter().any(|agg| label.contains(agg))
        }
    };

    let children: Vec<EndUseLeaf> = rows
        .iter()
        .filter(|(label, _)| include(label.as_str()))
        .map(|(label, row)| EndUseLeaf {
            name: label.to_string(),
            value: row_total(row),
        })
        .collect();

    if children.is_empty() {
        return None;
    }

    let mut total: f64 = children.iter().map(|c| c.value).sum();

    if total == 0.0 {
        total = match sector {
            Sector::Industry => total,
            Sector::Transport => rows
                .get(Sector::Transport.rollup_label())
                .map(row_total)
                .unwrap_or(0.0),
            // Exact label equality (see DESIGN.md, open question on the fallback)
            Sector::Residential | Sector::Service => rows
                .iter()
                .filter(|(label, _)| RESIDENTIAL_SERVICE_AGGREGATES.contains(&label.as_str()))
                .map(|(_, row)| row_total(row))
                .sum(),
        };
    }

    Some(SectorNode {
        name: sector.label().to_string(),
        value: total,
        children,
    })
}

// ============================================================================
// TESTS
// ============================================================================
