// 🚢 Dependency, Trade and Production/Consumption views
//
// Partner keys arrive in Eurostat format and may be regional aggregates.
// Every partner is resolved before it reaches a geographic join, and aggregates
// are flagged instead of being mis-joined to a country.

use super::selected_year;
use crate::codes::CountryCodeResolver;
use crate::dataset::{DatasetModel, DependencyRecord, TradeFlow, TypeTotal};
use crate::selection::Selection;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartnerView {
    /// Key as written by the source ("EL")
    pub geo: String,
    /// Standard alpha-2 ("GR"), or the aggregate token
    pub code: String,
    /// ISO numeric for geographic joins, None for aggregates and unmapped keys
    pub numeric: Option<String>,
    pub name: String,
    pub share_pct: Option<f64>,
    pub is_aggregate: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeFlowView {
    pub total_by_type: BTreeMap<String, TypeTotal>,
    pub partners: Vec<PartnerView>,
}

impl TradeFlowView {
    /// Partners that can be joined to a map (aggregates and unmapped keys removed)
    pub fn geographic_partners(&self) -> impl Iterator<Item = &PartnerView> {
        self.partners.iter().filter(|p| p.numeric.is_some())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeView {
    pub imports: Option<TradeFlowView>,
    pub exports: Option<TradeFlowView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionConsumptionView {
    pub production: BTreeMap<String, Option<f64>>,
    pub consumption: BTreeMap<String, Option<f64>>,
    /// From dataset metadata ("TWh")
    pub unit: Option<String>,
}

// ============================================================================
// PROJECTORS
// ============================================================================

/// Dependency payload for the selection
pub fn project_dependency(model: &DatasetModel, selection: &Selection) -> Option<DependencyRecord> {
    selected_year(model, selection)?.dependency.clone()
}

/// None when the year is not reported at all
pub fn project_trade(model: &DatasetModel, selection: &Selection) -> Option<TradeView> {
    let year = selected_year(model, selection)?;
    let resolver = CountryCodeResolver::global();

    Some(TradeView {
        imports: year.imports.as_ref().map(|flow| resolve_flow(resolver, flow)),
        exports: year.exports.as_ref().map(|flow| resolve_flow(resolver, flow)),
    })
}

pub fn project_production_consumption(
    model: &DatasetModel,
    selection: &Selection,
) -> Option<ProductionConsumptionView> {
    let year = selected_year(model, selection)?;
    if year.production.is_none() && year.consumption.is_none() {
        return None;
    }

    Some(ProductionConsumptionView {
        production: year.production.clone().unwrap_or_default(),
        consumption: year.consumption.clone().unwrap_or_default(),
        unit: model
            .dependency
            .metadata
            .as_ref()
            .and_then(|m| m.production_consumption_unit.clone()),
    })
}

fn resolve_flow(resolver: &CountryCodeResolver, flow: &TradeFlow) -> TradeFlowView {
    let partners = flow
        .partners
        .iter()
        // A partner without a geo key cannot be placed on the map
        .filter(|partner| !partner.geo.trim().is_empty())
        .map(|partner| {
            let resolved = resolver.resolve_partner(&partner.geo);
            let code = resolver.normalize(&partner.geo);
            let name = partner
                .name
                .clone()
                .filter(|n| !n.is_empty())
                .or_else(|| resolver.display_name(&code).map(str::to_string))
                .unwrap_or_else(|| partner.geo.clone());

            PartnerView {
                geo: partner.geo.clone(),
                numeric: resolved.numeric().map(str::to_string),
                is_aggregate: resolved.is_aggregate(),
                code,
                name,
                share_pct: partner.share_pct,
            }
        })
        .collect();

    TradeFlowView {
        total_by_type: flow.total_by_type.clone(),
        partners,
    }
}

// ============================================================================
// TESTS
// ============================================================================
