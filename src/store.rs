// 🗄️ Energy Store - loaded datasets + selection + load status
//
// A cloneable handle: every clone sees the same state.
//
// Load lifecycle:
// 1. mark Loading (under the write lock)
// 2. fetch + parse every source with the lock released
// 3. install the whole DatasetModel at once
//
// Readers never observe a half-loaded model. Selection writes made while a load is
// in flight are kept and apply to the freshly installed model.

use crate::codes::CountryCodeResolver;
use crate::config::EngineConfig;
use crate::dataset::{
    CarbonIntensityEntry, ConsumptionDataset, DatasetModel, DependencyDataset, DependencyMetadata,
    DependencyRecord, EcoDataset, PriceDataset, Year,
};
use crate::error::Result;
use crate::ingest::{parse_source, SourceFetcher, SourceKind};
use crate::selection::{LoadStatus, Selection, YearRange};
use crate::views::{
    self, HierarchyRoot, PricePoint, ProductionConsumptionView, RankingEntry, SectorBreakdown,
    TradeView, ViewName,
};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, error, info, warn};

// ============================================================================
// PUBLIC TYPES
// ============================================================================

/// What a call to `load` actually did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Sources fetched and installed. Lists optional sources that degraded to absent.
    Loaded { missing_optional: Vec<&'static str> },
    /// Mandatory data already present, nothing fetched
    AlreadyLoaded,
    /// Another load is running, this call was collapsed into it
    InFlight,
}

/// Country picker entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountrySummary {
    pub code: String,
    pub name: String,
}

/// Load status snapshot for status endpoints and the CLI summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreStatus {
    pub status: LoadStatus,
    pub selection: Selection,
    pub country_count: usize,
    pub prices_loaded: bool,
    pub eco_loaded: bool,
    pub dataset_version: Option<String>,
    pub loaded_at: Option<DateTime<Utc>>,
}

/// Memoization key for projector outputs
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ViewKey {
    pub dataset_version: String,
    pub country_code: String,
    pub year: Year,
}

// ============================================================================
// STATE
// ============================================================================

#[derive(Debug)]
struct StoreState {
    model: Option<Arc<DatasetModel>>,
    selection: Selection,
    status: LoadStatus,
    year_range: YearRange,
    dataset_version: Option<String>,
    loaded_at: Option<DateTime<Utc>>,
}

/// Everything one fetch pass produced, before installation
struct FetchedSources {
    model: DatasetModel,
    version: String,
    missing_optional: Vec<&'static str>,
}

#[derive(Debug, Clone)]
pub struct EnergyStore {
    state: Arc<RwLock<StoreState>>,
}

impl EnergyStore {
    pub fn new(selection: Selection) -> Self {
        Self::with_year_range(selection, YearRange::default())
    }

    pub fn with_year_range(selection: Selection, year_range: YearRange) -> Self {
        EnergyStore {
            state: Arc::new(RwLock::new(StoreState {
                model: None,
                selection,
                status: LoadStatus::Idle,
                year_range,
                dataset_version: None,
                loaded_at: None,
            })),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::with_year_range(config.default_selection(), config.year_range)
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    // ========================================================================
    // LOADING
    // ========================================================================

    /// Fetch and install all sources, at most once
    ///
    /// Returns without fetching when mandatory data is already loaded, and collapses
    /// into a load that is already running.
    pub fn load(&self, fetcher: &dyn SourceFetcher) -> Result<LoadOutcome> {
        {
            let mut state = self.write();
            if state.model.is_some() {
                debug!("datasets already loaded, skipping fetch");
                return Ok(LoadOutcome::AlreadyLoaded);
            }
            if state.status.is_loading() {
                debug!("load already in flight, collapsing");
                return Ok(LoadOutcome::InFlight);
            }
            state.status = LoadStatus::Loading;
        }

        self.run_load(fetcher)
    }

    /// Fetch again and replace the installed model
    ///
    /// On failure the previously installed model stays visible.
    pub fn reload(&self, fetcher: &dyn SourceFetcher) -> Result<LoadOutcome> {
        {
            let mut state = self.write();
            if state.status.is_loading() {
                debug!("load already in flight, collapsing reload");
                return Ok(LoadOutcome::InFlight);
            }
            state.status = LoadStatus::Loading;
        }

        self.run_load(fetcher)
    }

    fn run_load(&self, fetcher: &dyn SourceFetcher) -> Result<LoadOutcome> {
        info!("loading energy datasets");
        let _guard = LoadingGuard { store: self };

        match fetch_all(fetcher) {
            Ok(fetched) => {
                let mut state = self.write();
                let country_count = fetched.model.dependency.countries.len();
                state.model = Some(Arc::new(fetched.model));
                state.dataset_version = Some(fetched.version);
                state.loaded_at = Some(Utc::now());
                state.status = LoadStatus::Ready;
                info!(
                    countries = country_count,
                    missing_optional = ?fetched.missing_optional,
                    "energy datasets loaded"
                );
                Ok(LoadOutcome::Loaded {
                    missing_optional: fetched.missing_optional,
                })
            }
            Err(e) => {
                let mut state = self.write();
                error!(error = %e, "failed to load energy datasets");
                state.status = if state.model.is_some() {
                    LoadStatus::Ready
                } else {
                    LoadStatus::Failed(e.to_string())
                };
                Err(e)
            }
        }
    }

    // ========================================================================
    // SELECTION
    // ========================================================================

    pub fn set_selected_country(&self, country_code: &str) {
        let mut state = self.write();
        state.selection.country_code = country_code.trim().to_string();
    }

    /// Apply a partial update under one write lock and return the result
    ///
    /// `None` fields keep their current value.
    pub fn update_selection(&self, country_code: Option<&str>, year: Option<Year>) -> Selection {
        let mut state = self.write();
        if let Some(code) = country_code {
            state.selection.country_code = code.trim().to_string();
        }
        if let Some(year) = year {
            state.selection.year = year;
        }
        state.selection.clone()
    }

    pub fn set_selected_year(&self, year: Year) {
        let mut state = self.write();
        state.selection.year = year;
    }

    pub fn set_selection(&self, selection: Selection) {
        self.write().selection = selection;
    }

    pub fn selection(&self) -> Selection {
        self.read().selection.clone()
    }

    // ========================================================================
    // STATUS
    // ========================================================================

    pub fn status(&self) -> LoadStatus {
        self.read().status.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.read().status.is_loading()
    }

    pub fn error(&self) -> Option<String> {
        self.read().status.error().map(str::to_string)
    }

    pub fn prices_loaded(&self) -> bool {
        self.read().model.as_ref().is_some_and(|m| m.prices.is_some())
    }

    pub fn eco_loaded(&self) -> bool {
        self.read().model.as_ref().is_some_and(|m| m.eco.is_some())
    }

    /// SHA-256 over the fetched texts of the installed model
    pub fn dataset_version(&self) -> Option<String> {
        self.read().dataset_version.clone()
    }

    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.read().loaded_at
    }

    pub fn year_range(&self) -> YearRange {
        self.read().year_range
    }

    pub fn snapshot_status(&self) -> StoreStatus {
        let state = self.read();
        StoreStatus {
            status: state.status.clone(),
            selection: state.selection.clone(),
            country_count: state
                .model
                .as_ref()
                .map(|m| m.dependency.countries.len())
                .unwrap_or(0),
            prices_loaded: state.model.as_ref().is_some_and(|m| m.prices.is_some()),
            eco_loaded: state.model.as_ref().is_some_and(|m| m.eco.is_some()),
            dataset_version: state.dataset_version.clone(),
            loaded_at: state.loaded_at,
        }
    }

    /// Key identifying the current projector inputs, None before the first load
    pub fn view_key(&self) -> Option<ViewKey> {
        let state = self.read();
        Some(ViewKey {
            dataset_version: state.dataset_version.clone()?,
            country_code: state.selection.country_code.clone(),
            year: state.selection.year,
        })
    }

    // ========================================================================
    // DERIVED STATE
    // ========================================================================

    /// Installed model + selection, taken together under one read lock
    fn snapshot(&self) -> Option<(Arc<DatasetModel>, Selection)> {
        let state = self.read();
        let model = state.model.clone()?;
        Some((model, state.selection.clone()))
    }

    /// Project a view, or fall back to its empty value when nothing is loaded
    fn project<T: Default>(&self, projector: impl FnOnce(&DatasetModel, &Selection) -> T) -> T {
        match self.snapshot() {
            Some((model, selection)) => projector(&model, &selection),
            None => T::default(),
        }
    }

    /// All countries of the dependency source, sorted by name
    pub fn countries(&self) -> Vec<CountrySummary> {
        self.project(|model, _| {
            let resolver = CountryCodeResolver::global();
            let mut countries: Vec<CountrySummary> = model
                .dependency
                .countries
                .iter()
                .map(|(code, country)| CountrySummary {
                    code: code.clone(),
                    name: if country.name.is_empty() {
                        resolver.display_name(code).unwrap_or(code.as_str()).to_string()
                    } else {
                        country.name.clone()
                    },
                })
                .collect();
            countries.sort_by(|a, b| {
                a.name
                    .to_lowercase()
                    .cmp(&b.name.to_lowercase())
                    .then_with(|| a.code.cmp(&b.code))
            });
            countries
        })
    }

    pub fn selected_country(&self) -> Option<CountrySummary> {
        self.project(|model, selection| {
            views::selected_country(model, selection).map(|(code, country)| CountrySummary {
                code: code.to_string(),
                name: country.name.clone(),
            })
        })
    }

    /// Years reported for the selected country, newest first
    pub fn available_years(&self) -> Vec<Year> {
        self.project(|model, selection| {
            let Some((_, country)) = views::selected_country(model, selection) else {
                return Vec::new();
            };
            let mut years: Vec<Year> = country
                .years
                .keys()
                .filter_map(|key| key.parse::<Year>().ok())
                .collect();
            years.sort_unstable_by(|a, b| b.cmp(a));
            years
        })
    }

    pub fn metadata(&self) -> Option<DependencyMetadata> {
        self.project(|model, _| model.dependency.metadata.clone())
    }

    // ========================================================================
    // VIEWS
    // ========================================================================

    pub fn dependency(&self) -> Option<DependencyRecord> {
        self.project(views::trade::project_dependency)
    }

    pub fn trade(&self) -> Option<TradeView> {
        self.project(views::trade::project_trade)
    }

    pub fn production_consumption(&self) -> Option<ProductionConsumptionView> {
        self.project(views::trade::project_production_consumption)
    }

    pub fn sector_breakdown(&self) -> Vec<SectorBreakdown> {
        self.project(views::sectors::project)
    }

    pub fn hierarchy(&self) -> Option<HierarchyRoot> {
        self.project(views::hierarchy::project)
    }

    pub fn price_series(&self) -> Vec<PricePoint> {
        self.project(views::prices::project)
    }

    pub fn carbon_intensity_ranking(&self) -> Vec<CarbonIntensityEntry> {
        self.project(|model, _| views::rankings::project_carbon_intensity(model))
    }

    pub fn emissions_per_capita_ranking(&self) -> Vec<RankingEntry> {
        self.project(|model, _| views::rankings::project_emissions_per_capita(model))
    }

    /// Any view by name, as JSON (`null` for an absent single-object view)
    pub fn view_json(&self, name: ViewName) -> serde_json::Result<Value> {
        match name {
            ViewName::Dependency => serde_json::to_value(self.dependency()),
            ViewName::Trade => serde_json::to_value(self.trade()),
            ViewName::ProductionConsumption => serde_json::to_value(self.production_consumption()),
            ViewName::Sectors => serde_json::to_value(self.sector_breakdown()),
            ViewName::Hierarchy => serde_json::to_value(self.hierarchy()),
            ViewName::Prices => serde_json::to_value(self.price_series()),
            ViewName::CarbonRanking => serde_json::to_value(self.carbon_intensity_ranking()),
            ViewName::EmissionsRanking => serde_json::to_value(self.emissions_per_capita_ranking()),
        }
    }
}

impl Default for EnergyStore {
    fn default() -> Self {
        Self::new(Selection::default())
    }
}

// ============================================================================
// LOAD GUARD
// ============================================================================

/// Leaves `Loading` behind if a fetcher unwinds out of `run_load`
///
/// Normal returns have already settled the status, so this only acts on panics.
struct LoadingGuard<'a> {
    store: &'a EnergyStore,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.store.write();
        if !state.status.is_loading() {
            return;
        }
        warn!("load aborted before completion");
        state.status = if state.model.is_some() {
            LoadStatus::Ready
        } else {
            LoadStatus::Failed("load aborted before completion".to_string())
        };
    }
}

// ============================================================================
// FETCH PASS
// ============================================================================

fn fetch_all(fetcher: &dyn SourceFetcher) -> Result<FetchedSources> {
    let mut hasher = Sha256::new();
    let mut missing_optional = Vec::new();

    let dependency: DependencyDataset =
        fetch_mandatory(fetcher, SourceKind::Dependency, &mut hasher)?;
    let consumption: ConsumptionDataset =
        fetch_mandatory(fetcher, SourceKind::Consumption, &mut hasher)?;

    let prices: Option<PriceDataset> = fetch_optional(fetcher, SourceKind::Prices, &mut hasher);
    if prices.is_none() {
        missing_optional.push(SourceKind::Prices.name());
    }
    let eco: Option<EcoDataset> = fetch_optional(fetcher, SourceKind::Eco, &mut hasher);
    if eco.is_none() {
        missing_optional.push(SourceKind::Eco.name());
    }

    Ok(FetchedSources {
        model: DatasetModel {
            dependency,
            consumption,
            prices,
            eco,
        },
        version: format!("{:x}", hasher.finalize()),
        missing_optional,
    })
}

fn fetch_mandatory<T: DeserializeOwned>(
    fetcher: &dyn SourceFetcher,
    kind: SourceKind,
    hasher: &mut Sha256,
) -> Result<T> {
    let text = fetcher.fetch_source(kind)?;
    hasher.update(kind.name().as_bytes());
    hasher.update(text.as_bytes());
    parse_source(kind, &text)
}

fn fetch_optional<T: DeserializeOwned>(
    fetcher: &dyn SourceFetcher,
    kind: SourceKind,
    hasher: &mut Sha256,
) -> Option<T> {
    let parsed = fetcher.fetch_source(kind).and_then(|text| {
        let dataset = parse_source(kind, &text)?;
        hasher.update(kind.name().as_bytes());
        hasher.update(text.as_bytes());
        Ok(dataset)
    });

    match parsed {
        Ok(dataset) => Some(dataset),
        Err(e) => {
            warn!(
                source = kind.name(),
                error = %e,
                "optional source unavailable, its views will be empty"
            );
            None
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
