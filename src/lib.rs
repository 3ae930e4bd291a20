// Energy Atlas - Core Library
// Data ingestion, normalization and view projection for the energy atlas datasets.
// Exposes all modules for use in the CLI, the API server, and tests.

pub mod codes;
pub mod config;
pub mod dataset;
pub mod error;
pub mod ingest;
pub mod selection;
pub mod store;
pub mod views;

#[cfg(feature = "server")]
pub mod server;

// Re-export commonly used types
pub use codes::{CountryCodeResolver, ResolvedPartner};
pub use config::EngineConfig;
pub use dataset::{
    CarbonIntensityEntry, ConsumptionDataset, DatasetModel, DependencyDataset, DependencyRecord,
    EcoDataset, PriceDataset, Year,
};
pub use error::{EngineError, Result};
pub use ingest::{sanitize, DirectoryFetcher, MemoryFetcher, SourceFetcher, SourceKind};
pub use selection::{LoadStatus, Selection, YearRange};
pub use store::{CountrySummary, EnergyStore, LoadOutcome, StoreStatus, ViewKey};
pub use views::{
    EndUseLeaf, HierarchyRoot, NamedValue, PartnerView, PricePoint, ProductionConsumptionView,
    RankingEntry, SectorBreakdown, SectorNode, TradeFlowView, TradeView, ViewName,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
