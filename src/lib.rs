pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::http::HttpFetcher;
pub use adapters::storage::LocalStorage;
pub use config::cli::{Cli, Command};
pub use config::{AppConfig, CarrierConfig, HarvestTuning, PortalConfig};
pub use core::harvester::Harvester;
pub use core::poller::{PollerSettings, StatusPoller};
pub use core::store::ShipmentStore;
pub use domain::model::{
    HarvestOutcome, HarvestReport, ShipmentRecord, ShipmentStatus, SyncReport,
};
pub use domain::ports::{Browser, Element, Locator, PageFetcher, Storage};
pub use utils::error::{Result, SyncError};
