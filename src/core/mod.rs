pub mod extract;
pub mod harvester;
pub mod poller;
pub mod status;
pub mod store;

pub use crate::domain::model::{
    HarvestOutcome, HarvestReport, ShipmentRecord, ShipmentStatus, SyncReport,
};
pub use crate::domain::ports::{Browser, Element, Locator, PageFetcher, Storage};
pub use crate::utils::error::Result;
