use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Delivery state reported by the carrier. Binary by design: anything the
/// carrier page does not confirm as delivered stays pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShipmentStatus {
    #[default]
    Pending,
    Delivered,
}

impl std::fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShipmentStatus::Pending => write!(f, "Pending"),
            ShipmentStatus::Delivered => write!(f, "Delivered"),
        }
    }
}

/// One tracked shipment. `tracking_number` is the unique key and never
/// changes after creation; everything else is mutable through the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentRecord {
    pub tracking_number: String,
    #[serde(default)]
    pub store_id: String,
    #[serde(default)]
    pub request_id: String,
    #[serde(default)]
    pub request_subject: String,
    #[serde(default)]
    pub status: ShipmentStatus,
    #[serde(default = "default_estimated_delivery")]
    pub estimated_delivery: String,
    pub last_updated: NaiveDateTime,
}

fn default_estimated_delivery() -> String {
    "-".to_string()
}

impl ShipmentRecord {
    /// A freshly harvested record: pending, no delivery estimate yet.
    pub fn new(
        tracking_number: String,
        store_id: String,
        request_id: String,
        request_subject: String,
    ) -> Self {
        Self {
            tracking_number,
            store_id,
            request_id,
            request_subject,
            status: ShipmentStatus::Pending,
            estimated_delivery: default_estimated_delivery(),
            last_updated: chrono::Local::now().naive_local(),
        }
    }
}

/// How a harvest run ended. Both variants are normal termination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarvestOutcome {
    /// The processed-item count reached the portal's advertised total.
    Completed,
    /// The no-progress threshold was hit; whatever was harvested stands.
    Aborted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestReport {
    pub outcome: HarvestOutcome,
    pub processed_items: usize,
    pub new_records: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub attempted: usize,
    pub updated: usize,
    pub failed: usize,
}
