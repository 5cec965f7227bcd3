use crate::domain::model::{ShipmentRecord, ShipmentStatus};
use crate::domain::ports::Storage;
use crate::utils::error::Result;
use tokio::sync::Mutex;

/// The one owner of the shipment collection. Harvester and poller go through
/// these methods; neither ever holds a private copy across calls.
///
/// Every mutation persists the full collection to storage while still holding
/// the lock, so "mutate + persist" is a single atomic step from the callers'
/// point of view. Redundant writes under the poller's fan-out are accepted.
pub struct ShipmentStore<S: Storage> {
    storage: S,
    file_name: String,
    records: Mutex<Vec<ShipmentRecord>>,
}

impl<S: Storage> ShipmentStore<S> {
    /// Load the store from `file_name`, treating a missing or unreadable
    /// file as an empty collection.
    pub async fn load(storage: S, file_name: &str) -> Self {
        let records = match storage.read_file(file_name).await {
            Ok(bytes) => match serde_json::from_slice::<Vec<ShipmentRecord>>(&bytes) {
                Ok(records) => {
                    tracing::info!(count = records.len(), "Shipment records loaded");
                    records
                }
                Err(e) => {
                    tracing::error!("Shipment data file is corrupt, starting empty: {}", e);
                    Vec::new()
                }
            },
            Err(_) => {
                tracing::info!("No shipment data file yet, starting empty");
                Vec::new()
            }
        };

        Self {
            storage,
            file_name: file_name.to_string(),
            records: Mutex::new(records),
        }
    }

    async fn persist(&self, records: &[ShipmentRecord]) -> Result<()> {
        let json = serde_json::to_vec_pretty(records)?;
        self.storage.write_file(&self.file_name, &json).await?;
        tracing::debug!(count = records.len(), "Shipment records persisted");
        Ok(())
    }

    pub async fn list_all(&self) -> Vec<ShipmentRecord> {
        self.records.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }

    pub async fn find(&self, tracking_number: &str) -> Option<ShipmentRecord> {
        self.records
            .lock()
            .await
            .iter()
            .find(|r| r.tracking_number == tracking_number)
            .cloned()
    }

    /// Insert a record unless its tracking number is already present.
    /// A duplicate is a no-op and does not touch storage. Returns whether
    /// the record was inserted.
    pub async fn insert_if_absent(&self, record: ShipmentRecord) -> Result<bool> {
        if record.tracking_number.is_empty() {
            return Ok(false);
        }

        let mut records = self.records.lock().await;
        if records
            .iter()
            .any(|r| r.tracking_number == record.tracking_number)
        {
            return Ok(false);
        }

        records.push(record);
        self.persist(&records).await?;
        Ok(true)
    }

    /// Update one record's polled fields, stamping `last_updated`. Returns
    /// whether the record existed.
    pub async fn update_status(
        &self,
        tracking_number: &str,
        status: ShipmentStatus,
        estimated_delivery: String,
    ) -> Result<bool> {
        if tracking_number.is_empty() {
            return Ok(false);
        }

        let mut records = self.records.lock().await;
        let Some(record) = records
            .iter_mut()
            .find(|r| r.tracking_number == tracking_number)
        else {
            return Ok(false);
        };

        record.status = status;
        record.estimated_delivery = estimated_delivery;
        record.last_updated = chrono::Local::now().naive_local();
        self.persist(&records).await?;
        Ok(true)
    }

    /// Remove one record. Returns whether it existed.
    pub async fn delete(&self, tracking_number: &str) -> Result<bool> {
        let mut records = self.records.lock().await;
        let before = records.len();
        records.retain(|r| r.tracking_number != tracking_number);
        if records.len() == before {
            return Ok(false);
        }
        self.persist(&records).await?;
        tracing::info!(tracking_number, "Shipment deleted");
        Ok(true)
    }

    pub async fn clear_all(&self) -> Result<()> {
        let mut records = self.records.lock().await;
        records.clear();
        self.persist(&records).await?;
        tracing::info!("All shipments deleted");
        Ok(())
    }
}
