use crate::core::status::parse_status_page;
use crate::core::store::ShipmentStore;
use crate::domain::model::SyncReport;
use crate::domain::ports::{PageFetcher, Storage};
use crate::utils::error::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Placeholder in the status URL template that gets replaced by the
/// record's tracking number.
pub const TRACKING_PLACEHOLDER: &str = "{tracking}";

#[derive(Debug, Clone)]
pub struct PollerSettings {
    pub status_url_template: String,
    /// Carrier page fetches in flight at any instant.
    pub max_in_flight: usize,
    /// Spacing each worker observes after its request, while still holding
    /// its admission slot.
    pub request_spacing: Duration,
}

impl Default for PollerSettings {
    fn default() -> Self {
        Self {
            status_url_template: format!(
                "https://www.ups.com.tr/WaybillSorgu.aspx?Waybill={}",
                TRACKING_PLACEHOLDER
            ),
            max_in_flight: 2,
            request_spacing: Duration::from_millis(500),
        }
    }
}

/// Refreshes the status of every stored shipment by fetching the carrier's
/// waybill page, bounded by a counting admission gate. One worker per record;
/// a failing record is logged and left as it was, the rest proceed.
pub struct StatusPoller<F: PageFetcher, S: Storage> {
    fetcher: Arc<F>,
    store: Arc<ShipmentStore<S>>,
    settings: PollerSettings,
}

impl<F, S> StatusPoller<F, S>
where
    F: PageFetcher + 'static,
    S: Storage + 'static,
{
    pub fn new(fetcher: F, store: Arc<ShipmentStore<S>>, settings: PollerSettings) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            store,
            settings,
        }
    }

    /// Update every record once. Returns after all dispatched workers have
    /// finished, successes and failures alike; individual failures never
    /// surface as errors.
    pub async fn run(&self) -> SyncReport {
        let records = self.store.list_all().await;
        tracing::info!(count = records.len(), "Checking shipment statuses");

        let gate = Arc::new(Semaphore::new(self.settings.max_in_flight));
        let mut workers = Vec::new();

        for record in records {
            if record.tracking_number.is_empty() {
                continue;
            }

            let fetcher = Arc::clone(&self.fetcher);
            let store = Arc::clone(&self.store);
            let gate = Arc::clone(&gate);
            let url = self
                .settings
                .status_url_template
                .replace(TRACKING_PLACEHOLDER, &record.tracking_number);
            let spacing = self.settings.request_spacing;

            workers.push(tokio::spawn(async move {
                let _permit = match gate.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        tracing::warn!("Admission gate closed, skipping");
                        return None;
                    }
                };

                let tracking = record.tracking_number;
                let outcome: Result<bool> = async {
                    tracing::debug!(%tracking, "Fetching carrier status page");
                    let body = fetcher.get_text(&url).await?;
                    let (status, estimated) =
                        parse_status_page(&body, &record.estimated_delivery);
                    let updated = store.update_status(&tracking, status, estimated).await?;
                    if updated {
                        tracing::info!(%tracking, status = %status, "Shipment status updated");
                    }
                    Ok(updated)
                }
                .await;

                // Pace the next request from this slot; the permit is held
                // until the sleep finishes.
                tokio::time::sleep(spacing).await;

                match outcome {
                    Ok(updated) => Some(updated),
                    Err(e) => {
                        tracing::warn!(%tracking, "Status check failed: {}", e);
                        None
                    }
                }
            }));
        }

        let mut report = SyncReport::default();
        for worker in workers {
            report.attempted += 1;
            match worker.await {
                Ok(Some(true)) => report.updated += 1,
                Ok(Some(false)) => {} // record vanished mid-run
                Ok(None) => report.failed += 1,
                Err(e) => {
                    tracing::error!("Status worker panicked: {}", e);
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            attempted = report.attempted,
            updated = report.updated,
            failed = report.failed,
            "Shipment status check finished"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::tests::MemoryStorage;
    use crate::domain::model::{ShipmentRecord, ShipmentStatus};
    use crate::domain::ports::Storage as _;
    use crate::utils::error::SyncError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const DELIVERED_BODY: &str = "<html><body>Paketiniz teslim edilmiştir</body></html>";

    struct GaugeFetcher {
        in_flight: AtomicUsize,
        max_in_flight: Arc<AtomicUsize>,
        fail_for: Option<String>,
    }

    impl GaugeFetcher {
        fn new(max_in_flight: Arc<AtomicUsize>, fail_for: Option<String>) -> Self {
            Self {
                in_flight: AtomicUsize::new(0),
                max_in_flight,
                fail_for,
            }
        }
    }

    #[async_trait]
    impl PageFetcher for GaugeFetcher {
        async fn get_text(&self, url: &str) -> Result<String> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if let Some(needle) = &self.fail_for {
                if url.contains(needle.as_str()) {
                    return Err(SyncError::Io(std::io::Error::new(
                        std::io::ErrorKind::ConnectionReset,
                        "carrier unreachable",
                    )));
                }
            }
            Ok(DELIVERED_BODY.to_string())
        }
    }

    async fn seeded_store(trackings: &[&str]) -> Arc<ShipmentStore<MemoryStorage>> {
        let store = Arc::new(ShipmentStore::load(MemoryStorage::default(), "shipments.json").await);
        for t in trackings {
            let record = ShipmentRecord::new(
                t.to_string(),
                String::new(),
                String::new(),
                String::new(),
            );
            store.insert_if_absent(record).await.unwrap();
        }
        store
    }

    fn settings() -> PollerSettings {
        PollerSettings {
            status_url_template: format!("https://carrier.test/q?w={}", TRACKING_PLACEHOLDER),
            ..PollerSettings::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn never_more_than_two_fetches_in_flight() {
        let store = seeded_store(&["T01", "T02", "T03", "T04", "T05"]).await;
        let max = Arc::new(AtomicUsize::new(0));
        let poller = StatusPoller::new(
            GaugeFetcher::new(Arc::clone(&max), None),
            Arc::clone(&store),
            settings(),
        );

        let report = poller.run().await;

        assert_eq!(report.attempted, 5);
        assert_eq!(report.updated, 5);
        assert!(max.load(Ordering::SeqCst) <= 2);
        // The gate should actually be exercised, not serialized to 1.
        assert_eq!(max.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn one_failure_leaves_the_others_updated() {
        let store = seeded_store(&["T01", "T02", "T03", "T04", "T05"]).await;
        let max = Arc::new(AtomicUsize::new(0));
        let poller = StatusPoller::new(
            GaugeFetcher::new(max, Some("T03".to_string())),
            Arc::clone(&store),
            settings(),
        );

        let report = poller.run().await;

        assert_eq!(report.attempted, 5);
        assert_eq!(report.updated, 4);
        assert_eq!(report.failed, 1);

        for record in store.list_all().await {
            if record.tracking_number == "T03" {
                assert_eq!(record.status, ShipmentStatus::Pending);
                assert_eq!(record.estimated_delivery, "-");
            } else {
                assert_eq!(record.status, ShipmentStatus::Delivered);
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn empty_tracking_numbers_are_skipped() {
        // An empty key cannot be inserted through the store, but a legacy
        // data file might still contain one.
        let storage = MemoryStorage::default();
        let legacy = serde_json::json!([
            {
                "tracking_number": "",
                "last_updated": "2026-08-01T09:00:00"
            },
            {
                "tracking_number": "T01",
                "last_updated": "2026-08-01T09:00:00"
            }
        ]);
        storage
            .write_file("shipments.json", legacy.to_string().as_bytes())
            .await
            .unwrap();
        let store = Arc::new(ShipmentStore::load(storage, "shipments.json").await);

        let max = Arc::new(AtomicUsize::new(0));
        let poller = StatusPoller::new(
            GaugeFetcher::new(max, None),
            Arc::clone(&store),
            settings(),
        );

        let report = poller.run().await;
        assert_eq!(report.attempted, 1);
        assert_eq!(report.updated, 1);
    }
}
