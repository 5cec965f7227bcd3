use shipment_sync::{LocalStorage, ShipmentRecord, ShipmentStatus, ShipmentStore};
use tempfile::TempDir;

const DATA_FILE: &str = "shipments.json";

fn storage(dir: &TempDir) -> LocalStorage {
    LocalStorage::new(dir.path().to_str().unwrap().to_string())
}

fn record(tracking: &str) -> ShipmentRecord {
    ShipmentRecord::new(
        tracking.to_string(),
        "Gratis Kadıköy".to_string(),
        "10234".to_string(),
        "- kasa fişi yazıcısı".to_string(),
    )
}

#[tokio::test]
async fn records_survive_a_reload_field_for_field() {
    let temp_dir = TempDir::new().unwrap();

    let store = ShipmentStore::load(storage(&temp_dir), DATA_FILE).await;
    store.insert_if_absent(record("1Z999AA10123456784")).await.unwrap();
    store.insert_if_absent(record("AB123456789")).await.unwrap();
    store
        .update_status(
            "AB123456789",
            ShipmentStatus::Delivered,
            "27.08.2026".to_string(),
        )
        .await
        .unwrap();
    let original = store.list_all().await;

    let reloaded = ShipmentStore::load(storage(&temp_dir), DATA_FILE).await;
    assert_eq!(reloaded.list_all().await, original);
}

#[tokio::test]
async fn insertion_order_is_preserved_on_disk() {
    let temp_dir = TempDir::new().unwrap();

    let store = ShipmentStore::load(storage(&temp_dir), DATA_FILE).await;
    for tracking in ["T01", "T02", "T03"] {
        store.insert_if_absent(record(tracking)).await.unwrap();
    }

    let reloaded = ShipmentStore::load(storage(&temp_dir), DATA_FILE).await;
    let trackings: Vec<String> = reloaded
        .list_all()
        .await
        .into_iter()
        .map(|r| r.tracking_number)
        .collect();
    assert_eq!(trackings, vec!["T01", "T02", "T03"]);
}

#[tokio::test]
async fn deletes_are_durable() {
    let temp_dir = TempDir::new().unwrap();

    let store = ShipmentStore::load(storage(&temp_dir), DATA_FILE).await;
    store.insert_if_absent(record("T01")).await.unwrap();
    store.insert_if_absent(record("T02")).await.unwrap();
    store.delete("T01").await.unwrap();

    let reloaded = ShipmentStore::load(storage(&temp_dir), DATA_FILE).await;
    assert!(reloaded.find("T01").await.is_none());
    assert!(reloaded.find("T02").await.is_some());

    store.clear_all().await.unwrap();
    let reloaded = ShipmentStore::load(storage(&temp_dir), DATA_FILE).await;
    assert!(reloaded.is_empty().await);
}
