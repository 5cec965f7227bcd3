use anyhow::Context;
use clap::Parser;
use shipment_sync::utils::{logger, validation::Validate};
use shipment_sync::{
    AppConfig, Cli, Command, HttpFetcher, LocalStorage, PollerSettings, ShipmentRecord,
    ShipmentStore, StatusPoller,
};
use std::sync::Arc;
use std::time::Duration;

const DATA_FILE: &str = "shipments.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logger::init_cli_logger(cli.verbose);

    let config =
        AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    let storage = LocalStorage::new(cli.data_dir.clone());
    let store = Arc::new(ShipmentStore::load(storage, DATA_FILE).await);

    match cli.command {
        Command::Sync => {
            let settings = PollerSettings {
                status_url_template: config.carrier.status_url_template.clone(),
                max_in_flight: config.carrier.max_in_flight,
                request_spacing: Duration::from_millis(config.carrier.request_spacing_ms),
            };
            let fetcher = HttpFetcher::new().context("Failed to build HTTP client")?;
            let poller = StatusPoller::new(fetcher, Arc::clone(&store), settings);
            let report = poller.run().await;
            println!(
                "Checked {} shipments: {} updated, {} failed",
                report.attempted, report.updated, report.failed
            );
        }
        Command::List => {
            let records = store.list_all().await;
            if records.is_empty() {
                println!("No shipments tracked yet.");
            }
            for record in records {
                println!(
                    "{}  {:<10} {:<12} {}  (store: {}, updated: {})",
                    record.tracking_number,
                    record.status,
                    record.estimated_delivery,
                    record.request_subject,
                    record.store_id,
                    record.last_updated,
                );
            }
        }
        Command::Add {
            tracking_number,
            store_id,
            subject,
        } => {
            if tracking_number.is_empty() {
                anyhow::bail!("A tracking number is required");
            }
            let record = ShipmentRecord::new(tracking_number.clone(), store_id, String::new(), subject);
            if store
                .insert_if_absent(record)
                .await
                .context("Failed to save shipment")?
            {
                println!("Shipment {} added.", tracking_number);
            } else {
                println!("Shipment {} is already tracked.", tracking_number);
            }
        }
        Command::Remove { tracking_number } => {
            if store
                .delete(&tracking_number)
                .await
                .context("Failed to save shipment data")?
            {
                println!("Shipment {} deleted.", tracking_number);
            } else {
                println!("No shipment with tracking number {}.", tracking_number);
            }
        }
        Command::Clear => {
            store
                .clear_all()
                .await
                .context("Failed to save shipment data")?;
            println!("All shipments deleted.");
        }
        Command::Harvest { email, password } => {
            let email = email.unwrap_or_else(|| config.portal.email.clone());
            let password = password.unwrap_or_else(|| config.portal.password.clone());
            if email.is_empty() || password.is_empty() {
                anyhow::bail!(
                    "Portal credentials missing: pass --email/--password or set them in the config file"
                );
            }
            // The rendering driver is supplied by the embedding deployment;
            // this binary ships without one.
            anyhow::bail!(
                "No browsing driver is wired into this binary. Use shipment_sync::Harvester \
                 with your deployment's Browser implementation to run harvests."
            );
        }
    }

    Ok(())
}
