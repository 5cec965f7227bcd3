use crate::config::{HarvestTuning, PortalConfig};
use crate::core::extract::extract_tracking_number;
use crate::core::store::ShipmentStore;
use crate::domain::model::{HarvestOutcome, HarvestReport, ShipmentRecord};
use crate::domain::ports::{Browser, Element, Locator, Storage};
use crate::utils::error::{Result, SyncError};
use regex::Regex;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::LazyLock;

// Portal login form (Microsoft sign-in page the portal redirects to).
const EMAIL_INPUT_ID: &str = "i0116";
const PASSWORD_INPUT_ID: &str = "i0118";
const ADVANCE_BUTTON_ID: &str = "idSIButton9";

// Portal inbox view.
const ITEM_COUNTER_ID: &str = "view_counter";
const LIST_CONTAINER_ID: &str = "view_list_container";
const LIST_ROW_CSS: &str = "div.grid-row";
const ROW_ID_CELL_CSS: &str = "div.cell-path";
const ROW_SUBJECT_SPAN_CSS: &str = "div.cell-subject span";
const ROW_SUBJECT_CELL_CSS: &str = "div.cell-subject";

// Ticket detail view.
const DETAIL_HEADER_CLASS: &str = "header_bar_inner";
const SUBMITTER_LABEL: &str = "Talep eden";
const OWNER_LABEL: &str = "Talep sahibi";

/// Cargo tickets are filed with a subject starting with this marker; anything
/// else is skipped without opening.
const CARGO_SUBJECT_PREFIX: &str = "-";

/// Seen-set key prefix marking "this list entry was inspected", whether or
/// not it yielded a tracking number.
const SEEN_ITEM_PREFIX: &str = "ITEM_";

static DIGITS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

enum Phase {
    Authenticating,
    CountingItems,
    Sweeping,
    Finished(HarvestOutcome),
}

fn auth_err(step: &'static str) -> impl FnOnce(SyncError) -> SyncError {
    move |e| SyncError::Auth {
        step,
        message: e.to_string(),
    }
}

/// Walks the portal inbox in a single browsing session: sign in, read the
/// advertised item total, then sweep the rendered rows, open cargo tickets,
/// extract tracking numbers and append new records to the store, scrolling
/// for more rows until the total is reached or progress stalls.
///
/// Strictly sequential; the one browsing session must not be shared with a
/// concurrent run. The seen set lives only for the duration of `run` —
/// across runs only the store's tracking numbers dedupe, so non-cargo
/// tickets get re-inspected every run.
pub struct Harvester<B: Browser, S: Storage> {
    browser: B,
    store: Arc<ShipmentStore<S>>,
    portal: PortalConfig,
    tuning: HarvestTuning,
    seen: HashSet<String>,
    total_items: usize,
    no_progress_sweeps: u32,
    new_records: usize,
}

impl<B: Browser, S: Storage> Harvester<B, S> {
    pub fn new(
        browser: B,
        store: Arc<ShipmentStore<S>>,
        portal: PortalConfig,
        tuning: HarvestTuning,
    ) -> Self {
        Self {
            browser,
            store,
            portal,
            tuning,
            seen: HashSet::new(),
            total_items: 0,
            no_progress_sweeps: 0,
            new_records: 0,
        }
    }

    /// Run one harvest. Authentication and setup failures propagate;
    /// everything after that is recoverable per item. Both `Completed` and
    /// `Aborted` are normal outcomes.
    pub async fn run(&mut self, email: &str, password: &str) -> Result<HarvestReport> {
        if email.is_empty() {
            return Err(SyncError::Config {
                message: "portal email is missing".to_string(),
            });
        }
        if password.is_empty() {
            return Err(SyncError::Config {
                message: "portal password is missing".to_string(),
            });
        }

        self.seen.clear();
        self.total_items = 0;
        self.no_progress_sweeps = 0;
        self.new_records = 0;

        let mut phase = Phase::Authenticating;
        let outcome = loop {
            phase = match phase {
                Phase::Authenticating => {
                    self.authenticate(email, password).await?;
                    Phase::CountingItems
                }
                Phase::CountingItems => {
                    self.total_items = self.count_items().await;
                    Phase::Sweeping
                }
                Phase::Sweeping => self.sweep().await?,
                Phase::Finished(outcome) => break outcome,
            };
        };

        let report = HarvestReport {
            outcome,
            processed_items: self.processed_count(),
            new_records: self.new_records,
        };
        tracing::info!(
            outcome = ?report.outcome,
            processed = report.processed_items,
            new_records = report.new_records,
            "Harvest finished"
        );
        Ok(report)
    }

    async fn authenticate(&mut self, email: &str, password: &str) -> Result<()> {
        tracing::info!("Signing in to the ticketing portal");
        self.browser
            .navigate(&self.portal.inbox_url)
            .await
            .map_err(auth_err("open inbox"))?;
        self.settle(self.tuning.after_navigation_ms).await;

        let email_input = self
            .browser
            .wait_for(&Locator::id(EMAIL_INPUT_ID), self.tuning.login_wait())
            .await
            .map_err(auth_err("email input"))?;
        self.browser
            .clear_and_type(email_input, email)
            .await
            .map_err(auth_err("email input"))?;
        self.settle(self.tuning.between_login_steps_ms).await;

        self.click_advance("submit email").await?;
        self.settle(self.tuning.between_login_steps_ms).await;

        let password_input = self
            .browser
            .find_element(&Locator::id(PASSWORD_INPUT_ID))
            .await
            .map_err(auth_err("password input"))?;
        self.browser
            .clear_and_type(password_input, password)
            .await
            .map_err(auth_err("password input"))?;
        self.settle(self.tuning.between_login_steps_ms).await;

        self.click_advance("submit password").await?;
        self.settle(self.tuning.between_login_steps_ms).await;

        // Stay-signed-in prompt.
        self.click_advance("confirm sign-in").await?;
        self.settle(self.tuning.after_login_ms).await;
        Ok(())
    }

    async fn click_advance(&mut self, step: &'static str) -> Result<()> {
        let button = self
            .browser
            .find_element(&Locator::id(ADVANCE_BUTTON_ID))
            .await
            .map_err(auth_err(step))?;
        self.browser.click(button).await.map_err(auth_err(step))
    }

    /// Read the inbox's advertised item count. Absence or an unparseable
    /// counter is non-fatal and yields zero, which makes the sweep loop's
    /// target already satisfied (the run then completes without work).
    async fn count_items(&mut self) -> usize {
        let counter = match self
            .browser
            .wait_for(&Locator::id(ITEM_COUNTER_ID), self.tuning.login_wait())
            .await
        {
            Ok(element) => element,
            Err(e) => {
                tracing::warn!("Item counter element not found: {}", e);
                return 0;
            }
        };

        let text = match self.browser.read_text(counter).await {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                tracing::warn!("Item counter unreadable: {}", e);
                return 0;
            }
        };

        match DIGITS_RE.find(&text).and_then(|m| m.as_str().parse().ok()) {
            Some(total) => {
                tracing::info!(total, "Inbox item count");
                total
            }
            None => {
                tracing::warn!(%text, "Item counter text is not a number");
                0
            }
        }
    }

    /// One pass over the currently rendered rows, then the convergence
    /// decision: target reached, progress stalled, or scroll and go again.
    async fn sweep(&mut self) -> Result<Phase> {
        if self.processed_count() >= self.total_items {
            return Ok(Phase::Finished(HarvestOutcome::Completed));
        }

        let rows = self
            .browser
            .find_elements(&Locator::css(LIST_ROW_CSS))
            .await?;
        tracing::info!(rendered = rows.len(), "Sweeping rendered rows");

        let mut processed_in_sweep = 0usize;
        for row in rows {
            self.process_row(row, &mut processed_in_sweep).await;
        }

        if self.processed_count() >= self.total_items {
            tracing::info!("All inbox items processed");
            return Ok(Phase::Finished(HarvestOutcome::Completed));
        }

        if processed_in_sweep == 0 {
            self.no_progress_sweeps += 1;
            tracing::info!(
                no_progress = self.no_progress_sweeps,
                "Sweep processed no new items"
            );
            if self.no_progress_sweeps >= self.tuning.max_no_progress_sweeps {
                tracing::warn!(
                    "No progress after {} sweeps, stopping short of the target",
                    self.tuning.max_no_progress_sweeps
                );
                return Ok(Phase::Finished(HarvestOutcome::Aborted));
            }
        } else {
            self.no_progress_sweeps = 0;
        }

        let container = self
            .browser
            .find_element(&Locator::id(LIST_CONTAINER_ID))
            .await?;
        self.browser
            .scroll_by(container, self.tuning.scroll_step_px)
            .await?;
        self.settle(self.tuning.after_scroll_ms).await;
        Ok(Phase::Sweeping)
    }

    /// Handle one rendered row. Per-item failures are logged and absorbed;
    /// the row still counts as processed so the run can converge.
    async fn process_row(&mut self, row: Element, processed_in_sweep: &mut usize) {
        let ticket_id = match self.read_ticket_id(row).await {
            Some(id) => id,
            None => {
                // No id means no dedup key, so this row cannot be marked.
                tracing::warn!("Row without a readable ticket id, skipping");
                return;
            }
        };

        let seen_key = format!("{}{}", SEEN_ITEM_PREFIX, ticket_id);
        if self.seen.contains(&seen_key) {
            return;
        }

        if let Err(e) = self.process_ticket(row, &ticket_id).await {
            tracing::error!(%ticket_id, "Ticket processing failed: {}", e);
            // Best effort back to the list view, then carry on.
            if self.browser.back().await.is_ok() {
                self.settle(self.tuning.after_back_ms).await;
            }
        }

        self.seen.insert(seen_key);
        *processed_in_sweep += 1;
    }

    async fn process_ticket(&mut self, row: Element, ticket_id: &str) -> Result<()> {
        let subject = match self.read_subject(row).await {
            Some(subject) => subject,
            None => {
                tracing::warn!(ticket_id, "Subject cell unreadable, skipping");
                return Ok(());
            }
        };

        if !subject.starts_with(CARGO_SUBJECT_PREFIX) {
            tracing::debug!(ticket_id, %subject, "Not a cargo ticket, skipping");
            return Ok(());
        }

        if let Err(e) = self.browser.click(row).await {
            tracing::warn!(ticket_id, "Could not open ticket: {}", e);
            return Ok(());
        }
        self.settle(self.tuning.after_open_item_ms).await;

        let header = Locator::ClassName(DETAIL_HEADER_CLASS.to_string());
        if self
            .browser
            .wait_for(&header, self.tuning.detail_wait())
            .await
            .is_err()
        {
            tracing::warn!(ticket_id, "Detail view did not render, skipping");
            if self.browser.back().await.is_ok() {
                self.settle(self.tuning.after_back_on_timeout_ms).await;
            }
            return Ok(());
        }

        let store_id = self.resolve_store_identity(ticket_id).await;
        if store_id.is_empty() {
            tracing::warn!(ticket_id, "Store identity unresolved, skipping");
            self.browser.back().await?;
            self.settle(self.tuning.after_back_on_timeout_ms).await;
            return Ok(());
        }

        let content = self.browser.page_source().await?;
        match extract_tracking_number(&content) {
            Some(tracking) if !self.seen.contains(&tracking) => {
                let record = ShipmentRecord::new(
                    tracking.clone(),
                    store_id,
                    ticket_id.to_string(),
                    subject,
                );
                if self.store.insert_if_absent(record).await? {
                    self.new_records += 1;
                    tracing::info!(%tracking, ticket_id, "Shipment recorded");
                } else {
                    tracing::info!(%tracking, "Already in the store, skipping");
                }
                self.seen.insert(tracking);
            }
            Some(tracking) => {
                tracing::info!(%tracking, "Already handled in this run, skipping");
            }
            None => {
                tracing::warn!(ticket_id, "No tracking number found in ticket content");
            }
        }

        self.browser.back().await?;
        self.settle(self.tuning.after_back_ms).await;
        Ok(())
    }

    /// The submitter field names the store directly, unless the submitter is
    /// a known proxy; then the real store sits in the owner field. Empty
    /// means unresolved.
    async fn resolve_store_identity(&mut self, ticket_id: &str) -> String {
        let submitter = match self.read_labeled_value(SUBMITTER_LABEL).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(ticket_id, "Submitter field unreadable: {}", e);
                return String::new();
            }
        };

        if self.portal.proxy_submitters.iter().any(|p| p == &submitter) {
            tracing::debug!(ticket_id, %submitter, "Proxy submitter, resolving owner");
            match self.read_labeled_value(OWNER_LABEL).await {
                Ok(owner) => owner,
                Err(e) => {
                    tracing::warn!(ticket_id, "Owner field unreadable: {}", e);
                    String::new()
                }
            }
        } else {
            submitter
        }
    }

    async fn read_labeled_value(&mut self, label: &str) -> Result<String> {
        let element = self
            .browser
            .find_element(&Locator::LabeledValue(label.to_string()))
            .await?;
        Ok(self.browser.read_text(element).await?.trim().to_string())
    }

    async fn read_ticket_id(&mut self, row: Element) -> Option<String> {
        let cell = self
            .browser
            .find_in(row, &Locator::css(ROW_ID_CELL_CSS))
            .await
            .ok()?;
        let text = self.browser.read_text(cell).await.ok()?;
        DIGITS_RE.find(&text).map(|m| m.as_str().to_string())
    }

    /// The subject lives in the cell span's `title` attribute, with the span
    /// text and then the bare cell text as fallbacks.
    async fn read_subject(&mut self, row: Element) -> Option<String> {
        if let Ok(span) = self
            .browser
            .find_in(row, &Locator::css(ROW_SUBJECT_SPAN_CSS))
            .await
        {
            if let Ok(Some(title)) = self.browser.read_attribute(span, "title").await {
                if !title.is_empty() {
                    return Some(title);
                }
            }
            if let Ok(text) = self.browser.read_text(span).await {
                return Some(text.trim().to_string());
            }
        }

        let cell = self
            .browser
            .find_in(row, &Locator::css(ROW_SUBJECT_CELL_CSS))
            .await
            .ok()?;
        self.browser
            .read_text(cell)
            .await
            .ok()
            .map(|t| t.trim().to_string())
    }

    fn processed_count(&self) -> usize {
        self.seen
            .iter()
            .filter(|k| k.starts_with(SEEN_ITEM_PREFIX))
            .count()
    }

    async fn settle(&self, ms: u64) {
        if ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(ms)).await;
        }
    }
}
