use crate::domain::model::ShipmentStatus;
use regex::Regex;
use std::sync::LazyLock;

/// Phrase the carrier page shows once a package has been handed over.
const DELIVERED_MARKER: &str = "paketiniz teslim edilmiştir";

/// The estimated-delivery value sits in a span right after the labeled
/// "Öngörülen Teslimat Zamanı" span on the waybill page.
static ESTIMATED_DELIVERY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)<span[^>]*id="ctl00_MainContent_Label2"[^>]*>Öngörülen Teslimat Zamanı</span><br\s*/?>\s*<span[^>]*id="ctl00_MainContent_teslimat_zamani"[^>]*>(.*?)</span>"#,
    )
    .unwrap()
});

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Parse a raw carrier page into `(status, estimated delivery)`.
///
/// Missing or mangled fragments are normal: the estimate falls back to
/// `prior_estimated` and the status to `Pending`. This never fails.
pub fn parse_status_page(body: &str, prior_estimated: &str) -> (ShipmentStatus, String) {
    let estimated = match ESTIMATED_DELIVERY_RE.captures(body) {
        Some(caps) => {
            let raw = caps.get(1).map_or("", |m| m.as_str());
            TAG_RE.replace_all(raw.trim(), "").trim().to_string()
        }
        None => prior_estimated.to_string(),
    };

    let status = if body.to_lowercase().contains(DELIVERED_MARKER) {
        ShipmentStatus::Delivered
    } else {
        ShipmentStatus::Pending
    };

    (status, estimated)
}
