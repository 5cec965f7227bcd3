use regex::Regex;
use std::sync::LazyLock;

/// One tracking-number format. Rules are tried in declaration order and the
/// first one with any match wins; priority is load-bearing, so these stay
/// separate patterns rather than one combined alternation.
struct ExtractionRule {
    carrier: &'static str,
    pattern: Regex,
}

static RULES: LazyLock<Vec<ExtractionRule>> = LazyLock::new(|| {
    vec![
        ExtractionRule {
            carrier: "ups",
            pattern: Regex::new(r"1[Zz][0-9A-Za-z]{16}").unwrap(),
        },
        ExtractionRule {
            carrier: "aras",
            pattern: Regex::new(r"[A-Z]{2}\d{9}").unwrap(),
        },
        ExtractionRule {
            carrier: "yurtici",
            pattern: Regex::new(r"\d{13}").unwrap(),
        },
        ExtractionRule {
            carrier: "mng",
            pattern: Regex::new(r"MNG\d{10}").unwrap(),
        },
    ]
});

/// Pull the best tracking-number candidate out of a free-form content blob.
///
/// Within the winning rule the *last* occurrence in document order is taken:
/// ticket threads quote older messages above newer ones, so later matches are
/// the more recent mention. `None` means "no tracking number here" and the
/// caller should skip the item.
pub fn extract_tracking_number(content: &str) -> Option<String> {
    for rule in RULES.iter() {
        if let Some(m) = rule.pattern.find_iter(content).last() {
            tracing::debug!(carrier = rule.carrier, "Tracking number matched");
            return Some(m.as_str().to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_ups_format() {
        let content = "Gönderi no: 1Z999AA10123456784 olarak kaydedildi";
        assert_eq!(
            extract_tracking_number(content),
            Some("1Z999AA10123456784".to_string())
        );
    }

    #[test]
    fn matches_aras_format_alone() {
        let content = "Kargo AB123456789 ile yola çıktı";
        assert_eq!(
            extract_tracking_number(content),
            Some("AB123456789".to_string())
        );
    }

    #[test]
    fn matches_yurtici_format() {
        assert_eq!(
            extract_tracking_number("takip: 1234567890123"),
            Some("1234567890123".to_string())
        );
    }

    #[test]
    fn aras_rule_shadows_mng_shaped_numbers() {
        // An MNG number always embeds a two-letter-plus-nine-digit substring,
        // and the earlier rule wins even when a later rule matches more.
        assert_eq!(
            extract_tracking_number("ref MNG0123456789 teslim edilecek"),
            Some("NG012345678".to_string())
        );
    }

    #[test]
    fn last_occurrence_of_winning_rule_is_taken() {
        let content = "eski: 1Z111AA10123456784 ... güncel: 1Z999BB20123456784";
        assert_eq!(
            extract_tracking_number(content),
            Some("1Z999BB20123456784".to_string())
        );
    }

    #[test]
    fn ups_outranks_aras_even_when_aras_appears_later() {
        let content = "AB123456789 ve ayrıca 1Z999AA10123456784 burada";
        assert_eq!(
            extract_tracking_number(content),
            Some("1Z999AA10123456784".to_string())
        );
    }

    #[test]
    fn lowercase_z_marker_is_accepted() {
        assert_eq!(
            extract_tracking_number("1z999AA10123456784"),
            Some("1z999AA10123456784".to_string())
        );
    }

    #[test]
    fn no_match_yields_none() {
        assert_eq!(extract_tracking_number("sadece metin, numara yok"), None);
        assert_eq!(extract_tracking_number(""), None);
    }
}
