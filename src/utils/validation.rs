use crate::utils::error::{Result, SyncError};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(SyncError::InvalidConfigValue {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(SyncError::InvalidConfigValue {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(SyncError::InvalidConfigValue {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_template(field_name: &str, template: &str, placeholder: &str) -> Result<()> {
    if !template.contains(placeholder) {
        return Err(SyncError::InvalidConfigValue {
            field: field_name.to_string(),
            value: template.to_string(),
            reason: format!("Template must contain the {} placeholder", placeholder),
        });
    }
    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(SyncError::InvalidConfigValue {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_http_and_https_urls() {
        assert!(validate_url("portal_url", "https://example.com/inbox").is_ok());
        assert!(validate_url("portal_url", "http://example.com").is_ok());
    }

    #[test]
    fn rejects_other_schemes_and_garbage() {
        assert!(validate_url("portal_url", "ftp://example.com").is_err());
        assert!(validate_url("portal_url", "not a url").is_err());
        assert!(validate_url("portal_url", "").is_err());
    }

    #[test]
    fn template_must_carry_placeholder() {
        assert!(validate_template("status_url", "https://c.example/q?w={tracking}", "{tracking}").is_ok());
        assert!(validate_template("status_url", "https://c.example/q", "{tracking}").is_err());
    }

    #[test]
    fn positive_number_floor() {
        assert!(validate_positive_number("max_in_flight", 2, 1).is_ok());
        assert!(validate_positive_number("max_in_flight", 0, 1).is_err());
    }
}
