use anyhow::{anyhow, Result};
use baraka_core::domain::CustomerId;
use std::str::FromStr;

pub use baraka_core::time::{format_timestamp_datetime, now_utc};

pub fn parse_customer_id(raw: &str) -> Result<CustomerId> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("customer id cannot be empty"));
    }
    CustomerId::from_str(trimmed).map_err(|_| anyhow!("invalid customer id"))
}

/// `id,phone , points` → `["id", "phone", "points"]`.
pub fn parse_field_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{parse_customer_id, parse_field_list};

    #[test]
    fn parse_field_list_trims_and_skips_blanks() {
        assert_eq!(parse_field_list(" id, phone ,,points"), vec!["id", "phone", "points"]);
        assert!(parse_field_list("").is_empty());
    }

    #[test]
    fn parse_customer_id_rejects_blank_and_garbage() {
        assert!(parse_customer_id("  ").is_err());
        assert!(parse_customer_id("+393334670058").is_err());
    }
}
