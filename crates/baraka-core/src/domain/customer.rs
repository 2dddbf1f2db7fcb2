use crate::domain::ids::CustomerId;
use crate::domain::phone::{has_usable_digits, normalize_phone};
use crate::error::CoreError;
use crate::lookup::{PhoneRecord, DEFAULT_PHONE_FIELD};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// A loyalty-program member. The phone is kept exactly as entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub display_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub points: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Customer {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.display_name.trim().is_empty() {
            return Err(CoreError::EmptyDisplayName);
        }
        validate_phone(&self.phone)?;
        validate_points(self.points)
    }
}

impl PhoneRecord for Customer {
    fn phone(&self, field: &str) -> Option<Cow<'_, str>> {
        (field == DEFAULT_PHONE_FIELD).then_some(Cow::Borrowed(self.phone.as_str()))
    }
}

pub fn validate_phone(phone: &str) -> Result<(), CoreError> {
    if !has_usable_digits(&normalize_phone(phone)) {
        return Err(CoreError::InvalidPhone(phone.to_string()));
    }
    Ok(())
}

pub fn validate_points(points: i64) -> Result<(), CoreError> {
    if points < 0 {
        return Err(CoreError::NegativePoints(points));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{validate_phone, Customer};
    use crate::domain::ids::CustomerId;
    use crate::error::CoreError;

    fn customer() -> Customer {
        Customer {
            id: CustomerId::new(),
            display_name: "Amina".to_string(),
            phone: "+39 333 467 0058".to_string(),
            email: None,
            points: 0,
            created_at: 1_700_000_000,
            updated_at: 1_700_000_000,
        }
    }

    #[test]
    fn validate_accepts_formatted_phone() {
        assert!(customer().validate().is_ok());
    }

    #[test]
    fn validate_rejects_blank_name() {
        let mut value = customer();
        value.display_name = "  ".to_string();
        assert_eq!(value.validate(), Err(CoreError::EmptyDisplayName));
    }

    #[test]
    fn validate_rejects_negative_points() {
        let mut value = customer();
        value.points = -5;
        assert_eq!(value.validate(), Err(CoreError::NegativePoints(-5)));
    }

    #[test]
    fn validate_phone_requires_digits() {
        assert!(validate_phone("call me").is_err());
        assert!(validate_phone("0612345678").is_ok());
    }
}
