use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("display name is required")]
    EmptyDisplayName,
    #[error("phone number has no digits: {0:?}")]
    InvalidPhone(String),
    #[error("loyalty points cannot be negative: {0}")]
    NegativePoints(i64),
}
