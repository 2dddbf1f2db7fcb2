pub mod domain;
pub mod error;
pub mod lookup;
pub mod time;

pub use domain::*;
pub use error::CoreError;
pub use lookup::{
    find_by_phone, find_by_phone_traced, is_valid_field_name, AttemptStatus, LookupAttempt,
    LookupError, LookupOutcome, LookupStep, PhoneDirectory, PhoneQuery, PhoneRecord,
    DEFAULT_PHONE_FIELD, SUFFIX_MATCH_DIGITS,
};
