//! Fuzzy phone lookup against an injected datastore.
//!
//! Variants are queried one at a time, cheapest plausible match first, and
//! the search stops at the first row. A failing query never aborts the
//! search; it is only reported when nothing else turned up a row.

use crate::domain::phone::{digit_suffix, digits_only};
use crate::domain::variants::phone_variants;
use std::borrow::Cow;
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_PHONE_FIELD: &str = "phone";
pub const SUFFIX_MATCH_DIGITS: usize = 9;

/// Where a lookup searches: a table, its phone column and the columns to
/// project. An empty projection means every column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneQuery {
    pub table: String,
    pub phone_field: String,
    pub select: Vec<String>,
}

impl PhoneQuery {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            phone_field: DEFAULT_PHONE_FIELD.to_string(),
            select: Vec::new(),
        }
    }

    pub fn with_phone_field(mut self, field: impl Into<String>) -> Self {
        self.phone_field = field.into();
        self
    }

    pub fn with_select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select = fields.into_iter().map(Into::into).collect();
        self
    }

    /// First table or column name that is not a plain identifier.
    pub fn invalid_name(&self) -> Option<&str> {
        std::iter::once(&self.table)
            .chain(std::iter::once(&self.phone_field))
            .chain(self.select.iter())
            .map(String::as_str)
            .find(|name| !is_valid_field_name(name))
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`, the only names a datastore may splice into a
/// query.
pub fn is_valid_field_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

/// A row that can report the stored value of a column as text.
pub trait PhoneRecord {
    fn phone(&self, field: &str) -> Option<Cow<'_, str>>;
}

/// Read-only capability the lookup needs from a datastore.
pub trait PhoneDirectory {
    type Row: PhoneRecord;
    type Error: fmt::Display;

    /// At most one row whose phone column equals `value`.
    fn find_exact(&self, query: &PhoneQuery, value: &str)
        -> Result<Option<Self::Row>, Self::Error>;

    /// Rows whose phone column ends with `suffix`, compared
    /// case-insensitively. Implementations may match loosely; callers
    /// re-check every row.
    fn find_suffix(&self, query: &PhoneQuery, suffix: &str) -> Result<Vec<Self::Row>, Self::Error>;
}

#[derive(Debug, Error)]
pub enum LookupError<E> {
    #[error("phone number has no usable variants: {0:?}")]
    InvalidPhone(String),
    #[error("phone lookup failed: {0}")]
    Query(#[source] E),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupStep {
    Exact(String),
    Suffix(String),
}

impl fmt::Display for LookupStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupStep::Exact(value) => write!(f, "exact {value}"),
            LookupStep::Suffix(suffix) => write!(f, "suffix *{suffix}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptStatus {
    Hit,
    Miss,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupAttempt {
    pub step: LookupStep,
    pub status: AttemptStatus,
}

/// Result of a lookup together with every query it issued.
#[derive(Debug)]
pub struct LookupOutcome<R, E> {
    pub row: Option<R>,
    pub attempts: Vec<LookupAttempt>,
    pub last_error: Option<E>,
}

impl<R, E> LookupOutcome<R, E> {
    /// Found row, clean miss, or the last query error when nothing matched.
    pub fn into_result(self) -> Result<Option<R>, LookupError<E>> {
        match (self.row, self.last_error) {
            (Some(row), _) => Ok(Some(row)),
            (None, Some(err)) => Err(LookupError::Query(err)),
            (None, None) => Ok(None),
        }
    }
}

pub fn find_by_phone<D>(
    directory: &D,
    query: &PhoneQuery,
    raw: &str,
) -> Result<Option<D::Row>, LookupError<D::Error>>
where
    D: PhoneDirectory + ?Sized,
{
    find_by_phone_traced(directory, query, raw)?.into_result()
}

/// Like [`find_by_phone`] but keeps the attempt log. Only invalid input is
/// returned as an error here; query failures live in the outcome.
pub fn find_by_phone_traced<D>(
    directory: &D,
    query: &PhoneQuery,
    raw: &str,
) -> Result<LookupOutcome<D::Row, D::Error>, LookupError<D::Error>>
where
    D: PhoneDirectory + ?Sized,
{
    let variants = phone_variants(raw);
    if variants.is_empty() {
        return Err(LookupError::InvalidPhone(raw.to_string()));
    }

    let mut outcome = LookupOutcome {
        row: None,
        attempts: Vec::with_capacity(variants.len() + 1),
        last_error: None,
    };

    for variant in variants.iter() {
        let step = LookupStep::Exact(variant.to_string());
        match directory.find_exact(query, variant) {
            Ok(Some(row)) => {
                debug!(table = %query.table, %step, "phone lookup hit");
                outcome.record(step, AttemptStatus::Hit);
                outcome.row = Some(row);
                return Ok(outcome);
            }
            Ok(None) => outcome.record(step, AttemptStatus::Miss),
            Err(err) => {
                warn!(table = %query.table, %step, error = %err, "phone lookup query failed");
                outcome.fail(step, err);
            }
        }
    }

    let Some(suffix) = digit_suffix(raw, SUFFIX_MATCH_DIGITS) else {
        debug!(table = %query.table, "phone lookup skipped suffix match for short input");
        return Ok(outcome);
    };
    let step = LookupStep::Suffix(suffix.clone());
    match directory.find_suffix(query, &suffix) {
        Ok(rows) => {
            let found = rows.into_iter().find(|row| {
                row.phone(&query.phone_field)
                    .map(|stored| digits_only(&stored).ends_with(&suffix))
                    .unwrap_or(false)
            });
            match found {
                Some(row) => {
                    debug!(table = %query.table, %step, "phone lookup hit");
                    outcome.record(step, AttemptStatus::Hit);
                    outcome.row = Some(row);
                }
                None => outcome.record(step, AttemptStatus::Miss),
            }
        }
        Err(err) => {
            warn!(table = %query.table, %step, error = %err, "phone lookup query failed");
            outcome.fail(step, err);
        }
    }

    Ok(outcome)
}

impl<R, E: fmt::Display> LookupOutcome<R, E> {
    fn record(&mut self, step: LookupStep, status: AttemptStatus) {
        self.attempts.push(LookupAttempt { step, status });
    }

    fn fail(&mut self, step: LookupStep, err: E) {
        self.record(step, AttemptStatus::Failed(err.to_string()));
        self.last_error = Some(err);
    }
}
