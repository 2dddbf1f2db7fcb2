//! Generic phone directory over any table with a phone column.
//!
//! This is the local stand-in for the hosted backend's "select fields from
//! table where phone = value" capability. Table and column names come from
//! callers, so they are checked as plain identifiers and quoted before they
//! reach SQL; values are always bound.

use crate::error::{Result, StoreError};
use crate::Store;
use baraka_core::lookup::{PhoneDirectory, PhoneQuery, PhoneRecord};
use rusqlite::types::ValueRef;
use rusqlite::Connection;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::borrow::Cow;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl From<ValueRef<'_>> for FieldValue {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => FieldValue::Null,
            ValueRef::Integer(value) => FieldValue::Integer(value),
            ValueRef::Real(value) => FieldValue::Real(value),
            ValueRef::Text(value) => FieldValue::Text(String::from_utf8_lossy(value).into_owned()),
            ValueRef::Blob(value) => FieldValue::Blob(value.to_vec()),
        }
    }
}

/// One projected row, columns kept in select order. Serializes as a JSON
/// object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, FieldValue)>,
}

impl Record {
    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Integer phone columns are read back as their decimal digits.
impl PhoneRecord for Record {
    fn phone(&self, field: &str) -> Option<Cow<'_, str>> {
        match self.get(field)? {
            FieldValue::Text(value) => Some(Cow::Borrowed(value.as_str())),
            FieldValue::Integer(value) => Some(Cow::Owned(value.to_string())),
            _ => None,
        }
    }
}

pub struct PhoneTable<'a> {
    conn: &'a Connection,
}

impl<'a> PhoneTable<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn query_records(&self, sql: &str, value: &str, limit: Option<usize>) -> Result<Vec<Record>> {
        let mut stmt = self.conn.prepare(sql)?;
        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        let mut rows = stmt.query([value])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            let mut fields = Vec::with_capacity(columns.len());
            for (index, name) in columns.iter().enumerate() {
                fields.push((name.clone(), FieldValue::from(row.get_ref(index)?)));
            }
            records.push(Record { fields });
            if limit.is_some_and(|limit| records.len() >= limit) {
                break;
            }
        }
        Ok(records)
    }
}

impl PhoneDirectory for PhoneTable<'_> {
    type Row = Record;
    type Error = StoreError;

    fn find_exact(&self, query: &PhoneQuery, value: &str) -> Result<Option<Record>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = ?1 LIMIT 1;",
            projection(query, false)?,
            quote(&query.table),
            quote(&query.phone_field),
        );
        Ok(self.query_records(&sql, value, Some(1))?.into_iter().next())
    }

    fn find_suffix(&self, query: &PhoneQuery, suffix: &str) -> Result<Vec<Record>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE {} LIKE ?1 ESCAPE '\\';",
            projection(query, true)?,
            quote(&query.table),
            quote(&query.phone_field),
        );
        self.query_records(&sql, &suffix_pattern(suffix), None)
    }
}

impl PhoneDirectory for Store {
    type Row = Record;
    type Error = StoreError;

    fn find_exact(&self, query: &PhoneQuery, value: &str) -> Result<Option<Record>> {
        self.phone_table().find_exact(query, value)
    }

    fn find_suffix(&self, query: &PhoneQuery, suffix: &str) -> Result<Vec<Record>> {
        self.phone_table().find_suffix(query, suffix)
    }
}

/// `LIKE` pattern matching values that end with `suffix`. SQLite's `LIKE`
/// ignores ASCII case.
pub(crate) fn suffix_pattern(suffix: &str) -> String {
    let mut pattern = String::with_capacity(suffix.len() + 1);
    pattern.push('%');
    for ch in suffix.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern
}

/// Select list for a query. The suffix query always carries the phone
/// column so the caller can re-check each hit.
fn projection(query: &PhoneQuery, with_phone: bool) -> Result<String> {
    if let Some(name) = query.invalid_name() {
        return Err(StoreError::InvalidName(name.to_string()));
    }
    if query.select.is_empty() {
        return Ok("*".to_string());
    }
    let mut columns: Vec<String> = query.select.iter().map(|name| quote(name)).collect();
    if with_phone && !query.select.iter().any(|name| name == &query.phone_field) {
        columns.push(quote(&query.phone_field));
    }
    Ok(columns.join(", "))
}

fn quote(name: &str) -> String {
    format!("\"{name}\"")
}
