use crate::commands::{print_json, Context};
use crate::error::{invalid_input, not_found};
use crate::util::parse_field_list;
use anyhow::{Context as _, Result};
use baraka_core::domain::{normalize_phone, phone_variants};
use baraka_core::lookup::{find_by_phone_traced, AttemptStatus, LookupError};
use baraka_store::{FieldValue, Record};
use clap::{ArgAction, Args};
use serde::Serialize;

#[derive(Debug, Args)]
pub struct NormalizeArgs {
    pub phone: String,
}

#[derive(Debug, Args)]
pub struct VariantsArgs {
    pub phone: String,
    /// Show which rule produced each variant
    #[arg(long, action = ArgAction::SetTrue)]
    pub explain: bool,
}

#[derive(Debug, Args)]
pub struct LookupArgs {
    pub phone: String,
    #[arg(long)]
    pub table: Option<String>,
    #[arg(long)]
    pub phone_field: Option<String>,
    /// Comma-separated columns to return
    #[arg(long, value_name = "FIELDS")]
    pub select: Option<String>,
    /// Print every query attempted
    #[arg(long, action = ArgAction::SetTrue)]
    pub explain: bool,
}

#[derive(Debug, Serialize)]
struct NormalizedDto<'a> {
    input: &'a str,
    normalized: String,
}

#[derive(Debug, Serialize)]
struct AttemptDto {
    step: String,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct LookupDto {
    record: Record,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attempts: Vec<AttemptDto>,
}

pub fn normalize(args: NormalizeArgs, json: bool) -> Result<()> {
    let normalized = normalize_phone(&args.phone);
    if json {
        print_json(&NormalizedDto {
            input: &args.phone,
            normalized,
        })?;
    } else {
        println!("{}", normalized);
    }
    Ok(())
}

pub fn variants(args: VariantsArgs, json: bool) -> Result<()> {
    let set = phone_variants(&args.phone);
    if set.is_empty() {
        return Err(invalid_input(format!(
            "phone number has no usable digits: {:?}",
            args.phone
        )));
    }

    match (json, args.explain) {
        (true, true) => print_json(&set.explain())?,
        (true, false) => print_json(&set.into_vec())?,
        (false, true) => {
            for variant in set.explain() {
                println!("{}\t{}", variant.value, variant.rule.as_str());
            }
        }
        (false, false) => {
            for value in set.iter() {
                println!("{}", value);
            }
        }
    }
    Ok(())
}

pub fn lookup(ctx: &Context<'_>, args: LookupArgs) -> Result<()> {
    let mut query = ctx.config.lookup.to_query();
    if let Some(table) = args.table {
        query.table = table;
    }
    if let Some(field) = args.phone_field {
        query.phone_field = field;
    }
    if let Some(select) = args.select.as_deref() {
        query.select = parse_field_list(select);
    }
    if let Some(name) = query.invalid_name() {
        return Err(invalid_input(format!("invalid table or column name: {name:?}")));
    }

    let outcome = match find_by_phone_traced(ctx.store, &query, &args.phone) {
        Ok(outcome) => outcome,
        Err(LookupError::InvalidPhone(raw)) => {
            return Err(invalid_input(format!(
                "phone number has no usable digits: {raw:?}"
            )))
        }
        Err(LookupError::Query(err)) => return Err(err).context("phone lookup failed"),
    };

    let attempts: Vec<AttemptDto> = if args.explain {
        outcome
            .attempts
            .iter()
            .map(|attempt| {
                let (status, error) = match &attempt.status {
                    AttemptStatus::Hit => ("hit", None),
                    AttemptStatus::Miss => ("miss", None),
                    AttemptStatus::Failed(message) => ("failed", Some(message.clone())),
                };
                AttemptDto {
                    step: attempt.step.to_string(),
                    status,
                    error,
                }
            })
            .collect()
    } else {
        Vec::new()
    };

    if !ctx.json {
        for attempt in &attempts {
            match &attempt.error {
                Some(error) => eprintln!("{}: {} ({})", attempt.step, attempt.status, error),
                None => eprintln!("{}: {}", attempt.step, attempt.status),
            }
        }
    }

    let record = match outcome.into_result() {
        Ok(Some(record)) => record,
        Ok(None) => {
            return Err(not_found(format!(
                "no {} row matches phone {:?}",
                query.table, args.phone
            )))
        }
        Err(LookupError::Query(err)) => return Err(err).context("phone lookup failed"),
        Err(LookupError::InvalidPhone(raw)) => {
            return Err(invalid_input(format!(
                "phone number has no usable digits: {raw:?}"
            )))
        }
    };

    if ctx.json {
        print_json(&LookupDto { record, attempts })?;
    } else {
        for (column, value) in record.iter() {
            println!("{}: {}", column, format_field(value));
        }
    }
    Ok(())
}

fn format_field(value: &FieldValue) -> String {
    match value {
        FieldValue::Null => "-".to_string(),
        FieldValue::Integer(value) => value.to_string(),
        FieldValue::Real(value) => value.to_string(),
        FieldValue::Text(value) => value.clone(),
        FieldValue::Blob(value) => format!("<{} bytes>", value.len()),
    }
}
