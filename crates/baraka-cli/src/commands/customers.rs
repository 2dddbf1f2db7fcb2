use crate::commands::{print_json, Context};
use crate::error::{invalid_input, not_found};
use crate::util::{format_timestamp_datetime, now_utc, parse_customer_id};
use anyhow::{Context as _, Result};
use baraka_core::domain::Customer;
use baraka_core::lookup::LookupError;
use baraka_store::repo::CustomerNew;
use clap::Args;

#[derive(Debug, Args)]
pub struct AddCustomerArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub phone: String,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long, default_value_t = 0)]
    pub points: i64,
}

/// A customer is addressed by id or by any spelling of their phone number.
#[derive(Debug, Args)]
pub struct ShowArgs {
    pub customer: String,
}

#[derive(Debug, Args)]
pub struct SetPhoneArgs {
    pub customer: String,
    pub phone: String,
}

#[derive(Debug, Args)]
pub struct AddPointsArgs {
    pub customer: String,
    /// Points to credit; negative values redeem
    #[arg(allow_hyphen_values = true)]
    pub delta: i64,
}

#[derive(Debug, Args)]
pub struct DeleteArgs {
    pub customer: String,
}

pub fn add_customer(ctx: &Context<'_>, args: AddCustomerArgs) -> Result<()> {
    let customer = ctx.store.customers().create(
        now_utc(),
        CustomerNew {
            display_name: args.name,
            phone: args.phone,
            email: args.email,
            points: args.points,
        },
    )?;

    if ctx.json {
        print_json(&customer)?;
    } else {
        println!("created {} {}", customer.id, customer.display_name);
    }
    Ok(())
}

pub fn list_customers(ctx: &Context<'_>) -> Result<()> {
    let customers = ctx.store.customers().list()?;
    if ctx.json {
        return print_json(&customers);
    }
    for customer in customers {
        println!(
            "{}  {}  {}  {} pts",
            customer.id, customer.display_name, customer.phone, customer.points
        );
    }
    Ok(())
}

pub fn show_customer(ctx: &Context<'_>, args: ShowArgs) -> Result<()> {
    let customer = resolve_customer(ctx, &args.customer)?;
    if ctx.json {
        return print_json(&customer);
    }
    println!("id: {}", customer.id);
    println!("name: {}", customer.display_name);
    println!("phone: {}", customer.phone);
    if let Some(email) = &customer.email {
        println!("email: {}", email);
    }
    println!("points: {}", customer.points);
    println!("created: {}", format_timestamp_datetime(customer.created_at));
    println!("updated: {}", format_timestamp_datetime(customer.updated_at));
    Ok(())
}

pub fn set_phone(ctx: &Context<'_>, args: SetPhoneArgs) -> Result<()> {
    let customer = resolve_customer(ctx, &args.customer)?;
    let updated = ctx
        .store
        .customers()
        .update_phone(now_utc(), customer.id, &args.phone)?;
    if ctx.json {
        print_json(&updated)?;
    } else {
        println!("updated {} phone {}", updated.id, updated.phone);
    }
    Ok(())
}

pub fn add_points(ctx: &Context<'_>, args: AddPointsArgs) -> Result<()> {
    let customer = resolve_customer(ctx, &args.customer)?;
    let updated = ctx
        .store
        .customers()
        .add_points(now_utc(), customer.id, args.delta)
        .with_context(|| format!("add {} points to {}", args.delta, customer.id))?;
    if ctx.json {
        print_json(&updated)?;
    } else {
        println!("{} now has {} pts", updated.display_name, updated.points);
    }
    Ok(())
}

pub fn delete_customer(ctx: &Context<'_>, args: DeleteArgs) -> Result<()> {
    let customer = resolve_customer(ctx, &args.customer)?;
    ctx.store.customers().delete(customer.id)?;
    if !ctx.json {
        println!("deleted {}", customer.id);
    }
    Ok(())
}

fn resolve_customer(ctx: &Context<'_>, raw: &str) -> Result<Customer> {
    if let Ok(id) = parse_customer_id(raw) {
        return ctx
            .store
            .customers()
            .get(id)?
            .ok_or_else(|| not_found(format!("customer {}", id)));
    }

    match ctx.store.customers().find_by_phone(raw) {
        Ok(Some(customer)) => Ok(customer),
        Ok(None) => Err(not_found(format!("no customer with phone {:?}", raw))),
        Err(LookupError::InvalidPhone(_)) => Err(invalid_input(format!(
            "expected a customer id or phone number, got {:?}",
            raw
        ))),
        Err(LookupError::Query(err)) => Err(err).context("customer phone lookup failed"),
    }
}
