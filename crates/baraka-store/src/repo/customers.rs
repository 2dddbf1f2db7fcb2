use crate::error::{Result, StoreError};
use baraka_core::domain::{validate_phone, validate_points, Customer, CustomerId};
use baraka_core::lookup::{find_by_phone, LookupError, PhoneDirectory, PhoneQuery};
use rusqlite::{params, Connection};
use std::str::FromStr;

const CUSTOMERS_TABLE: &str = "customers";
const CUSTOMER_COLUMNS: &str =
    "id, display_name, phone, email, points, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct CustomerNew {
    pub display_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub points: i64,
}

pub struct CustomersRepo<'a> {
    conn: &'a Connection,
}

impl<'a> CustomersRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn create(&self, now_utc: i64, input: CustomerNew) -> Result<Customer> {
        let customer = Customer {
            id: CustomerId::new(),
            display_name: input.display_name.trim().to_string(),
            phone: input.phone,
            email: input
                .email
                .map(|email| email.trim().to_string())
                .filter(|email| !email.is_empty()),
            points: input.points,
            created_at: now_utc,
            updated_at: now_utc,
        };
        customer.validate()?;

        self.conn.execute(
            "INSERT INTO customers (id, display_name, phone, email, points, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                customer.id.to_string(),
                customer.display_name,
                customer.phone,
                customer.email,
                customer.points,
                customer.created_at,
                customer.updated_at,
            ],
        )?;
        Ok(customer)
    }

    pub fn get(&self, id: CustomerId) -> Result<Option<Customer>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1;"
        ))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            Ok(Some(customer_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    pub fn list(&self) -> Result<Vec<Customer>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers
             ORDER BY display_name COLLATE NOCASE ASC, created_at ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut customers = Vec::new();
        while let Some(row) = rows.next()? {
            customers.push(customer_from_row(row)?);
        }
        Ok(customers)
    }

    /// Fuzzy phone match over the registry, tolerating historical formats.
    pub fn find_by_phone(
        &self,
        raw: &str,
    ) -> std::result::Result<Option<Customer>, LookupError<StoreError>> {
        find_by_phone(self, &PhoneQuery::new(CUSTOMERS_TABLE), raw)
    }

    pub fn update_phone(&self, now_utc: i64, id: CustomerId, phone: &str) -> Result<Customer> {
        let mut customer = self.require(id)?;
        validate_phone(phone)?;
        customer.phone = phone.to_string();
        customer.updated_at = now_utc;
        self.conn.execute(
            "UPDATE customers SET phone = ?2, updated_at = ?3 WHERE id = ?1;",
            params![customer.id.to_string(), customer.phone, customer.updated_at],
        )?;
        Ok(customer)
    }

    /// Credits (or, with a negative delta, redeems) loyalty points. The
    /// balance never drops below zero.
    pub fn add_points(&self, now_utc: i64, id: CustomerId, delta: i64) -> Result<Customer> {
        let mut customer = self.require(id)?;
        let points = customer
            .points
            .checked_add(delta)
            .ok_or(StoreError::PointsOverflow)?;
        validate_points(points)?;
        customer.points = points;
        customer.updated_at = now_utc;
        self.conn.execute(
            "UPDATE customers SET points = ?2, updated_at = ?3 WHERE id = ?1;",
            params![customer.id.to_string(), customer.points, customer.updated_at],
        )?;
        Ok(customer)
    }

    pub fn delete(&self, id: CustomerId) -> Result<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM customers WHERE id = ?1;", [id.to_string()])?;
        if deleted == 0 {
            return Err(StoreError::NotFound(format!("customer {}", id)));
        }
        Ok(())
    }

    fn require(&self, id: CustomerId) -> Result<Customer> {
        self.get(id)?
            .ok_or_else(|| StoreError::NotFound(format!("customer {}", id)))
    }
}

/// Rows are always whole customers read from `customers`; the query's
/// table and projection are not consulted.
impl PhoneDirectory for CustomersRepo<'_> {
    type Row = Customer;
    type Error = StoreError;

    fn find_exact(&self, _query: &PhoneQuery, value: &str) -> Result<Option<Customer>> {
        let mut stmt = self.conn.prepare_cached(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE phone = ?1 LIMIT 1;"
        ))?;
        let mut rows = stmt.query([value])?;
        match rows.next()? {
            Some(row) => Ok(Some(customer_from_row(row)?)),
            None => Ok(None),
        }
    }

    fn find_suffix(&self, _query: &PhoneQuery, suffix: &str) -> Result<Vec<Customer>> {
        let mut stmt = self.conn.prepare_cached(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE phone LIKE ?1 ESCAPE '\\';"
        ))?;
        let mut rows = stmt.query([crate::directory::suffix_pattern(suffix)])?;
        let mut customers = Vec::new();
        while let Some(row) = rows.next()? {
            customers.push(customer_from_row(row)?);
        }
        Ok(customers)
    }
}

fn customer_from_row(row: &rusqlite::Row<'_>) -> Result<Customer> {
    let id_str: String = row.get(0)?;
    let id = CustomerId::from_str(&id_str).map_err(|_| StoreError::InvalidId(id_str.clone()))?;
    Ok(Customer {
        id,
        display_name: row.get(1)?,
        phone: row.get(2)?,
        email: row.get(3)?,
        points: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}
