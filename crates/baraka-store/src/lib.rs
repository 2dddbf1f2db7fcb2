pub mod db;
pub mod directory;
pub mod error;
pub mod migrate;
pub mod paths;
pub mod repo;

use crate::error::Result;
use rusqlite::Connection;
use std::path::Path;

pub use directory::{FieldValue, PhoneTable, Record};

pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = db::open(path)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = db::open_in_memory()?;
        Ok(Self { conn })
    }

    pub fn migrate(&self) -> Result<()> {
        migrate::run_migrations(&self.conn)
    }

    pub fn schema_version(&self) -> Result<i64> {
        migrate::schema_version(&self.conn)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn customers(&self) -> repo::CustomersRepo<'_> {
        repo::CustomersRepo::new(&self.conn)
    }

    /// Phone lookups against arbitrary tables in this database.
    pub fn phone_table(&self) -> PhoneTable<'_> {
        PhoneTable::new(&self.conn)
    }
}
