//! Database initialization and table definitions
//!
//! The store keeps a single logical relation `urls(id, long_url, short_code)`
//! in an embedded redb file. redb has no secondary indexes, so the relation
//! is spread over three tables that are always written in the same
//! transaction.

use redb::{Database, TableDefinition};
use std::sync::Arc;

use crate::config::Config;
use crate::store::CodeStore;

/// Primary rows, ordered by id
///
/// Key: mapping id
/// Value: JSON-serialized `UrlMapping`
pub const TABLE_MAPPINGS: TableDefinition<u64, &str> = TableDefinition::new("mappings_v1");

/// Unique index on the short code
///
/// Key: short code (e.g. "abc123")
/// Value: id of the owning row in `TABLE_MAPPINGS`
pub const TABLE_CODES: TableDefinition<&str, u64> = TableDefinition::new("codes_v1");

/// Bookkeeping counters
pub const TABLE_META: TableDefinition<&str, u64> = TableDefinition::new("meta_v1");

/// Key in `TABLE_META` holding the next id to hand out. Ids start at 1 and
/// are never reused, even after deletes.
pub const NEXT_ID_KEY: &str = "next_id";

/// Application state shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<CodeStore>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: CodeStore, config: Config) -> Self {
        Self {
            store: Arc::new(store),
            config: Arc::new(config),
        }
    }
}

/// Creates or opens the database file at `db_path` and makes sure every
/// table exists.
///
/// ```no_run
/// # use tinylink::database::init_db;
/// let db = init_db("urls.db").expect("Failed to initialize database");
/// ```
pub fn init_db(db_path: &str) -> Result<Database, redb::Error> {
    let db = Database::create(db_path)?;
    create_tables(&db)?;
    Ok(db)
}

/// Opens (creating if missing) all tables in one committed transaction.
/// Safe to call on an already initialized database.
pub fn create_tables(db: &Database) -> Result<(), redb::Error> {
    let write_txn = db.begin_write()?;
    {
        write_txn.open_table(TABLE_MAPPINGS)?;
        write_txn.open_table(TABLE_CODES)?;
        write_txn.open_table(TABLE_META)?;
    }
    write_txn.commit()?;

    Ok(())
}
