//! The code store: short code assignment, persistence and lookup
//!
//! All uniqueness decisions happen here. `shorten` performs its
//! check-then-insert inside a single redb write transaction; redb only admits
//! one writer at a time, so two concurrent calls can never both claim the same
//! code. Reads run on MVCC snapshots and never observe a half-written row.

use chrono::Utc;
use redb::{Database, ReadableDatabase, ReadableTable, Table};

use crate::codegen::{CodeGenerator, RandomCodes, MAX_ATTEMPTS};
use crate::database::{
    create_tables, init_db, NEXT_ID_KEY, TABLE_CODES, TABLE_MAPPINGS, TABLE_META,
};
use crate::error::StoreError;
use crate::model::UrlMapping;

/// Owns the short code -> long URL mappings
///
/// Construct it once at startup and share it (the application keeps it in an
/// `Arc` inside `AppState`). All methods take `&self` and are safe to call
/// from many threads at once.
///
/// # Example
///
/// ```no_run
/// # use tinylink::store::CodeStore;
/// let store = CodeStore::open("urls.db").unwrap();
/// let code = store.shorten("https://example.com", None).unwrap();
/// assert_eq!(store.resolve(&code).unwrap().as_deref(), Some("https://example.com"));
/// ```
pub struct CodeStore {
    /// Embedded database holding the mapping, code index and id counter tables
    db: Database,

    /// Source of random candidates when no custom code is given
    generator: Box<dyn CodeGenerator>,
}

impl CodeStore {
    /// Wraps an opened database, creating missing tables.
    pub fn new(db: Database) -> Result<Self, StoreError> {
        create_tables(&db)?;
        Ok(Self {
            db,
            generator: Box::new(RandomCodes::default()),
        })
    }

    /// Opens (or creates) the database file at `path`.
    pub fn open(path: &str) -> Result<Self, StoreError> {
        let db = init_db(path)?;
        Ok(Self {
            db,
            generator: Box::new(RandomCodes::default()),
        })
    }

    /// Replaces the random code generator.
    pub fn with_generator(mut self, generator: impl CodeGenerator) -> Self {
        self.generator = Box::new(generator);
        self
    }

    /// Stores `long_url` under a new short code and returns the code.
    ///
    /// `long_url` is saved exactly as given; it is only checked for being
    /// non-blank.
    ///
    /// A non-empty `custom_code` is used verbatim or rejected with
    /// [`StoreError::DuplicateCode`]; it is never replaced by another code.
    /// Without one, random candidates are drawn until a free code is found,
    /// at most [`MAX_ATTEMPTS`] times.
    ///
    /// The code is returned only after the transaction has committed.
    pub fn shorten(&self, long_url: &str, custom_code: Option<&str>) -> Result<String, StoreError> {
        if long_url.trim().is_empty() {
            return Err(StoreError::EmptyInput);
        }
        let custom_code = custom_code.filter(|code| !code.is_empty());

        // Any early return drops `write_txn`, which aborts it.
        let write_txn = self.db.begin_write()?;
        let mapping = {
            let mut codes = write_txn.open_table(TABLE_CODES)?;

            let short_code = match custom_code {
                Some(code) => {
                    if codes.get(code)?.is_some() {
                        return Err(StoreError::DuplicateCode(code.to_string()));
                    }
                    code.to_string()
                }
                None => self.free_random_code(&codes)?,
            };

            let mut meta = write_txn.open_table(TABLE_META)?;
            let id = meta.get(NEXT_ID_KEY)?.map(|guard| guard.value()).unwrap_or(1);
            meta.insert(NEXT_ID_KEY, id + 1)?;

            let mapping = UrlMapping {
                id,
                long_url: long_url.to_string(),
                short_code,
                created_at: Utc::now(),
            };
            let record_json = serde_json::to_string(&mapping)?;

            let mut mappings = write_txn.open_table(TABLE_MAPPINGS)?;
            mappings.insert(id, record_json.as_str())?;
            codes.insert(mapping.short_code.as_str(), id)?;

            mapping
        };
        write_txn.commit()?;

        tracing::debug!(id = mapping.id, short_code = %mapping.short_code, "created mapping");
        Ok(mapping.short_code)
    }

    fn free_random_code(&self, codes: &Table<'_, &'static str, u64>) -> Result<String, StoreError> {
        for attempt in 1..=MAX_ATTEMPTS {
            let candidate = self.generator.generate();
            if codes.get(candidate.as_str())?.is_none() {
                return Ok(candidate);
            }
            tracing::warn!(attempt, candidate = %candidate, "generated short code collided, retrying");
        }

        Err(StoreError::ExhaustedCodespace {
            attempts: MAX_ATTEMPTS,
        })
    }

    /// Looks up the long URL for an exact short code. `Ok(None)` means no
    /// such mapping exists.
    pub fn resolve(&self, short_code: &str) -> Result<Option<String>, StoreError> {
        Ok(self.get(short_code)?.map(|mapping| mapping.long_url))
    }

    /// Fetches the whole mapping for a short code.
    pub fn get(&self, short_code: &str) -> Result<Option<UrlMapping>, StoreError> {
        let read_txn = self.db.begin_read()?;
        let codes = read_txn.open_table(TABLE_CODES)?;

        let Some(id) = codes.get(short_code)?.map(|guard| guard.value()) else {
            return Ok(None);
        };

        let mappings = read_txn.open_table(TABLE_MAPPINGS)?;
        match mappings.get(id)? {
            Some(record) => Ok(Some(serde_json::from_str(record.value())?)),
            None => Ok(None),
        }
    }

    /// Removes the mapping for `short_code`. Deleting a code that does not
    /// exist is not an error.
    pub fn delete(&self, short_code: &str) -> Result<(), StoreError> {
        let write_txn = self.db.begin_write()?;
        let removed = {
            let mut codes = write_txn.open_table(TABLE_CODES)?;
            let removed = codes.remove(short_code)?.map(|guard| guard.value());

            if let Some(id) = removed {
                let mut mappings = write_txn.open_table(TABLE_MAPPINGS)?;
                mappings.remove(id)?;
            }
            removed
        };
        write_txn.commit()?;

        if let Some(id) = removed {
            tracing::debug!(id, short_code, "deleted mapping");
        }
        Ok(())
    }

    /// Returns every mapping, most recently created first, as of one
    /// consistent snapshot.
    pub fn list(&self) -> Result<Vec<UrlMapping>, StoreError> {
        let read_txn = self.db.begin_read()?;
        let mappings = read_txn.open_table(TABLE_MAPPINGS)?;

        mappings
            .iter()?
            .rev()
            .map(|entry| -> Result<UrlMapping, StoreError> {
                let (_, record) = entry?;
                Ok(serde_json::from_str(record.value())?)
            })
            .collect()
    }
}
