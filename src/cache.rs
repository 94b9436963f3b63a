//! Table Cache - load-once shelving maps with explicit reload
//!
//! Owns the range sources and the tables built from them. Tables are loaded
//! lazily on first use and replaced wholesale by `force_reload`: the new
//! tables are fully built before the swap, and readers keep the `Arc` they
//! started with, so nobody ever sees a half-built table.

use std::sync::{Arc, PoisonError, RwLock};

use crate::data::{RangeSource, RangeTable};
use crate::error::LocateError;

/// Tables from one successful load
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedTables {
    pub primary: RangeTable,
    pub secondary: Option<RangeTable>,
}

pub struct TableCache {
    primary: Box<dyn RangeSource>,
    secondary: Option<Box<dyn RangeSource>>,
    tables: RwLock<Option<Arc<LoadedTables>>>,
}

impl TableCache {
    pub fn new(primary: impl RangeSource + 'static) -> Self {
        Self {
            primary: Box::new(primary),
            secondary: None,
            tables: RwLock::new(None),
        }
    }

    pub fn with_secondary(mut self, secondary: impl RangeSource + 'static) -> Self {
        self.secondary = Some(Box::new(secondary));
        self
    }

    pub fn is_loaded(&self) -> bool {
        self.tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Cached tables, loading them on first use
    pub fn get_or_load(&self) -> Result<Arc<LoadedTables>, LocateError> {
        if let Some(tables) = self
            .tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            return Ok(Arc::clone(tables));
        }

        let mut slot = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        // Another caller may have loaded while we waited for the write lock
        if let Some(tables) = slot.as_ref() {
            return Ok(Arc::clone(tables));
        }

        let tables = Arc::new(self.build()?);
        *slot = Some(Arc::clone(&tables));
        Ok(tables)
    }

    /// Rebuild from the sources and swap the result in
    ///
    /// On failure the previously cached tables stay in place.
    pub fn force_reload(&self) -> Result<Arc<LoadedTables>, LocateError> {
        let tables = Arc::new(self.build()?);
        *self.tables.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&tables));
        tracing::info!("Range tables reloaded");
        Ok(tables)
    }

    fn build(&self) -> Result<LoadedTables, LocateError> {
        let primary = load_from(self.primary.as_ref())?;
        let secondary = self
            .secondary
            .as_deref()
            .map(load_from)
            .transpose()?;

        Ok(LoadedTables { primary, secondary })
    }
}

fn load_from(source: &dyn RangeSource) -> Result<RangeTable, LocateError> {
    tracing::info!("Loading {} ({})...", source.describe(), source.kind());
    source
        .load()
        .map_err(|err| LocateError::source_load(source.describe(), err))
}
