//! Generic table repository.
//!
//! [`TableRepository<R>`] is the one implementation of the CRUD contract. It is
//! bound to `R::TABLE`, lowers typed filters into backend predicates, and
//! applies the not-found rule: single-row calls turn the backend's "zero rows"
//! signal into `None`, every other failure becomes
//! [`DatabaseError::Backend`] tagged with the operation and table.

use std::marker::PhantomData;
use std::sync::Arc;

use crate::backend::{BackendError, QueryBackend};
use crate::error::DatabaseError;
use crate::query::{Filter, Predicate, Query, Row, Select};
use crate::record::{Record, to_row};

pub struct TableRepository<R> {
    backend: Arc<dyn QueryBackend>,
    _record: PhantomData<fn() -> R>,
}

impl<R> Clone for TableRepository<R> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            _record: PhantomData,
        }
    }
}

fn by_id(id: &str) -> Vec<Predicate> {
    vec![Predicate::eq("id", id)]
}

fn decode_all<R: Record>(rows: &[Row]) -> Result<Vec<R>, DatabaseError> {
    rows.iter().map(R::from_row).collect()
}

/// `Ok(None)` for the zero-rows signal, the row otherwise.
fn not_found_as_none(
    result: Result<Row, BackendError>,
    operation: &'static str,
    table: &'static str,
) -> Result<Option<Row>, DatabaseError> {
    match result {
        Ok(row) => Ok(Some(row)),
        Err(BackendError::NoRows) => Ok(None),
        Err(e) => Err(DatabaseError::backend(operation, table)(e)),
    }
}

impl<R: Record> TableRepository<R> {
    #[must_use]
    pub fn new(backend: Arc<dyn QueryBackend>) -> Self {
        Self {
            backend,
            _record: PhantomData,
        }
    }

    #[must_use]
    pub const fn table_name(&self) -> &'static str {
        R::TABLE
    }

    #[must_use]
    pub const fn backend(&self) -> &Arc<dyn QueryBackend> {
        &self.backend
    }

    /// Insert one row and return it as stored.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Backend` on constraint violations (missing
    /// foreign key, duplicate unique value) and transport failures.
    pub async fn create(&self, data: &R::Create) -> Result<R, DatabaseError> {
        let row = to_row(R::TABLE, data)?;
        tracing::debug!(table = R::TABLE, "create");
        let mut rows = self
            .backend
            .insert(R::TABLE, vec![row])
            .await
            .map_err(DatabaseError::backend("create", R::TABLE))?;
        let row = rows.pop().ok_or_else(|| {
            DatabaseError::InvalidState(format!("insert into '{}' returned no row", R::TABLE))
        })?;
        R::from_row(&row)
    }

    /// Insert all rows in one round trip. Either all are written or none is.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Backend` if the bulk insert fails.
    pub async fn create_many(&self, data: &[R::Create]) -> Result<Vec<R>, DatabaseError> {
        if data.is_empty() {
            return Ok(Vec::new());
        }
        let rows = data
            .iter()
            .map(|d| to_row(R::TABLE, d))
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(table = R::TABLE, count = rows.len(), "create_many");
        let rows = self
            .backend
            .insert(R::TABLE, rows)
            .await
            .map_err(DatabaseError::backend("create_many", R::TABLE))?;
        decode_all(&rows)
    }

    /// `None` exactly when no row has this id.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Backend` for any backend failure other than
    /// "zero rows", and `DatabaseError::Decode` for a malformed row.
    pub async fn find_by_id(&self, id: &str) -> Result<Option<R>, DatabaseError> {
        let query = Query::new(R::TABLE).with_predicates(by_id(id));
        let result = self.backend.select_single(&query).await;
        not_found_as_none(result, "find_by_id", R::TABLE)?
            .map(|row| R::from_row(&row))
            .transpose()
    }

    pub async fn find_all(&self) -> Result<Vec<R>, DatabaseError> {
        self.select(Select::new()).await
    }

    /// Rows matching every predicate of `filter`. An empty filter matches all rows.
    pub async fn find_where(&self, filter: &Filter<R::Column>) -> Result<Vec<R>, DatabaseError> {
        self.select(Select::from(filter.clone())).await
    }

    /// First row matching `filter`, or `None`.
    pub async fn find_one_where(
        &self,
        filter: &Filter<R::Column>,
    ) -> Result<Option<R>, DatabaseError> {
        let mut rows = self
            .select(Select::from(filter.clone()).limit(1))
            .await?;
        Ok(rows.pop())
    }

    /// Apply `data` to the row with this id. `None` if no row has this id.
    ///
    /// An update with no fields set performs no write and returns the current row.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Backend` for any backend failure other than
    /// "zero rows".
    pub async fn update_by_id(&self, id: &str, data: &R::Update) -> Result<Option<R>, DatabaseError> {
        let values = to_row(R::TABLE, data)?;
        if values.is_empty() {
            return self.find_by_id(id).await;
        }
        tracing::debug!(table = R::TABLE, id, "update_by_id");
        let result = self.backend.update_single(R::TABLE, &by_id(id), values).await;
        not_found_as_none(result, "update_by_id", R::TABLE)?
            .map(|row| R::from_row(&row))
            .transpose()
    }

    /// Apply `data` to every row matching `filter`; returns the updated rows.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Backend` if `filter` is empty (unfiltered
    /// writes are refused) or the backend call fails.
    pub async fn update_where(
        &self,
        filter: &Filter<R::Column>,
        data: &R::Update,
    ) -> Result<Vec<R>, DatabaseError> {
        Self::require_filter(filter, "update_where")?;
        let values = to_row(R::TABLE, data)?;
        if values.is_empty() {
            return self.find_where(filter).await;
        }
        tracing::debug!(table = R::TABLE, ?filter, "update_where");
        let rows = self
            .backend
            .update(R::TABLE, filter.predicates(), values)
            .await
            .map_err(DatabaseError::backend("update_where", R::TABLE))?;
        decode_all(&rows)
    }

    /// Delete the row with this id. Always `true` on success, whether or not
    /// a row existed.
    pub async fn delete_by_id(&self, id: &str) -> Result<bool, DatabaseError> {
        tracing::debug!(table = R::TABLE, id, "delete_by_id");
        self.backend
            .delete(R::TABLE, &by_id(id))
            .await
            .map_err(DatabaseError::backend("delete_by_id", R::TABLE))?;
        Ok(true)
    }

    /// Delete every row matching `filter`; returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Backend` if `filter` is empty (unfiltered
    /// writes are refused) or the backend call fails.
    pub async fn delete_where(&self, filter: &Filter<R::Column>) -> Result<u64, DatabaseError> {
        Self::require_filter(filter, "delete_where")?;
        tracing::debug!(table = R::TABLE, ?filter, "delete_where");
        let rows = self
            .backend
            .delete(R::TABLE, filter.predicates())
            .await
            .map_err(DatabaseError::backend("delete_where", R::TABLE))?;
        Ok(rows.len() as u64)
    }

    pub async fn count(&self, filter: &Filter<R::Column>) -> Result<u64, DatabaseError> {
        self.count_select(Select::from(filter.clone())).await
    }

    pub async fn exists(&self, filter: &Filter<R::Column>) -> Result<bool, DatabaseError> {
        Ok(self.count(filter).await? > 0)
    }

    /// Run a select and decode every row.
    pub async fn select(&self, select: Select<R::Column>) -> Result<Vec<R>, DatabaseError> {
        decode_all(&self.select_rows(select).await?)
    }

    /// Run a select and return the raw rows, embeds included.
    pub async fn select_rows(&self, select: Select<R::Column>) -> Result<Vec<Row>, DatabaseError> {
        self.backend
            .select(&select.into_query())
            .await
            .map_err(DatabaseError::backend("select", R::TABLE))
    }

    /// Run a single-row select. `None` when nothing matches.
    pub async fn select_one_row(
        &self,
        select: Select<R::Column>,
    ) -> Result<Option<Row>, DatabaseError> {
        let result = self.backend.select_single(&select.into_query()).await;
        not_found_as_none(result, "select_one", R::TABLE)
    }

    /// Exact count of rows a select would return, inner embeds applied.
    pub async fn count_select(&self, select: Select<R::Column>) -> Result<u64, DatabaseError> {
        self.backend
            .count(&select.into_query())
            .await
            .map_err(DatabaseError::backend("count", R::TABLE))
    }

    fn require_filter(filter: &Filter<R::Column>, operation: &'static str) -> Result<(), DatabaseError> {
        if filter.is_empty() {
            return Err(DatabaseError::backend(operation, R::TABLE)(
                BackendError::InvalidQuery("refusing to write without a filter".into()),
            ));
        }
        Ok(())
    }
}
