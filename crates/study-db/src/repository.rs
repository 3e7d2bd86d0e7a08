//! The CRUD contract shared by every repository.

use async_trait::async_trait;

use crate::error::DatabaseError;
use crate::query::Filter;
use crate::record::Record;
use crate::table::TableRepository;

type Create<T> = <<T as Repository>::Record as Record>::Create;
type Update<T> = <<T as Repository>::Record as Record>::Update;
type ColumnOf<T> = <<T as Repository>::Record as Record>::Column;

/// Create/read/update/delete over one record type.
///
/// Every method has a provided implementation delegating to the
/// [`TableRepository`] returned by [`Repository::table`]; entity repositories
/// only supply that accessor and add their own domain queries.
///
/// Not-found is `Ok(None)`, never an error. Batch reads and writes return an
/// empty `Vec` when nothing matches.
#[async_trait]
pub trait Repository: Send + Sync {
    type Record: Record;

    fn table(&self) -> &TableRepository<Self::Record>;

    async fn create(&self, data: &Create<Self>) -> Result<Self::Record, DatabaseError> {
        self.table().create(data).await
    }

    async fn create_many(&self, data: &[Create<Self>]) -> Result<Vec<Self::Record>, DatabaseError> {
        self.table().create_many(data).await
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Self::Record>, DatabaseError> {
        self.table().find_by_id(id).await
    }

    async fn find_all(&self) -> Result<Vec<Self::Record>, DatabaseError> {
        self.table().find_all().await
    }

    async fn find_where(
        &self,
        filter: &Filter<ColumnOf<Self>>,
    ) -> Result<Vec<Self::Record>, DatabaseError> {
        self.table().find_where(filter).await
    }

    async fn find_one_where(
        &self,
        filter: &Filter<ColumnOf<Self>>,
    ) -> Result<Option<Self::Record>, DatabaseError> {
        self.table().find_one_where(filter).await
    }

    async fn update_by_id(
        &self,
        id: &str,
        data: &Update<Self>,
    ) -> Result<Option<Self::Record>, DatabaseError> {
        self.table().update_by_id(id, data).await
    }

    async fn update_where(
        &self,
        filter: &Filter<ColumnOf<Self>>,
        data: &Update<Self>,
    ) -> Result<Vec<Self::Record>, DatabaseError> {
        self.table().update_where(filter, data).await
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool, DatabaseError> {
        self.table().delete_by_id(id).await
    }

    async fn delete_where(&self, filter: &Filter<ColumnOf<Self>>) -> Result<u64, DatabaseError> {
        self.table().delete_where(filter).await
    }

    async fn count(&self, filter: &Filter<ColumnOf<Self>>) -> Result<u64, DatabaseError> {
        self.table().count(filter).await
    }

    async fn exists(&self, filter: &Filter<ColumnOf<Self>>) -> Result<bool, DatabaseError> {
        self.table().exists(filter).await
    }
}

impl<R: Record> Repository for TableRepository<R> {
    type Record = R;

    fn table(&self) -> &Self {
        self
    }
}
