use crate::db::{create_memory_pool, create_pool, DbPool};
use crate::domain::errors::DomainError;
use crate::run_migrations;

use super::customer_repo::DieselCustomerRepository;
use super::order_item_repo::DieselOrderItemRepository;
use super::order_repo::DieselOrderRepository;
use super::product_repo::DieselProductRepository;
use super::reader::DieselReader;

/// Handle on an opened database. Opening applies pending migrations; the pool
/// closes when the last clone is dropped.
#[derive(Clone)]
pub struct Store {
    pool: DbPool,
}

impl Store {
    pub fn open(database_url: &str) -> Result<Self, DomainError> {
        let pool = create_pool(database_url)?;
        run_migrations(&pool)?;
        log::info!("Opened store at {}", database_url);
        Ok(Self { pool })
    }

    pub fn open_in_memory() -> Result<Self, DomainError> {
        let pool = create_memory_pool()?;
        run_migrations(&pool)?;
        Ok(Self { pool })
    }

    #[cfg(test)]
    pub(crate) fn pool_for_tests(&self) -> &DbPool {
        &self.pool
    }

    pub fn customers(&self) -> DieselCustomerRepository {
        DieselCustomerRepository::new(self.pool.clone())
    }

    pub fn products(&self) -> DieselProductRepository {
        DieselProductRepository::new(self.pool.clone())
    }

    pub fn orders(&self) -> DieselOrderRepository {
        DieselOrderRepository::new(self.pool.clone())
    }

    pub fn order_items(&self) -> DieselOrderItemRepository {
        DieselOrderItemRepository::new(self.pool.clone())
    }

    pub fn reader(&self) -> DieselReader {
        DieselReader::new(self.pool.clone())
    }
}
