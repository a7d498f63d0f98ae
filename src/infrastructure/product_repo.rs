use chrono::Utc;
use diesel::prelude::*;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::ports::{CascadeOutcome, EntityRepository};
use crate::domain::product::{NewProduct, Product, ProductChanges};
use crate::schema::products;

use super::cascade::{delete_cascading, CascadeRoot};
use super::models::{NewProductRow, ProductRow};

pub struct DieselProductRepository {
    pool: DbPool,
}

impl DieselProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl EntityRepository for DieselProductRepository {
    type Entity = Product;
    type New = NewProduct;
    type Changes = ProductChanges;

    fn create(&self, new: NewProduct) -> Result<Product, DomainError> {
        new.validate()?;
        let mut conn = self.pool.get()?;
        let now = Utc::now().naive_utc();

        let row = diesel::insert_into(products::table)
            .values(&NewProductRow {
                name: new.name.trim(),
                price: new.price,
                created_at: now,
                updated_at: now,
            })
            .returning(ProductRow::as_returning())
            .get_result(&mut conn)?;

        Ok(row.into())
    }

    fn find(&self, id: i32) -> Result<Product, DomainError> {
        let mut conn = self.pool.get()?;

        products::table
            .find(id)
            .select(ProductRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(Product::from)
            .ok_or_else(|| DomainError::not_found("Product", id))
    }

    fn update(&self, id: i32, changes: ProductChanges) -> Result<Product, DomainError> {
        let mut conn = self.pool.get()?;

        conn.immediate_transaction::<_, DomainError, _>(|conn| {
            let current: Product = products::table
                .find(id)
                .select(ProductRow::as_select())
                .first(conn)
                .optional()?
                .map(Product::from)
                .ok_or_else(|| DomainError::not_found("Product", id))?;

            let merged = changes.merge(&current)?;
            let row = diesel::update(products::table.find(id))
                .set((
                    products::name.eq(merged.name.trim()),
                    products::price.eq(merged.price),
                    products::updated_at.eq(Utc::now().naive_utc()),
                ))
                .returning(ProductRow::as_returning())
                .get_result(conn)?;

            Ok(row.into())
        })
    }

    fn delete(&self, id: i32) -> Result<CascadeOutcome, DomainError> {
        let mut conn = self.pool.get()?;
        conn.immediate_transaction(|conn| delete_cascading(conn, CascadeRoot::Product(id)))
    }

    fn list(&self) -> Result<Vec<Product>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = products::table
            .select(ProductRow::as_select())
            .order(products::id.asc())
            .load(&mut conn)?;

        Ok(rows.into_iter().map(Product::from).collect())
    }
}
