use chrono::Utc;
use diesel::prelude::*;

use crate::db::DbPool;
use crate::domain::customer::{Customer, CustomerChanges, NewCustomer};
use crate::domain::errors::DomainError;
use crate::domain::ports::{CascadeOutcome, EntityRepository};
use crate::schema::customers;

use super::cascade::{delete_cascading, CascadeRoot};
use super::models::{CustomerRow, NewCustomerRow};

pub struct DieselCustomerRepository {
    pool: DbPool,
}

impl DieselCustomerRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn email_taken(email: &str) -> impl FnOnce(DomainError) -> DomainError + '_ {
    move |e| match e {
        DomainError::Conflict(_) => {
            DomainError::Conflict(format!("email '{email}' is already registered"))
        }
        other => other,
    }
}

impl EntityRepository for DieselCustomerRepository {
    type Entity = Customer;
    type New = NewCustomer;
    type Changes = CustomerChanges;

    fn create(&self, new: NewCustomer) -> Result<Customer, DomainError> {
        new.validate()?;
        let mut conn = self.pool.get()?;
        let now = Utc::now().naive_utc();

        let row = diesel::insert_into(customers::table)
            .values(&NewCustomerRow {
                name: new.name.trim(),
                email: new.email.trim(),
                created_at: now,
                updated_at: now,
            })
            .returning(CustomerRow::as_returning())
            .get_result(&mut conn)
            .map_err(DomainError::from)
            .map_err(email_taken(new.email.trim()))?;

        Ok(row.into())
    }

    fn find(&self, id: i32) -> Result<Customer, DomainError> {
        let mut conn = self.pool.get()?;

        customers::table
            .find(id)
            .select(CustomerRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(Customer::from)
            .ok_or_else(|| DomainError::not_found("Customer", id))
    }

    fn update(&self, id: i32, changes: CustomerChanges) -> Result<Customer, DomainError> {
        let mut conn = self.pool.get()?;

        conn.immediate_transaction::<_, DomainError, _>(|conn| {
            let current: Customer = customers::table
                .find(id)
                .select(CustomerRow::as_select())
                .first(conn)
                .optional()?
                .map(Customer::from)
                .ok_or_else(|| DomainError::not_found("Customer", id))?;

            let merged = changes.merge(&current)?;
            let email = merged.email.trim();
            let row = diesel::update(customers::table.find(id))
                .set((
                    customers::name.eq(merged.name.trim()),
                    customers::email.eq(email),
                    customers::updated_at.eq(Utc::now().naive_utc()),
                ))
                .returning(CustomerRow::as_returning())
                .get_result(conn)
                .map_err(DomainError::from)
                .map_err(email_taken(email))?;

            Ok(row.into())
        })
    }

    fn delete(&self, id: i32) -> Result<CascadeOutcome, DomainError> {
        let mut conn = self.pool.get()?;
        conn.immediate_transaction(|conn| delete_cascading(conn, CascadeRoot::Customer(id)))
    }

    fn list(&self) -> Result<Vec<Customer>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = customers::table
            .select(CustomerRow::as_select())
            .order(customers::id.asc())
            .load(&mut conn)?;

        Ok(rows.into_iter().map(Customer::from).collect())
    }
}
