use actix_web::{web, HttpResponse};

use crate::domain::customer::{Customer, CustomerChanges, NewCustomer};
use crate::domain::ports::EntityRepository;
use crate::errors::AppError;
use crate::infrastructure::Store;

use super::{blocking, deleted, MessageResponse};

/// GET /api/customers
#[utoipa::path(
    get,
    path = "/api/customers",
    responses(
        (status = 200, description = "All customers in insertion order", body = [Customer]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "customers"
)]
pub async fn list_customers(store: web::Data<Store>) -> Result<HttpResponse, AppError> {
    let customers = blocking(move || store.customers().list()).await?;
    Ok(HttpResponse::Ok().json(customers))
}

/// POST /api/customers
///
/// Names must be non-empty and emails unique.
#[utoipa::path(
    post,
    path = "/api/customers",
    request_body = NewCustomer,
    responses(
        (status = 201, description = "Customer created", body = Customer),
        (status = 400, description = "Invalid customer"),
        (status = 409, description = "Email already registered"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "customers"
)]
pub async fn create_customer(
    store: web::Data<Store>,
    body: web::Json<NewCustomer>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let customer = blocking(move || store.customers().create(body)).await?;
    Ok(HttpResponse::Created().json(customer))
}

/// GET /api/customers/{id}
#[utoipa::path(
    get,
    path = "/api/customers/{id}",
    params(("id" = i32, Path, description = "Customer id")),
    responses(
        (status = 200, description = "Customer found", body = Customer),
        (status = 404, description = "Customer not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "customers"
)]
pub async fn get_customer(
    store: web::Data<Store>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let customer = blocking(move || store.customers().find(id)).await?;
    Ok(HttpResponse::Ok().json(customer))
}

/// PUT /api/customers/{id}
#[utoipa::path(
    put,
    path = "/api/customers/{id}",
    params(("id" = i32, Path, description = "Customer id")),
    request_body = CustomerChanges,
    responses(
        (status = 200, description = "Customer updated", body = Customer),
        (status = 400, description = "Invalid customer"),
        (status = 404, description = "Customer not found"),
        (status = 409, description = "Email already registered"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "customers"
)]
pub async fn update_customer(
    store: web::Data<Store>,
    path: web::Path<i32>,
    body: web::Json<CustomerChanges>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let changes = body.into_inner();
    let customer = blocking(move || store.customers().update(id, changes)).await?;
    Ok(HttpResponse::Ok().json(customer))
}

/// DELETE /api/customers/{id}
///
/// Also deletes the customer's orders and their items.
#[utoipa::path(
    delete,
    path = "/api/customers/{id}",
    params(("id" = i32, Path, description = "Customer id")),
    responses(
        (status = 200, description = "Customer deleted", body = MessageResponse),
        (status = 404, description = "Customer not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "customers"
)]
pub async fn delete_customer(
    store: web::Data<Store>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    blocking(move || store.customers().delete(id)).await?;
    Ok(deleted("Customer"))
}
