use actix_web::{web, HttpResponse};

use crate::domain::order::{NewOrder, Order, OrderChanges, OrderWithCustomer};
use crate::domain::ports::{EntityRepository, RelationshipResolver};
use crate::errors::AppError;
use crate::infrastructure::Store;

use super::{blocking, deleted, MessageResponse};

/// GET /api/orders
///
/// Returns every order together with its customer.
#[utoipa::path(
    get,
    path = "/api/orders",
    responses(
        (status = 200, description = "All orders with their customer", body = [OrderWithCustomer]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn list_orders(store: web::Data<Store>) -> Result<HttpResponse, AppError> {
    let orders = blocking(move || store.reader().orders_with_customer()).await?;
    Ok(HttpResponse::Ok().json(orders))
}

/// POST /api/orders
///
/// `orderDate` defaults to the time of creation. The customer must exist.
#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = NewOrder,
    responses(
        (status = 201, description = "Order created", body = Order),
        (status = 400, description = "Invalid order or unknown customer"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    store: web::Data<Store>,
    body: web::Json<NewOrder>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let order = blocking(move || store.orders().create(body)).await?;
    Ok(HttpResponse::Created().json(order))
}

/// GET /api/orders/{id}
#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(("id" = i32, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order found", body = Order),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    store: web::Data<Store>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let order = blocking(move || store.orders().find(id)).await?;
    Ok(HttpResponse::Ok().json(order))
}

/// PUT /api/orders/{id}
#[utoipa::path(
    put,
    path = "/api/orders/{id}",
    params(("id" = i32, Path, description = "Order id")),
    request_body = OrderChanges,
    responses(
        (status = 200, description = "Order updated", body = Order),
        (status = 400, description = "Invalid order or unknown customer"),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn update_order(
    store: web::Data<Store>,
    path: web::Path<i32>,
    body: web::Json<OrderChanges>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let changes = body.into_inner();
    let order = blocking(move || store.orders().update(id, changes)).await?;
    Ok(HttpResponse::Ok().json(order))
}

/// DELETE /api/orders/{id}
///
/// Also deletes the order's items.
#[utoipa::path(
    delete,
    path = "/api/orders/{id}",
    params(("id" = i32, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order deleted", body = MessageResponse),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn delete_order(
    store: web::Data<Store>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    blocking(move || store.orders().delete(id)).await?;
    Ok(deleted("Order"))
}
