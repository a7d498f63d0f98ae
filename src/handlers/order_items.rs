use actix_web::{web, HttpResponse};

use crate::domain::order::{NewOrderItem, OrderItem, OrderItemChanges, OrderItemWithRefs};
use crate::domain::ports::{EntityRepository, RelationshipResolver};
use crate::errors::AppError;
use crate::infrastructure::Store;

use super::{blocking, deleted, MessageResponse};

/// GET /api/orderItems
///
/// Returns every order item together with its order and product.
#[utoipa::path(
    get,
    path = "/api/orderItems",
    responses(
        (status = 200, description = "All order items with order and product", body = [OrderItemWithRefs]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "order-items"
)]
pub async fn list_order_items(store: web::Data<Store>) -> Result<HttpResponse, AppError> {
    let items = blocking(move || store.reader().order_items_with_order_and_product()).await?;
    Ok(HttpResponse::Ok().json(items))
}

/// POST /api/orderItems
///
/// `quantity` defaults to 1. Order and product must exist.
#[utoipa::path(
    post,
    path = "/api/orderItems",
    request_body = NewOrderItem,
    responses(
        (status = 201, description = "Order item created", body = OrderItem),
        (status = 400, description = "Invalid quantity or unknown order/product"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "order-items"
)]
pub async fn create_order_item(
    store: web::Data<Store>,
    body: web::Json<NewOrderItem>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let item = blocking(move || store.order_items().create(body)).await?;
    Ok(HttpResponse::Created().json(item))
}

#[utoipa::path(
    get,
    path = "/api/orderItems/{id}",
    params(("id" = i32, Path, description = "Order item id")),
    responses(
        (status = 200, description = "Order item found", body = OrderItem),
        (status = 404, description = "Order item not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "order-items"
)]
pub async fn get_order_item(
    store: web::Data<Store>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let item = blocking(move || store.order_items().find(id)).await?;
    Ok(HttpResponse::Ok().json(item))
}

#[utoipa::path(
    put,
    path = "/api/orderItems/{id}",
    params(("id" = i32, Path, description = "Order item id")),
    request_body = OrderItemChanges,
    responses(
        (status = 200, description = "Order item updated", body = OrderItem),
        (status = 400, description = "Invalid quantity or unknown order/product"),
        (status = 404, description = "Order item not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "order-items"
)]
pub async fn update_order_item(
    store: web::Data<Store>,
    path: web::Path<i32>,
    body: web::Json<OrderItemChanges>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let changes = body.into_inner();
    let item = blocking(move || store.order_items().update(id, changes)).await?;
    Ok(HttpResponse::Ok().json(item))
}

#[utoipa::path(
    delete,
    path = "/api/orderItems/{id}",
    params(("id" = i32, Path, description = "Order item id")),
    responses(
        (status = 200, description = "Order item deleted", body = MessageResponse),
        (status = 404, description = "Order item not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "order-items"
)]
pub async fn delete_order_item(
    store: web::Data<Store>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    blocking(move || store.order_items().delete(id)).await?;
    Ok(deleted("Order Item"))
}
