use actix_web::{web, HttpResponse};

use crate::domain::ports::EntityRepository;
use crate::domain::product::{NewProduct, Product, ProductChanges};
use crate::errors::AppError;
use crate::infrastructure::Store;

use super::{blocking, deleted, MessageResponse};

/// GET /api/products
#[utoipa::path(
    get,
    path = "/api/products",
    responses(
        (status = 200, description = "All products in insertion order", body = [Product]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "products"
)]
pub async fn list_products(store: web::Data<Store>) -> Result<HttpResponse, AppError> {
    let products = blocking(move || store.products().list()).await?;
    Ok(HttpResponse::Ok().json(products))
}

/// POST /api/products
///
/// Names must be non-empty and prices non-negative.
#[utoipa::path(
    post,
    path = "/api/products",
    request_body = NewProduct,
    responses(
        (status = 201, description = "Product created", body = Product),
        (status = 400, description = "Invalid product"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "products"
)]
pub async fn create_product(
    store: web::Data<Store>,
    body: web::Json<NewProduct>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let product = blocking(move || store.products().create(body)).await?;
    Ok(HttpResponse::Created().json(product))
}

/// GET /api/products/{id}
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(("id" = i32, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product found", body = Product),
        (status = 404, description = "Product not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "products"
)]
pub async fn get_product(
    store: web::Data<Store>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let product = blocking(move || store.products().find(id)).await?;
    Ok(HttpResponse::Ok().json(product))
}

/// PUT /api/products/{id}
#[utoipa::path(
    put,
    path = "/api/products/{id}",
    params(("id" = i32, Path, description = "Product id")),
    request_body = ProductChanges,
    responses(
        (status = 200, description = "Product updated", body = Product),
        (status = 400, description = "Invalid product"),
        (status = 404, description = "Product not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "products"
)]
pub async fn update_product(
    store: web::Data<Store>,
    path: web::Path<i32>,
    body: web::Json<ProductChanges>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let changes = body.into_inner();
    let product = blocking(move || store.products().update(id, changes)).await?;
    Ok(HttpResponse::Ok().json(product))
}

/// DELETE /api/products/{id}
///
/// Also deletes every order item that references the product.
#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(("id" = i32, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product deleted", body = MessageResponse),
        (status = 404, description = "Product not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "products"
)]
pub async fn delete_product(
    store: web::Data<Store>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    blocking(move || store.products().delete(id)).await?;
    Ok(deleted("Product"))
}
