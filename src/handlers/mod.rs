pub mod customers;
pub mod order_items;
pub mod orders;
pub mod products;
pub mod reports;

use actix_web::{web, HttpResponse};
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

use crate::domain::errors::DomainError;
use crate::errors::AppError;

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Runs blocking store work off the async executor.
pub(crate) async fn blocking<T, F>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, DomainError> + Send + 'static,
    T: Send + 'static,
{
    Ok(web::block(f).await??)
}

pub(crate) fn deleted(entity: &str) -> HttpResponse {
    HttpResponse::Ok().json(MessageResponse {
        message: format!("{entity} deleted"),
    })
}

/// Routes under `/api`, plus extractor settings that turn malformed input into
/// JSON 400 responses. The caller registers a `web::Data<Store>`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .route("/api-docs/openapi.json", web::get().to(openapi_json))
    .service(
        web::scope("/api")
            .service(
                web::scope("/customers")
                    .route("", web::get().to(customers::list_customers))
                    .route("", web::post().to(customers::create_customer))
                    .route("/{id}", web::get().to(customers::get_customer))
                    .route("/{id}", web::put().to(customers::update_customer))
                    .route("/{id}", web::delete().to(customers::delete_customer)),
            )
            .service(
                web::scope("/products")
                    .route("", web::get().to(products::list_products))
                    .route("", web::post().to(products::create_product))
                    .route("/{id}", web::get().to(products::get_product))
                    .route("/{id}", web::put().to(products::update_product))
                    .route("/{id}", web::delete().to(products::delete_product)),
            )
            .service(
                web::scope("/orders")
                    .route("", web::get().to(orders::list_orders))
                    .route("", web::post().to(orders::create_order))
                    .route("/{id}", web::get().to(orders::get_order))
                    .route("/{id}", web::put().to(orders::update_order))
                    .route("/{id}", web::delete().to(orders::delete_order)),
            )
            .service(
                web::scope("/orderItems")
                    .route("", web::get().to(order_items::list_order_items))
                    .route("", web::post().to(order_items::create_order_item))
                    .route("/{id}", web::get().to(order_items::get_order_item))
                    .route("/{id}", web::put().to(order_items::update_order_item))
                    .route("/{id}", web::delete().to(order_items::delete_order_item)),
            )
            .service(
                web::scope("/report")
                    .route("/summary", web::get().to(reports::summary))
                    .route("/daily", web::get().to(reports::daily))
                    .route("/today", web::get().to(reports::today)),
            ),
    );
}

#[derive(OpenApi)]
#[openapi(
    paths(
        customers::list_customers,
        customers::create_customer,
        customers::get_customer,
        customers::update_customer,
        customers::delete_customer,
        products::list_products,
        products::create_product,
        products::get_product,
        products::update_product,
        products::delete_product,
        orders::list_orders,
        orders::create_order,
        orders::get_order,
        orders::update_order,
        orders::delete_order,
        order_items::list_order_items,
        order_items::create_order_item,
        order_items::get_order_item,
        order_items::update_order_item,
        order_items::delete_order_item,
        reports::summary,
        reports::daily,
        reports::today,
    ),
    components(schemas(MessageResponse)),
    tags(
        (name = "customers"),
        (name = "products"),
        (name = "orders"),
        (name = "order-items"),
        (name = "reports"),
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> HttpResponse {
    HttpResponse::Ok().json(ApiDoc::openapi())
}
