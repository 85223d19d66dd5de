//! HTTP handlers for Products API

use axum::{
    Router,
    extract::{Path, Query, State, rejection::QueryRejection},
    routing::get,
};
use axum_helpers::{
    AppError, Envelope, JsonBody, Reply,
    errors::responses::{
        DuplicateKeyResponse, InternalServerErrorResponse, InvalidIdentifierResponse,
        NotFoundResponse, ValidationFailedResponse,
    },
};
use observability::{Outcome, ProductMetrics};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::{ProductError, ProductResult};
use crate::models::{Contact, Manufacturer, Product, ProductId, ProductPayload};
use crate::models::{ContactPayload, ManufacturerPayload};
use crate::query::SearchParams;
use crate::repository::ProductRepository;
use crate::service::ProductService;

/// OpenAPI documentation for Products API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_products,
        create_product,
        search_products,
        products_by_manufacturer,
        products_by_category,
        get_product,
        update_product,
        delete_product,
    ),
    components(
        schemas(
            Product, Manufacturer, Contact,
            ProductPayload, ManufacturerPayload, ContactPayload
        ),
        responses(
            InvalidIdentifierResponse,
            ValidationFailedResponse,
            DuplicateKeyResponse,
            NotFoundResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Products", description = "Product management endpoints")
    )
)]
pub struct ApiDoc;

type SharedService<R> = State<Arc<ProductService<R>>>;

/// The eight product operations, with their metric label and failure message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    List,
    Get,
    Create,
    Update,
    Delete,
    ByManufacturer,
    ByCategory,
    Search,
}

impl Operation {
    fn name(self) -> &'static str {
        match self {
            Operation::List => "list",
            Operation::Get => "get",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::ByManufacturer => "by_manufacturer",
            Operation::ByCategory => "by_category",
            Operation::Search => "search",
        }
    }

    /// Message sent to the caller when the operation fails unexpectedly
    fn failure_message(self) -> &'static str {
        match self {
            Operation::List => "Failed to fetch products",
            Operation::Get => "Failed to fetch product",
            Operation::Create => "Failed to create product",
            Operation::Update => "Failed to update product",
            Operation::Delete => "Failed to delete product",
            Operation::ByManufacturer => "Failed to fetch products by manufacturer",
            Operation::ByCategory => "Failed to fetch products by category",
            Operation::Search => "Failed to search products",
        }
    }

    /// Record the outcome and translate any failure into the HTTP error.
    fn complete<T>(self, result: ProductResult<T>) -> Result<T, AppError> {
        match result {
            Ok(value) => {
                ProductMetrics::record_operation(self.name(), Outcome::Success);
                Ok(value)
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    fn fail(self, err: ProductError) -> AppError {
        ProductMetrics::record_operation(self.name(), err.outcome());
        err.into_app_error(self.failure_message())
    }

    /// Like [`Self::complete`] for list results, which also get a `count`.
    fn complete_list(
        self,
        result: ProductResult<Vec<Product>>,
    ) -> Result<Reply<Vec<Product>>, AppError> {
        let products = self.complete(result)?;
        ProductMetrics::record_search_results(self.name(), products.len());
        Ok(Reply::list(products))
    }
}

fn parse_id(operation: Operation, raw: &str) -> Result<ProductId, AppError> {
    raw.parse::<ProductId>().map_err(|err| operation.fail(err))
}

/// Create the products router with all HTTP endpoints
///
/// Static segments are registered ahead of `/{id}` so they are never read as ids.
pub fn router<R: ProductRepository + 'static>(service: ProductService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/search", get(search_products))
        .route("/manufacturer/{manufacturer}", get(products_by_manufacturer))
        .route("/category/{category}", get(products_by_category))
        .route(
            "/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .with_state(shared_service)
}

/// List all products
#[utoipa::path(
    get,
    path = "",
    tag = "Products",
    responses(
        (status = 200, description = "All products with count", body = Envelope<Vec<Product>>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_products<R: ProductRepository>(
    State(service): SharedService<R>,
) -> Result<Reply<Vec<Product>>, AppError> {
    Operation::List.complete_list(service.list_products().await)
}

/// Create a new product
#[utoipa::path(
    post,
    path = "",
    tag = "Products",
    request_body = ProductPayload,
    responses(
        (status = 201, description = "Product created successfully", body = Envelope<Product>),
        (status = 400, response = ValidationFailedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_product<R: ProductRepository>(
    State(service): SharedService<R>,
    JsonBody(payload): JsonBody<ProductPayload>,
) -> Result<Reply<Product>, AppError> {
    let product = Operation::Create.complete(service.create_product(payload).await)?;
    Ok(Reply::created(product, "Product created successfully"))
}

/// Search products by any combination of filters
#[utoipa::path(
    get,
    path = "/search",
    tag = "Products",
    params(SearchParams),
    responses(
        (status = 200, description = "Matching products with count", body = Envelope<Vec<Product>>),
        (status = 400, response = ValidationFailedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn search_products<R: ProductRepository>(
    State(service): SharedService<R>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Reply<Vec<Product>>, AppError> {
    let Query(params) = params?;
    Operation::Search.complete_list(service.search_products(&params).await)
}

/// Products whose manufacturer name contains the given text
#[utoipa::path(
    get,
    path = "/manufacturer/{manufacturer}",
    tag = "Products",
    params(("manufacturer" = String, Path, description = "Case-insensitive manufacturer name fragment")),
    responses(
        (status = 200, description = "Matching products with count", body = Envelope<Vec<Product>>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn products_by_manufacturer<R: ProductRepository>(
    State(service): SharedService<R>,
    Path(manufacturer): Path<String>,
) -> Result<Reply<Vec<Product>>, AppError> {
    Operation::ByManufacturer
        .complete_list(service.products_by_manufacturer(&manufacturer).await)
}

/// Products whose category contains the given text
#[utoipa::path(
    get,
    path = "/category/{category}",
    tag = "Products",
    params(("category" = String, Path, description = "Case-insensitive category fragment")),
    responses(
        (status = 200, description = "Matching products with count", body = Envelope<Vec<Product>>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn products_by_category<R: ProductRepository>(
    State(service): SharedService<R>,
    Path(category): Path<String>,
) -> Result<Reply<Vec<Product>>, AppError> {
    Operation::ByCategory.complete_list(service.products_by_category(&category).await)
}

/// Get a product by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Products",
    params(("id" = String, Path, description = "Product ID (24 hex digits)")),
    responses(
        (status = 200, description = "Product found", body = Envelope<Product>),
        (status = 400, response = InvalidIdentifierResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_product<R: ProductRepository>(
    State(service): SharedService<R>,
    Path(id): Path<String>,
) -> Result<Reply<Product>, AppError> {
    let id = parse_id(Operation::Get, &id)?;
    let product = Operation::Get.complete(service.get_product(id).await)?;
    Ok(Reply::ok(product))
}

/// Update a product with any subset of its fields
///
/// The id is checked before the body, so a bad id wins over a bad body.
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Products",
    params(("id" = String, Path, description = "Product ID (24 hex digits)")),
    request_body = ProductPayload,
    responses(
        (status = 200, description = "Product updated successfully", body = Envelope<Product>),
        (status = 400, response = ValidationFailedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_product<R: ProductRepository>(
    State(service): SharedService<R>,
    Path(id): Path<String>,
    body: Result<JsonBody<ProductPayload>, AppError>,
) -> Result<Reply<Product>, AppError> {
    let id = parse_id(Operation::Update, &id)?;
    let JsonBody(payload) = body?;
    let product = Operation::Update.complete(service.update_product(id, payload).await)?;
    Ok(Reply::ok(product).with_message("Product updated successfully"))
}

/// Delete a product
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Products",
    params(("id" = String, Path, description = "Product ID (24 hex digits)")),
    responses(
        (status = 200, description = "Product deleted successfully", body = Envelope<Product>),
        (status = 400, response = InvalidIdentifierResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_product<R: ProductRepository>(
    State(service): SharedService<R>,
    Path(id): Path<String>,
) -> Result<Reply<Product>, AppError> {
    let id = parse_id(Operation::Delete, &id)?;
    let product = Operation::Delete.complete(service.delete_product(id).await)?;
    Ok(Reply::ok(product).with_message("Product deleted successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unexpected_failure_uses_operation_message() {
        let err = Operation::ByCategory
            .complete::<()>(Err(ProductError::Unexpected("timeout".into())))
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to fetch products by category: timeout");
    }

    #[test]
    fn test_parse_id() {
        assert!(parse_id(Operation::Get, "65f1c2a4e13b2a0012345678").is_ok());
        let err = parse_id(Operation::Delete, "nope").unwrap_err();
        assert_eq!(err.to_string(), "Invalid product ID format");
    }
}
