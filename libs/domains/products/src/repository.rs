use async_trait::async_trait;

use crate::error::ProductResult;
use crate::models::{Product, ProductFields, ProductId};
use crate::query::ProductFilter;

/// Repository trait for Product persistence
///
/// Implementations enforce SKU uniqueness and own the timestamps: `insert` sets
/// both, `update` refreshes `updated_at` and keeps `created_at`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Store a new product, failing with `DuplicateKey` when the SKU is taken
    async fn insert(&self, fields: ProductFields) -> ProductResult<Product>;

    /// Products matching the filter, in storage order
    async fn find(&self, filter: ProductFilter) -> ProductResult<Vec<Product>>;

    async fn find_by_id(&self, id: ProductId) -> ProductResult<Option<Product>>;

    /// Replace the user-controlled fields; `None` when the product is gone
    async fn update(&self, id: ProductId, fields: ProductFields)
    -> ProductResult<Option<Product>>;

    /// Remove and return the product; `None` when it did not exist
    async fn delete(&self, id: ProductId) -> ProductResult<Option<Product>>;
}
