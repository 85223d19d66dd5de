//! Product Service - Business logic layer

use std::sync::Arc;
use tracing::instrument;

use crate::error::{ProductError, ProductResult};
use crate::models::{Product, ProductId, ProductPayload};
use crate::query::{ProductFilter, SearchParams};
use crate::repository::ProductRepository;
use crate::validation::{MISSING_MANUFACTURER_CONTACT, ProductDraft, has_manufacturer_contact};

/// Product service providing business logic operations
pub struct ProductService<R: ProductRepository> {
    repository: Arc<R>,
}

impl<R: ProductRepository> ProductService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// All products
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> ProductResult<Vec<Product>> {
        self.repository.find(ProductFilter::all()).await
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: ProductId) -> ProductResult<Product> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(ProductError::NotFound(id))
    }

    /// Validate and store a new product.
    ///
    /// A body without manufacturer contact details is rejected up front with a single
    /// message; SKU uniqueness is left to the repository.
    #[instrument(skip(self, payload))]
    pub async fn create_product(&self, payload: ProductPayload) -> ProductResult<Product> {
        if !has_manufacturer_contact(&payload) {
            return Err(ProductError::ValidationFailed(vec![
                MISSING_MANUFACTURER_CONTACT.to_string(),
            ]));
        }

        let fields = ProductDraft::default().merge(payload).into_fields()?;
        self.repository.insert(fields).await
    }

    /// Merge the payload over the stored product and revalidate the whole result.
    #[instrument(skip(self, payload))]
    pub async fn update_product(
        &self,
        id: ProductId,
        payload: ProductPayload,
    ) -> ProductResult<Product> {
        let existing = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(ProductError::NotFound(id))?;

        let fields = ProductDraft::from(&existing).merge(payload).into_fields()?;

        // Deleted between the read and the write
        self.repository
            .update(id, fields)
            .await?
            .ok_or(ProductError::NotFound(id))
    }

    /// Delete a product, returning what was removed
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: ProductId) -> ProductResult<Product> {
        self.repository
            .delete(id)
            .await?
            .ok_or(ProductError::NotFound(id))
    }

    #[instrument(skip(self))]
    pub async fn products_by_manufacturer(&self, manufacturer: &str) -> ProductResult<Vec<Product>> {
        self.repository
            .find(ProductFilter::by_manufacturer(manufacturer))
            .await
    }

    #[instrument(skip(self))]
    pub async fn products_by_category(&self, category: &str) -> ProductResult<Vec<Product>> {
        self.repository
            .find(ProductFilter::by_category(category))
            .await
    }

    /// Products matching every supplied search parameter
    #[instrument(skip(self))]
    pub async fn search_products(&self, params: &SearchParams) -> ProductResult<Vec<Product>> {
        let filter = ProductFilter::try_from(params)?;
        self.repository.find(filter).await
    }
}

impl<R: ProductRepository> Clone for ProductService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Contact, Manufacturer, ProductFields};
    use crate::query::Constraint;
    use crate::repository::MockProductRepository;
    use mockall::predicate::eq;
    use serde_json::json;

    fn id() -> ProductId {
        "65f1c2a4e13b2a0012345678".parse().unwrap()
    }

    fn payload(value: serde_json::Value) -> ProductPayload {
        serde_json::from_value(value).unwrap()
    }

    fn widget_payload() -> ProductPayload {
        payload(json!({
            "name": "Widget",
            "sku": "W1",
            "price": 15,
            "category": "Tools",
            "amountInStock": 3,
            "manufacturer": {
                "name": "Acme",
                "country": "US",
                "contact": { "name": "A", "email": "a@a.com", "phone": "1" }
            }
        }))
    }

    fn widget() -> Product {
        Product::new(
            id(),
            ProductFields {
                name: "Widget".to_string(),
                sku: "W1".to_string(),
                description: None,
                price: 15.0,
                category: "Tools".to_string(),
                amount_in_stock: 3,
                manufacturer: Manufacturer {
                    name: "Acme".to_string(),
                    country: "US".to_string(),
                    website: None,
                    description: None,
                    address: None,
                    contact: Contact {
                        name: "A".to_string(),
                        email: "a@a.com".to_string(),
                        phone: "1".to_string(),
                    },
                },
            },
        )
    }

    fn validation_errors(result: ProductResult<Product>) -> Vec<String> {
        match result {
            Err(ProductError::ValidationFailed(errors)) => errors,
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_product_stores_validated_fields() {
        let mut repo = MockProductRepository::new();
        repo.expect_insert()
            .withf(|fields| fields.sku == "W1" && fields.amount_in_stock == 3)
            .times(1)
            .returning(|fields| Ok(Product::new(ProductId::new(), fields)));

        let product = ProductService::new(repo)
            .create_product(widget_payload())
            .await
            .unwrap();
        assert_eq!(product.name, "Widget");
        assert_eq!(product.created_at, product.updated_at);
    }

    #[tokio::test]
    async fn test_create_without_contact_never_reaches_repository() {
        let mut repo = MockProductRepository::new();
        repo.expect_insert().never();
        let service = ProductService::new(repo);

        let mut body = widget_payload();
        if let Some(m) = body.manufacturer.as_mut() {
            m.contact = None;
        }
        let errors = validation_errors(service.create_product(body).await);
        assert_eq!(errors, vec![MISSING_MANUFACTURER_CONTACT]);

        let errors = validation_errors(service.create_product(ProductPayload::default()).await);
        assert_eq!(errors, vec![MISSING_MANUFACTURER_CONTACT]);
    }

    #[tokio::test]
    async fn test_create_propagates_duplicate_sku() {
        let mut repo = MockProductRepository::new();
        repo.expect_insert()
            .returning(|fields| Err(ProductError::DuplicateKey(fields.sku)));

        let result = ProductService::new(repo).create_product(widget_payload()).await;
        assert!(matches!(result, Err(ProductError::DuplicateKey(sku)) if sku == "W1"));
    }

    #[tokio::test]
    async fn test_get_product_not_found() {
        let mut repo = MockProductRepository::new();
        repo.expect_find_by_id()
            .with(eq(id()))
            .returning(|_| Ok(None));

        let result = ProductService::new(repo).get_product(id()).await;
        assert!(matches!(result, Err(ProductError::NotFound(missing)) if missing == id()));
    }

    #[tokio::test]
    async fn test_update_merges_over_existing() {
        let mut repo = MockProductRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(Some(widget())));
        repo.expect_update()
            .withf(|_, fields| {
                fields.price == 20.0 && fields.name == "Widget" && fields.manufacturer.country == "DE"
            })
            .times(1)
            .returning(|id, fields| Ok(Some(Product::new(id, fields))));

        let product = ProductService::new(repo)
            .update_product(id(), payload(json!({ "price": 20, "manufacturer": { "country": "DE" } })))
            .await
            .unwrap();
        assert_eq!(product.price, 20.0);
        assert_eq!(product.manufacturer.contact.email, "a@a.com");
    }

    #[tokio::test]
    async fn test_update_rejects_invalid_merge_result() {
        let mut repo = MockProductRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(Some(widget())));
        repo.expect_update().never();

        let errors = validation_errors(
            ProductService::new(repo)
                .update_product(id(), payload(json!({ "price": -1 })))
                .await,
        );
        assert_eq!(errors, vec!["Price cannot be negative"]);
    }

    #[tokio::test]
    async fn test_update_missing_product() {
        let mut repo = MockProductRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));
        repo.expect_update().never();

        let result = ProductService::new(repo)
            .update_product(id(), ProductPayload::default())
            .await;
        assert!(matches!(result, Err(ProductError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_deleted_concurrently_is_not_found() {
        let mut repo = MockProductRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(Some(widget())));
        repo.expect_update().returning(|_, _| Ok(None));

        let result = ProductService::new(repo)
            .update_product(id(), ProductPayload::default())
            .await;
        assert!(matches!(result, Err(ProductError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_returns_removed_product() {
        let mut repo = MockProductRepository::new();
        repo.expect_delete()
            .with(eq(id()))
            .times(1)
            .returning(|_| Ok(Some(widget())));

        let product = ProductService::new(repo).delete_product(id()).await.unwrap();
        assert_eq!(product.sku, "W1");
    }

    #[tokio::test]
    async fn test_lookups_build_filters() {
        let mut repo = MockProductRepository::new();
        repo.expect_find()
            .with(eq(ProductFilter::by_manufacturer("acme")))
            .times(1)
            .returning(|_| Ok(vec![widget()]));
        repo.expect_find()
            .with(eq(ProductFilter::by_category("tool")))
            .times(1)
            .returning(|_| Ok(vec![]));
        let service = ProductService::new(repo);

        assert_eq!(service.products_by_manufacturer("acme").await.unwrap().len(), 1);
        assert!(service.products_by_category("tool").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_translates_params() {
        let mut repo = MockProductRepository::new();
        repo.expect_find()
            .withf(|filter| {
                filter.constraints()
                    == [
                        Constraint::CategoryMatches("tool".to_string()),
                        Constraint::InStock,
                    ]
            })
            .returning(|_| Ok(vec![widget()]));

        let params = SearchParams {
            category: Some("tool".to_string()),
            in_stock: Some("true".to_string()),
            ..Default::default()
        };
        let products = ProductService::new(repo).search_products(&params).await.unwrap();
        assert_eq!(products.len(), 1);
    }

    #[tokio::test]
    async fn test_search_rejects_bad_price_before_querying() {
        let mut repo = MockProductRepository::new();
        repo.expect_find().never();

        let params = SearchParams {
            max_price: Some("cheap".to_string()),
            ..Default::default()
        };
        let result = ProductService::new(repo).search_products(&params).await;
        assert!(matches!(result, Err(ProductError::ValidationFailed(e)) if e == ["maxPrice must be a number"]));
    }

    #[tokio::test]
    async fn test_unexpected_failures_propagate() {
        let mut repo = MockProductRepository::new();
        repo.expect_find()
            .returning(|_| Err(ProductError::Unexpected("connection reset".into())));

        let result = ProductService::new(repo).list_products().await;
        assert!(matches!(result, Err(ProductError::Unexpected(_))));
    }
}
