//! MongoDB implementation of ProductRepository

use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{self, Document, doc, oid::ObjectId},
    error::{ErrorKind, WriteFailure},
    options::{IndexOptions, ReturnDocument},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{ProductError, ProductResult};
use crate::models::{Manufacturer, Product, ProductFields, ProductId};
use crate::query::ProductFilter;
use crate::repository::ProductRepository;

pub const COLLECTION_NAME: &str = "products";

const DUPLICATE_KEY_CODE: i32 = 11000;

fn to_chrono(value: bson::DateTime) -> chrono::DateTime<Utc> {
    chrono::DateTime::from_timestamp_millis(value.timestamp_millis()).unwrap_or_default()
}

/// Stored shape of a product
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    name: String,
    sku: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    price: f64,
    category: String,
    amount_in_stock: i64,
    manufacturer: Manufacturer,
    created_at: bson::DateTime,
    updated_at: bson::DateTime,
}

impl ProductDocument {
    fn new(fields: ProductFields) -> Self {
        let now = bson::DateTime::now();
        Self {
            id: ObjectId::new(),
            name: fields.name,
            sku: fields.sku,
            description: fields.description,
            price: fields.price,
            category: fields.category,
            amount_in_stock: fields.amount_in_stock,
            manufacturer: fields.manufacturer,
            created_at: now,
            updated_at: now,
        }
    }

    fn into_product(self) -> Product {
        Product::from_parts(
            ProductId::from(self.id),
            ProductFields {
                name: self.name,
                sku: self.sku,
                description: self.description,
                price: self.price,
                category: self.category,
                amount_in_stock: self.amount_in_stock,
                manufacturer: self.manufacturer,
            },
            to_chrono(self.created_at),
            to_chrono(self.updated_at),
        )
    }
}

/// `$set` (and, for a cleared description, `$unset`) replacing every user field.
///
/// `createdAt` is never touched.
fn update_document(fields: ProductFields, now: bson::DateTime) -> ProductResult<Document> {
    let manufacturer = bson::to_bson(&fields.manufacturer)
        .map_err(|e| ProductError::Unexpected(e.to_string()))?;

    let mut set = doc! {
        "name": fields.name,
        "sku": fields.sku,
        "price": fields.price,
        "category": fields.category,
        "amountInStock": fields.amount_in_stock,
        "manufacturer": manufacturer,
        "updatedAt": now,
    };

    let mut update = Document::new();
    match fields.description {
        Some(description) => {
            set.insert("description", description);
        }
        None => {
            update.insert("$unset", doc! { "description": "" });
        }
    }
    update.insert("$set", set);
    Ok(update)
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(e)) => e.code == DUPLICATE_KEY_CODE,
        ErrorKind::Command(e) => e.code == DUPLICATE_KEY_CODE,
        _ => false,
    }
}

fn map_write_error(err: mongodb::error::Error, sku: &str) -> ProductError {
    if is_duplicate_key(&err) {
        ProductError::DuplicateKey(sku.to_string())
    } else {
        ProductError::from(err)
    }
}

/// MongoDB implementation of the ProductRepository
pub struct MongoProductRepository {
    collection: Collection<ProductDocument>,
}

impl MongoProductRepository {
    pub fn new(db: &Database) -> Self {
        Self::with_collection(db, COLLECTION_NAME)
    }

    pub fn with_collection(db: &Database, collection_name: &str) -> Self {
        let collection = db.collection::<ProductDocument>(collection_name);
        Self { collection }
    }

    /// Create the unique SKU index plus lookup indexes.
    ///
    /// Idempotent; SKU uniqueness relies on this having run.
    pub async fn init_indexes(&self) -> ProductResult<()> {
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "sku": 1 })
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .name("idx_sku_unique".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "category": 1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_category".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "manufacturer.name": 1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_manufacturer_name".to_string())
                        .build(),
                )
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("Product indexes created successfully");
        Ok(())
    }
}

#[async_trait]
impl ProductRepository for MongoProductRepository {
    #[instrument(skip(self, fields), fields(sku = %fields.sku))]
    async fn insert(&self, fields: ProductFields) -> ProductResult<Product> {
        let document = ProductDocument::new(fields);

        self.collection
            .insert_one(&document)
            .await
            .map_err(|e| map_write_error(e, &document.sku))?;

        tracing::info!(product_id = %document.id, "Product created successfully");
        Ok(document.into_product())
    }

    #[instrument(skip(self))]
    async fn find(&self, filter: ProductFilter) -> ProductResult<Vec<Product>> {
        let cursor = self.collection.find(filter.to_document()).await?;
        let documents: Vec<ProductDocument> = cursor.try_collect().await?;
        Ok(documents.into_iter().map(ProductDocument::into_product).collect())
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: ProductId) -> ProductResult<Option<Product>> {
        let document = self
            .collection
            .find_one(doc! { "_id": id.as_object_id() })
            .await?;
        Ok(document.map(ProductDocument::into_product))
    }

    #[instrument(skip(self, fields), fields(sku = %fields.sku))]
    async fn update(
        &self,
        id: ProductId,
        fields: ProductFields,
    ) -> ProductResult<Option<Product>> {
        let sku = fields.sku.clone();
        let update = update_document(fields, bson::DateTime::now())?;

        let document = self
            .collection
            .find_one_and_update(doc! { "_id": id.as_object_id() }, update)
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| map_write_error(e, &sku))?;

        if document.is_some() {
            tracing::info!(product_id = %id, "Product updated successfully");
        }
        Ok(document.map(ProductDocument::into_product))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: ProductId) -> ProductResult<Option<Product>> {
        let document = self
            .collection
            .find_one_and_delete(doc! { "_id": id.as_object_id() })
            .await?;

        if document.is_some() {
            tracing::info!(product_id = %id, "Product deleted successfully");
        }
        Ok(document.map(ProductDocument::into_product))
    }
}
