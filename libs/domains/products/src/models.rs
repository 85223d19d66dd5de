use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::error::ProductError;

/// Product identifier, a MongoDB ObjectId.
///
/// The textual form is the 24 hex digit string, which is also how it appears in JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProductId(ObjectId);

impl ProductId {
    /// A fresh identifier
    pub fn new() -> Self {
        Self(ObjectId::new())
    }

    pub fn as_object_id(&self) -> ObjectId {
        self.0
    }
}

impl Default for ProductId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ObjectId> for ProductId {
    fn from(id: ObjectId) -> Self {
        Self(id)
    }
}

impl FromStr for ProductId {
    type Err = ProductError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectId::parse_str(s)
            .map(Self)
            .map_err(|_| ProductError::InvalidIdentifier)
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_hex())
    }
}

impl Serialize for ProductId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_hex())
    }
}

impl<'de> Deserialize<'de> for ProductId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        ObjectId::parse_str(&raw)
            .map(Self)
            .map_err(serde::de::Error::custom)
    }
}

/// Person to reach at the manufacturer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Contact {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Manufacturer details, embedded in and owned by a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Manufacturer {
    pub name: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub contact: Contact,
}

/// Product entity as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[schema(value_type = String, example = "65f1c2a4e13b2a0012345678")]
    pub id: ProductId,
    pub name: String,
    /// Stock keeping unit, unique across products
    pub sku: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: f64,
    pub category: String,
    pub amount_in_stock: i64,
    pub manufacturer: Manufacturer,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Build a product from validated fields with fresh timestamps.
    pub fn new(id: ProductId, fields: ProductFields) -> Self {
        let now = Utc::now();
        Self::from_parts(id, fields, now, now)
    }

    pub fn from_parts(
        id: ProductId,
        fields: ProductFields,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: fields.name,
            sku: fields.sku,
            description: fields.description,
            price: fields.price,
            category: fields.category,
            amount_in_stock: fields.amount_in_stock,
            manufacturer: fields.manufacturer,
            created_at,
            updated_at,
        }
    }

    pub fn in_stock(&self) -> bool {
        self.amount_in_stock > 0
    }
}

/// The validated, user-controlled content of a product.
///
/// Only `validation::ProductDraft::into_fields` produces this, so holding one means every
/// field rule has passed.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductFields {
    pub name: String,
    pub sku: String,
    pub description: Option<String>,
    pub price: f64,
    pub category: String,
    pub amount_in_stock: i64,
    pub manufacturer: Manufacturer,
}

impl From<Product> for ProductFields {
    fn from(product: Product) -> Self {
        Self {
            name: product.name,
            sku: product.sku,
            description: product.description,
            price: product.price,
            category: product.category,
            amount_in_stock: product.amount_in_stock,
            manufacturer: product.manufacturer,
        }
    }
}

/// Request body for create and update.
///
/// Every field is optional: create requires the full set after validation, update
/// applies whichever fields are present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "Widget")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "W1")]
    pub sku: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = 15.0)]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "Tools")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = 3)]
    pub amount_in_stock: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<ManufacturerPayload>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ManufacturerPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// An empty string clears the website
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<ContactPayload>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ContactPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}
