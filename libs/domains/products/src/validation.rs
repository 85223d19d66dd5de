//! Field rules for products, declared on plain draft structs.
//!
//! A draft starts empty (create) or from a stored product (update), absorbs a
//! [`ProductPayload`] and is then validated into [`ProductFields`].

use regex::Regex;
use serde::Serialize;
use std::borrow::Cow;
use std::sync::LazyLock;
use validator::{Validate, ValidationError};

use crate::error::{ProductError, ProductResult};
use crate::models::{
    Contact, ContactPayload, Manufacturer, ManufacturerPayload, Product, ProductFields,
    ProductPayload,
};

/// Message for create requests without manufacturer contact details
pub const MISSING_MANUFACTURER_CONTACT: &str = "Manufacturer and contact information are required";

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    // Word characters are ASCII only
    Regex::new(r"(?-u)^\w+([.-]?\w+)*@\w+([.-]?\w+)*(\.\w{2,3})+$").expect("valid email pattern")
});

static WEBSITE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://.+\..+").expect("valid website pattern"));

fn validate_email(email: &str) -> Result<(), ValidationError> {
    // Emptiness is reported by the required rule
    if email.is_empty() || EMAIL_PATTERN.is_match(email) {
        return Ok(());
    }
    Err(ValidationError::new("email")
        .with_message(Cow::Borrowed("Please enter a valid email address")))
}

fn validate_website(website: &str) -> Result<(), ValidationError> {
    if website.is_empty() || WEBSITE_PATTERN.is_match(website) {
        return Ok(());
    }
    Err(ValidationError::new("url").with_message(Cow::Borrowed("Please enter a valid URL")))
}

/// Trimmed value, or `None` when nothing is left.
fn trimmed(value: String) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn require<T>(value: Option<T>, message: &str) -> ProductResult<T> {
    value.ok_or_else(|| ProductError::ValidationFailed(vec![message.to_string()]))
}

#[derive(Debug, Clone, Default, Validate)]
pub struct ProductDraft {
    #[validate(
        required(message = "Product name is required"),
        length(min = 1, message = "Product name is required")
    )]
    pub name: Option<String>,

    #[validate(
        required(message = "SKU is required"),
        length(min = 1, message = "SKU is required")
    )]
    pub sku: Option<String>,

    pub description: Option<String>,

    #[validate(
        required(message = "Price is required"),
        range(min = 0.0, message = "Price cannot be negative")
    )]
    pub price: Option<f64>,

    #[validate(
        required(message = "Category is required"),
        length(min = 1, message = "Category is required")
    )]
    pub category: Option<String>,

    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub amount_in_stock: i64,

    #[validate(required(message = "Manufacturer information is required"), nested)]
    pub manufacturer: Option<ManufacturerDraft>,
}

#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct ManufacturerDraft {
    #[validate(
        required(message = "Manufacturer name is required"),
        length(min = 1, message = "Manufacturer name is required")
    )]
    pub name: Option<String>,

    #[validate(
        required(message = "Manufacturer country is required"),
        length(min = 1, message = "Manufacturer country is required")
    )]
    pub country: Option<String>,

    #[validate(custom(function = "validate_website", message = "Please enter a valid URL"))]
    pub website: Option<String>,

    pub description: Option<String>,
    pub address: Option<String>,

    #[validate(required(message = "Manufacturer contact is required"), nested)]
    pub contact: Option<ContactDraft>,
}

#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct ContactDraft {
    #[validate(
        required(message = "Contact name is required"),
        length(min = 1, message = "Contact name is required")
    )]
    pub name: Option<String>,

    #[validate(
        required(message = "Contact email is required"),
        length(min = 1, message = "Contact email is required"),
        custom(function = "validate_email", message = "Please enter a valid email address")
    )]
    pub email: Option<String>,

    #[validate(
        required(message = "Contact phone is required"),
        length(min = 1, message = "Contact phone is required")
    )]
    pub phone: Option<String>,
}

impl ProductDraft {
    /// Shallow merge: supplied fields replace, nested objects merge field by field.
    pub fn merge(mut self, payload: ProductPayload) -> Self {
        if let Some(name) = payload.name {
            self.name = Some(name.trim().to_string());
        }
        if let Some(sku) = payload.sku {
            self.sku = Some(sku.trim().to_string());
        }
        if let Some(description) = payload.description {
            self.description = trimmed(description);
        }
        if let Some(price) = payload.price {
            self.price = Some(price);
        }
        if let Some(category) = payload.category {
            self.category = Some(category.trim().to_string());
        }
        if let Some(amount) = payload.amount_in_stock {
            self.amount_in_stock = amount;
        }
        if let Some(manufacturer) = payload.manufacturer {
            self.manufacturer = Some(self.manufacturer.unwrap_or_default().merge(manufacturer));
        }
        self
    }

    /// Run every rule and, if all pass, produce the storable fields.
    ///
    /// All violations are reported at once, sorted.
    pub fn into_fields(self) -> ProductResult<ProductFields> {
        self.validate()?;

        let manufacturer = require(self.manufacturer, "Manufacturer information is required")?;
        let contact = require(manufacturer.contact, "Manufacturer contact is required")?;

        Ok(ProductFields {
            name: require(self.name, "Product name is required")?,
            sku: require(self.sku, "SKU is required")?,
            description: self.description,
            price: require(self.price, "Price is required")?,
            category: require(self.category, "Category is required")?,
            amount_in_stock: self.amount_in_stock,
            manufacturer: Manufacturer {
                name: require(manufacturer.name, "Manufacturer name is required")?,
                country: require(manufacturer.country, "Manufacturer country is required")?,
                website: manufacturer.website,
                description: manufacturer.description,
                address: manufacturer.address,
                contact: Contact {
                    name: require(contact.name, "Contact name is required")?,
                    email: require(contact.email, "Contact email is required")?,
                    phone: require(contact.phone, "Contact phone is required")?,
                },
            },
        })
    }
}

impl ManufacturerDraft {
    fn merge(mut self, payload: ManufacturerPayload) -> Self {
        if let Some(name) = payload.name {
            self.name = Some(name);
        }
        if let Some(country) = payload.country {
            self.country = Some(country);
        }
        if let Some(website) = payload.website {
            self.website = trimmed(website);
        }
        if let Some(description) = payload.description {
            self.description = Some(description);
        }
        if let Some(address) = payload.address {
            self.address = Some(address);
        }
        if let Some(contact) = payload.contact {
            self.contact = Some(self.contact.unwrap_or_default().merge(contact));
        }
        self
    }
}

impl ContactDraft {
    fn merge(mut self, payload: ContactPayload) -> Self {
        if let Some(name) = payload.name {
            self.name = Some(name);
        }
        if let Some(email) = payload.email {
            self.email = Some(email);
        }
        if let Some(phone) = payload.phone {
            self.phone = Some(phone);
        }
        self
    }
}

impl From<&Product> for ProductDraft {
    fn from(product: &Product) -> Self {
        let manufacturer = &product.manufacturer;
        let contact = &manufacturer.contact;

        Self {
            name: Some(product.name.clone()),
            sku: Some(product.sku.clone()),
            description: product.description.clone(),
            price: Some(product.price),
            category: Some(product.category.clone()),
            amount_in_stock: product.amount_in_stock,
            manufacturer: Some(ManufacturerDraft {
                name: Some(manufacturer.name.clone()),
                country: Some(manufacturer.country.clone()),
                website: manufacturer.website.clone(),
                description: manufacturer.description.clone(),
                address: manufacturer.address.clone(),
                contact: Some(ContactDraft {
                    name: Some(contact.name.clone()),
                    email: Some(contact.email.clone()),
                    phone: Some(contact.phone.clone()),
                }),
            }),
        }
    }
}

/// True when the payload names both a manufacturer and its contact.
pub fn has_manufacturer_contact(payload: &ProductPayload) -> bool {
    payload
        .manufacturer
        .as_ref()
        .is_some_and(|m| m.contact.is_some())
}
