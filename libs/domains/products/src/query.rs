//! Product filters, built from search query parameters or fixed lookups.

use mongodb::bson::{Document, doc};
use regex::RegexBuilder;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::ProductError;
use crate::models::Product;

/// Query string of `GET /search`. Every parameter is optional.
///
/// Prices arrive as text so that a malformed number is reported as a validation
/// failure rather than a generic parse error.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Case-insensitive substring of the product name
    pub name: Option<String>,
    /// Case-insensitive substring of the category
    pub category: Option<String>,
    /// Case-insensitive substring of the manufacturer name
    pub manufacturer: Option<String>,
    /// Inclusive lower price bound
    #[param(value_type = Option<f64>)]
    pub min_price: Option<String>,
    /// Inclusive upper price bound
    #[param(value_type = Option<f64>)]
    pub max_price: Option<String>,
    /// Only `true` restricts to products with stock; anything else is ignored
    pub in_stock: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    NameMatches(String),
    CategoryMatches(String),
    ManufacturerMatches(String),
    PriceAtLeast(f64),
    PriceAtMost(f64),
    InStock,
}

/// Conjunction of constraints; empty matches every product.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    constraints: Vec<Constraint>,
}

impl ProductFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_manufacturer(name: impl Into<String>) -> Self {
        Self::default().with(Constraint::ManufacturerMatches(name.into()))
    }

    pub fn by_category(category: impl Into<String>) -> Self {
        Self::default().with(Constraint::CategoryMatches(category.into()))
    }

    pub fn with(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// MongoDB query document for this filter.
    ///
    /// Text constraints are literal substrings: regex metacharacters in the input are
    /// escaped before they reach the server.
    pub fn to_document(&self) -> Document {
        let mut query = Document::new();
        let mut price = Document::new();

        for constraint in &self.constraints {
            match constraint {
                Constraint::NameMatches(text) => {
                    query.insert("name", contains(text));
                }
                Constraint::CategoryMatches(text) => {
                    query.insert("category", contains(text));
                }
                Constraint::ManufacturerMatches(text) => {
                    query.insert("manufacturer.name", contains(text));
                }
                Constraint::PriceAtLeast(min) => {
                    price.insert("$gte", *min);
                }
                Constraint::PriceAtMost(max) => {
                    price.insert("$lte", *max);
                }
                Constraint::InStock => {
                    query.insert("amountInStock", doc! { "$gt": 0 });
                }
            }
        }

        if !price.is_empty() {
            query.insert("price", price);
        }
        query
    }

    /// Evaluate the filter in memory, with the same semantics as [`Self::to_document`].
    pub fn matches(&self, product: &Product) -> bool {
        self.constraints.iter().all(|constraint| match constraint {
            Constraint::NameMatches(text) => contains_ignore_case(&product.name, text),
            Constraint::CategoryMatches(text) => contains_ignore_case(&product.category, text),
            Constraint::ManufacturerMatches(text) => {
                contains_ignore_case(&product.manufacturer.name, text)
            }
            Constraint::PriceAtLeast(min) => product.price >= *min,
            Constraint::PriceAtMost(max) => product.price <= *max,
            Constraint::InStock => product.in_stock(),
        })
    }
}

fn contains(text: &str) -> Document {
    doc! { "$regex": regex::escape(text), "$options": "i" }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    RegexBuilder::new(&regex::escape(needle))
        .case_insensitive(true)
        .build()
        .map(|re| re.is_match(haystack))
        .unwrap_or(false)
}

/// Text exactly as sent, unless it is blank.
fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

fn parse_price(value: &str, param: &str) -> Result<f64, ProductError> {
    value
        .parse::<f64>()
        .ok()
        .filter(|price| price.is_finite())
        .ok_or_else(|| ProductError::ValidationFailed(vec![format!("{param} must be a number")]))
}

impl TryFrom<&SearchParams> for ProductFilter {
    type Error = ProductError;

    fn try_from(params: &SearchParams) -> Result<Self, Self::Error> {
        let mut filter = ProductFilter::all();

        if let Some(name) = non_blank(&params.name) {
            filter = filter.with(Constraint::NameMatches(name.to_string()));
        }
        if let Some(category) = non_blank(&params.category) {
            filter = filter.with(Constraint::CategoryMatches(category.to_string()));
        }
        if let Some(manufacturer) = non_blank(&params.manufacturer) {
            filter = filter.with(Constraint::ManufacturerMatches(manufacturer.to_string()));
        }

        let mut errors = Vec::new();
        if let Some(min) = non_blank(&params.min_price).map(str::trim) {
            match parse_price(min, "minPrice") {
                Ok(min) => filter = filter.with(Constraint::PriceAtLeast(min)),
                Err(ProductError::ValidationFailed(e)) => errors.extend(e),
                Err(e) => return Err(e),
            }
        }
        if let Some(max) = non_blank(&params.max_price).map(str::trim) {
            match parse_price(max, "maxPrice") {
                Ok(max) => filter = filter.with(Constraint::PriceAtMost(max)),
                Err(ProductError::ValidationFailed(e)) => errors.extend(e),
                Err(e) => return Err(e),
            }
        }
        if !errors.is_empty() {
            return Err(ProductError::ValidationFailed(errors));
        }

        if params.in_stock.as_deref() == Some("true") {
            filter = filter.with(Constraint::InStock);
        }

        Ok(filter)
    }
}
