//! Products Domain
//!
//! CRUD and search over products stored in MongoDB.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, envelope mapping
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Merging, validation, search filters
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + MongoDB implementation)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entities, payloads
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_products::{
//!     handlers,
//!     mongodb::MongoProductRepository,
//!     service::ProductService,
//! };
//! use mongodb::Client;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::with_uri_str("mongodb://localhost:27017").await?;
//! let db = client.database("products");
//!
//! let repository = MongoProductRepository::new(&db);
//! repository.init_indexes().await?;
//!
//! let router = handlers::router(ProductService::new(repository));
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod query;
pub mod repository;
pub mod service;
pub mod validation;

// Re-export commonly used types
pub use error::{ProductError, ProductResult};
pub use handlers::ApiDoc;
pub use models::{
    Contact, ContactPayload, Manufacturer, ManufacturerPayload, Product, ProductFields, ProductId,
    ProductPayload,
};
pub use mongodb::MongoProductRepository;
pub use query::{Constraint, ProductFilter, SearchParams};
pub use repository::ProductRepository;
pub use service::ProductService;
