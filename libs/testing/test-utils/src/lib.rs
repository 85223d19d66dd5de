//! Shared test utilities for the products service
//!
//! - `TestMongo`: MongoDB container with automatic cleanup (feature: "mongo")
//! - `TestDataBuilder`: deterministic test data generation (always available)
//! - `assertions`: custom assertion helpers (always available)
//!
//! # Features
//!
//! - `mongo` (default): MongoDB test infrastructure via testcontainers
//!
//! # Usage
//!
//! ```rust,no_run
//! use test_utils::{TestDataBuilder, TestMongo};
//!
//! #[tokio::test]
//! #[ignore]
//! async fn my_mongo_test() {
//!     let mongo = TestMongo::new().await;
//!     let builder = TestDataBuilder::from_test_name("my_mongo_test");
//!
//!     let db = mongo.database(&builder.database_name());
//!     let sku = builder.sku("main");
//! }
//! ```

#[cfg(feature = "mongo")]
mod mongo;

#[cfg(feature = "mongo")]
pub use mongo::TestMongo;

/// Builder for test data with deterministic randomization
///
/// The same seed always yields the same names, SKUs and identifiers, so failures reproduce.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Create from test name (seed is the hash of the name)
    ///
    /// # Example
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::from_test_name("test_create_product");
    /// ```
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// A unique name, e.g. `test-product-12345-main`
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::new(7);
    /// assert_eq!(builder.name("product", "main"), "test-product-7-main");
    /// ```
    pub fn name(&self, prefix: &str, suffix: &str) -> String {
        format!("test-{}-{}-{}", prefix, self.seed, suffix)
    }

    /// A unique SKU, e.g. `SKU-12345-MAIN`
    pub fn sku(&self, suffix: &str) -> String {
        format!("SKU-{}-{}", self.seed, suffix.to_uppercase())
    }

    /// Database name private to this test, within MongoDB's 63 byte limit
    pub fn database_name(&self) -> String {
        format!("test_{:016x}", self.seed)
    }

    /// A well-formed 24 hex digit identifier derived from the seed
    pub fn object_id_hex(&self) -> String {
        format!("{:08x}{:016x}", (self.seed >> 32) as u32, self.seed)
    }
}

/// Test assertion helpers
pub mod assertions {
    /// Assert that an optional value is Some
    pub fn assert_some<T>(value: Option<T>, context: &str) -> T {
        value.unwrap_or_else(|| panic!("{}: expected Some, got None", context))
    }

    /// Assert that every item satisfies `predicate`, naming the first offender
    pub fn assert_all<T: std::fmt::Debug>(items: &[T], context: &str, predicate: impl Fn(&T) -> bool) {
        if let Some(bad) = items.iter().find(|item| !predicate(item)) {
            panic!("{}: unexpected item {:?}", context, bad);
        }
    }
}
