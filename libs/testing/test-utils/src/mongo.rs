//! MongoDB test infrastructure
//!
//! Provides a `TestMongo` helper backed by a throwaway MongoDB container.

use mongodb::{Client, Database};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::mongo::Mongo;

/// Test MongoDB wrapper; the container is stopped and removed on drop.
///
/// # Example
///
/// ```no_run
/// use test_utils::TestMongo;
///
/// # async fn example() {
/// let mongo = TestMongo::new().await;
/// let db = mongo.database("products_test");
/// // Hand `db` to the repository under test
/// # }
/// ```
pub struct TestMongo {
    #[allow(dead_code)]
    container: ContainerAsync<Mongo>,
    client: Client,
    pub connection_string: String,
}

impl TestMongo {
    /// Start a MongoDB 7 container and connect to it.
    pub async fn new() -> Self {
        let container = Mongo::default()
            .with_tag("7")
            .start()
            .await
            .expect("Failed to start MongoDB container");

        let host_port = container
            .get_host_port_ipv4(27017)
            .await
            .expect("Failed to get MongoDB port");

        let connection_string = format!("mongodb://127.0.0.1:{}", host_port);

        let client = Client::with_uri_str(&connection_string)
            .await
            .expect("Failed to create MongoDB client");

        tracing::info!(port = host_port, "Test MongoDB ready (mongo:7)");

        Self {
            container,
            client,
            connection_string,
        }
    }

    pub fn client(&self) -> Client {
        self.client.clone()
    }

    /// A database handle; use a distinct name per test to keep data isolated.
    pub fn database(&self, name: &str) -> Database {
        self.client.database(name)
    }

    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }
}

impl Drop for TestMongo {
    fn drop(&mut self) {
        tracing::debug!("Cleaning up test MongoDB container");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{Document, doc};

    #[tokio::test]
    #[ignore] // Requires Docker
    async fn test_mongo_insert_and_find() {
        let mongo = TestMongo::new().await;
        let collection = mongo.database("test_utils").collection::<Document>("things");

        collection
            .insert_one(doc! { "sku": "W1", "price": 15.0 })
            .await
            .unwrap();

        let found = collection.find_one(doc! { "sku": "W1" }).await.unwrap();
        assert_eq!(found.unwrap().get_f64("price").unwrap(), 15.0);
    }
}
