pub mod documents;
pub mod memory;

use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::IndexOptions;
use mongodb::{Client, Database, IndexModel};
use thiserror::Error;

pub use memory::MemoryStore;

/// MongoDB duplicate key write error
const DUPLICATE_KEY_CODE: i32 = 11000;

/// Logical collections of the scholarship database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Scholarships,
    Applications,
    Reviews,
    Users,
    Payments,
}

impl Collection {
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Scholarships => "scholarships",
            Collection::Applications => "applications",
            Collection::Reviews => "reviews",
            Collection::Users => "users",
            Collection::Payments => "payments",
        }
    }
}

/// Field combinations that must be unique per collection.
///
/// Inserts violating one of these fail with [`StoreError::DuplicateKey`],
/// which replaces the racy find-then-insert checks for users and applications.
pub const UNIQUE_INDEXES: &[(Collection, &[&str])] = &[
    (Collection::Users, &["email"]),
    (Collection::Applications, &["userEmail", "scholarshipId"]),
];

/// Plain query indexes, created at start-up on MongoDB only.
const QUERY_INDEXES: &[(Collection, &[&str])] = &[
    (Collection::Applications, &["createdAt"]),
    (Collection::Reviews, &["scholarshipId"]),
    (Collection::Reviews, &["userEmail"]),
    (Collection::Payments, &["userEmail", "paidAt"]),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub field: &'static str,
    pub descending: bool,
}

impl Sort {
    pub fn newest_first(field: &'static str) -> Self {
        Self { field, descending: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateOutcome {
    pub matched: u64,
    pub modified: u64,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate key: {0}")]
    DuplicateKey(String),
    #[error("{0}")]
    Backend(String),
}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        if let ErrorKind::Write(WriteFailure::WriteError(write_error)) = err.kind.as_ref() {
            if write_error.code == DUPLICATE_KEY_CODE {
                return StoreError::DuplicateKey(write_error.message.clone());
            }
        }
        StoreError::Backend(err.to_string())
    }
}

/// Typed access to the document collections.
///
/// Filters are equality matches on top-level fields. `update_one` merges the
/// given fields into the first matching document (`$set` semantics).
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find(
        &self,
        collection: Collection,
        filter: Document,
        sort: Option<Sort>,
    ) -> Result<Vec<Document>, StoreError>;

    async fn find_one(
        &self,
        collection: Collection,
        filter: Document,
    ) -> Result<Option<Document>, StoreError>;

    async fn insert_one(
        &self,
        collection: Collection,
        document: Document,
    ) -> Result<ObjectId, StoreError>;

    async fn update_one(
        &self,
        collection: Collection,
        filter: Document,
        fields: Document,
    ) -> Result<UpdateOutcome, StoreError>;

    async fn delete_one(&self, collection: Collection, filter: Document) -> Result<u64, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

#[derive(Clone)]
pub struct MongoDB {
    client: Client,
    db: Database,
}

impl MongoDB {
    pub async fn new(uri: &str, db_name: &str) -> Result<Self, StoreError> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        // Connection pool
        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(5);
        client_options.max_idle_time = Some(std::time::Duration::from_secs(300));

        client_options.connect_timeout = Some(std::time::Duration::from_secs(5));
        client_options.server_selection_timeout = Some(std::time::Duration::from_secs(5));
        client_options.app_name = Some("scholarship-service".to_string());

        let client = Client::with_options(client_options)?;
        let db = client.database(db_name);

        let mongodb = Self { client, db };
        mongodb.ping().await?;
        log::info!("✅ Pinged deployment, connected to database {}", db_name);

        mongodb.ensure_indexes().await?;

        Ok(mongodb)
    }

    /// Creates query and uniqueness indexes.
    ///
    /// Query index failures are logged. A unique index that cannot be built
    /// (usually pre-existing duplicates) aborts start-up, since inserts would
    /// no longer be deduplicated.
    async fn ensure_indexes(&self) -> Result<(), StoreError> {
        log::info!("🔧 Creating database indexes...");

        for (collection, fields) in QUERY_INDEXES {
            let model = IndexModel::builder().keys(index_keys(fields)).build();
            match self.collection(*collection).create_index(model).await {
                Ok(_) => log::info!("   ✅ Index created: {}({})", collection.name(), fields.join(", ")),
                Err(e) => log::warn!("   ⚠️  Index {}({}) not created: {}", collection.name(), fields.join(", "), e),
            }
        }

        for (collection, fields) in UNIQUE_INDEXES {
            let model = IndexModel::builder()
                .keys(index_keys(fields))
                .options(IndexOptions::builder().unique(true).build())
                .build();
            if let Err(e) = self.collection(*collection).create_index(model).await {
                log::error!(
                    "❌ Unique index on {}({}) not created: {}",
                    collection.name(),
                    fields.join(", "),
                    e
                );
                return Err(StoreError::Backend(format!(
                    "unique index on {}({}) could not be created: {}",
                    collection.name(),
                    fields.join(", "),
                    e
                )));
            }
            log::info!("   ✅ Unique index created: {}({})", collection.name(), fields.join(", "));
        }

        log::info!("✅ Database indexes ready");
        Ok(())
    }

    fn collection(&self, collection: Collection) -> mongodb::Collection<Document> {
        self.db.collection(collection.name())
    }
}

fn index_keys(fields: &[&str]) -> Document {
    let mut keys = Document::new();
    for field in fields {
        keys.insert(*field, 1);
    }
    keys
}

#[async_trait]
impl DocumentStore for MongoDB {
    async fn find(
        &self,
        collection: Collection,
        filter: Document,
        sort: Option<Sort>,
    ) -> Result<Vec<Document>, StoreError> {
        let coll = self.collection(collection);
        let mut action = coll.find(filter);
        if let Some(sort) = sort {
            let mut order = Document::new();
            order.insert(sort.field, if sort.descending { -1 } else { 1 });
            action = action.sort(order);
        }

        let cursor = action.await?;
        let documents: Vec<Document> = cursor.try_collect().await?;
        Ok(documents)
    }

    async fn find_one(
        &self,
        collection: Collection,
        filter: Document,
    ) -> Result<Option<Document>, StoreError> {
        Ok(self.collection(collection).find_one(filter).await?)
    }

    async fn insert_one(
        &self,
        collection: Collection,
        document: Document,
    ) -> Result<ObjectId, StoreError> {
        let result = self.collection(collection).insert_one(document).await?;
        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| StoreError::Backend("inserted id is not an ObjectId".to_string()))
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: Document,
        fields: Document,
    ) -> Result<UpdateOutcome, StoreError> {
        let result = self
            .collection(collection)
            .update_one(filter, doc! { "$set": fields })
            .await?;

        Ok(UpdateOutcome {
            matched: result.matched_count,
            modified: result.modified_count,
        })
    }

    async fn delete_one(&self, collection: Collection, filter: Document) -> Result<u64, StoreError> {
        let result = self.collection(collection).delete_one(filter).await?;
        Ok(result.deleted_count)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;
        Ok(())
    }
}
