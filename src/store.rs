//! MongoDB-backed task store.
//!
//! One long-lived client is acquired at startup and handed to the API layer.
//! Every service operation maps to exactly one driver call; the bid counter
//! uses an atomic find-and-update so concurrent bids never lose increments.

use futures::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{doc, Document};
use mongodb::options::{ClientOptions, ReturnDocument, ServerApi, ServerApiVersion};
use mongodb::{Client, Collection};

use crate::config::Config;

/// How many tasks the featured listing returns.
pub const FEATURED_LIMIT: i64 = 6;

/// Outcome of a field-set replacement.
#[derive(Debug, Clone, Copy)]
pub struct ReplaceOutcome {
    pub matched: u64,
    pub modified: u64,
}

/// Handle to the tasks collection.
#[derive(Clone)]
pub struct TaskStore {
    tasks: Collection<Document>,
}

impl TaskStore {
    /// Connect to the store, pinning the Stable API version, and ping the
    /// server so an unreachable deployment fails at startup instead of on the
    /// first request.
    pub async fn connect(config: &Config) -> mongodb::error::Result<Self> {
        let mut options = ClientOptions::parse(&config.mongodb_uri).await?;
        options.server_api = Some(ServerApi::builder().version(ServerApiVersion::V1).build());
        options.app_name = Some(env!("CARGO_PKG_NAME").to_string());
        let client = Client::with_options(options)?;

        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;
        tracing::info!(
            "Connected to document store, using {}.{}",
            config.db_name,
            config.collection_name
        );

        Ok(Self::with_client(
            &client,
            &config.db_name,
            &config.collection_name,
        ))
    }

    /// Wrap an existing client. The driver connects lazily, so this never
    /// touches the network.
    pub fn with_client(client: &Client, db: &str, collection: &str) -> Self {
        Self {
            tasks: client.database(db).collection(collection),
        }
    }

    // ==================== Reads ====================

    /// Fetch every task in the store's natural order.
    pub async fn list(&self) -> mongodb::error::Result<Vec<Document>> {
        self.tasks.find(doc! {}).await?.try_collect().await
    }

    /// The tasks with the nearest deadlines, earliest first, capped at
    /// [`FEATURED_LIMIT`].
    pub async fn featured(&self) -> mongodb::error::Result<Vec<Document>> {
        self.tasks
            .find(doc! {})
            .sort(doc! { "deadline": 1 })
            .limit(FEATURED_LIMIT)
            .await?
            .try_collect()
            .await
    }

    /// Tasks posted by one user, most distant deadline first.
    pub async fn posted_by(&self, user_email: &str) -> mongodb::error::Result<Vec<Document>> {
        self.tasks
            .find(doc! { "userEmail": user_email })
            .sort(doc! { "deadline": -1 })
            .await?
            .try_collect()
            .await
    }

    /// Fetch one task by identifier.
    pub async fn find_by_id(&self, id: ObjectId) -> mongodb::error::Result<Option<Document>> {
        self.tasks.find_one(doc! { "_id": id }).await
    }

    // ==================== Writes ====================

    /// Insert a new task and return its generated identifier.
    pub async fn insert(&self, mut task: Document) -> mongodb::error::Result<ObjectId> {
        let id = ObjectId::new();
        task.insert("_id", id);
        self.tasks.insert_one(task).await?;
        Ok(id)
    }

    /// Atomically bump the bid counter and return the updated task.
    ///
    /// A single find-and-update, never a read followed by a write: two bids
    /// racing on the same task must both be counted. `None` means no task
    /// carries this identifier.
    pub async fn increment_bids(&self, id: ObjectId) -> mongodb::error::Result<Option<Document>> {
        self.tasks
            .find_one_and_update(doc! { "_id": id }, doc! { "$inc": { "bids": 1 } })
            .return_document(ReturnDocument::After)
            .await
    }

    /// Overwrite the given top-level fields on one task. Fields not named in
    /// `fields` keep their stored values.
    pub async fn replace_fields(
        &self,
        id: ObjectId,
        fields: Document,
    ) -> mongodb::error::Result<ReplaceOutcome> {
        let result = self
            .tasks
            .update_one(doc! { "_id": id }, doc! { "$set": fields })
            .await?;
        Ok(ReplaceOutcome {
            matched: result.matched_count,
            modified: result.modified_count,
        })
    }

    /// Delete one task. Returns `false` when nothing matched.
    pub async fn delete(&self, id: ObjectId) -> mongodb::error::Result<bool> {
        let result = self.tasks.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }
}
