//! SQLite-backed document store (SeaORM)
//!
//! Rows are loaded per collection and evaluated with the shared engine.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde_json::Value;

use super::engine;
use super::traits::{document_id, DocumentStore};
use crate::domain::query::{Document, FilterExpr, QueryOptions};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::document;

pub struct SqliteDocumentStore {
    db: DatabaseConnection,
}

impl SqliteDocumentStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn load(&self, collection: &str) -> DomainResult<Vec<Document>> {
        let rows = document::Entity::find()
            .filter(document::Column::Collection.eq(collection))
            .order_by_asc(document::Column::CreatedAt)
            .order_by_asc(document::Column::Id)
            .all(&self.db)
            .await?;
        rows.into_iter().map(|row| parse_body(&row.body)).collect()
    }
}

fn parse_body(body: &str) -> DomainResult<Document> {
    match serde_json::from_str::<Value>(body)? {
        Value::Object(map) => Ok(map),
        _ => Err(DomainError::Storage("Stored document is not a JSON object".into())),
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn insert(&self, collection: &str, doc: Document) -> DomainResult<()> {
        let id = document_id(&doc)?.to_string();
        document::ActiveModel {
            collection: Set(collection.to_string()),
            id: Set(id),
            body: Set(serde_json::to_string(&doc)?),
            created_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await?;
        Ok(())
    }

    async fn find_by_id(&self, collection: &str, id: &str) -> DomainResult<Option<Document>> {
        let row = document::Entity::find_by_id((collection.to_string(), id.to_string()))
            .one(&self.db)
            .await?;
        row.map(|r| parse_body(&r.body)).transpose()
    }

    async fn replace(&self, collection: &str, doc: Document) -> DomainResult<bool> {
        let id = document_id(&doc)?.to_string();
        let Some(row) = document::Entity::find_by_id((collection.to_string(), id))
            .one(&self.db)
            .await?
        else {
            return Ok(false);
        };
        let mut active: document::ActiveModel = row.into();
        active.body = Set(serde_json::to_string(&doc)?);
        active.update(&self.db).await?;
        Ok(true)
    }

    async fn delete(&self, collection: &str, id: &str) -> DomainResult<bool> {
        let result = document::Entity::delete_by_id((collection.to_string(), id.to_string()))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn delete_many(&self, collection: &str, filter: &FilterExpr) -> DomainResult<u64> {
        if filter.is_empty() {
            let result = document::Entity::delete_many()
                .filter(document::Column::Collection.eq(collection))
                .exec(&self.db)
                .await?;
            return Ok(result.rows_affected);
        }

        let ids: Vec<String> = engine::filter_documents(self.load(collection).await?, filter)?
            .iter()
            .filter_map(|doc| doc.get("_id").and_then(Value::as_str).map(str::to_string))
            .collect();
        if ids.is_empty() {
            return Ok(0);
        }

        let result = document::Entity::delete_many()
            .filter(document::Column::Collection.eq(collection))
            .filter(document::Column::Id.is_in(ids))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }

    async fn find(&self, collection: &str, options: &QueryOptions) -> DomainResult<Vec<Document>> {
        engine::execute(self.load(collection).await?, options)
    }

    async fn count(&self, collection: &str, filter: &FilterExpr) -> DomainResult<u64> {
        Ok(engine::filter_documents(self.load(collection).await?, filter)?.len() as u64)
    }
}
