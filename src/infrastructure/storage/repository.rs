//! Typed repositories over a document collection

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::traits::DocumentStore;
use crate::domain::bootcamp::{self, Bootcamp, BootcampRepository};
use crate::domain::course::{self, Course, CourseRepository};
use crate::domain::query::{Document, FilterExpr, QueryOptions};
use crate::shared::{DomainError, DomainResult};

/// Serializes `T` to and from JSON documents in one collection.
pub struct DocumentRepository<T> {
    store: Arc<dyn DocumentStore>,
    collection: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> DocumentRepository<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    pub fn new(store: Arc<dyn DocumentStore>, collection: &'static str) -> Self {
        Self {
            store,
            collection,
            _marker: PhantomData,
        }
    }

    fn to_document(item: &T) -> DomainResult<Document> {
        match serde_json::to_value(item)? {
            Value::Object(map) => Ok(map),
            _ => Err(DomainError::Storage("Entity did not serialize to an object".into())),
        }
    }

    fn from_document(doc: Document) -> DomainResult<T> {
        Ok(serde_json::from_value(Value::Object(doc))?)
    }

    async fn insert(&self, item: &T) -> DomainResult<()> {
        self.store.insert(self.collection, Self::to_document(item)?).await
    }

    async fn get(&self, id: &str) -> DomainResult<Option<T>> {
        self.store
            .find_by_id(self.collection, id)
            .await?
            .map(Self::from_document)
            .transpose()
    }

    async fn find_where(&self, filter: FilterExpr, limit: Option<u64>) -> DomainResult<Vec<T>> {
        let mut options = QueryOptions::new().with_filter(filter);
        if let Some(limit) = limit {
            options = options.with_limit(limit);
        }
        self.store
            .find(self.collection, &options)
            .await?
            .into_iter()
            .map(Self::from_document)
            .collect()
    }

    async fn first_where(&self, filter: FilterExpr) -> DomainResult<Option<T>> {
        Ok(self.find_where(filter, Some(1)).await?.into_iter().next())
    }

    async fn replace(&self, item: &T, id: &str) -> DomainResult<()> {
        if self.store.replace(self.collection, Self::to_document(item)?).await? {
            Ok(())
        } else {
            Err(DomainError::NotFound(format!(
                "No {} document with id {}",
                self.collection, id
            )))
        }
    }

    async fn remove(&self, id: &str) -> DomainResult<()> {
        self.store.delete(self.collection, id).await?;
        Ok(())
    }

    async fn remove_where(&self, filter: &FilterExpr) -> DomainResult<u64> {
        self.store.delete_many(self.collection, filter).await
    }
}

pub fn bootcamp_repository(store: Arc<dyn DocumentStore>) -> DocumentRepository<Bootcamp> {
    DocumentRepository::new(store, bootcamp::COLLECTION)
}

pub fn course_repository(store: Arc<dyn DocumentStore>) -> DocumentRepository<Course> {
    DocumentRepository::new(store, course::COLLECTION)
}

#[async_trait]
impl BootcampRepository for DocumentRepository<Bootcamp> {
    async fn create(&self, bootcamp: &Bootcamp) -> DomainResult<()> {
        self.insert(bootcamp).await
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Bootcamp>> {
        self.get(id).await
    }

    async fn find_by_owner(&self, user_id: &str) -> DomainResult<Option<Bootcamp>> {
        self.first_where(FilterExpr::eq("user", user_id)).await
    }

    async fn find_by_name(&self, name: &str) -> DomainResult<Option<Bootcamp>> {
        self.first_where(FilterExpr::eq("name", name)).await
    }

    async fn find(&self, filter: FilterExpr) -> DomainResult<Vec<Bootcamp>> {
        self.find_where(filter, None).await
    }

    async fn update(&self, bootcamp: &Bootcamp) -> DomainResult<()> {
        self.replace(bootcamp, &bootcamp.id).await
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        self.remove(id).await
    }

    async fn delete_all(&self) -> DomainResult<u64> {
        self.remove_where(&FilterExpr::new()).await
    }
}

#[async_trait]
impl CourseRepository for DocumentRepository<Course> {
    async fn create(&self, course: &Course) -> DomainResult<()> {
        self.insert(course).await
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Course>> {
        self.get(id).await
    }

    async fn find_by_bootcamp(&self, bootcamp_id: &str) -> DomainResult<Vec<Course>> {
        self.find_where(FilterExpr::eq("bootcamp", bootcamp_id), None)
            .await
    }

    async fn update(&self, course: &Course) -> DomainResult<()> {
        self.replace(course, &course.id).await
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        self.remove(id).await
    }

    async fn delete_by_bootcamp(&self, bootcamp_id: &str) -> DomainResult<u64> {
        self.remove_where(&FilterExpr::eq("bootcamp", bootcamp_id))
            .await
    }

    async fn delete_all(&self) -> DomainResult<u64> {
        self.remove_where(&FilterExpr::new()).await
    }
}
