//! In-memory storage for development and testing

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use super::engine;
use super::traits::{document_id, DocumentStore};
use crate::domain::query::{Document, FilterExpr, QueryOptions};
use crate::domain::{CreateUserDto, DomainError, DomainResult, User, UserRepositoryInterface};
use crate::infrastructure::crypto::password::hash_password;

struct Stored {
    seq: u64,
    doc: Document,
}

/// Documents keyed by `(collection, _id)`, kept in insertion order.
#[derive(Default)]
pub struct InMemoryDocumentStore {
    docs: DashMap<(String, String), Stored>,
    seq: AtomicU64,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn snapshot(&self, collection: &str) -> Vec<Document> {
        let mut rows: Vec<(u64, Document)> = self
            .docs
            .iter()
            .filter(|entry| entry.key().0 == collection)
            .map(|entry| (entry.value().seq, entry.value().doc.clone()))
            .collect();
        rows.sort_by_key(|(seq, _)| *seq);
        rows.into_iter().map(|(_, doc)| doc).collect()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn insert(&self, collection: &str, doc: Document) -> DomainResult<()> {
        let key = (collection.to_string(), document_id(&doc)?.to_string());
        match self.docs.entry(key) {
            Entry::Occupied(_) => Err(DomainError::Conflict("Duplicate value is provided".into())),
            Entry::Vacant(slot) => {
                let seq = self.seq.fetch_add(1, Ordering::SeqCst);
                slot.insert(Stored { seq, doc });
                Ok(())
            }
        }
    }

    async fn find_by_id(&self, collection: &str, id: &str) -> DomainResult<Option<Document>> {
        Ok(self
            .docs
            .get(&(collection.to_string(), id.to_string()))
            .map(|entry| entry.doc.clone()))
    }

    async fn replace(&self, collection: &str, doc: Document) -> DomainResult<bool> {
        let key = (collection.to_string(), document_id(&doc)?.to_string());
        match self.docs.get_mut(&key) {
            Some(mut entry) => {
                entry.doc = doc;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, collection: &str, id: &str) -> DomainResult<bool> {
        Ok(self
            .docs
            .remove(&(collection.to_string(), id.to_string()))
            .is_some())
    }

    async fn delete_many(&self, collection: &str, filter: &FilterExpr) -> DomainResult<u64> {
        let doomed = engine::filter_documents(self.snapshot(collection), filter)?;
        let mut removed = 0;
        for doc in &doomed {
            let key = (collection.to_string(), document_id(doc)?.to_string());
            if self.docs.remove(&key).is_some() {
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn find(&self, collection: &str, options: &QueryOptions) -> DomainResult<Vec<Document>> {
        engine::execute(self.snapshot(collection), options)
    }

    async fn count(&self, collection: &str, filter: &FilterExpr) -> DomainResult<u64> {
        Ok(engine::filter_documents(self.snapshot(collection), filter)?.len() as u64)
    }
}

/// Users keyed by id
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: DashMap<String, User>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepositoryInterface for InMemoryUserRepository {
    async fn create_user(&self, dto: CreateUserDto) -> DomainResult<User> {
        if self.users.iter().any(|u| u.email == dto.email) {
            return Err(DomainError::Conflict("Duplicate value is provided".into()));
        }
        let password_hash = hash_password(&dto.password)
            .map_err(|e| DomainError::Storage(format!("Failed to hash password: {}", e)))?;

        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            name: dto.name,
            email: dto.email,
            role: dto.role.unwrap_or_default(),
            password_hash,
            reset_password_token: None,
            reset_password_expire: None,
            created_at: Utc::now(),
        };
        self.users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn get_user_by_id(&self, id: &str) -> DomainResult<Option<User>> {
        Ok(self.users.get(id).map(|u| u.clone()))
    }

    async fn get_user_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        Ok(self
            .users
            .iter()
            .find(|u| u.email == email)
            .map(|u| u.value().clone()))
    }

    async fn get_user_by_reset_token(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<Option<User>> {
        Ok(self
            .users
            .iter()
            .find(|u| {
                u.reset_password_token.as_deref() == Some(token_hash)
                    && u.reset_password_expire.is_some_and(|expire| expire > now)
            })
            .map(|u| u.value().clone()))
    }

    async fn set_reset_token(
        &self,
        id: &str,
        token: Option<(String, DateTime<Utc>)>,
    ) -> DomainResult<()> {
        let mut user = self
            .users
            .get_mut(id)
            .ok_or_else(|| DomainError::NotFound("User not found".into()))?;
        let (hash, expire) = token.unzip();
        user.reset_password_token = hash;
        user.reset_password_expire = expire;
        Ok(())
    }

    async fn update_user_password(&self, id: &str, new_password_hash: &str) -> DomainResult<()> {
        let mut user = self
            .users
            .get_mut(id)
            .ok_or_else(|| DomainError::NotFound("User not found".into()))?;
        user.password_hash = new_password_hash.to_string();
        Ok(())
    }

    async fn count_users(&self) -> DomainResult<u64> {
        Ok(self.users.len() as u64)
    }

    async fn delete_all_users(&self) -> DomainResult<u64> {
        let removed = self.users.len() as u64;
        self.users.clear();
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::query::{RequestQuery, build_options};
    use crate::domain::UserRole;

    fn doc(id: &str, tuition: u64) -> Document {
        json!({ "_id": id, "tuition": tuition, "createdAt": format!("2024-01-0{id}T00:00:00Z") })
            .as_object()
            .cloned()
            .unwrap()
    }

    #[tokio::test]
    async fn insert_find_replace_delete() {
        let store = InMemoryDocumentStore::new();
        store.insert("courses", doc("1", 100)).await.unwrap();
        assert!(store.insert("courses", doc("1", 100)).await.is_err());

        let mut updated = doc("1", 250);
        updated.insert("title".into(), json!("Rust"));
        assert!(store.replace("courses", updated).await.unwrap());
        let found = store.find_by_id("courses", "1").await.unwrap().unwrap();
        assert_eq!(found["tuition"], 250);

        assert!(!store.replace("courses", doc("9", 1)).await.unwrap());
        assert!(store.delete("courses", "1").await.unwrap());
        assert!(store.find_by_id("courses", "1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn collections_are_isolated() {
        let store = InMemoryDocumentStore::new();
        store.insert("courses", doc("1", 100)).await.unwrap();
        store.insert("bootcamps", doc("1", 5)).await.unwrap();
        assert_eq!(store.count("courses", &FilterExpr::new()).await.unwrap(), 1);
        assert_eq!(
            store.find_by_id("bootcamps", "1").await.unwrap().unwrap()["tuition"],
            5
        );
    }

    #[tokio::test]
    async fn find_and_delete_many_use_the_engine() {
        let store = InMemoryDocumentStore::new();
        for (id, tuition) in [("1", 100), ("2", 200), ("3", 300)] {
            store.insert("courses", doc(id, tuition)).await.unwrap();
        }

        let query = RequestQuery::from_pairs([("tuition[gte]", "200")]);
        let found = store.find("courses", &build_options(&query, &[])).await.unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0]["_id"], "3");

        let filter = FilterExpr::eq("tuition", "100");
        assert_eq!(store.delete_many("courses", &filter).await.unwrap(), 1);
        assert_eq!(store.count("courses", &FilterExpr::new()).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn user_reset_token_expires() {
        let repo = InMemoryUserRepository::new();
        let user = repo
            .create_user(CreateUserDto {
                name: "Jane".into(),
                email: "jane@example.com".into(),
                role: Some(UserRole::Publisher),
                password: "123456".into(),
            })
            .await
            .unwrap();
        assert_eq!(user.role, UserRole::Publisher);

        let expire = Utc::now() + chrono::Duration::minutes(10);
        repo.set_reset_token(&user.id, Some(("hash".into(), expire)))
            .await
            .unwrap();

        assert!(repo
            .get_user_by_reset_token("hash", Utc::now())
            .await
            .unwrap()
            .is_some());
        assert!(repo
            .get_user_by_reset_token("hash", expire + chrono::Duration::seconds(1))
            .await
            .unwrap()
            .is_none());

        repo.set_reset_token(&user.id, None).await.unwrap();
        assert!(repo
            .get_user_by_reset_token("hash", Utc::now())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let repo = InMemoryUserRepository::new();
        let dto = CreateUserDto {
            name: "A".into(),
            email: "a@example.com".into(),
            role: None,
            password: "123456".into(),
        };
        repo.create_user(dto.clone()).await.unwrap();
        assert!(matches!(
            repo.create_user(dto).await,
            Err(DomainError::Conflict(_))
        ));
    }
}
