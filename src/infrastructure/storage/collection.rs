//! Collection handle over a [`DocumentStore`] with relation expansion

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::engine::{get_path, project};
use super::traits::DocumentStore;
use crate::domain::query::{
    CmpOp, Document, FilterExpr, FilterNode, FilterValue, QueryOptions, RelationKind,
    RelationSpec, ResourceCollection,
};
use crate::shared::DomainResult;

pub struct StoreCollection {
    store: Arc<dyn DocumentStore>,
    name: String,
}

impl StoreCollection {
    pub fn new(store: Arc<dyn DocumentStore>, name: impl Into<String>) -> Self {
        Self {
            store,
            name: name.into(),
        }
    }

    /// Documents of `collection` whose `field` is one of `values`.
    async fn find_in(
        &self,
        collection: &str,
        field: &str,
        values: Vec<String>,
    ) -> DomainResult<Vec<Document>> {
        if values.is_empty() {
            return Ok(Vec::new());
        }
        let mut ops = std::collections::BTreeMap::new();
        ops.insert(CmpOp::In, FilterValue::List(values));
        let options =
            QueryOptions::new().with_filter(FilterExpr::new().and(field, FilterNode::Compare(ops)));
        self.store.find(collection, &options).await
    }

    async fn expand(&self, docs: &mut [Document], relation: &RelationSpec) -> DomainResult<()> {
        let shape = |doc: Document| match &relation.select {
            Some(fields) => project(&doc, fields),
            None => doc,
        };

        match &relation.kind {
            RelationKind::BelongsTo => {
                let ids: Vec<String> = docs
                    .iter()
                    .filter_map(|d| get_path(d, &relation.path).and_then(Value::as_str))
                    .map(str::to_string)
                    .collect();
                let related: HashMap<String, Document> = self
                    .find_in(&relation.collection, "_id", ids)
                    .await?
                    .into_iter()
                    .filter_map(|d| {
                        let id = d.get("_id")?.as_str()?.to_string();
                        Some((id, shape(d)))
                    })
                    .collect();

                for doc in docs.iter_mut() {
                    let Some(id) = doc.get(&relation.path).and_then(Value::as_str) else {
                        continue;
                    };
                    let replacement = related
                        .get(id)
                        .map(|d| Value::Object(d.clone()))
                        .unwrap_or(Value::Null);
                    doc.insert(relation.path.clone(), replacement);
                }
            }
            RelationKind::HasMany { foreign_field } => {
                let ids: Vec<String> = docs
                    .iter()
                    .filter_map(|d| d.get("_id").and_then(Value::as_str))
                    .map(str::to_string)
                    .collect();
                let mut grouped: HashMap<String, Vec<Value>> = HashMap::new();
                for child in self.find_in(&relation.collection, foreign_field, ids).await? {
                    let Some(parent) = get_path(&child, foreign_field)
                        .and_then(Value::as_str)
                        .map(str::to_string)
                    else {
                        continue;
                    };
                    grouped
                        .entry(parent)
                        .or_default()
                        .push(Value::Object(shape(child)));
                }

                for doc in docs.iter_mut() {
                    let children = doc
                        .get("_id")
                        .and_then(Value::as_str)
                        .and_then(|id| grouped.get(id))
                        .cloned()
                        .unwrap_or_default();
                    doc.insert(relation.path.clone(), Value::Array(children));
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ResourceCollection for StoreCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn find(&self, options: &QueryOptions) -> DomainResult<Vec<Document>> {
        let mut docs = self.store.find(&self.name, options).await?;
        for relation in options.relations() {
            self.expand(&mut docs, relation).await?;
        }
        Ok(docs)
    }

    async fn count_documents(&self) -> DomainResult<u64> {
        self.store.count(&self.name, &FilterExpr::new()).await
    }
}
