//! Immutable query description handed to a collection handle.

use super::filter::FilterExpr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub order: Order,
}

impl SortSpec {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: Order::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: Order::Desc,
        }
    }

    /// `name` ascending, `-name` descending.
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        match token.strip_prefix('-') {
            Some("") => None,
            Some(field) => Some(Self::desc(field)),
            None if token.is_empty() => None,
            None => Some(Self::asc(token.trim_start_matches('+'))),
        }
    }

    pub fn parse_list<S: AsRef<str>>(tokens: &[S]) -> Vec<Self> {
        tokens.iter().filter_map(|t| Self::parse(t.as_ref())).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationKind {
    /// Field holds the related document's `_id`.
    BelongsTo,
    /// Related documents point back through `foreign_field`.
    HasMany { foreign_field: String },
}

/// A related field to resolve eagerly when the query executes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationSpec {
    pub path: String,
    pub collection: String,
    pub kind: RelationKind,
    pub select: Option<Vec<String>>,
}

impl RelationSpec {
    pub fn belongs_to(path: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            collection: collection.into(),
            kind: RelationKind::BelongsTo,
            select: None,
        }
    }

    pub fn has_many(
        path: impl Into<String>,
        collection: impl Into<String>,
        foreign_field: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            collection: collection.into(),
            kind: RelationKind::HasMany {
                foreign_field: foreign_field.into(),
            },
            select: None,
        }
    }

    pub fn with_select(mut self, fields: &[&str]) -> Self {
        self.select = Some(fields.iter().map(|f| f.to_string()).collect());
        self
    }
}

/// Filter, projection, sort, window and relations for one read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOptions {
    filter: FilterExpr,
    projection: Option<Vec<String>>,
    sort: Vec<SortSpec>,
    skip: u64,
    limit: Option<u64>,
    relations: Vec<RelationSpec>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(self, filter: FilterExpr) -> Self {
        Self { filter, ..self }
    }

    pub fn with_projection(self, fields: Vec<String>) -> Self {
        Self {
            projection: Some(fields),
            ..self
        }
    }

    pub fn with_sort(self, sort: Vec<SortSpec>) -> Self {
        Self { sort, ..self }
    }

    pub fn with_skip(self, skip: u64) -> Self {
        Self { skip, ..self }
    }

    pub fn with_limit(self, limit: u64) -> Self {
        Self {
            limit: Some(limit),
            ..self
        }
    }

    pub fn with_relations(self, relations: Vec<RelationSpec>) -> Self {
        Self { relations, ..self }
    }

    pub fn filter(&self) -> &FilterExpr {
        &self.filter
    }

    pub fn projection(&self) -> Option<&[String]> {
        self.projection.as_deref()
    }

    pub fn sort(&self) -> &[SortSpec] {
        &self.sort
    }

    pub fn skip(&self) -> u64 {
        self.skip
    }

    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    pub fn relations(&self) -> &[RelationSpec] {
        &self.relations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_tokens() {
        assert_eq!(SortSpec::parse("-createdAt"), Some(SortSpec::desc("createdAt")));
        assert_eq!(SortSpec::parse("name"), Some(SortSpec::asc("name")));
        assert_eq!(SortSpec::parse("-"), None);
        assert_eq!(SortSpec::parse(" "), None);
    }

    #[test]
    fn builder_returns_new_values() {
        let base = QueryOptions::new().with_limit(5);
        let paged = base.clone().with_skip(10);
        assert_eq!(base.skip(), 0);
        assert_eq!(paged.skip(), 10);
        assert_eq!(paged.limit(), Some(5));
    }

    #[test]
    fn relation_select() {
        let rel = RelationSpec::belongs_to("bootcamp", "bootcamps").with_select(&["name"]);
        assert_eq!(rel.select, Some(vec!["name".to_string()]));
        assert_eq!(rel.kind, RelationKind::BelongsTo);
    }
}
