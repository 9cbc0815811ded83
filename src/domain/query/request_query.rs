//! Inbound list-request parameters

use super::pagination::Pagination;

/// Control parameters shape the result and never become filters.
pub const CONTROL_PARAMS: [&str; 4] = ["select", "sort", "page", "limit"];

pub fn is_control_param(key: &str) -> bool {
    CONTROL_PARAMS.contains(&key)
}

/// A query-string value; repeated keys collapse into `Many`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    Single(String),
    Many(Vec<String>),
}

impl QueryValue {
    pub fn first(&self) -> &str {
        match self {
            Self::Single(v) => v,
            Self::Many(values) => values.first().map(String::as_str).unwrap_or(""),
        }
    }

    pub fn values(&self) -> Vec<&str> {
        match self {
            Self::Single(v) => vec![v.as_str()],
            Self::Many(values) => values.iter().map(String::as_str).collect(),
        }
    }

    fn push(&mut self, value: String) {
        match self {
            Self::Single(existing) => {
                let first = std::mem::take(existing);
                *self = Self::Many(vec![first, value]);
            }
            Self::Many(values) => values.push(value),
        }
    }
}

/// Ordered multimap of query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestQuery {
    params: Vec<(String, QueryValue)>,
}

impl RequestQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut query = Self::new();
        for (key, value) in pairs {
            query.append(key, value);
        }
        query
    }

    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.params.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => existing.push(value),
            None => self.params.push((key, QueryValue::Single(value))),
        }
    }

    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.params.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &QueryValue)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Everything except the control parameters.
    pub fn filter_params(&self) -> impl Iterator<Item = (&str, &QueryValue)> {
        self.iter().filter(|(k, _)| !is_control_param(k))
    }

    /// Comma-separated `select` fields.
    pub fn select(&self) -> Option<Vec<String>> {
        self.field_list("select")
    }

    /// Comma-separated `sort` keys, `-` prefix meaning descending.
    pub fn sort(&self) -> Option<Vec<String>> {
        self.field_list("sort")
    }

    pub fn pagination(&self) -> Pagination {
        Pagination::parse(
            self.get("page").map(QueryValue::first),
            self.get("limit").map(QueryValue::first),
        )
    }

    fn field_list(&self, key: &str) -> Option<Vec<String>> {
        let value = self.get(key)?;
        let fields: Vec<String> = value
            .values()
            .into_iter()
            .flat_map(|v| v.split(','))
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_string)
            .collect();
        (!fields.is_empty()).then_some(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_keys_become_many() {
        let query = RequestQuery::from_pairs([("careers", "Business"), ("careers", "UI/UX")]);
        assert_eq!(
            query.get("careers"),
            Some(&QueryValue::Many(vec!["Business".into(), "UI/UX".into()]))
        );
    }

    #[test]
    fn select_and_sort_join_repeated_values() {
        let query = RequestQuery::from_pairs([
            ("select", "name, description"),
            ("select", "housing"),
            ("sort", "-averageCost,,name"),
        ]);
        assert_eq!(
            query.select().unwrap(),
            vec!["name", "description", "housing"]
        );
        assert_eq!(query.sort().unwrap(), vec!["-averageCost", "name"]);
    }

    #[test]
    fn empty_select_is_none() {
        let query = RequestQuery::from_pairs([("select", " , ")]);
        assert!(query.select().is_none());
    }

    #[test]
    fn control_params_are_not_filters() {
        let query = RequestQuery::from_pairs([
            ("select", "name"),
            ("page", "2"),
            ("housing", "true"),
            ("limit", "5"),
            ("sort", "name"),
        ]);
        let keys: Vec<&str> = query.filter_params().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["housing"]);
    }

    #[test]
    fn pagination_uses_first_repeated_value() {
        let query = RequestQuery::from_pairs([("page", "3"), ("page", "9"), ("limit", "7")]);
        let pagination = query.pagination();
        assert_eq!(pagination.page, 3);
        assert_eq!(pagination.limit, 7);
    }
}
