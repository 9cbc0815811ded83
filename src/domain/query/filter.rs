//! Filter Expression built from the non-control query parameters.
//!
//! Keys are read in three shapes: `field=v`, `field[op]=v` and `field_op=v`.
//! Operator tokens are matched as whole tokens only, so a field such as
//! `weeks` or `login` is never mistaken for a comparison.

use std::collections::BTreeMap;

use tracing::debug;

use super::request_query::{QueryValue, RequestQuery};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CmpOp {
    /// Plain `field=v` once the field also carries a comparison.
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
}

impl CmpOp {
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "gt" => Some(Self::Gt),
            "gte" => Some(Self::Gte),
            "lt" => Some(Self::Lt),
            "lte" => Some(Self::Lte),
            "in" => Some(Self::In),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::In => "in",
        }
    }
}

/// Raw filter operand. `List` means "any of".
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Single(String),
    List(Vec<String>),
}

impl FilterValue {
    pub fn values(&self) -> Vec<&str> {
        match self {
            Self::Single(v) => vec![v.as_str()],
            Self::List(values) => values.iter().map(String::as_str).collect(),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterNode {
    Equals(FilterValue),
    Compare(BTreeMap<CmpOp, FilterValue>),
    /// GeoJSON point field inside a spherical cap; radius in radians.
    WithinSphere { lng: f64, lat: f64, radius: f64 },
}

/// Field path (dot separated) to condition; all conditions must hold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterExpr {
    fields: BTreeMap<String, FilterNode>,
}

impl FilterExpr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(path: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new().and(path, FilterNode::Equals(value.into()))
    }

    pub fn and(mut self, path: impl Into<String>, node: FilterNode) -> Self {
        self.fields.insert(path.into(), node);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, path: &str) -> Option<&FilterNode> {
        self.fields.get(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterNode)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn add_equals(&mut self, path: String, value: &QueryValue) {
        let value = match value {
            QueryValue::Single(v) => FilterValue::Single(v.clone()),
            QueryValue::Many(values) => FilterValue::List(values.clone()),
        };
        if let Some(FilterNode::Compare(ops)) = self.fields.get_mut(&path) {
            ops.insert(CmpOp::Eq, value);
            return;
        }
        self.fields.insert(path, FilterNode::Equals(value));
    }

    fn add_compare(&mut self, path: String, op: CmpOp, value: &QueryValue) {
        let operand = match op {
            CmpOp::In => FilterValue::List(split_list(value)),
            _ => FilterValue::Single(value.first().to_string()),
        };

        // An earlier equality on the same field joins the comparison map.
        let node = self
            .fields
            .entry(path)
            .or_insert_with(|| FilterNode::Compare(BTreeMap::new()));
        match node {
            FilterNode::Compare(_) => {}
            FilterNode::Equals(eq) => {
                let eq = eq.clone();
                *node = FilterNode::Compare(BTreeMap::from([(CmpOp::Eq, eq)]));
            }
            FilterNode::WithinSphere { .. } => *node = FilterNode::Compare(BTreeMap::new()),
        }
        let FilterNode::Compare(ops) = node else {
            return;
        };

        match (ops.get_mut(&op), operand) {
            (Some(FilterValue::List(existing)), FilterValue::List(more)) => existing.extend(more),
            (_, operand) => {
                ops.insert(op, operand);
            }
        }
    }
}

fn split_list(value: &QueryValue) -> Vec<String> {
    value
        .values()
        .into_iter()
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

/// Split a parameter key into a dotted field path and an optional operator.
fn parse_key(key: &str) -> (String, Option<CmpOp>) {
    if let Some(open) = key.find('[') {
        if let Some(segments) = bracket_segments(&key[open..]) {
            let mut path = vec![key[..open].to_string()];
            let mut op = None;
            let last = segments.len().saturating_sub(1);
            for (i, segment) in segments.into_iter().enumerate() {
                match CmpOp::parse(segment) {
                    Some(parsed) if i == last => op = Some(parsed),
                    _ => path.push(segment.to_string()),
                }
            }
            return (path.join("."), op);
        }
        return (key.to_string(), None);
    }

    if let Some((field, token)) = key.rsplit_once('_') {
        if let Some(op) = CmpOp::parse(token) {
            if !field.is_empty() {
                return (field.to_string(), Some(op));
            }
        }
    }
    (key.to_string(), None)
}

/// `[a][b]` -> `["a", "b"]`; `None` when the brackets are unbalanced.
fn bracket_segments(mut rest: &str) -> Option<Vec<&str>> {
    let mut segments = Vec::new();
    while !rest.is_empty() {
        let inner = rest.strip_prefix('[')?;
        let close = inner.find(']')?;
        segments.push(&inner[..close]);
        rest = &inner[close + 1..];
    }
    Some(segments)
}

fn is_safe_path(path: &str) -> bool {
    path.split('.')
        .all(|segment| !segment.is_empty() && !segment.starts_with('$'))
}

/// Build the Filter Expression from every non-control parameter.
pub fn build_filter(query: &RequestQuery) -> FilterExpr {
    let mut filter = FilterExpr::new();
    for (key, value) in query.filter_params() {
        let (path, op) = parse_key(key);
        if !is_safe_path(&path) {
            debug!(key, "Dropping unsafe filter key");
            continue;
        }
        match op {
            Some(op) => filter.add_compare(path, op, value),
            None => filter.add_equals(path, value),
        }
    }
    filter
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(v: &str) -> FilterValue {
        FilterValue::Single(v.to_string())
    }

    #[test]
    fn plain_key_is_equality() {
        let filter = build_filter(&RequestQuery::from_pairs([("housing", "true")]));
        assert_eq!(filter.get("housing"), Some(&FilterNode::Equals(single("true"))));
    }

    #[test]
    fn underscore_suffix_becomes_operator() {
        let filter = build_filter(&RequestQuery::from_pairs([("averageCost_gte", "10000")]));
        let mut expected = BTreeMap::new();
        expected.insert(CmpOp::Gte, single("10000"));
        assert_eq!(filter.get("averageCost"), Some(&FilterNode::Compare(expected)));
    }

    #[test]
    fn bracket_operator_form() {
        let filter = build_filter(&RequestQuery::from_pairs([
            ("tuition[gte]", "1000"),
            ("tuition[lte]", "9000"),
        ]));
        match filter.get("tuition") {
            Some(FilterNode::Compare(ops)) => {
                assert_eq!(ops.get(&CmpOp::Gte), Some(&single("1000")));
                assert_eq!(ops.get(&CmpOp::Lte), Some(&single("9000")));
            }
            other => panic!("unexpected node: {other:?}"),
        }
    }

    #[test]
    fn operator_match_is_whole_token() {
        let filter = build_filter(&RequestQuery::from_pairs([
            ("weeks", "8"),
            ("login", "x"),
            ("max_ingt", "1"),
            ("built_in", "a"),
        ]));
        assert_eq!(filter.get("weeks"), Some(&FilterNode::Equals(single("8"))));
        assert_eq!(filter.get("login"), Some(&FilterNode::Equals(single("x"))));
        assert_eq!(filter.get("max_ingt"), Some(&FilterNode::Equals(single("1"))));
        assert!(matches!(filter.get("built"), Some(FilterNode::Compare(_))));
    }

    #[test]
    fn in_values_split_and_merge() {
        let filter = build_filter(&RequestQuery::from_pairs([
            ("careers[in]", "Business,UI/UX"),
            ("careers[in]", "Other"),
        ]));
        match filter.get("careers") {
            Some(FilterNode::Compare(ops)) => assert_eq!(
                ops.get(&CmpOp::In),
                Some(&FilterValue::List(vec![
                    "Business".into(),
                    "UI/UX".into(),
                    "Other".into()
                ]))
            ),
            other => panic!("unexpected node: {other:?}"),
        }
    }

    #[test]
    fn nested_bracket_is_a_path() {
        let filter = build_filter(&RequestQuery::from_pairs([("location[state]", "MA")]));
        assert_eq!(filter.get("location.state"), Some(&FilterNode::Equals(single("MA"))));
    }

    #[test]
    fn control_params_never_leak() {
        let filter = build_filter(&RequestQuery::from_pairs([
            ("select", "name"),
            ("sort", "-name"),
            ("page", "2"),
            ("limit", "3"),
        ]));
        assert!(filter.is_empty());
    }

    #[test]
    fn unsafe_keys_are_dropped() {
        let filter = build_filter(&RequestQuery::from_pairs([
            ("$where", "1"),
            ("name[$ne]", "x"),
            ("a..b", "1"),
            ("_gt", "3"),
        ]));
        assert_eq!(filter.iter().count(), 1);
        assert!(filter.get("_gt").is_some());
    }

    #[test]
    fn equality_and_comparison_combine_in_any_order() {
        let eq_first = build_filter(&RequestQuery::from_pairs([
            ("averageCost", "1"),
            ("averageCost[gte]", "1"),
        ]));
        let cmp_first = build_filter(&RequestQuery::from_pairs([
            ("averageCost[gte]", "1"),
            ("averageCost", "1"),
        ]));
        assert_eq!(eq_first, cmp_first);

        let expected = BTreeMap::from([(CmpOp::Eq, single("1")), (CmpOp::Gte, single("1"))]);
        assert_eq!(eq_first.get("averageCost"), Some(&FilterNode::Compare(expected)));
    }

    #[test]
    fn eq_is_not_a_query_operator() {
        let filter = build_filter(&RequestQuery::from_pairs([("status_eq", "open")]));
        assert_eq!(filter.get("status_eq"), Some(&FilterNode::Equals(single("open"))));
    }

    #[test]
    fn repeated_equality_is_any_of() {
        let filter = build_filter(&RequestQuery::from_pairs([
            ("minimumSkill", "beginner"),
            ("minimumSkill", "advanced"),
        ]));
        assert_eq!(
            filter.get("minimumSkill"),
            Some(&FilterNode::Equals(FilterValue::List(vec![
                "beginner".into(),
                "advanced".into()
            ])))
        );
    }
}
