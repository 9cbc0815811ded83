//! Query evaluation over JSON documents, shared by every store.
//!
//! Filter operands arrive as strings and are coerced against the type of the
//! stored value: numbers compare numerically, booleans parse `true`/`false`,
//! RFC 3339 strings compare as instants, anything else as text. Conditions on
//! an array field hold when any element satisfies them.

use std::cmp::Ordering;

use chrono::{DateTime, FixedOffset};
use serde_json::{Map, Value};

use crate::domain::geo::central_angle;
use crate::domain::query::{
    CmpOp, Document, FilterExpr, FilterNode, FilterValue, Order, QueryOptions, SortSpec,
};
use crate::shared::{DomainError, DomainResult};

const MAX_PATH_DEPTH: usize = 32;

pub fn get_path<'a>(doc: &'a Document, path: &str) -> Option<&'a Value> {
    let mut parts = path.split('.');
    let mut current = doc.get(parts.next()?)?;
    for (depth, part) in parts.enumerate() {
        if depth >= MAX_PATH_DEPTH {
            return None;
        }
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

/// Whether `doc` satisfies every condition of `filter`.
///
/// Every condition is evaluated, so an operand that cannot be cast to a
/// stored number or boolean is reported even when another one fails.
pub fn matches(doc: &Document, filter: &FilterExpr) -> DomainResult<bool> {
    let mut all = true;
    for (path, node) in filter.iter() {
        let holds = match get_path(doc, path) {
            Some(value) => eval_node(path, value, node)?,
            None => false,
        };
        all &= holds;
    }
    Ok(all)
}

fn eval_node(path: &str, value: &Value, node: &FilterNode) -> DomainResult<bool> {
    match node {
        FilterNode::Equals(operand) => any_element(value, |v| equals_any(path, v, operand)),
        FilterNode::Compare(ops) => {
            let mut all = true;
            for (op, operand) in ops {
                all &= any_element(value, |v| eval_cmp(path, v, *op, operand))?;
            }
            Ok(all)
        }
        FilterNode::WithinSphere { lng, lat, radius } => Ok(point_of(value)
            .is_some_and(|point| central_angle(point, (*lng, *lat)) <= *radius)),
    }
}

fn any_element(
    value: &Value,
    mut pred: impl FnMut(&Value) -> DomainResult<bool>,
) -> DomainResult<bool> {
    match value {
        Value::Array(items) => {
            for item in items {
                if pred(item)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        other => pred(other),
    }
}

fn equals_any(path: &str, value: &Value, operand: &FilterValue) -> DomainResult<bool> {
    for raw in operand.values() {
        if cast_compare(path, value, raw)? == Some(Ordering::Equal) {
            return Ok(true);
        }
    }
    Ok(false)
}

fn eval_cmp(path: &str, value: &Value, op: CmpOp, operand: &FilterValue) -> DomainResult<bool> {
    if matches!(op, CmpOp::Eq | CmpOp::In) {
        return equals_any(path, value, operand);
    }
    let Some(raw) = operand.values().into_iter().next() else {
        return Ok(false);
    };
    Ok(match cast_compare(path, value, raw)? {
        Some(ord) => match op {
            CmpOp::Gt => ord == Ordering::Greater,
            CmpOp::Gte => ord != Ordering::Less,
            CmpOp::Lt => ord == Ordering::Less,
            CmpOp::Lte => ord != Ordering::Greater,
            CmpOp::Eq | CmpOp::In => ord == Ordering::Equal,
        },
        None => false,
    })
}

/// [`compare_raw`] that rejects operands a stored number or boolean cannot take.
fn cast_compare(path: &str, stored: &Value, raw: &str) -> DomainResult<Option<Ordering>> {
    let ord = compare_raw(stored, raw);
    let kind = match stored {
        Value::Number(_) => "Number",
        Value::Bool(_) => "Boolean",
        _ => return Ok(ord),
    };
    match ord {
        Some(ord) => Ok(Some(ord)),
        None => Err(DomainError::Validation(format!(
            "Cast to {kind} failed for value \"{raw}\" at path \"{path}\""
        ))),
    }
}

/// GeoJSON point `{coordinates: [lng, lat]}` as `(lng, lat)`.
fn point_of(value: &Value) -> Option<(f64, f64)> {
    let coords = value.get("coordinates")?.as_array()?;
    Some((coords.first()?.as_f64()?, coords.get(1)?.as_f64()?))
}

fn parse_instant(s: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(s).ok()
}

/// Order of a stored value relative to a raw string operand, or `None`
/// when the operand cannot be read as the stored value's type.
pub fn compare_raw(stored: &Value, raw: &str) -> Option<Ordering> {
    match stored {
        Value::Number(n) => {
            let rhs = raw.trim().parse::<f64>().ok()?;
            Some(n.as_f64()?.total_cmp(&rhs))
        }
        Value::Bool(b) => {
            let rhs = match raw.trim() {
                "true" => true,
                "false" => false,
                _ => return None,
            };
            Some(b.cmp(&rhs))
        }
        Value::String(s) => match (parse_instant(s), parse_instant(raw)) {
            (Some(lhs), Some(rhs)) => Some(lhs.cmp(&rhs)),
            _ => Some(s.as_str().cmp(raw)),
        },
        Value::Null => (raw == "null").then_some(Ordering::Equal),
        Value::Array(_) | Value::Object(_) => None,
    }
}

fn type_rank(v: &Value) -> u8 {
    match v {
        Value::Null => 0,
        Value::Number(_) => 1,
        Value::String(_) => 2,
        Value::Object(_) => 3,
        Value::Array(_) => 4,
        Value::Bool(_) => 5,
    }
}

pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .unwrap_or(f64::NAN)
            .total_cmp(&y.as_f64().unwrap_or(f64::NAN)),
        (Value::String(x), Value::String(y)) => match (parse_instant(x), parse_instant(y)) {
            (Some(lhs), Some(rhs)) => lhs.cmp(&rhs),
            _ => x.cmp(y),
        },
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

pub fn compare_docs(a: &Document, b: &Document, sort: &[SortSpec]) -> Ordering {
    for spec in sort {
        let ord = match (get_path(a, &spec.field), get_path(b, &spec.field)) {
            (Some(x), Some(y)) => compare_values(x, y),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => Ordering::Equal,
        };
        if ord != Ordering::Equal {
            return match spec.order {
                Order::Asc => ord,
                Order::Desc => ord.reverse(),
            };
        }
    }
    Ordering::Equal
}

/// Inclusion projection; `_id` is always kept.
pub fn project(doc: &Document, fields: &[String]) -> Document {
    let mut out = Map::new();
    if let Some(id) = doc.get("_id") {
        out.insert("_id".to_string(), id.clone());
    }
    for field in fields {
        if let Some(value) = get_path(doc, field) {
            insert_path(&mut out, field, value.clone());
        }
    }
    out
}

fn insert_path(out: &mut Document, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            out.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let child = out
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !child.is_object() {
                *child = Value::Object(Map::new());
            }
            if let Value::Object(map) = child {
                insert_path(map, rest, value);
            }
        }
    }
}

/// Documents satisfying `filter`, in the order given.
pub fn filter_documents<I>(docs: I, filter: &FilterExpr) -> DomainResult<Vec<Document>>
where
    I: IntoIterator<Item = Document>,
{
    let mut selected = Vec::new();
    for doc in docs {
        if matches(&doc, filter)? {
            selected.push(doc);
        }
    }
    Ok(selected)
}

/// Filter, sort, window and project documents given in storage order.
pub fn execute<I>(docs: I, options: &QueryOptions) -> DomainResult<Vec<Document>>
where
    I: IntoIterator<Item = Document>,
{
    let mut selected = filter_documents(docs, options.filter())?;

    if !options.sort().is_empty() {
        selected.sort_by(|a, b| compare_docs(a, b, options.sort()));
    }

    let skip = usize::try_from(options.skip()).unwrap_or(usize::MAX);
    let limit = options
        .limit()
        .map(|l| usize::try_from(l).unwrap_or(usize::MAX))
        .unwrap_or(usize::MAX);

    Ok(selected
        .into_iter()
        .skip(skip)
        .take(limit)
        .map(|doc| match options.projection() {
            Some(fields) => project(&doc, fields),
            None => doc,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::query::{build_filter, build_options, RequestQuery};

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    fn bootcamps() -> Vec<Document> {
        vec![
            doc(json!({
                "_id": "1", "name": "Devworks", "averageCost": 10000, "housing": true,
                "careers": ["Web Development", "UI/UX"], "email": "a@devworks.com",
                "location": { "state": "MA", "coordinates": [-71.1, 42.3] },
                "createdAt": "2024-01-01T00:00:00Z"
            })),
            doc(json!({
                "_id": "2", "name": "ModernTech", "averageCost": 7500.5, "housing": false,
                "careers": ["Business"], "email": "b@modern.com",
                "location": { "state": "RI", "coordinates": [-71.4, 41.8] },
                "createdAt": "2024-03-01T00:00:00Z"
            })),
            doc(json!({
                "_id": "3", "name": "Codemasters", "averageCost": 15000, "housing": false,
                "careers": ["Data Science", "Business"],
                "location": { "state": "NY", "coordinates": [-74.0, 40.7] },
                "createdAt": "2024-02-01T00:00:00Z"
            })),
        ]
    }

    fn run(pairs: &[(&str, &str)]) -> Vec<Document> {
        let query = RequestQuery::from_pairs(pairs.iter().copied());
        execute(bootcamps(), &build_options(&query, &[])).unwrap()
    }

    fn ids(docs: &[Document]) -> Vec<&str> {
        docs.iter().map(|d| d["_id"].as_str().unwrap()).collect()
    }

    #[test]
    fn gte_holds_for_every_result() {
        let docs = run(&[("averageCost[gte]", "10000")]);
        assert_eq!(docs.len(), 2);
        assert!(docs.iter().all(|d| d["averageCost"].as_f64().unwrap() >= 10000.0));
    }

    #[test]
    fn underscore_lt_on_float() {
        assert_eq!(ids(&run(&[("averageCost_lt", "8000")])), vec!["2"]);
    }

    #[test]
    fn in_matches_listed_values_only() {
        let docs = run(&[("name[in]", "Devworks,Codemasters")]);
        assert_eq!(docs.len(), 2);
        assert!(docs
            .iter()
            .all(|d| ["Devworks", "Codemasters"].contains(&d["name"].as_str().unwrap())));
    }

    #[test]
    fn equality_on_array_matches_any_element() {
        let docs = run(&[("careers", "Business"), ("sort", "name")]);
        assert_eq!(ids(&docs), vec!["3", "2"]);
    }

    #[test]
    fn bool_and_nested_path() {
        assert_eq!(ids(&run(&[("housing", "true")])), vec!["1"]);
        assert_eq!(ids(&run(&[("location[state]", "RI")])), vec!["2"]);
    }

    #[test]
    fn uncastable_operand_is_a_validation_error() {
        let query = RequestQuery::from_pairs([("averageCost[gt]", "cheap")]);
        let err = execute(bootcamps(), &build_options(&query, &[])).unwrap_err();
        assert!(matches!(err, DomainError::Validation(ref m) if m.contains("averageCost")));

        let query = RequestQuery::from_pairs([("housing", "maybe")]);
        assert!(execute(bootcamps(), &build_options(&query, &[])).is_err());
    }

    #[test]
    fn text_operand_on_missing_field_is_not_an_error() {
        assert!(run(&[("website[gt]", "cheap")]).is_empty());
    }

    #[test]
    fn equality_with_comparison_on_same_field() {
        let both = [("averageCost", "10000"), ("averageCost[gte]", "10000")];
        let reversed = [("averageCost[gte]", "10000"), ("averageCost", "10000")];
        assert_eq!(ids(&run(&both)), vec!["1"]);
        assert_eq!(ids(&run(&reversed)), vec!["1"]);
    }

    #[test]
    fn missing_field_never_matches() {
        assert_eq!(ids(&run(&[("email[gte]", "a")])), vec!["2", "1"]);
    }

    #[test]
    fn default_sort_is_newest_first() {
        assert_eq!(ids(&run(&[])), vec!["2", "3", "1"]);
    }

    #[test]
    fn multi_key_sort() {
        let docs = run(&[("sort", "housing,-averageCost")]);
        assert_eq!(ids(&docs), vec!["3", "2", "1"]);
    }

    #[test]
    fn select_keeps_only_fields_and_id() {
        let docs = run(&[("select", "name,email")]);
        for d in &docs {
            assert!(d.keys().all(|k| ["_id", "name", "email"].contains(&k.as_str())));
            assert!(d.contains_key("name"));
        }
    }

    #[test]
    fn dotted_projection_builds_nested_object() {
        let docs = run(&[("select", "location.state"), ("name", "Devworks")]);
        assert_eq!(docs[0], doc(json!({ "_id": "1", "location": { "state": "MA" } })));
    }

    #[test]
    fn skip_and_limit() {
        let docs = run(&[("page", "2"), ("limit", "2")]);
        assert_eq!(ids(&docs), vec!["1"]);
    }

    #[test]
    fn created_at_compares_as_instant() {
        let docs = run(&[("createdAt[gt]", "2024-01-15T00:00:00+00:00")]);
        assert_eq!(ids(&docs), vec!["2", "3"]);
    }

    #[test]
    fn within_sphere() {
        let filter = FilterExpr::new().and(
            "location",
            FilterNode::WithinSphere {
                lng: -71.06,
                lat: 42.36,
                radius: 60.0 / 3963.0,
            },
        );
        let found: Vec<_> = bootcamps()
            .into_iter()
            .filter(|d| matches(d, &filter).unwrap())
            .collect();
        assert_eq!(ids(&found), vec!["1", "2"]);
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = build_filter(&RequestQuery::new());
        assert!(bootcamps().iter().all(|d| matches(d, &filter).unwrap()));
    }
}
