//! Scalar extraction from expanded documents.

use serde_json::{Map, Value};
use termdb_core::{Scalar, TermPath};

use crate::error::Result;

/// Collect the scalars at `path` from a list of expanded nodes, in document
/// order.
///
/// At the end of the path a node contributes its `@value`, or its `@id`, or
/// the elements of its `@list`/`@set`, whichever comes first. Structures
/// where a list was expected yield nothing; a genuinely non-scalar value in
/// a value slot fails with [`InvalidValue`](crate::Error::InvalidValue).
///
/// # Errors
///
/// Returns [`InvalidValue`](crate::Error::InvalidValue) when a value node
/// holds something that is not a boolean, string, or number.
pub fn values_at_path(nodes: &[Value], path: &TermPath) -> Result<Vec<Scalar>> {
    let mut values = Vec::new();
    collect_from_slice(nodes, path.terms(), &mut values)?;
    Ok(values)
}

fn collect_from_slice(items: &[Value], terms: &[String], out: &mut Vec<Scalar>) -> Result<()> {
    for item in items {
        match item {
            Value::Array(nested) => collect_from_slice(nested, terms, out)?,
            Value::Object(map) => collect_from_map(map, terms, out)?,
            // a bare scalar where a node was expected
            _ => {}
        }
    }
    Ok(())
}

fn collect_from_map(map: &Map<String, Value>, terms: &[String], out: &mut Vec<Scalar>) -> Result<()> {
    // an expanded node carries its value as @value, @id, @list, or @set
    if terms.is_empty() {
        if let Some(value) = map.get("@value") {
            out.push(Scalar::parse(value)?);
            return Ok(());
        }
        if let Some(id) = map.get("@id") {
            out.push(Scalar::parse(id)?);
            return Ok(());
        }
        for container in ["@list", "@set"] {
            if let Some(Value::Array(items)) = map.get(container) {
                for item in items {
                    if let Some(scalar) = parse_container_item(item)? {
                        out.push(scalar);
                    }
                }
                return Ok(());
            }
        }
        return Ok(());
    }

    if let Some(Value::Array(next)) = map.get(&terms[0]) {
        collect_from_slice(next, &terms[1..], out)?;
    }
    Ok(())
}

/// Parse one `@list`/`@set` element: either a bare scalar or a value node.
fn parse_container_item(item: &Value) -> Result<Option<Scalar>> {
    match item {
        Value::Object(map) => match map.get("@value") {
            Some(value) => Ok(Some(Scalar::parse(value)?)),
            None => Ok(None),
        },
        Value::Array(_) | Value::Null => Ok(None),
        scalar => Ok(Some(Scalar::parse(scalar)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(terms: &[&str]) -> TermPath {
        TermPath::new(terms.iter().copied())
    }

    #[test]
    fn value_at_single_term() {
        let nodes = vec![json!({"http://schema.org/name": [{"@value": "Jane Doe"}]})];
        let values = values_at_path(&nodes, &path(&["http://schema.org/name"])).expect("extract");
        assert_eq!(values, vec![Scalar::from("Jane Doe")]);
    }

    #[test]
    fn id_nodes_yield_their_iri() {
        let nodes = vec![json!({"http://schema.org/url": [{"@id": "http://www.janedoe.com"}]})];
        let values = values_at_path(&nodes, &path(&["http://schema.org/url"])).expect("extract");
        assert_eq!(values, vec![Scalar::from("http://www.janedoe.com")]);
    }

    #[test]
    fn nested_terms_recurse() {
        let nodes = vec![json!({
            "http://schema.org/children": [
                {"http://schema.org/name": [{"@value": "John Doe"}]},
            ],
        })];
        let values = values_at_path(
            &nodes,
            &path(&["http://schema.org/children", "http://schema.org/name"]),
        )
        .expect("extract");
        assert_eq!(values, vec![Scalar::from("John Doe")]);
    }

    #[test]
    fn multiple_nodes_concatenate_in_order() {
        let nodes = vec![
            json!({"http://schema.org/name": [{"@value": "a"}, {"@value": "b"}]}),
            json!({"http://schema.org/name": [{"@value": "c"}]}),
        ];
        let values = values_at_path(&nodes, &path(&["http://schema.org/name"])).expect("extract");
        assert_eq!(values, vec![Scalar::from("a"), Scalar::from("b"), Scalar::from("c")]);
    }

    #[test]
    fn lists_yield_their_elements() {
        let nodes = vec![json!({
            "http://schema.org/tags": [
                {"@list": [{"@value": "x"}, "y", 2.0]},
            ],
        })];
        let values = values_at_path(&nodes, &path(&["http://schema.org/tags"])).expect("extract");
        assert_eq!(
            values,
            vec![Scalar::from("x"), Scalar::from("y"), Scalar::from(2.0)]
        );
    }

    #[test]
    fn missing_terms_yield_nothing() {
        let nodes = vec![json!({"http://schema.org/name": [{"@value": "Jane"}]})];
        let values = values_at_path(&nodes, &path(&["http://schema.org/url"])).expect("extract");
        assert!(values.is_empty());
    }

    #[test]
    fn scalar_where_list_expected_yields_nothing() {
        // the term maps to a bare scalar rather than a node list
        let nodes = vec![json!({"http://schema.org/name": "Jane"})];
        let values = values_at_path(&nodes, &path(&["http://schema.org/name"])).expect("extract");
        assert!(values.is_empty());
    }

    #[test]
    fn non_scalar_value_is_invalid() {
        let nodes = vec![json!({"http://schema.org/name": [{"@value": {"bad": 1}}]})];
        let result = values_at_path(&nodes, &path(&["http://schema.org/name"]));
        assert!(matches!(result, Err(crate::Error::InvalidValue)));
    }
}
