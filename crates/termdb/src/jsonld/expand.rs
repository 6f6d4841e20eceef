//! Built-in JSON-LD expansion for documents with inline contexts.

use std::collections::HashMap;

use serde_json::{Map, Value};

use super::JsonLdProcessor;
use crate::error::{Error, Result};

/// Maximum depth when resolving terms through other terms.
const MAX_TERM_DEPTH: u8 = 10;

/// A JSON-LD 1.0 expansion subset for inline contexts.
///
/// Covers the constructs embedded documents use in practice:
///
/// - `@vocab` and term → IRI string mappings
/// - expanded term definitions with `@id`, `@type` (including `@id`
///   coercion), and `@container: @list`
/// - compact IRIs (`prefix:suffix`)
/// - nested node objects, arrays, `@id`/`@type`/`@value` keywords
///
/// Remote contexts (string URLs) are rejected with [`Error::Expand`];
/// callers whose documents reference remote contexts inject a full JSON-LD
/// processor through
/// [`StoreConfig::processor`](crate::StoreConfig::processor) instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineContextProcessor;

impl InlineContextProcessor {
    /// Create a new processor.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl JsonLdProcessor for InlineContextProcessor {
    fn expand(&self, document: &Value) -> Result<Vec<Value>> {
        let ctx = ActiveContext::default();
        match document {
            Value::Object(map) => Ok(vec![expand_node(&ctx, map)?]),
            Value::Array(items) => {
                let mut nodes = Vec::with_capacity(items.len());
                for item in items {
                    if let Value::Object(map) = item {
                        nodes.push(expand_node(&ctx, map)?);
                    }
                }
                Ok(nodes)
            }
            _ => Ok(Vec::new()),
        }
    }
}

/// One term definition from an `@context`.
#[derive(Debug, Clone)]
struct TermDefinition {
    /// The raw `@id` (or the term itself); resolved against the context at
    /// expansion time.
    iri: String,
    /// `@type: @id`: string values become node references.
    coerce_id: bool,
    /// A datatype IRI attached to expanded value objects.
    datatype: Option<String>,
    /// `@container: @list`.
    list_container: bool,
}

/// The merged in-scope context of a node.
#[derive(Debug, Clone, Default)]
struct ActiveContext {
    vocab: Option<String>,
    terms: HashMap<String, TermDefinition>,
}

impl ActiveContext {
    /// Merge an `@context` entry into this context.
    fn merge(&mut self, context: &Value) -> Result<()> {
        match context {
            Value::Null => {
                *self = Self::default();
                Ok(())
            }
            Value::String(url) => {
                Err(Error::Expand(format!("remote context not supported: {url}")))
            }
            Value::Array(entries) => {
                for entry in entries {
                    self.merge(entry)?;
                }
                Ok(())
            }
            Value::Object(map) => {
                for (term, definition) in map {
                    match term.as_str() {
                        "@vocab" => {
                            let vocab = definition.as_str().ok_or_else(|| {
                                Error::Expand("@vocab must be a string".into())
                            })?;
                            self.vocab = Some(vocab.to_owned());
                        }
                        "@base" | "@language" | "@version" => {}
                        _ => self.define_term(term, definition)?,
                    }
                }
                Ok(())
            }
            _ => Err(Error::Expand("invalid @context entry".into())),
        }
    }

    fn define_term(&mut self, term: &str, definition: &Value) -> Result<()> {
        let parsed = match definition {
            Value::Null => {
                self.terms.remove(term);
                return Ok(());
            }
            Value::String(iri) => TermDefinition {
                iri: iri.clone(),
                coerce_id: false,
                datatype: None,
                list_container: false,
            },
            Value::Object(map) => {
                let iri = match map.get("@id") {
                    Some(Value::String(iri)) => iri.clone(),
                    None => term.to_owned(),
                    Some(_) => {
                        return Err(Error::Expand(format!("invalid @id for term {term}")))
                    }
                };
                let (coerce_id, datatype) = match map.get("@type") {
                    Some(Value::String(t)) if t == "@id" => (true, None),
                    Some(Value::String(t)) => (false, Some(t.clone())),
                    None => (false, None),
                    Some(_) => {
                        return Err(Error::Expand(format!("invalid @type for term {term}")))
                    }
                };
                let list_container =
                    matches!(map.get("@container"), Some(Value::String(c)) if c == "@list");
                TermDefinition { iri, coerce_id, datatype, list_container }
            }
            _ => return Err(Error::Expand(format!("invalid definition for term {term}"))),
        };
        self.terms.insert(term.to_owned(), parsed);
        Ok(())
    }

    /// Expand a term or compact IRI into a full IRI.
    ///
    /// Returns `None` for terms the context does not map (such keys are
    /// dropped, per the expansion algorithm).
    fn expand_iri(&self, value: &str) -> Option<String> {
        self.expand_iri_at(value, None, MAX_TERM_DEPTH)
    }

    fn expand_iri_at(&self, value: &str, exclude: Option<&str>, depth: u8) -> Option<String> {
        if depth == 0 {
            return None;
        }
        if value.starts_with('@') {
            return Some(value.to_owned());
        }
        if exclude != Some(value) {
            if let Some(definition) = self.terms.get(value) {
                return self.expand_iri_at(&definition.iri, Some(value), depth - 1);
            }
        }
        if let Some((prefix, suffix)) = value.split_once(':') {
            if let Some(prefix_def) = self.terms.get(prefix) {
                let base = self.expand_iri_at(&prefix_def.iri, Some(prefix), depth - 1)?;
                return Some(format!("{base}{suffix}"));
            }
            // a scheme-bearing IRI stands on its own
            return Some(value.to_owned());
        }
        self.vocab.as_ref().map(|vocab| format!("{vocab}{value}"))
    }
}

/// Expand one node object against its in-scope context.
fn expand_node(parent: &ActiveContext, map: &Map<String, Value>) -> Result<Value> {
    let mut ctx = parent.clone();
    if let Some(context) = map.get("@context") {
        ctx.merge(context)?;
    }

    // value objects pass through untouched (minus any local context)
    if map.contains_key("@value") || map.contains_key("@list") || map.contains_key("@set") {
        let mut out = map.clone();
        out.remove("@context");
        return Ok(Value::Object(out));
    }

    let mut out = Map::new();
    for (key, value) in map {
        match key.as_str() {
            "@context" => {}
            "@id" => {
                out.insert("@id".to_owned(), value.clone());
            }
            "@type" => {
                let mut types = Vec::new();
                for entry in as_slice(value) {
                    if let Value::String(name) = entry {
                        if let Some(iri) = ctx.expand_iri(name) {
                            types.push(Value::String(iri));
                        }
                    }
                }
                out.insert("@type".to_owned(), Value::Array(types));
            }
            term => {
                let Some(iri) = ctx.expand_iri(term) else {
                    // terms outside the context are dropped
                    continue;
                };
                let definition = ctx.terms.get(term).cloned();
                let expanded = expand_values(&ctx, definition.as_ref(), value)?;
                if let Some(values) = wrap_container(definition.as_ref(), expanded) {
                    out.insert(iri, values);
                }
            }
        }
    }
    Ok(Value::Object(out))
}

/// Expand a property value into its list of value/node objects.
fn expand_values(
    ctx: &ActiveContext,
    definition: Option<&TermDefinition>,
    value: &Value,
) -> Result<Vec<Value>> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.extend(expand_values(ctx, definition, item)?);
            }
            Ok(out)
        }
        Value::Object(map) => Ok(vec![expand_node(ctx, map)?]),
        Value::String(s) if definition.is_some_and(|d| d.coerce_id) => {
            let iri = ctx.expand_iri_at(s, None, MAX_TERM_DEPTH).unwrap_or_else(|| s.clone());
            Ok(vec![Value::Object(Map::from_iter([(
                "@id".to_owned(),
                Value::String(iri),
            )]))])
        }
        scalar => {
            let mut object = Map::new();
            object.insert("@value".to_owned(), scalar.clone());
            if let Some(datatype) = definition.and_then(|d| d.datatype.as_deref()) {
                if let Some(iri) = ctx.expand_iri(datatype) {
                    object.insert("@type".to_owned(), Value::String(iri));
                }
            }
            Ok(vec![Value::Object(object)])
        }
    }
}

/// Wrap expanded values per the term's container, dropping empty non-list
/// properties.
fn wrap_container(definition: Option<&TermDefinition>, expanded: Vec<Value>) -> Option<Value> {
    if definition.is_some_and(|d| d.list_container) {
        let list = Value::Object(Map::from_iter([("@list".to_owned(), Value::Array(expanded))]));
        return Some(Value::Array(vec![list]));
    }
    if expanded.is_empty() {
        return None;
    }
    Some(Value::Array(expanded))
}

fn as_slice(value: &Value) -> &[Value] {
    match value {
        Value::Array(items) => items,
        other => std::slice::from_ref(other),
    }
}
