//! # Lexicon Document Model
//!
//! Typed representation of a Lexicon document. Each definition is a
//! [`LexDef`], a sum type keyed on the JSON `type` field:
//!
//! | Tag | Variant | Kind |
//! |-----|---------|------|
//! | `object`, `params` | [`LexDef::Object`], [`LexDef::Params`] | composite |
//! | `array` | [`LexDef::Array`] | composite |
//! | `union`, `ref` | [`LexDef::Union`], [`LexDef::Ref`] | composite |
//! | `string`, `integer`, `boolean`, `bytes`, `cid-link`, `blob`, `null`, `unknown`, `token` | leaves | leaf |
//! | `record`, `query`, `procedure`, `subscription` | primary | facet map |
//! | anything else | [`LexDef::Other`] | opaque |
//!
//! Unknown tags deserialize successfully into [`LexDef::Other`]; whether
//! they compile is decided by the compiler's type registry.
//!
//! Object properties and document definitions are held in an
//! [`OrderedMap`], which keeps declaration order. The compiler relies on
//! it: union branch indices and required-flag inference are positional.

use indexmap::IndexMap;
use serde::de::{self, DeserializeOwned};
use serde::ser;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::LexiconError;

// ---------------------------------------------------------------------------
// OrderedMap
// ---------------------------------------------------------------------------

/// String-keyed map that iterates in insertion (declaration) order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderedMap<V>(IndexMap<String, V>);

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self(IndexMap::new())
    }
}

impl<V> OrderedMap<V> {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a value by key.
    pub fn get(&self, key: &str) -> Option<&V> {
        self.0.get(key)
    }

    /// Returns true if `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Insert a value. An existing key keeps its position and has its value
    /// replaced; the previous value is returned.
    pub fn insert(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        self.0.insert(key.into(), value)
    }

    /// Remove a key, returning its value. Later entries keep their order.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        self.0.shift_remove(key)
    }

    /// Iterate over entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate over keys in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for OrderedMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// A Lexicon document: an NSID plus its named definitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LexiconDoc {
    /// Lexicon language version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lexicon: Option<u32>,
    /// NSID of this document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Named definitions in declaration order.
    #[serde(default)]
    pub defs: OrderedMap<LexDef>,
}

impl LexiconDoc {
    /// Parse a document from a JSON value.
    pub fn from_value(value: Value) -> Result<Self, LexiconError> {
        Ok(serde_json::from_value(value)?)
    }

    /// Parse a document from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, LexiconError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Build an anonymous document from definitions.
    pub fn with_defs<K: Into<String>>(defs: impl IntoIterator<Item = (K, LexDef)>) -> Self {
        Self {
            lexicon: Some(1),
            id: None,
            revision: None,
            description: None,
            defs: defs.into_iter().collect(),
        }
    }

    /// Look up a definition by key.
    pub fn def(&self, key: &str) -> Option<&LexDef> {
        self.defs.get(key)
    }
}

// ---------------------------------------------------------------------------
// Definitions
// ---------------------------------------------------------------------------

/// `object` / `params`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Keys that must be present.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    /// Keys whose value may be `null`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nullable: Vec<String>,
    #[serde(default)]
    pub properties: OrderedMap<LexDef>,
}

/// `array`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrayDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub items: Box<LexDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
}

/// `string`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StringDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    /// Suggested values; informational only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub known_values: Vec<String>,
    /// Closed set of allowed values.
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    #[serde(rename = "const", default, skip_serializing_if = "Option::is_none")]
    pub const_value: Option<Value>,
}

/// `integer`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegerDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<i64>,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<i64>>,
    #[serde(rename = "const", default, skip_serializing_if = "Option::is_none")]
    pub const_value: Option<Value>,
}

/// `boolean`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BooleanDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(rename = "const", default, skip_serializing_if = "Option::is_none")]
    pub const_value: Option<Value>,
}

/// `blob` — reference to uploaded binary content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Accepted MIME types; `type/*` wildcards allowed.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub accept: Vec<String>,
    /// Maximum size in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_size: Option<u64>,
}

/// `bytes` — `{ "$bytes": "<base64>" }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BytesDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
}

/// `cid-link` — `{ "$link": "<cid>" }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CidLinkDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NullDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// `unknown` — any value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnknownDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// `token` — a named symbolic value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// `ref`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "ref")]
    pub reference: String,
}

impl RefDef {
    /// A bare reference with no description.
    pub fn to(reference: impl Into<String>) -> Self {
        Self {
            description: None,
            reference: reference.into(),
        }
    }
}

/// `union`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnionDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Branch references; position is significant.
    #[serde(default)]
    pub refs: Vec<String>,
    /// Reject `$type` values that name no branch.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub closed: bool,
}

/// `record`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Record key type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record: Option<ObjectDef>,
}

/// Request or response body of an RPC.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BodyDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// MIME type of the body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Box<LexDef>>,
}

/// Event-stream message of a subscription.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Box<LexDef>>,
}

/// A named RPC error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// `query`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<ObjectDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<BodyDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ErrorDef>,
}

/// `procedure`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcedureDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<ObjectDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<BodyDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<BodyDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ErrorDef>,
}

/// `subscription`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<ObjectDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<MessageDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ErrorDef>,
}

/// A definition whose tag this crate does not model.
#[derive(Debug, Clone, PartialEq)]
pub struct OpaqueDef {
    /// The definition's `type` tag (empty when absent).
    pub type_tag: String,
    /// All fields of the definition, `type` included.
    pub body: Map<String, Value>,
}

/// A Lexicon definition node.
#[derive(Debug, Clone, PartialEq)]
pub enum LexDef {
    Object(ObjectDef),
    Params(ObjectDef),
    Array(ArrayDef),
    String(StringDef),
    Integer(IntegerDef),
    Boolean(BooleanDef),
    Blob(BlobDef),
    Bytes(BytesDef),
    CidLink(CidLinkDef),
    Null(NullDef),
    Unknown(UnknownDef),
    Token(TokenDef),
    Ref(RefDef),
    Union(UnionDef),
    Record(RecordDef),
    Query(QueryDef),
    Procedure(ProcedureDef),
    Subscription(SubscriptionDef),
    Other(OpaqueDef),
}

fn typed<T: DeserializeOwned>(type_tag: &str, body: Map<String, Value>) -> Result<T, LexiconError> {
    serde_json::from_value(Value::Object(body)).map_err(|e| LexiconError::InvalidDefinition {
        type_tag: type_tag.to_string(),
        reason: e.to_string(),
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl LexDef {
    /// Read a definition from JSON, dispatching on its `type` tag.
    pub fn from_value(value: Value) -> Result<Self, LexiconError> {
        let body = match value {
            Value::Object(body) => body,
            other => {
                return Err(LexiconError::NotAnObject {
                    found: json_kind(&other),
                })
            }
        };
        let tag = body
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        Ok(match tag.as_str() {
            "object" => Self::Object(typed(&tag, body)?),
            "params" => Self::Params(typed(&tag, body)?),
            "array" => Self::Array(typed(&tag, body)?),
            "string" => Self::String(typed(&tag, body)?),
            "integer" => Self::Integer(typed(&tag, body)?),
            "boolean" => Self::Boolean(typed(&tag, body)?),
            "blob" => Self::Blob(typed(&tag, body)?),
            "bytes" => Self::Bytes(typed(&tag, body)?),
            "cid-link" => Self::CidLink(typed(&tag, body)?),
            "null" => Self::Null(typed(&tag, body)?),
            "unknown" => Self::Unknown(typed(&tag, body)?),
            "token" => Self::Token(typed(&tag, body)?),
            "ref" => Self::Ref(typed(&tag, body)?),
            "union" => Self::Union(typed(&tag, body)?),
            "record" => Self::Record(typed(&tag, body)?),
            "query" => Self::Query(typed(&tag, body)?),
            "procedure" => Self::Procedure(typed(&tag, body)?),
            "subscription" => Self::Subscription(typed(&tag, body)?),
            _ => Self::Other(OpaqueDef {
                type_tag: tag.clone(),
                body,
            }),
        })
    }

    /// Render the definition back to JSON, `type` tag included.
    pub fn to_value(&self) -> Result<Value, LexiconError> {
        fn tagged<T: Serialize>(tag: &str, inner: &T) -> Result<Value, LexiconError> {
            let mut body = match serde_json::to_value(inner)? {
                Value::Object(body) => body,
                other => {
                    return Err(LexiconError::NotAnObject {
                        found: json_kind(&other),
                    })
                }
            };
            body.insert("type".to_string(), Value::String(tag.to_string()));
            Ok(Value::Object(body))
        }

        let tag = self.type_tag();
        match self {
            Self::Object(d) | Self::Params(d) => tagged(tag, d),
            Self::Array(d) => tagged(tag, d),
            Self::String(d) => tagged(tag, d),
            Self::Integer(d) => tagged(tag, d),
            Self::Boolean(d) => tagged(tag, d),
            Self::Blob(d) => tagged(tag, d),
            Self::Bytes(d) => tagged(tag, d),
            Self::CidLink(d) => tagged(tag, d),
            Self::Null(d) => tagged(tag, d),
            Self::Unknown(d) => tagged(tag, d),
            Self::Token(d) => tagged(tag, d),
            Self::Ref(d) => tagged(tag, d),
            Self::Union(d) => tagged(tag, d),
            Self::Record(d) => tagged(tag, d),
            Self::Query(d) => tagged(tag, d),
            Self::Procedure(d) => tagged(tag, d),
            Self::Subscription(d) => tagged(tag, d),
            Self::Other(d) => Ok(Value::Object(d.body.clone())),
        }
    }

    /// Read this definition's fields as another definition shape.
    ///
    /// Used when a type compiler is registered for a tag other than its
    /// own, e.g. a caller mapping `number` onto the integer compiler.
    pub fn reinterpret<T: DeserializeOwned>(&self) -> Result<T, LexiconError> {
        match self.to_value()? {
            Value::Object(body) => typed(self.type_tag(), body),
            other => Err(LexiconError::NotAnObject {
                found: json_kind(&other),
            }),
        }
    }

    /// The `type` tag this definition was declared with.
    pub fn type_tag(&self) -> &str {
        match self {
            Self::Object(_) => "object",
            Self::Params(_) => "params",
            Self::Array(_) => "array",
            Self::String(_) => "string",
            Self::Integer(_) => "integer",
            Self::Boolean(_) => "boolean",
            Self::Blob(_) => "blob",
            Self::Bytes(_) => "bytes",
            Self::CidLink(_) => "cid-link",
            Self::Null(_) => "null",
            Self::Unknown(_) => "unknown",
            Self::Token(_) => "token",
            Self::Ref(_) => "ref",
            Self::Union(_) => "union",
            Self::Record(_) => "record",
            Self::Query(_) => "query",
            Self::Procedure(_) => "procedure",
            Self::Subscription(_) => "subscription",
            Self::Other(d) => &d.type_tag,
        }
    }

    /// Returns true for `record`, `query`, `procedure` and `subscription`.
    pub fn is_primary(&self) -> bool {
        matches!(
            self,
            Self::Record(_) | Self::Query(_) | Self::Procedure(_) | Self::Subscription(_)
        )
    }

    /// Declared `description`, if any.
    pub fn description(&self) -> Option<&str> {
        let description = match self {
            Self::Object(d) | Self::Params(d) => &d.description,
            Self::Array(d) => &d.description,
            Self::String(d) => &d.description,
            Self::Integer(d) => &d.description,
            Self::Boolean(d) => &d.description,
            Self::Blob(d) => &d.description,
            Self::Bytes(d) => &d.description,
            Self::CidLink(d) => &d.description,
            Self::Null(d) => &d.description,
            Self::Unknown(d) => &d.description,
            Self::Token(d) => &d.description,
            Self::Ref(d) => &d.description,
            Self::Union(d) => &d.description,
            Self::Record(d) => &d.description,
            Self::Query(d) => &d.description,
            Self::Procedure(d) => &d.description,
            Self::Subscription(d) => &d.description,
            Self::Other(d) => return d.body.get("description").and_then(Value::as_str),
        };
        description.as_deref()
    }

    /// Declared `default`, if any.
    pub fn default_value(&self) -> Option<&Value> {
        match self {
            Self::String(d) => d.default.as_ref(),
            Self::Integer(d) => d.default.as_ref(),
            Self::Boolean(d) => d.default.as_ref(),
            Self::Other(d) => d.body.get("default"),
            _ => None,
        }
    }
}

impl Serialize for LexDef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value()
            .map_err(ser::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for LexDef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(value).map_err(de::Error::custom)
    }
}
