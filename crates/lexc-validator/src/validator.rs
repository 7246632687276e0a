//! # Validator Tree
//!
//! A [`Validator`] is a [`Kind`] (what shape the value must have) plus
//! four wrappers that apply to any kind:
//!
//! | Wrapper | Effect on a missing value | Effect on `null` |
//! |---------|---------------------------|------------------|
//! | default | replaced by the default, then validated | — |
//! | optional | accepted, stays missing | — |
//! | nullable | — | accepted as `null` |
//! | description | none (documentation) | none |
//!
//! A default takes precedence over optional: an optional field with a
//! default is filled in, not left missing.

use serde_json::Value;

use crate::error::{ValidationError, ValidationViolations};

/// Constraints on a string value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringRules {
    /// Minimum length in characters.
    pub min_length: Option<usize>,
    /// Maximum length in characters.
    pub max_length: Option<usize>,
    /// Closed set of allowed values.
    pub one_of: Option<Vec<String>>,
    /// MIME patterns (`image/png`, `image/*`, `*/*`) the value must match.
    pub mime_accept: Vec<String>,
}

/// Constraints on a numeric value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumberRules {
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    /// Reject values with a fractional part.
    pub integer: bool,
    /// Accept numeric strings and convert them.
    pub coerce: bool,
    /// Closed set of allowed values.
    pub one_of: Option<Vec<f64>>,
}

/// Union whose branches are selected by a string discriminator field.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedUnion {
    /// Name of the discriminator field (`$type` for Lexicons).
    pub field: String,
    /// `(tag, branch)` pairs in declaration order.
    pub branches: Vec<(String, Validator)>,
    /// Reject discriminators that name no branch instead of falling back
    /// to structural matching.
    pub closed: bool,
}

/// The shape a value must have.
#[derive(Debug, Clone, PartialEq)]
pub enum Kind {
    /// Accepts every value, including a missing one.
    Any,
    /// Accepts every value, including a missing one.
    Unknown,
    /// Rejects every value.
    Never,
    Null,
    Boolean,
    String(StringRules),
    Number(NumberRules),
    /// Exactly this value.
    Literal(Value),
    Array {
        items: Box<Validator>,
        min_items: Option<usize>,
        max_items: Option<usize>,
    },
    /// Declared keys in order; undeclared keys are stripped on parse.
    Object { shape: Vec<(String, Validator)> },
    /// First matching branch wins.
    Union(Vec<Validator>),
    Tagged(TaggedUnion),
}

/// A runtime validator.
#[derive(Debug, Clone, PartialEq)]
pub struct Validator {
    pub(crate) kind: Kind,
    pub(crate) optional: bool,
    pub(crate) nullable: bool,
    pub(crate) default: Option<Value>,
    pub(crate) description: Option<String>,
}

impl From<Kind> for Validator {
    fn from(kind: Kind) -> Self {
        Self {
            kind,
            optional: false,
            nullable: false,
            default: None,
            description: None,
        }
    }
}

impl Validator {
    // -- constructors -------------------------------------------------------

    pub fn any() -> Self {
        Kind::Any.into()
    }

    pub fn unknown() -> Self {
        Kind::Unknown.into()
    }

    /// A validator that rejects everything; placeholder for absent facets.
    pub fn never() -> Self {
        Kind::Never.into()
    }

    pub fn null() -> Self {
        Kind::Null.into()
    }

    pub fn boolean() -> Self {
        Kind::Boolean.into()
    }

    pub fn string() -> Self {
        Kind::String(StringRules::default()).into()
    }

    /// Any finite number.
    pub fn number() -> Self {
        Kind::Number(NumberRules::default()).into()
    }

    /// Whole numbers only.
    pub fn integer() -> Self {
        Kind::Number(NumberRules {
            integer: true,
            ..NumberRules::default()
        })
        .into()
    }

    pub fn literal(value: impl Into<Value>) -> Self {
        Kind::Literal(value.into()).into()
    }

    pub fn array(items: Validator) -> Self {
        Kind::Array {
            items: Box::new(items),
            min_items: None,
            max_items: None,
        }
        .into()
    }

    pub fn object<K: Into<String>>(shape: impl IntoIterator<Item = (K, Validator)>) -> Self {
        let mut object: Self = Kind::Object { shape: Vec::new() }.into();
        for (key, field) in shape {
            object = object.with_field(key, field);
        }
        object
    }

    pub fn union(branches: impl IntoIterator<Item = Validator>) -> Self {
        Kind::Union(branches.into_iter().collect()).into()
    }

    pub fn tagged_union<T: Into<String>>(
        field: impl Into<String>,
        branches: impl IntoIterator<Item = (T, Validator)>,
        closed: bool,
    ) -> Self {
        Kind::Tagged(TaggedUnion {
            field: field.into(),
            branches: branches
                .into_iter()
                .map(|(tag, branch)| (tag.into(), branch))
                .collect(),
            closed,
        })
        .into()
    }

    // -- wrappers -----------------------------------------------------------

    /// Attach a human-readable description.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Value substituted when the field is missing.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Accept a missing value.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Reject a missing value (unless a default is set).
    pub fn required(mut self) -> Self {
        self.optional = false;
        self
    }

    /// Accept `null` in addition to the kind's values.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    // -- constraints --------------------------------------------------------

    /// Minimum string length or array item count; ignored by other kinds.
    pub fn min_length(mut self, min: usize) -> Self {
        match &mut self.kind {
            Kind::String(rules) => rules.min_length = Some(min),
            Kind::Array { min_items, .. } => *min_items = Some(min),
            _ => {}
        }
        self
    }

    /// Maximum string length or array item count; ignored by other kinds.
    pub fn max_length(mut self, max: usize) -> Self {
        match &mut self.kind {
            Kind::String(rules) => rules.max_length = Some(max),
            Kind::Array { max_items, .. } => *max_items = Some(max),
            _ => {}
        }
        self
    }

    /// Inclusive lower bound; ignored by non-numeric kinds.
    pub fn minimum(mut self, min: f64) -> Self {
        if let Kind::Number(rules) = &mut self.kind {
            rules.minimum = Some(min);
        }
        self
    }

    /// Inclusive upper bound; ignored by non-numeric kinds.
    pub fn maximum(mut self, max: f64) -> Self {
        if let Kind::Number(rules) = &mut self.kind {
            rules.maximum = Some(max);
        }
        self
    }

    /// Accept numeric strings for numeric kinds.
    pub fn coerce(mut self) -> Self {
        if let Kind::Number(rules) = &mut self.kind {
            rules.coerce = true;
        }
        self
    }

    /// Restrict a string kind to the given values.
    pub fn one_of_strings<S: Into<String>>(mut self, values: impl IntoIterator<Item = S>) -> Self {
        if let Kind::String(rules) = &mut self.kind {
            rules.one_of = Some(values.into_iter().map(Into::into).collect());
        }
        self
    }

    /// Restrict a numeric kind to the given values.
    pub fn one_of_numbers(mut self, values: impl IntoIterator<Item = f64>) -> Self {
        if let Kind::Number(rules) = &mut self.kind {
            rules.one_of = Some(values.into_iter().collect());
        }
        self
    }

    /// Require a string kind to match one of the MIME patterns.
    pub fn accept_mime<S: Into<String>>(mut self, patterns: impl IntoIterator<Item = S>) -> Self {
        if let Kind::String(rules) = &mut self.kind {
            rules.mime_accept = patterns.into_iter().map(Into::into).collect();
        }
        self
    }

    /// Add or replace an object field, keeping the position of an existing
    /// key. Non-object validators are returned unchanged.
    pub fn with_field(mut self, key: impl Into<String>, field: Validator) -> Self {
        if let Kind::Object { shape } = &mut self.kind {
            let key = key.into();
            match shape.iter_mut().find(|(k, _)| *k == key) {
                Some((_, slot)) => *slot = field,
                None => shape.push((key, field)),
            }
        }
        self
    }

    // -- inspection ---------------------------------------------------------

    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns true for a validator that rejects every value.
    pub fn is_never(&self) -> bool {
        matches!(self.kind, Kind::Never)
    }

    /// Returns true if a missing value is accepted (optional, defaulted, or
    /// an accept-anything kind).
    pub fn accepts_missing(&self) -> bool {
        self.optional || self.default.is_some() || matches!(self.kind, Kind::Any | Kind::Unknown)
    }

    /// Field of an object validator.
    pub fn field(&self, key: &str) -> Option<&Validator> {
        match &self.kind {
            Kind::Object { shape } => shape.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Declared field keys of an object validator, in order.
    pub fn field_keys(&self) -> Vec<&str> {
        match &self.kind {
            Kind::Object { shape } => shape.iter().map(|(k, _)| k.as_str()).collect(),
            _ => Vec::new(),
        }
    }

    /// Element validator of an array validator.
    pub fn items(&self) -> Option<&Validator> {
        match &self.kind {
            Kind::Array { items, .. } => Some(items),
            _ => None,
        }
    }

    /// Branches of a union or tagged union, in order.
    pub fn branches(&self) -> Vec<&Validator> {
        match &self.kind {
            Kind::Union(branches) => branches.iter().collect(),
            Kind::Tagged(tagged) => tagged.branches.iter().map(|(_, b)| b).collect(),
            _ => Vec::new(),
        }
    }

    /// Discriminator tags of a tagged union, in order.
    pub fn branch_tags(&self) -> Vec<&str> {
        match &self.kind {
            Kind::Tagged(tagged) => tagged.branches.iter().map(|(t, _)| t.as_str()).collect(),
            _ => Vec::new(),
        }
    }

    // -- parsing ------------------------------------------------------------

    /// Validate a present value, returning the coerced output.
    pub fn parse(&self, value: &Value) -> Result<Value, ValidationError> {
        self.parse_field(Some(value))
            .map(|output| output.unwrap_or(Value::Null))
    }

    /// Validate a possibly-missing value. `Ok(None)` means the value was
    /// missing and that is acceptable.
    pub fn parse_field(&self, value: Option<&Value>) -> Result<Option<Value>, ValidationError> {
        let mut violations = Vec::new();
        let output = self.run(value, "", &mut violations);
        if violations.is_empty() {
            Ok(output)
        } else {
            Err(ValidationError {
                violations: ValidationViolations::new(violations),
            })
        }
    }

    /// Returns true if `value` parses.
    pub fn accepts(&self, value: &Value) -> bool {
        self.parse(value).is_ok()
    }
}
