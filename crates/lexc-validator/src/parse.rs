//! Parse engine: walks a validator and a value together, collecting
//! violations and building the coerced output.

use serde_json::{Map, Number, Value};

use crate::error::Violation;
use crate::validator::{Kind, NumberRules, StringRules, TaggedUnion, Validator};

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

/// Append a JSON Pointer token, escaping `~` and `/`.
fn child_pointer(parent: &str, token: &str) -> String {
    format!("{parent}/{}", token.replace('~', "~0").replace('/', "~1"))
}

fn reject(violations: &mut Vec<Violation>, at: &str, message: impl Into<String>) {
    violations.push(Violation {
        instance_path: at.to_string(),
        message: message.into(),
    });
}

fn mime_matches(pattern: &str, mime: &str) -> bool {
    if pattern == "*/*" || pattern == mime {
        return true;
    }
    match pattern.strip_suffix("/*") {
        Some(top) => mime
            .split_once('/')
            .is_some_and(|(mime_top, _)| mime_top == top),
        None => false,
    }
}

fn number_value(n: f64, integer: bool) -> Value {
    if integer && n.fract() == 0.0 && n >= i64::MIN as f64 && n <= i64::MAX as f64 {
        Value::from(n as i64)
    } else {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

impl Validator {
    /// Validate `input` at `at`, pushing violations. The returned value is
    /// the parse output; `None` means "missing". It is meaningless when
    /// violations were pushed.
    pub(crate) fn run(
        &self,
        input: Option<&Value>,
        at: &str,
        violations: &mut Vec<Violation>,
    ) -> Option<Value> {
        let value = match (input, &self.default) {
            (Some(value), _) => value,
            (None, Some(default)) => default,
            (None, None) if self.optional || matches!(self.kind, Kind::Any | Kind::Unknown) => {
                return None
            }
            (None, None) => {
                reject(violations, at, "required");
                return None;
            }
        };

        if value.is_null() && self.nullable {
            return Some(Value::Null);
        }

        match &self.kind {
            Kind::Any | Kind::Unknown => Some(value.clone()),
            Kind::Never => {
                reject(violations, at, "no value is accepted here");
                None
            }
            Kind::Null => {
                if !value.is_null() {
                    reject(violations, at, format!("expected null, found {}", json_kind(value)));
                }
                Some(Value::Null)
            }
            Kind::Boolean => {
                if !value.is_boolean() {
                    reject(violations, at, format!("expected boolean, found {}", json_kind(value)));
                }
                Some(value.clone())
            }
            Kind::String(rules) => check_string(rules, value, at, violations),
            Kind::Number(rules) => check_number(rules, value, at, violations),
            Kind::Literal(expected) => {
                if value != expected {
                    reject(violations, at, format!("expected literal {expected}, found {value}"));
                }
                Some(value.clone())
            }
            Kind::Array {
                items,
                min_items,
                max_items,
            } => {
                let Some(elements) = value.as_array() else {
                    reject(violations, at, format!("expected array, found {}", json_kind(value)));
                    return None;
                };
                if let Some(min) = min_items {
                    if elements.len() < *min {
                        reject(violations, at, format!("expected at least {min} items, found {}", elements.len()));
                    }
                }
                if let Some(max) = max_items {
                    if elements.len() > *max {
                        reject(violations, at, format!("expected at most {max} items, found {}", elements.len()));
                    }
                }
                let output = elements
                    .iter()
                    .enumerate()
                    .map(|(i, element)| {
                        items
                            .run(Some(element), &child_pointer(at, &i.to_string()), violations)
                            .unwrap_or(Value::Null)
                    })
                    .collect();
                Some(Value::Array(output))
            }
            Kind::Object { shape } => {
                let Some(fields) = value.as_object() else {
                    reject(violations, at, format!("expected object, found {}", json_kind(value)));
                    return None;
                };
                let mut output = Map::new();
                for (key, field) in shape {
                    if let Some(parsed) = field.run(fields.get(key), &child_pointer(at, key), violations) {
                        output.insert(key.clone(), parsed);
                    }
                }
                Some(Value::Object(output))
            }
            Kind::Union(branches) => {
                let candidates: Vec<&Validator> = branches.iter().collect();
                first_match(&candidates, value, at, violations)
            }
            Kind::Tagged(tagged) => check_tagged(tagged, value, at, violations),
        }
    }
}

fn check_string(
    rules: &StringRules,
    value: &Value,
    at: &str,
    violations: &mut Vec<Violation>,
) -> Option<Value> {
    let Some(s) = value.as_str() else {
        reject(violations, at, format!("expected string, found {}", json_kind(value)));
        return None;
    };
    let length = s.chars().count();
    if let Some(min) = rules.min_length {
        if length < min {
            reject(violations, at, format!("expected at least {min} characters, found {length}"));
        }
    }
    if let Some(max) = rules.max_length {
        if length > max {
            reject(violations, at, format!("expected at most {max} characters, found {length}"));
        }
    }
    if let Some(allowed) = &rules.one_of {
        if !allowed.iter().any(|a| a == s) {
            reject(violations, at, format!("'{s}' is not one of {allowed:?}"));
        }
    }
    if !rules.mime_accept.is_empty() && !rules.mime_accept.iter().any(|p| mime_matches(p, s)) {
        reject(violations, at, format!("MIME type '{s}' is not accepted"));
    }
    Some(value.clone())
}

fn check_number(
    rules: &NumberRules,
    value: &Value,
    at: &str,
    violations: &mut Vec<Violation>,
) -> Option<Value> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if rules.coerce => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    };
    let Some(n) = n else {
        reject(violations, at, format!("expected number, found {}", json_kind(value)));
        return None;
    };
    if rules.integer && n.fract() != 0.0 {
        reject(violations, at, format!("expected integer, found {n}"));
    }
    if let Some(min) = rules.minimum {
        if n < min {
            reject(violations, at, format!("{n} is less than the minimum of {min}"));
        }
    }
    if let Some(max) = rules.maximum {
        if n > max {
            reject(violations, at, format!("{n} is greater than the maximum of {max}"));
        }
    }
    if let Some(allowed) = &rules.one_of {
        if !allowed.contains(&n) {
            reject(violations, at, format!("{n} is not one of {allowed:?}"));
        }
    }
    Some(number_value(n, rules.integer))
}

/// Try branches in order; the first that produces no violations wins.
fn first_match(
    branches: &[&Validator],
    value: &Value,
    at: &str,
    violations: &mut Vec<Violation>,
) -> Option<Value> {
    for branch in branches {
        let mut attempt = Vec::new();
        let output = branch.run(Some(value), at, &mut attempt);
        if attempt.is_empty() {
            return output;
        }
    }
    reject(
        violations,
        at,
        format!("value matches none of {} union branches", branches.len()),
    );
    None
}

fn check_tagged(
    tagged: &TaggedUnion,
    value: &Value,
    at: &str,
    violations: &mut Vec<Violation>,
) -> Option<Value> {
    let tag = value.get(&tagged.field).and_then(Value::as_str);

    if let Some(tag) = tag {
        if let Some((_, branch)) = tagged.branches.iter().find(|(t, _)| t == tag) {
            let mut output = branch.run(Some(value), at, violations);
            // Object branches strip undeclared keys; keep the discriminator.
            if let Some(Value::Object(fields)) = &mut output {
                if !fields.contains_key(&tagged.field) {
                    fields.insert(tagged.field.clone(), Value::String(tag.to_string()));
                }
            }
            return output;
        }
        if tagged.closed {
            reject(
                violations,
                &child_pointer(at, &tagged.field),
                format!("'{tag}' is not a member of this closed union"),
            );
            return None;
        }
    }

    let candidates: Vec<&Validator> = tagged.branches.iter().map(|(_, b)| b).collect();
    first_match(&candidates, value, at, violations)
}
