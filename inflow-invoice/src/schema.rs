//! Declarative invoice schema
//!
//! Each field of the invoice JSON is described by a [`FieldRule`]: whether it
//! must be present, the default filled in when it is absent, and the checks
//! its string value must pass. [`validate`] runs the whole table, collects
//! every failing check, drops unknown fields and returns the normalized
//! object.

use serde_json::{Map, Value};

use crate::error::{SchemaError, SchemaIssue};
use crate::{DEFAULT_TOKEN, MAX_AMOUNT_DECIMALS, MAX_MEMO_LEN, MIN_RECIPIENT_LEN};

/// Accepted network names
pub const NETWORKS: &[&str] = &["stacks", "ethereum"];

/// Address prefixes of the supported chains (Stacks mainnet, Stacks testnet, EVM)
pub const RECIPIENT_PREFIXES: &[&str] = &["SP", "ST", "0x"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Required,
    Optional,
    /// Filled with this value when absent
    Default(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    /// Lower bound counted in UTF-16 code units
    MinUtf16Len(usize),
    /// Upper bound counted in UTF-16 code units
    MaxUtf16Len(usize),
    Prefix(&'static [&'static str]),
    /// `digits` or `digits.digits` with a bounded fractional part
    Decimal { max_fraction: usize },
    /// At least one non-zero digit
    Positive,
    OneOf(&'static [&'static str]),
    /// RFC 3339 with an uppercase `T` separator and `Z` suffix or numeric offset
    Rfc3339,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub name: &'static str,
    pub presence: Presence,
    pub checks: &'static [Check],
}

/// Rules for every invoice field, in serialization order
pub const INVOICE_SCHEMA: &[FieldRule] = &[
    FieldRule {
        name: "invoiceId",
        presence: Presence::Optional,
        checks: &[],
    },
    FieldRule {
        name: "recipient",
        presence: Presence::Required,
        checks: &[Check::MinUtf16Len(MIN_RECIPIENT_LEN), Check::Prefix(RECIPIENT_PREFIXES)],
    },
    FieldRule {
        name: "amount",
        presence: Presence::Required,
        checks: &[
            Check::Decimal {
                max_fraction: MAX_AMOUNT_DECIMALS,
            },
            Check::Positive,
        ],
    },
    FieldRule {
        name: "memo",
        presence: Presence::Optional,
        checks: &[Check::MaxUtf16Len(MAX_MEMO_LEN)],
    },
    FieldRule {
        name: "token",
        presence: Presence::Default(DEFAULT_TOKEN),
        checks: &[Check::MinUtf16Len(1)],
    },
    FieldRule {
        name: "network",
        presence: Presence::Default("stacks"),
        checks: &[Check::OneOf(NETWORKS)],
    },
    FieldRule {
        name: "targetNetwork",
        presence: Presence::Optional,
        checks: &[Check::OneOf(NETWORKS)],
    },
    FieldRule {
        name: "createdAt",
        presence: Presence::Optional,
        checks: &[Check::Rfc3339],
    },
];

impl Check {
    /// `None` when `value` passes, otherwise the failure message.
    pub fn apply(&self, value: &str) -> Option<String> {
        match self {
            Check::MinUtf16Len(min) => (value.encode_utf16().count() < *min)
                .then(|| format!("must be at least {} characters", min)),
            Check::MaxUtf16Len(max) => (value.encode_utf16().count() > *max)
                .then(|| format!("must be at most {} characters", max)),
            Check::Prefix(prefixes) => (!prefixes.iter().any(|p| value.starts_with(p)))
                .then(|| format!("must start with one of {}", prefixes.join(", "))),
            Check::Decimal { max_fraction } => (!is_decimal(value, *max_fraction)).then(|| {
                format!(
                    "must be a decimal number with at most {} fractional digits",
                    max_fraction
                )
            }),
            Check::Positive => (!value.bytes().any(|b| (b'1'..=b'9').contains(&b)))
                .then(|| "must be greater than zero".to_string()),
            Check::OneOf(allowed) => (!allowed.contains(&value))
                .then(|| format!("must be one of {}", allowed.join(", "))),
            Check::Rfc3339 => (!is_timestamp(value))
                .then(|| "must be an RFC 3339 timestamp".to_string()),
        }
    }
}

fn is_decimal(value: &str, max_fraction: usize) -> bool {
    let (whole, fraction) = match value.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (value, None),
    };
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());

    all_digits(whole)
        && fraction.map_or(true, |f| all_digits(f) && f.len() <= max_fraction)
}

fn is_timestamp(value: &str) -> bool {
    // chrono also takes a space or lowercase `t`/`z`
    value.as_bytes().get(10) == Some(&b'T')
        && !value.ends_with('z')
        && chrono::DateTime::parse_from_rfc3339(value).is_ok()
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Validate a decoded JSON document against [`INVOICE_SCHEMA`].
///
/// Returns the object restricted to known fields with defaults applied.
pub fn validate(value: &Value) -> Result<Map<String, Value>, SchemaError> {
    validate_with(INVOICE_SCHEMA, value)
}

/// Validate against an arbitrary rule table.
pub fn validate_with(rules: &[FieldRule], value: &Value) -> Result<Map<String, Value>, SchemaError> {
    let object = match value {
        Value::Object(object) => object,
        other => {
            return Err(SchemaError::single(
                "$",
                format!("expected object, received {}", type_name(other)),
            ))
        }
    };

    let mut issues = Vec::new();
    let mut normalized = Map::new();

    for rule in rules {
        let field = match object.get(rule.name) {
            Some(field) => field,
            None => {
                match rule.presence {
                    Presence::Required => issues.push(SchemaIssue::new(rule.name, "required")),
                    Presence::Default(default) => {
                        normalized.insert(rule.name.to_string(), Value::from(default));
                    }
                    Presence::Optional => {}
                }
                continue;
            }
        };

        let text = match field {
            Value::String(text) => text,
            other => {
                issues.push(SchemaIssue::new(
                    rule.name,
                    format!("expected string, received {}", type_name(other)),
                ));
                continue;
            }
        };

        let before = issues.len();
        for check in rule.checks {
            if let Some(message) = check.apply(text) {
                issues.push(SchemaIssue::new(rule.name, message));
            }
        }
        if issues.len() == before {
            normalized.insert(rule.name.to_string(), field.clone());
        }
    }

    if issues.is_empty() {
        Ok(normalized)
    } else {
        Err(SchemaError::new(issues))
    }
}
