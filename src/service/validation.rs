//! Request validation from per-field rules.
//!
//! Each writable entity declares a static rule table. Validation reports every failing field at once and
//! normalizes accepted values in place (trimmed strings, numeric strings to numbers, boolean spellings to
//! booleans) so the body deserializes cleanly afterwards.

use crate::country::is_known_country;
use crate::error::{AppError, FieldErrors};
use regex::Regex;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::str::FromStr;

const EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";
const URL_PATTERN: &str = r"(?i)^https?://[^\s/?#]+\.[^\s/?#]+(:\d+)?([/?#]\S*)?$";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Boolean,
    Decimal { max_digits: u32, places: u32 },
    Email,
    Url,
    /// ISO 3166-1 alpha-2 code from the bundled table.
    Country,
}

#[derive(Clone, Copy, Debug)]
pub struct FieldRule {
    pub kind: FieldKind,
    pub required: bool,
    pub nullable: bool,
    pub allow_blank: bool,
    pub max_length: Option<usize>,
    pub min_length: Option<usize>,
    pub minimum: Option<i64>,
    pub maximum: Option<i64>,
    pub allowed: Option<&'static [&'static str]>,
    pub pattern: Option<&'static str>,
    pub uppercase: bool,
}

impl FieldRule {
    const fn of(kind: FieldKind) -> Self {
        FieldRule {
            kind,
            required: false,
            nullable: false,
            allow_blank: false,
            max_length: None,
            min_length: None,
            minimum: None,
            maximum: None,
            allowed: None,
            pattern: None,
            uppercase: false,
        }
    }

    pub const fn text() -> Self {
        Self::of(FieldKind::Text)
    }

    pub const fn integer() -> Self {
        Self::of(FieldKind::Integer)
    }

    pub const fn boolean() -> Self {
        Self::of(FieldKind::Boolean)
    }

    pub const fn decimal(max_digits: u32, places: u32) -> Self {
        Self::of(FieldKind::Decimal { max_digits, places })
    }

    pub const fn email() -> Self {
        Self::of(FieldKind::Email)
    }

    pub const fn url() -> Self {
        Self::of(FieldKind::Url)
    }

    pub const fn country() -> Self {
        Self::of(FieldKind::Country)
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self.allow_blank = true;
        self
    }

    pub const fn blank(mut self) -> Self {
        self.allow_blank = true;
        self
    }

    pub const fn max_length(mut self, n: usize) -> Self {
        self.max_length = Some(n);
        self
    }

    pub const fn min_length(mut self, n: usize) -> Self {
        self.min_length = Some(n);
        self
    }

    pub const fn range(mut self, min: i64, max: i64) -> Self {
        self.minimum = Some(min);
        self.maximum = Some(max);
        self
    }

    pub const fn min(mut self, min: i64) -> Self {
        self.minimum = Some(min);
        self
    }

    pub const fn choices(mut self, allowed: &'static [&'static str]) -> Self {
        self.allowed = Some(allowed);
        self
    }

    pub const fn pattern(mut self, pattern: &'static str) -> Self {
        self.pattern = Some(pattern);
        self
    }

    /// Stores the value in ASCII uppercase; choices and pattern see the uppercased text.
    pub const fn uppercase(mut self) -> Self {
        self.uppercase = true;
        self
    }
}

pub type Rules = &'static [(&'static str, FieldRule)];

/// Full writes (create, PUT) enforce required fields; partial writes (PATCH) only check what is present.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Full,
    Partial,
}

pub struct RequestValidator;

impl RequestValidator {
    /// Validate and normalize `body` against `rules`. Unknown fields are left alone.
    pub fn validate(body: &mut Map<String, Value>, rules: Rules, mode: Mode) -> Result<(), AppError> {
        Self::check(body, rules, mode).into_result()
    }

    /// Like [`validate`](Self::validate) but returns the collected errors so callers can add their own.
    pub fn check(body: &mut Map<String, Value>, rules: Rules, mode: Mode) -> FieldErrors {
        let mut errors = FieldErrors::new();
        for (name, rule) in rules {
            match body.get_mut(*name) {
                None => {
                    if mode == Mode::Full && rule.required {
                        errors.add(name, "This field is required.");
                    }
                }
                Some(v) => {
                    if let Err(message) = validate_field(v, rule) {
                        errors.add(name, message);
                    }
                }
            }
        }
        errors
    }

    /// Server-controlled fields must not appear in client input.
    pub fn reject_read_only(body: &Map<String, Value>, read_only: &[&str]) -> FieldErrors {
        let mut errors = FieldErrors::new();
        for name in read_only {
            if body.contains_key(*name) {
                errors.add(name, "This field is read-only.");
            }
        }
        errors
    }
}

fn validate_field(v: &mut Value, rule: &FieldRule) -> Result<(), String> {
    if v.is_null() {
        return if rule.nullable {
            Ok(())
        } else {
            Err("This field may not be null.".into())
        };
    }
    match rule.kind {
        FieldKind::Text | FieldKind::Email | FieldKind::Url | FieldKind::Country => validate_text(v, rule),
        FieldKind::Integer => validate_integer(v, rule),
        FieldKind::Boolean => validate_boolean(v),
        FieldKind::Decimal { max_digits, places } => validate_decimal(v, max_digits, places),
    }
}

fn validate_text(v: &mut Value, rule: &FieldRule) -> Result<(), String> {
    let s = match v {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return Err("Not a valid string.".into()),
    };
    if s.is_empty() {
        if rule.allow_blank {
            // blank optional values are stored as NULL when the column allows it
            *v = if rule.nullable { Value::Null } else { Value::String(s) };
            return Ok(());
        }
        return Err("This field may not be blank.".into());
    }
    let len = s.chars().count();
    if let Some(max) = rule.max_length {
        if len > max {
            return Err(format!("Ensure this field has no more than {} characters.", max));
        }
    }
    if let Some(min) = rule.min_length {
        if len < min {
            return Err(format!("Ensure this field has at least {} characters.", min));
        }
    }
    let s = match rule.kind {
        FieldKind::Email => {
            if !matches_pattern(EMAIL_PATTERN, &s) {
                return Err("Enter a valid email address.".into());
            }
            s
        }
        FieldKind::Url => {
            if !matches_pattern(URL_PATTERN, &s) {
                return Err("Enter a valid URL.".into());
            }
            s
        }
        FieldKind::Country => {
            if !is_known_country(&s) {
                return Err(format!("\"{}\" is not a valid choice.", s));
            }
            s.to_ascii_uppercase()
        }
        _ if rule.uppercase => s.to_ascii_uppercase(),
        _ => s,
    };
    if let Some(allowed) = rule.allowed {
        if !allowed.contains(&s.as_str()) {
            return Err(format!("\"{}\" is not a valid choice.", s));
        }
    }
    if let Some(pattern) = rule.pattern {
        if !matches_pattern(pattern, &s) {
            return Err("Enter a valid value.".into());
        }
    }
    *v = Value::String(s);
    Ok(())
}

fn matches_pattern(pattern: &str, s: &str) -> bool {
    Regex::new(pattern).map(|re| re.is_match(s)).unwrap_or(false)
}

fn validate_integer(v: &mut Value, rule: &FieldRule) -> Result<(), String> {
    const INVALID: &str = "A valid integer is required.";
    let n = match v {
        Value::Number(n) => match n.as_i64() {
            Some(i) => i,
            None => match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => f as i64,
                _ => return Err(INVALID.into()),
            },
        },
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| INVALID.to_string())?,
        _ => return Err(INVALID.into()),
    };
    let min = rule.minimum.unwrap_or(i64::from(i32::MIN));
    let max = rule.maximum.unwrap_or(i64::from(i32::MAX));
    if n < min {
        return Err(format!("Ensure this value is greater than or equal to {}.", min));
    }
    if n > max {
        return Err(format!("Ensure this value is less than or equal to {}.", max));
    }
    *v = Value::Number(n.into());
    Ok(())
}

fn validate_boolean(v: &mut Value) -> Result<(), String> {
    let b = match v {
        Value::Bool(b) => *b,
        Value::Number(n) => match n.as_i64() {
            Some(1) => true,
            Some(0) => false,
            _ => return Err("Must be a valid boolean.".into()),
        },
        Value::String(s) => parse_bool(s).ok_or_else(|| "Must be a valid boolean.".to_string())?,
        _ => return Err("Must be a valid boolean.".into()),
    };
    *v = Value::Bool(b);
    Ok(())
}

/// Accepts the spellings HTML forms and query strings use.
pub fn parse_bool(s: &str) -> Option<bool> {
    match s.trim() {
        "true" | "True" | "TRUE" | "1" | "on" | "yes" => Some(true),
        "false" | "False" | "FALSE" | "0" | "off" | "no" => Some(false),
        _ => None,
    }
}

/// Parse a decimal from a plain or scientific string.
pub fn parse_decimal(s: &str) -> Option<Decimal> {
    let s = s.trim();
    Decimal::from_str(s).or_else(|_| Decimal::from_scientific(s)).ok()
}

fn validate_decimal(v: &mut Value, max_digits: u32, places: u32) -> Result<(), String> {
    const INVALID: &str = "A valid number is required.";
    let d = match v {
        Value::Number(n) => parse_decimal(&n.to_string()),
        Value::String(s) => parse_decimal(s),
        _ => None,
    }
    .ok_or_else(|| INVALID.to_string())?;
    let d = d.normalize();
    if d.scale() > places {
        return Err(format!("Ensure that there are no more than {} decimal places.", places));
    }
    let whole_digits = d.trunc().abs().to_string().trim_start_matches('0').len() as u32;
    if whole_digits > max_digits - places {
        return Err(format!(
            "Ensure that there are no more than {} digits before the decimal point.",
            max_digits - places
        ));
    }
    *v = Value::String(d.to_string());
    Ok(())
}
