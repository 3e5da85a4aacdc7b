//! `{{token}}` placeholders and dotted-path lookup
//!
//! The expression language is deliberately tiny: a placeholder is `{{path}}`
//! where `path` is a dot-separated list of object fields and array indices
//! (`route.jobs.0.customerName`). The pseudo-field `count` on an array yields
//! its length.
//!
//! A placeholder that cannot be resolved is kept verbatim, including its
//! braces. A missing intermediate segment (`route.alertSummary` with no
//! `route`) leaves the whole placeholder literal; no partial substitution is
//! attempted.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::borrow::Cow;

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\{\s*([^{}]*?)\s*\}\}").unwrap());

/// One piece of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    Literal(&'a str),
    /// `raw` is the placeholder as written, `path` the trimmed expression
    Token { raw: &'a str, path: &'a str },
}

/// A text split into literal runs and placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template<'a> {
    segments: Vec<Segment<'a>>,
}

/// Output of [`Template::render`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Interpolation {
    pub text: String,
    /// Paths of placeholders left literal
    pub misses: Vec<String>,
}

impl<'a> Template<'a> {
    pub fn parse(text: &'a str) -> Self {
        let mut segments = Vec::new();
        let mut last = 0;
        for captures in TOKEN_RE.captures_iter(text) {
            let (Some(whole), Some(path)) = (captures.get(0), captures.get(1)) else {
                continue;
            };
            if whole.start() > last {
                segments.push(Segment::Literal(&text[last..whole.start()]));
            }
            segments.push(Segment::Token {
                raw: whole.as_str(),
                path: path.as_str(),
            });
            last = whole.end();
        }
        if last < text.len() {
            segments.push(Segment::Literal(&text[last..]));
        }
        Self { segments }
    }

    pub fn segments(&self) -> &[Segment<'a>] {
        &self.segments
    }

    pub fn has_tokens(&self) -> bool {
        self.segments
            .iter()
            .any(|segment| matches!(segment, Segment::Token { .. }))
    }

    /// Paths referenced by the template, in order of appearance.
    pub fn paths(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Token { path, .. } => Some(*path),
            Segment::Literal(_) => None,
        })
    }

    /// Substitute every placeholder `resolve` can answer; keep the rest literal.
    pub fn render<F>(&self, mut resolve: F) -> Interpolation
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut out = Interpolation::default();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.text.push_str(text),
                Segment::Token { raw, path } => match resolve(path) {
                    Some(value) => out.text.push_str(&value),
                    None => {
                        out.text.push_str(raw);
                        out.misses.push((*path).to_string());
                    }
                },
            }
        }
        out
    }
}

/// Interpolate `text` in one step.
pub fn interpolate<F>(text: &str, resolve: F) -> Interpolation
where
    F: FnMut(&str) -> Option<String>,
{
    Template::parse(text).render(resolve)
}

/// Follow a dotted path from `root`.
///
/// Returns `None` on any missing segment. Empty segments (`a..b`, trailing
/// dots) never match.
pub fn lookup<'v>(root: &'v Value, path: &str) -> Option<Cow<'v, Value>> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    lookup_segments(root, first, segments)
}

/// Follow a dotted path into a sequence of items.
///
/// Used for bound collections, which are stored as slices rather than JSON
/// arrays: `count` yields the length, a numeric segment indexes an item.
pub fn lookup_in_items<'v>(items: &'v [Value], path: &str) -> Option<Cow<'v, Value>> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    if first == "count" {
        return segments
            .next()
            .is_none()
            .then(|| Cow::Owned(Value::from(items.len())));
    }
    let item = items.get(first.parse::<usize>().ok()?)?;
    match segments.next() {
        None => Some(Cow::Borrowed(item)),
        Some(next) => lookup_segments(item, next, segments),
    }
}

fn lookup_segments<'v, 'p>(
    root: &'v Value,
    first: &'p str,
    mut rest: impl Iterator<Item = &'p str>,
) -> Option<Cow<'v, Value>> {
    let mut current = root;
    let mut segment = Some(first);
    while let Some(name) = segment {
        if name.is_empty() {
            return None;
        }
        let next = rest.next();
        current = match current {
            Value::Object(map) => map.get(name)?,
            Value::Array(items) if name == "count" => {
                return next
                    .is_none()
                    .then(|| Cow::Owned(Value::from(items.len())));
            }
            Value::Array(items) => items.get(name.parse::<usize>().ok()?)?,
            _ => return None,
        };
        segment = next;
    }
    Some(Cow::Borrowed(current))
}

/// Text shown for a scalar value.
///
/// Strings are returned verbatim, whole numbers without a fraction, booleans
/// as `true`/`false`. Null, arrays and objects have no text form.
pub fn display_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else if let Some(u) = n.as_u64() {
                Some(u.to_string())
            } else {
                let f = n.as_f64()?;
                if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
                    Some(format!("{}", f as i64))
                } else {
                    Some(n.to_string())
                }
            }
        }
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Whether a bound value counts as "true" for conditionals.
///
/// Null, `false`, `0` and `""` are falsy. Arrays and objects are truthy even
/// when empty.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
