//! Prompt template rendering.
//!
//! Templates use `{{name}}` or `{{{name}}}` placeholders. Both forms insert
//! the value unescaped; prompts are plain text, never HTML.

use serde_json::{Map, Value};
use thiserror::Error;

/// Errors produced while rendering a template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("no value supplied for placeholder `{0}`")]
    MissingValue(String),
}

/// Natural-language prompt text with named placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    text: String,
}

enum Segment<'a> {
    Literal(&'a str),
    Placeholder(&'a str),
}

impl Template {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Distinct placeholder names in order of first appearance.
    pub fn placeholders(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for segment in self.segments() {
            if let Segment::Placeholder(name) = segment {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// Substitute every placeholder with the matching entry of `values`.
    pub fn render(&self, values: &Map<String, Value>) -> Result<String, TemplateError> {
        let mut out = String::with_capacity(self.text.len());
        for segment in self.segments() {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(name) => match values.get(name) {
                    Some(Value::String(s)) => out.push_str(s),
                    Some(other) => out.push_str(&other.to_string()),
                    None => return Err(TemplateError::MissingValue(name.to_string())),
                },
            }
        }
        Ok(out)
    }

    fn segments(&self) -> Vec<Segment<'_>> {
        let mut segments = Vec::new();
        let mut rest = self.text.as_str();

        while let Some(start) = rest.find("{{") {
            let (literal, tagged) = rest.split_at(start);
            let (open, close) = if tagged.starts_with("{{{") {
                (3, "}}}")
            } else {
                (2, "}}")
            };
            let body = &tagged[open..];

            let Some(end) = body.find(close) else {
                break;
            };
            let name = body[..end].trim();
            if is_identifier(name) {
                segments.push(Segment::Literal(literal));
                segments.push(Segment::Placeholder(name));
            } else {
                // Not a placeholder; keep the braces and inner text verbatim.
                segments.push(Segment::Literal(&rest[..start + open + end + close.len()]));
            }
            rest = &body[end + close.len()..];
        }

        if !rest.is_empty() {
            segments.push(Segment::Literal(rest));
        }
        segments
    }
}

fn is_identifier(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_')
}
