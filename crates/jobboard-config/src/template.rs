//! Job templates.
//!
//! A template is an HTML snippet rendered once per job record. Placeholders
//! name a record field:
//! - `${id}` - The job identifier
//! - `${status}` - A top-level field
//! - `${owner.name}` - A field nested inside an object field
//!
//! Templates come from an operator-supplied file. When the file is missing
//! or does not compile, [`load_template`] falls back to [`JobTemplate::Noop`]
//! so the dashboard keeps running with empty rows.

use std::path::Path;
use std::sync::LazyLock;

use askama::Template;
use jobboard_core::JobRecord;
use regex::Regex;
use serde_json::Value;
use tracing::{info, warn};

use crate::{ConfigError, ConfigResult};

// Matches a `${...}` placeholder, capturing everything up to the closing brace
static PLACEHOLDER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]*)\}").unwrap());

// A valid placeholder: dotted path of identifier segments
static NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_-]*(?:\.[a-zA-Z_][a-zA-Z0-9_-]*)*$").unwrap()
});

/// A compiled job template.
#[derive(Debug, Clone, PartialEq)]
pub enum JobTemplate {
    /// A template that rendered successfully from source.
    Compiled { source: String, segments: Vec<Segment> },
    /// Stand-in used when no usable template exists. Renders nothing.
    Noop,
}

/// A piece of a compiled template.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Literal(String),
    Field(Vec<String>),
}

impl JobTemplate {
    /// Compile template source.
    pub fn compile(source: &str) -> ConfigResult<Self> {
        let mut segments = Vec::new();
        let mut last = 0;

        for caps in PLACEHOLDER_REGEX.captures_iter(source) {
            let Some(whole) = caps.get(0) else { continue };
            let name = caps[1].trim();

            check_literal(source, last, whole.start())?;
            if !NAME_REGEX.is_match(name) {
                return Err(ConfigError::Template {
                    offset: whole.start(),
                    message: format!("invalid placeholder '${{{}}}'", &caps[1]),
                });
            }

            if whole.start() > last {
                segments.push(Segment::Literal(source[last..whole.start()].to_string()));
            }
            segments.push(Segment::Field(name.split('.').map(String::from).collect()));
            last = whole.end();
        }

        check_literal(source, last, source.len())?;
        if last < source.len() {
            segments.push(Segment::Literal(source[last..].to_string()));
        }

        Ok(Self::Compiled {
            source: source.to_string(),
            segments,
        })
    }

    pub fn is_noop(&self) -> bool {
        matches!(self, Self::Noop)
    }

    /// Expand the template for one record.
    ///
    /// Strings are inserted as-is, other values as JSON, missing fields as
    /// nothing. All inserted text is HTML-escaped.
    pub fn render(&self, record: &JobRecord) -> String {
        let Self::Compiled { segments, .. } = self else {
            return String::new();
        };

        let mut out = String::new();
        for segment in segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(path) => {
                    if let Some(value) = resolve(record, path) {
                        out.push_str(&escape_html(&display_value(&value)));
                    }
                }
            }
        }
        out
    }

    /// Placeholder paths used by this template, in order of appearance.
    pub fn placeholders(&self) -> Vec<String> {
        match self {
            Self::Compiled { segments, .. } => segments
                .iter()
                .filter_map(|s| match s {
                    Segment::Field(path) => Some(path.join(".")),
                    Segment::Literal(_) => None,
                })
                .collect(),
            Self::Noop => Vec::new(),
        }
    }
}

/// Load and compile the template at `path`, falling back to
/// [`JobTemplate::Noop`] on any failure.
pub fn load_template(path: Option<&Path>) -> JobTemplate {
    let Some(path) = path else {
        info!("No job template configured, rendering empty rows");
        return JobTemplate::Noop;
    };

    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read job template");
            return JobTemplate::Noop;
        }
    };

    match JobTemplate::compile(&source) {
        Ok(template) => {
            info!(path = %path.display(), "Loaded job template");
            template
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to compile job template");
            JobTemplate::Noop
        }
    }
}

/// A literal stretch must not contain the start of an unclosed placeholder.
fn check_literal(source: &str, start: usize, end: usize) -> ConfigResult<()> {
    match source[start..end].find("${") {
        Some(pos) => Err(ConfigError::Template {
            offset: start + pos,
            message: "unterminated placeholder".to_string(),
        }),
        None => Ok(()),
    }
}

fn resolve(record: &JobRecord, path: &[String]) -> Option<Value> {
    let (first, rest) = path.split_first()?;
    let mut value = record.get(first)?;
    for key in rest {
        value = value.get(key.as_str())?.clone();
    }
    Some(value)
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// HTML-escapes a single inserted value through askama's escaper.
#[derive(Template)]
#[template(source = "{{ text }}", ext = "html")]
struct EscapedText<'a> {
    text: &'a str,
}

fn escape_html(text: &str) -> String {
    // Only a formatter error can fail here.
    EscapedText { text }.render().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> JobRecord {
        JobRecord::from_value(value).unwrap()
    }

    #[test]
    fn test_render_fields() {
        let template =
            JobTemplate::compile(r#"<li data-id="${id}">${name}: ${status}</li>"#).unwrap();
        let job = record(json!({"id": 4, "name": "nightly", "status": "running"}));

        assert_eq!(
            template.render(&job),
            r#"<li data-id="4">nightly: running</li>"#
        );
    }

    #[test]
    fn test_nested_and_missing_fields() {
        let template = JobTemplate::compile("${owner.name}|${warnings}|${missing}").unwrap();
        let job = record(json!({"id": 1, "owner": {"name": "ci"}, "warnings": 3}));

        assert_eq!(template.render(&job), "ci|3|");
    }

    #[test]
    fn test_values_are_escaped() {
        let template = JobTemplate::compile("<b>${name}</b>").unwrap();
        let job = record(json!({"id": 1, "name": "<script>&"}));

        assert_eq!(template.render(&job), "<b>&lt;script&gt;&amp;</b>");
    }

    #[test]
    fn test_quotes_are_escaped() {
        let template = JobTemplate::compile(r#"<li title="${name}">"#).unwrap();
        let job = record(json!({"id": 1, "name": "a\"b"}));

        let rendered = template.render(&job);
        assert!(!rendered.contains(r#"a"b"#));
        assert!(rendered.starts_with(r#"<li title="a&"#));
    }

    #[test]
    fn test_unterminated_placeholder() {
        let err = JobTemplate::compile("<li>${status</li>").unwrap_err();
        assert!(matches!(err, ConfigError::Template { offset: 4, .. }));
    }

    #[test]
    fn test_invalid_placeholder_name() {
        let err = JobTemplate::compile("${1abc}").unwrap_err();
        assert!(matches!(err, ConfigError::Template { offset: 0, .. }));
    }

    #[test]
    fn test_braces_without_dollar_are_literal() {
        let template = JobTemplate::compile(r#"{"id": "${id}"}"#).unwrap();
        let job = record(json!({"id": "abc"}));
        assert_eq!(template.render(&job), r#"{"id": "abc"}"#);
    }

    #[test]
    fn test_placeholders() {
        let template = JobTemplate::compile("${id} ${owner.name}").unwrap();
        assert_eq!(template.placeholders(), vec!["id", "owner.name"]);
    }

    #[test]
    fn test_noop_renders_nothing() {
        let job = record(json!({"id": 1}));
        assert_eq!(JobTemplate::Noop.render(&job), "");
        assert!(JobTemplate::Noop.placeholders().is_empty());
    }

    #[test]
    fn test_load_template_falls_back_to_noop() {
        assert!(load_template(None).is_noop());
        assert!(load_template(Some(Path::new("/nonexistent/job.html"))).is_noop());
    }
}
