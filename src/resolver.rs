//! Turns a method identifier such as `statuses_show_ID` into a concrete API
//! path.
//!
//! Identifiers are split into segments at `_`, `.` or `/`. A whole segment
//! written in capitals (two characters or more) is a placeholder filled from
//! the parameter of the same name in lower case. Other capitals mark camelCase
//! word breaks: `statuses_userTimeline` resolves to `statuses/user_timeline`.

use http::Method;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::encode::encode_str;
use crate::{EndpointTable, MediaSource, Params, ResolveError, ResolveResult, Value};

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new("^[A-Z_]{2,}$").expect("valid regex"));

/// A method identifier resolved against an [`EndpointTable`].
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub method: Method,
    /// Path with placeholder values filled in, e.g. `statuses/show/42`.
    pub path: String,
    /// Path with placeholders, e.g. `statuses/show/:id`.
    pub template: String,
    /// Remaining parameters; placeholder values are removed, file parameters
    /// may carry file content.
    pub params: Params,
    pub multipart: bool,
}

enum Segment {
    Literal(String),
    /// Lowercased parameter name.
    Placeholder(String),
}

pub fn resolve(
    identifier: &str,
    mut params: Params,
    table: &dyn EndpointTable,
    media: &dyn MediaSource,
) -> ResolveResult<Resolved> {
    let normalized = normalize(identifier, table.underscored_parameters());
    if normalized.split('/').all(str::is_empty) {
        return Err(ResolveError::UnknownMethod(identifier.to_string()));
    }

    let segments = split_segments(&normalized);
    let template = assemble(&segments, |name| format!(":{}", name));

    let mut values: Vec<(&str, String)> = Vec::new();
    for segment in &segments {
        if let Segment::Placeholder(name) = segment {
            match params.get(name) {
                Some(Value::Scalar(value)) => values.push((name.as_str(), encode_str(value))),
                _ => {
                    return Err(ResolveError::MissingParameter {
                        template,
                        parameter: name.clone(),
                    })
                }
            }
        }
    }
    let path = assemble(&segments, |name| {
        values
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.clone())
            .unwrap_or_default()
    });
    for (name, _) in &values {
        params.remove(name);
    }

    let method = table
        .method(&template, !params.is_empty())
        .ok_or_else(|| ResolveError::UnknownMethod(template.clone()))?;
    let multipart = table.is_multipart(&template);
    if multipart {
        load_files(&template, &mut params, table, media)?;
    }
    log::debug!("resolved {} to {} {}", identifier, method, path);

    Ok(Resolved {
        method,
        path,
        template,
        params,
        multipart,
    })
}

// delimiters become '/', except inside the upper-cased form of underscored
// parameter names such as SCREEN_NAME
fn normalize(identifier: &str, underscored: &[&str]) -> String {
    let mut normalized = identifier.replace(|c: char| c == '_' || c == '.', "/");
    for name in underscored {
        let upper = name.to_uppercase();
        normalized = normalized.replace(&upper.replace('_', "/"), &upper);
    }
    normalized
}

fn split_segments(normalized: &str) -> Vec<Segment> {
    normalized
        .split('/')
        .map(|segment| {
            if PLACEHOLDER.is_match(segment) {
                Segment::Placeholder(segment.to_lowercase())
            } else {
                Segment::Literal(untemplate(segment))
            }
        })
        .collect()
}

fn assemble<F>(segments: &[Segment], mut placeholder: F) -> String
where
    F: FnMut(&str) -> String,
{
    segments
        .iter()
        .map(|segment| match segment {
            Segment::Literal(s) => s.clone(),
            Segment::Placeholder(name) => placeholder(name),
        })
        .collect::<Vec<_>>()
        .join("/")
}

// camelCase word breaks: A-Z becomes _a-z
fn untemplate(literal: &str) -> String {
    let mut out = String::with_capacity(literal.len());
    for c in literal.chars() {
        if c.is_ascii_uppercase() {
            out.push('_');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

fn load_files(
    template: &str,
    params: &mut Params,
    table: &dyn EndpointTable,
    media: &dyn MediaSource,
) -> ResolveResult<()> {
    for name in table.file_parameters(template) {
        let content = match params.get(name) {
            None | Some(Value::Bytes(_)) => continue,
            Some(Value::List(_)) => {
                return Err(ResolveError::UnsupportedParameterShape(name.to_string()))
            }
            Some(Value::Scalar(path)) => media.load_image(path),
        };
        if let Some(content) = content {
            params.insert(*name, Value::Bytes(content));
        }
    }
    Ok(())
}
