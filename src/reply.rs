use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::{RawResponse, ReturnFormat};

const HTTP_STATUS_KEY: &str = "httpstatus";
const MESSAGE_KEY: &str = "message";
const LOCATION_HEADER: &str = "location";

/// A normalized API reply.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    /// HTTP status code of the response.
    pub httpstatus: u16,
    /// Decoded body. An object carries the status code as its `httpstatus`
    /// field as well.
    pub data: Value,
}

impl Reply {
    /// Looks up a top-level field of an object reply.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.httpstatus)
    }
}

/// Parses a raw header block, one `Name: value` per line. Names are
/// lowercased and the last occurrence of a name wins. Lines without a colon,
/// such as the status line, are skipped.
pub fn parse_headers(head: &str) -> HashMap<String, String> {
    head.split("\r\n")
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| (key.trim().to_ascii_lowercase(), value.trim().to_string()))
        .collect()
}

/// Normalizes a raw response.
///
/// `redirect_field` names the field to fill from the `Location` header for
/// endpoints that answer with a redirect instead of a body.
pub fn parse_reply(
    raw: &RawResponse,
    format: ReturnFormat,
    redirect_field: Option<&str>,
) -> Reply {
    let body = raw.body.as_str();
    let mut data = if body == "[]" {
        match format {
            ReturnFormat::Array => Value::Array(Vec::new()),
            ReturnFormat::Object => Value::Object(Map::new()),
        }
    } else if let Some(field) = redirect_field {
        let mut parsed = Map::new();
        if let Some(location) = parse_headers(&raw.headers).remove(LOCATION_HEADER) {
            parsed.insert(field.to_string(), Value::String(location));
        }
        Value::Object(parsed)
    } else {
        match serde_json::from_str::<Value>(body) {
            Ok(Value::Object(parsed)) => Value::Object(parsed),
            Ok(Value::Array(items)) => match format {
                ReturnFormat::Array => Value::Array(items),
                ReturnFormat::Object => Value::Object(
                    items
                        .into_iter()
                        .enumerate()
                        .map(|(i, item)| (i.to_string(), item))
                        .collect(),
                ),
            },
            _ => Value::Object(parse_urlencoded(body)),
        }
    };

    if let Value::Object(ref mut fields) = data {
        fields.insert(HTTP_STATUS_KEY.to_string(), Value::from(raw.status));
    }
    Reply {
        httpstatus: raw.status,
        data,
    }
}

// `key=value&...` bodies, as sent by the OAuth endpoints and some legacy
// errors. Elements without '=' end up in `message`.
fn parse_urlencoded(body: &str) -> Map<String, Value> {
    let mut parsed = Map::new();
    if body.is_empty() {
        return parsed;
    }
    for element in body.split('&') {
        match element.split_once('=') {
            Some((key, value)) => {
                parsed.insert(key.to_string(), Value::String(value.to_string()));
            }
            None => {
                parsed.insert(MESSAGE_KEY.to_string(), Value::String(element.to_string()));
            }
        }
    }
    parsed
}
