//! The network boundary: transports execute [`SignedRequest`]s and hand back
//! the status, raw header block and body.
//!
//! Transports must not follow redirects, some endpoints answer with one on
//! purpose.

use async_trait::async_trait;
use http::{HeaderMap, StatusCode, Version};

use crate::{Body, Params, Result, SignedRequest, Value};

/// Raw response as returned by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    /// Header block: the status line, then one `Name: value` per line,
    /// separated by CRLF.
    pub headers: String,
    pub body: String,
}

impl RawResponse {
    /// Splits a raw `headers\r\n\r\nbody` response at the first blank line.
    pub fn from_raw(status: u16, raw: &str) -> Self {
        let (headers, body) = raw.split_once("\r\n\r\n").unwrap_or((raw, ""));
        RawResponse {
            status,
            headers: headers.to_string(),
            body: body.to_string(),
        }
    }
}

/// Blocking transport.
pub trait Transport {
    fn execute(&self, request: SignedRequest) -> Result<RawResponse>;
}

/// Async transport.
#[async_trait]
pub trait AsyncTransport {
    async fn execute(&self, request: SignedRequest) -> Result<RawResponse>;
}

fn header_block(version: Version, status: StatusCode, headers: &HeaderMap) -> String {
    let mut lines = vec![format!("{:?} {}", version, status)];
    for (name, value) in headers {
        lines.push(format!(
            "{}: {}",
            name,
            String::from_utf8_lossy(value.as_bytes())
        ));
    }
    lines.join("\r\n")
}

// one part per scalar, one part per list element, binary parts for file content
fn multipart_parts(params: Params) -> Vec<(String, Value)> {
    params
        .into_iter()
        .flat_map(|(name, value)| match value {
            Value::List(items) => items
                .into_iter()
                .map(|item| (name.clone(), Value::Scalar(item)))
                .collect::<Vec<_>>(),
            other => vec![(name, other)],
        })
        .collect()
}

#[cfg(feature = "multipart")]
fn multipart_form(params: Params) -> reqwest::multipart::Form {
    use reqwest::multipart::{Form, Part};

    multipart_parts(params)
        .into_iter()
        .fold(Form::new(), |form, (name, value)| match value {
            Value::Bytes(content) => form.part(name, Part::bytes(content)),
            other => form.text(name, other.to_param_string().unwrap_or_default()),
        })
}

#[async_trait]
impl AsyncTransport for reqwest::Client {
    async fn execute(&self, request: SignedRequest) -> Result<RawResponse> {
        let SignedRequest {
            method,
            url,
            headers,
            body,
        } = request;
        let builder = self.request(method, url).headers(headers);
        let builder = match body {
            Body::Empty => builder,
            Body::Form(form) => builder.body(form),
            #[cfg(feature = "multipart")]
            Body::Multipart(params) => builder.multipart(multipart_form(params)),
            #[cfg(not(feature = "multipart"))]
            Body::Multipart(_) => {
                return Err(crate::Error::Transport(
                    "multipart bodies need the `multipart` feature".to_string(),
                ))
            }
        };

        let response = builder.send().await?;
        let status = response.status();
        let headers = header_block(response.version(), status, response.headers());
        let body = response.text().await?;
        Ok(RawResponse {
            status: status.as_u16(),
            headers,
            body,
        })
    }
}

#[cfg(all(feature = "blocking", feature = "multipart"))]
fn blocking_multipart_form(params: Params) -> reqwest::blocking::multipart::Form {
    use reqwest::blocking::multipart::{Form, Part};

    multipart_parts(params)
        .into_iter()
        .fold(Form::new(), |form, (name, value)| match value {
            Value::Bytes(content) => form.part(name, Part::bytes(content)),
            other => form.text(name, other.to_param_string().unwrap_or_default()),
        })
}

#[cfg(feature = "blocking")]
impl Transport for reqwest::blocking::Client {
    fn execute(&self, request: SignedRequest) -> Result<RawResponse> {
        let SignedRequest {
            method,
            url,
            headers,
            body,
        } = request;
        let builder = self.request(method, url).headers(headers);
        let builder = match body {
            Body::Empty => builder,
            Body::Form(form) => builder.body(form),
            #[cfg(feature = "multipart")]
            Body::Multipart(params) => builder.multipart(blocking_multipart_form(params)),
            #[cfg(not(feature = "multipart"))]
            Body::Multipart(_) => {
                return Err(crate::Error::Transport(
                    "multipart bodies need the `multipart` feature".to_string(),
                ))
            }
        };

        let response = builder.send()?;
        let status = response.status();
        let headers = header_block(response.version(), status, response.headers());
        let body = response.text()?;
        Ok(RawResponse {
            status: status.as_u16(),
            headers,
            body,
        })
    }
}
