use http::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use http::Method;
use url::Url;

use crate::{
    Config, EndpointTable, OAuthParameters, Params, Resolved, Result, SecretsProvider, Signer,
};

const OAUTH_PATH_PREFIX: &str = "oauth/";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Body of a [`SignedRequest`].
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Empty,
    /// Signed `application/x-www-form-urlencoded` string.
    Form(String),
    /// Parts of a `multipart/form-data` body, one per parameter.
    Multipart(Params),
}

/// A signed request, ready to hand over to a transport.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Body,
}

/// Assembles signed requests from resolved methods.
pub struct RequestBuilder<'a, TSecretsProvider>
where
    TSecretsProvider: SecretsProvider,
{
    signer: Signer<'a, TSecretsProvider>,
    config: &'a Config,
    table: &'a dyn EndpointTable,
}

impl<'a, TSecretsProvider> RequestBuilder<'a, TSecretsProvider>
where
    TSecretsProvider: SecretsProvider,
{
    pub fn new(
        secrets: &'a TSecretsProvider,
        parameters: &'a OAuthParameters<'a>,
        config: &'a Config,
        table: &'a dyn EndpointTable,
    ) -> Self {
        RequestBuilder {
            signer: Signer::new(secrets, parameters),
            config,
            table,
        }
    }

    /// Full URL of an API path: handshake paths live under the OAuth base,
    /// everything else is a `.json` resource under the current or the legacy
    /// base.
    pub fn endpoint(&self, path: &str, template: &str) -> Result<Url> {
        let url = if path.starts_with(OAUTH_PATH_PREFIX) {
            format!("{}{}", self.config.endpoint_oauth, path)
        } else if self.table.is_legacy(template) {
            format!("{}{}.json", self.config.endpoint_legacy, path)
        } else {
            format!("{}{}.json", self.config.endpoint, path)
        };
        Ok(Url::parse(&url)?)
    }

    /// Signs the resolved call.
    ///
    /// GET parameters travel in the query string and other verbs send a
    /// signed form body. Multipart bodies are not part of the signature; they
    /// are sent as they are next to an `Authorization` header.
    pub fn build(&self, resolved: Resolved) -> Result<SignedRequest> {
        let Resolved {
            method,
            path,
            template,
            params,
            multipart,
        } = resolved;
        let url = self.endpoint(&path, &template)?;
        let mut headers = HeaderMap::new();

        if method == Method::GET {
            let signed = self.signer.sign(&method, url.as_str(), &params, false)?;
            return Ok(SignedRequest {
                method,
                url: Url::parse(signed.as_str())?,
                headers,
                body: Body::Empty,
            });
        }

        let body = if multipart {
            let authorization = self
                .signer
                .sign(&method, url.as_str(), &Params::new(), true)?;
            headers.insert(AUTHORIZATION, HeaderValue::from_str(authorization.as_str())?);
            Body::Multipart(params)
        } else {
            let signed = self.signer.sign(&method, url.as_str(), &params, false)?;
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
            Body::Form(signed.into_string())
        };

        Ok(SignedRequest {
            method,
            url,
            headers,
            body,
        })
    }
}
