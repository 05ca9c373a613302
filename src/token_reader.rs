use std::{collections::HashMap, future::Future};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::{Error, Reply, Result, TokenReaderError, TokenReaderResult};

const OAUTH_TOKEN_KEY: &str = "oauth_token";

const OAUTH_TOKEN_SECRET_KEY: &str = "oauth_token_secret";

const HTTP_STATUS_KEY: &str = "httpstatus";

/// Represents response of token acquisition.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct TokenResponse {
    /// OAuth Token
    pub oauth_token: String,
    /// OAuth Token Secret
    pub oauth_token_secret: String,
    /// Other contents
    #[serde(flatten)]
    pub remain: HashMap<String, String>,
}

/// Add parse_oauth_token feature to [`Reply`] and to call results.
// this trait is sealed
pub trait TokenReader: private::Sealed {
    fn parse_oauth_token(self) -> Result<TokenResponse>;
}

impl TokenReader for Reply {
    fn parse_oauth_token(self) -> Result<TokenResponse> {
        Ok(read_oauth_token(&self)?)
    }
}

impl<E> TokenReader for std::result::Result<Reply, E>
where
    E: Into<Error>,
{
    fn parse_oauth_token(self) -> Result<TokenResponse> {
        match self {
            Ok(reply) => reply.parse_oauth_token(),
            Err(err) => Err(err.into()),
        }
    }
}

/// Add parse_oauth_token feature to Future of call results.
// this trait is also sealed
#[async_trait(?Send)]
pub trait TokenReaderFuture: private::SealedWrapper {
    async fn parse_oauth_token(self) -> Result<TokenResponse>;
}

#[async_trait(?Send)]
impl<T, E> TokenReaderFuture for T
where
    T: Future<Output = std::result::Result<Reply, E>>,
    E: Into<Error> + 'static,
{
    async fn parse_oauth_token(self) -> Result<TokenResponse> {
        self.await.parse_oauth_token()
    }
}

fn read_oauth_token(reply: &Reply) -> TokenReaderResult<TokenResponse> {
    let mut destructured = match &reply.data {
        Value::Object(fields) => fields
            .iter()
            .filter(|(key, _)| key.as_str() != HTTP_STATUS_KEY)
            .map(|(key, value)| {
                let value = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (key.clone(), value)
            })
            .collect::<HashMap<String, String>>(),
        _ => HashMap::new(),
    };
    let oauth_token = destructured.remove(OAUTH_TOKEN_KEY);
    let oauth_token_secret = destructured.remove(OAUTH_TOKEN_SECRET_KEY);
    match (oauth_token, oauth_token_secret) {
        (Some(t), Some(s)) => Ok(TokenResponse {
            oauth_token: t,
            oauth_token_secret: s,
            remain: destructured,
        }),
        (None, _) => Err(TokenReaderError::TokenKeyNotFound(
            OAUTH_TOKEN_KEY,
            reply.data.to_string(),
        )),
        (_, _) => Err(TokenReaderError::TokenKeyNotFound(
            OAUTH_TOKEN_SECRET_KEY,
            reply.data.to_string(),
        )),
    }
}

mod private {
    use std::future::Future;

    use crate::{Error, Reply};

    pub trait Sealed {}
    impl Sealed for Reply {}
    impl<E> Sealed for Result<Reply, E> where E: Into<Error> {}
    pub trait SealedWrapper {}
    impl<T, E> SealedWrapper for T
    where
        T: Future<Output = Result<Reply, E>>,
        E: Into<Error>,
    {
    }
}
