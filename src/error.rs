use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;
pub type SignResult<T> = std::result::Result<T, SignError>;
pub type ResolveResult<T> = std::result::Result<T, ResolveError>;
pub type TokenReaderResult<T> = std::result::Result<T, TokenReaderError>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("token acquisition failed : {0}")]
    TokenReader(#[from] TokenReaderError),
    #[error("OAuth sign failed : {0}")]
    Signer(#[from] SignError),
    #[error("method resolution failed : {0}")]
    Resolve(#[from] ResolveError),
    #[error("invalid endpoint url : {0}")]
    Url(#[from] url::ParseError),
    #[error("invalid header value : {0}")]
    InvalidHeader(#[from] http::header::InvalidHeaderValue),
    #[error("request failed : {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("transport failed : {0}")]
    Transport(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignError {
    #[error("{0} must be set before signing.")]
    MissingCredential(&'static str),
    #[error("{0} is not available.")]
    MissingCapability(&'static str),
    #[error("invalid argument : {0}")]
    InvalidArgument(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("to call the templated method \"{template}\", specify the parameter value for \"{parameter}\".")]
    MissingParameter { template: String, parameter: String },
    #[error("can't find HTTP method to use for \"{0}\".")]
    UnknownMethod(String),
    #[error("parameter {0} must be a single value, lists are not supported for uploading media.")]
    UnsupportedParameterShape(String),
}

#[derive(Error, Debug, Clone)]
pub enum TokenReaderError {
    #[error("response has malformed format: not found {0} in {1}")]
    TokenKeyNotFound(&'static str, String),
}
