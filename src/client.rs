use std::borrow::Cow;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::encode::encode_str;
use crate::reply::parse_reply;
use crate::resolver::resolve;
use crate::{
    AsyncTransport, Config, EndpointTable, LocalMedia, MediaSource, OAuthParameters, Params,
    RawResponse, Reply, RequestBuilder, ReturnFormat, Secrets, SecretsProvider, SignError,
    SignResult, SignedRequest, TokenResponse, Transport, TwitterEndpoints,
};

const OAUTH_AUTHENTICATE_PATH: &str = "oauth/authenticate";
const OAUTH_AUTHORIZE_PATH: &str = "oauth/authorize";

/// Single-slot reply cache with a fixed time-to-live.
#[derive(Debug)]
struct ReplyCache {
    slot: Mutex<Option<(Instant, Reply)>>,
}

impl ReplyCache {
    fn new() -> Self {
        ReplyCache {
            slot: Mutex::new(None),
        }
    }

    fn get(&self, ttl: Duration) -> Option<Reply> {
        let slot = match self.slot.lock() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        match *slot {
            Some((stored, ref reply)) if stored.elapsed() < ttl => Some(reply.clone()),
            _ => None,
        }
    }

    fn put(&self, reply: Reply) {
        let mut slot = match self.slot.lock() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        *slot = Some((Instant::now(), reply));
    }
}

enum Step {
    Cached(Reply),
    Send { request: SignedRequest, template: String },
}

/// API client dispatching method identifiers to signed requests.
///
/// The transport `T` decides between [`Client::call`] (blocking) and
/// [`Client::call_async`].
pub struct Client<T> {
    transport: T,
    secrets: Secrets<'static>,
    parameters: OAuthParameters<'static>,
    config: Config,
    endpoints: Box<dyn EndpointTable + Send + Sync>,
    media: Box<dyn MediaSource + Send + Sync>,
    cache: ReplyCache,
}

impl Client<reqwest::Client> {
    /// Constructs a new `Client` on top of an async `reqwest::Client` that
    /// does not follow redirects.
    pub fn new(secrets: Secrets<'static>) -> crate::Result<Self> {
        let inner = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Client::with_transport(secrets, inner))
    }
}

#[cfg(feature = "blocking")]
impl Client<reqwest::blocking::Client> {
    /// Constructs a new `Client` on top of a blocking `reqwest` client that
    /// does not follow redirects.
    pub fn new_blocking(secrets: Secrets<'static>) -> crate::Result<Self> {
        let inner = reqwest::blocking::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Client::with_transport(secrets, inner))
    }
}

impl<T> Client<T> {
    /// Constructs a new `Client` with a custom transport, the Twitter endpoint
    /// table and local file access for uploads.
    pub fn with_transport(secrets: Secrets<'static>, transport: T) -> Self {
        Client {
            transport,
            secrets,
            parameters: OAuthParameters::new(),
            config: Config::default(),
            endpoints: Box::new(TwitterEndpoints),
            media: Box::new(LocalMedia),
            cache: ReplyCache::new(),
        }
    }

    pub fn config(self, config: Config) -> Self {
        Client { config, ..self }
    }

    pub fn endpoints<E>(self, endpoints: E) -> Self
    where
        E: EndpointTable + Send + Sync + 'static,
    {
        Client {
            endpoints: Box::new(endpoints),
            ..self
        }
    }

    pub fn media<M>(self, media: M) -> Self
    where
        M: MediaSource + Send + Sync + 'static,
    {
        Client {
            media: Box::new(media),
            ..self
        }
    }

    /// Replaces the OAuth parameters, e.g. to pin nonce and timestamp.
    pub fn oauth_parameters(self, parameters: OAuthParameters<'static>) -> Self {
        Client { parameters, ..self }
    }

    pub fn set_consumer_key<K, S>(&mut self, key: K, secret: S)
    where
        K: Into<Cow<'static, str>>,
        S: Into<Cow<'static, str>>,
    {
        self.secrets.set_consumer_key(key, secret);
    }

    pub fn set_token<K, S>(&mut self, token: K, secret: S)
    where
        K: Into<Cow<'static, str>>,
        S: Into<Cow<'static, str>>,
    {
        self.secrets.set_token(token, secret);
    }

    /// Uses the token pair of a handshake reply.
    pub fn set_token_from(&mut self, token: &TokenResponse) {
        self.set_token(token.oauth_token.clone(), token.oauth_token_secret.clone());
    }

    pub fn set_return_format(&mut self, format: ReturnFormat) {
        self.config.return_format = format;
    }

    /// URL to send the user to for "Sign in with Twitter".
    pub fn authenticate_url(&self) -> SignResult<String> {
        self.handshake_url(OAUTH_AUTHENTICATE_PATH)
    }

    /// URL to send the user to for authorizing the application.
    pub fn authorize_url(&self) -> SignResult<String> {
        self.handshake_url(OAUTH_AUTHORIZE_PATH)
    }

    fn handshake_url(&self, path: &str) -> SignResult<String> {
        let (token, _) = self
            .secrets
            .get_token_pair_option()
            .ok_or(SignError::MissingCredential("OAuth token"))?;
        Ok(format!(
            "{}{}?oauth_token={}",
            self.config.endpoint_oauth,
            path,
            encode_str(token)
        ))
    }

    fn begin(&self, identifier: &str, params: Params) -> crate::Result<Step> {
        let resolved = resolve(identifier, params, &*self.endpoints, &*self.media)?;
        let template = resolved.template.clone();
        if self.endpoints.is_cached(&template) {
            if let Some(reply) = self.cache.get(self.config.cache_ttl()) {
                log::debug!("serving {} from cache", template);
                return Ok(Step::Cached(reply));
            }
        }
        let request = RequestBuilder::new(
            &self.secrets,
            &self.parameters,
            &self.config,
            &*self.endpoints,
        )
        .build(resolved)?;
        log::debug!("{} {}", request.method, request.url.path());
        Ok(Step::Send { request, template })
    }

    fn finish(&self, template: &str, raw: RawResponse) -> Reply {
        let reply = parse_reply(
            &raw,
            self.config.return_format,
            self.endpoints.redirect_field(template),
        );
        log::debug!("{} answered {}", template, reply.httpstatus);
        if reply.httpstatus == 200 && self.endpoints.is_cached(template) {
            self.cache.put(reply.clone());
        }
        reply
    }
}

impl<T> Client<T>
where
    T: Transport,
{
    /// Calls an API method.
    ///
    /// `identifier` names the method (`statuses_update`, `statuses_show_ID`),
    /// `params` carries its parameters. Fails before anything is sent when
    /// the method cannot be resolved or signed.
    pub fn call(&self, identifier: &str, params: Params) -> crate::Result<Reply> {
        match self.begin(identifier, params)? {
            Step::Cached(reply) => Ok(reply),
            Step::Send { request, template } => {
                let raw = self.transport.execute(request)?;
                Ok(self.finish(&template, raw))
            }
        }
    }
}

impl<T> Client<T>
where
    T: AsyncTransport,
{
    /// Async counterpart of [`Client::call`].
    pub async fn call_async(&self, identifier: &str, params: Params) -> crate::Result<Reply> {
        match self.begin(identifier, params)? {
            Step::Cached(reply) => Ok(reply),
            Step::Send { request, template } => {
                let raw = self.transport.execute(request).await?;
                Ok(self.finish(&template, raw))
            }
        }
    }
}
