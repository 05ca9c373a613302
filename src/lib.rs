/*!
oauth1-dispatch: call Twitter-style REST APIs by method name, signed with OAuth 1.0a.

# Overview

A method identifier such as `statuses_update` or `statuses_show_ID` is resolved
against an endpoint table into an HTTP verb and a path. The parameters are
signed with HMAC-SHA1 and sent through a [reqwest](https://crates.io/crates/reqwest)
client (or any other [`Transport`] / [`AsyncTransport`]). Whatever comes back
(JSON, urlencoded token replies or a bare redirect) is normalized into a [`Reply`].

# How to use

## Basic usecase 1 - sending the tweet

```no_run
use oauth1_dispatch::{Client, Params, Secrets};

# async fn run() -> oauth1_dispatch::Result<()> {
let secrets = Secrets::new("[CONSUMER_KEY]", "[CONSUMER_SECRET]")
    .token("[ACCESS_TOKEN]", "[TOKEN_SECRET]");

let client = Client::new(secrets)?;
let reply = client
    .call_async("statuses_update", Params::new().with("status", "Hello, Twitter!"))
    .await?;
println!("{}: {}", reply.httpstatus, reply.data);
# Ok(())
# }
```

## Basic usecase 2 - Acquiring OAuth token & secret

```no_run
use std::io;
use oauth1_dispatch::{Client, Params, Secrets, TokenReaderFuture};

# async fn run() -> Result<(), Box<dyn std::error::Error>> {
let mut client = Client::new(Secrets::new("[CONSUMER_KEY]", "[CONSUMER_SECRET]"))?;

// step 1: acquire request token & token secret
let token = client
    .call_async("oauth_requestToken", Params::new().with("oauth_callback", "oob"))
    .parse_oauth_token()
    .await?;
client.set_token_from(&token);

// step 2. acquire user pin
println!("please access to: {}", client.authorize_url()?);
println!("input pin: ");
let mut user_input = String::new();
io::stdin().read_line(&mut user_input)?;
let pin = user_input.trim().to_string();

// step 3. acquire access token
let token = client
    .call_async("oauth_accessToken", Params::new().with("oauth_verifier", pin))
    .parse_oauth_token()
    .await?;
client.set_token_from(&token);
println!("other attributes: {:#?}", token.remain);
# Ok(())
# }
```
*/
mod client;
mod config;
pub mod encode;
mod endpoints;
mod error;
mod media;
mod params;
mod reply;
mod request;
mod resolver;
mod secrets;
mod signer;
mod token_reader;
mod transport;

// exposed to external program
pub use client::Client;
pub use config::{Config, ReturnFormat};
pub use endpoints::{EndpointTable, TwitterEndpoints};
pub use error::{
    Error, ResolveError, ResolveResult, Result, SignError, SignResult, TokenReaderError,
    TokenReaderResult,
};
pub use media::{ImageFormat, LocalMedia, MediaSource};
pub use params::{Params, Value};
pub use reply::{parse_headers, parse_reply, Reply};
pub use request::{Body, RequestBuilder, SignedRequest};
pub use resolver::{resolve, Resolved};
pub use secrets::{Secrets, SecretsProvider};
pub use signer::{nonce, OAuthParameters, SignedPayload, Signer};
pub use token_reader::{TokenReader, TokenReaderFuture, TokenResponse};
pub use transport::{AsyncTransport, RawResponse, Transport};

// exposed constant variables
/// Represents `oauth_callback`.
pub const OAUTH_CALLBACK_KEY: &str = "oauth_callback";
/// Represents `oauth_nonce`.
pub const OAUTH_NONCE_KEY: &str = "oauth_nonce";
/// Represents `oauth_timestamp`.
pub const OAUTH_TIMESTAMP_KEY: &str = "oauth_timestamp";
/// Represents `oauth_verifier`.
pub const OAUTH_VERIFIER_KEY: &str = "oauth_verifier";
/// Represents `oauth_version`.
pub const OAUTH_VERSION_KEY: &str = "oauth_version";

// crate-private constant variables
pub(crate) const OAUTH_KEY_PREFIX: &str = "oauth_";
pub(crate) const OAUTH_SIGNATURE_METHOD_KEY: &str = "oauth_signature_method";
pub(crate) const OAUTH_CONSUMER_KEY: &str = "oauth_consumer_key";
pub(crate) const OAUTH_TOKEN_KEY: &str = "oauth_token";
pub(crate) const OAUTH_SIGNATURE_KEY: &str = "oauth_signature";
