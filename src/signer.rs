use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::{SystemTime, UNIX_EPOCH};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use hmac::{Hmac, Mac};
use http::Method;
use sha1::{Digest, Sha1};

use crate::encode::{encode, encode_str};
use crate::{
    Params, SecretsProvider, SignError, SignResult, OAUTH_CONSUMER_KEY, OAUTH_KEY_PREFIX,
    OAUTH_NONCE_KEY, OAUTH_SIGNATURE_KEY, OAUTH_SIGNATURE_METHOD_KEY, OAUTH_TIMESTAMP_KEY,
    OAUTH_TOKEN_KEY, OAUTH_VERSION_KEY,
};

type HmacSha1 = Hmac<Sha1>;

const SIGNATURE_METHOD: &str = "HMAC-SHA1";
const OAUTH_VERSION: &str = "1.0";
const DEFAULT_NONCE_LENGTH: usize = 8;

static NONCE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generates a nonce of `length` lowercase hex characters.
///
/// The digest input mixes a nanosecond timestamp, a process-wide counter and
/// the current thread id, so concurrent callers never share a seed.
///
/// # Errors
///
/// Fails with [`SignError::InvalidArgument`] when `length` is zero.
pub fn nonce(length: usize) -> SignResult<String> {
    if length < 1 {
        return Err(SignError::InvalidArgument(format!(
            "nonce length must be at least 1, got {}",
            length
        )));
    }
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let count = NONCE_COUNTER.fetch_add(1, Ordering::Relaxed);
    let seed = format!("{}:{}:{:?}", nanos, count, thread::current().id());

    let mut out = String::with_capacity(length);
    let mut block: u32 = 0;
    while out.len() < length {
        let digest = Sha1::new()
            .chain_update(seed.as_bytes())
            .chain_update(block.to_be_bytes())
            .finalize();
        out.push_str(&hex::encode(digest));
        block += 1;
    }
    out.truncate(length);
    Ok(out)
}

fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Where the signature ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignedPayload {
    /// Full URL with the signed parameters as its query string (GET).
    Query(String),
    /// Signed `application/x-www-form-urlencoded` body.
    Body(String),
    /// `Authorization` header value, for multipart requests.
    Header(String),
}

impl SignedPayload {
    pub fn as_str(&self) -> &str {
        match self {
            SignedPayload::Query(s) | SignedPayload::Body(s) | SignedPayload::Header(s) => s,
        }
    }

    pub fn into_string(self) -> String {
        match self {
            SignedPayload::Query(s) | SignedPayload::Body(s) | SignedPayload::Header(s) => s,
        }
    }
}

struct SignatureBase {
    pairs: Vec<(String, String)>,
    param_string: String,
    base_string: String,
}

#[derive(Debug, Clone)]
pub struct Signer<'a, TSecretsProvider>
where
    TSecretsProvider: SecretsProvider,
{
    secrets: &'a TSecretsProvider,
    parameters: &'a OAuthParameters<'a>,
}

impl<'a, TSecretsProvider> Signer<'a, TSecretsProvider>
where
    TSecretsProvider: SecretsProvider,
{
    pub fn new(secrets: &'a TSecretsProvider, parameters: &'a OAuthParameters<'a>) -> Self {
        Signer {
            secrets,
            parameters,
        }
    }

    /// Returns the signature base string for the request.
    ///
    /// Deterministic only when the nonce and timestamp are fixed through
    /// [`OAuthParameters`].
    pub fn base_string(&self, method: &Method, url: &str, params: &Params) -> SignResult<String> {
        Ok(self.signature_base(method, url, params)?.base_string)
    }

    /// Signs the request.
    ///
    /// GET requests come back as a signed URL, other verbs as a signed form
    /// body. With `multipart` set the body parameters stay out of the
    /// signature; only the `oauth_*` parameters and the signature are
    /// returned, as an `Authorization` header value.
    pub fn sign(
        &self,
        method: &Method,
        url: &str,
        params: &Params,
        multipart: bool,
    ) -> SignResult<SignedPayload> {
        if multipart {
            let oauth_params: Params = params
                .iter()
                .filter(|(key, _)| key.starts_with(OAUTH_KEY_PREFIX))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect();
            let base = self.signature_base(method, url, &oauth_params)?;
            let signature = encode_str(&self.digest(&base.base_string)?);

            let mut pairs = base.pairs;
            pairs.push((OAUTH_SIGNATURE_KEY.to_string(), signature));
            pairs.sort();
            let header = pairs
                .iter()
                .map(|(key, value)| format!("{}=\"{}\"", key, value))
                .collect::<Vec<_>>()
                .join(", ");
            return Ok(SignedPayload::Header(format!("OAuth {}", header)));
        }

        let base = self.signature_base(method, url, params)?;
        let signature = encode_str(&self.digest(&base.base_string)?);
        let signed = format!(
            "{}&{}={}",
            base.param_string, OAUTH_SIGNATURE_KEY, signature
        );
        if *method == Method::GET {
            Ok(SignedPayload::Query(format!("{}?{}", url, signed)))
        } else {
            Ok(SignedPayload::Body(signed))
        }
    }

    fn signature_base(
        &self,
        method: &Method,
        url: &str,
        params: &Params,
    ) -> SignResult<SignatureBase> {
        let (consumer_key, consumer_secret) = self.secrets.get_consumer_key_pair();
        if consumer_key.is_empty() {
            return Err(SignError::MissingCredential("consumer key"));
        }
        if consumer_secret.is_empty() {
            return Err(SignError::MissingCredential("consumer secret"));
        }
        let (token, _) = self.secrets.get_token_option_pair();

        let mut merged = BTreeMap::new();
        for (key, value) in self.parameters.oauth_pairs(consumer_key, token)? {
            merged.insert(key.to_string(), encode_str(&value));
        }
        for (key, value) in params {
            merged.insert(encode_str(key), encode(value).into_joined());
        }
        // key order first, value order on ties
        let mut pairs: Vec<(String, String)> = merged.into_iter().collect();
        pairs.sort();

        let param_string = pairs
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>()
            .join("&");
        let base_string = format!(
            "{}&{}&{}",
            method.as_str(),
            encode_str(url),
            encode_str(&param_string)
        );
        log::trace!("signature base string: {}", base_string);

        Ok(SignatureBase {
            pairs,
            param_string,
            base_string,
        })
    }

    fn digest(&self, base_string: &str) -> SignResult<String> {
        let (_, consumer_secret) = self.secrets.get_consumer_key_pair();
        let (_, token_secret) = self.secrets.get_token_option_pair();
        let key = format!(
            "{}&{}",
            encode_str(consumer_secret),
            encode_str(token_secret.unwrap_or_default())
        );
        let mut mac = HmacSha1::new_from_slice(key.as_bytes())
            .map_err(|_| SignError::MissingCapability(SIGNATURE_METHOD))?;
        mac.update(base_string.as_bytes());
        Ok(BASE64.encode(mac.finalize().into_bytes()))
    }
}

#[derive(Debug, Clone)]
pub struct OAuthParameters<'a> {
    nonce: Option<Cow<'a, str>>,
    timestamp: Option<u64>,
    version: bool,
}

impl Default for OAuthParameters<'static> {
    fn default() -> Self {
        OAuthParameters {
            nonce: None,
            timestamp: None,
            version: true,
        }
    }
}

impl<'a> OAuthParameters<'a> {
    pub fn new() -> Self {
        OAuthParameters {
            nonce: None,
            timestamp: None,
            version: true,
        }
    }

    /// set the oauth_nonce value
    ///
    /// When unset, every signature gets a fresh 8-character nonce.
    pub fn nonce<T>(self, nonce: T) -> Self
    where
        T: Into<Cow<'a, str>>,
    {
        OAuthParameters {
            nonce: Some(nonce.into()),
            ..self
        }
    }

    /// set the oauth_timestamp value
    pub fn timestamp<T>(self, timestamp: T) -> Self
    where
        T: Into<u64>,
    {
        OAuthParameters {
            timestamp: Some(timestamp.into()),
            ..self
        }
    }

    /// set the oauth_version value (boolean)
    ///
    /// # Note
    /// When the version has value `true` (the default), oauth_version will be
    /// set with "1.0". Otherwise, oauth_version will not be included in your
    /// request.
    pub fn version<T>(self, version: T) -> Self
    where
        T: Into<bool>,
    {
        OAuthParameters {
            version: version.into(),
            ..self
        }
    }

    fn oauth_pairs(
        &self,
        consumer_key: &str,
        token: Option<&str>,
    ) -> SignResult<Vec<(&'static str, String)>> {
        let nonce = match self.nonce {
            Some(ref nonce) => nonce.to_string(),
            None => nonce(DEFAULT_NONCE_LENGTH)?,
        };
        let timestamp = self.timestamp.unwrap_or_else(unix_timestamp);

        let mut pairs = vec![
            (OAUTH_CONSUMER_KEY, consumer_key.to_string()),
            (OAUTH_NONCE_KEY, nonce),
            (OAUTH_SIGNATURE_METHOD_KEY, SIGNATURE_METHOD.to_string()),
            (OAUTH_TIMESTAMP_KEY, timestamp.to_string()),
        ];
        if let Some(token) = token {
            pairs.push((OAUTH_TOKEN_KEY, token.to_string()));
        }
        if self.version {
            pairs.push((OAUTH_VERSION_KEY, OAUTH_VERSION.to_string()));
        }
        Ok(pairs)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::Secrets;

    // https://developer.twitter.com/en/docs/authentication/oauth-1-0a/creating-a-signature
    const C_KEY: &str = "xvz1evFS4wEEPTGEFPHBog";
    const C_SECRET: &str = "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw";
    const NONCE: &str = "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg";
    const TIMESTAMP: u64 = 1_318_622_958;
    const TOKEN: &str = "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb";
    const TOKEN_SECRET: &str = "LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE";
    const UPDATE_URL: &str = "https://api.twitter.com/1.1/statuses/update.json";

    fn fixed_parameters() -> OAuthParameters<'static> {
        OAuthParameters::new().nonce(NONCE).timestamp(TIMESTAMP)
    }

    fn status_params() -> Params {
        Params::new()
            .with("include_entities", "true")
            .with("status", "Hello Ladies + Gentlemen, a signed OAuth request!")
    }

    fn extract_signature(auth_header: &str) -> String {
        let content = auth_header.strip_prefix("OAuth ").unwrap();
        let sig_content = content
            .split(',')
            .map(|item| item.trim().splitn(2, '=').collect::<Vec<&str>>())
            .filter(|v| v.len() == 2)
            .find(|v| v[0] == "oauth_signature")
            .map(|v| v[1].to_string())
            .unwrap();
        percent_encoding::percent_decode_str(sig_content.trim_matches('"'))
            .decode_utf8_lossy()
            .to_string()
    }

    #[test]
    fn base_string_matches_reference() {
        let secrets = Secrets::new(C_KEY, C_SECRET).token(TOKEN, TOKEN_SECRET);
        let parameters = fixed_parameters();
        let signer = Signer::new(&secrets, &parameters);
        let base = signer
            .base_string(&Method::POST, UPDATE_URL, &status_params())
            .unwrap();
        assert_eq!(
            base,
            "POST&https%3A%2F%2Fapi.twitter.com%2F1.1%2Fstatuses%2Fupdate.json&include_entities%3Dtrue%26oauth_consumer_key%3Dxvz1evFS4wEEPTGEFPHBog%26oauth_nonce%3DkYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg%26oauth_signature_method%3DHMAC-SHA1%26oauth_timestamp%3D1318622958%26oauth_token%3D370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb%26oauth_version%3D1.0%26status%3DHello%2520Ladies%2520%252B%2520Gentlemen%252C%2520a%2520signed%2520OAuth%2520request%2521"
        );
    }

    #[test]
    fn sign_post_body() {
        let secrets = Secrets::new(C_KEY, C_SECRET).token(TOKEN, TOKEN_SECRET);
        let parameters = fixed_parameters();
        let signed = Signer::new(&secrets, &parameters)
            .sign(&Method::POST, UPDATE_URL, &status_params(), false)
            .unwrap();
        assert_eq!(
            signed,
            SignedPayload::Body(
                "include_entities=true&oauth_consumer_key=xvz1evFS4wEEPTGEFPHBog&oauth_nonce=kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg&oauth_signature_method=HMAC-SHA1&oauth_timestamp=1318622958&oauth_token=370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb&oauth_version=1.0&status=Hello%20Ladies%20%2B%20Gentlemen%2C%20a%20signed%20OAuth%20request%21&oauth_signature=hCtSmYh%2BiHYCEqBWrE7C7hYmtUk%3D"
                    .to_string()
            )
        );
    }

    #[test]
    fn sign_get_query() {
        // https://tools.ietf.org/html/rfc5849#section-1.2
        let secrets = Secrets::new("dpf43f3p2l4k3l03", "kd94hf93k423kf44")
            .token("nnch734d00sl2jdk", "pfkkdhi9sl3r4s00");
        let parameters = OAuthParameters::new()
            .nonce("chapoH")
            .timestamp(137_131_202u64)
            .version(false);
        let params = Params::new()
            .with("file", "vacation.jpg")
            .with("size", "original");

        let signed = Signer::new(&secrets, &parameters)
            .sign(
                &Method::GET,
                "http://photos.example.net/photos",
                &params,
                false,
            )
            .unwrap();
        assert_eq!(
            signed,
            SignedPayload::Query(
                "http://photos.example.net/photos?file=vacation.jpg&oauth_consumer_key=dpf43f3p2l4k3l03&oauth_nonce=chapoH&oauth_signature_method=HMAC-SHA1&oauth_timestamp=137131202&oauth_token=nnch734d00sl2jdk&size=original&oauth_signature=MdpQcU8iPSUjWoN%2FUDMsK2sui9I%3D"
                    .to_string()
            )
        );
    }

    #[test]
    fn sign_multipart_header() {
        let secrets = Secrets::new(C_KEY, C_SECRET).token(TOKEN, TOKEN_SECRET);
        let parameters = fixed_parameters();
        let signer = Signer::new(&secrets, &parameters);
        let signed = signer
            .sign(&Method::POST, UPDATE_URL, &Params::new(), true)
            .unwrap();
        let header = match signed {
            SignedPayload::Header(header) => header,
            other => panic!("expected a header, got {:?}", other),
        };
        assert!(header.starts_with("OAuth oauth_consumer_key=\"xvz1evFS4wEEPTGEFPHBog\", oauth_nonce="));
        assert!(header.ends_with(", oauth_version=\"1.0\""));
        assert!(!header.contains("status"));

        // the header carries the signature of an empty parameter set
        let base = signer
            .base_string(&Method::POST, UPDATE_URL, &Params::new())
            .unwrap();
        assert_eq!(extract_signature(&header), signer.digest(&base).unwrap());
    }

    #[test]
    fn multipart_header_skips_body_parameters() {
        let secrets = Secrets::new(C_KEY, C_SECRET).token(TOKEN, TOKEN_SECRET);
        let parameters = fixed_parameters();
        let signer = Signer::new(&secrets, &parameters);
        let signed = signer
            .sign(&Method::POST, UPDATE_URL, &status_params(), true)
            .unwrap();
        assert!(!signed.as_str().contains("include_entities"));
        assert!(!signed.as_str().contains("status="));

        // same header, signature included, as for an empty body
        let empty = signer
            .sign(&Method::POST, UPDATE_URL, &Params::new(), true)
            .unwrap();
        assert_eq!(signed, empty);

        // oauth_* parameters still take part
        let with_callback = signer
            .sign(
                &Method::POST,
                UPDATE_URL,
                &status_params().with("oauth_callback", "oob"),
                true,
            )
            .unwrap();
        assert!(with_callback
            .as_str()
            .starts_with("OAuth oauth_callback=\"oob\", oauth_consumer_key="));
        assert_ne!(extract_signature(with_callback.as_str()), extract_signature(empty.as_str()));
    }

    #[test]
    fn sort_is_case_sensitive_and_bytewise() {
        let secrets = Secrets::new(C_KEY, C_SECRET);
        let parameters = fixed_parameters().version(false);
        let params = Params::new()
            .with("b", "2")
            .with("B", "1")
            .with("a", "z")
            .with("a_", "y");
        let signed = Signer::new(&secrets, &parameters)
            .sign(&Method::POST, UPDATE_URL, &params, false)
            .unwrap();
        assert!(signed.as_str().starts_with(
            "B=1&a=z&a_=y&b=2&oauth_consumer_key=xvz1evFS4wEEPTGEFPHBog&oauth_nonce="
        ));
    }

    #[test]
    fn round_trip_get_signature() {
        let secrets = Secrets::new(C_KEY, C_SECRET).token(TOKEN, TOKEN_SECRET);
        let parameters = fixed_parameters();
        let signer = Signer::new(&secrets, &parameters);
        let url = "https://api.twitter.com/1.1/statuses/user_timeline.json";
        let params = Params::new()
            .with("screen_name", "twitterapi")
            .with("count", 2)
            .with("q", "a+b (c)!");

        let signed = signer.sign(&Method::GET, url, &params, false).unwrap();
        let (base_url, query) = signed.as_str().split_once('?').unwrap();
        assert_eq!(base_url, url);

        let mut recovered = Params::from_query(query).unwrap();
        let signature = recovered.remove("oauth_signature").unwrap();
        let resigned = signer.sign(&Method::GET, url, &recovered, false).unwrap();
        let resigned_query = resigned.as_str().split_once('?').unwrap().1;
        let resigned_signature = Params::from_query(resigned_query)
            .unwrap()
            .remove("oauth_signature")
            .unwrap();
        assert_eq!(signature, resigned_signature);
        assert_eq!(resigned.as_str(), signed.as_str());
    }

    #[test]
    fn agrees_with_oauth1_request() {
        use oauth1_request::signer::Signer as OAuthSigner;
        use oauth1_request::{HmacSha1 as ReferenceHmacSha1, Options};

        let url = url::Url::parse("https://api.twitter.com/1.1/statuses/user_timeline.json")
            .unwrap();
        let secrets = Secrets::new(C_KEY, C_SECRET).token(TOKEN, TOKEN_SECRET);
        let parameters = fixed_parameters();
        let params = Params::new()
            .with("count", "2")
            .with("screen_name", "twitterapi");
        let ours = Signer::new(&secrets, &parameters)
            .sign(&Method::GET, url.as_str(), &params, false)
            .unwrap();
        let our_query = ours.as_str().split_once('?').unwrap().1;
        let our_signature = Params::from_query(our_query)
            .unwrap()
            .remove("oauth_signature")
            .unwrap();

        let mut options = Options::new();
        options.nonce(NONCE);
        options.timestamp(TIMESTAMP);
        options.token(TOKEN);
        options.version(true);
        // parameters must be added in alphabetical order around the oauth_* block
        let mut reference = OAuthSigner::with_signature_method(
            ReferenceHmacSha1,
            "GET",
            url,
            C_SECRET,
            Some(TOKEN_SECRET),
        );
        reference.parameter("count", "2");
        let mut reference = reference.oauth_parameters(C_KEY, &options);
        reference.parameter("screen_name", "twitterapi");
        let authorization = reference.finish().authorization;

        assert_eq!(
            our_signature,
            crate::Value::from(extract_signature(&authorization))
        );
    }

    #[test]
    fn missing_consumer_key() {
        let secrets = Secrets::new("", C_SECRET);
        let parameters = OAuthParameters::new();
        let result =
            Signer::new(&secrets, &parameters).sign(&Method::GET, UPDATE_URL, &Params::new(), false);
        assert_eq!(result, Err(SignError::MissingCredential("consumer key")));
    }

    #[test]
    fn missing_consumer_secret() {
        let secrets = Secrets::new(C_KEY, "");
        let parameters = OAuthParameters::new();
        let result =
            Signer::new(&secrets, &parameters).sign(&Method::GET, UPDATE_URL, &Params::new(), false);
        assert_eq!(result, Err(SignError::MissingCredential("consumer secret")));
    }

    #[test]
    fn token_is_optional() {
        let secrets = Secrets::new(C_KEY, C_SECRET);
        let parameters = fixed_parameters();
        let signed = Signer::new(&secrets, &parameters)
            .sign(&Method::POST, UPDATE_URL, &Params::new(), false)
            .unwrap();
        assert!(!signed.as_str().contains("oauth_token="));
    }

    #[test]
    fn nonce_length() {
        assert_eq!(nonce(8).unwrap().len(), 8);
        assert_eq!(nonce(1).unwrap().len(), 1);
        let long = nonce(100).unwrap();
        assert_eq!(long.len(), 100);
        assert!(long.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(matches!(nonce(0), Err(SignError::InvalidArgument(_))));
    }

    #[test]
    fn nonce_unique_across_threads() {
        let handles: Vec<_> = (0..8)
            .map(|_| thread::spawn(|| (0..250).map(|_| nonce(16).unwrap()).collect::<Vec<_>>()))
            .collect();
        let mut seen = HashSet::new();
        for handle in handles {
            for n in handle.join().unwrap() {
                assert!(seen.insert(n));
            }
        }
        assert_eq!(seen.len(), 2000);
    }
}
