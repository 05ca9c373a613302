use std::borrow::Cow;

pub trait SecretsProvider {
    fn get_consumer_key_pair<'a>(&'a self) -> (&'a str, &'a str);

    fn get_token_pair_option<'a>(&'a self) -> Option<(&'a str, &'a str)>;

    fn get_token_option_pair<'a>(&'a self) -> (Option<&'a str>, Option<&'a str>) {
        self.get_token_pair_option()
            .map(|s| (Some(s.0), Some(s.1)))
            .unwrap_or_else(|| (None, None))
    }
}

/// Consumer credentials of the application, plus the token pair of the acting
/// user once one is known.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Secrets<'a> {
    consumer_key: Cow<'a, str>,
    consumer_secret: Cow<'a, str>,
    token: Option<(Cow<'a, str>, Cow<'a, str>)>,
}

impl<'a> Secrets<'a> {
    pub fn new<TKey, TSecret>(consumer_key: TKey, consumer_secret: TSecret) -> Self
    where
        TKey: Into<Cow<'a, str>>,
        TSecret: Into<Cow<'a, str>>,
    {
        Secrets {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            token: None,
        }
    }

    pub fn token<TKey, TSecret>(self, token: TKey, token_secret: TSecret) -> Self
    where
        TKey: Into<Cow<'a, str>>,
        TSecret: Into<Cow<'a, str>>,
    {
        Secrets {
            token: Some((token.into(), token_secret.into())),
            ..self
        }
    }

    pub(crate) fn set_consumer_key<TKey, TSecret>(&mut self, key: TKey, secret: TSecret)
    where
        TKey: Into<Cow<'a, str>>,
        TSecret: Into<Cow<'a, str>>,
    {
        self.consumer_key = key.into();
        self.consumer_secret = secret.into();
    }

    pub(crate) fn set_token<TKey, TSecret>(&mut self, token: TKey, token_secret: TSecret)
    where
        TKey: Into<Cow<'a, str>>,
        TSecret: Into<Cow<'a, str>>,
    {
        self.token = Some((token.into(), token_secret.into()));
    }
}

impl SecretsProvider for Secrets<'_> {
    fn get_consumer_key_pair<'a>(&'a self) -> (&'a str, &'a str) {
        (&self.consumer_key, &self.consumer_secret)
    }

    // an empty token counts as unset, which is what the token handshake expects
    fn get_token_pair_option<'a>(&'a self) -> Option<(&'a str, &'a str)> {
        match self.token {
            Some((ref token, ref secret)) if !token.is_empty() => {
                Some((token.as_ref(), secret.as_ref()))
            }
            _ => None,
        }
    }
}
