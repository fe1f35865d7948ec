//! OAuth 1.0a request signing (HMAC-SHA1)
//!
//! Twitter's user-context authentication for posting signs every request
//! with the consumer key/secret and access token/secret. JSON request bodies
//! are not part of the signature; only query or form parameters are.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::distributions::Alphanumeric;
use rand::Rng;
use ring::hmac;
use secrecy::ExposeSecret;

use crate::accounts::AccountCredentials;

const SIGNATURE_METHOD: &str = "HMAC-SHA1";
const OAUTH_VERSION: &str = "1.0";
const NONCE_LEN: usize = 32;

/// Signs requests on behalf of one account
pub struct OAuthSigner<'a> {
    credentials: &'a AccountCredentials,
}

impl<'a> OAuthSigner<'a> {
    pub fn new(credentials: &'a AccountCredentials) -> Self {
        Self { credentials }
    }

    /// Build the `Authorization` header value with a fresh nonce and timestamp
    ///
    /// `url` must not carry a query string; pass query parameters in `params`.
    pub fn authorization_header(&self, method: &str, url: &str, params: &[(&str, &str)]) -> String {
        let nonce = generate_nonce();
        let timestamp = chrono::Utc::now().timestamp().to_string();
        self.authorization_header_with(method, url, params, &nonce, &timestamp)
    }

    /// Same as [`authorization_header`](Self::authorization_header) with a fixed nonce and timestamp
    pub fn authorization_header_with(
        &self,
        method: &str,
        url: &str,
        params: &[(&str, &str)],
        nonce: &str,
        timestamp: &str,
    ) -> String {
        let oauth_params = self.oauth_params(nonce, timestamp);
        let signature = self.signature(method, url, params, &oauth_params);

        let mut header_params = oauth_params.to_vec();
        header_params.push(("oauth_signature", signature.as_str()));
        header_params.sort();

        let fields = header_params
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", encode(k), encode(v)))
            .collect::<Vec<_>>()
            .join(", ");

        format!("OAuth {}", fields)
    }

    fn oauth_params<'s>(&'s self, nonce: &'s str, timestamp: &'s str) -> [(&'s str, &'s str); 6] {
        [
            ("oauth_consumer_key", self.credentials.consumer_key().expose_secret()),
            ("oauth_nonce", nonce),
            ("oauth_signature_method", SIGNATURE_METHOD),
            ("oauth_timestamp", timestamp),
            ("oauth_token", self.credentials.access_token().expose_secret()),
            ("oauth_version", OAUTH_VERSION),
        ]
    }

    fn signature(
        &self,
        method: &str,
        url: &str,
        params: &[(&str, &str)],
        oauth_params: &[(&str, &str)],
    ) -> String {
        let base = signature_base_string(method, url, params, oauth_params);
        let signing_key = format!(
            "{}&{}",
            encode(self.credentials.consumer_secret().expose_secret()),
            encode(self.credentials.access_secret().expose_secret())
        );

        let key = hmac::Key::new(hmac::HMAC_SHA1_FOR_LEGACY_USE_ONLY, signing_key.as_bytes());
        let tag = hmac::sign(&key, base.as_bytes());
        STANDARD.encode(tag.as_ref())
    }
}

/// `METHOD&encoded-url&encoded-sorted-params`
pub fn signature_base_string(
    method: &str,
    url: &str,
    params: &[(&str, &str)],
    oauth_params: &[(&str, &str)],
) -> String {
    let mut pairs: Vec<(String, String)> = params
        .iter()
        .chain(oauth_params.iter())
        .map(|(k, v)| (encode(k), encode(v)))
        .collect();
    pairs.sort();

    let parameter_string = pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_uppercase(),
        encode(url),
        encode(&parameter_string)
    )
}

/// RFC 3986 percent-encoding (everything but `A-Z a-z 0-9 - . _ ~`)
fn encode(s: &str) -> String {
    urlencoding::encode(s).into_owned()
}

fn generate_nonce() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(NONCE_LEN)
        .map(char::from)
        .collect()
}
