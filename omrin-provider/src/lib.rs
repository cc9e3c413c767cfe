//! Provider implementation for Omrin using the Freed account API.

use std::str;
use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{NaiveDate, NaiveDateTime, ParseError};
use reqwest::{Client, RequestBuilder};
use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::pkcs8::DecodePublicKey;
use rsa::{Pkcs1v15Encrypt, RsaPublicKey};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use omrin_core::{
    model::{Address, Category, ClientId, CollectionEvent, HouseNumber, PublicKey},
    ports::{CalendarPort, PortError},
};

/// Production API root.
pub const BASE_URL: &str = "https://api-omrin.freed.nl";

/// Body of /Account/GetToken/
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct TokenRequest<'req> {
    app_id: String,
    app_version: &'req str,
    os_version: &'req str,
    platform: &'req str,
}

/// Response from /Account/GetToken/
#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(rename = "PublicKey")]
    public_key: String,
}

/// Plaintext that gets encrypted for /Account/FetchAccount/{appId}
#[derive(Debug, Serialize)]
struct AccountRequest<'req> {
    #[serde(rename = "a")]
    flag: bool,
    #[serde(rename = "Email")]
    email: Option<&'req str>,
    #[serde(rename = "Password")]
    password: Option<&'req str>,
    #[serde(rename = "PostalCode")]
    postal_code: &'req str,
    #[serde(rename = "HouseNumber")]
    house_number: &'req HouseNumber,
}

/// Response from /Account/FetchAccount/{appId}
#[derive(Debug, Deserialize)]
struct AccountResponse {
    #[serde(rename = "CalendarHomeV2")]
    calendar: Vec<CalendarEntry>,
    // account, notifications, etc. are not needed
}

/// Single pickup inside `CalendarHomeV2`
#[derive(Debug, Deserialize)]
struct CalendarEntry {
    #[serde(rename = "Datum")]
    date: String, // "2024-05-01T00:00:00"
    #[serde(rename = "Omschrijving")]
    description: String, // "Biobak", "Sortibak", ...
}

/// Key exchange and calendar fetching against the Omrin API.
pub struct OmrinCalendarPort {
    client: Client,
    base_url: String,
}

impl OmrinCalendarPort {
    /// Create a port against an API root such as [`BASE_URL`].
    #[must_use]
    pub fn with_base_url<S: Into<String>>(client: Client, base_url: S) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self { client, base_url }
    }
}

#[async_trait]
impl CalendarPort for OmrinCalendarPort {
    async fn fetch_public_key(&self, client_id: &ClientId) -> Result<PublicKey, PortError> {
        let body = TokenRequest {
            app_id: client_id.to_string(),
            app_version: "",
            os_version: "",
            platform: "",
        };
        let req = self
            .client
            .post(format!("{}/Account/GetToken/", self.base_url))
            .json(&body);

        let resp = fetch_json::<TokenResponse>(req).await?;
        let key = STANDARD
            .decode(resp.public_key.trim())
            .map_err(|err| PortError::InvalidKey(err.to_string()))?;

        debug!(bytes = key.len(), "received provider public key");
        Ok(PublicKey(key))
    }

    async fn fetch_calendar(
        &self,
        client_id: &ClientId,
        public_key: &PublicKey,
        address: &Address,
    ) -> Result<Vec<CollectionEvent>, PortError> {
        let encrypted = encrypt_account_request(public_key, address)?;

        // The endpoint expects a JSON string literal, not an object.
        let req = self
            .client
            .post(format!("{}/Account/FetchAccount/{client_id}", self.base_url))
            .body(format!("\"{encrypted}\""));

        let account = fetch_json::<AccountResponse>(req).await?;

        let mut events = Vec::with_capacity(account.calendar.len());
        for entry in account.calendar {
            events.push(CollectionEvent {
                date: parse_collection_date(&entry.date)?,
                category: Category(entry.description),
            });
        }

        debug!(events = events.len(), "decoded collection calendar");
        Ok(events)
    }
}

/// Build the shared port for the Omrin provider rooted at `base_url`.
#[must_use]
pub fn port(client: Client, base_url: &str) -> Arc<dyn CalendarPort> {
    Arc::new(OmrinCalendarPort::with_base_url(client, base_url))
}

/// Encrypt the account request for `address` and Base64-encode the ciphertext.
///
/// # Errors
///
/// Returns [`PortError::InvalidKey`] when the key cannot be loaded and
/// [`PortError::Encryption`] when the payload does not fit the key.
pub fn encrypt_account_request(key: &PublicKey, address: &Address) -> Result<String, PortError> {
    let rsa_key = load_rsa_key(key)?;
    let plaintext = account_request_json(address)?;

    let mut rng = rand::thread_rng();
    let ciphertext = rsa_key
        .encrypt(&mut rng, Pkcs1v15Encrypt, &plaintext)
        .map_err(|err| PortError::Encryption(err.to_string()))?;

    Ok(STANDARD.encode(ciphertext))
}

fn account_request_json(address: &Address) -> Result<Vec<u8>, PortError> {
    let request = AccountRequest {
        flag: false,
        email: None,
        password: None,
        postal_code: &address.postal_code,
        house_number: &address.house_number,
    };
    serde_json::to_vec(&request).map_err(|err| PortError::Internal(err.to_string()))
}

/// Accept the key as DER or PEM, in either SubjectPublicKeyInfo or PKCS#1 form.
fn load_rsa_key(key: &PublicKey) -> Result<RsaPublicKey, PortError> {
    let bytes = key.as_bytes();

    if let Ok(text) = str::from_utf8(bytes)
        && text.trim_start().starts_with("-----BEGIN")
    {
        let pem = text.trim();
        return RsaPublicKey::from_public_key_pem(pem)
            .or_else(|_| RsaPublicKey::from_pkcs1_pem(pem))
            .map_err(|err| PortError::InvalidKey(err.to_string()));
    }

    RsaPublicKey::from_public_key_der(bytes)
        .or_else(|_| RsaPublicKey::from_pkcs1_der(bytes))
        .map_err(|err| PortError::InvalidKey(err.to_string()))
}

/// `Datum` carries a local timestamp; only the day matters.
fn parse_collection_date(raw: &str) -> Result<NaiveDate, ParseError> {
    raw.parse::<NaiveDateTime>()
        .map(|timestamp| timestamp.date())
        .or_else(|_| raw.parse::<NaiveDate>())
}

// Small helper to fetch and decode JSON with status handling.
async fn fetch_json<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, PortError> {
    let resp = req.send().await.map_err(PortError::from)?;

    let status = resp.status();
    if !status.is_success() {
        return Err(PortError::Protocol {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_owned(),
        });
    }

    resp.json().await.map_err(PortError::from)
}
