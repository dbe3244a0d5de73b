use super::provider::read_json;
use crate::error::{ProviderError, ProviderErrorKind};
use crate::palette::{Palette, PALETTE_SIZE};
use reqwest::Client;
use serde_json::{json, Value};

pub const COLORMIND_NAME: &str = "Colormind";

/// Client for the Colormind palette API, which needs no theme or credential.
pub struct ColormindClient {
    client: Client,
    url: String,
}

impl ColormindClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }

    pub async fn fetch(&self) -> Result<Palette, ProviderError> {
        tracing::debug!("[{}] Requesting palette from {}", COLORMIND_NAME, self.url);

        let response = self
            .client
            .post(&self.url)
            .json(&json!({ "model": "default" }))
            .send()
            .await
            .map_err(|e| ProviderError::transport(COLORMIND_NAME, e))?;

        let data = read_json(COLORMIND_NAME, response).await?;
        palette_from_result(&data)
    }
}

fn palette_from_result(data: &Value) -> Result<Palette, ProviderError> {
    let invalid = || {
        ProviderError::new(
            COLORMIND_NAME,
            ProviderErrorKind::Api,
            "Invalid Colormind response",
        )
    };

    let result = data
        .get("result")
        .and_then(|r| r.as_array())
        .filter(|r| r.len() >= PALETTE_SIZE)
        .ok_or_else(invalid)?;

    let colors = result
        .iter()
        .take(PALETTE_SIZE)
        .map(|rgb| rgb_to_hex(rgb).ok_or_else(invalid))
        .collect::<Result<Vec<_>, _>>()?;

    Palette::new(colors).map_err(|_| invalid())
}

fn rgb_to_hex(rgb: &Value) -> Option<String> {
    let channels = rgb.as_array()?;
    if channels.len() != 3 {
        return None;
    }
    let mut hex = String::from("#");
    for channel in channels {
        let value = u8::try_from(channel.as_u64()?).ok()?;
        hex.push_str(&format!("{:02x}", value));
    }
    Some(hex)
}
