// [libs/infra/providers/src/ai_client.rs]
/*!
 * APARATO: AI PROVIDER UPLINK (L3)
 * RESPONSABILIDAD: CLIENTE HTTP OPACO HACIA EL RPC DE GENERACIÓN DE TEXTO
 */

use hub_domain_ai::provider::{AiProvider, AiProviderError};
use reqwest::{header, Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::instrument;

#[derive(Serialize)]
struct GeneratePayload<'a> {
    prompt: &'a str,
}

#[derive(Deserialize)]
struct GenerateWire {
    text: String,
}

pub struct AiProviderClient {
    client: Client,
    base_url: String,
}

impl AiProviderClient {
    pub fn new(base_url: String, api_key: String) -> Self {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {api_key}")).expect("invalid AI provider key"),
        );

        Self {
            client: Client::builder()
                .default_headers(headers)
                .user_agent("phoenix-hub-ai-client/0.1")
                .timeout(std::time::Duration::from_secs(60))
                .build()
                .expect("failed to build AI provider http client"),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait::async_trait]
impl AiProvider for AiProviderClient {
    #[instrument(skip(self, prompt))]
    async fn generate(&self, prompt: &str) -> Result<String, AiProviderError> {
        let url = format!("{}/v1/generate", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&GeneratePayload { prompt })
            .send()
            .await
            .map_err(|err| AiProviderError::NetworkFault(err.to_string()))?;

        if response.status() != StatusCode::OK {
            return Err(AiProviderError::Rejected(format!("HTTP {}", response.status())));
        }

        let wire: GenerateWire = response.json().await.map_err(|err| AiProviderError::Rejected(err.to_string()))?;
        Ok(wire.text)
    }
}
