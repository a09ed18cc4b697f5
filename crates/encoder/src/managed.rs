use reqwest::blocking::Client;
use reqwest::header::AUTHORIZATION;
use serde_json::{json, Value};
use std::time::Duration;

use crate::normalize::l2_normalize_in_place;
use crate::types::{Embedding, EMBEDDING_DIM};
use crate::{Encoder, EncoderConfig, EncoderError};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Tier 1: a hosted feature-extraction endpoint bound to the configured
/// model. The provider manages weights and custom model code; we only speak
/// JSON over HTTP.
///
/// Construction probes the endpoint with a one-word batch so an unreachable
/// or mismatched deployment is rejected up front instead of failing per
/// request.
pub struct ManagedEncoder {
    client: Client,
    url: String,
    auth_header: Option<String>,
    model_name: String,
}

impl ManagedEncoder {
    /// Connects to the endpoint for `cfg.model_name` and verifies it produces
    /// 768-dimension vectors.
    pub fn connect(cfg: &EncoderConfig) -> Result<Self, EncoderError> {
        let url = cfg
            .api_url
            .clone()
            .unwrap_or_else(|| default_endpoint(&cfg.model_name));
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| EncoderError::Download(e.to_string()))?;

        let encoder = Self {
            client,
            url,
            auth_header: cfg.api_token.as_deref().map(|t| format!("Bearer {t}")),
            model_name: cfg.model_name.clone(),
        };

        let probe = encoder.request(&["embedding probe".to_string()])?;
        match probe.first().map(Vec::len) {
            Some(EMBEDDING_DIM) => Ok(encoder),
            Some(dim) => Err(EncoderError::Unsupported(format!(
                "{} produces {dim}-dim vectors, expected {EMBEDDING_DIM}",
                encoder.model_name
            ))),
            None => Err(EncoderError::Inference(
                "endpoint returned no vectors for probe batch".into(),
            )),
        }
    }

    fn request(&self, texts: &[String]) -> Result<Vec<Embedding>, EncoderError> {
        let mut req = self.client.post(&self.url).json(&json!({ "inputs": texts }));
        if let Some(header) = &self.auth_header {
            req = req.header(AUTHORIZATION, header.as_str());
        }

        let response = req.send().map_err(|e| EncoderError::Download(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(EncoderError::Download(format!(
                "unexpected status {status} from {}: {body}",
                self.url
            )));
        }

        let value: Value = response
            .json()
            .map_err(|e| EncoderError::Inference(e.to_string()))?;
        let mut vectors = parse_embedding_matrix(&value)?;
        for v in &mut vectors {
            l2_normalize_in_place(v);
        }
        Ok(vectors)
    }
}

impl Encoder for ManagedEncoder {
    fn encode(&self, texts: &[String]) -> Result<Vec<Embedding>, EncoderError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let vectors = self.request(texts)?;
        if vectors.len() != texts.len() {
            return Err(EncoderError::Inference(format!(
                "endpoint returned {} embeddings for {} inputs",
                vectors.len(),
                texts.len()
            )));
        }
        Ok(vectors)
    }
}

fn default_endpoint(model_name: &str) -> String {
    format!("https://router.huggingface.co/hf-inference/models/{model_name}/pipeline/feature-extraction")
}

/// Feature-extraction responses come back either pooled (`[[f32]]`, one row
/// per input) or token-level (`[[[f32]]]`); token-level rows are mean-pooled
/// here so both shapes produce one vector per input.
fn parse_embedding_matrix(value: &Value) -> Result<Vec<Embedding>, EncoderError> {
    let rows = value
        .as_array()
        .ok_or_else(|| EncoderError::Inference("endpoint response is not an array".into()))?;

    rows.iter().map(parse_row).collect()
}

fn parse_row(row: &Value) -> Result<Embedding, EncoderError> {
    let items = row
        .as_array()
        .ok_or_else(|| EncoderError::Inference("embedding row is not an array".into()))?;
    if items.is_empty() {
        return Err(EncoderError::Inference("embedding row is empty".into()));
    }

    if items[0].is_array() {
        // Token-level output: mean over the token axis.
        let first = parse_flat(&items[0])?;
        let mut pooled = first;
        for token in &items[1..] {
            let vec = parse_flat(token)?;
            if vec.len() != pooled.len() {
                return Err(EncoderError::Inference(
                    "ragged token-level embedding rows".into(),
                ));
            }
            for (acc, x) in pooled.iter_mut().zip(vec) {
                *acc += x;
            }
        }
        let n = items.len() as f32;
        for x in &mut pooled {
            *x /= n;
        }
        Ok(pooled)
    } else {
        parse_flat(row)
    }
}

fn parse_flat(value: &Value) -> Result<Vec<f32>, EncoderError> {
    value
        .as_array()
        .ok_or_else(|| EncoderError::Inference("expected a numeric array".into()))?
        .iter()
        .map(|x| {
            x.as_f64()
                .map(|f| f as f32)
                .ok_or_else(|| EncoderError::Inference("non-numeric embedding value".into()))
        })
        .collect()
}
