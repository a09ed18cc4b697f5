use hf_hub::api::sync::ApiBuilder;
use ndarray::{Array2, Axis};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::PathBuf;
use std::sync::Mutex;
use tokenizers::Tokenizer;

use crate::normalize::l2_normalize_in_place;
use crate::types::{Embedding, EMBEDDING_DIM};
use crate::{Encoder, EncoderConfig, EncoderError};

/// Tier 2: tokenizer + ONNX session run locally. Assets are fetched from the
/// hub into the local cache on first construction; after that the tier works
/// offline.
///
/// `encode` tokenizes with truncation at the configured sequence length, pads
/// the batch, runs one forward pass, mean-pools the last hidden state across
/// the token axis (weighted by attention mask), and L2-normalizes each
/// vector.
///
/// The session is not reentrant, so inference is serialized behind a mutex;
/// callers see an ordinary `Sync` encoder.
pub struct OnnxEncoder {
    tokenizer: Tokenizer,
    session: Mutex<Session>,
    max_sequence_length: usize,
    wants_token_type_ids: bool,
}

impl OnnxEncoder {
    /// Downloads (or reuses) the tokenizer and ONNX weights for
    /// `cfg.model_name`, builds the session, and verifies the 768-dim output
    /// contract with a probe batch.
    pub fn load(cfg: &EncoderConfig) -> Result<Self, EncoderError> {
        let (model_path, tokenizer_path) = fetch_assets(cfg)?;

        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| EncoderError::Inference(e.to_string()))?;

        let session = Session::builder()
            .map_err(ort_err)?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(ort_err)?
            .with_intra_threads(4)
            .map_err(ort_err)?
            .commit_from_file(&model_path)
            .map_err(ort_err)?;

        let wants_token_type_ids = session
            .inputs
            .iter()
            .any(|input| input.name == "token_type_ids");

        let encoder = Self {
            tokenizer,
            session: Mutex::new(session),
            max_sequence_length: cfg.max_sequence_length,
            wants_token_type_ids,
        };

        let probe = encoder.encode_batch(&["dimension probe".to_string()])?;
        match probe.first().map(Vec::len) {
            Some(EMBEDDING_DIM) => Ok(encoder),
            Some(dim) => Err(EncoderError::Unsupported(format!(
                "{} produces {dim}-dim vectors, expected {EMBEDDING_DIM}",
                cfg.model_name
            ))),
            None => Err(EncoderError::Inference(
                "model returned no outputs for probe batch".into(),
            )),
        }
    }

    fn encode_batch(&self, texts: &[String]) -> Result<Vec<Embedding>, EncoderError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let (encoded, max_len) = encode_documents(&self.tokenizer, texts, self.max_sequence_length)?;
        let (input_ids, attn_mask) = build_padded_arrays(encoded, max_len)?;
        let mut vectors = self.run_session(input_ids, attn_mask)?;
        for v in &mut vectors {
            l2_normalize_in_place(v);
        }
        Ok(vectors)
    }

    fn run_session(
        &self,
        input_ids: Array2<i64>,
        attn_mask: Array2<i64>,
    ) -> Result<Vec<Embedding>, EncoderError> {
        let (batch, seq_len) = input_ids.dim();
        let mask_for_pooling = attn_mask.clone();

        let mut guard = self
            .session
            .lock()
            .map_err(|_| EncoderError::Inference("onnx session lock poisoned".into()))?;

        let ids_value = Value::from_array(input_ids).map_err(ort_err)?;
        let mask_value = Value::from_array(attn_mask).map_err(ort_err)?;
        let outputs = if self.wants_token_type_ids {
            let type_ids = Value::from_array(Array2::<i64>::zeros((batch, seq_len)))
                .map_err(ort_err)?;
            guard
                .run(ort::inputs![
                    "input_ids" => ids_value,
                    "attention_mask" => mask_value,
                    "token_type_ids" => type_ids
                ])
                .map_err(ort_err)?
        } else {
            guard
                .run(ort::inputs![
                    "input_ids" => ids_value,
                    "attention_mask" => mask_value
                ])
                .map_err(ort_err)?
        };

        let hidden = outputs[0].try_extract_array::<f32>().map_err(ort_err)?;
        if hidden.ndim() != 3 {
            return Err(EncoderError::Inference(format!(
                "model output has rank {}, expected [batch, seq, hidden]",
                hidden.ndim()
            )));
        }

        let mut vectors = Vec::with_capacity(batch);
        for b in 0..batch {
            let item = hidden.index_axis(Axis(0), b);
            let token_count = item.shape()[0];
            let hidden_dim = item.shape()[1];

            let mut pooled = vec![0.0f32; hidden_dim];
            let mut mask_sum = 0.0f32;
            for t in 0..token_count.min(seq_len) {
                let mask = mask_for_pooling[[b, t]] as f32;
                mask_sum += mask;
                for (acc, row) in pooled.iter_mut().zip(item.index_axis(Axis(0), t)) {
                    *acc += row * mask;
                }
            }
            let denom = mask_sum.max(1e-9);
            for x in &mut pooled {
                *x /= denom;
            }
            vectors.push(pooled);
        }
        Ok(vectors)
    }
}

impl Encoder for OnnxEncoder {
    fn encode(&self, texts: &[String]) -> Result<Vec<Embedding>, EncoderError> {
        let vectors = self.encode_batch(texts)?;
        if vectors.len() != texts.len() {
            return Err(EncoderError::Inference(format!(
                "model returned {} embeddings for {} inputs",
                vectors.len(),
                texts.len()
            )));
        }
        Ok(vectors)
    }
}

fn ort_err(e: ort::Error) -> EncoderError {
    EncoderError::Inference(e.to_string())
}

fn fetch_assets(cfg: &EncoderConfig) -> Result<(PathBuf, PathBuf), EncoderError> {
    let mut builder = ApiBuilder::new().with_progress(false);
    if let Some(dir) = &cfg.cache_dir {
        builder = builder.with_cache_dir(dir.clone());
    }
    if let Some(token) = &cfg.api_token {
        builder = builder.with_token(Some(token.clone()));
    }
    let api = builder
        .build()
        .map_err(|e| EncoderError::Download(e.to_string()))?;
    let repo = api.model(cfg.model_name.clone());

    let tokenizer_path = repo
        .get("tokenizer.json")
        .map_err(|e| EncoderError::Download(e.to_string()))?;
    // Hub repos export either at the root or under onnx/.
    let model_path = repo
        .get("onnx/model.onnx")
        .or_else(|_| repo.get("model.onnx"))
        .map_err(|e| EncoderError::Download(e.to_string()))?;

    Ok((model_path, tokenizer_path))
}

struct EncodedDoc {
    ids: Vec<i64>,
    mask: Vec<i64>,
}

fn encode_documents(
    tokenizer: &Tokenizer,
    texts: &[String],
    max_sequence_length: usize,
) -> Result<(Vec<EncodedDoc>, usize), EncoderError> {
    let mut encoded = Vec::with_capacity(texts.len());
    let mut max_len = 0usize;

    for text in texts {
        let encoding = tokenizer
            .encode(text.as_str(), true)
            .map_err(|e| EncoderError::Inference(e.to_string()))?;
        let ids: Vec<i64> = encoding.get_ids().iter().map(|&x| x as i64).collect();
        let mask: Vec<i64> = encoding
            .get_attention_mask()
            .iter()
            .map(|&x| x as i64)
            .collect();
        max_len = max_len.max(ids.len());
        encoded.push(EncodedDoc { ids, mask });
    }

    max_len = max_len.min(max_sequence_length);
    for doc in &mut encoded {
        if doc.ids.len() > max_sequence_length {
            doc.ids.truncate(max_sequence_length);
            doc.mask.truncate(max_sequence_length);
        }
    }

    Ok((encoded, max_len))
}

fn build_padded_arrays(
    encoded: Vec<EncodedDoc>,
    max_len: usize,
) -> Result<(Array2<i64>, Array2<i64>), EncoderError> {
    let seq_len = max_len.max(1);
    let batch = encoded.len();
    let mut id_storage = Vec::with_capacity(batch * seq_len);
    let mut mask_storage = Vec::with_capacity(batch * seq_len);

    for EncodedDoc { ids, mask } in encoded {
        if ids.len() != mask.len() {
            return Err(EncoderError::Inference(
                "tokenizer produced mismatched id/mask lengths".into(),
            ));
        }
        let pad = seq_len.saturating_sub(ids.len());
        id_storage.extend(ids);
        mask_storage.extend(mask);
        if pad > 0 {
            id_storage.extend(std::iter::repeat_n(0, pad));
            mask_storage.extend(std::iter::repeat_n(0, pad));
        }
    }

    let input_ids = Array2::from_shape_vec((batch, seq_len), id_storage)
        .map_err(|e| EncoderError::Inference(e.to_string()))?;
    let attn_mask = Array2::from_shape_vec((batch, seq_len), mask_storage)
        .map_err(|e| EncoderError::Inference(e.to_string()))?;
    Ok((input_ids, attn_mask))
}
