//! ONNX-based sentence embedding engine.
//!
//! Loads a SentenceTransformers ONNX export (all-mpnet-base-v2 by default)
//! and its tokenizer, mean-pools token embeddings over the attention mask
//! and L2-normalizes the result. Requires the `onnx` feature.

/// Options for loading an ONNX sentence-transformer.
#[derive(Debug, Clone)]
pub struct OnnxOptions {
    /// Feed a `token_type_ids` input (BERT-style exports). MPNet exports take
    /// only `input_ids` and `attention_mask`.
    pub token_type_ids: bool,
    /// L2-normalize pooled embeddings.
    pub normalize: bool,
    /// Intra-op threads for the ONNX session.
    pub intra_threads: usize,
}

impl Default for OnnxOptions {
    fn default() -> Self {
        Self {
            token_type_ids: false,
            normalize: true,
            intra_threads: 2,
        }
    }
}

#[cfg(feature = "onnx")]
mod inner {
    use std::path::Path;

    use innotrend_core::{Error, Result};
    use ndarray::Array1;
    use ort::session::Session;
    use ort::value::Tensor;
    use parking_lot::Mutex;
    use tokenizers::{Tokenizer, TruncationParams};
    use tracing::info;

    use super::OnnxOptions;
    use crate::embedder::{EmbedderBackend, EmbeddingResult};

    /// Maximum sequence length for the model.
    const MAX_SEQ_LEN: usize = 384;

    fn inference_err(what: &str, e: impl std::fmt::Display) -> Error {
        Error::Inference(format!("{}: {}", what, e))
    }

    /// Cap encodings at `max_length` tokens, special tokens included.
    fn configure_truncation(tokenizer: &mut Tokenizer, max_length: usize) -> Result<()> {
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length,
                ..TruncationParams::default()
            }))
            .map_err(|e| inference_err("configure truncation", e))?;
        Ok(())
    }

    /// ONNX sentence-transformer.
    pub struct OnnxEmbedder {
        session: Mutex<Session>,
        tokenizer: Tokenizer,
        options: OnnxOptions,
        dimension: usize,
    }

    impl OnnxEmbedder {
        /// Load an ONNX model and tokenizer from the given directory.
        ///
        /// Expects:
        /// - `model_dir/model.onnx` — the ONNX model file
        /// - `model_dir/tokenizer.json` — the HuggingFace tokenizer
        ///
        /// The embedding dimension is measured with one inference at load time.
        pub fn load(model_dir: &Path, options: OnnxOptions) -> Result<Self> {
            let model_path = model_dir.join("model.onnx");
            let tokenizer_path = model_dir.join("tokenizer.json");

            if !model_path.exists() {
                return Err(Error::NotFound(format!("model {}", model_path.display())));
            }
            if !tokenizer_path.exists() {
                return Err(Error::NotFound(format!(
                    "tokenizer {}",
                    tokenizer_path.display()
                )));
            }

            // With load-dynamic, ORT_DYLIB_PATH must point to libonnxruntime.so
            ort::init().commit();

            let session = Session::builder()
                .map_err(|e| inference_err("session builder", e))?
                .with_intra_threads(options.intra_threads.max(1))
                .map_err(|e| inference_err("session threads", e))?
                .commit_from_file(&model_path)
                .map_err(|e| inference_err("load ONNX model", e))?;

            let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
                .map_err(|e| inference_err("load tokenizer", e))?;
            configure_truncation(&mut tokenizer, MAX_SEQ_LEN)?;

            let mut embedder = Self {
                session: Mutex::new(session),
                tokenizer,
                options,
                dimension: 0,
            };
            embedder.dimension = embedder.infer("dimension check")?.len();

            info!(
                "ONNX embedder loaded: dim={}, model={}",
                embedder.dimension,
                model_path.display()
            );
            Ok(embedder)
        }

        fn infer(&self, text: &str) -> Result<Array1<f32>> {
            let encoding = self
                .tokenizer
                .encode(text, true)
                .map_err(|e| inference_err("tokenize", e))?;

            let input_ids = encoding.get_ids();
            let attention_mask = encoding.get_attention_mask();
            let seq_len = input_ids.len();

            let ids_data: Vec<i64> = input_ids.iter().map(|&id| id as i64).collect();
            let mask_data: Vec<i64> = attention_mask.iter().map(|&m| m as i64).collect();

            let ids_tensor = Tensor::from_array(([1usize, seq_len], ids_data))
                .map_err(|e| inference_err("ids tensor", e))?;
            let mask_tensor = Tensor::from_array(([1usize, seq_len], mask_data))
                .map_err(|e| inference_err("mask tensor", e))?;

            let mut session = self.session.lock();
            let outputs = if self.options.token_type_ids {
                let type_ids_tensor = Tensor::from_array(([1usize, seq_len], vec![0i64; seq_len]))
                    .map_err(|e| inference_err("type_ids tensor", e))?;
                session.run(ort::inputs![ids_tensor, mask_tensor, type_ids_tensor])
            } else {
                session.run(ort::inputs![ids_tensor, mask_tensor])
            }
            .map_err(|e| inference_err("ONNX inference", e))?;

            // [1, seq_len, dim] token embeddings need pooling; [1, dim] is already pooled
            let (shape, data) = outputs[0]
                .try_extract_tensor::<f32>()
                .map_err(|e| inference_err("extract output", e))?;
            let shape_dims: Vec<i64> = shape.iter().copied().collect();

            let mut embedding = match shape_dims.len() {
                3 => {
                    let dim = shape_dims[2] as usize;
                    let mask_sum: f32 = attention_mask.iter().map(|&m| m as f32).sum();
                    if mask_sum < 1e-9 {
                        return Err(Error::Inference("empty attention mask".into()));
                    }
                    let mut pooled = Array1::<f32>::zeros(dim);
                    for (i, &m) in attention_mask.iter().enumerate() {
                        if m > 0 {
                            let row = &data[i * dim..(i + 1) * dim];
                            for (p, &v) in pooled.iter_mut().zip(row) {
                                *p += v;
                            }
                        }
                    }
                    pooled / mask_sum
                }
                2 => {
                    let dim = shape_dims[1] as usize;
                    Array1::from_vec(data[..dim].to_vec())
                }
                _ => {
                    return Err(Error::Inference(format!(
                        "unexpected output shape {:?}",
                        shape_dims
                    )))
                }
            };

            if self.options.normalize {
                let norm = embedding.dot(&embedding).sqrt();
                if norm > 0.0 {
                    embedding /= norm;
                }
            }
            Ok(embedding)
        }
    }

    impl EmbedderBackend for OnnxEmbedder {
        fn embed(&self, text: &str) -> Result<EmbeddingResult> {
            Ok(EmbeddingResult {
                embedding: self.infer(text)?,
                cached: false,
            })
        }

        fn dimension(&self) -> usize {
            self.dimension
        }

        fn is_available(&self) -> bool {
            true
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use std::collections::HashMap;
        use tokenizers::models::wordlevel::WordLevel;
        use tokenizers::pre_tokenizers::whitespace::Whitespace;
        use tokenizers::processors::template::TemplateProcessing;

        /// `<s> $A </s>` over a four-word vocabulary.
        fn tiny_tokenizer() -> Tokenizer {
            let vocab: HashMap<String, u32> = [("<s>", 0), ("<unk>", 1), ("</s>", 2), ("cell", 3)]
                .into_iter()
                .map(|(t, id)| (t.to_string(), id))
                .collect();
            let model = WordLevel::builder()
                .vocab(vocab)
                .unk_token("<unk>".into())
                .build()
                .unwrap();
            let mut tokenizer = Tokenizer::new(model);
            tokenizer.with_pre_tokenizer(Some(Whitespace {}));
            tokenizer.with_post_processor(Some(
                TemplateProcessing::builder()
                    .try_single("<s> $A </s>")
                    .unwrap()
                    .special_tokens(vec![("<s>", 0), ("</s>", 2)])
                    .build()
                    .unwrap(),
            ));
            tokenizer
        }

        #[test]
        fn test_truncation_keeps_end_token() {
            let mut tokenizer = tiny_tokenizer();
            configure_truncation(&mut tokenizer, 5).unwrap();
            let long = vec!["cell"; 20].join(" ");
            let encoding = tokenizer.encode(long.as_str(), true).unwrap();
            assert_eq!(encoding.get_ids(), &[0, 3, 3, 3, 2]);
            assert_eq!(encoding.get_attention_mask(), &[1, 1, 1, 1, 1]);

            let short = tokenizer.encode("cell cell", true).unwrap();
            assert_eq!(short.get_ids(), &[0, 3, 3, 2]);
        }
    }
}

#[cfg(feature = "onnx")]
pub use inner::OnnxEmbedder;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_match_mpnet() {
        let options = OnnxOptions::default();
        assert!(!options.token_type_ids);
        assert!(options.normalize);
    }
}
