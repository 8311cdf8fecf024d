use anyhow::{Result, bail};
use async_trait::async_trait;
use candle_core::utils::{cuda_is_available, metal_is_available};
use candle_core::{Device, Tensor};
use candle_nn::VarBuilder;
use candle_nn::ops::softmax;
use candle_transformers::models::debertav2::{
    Config as DebertaV2Config, DebertaV2SeqClassificationModel,
};
use hf_hub::{Repo, RepoType, api::tokio::Api};
use std::path::PathBuf;
use tokenizers::Tokenizer;

use crate::engine::Classifier;

/// Index of the class whose probability becomes the sentiment score. In the
/// fine-tuned review model, class 1 grows with negativity.
const TARGET_CLASS: usize = 1;

/// Loaded tokenizer + sequence-classification model. Immutable after
/// `load`; all inference goes through `&self`.
pub struct SentimentModel {
    model: DebertaV2SeqClassificationModel,
    tokenizer: Tokenizer,
    device: Device,
}

#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub model_id: Option<String>,
    pub model_path: Option<PathBuf>,
    pub revision: String,
    pub use_pth: bool,
    pub cpu: bool,
    pub max_sequence_length: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_id: None,
            model_path: None,
            revision: "main".to_string(),
            use_pth: false,
            cpu: false,
            max_sequence_length: 512,
        }
    }
}

impl SentimentModel {
    fn device(cpu: bool) -> Result<Device> {
        if cpu {
            Ok(Device::Cpu)
        } else if metal_is_available() {
            tracing::info!("Using metal acceleration");
            Ok(Device::new_metal(0)?)
        } else if cuda_is_available() {
            tracing::info!("Using CUDA GPU acceleration");
            Ok(Device::new_cuda(0)?)
        } else {
            tracing::info!(
                "CUDA not available, running on CPU. To run on GPU, build with `--features cuda`"
            );
            Ok(Device::Cpu)
        }
    }

    #[tracing::instrument(skip(config), fields(model_id = ?config.model_id, cpu = config.cpu))]
    pub async fn load(config: ModelConfig) -> Result<Self> {
        let device = Self::device(config.cpu)?;

        // Resolve files from a local model directory or the Hugging Face Hub
        let (config_filename, tokenizer_filename, weights_filename) = {
            match &config.model_path {
                Some(base_path) => {
                    if !base_path.is_dir() {
                        bail!("Model path {} is not a directory.", base_path.display());
                    }

                    let config_file = base_path.join("config.json");
                    let tokenizer_file = base_path.join("tokenizer.json");
                    let weights_file = if config.use_pth {
                        base_path.join("pytorch_model.bin")
                    } else {
                        base_path.join("model.safetensors")
                    };
                    (config_file, tokenizer_file, weights_file)
                }
                None => {
                    if config.model_id.is_none() {
                        bail!("Either model_id or model_path must be specified");
                    }

                    let repo = Repo::with_revision(
                        config.model_id.unwrap(),
                        RepoType::Model,
                        config.revision.clone(),
                    );
                    let api = Api::new()?;
                    let api = api.repo(repo);
                    let config_file = api.get("config.json").await?;
                    let tokenizer_file = api.get("tokenizer.json").await?;
                    let weights_file = if config.use_pth {
                        api.get("pytorch_model.bin").await?
                    } else {
                        api.get("model.safetensors").await?
                    };
                    (config_file, tokenizer_file, weights_file)
                }
            }
        };

        let model_config = std::fs::read_to_string(config_filename)?;
        let model_config: DebertaV2Config = serde_json::from_str(&model_config)?;

        // The verdict mapping only makes sense for a binary label scheme.
        let id2label = match &model_config.id2label {
            Some(labels) if labels.len() == 2 => labels.clone(),
            Some(labels) => bail!(
                "Expected a binary sentiment model, but the artifact declares {} labels",
                labels.len()
            ),
            None => bail!("Id2Label not found in the model configuration"),
        };
        tracing::info!(?id2label, target_class = TARGET_CLASS, "Binary label scheme verified");

        let mut tokenizer = Tokenizer::from_file(tokenizer_filename)
            .map_err(|e| anyhow::anyhow!("Tokenizer error: {e}"))?;
        tokenizer
            .with_truncation(Some(tokenizers::TruncationParams {
                max_length: config.max_sequence_length,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("Tokenizer truncation error: {e}"))?;

        let vb = if config.use_pth {
            VarBuilder::from_pth(
                &weights_filename,
                candle_transformers::models::debertav2::DTYPE,
                &device,
            )?
        } else {
            unsafe {
                VarBuilder::from_mmaped_safetensors(
                    &[weights_filename],
                    candle_transformers::models::debertav2::DTYPE,
                    &device,
                )?
            }
        };

        let vb = vb.set_prefix("deberta");
        let model = DebertaV2SeqClassificationModel::load(vb, &model_config, Some(id2label))?;

        Ok(Self {
            model,
            tokenizer,
            device,
        })
    }
}

#[async_trait]
impl Classifier for SentimentModel {
    #[tracing::instrument(skip(self, text), fields(chars = text.len()))]
    async fn positive_probability(&self, text: &str) -> Result<f64> {
        let tokenizer = self.tokenizer.clone();
        let review = text.to_string();
        let encoding = tokio::task::spawn_blocking(move || {
            tokenizer
                .encode(review, true)
                .map_err(|e| anyhow::anyhow!("Tokenization error: {e}"))
        })
        .await??;

        let input_ids = Tensor::new(encoding.get_ids(), &self.device)?.unsqueeze(0)?;
        let token_type_ids = Tensor::new(encoding.get_type_ids(), &self.device)?.unsqueeze(0)?;
        let attention_mask = Tensor::new(encoding.get_attention_mask(), &self.device)?.unsqueeze(0)?;

        let logits = self
            .model
            .forward(&input_ids, Some(token_type_ids), Some(attention_mask))?;
        let probs = softmax(&logits, 1)?.to_vec2::<f32>()?;

        let score = probs
            .first()
            .and_then(|row| row.get(TARGET_CLASS))
            .copied()
            .ok_or_else(|| anyhow::anyhow!("Model produced no probability for class {TARGET_CLASS}"))?;

        Ok(f64::from(score))
    }
}
