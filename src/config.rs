use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Server host to bind to
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Server port to bind to
    #[arg(long, env = "PORT", default_value = "8000")]
    pub port: u16,

    /// Model ID from Hugging Face Hub
    #[arg(long, env = "MODEL_ID")]
    pub model_id: Option<String>,

    /// Local path to model directory
    #[arg(long, env = "MODEL_PATH")]
    pub model_path: Option<PathBuf>,

    /// Model revision/branch on Hugging Face
    #[arg(long, env = "MODEL_REVISION", default_value = "main")]
    pub model_revision: String,

    /// Use PyTorch weights instead of safetensors
    #[arg(long, env = "USE_PTH")]
    pub use_pth: bool,

    /// Run on CPU instead of GPU
    #[arg(long, env = "CPU_ONLY")]
    pub cpu_only: bool,

    /// Maximum sequence length; longer reviews are truncated
    #[arg(long, env = "MAX_SEQUENCE_LENGTH", default_value = "512")]
    pub max_sequence_length: usize,
}

impl Config {
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Name echoed in classify responses: the Hub id, or the local directory.
    pub fn model_name(&self) -> String {
        if let Some(id) = &self.model_id {
            id.clone()
        } else if let Some(path) = &self.model_path {
            path.display().to_string()
        } else {
            "unspecified".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_address_joins_host_and_port() {
        let config = Config::try_parse_from(["nazar", "--model-path", "models"]).unwrap();
        assert_eq!(config.server_address(), "127.0.0.1:8000");
    }

    #[test]
    fn model_name_prefers_hub_id() {
        let config = Config::try_parse_from([
            "nazar",
            "--model-id",
            "snappfood/review-sentiment",
            "--model-path",
            "models",
        ])
        .unwrap();
        assert_eq!(config.model_name(), "snappfood/review-sentiment");
    }

    #[test]
    fn max_sequence_length_defaults_to_512() {
        let config = Config::try_parse_from(["nazar", "--model-path", "models"]).unwrap();
        assert_eq!(config.max_sequence_length, 512);
    }
}
