use std::path::PathBuf;
use std::time::Duration;

/// Runtime configuration, built from defaults with environment overrides.
///
/// There is deliberately no CLI surface; the generator runs to completion on
/// whatever `FEEDBACK_GEN_*` variables are set.
#[derive(Debug, Clone)]
pub struct Config {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub base_url: String,
    pub model: String,
    /// Maximum simultaneous in-flight chat requests. Defaults to 1 to avoid
    /// overloading a locally hosted inference server.
    pub concurrency: usize,
    /// Total budget per request: connect, send, and the whole response stream.
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        let mut config = Config {
            input_path: PathBuf::from("survey.csv"),
            output_path: PathBuf::from("feedback_analysis.csv"),
            base_url: "http://127.0.0.1:11434".to_string(),
            model: "mistral".to_string(),
            concurrency: 1,
            request_timeout: Duration::from_secs(600),
        };

        if let Ok(value) = std::env::var("FEEDBACK_GEN_INPUT") {
            config.input_path = PathBuf::from(value);
        }
        if let Ok(value) = std::env::var("FEEDBACK_GEN_OUTPUT") {
            config.output_path = PathBuf::from(value);
        }
        if let Ok(value) = std::env::var("FEEDBACK_GEN_BASE_URL") {
            config.base_url = value;
        }
        if let Ok(value) = std::env::var("FEEDBACK_GEN_MODEL") {
            config.model = value;
        }
        if let Some(limit) = std::env::var("FEEDBACK_GEN_CONCURRENCY")
            .ok()
            .and_then(|value| value.parse::<usize>().ok())
            .filter(|limit| *limit > 0)
        {
            config.concurrency = limit;
        }
        if let Some(secs) = std::env::var("FEEDBACK_GEN_TIMEOUT_SECS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
        {
            config.request_timeout = Duration::from_secs(secs);
        }

        config
    }
}
