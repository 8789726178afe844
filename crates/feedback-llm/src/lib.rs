pub mod error;
pub mod ndjson;
pub mod provider;

pub use error::{LlmError, Result};
pub use ndjson::chunk_stream_from_ndjson;
pub use provider::{parse_chat_line, ChatStream, OllamaProvider};
