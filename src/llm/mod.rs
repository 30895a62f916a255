mod gateway;
mod gemini_client;

pub use gateway::{GenerationConfig, ModelGateway, SafetySetting};
pub use gemini_client::GeminiClient;
