pub mod env_template;
pub mod orchestrator;
pub mod params;
pub mod prompts;
pub mod response_parser;

pub use env_template::EnvTemplate;
pub use orchestrator::{DEFAULT_INTEGRATION_SUGGESTION, FailurePolicy, Orchestrator, Stage};
pub use params::{normalize_all, normalize_parameters};
pub use response_parser::parse_analysis;
