use crate::models::AuthMethod;
use thiserror::Error;

pub const TEMPLATE_HEADER: &str = "# API Authentication Configuration";
pub const TEMPLATE_FAILURE: &str = "# Failed to generate .env template";
pub const BASE_URL_LINE: &str = "API_BASE_URL=https://api.example.com";

#[derive(Debug, Error)]
enum TemplateError {
    #[error("authentication method #{0} has no type")]
    MissingType(usize),
}

/// `.env` skeleton derived from detected authentication methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvTemplate {
    pub lines: Vec<String>,
}

impl EnvTemplate {
    /// Build the template. A failure yields the single failure-marker line.
    pub fn from_auth_methods(auth_methods: &[AuthMethod]) -> Self {
        let lines = match template_lines(auth_methods) {
            Ok(lines) => lines,
            Err(err) => {
                tracing::debug!(error = %err, "env template generation failed");
                vec![TEMPLATE_FAILURE.to_string()]
            }
        };
        Self { lines }
    }

    pub fn render(&self) -> String {
        self.lines.join("\n")
    }
}

fn template_lines(auth_methods: &[AuthMethod]) -> Result<Vec<String>, TemplateError> {
    let mut lines = vec![TEMPLATE_HEADER.to_string()];

    for (idx, auth) in auth_methods.iter().enumerate() {
        let kind = auth.kind.trim().to_lowercase();
        if kind.is_empty() {
            return Err(TemplateError::MissingType(idx));
        }

        if kind.contains("api key") {
            lines.push("API_KEY=your_api_key_here".to_string());
        } else if kind.contains("oauth") {
            lines.push("OAUTH_CLIENT_ID=your_client_id_here".to_string());
            lines.push("OAUTH_CLIENT_SECRET=your_client_secret_here".to_string());
            lines.push("OAUTH_REDIRECT_URI=http://localhost:8000/callback".to_string());
        } else if kind.contains("bearer") || kind.contains("token") {
            lines.push("ACCESS_TOKEN=your_access_token_here".to_string());
        } else if kind.contains("basic") {
            lines.push("API_USERNAME=your_username_here".to_string());
            lines.push("API_PASSWORD=your_password_here".to_string());
        } else {
            let name = kind.replace(' ', "_").to_uppercase();
            lines.push(format!("{name}=your_value_here"));
        }
    }

    lines.push(String::new());
    lines.push("# API Configuration".to_string());
    lines.push(BASE_URL_LINE.to_string());
    Ok(lines)
}
