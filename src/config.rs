//! Runtime configuration.
//!
//! Credentials are resolved from the environment once at startup (a .env
//! file is honored when present); everything else arrives as CLI flags
//! with the defaults below. Configuration problems are fatal and carry a
//! remediation message - they are never retried.

use std::path::Path;

use anyhow::{Context, Result};

/// Default prompt template compiled into the binary.
pub const DEFAULT_PROMPT_TEMPLATE: &str = include_str!("../templates/ner_prompt.hbs");

pub const DEFAULT_MODEL: &str = "text-davinci-003";
pub const DEFAULT_BATCH_SIZE: usize = 10;
pub const DEFAULT_MAX_EXAMPLES: usize = 2;
pub const DEFAULT_TEMPERATURE: f64 = 0.0;
pub const DEFAULT_MAX_TOKENS: u32 = 500;
/// Retries after a rate-limited response before giving up.
pub const DEFAULT_RETRIES: u32 = 1;
/// Fixed sleep between rate-limit retries, in seconds.
pub const DEFAULT_RETRY_DELAY_S: u64 = 1;

/// API credentials resolved from the environment at startup.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub api_key: String,
    pub api_org: String,
}

impl Credentials {
    /// Read `OPENAI_KEY` and `OPENAI_ORG` from the environment, loading a
    /// `.env` file first if one is present. A missing variable is a fatal
    /// startup error with an actionable message.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let api_key = std::env::var("OPENAI_KEY").map_err(|_| {
            anyhow::anyhow!(
                "Could not find the API key for the completion API. Set up a key \
                 in your account settings, then make it available as the \
                 OPENAI_KEY environment variable, for instance in a .env file."
            )
        })?;
        let api_org = std::env::var("OPENAI_ORG").map_err(|_| {
            anyhow::anyhow!(
                "Could not find the organization for the completion API. Obtain \
                 your organization ID ('org-...') from your account settings, \
                 then make it available as the OPENAI_ORG environment variable, \
                 for instance in a .env file."
            )
        })?;

        Ok(Self { api_key, api_org })
    }
}

/// Read a prompt template, enforcing the `.hbs` extension.
///
/// With no path the embedded default template is used. A wrong extension
/// or unreadable file is a fatal configuration error.
pub fn load_template(path: Option<&Path>) -> Result<String> {
    let path = match path {
        None => return Ok(DEFAULT_PROMPT_TEMPLATE.to_string()),
        Some(path) => path,
    };

    if path.extension().and_then(|e| e.to_str()) != Some("hbs") {
        anyhow::bail!(
            "The --prompt-path parameter expects a .hbs file, got: {}",
            path.display()
        );
    }

    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read prompt template: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_default_template_is_used_without_a_path() {
        let template = load_template(None).unwrap();
        assert_eq!(template, DEFAULT_PROMPT_TEMPLATE);
    }

    #[test]
    fn test_wrong_extension_is_rejected() {
        let err = load_template(Some(Path::new("prompt.txt"))).unwrap_err();
        assert!(err.to_string().contains(".hbs"));
    }

    #[test]
    fn test_template_loads_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("custom.hbs");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "annotate: {{{{text}}}}").unwrap();

        let template = load_template(Some(&path)).unwrap();
        assert_eq!(template, "annotate: {{text}}");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(load_template(Some(Path::new("/nonexistent/x.hbs"))).is_err());
    }
}
