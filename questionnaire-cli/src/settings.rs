use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use questionnaire::WizardConfig;
use questionnaire_http::{ApiConfig, Endpoints, Url};
use serde::Deserialize;

/// Contents of the optional TOML settings file.
///
/// ```toml
/// [wizard]
/// validation_policy = "on_change"
/// conditional = { governing_question = 1 }
///
/// [api]
/// base_url = "http://localhost:5000"
/// timeout_secs = 30
///
/// [api.endpoints]
/// save_answer = "/api/save-answer"
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub wizard: WizardConfig,
    pub api: ApiSettings,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub base_url: Option<String>,
    pub endpoints: Endpoints,
    pub timeout_secs: Option<u64>,
    pub session_cookie: Option<String>,
}

impl Settings {
    /// Read the settings file, or use defaults when there is none.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Invalid settings in {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

impl ApiSettings {
    pub fn api_config(&self) -> Result<ApiConfig> {
        let Some(base_url) = &self.base_url else {
            bail!("No server given: pass --base-url, set QUESTIONNAIRE_BASE_URL or use --demo");
        };
        let base_url =
            Url::parse(base_url).with_context(|| format!("Invalid server URL '{base_url}'"))?;

        let mut config = ApiConfig::new(base_url).with_endpoints(self.endpoints.clone());
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if let Some(cookie) = &self.session_cookie {
            config = config.with_session_cookie(cookie.clone());
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use questionnaire::ValidationPolicy;

    #[test]
    fn full_settings_file() {
        let settings = Settings::parse(
            r#"
            [wizard]
            validation_policy = "on_change"
            conditional = { governing_question = 1 }

            [api]
            base_url = "http://localhost:5000"
            timeout_secs = 30

            [api.endpoints]
            save_answer = "/api/save-answer"
            "#,
        )
        .unwrap();

        assert_eq!(settings.wizard.validation_policy, ValidationPolicy::OnChange);
        assert_eq!(settings.wizard.governing_question().map(|id| id.get()), Some(1));

        let config = settings.api.api_config().unwrap();
        assert_eq!(config.base_url.as_str(), "http://localhost:5000/");
        assert_eq!(config.endpoints.save_answer, "/api/save-answer");
        assert_eq!(config.endpoints.progress, "/api/progress");
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn missing_server_is_an_error() {
        let settings = Settings::parse("").unwrap();
        assert!(settings.api.api_config().is_err());
    }

    #[test]
    fn unknown_policy_is_rejected() {
        assert!(Settings::parse("[wizard]\nvalidation_policy = \"sometimes\"").is_err());
    }
}
