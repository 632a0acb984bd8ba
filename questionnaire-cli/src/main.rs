use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use example_questionnaires::{GOAL_QUESTION, cloud_security_roadmap, cloud_security_saved_answers};
use questionnaire::{QuestionnaireApi, TestApi, ValidationPolicy, WizardConfig, WizardController};
use questionnaire_dialoguer::{DialoguerError, DialoguerView, run_wizard};
use questionnaire_http::HttpApi;
use tracing::info;

mod settings;

use settings::Settings;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Policy {
    /// Validate when moving forward or submitting
    OnAdvance,
    /// Validate after every change as well
    OnChange,
}

impl From<Policy> for ValidationPolicy {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::OnAdvance => Self::OnAdvance,
            Policy::OnChange => Self::OnChange,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "questionnaire")]
#[command(version, about = "Answer the roadmap questionnaire from the terminal")]
struct Cli {
    /// Address of the questionnaire server
    #[arg(long, env = "QUESTIONNAIRE_BASE_URL")]
    base_url: Option<String>,

    /// TOML settings file with [wizard] and [api] tables
    #[arg(long)]
    config: Option<PathBuf>,

    /// When answers are validated
    #[arg(long, value_enum)]
    policy: Option<Policy>,

    /// Only ask follow-ups of the goals picked in this question
    #[arg(long, value_name = "QUESTION_ID", num_args = 0..=1, default_missing_value = "1")]
    conditional: Option<i64>,

    /// Path of the save-answer endpoint, e.g. /api/save-answer
    #[arg(long)]
    save_endpoint: Option<String>,

    /// Cookie header carrying an existing session
    #[arg(long, env = "QUESTIONNAIRE_SESSION", hide_env_values = true)]
    session_cookie: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Check the session before loading
    #[arg(long)]
    auth_check: bool,

    /// Run against a built-in sample questionnaire instead of a server
    #[arg(long)]
    demo: bool,

    /// Disable colors
    #[arg(long)]
    plain: bool,
}

impl Cli {
    /// Command-line arguments win over the settings file.
    fn apply(&self, settings: &mut Settings) {
        if let Some(base_url) = &self.base_url {
            settings.api.base_url = Some(base_url.clone());
        }
        if let Some(policy) = self.policy {
            settings.wizard.validation_policy = policy.into();
        }
        if let Some(question) = self.conditional {
            settings.wizard = settings.wizard.clone().conditional_on(question);
        }
        if let Some(path) = &self.save_endpoint {
            settings.api.endpoints.save_answer = path.clone();
        }
        if let Some(cookie) = &self.session_cookie {
            settings.api.session_cookie = Some(cookie.clone());
        }
        if let Some(secs) = self.timeout {
            settings.api.timeout_secs = Some(secs);
        }
        if self.auth_check {
            settings.wizard.auth_check = true;
        }
    }
}

fn init_tracing() {
    // stderr keeps log lines out of the prompts
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn demo_api() -> TestApi {
    cloud_security_saved_answers().into_iter().fold(
        TestApi::new().with_questions(cloud_security_roadmap()),
        |api, saved| api.with_saved_answer(saved.question_id, saved.answer),
    )
}

async fn run<A: QuestionnaireApi>(
    api: A,
    view: DialoguerView,
    config: WizardConfig,
) -> Result<Option<String>> {
    let mut wizard = WizardController::new(api, view, config);
    match run_wizard(&mut wizard).await {
        Ok(document_url) => Ok(Some(document_url)),
        Err(DialoguerError::Cancelled) => Ok(None),
        Err(err) => Err(err).context("Questionnaire failed"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut settings = Settings::load(cli.config.as_deref())?;
    cli.apply(&mut settings);

    let view = if cli.plain {
        DialoguerView::plain()
    } else {
        DialoguerView::new()
    };

    let document_url = if cli.demo {
        let mut config = settings.wizard;
        if config.conditional.is_none() {
            config = config.conditional_on(GOAL_QUESTION);
        }
        info!("running the built-in sample questionnaire");
        run(demo_api(), view, config).await?
    } else {
        let api = HttpApi::new(settings.api.api_config()?)
            .context("Failed to set up the HTTP client")?;
        info!(base_url = %api.config().base_url, "connecting");
        run(api, view, settings.wizard).await?
    };

    match document_url {
        Some(url) => println!("\nYour roadmap is ready: {url}"),
        None => println!("\nCancelled. Answers accepted so far are saved."),
    }
    Ok(())
}
