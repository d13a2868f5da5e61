//! Page renderers.
//!
//! A renderer turns a URL into the visible text of the fully loaded,
//! client-side rendered page, together with the URL the page ended up on
//! (which differs from the requested one after a login redirect).
//!
//! - [`CommandRenderer`] - Delegates to an external headless browser command
//! - [`FileRenderer`] - Reads a saved text dump
//! - [`StaticRenderer`] - Returns fixed text (tests and demos)

use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::process::ProcessRunner;
use crate::error::FetchError;

/// Placeholder replaced by the target URL in renderer command arguments.
pub const URL_PLACEHOLDER: &str = "{url}";

// ============================================================================
// Rendered Page
// ============================================================================

/// Visible text of a rendered page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    /// Full visible text content (not HTML).
    pub text: String,
    /// URL the browser ended up on.
    pub current_url: String,
}

impl RenderedPage {
    /// Creates a rendered page.
    pub fn new(text: impl Into<String>, current_url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            current_url: current_url.into(),
        }
    }
}

// ============================================================================
// Renderer Trait
// ============================================================================

/// Something that can produce the rendered text of a page.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Renders `url` and returns its visible text.
    ///
    /// Implementations must return complete text or an error, never a
    /// partially loaded page.
    async fn render(&self, url: &str) -> Result<RenderedPage, FetchError>;
}

// ============================================================================
// Command Renderer
// ============================================================================

/// JSON shape a render command may print instead of plain text.
#[derive(Debug, Deserialize)]
struct CommandPayload {
    text: String,
    #[serde(default, alias = "currentUrl", alias = "current_url")]
    url: Option<String>,
}

/// Renders pages by running an external command.
///
/// The command receives the URL through the `{url}` placeholder (or as a
/// trailing argument when no placeholder is present) and prints either the
/// page text, or a JSON object `{"text": "...", "url": "..."}`.
#[derive(Debug, Clone)]
pub struct CommandRenderer {
    program: String,
    args: Vec<String>,
    process_timeout: Duration,
    runner: ProcessRunner,
}

impl CommandRenderer {
    /// Creates a renderer from a command line (`program` followed by args).
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Render` when the command line is empty.
    pub fn from_command_line(command: &[String], process_timeout: Duration) -> Result<Self, FetchError> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| FetchError::Render("empty render command".to_string()))?;
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
            process_timeout,
            runner: ProcessRunner::new(),
        })
    }

    /// Returns true if the program can be found.
    pub fn is_available(&self) -> bool {
        self.runner.command_exists(&self.program)
    }

    fn args_for(&self, url: &str) -> Vec<String> {
        let mut substituted = false;
        let mut args: Vec<String> = self
            .args
            .iter()
            .map(|arg| {
                if arg.contains(URL_PLACEHOLDER) {
                    substituted = true;
                    arg.replace(URL_PLACEHOLDER, url)
                } else {
                    arg.clone()
                }
            })
            .collect();
        if !substituted {
            args.push(url.to_string());
        }
        args
    }
}

/// Interprets renderer stdout as JSON payload or plain text.
fn parse_command_output(stdout: &str, requested_url: &str) -> RenderedPage {
    let trimmed = stdout.trim_start();
    if trimmed.starts_with('{') {
        match serde_json::from_str::<CommandPayload>(trimmed) {
            Ok(payload) => {
                let url = payload.url.unwrap_or_else(|| requested_url.to_string());
                return RenderedPage::new(payload.text, url);
            }
            Err(e) => debug!(error = %e, "Render output is not a JSON payload, using as text"),
        }
    }
    RenderedPage::new(stdout, requested_url)
}

#[async_trait]
impl PageRenderer for CommandRenderer {
    fn name(&self) -> &str {
        &self.program
    }

    #[instrument(skip(self), fields(program = %self.program))]
    async fn render(&self, url: &str) -> Result<RenderedPage, FetchError> {
        let args = self.args_for(url);
        let output = self
            .runner
            .run(&self.program, &args, self.process_timeout)
            .await?;
        let stdout = output.into_stdout().map_err(|e| {
            warn!(error = %e, "Render command failed");
            FetchError::Process(e)
        })?;

        let page = parse_command_output(&stdout, url);
        debug!(len = page.text.len(), current_url = %page.current_url, "Page rendered");
        Ok(page)
    }
}

// ============================================================================
// File Renderer
// ============================================================================

/// Reads page text previously saved to disk.
#[derive(Debug, Clone)]
pub struct FileRenderer {
    path: PathBuf,
}

impl FileRenderer {
    /// Creates a renderer reading `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PageRenderer for FileRenderer {
    fn name(&self) -> &str {
        "file"
    }

    async fn render(&self, url: &str) -> Result<RenderedPage, FetchError> {
        let text = tokio::fs::read_to_string(&self.path).await?;
        debug!(path = %self.path.display(), len = text.len(), "Read saved page text");
        Ok(RenderedPage::new(text, url))
    }
}

// ============================================================================
// Static Renderer
// ============================================================================

/// Returns the same page every time, optionally after a delay.
#[derive(Debug, Clone)]
pub struct StaticRenderer {
    page: RenderedPage,
    delay: Option<Duration>,
}

impl StaticRenderer {
    /// Creates a renderer returning `text` with `current_url`.
    pub fn new(text: impl Into<String>, current_url: impl Into<String>) -> Self {
        Self {
            page: RenderedPage::new(text, current_url),
            delay: None,
        }
    }

    /// Delays every render by `delay`.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl PageRenderer for StaticRenderer {
    fn name(&self) -> &str {
        "static"
    }

    async fn render(&self, _url: &str) -> Result<RenderedPage, FetchError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.page.clone())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_text_output() {
        let page = parse_command_output("Current session\n45% used\n", "https://claude.ai/settings/usage");
        assert_eq!(page.text, "Current session\n45% used\n");
        assert_eq!(page.current_url, "https://claude.ai/settings/usage");
    }

    #[test]
    fn test_parse_json_output() {
        let stdout = r#"{"text": "Welcome back", "url": "https://claude.ai/login"}"#;
        let page = parse_command_output(stdout, "https://claude.ai/settings/usage");
        assert_eq!(page.text, "Welcome back");
        assert_eq!(page.current_url, "https://claude.ai/login");
    }

    #[test]
    fn test_parse_broken_json_falls_back_to_text() {
        let stdout = "{not json";
        let page = parse_command_output(stdout, "https://claude.ai/settings/usage");
        assert_eq!(page.text, "{not json");
    }

    #[test]
    fn test_args_substitute_placeholder() {
        let command = vec![
            "render-page".to_string(),
            "--url={url}".to_string(),
            "--text".to_string(),
        ];
        let renderer = CommandRenderer::from_command_line(&command, Duration::from_secs(5)).unwrap();
        assert_eq!(
            renderer.args_for("https://example.com"),
            vec!["--url=https://example.com".to_string(), "--text".to_string()]
        );
    }

    #[test]
    fn test_args_append_url_without_placeholder() {
        let command = vec!["render-page".to_string(), "--text".to_string()];
        let renderer = CommandRenderer::from_command_line(&command, Duration::from_secs(5)).unwrap();
        assert_eq!(
            renderer.args_for("https://example.com"),
            vec!["--text".to_string(), "https://example.com".to_string()]
        );
    }

    #[test]
    fn test_empty_command_rejected() {
        assert!(CommandRenderer::from_command_line(&[], Duration::from_secs(5)).is_err());
    }

    #[tokio::test]
    async fn test_file_renderer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("usage.txt");
        tokio::fs::write(&path, "All models\n80% used").await.unwrap();

        let page = FileRenderer::new(&path).render("https://claude.ai/settings/usage").await.unwrap();
        assert_eq!(page.text, "All models\n80% used");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_renderer_runs_shell() {
        let command = vec![
            "sh".to_string(),
            "-c".to_string(),
            "printf 'page for %s' \"$0\"".to_string(),
        ];
        let renderer = CommandRenderer::from_command_line(&command, Duration::from_secs(5)).unwrap();
        let page = renderer.render("https://claude.ai/settings/usage").await.unwrap();
        assert_eq!(page.text, "page for https://claude.ai/settings/usage");
    }
}
