//! A terminal front end for `tiny-agent`.

#[macro_use]
extern crate tracing;

use std::io::Write as _;
use std::process::ExitCode;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use tiny_agent::SessionBuilder;
use tiny_agent::core::Interaction;
use tiny_agent_openai_model::{OpenAIConfigBuilder, OpenAIProvider};
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};
use tracing_subscriber::EnvFilter;

const BAR_CHAR: &str = "▎";

/// Chat with a model that can read and write files and run shell commands.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// API key of the OpenAI-compatible service.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Base URL of the service, e.g. `https://openrouter.ai/api/v1`.
    #[arg(long, env = "OPENAI_BASE_URL")]
    base_url: Option<String>,

    /// Model to chat with.
    #[arg(long, env = "OPENAI_MODEL")]
    model: Option<String>,

    /// The first prompt. Prompts are read from stdin otherwise.
    #[arg(short, long)]
    prompt: Option<String>,

    /// Kill shell commands running longer than this many seconds.
    #[arg(long, value_name = "SECONDS")]
    bash_timeout: Option<u64>,
}

/// A spinner shown while the agent is busy, shared with the tool call hook.
#[derive(Clone)]
struct Spinner {
    style: ProgressStyle,
    current: Arc<Mutex<Option<ProgressBar>>>,
}

impl Spinner {
    fn new() -> Self {
        let style = ProgressStyle::with_template("{spinner} {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
        Self {
            style,
            current: Default::default(),
        }
    }

    fn start(&self) {
        let mut current =
            self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(progress_bar) = current.take() {
            progress_bar.finish_and_clear();
        }
        let progress_bar = ProgressBar::new_spinner();
        progress_bar.set_style(self.style.clone());
        progress_bar.set_message("🤔 Thinking...");
        progress_bar.enable_steady_tick(Duration::from_millis(100));
        *current = Some(progress_bar);
    }

    fn set_message(&self, message: String) {
        let current =
            self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(progress_bar) = current.as_ref() {
            progress_bar.set_message(message);
        }
    }

    fn finish(&self) {
        let mut current =
            self.current.lock().unwrap_or_else(PoisonError::into_inner);
        // Finish the progress bar before printing anything else.
        if let Some(progress_bar) = current.take() {
            progress_bar.finish_and_clear();
        }
    }
}

struct Terminal {
    initial_prompt: Option<String>,
    stdin: BufReader<Stdin>,
    spinner: Spinner,
}

impl Interaction for Terminal {
    async fn next_input(&mut self) -> Option<String> {
        if let Some(prompt) = self.initial_prompt.take() {
            println!("> {prompt}");
            self.spinner.start();
            return Some(prompt);
        }

        print!("> ");
        std::io::stdout().flush().ok();

        // Blank lines are sent as empty user turns.
        let line = read_line(&mut self.stdin).await?;
        self.spinner.start();
        Some(line)
    }

    fn show_message(&mut self, message: &str) {
        self.spinner.finish();
        println!("{}🤖 {}", BAR_CHAR.bright_cyan(), message.bright_white());
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = OpenAIConfigBuilder::with_api_key(args.api_key);
    if let Some(base_url) = args.base_url {
        config = config.with_base_url(base_url);
    }
    if let Some(model) = args.model {
        config = config.with_model(model);
    }
    let config = config.build();
    debug!("using provider config: {config:?}");
    let model_provider = OpenAIProvider::new(config);

    let spinner = Spinner::new();
    let mut session_builder = SessionBuilder::with_model_provider(model_provider)
        .with_system_prompt(
            include_str!("./system_prompt.md")
                .replace("{{HOST_OS}}", host_os()),
        )
        .on_tool_call({
            let spinner = spinner.clone();
            move |req| {
                spinner.set_message(format!("🔧 Running {}...", req.name));
            }
        });
    if let Some(secs) = args.bash_timeout {
        session_builder =
            session_builder.with_bash_timeout(Duration::from_secs(secs));
    }
    let mut session = session_builder.build();

    let mut terminal = Terminal {
        initial_prompt: args.prompt,
        stdin: BufReader::new(io::stdin()),
        spinner: spinner.clone(),
    };
    match session.run(&mut terminal).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            spinner.finish();
            eprintln!("{} {err}", "error:".bright_red().bold());
            ExitCode::FAILURE
        }
    }
}

/// Reads a line without its line ending. `None` means end of input.
async fn read_line<R: AsyncBufRead + Unpin>(reader: &mut R) -> Option<String> {
    let mut buf = Vec::new();
    match reader.read_until(b'\n', &mut buf).await {
        Ok(0) => None,
        // Invalid UTF-8 is replaced instead of ending the session.
        Ok(_) => {
            let line = String::from_utf8_lossy(&buf);
            Some(line.trim_end_matches(['\n', '\r']).to_owned())
        }
        Err(err) => {
            error!("error reading input: {}", err);
            None
        }
    }
}

#[inline]
fn host_os() -> &'static str {
    let os = std::env::consts::OS;
    match os {
        "linux" => "Linux",
        "macos" => "macOS",
        "windows" => "Windows",
        _ => "some other OS",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_line() {
        let mut input: &[u8] = b"hello\n\r\n  \n\xffbye";

        assert_eq!(read_line(&mut input).await.as_deref(), Some("hello"));
        assert_eq!(read_line(&mut input).await.as_deref(), Some(""));
        assert_eq!(read_line(&mut input).await.as_deref(), Some("  "));
        assert_eq!(read_line(&mut input).await.as_deref(), Some("\u{fffd}bye"));
        assert_eq!(read_line(&mut input).await, None);
    }
}
