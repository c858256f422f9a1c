//! CLI binary for pdf-insights.
//!
//! A thin shim over the library crate: flags map to `ClientConfig`, an
//! indicatif spinner follows each in-flight request, and the transcript is
//! printed with the library's renderers.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf_insights::view::{self, Palette};
use pdf_insights::{
    ClientConfig, NoopObserver, ObserverRef, Operation, SessionController, SessionObserver, Turn,
};
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

// ── Spinner observer ─────────────────────────────────────────────────────────

/// Shows a spinner while a request is in flight and a one-line summary when
/// an upload finishes. Error banners are printed by the caller.
struct CliObserver {
    bar: Mutex<Option<ProgressBar>>,
    palette: Palette,
}

impl CliObserver {
    fn new(palette: Palette) -> Arc<Self> {
        Arc::new(Self {
            bar: Mutex::new(None),
            palette,
        })
    }

    fn spin(&self, message: String) {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}  {elapsed:.dim}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_message(message);
        bar.enable_steady_tick(Duration::from_millis(80));
        if let Some(old) = self.bar.lock().unwrap().replace(bar) {
            old.finish_and_clear();
        }
    }

    fn clear(&self) {
        if let Some(bar) = self.bar.lock().unwrap().take() {
            bar.finish_and_clear();
        }
    }
}

impl SessionObserver for CliObserver {
    fn on_upload_start(&self, file_name: &str, size_bytes: usize) {
        self.spin(format!(
            "{} {file_name} ({})",
            view::in_flight_label(Operation::Upload),
            human_bytes(size_bytes)
        ));
    }

    fn on_upload_complete(&self, file_name: &str, extracted_chars: usize) {
        self.clear();
        eprintln!(
            "{} {}  {}",
            self.palette.green("✔"),
            self.palette.bold(file_name),
            self.palette.dim(&format!("{extracted_chars} chars extracted"))
        );
    }

    fn on_upload_error(&self, _error: &str) {
        self.clear();
    }

    fn on_query_start(&self, _prompt: &str) {
        self.spin(view::in_flight_label(Operation::Query).to_string());
    }

    fn on_query_complete(&self, _answer: &Turn) {
        self.clear();
    }

    fn on_query_error(&self, _error: &str) {
        self.clear();
    }

    fn on_superseded(&self, _operation: Operation) {
        self.clear();
    }
}

fn human_bytes(n: usize) -> String {
    match n {
        n if n >= 1 << 20 => format!("{:.1} MB", n as f64 / (1 << 20) as f64),
        n if n >= 1 << 10 => format!("{:.1} KB", n as f64 / (1 << 10) as f64),
        n => format!("{n} B"),
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Interactive session
  pdf-insights report.pdf

  # One-shot questions, transcript on stdout
  pdf-insights report.pdf -a "Summarise section 2" -a "Who are the authors?"

  # Machine-readable transcript
  pdf-insights report.pdf -a "List the key figures" --json

  # Backend on another host
  pdf-insights --api-url http://10.0.0.5:8000 report.pdf

INTERACTIVE COMMANDS:
  <text>             ask a question about the loaded document
  :upload <path>     upload a new PDF (clears the conversation)
  :transcript        print the conversation so far
  :status            print document, request status and conversation
  :json              print the conversation as JSON
  :reset             forget the document and conversation
  :help              show this list
  :quit              exit (Ctrl-D works too)

ENVIRONMENT VARIABLES:
  PDF_INSIGHTS_API_URL       Backend base URL (default http://localhost:8000)
  PDF_INSIGHTS_UPLOAD_PATH   Upload endpoint path (default /upload)
  PDF_INSIGHTS_QUERY_PATH    Prompt endpoint path (default /process)
  RUST_LOG                   Overrides the log filter
"#;

/// Ask questions about a PDF through a text-extraction backend.
#[derive(Parser, Debug)]
#[command(
    name = "pdf-insights",
    version,
    about = "Upload a PDF and ask questions about it",
    long_about = "Uploads a PDF to a text-extraction backend, then lets you ask natural-language \
questions about the extracted text. Runs interactively, or answers --ask prompts in one go.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF to upload on start.
    file: Option<PathBuf>,

    /// Ask this question after uploading (repeatable). Disables the interactive prompt.
    #[arg(short, long = "ask", value_name = "PROMPT")]
    ask: Vec<String>,

    /// Backend base URL.
    #[arg(long, env = "PDF_INSIGHTS_API_URL", default_value = pdf_insights::config::DEFAULT_BASE_URL)]
    api_url: String,

    /// Upload endpoint path.
    #[arg(long, env = "PDF_INSIGHTS_UPLOAD_PATH", default_value = "/upload")]
    upload_path: String,

    /// Prompt endpoint path.
    #[arg(long, env = "PDF_INSIGHTS_QUERY_PATH", default_value = "/process")]
    query_path: String,

    /// Print the transcript as JSON instead of formatted text.
    #[arg(long, env = "PDF_INSIGHTS_JSON")]
    json: bool,

    /// Disable ANSI colours.
    #[arg(long, env = "NO_COLOR")]
    no_color: bool,

    /// Disable spinners.
    #[arg(long, env = "PDF_INSIGHTS_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF_INSIGHTS_VERBOSE")]
    verbose: bool,

    /// Suppress all output except answers and errors.
    #[arg(short, long, env = "PDF_INSIGHTS_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Spinners give the feedback that matters; keep library INFO logs out
    // of their way unless asked.
    let show_progress = !cli.quiet && !cli.no_progress && io::stderr().is_terminal();
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let palette = if cli.no_color || !io::stdout().is_terminal() {
        Palette::plain()
    } else {
        Palette::ansi()
    };

    // ── Build session ────────────────────────────────────────────────────
    let config = ClientConfig::builder()
        .base_url(&cli.api_url)
        .upload_path(&cli.upload_path)
        .query_path(&cli.query_path)
        .build()
        .context("Invalid configuration")?;

    let observer: ObserverRef = if show_progress {
        CliObserver::new(palette) as ObserverRef
    } else {
        Arc::new(NoopObserver)
    };

    let session = SessionController::from_config(&config)
        .context("Failed to create API client")?
        .with_observer(observer);

    if cli.ask.is_empty() {
        run_interactive(&cli, &session, palette).await
    } else {
        run_batch(&cli, &session, palette).await
    }
}

/// Upload, answer every `--ask`, print the transcript.
async fn run_batch(cli: &Cli, session: &SessionController, palette: Palette) -> Result<()> {
    let Some(ref path) = cli.file else {
        anyhow::bail!("--ask needs a PDF file to ask about");
    };

    if let Err(e) = session.submit_path(path).await {
        eprintln!("{}", view::render_error(&e.to_string(), palette));
        return Err(e).with_context(|| format!("Upload of {} failed", path.display()));
    }

    let mut failed = 0usize;
    for prompt in &cli.ask {
        if let Err(e) = session.submit_query(prompt.as_str()).await {
            failed += 1;
            eprintln!("{}", view::render_error(&e.to_string(), palette));
        }
    }

    let transcript = session.transcript();
    if cli.json {
        let json =
            serde_json::to_string_pretty(&transcript).context("Failed to serialise transcript")?;
        println!("{json}");
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        writeln!(handle, "{}", view::render_transcript(&transcript, palette))
            .context("Failed to write to stdout")?;
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} questions failed", cli.ask.len());
    }
    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum ReplCommand {
    Ask(String),
    Upload(PathBuf),
    Transcript,
    Status,
    Json,
    Reset,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

fn parse_command(line: &str) -> ReplCommand {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return ReplCommand::Empty;
    }
    let Some(rest) = trimmed.strip_prefix(':') else {
        return ReplCommand::Ask(line.trim_end_matches(['\r', '\n']).to_string());
    };

    let (cmd, arg) = match rest.split_once(char::is_whitespace) {
        Some((c, a)) => (c, a.trim()),
        None => (rest, ""),
    };
    match cmd.to_lowercase().as_str() {
        "upload" | "u" if !arg.is_empty() => ReplCommand::Upload(PathBuf::from(arg)),
        "transcript" | "t" => ReplCommand::Transcript,
        "status" | "s" => ReplCommand::Status,
        "json" => ReplCommand::Json,
        "reset" => ReplCommand::Reset,
        "help" | "h" | "?" => ReplCommand::Help,
        "quit" | "q" | "exit" => ReplCommand::Quit,
        _ => ReplCommand::Unknown(trimmed.to_string()),
    }
}

fn print_prompt(session: &SessionController, palette: Palette) {
    let marker = if session.is_ready() {
        palette.cyan("›")
    } else {
        palette.dim("›")
    };
    eprint!("{marker} ");
    io::stderr().flush().ok();
}

async fn run_interactive(cli: &Cli, session: &SessionController, palette: Palette) -> Result<()> {
    if !cli.quiet {
        eprintln!(
            "{}  {}",
            palette.bold("PDF Insights Engine"),
            palette.dim("extract text from your PDFs and ask about it (:help for commands)")
        );
    }

    if let Some(ref path) = cli.file {
        if let Err(e) = session.submit_path(path).await {
            eprintln!("{}", view::render_error(&e.to_string(), palette));
        }
    } else if !cli.quiet {
        eprintln!("{}", view::render_document(&session.document(), palette));
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print_prompt(session, palette);
        let Some(line) = lines.next_line().await.context("Failed to read stdin")? else {
            eprintln!();
            break;
        };

        match parse_command(&line) {
            ReplCommand::Empty => {}
            ReplCommand::Ask(prompt) => {
                session.set_draft(prompt);
                match session.submit_draft().await {
                    Ok(answer) => println!("{}\n", view::render_turn(&answer, palette)),
                    Err(e) => eprintln!("{}", view::render_error(&e.to_string(), palette)),
                }
            }
            ReplCommand::Upload(path) => {
                if let Err(e) = session.submit_path(&path).await {
                    eprintln!("{}", view::render_error(&e.to_string(), palette));
                }
            }
            ReplCommand::Transcript => {
                println!("{}", view::render_transcript(&session.transcript(), palette));
            }
            ReplCommand::Status => {
                println!("{}", view::render_snapshot(&session.snapshot(), palette));
            }
            ReplCommand::Json => {
                let json = serde_json::to_string_pretty(&session.transcript())
                    .context("Failed to serialise transcript")?;
                println!("{json}");
            }
            ReplCommand::Reset => {
                session.reset();
                eprintln!("{}", view::render_document(&session.document(), palette));
            }
            ReplCommand::Help => eprintln!("{AFTER_HELP}"),
            ReplCommand::Quit => break,
            ReplCommand::Unknown(cmd) => {
                eprintln!(
                    "{}",
                    view::render_error(&format!("Unknown command '{cmd}', try :help"), palette)
                );
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_a_question() {
        assert_eq!(
            parse_command("What is this?\n"),
            ReplCommand::Ask("What is this?".into())
        );
    }

    #[test]
    fn blank_line_is_ignored() {
        assert_eq!(parse_command("   "), ReplCommand::Empty);
    }

    #[test]
    fn commands_parse() {
        assert_eq!(
            parse_command(":upload ./docs/a b.pdf"),
            ReplCommand::Upload(PathBuf::from("./docs/a b.pdf"))
        );
        assert_eq!(parse_command(":T"), ReplCommand::Transcript);
        assert_eq!(parse_command(":json"), ReplCommand::Json);
        assert_eq!(parse_command(":quit"), ReplCommand::Quit);
        assert_eq!(parse_command(":reset"), ReplCommand::Reset);
    }

    #[test]
    fn upload_without_path_is_unknown() {
        assert_eq!(
            parse_command(":upload"),
            ReplCommand::Unknown(":upload".into())
        );
    }

    #[test]
    fn human_bytes_units() {
        assert_eq!(human_bytes(512), "512 B");
        assert_eq!(human_bytes(2048), "2.0 KB");
        assert_eq!(human_bytes(3 << 20), "3.0 MB");
    }
}
