//! Terminal renderers for a [`SessionSnapshot`].
//!
//! Pure functions: they read a snapshot and return strings. Nothing here
//! keeps state of its own.

use crate::session::{DocumentSession, Operation, RequestStatus, SessionSnapshot, Turn};

/// ANSI styling, switchable off for pipes and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    pub fn ansi() -> Self {
        Self { enabled: true }
    }

    pub fn plain() -> Self {
        Self { enabled: false }
    }

    fn paint(&self, code: &str, s: &str) -> String {
        if self.enabled {
            format!("\x1b[{code}m{s}\x1b[0m")
        } else {
            s.to_string()
        }
    }

    pub fn green(&self, s: &str) -> String {
        self.paint("32", s)
    }
    pub fn red(&self, s: &str) -> String {
        self.paint("31", s)
    }
    pub fn dim(&self, s: &str) -> String {
        self.paint("2", s)
    }
    pub fn bold(&self, s: &str) -> String {
        self.paint("1", s)
    }
    pub fn cyan(&self, s: &str) -> String {
        self.paint("36", s)
    }
}

/// Placeholder shown while the transcript is empty.
pub const EMPTY_TRANSCRIPT: &str = "Your conversation will appear here.";

const INDENT: &str = "  ";

/// Split `text` on newlines, keeping every line. Whitespace-only lines become
/// empty lines so the break survives without trailing junk.
pub fn text_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(|line| {
            let line = line.strip_suffix('\r').unwrap_or(line);
            if line.trim().is_empty() {
                ""
            } else {
                line
            }
        })
        .collect()
}

fn indented(text: &str) -> String {
    text_lines(text)
        .into_iter()
        .map(|l| {
            if l.is_empty() {
                String::new()
            } else {
                format!("{INDENT}{l}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_turn(turn: &Turn, p: Palette) -> String {
    match turn {
        Turn::User { text } => format!("{}\n{}", p.bold(&p.cyan("You:")), indented(text)),
        Turn::Ai { text, model, usage } => {
            let footer = match usage {
                Some(u) => format!("{model} · {} tokens", u.total_tokens),
                None => model.clone(),
            };
            format!(
                "{}\n{}\n{INDENT}{}",
                p.bold("AI Response:"),
                indented(text),
                p.dim(&footer)
            )
        }
    }
}

pub fn render_transcript(turns: &[Turn], p: Palette) -> String {
    if turns.is_empty() {
        return p.dim(EMPTY_TRANSCRIPT);
    }
    turns
        .iter()
        .map(|t| render_turn(t, p))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn render_document(doc: &DocumentSession, p: Palette) -> String {
    match (&doc.file_name, doc.is_ready) {
        (Some(name), true) => format!(
            "{} {}",
            p.green(&format!("Selected file: {name}")),
            p.dim(&format!("({} chars extracted)", doc.char_count()))
        ),
        (None, true) => p.green("Document ready"),
        _ => p.dim("Upload a PDF to enable querying"),
    }
}

/// Label shown next to a spinner while `operation` is in flight.
pub fn in_flight_label(operation: Operation) -> &'static str {
    match operation {
        Operation::Upload => "Uploading…",
        Operation::Query => "Processing…",
    }
}

/// Inline error banner.
pub fn render_error(message: &str, p: Palette) -> String {
    p.red(&format!("⚠️ {message}"))
}

/// `None` while idle; a spinner label or an error banner otherwise.
pub fn render_status(operation: Operation, status: &RequestStatus, p: Palette) -> Option<String> {
    match status {
        RequestStatus::Idle => None,
        RequestStatus::InFlight => Some(p.cyan(in_flight_label(operation))),
        RequestStatus::Failed(msg) => Some(render_error(msg, p)),
    }
}

/// Full three-step page: document, query box state, results.
pub fn render_snapshot(s: &SessionSnapshot, p: Palette) -> String {
    let mut out = Vec::new();

    out.push(p.bold("Step 1: Select PDF & Extract Text"));
    out.push(format!("{INDENT}{}", render_document(&s.document, p)));
    if let Some(line) = render_status(Operation::Upload, &s.upload, p) {
        out.push(format!("{INDENT}{line}"));
    }

    out.push(String::new());
    out.push(p.bold("Step 2: Query the Document"));
    let prompt_line = if !s.document.is_ready {
        p.dim("Upload a PDF to enable querying")
    } else if s.draft.is_empty() {
        p.dim("Ask something about the document...")
    } else {
        format!("> {}", s.draft)
    };
    out.push(format!("{INDENT}{prompt_line}"));
    if let Some(line) = render_status(Operation::Query, &s.query, p) {
        out.push(format!("{INDENT}{line}"));
    }

    out.push(String::new());
    out.push(p.bold("Step 3: Results"));
    out.push(render_transcript(&s.transcript, p));

    out.join("\n")
}
