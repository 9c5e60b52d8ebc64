//! Error types and reporting

use crate::interp::RuntimeError;
use crate::syntax::TreeProblem;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, TarnError>;

/// Driver-level error: everything that can stop a run
#[derive(Debug, Error)]
pub enum TarnError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Tree JSON could not be decoded
    #[error("Tree error: {0}")]
    Tree(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Invalid flag '{0}': expected key=value")]
    InvalidFlag(String),

    /// Tree decoded but has the wrong shape
    #[error("Malformed tree: {} problem(s)", .0.len())]
    Validation(Vec<TreeProblem>),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl TarnError {
    /// Detail lines for errors that carry more than their headline
    pub fn details(&self) -> Vec<String> {
        match self {
            TarnError::Validation(problems) => problems.iter().map(ToString::to_string).collect(),
            _ => Vec::new(),
        }
    }
}

/// Report a runtime error against the program source with ariadne. Errors
/// without a span are reported at the start of the file.
pub fn report_error(filename: &str, source: &str, error: &RuntimeError) -> std::io::Result<()> {
    use ariadne::{Color, Label, Report, ReportKind, Source};

    let kind = format!("{:?}", error.kind);
    match error.span {
        Some(span) => Report::build(ReportKind::Error, (filename, span.start..span.end))
            .with_message(format!("{kind} error"))
            .with_label(
                Label::new((filename, span.start..span.end))
                    .with_message(&error.message)
                    .with_color(Color::Red),
            )
            .finish()
            .eprint((filename, Source::from(source))),
        None => Report::build(ReportKind::Error, (filename, 0..0))
            .with_message(format!("{kind} error: {}", error.message))
            .finish()
            .eprint((filename, Source::from(source))),
    }
}
