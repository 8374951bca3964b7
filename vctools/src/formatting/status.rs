//! Status markers for task progress and command results.

use owo_colors::OwoColorize;
use vctools_core::Phase;

/// Outcome shown next to a task or command message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Running,
    Done,
    Failed,
    Warning,
}

impl From<Phase> for Status {
    fn from(phase: Phase) -> Self {
        match phase {
            Phase::Start => Status::Running,
            Phase::Stop => Status::Done,
            Phase::Error => Status::Failed,
        }
    }
}

impl Status {
    pub fn symbol(self) -> &'static str {
        match self {
            Status::Running => "→",
            Status::Done => "✓",
            Status::Failed => "✗",
            Status::Warning => "⚠",
        }
    }

    /// The symbol in the status color.
    pub fn marker(self) -> String {
        let symbol = self.symbol();
        match self {
            Status::Running => symbol.cyan().to_string(),
            Status::Done => symbol.green().to_string(),
            Status::Failed => symbol.red().to_string(),
            Status::Warning => symbol.yellow().to_string(),
        }
    }

    /// Marker followed by the message, bold for final outcomes.
    pub fn format(self, message: &str) -> String {
        let text = match self {
            Status::Running => message.cyan().to_string(),
            Status::Done => message.green().bold().to_string(),
            Status::Failed => message.red().bold().to_string(),
            Status::Warning => message.yellow().bold().to_string(),
        };
        format!("{} {}", self.marker(), text)
    }
}

pub fn print_success(message: &str) {
    println!("  {}", Status::Done.format(message));
}

/// Errors go to stderr so `--json` output stays parseable.
pub fn print_error(message: &str) {
    eprintln!("  {}", Status::Failed.format(message));
}

pub fn print_warning(message: &str) {
    println!("  {}", Status::Warning.format(message));
}
