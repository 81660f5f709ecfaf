//! CLI argument parsing for the study assistant.
//!
//! Each feature subcommand collects raw request fields; validation happens in
//! the flow, never here, so flags and `--input` files are held to the same
//! constraints.
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "studyflow",
    version,
    about = "Exam-prep study assistant backed by a generative model",
    after_help = "Examples:\n  studyflow notes --topic \"Newton's Laws of Motion\" --language Mixed\n  studyflow mock-test --topic Kinematics --mcq 5 --short 0 --long 0 --difficulty hard\n  studyflow tutor --message \"Why does ice float?\"\n  studyflow plan --start 2024-06-01 --end 2024-06-30 --mock-test-day 2024-06-10\n  studyflow plan --input plan.json --json\n  studyflow config",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    /// Config file (defaults to <config dir>/studyflow/config.json when present)
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Local command to use as the model instead of Gemini
    #[arg(long, value_name = "COMMAND", global = true)]
    pub lm: Option<String>,

    /// Gemini model name
    #[arg(long, value_name = "NAME", global = true)]
    pub model: Option<String>,

    /// Append one JSON line per model invocation to this file
    #[arg(long, value_name = "PATH", global = true)]
    pub lm_log: Option<PathBuf>,

    /// Record full prompt and reply text in the invocation log
    #[arg(long, global = true)]
    pub lm_log_full: bool,

    /// Emit debug logs on stderr
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Notes(NotesArgs),
    MockTest(MockTestArgs),
    Tutor(TutorArgs),
    Plan(PlanArgs),
    Config(ConfigArgs),
}

/// Options shared by every feature subcommand.
#[derive(Args, Debug, Default)]
pub struct RequestArgs {
    /// JSON object of request fields; flags override its values
    #[arg(long, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
#[command(about = "Generate structured notes on a topic")]
pub struct NotesArgs {
    /// Topic to cover (at least 3 characters)
    #[arg(long)]
    pub topic: Option<String>,

    /// English, Bengali, or "Mixed Bangla-English" (alias: Mixed)
    #[arg(long)]
    pub language: Option<String>,

    #[command(flatten)]
    pub request: RequestArgs,
}

#[derive(Parser, Debug)]
#[command(about = "Generate a mock test with answer key and solutions")]
pub struct MockTestArgs {
    /// Topic to test (at least 3 characters)
    #[arg(long)]
    pub topic: Option<String>,

    /// Number of multiple-choice questions (0-20)
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    pub mcq: Option<i64>,

    /// Number of short answer questions (0-10)
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    pub short: Option<i64>,

    /// Number of long answer questions (0-5)
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    pub long: Option<i64>,

    /// Number of numerical problems (0-10)
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    pub numerical: Option<i64>,

    /// easy, medium, or hard
    #[arg(long)]
    pub difficulty: Option<String>,

    /// English, Bengali, or "Mixed Bangla-English" (alias: Mixed)
    #[arg(long)]
    pub language: Option<String>,

    #[command(flatten)]
    pub request: RequestArgs,
}

#[derive(Parser, Debug)]
#[command(about = "Ask the tutor; starts an interactive session without --message")]
pub struct TutorArgs {
    /// Single message to send
    #[arg(long)]
    pub message: Option<String>,

    #[command(flatten)]
    pub request: RequestArgs,
}

#[derive(Parser, Debug)]
#[command(about = "Generate a day-wise study timetable")]
pub struct PlanArgs {
    /// First day of the plan (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub start: Option<String>,

    /// Last day of the plan (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub end: Option<String>,

    /// Subject to include; repeat for several
    #[arg(long = "subject", value_name = "NAME")]
    pub subjects: Vec<String>,

    /// Days between revision slots (1-14)
    #[arg(long, value_name = "DAYS", allow_negative_numbers = true)]
    pub interval: Option<i64>,

    /// Mock test day (YYYY-MM-DD); repeat for several
    #[arg(long = "mock-test-day", value_name = "DATE")]
    pub mock_test_days: Vec<String>,

    /// Days missed so far
    #[arg(long, value_name = "DAYS", allow_negative_numbers = true)]
    pub missed_days: Option<i64>,

    /// Progress so far, in percent (0-100)
    #[arg(long, value_name = "PERCENT", allow_negative_numbers = true)]
    pub progress: Option<i64>,

    #[command(flatten)]
    pub request: RequestArgs,
}

#[derive(Parser, Debug)]
#[command(about = "Print the resolved model configuration")]
pub struct ConfigArgs {
    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}
