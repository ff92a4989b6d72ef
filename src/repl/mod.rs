//! Interactive REPL (Read-Eval-Print Loop)
//!
//! A line-editing shell over [`Runtime`]:
//! - Command history (persisted across sessions)
//! - Tab completion for keywords, globals, and REPL commands
//! - Multi-line input while brackets or strings are open
//! - Optional display of the lowered IR of every evaluated match

use crate::ir::lowered_matches;
use crate::{Runtime, Value};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{Context, Editor, Helper};
use std::path::PathBuf;
use thiserror::Error;

/// REPL configuration
#[derive(Debug, Clone)]
pub struct ReplConfig {
    /// History file path
    pub history_file: Option<PathBuf>,
    /// Prompt string
    pub prompt: String,
    /// Continuation prompt (for multi-line input)
    pub continuation_prompt: String,
    /// Print the lowered IR of each match before its result
    pub show_ir: bool,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            history_file: home_dir().map(|h| h.join(".quickmatch_history")),
            prompt: "qm> ".to_string(),
            continuation_prompt: "... ".to_string(),
            show_ir: false,
        }
    }
}

impl ReplConfig {
    pub fn with_history_file(mut self, path: Option<PathBuf>) -> Self {
        self.history_file = path;
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn with_continuation_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.continuation_prompt = prompt.into();
        self
    }

    pub fn with_show_ir(mut self, show_ir: bool) -> Self {
        self.show_ir = show_ir;
        self
    }
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}

/// Words offered by tab completion
const COMPLETIONS: &[&str] = &[
    "match", "else", "if", "const", "let", "var", "function", "return", "throw",
    "try", "catch", "finally", "while", "new", "typeof", "instanceof", "true",
    "false", "null", "undefined", "Array", "Object", "Error", "TypeError",
    "MatchError", "Number", "String", "Boolean", "Symbol", "console",
];

/// REPL commands for completion
const REPL_COMMANDS: &[&str] = &[".help", ".exit", ".clear", ".ir", ".load", ".reset"];

/// Where an input line stops being balanced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Balance {
    Complete,
    Open,
}

/// Scan brackets and quotes the way the host lexer would, ignoring `//`
/// comments
fn balance(input: &str) -> Balance {
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        match quote {
            Some(q) => match ch {
                '\\' => {
                    chars.next();
                }
                _ if ch == q => quote = None,
                _ => {}
            },
            None => match ch {
                '"' | '\'' => quote = Some(ch),
                '/' if chars.peek() == Some(&'/') => {
                    for c in chars.by_ref() {
                        if c == '\n' {
                            break;
                        }
                    }
                }
                '{' | '(' | '[' => depth += 1,
                '}' | ')' | ']' => depth -= 1,
                _ => {}
            },
        }
    }

    if depth > 0 || quote.is_some() {
        Balance::Open
    } else {
        Balance::Complete
    }
}

/// REPL helper for validation and completion
struct ReplHelper;

impl Helper for ReplHelper {}
impl Highlighter for ReplHelper {}

impl Hinter for ReplHelper {
    type Hint = String;
}

impl Completer for ReplHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Self::Candidate>)> {
        let start = line[..pos]
            .rfind(|c: char| !c.is_alphanumeric() && c != '_' && c != '$' && c != '.')
            .map_or(0, |i| i + 1);
        let word = &line[start..pos];
        if word.is_empty() {
            return Ok((pos, Vec::new()));
        }

        let source = if word.starts_with('.') { REPL_COMMANDS } else { COMPLETIONS };
        let candidates = source
            .iter()
            .filter(|candidate| candidate.starts_with(word))
            .map(|candidate| Pair {
                display: candidate.to_string(),
                replacement: candidate.to_string(),
            })
            .collect();
        Ok((start, candidates))
    }
}

impl Validator for ReplHelper {
    fn validate(&self, ctx: &mut ValidationContext) -> rustyline::Result<ValidationResult> {
        Ok(match balance(ctx.input()) {
            Balance::Open => ValidationResult::Incomplete,
            Balance::Complete => ValidationResult::Valid(None),
        })
    }
}

/// Special REPL commands
#[derive(Debug, Clone, PartialEq)]
pub enum ReplCommand {
    Help,
    Clear,
    Exit,
    ShowIr(bool),
    Load(String),
    Reset,
}

impl ReplCommand {
    fn parse(input: &str) -> Option<Self> {
        let rest = input.trim().strip_prefix('.')?;
        let mut parts = rest.splitn(2, ' ');
        let cmd = parts.next()?.to_lowercase();
        let arg = parts.next().map(|s| s.trim().to_string());

        match cmd.as_str() {
            "help" | "h" => Some(Self::Help),
            "clear" | "cls" => Some(Self::Clear),
            "exit" | "quit" | "q" => Some(Self::Exit),
            "ir" => Some(Self::ShowIr(arg.as_deref().unwrap_or("on") != "off")),
            "load" => arg.map(Self::Load),
            "reset" => Some(Self::Reset),
            _ => None,
        }
    }
}

/// REPL errors
#[derive(Debug, Error)]
pub enum ReplError {
    #[error("initialization error: {0}")]
    InitError(String),
    #[error("I/O error: {0}")]
    IoError(String),
    #[error("interrupted")]
    Interrupted,
    #[error("end of input")]
    Eof,
}

/// The REPL instance
pub struct Repl {
    config: ReplConfig,
    runtime: Runtime,
    editor: Editor<ReplHelper, rustyline::history::DefaultHistory>,
}

impl Repl {
    /// Create a new REPL with default configuration
    pub fn new() -> Result<Self, ReplError> {
        Self::with_config(ReplConfig::default())
    }

    /// Create a new REPL with custom configuration
    pub fn with_config(config: ReplConfig) -> Result<Self, ReplError> {
        Self::with_runtime(config, Runtime::new())
    }

    /// Create a REPL over an existing runtime
    pub fn with_runtime(config: ReplConfig, runtime: Runtime) -> Result<Self, ReplError> {
        let mut editor = Editor::new().map_err(|e| ReplError::InitError(e.to_string()))?;
        editor.set_helper(Some(ReplHelper));

        if let Some(ref history_file) = config.history_file {
            if let Err(e) = editor.load_history(history_file) {
                tracing::debug!(path = %history_file.display(), error = %e, "no history loaded");
            }
        }

        Ok(Self {
            config,
            runtime,
            editor,
        })
    }

    /// Run the REPL
    pub fn run(&mut self) -> Result<(), ReplError> {
        println!("Quickmatch v{}", crate::VERSION);
        println!("Type .help for available commands\n");

        loop {
            match self.read_input() {
                Ok(input) => {
                    if input.trim().is_empty() {
                        continue;
                    }

                    if let Some(cmd) = ReplCommand::parse(&input) {
                        match self.execute_command(cmd) {
                            Ok(true) => continue,
                            Ok(false) => break,
                            Err(e) => {
                                eprintln!("Error: {}", e);
                                continue;
                            }
                        }
                    }

                    self.eval_and_print(&input);
                }
                Err(ReplError::Interrupted) => {
                    println!("\n(To exit, type .exit or press Ctrl+D)");
                }
                Err(ReplError::Eof) => break,
                Err(e) => eprintln!("Error: {}", e),
            }
        }

        if let Some(ref history_file) = self.config.history_file {
            if let Err(e) = self.editor.save_history(history_file) {
                tracing::warn!(path = %history_file.display(), error = %e, "failed to save history");
            }
        }

        Ok(())
    }

    fn read_input(&mut self) -> Result<String, ReplError> {
        match self.editor.readline(&self.config.prompt) {
            Ok(line) => {
                let _ = self.editor.add_history_entry(&line);
                Ok(line)
            }
            Err(ReadlineError::Interrupted) => Err(ReplError::Interrupted),
            Err(ReadlineError::Eof) => Err(ReplError::Eof),
            Err(e) => Err(ReplError::IoError(e.to_string())),
        }
    }

    fn eval_and_print(&mut self, code: &str) {
        if self.config.show_ir {
            self.print_ir(code);
        }

        match self.runtime.eval(code) {
            Ok(value) => {
                if let Some(output) = format_result(&value) {
                    println!("{}", output);
                }
            }
            Err(e) => eprintln!("{}", e),
        }
    }

    fn print_ir(&self, code: &str) {
        let Ok(program) = self.runtime.lower(code) else {
            return;
        };
        for lowered in lowered_matches(&program) {
            match serde_json::to_string_pretty(&lowered) {
                Ok(json) => println!("{}", json),
                Err(e) => eprintln!("Error: {}", e),
            }
        }
    }

    fn execute_command(&mut self, cmd: ReplCommand) -> Result<bool, ReplError> {
        match cmd {
            ReplCommand::Help => {
                print_help(&self.config.continuation_prompt);
                Ok(true)
            }
            ReplCommand::Clear => {
                print!("\x1b[2J\x1b[H");
                Ok(true)
            }
            ReplCommand::Exit => Ok(false),
            ReplCommand::ShowIr(enabled) => {
                self.config.show_ir = enabled;
                println!("IR display: {}", if enabled { "on" } else { "off" });
                Ok(true)
            }
            ReplCommand::Load(path) => {
                let code =
                    std::fs::read_to_string(&path).map_err(|e| ReplError::IoError(e.to_string()))?;
                self.eval_and_print(&code);
                Ok(true)
            }
            ReplCommand::Reset => {
                self.runtime = Runtime::with_config(self.runtime.config().clone());
                println!("Runtime reset.");
                Ok(true)
            }
        }
    }
}

/// Text printed for an evaluation result; `undefined` prints nothing
fn format_result(value: &Value) -> Option<String> {
    match value {
        Value::Undefined => None,
        Value::String(s) => Some(format!("'{}'", s)),
        Value::BigInt(n) => Some(format!("{}n", n)),
        other => Some(other.to_display_string()),
    }
}

fn print_help(continuation_prompt: &str) {
    println!("Available commands:");
    println!("  .help, .h        Show this help message");
    println!("  .clear, .cls     Clear the screen");
    println!("  .exit, .quit     Exit the REPL");
    println!("  .ir [on|off]     Print the lowered IR of each match");
    println!("  .load <file>     Load and execute a file");
    println!("  .reset           Reset the runtime state");
    println!();
    println!(
        "Unclosed brackets continue input on a '{}' line.",
        continuation_prompt.trim_end()
    );
}
