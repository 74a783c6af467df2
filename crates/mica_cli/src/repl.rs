//! The interactive prompt.
//!
//! Lines are collected until the text parses cleanly or a blank line is
//! entered, then evaluated on top of every earlier successful submission.
//! A terminal gets a line editor with history; piped input is read line by
//! line with the same submission rules.

use bumpalo::Bump;
use mica_compiler::{evaluator_options, Compilation};
use mica_evaluator::{StdConsole, Variables};
use mica_options::CompilerOptions;
use mica_parser::SyntaxTree;
use rustyline::completion::Completer;
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{Editor, Helper};
use std::error::Error;
use std::io::{self, BufRead, IsTerminal, Write};
use std::sync::Arc;

use crate::render::{print_diagnostics, print_error, print_evaluate_error, print_value, stdout_is_terminal, GRAY, RESET};

const SUBMISSION_NAME: &str = "<stdin>";
const PROMPT: &str = "» ";
const CONTINUATION_PROMPT: &str = "· ";

enum Command {
    Continue,
    Quit,
}

/// Keeps the editor in multi-line mode until a submission is ready.
struct ReplHelper;

impl Helper for ReplHelper {}

impl Hinter for ReplHelper {
    type Hint = String;
}

impl Highlighter for ReplHelper {}

impl Completer for ReplHelper {
    type Candidate = String;
}

impl Validator for ReplHelper {
    fn validate(&self, context: &mut ValidationContext<'_>) -> Result<ValidationResult, ReadlineError> {
        if is_submission_ready(context.input()) {
            Ok(ValidationResult::Valid(None))
        } else {
            Ok(ValidationResult::Incomplete)
        }
    }
}

struct Repl<'a> {
    arena: &'a Bump,
    options: CompilerOptions,
    pretty: bool,
    previous: Option<Arc<Compilation<'a>>>,
    variables: Variables,
    /// Graph source for `#cfg`: the last submission that bound cleanly.
    last: Option<Arc<Compilation<'a>>>,
}

pub fn run(options: &CompilerOptions, pretty: bool) -> Result<(), Box<dyn Error>> {
    let arena = Bump::new();
    let mut repl = Repl {
        arena: &arena,
        options: options.clone(),
        pretty,
        previous: None,
        variables: Variables::default(),
        last: None,
    };

    if io::stdin().is_terminal() {
        run_editor(&mut repl)
    } else {
        run_piped(&mut repl)
    }
}

fn run_editor(repl: &mut Repl<'_>) -> Result<(), Box<dyn Error>> {
    println!("{GRAY}mica {} (#quit to exit){RESET}", env!("CARGO_PKG_VERSION"));
    let mut editor = Editor::<ReplHelper, DefaultHistory>::new()?;
    editor.set_helper(Some(ReplHelper));

    loop {
        let text = match editor.readline(PROMPT) {
            Ok(text) => text,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        };
        if text.trim().is_empty() {
            continue;
        }
        editor.add_history_entry(text.trim_end())?;

        if is_command(&text) {
            match repl.run_command(text.trim())? {
                Command::Continue => continue,
                Command::Quit => break,
            }
        }
        repl.evaluate_submission(&text)?;
    }
    Ok(())
}

fn run_piped(repl: &mut Repl<'_>) -> Result<(), Box<dyn Error>> {
    let interactive = stdout_is_terminal();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut text = String::new();
    loop {
        if interactive {
            print!("{}", if text.is_empty() { PROMPT } else { CONTINUATION_PROMPT });
            io::stdout().flush()?;
        }
        let Some(line) = lines.next().transpose()? else {
            break;
        };

        if text.is_empty() && is_command(&line) {
            match repl.run_command(line.trim())? {
                Command::Continue => continue,
                Command::Quit => break,
            }
        }

        if text.is_empty() && line.trim().is_empty() {
            continue;
        }
        text.push_str(&line);
        text.push('\n');

        if line.trim().is_empty() || is_complete_submission(&text) {
            repl.evaluate_submission(&text)?;
            text.clear();
        }
    }

    if !text.trim().is_empty() {
        repl.evaluate_submission(&text)?;
    }
    Ok(())
}

fn is_command(text: &str) -> bool {
    text.trim_start().starts_with('#')
}

/// Whether the editor buffer should be handed over: a command, an empty
/// buffer, a trailing blank line, or text that parses cleanly.
fn is_submission_ready(text: &str) -> bool {
    if is_command(text) || text.trim().is_empty() {
        return true;
    }
    // Enter on an empty continuation line leaves the buffer ending in '\n'.
    text.ends_with('\n') || is_complete_submission(text)
}

/// Whether `text` parses without diagnostics.
fn is_complete_submission(text: &str) -> bool {
    let scratch = Bump::new();
    SyntaxTree::parse(&scratch, text).diagnostics().is_empty()
}

impl<'a> Repl<'a> {
    fn run_command(&mut self, line: &str) -> io::Result<Command> {
        let (command, argument) = match line.split_once(char::is_whitespace) {
            Some((command, argument)) => (command, Some(argument.trim())),
            None => (line, None),
        };
        match command {
            "#quit" => return Ok(Command::Quit),
            "#emitTree" => {
                self.options.emit_tree = !self.options.emit_tree;
                let state = if self.options.emit_tree { "on" } else { "off" };
                println!("Emitting lowered tree {state}.");
            }
            "#cfg" => match &self.last {
                Some(compilation) => {
                    let mut stdout = io::stdout().lock();
                    if !compilation.emit_control_flow_graph(argument, &mut stdout)? {
                        print_error(&format!("no function named '{}'", argument.unwrap_or_default()));
                    }
                }
                None => print_error("nothing has been evaluated yet"),
            },
            "#reset" => {
                self.previous = None;
                self.last = None;
                self.variables.clear();
                println!("Session cleared.");
            }
            other => print_error(&format!("unknown command '{other}'")),
        }
        Ok(Command::Continue)
    }

    fn evaluate_submission(&mut self, text: &str) -> io::Result<()> {
        tracing::debug!(lines = text.lines().count(), chained = self.previous.is_some(), "submission");
        let tree = SyntaxTree::parse(self.arena, text);
        let compilation = Arc::new(match &self.previous {
            Some(previous) => previous.continue_with(tree),
            None => Compilation::new(tree),
        });

        let diagnostics = compilation.diagnostics();
        if !diagnostics.is_empty() {
            print_diagnostics(&diagnostics, SUBMISSION_NAME, text, self.pretty);
            return Ok(());
        }
        self.last = Some(Arc::clone(&compilation));

        if self.options.emit_tree {
            compilation.emit_tree(&mut io::stdout().lock())?;
        }

        let options = evaluator_options(&self.options);
        match compilation.evaluate_with(&mut self.variables, &mut StdConsole, options) {
            Ok(result) if !result.diagnostics.is_empty() => {
                print_diagnostics(&result.diagnostics, SUBMISSION_NAME, text, self.pretty);
            }
            Ok(result) => {
                if let Some(value) = &result.value {
                    print_value(value);
                }
                self.previous = Some(compilation);
            }
            Err(err) => print_evaluate_error(&err),
        }
        Ok(())
    }
}
