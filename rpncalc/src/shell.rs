//! A line-oriented front end that drives a [Calculator] the way its keypad would.

use std::collections::VecDeque;
use std::io::Write;
use std::path::Path;

use biometrics::Counter;
use indicio::{clue, INFO};
use rustyline::error::ReadlineError;
use rustyline::history::MemHistory;
use rustyline::{Config, Editor};

use crate::ops::KnownOps;
use crate::{Calculator, Error, Outcome, COLLECTOR};

//////////////////////////////////////////// biometrics ////////////////////////////////////////////

static LINES: Counter = Counter::new("rpncalc.shell.lines");
static INPUT_ERROR: Counter = Counter::new("rpncalc.shell.input_error");

pub(crate) fn register_biometrics(collector: &biometrics::Collector) {
    collector.register_counter(&LINES);
    collector.register_counter(&INPUT_ERROR);
}

////////////////////////////////////////////// aliases /////////////////////////////////////////////

/// ASCII spellings for the symbols that are awkward to type.
const ALIASES: &[(&str, &str)] = &[
    ("*", "×"),
    ("/", "÷"),
    ("-", "−"),
    ("sqrt", "√"),
    ("pi", "π"),
    ("+/-", "±"),
];

const HELP: &str = "rpncalc: a reverse Polish calculator.

NUMBER: ....... Push an operand, e.g. 3, -2.5, or 1e3.
+ − × ÷: ...... Combine the two most recent expressions (ASCII: + - * /).
sin cos √: .... Apply a function to the most recent expression (ASCII: sqrt).
±: ............ Change the sign of the most recent expression (ASCII: +/-).
π: ............ Push pi (ASCII: pi).
NAME: ......... Push a reference to the variable NAME.
->NAME: ....... Store the displayed value in the variable NAME.
NAME=NUMBER: .. Assign NUMBER to the variable NAME.
clear: ........ Clear the stack and every variable.
vars: ......... List every variable that holds a value.
help: ......... Print this help menu.
";

////////////////////////////////////////////// Console /////////////////////////////////////////////

/// A [Console] feeds the shell one line at a time and receives everything the shell prints.
/// Returns `Ok(None)` when the session is over.
pub trait Console: Write {
    fn next_line(&mut self) -> Result<Option<String>, Error>;
}

///////////////////////////////////////// LineEditorConsole ////////////////////////////////////////

/// A [LineEditorConsole] reads from the terminal with line editing and in-memory history.
pub struct LineEditorConsole {
    rl: Editor<(), MemHistory>,
    prompt: String,
}

impl LineEditorConsole {
    pub fn new(prompt: &str) -> Result<Self, Error> {
        let config = Config::builder()
            .max_history_size(1_000_000)?
            .history_ignore_dups(true)?
            .history_ignore_space(true)
            .build();
        let hist = MemHistory::new();
        let rl = Editor::with_history(config, hist)?;
        Ok(Self {
            rl,
            prompt: prompt.to_string(),
        })
    }
}

impl Write for LineEditorConsole {
    fn write(&mut self, buf: &[u8]) -> Result<usize, std::io::Error> {
        std::io::stdout().write(buf)
    }

    fn flush(&mut self) -> Result<(), std::io::Error> {
        std::io::stdout().flush()
    }
}

impl Console for LineEditorConsole {
    fn next_line(&mut self) -> Result<Option<String>, Error> {
        match self.rl.readline(&self.prompt) {
            Ok(line) => {
                self.rl.add_history_entry(line.as_str())?;
                Ok(Some(line))
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

/////////////////////////////////////////// ScriptConsole //////////////////////////////////////////

/// A [ScriptConsole] replays a fixed script and sends the shell's output to `output`.
pub struct ScriptConsole<W: Write> {
    lines: VecDeque<String>,
    output: W,
}

impl<W: Write> ScriptConsole<W> {
    pub fn new(script: &str, output: W) -> Self {
        Self {
            lines: script.lines().map(|s| s.to_owned()).collect(),
            output,
        }
    }

    pub fn from_path<P: AsRef<Path>>(script: P, output: W) -> Result<Self, Error> {
        let script = std::fs::read_to_string(script)?;
        Ok(Self::new(&script, output))
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl<W: Write> Write for ScriptConsole<W> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, std::io::Error> {
        self.output.write(buf)
    }

    fn flush(&mut self) -> Result<(), std::io::Error> {
        self.output.flush()
    }
}

impl<W: Write> Console for ScriptConsole<W> {
    fn next_line(&mut self) -> Result<Option<String>, Error> {
        Ok(self.lines.pop_front())
    }
}

/////////////////////////////////////////// ShellOptions ///////////////////////////////////////////

/// Configuration for the `rpncalc` shell.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "command_line", derive(arrrg_derive::CommandLine))]
pub struct ShellOptions {
    /// The prompt shown before each line.
    #[cfg_attr(
        feature = "command_line",
        arrrg(optional, "Prompt to show before reading each line.", "PROMPT")
    )]
    pub prompt: String,
    /// Run this script instead of reading from the terminal.
    #[cfg_attr(
        feature = "command_line",
        arrrg(optional, "Run the commands in SCRIPT instead of prompting.", "SCRIPT")
    )]
    pub script: Option<String>,
    /// Emit clues to stderr.
    #[cfg_attr(feature = "command_line", arrrg(flag, "Emit clues to stderr."))]
    pub verbose: bool,
}

impl Default for ShellOptions {
    fn default() -> Self {
        Self {
            prompt: "rpncalc> ".to_string(),
            script: None,
            verbose: false,
        }
    }
}

////////////////////////////////////////////// Command /////////////////////////////////////////////

/// One whitespace-separated word of shell input.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Operand(f64),
    Operation(String),
    PushVariable(String),
    Store(String),
    Assign(String, f64),
    Clear,
    ListVariables,
    Help,
}

impl Command {
    /// Interpret `word` against the ops in `known`.
    pub fn parse(word: &str, known: &KnownOps) -> Result<Self, Error> {
        if looks_numeric(word) {
            return word
                .parse::<f64>()
                .map(Command::Operand)
                .map_err(|_| Error::InvalidNumber {
                    word: word.to_string(),
                });
        }
        if known.lookup(word).is_some() {
            return Ok(Command::Operation(word.to_string()));
        }
        if let Some((_, symbol)) = ALIASES.iter().find(|(alias, _)| *alias == word) {
            return Ok(Command::Operation(symbol.to_string()));
        }
        match word {
            "clear" => return Ok(Command::Clear),
            "vars" => return Ok(Command::ListVariables),
            "help" => return Ok(Command::Help),
            _ => {}
        }
        if let Some(name) = word.strip_prefix("->").or_else(|| word.strip_prefix('→')) {
            return Ok(Command::Store(variable_name(name, known)?));
        }
        if let Some((name, value)) = word.split_once('=') {
            let name = variable_name(name, known)?;
            if !looks_numeric(value) {
                return Err(Error::InvalidNumber {
                    word: value.to_string(),
                });
            }
            let value = value.parse::<f64>().map_err(|_| Error::InvalidNumber {
                word: value.to_string(),
            })?;
            return Ok(Command::Assign(name, value));
        }
        if is_identifier(word) {
            return Ok(Command::PushVariable(word.to_string()));
        }
        Err(Error::UnknownCommand {
            word: word.to_string(),
        })
    }
}

fn looks_numeric(word: &str) -> bool {
    let unsigned = word
        .strip_prefix('-')
        .or_else(|| word.strip_prefix('+'))
        .unwrap_or(word);
    unsigned
        .chars()
        .next()
        .map(|c| c.is_ascii_digit() || c == '.')
        .unwrap_or(false)
}

fn is_identifier(word: &str) -> bool {
    let mut chars = word.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => {
            return false;
        }
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

fn variable_name(name: &str, known: &KnownOps) -> Result<String, Error> {
    if name.is_empty() {
        return Err(Error::EmptyVariableName);
    }
    let reserved = known.lookup(name).is_some()
        || ALIASES.iter().any(|(alias, _)| *alias == name)
        || name == "clear"
        || name == "vars"
        || name == "help";
    if !is_identifier(name) || reserved {
        return Err(Error::InvalidVariableName {
            name: name.to_string(),
        });
    }
    Ok(name.to_string())
}

/////////////////////////////////////////////// Shell //////////////////////////////////////////////

/// A [Shell] reads lines from its [Console], applies each word to a [Calculator], and after every
/// line prints the description of the stack followed by the displayed value.
pub struct Shell<C: Console> {
    calculator: Calculator,
    console: C,
    display: Outcome,
}

impl<C: Console> Shell<C> {
    pub fn new(console: C) -> Self {
        Self {
            calculator: Calculator::new(),
            console,
            display: Outcome::NoValue,
        }
    }

    pub fn calculator(&self) -> &Calculator {
        &self.calculator
    }

    /// The value the display currently shows.
    pub fn display(&self) -> Outcome {
        self.display
    }

    pub fn into_console(self) -> C {
        self.console
    }

    /// Interpret lines until the console runs dry.
    pub fn run(&mut self) -> Result<(), Error> {
        while let Some(line) = self.console.next_line()? {
            self.interpret(&line)?;
        }
        self.console.flush()?;
        Ok(())
    }

    /// Interpret one line.  Mistakes in the input are reported on the console and skipped; only
    /// console failures are returned.
    pub fn interpret(&mut self, line: &str) -> Result<(), Error> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(());
        }
        LINES.click();
        let mut print_help = false;
        for word in line.split_whitespace() {
            match self.step(word) {
                Ok(Command::Help) => {
                    print_help = true;
                }
                Ok(Command::ListVariables) => {
                    self.list_variables()?;
                }
                Ok(_) => {}
                Err(err) => {
                    INPUT_ERROR.click();
                    clue!(COLLECTOR, INFO, {
                        input_error: err.to_string(),
                    });
                    writeln!(self.console, "{}", err)?;
                }
            }
        }
        if print_help {
            write!(self.console, "{}", HELP)?;
            let symbols = self.calculator.known_ops().symbols();
            writeln!(self.console, "\nknown ops: {}\n", symbols.join(" "))?;
        }
        writeln!(self.console, "{}", self.calculator.describe())?;
        writeln!(self.console, "{}", self.display)?;
        Ok(())
    }

    fn list_variables(&mut self) -> Result<(), Error> {
        let variables = self.calculator.variables();
        if variables.is_empty() {
            writeln!(self.console, "no variables")?;
        }
        for (name, value) in variables.iter() {
            writeln!(self.console, "{} = {}", name, value)?;
        }
        Ok(())
    }

    fn step(&mut self, word: &str) -> Result<Command, Error> {
        let command = Command::parse(word, self.calculator.known_ops())?;
        match &command {
            Command::Operand(value) => {
                self.display = self.calculator.push_operand(*value);
            }
            Command::Operation(symbol) => {
                self.display = self.calculator.perform_operation(symbol);
            }
            Command::PushVariable(name) => {
                self.display = self.calculator.push_variable(name.as_str());
            }
            Command::Store(name) => {
                let Outcome::Value(value) = self.display else {
                    return Err(Error::NoValueToStore {
                        variable: name.clone(),
                    });
                };
                self.display = self.calculator.set_variable(name.as_str(), value);
            }
            Command::Assign(name, value) => {
                self.display = self.calculator.set_variable(name.as_str(), *value);
            }
            Command::Clear => {
                self.calculator.clear();
                self.display = self.calculator.evaluate();
            }
            Command::ListVariables | Command::Help => {}
        }
        Ok(command)
    }
}

/////////////////////////////////////////////// tests //////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(word: &str) -> Result<Command, Error> {
        Command::parse(word, &KnownOps::new())
    }

    fn transcript(script: &str) -> String {
        let mut shell = Shell::new(ScriptConsole::new(script, Vec::new()));
        shell.run().unwrap();
        String::from_utf8(shell.into_console().into_output()).unwrap()
    }

    #[test]
    fn parse_numbers() {
        assert_eq!(Command::Operand(3.0), parse("3").unwrap());
        assert_eq!(Command::Operand(-2.5), parse("-2.5").unwrap());
        assert_eq!(Command::Operand(0.5), parse(".5").unwrap());
        assert_eq!(Command::Operand(1000.0), parse("1e3").unwrap());
        assert_eq!(Command::Operand(4.0), parse("+4").unwrap());
        assert!(matches!(parse("3.x"), Err(Error::InvalidNumber { .. })));
    }

    #[test]
    fn parse_operations() {
        assert_eq!(Command::Operation("×".to_string()), parse("×").unwrap());
        assert_eq!(Command::Operation("×".to_string()), parse("*").unwrap());
        assert_eq!(Command::Operation("÷".to_string()), parse("/").unwrap());
        assert_eq!(Command::Operation("−".to_string()), parse("-").unwrap());
        assert_eq!(Command::Operation("+".to_string()), parse("+").unwrap());
        assert_eq!(Command::Operation("√".to_string()), parse("sqrt").unwrap());
        assert_eq!(Command::Operation("π".to_string()), parse("pi").unwrap());
        assert_eq!(Command::Operation("±".to_string()), parse("+/-").unwrap());
        assert_eq!(Command::Operation("sin".to_string()), parse("sin").unwrap());
    }

    #[test]
    fn parse_variables() {
        assert_eq!(Command::PushVariable("M".to_string()), parse("M").unwrap());
        assert_eq!(Command::PushVariable("inf".to_string()), parse("inf").unwrap());
        assert_eq!(Command::Store("M".to_string()), parse("->M").unwrap());
        assert_eq!(Command::Store("x_1".to_string()), parse("→x_1").unwrap());
        assert!(matches!(parse("->"), Err(Error::EmptyVariableName)));
        assert!(matches!(parse("->sin"), Err(Error::InvalidVariableName { .. })));
        assert!(matches!(parse("->1x"), Err(Error::InvalidVariableName { .. })));
        assert!(matches!(parse("->clear"), Err(Error::InvalidVariableName { .. })));
        assert_eq!(Command::Assign("M".to_string(), 5.0), parse("M=5").unwrap());
        assert_eq!(Command::Assign("y".to_string(), -0.5), parse("y=-0.5").unwrap());
        assert!(matches!(parse("M="), Err(Error::InvalidNumber { .. })));
        assert!(matches!(parse("M=x"), Err(Error::InvalidNumber { .. })));
        assert!(matches!(parse("=5"), Err(Error::EmptyVariableName)));
        assert!(matches!(parse("cos=5"), Err(Error::InvalidVariableName { .. })));
    }

    #[test]
    fn parse_commands() {
        assert_eq!(Command::Clear, parse("clear").unwrap());
        assert_eq!(Command::Help, parse("help").unwrap());
        assert_eq!(Command::ListVariables, parse("vars").unwrap());
        assert!(matches!(parse("->vars"), Err(Error::InvalidVariableName { .. })));
        assert!(matches!(parse("%"), Err(Error::UnknownCommand { .. })));
        assert!(matches!(parse("a+b"), Err(Error::UnknownCommand { .. })));
    }

    #[test]
    fn shell_three_plus_four() {
        assert_eq!("3.0 + 4.0 =\n7\n", transcript("3 4 +"));
    }

    #[test]
    fn shell_one_word_per_line() {
        assert_eq!(
            "10.0 =\n10\n10.0, 4.0\n4\n10.0 − 4.0 =\n6\n",
            transcript("10\n4\n-\n")
        );
    }

    #[test]
    fn shell_skips_blank_lines_and_comments() {
        assert_eq!("2.0 =\n2\n", transcript("\n# a comment\n   \n2\n"));
    }

    #[test]
    fn shell_reports_bad_words_and_continues() {
        assert_eq!(
            "unknown command: %\n1.0 + 2.0 =\n3\n",
            transcript("1 % 2 +")
        );
    }

    #[test]
    fn shell_memory() {
        let output = transcript("M 2 ×\n5 ->M\n+\n");
        assert_eq!(
            "M × 2.0 =\nerror\nM × 2.0, 5.0\n5\nM × 2.0 + 5.0 =\n15\n",
            output
        );
    }

    #[test]
    fn shell_assign_does_not_push() {
        let output = transcript("M 2 ×\nM=5\nM=-1\n");
        assert_eq!(
            "M × 2.0 =\nerror\nM × 2.0 =\n10\nM × 2.0 =\n-2\n",
            output
        );
    }

    #[test]
    fn shell_store_without_value() {
        let output = transcript("->M");
        assert_eq!("no value to store in M\n\nerror\n", output);
    }

    #[test]
    fn shell_clear() {
        let mut shell = Shell::new(ScriptConsole::new("5 ->M M\nclear", Vec::new()));
        shell.run().unwrap();
        assert_eq!(Outcome::NoValue, shell.display());
        assert!(shell.calculator().program().is_empty());
        assert_eq!(None, shell.calculator().variable("M"));
    }

    #[test]
    fn shell_help() {
        let output = transcript("help");
        assert!(output.starts_with(HELP));
        assert!(output.contains("\nknown ops: + cos sin ± × ÷ π − √\n\n"));
        assert!(output.ends_with("\n\nerror\n"));
    }

    #[test]
    fn shell_lists_variables() {
        assert_eq!("no variables\n\nerror\n", transcript("vars"));
        assert_eq!(
            "\nerror\nM = 2\nx = 0.5\n\nerror\n",
            transcript("x=0.5 M=2\nvars\n")
        );
        assert_eq!("M = 3\nM =\n3\n", transcript("M=3 M vars"));
    }

    #[test]
    fn default_options() {
        let options = ShellOptions::default();
        assert_eq!("rpncalc> ", options.prompt);
        assert_eq!(None, options.script);
        assert!(!options.verbose);
    }
}
