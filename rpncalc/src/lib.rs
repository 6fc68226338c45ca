#![doc = include_str!("../README.md")]

use std::fmt::{Display, Formatter};

use biometrics::Counter;
use indicio::{clue, INFO};
use rustyline::error::ReadlineError;

pub mod fold;
pub mod ops;
pub mod shell;
pub mod variables;

pub use ops::{KnownOps, Op};
pub use shell::{Console, LineEditorConsole, ScriptConsole, Shell, ShellOptions};
pub use variables::Variables;

//////////////////////////////////////////// biometrics ////////////////////////////////////////////

static PUSH_OPERAND: Counter = Counter::new("rpncalc.push_operand");
static PUSH_VARIABLE: Counter = Counter::new("rpncalc.push_variable");
static SET_VARIABLE: Counter = Counter::new("rpncalc.set_variable");
static PERFORM_OPERATION: Counter = Counter::new("rpncalc.perform_operation");
static UNKNOWN_OPERATION: Counter = Counter::new("rpncalc.unknown_operation");
static NO_VALUE: Counter = Counter::new("rpncalc.no_value");
static DESCRIBE: Counter = Counter::new("rpncalc.describe");
static CLEAR: Counter = Counter::new("rpncalc.clear");

/// Register this crate's biometrics with the provided Collector.
pub fn register_biometrics(collector: &biometrics::Collector) {
    collector.register_counter(&PUSH_OPERAND);
    collector.register_counter(&PUSH_VARIABLE);
    collector.register_counter(&SET_VARIABLE);
    collector.register_counter(&PERFORM_OPERATION);
    collector.register_counter(&UNKNOWN_OPERATION);
    collector.register_counter(&NO_VALUE);
    collector.register_counter(&DESCRIBE);
    collector.register_counter(&CLEAR);
    fold::register_biometrics(collector);
    shell::register_biometrics(collector);
}

////////////////////////////////////////////// indicio /////////////////////////////////////////////

pub static COLLECTOR: indicio::Collector = indicio::Collector::new();

/////////////////////////////////////////////// Error //////////////////////////////////////////////

/// The Error type.  The calculator itself never fails; these are the ways driving it from a
/// console can go wrong.
#[derive(Debug)]
pub enum Error {
    /// Reading or writing the console failed.
    Io(std::io::Error),
    /// The line editor failed.
    Readline(ReadlineError),
    /// A word looked like a number but did not parse as one.
    InvalidNumber {
        /// The offending word.
        word: String,
    },
    /// A word is neither a number, an operation, a command, nor a variable.
    UnknownCommand {
        /// The offending word.
        word: String,
    },
    /// `->` was not followed by a name.
    EmptyVariableName,
    /// The name cannot be used for a variable.
    InvalidVariableName {
        /// The rejected name.
        name: String,
    },
    /// There is no displayed value to store into `variable`.
    NoValueToStore {
        /// The variable that would have been assigned.
        variable: String,
    },
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(err) => write!(f, "i/o error: {}", err),
            Error::Readline(err) => write!(f, "could not read line: {}", err),
            Error::InvalidNumber { word } => write!(f, "invalid number: {}", word),
            Error::UnknownCommand { word } => write!(f, "unknown command: {}", word),
            Error::EmptyVariableName => write!(f, "missing variable name after ->"),
            Error::InvalidVariableName { name } => write!(f, "invalid variable name: {}", name),
            Error::NoValueToStore { variable } => {
                write!(f, "no value to store in {}", variable)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Readline(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<ReadlineError> for Error {
    fn from(err: ReadlineError) -> Self {
        Self::Readline(err)
    }
}

////////////////////////////////////////////// Outcome /////////////////////////////////////////////

/// The result of evaluating the stack.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Outcome {
    /// The right-most expression evaluated to this value.
    Value(f64),
    /// The stack is empty, an operand is missing, or a variable was never assigned.
    NoValue,
}

impl Outcome {
    pub fn value(&self) -> Option<f64> {
        match self {
            Outcome::Value(value) => Some(*value),
            Outcome::NoValue => None,
        }
    }

    pub fn is_value(&self) -> bool {
        matches!(self, Outcome::Value(_))
    }
}

impl From<Option<f64>> for Outcome {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(value) => Outcome::Value(value),
            None => Outcome::NoValue,
        }
    }
}

impl Display for Outcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Value(value) => write!(f, "{}", value),
            Outcome::NoValue => write!(f, "error"),
        }
    }
}

//////////////////////////////////////////// Calculator ////////////////////////////////////////////

/// A [Calculator] holds a postfix program and the variables it refers to.  Every mutation
/// re-evaluates the whole program from scratch and returns the new [Outcome].
///
/// ```
/// use rpncalc::{Calculator, Outcome};
///
/// let mut calc = Calculator::new();
/// calc.push_operand(3.0);
/// calc.push_operand(4.0);
/// assert_eq!(Outcome::Value(7.0), calc.perform_operation("+"));
/// assert_eq!("3.0 + 4.0 =", calc.describe());
/// ```
#[derive(Clone, Debug, Default)]
pub struct Calculator {
    known_ops: KnownOps,
    stack: Vec<Op>,
    variables: Variables,
}

impl Calculator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a literal number.
    pub fn push_operand(&mut self, value: f64) -> Outcome {
        PUSH_OPERAND.click();
        self.stack.push(Op::Operand(value));
        self.evaluate()
    }

    /// Push a reference to `name`.  The reference resolves whenever the stack gets evaluated.
    pub fn push_variable(&mut self, name: impl Into<String>) -> Outcome {
        PUSH_VARIABLE.click();
        self.stack.push(Op::Variable(name.into()));
        self.evaluate()
    }

    /// Assign `value` to `name`.  The stack is untouched; the new value shows in the outcome.
    pub fn set_variable(&mut self, name: impl Into<String>, value: f64) -> Outcome {
        SET_VARIABLE.click();
        self.variables.set(name, value);
        self.evaluate()
    }

    /// Push the op known as `symbol`.  Unknown symbols are ignored and leave the stack as is.
    pub fn perform_operation(&mut self, symbol: &str) -> Outcome {
        match self.known_ops.lookup(symbol) {
            Some(op) => {
                PERFORM_OPERATION.click();
                self.stack.push(op.clone());
            }
            None => {
                UNKNOWN_OPERATION.click();
                clue!(COLLECTOR, INFO, {
                    unknown_operation: symbol,
                });
            }
        }
        self.evaluate()
    }

    /// Evaluate the most recent expression on the stack.
    pub fn evaluate(&self) -> Outcome {
        let outcome = fold::evaluate(&self.stack, &self.variables);
        if !outcome.is_value() {
            NO_VALUE.click();
        }
        outcome
    }

    /// Render the stack in infix.  See [fold::describe].
    pub fn describe(&self) -> String {
        DESCRIBE.click();
        fold::describe(&self.stack)
    }

    /// Empty the stack and forget every variable.
    pub fn clear(&mut self) {
        CLEAR.click();
        clue!(COLLECTOR, INFO, {
            clear: self.stack.len() as u64,
        });
        self.stack.clear();
        self.variables.clear();
    }

    /// The ops pushed so far, oldest first.
    pub fn program(&self) -> &[Op] {
        &self.stack
    }

    /// The value currently assigned to `name`.
    pub fn variable(&self, name: &str) -> Option<f64> {
        self.variables.get(name)
    }

    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    pub fn known_ops(&self) -> &KnownOps {
        &self.known_ops
    }
}

impl Display for Calculator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", fold::describe(&self.stack))
    }
}

/////////////////////////////////////////////// tests //////////////////////////////////////////////
