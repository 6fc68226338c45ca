//! Right-to-left folds over a postfix program.
//!
//! Evaluating and describing the stack walk it the same way:  pop the last op, recursively consume
//! whatever operands it needs from the ops before it, and hand back the unconsumed prefix.  [fold]
//! implements that walk once; a [Fold] decides what each op produces.

use biometrics::Counter;

use crate::ops::{format_operand, Op, PRECEDENCE_LOWEST};
use crate::variables::Variables;
use crate::Outcome;

/// Rendered in place of an operand the stack does not provide.
pub const MISSING_OPERAND: &str = "?";

/// The deepest an expression may nest before its operands fold as missing.
pub const MAX_DEPTH: usize = 1024;

//////////////////////////////////////////// biometrics ////////////////////////////////////////////

static TOO_DEEP: Counter = Counter::new("rpncalc.fold.too_deep");

pub(crate) fn register_biometrics(collector: &biometrics::Collector) {
    collector.register_counter(&TOO_DEEP);
}

/////////////////////////////////////////////// Fold ///////////////////////////////////////////////

/// A [Fold] turns each kind of op into a value.  Operands that the stack could not supply arrive
/// as `None`.  The context flows from parent to child and lets a fold render a child differently
/// depending on where it sits.
pub trait Fold {
    type Value;
    type Context: Copy;

    fn operand(&self, value: f64) -> Option<Self::Value>;
    fn constant(&self, symbol: &'static str, value: f64) -> Option<Self::Value>;
    fn variable(&self, name: &str) -> Option<Self::Value>;

    /// The context handed to the operand of a unary op.
    fn unary_context(&self) -> Self::Context;
    fn unary(
        &self,
        symbol: &'static str,
        func: fn(f64) -> f64,
        operand: Option<Self::Value>,
    ) -> Option<Self::Value>;

    /// The contexts handed to the (earlier, later) operands of a binary op.
    fn binary_context(&self, precedence: u8) -> (Self::Context, Self::Context);
    fn binary(
        &self,
        context: Self::Context,
        symbol: &'static str,
        precedence: u8,
        func: fn(f64, f64) -> f64,
        lhs: Option<Self::Value>,
        rhs: Option<Self::Value>,
    ) -> Option<Self::Value>;
}

/// Fold the expression that ends at the tail of `ops`.  Returns the folded value, or `None` when
/// `ops` is empty, and the ops that precede the expression.
///
/// The returned slice is always a prefix of `ops`, and a strict prefix when `ops` is non-empty.
/// Expressions nest at most [MAX_DEPTH] ops deep.  Operands any deeper fold as missing, and
/// everything before them counts as consumed.
pub fn fold<'a, F: Fold>(
    folder: &F,
    ops: &'a [Op],
    context: F::Context,
) -> (Option<F::Value>, &'a [Op]) {
    fold_bounded(folder, ops, context, 0)
}

fn fold_bounded<'a, F: Fold>(
    folder: &F,
    ops: &'a [Op],
    context: F::Context,
    depth: usize,
) -> (Option<F::Value>, &'a [Op]) {
    let Some((op, rest)) = ops.split_last() else {
        return (None, ops);
    };
    if depth > MAX_DEPTH {
        TOO_DEEP.click();
        return (None, &ops[..0]);
    }
    match op {
        Op::Operand(value) => (folder.operand(*value), rest),
        Op::Constant { symbol, value } => (folder.constant(*symbol, *value), rest),
        Op::Variable(name) => (folder.variable(name), rest),
        Op::Unary { symbol, func } => {
            let (operand, rest) = fold_bounded(folder, rest, folder.unary_context(), depth + 1);
            (folder.unary(*symbol, *func, operand), rest)
        }
        Op::Binary {
            symbol,
            precedence,
            func,
        } => {
            let (lhs_context, rhs_context) = folder.binary_context(*precedence);
            // The later-pushed operand sits closest to the operator.
            let (rhs, rest) = fold_bounded(folder, rest, rhs_context, depth + 1);
            let (lhs, rest) = fold_bounded(folder, rest, lhs_context, depth + 1);
            (
                folder.binary(context, *symbol, *precedence, *func, lhs, rhs),
                rest,
            )
        }
    }
}

///////////////////////////////////////////// Evaluate /////////////////////////////////////////////

/// Fold the stack into a number, resolving variables against `variables`.
pub struct Evaluate<'a> {
    variables: &'a Variables,
}

impl<'a> Evaluate<'a> {
    pub fn new(variables: &'a Variables) -> Self {
        Self { variables }
    }
}

impl Fold for Evaluate<'_> {
    type Value = f64;
    type Context = ();

    fn operand(&self, value: f64) -> Option<f64> {
        Some(value)
    }

    fn constant(&self, _: &'static str, value: f64) -> Option<f64> {
        Some(value)
    }

    fn variable(&self, name: &str) -> Option<f64> {
        self.variables.get(name)
    }

    fn unary_context(&self) {}

    fn unary(&self, _: &'static str, func: fn(f64) -> f64, operand: Option<f64>) -> Option<f64> {
        operand.map(func)
    }

    fn binary_context(&self, _: u8) -> ((), ()) {
        ((), ())
    }

    fn binary(
        &self,
        _: (),
        _: &'static str,
        _: u8,
        func: fn(f64, f64) -> f64,
        lhs: Option<f64>,
        rhs: Option<f64>,
    ) -> Option<f64> {
        match (lhs, rhs) {
            (Some(lhs), Some(rhs)) => Some(func(lhs, rhs)),
            _ => None,
        }
    }
}

/// Evaluate the right-most expression on `ops`.  Expressions further left do not contribute.
pub fn evaluate(ops: &[Op], variables: &Variables) -> Outcome {
    fold(&Evaluate::new(variables), ops, ()).0.into()
}

///////////////////////////////////////////// Describe /////////////////////////////////////////////

/// Fold the stack into infix text.  The context is the precedence the parent demands of a child;
/// a binary child binding more loosely than that gets parenthesized.
pub struct Describe;

impl Fold for Describe {
    type Value = String;
    type Context = u8;

    fn operand(&self, value: f64) -> Option<String> {
        Some(format_operand(value))
    }

    fn constant(&self, symbol: &'static str, _: f64) -> Option<String> {
        Some(symbol.to_string())
    }

    fn variable(&self, name: &str) -> Option<String> {
        Some(name.to_string())
    }

    fn unary_context(&self) -> u8 {
        PRECEDENCE_LOWEST
    }

    fn unary(
        &self,
        symbol: &'static str,
        _: fn(f64) -> f64,
        operand: Option<String>,
    ) -> Option<String> {
        let operand = operand.unwrap_or_else(|| MISSING_OPERAND.to_string());
        Some(format!("{}({})", symbol, operand))
    }

    fn binary_context(&self, precedence: u8) -> (u8, u8) {
        // The later operand must bind strictly tighter so that 10 − (4 − 1) keeps its grouping.
        (precedence, precedence + 1)
    }

    fn binary(
        &self,
        context: u8,
        symbol: &'static str,
        precedence: u8,
        _: fn(f64, f64) -> f64,
        lhs: Option<String>,
        rhs: Option<String>,
    ) -> Option<String> {
        let lhs = lhs.unwrap_or_else(|| MISSING_OPERAND.to_string());
        let rhs = rhs.unwrap_or_else(|| MISSING_OPERAND.to_string());
        if precedence < context {
            Some(format!("({} {} {})", lhs, symbol, rhs))
        } else {
            Some(format!("{} {} {}", lhs, symbol, rhs))
        }
    }
}

/// Describe every expression on `ops` in infix, oldest first and comma-separated.  A stack that
/// holds exactly one expression is suffixed with ` =`.  The empty stack describes as "".
pub fn describe(ops: &[Op]) -> String {
    let (last, mut rest) = fold(&Describe, ops, PRECEDENCE_LOWEST);
    let Some(last) = last else {
        return String::new();
    };
    if rest.is_empty() {
        return format!("{} =", last);
    }
    let mut terms = vec![last];
    while !rest.is_empty() {
        let (term, remaining) = fold(&Describe, rest, PRECEDENCE_LOWEST);
        terms.push(term.unwrap_or_else(|| MISSING_OPERAND.to_string()));
        rest = remaining;
    }
    terms.reverse();
    terms.join(", ")
}

/////////////////////////////////////////////// tests //////////////////////////////////////////////
