//! The operations a calculator knows how to perform.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};

//////////////////////////////////////////// precedence ////////////////////////////////////////////

/// The precedence demanded of the outermost expression.  Nothing gets parenthesized at this level.
pub const PRECEDENCE_LOWEST: u8 = 0;
/// The precedence of `+` and `−`.
pub const PRECEDENCE_ADDITIVE: u8 = 1;
/// The precedence of `×` and `÷`.
pub const PRECEDENCE_MULTIPLICATIVE: u8 = 2;

//////////////////////////////////////////////// Op ////////////////////////////////////////////////

/// An [Op] is one element of the calculator's stack.  Ops never change once created; only the
/// value bound to a [Op::Variable]'s name may change, and that lives outside the op.
#[derive(Clone, Debug)]
pub enum Op {
    /// A literal number.
    Operand(f64),
    /// A function of one argument, displayed as `symbol(argument)`.
    Unary {
        /// The label used when describing the op.
        symbol: &'static str,
        /// The function to apply.
        func: fn(f64) -> f64,
    },
    /// An infix operator.  `func` takes the earlier-pushed operand first.
    Binary {
        /// The label used when describing the op.
        symbol: &'static str,
        /// Binding strength when describing; see the `PRECEDENCE_*` constants.
        precedence: u8,
        /// The function to apply as `func(earlier, later)`.
        func: fn(f64, f64) -> f64,
    },
    /// A named constant such as π.
    Constant {
        /// The label used when describing the op.
        symbol: &'static str,
        /// The value of the constant.
        value: f64,
    },
    /// A reference to a variable, resolved each time the stack gets evaluated.
    Variable(String),
}

impl Op {
    /// The text used for the op when it stands alone.
    pub fn symbol(&self) -> String {
        match self {
            Op::Operand(value) => format_operand(*value),
            Op::Unary { symbol, .. } => symbol.to_string(),
            Op::Binary { symbol, .. } => symbol.to_string(),
            Op::Constant { symbol, .. } => symbol.to_string(),
            Op::Variable(name) => name.clone(),
        }
    }
}

impl Display for Op {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Operands render with their debug representation so that integral values keep a trailing `.0`.
pub fn format_operand(value: f64) -> String {
    format!("{:?}", value)
}

///////////////////////////////////////////// KnownOps /////////////////////////////////////////////

/// [KnownOps] maps the symbols a caller may perform to the op pushed for them.  It is populated
/// once when constructed and read-only afterwards.
#[derive(Clone, Debug)]
pub struct KnownOps {
    ops: HashMap<&'static str, Op>,
}

impl KnownOps {
    /// Create the registry of every op the calculator understands.
    pub fn new() -> Self {
        let mut known = Self {
            ops: HashMap::new(),
        };
        known.learn(Op::Binary {
            symbol: "×",
            precedence: PRECEDENCE_MULTIPLICATIVE,
            func: |lhs, rhs| lhs * rhs,
        });
        known.learn(Op::Binary {
            symbol: "÷",
            precedence: PRECEDENCE_MULTIPLICATIVE,
            func: |lhs, rhs| lhs / rhs,
        });
        known.learn(Op::Binary {
            symbol: "+",
            precedence: PRECEDENCE_ADDITIVE,
            func: |lhs, rhs| lhs + rhs,
        });
        known.learn(Op::Binary {
            symbol: "−",
            precedence: PRECEDENCE_ADDITIVE,
            func: |lhs, rhs| lhs - rhs,
        });
        known.learn(Op::Unary {
            symbol: "sin",
            func: f64::sin,
        });
        known.learn(Op::Unary {
            symbol: "cos",
            func: f64::cos,
        });
        known.learn(Op::Unary {
            symbol: "√",
            func: f64::sqrt,
        });
        // Sign change is keyed by the button label but reads as a minus in descriptions.
        known.ops.insert(
            "±",
            Op::Unary {
                symbol: "-",
                func: |x| -x,
            },
        );
        known.learn(Op::Constant {
            symbol: "π",
            value: std::f64::consts::PI,
        });
        known
    }

    /// Return the op for `symbol`, if one is known.
    pub fn lookup(&self, symbol: &str) -> Option<&Op> {
        self.ops.get(symbol)
    }

    /// The symbols that may be performed, in sorted order.
    pub fn symbols(&self) -> Vec<&'static str> {
        let mut symbols: Vec<&'static str> = self.ops.keys().copied().collect();
        symbols.sort();
        symbols
    }

    fn learn(&mut self, op: Op) {
        let symbol = match &op {
            Op::Unary { symbol, .. } => *symbol,
            Op::Binary { symbol, .. } => *symbol,
            Op::Constant { symbol, .. } => *symbol,
            Op::Operand(_) | Op::Variable(_) => {
                return;
            }
        };
        self.ops.insert(symbol, op);
    }
}

impl Default for KnownOps {
    fn default() -> Self {
        Self::new()
    }
}

/////////////////////////////////////////////// tests //////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    fn binary(known: &KnownOps, symbol: &str) -> (u8, fn(f64, f64) -> f64) {
        match known.lookup(symbol) {
            Some(Op::Binary {
                precedence, func, ..
            }) => (*precedence, *func),
            _ => panic!("{} should be a binary op", symbol),
        }
    }

    fn unary(known: &KnownOps, symbol: &str) -> (&'static str, fn(f64) -> f64) {
        match known.lookup(symbol) {
            Some(Op::Unary { symbol, func }) => (*symbol, *func),
            _ => panic!("{} should be a unary op", symbol),
        }
    }

    #[test]
    fn every_button_is_known() {
        let known = KnownOps::new();
        assert_eq!(
            vec!["+", "cos", "sin", "±", "×", "÷", "π", "−", "√"],
            known.symbols()
        );
    }

    #[test]
    fn binary_ops_take_earlier_operand_first() {
        let known = KnownOps::new();
        assert_eq!(6.0, (binary(&known, "−").1)(10.0, 4.0));
        assert_eq!(3.0, (binary(&known, "÷").1)(12.0, 4.0));
        assert_eq!(14.0, (binary(&known, "+").1)(10.0, 4.0));
        assert_eq!(40.0, (binary(&known, "×").1)(10.0, 4.0));
    }

    #[test]
    fn multiplication_binds_tighter() {
        let known = KnownOps::new();
        assert!(binary(&known, "×").0 > binary(&known, "+").0);
        assert_eq!(binary(&known, "×").0, binary(&known, "÷").0);
        assert_eq!(binary(&known, "+").0, binary(&known, "−").0);
        assert!(binary(&known, "−").0 > PRECEDENCE_LOWEST);
    }

    #[test]
    fn sign_change_reads_as_minus() {
        let known = KnownOps::new();
        let (symbol, func) = unary(&known, "±");
        assert_eq!("-", symbol);
        assert_eq!(-2.5, func(2.5));
        assert!(known.lookup("-").is_none());
    }

    #[test]
    fn pi_is_a_constant() {
        let known = KnownOps::new();
        match known.lookup("π") {
            Some(Op::Constant { symbol, value }) => {
                assert_eq!("π", *symbol);
                assert_eq!(std::f64::consts::PI, *value);
            }
            _ => panic!("π should be a constant"),
        }
    }

    #[test]
    fn symbols_are_case_sensitive() {
        let known = KnownOps::new();
        assert!(known.lookup("sin").is_some());
        assert!(known.lookup("SIN").is_none());
        assert!(known.lookup("").is_none());
    }

    #[test]
    fn display() {
        assert_eq!("3.0", Op::Operand(3.0).to_string());
        assert_eq!("-0.5", Op::Operand(-0.5).to_string());
        assert_eq!("M", Op::Variable("M".to_string()).to_string());
        let known = KnownOps::new();
        assert_eq!("√", known.lookup("√").unwrap().to_string());
        assert_eq!("-", known.lookup("±").unwrap().to_string());
    }
}
