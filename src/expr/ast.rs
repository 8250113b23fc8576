use std::collections::BTreeSet;

/// Binary operators, in the order of the grammar's precedence levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

/// A parsed potential expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric literal.
    Number(f64),
    /// Free symbol, or the constant `pi`.
    Symbol(String),
    /// Arithmetic negation.
    Neg(Box<Expr>),
    /// Binary operation.
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Function application such as `cos(phi)`.
    Call { name: String, args: Vec<Expr> },
}

pub(crate) const PI_SYMBOL: &str = "pi";

impl Expr {
    pub(crate) fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Self::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Returns the free symbols of the expression, sorted.
    ///
    /// Function names and the constant `pi` are not free symbols.
    pub fn symbols(&self) -> BTreeSet<&str> {
        let mut out = BTreeSet::new();
        self.collect_symbols(&mut out);
        out
    }

    fn collect_symbols<'a>(&'a self, out: &mut BTreeSet<&'a str>) {
        match self {
            Expr::Number(_) => {}
            Expr::Symbol(name) if name == PI_SYMBOL => {}
            Expr::Symbol(name) => {
                out.insert(name.as_str());
            }
            Expr::Neg(inner) => inner.collect_symbols(out),
            Expr::Binary { left, right, .. } => {
                left.collect_symbols(out);
                right.collect_symbols(out);
            }
            Expr::Call { args, .. } => {
                for arg in args {
                    arg.collect_symbols(out);
                }
            }
        }
    }
}
