use std::collections::HashMap;

use super::ast::{BinaryOp, Expr, PI_SYMBOL};
use super::error::Error;

impl Expr {
    /// Evaluates the expression with the given symbol bindings.
    ///
    /// `pi` evaluates to π unless explicitly bound. Results follow IEEE-754
    /// semantics: division by zero yields an infinity rather than an error.
    pub fn eval(&self, bindings: &HashMap<&str, f64>) -> Result<f64, Error> {
        match self {
            Expr::Number(value) => Ok(*value),
            Expr::Symbol(name) => match bindings.get(name.as_str()) {
                Some(value) => Ok(*value),
                None if name == PI_SYMBOL => Ok(std::f64::consts::PI),
                None => Err(Error::UnboundSymbol(name.clone())),
            },
            Expr::Neg(inner) => Ok(-inner.eval(bindings)?),
            Expr::Binary { op, left, right } => {
                let lhs = left.eval(bindings)?;
                let rhs = right.eval(bindings)?;
                Ok(match op {
                    BinaryOp::Add => lhs + rhs,
                    BinaryOp::Sub => lhs - rhs,
                    BinaryOp::Mul => lhs * rhs,
                    BinaryOp::Div => lhs / rhs,
                    BinaryOp::Pow => lhs.powf(rhs),
                })
            }
            Expr::Call { name, args } => {
                let values = args
                    .iter()
                    .map(|arg| arg.eval(bindings))
                    .collect::<Result<Vec<_>, _>>()?;
                apply_function(name, &values)
            }
        }
    }
}

fn apply_function(name: &str, args: &[f64]) -> Result<f64, Error> {
    let function: fn(f64) -> f64 = match name {
        "cos" => f64::cos,
        "sin" => f64::sin,
        "tan" => f64::tan,
        "exp" => f64::exp,
        "log" => f64::ln,
        "sqrt" => f64::sqrt,
        "abs" => f64::abs,
        _ => {
            return Err(Error::UnknownFunction {
                name: name.to_string(),
                arity: args.len(),
            });
        }
    };
    match args {
        [x] => Ok(function(*x)),
        _ => Err(Error::UnknownFunction {
            name: name.to_string(),
            arity: args.len(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::parse;

    fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() <= eps
    }

    fn eval(text: &str, bindings: &[(&str, f64)]) -> Result<f64, Error> {
        let bindings: HashMap<&str, f64> = bindings.iter().copied().collect();
        parse(text).unwrap().eval(&bindings)
    }

    #[test]
    fn arithmetic_precedence() {
        assert!(approx_eq(eval("2+3*4**2", &[]).unwrap(), 50.0, 1e-12));
        assert!(approx_eq(eval("2**3**2", &[]).unwrap(), 512.0, 1e-9));
        assert!(approx_eq(eval("-2**2", &[]).unwrap(), -4.0, 1e-12));
        assert!(approx_eq(eval("(1 - 4) / 2", &[]).unwrap(), -1.5, 1e-12));
    }

    #[test]
    fn lennard_jones_minimum() {
        let r_min = 2f64.powf(1.0 / 6.0);
        let value = eval(
            "4*epsilon*((sigma/r)**12 - (sigma/r)**6)",
            &[("epsilon", 1.5), ("sigma", 1.0), ("r", r_min)],
        )
        .unwrap();
        assert!(approx_eq(value, -1.5, 1e-12));
    }

    #[test]
    fn functions_and_pi() {
        assert!(approx_eq(eval("cos(pi)", &[]).unwrap(), -1.0, 1e-12));
        assert!(approx_eq(eval("sqrt(x) + exp(0)", &[("x", 9.0)]).unwrap(), 4.0, 1e-12));
        assert!(approx_eq(eval("log(exp(2))", &[]).unwrap(), 2.0, 1e-12));
    }

    #[test]
    fn unbound_symbol_is_an_error() {
        let err = eval("sigma + epsilon", &[("sigma", 1.0)]).unwrap_err();
        assert_eq!(err, Error::UnboundSymbol("epsilon".to_string()));
    }

    #[test]
    fn unknown_function_is_an_error() {
        let err = eval("erf(x)", &[("x", 1.0)]).unwrap_err();
        assert!(matches!(err, Error::UnknownFunction { ref name, arity: 1 } if name == "erf"));

        let err = eval("cos(x, x)", &[("x", 1.0)]).unwrap_err();
        assert!(matches!(err, Error::UnknownFunction { arity: 2, .. }));
    }
}
