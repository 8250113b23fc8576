use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1, char, digit0, digit1, multispace0, one_of},
    combinator::{all_consuming, map, map_res, not, opt, recognize, value},
    error::{Error as NomError, ErrorKind},
    multi::{many0_count, separated_list0},
    sequence::{delimited, pair, preceded, terminated},
};

use super::ast::{BinaryOp, Expr};
use super::error::Error;

type PResult<'a, O> = IResult<&'a str, O>;

/// Deepest nesting of parentheses, calls, signs and exponents accepted.
pub const MAX_NESTING: usize = 32;

/// Parses a complete potential expression.
///
/// Fails if any input other than trailing whitespace is left unconsumed, or
/// if the expression nests deeper than [`MAX_NESTING`].
pub fn parse(input: &str) -> Result<Expr, Error> {
    let mut complete = all_consuming(terminated(|i| expression(i, 0), multispace0));
    match complete.parse(input) {
        Ok((_, expr)) => Ok(expr),
        Err(nom::Err::Error(e) | nom::Err::Failure(e)) => Err(Error::parse(input, e.input)),
        Err(nom::Err::Incomplete(_)) => Err(Error::parse(input, "")),
    }
}

fn token<'a, O>(
    parser: impl Parser<&'a str, Output = O, Error = NomError<&'a str>>,
) -> impl Parser<&'a str, Output = O, Error = NomError<&'a str>> {
    preceded(multispace0, parser)
}

fn left_associative<'a, P, O>(
    mut operand: P,
    operator: O,
) -> impl FnMut(&'a str) -> PResult<'a, Expr>
where
    P: Parser<&'a str, Output = Expr, Error = NomError<&'a str>>,
    O: Parser<&'a str, Output = BinaryOp, Error = NomError<&'a str>>,
{
    let mut operator = token(operator);
    move |input| {
        let (mut rest, mut acc) = operand.parse(input)?;
        while let Ok((after_op, op)) = operator.parse(rest) {
            let (after_rhs, rhs) = operand.parse(after_op)?;
            acc = Expr::binary(op, acc, rhs);
            rest = after_rhs;
        }
        Ok((rest, acc))
    }
}

fn expression(input: &str, depth: usize) -> PResult<'_, Expr> {
    let operator = alt((
        value(BinaryOp::Add, char('+')),
        value(BinaryOp::Sub, char('-')),
    ));
    left_associative(|i| term(i, depth), operator).parse(input)
}

fn term(input: &str, depth: usize) -> PResult<'_, Expr> {
    let operator = alt((
        value(BinaryOp::Mul, terminated(char('*'), not(char('*')))),
        value(BinaryOp::Div, char('/')),
    ));
    left_associative(|i| unary(i, depth), operator).parse(input)
}

// All recursion passes through here.
fn unary(input: &str, depth: usize) -> PResult<'_, Expr> {
    if depth >= MAX_NESTING {
        return Err(nom::Err::Failure(NomError::new(input, ErrorKind::TooLarge)));
    }
    let inner = depth + 1;
    alt((
        map(preceded(token(char('-')), |i| unary(i, inner)), |e| {
            Expr::Neg(Box::new(e))
        }),
        preceded(token(char('+')), |i| unary(i, inner)),
        |i| power(i, inner),
    ))
    .parse(input)
}

// Right-associative; the exponent may itself carry a sign (`r**-6`).
fn power(input: &str, depth: usize) -> PResult<'_, Expr> {
    let (rest, base) = primary(input, depth)?;
    let operator = token(alt((tag("**"), tag("^"))));
    match preceded(operator, |i| unary(i, depth)).parse(rest) {
        Ok((rest, exponent)) => Ok((rest, Expr::binary(BinaryOp::Pow, base, exponent))),
        Err(nom::Err::Error(_)) => Ok((rest, base)),
        Err(e) => Err(e),
    }
}

fn primary(input: &str, depth: usize) -> PResult<'_, Expr> {
    preceded(
        multispace0,
        alt((
            number,
            |i| call_or_symbol(i, depth),
            |i| parenthesized(i, depth),
        )),
    )
    .parse(input)
}

fn number(input: &str) -> PResult<'_, Expr> {
    let mantissa = alt((
        recognize((digit1, opt((char('.'), digit0)))),
        recognize((char('.'), digit1)),
    ));
    let exponent = opt((one_of("eE"), opt(one_of("+-")), digit1));
    map_res(recognize((mantissa, exponent)), |text: &str| {
        text.parse::<f64>().map(Expr::Number)
    })
    .parse(input)
}

fn identifier(input: &str) -> PResult<'_, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0_count(alt((alphanumeric1, tag("_")))),
    ))
    .parse(input)
}

fn call_or_symbol(input: &str, depth: usize) -> PResult<'_, Expr> {
    let (rest, name) = identifier(input)?;
    let arguments = delimited(
        token(char('(')),
        separated_list0(token(char(',')), |i| expression(i, depth)),
        token(char(')')),
    );
    match opt(arguments).parse(rest)? {
        (rest, Some(args)) => Ok((
            rest,
            Expr::Call {
                name: name.to_string(),
                args,
            },
        )),
        (rest, None) => Ok((rest, Expr::Symbol(name.to_string()))),
    }
}

fn parenthesized(input: &str, depth: usize) -> PResult<'_, Expr> {
    delimited(char('('), |i| expression(i, depth), token(char(')'))).parse(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(name: &str) -> Expr {
        Expr::Symbol(name.to_string())
    }

    #[test]
    fn parses_numbers_with_exponents() {
        assert_eq!(parse("4").unwrap(), Expr::Number(4.0));
        assert_eq!(parse("0.5").unwrap(), Expr::Number(0.5));
        assert_eq!(parse(".25").unwrap(), Expr::Number(0.25));
        assert_eq!(parse("1e-3").unwrap(), Expr::Number(1e-3));
        assert_eq!(parse("2.5E+2").unwrap(), Expr::Number(250.0));
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let expr = parse("a + b * c").unwrap();
        assert_eq!(
            expr,
            Expr::binary(
                BinaryOp::Add,
                sym("a"),
                Expr::binary(BinaryOp::Mul, sym("b"), sym("c"))
            )
        );
    }

    #[test]
    fn subtraction_is_left_associative() {
        let expr = parse("a - b - c").unwrap();
        assert_eq!(
            expr,
            Expr::binary(
                BinaryOp::Sub,
                Expr::binary(BinaryOp::Sub, sym("a"), sym("b")),
                sym("c")
            )
        );
    }

    #[test]
    fn power_is_right_associative() {
        let expr = parse("a ** b ^ c").unwrap();
        assert_eq!(
            expr,
            Expr::binary(
                BinaryOp::Pow,
                sym("a"),
                Expr::binary(BinaryOp::Pow, sym("b"), sym("c"))
            )
        );
    }

    #[test]
    fn unary_minus_applies_after_power() {
        let expr = parse("-x**2").unwrap();
        assert_eq!(
            expr,
            Expr::Neg(Box::new(Expr::binary(
                BinaryOp::Pow,
                sym("x"),
                Expr::Number(2.0)
            )))
        );
    }

    #[test]
    fn negative_exponent() {
        let expr = parse("r**-6").unwrap();
        assert_eq!(
            expr,
            Expr::binary(
                BinaryOp::Pow,
                sym("r"),
                Expr::Neg(Box::new(Expr::Number(6.0)))
            )
        );
    }

    #[test]
    fn function_calls_and_whitespace() {
        let expr = parse("  k * ( 1 + cos( n*phi - phi_eq ) )  ").unwrap();
        let Expr::Binary { op, right, .. } = expr else {
            panic!("expected binary expression");
        };
        assert_eq!(op, BinaryOp::Mul);
        let Expr::Binary { right: call, .. } = *right else {
            panic!("expected sum inside parentheses");
        };
        assert!(matches!(*call, Expr::Call { ref name, ref args } if name == "cos" && args.len() == 1));
    }

    #[test]
    fn canonical_lennard_jones_parses() {
        assert!(parse("4*epsilon*((sigma/r)**12 - (sigma/r)**6)").is_ok());
        assert!(parse("4*epsilon*sigma**12/r**12 - 4*epsilon*sigma**6/r**6").is_ok());
    }

    #[test]
    fn rejects_trailing_garbage() {
        let err = parse("sigma + epsilon )").unwrap_err();
        assert!(matches!(err, Error::Parse { offset, .. } if offset > 0));
    }

    #[test]
    fn rejects_dangling_operator() {
        assert!(parse("sigma +").is_err());
        assert!(parse("r **").is_err());
        assert!(parse("(r").is_err());
        assert!(parse("").is_err());
    }

    #[test]
    fn moderate_nesting_is_accepted() {
        let nested = format!("{}r{}", "(".repeat(20), ")".repeat(20));
        assert_eq!(parse(&nested).unwrap(), sym("r"));
        assert!(parse(&format!("{}r", "-".repeat(20))).is_ok());
    }

    #[test]
    fn deep_nesting_is_a_parse_error() {
        let parens = format!("{}r{}", "(".repeat(1000), ")".repeat(1000));
        assert!(matches!(parse(&parens), Err(Error::Parse { .. })));

        let signs = format!("{}r", "-".repeat(1000));
        assert!(matches!(parse(&signs), Err(Error::Parse { .. })));

        let calls = format!("{}r{}", "cos(".repeat(1000), ")".repeat(1000));
        assert!(matches!(parse(&calls), Err(Error::Parse { .. })));

        let exponents = vec!["r"; 1000].join("**");
        assert!(matches!(parse(&exponents), Err(Error::Parse { .. })));
    }
}
