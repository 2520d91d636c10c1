//! Expression tree to pgfmath text
//!
//! pgfmath trig works in degrees, so angles go through `deg(...)` and
//! inverse trig results come back through `rad(...)`. The sample variable
//! is `\x`; it is parenthesized wherever a negative value would change the
//! meaning of the surrounding text.

use super::{BinOp, Constant, Expr, Func};
use crate::errors::ExprError;
use crate::types::Num;

const ADD: u8 = 1;
const MUL: u8 = 2;
const POW: u8 = 3;
const ATOM: u8 = 4;

impl Expr {
    /// pgfmath source for a resolved function body in `x`.
    pub fn to_pgfmath(&self) -> Result<String, ExprError> {
        Ok(print(self)?.0)
    }
}

fn wrap((text, prec): (String, u8), min: u8) -> String {
    if prec < min { format!("({text})") } else { text }
}

fn is_x(e: &Expr) -> bool {
    matches!(e, Expr::Var(name) if name == "x")
}

fn print(e: &Expr) -> Result<(String, u8), ExprError> {
    Ok(match e {
        Expr::Num(v) if *v < 0.0 => (Num(*v).to_string(), ADD),
        Expr::Num(v) => (Num(*v).to_string(), ATOM),
        Expr::Var(name) if name == "x" => (r"\x".to_string(), ATOM),
        Expr::Var(name) => return Err(ExprError::UnknownIdentifier { name: name.clone() }),
        Expr::UserCall(name, _) => {
            return Err(ExprError::UnknownIdentifier { name: name.clone() });
        }
        Expr::Const(Constant::Pi) => ("pi".to_string(), ATOM),
        Expr::Const(Constant::E) => ("exp(1)".to_string(), ATOM),
        Expr::Neg(inner) => {
            let printed = print(inner)?;
            let text = if printed.1 == ATOM && !is_x(inner) {
                format!("-{}", printed.0)
            } else {
                format!("-({})", printed.0)
            };
            (text, ADD)
        }
        Expr::Bin(BinOp::Add, l, r) => {
            let left = print(l)?.0;
            match r.as_ref() {
                Expr::Num(v) if *v < 0.0 => (format!("{left} - {}", Num(-v)), ADD),
                Expr::Neg(inner) => (format!("{left} - {}", wrap(print(inner)?, MUL)), ADD),
                _ => (format!("{left} + {}", print(r)?.0), ADD),
            }
        }
        Expr::Bin(BinOp::Sub, l, r) => {
            (format!("{} - {}", print(l)?.0, wrap(print(r)?, MUL)), ADD)
        }
        Expr::Bin(BinOp::Mul, l, r) => (
            format!("{}*{}", wrap(print(l)?, MUL), wrap(print(r)?, MUL)),
            MUL,
        ),
        Expr::Bin(BinOp::Div, l, r) => (
            format!("{}/{}", wrap(print(l)?, MUL), wrap(print(r)?, POW)),
            MUL,
        ),
        Expr::Bin(BinOp::Pow, base, exponent) => {
            if matches!(base.as_ref(), Expr::Const(Constant::E)) {
                return Ok((format!("exp({})", print(exponent)?.0), ATOM));
            }
            let base = if is_x(base) {
                r"(\x)".to_string()
            } else {
                wrap(print(base)?, ATOM)
            };
            let exponent = match exponent.as_ref() {
                Expr::Num(v) if *v >= 0.0 => Num(*v).to_string(),
                Expr::Const(_) | Expr::Call(_, _) => print(exponent)?.0,
                other => format!("({})", print(other)?.0),
            };
            (format!("{base}^{exponent}"), POW)
        }
        Expr::Call(func, args) => (call(*func, args)?, ATOM),
    })
}

fn call(func: Func, args: &[Expr]) -> Result<String, ExprError> {
    let arg = |i: usize| -> Result<String, ExprError> {
        match args.get(i) {
            Some(a) => Ok(print(a)?.0),
            None => Err(ExprError::UnsupportedFunction { name: format!("{func:?}") }),
        }
    };
    let u = arg(0)?;
    Ok(match func {
        Func::Sin => format!("sin(deg({u}))"),
        Func::Cos => format!("cos(deg({u}))"),
        Func::Tan => format!("tan(deg({u}))"),
        Func::Cot => format!("cot(deg({u}))"),
        Func::Sec => format!("sec(deg({u}))"),
        Func::Csc => format!("cosec(deg({u}))"),
        Func::Asin => format!("rad(asin({u}))"),
        Func::Acos => format!("rad(acos({u}))"),
        Func::Atan => format!("rad(atan({u}))"),
        Func::Sinh => format!("sinh({u})"),
        Func::Cosh => format!("cosh({u})"),
        Func::Tanh => format!("tanh({u})"),
        Func::Ln => format!("ln({u})"),
        Func::Log if args.len() == 2 => format!("(ln({})/ln({u}))", arg(1)?),
        Func::Log => format!("ln({u})"),
        Func::Lg => format!("log10({u})"),
        Func::Ld => format!("log2({u})"),
        Func::Exp => format!("exp({u})"),
        Func::Sqrt => format!("sqrt({u})"),
        Func::Cbrt => format!("((({u})<0) ? -(-({u}))^(1/3) : ({u})^(1/3))"),
        Func::Abs => format!("abs({u})"),
        Func::Floor => format!("floor({u})"),
        Func::Ceil => format!("ceil({u})"),
        Func::Sgn => format!("((({u})>0) - (({u})<0))"),
        Func::Nroot => format!("(({u})^(1/({})))", arg(1)?),
    })
}

#[cfg(test)]
mod tests {
    use crate::expr::parse_function_body;
    use insta::assert_snapshot;

    fn pgf(source: &str) -> String {
        parse_function_body(source).unwrap().to_pgfmath().unwrap()
    }

    #[test]
    fn polynomial() {
        assert_snapshot!(pgf("x^2 - 2x + 1"), @r"(\x)^2 - 2*\x + 1");
    }

    #[test]
    fn trig_takes_degrees() {
        assert_snapshot!(pgf("f(x) = sin(2x)"), @r"sin(deg(2*\x))");
        assert_snapshot!(pgf("arctan(x)"), @r"rad(atan(\x))");
    }

    #[test]
    fn exponentials() {
        assert_snapshot!(pgf("e^(-x)"), @r"exp(-(\x))");
        assert_snapshot!(pgf("2^x"), @r"2^(\x)");
        assert_snapshot!(pgf("x^(1/2)"), @r"(\x)^(1/2)");
    }

    #[test]
    fn grouping_is_kept_where_needed() {
        assert_snapshot!(pgf("1/(x - 1)"), @r"1/(\x - 1)");
        assert_snapshot!(pgf("3 - (x + 1)"), @r"3 - (\x + 1)");
        assert_snapshot!(pgf("-x^2"), @r"-((\x)^2)");
        assert_snapshot!(pgf("x + -2"), @r"\x - 2");
    }

    #[test]
    fn absolute_value_and_sign() {
        assert_snapshot!(pgf("sqrt(x) + |x|"), @r"sqrt(\x) + abs(\x)");
        assert_snapshot!(pgf("sgn(x)"), @r"(((\x)>0) - ((\x)<0))");
    }

    #[test]
    fn free_identifiers_are_errors() {
        let e = parse_function_body("a x").unwrap();
        assert!(e.to_pgfmath().is_err());
    }
}
