//! Numeric evaluation and quadratic-form extraction

use super::{BinOp, Expr, Func};
use crate::errors::ExprError;

impl Expr {
    /// Evaluate at `(x, y)`. `None` outside the domain or on free identifiers.
    pub fn eval(&self, x: f64, y: f64) -> Option<f64> {
        let v = match self {
            Expr::Num(v) => *v,
            Expr::Const(c) => c.value(),
            Expr::Var(name) => match name.as_str() {
                "x" => x,
                "y" => y,
                _ => return None,
            },
            Expr::Neg(inner) => -inner.eval(x, y)?,
            Expr::Bin(op, l, r) => {
                let a = l.eval(x, y)?;
                let b = r.eval(x, y)?;
                match op {
                    BinOp::Add => a + b,
                    BinOp::Sub => a - b,
                    BinOp::Mul => a * b,
                    BinOp::Div => a / b,
                    BinOp::Pow => power(a, b),
                }
            }
            Expr::Call(func, args) => {
                let values = args
                    .iter()
                    .map(|a| a.eval(x, y))
                    .collect::<Option<Vec<_>>>()?;
                call(*func, &values)?
            }
            Expr::UserCall(_, _) => return None,
        };
        v.is_finite().then_some(v)
    }

    /// Read the expression as `a + b·x + c·y + d·x² + e·xy + f·y²`.
    pub fn to_poly(&self) -> Result<Poly2, ExprError> {
        match self {
            Expr::Num(v) => Ok(Poly2::constant(*v)),
            Expr::Const(c) => Ok(Poly2::constant(c.value())),
            Expr::Var(name) => match name.as_str() {
                "x" => Ok(Poly2 { x: 1.0, ..Poly2::default() }),
                "y" => Ok(Poly2 { y: 1.0, ..Poly2::default() }),
                _ => Err(ExprError::UnknownIdentifier { name: name.clone() }),
            },
            Expr::Neg(inner) => Ok(inner.to_poly()?.scale(-1.0)),
            Expr::Bin(BinOp::Add, l, r) => Ok(l.to_poly()?.add(&r.to_poly()?)),
            Expr::Bin(BinOp::Sub, l, r) => Ok(l.to_poly()?.add(&r.to_poly()?.scale(-1.0))),
            Expr::Bin(BinOp::Mul, l, r) => l.to_poly()?.mul(&r.to_poly()?),
            Expr::Bin(BinOp::Div, l, r) => {
                let divisor = r.to_poly()?.as_constant().ok_or(ExprError::NotQuadratic)?;
                if divisor == 0.0 {
                    return Err(ExprError::NotQuadratic);
                }
                Ok(l.to_poly()?.scale(1.0 / divisor))
            }
            Expr::Bin(BinOp::Pow, base, exponent) => {
                let n = exponent.eval_const().ok_or(ExprError::NotQuadratic)?;
                let base = base.to_poly()?;
                if n == 0.0 {
                    Ok(Poly2::constant(1.0))
                } else if n == 1.0 {
                    Ok(base)
                } else if n == 2.0 {
                    base.mul(&base)
                } else {
                    base.as_constant()
                        .map(|c| Poly2::constant(power(c, n)))
                        .ok_or(ExprError::NotQuadratic)
                }
            }
            Expr::Call(_, _) => {
                self.eval_const().map(Poly2::constant).ok_or(ExprError::NotQuadratic)
            }
            Expr::UserCall(name, _) => Err(ExprError::UnknownIdentifier { name: name.clone() }),
        }
    }
}

fn power(base: f64, exponent: f64) -> f64 {
    if exponent.fract() == 0.0 && exponent.abs() < i32::MAX as f64 {
        return base.powi(exponent as i32);
    }
    if base < 0.0 {
        // odd roots of negatives, e.g. x^(1/3)
        let inverse = 1.0 / exponent;
        if inverse.fract() == 0.0 && (inverse as i64) % 2 != 0 {
            return -(-base).powf(exponent);
        }
    }
    base.powf(exponent)
}

fn call(func: Func, args: &[f64]) -> Option<f64> {
    let u = *args.first()?;
    let v = match func {
        Func::Sin => u.sin(),
        Func::Cos => u.cos(),
        Func::Tan => u.tan(),
        Func::Cot => 1.0 / u.tan(),
        Func::Sec => 1.0 / u.cos(),
        Func::Csc => 1.0 / u.sin(),
        Func::Asin => u.asin(),
        Func::Acos => u.acos(),
        Func::Atan => u.atan(),
        Func::Sinh => u.sinh(),
        Func::Cosh => u.cosh(),
        Func::Tanh => u.tanh(),
        Func::Ln => u.ln(),
        Func::Log => match args.get(1) {
            Some(x) => x.ln() / u.ln(),
            None => u.ln(),
        },
        Func::Lg => u.log10(),
        Func::Ld => u.log2(),
        Func::Exp => u.exp(),
        Func::Sqrt => u.sqrt(),
        Func::Cbrt => u.cbrt(),
        Func::Abs => u.abs(),
        Func::Floor => u.floor(),
        Func::Ceil => u.ceil(),
        Func::Sgn => {
            if u > 0.0 {
                1.0
            } else if u < 0.0 {
                -1.0
            } else {
                0.0
            }
        }
        Func::Nroot => power(u, 1.0 / *args.get(1)?),
    };
    Some(v)
}

/// Polynomial of total degree at most two in `x` and `y`
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Poly2 {
    pub c: f64,
    pub x: f64,
    pub y: f64,
    pub xx: f64,
    pub xy: f64,
    pub yy: f64,
}

impl Poly2 {
    pub fn constant(c: f64) -> Self {
        Poly2 { c, ..Poly2::default() }
    }

    fn degree(&self) -> u8 {
        if self.xx != 0.0 || self.xy != 0.0 || self.yy != 0.0 {
            2
        } else if self.x != 0.0 || self.y != 0.0 {
            1
        } else {
            0
        }
    }

    fn as_constant(&self) -> Option<f64> {
        (self.degree() == 0).then_some(self.c)
    }

    fn scale(self, k: f64) -> Self {
        Poly2 {
            c: self.c * k,
            x: self.x * k,
            y: self.y * k,
            xx: self.xx * k,
            xy: self.xy * k,
            yy: self.yy * k,
        }
    }

    fn add(self, other: &Poly2) -> Self {
        Poly2 {
            c: self.c + other.c,
            x: self.x + other.x,
            y: self.y + other.y,
            xx: self.xx + other.xx,
            xy: self.xy + other.xy,
            yy: self.yy + other.yy,
        }
    }

    fn mul(self, other: &Poly2) -> Result<Self, ExprError> {
        if self.degree() + other.degree() > 2 {
            return Err(ExprError::NotQuadratic);
        }
        let (a, b) = (self, other);
        Ok(Poly2 {
            c: a.c * b.c,
            x: a.c * b.x + a.x * b.c,
            y: a.c * b.y + a.y * b.c,
            xx: a.c * b.xx + a.x * b.x + a.xx * b.c,
            xy: a.c * b.xy + a.x * b.y + a.y * b.x + a.xy * b.c,
            yy: a.c * b.yy + a.y * b.y + a.yy * b.c,
        })
    }

    /// `lhs - rhs` of an equation as a polynomial
    pub fn from_equation(eq: &super::Equation) -> Result<Poly2, ExprError> {
        let lhs = eq.lhs.to_poly()?;
        match &eq.rhs {
            Some(rhs) => Ok(lhs.add(&rhs.to_poly()?.scale(-1.0))),
            None => Ok(lhs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{parse_equation, parse_function_body};

    #[test]
    fn evaluates_elementary_functions() {
        let e = parse_function_body("sqrt(x) + ln(e) + abs(-2)").unwrap();
        let v = e.eval(4.0, 0.0).unwrap();
        assert!((v - 5.0).abs() < 1e-12);
        assert_eq!(e.eval(-1.0, 0.0), None);
    }

    #[test]
    fn odd_roots_of_negatives() {
        let e = parse_function_body("x^(1/3)").unwrap();
        let v = e.eval(-8.0, 0.0).unwrap();
        assert!((v + 2.0).abs() < 1e-12);
    }

    #[test]
    fn poles_are_none() {
        let e = parse_function_body("1/x").unwrap();
        assert_eq!(e.eval(0.0, 0.0), None);
    }

    #[test]
    fn circle_equation_to_poly() {
        let eq = parse_equation("(x - 1)^2 + (y + 2)^2 = 9").unwrap();
        let p = Poly2::from_equation(&eq).unwrap();
        assert_eq!(
            p,
            Poly2 { c: 1.0 + 4.0 - 9.0, x: -2.0, y: 4.0, xx: 1.0, xy: 0.0, yy: 1.0 }
        );
    }

    #[test]
    fn hyperbola_equation_to_poly() {
        let eq = parse_equation("x² / 4 - y² = 1").unwrap();
        let p = Poly2::from_equation(&eq).unwrap();
        assert_eq!(p.xx, 0.25);
        assert_eq!(p.yy, -1.0);
        assert_eq!(p.c, -1.0);
    }

    #[test]
    fn cubic_is_rejected() {
        let eq = parse_equation("x^3 + y = 0").unwrap();
        assert!(matches!(Poly2::from_equation(&eq), Err(ExprError::NotQuadratic)));
    }
}
