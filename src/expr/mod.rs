//! GeoGebra expression strings
//!
//! One pest grammar feeds one AST, and the AST serves three consumers:
//! - `tikz`: rewrite a function body into pgfmath syntax
//! - `eval`: sample a function numerically, evaluate coordinate literals
//! - `eval::Poly2`: read a conic equation as a quadratic form

pub mod eval;
pub mod tikz;

use crate::errors::ExprError;
use glam::{DVec2, dvec2};
use miette::{NamedSource, SourceSpan};
use pest::Parser;
use pest::iterators::Pair;
use pest_derive::Parser;
use serde::Serialize;

#[derive(Parser)]
#[grammar = "expr/expr.pest"]
struct ExprParser;

/// Nesting limit when inlining references to other functions
pub const MAX_INLINE_DEPTH: usize = 8;

/// Expression tree
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr {
    Num(f64),
    /// `x`, `y`, or a free identifier (slider, other object)
    Var(String),
    Const(Constant),
    Neg(Box<Expr>),
    Bin(BinOp, Box<Expr>, Box<Expr>),
    Call(Func, Vec<Expr>),
    /// Call of something that is not a builtin, e.g. `f(x)` or `a(x + 1)`
    UserCall(String, Vec<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Constant {
    Pi,
    E,
}

impl Constant {
    pub fn value(self) -> f64 {
        match self {
            Constant::Pi => std::f64::consts::PI,
            Constant::E => std::f64::consts::E,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

/// Builtin functions with a pgfmath counterpart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Func {
    Sin,
    Cos,
    Tan,
    Cot,
    Sec,
    Csc,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    /// Natural log, spelled `ln`
    Ln,
    /// `log(x)` is natural too; `log(b, x)` takes a base
    Log,
    Lg,
    Ld,
    Exp,
    Sqrt,
    Cbrt,
    Abs,
    Floor,
    Ceil,
    Sgn,
    Nroot,
}

impl Func {
    pub fn from_name(name: &str) -> Option<Func> {
        let f = match name {
            "sin" => Func::Sin,
            "cos" => Func::Cos,
            "tan" => Func::Tan,
            "cot" => Func::Cot,
            "sec" => Func::Sec,
            "csc" | "cosec" => Func::Csc,
            "asin" | "arcsin" => Func::Asin,
            "acos" | "arccos" => Func::Acos,
            "atan" | "arctan" => Func::Atan,
            "sinh" => Func::Sinh,
            "cosh" => Func::Cosh,
            "tanh" => Func::Tanh,
            "ln" => Func::Ln,
            "log" => Func::Log,
            "lg" => Func::Lg,
            "ld" => Func::Ld,
            "exp" => Func::Exp,
            "sqrt" => Func::Sqrt,
            "cbrt" => Func::Cbrt,
            "abs" => Func::Abs,
            "floor" => Func::Floor,
            "ceil" => Func::Ceil,
            "sgn" | "sign" => Func::Sgn,
            "nroot" => Func::Nroot,
            _ => return None,
        };
        Some(f)
    }

    fn accepts(self, arity: usize) -> bool {
        match self {
            Func::Nroot => arity == 2,
            Func::Log => arity == 1 || arity == 2,
            _ => arity == 1,
        }
    }

    /// Functions with poles, branch cuts or a restricted domain
    pub fn has_singularities(self) -> bool {
        matches!(
            self,
            Func::Tan
                | Func::Cot
                | Func::Sec
                | Func::Csc
                | Func::Ln
                | Func::Log
                | Func::Lg
                | Func::Ld
                | Func::Sqrt
                | Func::Asin
                | Func::Acos
        )
    }
}

/// `lhs = rhs`, or a bare expression when `rhs` is absent
#[derive(Debug, Clone, PartialEq)]
pub struct Equation {
    pub lhs: Expr,
    pub rhs: Option<Expr>,
}

/// Names and values an expression may refer to
pub trait Scope {
    fn parameter(&self, name: &str) -> Option<f64>;
    fn function(&self, name: &str) -> Option<&Expr>;
}

/// Scope with nothing in it
pub struct EmptyScope;

impl Scope for EmptyScope {
    fn parameter(&self, _name: &str) -> Option<f64> {
        None
    }

    fn function(&self, _name: &str) -> Option<&Expr> {
        None
    }
}

// ============================================================================
// Parsing
// ============================================================================

pub fn parse_equation(source: &str) -> Result<Equation, ExprError> {
    let mut pairs =
        ExprParser::parse(Rule::equation, source).map_err(|e| syntax_error(source, e))?;
    let Some(equation) = pairs.next() else {
        return Err(ExprError::Malformed { what: "empty equation" });
    };
    let mut sides = equation.into_inner().filter(|p| p.as_rule() == Rule::expr);
    let lhs = match sides.next() {
        Some(pair) => build_expr(pair)?,
        None => return Err(ExprError::Malformed { what: "missing left-hand side" }),
    };
    let rhs = sides.next().map(build_expr).transpose()?;
    Ok(Equation { lhs, rhs })
}

/// Parse a function definition and drop its `f(x) =` or `y =` head.
pub fn parse_function_body(source: &str) -> Result<Expr, ExprError> {
    let Equation { lhs, rhs } = parse_equation(source)?;
    let Some(rhs) = rhs else {
        return Ok(lhs);
    };
    let is_head = match &lhs {
        Expr::Var(name) => name == "y",
        Expr::UserCall(_, args) => args.len() == 1 && args[0] == Expr::Var("x".to_string()),
        // `f (x)` reads as the product `f·x`
        Expr::Bin(BinOp::Mul, left, right) => {
            is_function_name(left) && **right == Expr::Var("x".to_string())
        }
        _ => false,
    };
    if is_head { Ok(rhs) } else { Ok(Expr::Bin(BinOp::Sub, Box::new(lhs), Box::new(rhs))) }
}

/// Parse `(x, y)` or `(x; y)` with constant components.
pub fn parse_point_literal(source: &str) -> Option<DVec2> {
    let mut pairs = ExprParser::parse(Rule::point_literal, source.trim()).ok()?;
    let literal = pairs.next()?;
    let mut parts = literal.into_inner().filter(|p| p.as_rule() == Rule::expr);
    let x = build_expr(parts.next()?).ok()?.eval_const()?;
    let y = build_expr(parts.next()?).ok()?.eval_const()?;
    Some(dvec2(x, y))
}

/// Parse a plain numeric literal or constant expression such as `2`, `π/3`.
pub fn parse_number(source: &str) -> Option<f64> {
    let Equation { lhs, rhs } = parse_equation(source).ok()?;
    if rhs.is_some() {
        return None;
    }
    lhs.eval_const()
}

fn is_function_name(expr: &Expr) -> bool {
    match expr {
        Expr::Var(name) => name != "x" && name != "y",
        _ => false,
    }
}

fn syntax_error(source: &str, err: pest::error::Error<Rule>) -> ExprError {
    let (start, len) = match err.location {
        pest::error::InputLocation::Pos(pos) => (pos, 0),
        pest::error::InputLocation::Span((start, end)) => (start, end.saturating_sub(start)),
    };
    ExprError::Syntax {
        message: err.variant.message().to_string(),
        src: NamedSource::new("<expression>", source.to_string()),
        span: SourceSpan::from((start, len)),
    }
}

fn build_expr(pair: Pair<Rule>) -> Result<Expr, ExprError> {
    let mut inner = pair.into_inner();
    let mut acc = match inner.next() {
        Some(first) => build_term(first)?,
        None => return Err(ExprError::Malformed { what: "empty sum" }),
    };
    while let Some(op) = inner.next() {
        let Some(rhs) = inner.next() else { break };
        let rhs = build_term(rhs)?;
        let op = if op.as_str() == "+" { BinOp::Add } else { BinOp::Sub };
        acc = Expr::Bin(op, Box::new(acc), Box::new(rhs));
    }
    Ok(acc)
}

fn build_term(pair: Pair<Rule>) -> Result<Expr, ExprError> {
    let mut inner = pair.into_inner();
    let mut acc = match inner.next() {
        Some(first) => build_signed(first)?,
        None => return Err(ExprError::Malformed { what: "empty product" }),
    };
    while let Some(next) = inner.next() {
        match next.as_rule() {
            Rule::mul_op => {
                let Some(operand) = inner.next() else { break };
                let operand = build_signed(operand)?;
                let op = match next.as_str() {
                    "/" | "÷" => BinOp::Div,
                    _ => BinOp::Mul,
                };
                acc = Expr::Bin(op, Box::new(acc), Box::new(operand));
            }
            Rule::power => {
                let bare_group = is_bare_group(&next);
                let operand = build_power(next)?;
                acc = juxtapose(acc, operand, bare_group);
            }
            _ => {}
        }
    }
    Ok(acc)
}

/// Implicit multiplication, except for `sin²(x)` which GeoGebra writes for `sin(x)²`.
fn juxtapose(acc: Expr, operand: Expr, operand_is_group: bool) -> Expr {
    if operand_is_group {
        if let Expr::Bin(BinOp::Pow, base, exponent) = &acc {
            if let Expr::Var(name) = base.as_ref() {
                if let Some(func) = Func::from_name(name) {
                    let call = Expr::Call(func, vec![operand]);
                    return Expr::Bin(BinOp::Pow, Box::new(call), exponent.clone());
                }
            }
        }
    }
    Expr::Bin(BinOp::Mul, Box::new(acc), Box::new(operand))
}

fn is_bare_group(power: &Pair<Rule>) -> bool {
    let mut inner = power.clone().into_inner();
    matches!(inner.next().map(|p| p.as_rule()), Some(Rule::group)) && inner.next().is_none()
}

fn build_signed(pair: Pair<Rule>) -> Result<Expr, ExprError> {
    let mut negations = 0usize;
    let mut body = None;
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::neg => negations += 1,
            Rule::power => body = Some(build_power(inner)?),
            _ => {}
        }
    }
    let body = body.ok_or(ExprError::Malformed { what: "sign without operand" })?;
    Ok(if negations % 2 == 1 { negate(body) } else { body })
}

fn negate(expr: Expr) -> Expr {
    match expr {
        Expr::Num(v) => Expr::Num(-v),
        other => Expr::Neg(Box::new(other)),
    }
}

fn build_power(pair: Pair<Rule>) -> Result<Expr, ExprError> {
    let mut inner = pair.into_inner();
    let base = match inner.next() {
        Some(primary) => build_primary(primary)?,
        None => return Err(ExprError::Malformed { what: "missing base" }),
    };
    let Some(exponent) = inner.next() else {
        return Ok(base);
    };
    let exponent = match exponent.as_rule() {
        Rule::sup => Expr::Num(decode_superscript(exponent.as_str())),
        _ => build_signed(exponent)?,
    };
    Ok(Expr::Bin(BinOp::Pow, Box::new(base), Box::new(exponent)))
}

fn build_primary(pair: Pair<Rule>) -> Result<Expr, ExprError> {
    match pair.as_rule() {
        Rule::number => pair
            .as_str()
            .parse::<f64>()
            .map(Expr::Num)
            .map_err(|_| ExprError::Malformed { what: "unreadable number" }),
        Rule::ident => Ok(identifier(pair.as_str())),
        Rule::group => match pair.into_inner().next() {
            Some(inner) => build_expr(inner),
            None => Err(ExprError::Malformed { what: "empty parentheses" }),
        },
        Rule::abs_bars => match pair.into_inner().next() {
            Some(inner) => Ok(Expr::Call(Func::Abs, vec![build_expr(inner)?])),
            None => Err(ExprError::Malformed { what: "empty absolute value" }),
        },
        Rule::call => build_call(pair),
        _ => Err(ExprError::Malformed { what: "unexpected operand" }),
    }
}

fn build_call(pair: Pair<Rule>) -> Result<Expr, ExprError> {
    let mut inner = pair.into_inner();
    let name = inner.next().map(|p| p.as_str().to_string()).unwrap_or_default();
    let args = inner.map(build_expr).collect::<Result<Vec<_>, _>>()?;
    if let Some(func) = Func::from_name(&name) {
        if !func.accepts(args.len()) {
            return Err(ExprError::UnsupportedFunction { name });
        }
        return Ok(Expr::Call(func, args));
    }
    if args.len() == 1 && is_variable_run(&name) {
        // `x(x + 1)` is a product
        let mut args = args;
        let arg = args.remove(0);
        return Ok(Expr::Bin(BinOp::Mul, Box::new(identifier(&name)), Box::new(arg)));
    }
    Ok(Expr::UserCall(name, args))
}

fn is_variable_run(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c == 'x' || c == 'y')
}

fn identifier(name: &str) -> Expr {
    match name {
        "pi" | "π" => Expr::Const(Constant::Pi),
        "e" | "ℯ" => Expr::Const(Constant::E),
        _ if name.len() > 1 && is_variable_run(name) => {
            // GeoGebra writes `xy` for `x y`
            let mut vars = name.chars().map(|c| Expr::Var(c.to_string()));
            let first = vars.next().unwrap_or(Expr::Num(1.0));
            vars.fold(first, |acc, v| Expr::Bin(BinOp::Mul, Box::new(acc), Box::new(v)))
        }
        _ => Expr::Var(name.to_string()),
    }
}

fn decode_superscript(text: &str) -> f64 {
    let mut value = 0.0;
    let mut sign = 1.0;
    for c in text.chars() {
        let digit = match c {
            '⁻' => {
                sign = -1.0;
                continue;
            }
            '⁰' => 0.0,
            '¹' => 1.0,
            '²' => 2.0,
            '³' => 3.0,
            '⁴' => 4.0,
            '⁵' => 5.0,
            '⁶' => 6.0,
            '⁷' => 7.0,
            '⁸' => 8.0,
            '⁹' => 9.0,
            _ => continue,
        };
        value = value * 10.0 + digit;
    }
    sign * value
}

// ============================================================================
// Tree queries and rewriting
// ============================================================================

impl Expr {
    /// Could the graph of this expression have gaps or poles?
    pub fn may_be_discontinuous(&self) -> bool {
        match self {
            Expr::Num(_) | Expr::Var(_) | Expr::Const(_) => false,
            Expr::Neg(inner) => inner.may_be_discontinuous(),
            Expr::Bin(BinOp::Div, _, _) => true,
            Expr::Bin(BinOp::Pow, base, exponent) => {
                let integral_exponent = matches!(
                    exponent.eval_const(),
                    Some(v) if v >= 0.0 && v.fract() == 0.0
                );
                !integral_exponent || base.may_be_discontinuous()
            }
            Expr::Bin(_, l, r) => l.may_be_discontinuous() || r.may_be_discontinuous(),
            Expr::Call(func, args) => {
                func.has_singularities() || args.iter().any(Expr::may_be_discontinuous)
            }
            Expr::UserCall(_, args) => args.iter().any(Expr::may_be_discontinuous),
        }
    }

    /// Value of an expression without free variables
    pub fn eval_const(&self) -> Option<f64> {
        if self.mentions_any_variable() {
            return None;
        }
        self.eval(0.0, 0.0)
    }

    fn mentions_any_variable(&self) -> bool {
        match self {
            Expr::Var(_) | Expr::UserCall(_, _) => true,
            Expr::Num(_) | Expr::Const(_) => false,
            Expr::Neg(inner) => inner.mentions_any_variable(),
            Expr::Bin(_, l, r) => l.mentions_any_variable() || r.mentions_any_variable(),
            Expr::Call(_, args) => args.iter().any(Expr::mentions_any_variable),
        }
    }

    /// Replace every occurrence of variable `name` with `value`.
    pub fn substitute(&self, name: &str, value: &Expr) -> Expr {
        match self {
            Expr::Var(v) if v == name => value.clone(),
            Expr::Num(_) | Expr::Var(_) | Expr::Const(_) => self.clone(),
            Expr::Neg(inner) => Expr::Neg(Box::new(inner.substitute(name, value))),
            Expr::Bin(op, l, r) => Expr::Bin(
                *op,
                Box::new(l.substitute(name, value)),
                Box::new(r.substitute(name, value)),
            ),
            Expr::Call(func, args) => {
                Expr::Call(*func, args.iter().map(|a| a.substitute(name, value)).collect())
            }
            Expr::UserCall(f, args) => Expr::UserCall(
                f.clone(),
                args.iter().map(|a| a.substitute(name, value)).collect(),
            ),
        }
    }

    /// Inline parameters and function references so only `x` and `y` stay free.
    pub fn resolve(&self, scope: &dyn Scope) -> Result<Expr, ExprError> {
        self.resolve_at(scope, 0)
    }

    fn resolve_at(&self, scope: &dyn Scope, depth: usize) -> Result<Expr, ExprError> {
        if depth > MAX_INLINE_DEPTH {
            return Err(ExprError::TooDeep { depth: MAX_INLINE_DEPTH });
        }
        Ok(match self {
            Expr::Var(name) if name == "x" || name == "y" => self.clone(),
            Expr::Var(name) => match scope.parameter(name) {
                Some(value) => Expr::Num(value),
                None => return Err(ExprError::UnknownIdentifier { name: name.clone() }),
            },
            Expr::Num(_) | Expr::Const(_) => self.clone(),
            Expr::Neg(inner) => negate(inner.resolve_at(scope, depth)?),
            Expr::Bin(op, l, r) => Expr::Bin(
                *op,
                Box::new(l.resolve_at(scope, depth)?),
                Box::new(r.resolve_at(scope, depth)?),
            ),
            Expr::Call(func, args) => Expr::Call(
                *func,
                args.iter()
                    .map(|a| a.resolve_at(scope, depth))
                    .collect::<Result<_, _>>()?,
            ),
            Expr::UserCall(name, args) => {
                let args = args
                    .iter()
                    .map(|a| a.resolve_at(scope, depth))
                    .collect::<Result<Vec<_>, _>>()?;
                if let Some(body) = scope.function(name) {
                    let Some(arg) = args.first() else {
                        return Err(ExprError::UnknownIdentifier { name: name.clone() });
                    };
                    body.substitute("x", arg).resolve_at(scope, depth + 1)?
                } else if let (Some(value), [arg]) = (scope.parameter(name), args.as_slice()) {
                    Expr::Bin(BinOp::Mul, Box::new(Expr::Num(value)), Box::new(arg.clone()))
                } else {
                    return Err(ExprError::UnknownIdentifier { name: name.clone() });
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x() -> Expr {
        Expr::Var("x".to_string())
    }

    #[test]
    fn implicit_multiplication() {
        let e = parse_function_body("f(x) = 2x").unwrap();
        assert_eq!(e, Expr::Bin(BinOp::Mul, Box::new(Expr::Num(2.0)), Box::new(x())));
    }

    #[test]
    fn strips_y_head() {
        let e = parse_function_body("y = x + 1").unwrap();
        assert_eq!(e.eval(2.0, 0.0), Some(3.0));
    }

    #[test]
    fn coefficient_times_x_is_not_a_head() {
        let e = parse_function_body("2x = 3").unwrap();
        assert!(matches!(e, Expr::Bin(BinOp::Sub, _, _)), "{e:?}");
        assert_eq!(e.eval(1.5, 0.0), Some(0.0));

        let e = parse_function_body("(x + 1) x = 2").unwrap();
        assert!(matches!(e, Expr::Bin(BinOp::Sub, _, _)), "{e:?}");

        let e = parse_function_body("g (x) = x^2").unwrap();
        assert_eq!(e.eval(3.0, 0.0), Some(9.0));
    }

    #[test]
    fn structural_failures_are_malformed() {
        let pair = ExprParser::parse(Rule::number, "1.5").unwrap().next().unwrap();
        assert_eq!(build_primary(pair).unwrap(), Expr::Num(1.5));

        let pair = ExprParser::parse(Rule::neg, "-").unwrap().next().unwrap();
        let err = build_primary(pair).unwrap_err();
        assert!(matches!(err, ExprError::Malformed { what: "unexpected operand" }), "{err:?}");
    }

    #[test]
    fn superscript_powers() {
        let e = parse_function_body("x² + x³").unwrap();
        assert_eq!(e.eval(2.0, 0.0), Some(12.0));
    }

    #[test]
    fn squared_function_prefix() {
        let e = parse_function_body("sin²(x)").unwrap();
        let v = e.eval(1.0, 0.0).unwrap();
        assert!((v - 1f64.sin().powi(2)).abs() < 1e-12);
    }

    #[test]
    fn xy_run_is_a_product() {
        let e = parse_equation("xy = 1").unwrap();
        assert_eq!(e.lhs.eval(2.0, 3.0), Some(6.0));
    }

    #[test]
    fn variable_call_is_a_product() {
        let e = parse_function_body("x(x + 1)").unwrap();
        assert_eq!(e.eval(2.0, 0.0), Some(6.0));
    }

    #[test]
    fn point_literals() {
        assert_eq!(parse_point_literal("(3, 4)"), Some(dvec2(3.0, 4.0)));
        assert_eq!(parse_point_literal("(-1.5; 2)"), Some(dvec2(-1.5, 2.0)));
        assert_eq!(parse_point_literal("(x, 1)"), None);
        assert_eq!(parse_point_literal("A"), None);
    }

    #[test]
    fn numbers_and_constants() {
        assert_eq!(parse_number("2.5"), Some(2.5));
        let third = parse_number("π/3").unwrap();
        assert!((third - std::f64::consts::FRAC_PI_3).abs() < 1e-12);
        assert_eq!(parse_number("a"), None);
    }

    #[test]
    fn syntax_errors_carry_a_span() {
        let err = parse_equation("2 + * 3").unwrap_err();
        assert!(matches!(err, ExprError::Syntax { .. }));
    }

    #[test]
    fn discontinuity_heuristic() {
        assert!(parse_function_body("1/x").unwrap().may_be_discontinuous());
        assert!(parse_function_body("tan(x)").unwrap().may_be_discontinuous());
        assert!(parse_function_body("x^(-1)").unwrap().may_be_discontinuous());
        assert!(!parse_function_body("x^2 + sin(x)").unwrap().may_be_discontinuous());
    }

    struct TestScope {
        f: Expr,
    }

    impl Scope for TestScope {
        fn parameter(&self, name: &str) -> Option<f64> {
            (name == "a").then_some(3.0)
        }

        fn function(&self, name: &str) -> Option<&Expr> {
            (name == "f").then_some(&self.f)
        }
    }

    #[test]
    fn resolves_parameters_and_references() {
        let scope = TestScope { f: parse_function_body("x^2").unwrap() };
        let g = parse_function_body("g(x) = f(x - 1) + a").unwrap();
        let resolved = g.resolve(&scope).unwrap();
        assert_eq!(resolved.eval(3.0, 0.0), Some(7.0));

        let unknown = parse_function_body("b x").unwrap();
        assert!(matches!(
            unknown.resolve(&scope),
            Err(ExprError::UnknownIdentifier { .. })
        ));
    }
}
