//! Arithmetic formulas for derived metrics.
//!
//! Grammar:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := '-' unary | primary
//! primary := NUMBER | METRIC_CODE | '(' expr ')'
//! ```

use std::collections::BTreeSet;
use std::fmt;

use gps_model::MetricCode;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormulaError {
    #[error("formula is empty")]
    Empty,
    #[error("unexpected character {ch:?} at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },
    #[error("unexpected {found} at offset {offset}")]
    UnexpectedToken { found: String, offset: usize },
    #[error("unexpected end of formula")]
    UnexpectedEnd,
    #[error("invalid number {text:?}")]
    InvalidNumber { text: String },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error("missing inputs: {}", join_codes(.0))]
    MissingInputs(Vec<MetricCode>),
    #[error("division by zero")]
    DivisionByZero,
    #[error("result is not a finite number")]
    NonFinite,
}

fn join_codes(codes: &[MetricCode]) -> String {
    codes
        .iter()
        .map(MetricCode::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Metric(MetricCode),
    Neg(Box<Expr>),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

/// A parsed derived-metric formula.
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    source: String,
    expr: Expr,
}

impl Formula {
    pub fn parse(source: &str) -> Result<Self, FormulaError> {
        let tokens = tokenize(source)?;
        if tokens.is_empty() {
            return Err(FormulaError::Empty);
        }
        let mut parser = Parser { tokens, pos: 0 };
        let expr = parser.expr()?;
        if let Some((token, offset)) = parser.tokens.get(parser.pos) {
            return Err(FormulaError::UnexpectedToken {
                found: token.to_string(),
                offset: *offset,
            });
        }
        Ok(Self {
            source: source.trim().to_string(),
            expr,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Metric codes the formula reads, sorted.
    pub fn references(&self) -> BTreeSet<MetricCode> {
        let mut out = BTreeSet::new();
        collect_refs(&self.expr, &mut out);
        out
    }

    /// Evaluates the formula against `lookup`.
    ///
    /// All absent inputs are reported together, in code order.
    pub fn evaluate<F>(&self, lookup: F) -> Result<f64, EvalError>
    where
        F: Fn(&MetricCode) -> Option<f64>,
    {
        let missing: Vec<MetricCode> = self
            .references()
            .into_iter()
            .filter(|code| lookup(code).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(EvalError::MissingInputs(missing));
        }
        let value = eval(&self.expr, &lookup)?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(EvalError::NonFinite)
        }
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn collect_refs(expr: &Expr, out: &mut BTreeSet<MetricCode>) {
    match expr {
        Expr::Number(_) => {}
        Expr::Metric(code) => {
            out.insert(code.clone());
        }
        Expr::Neg(inner) => collect_refs(inner, out),
        Expr::Binary { lhs, rhs, .. } => {
            collect_refs(lhs, out);
            collect_refs(rhs, out);
        }
    }
}

fn eval<F>(expr: &Expr, lookup: &F) -> Result<f64, EvalError>
where
    F: Fn(&MetricCode) -> Option<f64>,
{
    match expr {
        Expr::Number(value) => Ok(*value),
        Expr::Metric(code) => lookup(code).ok_or_else(|| EvalError::MissingInputs(vec![code.clone()])),
        Expr::Neg(inner) => Ok(-eval(inner, lookup)?),
        Expr::Binary { op, lhs, rhs } => {
            let lhs = eval(lhs, lookup)?;
            let rhs = eval(rhs, lookup)?;
            match op {
                BinaryOp::Add => Ok(lhs + rhs),
                BinaryOp::Sub => Ok(lhs - rhs),
                BinaryOp::Mul => Ok(lhs * rhs),
                BinaryOp::Div if rhs == 0.0 => Err(EvalError::DivisionByZero),
                BinaryOp::Div => Ok(lhs / rhs),
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Op(char),
    LParen,
    RParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "number {value}"),
            Self::Ident(name) => write!(f, "identifier {name:?}"),
            Self::Op(op) => write!(f, "operator {op:?}"),
            Self::LParen => f.write_str("'('"),
            Self::RParen => f.write_str("')'"),
        }
    }
}

fn tokenize(source: &str) -> Result<Vec<(Token, usize)>, FormulaError> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();
    while let Some(&(offset, ch)) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }
        if ch.is_ascii_digit() || ch == '.' {
            let mut text = String::new();
            while let Some(&(_, c)) = chars.peek() {
                if c.is_ascii_digit() || c == '.' {
                    text.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            let value = text
                .parse::<f64>()
                .map_err(|_| FormulaError::InvalidNumber { text: text.clone() })?;
            tokens.push((Token::Number(value), offset));
            continue;
        }
        if ch.is_ascii_alphabetic() {
            let mut text = String::new();
            while let Some(&(_, c)) = chars.peek() {
                if c.is_ascii_alphanumeric() || c == '_' {
                    text.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push((Token::Ident(text), offset));
            continue;
        }
        let token = match ch {
            '+' | '-' | '*' | '/' => Token::Op(ch),
            '(' => Token::LParen,
            ')' => Token::RParen,
            _ => return Err(FormulaError::UnexpectedChar { ch, offset }),
        };
        tokens.push((token, offset));
        chars.next();
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(token, _)| token)
    }

    fn next(&mut self) -> Result<(Token, usize), FormulaError> {
        let item = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or(FormulaError::UnexpectedEnd)?;
        self.pos += 1;
        Ok(item)
    }

    fn expr(&mut self) -> Result<Expr, FormulaError> {
        let mut lhs = self.term()?;
        while let Some(Token::Op(op @ ('+' | '-'))) = self.peek() {
            let op = if *op == '+' { BinaryOp::Add } else { BinaryOp::Sub };
            self.pos += 1;
            let rhs = self.term()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn term(&mut self) -> Result<Expr, FormulaError> {
        let mut lhs = self.unary()?;
        while let Some(Token::Op(op @ ('*' | '/'))) = self.peek() {
            let op = if *op == '*' { BinaryOp::Mul } else { BinaryOp::Div };
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, FormulaError> {
        if let Some(Token::Op('-')) = self.peek() {
            self.pos += 1;
            return Ok(Expr::Neg(Box::new(self.unary()?)));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr, FormulaError> {
        let (token, offset) = self.next()?;
        match token {
            Token::Number(value) => Ok(Expr::Number(value)),
            Token::Ident(name) => MetricCode::new(name.clone())
                .map(Expr::Metric)
                .map_err(|_| FormulaError::UnexpectedToken {
                    found: format!("identifier {name:?}"),
                    offset,
                }),
            Token::LParen => {
                let inner = self.expr()?;
                match self.next()? {
                    (Token::RParen, _) => Ok(inner),
                    (other, offset) => Err(FormulaError::UnexpectedToken {
                        found: other.to_string(),
                        offset,
                    }),
                }
            }
            other => Err(FormulaError::UnexpectedToken {
                found: other.to_string(),
                offset,
            }),
        }
    }
}
