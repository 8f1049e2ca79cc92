//! `value = <산술식>` 형태만 받아들이는 제한된 Pratt 파서와 트리 평가기.

use super::lexer::Token;
use crate::error::{MaterialError, MaterialResult};

/// 괄호/단항 연산자 중첩 한도.
const MAX_DEPTH: usize = 64;
/// 트리 노드 수 한도. 평가와 해제가 재귀적이므로 긴 연산자 사슬도 여기서 막는다.
const MAX_NODES: usize = 1024;

/// 연산자 결합 세기 (클수록 강함)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Additive = 1,
    Multiplicative = 2,
    Unary = 3,
    Power = 4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinaryOp {
    fn from_token(token: &Token) -> Option<Self> {
        match token {
            Token::Plus => Some(BinaryOp::Add),
            Token::Minus => Some(BinaryOp::Sub),
            Token::Star => Some(BinaryOp::Mul),
            Token::Slash => Some(BinaryOp::Div),
            Token::Power => Some(BinaryOp::Pow),
            _ => None,
        }
    }

    fn precedence(self) -> Precedence {
        match self {
            BinaryOp::Add | BinaryOp::Sub => Precedence::Additive,
            BinaryOp::Mul | BinaryOp::Div => Precedence::Multiplicative,
            BinaryOp::Pow => Precedence::Power,
        }
    }

    fn right_associative(self) -> bool {
        self == BinaryOp::Pow
    }
}

/// 호출이 허용된 수학 함수 목록.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Abs,
    Sqrt,
    Exp,
    /// `log(x)` 자연로그, `log(x, base)`
    Log,
    Log10,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Atan2,
    Sinh,
    Cosh,
    Tanh,
    Pow,
    Min,
    Max,
}

impl Function {
    pub fn lookup(name: &str) -> Option<Self> {
        let f = match name {
            "abs" => Function::Abs,
            "sqrt" => Function::Sqrt,
            "exp" => Function::Exp,
            "log" => Function::Log,
            "log10" => Function::Log10,
            "sin" => Function::Sin,
            "cos" => Function::Cos,
            "tan" => Function::Tan,
            "asin" => Function::Asin,
            "acos" => Function::Acos,
            "atan" => Function::Atan,
            "atan2" => Function::Atan2,
            "sinh" => Function::Sinh,
            "cosh" => Function::Cosh,
            "tanh" => Function::Tanh,
            "pow" => Function::Pow,
            "min" => Function::Min,
            "max" => Function::Max,
            _ => return None,
        };
        Some(f)
    }

    fn accepts(self, argc: usize) -> bool {
        match self {
            Function::Log => argc == 1 || argc == 2,
            Function::Atan2 | Function::Pow => argc == 2,
            Function::Min | Function::Max => argc >= 2,
            _ => argc == 1,
        }
    }

    fn apply(self, args: &[f64]) -> f64 {
        match self {
            Function::Abs => args[0].abs(),
            Function::Sqrt => args[0].sqrt(),
            Function::Exp => args[0].exp(),
            Function::Log if args.len() == 2 => args[0].ln() / args[1].ln(),
            Function::Log => args[0].ln(),
            Function::Log10 => args[0].log10(),
            Function::Sin => args[0].sin(),
            Function::Cos => args[0].cos(),
            Function::Tan => args[0].tan(),
            Function::Asin => args[0].asin(),
            Function::Acos => args[0].acos(),
            Function::Atan => args[0].atan(),
            Function::Atan2 => args[0].atan2(args[1]),
            Function::Sinh => args[0].sinh(),
            Function::Cosh => args[0].cosh(),
            Function::Tanh => args[0].tanh(),
            Function::Pow => args[0].powf(args[1]),
            Function::Min => args.iter().copied().fold(f64::INFINITY, f64::min),
            Function::Max => args.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }
}

/// 파싱이 끝난 산술식 트리. 변수는 상태 변수 순서의 인덱스로 참조한다.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Number(f64),
    Var(usize),
    Neg(Box<Node>),
    Binary(BinaryOp, Box<Node>, Box<Node>),
    Call(Function, Vec<Node>),
}

impl Node {
    pub fn eval(&self, vars: &[f64]) -> MaterialResult<f64> {
        match self {
            Node::Number(v) => Ok(*v),
            Node::Var(i) => Ok(vars[*i]),
            Node::Neg(inner) => Ok(-inner.eval(vars)?),
            Node::Binary(op, lhs, rhs) => {
                let a = lhs.eval(vars)?;
                let b = rhs.eval(vars)?;
                match op {
                    BinaryOp::Add => Ok(a + b),
                    BinaryOp::Sub => Ok(a - b),
                    BinaryOp::Mul => Ok(a * b),
                    BinaryOp::Div if b == 0.0 => Err(MaterialError::NumericEvaluation(
                        "0으로 나눌 수 없습니다".into(),
                    )),
                    BinaryOp::Div => Ok(a / b),
                    BinaryOp::Pow if a == 0.0 && b < 0.0 => Err(MaterialError::NumericEvaluation(
                        "0의 음수 거듭제곱은 정의되지 않습니다".into(),
                    )),
                    BinaryOp::Pow => Ok(a.powf(b)),
                }
            }
            Node::Call(f, args) => {
                let values = args
                    .iter()
                    .map(|a| a.eval(vars))
                    .collect::<MaterialResult<Vec<f64>>>()?;
                Ok(f.apply(&values))
            }
        }
    }
}

/// `value = <식>` 전체를 파싱한다. `state_vars`에 없는 이름은 모두 거부한다.
pub fn parse_assignment(tokens: &[Token], state_vars: &[String]) -> MaterialResult<Node> {
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
        nodes: 0,
        state_vars,
    };
    match (parser.advance(), parser.advance()) {
        (Some(Token::Ident(name)), Some(Token::Assign)) if name == "value" => {}
        _ => {
            return Err(MaterialError::UnsafeExpression(
                "수식은 'value = <산술식>' 형태여야 합니다".into(),
            ))
        }
    }
    let node = parser.expression(Precedence::Additive)?;
    if let Some(extra) = parser.peek() {
        return Err(MaterialError::UnsafeExpression(format!(
            "수식 끝에 예상치 못한 토큰 {extra:?}"
        )));
    }
    Ok(node)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
    nodes: usize,
    state_vars: &'a [String],
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, expected: &Token) -> MaterialResult<()> {
        match self.advance() {
            Some(t) if t == expected => Ok(()),
            other => Err(MaterialError::UnsafeExpression(format!(
                "{expected:?}이(가) 필요한 위치에 {other:?}"
            ))),
        }
    }

    fn expression(&mut self, min: Precedence) -> MaterialResult<Node> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(MaterialError::UnsafeExpression(
                "수식 중첩이 너무 깊습니다".into(),
            ));
        }
        let mut lhs = self.prefix()?;
        while let Some(op) = self.peek().and_then(BinaryOp::from_token) {
            let prec = op.precedence();
            if prec < min {
                break;
            }
            self.pos += 1;
            let next_min = if op.right_associative() {
                prec
            } else {
                next_level(prec)
            };
            let rhs = self.expression(next_min)?;
            self.count_node()?;
            lhs = Node::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        self.depth -= 1;
        Ok(lhs)
    }

    fn count_node(&mut self) -> MaterialResult<()> {
        self.nodes += 1;
        if self.nodes > MAX_NODES {
            return Err(MaterialError::UnsafeExpression(format!(
                "수식이 너무 깁니다 (노드 {MAX_NODES}개 초과)"
            )));
        }
        Ok(())
    }

    fn prefix(&mut self) -> MaterialResult<Node> {
        self.count_node()?;
        match self.advance() {
            Some(Token::Number(v)) => Ok(Node::Number(*v)),
            Some(Token::Minus) => Ok(Node::Neg(Box::new(self.expression(Precedence::Unary)?))),
            Some(Token::Plus) => self.expression(Precedence::Unary),
            Some(Token::LParen) => {
                let inner = self.expression(Precedence::Additive)?;
                self.expect(&Token::RParen)?;
                Ok(inner)
            }
            Some(Token::Ident(name)) => {
                if self.peek() == Some(&Token::LParen) {
                    self.pos += 1;
                    self.call(name)
                } else {
                    self.name(name)
                }
            }
            other => Err(MaterialError::UnsafeExpression(format!(
                "피연산자가 필요한 위치에 {other:?}"
            ))),
        }
    }

    fn name(&self, name: &str) -> MaterialResult<Node> {
        if let Some(i) = self.state_vars.iter().position(|v| v == name) {
            return Ok(Node::Var(i));
        }
        match name {
            "pi" => Ok(Node::Number(std::f64::consts::PI)),
            "e" => Ok(Node::Number(std::f64::consts::E)),
            _ => Err(MaterialError::UnsafeExpression(format!(
                "선언되지 않은 이름 '{name}'"
            ))),
        }
    }

    fn call(&mut self, name: &str) -> MaterialResult<Node> {
        let function = Function::lookup(name).ok_or_else(|| {
            MaterialError::UnsafeExpression(format!("허용되지 않은 함수 호출 '{name}'"))
        })?;
        let mut args = Vec::new();
        if self.peek() != Some(&Token::RParen) {
            loop {
                args.push(self.expression(Precedence::Additive)?);
                if self.peek() == Some(&Token::Comma) {
                    self.pos += 1;
                } else {
                    break;
                }
            }
        }
        self.expect(&Token::RParen)?;
        if !function.accepts(args.len()) {
            return Err(MaterialError::UnsafeExpression(format!(
                "함수 '{name}'에 인자 {}개는 허용되지 않습니다",
                args.len()
            )));
        }
        Ok(Node::Call(function, args))
    }
}

fn next_level(prec: Precedence) -> Precedence {
    match prec {
        Precedence::Additive => Precedence::Multiplicative,
        Precedence::Multiplicative => Precedence::Unary,
        Precedence::Unary | Precedence::Power => Precedence::Power,
    }
}
