//! Tokenizer and recursive-descent parser for the supported path subset

use crate::errors::{PatchError, Result};

// ===== AST =====

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    Path(LocationPath),
    Literal(String),
    Number(f64),
    Or(Box<Expr>, Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Compare(CompareOp, Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    Contains(Box<Expr>, Box<Expr>),
    StartsWith(Box<Expr>, Box<Expr>),
    Count(LocationPath),
    Position,
    Last,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CompareOp {
    Eq,
    Ne,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LocationPath {
    pub absolute: bool,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Step {
    pub axis: Axis,
    pub test: NodeTest,
    pub predicates: Vec<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Axis {
    Child,
    DescendantOrSelf,
    SelfNode,
    Parent,
    Attribute,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum NodeTest {
    Name(String),
    Any,
    Text,
    Node,
}

impl Step {
    fn new(axis: Axis, test: NodeTest) -> Self {
        Self {
            axis,
            test,
            predicates: Vec::new(),
        }
    }

    /// Step selects text nodes or attributes rather than elements
    pub(crate) fn is_terminal(&self) -> bool {
        self.axis == Axis::Attribute || self.test == NodeTest::Text
    }
}

// ===== Tokens =====

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Slash,
    DoubleSlash,
    Name(String),
    Star,
    Dot,
    DotDot,
    At,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Comma,
    Pipe,
    Eq,
    Ne,
    Literal(String),
    Number(f64),
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':')
}

fn tokenize(text: &str) -> std::result::Result<Vec<Token>, String> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '/' => {
                if chars.get(i + 1) == Some(&'/') {
                    tokens.push(Token::DoubleSlash);
                    i += 2;
                } else {
                    tokens.push(Token::Slash);
                    i += 1;
                }
            }
            '.' => {
                if chars.get(i + 1) == Some(&'.') {
                    tokens.push(Token::DotDot);
                    i += 2;
                } else {
                    tokens.push(Token::Dot);
                    i += 1;
                }
            }
            '*' => {
                tokens.push(Token::Star);
                i += 1;
            }
            '@' => {
                tokens.push(Token::At);
                i += 1;
            }
            '[' => {
                tokens.push(Token::LBracket);
                i += 1;
            }
            ']' => {
                tokens.push(Token::RBracket);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            ',' => {
                tokens.push(Token::Comma);
                i += 1;
            }
            '|' => {
                tokens.push(Token::Pipe);
                i += 1;
            }
            '=' => {
                tokens.push(Token::Eq);
                i += 1;
            }
            '!' if chars.get(i + 1) == Some(&'=') => {
                tokens.push(Token::Ne);
                i += 2;
            }
            '"' | '\'' => {
                let end = chars[i + 1..]
                    .iter()
                    .position(|&q| q == c)
                    .ok_or_else(|| "unterminated string literal".to_string())?;
                tokens.push(Token::Literal(chars[i + 1..i + 1 + end].iter().collect()));
                i += end + 2;
            }
            c if c.is_ascii_digit() => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let literal: String = chars[start..i].iter().collect();
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| format!("invalid number '{}'", literal))?;
                tokens.push(Token::Number(value));
            }
            c if is_name_start(c) => {
                let start = i;
                while i < chars.len() && is_name_char(chars[i]) {
                    i += 1;
                }
                tokens.push(Token::Name(chars[start..i].iter().collect()));
            }
            other => return Err(format!("unexpected character '{}'", other)),
        }
    }

    Ok(tokens)
}

// ===== Parser =====

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

type ParseResult<T> = std::result::Result<T, String>;

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &Token) -> ParseResult<()> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(format!("expected {:?}, found {:?}", expected, self.peek()))
        }
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if matches!(self.peek(), Some(Token::Name(n)) if n == keyword) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn union(&mut self) -> ParseResult<Vec<LocationPath>> {
        let mut paths = vec![self.location_path()?];
        while self.eat(&Token::Pipe) {
            paths.push(self.location_path()?);
        }
        Ok(paths)
    }

    fn expr(&mut self) -> ParseResult<Expr> {
        let mut left = self.and_expr()?;
        while self.eat_keyword("or") {
            let right = self.and_expr()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> ParseResult<Expr> {
        let mut left = self.compare_expr()?;
        while self.eat_keyword("and") {
            let right = self.compare_expr()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn compare_expr(&mut self) -> ParseResult<Expr> {
        let mut left = self.primary()?;
        loop {
            let op = if self.eat(&Token::Eq) {
                CompareOp::Eq
            } else if self.eat(&Token::Ne) {
                CompareOp::Ne
            } else {
                return Ok(left);
            };
            let right = self.primary()?;
            left = Expr::Compare(op, Box::new(left), Box::new(right));
        }
    }

    fn primary(&mut self) -> ParseResult<Expr> {
        match self.peek() {
            Some(Token::Literal(_)) | Some(Token::Number(_)) => match self.next() {
                Some(Token::Literal(s)) => Ok(Expr::Literal(s)),
                Some(Token::Number(n)) => Ok(Expr::Number(n)),
                _ => Err("expected literal".to_string()),
            },
            Some(Token::LParen) => {
                self.pos += 1;
                let inner = self.expr()?;
                self.expect(&Token::RParen)?;
                Ok(inner)
            }
            Some(Token::Name(name))
                if self.peek_at(1) == Some(&Token::LParen) && name != "text" && name != "node" =>
            {
                let name = name.clone();
                self.pos += 2;
                self.function(&name)
            }
            _ => Ok(Expr::Path(self.location_path()?)),
        }
    }

    // Called with the name and opening parenthesis consumed
    fn function(&mut self, name: &str) -> ParseResult<Expr> {
        let expr = match name {
            "not" => Expr::Not(Box::new(self.expr()?)),
            "contains" | "starts-with" => {
                let haystack = self.expr()?;
                self.expect(&Token::Comma)?;
                let needle = self.expr()?;
                if name == "contains" {
                    Expr::Contains(Box::new(haystack), Box::new(needle))
                } else {
                    Expr::StartsWith(Box::new(haystack), Box::new(needle))
                }
            }
            "count" => Expr::Count(self.location_path()?),
            "position" => Expr::Position,
            "last" => Expr::Last,
            other => return Err(format!("unsupported function '{}'", other)),
        };
        self.expect(&Token::RParen)?;
        Ok(expr)
    }

    fn location_path(&mut self) -> ParseResult<LocationPath> {
        let mut steps = Vec::new();
        let absolute = match self.peek() {
            Some(Token::Slash) => {
                self.pos += 1;
                if !self.at_step_start() {
                    return Ok(LocationPath {
                        absolute: true,
                        steps,
                    });
                }
                true
            }
            Some(Token::DoubleSlash) => {
                self.pos += 1;
                steps.push(Step::new(Axis::DescendantOrSelf, NodeTest::Node));
                true
            }
            _ => false,
        };

        steps.push(self.step()?);
        loop {
            if self.eat(&Token::Slash) {
                steps.push(self.step()?);
            } else if self.eat(&Token::DoubleSlash) {
                steps.push(Step::new(Axis::DescendantOrSelf, NodeTest::Node));
                steps.push(self.step()?);
            } else {
                break;
            }
        }

        if let Some(pos) = steps.iter().position(Step::is_terminal) {
            if pos + 1 != steps.len() {
                return Err("text() and @attribute are only allowed in the last step".to_string());
            }
        }

        Ok(LocationPath { absolute, steps })
    }

    fn at_step_start(&self) -> bool {
        matches!(
            self.peek(),
            Some(Token::Name(_) | Token::Star | Token::Dot | Token::DotDot | Token::At)
        )
    }

    fn step(&mut self) -> ParseResult<Step> {
        let mut step = match self.next() {
            Some(Token::Dot) => return Ok(Step::new(Axis::SelfNode, NodeTest::Node)),
            Some(Token::DotDot) => return Ok(Step::new(Axis::Parent, NodeTest::Node)),
            Some(Token::At) => match self.next() {
                Some(Token::Name(n)) => Step::new(Axis::Attribute, NodeTest::Name(n)),
                Some(Token::Star) => Step::new(Axis::Attribute, NodeTest::Any),
                other => return Err(format!("expected attribute name, found {:?}", other)),
            },
            Some(Token::Star) => Step::new(Axis::Child, NodeTest::Any),
            Some(Token::Name(n)) if self.peek() == Some(&Token::LParen) => {
                self.pos += 1;
                self.expect(&Token::RParen)?;
                match n.as_str() {
                    "text" => Step::new(Axis::Child, NodeTest::Text),
                    "node" => Step::new(Axis::Child, NodeTest::Node),
                    other => return Err(format!("unsupported node test '{}()'", other)),
                }
            }
            Some(Token::Name(n)) => Step::new(Axis::Child, NodeTest::Name(n)),
            other => return Err(format!("expected a step, found {:?}", other)),
        };

        while self.eat(&Token::LBracket) {
            step.predicates.push(self.expr()?);
            self.expect(&Token::RBracket)?;
        }
        Ok(step)
    }
}

/// Parse a top-level union of location paths
pub(crate) fn parse_union(query: &str) -> Result<Vec<LocationPath>> {
    let invalid = |reason: String| PatchError::InvalidQuery {
        query: query.to_string(),
        reason,
    };
    let tokens = tokenize(query).map_err(invalid)?;
    let mut parser = Parser { tokens, pos: 0 };
    let paths = parser.union().map_err(invalid)?;
    if let Some(token) = parser.peek() {
        return Err(invalid(format!("unexpected trailing {:?}", token)));
    }
    Ok(paths)
}
