//! Predicate parser and evaluator.
//!
//! Implements the filter grammar the query layer renders against: infix
//! boolean expressions over `property OP value` comparisons,
//! `property BETWEEN { low,high }` ranges, parenthesized groups, and
//! `property.@type` assertions for polymorphic columns. Keywords and
//! operators are matched case-insensitively, mirroring the embedded
//! engines this store stands in for.
//!
//! Malformed predicates fail here, at evaluation time, with a
//! `QueryErrorKind::Syntax` error; the query layer never pre-validates.

use objmodel_core::error::{Error, Result};
use objmodel_core::record::Record;
use objmodel_core::types::TypeTag;
use objmodel_core::value::Value;

/// A parsed predicate, ready to evaluate against records.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    root: Node,
}

impl Filter {
    /// Parse a predicate string.
    pub fn parse(predicate: &str) -> Result<Self> {
        let tokens = lex(predicate)?;
        let mut parser = Parser {
            predicate,
            tokens,
            position: 0,
        };
        let root = parser.expression()?;
        if parser.position < parser.tokens.len() {
            return Err(Error::syntax(
                predicate,
                format!("unexpected trailing input at token {}", parser.position),
            ));
        }
        Ok(Self { root })
    }

    /// Evaluate against one record.
    pub fn matches(&self, record: &Record) -> bool {
        eval(&self.root, record)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Or(Box<Node>, Box<Node>),
    And(Box<Node>, Box<Node>),
    Compare {
        path: Path,
        op: CmpOp,
        value: Value,
    },
    Between {
        path: Path,
        low: Value,
        high: Value,
    },
}

#[derive(Debug, Clone, PartialEq)]
struct Path {
    properties: Vec<String>,
    /// Compare the runtime type tag instead of the value itself.
    type_of: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    BeginsWith { ci: bool },
    EndsWith { ci: bool },
    Contains { ci: bool },
}

// ==================== Lexer ====================

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    LParen,
    RParen,
    LBrace,
    RBrace,
    Comma,
    /// Punctuation operator (`=`, `!=`, `<=`, ...)
    Op(String),
    /// Identifier, keyword, or keyword operator (possibly with `[c]`)
    Word(String),
    Str(String),
    Num(Value),
}

fn lex(input: &str) -> Result<Vec<Tok>> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' | '\n' | '\r' => i += 1,
            '(' => {
                tokens.push(Tok::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Tok::RParen);
                i += 1;
            }
            '{' => {
                tokens.push(Tok::LBrace);
                i += 1;
            }
            '}' => {
                tokens.push(Tok::RBrace);
                i += 1;
            }
            ',' => {
                tokens.push(Tok::Comma);
                i += 1;
            }
            '\'' => {
                let mut s = String::new();
                i += 1;
                loop {
                    match chars.get(i) {
                        Some('\\') => {
                            if let Some(escaped) = chars.get(i + 1) {
                                s.push(*escaped);
                                i += 2;
                            } else {
                                return Err(Error::syntax(input, "dangling escape in string"));
                            }
                        }
                        Some('\'') => {
                            i += 1;
                            break;
                        }
                        Some(ch) => {
                            s.push(*ch);
                            i += 1;
                        }
                        None => return Err(Error::syntax(input, "unterminated string literal")),
                    }
                }
                tokens.push(Tok::Str(s));
            }
            '=' | '!' | '<' | '>' => {
                let mut op = String::new();
                while let Some(ch) = chars.get(i) {
                    if matches!(ch, '=' | '!' | '<' | '>') {
                        op.push(*ch);
                        i += 1;
                    } else {
                        break;
                    }
                }
                tokens.push(Tok::Op(op));
            }
            '-' | '0'..='9' => {
                let start = i;
                if c == '-' {
                    i += 1;
                }
                let mut has_dot = false;
                while let Some(ch) = chars.get(i) {
                    if ch.is_ascii_digit() {
                        i += 1;
                    } else if *ch == '.' && !has_dot && chars.get(i + 1).is_some_and(char::is_ascii_digit) {
                        has_dot = true;
                        i += 1;
                    } else {
                        break;
                    }
                }
                let text: String = chars[start..i].iter().collect();
                let value = if has_dot {
                    text.parse::<f64>().map(Value::Double)
                } else {
                    text.parse::<i64>().map(Value::Int)
                };
                match value {
                    Ok(value) => tokens.push(Tok::Num(value)),
                    Err(_) => {
                        return Err(Error::syntax(input, format!("bad number literal '{text}'")));
                    }
                }
            }
            _ if c.is_ascii_alphabetic() || c == '_' || c == '@' => {
                let start = i;
                while let Some(ch) = chars.get(i) {
                    if ch.is_ascii_alphanumeric() || matches!(ch, '_' | '@' | '.') {
                        i += 1;
                    } else {
                        break;
                    }
                }
                let mut word: String = chars[start..i].iter().collect();
                // keyword operators may carry a case-insensitivity suffix
                if chars.get(i) == Some(&'[')
                    && chars.get(i + 1).is_some_and(|ch| ch.eq_ignore_ascii_case(&'c'))
                    && chars.get(i + 2) == Some(&']')
                {
                    word.push_str("[c]");
                    i += 3;
                }
                tokens.push(Tok::Word(word));
            }
            _ => {
                return Err(Error::syntax(input, format!("unexpected character '{c}'")));
            }
        }
    }

    Ok(tokens)
}

// ==================== Parser ====================

struct Parser<'a> {
    predicate: &'a str,
    tokens: Vec<Tok>,
    position: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Tok> {
        self.tokens.get(self.position)
    }

    fn advance(&mut self) -> Option<Tok> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(Tok::Word(w)) if w.eq_ignore_ascii_case(keyword))
    }

    fn syntax(&self, message: impl Into<String>) -> Error {
        Error::syntax(self.predicate, message)
    }

    fn expression(&mut self) -> Result<Node> {
        let mut left = self.and_expression()?;
        while self.peek_keyword("or") {
            self.advance();
            let right = self.and_expression()?;
            left = Node::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn and_expression(&mut self) -> Result<Node> {
        let mut left = self.primary()?;
        while self.peek_keyword("and") {
            self.advance();
            let right = self.primary()?;
            left = Node::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn primary(&mut self) -> Result<Node> {
        if self.peek() == Some(&Tok::LParen) {
            self.advance();
            let inner = self.expression()?;
            if self.advance() != Some(Tok::RParen) {
                return Err(self.syntax("expected ')'"));
            }
            return Ok(inner);
        }
        self.comparison()
    }

    fn comparison(&mut self) -> Result<Node> {
        let path = match self.advance() {
            Some(Tok::Word(word)) => self.parse_path(&word)?,
            other => return Err(self.syntax(format!("expected property path, found {other:?}"))),
        };

        if self.peek_keyword("between") {
            self.advance();
            if self.advance() != Some(Tok::LBrace) {
                return Err(self.syntax("expected '{' after BETWEEN"));
            }
            let low = self.literal()?;
            if self.advance() != Some(Tok::Comma) {
                return Err(self.syntax("expected ',' in BETWEEN range"));
            }
            let high = self.literal()?;
            if self.advance() != Some(Tok::RBrace) {
                return Err(self.syntax("expected '}' closing BETWEEN range"));
            }
            return Ok(Node::Between { path, low, high });
        }

        let op = match self.advance() {
            Some(Tok::Op(op)) => match op.as_str() {
                "=" | "==" => CmpOp::Eq,
                "!=" | "<>" => CmpOp::Ne,
                "<" => CmpOp::Lt,
                "<=" => CmpOp::Le,
                ">" => CmpOp::Gt,
                ">=" => CmpOp::Ge,
                other => return Err(self.syntax(format!("unknown operator '{other}'"))),
            },
            Some(Tok::Word(word)) => {
                let (name, ci) = match word.strip_suffix("[c]") {
                    Some(name) => (name, true),
                    None => (word.as_str(), false),
                };
                if name.eq_ignore_ascii_case("beginswith") {
                    CmpOp::BeginsWith { ci }
                } else if name.eq_ignore_ascii_case("endswith") {
                    CmpOp::EndsWith { ci }
                } else if name.eq_ignore_ascii_case("contains") {
                    CmpOp::Contains { ci }
                } else {
                    return Err(Error::unsupported(
                        self.predicate,
                        format!("unsupported operator '{word}'"),
                    ));
                }
            }
            other => return Err(self.syntax(format!("expected operator, found {other:?}"))),
        };

        let value = self.literal()?;
        Ok(Node::Compare { path, op, value })
    }

    fn parse_path(&self, word: &str) -> Result<Path> {
        let mut properties: Vec<String> = Vec::new();
        let mut type_of = false;
        let segments: Vec<&str> = word.split('.').collect();
        for (index, segment) in segments.iter().enumerate() {
            if *segment == "@type" {
                if index + 1 != segments.len() {
                    return Err(self.syntax("@type must terminate a property path"));
                }
                type_of = true;
            } else if segment.is_empty() {
                return Err(self.syntax(format!("empty segment in path '{word}'")));
            } else {
                properties.push((*segment).to_string());
            }
        }
        if properties.is_empty() {
            return Err(self.syntax(format!("bad property path '{word}'")));
        }
        Ok(Path {
            properties,
            type_of,
        })
    }

    fn literal(&mut self) -> Result<Value> {
        match self.advance() {
            Some(Tok::Str(s)) => Ok(Value::Text(s)),
            Some(Tok::Num(value)) => Ok(value),
            Some(Tok::Word(word)) => {
                if word.eq_ignore_ascii_case("null") {
                    Ok(Value::Null)
                } else if word.eq_ignore_ascii_case("true") {
                    Ok(Value::Bool(true))
                } else if word.eq_ignore_ascii_case("false") {
                    Ok(Value::Bool(false))
                } else {
                    Err(self.syntax(format!("expected literal, found '{word}'")))
                }
            }
            other => Err(self.syntax(format!("expected literal, found {other:?}"))),
        }
    }
}

// ==================== Evaluator ====================

fn eval(node: &Node, record: &Record) -> bool {
    match node {
        Node::Or(left, right) => eval(left, record) || eval(right, record),
        Node::And(left, right) => eval(left, record) && eval(right, record),
        Node::Compare { path, op, value } => compare(*op, &resolve_path(path, record), value),
        Node::Between { path, low, high } => {
            let actual = resolve_path(path, record);
            let (Some(actual), Some(low), Some(high)) =
                (actual.as_f64(), low.as_f64(), high.as_f64())
            else {
                return false;
            };
            low <= actual && actual <= high
        }
    }
}

/// Walk a dotted path through nested records; missing properties resolve
/// to null. A trailing `@type` yields the runtime tag as text.
fn resolve_path(path: &Path, record: &Record) -> Value {
    let mut current = match record.get(&path.properties[0]) {
        Some(value) => value.clone(),
        None => Value::Null,
    };
    for property in &path.properties[1..] {
        current = match current {
            Value::Record(nested) => nested.get(property).cloned().unwrap_or(Value::Null),
            _ => Value::Null,
        };
    }
    if path.type_of {
        Value::Text(TypeTag::of(&current).as_str().to_string())
    } else {
        current
    }
}

fn compare(op: CmpOp, left: &Value, right: &Value) -> bool {
    match op {
        CmpOp::Eq => value_eq(left, right),
        CmpOp::Ne => !value_eq(left, right),
        CmpOp::Lt | CmpOp::Le | CmpOp::Gt | CmpOp::Ge => ordered_compare(op, left, right),
        CmpOp::BeginsWith { ci } => text_compare(left, right, ci, str::starts_with),
        CmpOp::EndsWith { ci } => text_compare(left, right, ci, str::ends_with),
        CmpOp::Contains { ci } => text_compare(left, right, ci, |haystack, needle| {
            haystack.contains(needle)
        }),
    }
}

fn value_eq(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Text(a), Value::Text(b)) => a == b,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        _ => match (left.as_f64(), right.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        },
    }
}

fn ordered_compare(op: CmpOp, left: &Value, right: &Value) -> bool {
    let ordering = if left.is_numeric() && right.is_numeric() {
        left.as_f64().partial_cmp(&right.as_f64())
    } else if let (Value::Text(a), Value::Text(b)) = (left, right) {
        Some(a.cmp(b))
    } else {
        None
    };
    let Some(ordering) = ordering else {
        return false;
    };
    match op {
        CmpOp::Lt => ordering.is_lt(),
        CmpOp::Le => ordering.is_le(),
        CmpOp::Gt => ordering.is_gt(),
        CmpOp::Ge => ordering.is_ge(),
        _ => false,
    }
}

fn text_compare(left: &Value, right: &Value, ci: bool, test: impl Fn(&str, &str) -> bool) -> bool {
    let (Value::Text(haystack), Value::Text(needle)) = (left, right) else {
        return false;
    };
    if ci {
        test(&haystack.to_lowercase(), &needle.to_lowercase())
    } else {
        test(haystack, needle)
    }
}
