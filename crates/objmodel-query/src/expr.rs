//! Predicate tokens and rendering.
//!
//! Builder calls accumulate [`Token`]s in call order; [`render`] walks them
//! once and produces the textual predicate the storage collaborator's
//! filter engine consumes. Token order is semantically significant: it
//! encodes precedence through explicit group markers, so tokens are never
//! reordered.

use objmodel_core::types::TypeTag;
use objmodel_core::value::Value;

/// Comparison operator vocabulary.
///
/// The `*Typed` variants (`===`, `<==`, `>==`) compare like their plain
/// counterparts and additionally assert the column's runtime type; the
/// builder wraps such comparisons together with the implied type check in
/// one group. `LIKE`/`LIKE[c]` are accepted as input spellings and
/// canonicalize to `CONTAINS`/`CONTAINS[c]` before rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compare {
    #[default]
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    /// `===`: equality plus runtime type assertion
    EqTyped,
    /// `<==`: less-or-equal plus runtime type assertion
    LeTyped,
    /// `>==`: greater-or-equal plus runtime type assertion
    GeTyped,
    BeginsWith,
    BeginsWithCi,
    EndsWith,
    EndsWithCi,
    Contains,
    ContainsCi,
}

impl Compare {
    /// Parse an operator spelling, including human-friendly aliases.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "=" | "==" => Some(Compare::Eq),
            "!" | "!=" | "<>" => Some(Compare::Ne),
            "<" => Some(Compare::Lt),
            "<=" => Some(Compare::Le),
            ">" => Some(Compare::Gt),
            ">=" => Some(Compare::Ge),
            "===" => Some(Compare::EqTyped),
            "<==" => Some(Compare::LeTyped),
            ">==" => Some(Compare::GeTyped),
            "BEGINSWITH" => Some(Compare::BeginsWith),
            "BEGINSWITH[c]" => Some(Compare::BeginsWithCi),
            "ENDSWITH" => Some(Compare::EndsWith),
            "ENDSWITH[c]" => Some(Compare::EndsWithCi),
            "CONTAINS" | "LIKE" => Some(Compare::Contains),
            "CONTAINS[c]" | "LIKE[c]" => Some(Compare::ContainsCi),
            _ => None,
        }
    }

    /// Whether this operator also asserts the operand's runtime type.
    pub const fn is_typed(self) -> bool {
        matches!(self, Compare::EqTyped | Compare::LeTyped | Compare::GeTyped)
    }

    /// The plain comparison underlying a type-asserting operator.
    pub const fn base(self) -> Self {
        match self {
            Compare::EqTyped => Compare::Eq,
            Compare::LeTyped => Compare::Le,
            Compare::GeTyped => Compare::Ge,
            other => other,
        }
    }

    /// The spelling used in the rendered predicate.
    pub const fn as_str(self) -> &'static str {
        match self {
            Compare::Eq | Compare::EqTyped => "=",
            Compare::Ne => "!=",
            Compare::Lt => "<",
            Compare::Le | Compare::LeTyped => "<=",
            Compare::Gt => ">",
            Compare::Ge | Compare::GeTyped => ">=",
            Compare::BeginsWith => "BEGINSWITH",
            Compare::BeginsWithCi => "BEGINSWITH[c]",
            Compare::EndsWith => "ENDSWITH",
            Compare::EndsWithCi => "ENDSWITH[c]",
            Compare::Contains => "CONTAINS",
            Compare::ContainsCi => "CONTAINS[c]",
        }
    }
}

impl std::str::FromStr for Compare {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Compare::parse(s).ok_or(())
    }
}

/// A single comparison: property, operator, value.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub property: String,
    pub op: Compare,
    pub value: Value,
}

impl Predicate {
    /// Create a comparison predicate.
    pub fn new(property: impl Into<String>, op: Compare, value: impl Into<Value>) -> Self {
        Self {
            property: property.into(),
            op,
            value: value.into(),
        }
    }

    /// Create an equality predicate.
    pub fn eq(property: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(property, Compare::Eq, value)
    }
}

/// Filter input: a structured predicate, or positional parts.
///
/// Both variants normalize through [`FilterArg::into_predicate`] into the
/// same token; an omitted operator defaults to equality.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterArg {
    Structured(Predicate),
    Positional {
        property: String,
        op: Option<Compare>,
        value: Value,
    },
}

impl FilterArg {
    /// Normalize either variant into a concrete predicate.
    pub fn into_predicate(self) -> Predicate {
        match self {
            FilterArg::Structured(predicate) => predicate,
            FilterArg::Positional {
                property,
                op,
                value,
            } => Predicate {
                property,
                op: op.unwrap_or_default(),
                value,
            },
        }
    }
}

impl From<Predicate> for FilterArg {
    fn from(predicate: Predicate) -> Self {
        FilterArg::Structured(predicate)
    }
}

impl<P: Into<String>, V: Into<Value>> From<(P, V)> for FilterArg {
    fn from((property, value): (P, V)) -> Self {
        FilterArg::Positional {
            property: property.into(),
            op: None,
            value: value.into(),
        }
    }
}

impl<P: Into<String>, V: Into<Value>> From<(P, Compare, V)> for FilterArg {
    fn from((property, op, value): (P, Compare, V)) -> Self {
        FilterArg::Positional {
            property: property.into(),
            op: Some(op),
            value: value.into(),
        }
    }
}

/// One accumulated builder operation awaiting rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Comparison; list values render as an implicitly-grouped disjunction.
    Where { or: bool, predicate: Predicate },
    /// Literal fragment, rendered unmodified.
    Raw { or: bool, fragment: String },
    /// Range fragment `property BETWEEN { low,high }`.
    Between {
        or: bool,
        property: String,
        low: Value,
        high: Value,
    },
    /// Runtime type constraint over `property.@type`.
    TypeCheck {
        or: bool,
        property: String,
        tags: Vec<TypeTag>,
    },
    /// `(`. `typed` marks a group the builder opened itself to bind a
    /// type-asserting comparison to its implied type check.
    GroupStart { typed: bool },
    /// `)`. An unmatched close renders a stray `)`; the evaluator rejects it.
    GroupEnd,
    /// Explicit ` AND `, suppressing connector inference for the next token.
    And,
    /// Explicit ` OR `, suppressing connector inference for the next token.
    Or,
}

impl Token {
    const fn or_flag(&self) -> Option<bool> {
        match self {
            Token::Where { or, .. }
            | Token::Raw { or, .. }
            | Token::Between { or, .. }
            | Token::TypeCheck { or, .. } => Some(*or),
            _ => None,
        }
    }
}

/// Render a token sequence into one predicate string.
///
/// Between two fragments an implicit ` AND ` is inserted unless the
/// previous token opened a group, the current token is an or-variant
/// (` OR ` instead), or an explicit connector token sits between them.
/// A group-open borrows its connector from the token it binds: the type
/// check that immediately follows it, or the comparison a type-asserting
/// operator wrapped. This places the connector at the group-open position
/// so the whole unit participates in the outer chain.
pub fn render(tokens: &[Token]) -> String {
    let mut out = String::new();
    for (index, token) in tokens.iter().enumerate() {
        out.push_str(connector_before(tokens, index));
        render_fragment(token, &mut out);
    }
    out
}

fn connector_before(tokens: &[Token], index: usize) -> &'static str {
    let token = &tokens[index];
    if matches!(token, Token::GroupEnd | Token::And | Token::Or) {
        return "";
    }
    if index == 0 {
        return "";
    }
    match &tokens[index - 1] {
        // nothing immediately inside an opened group
        Token::GroupStart { .. } => return "",
        // an explicit connector renders itself
        Token::And | Token::Or => return "",
        _ => {}
    }
    let or = match token {
        Token::GroupStart { typed } => group_or_flag(tokens, index, *typed),
        other => other.or_flag().unwrap_or(false),
    };
    if or { " OR " } else { " AND " }
}

/// Connector polarity for a group-open, borrowed from the token it wraps.
fn group_or_flag(tokens: &[Token], index: usize, typed: bool) -> bool {
    match tokens.get(index + 1) {
        Some(Token::TypeCheck { or, .. }) => *or,
        Some(token) if typed => token.or_flag().unwrap_or(false),
        _ => false,
    }
}

fn render_fragment(token: &Token, out: &mut String) {
    match token {
        Token::Where { predicate, .. } => {
            let op = predicate.op.base().as_str();
            match &predicate.value {
                Value::List(items) if items.len() > 1 => {
                    out.push('(');
                    for (i, item) in items.iter().enumerate() {
                        if i > 0 {
                            out.push_str(" OR ");
                        }
                        out.push_str(&predicate.property);
                        out.push(' ');
                        out.push_str(op);
                        out.push(' ');
                        out.push_str(&render_value(item));
                    }
                    out.push(')');
                }
                Value::List(items) => {
                    let value = items.first().cloned().unwrap_or(Value::Null);
                    out.push_str(&predicate.property);
                    out.push(' ');
                    out.push_str(op);
                    out.push(' ');
                    out.push_str(&render_value(&value));
                }
                value => {
                    out.push_str(&predicate.property);
                    out.push(' ');
                    out.push_str(op);
                    out.push(' ');
                    out.push_str(&render_value(value));
                }
            }
        }
        Token::Raw { fragment, .. } => out.push_str(fragment),
        Token::Between {
            property,
            low,
            high,
            ..
        } => {
            out.push_str(property);
            out.push_str(" BETWEEN { ");
            out.push_str(&render_value(low));
            out.push(',');
            out.push_str(&render_value(high));
            out.push_str(" }");
        }
        Token::TypeCheck {
            property, tags, ..
        } => {
            for (i, tag) in tags.iter().enumerate() {
                if i > 0 {
                    out.push_str(" OR ");
                }
                out.push_str(property);
                out.push_str(".@type == '");
                out.push_str(tag.as_str());
                out.push('\'');
            }
        }
        Token::GroupStart { .. } => out.push('('),
        Token::GroupEnd => out.push(')'),
        Token::And => out.push_str(" AND "),
        Token::Or => out.push_str(" OR "),
    }
}

/// Render a scalar value as a predicate literal.
///
/// Strings are single-quoted with embedded quotes backslash-escaped; null
/// renders as the `null` keyword. This is basic escaping only, the layer
/// performs no further validation.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(v) => v.to_string(),
        Value::Int(v) => v.to_string(),
        Value::Double(v) => v.to_string(),
        Value::Text(s) => format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'")),
        Value::List(items) => items
            .iter()
            .map(render_value)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Record(_) => "null".to_string(),
    }
}
