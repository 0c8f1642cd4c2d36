//! # Condition compiler
//!
//! Turns a [`WhereClause`] into a parenthesized SQL boolean expression with
//! `?` placeholders, appending the bound values to a caller-supplied vector
//! in emission order.
//!
//! Conditions are joined left to right. A connector token following a
//! condition replaces the default connector for that join. When a condition
//! is followed by `OR` and no group is open, a `(` is opened before it; the
//! group closes after the next condition that is not followed by `OR`. Only
//! one group is open at a time, so `a OR b AND c OR d` compiles to
//! `((a OR b) AND (c OR d))`.

use std::fmt;
use std::str::FromStr;

use sea_query::Value;
use serde::Deserialize;
use serde_json::Value as Json;

use crate::error::CompileError;

/// Boolean connector placed between conditions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Connector {
    /// `AND`
    #[default]
    And,

    /// `OR`
    Or,
}

impl Connector {
    /// SQL keyword for the connector.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

impl fmt::Display for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Connector {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AND" => Ok(Self::And),
            "OR" => Ok(Self::Or),
            _ => Err(CompileError::InvalidCondition(format!("unknown connector `{s}`"))),
        }
    }
}

/// Comparison operator of a single condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `=`
    Eq,
    /// `!=` (also parsed from `<>`)
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Lte,
    /// `>`
    Gt,
    /// `>=`
    Gte,
    /// `IS`
    Is,
    /// `IS NOT`
    IsNot,
    /// `IN`
    In,
    /// `NOT IN`
    NotIn,
    /// `BETWEEN`
    Between,
    /// `LIKE`, value wrapped in `%…%`
    Like,
    /// `NOT LIKE`, value wrapped in `%…%`
    NotLike,
}

impl Operator {
    /// SQL text of the operator.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Is => "IS",
            Self::IsNot => "IS NOT",
            Self::In => "IN",
            Self::NotIn => "NOT IN",
            Self::Between => "BETWEEN",
            Self::Like => "LIKE",
            Self::NotLike => "NOT LIKE",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ").to_ascii_uppercase();
        let operator = match normalized.as_str() {
            "=" => Self::Eq,
            "!=" | "<>" => Self::Ne,
            "<" => Self::Lt,
            "<=" => Self::Lte,
            ">" => Self::Gt,
            ">=" => Self::Gte,
            "IS" => Self::Is,
            "IS NOT" => Self::IsNot,
            "IN" => Self::In,
            "NOT IN" => Self::NotIn,
            "BETWEEN" => Self::Between,
            "LIKE" => Self::Like,
            "NOT LIKE" => Self::NotLike,
            _ => return Err(CompileError::UnknownOperator(s.to_string())),
        };
        Ok(operator)
    }
}

/// Right-hand side of a condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// A single value.
    Scalar(Value),

    /// A list of values, for `IN`, `NOT IN` and `BETWEEN`.
    List(Vec<Value>),
}

/// A `(column, value, operator?)` triple.
///
/// Without an explicit operator, lists compile to `IN`, nulls to `IS` and
/// everything else to `=`.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    column: String,
    operand: Operand,
    operator: Option<Operator>,
}

impl Condition {
    /// A condition whose operator is inferred from the value.
    pub fn new(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            operand: Operand::Scalar(value.into()),
            operator: None,
        }
    }

    /// A condition with an explicit operator.
    pub fn with(column: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self::new(column, value).operator(operator)
    }

    /// A list condition, compiled as `IN` unless another operator is set.
    pub fn list<V: Into<Value>>(
        column: impl Into<String>, values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self {
            column: column.into(),
            operand: Operand::List(values.into_iter().map(Into::into).collect()),
            operator: None,
        }
    }

    /// `column = value`
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::with(column, Operator::Eq, value)
    }

    /// `column != value`
    pub fn ne(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::with(column, Operator::Ne, value)
    }

    /// `column > value`
    pub fn gt(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::with(column, Operator::Gt, value)
    }

    /// `column >= value`
    pub fn gte(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::with(column, Operator::Gte, value)
    }

    /// `column < value`
    pub fn lt(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::with(column, Operator::Lt, value)
    }

    /// `column <= value`
    pub fn lte(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::with(column, Operator::Lte, value)
    }

    /// `column IS NULL`, bound as a null parameter.
    pub fn is_null(column: impl Into<String>) -> Self {
        Self::with(column, Operator::Is, Value::String(None))
    }

    /// `column IS NOT NULL`, bound as a null parameter.
    pub fn is_not_null(column: impl Into<String>) -> Self {
        Self::with(column, Operator::IsNot, Value::String(None))
    }

    /// `column NOT IN (…)`
    pub fn not_in<V: Into<Value>>(
        column: impl Into<String>, values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::list(column, values).operator(Operator::NotIn)
    }

    /// `column BETWEEN low AND high`
    pub fn between(
        column: impl Into<String>, low: impl Into<Value>, high: impl Into<Value>,
    ) -> Self {
        Self::list(column, [low.into(), high.into()]).operator(Operator::Between)
    }

    /// `column LIKE %pattern%`
    pub fn like(column: impl Into<String>, pattern: impl Into<Value>) -> Self {
        Self::with(column, Operator::Like, pattern)
    }

    /// `column NOT LIKE %pattern%`
    pub fn not_like(column: impl Into<String>, pattern: impl Into<Value>) -> Self {
        Self::with(column, Operator::NotLike, pattern)
    }

    /// Override the operator.
    #[must_use]
    pub const fn operator(mut self, operator: Operator) -> Self {
        self.operator = Some(operator);
        self
    }

    /// The column the condition applies to.
    #[must_use]
    pub fn column(&self) -> &str {
        &self.column
    }

    fn from_json(triple: &[Json]) -> Result<Self, CompileError> {
        let (column, value, operator) = match triple {
            [Json::String(column), value] => (column, value, None),
            [Json::String(column), value, Json::String(operator)] => {
                (column, value, Some(operator.parse::<Operator>()?))
            }
            _ => {
                let shown = Json::Array(triple.to_vec());
                return Err(CompileError::InvalidCondition(format!(
                    "expected [column, value, operator?], got {shown}"
                )));
            }
        };

        let operand = match value {
            Json::Array(items) => {
                Operand::List(items.iter().map(json_to_value).collect::<Result<_, _>>()?)
            }
            scalar => Operand::Scalar(json_to_value(scalar)?),
        };

        Ok(Self {
            column: column.clone(),
            operand,
            operator,
        })
    }
}

/// One element of a [`WhereClause`].
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    /// A condition triple.
    Condition(Condition),

    /// A connector token joining the preceding condition to the next one.
    Connector(Connector),
}

/// An ordered sequence of conditions and connector tokens.
///
/// ```ignore
/// // status = 'published' AND (price = 0 OR user_id = 7)
/// let clause = WhereClause::from(Condition::eq("status", "published"))
///     .and(Condition::eq("price", 0))
///     .or(Condition::eq("user_id", 7));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "Json")]
pub struct WhereClause {
    terms: Vec<Term>,
}

impl WhereClause {
    /// An empty clause. Statements built with it have no `WHERE`.
    #[must_use]
    pub const fn new() -> Self {
        Self { terms: Vec::new() }
    }

    /// Append `condition`, joined to the previous one with `AND`.
    #[must_use]
    pub fn and(self, condition: Condition) -> Self {
        self.join(Connector::And, condition)
    }

    /// Append `condition`, joined to the previous one with `OR`.
    #[must_use]
    pub fn or(self, condition: Condition) -> Self {
        self.join(Connector::Or, condition)
    }

    /// Append `condition` without a connector token, so it is joined with the
    /// connector passed to the compiler.
    #[must_use]
    pub fn with(mut self, condition: Condition) -> Self {
        self.terms.push(Term::Condition(condition));
        self
    }

    fn join(mut self, connector: Connector, condition: Condition) -> Self {
        if !self.terms.is_empty() {
            self.terms.push(Term::Connector(connector));
        }
        self.terms.push(Term::Condition(condition));
        self
    }

    /// Whether the clause has no terms.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// The clause's terms in order.
    #[must_use]
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// Parse a clause from its JSON form.
    ///
    /// Accepts a list mixing `[column, value, operator?]` triples with
    /// `"AND"`/`"OR"` tokens, or a single bare triple.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::InvalidCondition`] when an element does not
    /// have one of those shapes, or an operator error for unknown operators.
    pub fn from_json(json: &Json) -> Result<Self, CompileError> {
        let Json::Array(items) = json else {
            return Err(CompileError::InvalidCondition(format!("expected an array, got {json}")));
        };

        match items.first() {
            None => return Ok(Self::new()),
            // a bare triple is a one-condition clause
            Some(first) if !first.is_array() => return Condition::from_json(items).map(Self::from),
            Some(_) => {}
        }

        let mut terms = Vec::with_capacity(items.len());
        for item in items {
            let term = match item {
                Json::Array(triple) => Term::Condition(Condition::from_json(triple)?),
                Json::String(token) => Term::Connector(token.parse()?),
                other => {
                    return Err(CompileError::InvalidCondition(format!(
                        "unexpected element {other}"
                    )));
                }
            };
            terms.push(term);
        }

        Ok(Self { terms })
    }
}

impl From<Condition> for WhereClause {
    fn from(condition: Condition) -> Self {
        Self {
            terms: vec![Term::Condition(condition)],
        }
    }
}

impl FromIterator<Term> for WhereClause {
    fn from_iter<I: IntoIterator<Item = Term>>(iter: I) -> Self {
        Self {
            terms: iter.into_iter().collect(),
        }
    }
}

impl TryFrom<Json> for WhereClause {
    type Error = CompileError;

    fn try_from(json: Json) -> Result<Self, Self::Error> {
        Self::from_json(&json)
    }
}

/// Compile `clause` into a parenthesized boolean expression.
///
/// Conditions without a following connector token are joined with
/// `connector`. Bound values are appended to `values` in placeholder order.
/// An empty clause compiles to an empty string.
///
/// # Errors
///
/// Returns a [`CompileError`] for an operator that cannot take the
/// condition's value, a `BETWEEN` without exactly two values, an invalid
/// column name, or a connector token that does not sit between two
/// conditions.
pub fn compile(
    clause: &WhereClause, connector: Connector, values: &mut Vec<Value>,
) -> Result<String, CompileError> {
    let terms = clause.terms();
    if terms.is_empty() {
        return Ok(String::new());
    }
    check_connectors(terms)?;

    let mut sql = String::new();
    let mut group_open = false;

    for (i, term) in terms.iter().enumerate() {
        let Term::Condition(condition) = term else {
            continue;
        };
        let next = match terms.get(i + 1) {
            Some(Term::Connector(token)) => Some(*token),
            _ => None,
        };

        if next == Some(Connector::Or) && !group_open {
            sql.push('(');
            group_open = true;
        }
        sql.push_str(&render(condition, values)?);
        if group_open && next != Some(Connector::Or) {
            sql.push(')');
            group_open = false;
        }

        sql.push(' ');
        sql.push_str(next.unwrap_or(connector).as_str());
        sql.push(' ');
    }

    let trailing = format!(" {connector} ");
    if sql.ends_with(&trailing) {
        sql.truncate(sql.len() - trailing.len());
    }

    Ok(format!("({sql})"))
}

fn check_connectors(terms: &[Term]) -> Result<(), CompileError> {
    let mut after_condition = false;
    for term in terms {
        match term {
            Term::Condition(_) => after_condition = true,
            Term::Connector(_) if after_condition => after_condition = false,
            Term::Connector(token) => {
                return Err(CompileError::InvalidCondition(format!(
                    "connector `{token}` must follow a condition"
                )));
            }
        }
    }
    if after_condition {
        Ok(())
    } else {
        Err(CompileError::InvalidCondition("clause ends with a connector".to_string()))
    }
}

fn render(condition: &Condition, values: &mut Vec<Value>) -> Result<String, CompileError> {
    let column = condition.column.as_str();
    if !is_valid_identifier(column) {
        return Err(CompileError::InvalidIdentifier(column.to_string()));
    }

    match &condition.operand {
        Operand::List(list) => {
            let operator = condition.operator.unwrap_or(Operator::In);
            match operator {
                Operator::In | Operator::NotIn => {
                    let placeholders = vec!["?"; list.len()].join(", ");
                    values.extend(list.iter().cloned());
                    Ok(format!("{column} {operator} ({placeholders})"))
                }
                Operator::Between => {
                    let [low, high] = list.as_slice() else {
                        return Err(CompileError::BetweenArity {
                            column: column.to_string(),
                            count: list.len(),
                        });
                    };
                    values.push(low.clone());
                    values.push(high.clone());
                    Ok(format!("{column} BETWEEN ? AND ?"))
                }
                other => Err(CompileError::UnsupportedListOperator {
                    column: column.to_string(),
                    operator: other.to_string(),
                }),
            }
        }
        Operand::Scalar(value) => {
            let operator = condition.operator.unwrap_or(if is_null(value) {
                Operator::Is
            } else {
                Operator::Eq
            });
            match operator {
                Operator::In | Operator::NotIn => {
                    values.push(value.clone());
                    Ok(format!("{column} {operator} (?)"))
                }
                Operator::Between => Err(CompileError::BetweenArity {
                    column: column.to_string(),
                    count: 1,
                }),
                Operator::Like | Operator::NotLike => {
                    let pattern =
                        pattern_text(value).ok_or_else(|| CompileError::UnsupportedPattern {
                            column: column.to_string(),
                            operator: operator.to_string(),
                        })?;
                    values.push(Value::from(format!("%{pattern}%")));
                    Ok(format!("{column} {operator} ?"))
                }
                _ => {
                    values.push(value.clone());
                    Ok(format!("{column} {operator} ?"))
                }
            }
        }
    }
}

/// Whether `value` is any null variant.
#[must_use]
pub const fn is_null(value: &Value) -> bool {
    matches!(
        value,
        Value::Bool(None)
            | Value::TinyInt(None)
            | Value::SmallInt(None)
            | Value::Int(None)
            | Value::BigInt(None)
            | Value::TinyUnsigned(None)
            | Value::SmallUnsigned(None)
            | Value::Unsigned(None)
            | Value::BigUnsigned(None)
            | Value::Float(None)
            | Value::Double(None)
            | Value::String(None)
            | Value::Char(None)
            | Value::Bytes(None)
            | Value::ChronoDate(None)
            | Value::ChronoTime(None)
            | Value::ChronoDateTime(None)
            | Value::ChronoDateTimeUtc(None)
            | Value::ChronoDateTimeLocal(None)
            | Value::ChronoDateTimeWithTimeZone(None)
    )
}

fn pattern_text(value: &Value) -> Option<String> {
    match value {
        Value::String(Some(text)) => Some(text.to_string()),
        Value::Char(Some(ch)) => Some(ch.to_string()),
        Value::TinyInt(Some(v)) => Some(v.to_string()),
        Value::SmallInt(Some(v)) => Some(v.to_string()),
        Value::Int(Some(v)) => Some(v.to_string()),
        Value::BigInt(Some(v)) => Some(v.to_string()),
        Value::TinyUnsigned(Some(v)) => Some(v.to_string()),
        Value::SmallUnsigned(Some(v)) => Some(v.to_string()),
        Value::Unsigned(Some(v)) => Some(v.to_string()),
        Value::BigUnsigned(Some(v)) => Some(v.to_string()),
        _ => None,
    }
}

pub(crate) fn json_to_value(json: &Json) -> Result<Value, CompileError> {
    match json {
        Json::Null => Ok(Value::String(None)),
        Json::Bool(b) => Ok(Value::from(*b)),
        Json::Number(n) => n
            .as_i64()
            .map(Value::from)
            .or_else(|| n.as_u64().map(Value::from))
            .or_else(|| n.as_f64().map(Value::from))
            .ok_or_else(|| CompileError::InvalidCondition(format!("unsupported number {n}"))),
        Json::String(s) => Ok(Value::from(s.as_str())),
        other => Err(CompileError::InvalidCondition(format!("unsupported value {other}"))),
    }
}

/// Whether `name` is a plain or table-qualified identifier
/// (`status`, `plugins.status`).
#[must_use]
pub fn is_valid_identifier(name: &str) -> bool {
    let mut segments = name.split('.');
    let valid = segments.by_ref().take(2).all(is_valid_segment);
    valid && segments.next().is_none()
}

fn is_valid_segment(segment: &str) -> bool {
    let mut chars = segment.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn compiled(clause: &WhereClause) -> (String, Vec<Value>) {
        let mut values = Vec::new();
        let sql = compile(clause, Connector::And, &mut values).unwrap();
        (sql, values)
    }

    #[test]
    fn single_condition() {
        let (sql, values) = compiled(&Condition::new("status", "published").into());
        assert_eq!(sql, "(status = ?)");
        assert_eq!(values, vec![Value::from("published")]);
    }

    #[test]
    fn bare_triple_normalizes() {
        let bare = WhereClause::from_json(&json!(["plugin_id", 3])).unwrap();
        let listed = WhereClause::from_json(&json!([["plugin_id", 3]])).unwrap();
        assert_eq!(bare, listed);
        assert_eq!(compiled(&bare), compiled(&listed));
        assert_eq!(compiled(&bare).0, "(plugin_id = ?)");
    }

    #[test]
    fn null_uses_is() {
        let (sql, values) = compiled(&Condition::new("deleted_at", Option::<i64>::None).into());
        assert_eq!(sql, "(deleted_at IS ?)");
        assert!(is_null(&values[0]));
    }

    #[test]
    fn or_pair_is_grouped() {
        let clause = WhereClause::from(Condition::eq("a", 1)).or(Condition::eq("b", 2));
        assert_eq!(compiled(&clause).0, "((a = ? OR b = ?))");
    }

    #[test]
    fn three_ors_share_one_group() {
        let clause =
            WhereClause::from_json(&json!([["a", 1], "OR", ["b", 2], "OR", ["c", 3]])).unwrap();
        let (sql, values) = compiled(&clause);
        assert_eq!(sql, "((a = ? OR b = ? OR c = ?))");
        assert_eq!(values.len(), 3);
    }

    #[test]
    fn or_and_or_groups_each_side() {
        let clause = WhereClause::from(Condition::eq("a", 1))
            .or(Condition::eq("b", 2))
            .and(Condition::eq("c", 3))
            .or(Condition::eq("d", 4));
        assert_eq!(compiled(&clause).0, "((a = ? OR b = ?) AND (c = ? OR d = ?))");
    }

    #[test]
    fn trailing_or_group_closes() {
        let clause = WhereClause::from(Condition::eq("status", "published"))
            .and(Condition::eq("price", 0))
            .or(Condition::eq("user_id", 7));
        assert_eq!(compiled(&clause).0, "(status = ? AND (price = ? OR user_id = ?))");
    }

    #[test]
    fn default_connector_or() {
        let clause = WhereClause::new().with(Condition::eq("a", 1)).with(Condition::eq("b", 2));
        let mut values = Vec::new();
        let sql = compile(&clause, Connector::Or, &mut values).unwrap();
        assert_eq!(sql, "(a = ? OR b = ?)");
    }

    #[test]
    fn list_defaults_to_in() {
        let (sql, values) = compiled(&Condition::list("id", [1, 2, 3]).into());
        assert_eq!(sql, "(id IN (?, ?, ?))");
        assert_eq!(values, vec![Value::from(1), Value::from(2), Value::from(3)]);
    }

    #[test]
    fn empty_in_list_is_literal() {
        let (sql, values) = compiled(&Condition::list("id", Vec::<i64>::new()).into());
        assert_eq!(sql, "(id IN ())");
        assert!(values.is_empty());
    }

    #[test]
    fn scalar_in_uses_single_placeholder() {
        let (sql, _) = compiled(&Condition::with("id", Operator::In, 5).into());
        assert_eq!(sql, "(id IN (?))");
    }

    #[test]
    fn between_binds_two_values() {
        let (sql, values) = compiled(&Condition::between("price", 5, 10).into());
        assert_eq!(sql, "(price BETWEEN ? AND ?)");
        assert_eq!(values, vec![Value::from(5), Value::from(10)]);
    }

    #[test]
    fn between_arity_is_checked() {
        let clause = WhereClause::from_json(&json!([["price", [1, 2, 3], "BETWEEN"]])).unwrap();
        let err = compile(&clause, Connector::And, &mut Vec::new()).unwrap_err();
        assert_eq!(
            err,
            CompileError::BetweenArity {
                column: "price".to_string(),
                count: 3
            }
        );
    }

    #[test]
    fn like_wraps_pattern() {
        let (sql, values) = compiled(&Condition::like("name", "dark").into());
        assert_eq!(sql, "(name LIKE ?)");
        assert_eq!(values, vec![Value::from("%dark%")]);
    }

    #[test]
    fn list_with_comparison_fails() {
        let clause = WhereClause::from(Condition::list("id", [1, 2]).operator(Operator::Gt));
        let err = compile(&clause, Connector::And, &mut Vec::new()).unwrap_err();
        assert!(err.to_string().contains('>'));
    }

    #[test]
    fn placeholder_parity() {
        let clause = WhereClause::from_json(&json!([
            ["status", ["published", "pending"]],
            "OR",
            ["price", [0, 5], "BETWEEN"],
            "AND",
            ["name", "theme", "LIKE"],
            ["category_id", null]
        ]))
        .unwrap();
        let (sql, values) = compiled(&clause);
        assert_eq!(sql.matches('?').count(), values.len());
        assert_eq!(values.len(), 6);
    }

    #[test]
    fn connectors_must_sit_between_conditions() {
        let leading = WhereClause::from_iter([
            Term::Connector(Connector::Or),
            Term::Condition(Condition::eq("a", 1)),
        ]);
        compile(&leading, Connector::And, &mut Vec::new()).unwrap_err();

        let trailing = WhereClause::from_json(&json!([["a", 1], "OR"])).unwrap();
        compile(&trailing, Connector::And, &mut Vec::new()).unwrap_err();
    }

    #[test]
    fn column_must_be_identifier() {
        let clause = WhereClause::from(Condition::eq("id; DROP TABLE users", 1));
        let err = compile(&clause, Connector::And, &mut Vec::new()).unwrap_err();
        assert!(matches!(err, CompileError::InvalidIdentifier(_)));
    }

    #[test]
    fn operators_parse_case_insensitively() {
        assert_eq!("not  in".parse::<Operator>().unwrap(), Operator::NotIn);
        assert_eq!("<>".parse::<Operator>().unwrap(), Operator::Ne);
        assert_eq!("like".parse::<Operator>().unwrap(), Operator::Like);
        "~=".parse::<Operator>().unwrap_err();
    }

    #[test]
    fn deserializes_from_json() {
        let clause: WhereClause =
            serde_json::from_value(json!([["status", "active"], "or", ["role", "admin"]]))
                .unwrap();
        assert_eq!(compiled(&clause).0, "((status = ? OR role = ?))");
    }
}
