//! Expression nodes.

use serde::{Deserialize, Serialize};

use crate::catalog::ColumnRole;
use crate::types::DataType;

/// Typed payload of a translated value node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Datum {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Double(f64),
    Varchar(String),
    Timestamp(i64),
}

/// Unit suffix of a duration literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationUnit {
    Micros,
    Millis,
    Seconds,
    Minutes,
    Hours,
    Days,
    Weeks,
    Months,
    Years,
}

impl DurationUnit {
    pub fn from_suffix(c: char) -> Option<Self> {
        match c {
            'u' => Some(DurationUnit::Micros),
            'a' => Some(DurationUnit::Millis),
            's' => Some(DurationUnit::Seconds),
            'm' => Some(DurationUnit::Minutes),
            'h' => Some(DurationUnit::Hours),
            'd' => Some(DurationUnit::Days),
            'w' => Some(DurationUnit::Weeks),
            'n' => Some(DurationUnit::Months),
            'y' => Some(DurationUnit::Years),
            _ => None,
        }
    }

    /// Length in seconds for fixed-width units; months and years are
    /// calendar-relative and have none.
    pub fn fixed_seconds(&self) -> Option<i64> {
        match self {
            DurationUnit::Seconds => Some(1),
            DurationUnit::Minutes => Some(60),
            DurationUnit::Hours => Some(3_600),
            DurationUnit::Days => Some(86_400),
            DurationUnit::Weeks => Some(7 * 86_400),
            _ => None,
        }
    }
}

/// A column reference. Resolution fills in the owning table, the column id
/// and the role; a reference bound to a projection alias records the
/// projection index instead of a schema position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ColumnNode {
    pub db_name: String,
    pub table_alias: String,
    pub table_name: String,
    pub col_name: String,
    pub table_id: u64,
    pub col_id: i16,
    pub role: ColumnRole,
    /// Back-reference into the owning select's projection list, set when the
    /// column resolves against a subquery output or a projection alias.
    pub proj_ref: Option<usize>,
    pub alias: String,
    pub res_type: DataType,
}

impl ColumnNode {
    pub fn named(col_name: impl Into<String>) -> Self {
        Self {
            col_name: col_name.into(),
            ..Self::default()
        }
    }

    pub fn with_table(mut self, table_alias: impl Into<String>) -> Self {
        self.table_alias = table_alias.into();
        self
    }

    /// True when the node carries only an alias binding, with no table prefix.
    pub fn is_alias_only(&self) -> bool {
        self.table_alias.is_empty()
    }
}

/// A literal. `translated` flips to true once the literal has been parsed
/// into `datum`; translation is idempotent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ValueNode {
    pub literal: String,
    pub is_duration: bool,
    pub translated: bool,
    pub unit: Option<DurationUnit>,
    pub datum: Datum,
    pub alias: String,
    pub res_type: DataType,
}

impl ValueNode {
    pub fn new(literal: impl Into<String>, res_type: DataType) -> Self {
        Self {
            literal: literal.into(),
            res_type,
            ..Self::default()
        }
    }

    pub fn duration(literal: impl Into<String>, res_type: DataType) -> Self {
        Self {
            literal: literal.into(),
            is_duration: true,
            res_type,
            ..Self::default()
        }
    }
}

/// Binary and postfix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorType {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Gt,
    Ge,
    Lt,
    Le,
    Eq,
    Ne,
    Like,
    NotLike,
    In,
    NotIn,
    IsNull,
    IsNotNull,
}

impl OperatorType {
    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            OperatorType::Add
                | OperatorType::Sub
                | OperatorType::Mul
                | OperatorType::Div
                | OperatorType::Mod
        )
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            OperatorType::Gt
                | OperatorType::Ge
                | OperatorType::Lt
                | OperatorType::Le
                | OperatorType::Eq
                | OperatorType::Ne
                | OperatorType::Like
                | OperatorType::NotLike
                | OperatorType::In
                | OperatorType::NotIn
                | OperatorType::IsNull
                | OperatorType::IsNotNull
        )
    }
}

/// An operator application. `right` is absent for postfix operators
/// (`IS NULL`, `IS NOT NULL`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorNode {
    pub op: OperatorType,
    pub left: Box<ExprNode>,
    pub right: Option<Box<ExprNode>>,
    pub alias: String,
    pub res_type: DataType,
}

impl OperatorNode {
    pub fn binary(op: OperatorType, left: ExprNode, right: ExprNode) -> Self {
        Self {
            op,
            left: Box::new(left),
            right: Some(Box::new(right)),
            alias: String::new(),
            res_type: DataType::default(),
        }
    }
}

/// A function call. `func_id` is -1 until resolved through the function
/// manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionNode {
    pub name: String,
    pub func_id: i32,
    pub params: Vec<ExprNode>,
    pub alias: String,
    pub res_type: DataType,
}

impl FunctionNode {
    pub fn new(name: impl Into<String>, params: Vec<ExprNode>) -> Self {
        Self {
            name: name.into(),
            func_id: -1,
            params,
            alias: String::new(),
            res_type: DataType::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicCondType {
    And,
    Or,
    Not,
}

/// An n-ary logical condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicCondNode {
    pub cond_type: LogicCondType,
    pub params: Vec<ExprNode>,
    pub alias: String,
    pub res_type: DataType,
}

impl LogicCondNode {
    pub fn and(params: Vec<ExprNode>) -> Self {
        Self {
            cond_type: LogicCondType::And,
            params,
            alias: String::new(),
            res_type: DataType::default(),
        }
    }
}

/// A grouping set; only its first parameter participates in GROUP BY
/// matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupingSetNode {
    pub params: Vec<ExprNode>,
}

/// A scalar subquery embedded in an expression. Its result type is the
/// first projection's type once translated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubqueryExpr {
    pub select: Box<super::stmt::SelectStmt>,
    pub alias: String,
    pub res_type: DataType,
}

/// The expression sum type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExprNode {
    Column(ColumnNode),
    Value(ValueNode),
    Operator(OperatorNode),
    Function(FunctionNode),
    LogicCond(LogicCondNode),
    GroupingSet(GroupingSetNode),
    Subquery(SubqueryExpr),
}

impl ExprNode {
    pub fn res_type(&self) -> DataType {
        match self {
            ExprNode::Column(n) => n.res_type,
            ExprNode::Value(n) => n.res_type,
            ExprNode::Operator(n) => n.res_type,
            ExprNode::Function(n) => n.res_type,
            ExprNode::LogicCond(n) => n.res_type,
            ExprNode::GroupingSet(n) => n
                .params
                .first()
                .map(|p| p.res_type())
                .unwrap_or_default(),
            ExprNode::Subquery(n) => n.res_type,
        }
    }

    pub fn alias(&self) -> &str {
        match self {
            ExprNode::Column(n) => &n.alias,
            ExprNode::Value(n) => &n.alias,
            ExprNode::Operator(n) => &n.alias,
            ExprNode::Function(n) => &n.alias,
            ExprNode::LogicCond(n) => &n.alias,
            ExprNode::GroupingSet(_) => "",
            ExprNode::Subquery(n) => &n.alias,
        }
    }

    pub fn set_alias(&mut self, alias: impl Into<String>) {
        let alias = alias.into();
        match self {
            ExprNode::Column(n) => n.alias = alias,
            ExprNode::Value(n) => n.alias = alias,
            ExprNode::Operator(n) => n.alias = alias,
            ExprNode::Function(n) => n.alias = alias,
            ExprNode::LogicCond(n) => n.alias = alias,
            ExprNode::GroupingSet(_) => {}
            ExprNode::Subquery(n) => n.alias = alias,
        }
    }
}

/// Structural equality over the *written* shape of two expressions,
/// ignoring resolution artifacts (result types, datums, aliases, back
/// references). This is the equality the GROUP BY closure check uses.
pub fn node_equal(a: &ExprNode, b: &ExprNode) -> bool {
    match (a, b) {
        (ExprNode::Column(x), ExprNode::Column(y)) => {
            x.db_name == y.db_name && x.table_alias == y.table_alias && x.col_name == y.col_name
        }
        (ExprNode::Value(x), ExprNode::Value(y)) => {
            x.literal == y.literal && x.is_duration == y.is_duration
        }
        (ExprNode::Operator(x), ExprNode::Operator(y)) => {
            x.op == y.op
                && node_equal(&x.left, &y.left)
                && match (&x.right, &y.right) {
                    (Some(l), Some(r)) => node_equal(l, r),
                    (None, None) => true,
                    _ => false,
                }
        }
        (ExprNode::Function(x), ExprNode::Function(y)) => {
            x.name.eq_ignore_ascii_case(&y.name)
                && x.params.len() == y.params.len()
                && x.params
                    .iter()
                    .zip(y.params.iter())
                    .all(|(p, q)| node_equal(p, q))
        }
        (ExprNode::LogicCond(x), ExprNode::LogicCond(y)) => {
            x.cond_type == y.cond_type
                && x.params.len() == y.params.len()
                && x.params
                    .iter()
                    .zip(y.params.iter())
                    .all(|(p, q)| node_equal(p, q))
        }
        (ExprNode::GroupingSet(x), ExprNode::GroupingSet(y)) => {
            x.params.len() == y.params.len()
                && x.params
                    .iter()
                    .zip(y.params.iter())
                    .all(|(p, q)| node_equal(p, q))
        }
        _ => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NullOrder {
    #[default]
    Default,
    First,
    Last,
}

/// One ORDER BY key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderByItem {
    pub expr: ExprNode,
    pub order: SortOrder,
    pub null_order: NullOrder,
}

impl OrderByItem {
    pub fn asc(expr: ExprNode) -> Self {
        Self {
            expr,
            order: SortOrder::Asc,
            null_order: NullOrder::Default,
        }
    }

    pub fn desc(expr: ExprNode) -> Self {
        Self {
            expr,
            order: SortOrder::Desc,
            null_order: NullOrder::Default,
        }
    }
}
