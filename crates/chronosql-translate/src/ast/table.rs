//! Table references appearing in FROM clauses.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::ast::expr::ExprNode;
use crate::ast::stmt::SelectStmt;
use crate::catalog::TableMeta;
use crate::types::VgroupInfo;

/// A physical table reference. `meta` and `vgroups` are populated by
/// resolution; `use_db_name` overrides the database consulted for a system
/// table's vgroup list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealTable {
    pub db_name: String,
    pub table_name: String,
    pub alias: String,
    pub use_db_name: String,
    pub meta: Option<Arc<TableMeta>>,
    pub vgroups: Vec<VgroupInfo>,
}

impl RealTable {
    pub fn new(db_name: impl Into<String>, table_name: impl Into<String>) -> Self {
        let table_name = table_name.into();
        Self {
            db_name: db_name.into(),
            alias: table_name.clone(),
            table_name,
            use_db_name: String::new(),
            meta: None,
            vgroups: Vec::new(),
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = alias.into();
        self
    }
}

/// A derived table: a subquery with an alias.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TempTable {
    pub subquery: Box<SelectStmt>,
    pub alias: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JoinType {
    #[default]
    Inner,
}

/// A join with its ON predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinTable {
    pub join_type: JoinType,
    pub left: Box<TableRef>,
    pub right: Box<TableRef>,
    pub on: ExprNode,
}

/// The table-reference sum type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableRef {
    Real(RealTable),
    Temp(TempTable),
    Join(JoinTable),
}

impl TableRef {
    pub fn alias(&self) -> &str {
        match self {
            TableRef::Real(t) => &t.alias,
            TableRef::Temp(t) => &t.alias,
            TableRef::Join(_) => "",
        }
    }
}
