//! The translation pass.
//!
//! [`translate`] consumes a parsed [`Query`] and either mutates it into a
//! fully resolved, type-annotated tree (selects) or attaches a serialized
//! management request (admin statements). The pass runs in three stages:
//! a pre-translation rewrite of SHOW / CREATE TABLE / CREATE MULTI TABLE
//! roots, the statement translation proper, and a finalization step that
//! fills the query envelope.
//!
//! A translation is strictly single-threaded and never suspends; catalog
//! lookups block the calling thread.

mod context;
mod expr;
mod finalize;
mod rewrite;
mod select;
mod stmt;
mod table;

use std::sync::Arc;

pub(crate) use context::{Clause, ScopeTable, SelectScope};

use crate::ast::{Query, SelectStmt, ShowKind, Stmt};
use crate::catalog::Catalog;
use crate::error::Result;
use crate::functions::FunctionManager;
use crate::msg::CmdMsg;
use crate::types::{EpSet, TableName};
use indexmap::IndexSet;

/// Parse-time parameters threaded into every translation.
#[derive(Clone)]
pub struct ParseContext {
    pub acct_id: i32,
    /// Current database of the session.
    pub db: String,
    pub catalog: Arc<dyn Catalog>,
    /// Endpoint set of the management node.
    pub mgmt_ep_set: EpSet,
    /// Raw SQL text of the statement being translated.
    pub sql: String,
}

/// Translates a parsed query in place.
///
/// On success the query's root has been rewritten/annotated and the envelope
/// populated; on error the tree may be partially annotated and must be
/// discarded by the caller.
pub fn translate(parse_ctx: &ParseContext, query: &mut Query) -> Result<()> {
    let func_mgr = FunctionManager::new();
    let mut translator = Translator::new(parse_ctx, &func_mgr);
    translator.rewrite_query(query)?;
    translator.translate_stmt(&mut query.root)?;
    translator.finalize(query)
}

/// Per-statement translation state.
///
/// Owns the namespace level stack, the clause cursor, the pending command
/// message and the referenced-database/table sets. One translator serves
/// exactly one statement; nothing is shared between translations except the
/// catalog behind `parse_ctx`.
pub struct Translator<'a> {
    pub(crate) parse_ctx: &'a ParseContext,
    pub(crate) func_mgr: &'a FunctionManager,
    /// Namespace levels; outer index is subquery depth, inner is the tables
    /// registered at that depth in FROM order.
    pub(crate) ns_levels: Vec<Vec<ScopeTable>>,
    pub(crate) curr_level: usize,
    pub(crate) curr_clause: Clause,
    /// Projection snapshot of the select being translated; consulted only
    /// for ORDER BY alias binding.
    pub(crate) curr_select: Option<SelectScope>,
    pub(crate) cmd_msg: Option<CmdMsg>,
    /// Full database names consulted, in first-use order.
    pub(crate) dbs: IndexSet<String>,
    /// Qualified tables consulted, in first-use order.
    pub(crate) tables: IndexSet<TableName>,
    /// Set while translating a topic-backing query; suppresses vgroup-list
    /// population during table resolution.
    pub(crate) topic_query: bool,
}

impl<'a> Translator<'a> {
    pub fn new(parse_ctx: &'a ParseContext, func_mgr: &'a FunctionManager) -> Self {
        Self {
            parse_ctx,
            func_mgr,
            ns_levels: Vec::new(),
            curr_level: 0,
            curr_clause: Clause::default(),
            curr_select: None,
            cmd_msg: None,
            dbs: IndexSet::new(),
            tables: IndexSet::new(),
            topic_query: false,
        }
    }

    /// Dispatches on statement kind.
    pub(crate) fn translate_stmt(&mut self, stmt: &mut Stmt) -> Result<()> {
        match stmt {
            Stmt::Select(select) => self.translate_select(select),
            Stmt::CreateDatabase(s) => self.translate_create_database(s),
            Stmt::AlterDatabase(s) => self.translate_alter_database(s),
            Stmt::DropDatabase(s) => self.translate_drop_database(s),
            Stmt::UseDatabase(s) => self.translate_use_database(s),
            Stmt::CreateTable(s) => self.translate_create_super_table(s),
            Stmt::CreateMultiTable(_) => Ok(()),
            Stmt::DropTable(s) => self.translate_drop_table(s),
            Stmt::DropSuperTable(s) => self.translate_drop_super_table(s),
            Stmt::AlterTable(s) => self.translate_alter_table(s),
            Stmt::CreateUser(s) => self.translate_create_user(s),
            Stmt::AlterUser(s) => self.translate_alter_user(s),
            Stmt::DropUser(s) => self.translate_drop_user(s),
            Stmt::CreateDnode(s) => self.translate_create_dnode(s),
            Stmt::AlterDnode(s) => self.translate_alter_dnode(s),
            Stmt::DropDnode(s) => self.translate_drop_dnode(s),
            Stmt::CreateQnode(s) => self.translate_create_qnode(s),
            Stmt::DropQnode(s) => self.translate_drop_qnode(s),
            Stmt::CreateIndex(s) => self.translate_create_index(s),
            Stmt::DropIndex(s) => self.translate_drop_index(s),
            Stmt::CreateTopic(s) => self.translate_create_topic(s),
            Stmt::DropTopic(s) => self.translate_drop_topic(s),
            Stmt::AlterLocal(s) => self.translate_alter_local(s),
            Stmt::Show(s) if s.kind == ShowKind::Tables => self.translate_show_tables(),
            Stmt::Show(s) => self.translate_show(s),
            Stmt::VnodeModif(_) => Ok(()),
        }
    }

    /// Translates a select one namespace level down, saving and restoring
    /// the clause cursor and the enclosing select scope.
    pub(crate) fn translate_subquery(&mut self, select: &mut SelectStmt) -> Result<()> {
        self.curr_level += 1;
        let saved_clause = self.curr_clause;
        let saved_scope = self.curr_select.take();
        let result = self.translate_select(select);
        self.curr_level -= 1;
        // pop the subquery's namespace level
        self.ns_levels.truncate(self.curr_level + 1);
        self.curr_clause = saved_clause;
        self.curr_select = saved_scope;
        result
    }
}
