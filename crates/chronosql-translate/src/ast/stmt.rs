//! Statement nodes and the query envelope.

use serde::{Deserialize, Serialize};

use crate::ast::expr::{ColumnNode, ExprNode, FunctionNode, OrderByItem, ValueNode};
use crate::ast::table::TableRef;
use crate::msg::{CmdMsg, MsgType, VgDataBlocks};
use crate::types::{DataType, ResultField, TableName, TimePrecision};

/// A SELECT statement. An empty projection list means `SELECT *`; star
/// expansion fills it in during translation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectStmt {
    pub distinct: bool,
    pub projections: Vec<ExprNode>,
    pub from: TableRef,
    pub where_clause: Option<ExprNode>,
    pub partition_by: Vec<ExprNode>,
    pub window: Option<WindowClause>,
    pub group_by: Vec<ExprNode>,
    pub having: Option<ExprNode>,
    pub order_by: Vec<OrderByItem>,
}

impl SelectStmt {
    /// A bare `SELECT ... FROM <from>` scaffold.
    pub fn from_table(from: TableRef) -> Self {
        Self {
            distinct: false,
            projections: Vec::new(),
            from,
            where_clause: None,
            partition_by: Vec::new(),
            window: None,
            group_by: Vec::new(),
            having: None,
            order_by: Vec::new(),
        }
    }
}

/// Window clauses. Only the interval window has dedicated semantics; the
/// others translate their expressions and pass through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowClause {
    Interval(IntervalWindow),
    Session(SessionWindow),
    State(StateWindow),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalWindow {
    pub ts_col: ColumnNode,
    pub interval: ValueNode,
    pub offset: Option<ValueNode>,
    pub sliding: Option<ValueNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionWindow {
    pub ts_col: ColumnNode,
    pub gap: ValueNode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateWindow {
    pub col: ColumnNode,
}

/// Database options as the parser leaves them: `-1` means "unset, server
/// chooses". `retentions` alternates `(freq, keep)` duration literals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseOptions {
    pub num_of_vgroups: i32,
    pub cache_block_size: i32,
    pub num_of_blocks: i32,
    pub days_per_file: i32,
    pub keep: i32,
    pub min_rows: i32,
    pub max_rows: i32,
    pub fsync_period: i32,
    pub wal_level: i8,
    pub precision: TimePrecision,
    pub compression: i8,
    pub replica: i8,
    pub quorum: i8,
    pub cache_last_row: i8,
    pub stream_mode: i8,
    pub retentions: Vec<ValueNode>,
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        Self {
            num_of_vgroups: -1,
            cache_block_size: -1,
            num_of_blocks: -1,
            days_per_file: -1,
            keep: -1,
            min_rows: -1,
            max_rows: -1,
            fsync_period: -1,
            wal_level: -1,
            precision: TimePrecision::default(),
            compression: -1,
            replica: -1,
            quorum: -1,
            cache_last_row: -1,
            stream_mode: -1,
            retentions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateDatabaseStmt {
    pub db_name: String,
    pub ignore_exists: bool,
    pub options: DatabaseOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlterDatabaseStmt {
    pub db_name: String,
    pub options: DatabaseOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropDatabaseStmt {
    pub db_name: String,
    pub ignore_not_exists: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UseDatabaseStmt {
    pub db_name: String,
}

/// One column definition in a CREATE TABLE.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: DataType,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// Super-table options: rollup delay/file factor, SMA columns and rollup
/// functions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TableOptions {
    pub files_factor: f64,
    pub delay: i32,
    pub sma: Vec<ColumnNode>,
    pub rollup_funcs: Vec<FunctionNode>,
}

/// CREATE TABLE. With `tags` non-empty this defines a super table; without
/// tags it is a normal table and is rewritten into a vnode modification
/// before translation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTableStmt {
    pub db_name: String,
    pub table_name: String,
    pub ignore_exists: bool,
    pub columns: Vec<ColumnDef>,
    pub tags: Vec<ColumnDef>,
    pub options: TableOptions,
}

/// One `CREATE TABLE ... USING ... TAGS (...)` clause of a multi-table
/// create. `specific_tags` empty means positional tag values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateSubTableClause {
    pub db_name: String,
    pub table_name: String,
    pub use_db_name: String,
    pub use_table_name: String,
    pub ignore_exists: bool,
    pub specific_tags: Vec<ColumnNode>,
    pub tag_values: Vec<ValueNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateMultiTableStmt {
    pub sub_tables: Vec<CreateSubTableClause>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropTableClause {
    pub db_name: String,
    pub table_name: String,
    pub ignore_not_exists: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropTableStmt {
    pub tables: Vec<DropTableClause>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropSuperTableStmt {
    pub db_name: String,
    pub table_name: String,
    pub ignore_not_exists: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlterTableType {
    AddTag,
    DropTag,
    AddColumn,
    DropColumn,
    UpdateColumnBytes,
    UpdateTagBytes,
    UpdateTagName,
    UpdateColumnName,
    UpdateTagVal,
    UpdateOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlterTableStmt {
    pub db_name: String,
    pub table_name: String,
    pub alter_type: AlterTableType,
    pub col_name: String,
    pub new_col_name: String,
    pub data_type: DataType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateUserStmt {
    pub user_name: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlterUserStmt {
    pub user_name: String,
    pub alter_type: i8,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropUserStmt {
    pub user_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateDnodeStmt {
    pub fqdn: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropDnodeStmt {
    pub dnode_id: i32,
    pub fqdn: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlterDnodeStmt {
    pub dnode_id: i32,
    pub config: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateQnodeStmt {
    pub dnode_id: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropQnodeStmt {
    pub dnode_id: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexType {
    Sma,
    FullText,
}

/// SMA index options: aggregate functions rolled up per interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexOptions {
    pub funcs: Vec<FunctionNode>,
    pub interval: ValueNode,
    pub offset: Option<ValueNode>,
    pub sliding: Option<ValueNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateIndexStmt {
    pub index_type: IndexType,
    pub index_name: String,
    pub table_name: String,
    pub ignore_exists: bool,
    pub options: IndexOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropIndexStmt {
    pub index_name: String,
}

/// CREATE TOPIC: either over a subscribed database or driven by a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTopicStmt {
    pub topic_name: String,
    pub subscribe_db_name: String,
    pub query: Option<Box<Stmt>>,
    pub ignore_exists: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropTopicStmt {
    pub topic_name: String,
    pub ignore_not_exists: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlterLocalStmt {
    pub config: String,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShowKind {
    Databases,
    Tables,
    Stables,
    Users,
    Dnodes,
    Vgroups,
    Mnodes,
    Modules,
    Qnodes,
    Functions,
    Indexes,
    Streams,
}

/// A SHOW statement, optionally scoped to a database and filtered with a
/// LIKE pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowStmt {
    pub kind: ShowKind,
    pub db_name: Option<ValueNode>,
    pub tb_name_pattern: Option<ValueNode>,
}

/// Post-rewrite data-plane payload: one binary block per destination
/// vgroup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VnodeModifStmt {
    pub data_blocks: Vec<VgDataBlocks>,
}

/// The statement sum type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stmt {
    Select(Box<SelectStmt>),
    CreateDatabase(CreateDatabaseStmt),
    AlterDatabase(AlterDatabaseStmt),
    DropDatabase(DropDatabaseStmt),
    UseDatabase(UseDatabaseStmt),
    CreateTable(CreateTableStmt),
    CreateMultiTable(CreateMultiTableStmt),
    DropTable(DropTableStmt),
    DropSuperTable(DropSuperTableStmt),
    AlterTable(AlterTableStmt),
    CreateUser(CreateUserStmt),
    AlterUser(AlterUserStmt),
    DropUser(DropUserStmt),
    CreateDnode(CreateDnodeStmt),
    AlterDnode(AlterDnodeStmt),
    DropDnode(DropDnodeStmt),
    CreateQnode(CreateQnodeStmt),
    DropQnode(DropQnodeStmt),
    CreateIndex(CreateIndexStmt),
    DropIndex(DropIndexStmt),
    CreateTopic(CreateTopicStmt),
    DropTopic(DropTopicStmt),
    AlterLocal(AlterLocalStmt),
    Show(ShowStmt),
    VnodeModif(VnodeModifStmt),
}

/// The per-statement envelope threaded through parse, translate and
/// dispatch. Translation mutates `root` in place and fills in the result
/// schema or the command message, plus the referenced-database and
/// referenced-table lists the caller uses for cache invalidation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub root: Stmt,
    pub have_result_set: bool,
    pub direct_rpc: bool,
    pub show_rewrite: bool,
    pub msg_type: Option<MsgType>,
    pub result_schema: Vec<ResultField>,
    pub cmd_msg: Option<CmdMsg>,
    pub databases: Vec<String>,
    pub tables: Vec<TableName>,
}

impl Query {
    pub fn new(root: Stmt) -> Self {
        Self {
            root,
            have_result_set: false,
            direct_rpc: false,
            show_rewrite: false,
            msg_type: None,
            result_schema: Vec::new(),
            cmd_msg: None,
            databases: Vec::new(),
            tables: Vec::new(),
        }
    }
}
