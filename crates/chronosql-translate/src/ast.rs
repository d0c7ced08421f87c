//! The tagged statement tree produced by the grammar parser and consumed,
//! mutated and rewritten by the translator.
//!
//! Every node category is a sum type dispatched with exhaustive `match`, so
//! adding a variant forces each translator to acknowledge it. Expression
//! nodes carry their result type and alias; value nodes carry the raw
//! literal plus the typed datum filled in by translation; column nodes carry
//! the resolution fields (owning table, column id, role) filled in by name
//! resolution.

pub mod expr;
pub mod stmt;
pub mod table;

pub use expr::{
    node_equal, ColumnNode, Datum, DurationUnit, ExprNode, FunctionNode, GroupingSetNode,
    LogicCondNode, LogicCondType, NullOrder, OperatorNode, OperatorType, OrderByItem, SortOrder,
    SubqueryExpr, ValueNode,
};
pub use stmt::{
    AlterDatabaseStmt, AlterDnodeStmt, AlterLocalStmt, AlterTableStmt, AlterTableType,
    AlterUserStmt, ColumnDef,
    CreateDatabaseStmt, CreateDnodeStmt, CreateIndexStmt, CreateMultiTableStmt, CreateQnodeStmt,
    CreateSubTableClause, CreateTableStmt, CreateTopicStmt, CreateUserStmt, DatabaseOptions,
    DropDatabaseStmt, DropDnodeStmt, DropIndexStmt, DropQnodeStmt, DropSuperTableStmt,
    DropTableClause, DropTableStmt, DropTopicStmt, DropUserStmt, IndexOptions, IndexType,
    IntervalWindow, Query, SelectStmt, SessionWindow, ShowKind, ShowStmt, StateWindow, Stmt,
    TableOptions, UseDatabaseStmt, VnodeModifStmt, WindowClause,
};
pub use table::{JoinTable, JoinType, RealTable, TableRef, TempTable};
