//! Semantic analyzer and query translator of the ChronoSQL front-end.
//!
//! The input is a parsed, un-analyzed statement tree; the output is either a
//! fully type-annotated, catalog-resolved select tree or a serialized
//! management request ready for dispatch. See [`translate`] for the entry
//! point.

pub mod ast;
pub mod catalog;
pub mod error;
pub mod functions;
pub mod msg;
pub mod time;
pub mod translate;
pub mod types;

// Re-export the main entry point and context
pub use translate::{translate, ParseContext, Translator};

// Re-export types explicitly
pub use ast::{
    ColumnNode,
    Datum,
    DurationUnit,
    ExprNode,
    FunctionNode,
    GroupingSetNode,
    IntervalWindow,
    JoinTable,
    JoinType,
    LogicCondNode,
    OperatorNode,
    OperatorType,
    OrderByItem,
    Query,
    RealTable,
    SelectStmt,
    ShowKind,
    ShowStmt,
    SortOrder,
    Stmt,
    TableRef,
    TempTable,
    ValueNode,
    VnodeModifStmt,
    WindowClause,
};
pub use catalog::{
    Catalog, CatalogError, ColumnRole, ColumnSchema, DbVgVersion, TableMeta, TableType,
};
pub use error::{ErrorCode, Result, TranslateError};
pub use functions::{FuncKind, FunctionManager};
pub use msg::{CmdMsg, MsgType, VgDataBlocks};
pub use types::{
    DataType, Endpoint, EpSet, ResultField, TableName, TimePrecision, TypeKind, VgroupInfo,
};
