//! The consumed metadata-catalog interface.
//!
//! The translator never owns metadata: every table descriptor and vgroup
//! route is fetched on demand through [`Catalog`]. All calls are synchronous
//! and block the translating thread; the catalog is responsible for its own
//! caching and synchronization. A failed lookup surfaces as a
//! [`CatalogError`], which the translator maps to the appropriate semantic
//! error (a missing table meta becomes `TableNotExist`).

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{DataType, TableName, TimePrecision, VgroupInfo};

/// Column id of the primary timestamp column of every table.
pub const PRIMARY_TS_COL_ID: i16 = 1;

/// Internal spelling that always resolves to the primary timestamp column.
pub const PRIMARY_TS_INTERNAL_NAME: &str = "_rowts";

/// The virtual database exposing catalog state to SQL.
pub mod info_schema {
    pub const DB_NAME: &str = "information_schema";

    pub const USER_DATABASES: &str = "user_databases";
    pub const USER_TABLES: &str = "user_tables";
    pub const USER_STABLES: &str = "user_stables";
    pub const USER_USERS: &str = "user_users";
    pub const DNODES: &str = "dnodes";
    pub const VGROUPS: &str = "vgroups";
    pub const MNODES: &str = "mnodes";
    pub const MODULES: &str = "modules";
    pub const QNODES: &str = "qnodes";
    pub const USER_FUNCTIONS: &str = "user_functions";
    pub const USER_INDEXES: &str = "user_indexes";
    pub const USER_STREAMS: &str = "user_streams";
}

/// Physical kind of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableType {
    Super,
    Child,
    Normal,
    System,
}

/// Whether a resolved column is a data column or a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    #[default]
    Column,
    Tag,
}

/// One column of a table schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub col_id: i16,
    pub name: String,
    pub data_type: DataType,
}

/// Catalog descriptor of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMeta {
    pub uid: u64,
    pub table_type: TableType,
    pub precision: TimePrecision,
    /// Data columns, primary timestamp first.
    pub columns: Vec<ColumnSchema>,
    /// Tag columns; empty unless the table is a super table.
    pub tags: Vec<ColumnSchema>,
}

impl TableMeta {
    /// Looks a name up across data columns, then tags.
    pub fn find_column(&self, name: &str) -> Option<(&ColumnSchema, ColumnRole)> {
        if let Some(col) = self.columns.iter().find(|c| c.name == name) {
            return Some((col, ColumnRole::Column));
        }
        self.tags
            .iter()
            .find(|c| c.name == name)
            .map(|c| (c, ColumnRole::Tag))
    }

    /// The primary timestamp column.
    pub fn primary_ts_column(&self) -> Option<&ColumnSchema> {
        self.columns.first()
    }
}

/// Version tuple of a database's vgroup topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbVgVersion {
    pub version: i32,
    pub db_id: i64,
    pub table_count: i32,
}

/// Error returned by a catalog lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct CatalogError {
    pub message: String,
}

impl CatalogError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Synchronous metadata lookups consumed by the translator.
pub trait Catalog {
    /// Table descriptor by fully-qualified name.
    fn get_table_meta(&self, name: &TableName) -> Result<Arc<TableMeta>, CatalogError>;

    /// All vgroups holding data of a super table.
    fn get_table_dist_vg_info(&self, name: &TableName) -> Result<Vec<VgroupInfo>, CatalogError>;

    /// The single vgroup a table name hash-routes to.
    fn get_table_hash_vgroup(&self, name: &TableName) -> Result<VgroupInfo, CatalogError>;

    /// All vgroups of a database, by full database name.
    fn get_db_vg_info(&self, full_db_name: &str) -> Result<Vec<VgroupInfo>, CatalogError>;

    /// Topology version of a database.
    fn get_db_vg_version(&self, full_db_name: &str) -> Result<DbVgVersion, CatalogError>;
}
