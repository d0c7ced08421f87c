//! Translation-context plumbing: the clause cursor, namespace levels, the
//! referenced-name collections and the catalog access wrappers.

use std::sync::Arc;

use tracing::error;

use crate::catalog::{ColumnRole, ColumnSchema, DbVgVersion, TableMeta, PRIMARY_TS_COL_ID, PRIMARY_TS_INTERNAL_NAME};
use crate::error::{Result, TranslateError};
use crate::msg::{CmdMsg, MsgType};
use crate::types::{DataType, EpSet, TableName, VgroupInfo};

use super::Translator;

/// Clause currently being translated. The ordering is the evaluation order;
/// downstream checks compare against it (an aggregate is legal only at
/// `Having` or later).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub(crate) enum Clause {
    #[default]
    From,
    Where,
    PartitionBy,
    Window,
    GroupBy,
    Having,
    Select,
    OrderBy,
}

/// Resolved output field of a select, snapshotted for alias binding and
/// star expansion over derived tables.
#[derive(Debug, Clone)]
pub(crate) struct ProjField {
    pub(crate) alias: String,
    pub(crate) res_type: DataType,
}

/// Projection snapshot of the select currently under translation.
#[derive(Debug, Clone)]
pub(crate) struct SelectScope {
    pub(crate) fields: Vec<ProjField>,
}

/// One table registered at a namespace level.
///
/// Registration snapshots what resolution needs (the real table's schema or
/// the derived table's output row), so later clauses resolve columns without
/// re-borrowing the tree.
#[derive(Debug, Clone)]
pub(crate) enum ScopeTable {
    Real {
        db_name: String,
        table_name: String,
        alias: String,
        meta: Arc<TableMeta>,
    },
    Temp {
        alias: String,
        fields: Vec<ProjField>,
    },
}

/// What a successful column lookup binds into the column node.
#[derive(Debug, Clone)]
pub(crate) struct ColumnBinding {
    pub(crate) db_name: String,
    pub(crate) table_alias: String,
    pub(crate) table_name: String,
    pub(crate) col_name: String,
    pub(crate) table_id: u64,
    pub(crate) col_id: i16,
    pub(crate) role: ColumnRole,
    pub(crate) proj_ref: Option<usize>,
    pub(crate) res_type: DataType,
}

impl ScopeTable {
    pub(crate) fn alias(&self) -> &str {
        match self {
            ScopeTable::Real { alias, .. } => alias,
            ScopeTable::Temp { alias, .. } => alias,
        }
    }

    /// True when a column with this table prefix refers to this table.
    pub(crate) fn owns_prefix(&self, current_db: &str, col_db: &str, col_alias: &str) -> bool {
        let db_matches = match self {
            ScopeTable::Real { db_name, .. } => {
                if col_db.is_empty() {
                    current_db == db_name
                } else {
                    col_db == db_name
                }
            }
            ScopeTable::Temp { .. } => col_db.is_empty(),
        };
        db_matches && col_alias == self.alias()
    }

    /// Looks a column name up in this table's visible schema.
    pub(crate) fn find_column(&self, col_name: &str, col_id: i16) -> Option<ColumnBinding> {
        match self {
            ScopeTable::Real {
                db_name,
                table_name,
                alias,
                meta,
            } => {
                // the internal primary-timestamp spelling always binds to
                // the first column
                if col_id == PRIMARY_TS_COL_ID && col_name == PRIMARY_TS_INTERNAL_NAME {
                    return meta
                        .primary_ts_column()
                        .map(|schema| Self::bind_schema(db_name, table_name, alias, meta, schema, ColumnRole::Column));
                }
                meta.find_column(col_name).map(|(schema, role)| {
                    Self::bind_schema(db_name, table_name, alias, meta, schema, role)
                })
            }
            ScopeTable::Temp { alias, fields } => fields
                .iter()
                .position(|f| f.alias == col_name)
                .map(|idx| ColumnBinding {
                    db_name: String::new(),
                    table_alias: alias.clone(),
                    table_name: String::new(),
                    col_name: fields[idx].alias.clone(),
                    table_id: 0,
                    col_id: 0,
                    role: ColumnRole::Column,
                    proj_ref: Some(idx),
                    res_type: fields[idx].res_type,
                }),
        }
    }

    fn bind_schema(
        db_name: &str,
        table_name: &str,
        alias: &str,
        meta: &TableMeta,
        schema: &ColumnSchema,
        role: ColumnRole,
    ) -> ColumnBinding {
        ColumnBinding {
            db_name: db_name.to_string(),
            table_alias: alias.to_string(),
            table_name: table_name.to_string(),
            col_name: schema.name.clone(),
            table_id: meta.uid,
            col_id: schema.col_id,
            role,
            proj_ref: None,
            res_type: schema.data_type,
        }
    }
}

impl<'a> Translator<'a> {
    /// Registers a table at the current namespace level, growing the level
    /// stack as needed.
    pub(super) fn add_namespace(&mut self, table: ScopeTable) {
        while self.ns_levels.len() <= self.curr_level {
            self.ns_levels.push(Vec::new());
        }
        self.ns_levels[self.curr_level].push(table);
    }

    pub(super) fn current_level_tables(&self) -> &[ScopeTable] {
        self.ns_levels
            .get(self.curr_level)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub(super) fn full_db_name(&self, db_name: &str) -> String {
        format!("{}.{}", self.parse_ctx.acct_id, db_name)
    }

    pub(super) fn table_name(&self, db_name: &str, table_name: &str) -> TableName {
        TableName::new(self.parse_ctx.acct_id, db_name, table_name)
    }

    fn collect_use_db(&mut self, full_db_name: String) {
        self.dbs.insert(full_db_name);
    }

    fn collect_use_table(&mut self, name: &TableName) {
        self.tables.insert(name.clone());
    }

    pub(super) fn set_cmd_msg(&mut self, msg_type: MsgType, ep_set: EpSet, body: Vec<u8>) {
        self.cmd_msg = Some(CmdMsg::new(ep_set, msg_type, body));
    }

    pub(super) fn get_table_meta(&mut self, name: &TableName) -> Result<Arc<TableMeta>> {
        self.collect_use_db(name.full_db_name());
        self.collect_use_table(name);
        self.parse_ctx.catalog.get_table_meta(name).map_err(|e| {
            error!(db = %name.db, table = %name.table, "catalog get_table_meta error: {e}");
            TranslateError::Catalog {
                name: name.full_table_name(),
                message: e.message,
            }
        })
    }

    pub(super) fn get_table_dist_vg_info(&mut self, name: &TableName) -> Result<Vec<VgroupInfo>> {
        self.collect_use_db(name.full_db_name());
        self.collect_use_table(name);
        self.parse_ctx
            .catalog
            .get_table_dist_vg_info(name)
            .map_err(|e| {
                error!(db = %name.db, table = %name.table, "catalog get_table_dist_vg_info error: {e}");
                TranslateError::Catalog {
                    name: name.full_table_name(),
                    message: e.message,
                }
            })
    }

    pub(super) fn get_table_hash_vgroup(&mut self, name: &TableName) -> Result<VgroupInfo> {
        self.collect_use_db(name.full_db_name());
        self.collect_use_table(name);
        self.parse_ctx
            .catalog
            .get_table_hash_vgroup(name)
            .map_err(|e| {
                error!(db = %name.db, table = %name.table, "catalog get_table_hash_vgroup error: {e}");
                TranslateError::Catalog {
                    name: name.full_table_name(),
                    message: e.message,
                }
            })
    }

    pub(super) fn get_db_vg_info(&mut self, full_db_name: &str) -> Result<Vec<VgroupInfo>> {
        self.collect_use_db(full_db_name.to_string());
        self.parse_ctx
            .catalog
            .get_db_vg_info(full_db_name)
            .map_err(|e| {
                error!(db = %full_db_name, "catalog get_db_vg_info error: {e}");
                TranslateError::Catalog {
                    name: full_db_name.to_string(),
                    message: e.message,
                }
            })
    }

    pub(super) fn get_db_vg_version(&mut self, full_db_name: &str) -> Result<DbVgVersion> {
        self.collect_use_db(full_db_name.to_string());
        self.parse_ctx
            .catalog
            .get_db_vg_version(full_db_name)
            .map_err(|e| {
                error!(db = %full_db_name, "catalog get_db_vg_version error: {e}");
                TranslateError::Catalog {
                    name: full_db_name.to_string(),
                    message: e.message,
                }
            })
    }
}
