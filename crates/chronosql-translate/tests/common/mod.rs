//! Shared fixtures: an in-memory catalog and AST construction helpers.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use chronosql_translate::catalog::{
    info_schema, Catalog, CatalogError, ColumnSchema, DbVgVersion, TableMeta, TableType,
};
use chronosql_translate::{
    ColumnNode, DataType, EpSet, ExprNode, FunctionNode, ParseContext, TableName, TimePrecision,
    TypeKind, ValueNode, VgroupInfo,
};

pub const ACCT_ID: i32 = 1;
pub const CURRENT_DB: &str = "test";

#[derive(Default)]
pub struct MockCatalog {
    tables: HashMap<String, Arc<TableMeta>>,
    hash_vgroups: HashMap<String, VgroupInfo>,
    dist_vgroups: HashMap<String, Vec<VgroupInfo>>,
    db_vgroups: HashMap<String, Vec<VgroupInfo>>,
    db_versions: HashMap<String, DbVgVersion>,
}

impl MockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, db: &str, table: &str, meta: TableMeta, vg_id: i32) -> Self {
        let name = TableName::new(ACCT_ID, db, table);
        self.tables.insert(name.full_table_name(), Arc::new(meta));
        self.hash_vgroups.insert(name.full_table_name(), vgroup(vg_id));
        self
    }

    /// Registers only the hash route for a table that does not exist yet
    /// (the target of a CREATE TABLE).
    pub fn with_hash_vgroup(mut self, db: &str, table: &str, vg_id: i32) -> Self {
        let name = TableName::new(ACCT_ID, db, table);
        self.hash_vgroups.insert(name.full_table_name(), vgroup(vg_id));
        self
    }

    pub fn with_dist_vgroups(mut self, db: &str, table: &str, vg_ids: &[i32]) -> Self {
        let name = TableName::new(ACCT_ID, db, table);
        self.dist_vgroups.insert(
            name.full_table_name(),
            vg_ids.iter().copied().map(vgroup).collect(),
        );
        self
    }

    pub fn with_db_vgroups(mut self, db: &str, vg_ids: &[i32]) -> Self {
        let full = format!("{ACCT_ID}.{db}");
        self.db_vgroups
            .insert(full.clone(), vg_ids.iter().copied().map(vgroup).collect());
        self.db_versions.insert(
            full,
            DbVgVersion {
                version: 1,
                db_id: 42,
                table_count: vg_ids.len() as i32,
            },
        );
        self
    }
}

impl Catalog for MockCatalog {
    fn get_table_meta(&self, name: &TableName) -> Result<Arc<TableMeta>, CatalogError> {
        self.tables
            .get(&name.full_table_name())
            .cloned()
            .ok_or_else(|| CatalogError::new(format!("table not found: {}", name.full_table_name())))
    }

    fn get_table_dist_vg_info(&self, name: &TableName) -> Result<Vec<VgroupInfo>, CatalogError> {
        self.dist_vgroups
            .get(&name.full_table_name())
            .cloned()
            .ok_or_else(|| CatalogError::new(format!("no dist vgroups: {}", name.full_table_name())))
    }

    fn get_table_hash_vgroup(&self, name: &TableName) -> Result<VgroupInfo, CatalogError> {
        self.hash_vgroups
            .get(&name.full_table_name())
            .cloned()
            .ok_or_else(|| CatalogError::new(format!("no hash vgroup: {}", name.full_table_name())))
    }

    fn get_db_vg_info(&self, full_db_name: &str) -> Result<Vec<VgroupInfo>, CatalogError> {
        self.db_vgroups
            .get(full_db_name)
            .cloned()
            .ok_or_else(|| CatalogError::new(format!("no db vgroups: {full_db_name}")))
    }

    fn get_db_vg_version(&self, full_db_name: &str) -> Result<DbVgVersion, CatalogError> {
        self.db_versions
            .get(full_db_name)
            .copied()
            .ok_or_else(|| CatalogError::new(format!("unknown db: {full_db_name}")))
    }
}

pub fn vgroup(vg_id: i32) -> VgroupInfo {
    VgroupInfo {
        vg_id,
        hash_begin: 0,
        hash_end: u32::MAX,
        ep_set: EpSet::single(format!("dnode{vg_id}"), 6030),
    }
}

fn column(col_id: i16, name: &str, kind: TypeKind) -> ColumnSchema {
    ColumnSchema {
        col_id,
        name: name.to_string(),
        data_type: DataType::new(kind),
    }
}

fn varchar_column(col_id: i16, name: &str, bytes: u32) -> ColumnSchema {
    ColumnSchema {
        col_id,
        name: name.to_string(),
        data_type: DataType::var_len(TypeKind::Varchar, bytes),
    }
}

/// `t (ts TIMESTAMP, a INT, b VARCHAR(20))`, a normal table.
pub fn normal_table_meta() -> TableMeta {
    TableMeta {
        uid: 100,
        table_type: TableType::Normal,
        precision: TimePrecision::Millis,
        columns: vec![
            column(1, "ts", TypeKind::Timestamp),
            column(2, "a", TypeKind::Int),
            varchar_column(3, "b", 20),
        ],
        tags: Vec::new(),
    }
}

/// `st (ts TIMESTAMP, v DOUBLE) TAGS (t1 INT, t2 VARCHAR(16))`, a super
/// table.
pub fn super_table_meta() -> TableMeta {
    TableMeta {
        uid: 200,
        table_type: TableType::Super,
        precision: TimePrecision::Millis,
        columns: vec![
            column(1, "ts", TypeKind::Timestamp),
            column(2, "v", TypeKind::Double),
        ],
        tags: vec![
            column(3, "t1", TypeKind::Int),
            varchar_column(4, "t2", 16),
        ],
    }
}

/// A system table of the information schema, as the catalog exposes it.
pub fn sys_table_meta(columns: Vec<ColumnSchema>) -> TableMeta {
    TableMeta {
        uid: 900,
        table_type: TableType::System,
        precision: TimePrecision::Millis,
        columns,
        tags: Vec::new(),
    }
}

/// Catalog with `test.t`, `test.st` and the stables/tables catalogs of the
/// information schema.
pub fn default_catalog() -> MockCatalog {
    MockCatalog::new()
        .with_table(CURRENT_DB, "t", normal_table_meta(), 2)
        .with_table(CURRENT_DB, "st", super_table_meta(), 3)
        .with_dist_vgroups(CURRENT_DB, "st", &[3, 4])
        .with_db_vgroups(CURRENT_DB, &[2, 3, 4])
        .with_table(
            info_schema::DB_NAME,
            info_schema::USER_STABLES,
            sys_table_meta(vec![
                varchar_column(1, "stable_name", 192),
                varchar_column(2, "db_name", 64),
            ]),
            1,
        )
        .with_table(
            info_schema::DB_NAME,
            info_schema::USER_TABLES,
            sys_table_meta(vec![
                varchar_column(1, "table_name", 192),
                varchar_column(2, "db_name", 64),
            ]),
            1,
        )
        .with_db_vgroups(info_schema::DB_NAME, &[1])
}

pub fn parse_ctx(catalog: MockCatalog) -> ParseContext {
    ParseContext {
        acct_id: ACCT_ID,
        db: CURRENT_DB.to_string(),
        catalog: Arc::new(catalog),
        mgmt_ep_set: EpSet::single("mnode1", 6030),
        sql: String::new(),
    }
}

// AST helpers, standing in for the grammar parser.

pub fn col(name: &str) -> ExprNode {
    ExprNode::Column(ColumnNode::named(name))
}

pub fn col_of(table: &str, name: &str) -> ExprNode {
    ExprNode::Column(ColumnNode::named(name).with_table(table))
}

pub fn int_val(literal: &str) -> ExprNode {
    ExprNode::Value(ValueNode::new(literal, DataType::new(TypeKind::BigInt)))
}

pub fn varchar_val(literal: &str) -> ExprNode {
    ExprNode::Value(ValueNode::new(
        literal,
        DataType::var_len(TypeKind::Varchar, literal.len() as u32),
    ))
}

pub fn varchar_value(literal: &str) -> ValueNode {
    ValueNode::new(
        literal,
        DataType::var_len(TypeKind::Varchar, literal.len() as u32),
    )
}

pub fn duration_value(literal: &str) -> ValueNode {
    let mut res_type = DataType::new(TypeKind::BigInt);
    res_type.precision = TimePrecision::Millis;
    ValueNode::duration(literal, res_type)
}

pub fn func(name: &str, params: Vec<ExprNode>) -> ExprNode {
    ExprNode::Function(FunctionNode::new(name, params))
}

pub fn count_star() -> ExprNode {
    func("count", vec![col("*")])
}

pub fn aliased(mut expr: ExprNode, alias: &str) -> ExprNode {
    expr.set_alias(alias);
    expr
}
