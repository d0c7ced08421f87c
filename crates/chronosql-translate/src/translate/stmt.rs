//! DDL/DCL lowering: each admin statement gathers its parameters, consults
//! the catalog where lookups are needed, and serializes a request into the
//! context's command-message envelope with its fixed message type and
//! target endpoint.

use crate::ast::{
    AlterDatabaseStmt, AlterDnodeStmt, AlterLocalStmt, AlterTableStmt, AlterTableType,
    AlterUserStmt, ColumnDef, ColumnNode, CreateDatabaseStmt, CreateDnodeStmt, CreateIndexStmt,
    CreateQnodeStmt,
    CreateTableStmt, CreateTopicStmt, CreateUserStmt, DropDatabaseStmt, DropDnodeStmt,
    DropIndexStmt, DropQnodeStmt, DropSuperTableStmt, DropTableStmt, DropTopicStmt, DropUserStmt,
    Datum, ExprNode, IndexType, IntervalWindow, RealTable, SelectStmt, ShowStmt, TableRef,
    UseDatabaseStmt, ValueNode, WindowClause,
};
use crate::catalog::{TableType, PRIMARY_TS_COL_ID, PRIMARY_TS_INTERNAL_NAME};
use crate::error::{Result, TranslateError};
use crate::msg::{
    serialize_ast, serialize_req, AlterDbReq, AlterTbReq, CfgDnodeReq, CmdMsg, CreateDbReq,
    CreateDnodeReq, CreateSmaReq, CreateStbReq, CreateTopicReq, CreateUserReq, DropDbReq,
    DropDnodeReq, DropSmaReq, DropStbReq, DropTopicReq, DropUserReq, FieldSchema, MsgType,
    QnodeReq, Retention, ShowReq, UseDbReq, VShowTablesReq, AlterUserReq,
};
use crate::types::{DataType, TableName, TypeKind};

use super::Translator;

impl<'a> Translator<'a> {
    fn set_mgmt_cmd(&mut self, msg_type: MsgType, body: Vec<u8>) {
        let ep_set = self.parse_ctx.mgmt_ep_set.clone();
        self.set_cmd_msg(msg_type, ep_set, body);
    }

    pub(super) fn translate_create_database(&mut self, stmt: &mut CreateDatabaseStmt) -> Result<()> {
        // retention durations must decode before the request is built
        for val in stmt.options.retentions.iter_mut() {
            self.translate_value(val)?;
        }
        let req = CreateDbReq {
            db: self.full_db_name(&stmt.db_name),
            num_of_vgroups: stmt.options.num_of_vgroups,
            cache_block_size: stmt.options.cache_block_size,
            total_blocks: stmt.options.num_of_blocks,
            days_per_file: stmt.options.days_per_file,
            days_to_keep0: stmt.options.keep,
            days_to_keep1: -1,
            days_to_keep2: -1,
            min_rows: stmt.options.min_rows,
            max_rows: stmt.options.max_rows,
            commit_time: -1,
            fsync_period: stmt.options.fsync_period,
            wal_level: stmt.options.wal_level,
            precision: stmt.options.precision,
            compression: stmt.options.compression,
            replications: stmt.options.replica,
            quorum: stmt.options.quorum,
            update: -1,
            cache_last_row: stmt.options.cache_last_row,
            ignore_exist: stmt.ignore_exists,
            stream_mode: stmt.options.stream_mode,
            retentions: build_retentions(&stmt.options.retentions)?,
        };
        let body = serialize_req(&req)?;
        self.set_mgmt_cmd(MsgType::MndCreateDb, body);
        Ok(())
    }

    pub(super) fn translate_alter_database(&mut self, stmt: &mut AlterDatabaseStmt) -> Result<()> {
        let req = AlterDbReq {
            db: self.full_db_name(&stmt.db_name),
            total_blocks: stmt.options.num_of_blocks,
            days_to_keep0: stmt.options.keep,
            days_to_keep1: -1,
            days_to_keep2: -1,
            fsync_period: stmt.options.fsync_period,
            wal_level: stmt.options.wal_level,
            quorum: stmt.options.quorum,
            cache_last_row: stmt.options.cache_last_row,
        };
        let body = serialize_req(&req)?;
        self.set_mgmt_cmd(MsgType::MndAlterDb, body);
        Ok(())
    }

    pub(super) fn translate_drop_database(&mut self, stmt: &mut DropDatabaseStmt) -> Result<()> {
        let req = DropDbReq {
            db: self.full_db_name(&stmt.db_name),
            ignore_not_exists: stmt.ignore_not_exists,
        };
        let body = serialize_req(&req)?;
        self.set_mgmt_cmd(MsgType::MndDropDb, body);
        Ok(())
    }

    pub(super) fn translate_use_database(&mut self, stmt: &mut UseDatabaseStmt) -> Result<()> {
        let full_db_name = self.full_db_name(&stmt.db_name);
        let version = self.get_db_vg_version(&full_db_name)?;
        let req = UseDbReq {
            db: full_db_name,
            vg_version: version.version,
            db_id: version.db_id,
            num_of_table: version.table_count,
        };
        let body = serialize_req(&req)?;
        self.set_mgmt_cmd(MsgType::MndUseDb, body);
        Ok(())
    }

    fn check_create_table(&self, stmt: &mut CreateTableStmt) -> Result<()> {
        let CreateTableStmt {
            columns, options, ..
        } = stmt;
        for sma_col in options.sma.iter_mut() {
            let def = columns
                .iter()
                .find(|c| c.name == sma_col.col_name)
                .ok_or_else(|| TranslateError::InvalidColumn(sma_col.col_name.clone()))?;
            sma_col.res_type = def.data_type;
        }
        if let Some(func) = options.rollup_funcs.first_mut() {
            let (func_id, _) = self.func_mgr.get_func_info(&func.name)?;
            func.func_id = func_id;
        }
        Ok(())
    }

    pub(super) fn translate_create_super_table(&mut self, stmt: &mut CreateTableStmt) -> Result<()> {
        self.check_create_table(stmt)?;
        let req = CreateStbReq {
            name: self
                .table_name(&stmt.db_name, &stmt.table_name)
                .full_table_name(),
            ignore_exists: stmt.ignore_exists,
            aggregation_method: stmt
                .options
                .rollup_funcs
                .first()
                .map(|f| f.func_id)
                .unwrap_or(-1),
            x_files_factor: stmt.options.files_factor,
            delay: stmt.options.delay,
            columns: column_defs_to_fields(&stmt.columns),
            tags: column_defs_to_fields(&stmt.tags),
            smas: column_nodes_to_fields(&stmt.options.sma),
        };
        let body = serialize_req(&req)?;
        self.set_mgmt_cmd(MsgType::MndCreateStb, body);
        Ok(())
    }

    fn lower_drop_super_table(&mut self, name: &TableName, ignore_not_exists: bool) -> Result<()> {
        let req = DropStbReq {
            name: name.full_table_name(),
            ignore_not_exists,
        };
        let body = serialize_req(&req)?;
        self.set_mgmt_cmd(MsgType::MndDropStb, body);
        Ok(())
    }

    pub(super) fn translate_drop_table(&mut self, stmt: &mut DropTableStmt) -> Result<()> {
        let Some(clause) = stmt.tables.first() else {
            return Ok(());
        };
        let name = self.table_name(&clause.db_name, &clause.table_name);
        let ignore_not_exists = clause.ignore_not_exists;
        let meta = self.get_table_meta(&name)?;
        if meta.table_type == TableType::Super {
            self.lower_drop_super_table(&name, ignore_not_exists)
        } else {
            Err(TranslateError::Unsupported(
                "dropping a normal or child table".into(),
            ))
        }
    }

    pub(super) fn translate_drop_super_table(&mut self, stmt: &mut DropSuperTableStmt) -> Result<()> {
        let name = self.table_name(&stmt.db_name, &stmt.table_name);
        self.lower_drop_super_table(&name, stmt.ignore_not_exists)
    }

    pub(super) fn translate_alter_table(&mut self, stmt: &mut AlterTableStmt) -> Result<()> {
        let req = AlterTbReq {
            name: self
                .table_name(&stmt.db_name, &stmt.table_name)
                .full_table_name(),
            alter_type: stmt.alter_type,
            fields: alter_table_fields(stmt),
        };
        let body = serialize_req(&req)?;
        self.set_mgmt_cmd(MsgType::MndAlterStb, body);
        Ok(())
    }

    pub(super) fn translate_create_user(&mut self, stmt: &mut CreateUserStmt) -> Result<()> {
        let req = CreateUserReq {
            user: stmt.user_name.clone(),
            create_type: 0,
            super_user: 0,
            pass: stmt.password.clone(),
        };
        let body = serialize_req(&req)?;
        self.set_mgmt_cmd(MsgType::MndCreateUser, body);
        Ok(())
    }

    pub(super) fn translate_alter_user(&mut self, stmt: &mut AlterUserStmt) -> Result<()> {
        let req = AlterUserReq {
            user: stmt.user_name.clone(),
            alter_type: stmt.alter_type,
            super_user: 0,
            pass: stmt.password.clone(),
            db_name: self.parse_ctx.db.clone(),
        };
        let body = serialize_req(&req)?;
        self.set_mgmt_cmd(MsgType::MndAlterUser, body);
        Ok(())
    }

    pub(super) fn translate_drop_user(&mut self, stmt: &mut DropUserStmt) -> Result<()> {
        let req = DropUserReq {
            user: stmt.user_name.clone(),
        };
        let body = serialize_req(&req)?;
        self.set_mgmt_cmd(MsgType::MndDropUser, body);
        Ok(())
    }

    pub(super) fn translate_create_dnode(&mut self, stmt: &mut CreateDnodeStmt) -> Result<()> {
        let req = CreateDnodeReq {
            fqdn: stmt.fqdn.clone(),
            port: stmt.port,
        };
        let body = serialize_req(&req)?;
        self.set_mgmt_cmd(MsgType::MndCreateDnode, body);
        Ok(())
    }

    pub(super) fn translate_drop_dnode(&mut self, stmt: &mut DropDnodeStmt) -> Result<()> {
        let req = DropDnodeReq {
            dnode_id: stmt.dnode_id,
            fqdn: stmt.fqdn.clone(),
            port: stmt.port,
        };
        let body = serialize_req(&req)?;
        self.set_mgmt_cmd(MsgType::MndDropDnode, body);
        Ok(())
    }

    pub(super) fn translate_alter_dnode(&mut self, stmt: &mut AlterDnodeStmt) -> Result<()> {
        let req = CfgDnodeReq {
            dnode_id: stmt.dnode_id,
            config: stmt.config.clone(),
            value: stmt.value.clone(),
        };
        let body = serialize_req(&req)?;
        self.set_mgmt_cmd(MsgType::MndConfigDnode, body);
        Ok(())
    }

    pub(super) fn translate_create_qnode(&mut self, stmt: &mut CreateQnodeStmt) -> Result<()> {
        let req = QnodeReq {
            dnode_id: stmt.dnode_id,
        };
        let body = serialize_req(&req)?;
        self.set_mgmt_cmd(MsgType::DndCreateQnode, body);
        Ok(())
    }

    pub(super) fn translate_drop_qnode(&mut self, stmt: &mut DropQnodeStmt) -> Result<()> {
        let req = QnodeReq {
            dnode_id: stmt.dnode_id,
        };
        let body = serialize_req(&req)?;
        self.set_mgmt_cmd(MsgType::DndDropQnode, body);
        Ok(())
    }

    pub(super) fn translate_create_index(&mut self, stmt: &mut CreateIndexStmt) -> Result<()> {
        if stmt.index_type != IndexType::Sma {
            return Err(TranslateError::Unsupported("full-text index".into()));
        }
        self.translate_value(&mut stmt.options.interval)?;
        if let Some(offset) = stmt.options.offset.as_mut() {
            self.translate_value(offset)?;
        }
        if let Some(sliding) = stmt.options.sliding.as_mut() {
            self.translate_value(sliding)?;
        }
        let req = self.build_create_sma_req(stmt)?;
        let body = serialize_req(&req)?;
        self.set_mgmt_cmd(MsgType::MndCreateSma, body);
        Ok(())
    }

    fn build_create_sma_req(&mut self, stmt: &CreateIndexStmt) -> Result<CreateSmaReq> {
        let index_name = self
            .table_name(&self.parse_ctx.db, &stmt.index_name)
            .full_table_name();
        let table_name = self.table_name(&self.parse_ctx.db, &stmt.table_name);
        let stb = table_name.full_table_name();

        let (interval, interval_unit) = duration_parts(&stmt.options.interval)?;
        let offset = stmt
            .options
            .offset
            .as_ref()
            .map(|v| duration_parts(v).map(|(value, _)| value))
            .transpose()?
            .unwrap_or(0);
        let (sliding, sliding_unit) = match stmt.options.sliding.as_ref() {
            Some(v) => duration_parts(v)?,
            None => (interval, interval_unit),
        };

        let dst_vg_id = self.get_table_hash_vgroup(&table_name)?.vg_id;
        let expr = serialize_ast(&stmt.options.funcs)?;
        let ast = self.build_sma_ast(stmt)?;

        Ok(CreateSmaReq {
            name: index_name,
            stb,
            ignore_exists: stmt.ignore_exists,
            interval,
            interval_unit,
            offset,
            sliding,
            sliding_unit,
            dst_vg_id,
            sql: self.parse_ctx.sql.clone(),
            expr,
            ast,
        })
    }

    /// Synthesizes `SELECT <funcs> FROM <table> INTERVAL(...)`, translates
    /// it, and serializes the result as the index's ast payload.
    fn build_sma_ast(&mut self, stmt: &CreateIndexStmt) -> Result<String> {
        let table = RealTable::new(self.parse_ctx.db.clone(), stmt.table_name.clone());
        let mut select = SelectStmt::from_table(TableRef::Real(table));
        select.projections = stmt
            .options
            .funcs
            .iter()
            .enumerate()
            .map(|(idx, func)| {
                let mut expr = ExprNode::Function(func.clone());
                expr.set_alias(format!("#sma_{idx}"));
                expr
            })
            .collect();
        let ts_col = ColumnNode {
            col_id: PRIMARY_TS_COL_ID,
            col_name: PRIMARY_TS_INTERNAL_NAME.to_string(),
            ..ColumnNode::default()
        };
        select.window = Some(WindowClause::Interval(IntervalWindow {
            ts_col,
            interval: stmt.options.interval.clone(),
            offset: stmt.options.offset.clone(),
            sliding: stmt.options.sliding.clone(),
        }));
        self.translate_select(&mut select)?;
        serialize_ast(&select)
    }

    pub(super) fn translate_drop_index(&mut self, stmt: &mut DropIndexStmt) -> Result<()> {
        let req = DropSmaReq {
            index_name: stmt.index_name.clone(),
        };
        let body = serialize_req(&req)?;
        self.set_mgmt_cmd(MsgType::VndDropSma, body);
        Ok(())
    }

    pub(super) fn translate_create_topic(&mut self, stmt: &mut CreateTopicStmt) -> Result<()> {
        let ast = match stmt.query.as_mut() {
            Some(query) => {
                // topic-backing queries skip vgroup-list population
                self.topic_query = true;
                self.translate_stmt(query)?;
                Some(serialize_ast(query.as_ref())?)
            }
            None => None,
        };
        let req = CreateTopicReq {
            name: self
                .table_name(&self.parse_ctx.db, &stmt.topic_name)
                .full_table_name(),
            sql: self.parse_ctx.sql.clone(),
            ast,
            subscribe_db_name: stmt.subscribe_db_name.clone(),
            ignore_exists: stmt.ignore_exists,
        };
        let body = serialize_req(&req)?;
        self.set_mgmt_cmd(MsgType::MndCreateTopic, body);
        Ok(())
    }

    pub(super) fn translate_drop_topic(&mut self, stmt: &mut DropTopicStmt) -> Result<()> {
        let req = DropTopicReq {
            name: self
                .table_name(&self.parse_ctx.db, &stmt.topic_name)
                .full_table_name(),
            ignore_not_exists: stmt.ignore_not_exists,
        };
        let body = serialize_req(&req)?;
        self.set_mgmt_cmd(MsgType::MndDropTopic, body);
        Ok(())
    }

    pub(super) fn translate_alter_local(&mut self, _stmt: &mut AlterLocalStmt) -> Result<()> {
        // applied client-side; nothing to dispatch
        Ok(())
    }

    /// Legacy lowering for SHOW statements the rewriter did not intercept.
    pub(super) fn translate_show(&mut self, stmt: &mut ShowStmt) -> Result<()> {
        let req = ShowReq {
            kind: stmt.kind,
            db: String::new(),
        };
        let body = serialize_req(&req)?;
        self.set_mgmt_cmd(MsgType::MndShow, body);
        Ok(())
    }

    /// Legacy SHOW TABLES lowering: routed to the first vgroup of the
    /// current database, carrying the full vgroup list as an extension.
    pub(super) fn translate_show_tables(&mut self) -> Result<()> {
        let full_db_name = self.full_db_name(&self.parse_ctx.db);
        let vgroups = self.get_db_vg_info(&full_db_name)?;
        let first = vgroups.first().ok_or_else(|| TranslateError::Catalog {
            name: full_db_name.clone(),
            message: "database has no vgroups".into(),
        })?;
        let req = VShowTablesReq {
            vg_id: first.vg_id,
        };
        let body = serialize_req(&req)?;
        let mut msg = CmdMsg::new(first.ep_set.clone(), MsgType::VndShowTables, body);
        msg.extension = Some(vgroups.clone());
        self.cmd_msg = Some(msg);
        Ok(())
    }
}

/// Wire width of a declared type: variable-length kinds carry their
/// length-prefix header, nchar is 4 bytes per character.
fn calc_type_bytes(dt: DataType) -> u32 {
    match dt.kind {
        TypeKind::Varchar | TypeKind::VarBinary => dt.bytes + 2,
        TypeKind::NChar => dt.bytes * 4 + 2,
        _ => dt.bytes,
    }
}

fn column_defs_to_fields(defs: &[ColumnDef]) -> Vec<FieldSchema> {
    defs.iter()
        .map(|def| FieldSchema {
            name: def.name.clone(),
            kind: def.data_type.kind,
            bytes: calc_type_bytes(def.data_type),
        })
        .collect()
}

fn column_nodes_to_fields(cols: &[ColumnNode]) -> Vec<FieldSchema> {
    cols.iter()
        .map(|col| FieldSchema {
            name: col.col_name.clone(),
            kind: col.res_type.kind,
            bytes: calc_type_bytes(col.res_type),
        })
        .collect()
}

fn alter_table_fields(stmt: &AlterTableStmt) -> Vec<FieldSchema> {
    match stmt.alter_type {
        AlterTableType::AddTag
        | AlterTableType::DropTag
        | AlterTableType::AddColumn
        | AlterTableType::DropColumn
        | AlterTableType::UpdateColumnBytes
        | AlterTableType::UpdateTagBytes => vec![FieldSchema {
            name: stmt.col_name.clone(),
            kind: stmt.data_type.kind,
            bytes: stmt.data_type.bytes,
        }],
        AlterTableType::UpdateTagName | AlterTableType::UpdateColumnName => vec![
            FieldSchema {
                name: stmt.col_name.clone(),
                kind: TypeKind::Null,
                bytes: 0,
            },
            FieldSchema {
                name: stmt.new_col_name.clone(),
                kind: TypeKind::Null,
                bytes: 0,
            },
        ],
        _ => Vec::new(),
    }
}

/// Pulls `(ticks, unit)` out of a translated duration value.
fn duration_parts(val: &ValueNode) -> Result<(i64, crate::ast::DurationUnit)> {
    let Datum::Int(ticks) = val.datum else {
        return Err(TranslateError::WrongValueType(val.literal.clone()));
    };
    let unit = val
        .unit
        .ok_or_else(|| TranslateError::WrongValueType(val.literal.clone()))?;
    Ok((ticks, unit))
}

fn build_retentions(values: &[ValueNode]) -> Result<Vec<Retention>> {
    let mut retentions = Vec::with_capacity(values.len() / 2);
    for pair in values.chunks_exact(2) {
        let (freq, freq_unit) = duration_parts(&pair[0])?;
        let (keep, keep_unit) = duration_parts(&pair[1])?;
        retentions.push(Retention {
            freq,
            freq_unit,
            keep,
            keep_unit,
        });
    }
    Ok(retentions)
}
