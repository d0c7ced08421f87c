//! The pre-translation rewriter.
//!
//! Three statement kinds are rewritten before the main pass sees them:
//! SHOW statements become selects over the information schema, a non-super
//! CREATE TABLE becomes a single-vgroup vnode modification, and CREATE
//! MULTI TABLE fans its sub-table creations out into one data block per
//! destination vgroup.

use indexmap::IndexMap;

use crate::ast::{
    ColumnNode, CreateSubTableClause, ExprNode, LogicCondNode, OperatorNode, OperatorType, Query,
    RealTable, SelectStmt, ShowKind, ShowStmt, Stmt, TableRef, ValueNode, VnodeModifStmt,
};
use crate::catalog::{info_schema, TableMeta};
use crate::error::{Result, TranslateError};
use crate::msg::{
    build_vg_data_block, CreateTbBody, KvRow, VCreateTbBatchReq, VCreateTbReq, WireColumn,
};
use crate::types::VgroupInfo;

use super::Translator;

impl<'a> Translator<'a> {
    /// Rewrites the query root where required; most statements pass through
    /// untouched.
    pub(crate) fn rewrite_query(&mut self, query: &mut Query) -> Result<()> {
        match &query.root {
            Stmt::Show(_) => self.rewrite_show(query),
            Stmt::CreateTable(stmt) if stmt.tags.is_empty() => self.rewrite_create_table(query),
            Stmt::CreateMultiTable(_) => self.rewrite_create_multi_table(query),
            // ALTER TABLE ... SET TAG is reserved for a data-plane rewrite;
            // it currently flows through the management lowering
            _ => Ok(()),
        }
    }

    /// `SHOW X` becomes `SELECT * FROM information_schema.<table>` with a
    /// synthesized WHERE over `db_name` and the table-name pattern.
    fn rewrite_show(&mut self, query: &mut Query) -> Result<()> {
        let Stmt::Show(show) = &query.root else {
            return Ok(());
        };
        let select = build_select_for_show(show);
        query.show_rewrite = true;
        query.root = Stmt::Select(Box::new(select));
        Ok(())
    }

    /// A normal-table CREATE TABLE hash-routes to one vgroup and becomes a
    /// vnode modification carrying a single-entry batch.
    fn rewrite_create_table(&mut self, query: &mut Query) -> Result<()> {
        let Stmt::CreateTable(stmt) = &query.root else {
            return Ok(());
        };
        let name = self.table_name(&stmt.db_name, &stmt.table_name);
        let db_fname = name.full_db_name();
        let table_name = stmt.table_name.clone();
        let schema: Vec<WireColumn> = stmt
            .columns
            .iter()
            .enumerate()
            .map(|(idx, def)| WireColumn {
                col_id: idx as i16 + 1,
                name: def.name.clone(),
                kind: def.data_type.kind,
                bytes: def.data_type.bytes,
            })
            .collect();

        let vgroup = self.get_table_hash_vgroup(&name)?;
        let batch = VCreateTbBatchReq {
            tables: vec![VCreateTbReq {
                db_fname,
                name: table_name,
                body: CreateTbBody::Normal { schema },
            }],
        };
        let block = build_vg_data_block(&vgroup, &batch)?;
        query.root = Stmt::VnodeModif(VnodeModifStmt {
            data_blocks: vec![block],
        });
        Ok(())
    }

    /// Groups sub-table creations by destination vgroup, then serializes one
    /// data block per vgroup.
    fn rewrite_create_multi_table(&mut self, query: &mut Query) -> Result<()> {
        let Stmt::CreateMultiTable(stmt) = &query.root else {
            return Ok(());
        };
        let sub_tables = stmt.sub_tables.clone();

        let mut batches: IndexMap<i32, (VgroupInfo, VCreateTbBatchReq)> = IndexMap::new();
        for clause in &sub_tables {
            self.rewrite_create_sub_table(clause, &mut batches)?;
        }

        let data_blocks = batches
            .values()
            .map(|(vgroup, batch)| build_vg_data_block(vgroup, batch))
            .collect::<Result<Vec<_>>>()?;
        query.root = Stmt::VnodeModif(VnodeModifStmt { data_blocks });
        Ok(())
    }

    fn rewrite_create_sub_table(
        &mut self,
        clause: &CreateSubTableClause,
        batches: &mut IndexMap<i32, (VgroupInfo, VCreateTbBatchReq)>,
    ) -> Result<()> {
        let super_name = self.table_name(&clause.use_db_name, &clause.use_table_name);
        let super_meta = self.get_table_meta(&super_name)?;

        let mut row = KvRow::default();
        if !clause.specific_tags.is_empty() {
            self.build_kv_row_for_bound_tags(clause, &super_meta, &mut row)?;
        } else {
            self.build_kv_row_for_all_tags(clause, &super_meta, &mut row)?;
        }
        row.sort_by_col_id();

        let child_name = self.table_name(&clause.db_name, &clause.table_name);
        let vgroup = self.get_table_hash_vgroup(&child_name)?;
        let req = VCreateTbReq {
            db_fname: child_name.full_db_name(),
            name: clause.table_name.clone(),
            body: CreateTbBody::Child {
                suid: super_meta.uid,
                tags: row,
            },
        };
        batches
            .entry(vgroup.vg_id)
            .or_insert_with(|| (vgroup.clone(), VCreateTbBatchReq::default()))
            .1
            .tables
            .push(req);
        Ok(())
    }

    /// Tags bound by name: every named tag must exist in the super table's
    /// tag schema, and the value count must match the name count.
    fn build_kv_row_for_bound_tags(
        &mut self,
        clause: &CreateSubTableClause,
        super_meta: &TableMeta,
        row: &mut KvRow,
    ) -> Result<()> {
        if clause.tag_values.len() != clause.specific_tags.len()
            || super_meta.tags.len() < clause.tag_values.len()
        {
            return Err(TranslateError::TagsNotMatched);
        }
        for (tag_col, value) in clause.specific_tags.iter().zip(clause.tag_values.iter()) {
            let schema = super_meta
                .tags
                .iter()
                .find(|t| t.name == tag_col.col_name)
                .ok_or_else(|| TranslateError::InvalidTagName(tag_col.col_name.clone()))?;
            self.add_value_to_kv_row(value, schema, row)?;
        }
        Ok(())
    }

    /// Positional tags: the value count must equal the tag count.
    fn build_kv_row_for_all_tags(
        &mut self,
        clause: &CreateSubTableClause,
        super_meta: &TableMeta,
        row: &mut KvRow,
    ) -> Result<()> {
        if clause.tag_values.len() != super_meta.tags.len() {
            return Err(TranslateError::TagsNotMatched);
        }
        for (value, schema) in clause.tag_values.iter().zip(super_meta.tags.iter()) {
            self.add_value_to_kv_row(value, schema, row)?;
        }
        Ok(())
    }

    fn add_value_to_kv_row(
        &mut self,
        value: &ValueNode,
        schema: &crate::catalog::ColumnSchema,
        row: &mut KvRow,
    ) -> Result<()> {
        let mut value = value.clone();
        // the literal parses under the tag column's declared type
        value.res_type = schema.data_type;
        self.translate_value(&mut value)?;
        row.push(schema.col_id, schema.data_type.kind, value.datum);
        Ok(())
    }
}

fn sys_table_name(kind: ShowKind) -> &'static str {
    match kind {
        ShowKind::Databases => info_schema::USER_DATABASES,
        ShowKind::Tables => info_schema::USER_TABLES,
        ShowKind::Stables => info_schema::USER_STABLES,
        ShowKind::Users => info_schema::USER_USERS,
        ShowKind::Dnodes => info_schema::DNODES,
        ShowKind::Vgroups => info_schema::VGROUPS,
        ShowKind::Mnodes => info_schema::MNODES,
        ShowKind::Modules => info_schema::MODULES,
        ShowKind::Qnodes => info_schema::QNODES,
        ShowKind::Functions => info_schema::USER_FUNCTIONS,
        ShowKind::Indexes => info_schema::USER_INDEXES,
        ShowKind::Streams => info_schema::USER_STREAMS,
    }
}

fn tb_name_col(kind: ShowKind) -> &'static str {
    if kind == ShowKind::Stables {
        "stable_name"
    } else {
        "table_name"
    }
}

fn condition_op(op: OperatorType, col_name: &str, value: &ValueNode) -> ExprNode {
    ExprNode::Operator(OperatorNode::binary(
        op,
        ExprNode::Column(ColumnNode::named(col_name)),
        ExprNode::Value(value.clone()),
    ))
}

fn build_select_for_show(show: &ShowStmt) -> SelectStmt {
    let mut table = RealTable::new(info_schema::DB_NAME, sys_table_name(show.kind));
    if let Some(db) = show.db_name.as_ref() {
        // the database filter also steers the vgroup lookup of the tables
        // catalog; the reference itself stays unqualified
        table.use_db_name = db.literal.clone();
    }
    let mut select = SelectStmt::from_table(TableRef::Real(table));

    let db_cond = show
        .db_name
        .as_ref()
        .map(|db| condition_op(OperatorType::Eq, "db_name", db));
    let tb_cond = show
        .tb_name_pattern
        .as_ref()
        .map(|pattern| condition_op(OperatorType::Like, tb_name_col(show.kind), pattern));
    select.where_clause = match (db_cond, tb_cond) {
        (Some(db), Some(tb)) => Some(ExprNode::LogicCond(LogicCondNode::and(vec![db, tb]))),
        (Some(db), None) => Some(db),
        (None, Some(tb)) => Some(tb),
        (None, None) => None,
    };
    select
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DataType, TypeKind};

    fn varchar_value(text: &str) -> ValueNode {
        ValueNode::new(
            text,
            DataType::var_len(TypeKind::Varchar, text.len() as u32),
        )
    }

    #[test]
    fn show_stables_filters_on_stable_name() {
        let show = ShowStmt {
            kind: ShowKind::Stables,
            db_name: None,
            tb_name_pattern: Some(varchar_value("x%")),
        };
        let select = build_select_for_show(&show);
        let TableRef::Real(table) = &select.from else {
            panic!("expected a real table");
        };
        assert_eq!(table.db_name, info_schema::DB_NAME);
        assert_eq!(table.table_name, info_schema::USER_STABLES);
        let Some(ExprNode::Operator(op)) = &select.where_clause else {
            panic!("expected a LIKE condition");
        };
        assert_eq!(op.op, OperatorType::Like);
        let ExprNode::Column(col) = op.left.as_ref() else {
            panic!("expected a column operand");
        };
        assert_eq!(col.col_name, "stable_name");
    }

    #[test]
    fn show_with_db_and_pattern_builds_conjunction() {
        let show = ShowStmt {
            kind: ShowKind::Tables,
            db_name: Some(varchar_value("d1")),
            tb_name_pattern: Some(varchar_value("t%")),
        };
        let select = build_select_for_show(&show);
        let Some(ExprNode::LogicCond(cond)) = &select.where_clause else {
            panic!("expected a conjunction");
        };
        assert_eq!(cond.params.len(), 2);
        let TableRef::Real(table) = &select.from else {
            panic!("expected a real table");
        };
        assert_eq!(table.use_db_name, "d1");
    }
}
