//! FROM-clause resolution: fetching table metadata, computing vgroup lists
//! and registering tables in the namespace.

use std::sync::Arc;

use crate::ast::{ExprNode, RealTable, TableRef};
use crate::catalog::{info_schema, TableMeta, TableType};
use crate::error::{Result, TranslateError};
use crate::types::TableName;

use super::context::{ProjField, ScopeTable};
use super::Translator;

impl<'a> Translator<'a> {
    pub(super) fn translate_table(&mut self, table: &mut TableRef) -> Result<()> {
        match table {
            TableRef::Real(real) => {
                let name = self.table_name(&real.db_name, &real.table_name);
                let meta = self
                    .get_table_meta(&name)
                    .map_err(|_| TranslateError::TableNotExist(real.table_name.clone()))?;
                real.meta = Some(meta.clone());
                self.set_table_vgroup_list(&name, &meta, real)?;
                self.add_namespace(ScopeTable::Real {
                    db_name: real.db_name.clone(),
                    table_name: real.table_name.clone(),
                    alias: real.alias.clone(),
                    meta,
                });
                Ok(())
            }
            TableRef::Temp(temp) => {
                self.translate_subquery(&mut temp.subquery)?;
                let fields = snapshot_projections(&temp.subquery.projections);
                self.add_namespace(ScopeTable::Temp {
                    alias: temp.alias.clone(),
                    fields,
                });
                Ok(())
            }
            TableRef::Join(join) => {
                self.translate_table(&mut join.left)?;
                self.translate_table(&mut join.right)?;
                self.translate_expr(&mut join.on)
            }
        }
    }

    /// Populates the vgroup list a scan of this table fans out to.
    ///
    /// Suppressed entirely for topic-backing queries, whose subscription is
    /// routed later.
    fn set_table_vgroup_list(
        &mut self,
        name: &TableName,
        meta: &Arc<TableMeta>,
        real: &mut RealTable,
    ) -> Result<()> {
        if self.topic_query {
            return Ok(());
        }
        match meta.table_type {
            TableType::Super => {
                real.vgroups = self.get_table_dist_vg_info(name)?;
            }
            TableType::System => self.set_sys_table_vgroup_list(name, real)?,
            TableType::Normal | TableType::Child => {
                real.vgroups = vec![self.get_table_hash_vgroup(name)?];
            }
        }
        Ok(())
    }

    /// Only the tables catalog needs a vgroup list (it fans out per vgroup);
    /// other system tables are served by the management node directly. An
    /// explicit `use_db_name` overrides which database's vgroups are used.
    fn set_sys_table_vgroup_list(&mut self, name: &TableName, real: &mut RealTable) -> Result<()> {
        if real.table_name != info_schema::USER_TABLES {
            return Ok(());
        }
        let full_db_name = if real.use_db_name.is_empty() {
            name.full_db_name()
        } else {
            self.full_db_name(&real.use_db_name)
        };
        real.vgroups = self.get_db_vg_info(&full_db_name)?;
        Ok(())
    }
}

/// Snapshots a translated projection list into the fields a derived table
/// exposes to the enclosing scope.
pub(super) fn snapshot_projections(projections: &[ExprNode]) -> Vec<ProjField> {
    projections
        .iter()
        .map(|p| ProjField {
            alias: p.alias().to_string(),
            res_type: p.res_type(),
        })
        .collect()
}
