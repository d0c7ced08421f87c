//! Select translation: the fixed clause pipeline, star expansion, ORDER BY
//! position rewriting, the GROUP BY closure check and the aggregate/column
//! coexistence rule.

use crate::ast::{
    node_equal, ColumnNode, Datum, ExprNode, SelectStmt, ValueNode, WindowClause,
};
use crate::catalog::TableType;
use crate::error::{Result, TranslateError};

use super::context::{Clause, ScopeTable, SelectScope};
use super::table::snapshot_projections;
use super::Translator;

impl<'a> Translator<'a> {
    /// Clause order is fixed and observable through error precedence:
    /// FROM, WHERE, PARTITION BY, WINDOW, GROUP BY, HAVING, SELECT,
    /// ORDER BY, then the coexistence check.
    pub(super) fn translate_select(&mut self, select: &mut SelectStmt) -> Result<()> {
        self.curr_clause = Clause::From;
        self.translate_table(&mut select.from)?;
        self.curr_clause = Clause::Where;
        if let Some(cond) = select.where_clause.as_mut() {
            self.translate_expr(cond)?;
        }
        self.curr_clause = Clause::PartitionBy;
        self.translate_expr_list(&mut select.partition_by)?;
        self.translate_window(select.window.as_mut())?;
        self.curr_clause = Clause::GroupBy;
        self.translate_expr_list(&mut select.group_by)?;
        self.translate_having(select)?;
        self.translate_select_list(select)?;
        self.translate_order_by(select)?;
        self.check_agg_col_coexist(select)
    }

    fn translate_window(&mut self, window: Option<&mut WindowClause>) -> Result<()> {
        let Some(window) = window else {
            return Ok(());
        };
        self.curr_clause = Clause::Window;
        match window {
            WindowClause::Interval(iw) => {
                self.translate_column(&mut iw.ts_col)?;
                self.translate_value(&mut iw.interval)?;
                if let Some(offset) = iw.offset.as_mut() {
                    self.translate_value(offset)?;
                }
                if let Some(sliding) = iw.sliding.as_mut() {
                    self.translate_value(sliding)?;
                }
                if !matches!(iw.interval.datum, Datum::Int(v) if v > 0) {
                    return Err(TranslateError::IntervalValueTooSmall(
                        iw.interval.literal.clone(),
                    ));
                }
                Ok(())
            }
            WindowClause::Session(sw) => {
                self.translate_column(&mut sw.ts_col)?;
                self.translate_value(&mut sw.gap)
            }
            WindowClause::State(st) => self.translate_column(&mut st.col),
        }
    }

    fn translate_having(&mut self, select: &mut SelectStmt) -> Result<()> {
        if select.having.is_some() && select.group_by.is_empty() {
            return Err(TranslateError::GroupByLackExpression);
        }
        self.curr_clause = Clause::Having;
        if let Some(having) = select.having.as_mut() {
            self.translate_expr(having)?;
        }
        if let Some(having) = select.having.as_ref() {
            if !select.group_by.is_empty() {
                self.check_expr_for_group_by(having, &select.group_by, false)?;
            }
        }
        Ok(())
    }

    fn translate_select_list(&mut self, select: &mut SelectStmt) -> Result<()> {
        if select.projections.is_empty() {
            // SELECT * over every table at this level
            select.projections = self.expand_star();
        }
        self.curr_clause = Clause::Select;
        self.translate_expr_list(&mut select.projections)?;
        if !select.group_by.is_empty() {
            for expr in &select.projections {
                self.check_expr_for_group_by(expr, &select.group_by, false)?;
            }
        }
        Ok(())
    }

    /// Expands `SELECT *` over every table at the current level: all columns
    /// (plus tags for super tables) of each real table, the output aliases
    /// of each derived table.
    fn expand_star(&self) -> Vec<ExprNode> {
        let mut out = Vec::new();
        for table in self.current_level_tables() {
            match table {
                ScopeTable::Real {
                    db_name,
                    table_name,
                    alias,
                    meta,
                } => {
                    let tag_iter = if meta.table_type == TableType::Super {
                        meta.tags.as_slice()
                    } else {
                        &[]
                    };
                    for (schema, role) in meta
                        .columns
                        .iter()
                        .map(|s| (s, crate::catalog::ColumnRole::Column))
                        .chain(tag_iter.iter().map(|s| (s, crate::catalog::ColumnRole::Tag)))
                    {
                        out.push(ExprNode::Column(ColumnNode {
                            db_name: db_name.clone(),
                            table_alias: alias.clone(),
                            table_name: table_name.clone(),
                            col_name: schema.name.clone(),
                            table_id: meta.uid,
                            col_id: schema.col_id,
                            role,
                            proj_ref: None,
                            alias: schema.name.clone(),
                            res_type: schema.data_type,
                        }));
                    }
                }
                ScopeTable::Temp { alias, fields } => {
                    for (idx, field) in fields.iter().enumerate() {
                        out.push(ExprNode::Column(ColumnNode {
                            table_alias: alias.clone(),
                            col_name: field.alias.clone(),
                            proj_ref: Some(idx),
                            alias: field.alias.clone(),
                            res_type: field.res_type,
                            ..ColumnNode::default()
                        }));
                    }
                }
            }
        }
        out
    }

    fn translate_order_by(&mut self, select: &mut SelectStmt) -> Result<()> {
        let has_other = self.translate_order_by_position(select)?;
        if !has_other {
            return Ok(());
        }
        self.curr_clause = Clause::OrderBy;
        // alias lookup is enabled only here
        self.curr_select = Some(SelectScope {
            fields: snapshot_projections(&select.projections),
        });
        let mut order_by = std::mem::take(&mut select.order_by);
        let translated = order_by
            .iter_mut()
            .try_for_each(|item| self.translate_expr(&mut item.expr));
        select.order_by = order_by;
        translated?;

        let distinct_order_by = select.distinct;
        let keys: &[ExprNode] = if distinct_order_by {
            &select.projections
        } else {
            &select.group_by
        };
        if !keys.is_empty() {
            for item in &select.order_by {
                self.check_expr_for_group_by(&item.expr, keys, distinct_order_by)?;
            }
        }
        Ok(())
    }

    /// Rewrites numeric-literal ORDER BY keys to references into the
    /// projection list. Returns whether any non-literal key remains.
    ///
    /// Non-numeric literal types and negative positions drop their key
    /// silently; zero or a position past the projection count is an error.
    fn translate_order_by_position(&mut self, select: &mut SelectStmt) -> Result<bool> {
        let mut has_other = false;
        let mut kept = Vec::with_capacity(select.order_by.len());
        let order_by = std::mem::take(&mut select.order_by);
        for mut item in order_by {
            let ExprNode::Value(val) = &mut item.expr else {
                has_other = true;
                kept.push(item);
                continue;
            };
            let translated = self.translate_value(val);
            if let Err(e) = translated {
                select.order_by = kept;
                return Err(e);
            }
            let pos = position_value(val);
            if pos < 0 {
                continue;
            }
            if pos == 0 || pos as usize > select.projections.len() {
                select.order_by = kept;
                return Err(TranslateError::WrongNumberOfSelect);
            }
            let target = &select.projections[pos as usize - 1];
            item.expr = ExprNode::Column(ColumnNode {
                col_name: target.alias().to_string(),
                proj_ref: Some(pos as usize - 1),
                alias: target.alias().to_string(),
                res_type: target.res_type(),
                ..ColumnNode::default()
            });
            kept.push(item);
        }
        select.order_by = kept;
        Ok(has_other)
    }

    /// The GROUP BY closure: every subtree must be an alias-only column,
    /// equal to some grouping key, or contained in an aggregate call. In
    /// DISTINCT ORDER BY mode the keys are the projections and aggregates
    /// are no shelter.
    pub(super) fn check_expr_for_group_by(
        &self,
        expr: &ExprNode,
        keys: &[ExprNode],
        distinct_order_by: bool,
    ) -> Result<()> {
        if let ExprNode::Column(col) = expr {
            if col.is_alias_only() {
                return Ok(());
            }
        }
        if let ExprNode::Function(func) = expr {
            if self.func_mgr.is_aggregate(func.func_id) && !distinct_order_by {
                return Ok(());
            }
        }
        if keys.iter().any(|key| node_equal(group_key(key), expr)) {
            return Ok(());
        }
        match expr {
            ExprNode::Column(_) => Err(group_by_error(distinct_order_by)),
            ExprNode::Function(func) if self.func_mgr.is_aggregate(func.func_id) => {
                Err(group_by_error(distinct_order_by))
            }
            ExprNode::Operator(op) => {
                self.check_expr_for_group_by(&op.left, keys, distinct_order_by)?;
                if let Some(right) = op.right.as_ref() {
                    self.check_expr_for_group_by(right, keys, distinct_order_by)?;
                }
                Ok(())
            }
            ExprNode::Function(func) => func
                .params
                .iter()
                .try_for_each(|p| self.check_expr_for_group_by(p, keys, distinct_order_by)),
            ExprNode::LogicCond(cond) => cond
                .params
                .iter()
                .try_for_each(|p| self.check_expr_for_group_by(p, keys, distinct_order_by)),
            ExprNode::GroupingSet(set) => set
                .params
                .iter()
                .try_for_each(|p| self.check_expr_for_group_by(p, keys, distinct_order_by)),
            ExprNode::Value(_) | ExprNode::Subquery(_) => Ok(()),
        }
    }

    /// Without GROUP BY, projections and order keys may not mix bare
    /// columns with aggregate calls.
    fn check_agg_col_coexist(&self, select: &SelectStmt) -> Result<()> {
        if !select.group_by.is_empty() {
            return Ok(());
        }
        let mut has_agg = false;
        let mut has_col = false;
        for expr in &select.projections {
            self.scan_agg_col(expr, &mut has_agg, &mut has_col);
        }
        if !select.distinct {
            for item in &select.order_by {
                self.scan_agg_col(&item.expr, &mut has_agg, &mut has_col);
            }
        }
        if has_agg && has_col {
            return Err(TranslateError::NotSingleGroup);
        }
        Ok(())
    }

    fn scan_agg_col(&self, expr: &ExprNode, has_agg: &mut bool, has_col: &mut bool) {
        match expr {
            ExprNode::Function(func) if self.func_mgr.is_aggregate(func.func_id) => {
                *has_agg = true;
            }
            ExprNode::Column(_) => {
                *has_col = true;
            }
            ExprNode::Operator(op) => {
                self.scan_agg_col(&op.left, has_agg, has_col);
                if let Some(right) = op.right.as_ref() {
                    self.scan_agg_col(right, has_agg, has_col);
                }
            }
            ExprNode::Function(func) => {
                for param in &func.params {
                    self.scan_agg_col(param, has_agg, has_col);
                }
            }
            ExprNode::LogicCond(cond) => {
                for param in &cond.params {
                    self.scan_agg_col(param, has_agg, has_col);
                }
            }
            ExprNode::GroupingSet(set) => {
                for param in &set.params {
                    self.scan_agg_col(param, has_agg, has_col);
                }
            }
            ExprNode::Value(_) | ExprNode::Subquery(_) => {}
        }
    }
}

/// A grouping set matches through its first parameter.
fn group_key(key: &ExprNode) -> &ExprNode {
    match key {
        ExprNode::GroupingSet(set) => set.params.first().unwrap_or(key),
        _ => key,
    }
}

fn group_by_error(distinct_order_by: bool) -> TranslateError {
    if distinct_order_by {
        TranslateError::NotSelectedExpression
    } else {
        TranslateError::GroupByLackExpression
    }
}

/// Maps a translated literal to a 1-based projection position; negative
/// means "not a position".
fn position_value(val: &ValueNode) -> i64 {
    let kind = val.res_type.kind;
    if kind == crate::types::TypeKind::Bool {
        return match val.datum {
            Datum::Bool(true) => 1,
            _ => 0,
        };
    }
    if kind.is_signed_int() {
        if let Datum::Int(i) = val.datum {
            return i;
        }
    } else if kind.is_unsigned_int() {
        if let Datum::UInt(u) = val.datum {
            return u as i64;
        }
    } else if kind.is_float() {
        if let Datum::Double(d) = val.datum {
            return d as i64;
        }
    }
    -1
}
