//! Expression translation: a post-order walk that resolves columns, parses
//! literals into typed datums, and types operators and function calls.

use crate::ast::{ColumnNode, Datum, ExprNode, FunctionNode, OperatorNode, ValueNode};
use crate::error::{Result, TranslateError};
use crate::time::{parse_duration, parse_timestamp};
use crate::types::{DataType, TypeKind};

use super::context::{Clause, ColumnBinding};
use super::Translator;

impl<'a> Translator<'a> {
    /// Translates one expression tree bottom-up.
    pub(super) fn translate_expr(&mut self, expr: &mut ExprNode) -> Result<()> {
        match expr {
            ExprNode::Column(col) => self.translate_column(col),
            ExprNode::Value(val) => self.translate_value(val),
            ExprNode::Operator(op) => {
                self.translate_expr(&mut op.left)?;
                if let Some(right) = op.right.as_mut() {
                    self.translate_expr(right)?;
                }
                self.translate_operator(op)
            }
            ExprNode::Function(func) => {
                for param in &mut func.params {
                    self.translate_expr(param)?;
                }
                self.translate_function(func)
            }
            ExprNode::LogicCond(cond) => {
                for param in &mut cond.params {
                    self.translate_expr(param)?;
                }
                cond.res_type = DataType::bool_type();
                Ok(())
            }
            ExprNode::GroupingSet(set) => {
                for param in &mut set.params {
                    self.translate_expr(param)?;
                }
                Ok(())
            }
            ExprNode::Subquery(sub) => {
                self.translate_subquery(&mut sub.select)?;
                // the containing expression sees the subquery's output row type
                sub.res_type = sub
                    .select
                    .projections
                    .first()
                    .map(|p| p.res_type())
                    .unwrap_or_default();
                Ok(())
            }
        }
    }

    pub(super) fn translate_expr_list(&mut self, exprs: &mut [ExprNode]) -> Result<()> {
        exprs.iter_mut().try_for_each(|e| self.translate_expr(e))
    }

    /// Resolves a column reference against the current namespace level.
    pub(super) fn translate_column(&mut self, col: &mut ColumnNode) -> Result<()> {
        // count(*)/first(*)/last(*)
        if col.col_name == "*" {
            return Ok(());
        }
        if !col.table_alias.is_empty() {
            return self.translate_column_with_prefix(col);
        }
        // a bare name may bind to a projection alias, but only in ORDER BY
        if self.curr_clause == Clause::OrderBy && self.translate_column_use_alias(col) {
            return Ok(());
        }
        self.translate_column_without_prefix(col)
    }

    fn translate_column_with_prefix(&mut self, col: &mut ColumnNode) -> Result<()> {
        let current_db = &self.parse_ctx.db;
        let owner = self
            .current_level_tables()
            .iter()
            .find(|t| t.owns_prefix(current_db, &col.db_name, &col.table_alias));
        match owner {
            Some(table) => match table.find_column(&col.col_name, col.col_id) {
                Some(binding) => {
                    apply_binding(col, binding);
                    Ok(())
                }
                None => Err(TranslateError::InvalidColumn(col.col_name.clone())),
            },
            None => Err(TranslateError::TableNotExist(col.table_alias.clone())),
        }
    }

    fn translate_column_without_prefix(&mut self, col: &mut ColumnNode) -> Result<()> {
        let mut found: Option<ColumnBinding> = None;
        for table in self.current_level_tables() {
            if let Some(binding) = table.find_column(&col.col_name, col.col_id) {
                if found.is_some() {
                    return Err(TranslateError::AmbiguousColumn(col.col_name.clone()));
                }
                found = Some(binding);
            }
        }
        match found {
            Some(binding) => {
                apply_binding(col, binding);
                Ok(())
            }
            None => Err(TranslateError::InvalidColumn(col.col_name.clone())),
        }
    }

    /// Tries to bind a bare ORDER BY column to a projection alias of the
    /// current select.
    fn translate_column_use_alias(&mut self, col: &mut ColumnNode) -> bool {
        let Some(scope) = self.curr_select.as_ref() else {
            return false;
        };
        let Some(idx) = scope.fields.iter().position(|f| f.alias == col.col_name) else {
            return false;
        };
        col.res_type = scope.fields[idx].res_type;
        col.proj_ref = Some(idx);
        if col.alias.is_empty() {
            col.alias = col.col_name.clone();
        }
        true
    }

    /// Parses the literal into a typed datum according to the declared
    /// result type. Idempotent; `translated` never regresses.
    pub(super) fn translate_value(&self, val: &mut ValueNode) -> Result<()> {
        if val.is_duration {
            let (ticks, unit) = parse_duration(&val.literal, val.res_type.precision)
                .map_err(|_| TranslateError::WrongValueType(val.literal.clone()))?;
            val.datum = Datum::Int(ticks);
            val.unit = Some(unit);
            val.translated = true;
            return Ok(());
        }
        let kind = val.res_type.kind;
        match kind {
            TypeKind::Null => {
                val.datum = Datum::Null;
            }
            TypeKind::Bool => {
                val.datum = Datum::Bool(val.literal.eq_ignore_ascii_case("true"));
            }
            k if k.is_signed_int() => {
                let parsed: i64 = val
                    .literal
                    .trim()
                    .parse()
                    .map_err(|_| TranslateError::WrongValueType(val.literal.clone()))?;
                val.datum = Datum::Int(parsed);
            }
            k if k.is_unsigned_int() => {
                let parsed: u64 = val
                    .literal
                    .trim()
                    .parse()
                    .map_err(|_| TranslateError::WrongValueType(val.literal.clone()))?;
                val.datum = Datum::UInt(parsed);
            }
            k if k.is_float() => {
                let parsed: f64 = val
                    .literal
                    .trim()
                    .parse()
                    .map_err(|_| TranslateError::WrongValueType(val.literal.clone()))?;
                val.datum = Datum::Double(parsed);
            }
            k if k.is_var_len() => {
                let capacity = val.res_type.bytes as usize;
                val.datum = Datum::Varchar(truncate_to_bytes(&val.literal, capacity));
            }
            TypeKind::Timestamp => {
                let ticks = parse_timestamp(&val.literal, val.res_type.precision)?;
                val.datum = Datum::Timestamp(ticks);
            }
            // json/decimal/blob literals are deferred
            _ => {}
        }
        val.translated = true;
        Ok(())
    }

    /// Types an operator application from the algebra: arithmetic yields
    /// DOUBLE, comparisons yield BOOL. JSON and BLOB operands are rejected
    /// for both families; other operators are left untyped.
    pub(super) fn translate_operator(&self, op: &mut OperatorNode) -> Result<()> {
        let ldt = op.left.res_type();
        let rdt = op
            .right
            .as_ref()
            .map(|r| r.res_type())
            .unwrap_or_default();
        if op.op.is_arithmetic() || op.op.is_comparison() {
            if matches!(ldt.kind, TypeKind::Json | TypeKind::Blob)
                || matches!(rdt.kind, TypeKind::Json | TypeKind::Blob)
            {
                let offending = op
                    .right
                    .as_ref()
                    .map(|r| r.alias().to_string())
                    .unwrap_or_else(|| op.left.alias().to_string());
                return Err(TranslateError::WrongValueType(offending));
            }
            op.res_type = if op.op.is_arithmetic() {
                DataType::double_type()
            } else {
                DataType::bool_type()
            };
        }
        Ok(())
    }

    /// Resolves a call through the function manager and derives its result
    /// type. An aggregate is illegal before HAVING.
    pub(super) fn translate_function(&self, func: &mut FunctionNode) -> Result<()> {
        let (func_id, _kind) = self.func_mgr.get_func_info(&func.name)?;
        func.func_id = func_id;
        func.res_type = self.func_mgr.result_type(func)?;
        if self.func_mgr.is_aggregate(func_id) && self.curr_clause < Clause::Having {
            return Err(TranslateError::IllegalUseOfAgg);
        }
        Ok(())
    }
}

fn apply_binding(col: &mut ColumnNode, binding: ColumnBinding) {
    col.db_name = binding.db_name;
    col.table_alias = binding.table_alias;
    col.table_name = binding.table_name;
    col.col_name = binding.col_name;
    col.table_id = binding.table_id;
    col.col_id = binding.col_id;
    col.role = binding.role;
    col.proj_ref = binding.proj_ref;
    col.res_type = binding.res_type;
    if col.alias.is_empty() {
        col.alias = col.col_name.clone();
    }
}

fn truncate_to_bytes(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    s[..end].to_string()
}
