//! The function-manager oracle.
//!
//! Resolves function names to `(id, kind)` pairs and derives call result
//! types. The registry is the closed set of builtins the engine executes;
//! name lookup is case-insensitive.

use std::collections::HashMap;

use crate::ast::FunctionNode;
use crate::error::{Result, TranslateError};
use crate::types::{DataType, TypeKind};

/// Execution class of a function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FuncKind {
    Aggregate,
    Scalar,
}

/// How a builtin derives its result type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResultRule {
    /// Always a signed 64-bit count.
    BigInt,
    /// Always a double.
    Double,
    /// Signed sums widen to BIGINT, unsigned to UBIGINT, floats to DOUBLE.
    SumWidening,
    /// The first argument's type passes through.
    FirstArg,
    /// Current-time producers.
    Timestamp,
}

struct FuncDef {
    name: &'static str,
    kind: FuncKind,
    rule: ResultRule,
}

const FUNC_DEFS: &[FuncDef] = &[
    FuncDef { name: "count", kind: FuncKind::Aggregate, rule: ResultRule::BigInt },
    FuncDef { name: "sum", kind: FuncKind::Aggregate, rule: ResultRule::SumWidening },
    FuncDef { name: "avg", kind: FuncKind::Aggregate, rule: ResultRule::Double },
    FuncDef { name: "min", kind: FuncKind::Aggregate, rule: ResultRule::FirstArg },
    FuncDef { name: "max", kind: FuncKind::Aggregate, rule: ResultRule::FirstArg },
    FuncDef { name: "stddev", kind: FuncKind::Aggregate, rule: ResultRule::Double },
    FuncDef { name: "percentile", kind: FuncKind::Aggregate, rule: ResultRule::Double },
    FuncDef { name: "apercentile", kind: FuncKind::Aggregate, rule: ResultRule::Double },
    FuncDef { name: "top", kind: FuncKind::Aggregate, rule: ResultRule::FirstArg },
    FuncDef { name: "bottom", kind: FuncKind::Aggregate, rule: ResultRule::FirstArg },
    FuncDef { name: "spread", kind: FuncKind::Aggregate, rule: ResultRule::Double },
    FuncDef { name: "twa", kind: FuncKind::Aggregate, rule: ResultRule::Double },
    FuncDef { name: "irate", kind: FuncKind::Aggregate, rule: ResultRule::Double },
    FuncDef { name: "first", kind: FuncKind::Aggregate, rule: ResultRule::FirstArg },
    FuncDef { name: "last", kind: FuncKind::Aggregate, rule: ResultRule::FirstArg },
    FuncDef { name: "last_row", kind: FuncKind::Aggregate, rule: ResultRule::FirstArg },
    FuncDef { name: "diff", kind: FuncKind::Aggregate, rule: ResultRule::FirstArg },
    FuncDef { name: "now", kind: FuncKind::Scalar, rule: ResultRule::Timestamp },
    FuncDef { name: "abs", kind: FuncKind::Scalar, rule: ResultRule::FirstArg },
    FuncDef { name: "ceil", kind: FuncKind::Scalar, rule: ResultRule::FirstArg },
    FuncDef { name: "floor", kind: FuncKind::Scalar, rule: ResultRule::FirstArg },
    FuncDef { name: "round", kind: FuncKind::Scalar, rule: ResultRule::FirstArg },
    FuncDef { name: "length", kind: FuncKind::Scalar, rule: ResultRule::BigInt },
    FuncDef { name: "concat", kind: FuncKind::Scalar, rule: ResultRule::FirstArg },
    FuncDef { name: "lower", kind: FuncKind::Scalar, rule: ResultRule::FirstArg },
    FuncDef { name: "upper", kind: FuncKind::Scalar, rule: ResultRule::FirstArg },
    FuncDef { name: "substr", kind: FuncKind::Scalar, rule: ResultRule::FirstArg },
];

/// Resolver for the builtin function set.
pub struct FunctionManager {
    by_name: HashMap<&'static str, i32>,
}

impl Default for FunctionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionManager {
    pub fn new() -> Self {
        let by_name = FUNC_DEFS
            .iter()
            .enumerate()
            .map(|(id, def)| (def.name, id as i32))
            .collect();
        Self { by_name }
    }

    /// Resolves a function name to `(func_id, kind)`.
    pub fn get_func_info(&self, name: &str) -> Result<(i32, FuncKind)> {
        let lowered = name.to_lowercase();
        let id = *self
            .by_name
            .get(lowered.as_str())
            .ok_or_else(|| TranslateError::InvalidFunction(name.to_string()))?;
        Ok((id, FUNC_DEFS[id as usize].kind))
    }

    pub fn is_aggregate(&self, func_id: i32) -> bool {
        FUNC_DEFS
            .get(func_id as usize)
            .is_some_and(|def| def.kind == FuncKind::Aggregate)
    }

    /// Derives the result type of a resolved call from its arguments.
    ///
    /// The call's `func_id` must already be resolved via [`Self::get_func_info`].
    pub fn result_type(&self, func: &FunctionNode) -> Result<DataType> {
        let def = FUNC_DEFS
            .get(func.func_id as usize)
            .ok_or_else(|| TranslateError::InvalidFunction(func.name.clone()))?;
        let result = match def.rule {
            ResultRule::BigInt => DataType::bigint_type(),
            ResultRule::Double => DataType::double_type(),
            ResultRule::Timestamp => DataType::new(TypeKind::Timestamp),
            ResultRule::SumWidening => {
                let arg = self.first_arg_type(func)?;
                if arg.kind.is_unsigned_int() {
                    DataType::new(TypeKind::UBigInt)
                } else if arg.kind.is_signed_int() || arg.kind == TypeKind::Bool {
                    DataType::bigint_type()
                } else {
                    DataType::double_type()
                }
            }
            ResultRule::FirstArg => self.first_arg_type(func)?,
        };
        Ok(result)
    }

    fn first_arg_type(&self, func: &FunctionNode) -> Result<DataType> {
        func.params
            .first()
            .map(|p| p.res_type())
            .ok_or_else(|| TranslateError::InvalidFunction(func.name.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        let mgr = FunctionManager::new();
        let (id, kind) = mgr.get_func_info("COUNT").unwrap();
        assert_eq!(kind, FuncKind::Aggregate);
        assert!(mgr.is_aggregate(id));
    }

    #[test]
    fn unknown_function_is_rejected() {
        let mgr = FunctionManager::new();
        let err = mgr.get_func_info("no_such_fn").unwrap_err();
        assert_eq!(err, TranslateError::InvalidFunction("no_such_fn".into()));
    }

    #[test]
    fn scalar_functions_are_not_aggregates() {
        let mgr = FunctionManager::new();
        let (id, kind) = mgr.get_func_info("now").unwrap();
        assert_eq!(kind, FuncKind::Scalar);
        assert!(!mgr.is_aggregate(id));
    }
}
