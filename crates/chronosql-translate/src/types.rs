//! Shared value types: the scalar type system, qualified names, and the
//! cluster topology descriptors (vgroups, endpoints) the translator consumes
//! from the catalog and embeds into lowered requests.

use serde::{Deserialize, Serialize};

/// Timestamp resolution of a database.
///
/// Literal timestamps and duration values are decoded into ticks of the
/// owning database's precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimePrecision {
    #[default]
    Millis,
    Micros,
    Nanos,
}

impl TimePrecision {
    /// Ticks per second at this precision.
    pub fn ticks_per_second(&self) -> i64 {
        match self {
            TimePrecision::Millis => 1_000,
            TimePrecision::Micros => 1_000_000,
            TimePrecision::Nanos => 1_000_000_000,
        }
    }
}

/// Scalar type discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    #[default]
    Null,
    Bool,
    TinyInt,
    SmallInt,
    Int,
    BigInt,
    UTinyInt,
    USmallInt,
    UInt,
    UBigInt,
    Float,
    Double,
    Varchar,
    NChar,
    VarBinary,
    Timestamp,
    Json,
    Decimal,
    Blob,
}

impl TypeKind {
    /// Storage width for fixed-width kinds; `None` for variable-length ones.
    pub fn fixed_width(&self) -> Option<u32> {
        match self {
            TypeKind::Null => Some(0),
            TypeKind::Bool | TypeKind::TinyInt | TypeKind::UTinyInt => Some(1),
            TypeKind::SmallInt | TypeKind::USmallInt => Some(2),
            TypeKind::Int | TypeKind::UInt | TypeKind::Float => Some(4),
            TypeKind::BigInt | TypeKind::UBigInt | TypeKind::Double | TypeKind::Timestamp => {
                Some(8)
            }
            _ => None,
        }
    }

    pub fn is_signed_int(&self) -> bool {
        matches!(
            self,
            TypeKind::TinyInt | TypeKind::SmallInt | TypeKind::Int | TypeKind::BigInt
        )
    }

    pub fn is_unsigned_int(&self) -> bool {
        matches!(
            self,
            TypeKind::UTinyInt | TypeKind::USmallInt | TypeKind::UInt | TypeKind::UBigInt
        )
    }

    pub fn is_float(&self) -> bool {
        matches!(self, TypeKind::Float | TypeKind::Double)
    }

    pub fn is_var_len(&self) -> bool {
        matches!(self, TypeKind::Varchar | TypeKind::NChar | TypeKind::VarBinary)
    }
}

/// Result type of an expression: `(kind, byte width, precision)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DataType {
    pub kind: TypeKind,
    pub bytes: u32,
    pub precision: TimePrecision,
}

impl DataType {
    pub fn new(kind: TypeKind) -> Self {
        Self {
            kind,
            bytes: kind.fixed_width().unwrap_or(0),
            precision: TimePrecision::default(),
        }
    }

    pub fn var_len(kind: TypeKind, bytes: u32) -> Self {
        Self {
            kind,
            bytes,
            precision: TimePrecision::default(),
        }
    }

    pub fn timestamp(precision: TimePrecision) -> Self {
        Self {
            kind: TypeKind::Timestamp,
            bytes: 8,
            precision,
        }
    }

    pub fn bool_type() -> Self {
        Self::new(TypeKind::Bool)
    }

    pub fn double_type() -> Self {
        Self::new(TypeKind::Double)
    }

    pub fn bigint_type() -> Self {
        Self::new(TypeKind::BigInt)
    }
}

/// Fully-qualified table name: account, database, table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableName {
    pub acct_id: i32,
    pub db: String,
    pub table: String,
}

impl TableName {
    pub fn new(acct_id: i32, db: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            acct_id,
            db: db.into(),
            table: table.into(),
        }
    }

    /// `<acct>.<db>`, the form under which databases are cached and keyed.
    pub fn full_db_name(&self) -> String {
        format!("{}.{}", self.acct_id, self.db)
    }

    /// `<acct>.<db>.<table>`.
    pub fn full_table_name(&self) -> String {
        format!("{}.{}.{}", self.acct_id, self.db, self.table)
    }
}

/// A single server endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub fqdn: String,
    pub port: u16,
}

/// Replicated endpoint set with the index currently in use.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EpSet {
    pub in_use: usize,
    pub eps: Vec<Endpoint>,
}

impl EpSet {
    pub fn single(fqdn: impl Into<String>, port: u16) -> Self {
        Self {
            in_use: 0,
            eps: vec![Endpoint {
                fqdn: fqdn.into(),
                port,
            }],
        }
    }
}

/// A horizontal shard of table data and its endpoint set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VgroupInfo {
    pub vg_id: i32,
    pub hash_begin: u32,
    pub hash_end: u32,
    pub ep_set: EpSet,
}

/// One column of a select's result schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultField {
    pub kind: TypeKind,
    pub bytes: u32,
    pub col_id: i16,
    pub name: String,
}
