//! Lowered request payloads.
//!
//! Every admin statement lowers to a request struct serialized into a
//! [`CmdMsg`] with a fixed `(message type, target endpoint)` pair. Data-plane
//! rewrites (CREATE TABLE and CREATE MULTI TABLE) produce per-vgroup
//! [`VgDataBlocks`] instead: a serialized create-table batch prefixed with a
//! network-byte-order `{vg_id, content_length}` header.

use serde::{Deserialize, Serialize};

use crate::ast::expr::{Datum, DurationUnit};
use crate::ast::stmt::{AlterTableType, ShowKind};
use crate::error::{Result, TranslateError};
use crate::types::{EpSet, TypeKind, VgroupInfo};

/// Length of the `{vg_id, content_length}` header prefixed to each vnode
/// data block, both fields big-endian `u32`.
pub const MSG_HEAD_LEN: usize = 8;

/// Message type of a lowered request. `Mnd*` messages target the management
/// endpoint set; `Vnd*` messages target a vgroup; `Dnd*` messages are
/// dnode-level but routed through the management endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MsgType {
    MndCreateDb,
    MndAlterDb,
    MndDropDb,
    MndUseDb,
    MndCreateStb,
    MndDropStb,
    MndAlterStb,
    MndCreateUser,
    MndAlterUser,
    MndDropUser,
    MndCreateDnode,
    MndDropDnode,
    MndConfigDnode,
    DndCreateQnode,
    DndDropQnode,
    MndCreateSma,
    VndDropSma,
    MndCreateTopic,
    MndDropTopic,
    MndShow,
    VndShowTables,
    VndQuery,
    VndCreateTable,
}

/// A serialized management request ready for dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CmdMsg {
    pub ep_set: EpSet,
    pub msg_type: MsgType,
    pub body: Vec<u8>,
    /// Extra payload some messages carry alongside the body (the vgroup
    /// list of a SHOW TABLES dispatch).
    pub extension: Option<Vec<VgroupInfo>>,
}

impl CmdMsg {
    pub fn new(ep_set: EpSet, msg_type: MsgType, body: Vec<u8>) -> Self {
        Self {
            ep_set,
            msg_type,
            body,
            extension: None,
        }
    }
}

/// Serializes a request into a command-message body.
pub fn serialize_req<T: Serialize>(req: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(req).map_err(|e| TranslateError::Serialize(e.to_string()))
}

/// Serializes a node tree (the SMA select, a topic query) into the string
/// form requests embed.
pub fn serialize_ast<T: Serialize>(node: &T) -> Result<String> {
    serde_json::to_string(node).map_err(|e| TranslateError::Serialize(e.to_string()))
}

/// A named, typed field in a schema-bearing request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchema {
    pub name: String,
    pub kind: TypeKind,
    pub bytes: u32,
}

/// One rollup retention tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Retention {
    pub freq: i64,
    pub freq_unit: DurationUnit,
    pub keep: i64,
    pub keep_unit: DurationUnit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateDbReq {
    pub db: String,
    pub num_of_vgroups: i32,
    pub cache_block_size: i32,
    pub total_blocks: i32,
    pub days_per_file: i32,
    pub days_to_keep0: i32,
    pub days_to_keep1: i32,
    pub days_to_keep2: i32,
    pub min_rows: i32,
    pub max_rows: i32,
    pub commit_time: i32,
    pub fsync_period: i32,
    pub wal_level: i8,
    pub precision: crate::types::TimePrecision,
    pub compression: i8,
    pub replications: i8,
    pub quorum: i8,
    pub update: i8,
    pub cache_last_row: i8,
    pub ignore_exist: bool,
    pub stream_mode: i8,
    pub retentions: Vec<Retention>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlterDbReq {
    pub db: String,
    pub total_blocks: i32,
    pub days_to_keep0: i32,
    pub days_to_keep1: i32,
    pub days_to_keep2: i32,
    pub fsync_period: i32,
    pub wal_level: i8,
    pub quorum: i8,
    pub cache_last_row: i8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropDbReq {
    pub db: String,
    pub ignore_not_exists: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UseDbReq {
    pub db: String,
    pub vg_version: i32,
    pub db_id: i64,
    pub num_of_table: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateStbReq {
    pub name: String,
    pub ignore_exists: bool,
    /// Function id of the first rollup function; -1 when none.
    pub aggregation_method: i32,
    pub x_files_factor: f64,
    pub delay: i32,
    pub columns: Vec<FieldSchema>,
    pub tags: Vec<FieldSchema>,
    pub smas: Vec<FieldSchema>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropStbReq {
    pub name: String,
    pub ignore_not_exists: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlterTbReq {
    pub name: String,
    pub alter_type: AlterTableType,
    pub fields: Vec<FieldSchema>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateUserReq {
    pub user: String,
    pub create_type: i8,
    pub super_user: i8,
    pub pass: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlterUserReq {
    pub user: String,
    pub alter_type: i8,
    pub super_user: i8,
    pub pass: String,
    pub db_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropUserReq {
    pub user: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateDnodeReq {
    pub fqdn: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropDnodeReq {
    pub dnode_id: i32,
    pub fqdn: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CfgDnodeReq {
    pub dnode_id: i32,
    pub config: String,
    pub value: String,
}

/// Shared by qnode create and drop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QnodeReq {
    pub dnode_id: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateSmaReq {
    pub name: String,
    pub stb: String,
    pub ignore_exists: bool,
    pub interval: i64,
    pub interval_unit: DurationUnit,
    pub offset: i64,
    pub sliding: i64,
    pub sliding_unit: DurationUnit,
    pub dst_vg_id: i32,
    /// The original SQL text of the CREATE INDEX statement.
    pub sql: String,
    /// The function list as written.
    pub expr: String,
    /// The translated auxiliary select, serialized.
    pub ast: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropSmaReq {
    pub index_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTopicReq {
    pub name: String,
    pub sql: String,
    pub ast: Option<String>,
    pub subscribe_db_name: String,
    pub ignore_exists: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropTopicReq {
    pub name: String,
    pub ignore_not_exists: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowReq {
    pub kind: ShowKind,
    pub db: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VShowTablesReq {
    pub vg_id: i32,
}

/// One `(column id, type, value)` cell of a tag row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KvCell {
    pub col_id: i16,
    pub kind: TypeKind,
    pub value: Datum,
}

/// A column-id-sorted sequence of tag cells, the wire encoding of a child
/// table's tag tuple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct KvRow {
    pub cells: Vec<KvCell>,
}

impl KvRow {
    pub fn push(&mut self, col_id: i16, kind: TypeKind, value: Datum) {
        self.cells.push(KvCell {
            col_id,
            kind,
            value,
        });
    }

    /// Sorts cells by column id; required before the row is serialized.
    pub fn sort_by_col_id(&mut self) {
        self.cells.sort_by_key(|c| c.col_id);
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// A column as laid out in a vnode table definition, with its assigned id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireColumn {
    pub col_id: i16,
    pub name: String,
    pub kind: TypeKind,
    pub bytes: u32,
}

/// Table body of a vnode create-table request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreateTbBody {
    Normal { schema: Vec<WireColumn> },
    Child { suid: u64, tags: KvRow },
}

/// One table creation inside a vnode batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VCreateTbReq {
    pub db_fname: String,
    pub name: String,
    pub body: CreateTbBody,
}

/// All table creations destined for one vgroup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct VCreateTbBatchReq {
    pub tables: Vec<VCreateTbReq>,
}

/// A serialized per-vgroup block: `{vg_id, content_length}` header (both
/// big-endian) followed by the batch payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VgDataBlocks {
    pub vg: VgroupInfo,
    pub num_tables: i32,
    pub data: Vec<u8>,
}

/// Frames a create-table batch into its destination vgroup's data block.
pub fn build_vg_data_block(vg: &VgroupInfo, batch: &VCreateTbBatchReq) -> Result<VgDataBlocks> {
    let body = serialize_req(batch)?;
    let total_len = (MSG_HEAD_LEN + body.len()) as u32;
    let mut data = Vec::with_capacity(total_len as usize);
    data.extend_from_slice(&(vg.vg_id as u32).to_be_bytes());
    data.extend_from_slice(&total_len.to_be_bytes());
    data.extend_from_slice(&body);
    Ok(VgDataBlocks {
        vg: vg.clone(),
        num_tables: batch.tables.len() as i32,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vgroup(vg_id: i32) -> VgroupInfo {
        VgroupInfo {
            vg_id,
            hash_begin: 0,
            hash_end: u32::MAX,
            ep_set: EpSet::single("dnode1", 6030),
        }
    }

    #[test]
    fn block_header_is_big_endian_vgid_then_length() {
        let batch = VCreateTbBatchReq {
            tables: vec![VCreateTbReq {
                db_fname: "1.db".into(),
                name: "t".into(),
                body: CreateTbBody::Normal { schema: Vec::new() },
            }],
        };
        let block = build_vg_data_block(&vgroup(7), &batch).unwrap();
        assert_eq!(&block.data[0..4], &7u32.to_be_bytes());
        let total = u32::from_be_bytes(block.data[4..8].try_into().unwrap());
        assert_eq!(total as usize, block.data.len());
        assert_eq!(block.num_tables, 1);
    }

    #[test]
    fn kv_row_sorts_by_column_id() {
        let mut row = KvRow::default();
        row.push(3, TypeKind::Int, Datum::Int(1));
        row.push(2, TypeKind::Bool, Datum::Bool(true));
        row.sort_by_col_id();
        assert_eq!(row.cells[0].col_id, 2);
        assert_eq!(row.cells[1].col_id, 3);
    }
}
