//! Finalization: classifying the translated root and populating the query
//! envelope.

use crate::ast::{ExprNode, Query, Stmt};
use crate::error::Result;
use crate::msg::MsgType;
use crate::types::ResultField;

use super::Translator;

impl<'a> Translator<'a> {
    /// Fills the envelope: selects expose a result schema and go out as
    /// queries; vnode modifications go out as create-table batches; every
    /// other statement hands over the pending command message for direct
    /// dispatch. The referenced-database and referenced-table sets are
    /// copied out in first-use order for caller-side cache invalidation.
    pub(crate) fn finalize(&mut self, query: &mut Query) -> Result<()> {
        match &query.root {
            Stmt::Select(select) => {
                query.have_result_set = true;
                query.direct_rpc = false;
                query.msg_type = Some(MsgType::VndQuery);
                query.result_schema = extract_result_schema(&select.projections);
            }
            Stmt::VnodeModif(_) => {
                query.have_result_set = false;
                query.direct_rpc = false;
                query.msg_type = Some(MsgType::VndCreateTable);
            }
            _ => {
                query.have_result_set = false;
                query.direct_rpc = true;
                query.cmd_msg = self.cmd_msg.take();
                query.msg_type = query.cmd_msg.as_ref().map(|m| m.msg_type);
            }
        }

        query.databases = self.dbs.iter().cloned().collect();
        query.tables = self.tables.iter().cloned().collect();
        Ok(())
    }
}

/// One result column per projection: `(type, bytes, id = index + 1, alias)`.
fn extract_result_schema(projections: &[ExprNode]) -> Vec<ResultField> {
    projections
        .iter()
        .enumerate()
        .map(|(idx, expr)| {
            let res_type = expr.res_type();
            ResultField {
                kind: res_type.kind,
                bytes: res_type.bytes,
                col_id: idx as i16 + 1,
                name: expr.alias().to_string(),
            }
        })
        .collect()
}
