//! DDL/DCL lowering: each statement must produce the right request at the
//! right endpoint.

mod common;

use chronosql_translate::ast::{
    AlterUserStmt, CreateDatabaseStmt, CreateDnodeStmt, CreateIndexStmt, CreateQnodeStmt,
    CreateTopicStmt, CreateUserStmt, DatabaseOptions, DropIndexStmt, DropSuperTableStmt,
    DropTableClause, DropTableStmt, DropUserStmt, IndexOptions, IndexType, SelectStmt,
    UseDatabaseStmt,
};
use chronosql_translate::msg::{
    CreateDbReq, CreateDnodeReq, CreateSmaReq, CreateTopicReq, CreateUserReq, DropSmaReq,
    DropStbReq, QnodeReq, UseDbReq, AlterUserReq,
};
use chronosql_translate::{
    translate, DurationUnit, MsgType, ParseContext, Query, RealTable, Stmt, TableRef,
    TranslateError,
};

use common::*;

fn run(ctx: &ParseContext, root: Stmt) -> Query {
    let mut query = Query::new(root);
    translate(ctx, &mut query).unwrap();
    query
}

fn decode<T: serde::de::DeserializeOwned>(query: &Query) -> T {
    let msg = query.cmd_msg.as_ref().expect("command message");
    serde_json::from_slice(&msg.body).expect("request body decodes")
}

#[test]
fn create_database_keep_defaults() {
    // CREATE DATABASE d KEEP 30
    let ctx = parse_ctx(default_catalog());
    let stmt = CreateDatabaseStmt {
        db_name: "d".to_string(),
        ignore_exists: false,
        options: DatabaseOptions {
            keep: 30,
            ..DatabaseOptions::default()
        },
    };
    let query = run(&ctx, Stmt::CreateDatabase(stmt));

    assert!(!query.have_result_set);
    assert!(query.direct_rpc);
    assert_eq!(query.msg_type, Some(MsgType::MndCreateDb));
    let msg = query.cmd_msg.as_ref().unwrap();
    assert_eq!(msg.ep_set, ctx.mgmt_ep_set);

    let req: CreateDbReq = decode(&query);
    assert_eq!(req.db, "1.d");
    assert_eq!(req.days_to_keep0, 30);
    assert_eq!(req.days_to_keep1, -1);
    assert_eq!(req.days_to_keep2, -1);
    assert_eq!(req.num_of_vgroups, -1);
}

#[test]
fn use_database_carries_topology_version() {
    let ctx = parse_ctx(default_catalog());
    let query = run(
        &ctx,
        Stmt::UseDatabase(UseDatabaseStmt {
            db_name: CURRENT_DB.to_string(),
        }),
    );

    assert_eq!(query.msg_type, Some(MsgType::MndUseDb));
    let req: UseDbReq = decode(&query);
    assert_eq!(req.db, "1.test");
    assert_eq!(req.vg_version, 1);
    assert_eq!(req.db_id, 42);
    assert_eq!(req.num_of_table, 3);
    assert!(query.databases.contains(&"1.test".to_string()));
}

#[test]
fn create_and_drop_user() {
    let ctx = parse_ctx(default_catalog());
    let query = run(
        &ctx,
        Stmt::CreateUser(CreateUserStmt {
            user_name: "u1".to_string(),
            password: "pw".to_string(),
        }),
    );
    assert_eq!(query.msg_type, Some(MsgType::MndCreateUser));
    let req: CreateUserReq = decode(&query);
    assert_eq!(req.user, "u1");
    assert_eq!(req.pass, "pw");
    assert_eq!(req.super_user, 0);

    let query = run(
        &ctx,
        Stmt::DropUser(DropUserStmt {
            user_name: "u1".to_string(),
        }),
    );
    assert_eq!(query.msg_type, Some(MsgType::MndDropUser));
}

#[test]
fn alter_user_carries_current_database() {
    let ctx = parse_ctx(default_catalog());
    let query = run(
        &ctx,
        Stmt::AlterUser(AlterUserStmt {
            user_name: "u1".to_string(),
            alter_type: 2,
            password: "pw2".to_string(),
        }),
    );
    let req: AlterUserReq = decode(&query);
    assert_eq!(req.db_name, CURRENT_DB);
    assert_eq!(req.alter_type, 2);
}

#[test]
fn create_dnode_and_qnode() {
    let ctx = parse_ctx(default_catalog());
    let query = run(
        &ctx,
        Stmt::CreateDnode(CreateDnodeStmt {
            fqdn: "dnode9".to_string(),
            port: 6030,
        }),
    );
    assert_eq!(query.msg_type, Some(MsgType::MndCreateDnode));
    let req: CreateDnodeReq = decode(&query);
    assert_eq!(req.fqdn, "dnode9");

    let query = run(&ctx, Stmt::CreateQnode(CreateQnodeStmt { dnode_id: 2 }));
    assert_eq!(query.msg_type, Some(MsgType::DndCreateQnode));
    let req: QnodeReq = decode(&query);
    assert_eq!(req.dnode_id, 2);
}

#[test]
fn drop_table_dispatches_on_table_kind() {
    let ctx = parse_ctx(default_catalog());

    // a super table lowers to the management drop request
    let query = run(
        &ctx,
        Stmt::DropTable(DropTableStmt {
            tables: vec![DropTableClause {
                db_name: CURRENT_DB.to_string(),
                table_name: "st".to_string(),
                ignore_not_exists: false,
            }],
        }),
    );
    assert_eq!(query.msg_type, Some(MsgType::MndDropStb));
    let req: DropStbReq = decode(&query);
    assert_eq!(req.name, "1.test.st");

    // dropping a normal table through this path is not supported
    let mut query = Query::new(Stmt::DropTable(DropTableStmt {
        tables: vec![DropTableClause {
            db_name: CURRENT_DB.to_string(),
            table_name: "t".to_string(),
            ignore_not_exists: false,
        }],
    }));
    assert!(matches!(
        translate(&ctx, &mut query).unwrap_err(),
        TranslateError::Unsupported(_)
    ));
}

#[test]
fn drop_super_table_uses_full_name() {
    let ctx = parse_ctx(default_catalog());
    let query = run(
        &ctx,
        Stmt::DropSuperTable(DropSuperTableStmt {
            db_name: CURRENT_DB.to_string(),
            table_name: "st".to_string(),
            ignore_not_exists: true,
        }),
    );
    let req: DropStbReq = decode(&query);
    assert_eq!(req.name, "1.test.st");
    assert!(req.ignore_not_exists);
}

#[test]
fn create_sma_index_builds_auxiliary_select() {
    let mut ctx = parse_ctx(default_catalog());
    ctx.sql = "CREATE INDEX idx ON st FUNCTION(max(v)) INTERVAL(10s)".to_string();
    let stmt = CreateIndexStmt {
        index_type: IndexType::Sma,
        index_name: "idx".to_string(),
        table_name: "st".to_string(),
        ignore_exists: false,
        options: IndexOptions {
            funcs: vec![max_v_func()],
            interval: duration_value("10s"),
            offset: None,
            sliding: None,
        },
    };
    let query = run(&ctx, Stmt::CreateIndex(stmt));

    assert_eq!(query.msg_type, Some(MsgType::MndCreateSma));
    let req: CreateSmaReq = decode(&query);
    assert_eq!(req.name, "1.test.idx");
    assert_eq!(req.stb, "1.test.st");
    assert_eq!(req.interval, 10_000);
    assert_eq!(req.interval_unit, DurationUnit::Seconds);
    // sliding defaults to the interval
    assert_eq!(req.sliding, 10_000);
    assert_eq!(req.sliding_unit, DurationUnit::Seconds);
    // destination is the hash-routed vgroup of the base table
    assert_eq!(req.dst_vg_id, 3);
    assert_eq!(req.sql, ctx.sql);
    assert!(!req.expr.is_empty());
    assert!(req.ast.contains("#sma_0"));
}

fn max_v_func() -> chronosql_translate::FunctionNode {
    chronosql_translate::FunctionNode::new(
        "max",
        vec![chronosql_translate::ExprNode::Column(
            chronosql_translate::ColumnNode::named("v"),
        )],
    )
}

#[test]
fn drop_index_targets_vnode_sma() {
    let ctx = parse_ctx(default_catalog());
    let query = run(
        &ctx,
        Stmt::DropIndex(DropIndexStmt {
            index_name: "idx".to_string(),
        }),
    );
    assert_eq!(query.msg_type, Some(MsgType::VndDropSma));
    let req: DropSmaReq = decode(&query);
    assert_eq!(req.index_name, "idx");
}

#[test]
fn create_topic_translates_its_query() {
    let mut ctx = parse_ctx(default_catalog());
    ctx.sql = "CREATE TOPIC tp AS SELECT * FROM t".to_string();
    let select = SelectStmt::from_table(TableRef::Real(RealTable::new(CURRENT_DB, "t")));
    let stmt = CreateTopicStmt {
        topic_name: "tp".to_string(),
        subscribe_db_name: String::new(),
        query: Some(Box::new(Stmt::Select(Box::new(select)))),
        ignore_exists: false,
    };
    let query = run(&ctx, Stmt::CreateTopic(stmt));

    assert_eq!(query.msg_type, Some(MsgType::MndCreateTopic));
    let req: CreateTopicReq = decode(&query);
    assert_eq!(req.name, "1.test.tp");
    assert_eq!(req.sql, ctx.sql);
    let ast = req.ast.expect("query-backed topic serializes its ast");
    assert!(ast.contains("select"));

    // the backing table was still recorded for cache invalidation
    assert!(query
        .tables
        .iter()
        .any(|t| t.full_table_name() == "1.test.t"));

    // topic queries skip vgroup-list population
    let Stmt::CreateTopic(topic) = &query.root else {
        panic!("expected the topic root");
    };
    let Some(root) = topic.query.as_deref() else {
        panic!("query should remain on the statement");
    };
    let Stmt::Select(select) = root else {
        panic!("expected the translated select");
    };
    let TableRef::Real(table) = &select.from else {
        panic!("expected a real table");
    };
    assert!(table.vgroups.is_empty());
}
