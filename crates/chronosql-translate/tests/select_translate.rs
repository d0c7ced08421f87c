//! End-to-end select translation over a mock catalog.

mod common;

use chronosql_translate::{
    translate, ColumnNode, Datum, ExprNode, IntervalWindow, JoinTable, JoinType, MsgType,
    OperatorNode, OperatorType, OrderByItem, Query, RealTable, SelectStmt, Stmt, TableRef,
    TempTable, TranslateError, TypeKind, WindowClause,
};

use common::*;

fn select_from(table: &str) -> SelectStmt {
    SelectStmt::from_table(TableRef::Real(RealTable::new(CURRENT_DB, table)))
}

fn run(select: SelectStmt) -> Result<Query, TranslateError> {
    let ctx = parse_ctx(default_catalog());
    let mut query = Query::new(Stmt::Select(Box::new(select)));
    translate(&ctx, &mut query)?;
    Ok(query)
}

#[test]
fn projection_where_and_positional_order_by() {
    // SELECT ts, a FROM t WHERE a > 1 ORDER BY 2 DESC
    let mut select = select_from("t");
    select.projections = vec![col("ts"), col("a")];
    select.where_clause = Some(ExprNode::Operator(OperatorNode::binary(
        OperatorType::Gt,
        col("a"),
        int_val("1"),
    )));
    select.order_by = vec![OrderByItem::desc(int_val("2"))];

    let query = run(select).unwrap();

    assert!(query.have_result_set);
    assert_eq!(query.msg_type, Some(MsgType::VndQuery));
    assert_eq!(query.result_schema.len(), 2);
    assert_eq!(query.result_schema[0].kind, TypeKind::Timestamp);
    assert_eq!(query.result_schema[0].name, "ts");
    assert_eq!(query.result_schema[0].col_id, 1);
    assert_eq!(query.result_schema[1].kind, TypeKind::Int);
    assert_eq!(query.result_schema[1].name, "a");

    let Stmt::Select(select) = &query.root else {
        panic!("expected a select root");
    };
    // ORDER BY 2 is rewritten to a reference to the second projection
    let ExprNode::Column(order_col) = &select.order_by[0].expr else {
        panic!("expected a rewritten order-by column");
    };
    assert_eq!(order_col.alias, "a");
    assert_eq!(order_col.proj_ref, Some(1));

    // the WHERE literal carries a translated datum
    let Some(ExprNode::Operator(op)) = &select.where_clause else {
        panic!("expected an operator");
    };
    assert_eq!(op.res_type.kind, TypeKind::Bool);
    let ExprNode::Value(val) = op.right.as_deref().unwrap() else {
        panic!("expected a value operand");
    };
    assert!(val.translated);
    assert_eq!(val.datum, Datum::Int(1));

    assert_eq!(query.databases, vec!["1.test".to_string()]);
    assert_eq!(query.tables.len(), 1);
    assert_eq!(query.tables[0].full_table_name(), "1.test.t");
}

#[test]
fn aggregate_with_group_by_and_having() {
    // SELECT count(*) FROM t GROUP BY b HAVING count(*) > 10
    let mut select = select_from("t");
    select.projections = vec![count_star()];
    select.group_by = vec![col("b")];
    select.having = Some(ExprNode::Operator(OperatorNode::binary(
        OperatorType::Gt,
        count_star(),
        int_val("10"),
    )));

    let query = run(select).unwrap();
    assert_eq!(query.result_schema.len(), 1);
    assert_eq!(query.result_schema[0].kind, TypeKind::BigInt);
}

#[test]
fn bare_column_with_aggregate_needs_group_by() {
    // SELECT a, count(*) FROM t
    let mut select = select_from("t");
    select.projections = vec![col("a"), count_star()];

    assert_eq!(run(select).unwrap_err(), TranslateError::NotSingleGroup);
}

#[test]
fn aggregate_is_illegal_before_having() {
    let mut select = select_from("t");
    select.projections = vec![col("a")];
    select.where_clause = Some(ExprNode::Operator(OperatorNode::binary(
        OperatorType::Gt,
        count_star(),
        int_val("1"),
    )));

    assert_eq!(run(select).unwrap_err(), TranslateError::IllegalUseOfAgg);
}

#[test]
fn unknown_column_is_reported() {
    let mut select = select_from("t");
    select.projections = vec![col("nope")];

    assert_eq!(
        run(select).unwrap_err(),
        TranslateError::InvalidColumn("nope".into())
    );
}

#[test]
fn unknown_table_prefix_is_reported() {
    let mut select = select_from("t");
    select.projections = vec![col_of("x", "a")];

    assert_eq!(
        run(select).unwrap_err(),
        TranslateError::TableNotExist("x".into())
    );
}

#[test]
fn unprefixed_column_must_match_exactly_one_table() {
    // SELECT ts FROM t JOIN st ON t.ts = st.ts
    let join = TableRef::Join(JoinTable {
        join_type: JoinType::Inner,
        left: Box::new(TableRef::Real(RealTable::new(CURRENT_DB, "t"))),
        right: Box::new(TableRef::Real(RealTable::new(CURRENT_DB, "st"))),
        on: ExprNode::Operator(OperatorNode::binary(
            OperatorType::Eq,
            col_of("t", "ts"),
            col_of("st", "ts"),
        )),
    });
    let mut select = SelectStmt::from_table(join);
    select.projections = vec![col("ts")];

    assert_eq!(
        run(select).unwrap_err(),
        TranslateError::AmbiguousColumn("ts".into())
    );
}

#[test]
fn non_grouped_projection_is_rejected() {
    // SELECT a FROM t GROUP BY b
    let mut select = select_from("t");
    select.projections = vec![col("a")];
    select.group_by = vec![col("b")];

    assert_eq!(
        run(select).unwrap_err(),
        TranslateError::GroupByLackExpression
    );
}

#[test]
fn grouped_projection_matches_by_shape() {
    // SELECT b FROM t GROUP BY b
    let mut select = select_from("t");
    select.projections = vec![col("b")];
    select.group_by = vec![col("b")];

    run(select).unwrap();
}

#[test]
fn select_star_expands_all_columns() {
    let query = run(select_from("t")).unwrap();
    let names: Vec<&str> = query.result_schema.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["ts", "a", "b"]);
}

#[test]
fn select_star_on_super_table_includes_tags() {
    let query = run(select_from("st")).unwrap();
    let names: Vec<&str> = query.result_schema.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["ts", "v", "t1", "t2"]);

    let Stmt::Select(select) = &query.root else {
        panic!("expected a select root");
    };
    let TableRef::Real(table) = &select.from else {
        panic!("expected a real table");
    };
    // super table scans fan out over the distribution vgroups
    let vg_ids: Vec<i32> = table.vgroups.iter().map(|v| v.vg_id).collect();
    assert_eq!(vg_ids, [3, 4]);
}

#[test]
fn order_by_position_out_of_range() {
    let mut select = select_from("t");
    select.projections = vec![col("a")];
    select.order_by = vec![OrderByItem::asc(int_val("5"))];

    assert_eq!(
        run(select).unwrap_err(),
        TranslateError::WrongNumberOfSelect
    );
}

#[test]
fn negative_order_by_position_is_dropped() {
    let mut select = select_from("t");
    select.projections = vec![col("a")];
    select.order_by = vec![OrderByItem::asc(int_val("-1"))];

    let query = run(select).unwrap();
    let Stmt::Select(select) = &query.root else {
        panic!("expected a select root");
    };
    assert!(select.order_by.is_empty());
}

#[test]
fn distinct_order_by_key_must_be_selected() {
    // SELECT DISTINCT a FROM t ORDER BY b
    let mut select = select_from("t");
    select.distinct = true;
    select.projections = vec![col("a")];
    select.order_by = vec![OrderByItem::asc(col("b"))];

    assert_eq!(
        run(select).unwrap_err(),
        TranslateError::NotSelectedExpression
    );
}

#[test]
fn order_by_resolves_projection_aliases() {
    // SELECT a AS x FROM t ORDER BY x
    let mut select = select_from("t");
    select.projections = vec![aliased(col("a"), "x")];
    select.order_by = vec![OrderByItem::asc(col("x"))];

    let query = run(select).unwrap();
    let Stmt::Select(select) = &query.root else {
        panic!("expected a select root");
    };
    let ExprNode::Column(order_col) = &select.order_by[0].expr else {
        panic!("expected a column");
    };
    assert_eq!(order_col.proj_ref, Some(0));
    assert_eq!(order_col.res_type.kind, TypeKind::Int);
}

#[test]
fn having_requires_group_by() {
    let mut select = select_from("t");
    select.projections = vec![count_star()];
    select.having = Some(ExprNode::Operator(OperatorNode::binary(
        OperatorType::Gt,
        count_star(),
        int_val("1"),
    )));

    assert_eq!(
        run(select).unwrap_err(),
        TranslateError::GroupByLackExpression
    );
}

#[test]
fn interval_must_be_positive() {
    let mut select = select_from("t");
    select.projections = vec![count_star()];
    select.window = Some(WindowClause::Interval(IntervalWindow {
        ts_col: ColumnNode::named("ts"),
        interval: duration_value("0s"),
        offset: None,
        sliding: None,
    }));

    assert_eq!(
        run(select).unwrap_err(),
        TranslateError::IntervalValueTooSmall("0s".into())
    );
}

#[test]
fn interval_window_translates_duration() {
    let mut select = select_from("t");
    select.projections = vec![count_star()];
    select.window = Some(WindowClause::Interval(IntervalWindow {
        ts_col: ColumnNode::named("ts"),
        interval: duration_value("10s"),
        offset: None,
        sliding: None,
    }));

    let query = run(select).unwrap();
    let Stmt::Select(select) = &query.root else {
        panic!("expected a select root");
    };
    let Some(WindowClause::Interval(iw)) = &select.window else {
        panic!("expected an interval window");
    };
    // 10s at millisecond precision
    assert_eq!(iw.interval.datum, Datum::Int(10_000));
}

#[test]
fn derived_table_exposes_projection_aliases() {
    // SELECT x FROM (SELECT a AS x FROM t) tmp
    let mut inner = select_from("t");
    inner.projections = vec![aliased(col("a"), "x")];
    let mut select = SelectStmt::from_table(TableRef::Temp(TempTable {
        subquery: Box::new(inner),
        alias: "tmp".to_string(),
    }));
    select.projections = vec![col("x")];

    let query = run(select).unwrap();
    assert_eq!(query.result_schema.len(), 1);
    assert_eq!(query.result_schema[0].name, "x");
    assert_eq!(query.result_schema[0].kind, TypeKind::Int);

    let Stmt::Select(select) = &query.root else {
        panic!("expected a select root");
    };
    let ExprNode::Column(outer_col) = &select.projections[0] else {
        panic!("expected a column");
    };
    assert_eq!(outer_col.table_alias, "tmp");
    assert_eq!(outer_col.proj_ref, Some(0));
}
