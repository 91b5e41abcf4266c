use tests::{fixture::*, tests, DbTest};

use pretty_assertions::assert_eq;
use sieve::stmt::{ctx, Request, SortKey, Value};

fn filter_then_map(test: &mut DbTest) {
    test.source(rows(), rows_data());
    let db = test.db();

    let request = Request::source("rows")
        .filter(ctx().attr("toto").eq("bar"))
        .map(ctx().attr("price"));
    let execution = test.check(&db, &request);
    assert_eq!(execution.value, json(serde_json::json!([12, 5])));
}

fn sort_with_mixed_directions(test: &mut DbTest) {
    test.source(rows(), rows_data());
    let db = test.db();

    let request = Request::source("rows")
        .sort([
            SortKey::asc(ctx().attr("toto")),
            SortKey::desc(ctx().attr("tata")),
        ])
        .map(Request::record([
            ("toto", ctx().attr("toto")),
            ("tata", ctx().attr("tata")),
        ]));
    let execution = test.check(&db, &request);
    assert_eq!(
        execution.value,
        json(serde_json::json!([
            {"toto": "bar", "tata": 42},
            {"toto": "bar", "tata": 6},
            {"toto": "foo", "tata": 42},
        ]))
    );
}

fn one_checks_cardinality(test: &mut DbTest) {
    test.source(rows(), rows_data());
    let db = test.db();

    let none = Request::source("rows")
        .filter(ctx().attr("toto").eq("fizzbuzz"))
        .one();
    assert!(db.execute(&none).unwrap_err().is_empty_result());

    let two = Request::source("rows")
        .filter(ctx().attr("toto").eq("bar"))
        .one();
    assert!(db.execute(&two).unwrap_err().is_multiple_results());

    let single = Request::source("rows")
        .filter(ctx().attr("toto").eq("foo"))
        .map(ctx().attr("price"))
        .one();
    assert_eq!(test.check(&db, &single).value, Value::I64(10));
}

fn groupby_sorted_by_key_descending(test: &mut DbTest) {
    test.source(rows(), rows_data());
    let db = test.db();

    let request = Request::source("rows")
        .groupby_with(
            ctx().attr("tata"),
            [("sum", ctx().map(ctx().attr("price")).sum())],
        )
        .sort([SortKey::desc(ctx().attr("key"))]);
    let execution = test.check(&db, &request);
    assert_eq!(
        execution.value,
        json(serde_json::json!([
            {"key": 42, "sum": 15},
            {"key": 6, "sum": 12},
        ]))
    );
}

fn literals_need_no_source(test: &mut DbTest) {
    let db = test.db();

    let value = json(serde_json::json!([{"a": 1}, {"a": 2}]));
    let execution = test.check(&db, &Request::literal(value.clone()));
    assert_eq!(execution.value, value);
    assert_eq!(execution.strategy, sieve::Strategy::FullFallback);
}

tests!(
    filter_then_map,
    sort_with_mixed_directions,
    one_checks_cardinality,
    groupby_sorted_by_key_descending,
    literals_need_no_source,
);
