use tests::{fixture::rows, DbTest, Setup, SetupMemory, SetupSqlite};

use proptest::prelude::*;
use sieve::stmt::{ctx, Request, SortKey, Value};

fn row_data() -> impl Strategy<Value = Vec<Value>> {
    prop::collection::vec(
        (prop::sample::select(vec!["a", "b", "c"]), 0i64..5, 0i64..100),
        0..12,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (toto, tata, price))| {
                Value::mapping([
                    ("id", Value::I64(i as i64 + 1)),
                    ("toto", Value::from(toto)),
                    ("tata", Value::I64(tata)),
                    ("price", Value::I64(price)),
                ])
            })
            .collect()
    })
}

fn sorted_window(threshold: i64, start: i64, len: i64) -> Request {
    Request::source("rows")
        .filter(ctx().attr("price").ge(threshold))
        .sort([
            SortKey::asc(ctx().attr("toto")),
            SortKey::desc(ctx().attr("tata")),
            SortKey::asc(ctx().attr("id")),
        ])
        .slice(Some(start), Some(start + len))
        .map(Request::record([
            ("id", ctx().attr("id")),
            ("toto", ctx().attr("toto")),
        ]))
}

fn group_totals(threshold: i64) -> Request {
    Request::source("rows")
        .filter(ctx().attr("price").lt(threshold))
        .groupby_with(
            ctx().attr("toto"),
            [("total", ctx().map(ctx().attr("price")).sum())],
        )
        .sort_by(ctx().attr("key"))
}

fn check_all(setup: impl Setup, data: Vec<Value>, requests: &[Request]) {
    let mut test = DbTest::new(setup);
    test.source(rows(), data);
    let db = test.db();
    for request in requests {
        test.check(&db, request);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn sqlite_agrees_with_the_interpreter(
        data in row_data(),
        threshold in 0i64..100,
        start in 0i64..4,
        len in 0i64..6,
    ) {
        check_all(
            SetupSqlite::new(),
            data,
            &[sorted_window(threshold, start, len), group_totals(threshold)],
        );
    }

    #[test]
    fn memory_agrees_with_the_interpreter(
        data in row_data(),
        threshold in 0i64..100,
        start in 0i64..4,
        len in 0i64..6,
    ) {
        check_all(
            SetupMemory::new(),
            data,
            &[sorted_window(threshold, start, len), group_totals(threshold)],
        );
    }
}
