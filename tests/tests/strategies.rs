use tests::{fixture::*, tests, CountingSource, DbTest, SetupInterpreter};

use pretty_assertions::assert_eq;
use sieve::{
    driver::Source,
    stmt::{ctx, ctx_up, Request, SortKey, Value},
    Strategy,
};

use std::sync::Arc;

/// The strategy a request runs with when the setup has a backend, `FullFallback` otherwise.
fn on_backend(test: &DbTest, strategy: Strategy) -> Strategy {
    if test.setup().has_backend() {
        strategy
    } else {
        Strategy::FullFallback
    }
}

fn filters_are_pushed_down(test: &mut DbTest) {
    test.source(items(), items_data());
    let db = test.db();

    let request = Request::source("items")
        .filter(ctx().attr("category").eq("fruit"))
        .sort([SortKey::asc(ctx().attr("price"))])
        .map(ctx().attr("name"));
    let execution = test.check(&db, &request);

    assert_eq!(
        execution.value,
        json(serde_json::json!(["plum", "apple", "pear"]))
    );
    assert_eq!(execution.strategy, on_backend(test, Strategy::Pushed));
    assert_eq!(execution.fragment.is_some(), test.setup().has_backend());
}

fn unsupported_tail_is_interpreted(test: &mut DbTest) {
    test.source(items(), items_data());
    let db = test.db();

    let request = Request::source("items")
        .filter(ctx().attr("active"))
        .sort([SortKey::asc(ctx().attr("price"))])
        .map(ctx().attr("name"))
        .index(-1);
    let execution = test.check(&db, &request);

    assert_eq!(execution.value, "leek");
    assert_eq!(execution.strategy, on_backend(test, Strategy::PartialCut));
}

fn and_filters_keep_supported_conjuncts(test: &mut DbTest) {
    test.source(items(), items_data());
    let db = test.db();

    let request = Request::source("items")
        .filter(
            ctx()
                .attr("category")
                .eq("fruit")
                .and(ctx().attr("price").mul(2).gt(2.0)),
        )
        .map(ctx().attr("name"));
    let execution = test.check(&db, &request);
    assert_eq!(execution.value, json(serde_json::json!(["apple", "pear"])));

    // The document store has no arithmetic: only the category test reaches it.
    if test.setup().name() == "memory" {
        assert_eq!(execution.strategy, Strategy::PartialCut);
        let fragment = execution.fragment.unwrap();
        assert!(fragment.contains("fruit"), "{fragment}");
        assert!(!fragment.contains("price"), "{fragment}");
    }
}

fn patterns_the_backend_refuses_keep_the_rest_pushed(test: &mut DbTest) {
    test.source(items(), items_data());
    let db = test.db();

    let request = Request::source("items")
        .filter(
            ctx()
                .attr("category")
                .eq("fruit")
                .and(ctx().attr("name").matches("p.a")),
        )
        .map(ctx().attr("name"));
    let execution = test.check(&db, &request);
    assert_eq!(execution.value, json(serde_json::json!(["pear"])));
    assert_eq!(execution.strategy, on_backend(test, Strategy::PartialCut));

    if let Some(fragment) = execution.fragment {
        assert!(fragment.contains("category"), "{fragment}");
        assert!(!fragment.contains("GLOB"), "{fragment}");
        assert!(!fragment.contains("regex"), "{fragment}");
    }
}

fn division_by_a_zero_field_fails(test: &mut DbTest) {
    test.source(items(), items_data());
    let db = test.db();

    let request = Request::source("items").map(ctx().attr("price").div(ctx().attr("stock")));
    let err = test.check_err(&db, &request);
    assert!(err.to_string().contains("division by zero"), "{err}");

    let request = Request::source("items")
        .filter(ctx().attr("stock").gt(0))
        .map(ctx().attr("price").div(ctx().attr("stock")));
    let execution = test.check(&db, &request);
    assert_eq!(execution.strategy, on_backend(test, Strategy::PartialCut));
    if let Some(fragment) = execution.fragment {
        assert!(fragment.contains("stock"), "{fragment}");
        assert!(!fragment.contains(" / "), "{fragment}");
    }

    let request = Request::source("items").map(ctx().attr("price").div(4));
    test.check(&db, &request);
}

fn integer_overflow_fails(test: &mut DbTest) {
    test.source(items(), items_data());
    let db = test.db();

    let request = Request::source("items").map(ctx().attr("stock").mul(i64::MAX));
    let err = test.check_err(&db, &request);
    assert!(err.to_string().contains("overflow"), "{err}");
}

fn point_lookups_never_scan(test: &mut DbTest) {
    let items = CountingSource::new(test.create(items(), items_data()));
    let calls = items.calls();
    calls.forbid_scans();
    let lookups = items.supports_lookup();
    test.register(Arc::new(items));
    let db = test.db();

    let request = Request::source("items")
        .filter(ctx().attr("id").eq(2))
        .map(ctx().attr("name"));
    let execution = test.check(&db, &request);

    assert_eq!(execution.value, json(serde_json::json!(["pear"])));
    assert_eq!(calls.all(), 0);
    if lookups {
        assert_eq!(execution.strategy, Strategy::PointLookup);
        assert_eq!(calls.lookups(), 1);
    }
}

fn lookups_check_the_rest_of_the_filter(test: &mut DbTest) {
    let items = CountingSource::new(test.create(items(), items_data()));
    let calls = items.calls();
    calls.forbid_scans();
    test.register(Arc::new(items));
    let db = test.db();

    let request = Request::source("items")
        .filter(ctx().attr("category").eq("fruit").and(ctx().attr("id").eq(3)))
        .map(ctx().attr("name"));
    assert_eq!(
        test.check(&db, &request).value,
        json(serde_json::json!(["plum"]))
    );

    let request = Request::source("items")
        .filter(ctx().attr("id").eq(3).and(ctx().attr("category").eq("herb")))
        .len();
    assert_eq!(test.check(&db, &request).value, Value::I64(0));

    let request = Request::source("items")
        .filter(ctx().attr("id").eq(2).and(ctx().attr("stock").gt(0)))
        .len();
    assert_eq!(test.check(&db, &request).value, Value::I64(0));

    assert_eq!(calls.all(), 0);
}

fn unsatisfiable_filters_touch_nothing(test: &mut DbTest) {
    let items = CountingSource::new(test.create(items(), items_data()));
    let calls = items.calls();
    let lookups = items.supports_lookup();
    test.register(Arc::new(items));
    let db = test.db();

    let request = Request::source("items")
        .filter(ctx().attr("id").eq(1).and(ctx().attr("id").eq(2)))
        .len();
    let execution = test.check(&db, &request);

    assert_eq!(execution.value, Value::I64(0));
    if lookups {
        assert_eq!(execution.strategy, Strategy::PointLookup);
        assert_eq!((calls.all(), calls.lookups()), (0, 0));
    }
}

fn correlated_requests_agree(test: &mut DbTest) {
    test.source(items(), items_data());
    test.source(orders(), orders_data());
    let db = test.db();

    let request = Request::source("orders")
        .sort([SortKey::asc(ctx().attr("id"))])
        .map(Request::record([
            ("quantity", ctx().attr("quantity")),
            (
                "name",
                Request::source("items")
                    .filter(ctx().attr("id").eq(ctx_up(1).attr("item")))
                    .map(ctx().attr("name"))
                    .one(),
            ),
        ]));
    let execution = test.check(&db, &request);

    assert_eq!(
        execution.value,
        json(serde_json::json!([
            {"quantity": 3, "name": "apple"},
            {"quantity": 1, "name": "leek"},
            {"quantity": 2, "name": "apple"},
            {"quantity": 5, "name": "parsley"},
        ]))
    );
}

fn mixed_stores_are_interpreted(test: &mut DbTest) {
    test.source(items(), items_data());
    let orders = test.create_in(&SetupInterpreter::new(), orders(), orders_data());
    test.register(orders);
    let db = test.db();

    let request = Request::source("items")
        .filter(
            Request::source("orders")
                .filter(ctx().attr("item").eq(ctx_up(1).attr("id")))
                .len()
                .gt(0),
        )
        .map(ctx().attr("name"));
    let execution = test.check(&db, &request);

    assert_eq!(
        execution.value,
        json(serde_json::json!(["apple", "leek", "parsley"]))
    );
    assert_eq!(execution.strategy, Strategy::FullFallback);
}

fn disabled_pushdown_interprets(test: &mut DbTest) {
    test.source(items(), items_data());
    test.builder().pushdown(false).point_lookups(false);
    let db = test.db();

    for request in [
        Request::source("items").filter(ctx().attr("id").eq(4)),
        Request::source("items").map(ctx().attr("stock")).sum(),
    ] {
        assert_eq!(test.check(&db, &request).strategy, Strategy::FullFallback);
    }
}

fn invalid_requests_fail_before_any_access(test: &mut DbTest) {
    let items = CountingSource::new(test.create(items(), items_data()));
    let calls = items.calls();
    test.register(Arc::new(items));
    let db = test.db();

    let missing_field = Request::source("items").filter(ctx().attr("colour").eq("red"));
    assert!(db.execute(&missing_field).unwrap_err().is_invalid_request());

    let missing_source = Request::source("stores").len();
    assert!(db.execute(&missing_source).unwrap_err().is_invalid_request());

    let not_a_predicate = Request::source("items").filter(ctx().attr("name"));
    assert!(db.execute(&not_a_predicate).unwrap_err().is_invalid_request());

    assert_eq!((calls.all(), calls.lookups()), (0, 0));
}

tests!(
    filters_are_pushed_down,
    unsupported_tail_is_interpreted,
    and_filters_keep_supported_conjuncts,
    patterns_the_backend_refuses_keep_the_rest_pushed,
    division_by_a_zero_field_fails,
    integer_overflow_fails,
    point_lookups_never_scan,
    lookups_check_the_rest_of_the_filter,
    unsatisfiable_filters_touch_nothing,
    correlated_requests_agree,
    mixed_stores_are_interpreted,
    disabled_pushdown_interprets,
    invalid_requests_fail_before_any_access,
);
