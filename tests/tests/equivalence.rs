use tests::{assert_eq_unordered, fixture::*, tests, DbTest};

use sieve::stmt::{ctx, Request, SortKey};

fn items_source() -> Request {
    Request::source("items")
}

/// Requests whose result does not depend on how ties or groups are ordered.
fn requests() -> Vec<Request> {
    vec![
        items_source()
            .filter(ctx().attr("price").gt(1.0).and(ctx().attr("active").not()))
            .map(ctx().attr("name")),
        items_source()
            .filter(
                ctx()
                    .attr("category")
                    .eq("fruit")
                    .or(ctx().attr("stock").ge(10)),
            )
            .sort([SortKey::desc(ctx().attr("price"))])
            .map(Request::record([
                ("name", ctx().attr("name")),
                ("price", ctx().attr("price")),
            ])),
        items_source()
            .filter(ctx().attr("name").matches("^p"))
            .sort_by(ctx().attr("name"))
            .map(ctx().attr("name")),
        items_source()
            .filter(ctx().attr("name").matches("^pea$"))
            .map(ctx().attr("id")),
        items_source()
            .filter(ctx().attr("category").eq("fruit").not())
            .map(ctx().attr("name")),
        items_source()
            .sort([
                SortKey::asc(ctx().attr("category")),
                SortKey::desc(ctx().attr("stock")),
            ])
            .slice(Some(1), Some(4))
            .map(ctx().attr("name")),
        items_source()
            .sort_by(ctx().attr("price"))
            .slice(Some(2), None)
            .map(ctx().attr("id")),
        items_source()
            .map(ctx().attr("name"))
            .slice(None, Some(2)),
        items_source()
            .map(ctx().attr("category"))
            .distinct()
            .sort_by(ctx()),
        items_source()
            .groupby_with(
                ctx().attr("category"),
                [
                    ("count", ctx().len()),
                    ("stock", ctx().map(ctx().attr("stock")).sum()),
                    ("cheapest", ctx().map(ctx().attr("price")).min()),
                ],
            )
            .sort_by(ctx().attr("key")),
        items_source().filter(ctx().attr("active")).len(),
        items_source().map(ctx().attr("stock")).max(),
        items_source()
            .filter(ctx().attr("id").eq(4))
            .map(ctx().attr("name"))
            .one_or("none"),
        items_source()
            .filter(ctx().attr("id").eq(40))
            .map(ctx().attr("name"))
            .one_or("none"),
        items_source()
            .sort_by(ctx().attr("id"))
            .map(ctx().attr("price").mul(ctx().attr("stock"))),
        items_source()
            .filter(ctx().attr("stock").gt(5))
            .map(Request::record([
                ("name", ctx().attr("name")),
                ("low", ctx().attr("stock").lt(10)),
            ])),
        items_source()
            .sort([SortKey::desc(ctx().attr("price"))])
            .index(0)
            .attr("name"),
    ]
}

fn requests_agree_with_the_interpreter(test: &mut DbTest) {
    test.source(items(), items_data());
    let db = test.db();

    for request in requests() {
        test.check(&db, &request);
    }
}

fn groups_agree_in_any_order(test: &mut DbTest) {
    test.source(rows(), rows_data());
    let db = test.db();

    let request = Request::source("rows").groupby_with(
        ctx().attr("toto"),
        [("total", ctx().map(ctx().attr("price")).sum())],
    );
    assert_eq_unordered!(
        db.execute(&request).unwrap(),
        test.expected(&request).unwrap()
    );
}

tests!(
    requests_agree_with_the_interpreter,
    groups_agree_in_any_order,
);
