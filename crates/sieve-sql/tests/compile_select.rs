use pretty_assertions::assert_eq;
use sieve_core::{
    driver::Compiler as _,
    schema::{Collection, Schema},
    stmt::{ctx, ctx_up, Request, SortKey, Type, Value},
};
use sieve_sql::{Cardinality, Compiler, SqlFragment};

fn schema() -> Schema {
    Schema::builder()
        .collection(
            Collection::new("items")
                .field("id", Type::I64)
                .field("name", Type::String)
                .field("price", Type::F64)
                .field("active", Type::Bool)
                .identity(["id"]),
        )
        .collection(
            Collection::new("orders")
                .field("id", Type::I64)
                .field("item", Type::I64)
                .field("qty", Type::I64)
                .identity(["id"]),
        )
        .build()
        .unwrap()
}

fn sqlite(request: &Request) -> SqlFragment {
    Compiler::sqlite().compile(&schema(), request).unwrap()
}

fn postgresql(request: &Request) -> SqlFragment {
    Compiler::postgresql().compile(&schema(), request).unwrap()
}

const ITEM_COLUMNS: &str =
    r#"tbl_0."id" AS c0, tbl_0."name" AS c1, tbl_0."price" AS c2, tbl_0."active" AS c3"#;

#[test]
fn filter_becomes_where() {
    let request = Request::source("items").filter(ctx().attr("price").gt(10));
    let fragment = sqlite(&request);

    assert_eq!(
        fragment.sql,
        format!(r#"SELECT {ITEM_COLUMNS} FROM "items" AS tbl_0 WHERE (tbl_0."price" > ?1);"#)
    );
    assert_eq!(fragment.params, vec![Value::I64(10)]);
    assert_eq!(fragment.cardinality, Cardinality::List);
}

#[test]
fn sort_slice_and_map_share_one_select() {
    let request = Request::source("items")
        .sort([SortKey::desc(ctx().attr("price")), SortKey::asc(ctx().attr("name"))])
        .slice(Some(1), Some(3))
        .map(ctx().attr("name"));

    assert_eq!(
        sqlite(&request).sql,
        r#"SELECT tbl_0."name" AS c0 FROM "items" AS tbl_0 ORDER BY tbl_0."price" DESC, tbl_0."name" ASC LIMIT 2 OFFSET 1;"#
    );
}

#[test]
fn postgresql_orders_nulls_first() {
    let request = Request::source("items")
        .filter(ctx().attr("name").eq("a"))
        .sort_by(ctx().attr("price"))
        .map(ctx().attr("id"));

    let fragment = postgresql(&request);
    assert_eq!(
        fragment.sql,
        r#"SELECT tbl_0."id" AS c0 FROM "items" AS tbl_0 WHERE (tbl_0."name" IS NOT DISTINCT FROM $1) ORDER BY tbl_0."price" ASC NULLS FIRST;"#
    );
    assert_eq!(fragment.params, vec![Value::from("a")]);
}

#[test]
fn filter_after_limit_wraps_with_hidden_order() {
    let request = Request::source("items")
        .sort_by(ctx().attr("id"))
        .slice(None, Some(2))
        .filter(ctx().attr("active"));

    assert_eq!(
        sqlite(&request).sql,
        concat!(
            r#"SELECT tbl_1."c0" AS c0, tbl_1."c1" AS c1, tbl_1."c2" AS c2, tbl_1."c3" AS c3 "#,
            r#"FROM (SELECT tbl_0."id" AS c0, tbl_0."name" AS c1, tbl_0."price" AS c2, tbl_0."active" AS c3, tbl_0."id" AS o0 "#,
            r#"FROM "items" AS tbl_0 ORDER BY tbl_0."id" ASC LIMIT 2) AS tbl_1 "#,
            r#"WHERE tbl_1."c3" ORDER BY tbl_1."o0" ASC;"#
        )
    );
}

#[test]
fn offset_without_limit() {
    let request = Request::source("items")
        .slice(Some(2), None)
        .map(ctx().attr("id"));

    assert_eq!(
        sqlite(&request).sql,
        r#"SELECT tbl_0."id" AS c0 FROM "items" AS tbl_0 LIMIT -1 OFFSET 2;"#
    );
    assert_eq!(
        postgresql(&request).sql,
        r#"SELECT tbl_0."id" AS c0 FROM "items" AS tbl_0 OFFSET 2;"#
    );
}

#[test]
fn groupby_aggregates_read_from_a_derived_table() {
    let request = Request::source("orders").groupby_with(
        ctx().attr("item"),
        [("total", ctx().map(ctx().attr("qty")).sum())],
    );

    let fragment = sqlite(&request);
    assert_eq!(
        fragment.sql,
        concat!(
            r#"SELECT tbl_1."c0" AS c0, tbl_1."c1" AS c1 FROM (SELECT tbl_0."item" AS c0, "#,
            r#"COALESCE(SUM(tbl_0."qty"), ?1) AS c1 FROM "orders" AS tbl_0 GROUP BY tbl_0."item") AS tbl_1;"#
        )
    );
    assert_eq!(fragment.params, vec![Value::I64(0)]);
}

#[test]
fn filtered_group_counts() {
    let request = Request::source("orders").groupby_with(
        ctx().attr("item"),
        [("big", ctx().filter(ctx().attr("qty").gt(5)).len())],
    );

    assert!(sqlite(&request)
        .sql
        .contains(r#"COUNT(*) FILTER (WHERE (tbl_0."qty" > ?1)) AS c1"#));
}

#[test]
fn outer_elements_correlate_subqueries() {
    let request = Request::source("items").map(Request::record([
        ("name", ctx().attr("name")),
        (
            "orders",
            Request::source("orders")
                .filter(ctx().attr("item").eq(ctx_up(1).attr("id")))
                .len(),
        ),
    ]));

    assert_eq!(
        sqlite(&request).sql,
        concat!(
            r#"SELECT tbl_0."name" AS c0, (SELECT COUNT(*) AS c0 FROM "orders" AS tbl_1 "#,
            r#"WHERE (tbl_1."item" IS tbl_0."id")) AS c1 FROM "items" AS tbl_0;"#
        )
    );
}

#[test]
fn prefix_patterns_stay_case_sensitive() {
    let request = Request::source("items")
        .filter(ctx().attr("name").matches("^ab"))
        .len();

    let fragment = sqlite(&request);
    assert_eq!(
        fragment.sql,
        r#"SELECT (SELECT COUNT(*) AS c0 FROM "items" AS tbl_0 WHERE tbl_0."name" GLOB ?1) AS c0;"#
    );
    assert_eq!(fragment.params, vec![Value::from("ab*")]);
    assert_eq!(fragment.cardinality, Cardinality::Value);

    let fragment = postgresql(&request);
    assert!(fragment.sql.contains(r#"tbl_0."name" LIKE $1"#));
    assert_eq!(fragment.params, vec![Value::from("ab%")]);
}

#[test]
fn exact_patterns_compare() {
    let request = Request::source("items").filter(ctx().attr("name").matches("^ab$"));
    assert!(sqlite(&request)
        .sql
        .ends_with(r#"WHERE (tbl_0."name" IS ?1);"#));
}

#[test]
fn division_is_real() {
    let request = Request::source("orders").map(ctx().attr("qty").div(2));
    assert_eq!(
        sqlite(&request).sql,
        r#"SELECT (CAST(tbl_0."qty" AS REAL) / ?1) AS c0 FROM "orders" AS tbl_0;"#
    );
}

#[test]
fn strings_concatenate() {
    let request = Request::source("items").map(ctx().attr("name").add("!"));
    assert!(sqlite(&request).sql.starts_with(r#"SELECT (tbl_0."name" || ?1) AS c0"#));
}

#[test]
fn top_level_one_fetches_two_rows() {
    let request = Request::source("items")
        .filter(ctx().attr("id").eq(1))
        .one();

    let fragment = sqlite(&request);
    assert_eq!(
        fragment.sql,
        format!(r#"SELECT {ITEM_COLUMNS} FROM "items" AS tbl_0 WHERE (tbl_0."id" IS ?1) LIMIT 2;"#)
    );
    assert_eq!(
        fragment.cardinality,
        Cardinality::One {
            default: None,
            context: "one() over items.filter((ctx(0).id == 1))".to_string(),
        }
    );
}

#[test]
fn distinct_counts_through_a_derived_table() {
    let request = Request::source("orders")
        .map(ctx().attr("item"))
        .distinct()
        .len();

    assert_eq!(
        sqlite(&request).sql,
        concat!(
            r#"SELECT (SELECT COUNT(*) AS c0 FROM (SELECT DISTINCT tbl_0."item" AS c0 "#,
            r#"FROM "orders" AS tbl_0) AS tbl_1) AS c0;"#
        )
    );
}

#[test]
fn postgresql_embeds_lists() {
    let request = Request::source("items").map(Request::record([
        ("id", ctx().attr("id")),
        (
            "quantities",
            Request::source("orders")
                .filter(ctx().attr("item").eq(ctx_up(1).attr("id")))
                .map(ctx().attr("qty")),
        ),
    ]));

    assert_eq!(
        postgresql(&request).sql,
        concat!(
            r#"SELECT tbl_0."id" AS c0, ARRAY(SELECT tbl_1."qty" AS c0 FROM "orders" AS tbl_1 "#,
            r#"WHERE (tbl_1."item" IS NOT DISTINCT FROM tbl_0."id")) AS c1 FROM "items" AS tbl_0;"#
        )
    );
}

#[test]
fn rows_decode_into_the_request_type() {
    let request = Request::source("items").map(Request::record([
        ("id", ctx().attr("id")),
        ("cheap", ctx().attr("price").lt(5)),
    ]));
    let fragment = sqlite(&request);

    let value = fragment
        .decode(vec![
            vec![Value::I64(1), Value::I64(1)],
            vec![Value::I64(2), Value::I64(0)],
        ])
        .unwrap();
    assert_eq!(
        value,
        Value::from(vec![
            Value::mapping([("id", Value::I64(1)), ("cheap", Value::Bool(true))]),
            Value::mapping([("id", Value::I64(2)), ("cheap", Value::Bool(false))]),
        ])
    );
}
