use bson::{doc, Document};
use indexmap::IndexMap;
use pretty_assertions::assert_eq;
use sieve_core::{
    driver::{CannotPushDown, Compiler as _},
    schema::{Collection, Schema},
    stmt::{ctx, Node, Request, SortKey, Type, Value},
};
use sieve_document::{Compiler, DocumentQuery, Projection, Single};

fn schema() -> Schema {
    Schema::builder()
        .collection(
            Collection::new("items")
                .field("id", Type::I64)
                .field("name", Type::String)
                .field("price", Type::F64)
                .field("active", Type::Bool)
                .field("tags", Type::list(Type::String))
                .field(
                    "dims",
                    Type::mapping([("w".to_string(), Type::F64), ("h".to_string(), Type::F64)]),
                )
                .identity(["id"]),
        )
        .build()
        .unwrap()
}

fn compile(request: &Request) -> DocumentQuery {
    Compiler::new().compile(&schema(), request).unwrap()
}

fn refuse(request: &Request) -> CannotPushDown {
    Compiler::new().compile(&schema(), request).unwrap_err()
}

fn filter_of(predicate: Request) -> Document {
    compile(&Request::source("items").filter(predicate)).filter
}

#[test]
fn conditions_on_one_field_merge() {
    let filter = filter_of(
        ctx()
            .attr("price")
            .gt(1)
            .and(ctx().attr("price").le(5))
            .and(ctx().attr("name").eq("x")),
    );
    assert_eq!(
        filter,
        doc! { "price": { "$gt": 1_i64, "$lte": 5_i64 }, "name": "x" }
    );
}

#[test]
fn literal_on_the_left_flips_the_operator() {
    let filter = filter_of(Request::literal(10).gt(ctx().attr("price")));
    assert_eq!(filter, doc! { "price": { "$lt": 10_i64 } });
}

#[test]
fn or_and_negations() {
    let filter = filter_of(
        ctx()
            .attr("id")
            .eq(1)
            .or(ctx().attr("id").eq(2))
            .and(ctx().attr("active").not()),
    );
    assert_eq!(
        filter,
        doc! {
            "$or": [{ "id": 1_i64 }, { "id": 2_i64 }],
            "active": { "$ne": true },
        }
    );

    let filter = filter_of(ctx().attr("price").gt(3).not());
    assert_eq!(filter, doc! { "price": { "$not": { "$gt": 3_i64 } } });

    let filter = filter_of(ctx().attr("name").ne("x").not());
    assert_eq!(filter, doc! { "name": "x" });

    let filter = filter_of(ctx().attr("id").eq(1).and(ctx().attr("name").eq("x")).not());
    assert_eq!(filter, doc! { "$nor": [{ "id": 1_i64, "name": "x" }] });
}

#[test]
fn nested_fields_use_dotted_paths() {
    let filter = filter_of(ctx().attr("dims").attr("w").ge(2.5));
    assert_eq!(filter, doc! { "dims.w": { "$gte": 2.5 } });
}

#[test]
fn anchored_patterns() {
    let filter = filter_of(ctx().attr("name").matches("^ab"));
    assert_eq!(filter, doc! { "name": { "$regex": "^ab" } });

    let filter = filter_of(ctx().attr("name").matches("^ab$"));
    assert_eq!(filter, doc! { "name": "ab" });

    let request = Request::source("items").filter(ctx().attr("name").matches("a.b"));
    let Node::Filter(filter) = request.root_node() else {
        unreachable!()
    };
    assert_eq!(refuse(&request).node, filter.predicate);
}

#[test]
fn supports_rejects_what_no_handler_lowers() {
    let compiler = Compiler::new();

    let fruit = ctx().attr("name").eq("fruit");
    assert!(compiler.supports(&fruit, fruit.root()));

    let general = ctx().attr("name").matches("p.a");
    assert!(!compiler.supports(&general, general.root()));

    let fields = ctx().attr("price").lt(ctx().attr("id"));
    assert!(!compiler.supports(&fields, fields.root()));

    let flipped = Request::literal(3).lt(ctx().attr("price"));
    assert!(compiler.supports(&flipped, flipped.root()));
}

#[test]
fn boolean_literals() {
    assert_eq!(filter_of(Request::literal(true)), Document::new());
    assert_eq!(filter_of(Request::literal(false)), doc! { "$nor": [{}] });
}

#[test]
fn sort_window_and_projection() {
    let request = Request::source("items")
        .filter(ctx().attr("active"))
        .sort([SortKey::desc(ctx().attr("price")), SortKey::asc(ctx().attr("name"))])
        .slice(Some(1), Some(3))
        .map(Request::record([
            ("name", ctx().attr("name")),
            ("w", ctx().attr("dims").attr("w")),
        ]));
    let query = compile(&request);

    let mut projection = IndexMap::new();
    projection.insert("name".to_string(), Projection::Field("name".to_string()));
    projection.insert("w".to_string(), Projection::Field("dims.w".to_string()));

    assert_eq!(
        query,
        DocumentQuery {
            collection: "items".to_string(),
            filter: doc! { "active": true },
            sort: doc! { "price": -1, "name": 1 },
            skip: 1,
            limit: Some(2),
            projection: Some(Projection::Record(projection)),
            count: false,
            single: None,
        }
    );
}

#[test]
fn later_sorts_take_precedence() {
    let request = Request::source("items")
        .sort_by(ctx().attr("name"))
        .sort([SortKey::desc(ctx().attr("price"))]);
    assert_eq!(compile(&request).sort, doc! { "price": -1, "name": 1 });
}

#[test]
fn identity_map_is_not_a_projection() {
    let request = Request::source("items").map(ctx());
    assert_eq!(compile(&request).projection, None);
}

#[test]
fn len_counts() {
    let request = Request::source("items").filter(ctx().attr("id").gt(2)).len();
    let query = compile(&request);
    assert!(query.count);
    assert_eq!(query.filter, doc! { "id": { "$gt": 2_i64 } });
}

#[test]
fn single_elements() {
    let request = Request::source("items")
        .filter(ctx().attr("id").eq(1))
        .one_or(Value::Null);
    assert_eq!(
        compile(&request).single,
        Some(Single::One {
            default: Some(Value::Null),
            context: "one() over items.filter((ctx(0).id == 1))".to_string(),
        })
    );

    let request = Request::source("items").sort_by(ctx().attr("id")).index(2);
    assert_eq!(compile(&request).single, Some(Single::Index(2)));

    let request = Request::source("items").index(-1);
    assert_eq!(refuse(&request).node, request.root());
}

#[test]
fn reordering_after_a_window_is_refused() {
    let request = Request::source("items")
        .slice(None, Some(2))
        .filter(ctx().attr("active"));
    assert_eq!(refuse(&request).node, request.root());

    let request = Request::source("items")
        .map(ctx().attr("name"))
        .sort_by(ctx());
    assert_eq!(refuse(&request).node, request.root());
}

#[test]
fn arithmetic_is_left_to_the_interpreter() {
    let request = Request::source("items").filter(ctx().attr("price").mul(2).gt(3));
    let compiler = Compiler::new();
    assert!(!compiler.supports(&request, request.root()));

    let Node::Filter(filter) = request.root_node() else {
        unreachable!()
    };
    assert_eq!(refuse(&request).node, filter.predicate);
}

#[test]
fn list_fields_are_not_compared() {
    let request = Request::source("items").filter(ctx().attr("tags").eq(Value::from(vec!["a"])));
    let Node::Filter(filter) = request.root_node() else {
        unreachable!()
    };
    assert_eq!(refuse(&request).node, filter.predicate);
}

#[test]
fn other_aggregates_are_refused() {
    let request = Request::source("items").map(ctx().attr("price")).sum();
    let compiler = Compiler::new();
    assert!(!compiler.supports(&request, request.root()));
    assert_eq!(refuse(&request).node, request.root());

    let chain = request.chain();
    assert!(compiler.supports(&request, chain[chain.len() - 2]));
}
