//! Collections shared by the scenario tests.

use sieve::{
    schema::Collection,
    stmt::{Type, Value},
};

pub fn json(value: serde_json::Value) -> Value {
    value.into()
}

/// `rows`: three elements with a composite of `toto` and `tata` and a `price`.
pub fn rows() -> Collection {
    Collection::new("rows")
        .field("id", Type::I64)
        .field("toto", Type::String)
        .field("tata", Type::I64)
        .field("price", Type::I64)
        .identity(["id"])
}

pub fn rows_data() -> Vec<Value> {
    json(serde_json::json!([
        {"id": 1, "toto": "foo", "tata": 42, "price": 10},
        {"id": 2, "toto": "bar", "tata": 6, "price": 12},
        {"id": 3, "toto": "bar", "tata": 42, "price": 5},
    ]))
    .into_list()
    .unwrap()
}

/// `items`: a catalog with reals, booleans and strings to filter on.
pub fn items() -> Collection {
    Collection::new("items")
        .field("id", Type::I64)
        .field("name", Type::String)
        .field("category", Type::String)
        .field("price", Type::F64)
        .field("stock", Type::I64)
        .field("active", Type::Bool)
        .identity(["id"])
}

pub fn items_data() -> Vec<Value> {
    json(serde_json::json!([
        {"id": 1, "name": "apple", "category": "fruit", "price": 1.5, "stock": 10, "active": true},
        {"id": 2, "name": "pear", "category": "fruit", "price": 2.25, "stock": 0, "active": false},
        {"id": 3, "name": "plum", "category": "fruit", "price": 0.5, "stock": 7, "active": true},
        {"id": 4, "name": "leek", "category": "vegetable", "price": 3.0, "stock": 2, "active": true},
        {"id": 5, "name": "pea", "category": "vegetable", "price": 4.75, "stock": 31, "active": false},
        {"id": 6, "name": "parsley", "category": "herb", "price": 1.25, "stock": 4, "active": true},
    ]))
    .into_list()
    .unwrap()
}

/// `orders`: references `items` by `item`.
pub fn orders() -> Collection {
    Collection::new("orders")
        .field("id", Type::I64)
        .field("item", Type::I64)
        .field("quantity", Type::I64)
        .identity(["id"])
}

pub fn orders_data() -> Vec<Value> {
    json(serde_json::json!([
        {"id": 1, "item": 1, "quantity": 3},
        {"id": 2, "item": 4, "quantity": 1},
        {"id": 3, "item": 1, "quantity": 2},
        {"id": 4, "item": 6, "quantity": 5},
    ]))
    .into_list()
    .unwrap()
}
