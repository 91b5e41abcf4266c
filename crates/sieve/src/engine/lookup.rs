use super::{Execution, Strategy};
use crate::{Db, Result};

use sieve_core::{
    rewrite::{cut, isolate, Isolated},
    stmt::{Node, Request, Scope, Value},
};

/// Answers `source.filter(P)...` with a lookup when `P` pins every identity field of the source.
///
/// Returns `None` when the request does not have that shape.
pub(super) fn try_lookup(db: &Db, request: &Request) -> Result<Option<Execution>> {
    let chain = request.chain();
    let [source_id, filter_id, ..] = chain[..] else {
        return Ok(None);
    };
    let (Node::Source(node), Node::Filter(filter)) =
        (request.node(source_id), request.node(filter_id))
    else {
        return Ok(None);
    };
    let Some(source) = db.source(&node.name) else {
        return Ok(None);
    };
    let collection = source.collection();
    if !source.supports_lookup() || collection.identity.is_empty() {
        return Ok(None);
    }

    let isolated = isolate(&request.with_root(filter.predicate));

    let matched = if isolated.is_unsatisfiable() {
        tracing::debug!(source = %node.name, "filter can never hold");
        vec![]
    } else {
        let Some(identity) = isolated.pinned(collection.identity.iter().map(String::as_str))
        else {
            return Ok(None);
        };

        tracing::debug!(source = %node.name, ?identity, "point lookup");
        match source.lookup(&identity)? {
            Some(element) if holds(db, &isolated, &collection.identity, &element)? => {
                vec![element]
            }
            _ => vec![],
        }
    };

    let rest = cut(request, filter_id)?;
    let value = rest
        .after
        .eval_with(db, Scope::new().push(Value::List(matched)))?;

    Ok(Some(Execution {
        strategy: Strategy::PointLookup,
        value,
        fragment: None,
    }))
}

/// Checks the parts of the filter the lookup did not: bindings of non-identity fields and the
/// remainder.
fn holds(db: &Db, isolated: &Isolated, identity: &[String], element: &Value) -> Result<bool> {
    for (name, value) in &isolated.bindings {
        if !identity.contains(name) && !element.field(name)?.is_eq(value) {
            return Ok(false);
        }
    }

    isolated
        .remainder
        .eval_with(db, Scope::new().push(element.clone()))?
        .to_bool()
}
