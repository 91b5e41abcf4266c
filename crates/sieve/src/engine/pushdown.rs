use super::{Execution, Strategy};
use crate::{Db, Result};

use sieve_core::{
    driver::{Backend, CannotPushDown, Fragment},
    rewrite::{cut, replace_on_chain, split_in},
    schema::Schema,
    stmt::{BinaryOp, Node, NodeBinaryOp, NodeFilter, NodeId, Request, Scope},
};

/// The part of a request a backend accepted.
struct Plan {
    /// The request, possibly with a filter split in two
    request: Request,

    /// Root of the pushed prefix, on the chain of `request`
    marker: NodeId,

    fragment: Box<dyn Fragment>,
}

/// Runs as much of `request` as possible on `backend`.
///
/// Returns `None` when not even the bottom of the chain can be pushed down.
pub(super) fn try_pushdown(
    db: &Db,
    backend: &dyn Backend,
    request: &Request,
) -> Result<Option<Execution>> {
    let Some(plan) = plan(db.schema(), backend, request) else {
        return Ok(None);
    };
    let fragment = plan.fragment.to_string();

    if plan.marker == request.root() {
        tracing::debug!(store = backend.store(), %fragment, "pushing down request");
        let value = backend.run(plan.fragment)?;
        return Ok(Some(Execution {
            strategy: Strategy::Pushed,
            value,
            fragment: Some(fragment),
        }));
    }

    let rest = cut(&plan.request, plan.marker)?;
    tracing::debug!(
        store = backend.store(),
        %fragment,
        rest = %rest.after,
        "pushing down a prefix"
    );
    let prefix = backend.run(plan.fragment)?;
    let value = rest.after.eval_with(db, Scope::new().push(prefix))?;

    Ok(Some(Execution {
        strategy: Strategy::PartialCut,
        value,
        fragment: Some(fragment),
    }))
}

/// Finds the longest prefix of the chain the backend compiles.
///
/// Each refusal moves the cut below the chain entry holding the refused node. A refused `and`
/// filter is first split so that its supported conjuncts stay in the prefix.
fn plan(schema: &Schema, backend: &dyn Backend, request: &Request) -> Option<Plan> {
    let mut request = request.clone();
    let mut marker = request.root();

    loop {
        let prefix = request.with_root(marker);
        if prefix.sources().is_empty() {
            tracing::debug!(%prefix, "prefix reads no source");
            return None;
        }

        let refused = match compile(schema, backend, &prefix) {
            Ok(fragment) => {
                return Some(Plan {
                    request,
                    marker,
                    fragment,
                })
            }
            Err(refused) => refused,
        };
        tracing::debug!(%prefix, %refused, "backend refused prefix");

        let chain = prefix.chain();
        let position = chain
            .iter()
            .position(|&entry| prefix.contains(entry, refused.node))?;
        if position == 0 {
            return None;
        }

        if let Some((rewritten, pushed)) = split_filter(backend, &request, chain[position]) {
            request = rewritten;
            marker = pushed;
        } else {
            marker = chain[position - 1];
        }
    }
}

fn compile(
    schema: &Schema,
    backend: &dyn Backend,
    prefix: &Request,
) -> core::result::Result<Box<dyn Fragment>, CannotPushDown> {
    let unsupported = prefix
        .chain()
        .into_iter()
        .find(|&entry| !backend.supports(prefix, entry));
    if let Some(entry) = unsupported {
        return Err(CannotPushDown::new(entry, "unsupported operation"));
    }

    backend.compile(schema, prefix)
}

/// Splits the `and` predicate of the filter at `entry` into a filter of the conjuncts the
/// backend supports followed by a filter of the others.
///
/// Returns the rewritten request and the lower filter.
fn split_filter(
    backend: &dyn Backend,
    request: &Request,
    entry: NodeId,
) -> Option<(Request, NodeId)> {
    let Node::Filter(NodeFilter { subject, predicate }) = request.node(entry) else {
        return None;
    };
    let (subject, predicate) = (*subject, *predicate);
    if !matches!(
        request.node(predicate),
        Node::BinaryOp(NodeBinaryOp {
            op: BinaryOp::And,
            ..
        })
    ) {
        return None;
    }

    let mut rewritten = request.clone();
    let (local, remainder) = split_in(&mut rewritten, predicate, |request, id| {
        backend.supports(request, id)
    });
    if rewritten.with_root(local).is_literal_true() || rewritten.with_root(remainder).is_literal_true()
    {
        return None;
    }

    let pushed = rewritten.push(NodeFilter {
        subject,
        predicate: local,
    });
    let kept = rewritten.push(NodeFilter {
        subject: pushed,
        predicate: remainder,
    });
    let rewritten = replace_on_chain(&rewritten, entry, kept).ok()?;

    tracing::debug!(
        pushed = %rewritten.with_root(pushed),
        "split filter"
    );
    Some((rewritten, pushed))
}
