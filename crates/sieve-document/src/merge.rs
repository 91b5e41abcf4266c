//! Combining filter documents.

use bson::{Bson, Document};

/// Conjunction of two filter documents.
///
/// Operators on the same field are merged into one document when they do not collide, so
/// `{a: {$gt: 1}}` and `{a: {$lt: 5}}` give `{a: {$gt: 1, $lt: 5}}`. Anything else falls back to
/// `{$and: [lhs, rhs]}`.
pub fn and(lhs: Document, rhs: Document) -> Document {
    if lhs.is_empty() {
        return rhs;
    }
    if rhs.is_empty() {
        return lhs;
    }

    let mut merged = lhs.clone();
    if deep_merge(&mut merged, &rhs) {
        return merged;
    }

    let mut operands = conjuncts(lhs);
    operands.extend(conjuncts(rhs));
    let mut doc = Document::new();
    doc.insert("$and", Bson::Array(operands.into_iter().map(Bson::Document).collect()));
    doc
}

/// Disjunction of two filter documents. Nested `$or` documents are flattened.
pub fn or(lhs: Document, rhs: Document) -> Document {
    let mut operands = disjuncts(lhs);
    operands.extend(disjuncts(rhs));
    let mut doc = Document::new();
    doc.insert("$or", Bson::Array(operands.into_iter().map(Bson::Document).collect()));
    doc
}

/// Merges `src` into `dst` key-wise. Returns `false` if the two disagree somewhere, in which
/// case `dst` is left partially merged.
///
/// Nested documents are merged recursively, `$and` lists are concatenated, and equal values are
/// kept once.
pub fn deep_merge(dst: &mut Document, src: &Document) -> bool {
    for (key, value) in src {
        let Some(existing) = dst.get_mut(key) else {
            dst.insert(key.clone(), value.clone());
            continue;
        };

        let merged = match (existing, value) {
            (Bson::Document(existing), Bson::Document(value)) if is_operators(existing) => {
                is_operators(value) && deep_merge(existing, value)
            }
            (Bson::Array(existing), Bson::Array(value)) if key == "$and" => {
                existing.extend(value.iter().cloned());
                true
            }
            (existing, value) => *existing == *value,
        };
        if !merged {
            return false;
        }
    }
    true
}

/// Returns `true` for `{$op: ..}` documents. A document of plain fields is an exact value.
fn is_operators(doc: &Document) -> bool {
    doc.keys().all(|key| key.starts_with('$'))
}

fn conjuncts(doc: Document) -> Vec<Document> {
    split_operands(doc, "$and")
}

fn disjuncts(doc: Document) -> Vec<Document> {
    split_operands(doc, "$or")
}

fn split_operands(mut doc: Document, op: &str) -> Vec<Document> {
    if doc.len() == 1 {
        if let Some(Bson::Array(operands)) = doc.get(op) {
            if operands.iter().all(|operand| matches!(operand, Bson::Document(_))) {
                if let Some(Bson::Array(operands)) = doc.remove(op) {
                    return operands
                        .into_iter()
                        .filter_map(|operand| match operand {
                            Bson::Document(operand) => Some(operand),
                            _ => None,
                        })
                        .collect();
                }
            }
        }
    }
    vec![doc]
}
