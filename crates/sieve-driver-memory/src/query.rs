use crate::filter::{lookup, Matcher};

use bson::{Bson, Document};
use sieve_core::{stmt::Value, Error, Result};
use sieve_document::{value::from_document, DocumentQuery, Projection, Single};

use std::cmp::Ordering;

/// Runs `query` over the documents of its collection, in storage order.
pub(crate) fn run<'a>(
    query: &DocumentQuery,
    documents: impl Iterator<Item = &'a Document>,
) -> Result<Value> {
    let mut matcher = Matcher::default();
    let mut elements = vec![];
    for document in documents {
        let element = from_document(document)?;
        if matcher.matches(&query.filter, &element)? {
            elements.push(element);
        }
    }

    if !query.sort.is_empty() {
        sort(&mut elements, &query.sort);
    }

    let skip = usize::try_from(query.skip).unwrap_or(usize::MAX);
    let limit = query
        .limit
        .map_or(usize::MAX, |limit| usize::try_from(limit).unwrap_or(usize::MAX));
    let elements = elements
        .into_iter()
        .skip(skip)
        .take(limit)
        .map(|element| match &query.projection {
            Some(projection) => project(projection, &element),
            None => Ok(element),
        })
        .collect::<Result<Vec<_>>>()?;

    if query.count {
        return Ok(Value::I64(elements.len() as i64));
    }

    match &query.single {
        None => Ok(Value::List(elements)),
        Some(Single::One { default, context }) => {
            let mut elements = elements.into_iter();
            match (elements.next(), elements.next()) {
                (Some(element), None) => Ok(element),
                (None, _) => default
                    .clone()
                    .ok_or_else(|| Error::empty_result(context.clone())),
                (Some(_), Some(_)) => Err(Error::multiple_results(context.clone())),
            }
        }
        Some(Single::Index(index)) => {
            let len = elements.len();
            usize::try_from(*index)
                .ok()
                .and_then(|index| elements.into_iter().nth(index))
                .ok_or_else(|| Error::index_out_of_range(*index as i64, len))
        }
    }
}

/// Stable sort on the keys of `order`, most significant first. Missing fields sort as null.
fn sort(elements: &mut Vec<Value>, order: &Document) {
    let keys: Vec<(&str, bool)> = order
        .iter()
        .map(|(path, direction)| (path.as_str(), is_descending(direction)))
        .collect();

    let mut rows: Vec<(Vec<Value>, Value)> = std::mem::take(elements)
        .into_iter()
        .map(|element| {
            let values = keys
                .iter()
                .map(|(path, _)| lookup(&element, path).cloned().unwrap_or(Value::Null))
                .collect();
            (values, element)
        })
        .collect();

    rows.sort_by(|(lhs, _), (rhs, _)| {
        keys.iter()
            .zip(lhs.iter().zip(rhs))
            .map(|((_, descending), (lhs, rhs))| {
                let ordering = lhs.total_cmp(rhs);
                if *descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    });

    elements.extend(rows.into_iter().map(|(_, element)| element));
}

fn is_descending(direction: &Bson) -> bool {
    match direction {
        Bson::Int32(v) => *v < 0,
        Bson::Int64(v) => *v < 0,
        Bson::Double(v) => *v < 0.0,
        _ => false,
    }
}

fn project(projection: &Projection, element: &Value) -> Result<Value> {
    match projection {
        Projection::Element => Ok(element.clone()),
        Projection::Field(path) => path
            .split('.')
            .try_fold(element, |value, name| value.field(name))
            .cloned(),
        Projection::Record(fields) => fields
            .iter()
            .map(|(name, field)| Ok((name.clone(), project(field, element)?)))
            .collect::<Result<_>>()
            .map(Value::Mapping),
    }
}
