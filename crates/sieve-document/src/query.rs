use bson::Document;
use indexmap::IndexMap;
use sieve_core::{driver::Fragment, stmt::Value};

use std::{any::Any, fmt};

/// A find on one collection, in the terms of a document store.
///
/// Stages apply in a fixed order: `filter`, `sort`, `skip`, `limit`, `projection`, then either
/// `count` or `single`.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentQuery {
    pub collection: String,

    /// Filter document, `{}` matches everything.
    pub filter: Document,

    /// Field paths to `1` (ascending) or `-1` (descending), most significant first.
    pub sort: Document,

    pub skip: u64,
    pub limit: Option<u64>,

    /// `None` returns whole documents.
    pub projection: Option<Projection>,

    /// Return the number of documents instead of the documents.
    pub count: bool,

    pub single: Option<Single>,
}

/// How each matched document is turned into a result element.
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    /// The whole document.
    Element,

    /// The value at a dotted path.
    Field(String),

    /// A new mapping built from projections.
    Record(IndexMap<String, Projection>),
}

/// Selects one element of the results.
#[derive(Debug, Clone, PartialEq)]
pub enum Single {
    /// Exactly one element, or `default` when there is none.
    One {
        default: Option<Value>,
        context: String,
    },

    /// The element at a position.
    Index(u64),
}

impl DocumentQuery {
    pub fn new(collection: impl Into<String>) -> DocumentQuery {
        DocumentQuery {
            collection: collection.into(),
            filter: Document::new(),
            sort: Document::new(),
            skip: 0,
            limit: None,
            projection: None,
            count: false,
            single: None,
        }
    }

    /// Returns `true` once skip or limit are set. Later filters and sorts no longer commute.
    pub fn is_windowed(&self) -> bool {
        self.skip > 0 || self.limit.is_some()
    }

    /// Narrows the results to `[start, stop)` of the current results. Bounds are non-negative.
    pub fn slice(&mut self, start: Option<i64>, stop: Option<i64>) {
        let start = start.map_or(0, |start| start.max(0) as u64);
        let stop = stop.map(|stop| (stop.max(0) as u64).saturating_sub(start));
        let remaining = self.limit.map(|limit| limit.saturating_sub(start));

        self.skip = self.skip.saturating_add(start);
        self.limit = match (remaining, stop) {
            (Some(remaining), Some(stop)) => Some(remaining.min(stop)),
            (limit, None) | (None, limit) => limit,
        };
    }
}

impl fmt::Display for DocumentQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.find({})", self.collection, self.filter)?;
        if !self.sort.is_empty() {
            write!(f, ".sort({})", self.sort)?;
        }
        if self.skip > 0 {
            write!(f, ".skip({})", self.skip)?;
        }
        if let Some(limit) = self.limit {
            write!(f, ".limit({limit})")?;
        }
        if let Some(projection) = &self.projection {
            write!(f, ".project({projection})")?;
        }
        if self.count {
            f.write_str(".count()")?;
        }
        match &self.single {
            Some(Single::One { .. }) => f.write_str(".one()"),
            Some(Single::Index(index)) => write!(f, ".index({index})"),
            None => Ok(()),
        }
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Projection::Element => f.write_str("$$ROOT"),
            Projection::Field(path) => write!(f, "${path}"),
            Projection::Record(fields) => {
                f.write_str("{")?;
                for (i, (name, field)) in fields.iter().enumerate() {
                    let sep = if i == 0 { " " } else { ", " };
                    write!(f, "{sep}{name}: {field}")?;
                }
                f.write_str(" }")
            }
        }
    }
}

impl Fragment for DocumentQuery {
    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}
