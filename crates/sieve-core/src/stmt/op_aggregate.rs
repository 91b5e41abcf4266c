use std::fmt;

/// Aggregate reducing a sequence to one value.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub enum AggregateOp {
    Len,
    Sum,
    Min,
    Max,
}

impl fmt::Display for AggregateOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregateOp::Len => "len".fmt(f),
            AggregateOp::Sum => "sum".fmt(f),
            AggregateOp::Min => "min".fmt(f),
            AggregateOp::Max => "max".fmt(f),
        }
    }
}

impl fmt::Debug for AggregateOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
