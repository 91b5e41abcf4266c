use super::{Node, NodeId, Request};

/// `subject[start:stop]`, with negative bounds counting from the end.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSlice {
    pub subject: NodeId,
    pub start: Option<i64>,
    pub stop: Option<i64>,
}

impl NodeSlice {
    /// Returns `true` when both bounds are absent or non-negative.
    pub fn is_forward(&self) -> bool {
        self.start.map_or(true, |start| start >= 0) && self.stop.map_or(true, |stop| stop >= 0)
    }
}

impl Request {
    pub fn slice(self, start: Option<i64>, stop: Option<i64>) -> Request {
        self.wrap(|subject| {
            NodeSlice {
                subject,
                start,
                stop,
            }
            .into()
        })
    }
}

impl From<NodeSlice> for Node {
    fn from(value: NodeSlice) -> Self {
        Self::Slice(value)
    }
}
