use super::{Node, Request, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct NodeLiteral {
    pub value: Value,
}

impl Request {
    pub fn literal(value: impl Into<Value>) -> Request {
        Request::from_node(NodeLiteral {
            value: value.into(),
        })
    }

    pub fn is_literal_true(&self) -> bool {
        matches!(self.as_literal(), Some(Value::Bool(true)))
    }

    pub fn is_literal_false(&self) -> bool {
        matches!(self.as_literal(), Some(Value::Bool(false)))
    }
}

impl From<NodeLiteral> for Node {
    fn from(value: NodeLiteral) -> Self {
        Self::Literal(value)
    }
}
