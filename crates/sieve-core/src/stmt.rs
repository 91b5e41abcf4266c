mod eval;
pub use eval::{Evaluated, Scope, Seq};

mod infer;

mod input;
pub use input::{ConstInput, Input};

mod node;
pub use node::{Node, NodeId};

mod node_aggregate;
pub use node_aggregate::NodeAggregate;

mod node_attribute;
pub use node_attribute::NodeAttribute;

mod node_binary_op;
pub use node_binary_op::NodeBinaryOp;

mod node_context;
pub use node_context::{ctx, ctx_up, NodeContext};

mod node_distinct;
pub use node_distinct::NodeDistinct;

mod node_filter;
pub use node_filter::NodeFilter;

mod node_groupby;
pub use node_groupby::NodeGroupby;

mod node_index;
pub use node_index::NodeIndex;

mod node_literal;
pub use node_literal::NodeLiteral;

mod node_map;
pub use node_map::NodeMap;

mod node_one;
pub use node_one::NodeOne;

mod node_record;
pub use node_record::NodeRecord;

mod node_slice;
pub use node_slice::NodeSlice;

mod node_sort;
pub use node_sort::{NodeSort, NodeSortKey, SortKey};

mod node_source;
pub use node_source::NodeSource;

mod node_unary_op;
pub use node_unary_op::NodeUnaryOp;

mod op_aggregate;
pub use op_aggregate::AggregateOp;

mod op_binary;
pub use op_binary::BinaryOp;

mod op_unary;
pub use op_unary::UnaryOp;

mod pattern;
pub use pattern::Pattern;

mod request;
pub use request::Request;

mod ty;
pub use ty::{Type, TypeMapping};

mod value;
pub use value::Value;

mod value_cmp;

mod value_hash;
pub use value_hash::HashKey;
