//! Rewrites used to find the parts of a request a backend can run.
//!
//! Rewrites never touch existing nodes. They append the nodes they build to a copy of the
//! request's arena, so ids from the input stay valid in the output.

mod cut;
pub use cut::{cut, recompose, replace_on_chain, Cut};

mod fields;
pub use fields::{element_fields, ElementFields};

mod isolate;
pub use isolate::{isolate, Isolated};

mod split;
pub use split::{conjuncts, split, split_by, split_in, Split};

mod transform;
pub use transform::{shift, transform};
