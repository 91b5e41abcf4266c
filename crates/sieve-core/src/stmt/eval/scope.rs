use crate::stmt::Value;

use std::rc::Rc;

/// The stack of elements bound while evaluating nested operators.
///
/// Frames are shared, so pushing a frame for every element of a sequence does not copy the
/// enclosing frames.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    top: Option<Rc<Frame>>,
}

#[derive(Debug)]
struct Frame {
    value: Value,
    parent: Scope,
}

impl Scope {
    pub fn new() -> Scope {
        Scope::default()
    }

    /// Builds a scope from values ordered outermost first.
    pub fn from_args(args: impl IntoIterator<Item = Value>) -> Scope {
        args.into_iter()
            .fold(Scope::new(), |scope, value| scope.push(value))
    }

    /// Returns a new scope with `value` bound to `ctx(0)`.
    pub fn push(&self, value: Value) -> Scope {
        Scope {
            top: Some(Rc::new(Frame {
                value,
                parent: self.clone(),
            })),
        }
    }

    /// The element `up` frames outwards from the innermost one.
    pub fn get(&self, up: usize) -> Option<&Value> {
        let mut frame = self.top.as_ref()?;
        for _ in 0..up {
            frame = frame.parent.top.as_ref()?;
        }
        Some(&frame.value)
    }

    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut scope = self;
        while let Some(frame) = &scope.top {
            depth += 1;
            scope = &frame.parent;
        }
        depth
    }
}
