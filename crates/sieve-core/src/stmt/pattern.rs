use super::{Node, NodeId, NodeLiteral, Request, Value};

/// A regular expression that matches like a plain string comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern<'a> {
    /// `^text$`
    Exact(&'a str),

    /// `^text`
    Prefix(&'a str),
}

const META: &[char] = &[
    '\\', '.', '+', '*', '?', '(', ')', '|', '[', ']', '{', '}', '^', '$',
];

impl<'a> Pattern<'a> {
    /// Recognizes anchored patterns without metacharacters.
    pub fn parse(pattern: &'a str) -> Option<Pattern<'a>> {
        let body = pattern.strip_prefix('^')?;
        let (body, exact) = match body.strip_suffix('$') {
            Some(body) => (body, true),
            None => (body, false),
        };

        if body.contains(META) {
            return None;
        }

        Some(if exact {
            Pattern::Exact(body)
        } else {
            Pattern::Prefix(body)
        })
    }

    /// The pattern held by the string literal at `id`.
    pub fn literal(request: &'a Request, id: NodeId) -> Option<Pattern<'a>> {
        match request.node(id) {
            Node::Literal(NodeLiteral {
                value: Value::String(pattern),
            }) => Pattern::parse(pattern),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchored_literals() {
        assert_eq!(Pattern::parse("^abc"), Some(Pattern::Prefix("abc")));
        assert_eq!(Pattern::parse("^abc$"), Some(Pattern::Exact("abc")));
        assert_eq!(Pattern::parse("^"), Some(Pattern::Prefix("")));
        assert_eq!(Pattern::parse("^50%_off"), Some(Pattern::Prefix("50%_off")));
    }

    #[test]
    fn everything_else_is_a_regex() {
        assert_eq!(Pattern::parse("abc"), None);
        assert_eq!(Pattern::parse("^a.c"), None);
        assert_eq!(Pattern::parse("^a$b$"), None);
        assert_eq!(Pattern::parse("^a\\$"), None);
    }

    #[test]
    fn only_string_literals_hold_patterns() {
        let request = Request::literal("^ab");
        assert_eq!(
            Pattern::literal(&request, request.root()),
            Some(Pattern::Prefix("ab"))
        );

        let request = Request::literal("p.a");
        assert_eq!(Pattern::literal(&request, request.root()), None);

        let request = crate::stmt::ctx().attr("pattern");
        assert_eq!(Pattern::literal(&request, request.root()), None);
    }
}
