use std::collections::VecDeque;

use crate::error::ParseError;

/// A first-in first-out queue of raw argument strings.
///
/// Consumption is destructive: a command's parser continues on the same
/// stream its parent was reading from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenStream {
    tokens: VecDeque<String>,
}

impl TokenStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, token: impl Into<String>) {
        self.tokens.push_back(token.into());
    }

    pub fn has_next(&self) -> bool {
        !self.tokens.is_empty()
    }

    /// Consume the front token.
    pub fn next_token(&mut self) -> Result<String, ParseError> {
        self.tokens.pop_front().ok_or(ParseError::EmptyStream)
    }

    pub fn peek(&self) -> Option<&str> {
        self.tokens.front().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for TokenStream {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut stream = Self::new();
        stream.extend(iter);
        stream
    }
}

impl<S: Into<String>> Extend<S> for TokenStream {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.tokens.extend(iter.into_iter().map(Into::into));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consumes_in_order() {
        let mut stream: TokenStream = ["a", "b"].into_iter().collect();
        stream.append("c");
        assert_eq!(stream.len(), 3);
        assert_eq!(stream.peek(), Some("a"));
        assert_eq!(stream.next_token().unwrap(), "a");
        assert_eq!(stream.next_token().unwrap(), "b");
        assert_eq!(stream.next_token().unwrap(), "c");
        assert!(!stream.has_next());
        assert!(stream.is_empty());
    }

    #[test]
    fn empty_stream_is_an_error() {
        let mut stream = TokenStream::new();
        assert_eq!(stream.next_token(), Err(ParseError::EmptyStream));
        assert_eq!(stream.peek(), None);
    }
}
