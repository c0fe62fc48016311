use alloc::{collections::VecDeque, string::String};

/// Accumulator for the raw characters of the token being scanned.
///
/// An unbounded buffer grows with its token. A bounded buffer keeps only the
/// last `limit` characters, which is enough to recognise multi-character
/// closing delimiters (`-->`, `<!ENTITY`) without holding the whole run.
///
/// The same structure holds carry-over input that was not consumed before a
/// cooperative stop.
#[derive(Debug, Clone, Default)]
pub(crate) struct RollingBuffer {
    data: VecDeque<char>,
    limit: Option<usize>,
}

impl RollingBuffer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn bounded(limit: usize) -> Self {
        Self {
            data: VecDeque::with_capacity(limit),
            limit: Some(limit),
        }
    }

    pub(crate) fn with_limit(limit: Option<usize>) -> Self {
        match limit {
            Some(limit) => Self::bounded(limit),
            None => Self::new(),
        }
    }

    #[inline]
    pub(crate) fn push(&mut self, c: char) {
        if let Some(limit) = self.limit {
            if limit == 0 {
                return;
            }
            if self.data.len() == limit {
                self.data.pop_front();
            }
        }
        self.data.push_back(c);
    }

    pub(crate) fn push_str(&mut self, text: &str) {
        for c in text.chars() {
            self.push(c);
        }
    }

    #[inline]
    pub(crate) fn pop_front(&mut self) -> Option<char> {
        self.data.pop_front()
    }

    pub(crate) fn len(&self) -> usize {
        self.data.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.data.clear();
    }

    pub(crate) fn first(&self) -> Option<char> {
        self.data.front().copied()
    }

    /// Whether the buffered characters are exactly `s`.
    pub(crate) fn is(&self, s: &str) -> bool {
        self.data.len() == s.chars().count() && self.data.iter().copied().eq(s.chars())
    }

    pub(crate) fn ends_with(&self, suffix: &str) -> bool {
        let n = suffix.chars().count();
        n <= self.data.len() && self.data.iter().rev().take(n).copied().eq(suffix.chars().rev())
    }

    /// Return the buffered characters, resetting the length to zero.
    pub(crate) fn flush(&mut self) -> String {
        self.data.drain(..).collect()
    }

    /// Buffered characters, left in place.
    #[cfg(test)]
    pub(crate) fn contents(&self) -> String {
        self.data.iter().collect()
    }
}
