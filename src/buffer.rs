//! Limited run buffer.

/// Buffer holding the elements of a run being built, limited by elements count.
pub struct RunBuffer {
    limit: usize,
    inner: Vec<i32>,
}

impl RunBuffer {
    /// Creates an empty buffer holding at most `limit` elements.
    pub fn new(limit: usize) -> Self {
        RunBuffer {
            limit,
            inner: Vec::new(),
        }
    }

    /// Creates an empty buffer holding at most `limit` elements,
    /// preallocated for `expected` of them but never more than `limit`.
    pub fn with_capacity(limit: usize, expected: usize) -> Self {
        RunBuffer {
            limit,
            inner: Vec::with_capacity(limit.min(expected)),
        }
    }

    /// Adds a new element to the buffer.
    pub fn push(&mut self, item: i32) {
        self.inner.push(item);
    }

    /// Returns buffer length
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Checks if the buffer reached the limit.
    pub fn is_full(&self) -> bool {
        self.inner.len() >= self.limit
    }

    /// Sorts buffered elements in ascending order.
    pub fn sort(&mut self) {
        self.inner.sort_unstable();
    }

    /// Removes all elements keeping the allocated memory.
    pub fn clear(&mut self) {
        self.inner.clear();
    }

    pub fn as_slice(&self) -> &[i32] {
        &self.inner
    }
}

impl<'a> IntoIterator for &'a RunBuffer {
    type Item = &'a i32;
    type IntoIter = std::slice::Iter<'a, i32>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}
