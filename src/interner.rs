//! Deduplicates identifier and string-literal text into shared `Rc<str>`.
//!
//! Grounded in the teacher's `gc::string_interner::StringInterner`, which
//! keys an `ahash`-backed `HashMap` by content hash to give O(1) lookup for
//! repeated strings. This crate has no GC (heap objects are plain `Rc`, see
//! `value` module docs), so interning here is just deduplication: the same
//! text always returns a clone of the same `Rc<str>`, which keeps globals
//! lookups and identifier comparisons cheap without requiring correctness
//! (the spec only recommends it for performance).

use ahash::RandomState;
use std::collections::HashMap;
use std::rc::Rc;

pub struct StringInterner {
    strings: HashMap<Rc<str>, (), RandomState>,
}

impl StringInterner {
    pub fn new() -> Self {
        StringInterner {
            strings: HashMap::with_hasher(RandomState::new()),
        }
    }

    /// Returns the shared `Rc<str>` for `text`, allocating a new one only if
    /// this exact content hasn't been interned yet.
    pub fn intern(&mut self, text: &str) -> Rc<str> {
        if let Some((key, _)) = self.strings.get_key_value(text) {
            return Rc::clone(key);
        }
        let rc: Rc<str> = Rc::from(text);
        self.strings.insert(Rc::clone(&rc), ());
        rc
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        StringInterner::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_content_returns_same_allocation() {
        let mut interner = StringInterner::new();
        let a = interner.intern("hello");
        let b = interner.intern("hello");
        assert!(Rc::ptr_eq(&a, &b));
    }

    #[test]
    fn different_content_is_distinct() {
        let mut interner = StringInterner::new();
        let a = interner.intern("a");
        let b = interner.intern("b");
        assert!(!Rc::ptr_eq(&a, &b));
    }
}
