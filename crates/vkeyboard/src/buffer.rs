use std::fmt;

use tracing::trace;

/// Callback invoked with the full text after every content change.
pub type Consumer = Box<dyn FnMut(&str)>;

/// A single line of text with a cursor. The cursor is a character index, and
/// is always between 0 and the number of characters in the buffer.
///
/// Every operation that changes the content calls the consumer exactly once,
/// after the change is applied. Cursor-only motion never calls it.
#[derive(Default)]
pub struct TextBuffer {
    /// Buffer content.
    value: String,
    /// Cursor position in characters.
    cursor: usize,
    /// Change notification target.
    consumer: Option<Consumer>,
}

impl fmt::Debug for TextBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextBuffer")
            .field("value", &self.value)
            .field("cursor", &self.cursor)
            .field("consumer", &self.consumer.is_some())
            .finish()
    }
}

impl TextBuffer {
    /// An empty buffer with no consumer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the change notification target, replacing any previous one.
    pub fn set_consumer(&mut self, consumer: Consumer) {
        self.consumer = Some(consumer);
    }

    /// The current content.
    pub fn text(&self) -> &str {
        &self.value
    }

    /// The cursor position in characters.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of characters in the buffer.
    pub fn len(&self) -> usize {
        self.value.chars().count()
    }

    /// Is the buffer empty?
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Byte offset of a character index.
    fn byte_offset(&self, idx: usize) -> usize {
        self.value
            .char_indices()
            .nth(idx)
            .map_or(self.value.len(), |(i, _)| i)
    }

    /// Notify the consumer of the current content.
    fn changed(&mut self) {
        trace!(text = %self.value, cursor = self.cursor, "buffer changed");
        if let Some(c) = self.consumer.as_mut() {
            c(&self.value);
        }
    }

    /// Insert a character at the cursor and advance the cursor.
    pub fn insert(&mut self, c: char) -> bool {
        let off = self.byte_offset(self.cursor);
        self.value.insert(off, c);
        self.cursor += 1;
        self.changed();
        true
    }

    /// Delete the character before the cursor. Does nothing at the start of
    /// the buffer.
    pub fn delete_before_cursor(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        let off = self.byte_offset(self.cursor - 1);
        self.value.remove(off);
        self.cursor -= 1;
        self.changed();
        true
    }

    /// Replace the whole content and put the cursor at the end. Replacing the
    /// content with identical text while the cursor is already at the end
    /// does nothing.
    pub fn replace_all(&mut self, text: &str) -> bool {
        let end = text.chars().count();
        if self.value == text && self.cursor == end {
            return false;
        }
        self.value = text.to_owned();
        self.cursor = end;
        self.changed();
        true
    }

    /// Move the cursor to a character index, clamped to the content.
    pub fn set_cursor(&mut self, idx: usize) -> bool {
        let idx = idx.min(self.len());
        let changed = self.cursor != idx;
        self.cursor = idx;
        changed
    }

    /// Move the cursor left by one character.
    pub fn left(&mut self) -> bool {
        if self.cursor > 0 {
            self.cursor -= 1;
            true
        } else {
            false
        }
    }

    /// Move the cursor right by one character.
    pub fn right(&mut self) -> bool {
        if self.cursor < self.len() {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    /// Move the cursor to the start of the content.
    pub fn home(&mut self) -> bool {
        self.set_cursor(0)
    }

    /// Move the cursor to the end of the content.
    pub fn end(&mut self) -> bool {
        self.set_cursor(self.len())
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use proptest::prelude::*;

    use super::*;

    /// A buffer whose consumer records every notification.
    fn recorded() -> (TextBuffer, Rc<RefCell<Vec<String>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut b = TextBuffer::new();
        let sink = Rc::clone(&log);
        b.set_consumer(Box::new(move |t| sink.borrow_mut().push(t.to_owned())));
        (b, log)
    }

    #[test]
    fn insert_and_delete() {
        let (mut b, log) = recorded();
        assert!(b.insert('a'));
        assert!(b.insert('c'));
        assert!(b.left());
        assert!(b.insert('b'));
        assert_eq!(b.text(), "abc");
        assert_eq!(b.cursor(), 2);

        assert!(b.delete_before_cursor());
        assert_eq!(b.text(), "ac");
        assert!(b.home());
        assert!(!b.delete_before_cursor());
        assert_eq!(*log.borrow(), vec!["a", "ac", "abc", "ac"]);
    }

    #[test]
    fn multibyte() {
        let mut b = TextBuffer::new();
        b.replace_all("é€");
        assert_eq!(b.cursor(), 2);
        b.left();
        b.insert('x');
        assert_eq!(b.text(), "éx€");
        b.delete_before_cursor();
        b.delete_before_cursor();
        assert_eq!(b.text(), "€");
        assert_eq!(b.cursor(), 0);
    }

    #[test]
    fn replace_all_notifies_unless_identical() {
        let (mut b, log) = recorded();
        assert!(b.replace_all("hello"));
        assert!(!b.replace_all("hello"));
        b.home();
        // Same text, but the cursor moves.
        assert!(b.replace_all("hello"));
        assert_eq!(b.cursor(), 5);
        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn cursor_motion_is_silent() {
        let (mut b, log) = recorded();
        b.replace_all("ab");
        assert!(!b.right());
        assert!(b.left());
        assert!(b.end());
        assert!(!b.end());
        assert!(b.set_cursor(1));
        assert!(b.set_cursor(99));
        assert_eq!(b.cursor(), 2);
        assert_eq!(log.borrow().len(), 1);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Insert(char),
        Delete,
        Replace(String),
        Left,
        Right,
        Home,
        End,
        Goto(usize),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            any::<char>().prop_map(Op::Insert),
            Just(Op::Delete),
            "\\PC{0,8}".prop_map(Op::Replace),
            Just(Op::Left),
            Just(Op::Right),
            Just(Op::Home),
            Just(Op::End),
            (0usize..20).prop_map(Op::Goto),
        ]
    }

    proptest! {
        #[test]
        fn cursor_stays_in_bounds(ops in prop::collection::vec(op(), 0..64)) {
            let (mut b, log) = recorded();
            let mut changes = 0;
            for o in ops {
                let before = b.text().to_owned();
                let changed = match o {
                    Op::Insert(c) => b.insert(c),
                    Op::Delete => b.delete_before_cursor(),
                    Op::Replace(s) => b.replace_all(&s),
                    Op::Left => { b.left(); false }
                    Op::Right => { b.right(); false }
                    Op::Home => { b.home(); false }
                    Op::End => { b.end(); false }
                    Op::Goto(i) => { b.set_cursor(i); false }
                };
                if changed {
                    changes += 1;
                } else {
                    prop_assert_eq!(b.text(), before.as_str());
                }
                prop_assert!(b.cursor() <= b.len());
            }
            prop_assert_eq!(log.borrow().len(), changes);
        }
    }
}
