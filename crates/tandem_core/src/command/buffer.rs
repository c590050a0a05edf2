//! # Command Buffer
//!
//! Append-only list of records for one frame. Two of these alternate between
//! the recorder and the executor; a buffer is only ever touched by one side
//! at a time.

use std::fmt;

use super::{Command, CompletionFn};

/// A recorded command plus its optional completion notification.
pub struct Record {
    /// The operation.
    pub command: Command,
    on_release: Option<CompletionFn>,
}

impl Record {
    /// Wraps a command without a completion notification.
    #[inline]
    #[must_use]
    pub fn new(command: Command) -> Self {
        Self {
            command,
            on_release: None,
        }
    }

    /// Wraps a command that notifies `on_release` once its slot is reused.
    #[inline]
    #[must_use]
    pub fn with_completion(command: Command, on_release: CompletionFn) -> Self {
        Self {
            command,
            on_release: Some(on_release),
        }
    }

    /// Whether a completion notification is still attached.
    #[inline]
    #[must_use]
    pub fn has_completion(&self) -> bool {
        self.on_release.is_some()
    }

    fn release(&mut self) {
        if let Some(notify) = self.on_release.take() {
            notify();
        }
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("command", &self.command)
            .field("has_completion", &self.has_completion())
            .finish()
    }
}

/// One frame's worth of records in replay order.
#[derive(Debug, Default)]
pub struct CommandBuffer {
    records: Vec<Record>,
}

impl CommandBuffer {
    /// Creates a buffer with room for `capacity` records.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
        }
    }

    /// Appends a record at the end.
    #[inline]
    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    /// Number of records.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the buffer is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Reserved record slots.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.records.capacity()
    }

    /// Records in replay order.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Records in replay order, mutable so custom closures can run.
    #[inline]
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Record> {
        self.records.iter_mut()
    }

    /// Empties the buffer for reuse, keeping its allocation.
    ///
    /// Completion notifications fire here, in record order, on the calling
    /// thread. Returns how many fired.
    pub fn clear(&mut self) -> usize {
        let mut notified = 0;
        for mut record in self.records.drain(..) {
            if record.has_completion() {
                record.release();
                notified += 1;
            }
        }
        notified
    }
}

impl Drop for CommandBuffer {
    fn drop(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_push_keeps_order() {
        let mut buffer = CommandBuffer::with_capacity(4);
        buffer.push(Record::new(Command::PopDebugGroup));
        buffer.push(Record::new(Command::EndPass));
        buffer.push(Record::new(Command::Commit));

        let order: Vec<_> = buffer.iter().map(|r| r.command.kind()).collect();
        assert_eq!(
            order,
            vec![
                super::super::CommandKind::PopDebugGroup,
                super::super::CommandKind::EndPass,
                super::super::CommandKind::Commit,
            ]
        );
    }

    #[test]
    fn test_clear_fires_completions_once_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut buffer = CommandBuffer::with_capacity(4);

        for i in 0..3 {
            let log = Arc::clone(&log);
            buffer.push(Record::with_completion(
                Command::EndPass,
                Box::new(move || log.lock().push(i)),
            ));
        }
        buffer.push(Record::new(Command::Commit));

        assert_eq!(buffer.clear(), 3);
        assert!(buffer.is_empty());
        assert!(buffer.capacity() >= 4);
        assert_eq!(*log.lock(), vec![0, 1, 2]);

        // Nothing left to fire.
        assert_eq!(buffer.clear(), 0);
        assert_eq!(log.lock().len(), 3);
    }

    #[test]
    fn test_drop_fires_outstanding_completions() {
        let fired = Arc::new(AtomicUsize::new(0));
        {
            let mut buffer = CommandBuffer::default();
            let fired = Arc::clone(&fired);
            buffer.push(Record::with_completion(
                Command::Commit,
                Box::new(move || {
                    fired.fetch_add(1, Ordering::SeqCst);
                }),
            ));
        }
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }
}
