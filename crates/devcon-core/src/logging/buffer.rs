use std::collections::VecDeque;

use super::DiagnosticMessage;

/// On-screen scrollback. Holds at most `scrollback` messages and drops the
/// oldest when full; a zero scrollback still keeps the latest message.
#[derive(Debug, Clone)]
pub struct LogBuffer {
    scrollback: usize,
    messages: VecDeque<DiagnosticMessage>,
}

impl LogBuffer {
    pub fn new(scrollback: usize) -> Self {
        let scrollback = scrollback.max(1);
        Self {
            scrollback,
            messages: VecDeque::with_capacity(scrollback),
        }
    }

    pub fn append(&mut self, message: DiagnosticMessage) {
        if self.messages.len() == self.scrollback {
            self.messages.pop_front();
        }
        self.messages.push_back(message);
    }

    /// The order the console draws in.
    pub fn newest_first(&self) -> impl Iterator<Item = &DiagnosticMessage> {
        self.messages.iter().rev()
    }
}
