use std::fmt;
use std::sync::mpsc;
use std::sync::Arc;
use std::sync::Mutex;

use tracing::field::Field;
use tracing::field::Visit;
use tracing::Event;
use tracing::Subscriber;
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

use super::DiagnosticMessage;
use super::Severity;

/// Receiver of diagnostic messages. Implementations must never panic or
/// report errors back to the emitter; logging is best-effort.
pub trait MessageSink: Send + Sync {
    fn on_message(&self, message: &DiagnosticMessage);
}

impl<T: MessageSink + ?Sized> MessageSink for Arc<T> {
    fn on_message(&self, message: &DiagnosticMessage) {
        (**self).on_message(message);
    }
}

/// `tracing` layer that turns every event into a [`DiagnosticMessage`] and
/// hands it to each registered sink, in registration order.
#[derive(Default)]
pub struct DiagnosticLayer {
    sinks: Vec<Box<dyn MessageSink>>,
}

impl DiagnosticLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sink(mut self, sink: impl MessageSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    pub fn with_optional_sink(self, sink: Option<impl MessageSink + 'static>) -> Self {
        match sink {
            Some(sink) => self.with_sink(sink),
            None => self,
        }
    }
}

impl fmt::Debug for DiagnosticLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticLayer")
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

impl<S: Subscriber> Layer<S> for DiagnosticLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if self.sinks.is_empty() {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        let metadata = event.metadata();
        let message = DiagnosticMessage::new(
            visitor.finish(),
            metadata.target(),
            Severity::from(*metadata.level()),
        );
        for sink in &self.sinks {
            sink.on_message(&message);
        }
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: Vec<String>,
}

impl MessageVisitor {
    fn finish(self) -> String {
        if self.fields.is_empty() {
            return self.message;
        }
        let fields = self.fields.join(" ");
        if self.message.is_empty() {
            fields
        } else {
            format!("{} {}", self.message, fields)
        }
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.push(format!("{}={}", field.name(), value));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.fields.push(format!("{}={:?}", field.name(), value));
        }
    }
}

/// Keeps every message in memory. Cloning shares the same storage.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    messages: Arc<Mutex<Vec<DiagnosticMessage>>>,
}

impl MemorySink {
    pub fn messages(&self) -> Vec<DiagnosticMessage> {
        self.messages
            .lock()
            .map(|messages| messages.clone())
            .unwrap_or_default()
    }
}

impl MessageSink for MemorySink {
    fn on_message(&self, message: &DiagnosticMessage) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(message.clone());
        }
    }
}

/// Forwards messages to the on-screen console over a channel. Messages sent
/// after the console has gone away are dropped.
#[derive(Debug)]
pub struct ConsoleFeed {
    sender: mpsc::Sender<DiagnosticMessage>,
}

impl ConsoleFeed {
    pub fn channel() -> (Self, mpsc::Receiver<DiagnosticMessage>) {
        let (sender, receiver) = mpsc::channel();
        (Self { sender }, receiver)
    }
}

impl MessageSink for ConsoleFeed {
    fn on_message(&self, message: &DiagnosticMessage) {
        let _ = self.sender.send(message.clone());
    }
}
