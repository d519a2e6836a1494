use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

/// Level and message of every event seen while the closure ran
type Events = Arc<Mutex<Vec<(Level, String)>>>;

#[derive(Clone, Default)]
struct EventLog(Events);

struct MessageVisitor<'a>(&'a mut String);

impl Visit for MessageVisitor<'_> {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            *self.0 = format!("{:?}", value);
        }
    }
}

impl<S: Subscriber> Layer<S> for EventLog {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut message = String::new();
        event.record(&mut MessageVisitor(&mut message));
        if let Ok(mut events) = self.0.lock() {
            events.push((*event.metadata().level(), message));
        }
    }
}

pub fn capture_events<R>(f: impl FnOnce() -> R) -> (R, Vec<(Level, String)>) {
    let log = EventLog::default();
    let subscriber = tracing_subscriber::registry().with(log.clone());
    let result = tracing::subscriber::with_default(subscriber, f);
    let events = log.0.lock().unwrap().clone();
    (result, events)
}

pub fn at_level(events: &[(Level, String)], level: Level) -> Vec<&str> {
    events
        .iter()
        .filter(|(l, _)| *l == level)
        .map(|(_, m)| m.as_str())
        .collect()
}
