//! Channel event sink.
//!
//! Forwards events to another thread (a UI, a recorder) over
//! `std::sync::mpsc`.  A dropped receiver is not an error for the session:
//! the event is discarded and logged at debug level.

use std::sync::mpsc::Sender;

use log::debug;

use crate::app::events::LinkEvent;
use crate::app::ports::EventSink;

impl EventSink for Sender<LinkEvent> {
    fn emit(&mut self, event: &LinkEvent) {
        if self.send(event.clone()).is_err() {
            debug!("event receiver gone, dropping {event:?}");
        }
    }
}
