//! Scripted transport and fake delay for integration tests.
//!
//! [`ScriptedLink`] answers each request code from a per-code queue of
//! [`Reply`]s and timestamps every written byte with the shared
//! [`FakeDelay`] clock, so tests can assert both the byte sequence and the
//! pacing between bytes without sleeping.

use std::cell::Cell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::time::Duration;

use embedded_hal::delay::DelayNs;
use homelink::LinkError;
use homelink::link::transport::Transport;

// ── Fake delay ────────────────────────────────────────────────

/// Virtual clock advanced only by `DelayNs` calls.  Clones share time.
#[derive(Debug, Clone, Default)]
pub struct FakeDelay {
    now_ns: Rc<Cell<u64>>,
}

#[allow(dead_code)]
impl FakeDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        Duration::from_nanos(self.now_ns.get())
    }

    pub fn advance(&self, by: Duration) {
        let ns = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        self.now_ns.set(self.now_ns.get() + ns);
    }
}

impl DelayNs for FakeDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.now_ns.set(self.now_ns.get() + u64::from(ns));
    }
}

// ── Scripted link ─────────────────────────────────────────────

/// What the board does with one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    Byte(u8),
    /// Request accepted, nothing comes back.
    Silent,
}

pub struct ScriptedLink {
    port: String,
    open: bool,
    clock: FakeDelay,
    /// Virtual time a failed read costs (the bounded wait).
    read_timeout: Duration,
    script: HashMap<u8, VecDeque<Reply>>,
    pending: VecDeque<u8>,
    fail_writes: bool,
    pub writes: Vec<(Duration, u8)>,
    pub discards: u32,
}

#[allow(dead_code)]
impl ScriptedLink {
    pub fn new(clock: FakeDelay) -> Self {
        Self {
            port: String::from("mock0"),
            open: false,
            clock,
            read_timeout: Duration::from_millis(500),
            script: HashMap::new(),
            pending: VecDeque::new(),
            fail_writes: false,
            writes: Vec::new(),
            discards: 0,
        }
    }

    /// Queue replies for `code`, consumed one per request.
    pub fn script(&mut self, code: u8, replies: &[Reply]) -> &mut Self {
        self.script.entry(code).or_default().extend(replies.iter().copied());
        self
    }

    /// Shorthand: `code` answers `byte` the next `times` requests.
    pub fn answer(&mut self, code: u8, byte: u8, times: usize) -> &mut Self {
        self.script(code, &vec![Reply::Byte(byte); times])
    }

    /// A byte already waiting in the input buffer.
    pub fn preload(&mut self, byte: u8) {
        self.pending.push_back(byte);
    }

    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    pub fn written(&self) -> Vec<u8> {
        self.writes.iter().map(|&(_, b)| b).collect()
    }

    pub fn write_times(&self) -> Vec<Duration> {
        self.writes.iter().map(|&(t, _)| t).collect()
    }
}

impl Transport for ScriptedLink {
    fn configure(&mut self, port: &str, _baud_rate: u32) {
        self.port = port.to_owned();
    }

    fn port_name(&self) -> &str {
        &self.port
    }

    fn open(&mut self) -> Result<(), LinkError> {
        self.open = true;
        Ok(())
    }

    fn close(&mut self) -> Result<(), LinkError> {
        self.open = false;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn send_byte(&mut self, byte: u8) -> Result<(), LinkError> {
        if !self.open {
            return Err(LinkError::NotOpen);
        }
        if self.fail_writes {
            return Err(LinkError::Io(std::io::ErrorKind::BrokenPipe));
        }
        self.writes.push((self.clock.now(), byte));
        if let Some(Reply::Byte(b)) = self.script.get_mut(&byte).and_then(VecDeque::pop_front) {
            self.pending.push_back(b);
        }
        Ok(())
    }

    fn read_byte(&mut self) -> Result<u8, LinkError> {
        if !self.open {
            return Err(LinkError::NotOpen);
        }
        match self.pending.pop_front() {
            Some(b) => Ok(b),
            None => {
                self.clock.advance(self.read_timeout);
                Err(LinkError::Timeout)
            }
        }
    }

    fn discard_input(&mut self) -> Result<(), LinkError> {
        if !self.open {
            return Err(LinkError::NotOpen);
        }
        self.discards += 1;
        self.pending.clear();
        Ok(())
    }
}
