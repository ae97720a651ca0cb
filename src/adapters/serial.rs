//! Serial-line transport built on the `serialport` crate.
//!
//! Line settings are fixed by the boards: 8 data bits, no parity, one stop
//! bit, no flow control.  Reads never block on the OS: pending input is
//! checked with `bytes_to_read()` every [`ReadTiming::poll_step`] through
//! the injected delay, up to [`ReadTiming::timeout`].

use std::io::{Read, Write};

use embedded_hal::delay::DelayNs;
use log::{debug, warn};
use serialport::{ClearBuffer, DataBits, FlowControl, Parity, SerialPort, StopBits};

use crate::error::LinkError;
use crate::link::transport::{ReadTiming, Transport, poll_until_ready};

pub struct SerialTransport<D> {
    port_name: String,
    baud_rate: u32,
    timing: ReadTiming,
    delay: D,
    port: Option<Box<dyn SerialPort>>,
}

impl<D: DelayNs> SerialTransport<D> {
    pub fn new(port_name: &str, baud_rate: u32, timing: ReadTiming, delay: D) -> Self {
        Self {
            port_name: port_name.to_owned(),
            baud_rate,
            timing,
            delay,
            port: None,
        }
    }

    pub fn baud_rate(&self) -> u32 {
        self.baud_rate
    }

    pub fn timing(&self) -> ReadTiming {
        self.timing
    }

    fn port_mut(&mut self) -> Result<&mut Box<dyn SerialPort>, LinkError> {
        self.port.as_mut().ok_or(LinkError::NotOpen)
    }
}

impl<D: DelayNs> Transport for SerialTransport<D> {
    fn configure(&mut self, port: &str, baud_rate: u32) {
        port.clone_into(&mut self.port_name);
        self.baud_rate = baud_rate;
    }

    fn port_name(&self) -> &str {
        &self.port_name
    }

    fn open(&mut self) -> Result<(), LinkError> {
        if self.port.is_some() {
            return Ok(());
        }
        let port = serialport::new(&self.port_name, self.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(self.timing.poll_step)
            .open()?;
        port.clear(ClearBuffer::All)?;
        debug!("{} open at {} baud", self.port_name, self.baud_rate);
        self.port = Some(port);
        Ok(())
    }

    fn close(&mut self) -> Result<(), LinkError> {
        // Dropping the handle releases the OS port.
        self.port = None;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.port.is_some()
    }

    fn send_byte(&mut self, byte: u8) -> Result<(), LinkError> {
        let port = self.port_mut()?;
        let result = port.write_all(&[byte]).and_then(|()| port.flush());
        result.map_err(|e| {
            warn!("write 0x{byte:02X} failed: {e}");
            LinkError::from(e)
        })
    }

    fn read_byte(&mut self) -> Result<u8, LinkError> {
        let port = self.port.as_mut().ok_or(LinkError::NotOpen)?;
        poll_until_ready(&mut self.delay, &self.timing, || {
            Ok(port.bytes_to_read()? > 0)
        })?;
        let mut buf = [0u8; 1];
        port.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    fn discard_input(&mut self) -> Result<(), LinkError> {
        self.port_mut()?.clear(ClearBuffer::Input)?;
        Ok(())
    }
}

/// Names of the serial ports the OS reports, for `--list-ports`.
pub fn available_ports() -> Vec<String> {
    match serialport::available_ports() {
        Ok(ports) => ports.into_iter().map(|p| p.port_name).collect(),
        Err(e) => {
            warn!("cannot enumerate serial ports: {e}");
            Vec::new()
        }
    }
}
