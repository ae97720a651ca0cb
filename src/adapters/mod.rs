//! Adapters: concrete implementations of the port traits.
//!
//! | Adapter        | Implements       | Connects to                   |
//! |----------------|------------------|-------------------------------|
//! | `serial`       | Transport        | OS serial port (`serialport`) |
//! | `sim`          | Transport        | In-process board emulator     |
//! | `log_sink`     | EventSink        | `log` records                 |
//! | `channel_sink` | EventSink        | `mpsc::Sender<LinkEvent>`     |
//! | `time`         | DelayNs          | Host sleep / virtual time     |

pub mod channel_sink;
pub mod log_sink;
pub mod serial;
pub mod sim;
pub mod time;
