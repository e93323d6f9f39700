//! Drive MpicoSys TCon e-paper panels from Linux.
//!
//! The protocol lives in [`tcon_epd_core`]; this crate opens the actual
//! `spidev`/`gpiochip` devices and deals with files on disk.

pub mod epd_file;
#[cfg(feature = "tcp74230")]
pub mod tcp74230;

pub use tcon_epd_core::{codec, Error, Session, SessionConfig};
