//! Protocol engine for MpicoSys TCon driven e-paper panels.
//!
//! The panel is commanded over SPI with two extra lines: an active-low enable
//! pin and a busy pin. Everything here is generic over
//! [embedded-hal](https://docs.rs/embedded-hal/latest/embedded_hal/), see the
//! `tcon_epd` crate for the Linux binding.

pub mod bus_interface;
pub mod codec;
pub mod command;
pub mod config;
pub mod device_info;
pub mod error;
pub mod machine;
pub mod result_code;
pub mod session;
pub mod transfer;

pub use config::SessionConfig;
pub use error::{Error, TimeOutError};
pub use session::Session;
