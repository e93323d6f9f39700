//! Status words returned by the TCon after a command or a data chunk.

use std::fmt;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultState {
    Ok,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultCode {
    pub code: u16,
    pub name: &'static str,
    pub message: &'static str,
    pub state: ResultState,
}

impl ResultCode {
    const fn new(code: u16, name: &'static str, message: &'static str, state: ResultState) -> Self {
        Self {
            code,
            name,
            message,
            state,
        }
    }

    /// Exact-match lookup; a code missing from the table is a protocol error.
    pub fn lookup(code: u16) -> Result<&'static ResultCode, Error> {
        RESULT_CODES
            .iter()
            .find(|r| r.code == code)
            .ok_or(Error::UnknownResultCode(code))
    }

    /// Looks up the big-endian status word as read from the bus.
    pub fn from_status(status: [u8; 2]) -> Result<&'static ResultCode, Error> {
        Self::lookup(u16::from_be_bytes(status))
    }

    pub fn is_ok(&self) -> bool {
        self.state == ResultState::Ok
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06X} {}", self.code, self.name)
    }
}

pub static RESULT_CODES: &[ResultCode] = &[
    ResultCode::new(0x0000, "OK", "OK", ResultState::Ok),
    ResultCode::new(
        0x9000,
        "EP_SW_NORMAL_PROCESSING",
        "Command successfully executed",
        ResultState::Ok,
    ),
    ResultCode::new(
        0x6700,
        "EP_SW_WRONG_LENGTH",
        "Incorrect length (invalid Lc value or command too short or too long)",
        ResultState::Error,
    ),
    ResultCode::new(
        0x6C00,
        "EP_SW_INVALID_LE",
        "Invalid Le field",
        ResultState::Error,
    ),
    ResultCode::new(
        0x6A00,
        "EP_SW_WRONG_PARAMETERS_P1P2",
        "Invalid P1 or P2 field",
        ResultState::Error,
    ),
    ResultCode::new(
        0x6D00,
        "EP_SW_INSTRUCTION_NOT_SUPPORTED",
        "Command not supported",
        ResultState::Error,
    ),
];
