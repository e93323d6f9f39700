//! The enable → busy check → action → settle → disable sequence every
//! command runs through.

use std::{fmt, time::Duration};

use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
    spi::SpiDevice,
};

use crate::{bus_interface::BusInterface, command::Command, error::Error};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandState {
    Idle,
    Enabling,
    CheckingBusy,
    Executing,
    AwaitingQuiescence,
    Disabling,
    Done,
    Errored,
}

impl fmt::Display for CommandState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Drives one command through the sequence, recording progress in `state`.
pub struct CommandMachine<'s, Spi, I, O, D> {
    bus: &'s mut BusInterface<Spi, I, O, D>,
    state: &'s mut CommandState,
    quiescence_timeout: Duration,
}

impl<'s, Spi, I, O, D> CommandMachine<'s, Spi, I, O, D>
where
    Spi: SpiDevice,
    I: InputPin,
    O: OutputPin,
    D: DelayNs,
{
    pub fn new(
        bus: &'s mut BusInterface<Spi, I, O, D>,
        state: &'s mut CommandState,
        quiescence_timeout: Duration,
    ) -> Self {
        Self {
            bus,
            state,
            quiescence_timeout,
        }
    }

    fn enter(&mut self, state: CommandState) {
        log::trace!("{} -> {}", self.state, state);
        *self.state = state;
    }

    fn fail<T>(&mut self, err: Error) -> Result<T, Error> {
        self.enter(CommandState::Errored);
        Err(err)
    }

    /// Runs `action` with the panel enabled.
    ///
    /// A busy (or silent) panel aborts the sequence before `action` runs and
    /// stays enabled: the panel needs the line held while it finishes, so no
    /// disable is attempted here. Once `action` has run, the panel is always
    /// given `quiescence_timeout` to settle and then disabled, and the first
    /// failure of action, settling or disabling is returned.
    pub fn execute<T, F>(mut self, action: F) -> Result<T, Error>
    where
        F: FnOnce(&mut BusInterface<Spi, I, O, D>) -> Result<T, Error>,
    {
        self.enter(CommandState::Enabling);
        if let Err(kind) = self.bus.set_enabled(true) {
            return self.fail(Error::EnableError(kind));
        }

        self.enter(CommandState::CheckingBusy);
        match self.bus.is_busy() {
            Ok(false) => {}
            Ok(true) | Err(_) => return self.fail(Error::BusyOrUnreachable),
        }

        self.enter(CommandState::Executing);
        let outcome = action(&mut *self.bus);

        self.enter(CommandState::AwaitingQuiescence);
        let settled = self
            .bus
            .wait_until_not_busy(self.quiescence_timeout)
            .map_err(|err| match err {
                Error::TimeOut(timeout) => Error::QuiescenceTimeout(timeout),
                err => err,
            });

        self.enter(CommandState::Disabling);
        let disabled = self.bus.set_enabled(false).map_err(Error::PinFault);

        let result = match (outcome, settled, disabled) {
            (Err(err), settled, disabled) => {
                if let Err(cleanup) = settled.map(drop).and(disabled) {
                    log::warn!("cleanup after failed command: {cleanup}");
                }
                Err(err)
            }
            (Ok(_), Err(err), _) | (Ok(_), Ok(_), Err(err)) => Err(err),
            (Ok(payload), Ok(_), Ok(())) => Ok(payload),
        };

        match result {
            Ok(payload) => {
                self.enter(CommandState::Done);
                Ok(payload)
            }
            Err(err) => self.fail(err),
        }
    }
}

/// Writes `command` and reads back `read_bytes` bytes of answer.
pub fn run_command<Spi, I, O, D>(
    bus: &mut BusInterface<Spi, I, O, D>,
    command: &Command<'_>,
    read_bytes: usize,
) -> Result<Vec<u8>, Error>
where
    Spi: SpiDevice,
    I: InputPin,
    O: OutputPin,
    D: DelayNs,
{
    log::debug!("command {:02X?}, expecting {read_bytes} bytes", command);
    bus.write(&command.encode()?)?;
    bus.read(read_bytes)
}
