//! Recording stand-ins for the panel's bus and pins.

#![allow(dead_code)]

use std::{cell::RefCell, collections::VecDeque, convert::Infallible, rc::Rc};

use embedded_hal::{
    digital::{self, InputPin, OutputPin},
    spi::{self, Operation, SpiDevice},
};

#[derive(Default)]
pub struct SpiLog {
    pub writes: Vec<Vec<u8>>,
    pub answers: VecDeque<Vec<u8>>,
}

/// SPI device that records writes and answers reads from a queue.
#[derive(Clone, Default)]
pub struct FakeSpi(pub Rc<RefCell<SpiLog>>);

impl FakeSpi {
    pub fn answer(&self, bytes: &[u8]) {
        self.0.borrow_mut().answers.push_back(bytes.to_vec());
    }

    pub fn answer_ok(&self, times: usize) {
        for _ in 0..times {
            self.answer(&[0x90, 0x00]);
        }
    }

    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.0.borrow().writes.clone()
    }

    pub fn pending_answers(&self) -> usize {
        self.0.borrow().answers.len()
    }
}

impl spi::ErrorType for FakeSpi {
    type Error = Infallible;
}

impl SpiDevice for FakeSpi {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> {
        let mut log = self.0.borrow_mut();
        for op in operations {
            match op {
                Operation::Write(data) => log.writes.push(data.to_vec()),
                Operation::Read(buf) => {
                    let answer = log.answers.pop_front().expect("unexpected read");
                    assert_eq!(answer.len(), buf.len(), "read length");
                    buf.copy_from_slice(&answer);
                }
                other => panic!("unexpected operation {other:?}"),
            }
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct PinLog {
    pub level: bool,
    pub writes: Vec<bool>,
    pub reads: usize,
}

/// Pin that holds a level and records every write.
#[derive(Clone, Default)]
pub struct FakePin(pub Rc<RefCell<PinLog>>);

impl FakePin {
    pub fn with_level(high: bool) -> Self {
        let pin = Self::default();
        pin.0.borrow_mut().level = high;
        pin
    }

    /// Busy line of an idle panel.
    pub fn idle() -> Self {
        Self::with_level(true)
    }

    /// Busy line of a panel that never finishes.
    pub fn busy() -> Self {
        Self::with_level(false)
    }

    /// Enable line as configured at boot: inactive.
    pub fn disabled() -> Self {
        Self::with_level(true)
    }

    pub fn writes(&self) -> Vec<bool> {
        self.0.borrow().writes.clone()
    }

    pub fn level(&self) -> bool {
        self.0.borrow().level
    }
}

impl digital::ErrorType for FakePin {
    type Error = Infallible;
}

impl InputPin for FakePin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        let mut log = self.0.borrow_mut();
        log.reads += 1;
        Ok(log.level)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.is_high().map(|high| !high)
    }
}

impl OutputPin for FakePin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        let mut log = self.0.borrow_mut();
        log.level = false;
        log.writes.push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        let mut log = self.0.borrow_mut();
        log.level = true;
        log.writes.push(true);
        Ok(())
    }
}
