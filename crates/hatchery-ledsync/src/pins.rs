use anyhow::Result;
use tracing::{debug, info};

use crate::snapshot::{LedSnapshot, truthy};

/// BCM numbers of the six outputs, mapped positionally to array
/// indices 0–5.
pub const DEFAULT_PINS: [u8; 6] = [17, 18, 27, 22, 23, 24];

/// Write-side port for one digital output line. The hardware adapter
/// lives behind the `rpi` feature; tests substitute a recording mock.
pub trait DigitalOutput {
    fn set_high(&mut self) -> Result<()>;
    fn set_low(&mut self) -> Result<()>;
}

/// Owns the output lines and applies snapshots positionally.
pub struct LedBank<P: DigitalOutput> {
    outputs: Vec<P>,
    released: bool,
}

impl<P: DigitalOutput> LedBank<P> {
    pub fn new(outputs: Vec<P>) -> Self {
        Self {
            outputs,
            released: false,
        }
    }

    /// Write every index present in both the snapshot array and the
    /// bank. Indices beyond the bank are ignored; pins whose index is
    /// absent from the array keep their prior electrical level.
    pub fn apply(&mut self, snapshot: &LedSnapshot) -> Result<()> {
        for (i, value) in snapshot.leds.iter().enumerate() {
            let Some(pin) = self.outputs.get_mut(i) else {
                debug!("Ignoring LED index {} beyond pin count", i);
                continue;
            };
            if truthy(value) {
                pin.set_high()?;
            } else {
                pin.set_low()?;
            }
        }
        Ok(())
    }

    /// Drive every output low and release the handles. Safe to call
    /// twice; the second call is a no-op.
    pub fn shutdown(&mut self) -> Result<()> {
        if self.released {
            return Ok(());
        }
        for pin in &mut self.outputs {
            pin.set_low()?;
        }
        self.outputs.clear();
        self.released = true;
        info!("LEDs turned off. GPIO released.");
        Ok(())
    }
}

#[cfg(feature = "rpi")]
pub mod gpio {
    use anyhow::Result;
    use rppal::gpio::{Gpio, OutputPin};

    use super::DigitalOutput;

    /// rppal-backed output line.
    pub struct RpiOutput(OutputPin);

    impl DigitalOutput for RpiOutput {
        fn set_high(&mut self) -> Result<()> {
            self.0.set_high();
            Ok(())
        }

        fn set_low(&mut self) -> Result<()> {
            self.0.set_low();
            Ok(())
        }
    }

    /// Claim the given BCM pins as outputs.
    pub fn open_outputs(pins: &[u8]) -> Result<Vec<RpiOutput>> {
        let gpio = Gpio::new()?;
        pins.iter()
            .map(|&pin| Ok(RpiOutput(gpio.get(pin)?.into_output())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::parse_frame;
    use std::cell::RefCell;
    use std::rc::Rc;

    type WriteLog = Rc<RefCell<Vec<(usize, bool)>>>;

    struct MockPin {
        id: usize,
        log: WriteLog,
    }

    impl DigitalOutput for MockPin {
        fn set_high(&mut self) -> Result<()> {
            self.log.borrow_mut().push((self.id, true));
            Ok(())
        }

        fn set_low(&mut self) -> Result<()> {
            self.log.borrow_mut().push((self.id, false));
            Ok(())
        }
    }

    fn bank_of(n: usize) -> (LedBank<MockPin>, WriteLog) {
        let log: WriteLog = Rc::new(RefCell::new(Vec::new()));
        let pins = (0..n)
            .map(|id| MockPin {
                id,
                log: log.clone(),
            })
            .collect();
        (LedBank::new(pins), log)
    }

    #[test]
    fn partial_array_leaves_remaining_pins_untouched() {
        let (mut bank, log) = bank_of(6);
        let snap = parse_frame(r#"{"leds":[true,false,true],"allOn":true}"#)
            .unwrap()
            .unwrap();

        bank.apply(&snap).unwrap();

        assert_eq!(
            log.borrow().as_slice(),
            &[(0, true), (1, false), (2, true)]
        );
    }

    #[test]
    fn indices_beyond_the_pin_count_are_ignored() {
        let (mut bank, log) = bank_of(2);
        let snap = parse_frame(r#"{"leds":[1,0,1,1,1,1,1,1]}"#).unwrap().unwrap();

        bank.apply(&snap).unwrap();

        assert_eq!(log.borrow().as_slice(), &[(0, true), (1, false)]);
    }

    #[test]
    fn shutdown_drives_all_low_once_and_is_idempotent() {
        let (mut bank, log) = bank_of(3);
        bank.shutdown().unwrap();
        bank.shutdown().unwrap();

        assert_eq!(
            log.borrow().as_slice(),
            &[(0, false), (1, false), (2, false)]
        );
    }

    #[test]
    fn apply_coerces_non_boolean_values() {
        let (mut bank, log) = bank_of(4);
        let snap = parse_frame(r#"{"leds":[1,"on","",null]}"#).unwrap().unwrap();

        bank.apply(&snap).unwrap();

        assert_eq!(
            log.borrow().as_slice(),
            &[(0, true), (1, true), (2, false), (3, false)]
        );
    }
}
