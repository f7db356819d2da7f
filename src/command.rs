//! Text commands received over RX.
//!
//! | Command   | Action  | Confirmation     |
//! |-----------|---------|------------------|
//! | `led_on`  | LED on  | `LED turned ON`  |
//! | `led_off` | LED off | `LED turned OFF` |
//!
//! Matching ignores ASCII case. Anything else is logged and ignored.

use core::str::FromStr;

use embedded_hal::digital::OutputPin;

use crate::ble::dispatcher::InboundHandler;
use crate::ble::notifier::Notifier;
use crate::ble::RadioStack;
use crate::config::{LED_OFF_CONFIRMATION, LED_ON_CONFIRMATION};
use crate::error::Error;
use crate::led::StatusLed;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    LedOn,
    LedOff,
}

impl Command {
    pub fn confirmation(&self) -> &'static str {
        match self {
            Command::LedOn => LED_ON_CONFIRMATION,
            Command::LedOff => LED_OFF_CONFIRMATION,
        }
    }
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("led_on") {
            Ok(Command::LedOn)
        } else if s.eq_ignore_ascii_case("led_off") {
            Ok(Command::LedOff)
        } else {
            Err(Error::UnknownCommand)
        }
    }
}

/// Runs commands against the LED and confirms them through the notifier,
/// when one is wired.
pub struct CommandInterpreter<'a, P: OutputPin, S: RadioStack> {
    led: StatusLed<P>,
    notifier: Option<&'a Notifier<'a, S>>,
}

impl<'a, P: OutputPin, S: RadioStack> CommandInterpreter<'a, P, S> {
    pub fn new(led: StatusLed<P>, notifier: Option<&'a Notifier<'a, S>>) -> Self {
        Self { led, notifier }
    }

    pub fn led(&self) -> &StatusLed<P> {
        &self.led
    }

    /// Parse and run one message.
    pub fn execute(&mut self, message: &str) -> Result<Command, Error> {
        let command: Command = message.parse()?;
        match command {
            Command::LedOn => self.led.on()?,
            Command::LedOff => self.led.off()?,
        }

        if let Some(notifier) = self.notifier {
            notifier.send_str(command.confirmation());
        }
        Ok(command)
    }
}

impl<P: OutputPin, S: RadioStack> InboundHandler for CommandInterpreter<'_, P, S> {
    fn on_message(&mut self, message: &str) {
        match self.execute(message) {
            Ok(command) => info!("Executed {:?}", command),
            Err(Error::UnknownCommand) => warn!("Unknown command: {}", message),
            Err(e) => error!("Command {} failed: {}", message, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ble::connections::ConnectionRegistry;
    use crate::ble::{AttributeHandle, ConnectionHandle};
    use crate::error::StackError;
    use core::cell::RefCell;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType;

    /// Records every level written.
    #[derive(Default)]
    struct Pin {
        levels: std::vec::Vec<bool>,
    }

    impl ErrorType for Pin {
        type Error = Infallible;
    }

    impl OutputPin for Pin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.levels.push(false);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.levels.push(true);
            Ok(())
        }
    }

    #[derive(Default)]
    struct Radio {
        sent: RefCell<std::vec::Vec<std::vec::Vec<u8>>>,
    }

    impl RadioStack for Radio {
        fn advertise(&self, _: &[u8]) -> Result<(), StackError> {
            Ok(())
        }

        fn read_attribute(&self, _: AttributeHandle, _: &mut [u8]) -> Result<usize, StackError> {
            Ok(0)
        }

        fn notify(
            &self,
            _: ConnectionHandle,
            _: AttributeHandle,
            data: &[u8],
        ) -> Result<(), StackError> {
            self.sent.borrow_mut().push(data.to_vec());
            Ok(())
        }
    }

    #[test]
    fn parse_ignores_case() {
        assert_eq!("led_on".parse::<Command>(), Ok(Command::LedOn));
        assert_eq!("LED_ON".parse::<Command>(), Ok(Command::LedOn));
        assert_eq!("Led_Off".parse::<Command>(), Ok(Command::LedOff));
        assert_eq!("led on".parse::<Command>(), Err(Error::UnknownCommand));
        assert_eq!("".parse::<Command>(), Err(Error::UnknownCommand));
    }

    #[test]
    fn led_on_drives_pin_and_confirms_once() {
        let radio = Radio::default();
        let registry = ConnectionRegistry::new();
        registry.add(ConnectionHandle(1)).unwrap();
        let notifier = Notifier::new(&radio, &registry, AttributeHandle(10));

        let mut interpreter =
            CommandInterpreter::new(StatusLed::new(Pin::default(), true), Some(&notifier));
        interpreter.on_message("led_ON");

        assert!(interpreter.led().is_on());
        // Active-low: one write, driven low.
        assert_eq!(interpreter.led().pin().levels, [false]);
        assert_eq!(*radio.sent.borrow(), vec![b"LED turned ON".to_vec()]);
    }

    #[test]
    fn unknown_command_has_no_effect() {
        let radio = Radio::default();
        let registry = ConnectionRegistry::new();
        registry.add(ConnectionHandle(1)).unwrap();
        let notifier = Notifier::new(&radio, &registry, AttributeHandle(10));

        let mut interpreter =
            CommandInterpreter::new(StatusLed::new(Pin::default(), true), Some(&notifier));
        interpreter.on_message("blink");

        assert!(!interpreter.led().is_on());
        assert!(interpreter.led().pin().levels.is_empty());
        assert!(radio.sent.borrow().is_empty());
    }

    #[test]
    fn works_without_notifier() {
        let mut interpreter: CommandInterpreter<'_, Pin, Radio> =
            CommandInterpreter::new(StatusLed::new(Pin::default(), false), None);
        assert_eq!(interpreter.execute("led_on"), Ok(Command::LedOn));
        assert_eq!(interpreter.execute("led_off"), Ok(Command::LedOff));
        assert!(!interpreter.led().is_on());
        assert_eq!(interpreter.led().pin().levels, [true, false]);
    }
}
