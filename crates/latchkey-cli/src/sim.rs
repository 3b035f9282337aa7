//! Simulated door: controller, mock inputs and a file-backed store.

use crate::console::{ConsoleFeedback, ConsoleServo};
use crate::script::{Instruction, WIDTH, command_text, parse_script};
use anyhow::{Context, Result};
use latchkey_controller::{AccessController, ControllerConfig, Peripherals};
use latchkey_core::constants::{DEFAULT_CAPACITY, DEFAULT_REGION_SIZE, elapsed_ms};
use latchkey_core::DoorSensorState;
use latchkey_hardware::mock::{
    ManualClock, MockDelay, MockPanel, MockPanelHandle, MockReader, MockReaderHandle,
};
use latchkey_hardware::traits::Clock;
use latchkey_hardware::{FileNvs, ServoLock};
use latchkey_storage::{CredentialRepository, CredentialStore};
use std::path::Path;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

type SimStore = CredentialStore<FileNvs, DEFAULT_CAPACITY, WIDTH>;

type SimController = AccessController<
    MockReader<WIDTH>,
    ServoLock<ConsoleServo, MockDelay>,
    ConsoleFeedback,
    MockPanel,
    ManualClock,
    MockDelay,
    SimStore,
    WIDTH,
>;

/// Whether to keep reading commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Simulator {
    controller: SimController,
    clock: ManualClock,
    reader: MockReaderHandle<WIDTH>,
    panel: MockPanelHandle,
    tick_ms: u32,
}

impl Simulator {
    /// Boot a door over the EEPROM image at `image`.
    ///
    /// The virtual clock starts at zero. With `hold_reset` the button is
    /// held through boot, which erases the store.
    pub fn boot(config: ControllerConfig, image: &Path, hold_reset: bool) -> Result<Self> {
        let clock = ManualClock::new(0);
        let (reader, reader_handle) = MockReader::new();
        let (panel, panel_handle) = if config.door_sensor {
            MockPanel::with_sensor(DoorSensorState::Closed)
        } else {
            MockPanel::without_sensor()
        };

        let peripherals = Peripherals {
            reader,
            // settle waits are recorded, not played out on the virtual clock
            actuator: ServoLock::new(ConsoleServo::default(), MockDelay::default(), config.servo),
            feedback: ConsoleFeedback::default(),
            panel,
            clock: clock.clone(),
            delay: MockDelay::linked(clock.clone()),
        };

        let nvs = FileNvs::open(image, DEFAULT_REGION_SIZE)
            .with_context(|| format!("opening image {}", image.display()))?;

        if hold_reset {
            panel_handle.press();
        }
        let controller = SimController::boot(config, peripherals, |reset| {
            SimStore::initialize(nvs, reset)
        })
        .context("booting controller")?;
        panel_handle.release();

        Ok(Self {
            tick_ms: config.tick_ms,
            controller,
            clock,
            reader: reader_handle,
            panel: panel_handle,
        })
    }

    /// One poll, then advance the virtual clock by one tick.
    pub fn tick(&mut self) -> Result<()> {
        self.controller.poll()?;
        self.clock.advance(self.tick_ms);
        Ok(())
    }

    /// Tick until `ms` of virtual time have passed.
    pub fn run_for(&mut self, ms: u32) -> Result<()> {
        let start = self.clock.now_ms();
        while elapsed_ms(self.clock.now_ms(), start) < ms {
            self.tick()?;
        }
        Ok(())
    }

    /// Apply an instruction. `Wait` runs the loop; everything else only
    /// changes inputs or prints.
    pub fn apply(&mut self, instruction: Instruction) -> Result<Flow> {
        match instruction {
            Instruction::Present(credential) => self.reader.present(credential),
            Instruction::Remove => self.reader.remove(),
            Instruction::Press => self.panel.press(),
            Instruction::Release => self.panel.release(),
            Instruction::Open => self.panel.open_door(),
            Instruction::Close => self.panel.close_door(),
            Instruction::Wait(ms) => self.run_for(ms)?,
            Instruction::List => self.print_list()?,
            Instruction::Status => self.print_status(),
            Instruction::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    /// Run a script on the virtual clock, one tick between lines.
    pub fn run_script(&mut self, text: &str) -> Result<()> {
        for instruction in parse_script(text)? {
            if self.apply(instruction)? == Flow::Quit {
                break;
            }
            if !matches!(instruction, Instruction::Wait(_)) {
                self.tick()?;
            }
        }
        Ok(())
    }

    /// Read commands from stdin while ticking at the configured period.
    pub async fn run_interactive(&mut self) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut interval = tokio::time::interval(Duration::from_millis(u64::from(self.tick_ms)));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        info!(tick_ms = self.tick_ms, "reading commands from stdin");
        loop {
            tokio::select! {
                _ = interval.tick() => self.tick()?,
                line = lines.next_line() => {
                    let Some(line) = line.context("reading stdin")? else {
                        break;
                    };
                    let Some(text) = command_text(&line) else {
                        continue;
                    };
                    match text.parse::<Instruction>() {
                        Ok(instruction) => {
                            if self.apply(instruction)? == Flow::Quit {
                                break;
                            }
                        }
                        Err(err) => eprintln!("error: {err:#}"),
                    }
                }
            }
        }
        Ok(())
    }

    fn print_list(&self) -> Result<()> {
        let repository = self.controller.repository();
        let credentials = repository.credentials()?;
        println!("{}/{} enrolled", credentials.len(), repository.capacity());
        for (slot, credential) in credentials.iter().enumerate() {
            println!("  [{slot}] {credential}");
        }
        Ok(())
    }

    fn print_status(&self) {
        let door = match self.panel.door() {
            Some(level) if self.controller.config().door_sensor => format!("{level:?}"),
            _ => "n/a".to_string(),
        };
        println!(
            "t={}ms lock={} enrolled={}/{} button={} door={} policy={}",
            self.clock.now_ms(),
            self.controller.state(),
            self.controller.repository().count(),
            self.controller.repository().capacity(),
            if self.panel.is_pressed() { "down" } else { "up" },
            door,
            self.controller.config().policy,
        );
        if let Some(last) = self.controller.history().back() {
            println!(
                "  last: {} -> {} by {} at {}ms",
                last.from, last.to, last.cause, last.at_ms
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use latchkey_core::LockState;

    impl Simulator {
        fn state(&self) -> LockState {
            self.controller.state()
        }

        fn enrolled(&self) -> usize {
            self.controller.repository().count()
        }

        fn now_ms(&self) -> u32 {
            self.clock.now_ms()
        }
    }

    const ENROLL_A: &str = "
        open
        press
        present 04A1B2C3
        wait 100
        remove
        release
        close
        wait 1200
    ";

    #[test]
    fn test_script_enrolls_and_relocks() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("eeprom.bin");

        let mut sim = Simulator::boot(ControllerConfig::default(), &image, false).unwrap();
        assert_eq!(sim.state(), LockState::Unlocked);

        sim.run_script(ENROLL_A).unwrap();

        assert_eq!(sim.enrolled(), 1);
        assert_eq!(sim.state(), LockState::Locked);
    }

    #[test]
    fn test_store_persists_across_boots() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("eeprom.bin");

        {
            let mut sim = Simulator::boot(ControllerConfig::default(), &image, false).unwrap();
            sim.run_script(ENROLL_A).unwrap();
        }

        let mut sim = Simulator::boot(ControllerConfig::default(), &image, false).unwrap();
        assert_eq!(sim.enrolled(), 1);
        assert_eq!(sim.state(), LockState::Locked);

        sim.run_script("present 04A1B2C3\nwait 50\n").unwrap();
        assert_eq!(sim.state(), LockState::Unlocked);
    }

    #[test]
    fn test_hold_reset_erases_image() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("eeprom.bin");

        {
            let mut sim = Simulator::boot(ControllerConfig::default(), &image, false).unwrap();
            sim.run_script(ENROLL_A).unwrap();
        }

        let sim = Simulator::boot(ControllerConfig::default(), &image, true).unwrap();
        assert_eq!(sim.enrolled(), 0);
        assert_eq!(sim.state(), LockState::Unlocked);
        assert!(sim.now_ms() >= 3000);
    }

    #[test]
    fn test_quit_stops_script() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("eeprom.bin");

        let mut sim = Simulator::boot(ControllerConfig::default(), &image, false).unwrap();
        let before = sim.now_ms();
        sim.run_script("quit\nwait 5000\n").unwrap();

        assert_eq!(sim.now_ms(), before);
    }
}
