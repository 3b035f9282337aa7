//! Simulator command language.
//!
//! One command per line. Blank lines and `#` comments are skipped.
//!
//! ```text
//! present 04:A1:B2:C3   # hold a credential on the reader
//! remove                # take it away
//! press | release       # button level
//! open | close          # door sensor level
//! wait 1500             # run the loop for 1500 ms
//! list | status | quit
//! ```

use anyhow::{Context, Result, bail};
use latchkey_core::Credential;
use latchkey_core::constants::DEFAULT_CREDENTIAL_WIDTH;
use std::str::FromStr;

pub const WIDTH: usize = DEFAULT_CREDENTIAL_WIDTH;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Present(Credential<WIDTH>),
    Remove,
    Press,
    Release,
    Open,
    Close,
    Wait(u32),
    List,
    Status,
    Quit,
}

impl FromStr for Instruction {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            bail!("empty command");
        };
        let argument = words.next();

        let instruction = match (verb.to_ascii_lowercase().as_str(), argument) {
            ("present", Some(hex)) => Instruction::Present(
                hex.parse()
                    .with_context(|| format!("bad credential {hex:?}"))?,
            ),
            ("present", None) => bail!("present needs a credential, e.g. present 04A1B2C3"),
            ("remove", None) => Instruction::Remove,
            ("press", None) => Instruction::Press,
            ("release", None) => Instruction::Release,
            ("open", None) => Instruction::Open,
            ("close", None) => Instruction::Close,
            ("wait", Some(ms)) => {
                Instruction::Wait(ms.parse().with_context(|| format!("bad duration {ms:?}"))?)
            }
            ("wait", None) => bail!("wait needs a duration in milliseconds"),
            ("list", None) => Instruction::List,
            ("status", None) => Instruction::Status,
            ("quit" | "exit", None) => Instruction::Quit,
            (_, Some(extra)) if is_known(verb) => bail!("unexpected argument {extra:?}"),
            _ => bail!("unknown command {verb:?}"),
        };

        if let Some(extra) = words.next() {
            bail!("unexpected argument {extra:?}");
        }
        Ok(instruction)
    }
}

fn is_known(verb: &str) -> bool {
    matches!(
        verb.to_ascii_lowercase().as_str(),
        "remove" | "press" | "release" | "open" | "close" | "list" | "status" | "quit" | "exit"
    )
}

/// Strip comments and surrounding whitespace; `None` for lines with no command.
pub fn command_text(line: &str) -> Option<&str> {
    let text = line.split('#').next().unwrap_or_default().trim();
    (!text.is_empty()).then_some(text)
}

/// Parse a whole script, reporting the first bad line by number.
pub fn parse_script(text: &str) -> Result<Vec<Instruction>> {
    text.lines()
        .enumerate()
        .filter_map(|(index, line)| command_text(line).map(|cmd| (index + 1, cmd)))
        .map(|(number, cmd)| cmd.parse().with_context(|| format!("line {number}: {cmd}")))
        .collect()
}
