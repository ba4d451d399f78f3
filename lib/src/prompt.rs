//! Operator prompt used by one-at-a-time replay

#[cfg(test)]
use mockall::{automock, predicate::*};

use std::io::{self, BufRead, Write};

use crate::error::{ReplayLibError, Result};

#[cfg_attr(test, automock)]
/// Asks the operator how many packets to send before asking again
pub trait CountPrompt {
    /// Blocks until the operator answers. Always returns at least 1.
    fn prompt(&mut self, packet_number: u64) -> Result<u32>;
}

/// Parses an operator answer the way `strtoul(input, NULL, 0)` would:
/// leading whitespace and `+` are skipped, `0x` selects hex, a leading `0`
/// selects octal, and parsing stops at the first invalid digit. Answers that
/// are empty, non-numeric or zero count as 1.
pub fn parse_user_count(input: &str) -> u32 {
    let digits = input.trim_start();
    let digits = digits.strip_prefix('+').unwrap_or(digits);

    let (radix, digits) = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
        .filter(|h| h.starts_with(|c: char| c.is_ascii_hexdigit()))
    {
        (16, hex)
    } else if digits.starts_with('0') {
        (8, digits)
    } else {
        (10, digits)
    };

    let mut count: u32 = 0;

    for c in digits.chars() {
        let Some(digit) = c.to_digit(radix) else {
            break;
        };
        count = count.saturating_mul(radix).saturating_add(digit);
    }

    if count == 0 {
        log::debug!("input was less than 1 or non-numeric, assuming 1");
        return 1;
    }

    count
}

/// Line oriented [`CountPrompt`] over any reader and writer
pub struct LinePrompt<R: BufRead, W: Write> {
    reader: R,
    writer: W,
    interface: String,
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    /// Returns a new LinePrompt naming `interface` in each question
    pub fn new(reader: R, writer: W, interface: &str) -> Self {
        Self {
            reader,
            writer,
            interface: interface.to_string(),
        }
    }
}

impl LinePrompt<io::StdinLock<'static>, io::Stdout> {
    /// Returns a LinePrompt on the terminal
    pub fn stdin(interface: &str) -> Self {
        Self::new(io::stdin().lock(), io::stdout(), interface)
    }
}

impl<R: BufRead, W: Write> CountPrompt for LinePrompt<R, W> {
    fn prompt(&mut self, packet_number: u64) -> Result<u32> {
        write!(
            self.writer,
            "**** Next packet #{} out {}.  How many packets do you wish to send? ",
            packet_number, self.interface
        )
        .and_then(|_| self.writer.flush())
        .map_err(|e| ReplayLibError::OperatorInput(e.to_string()))?;

        let mut input = String::new();

        let read = self
            .reader
            .read_line(&mut input)
            .map_err(|e| ReplayLibError::OperatorInput(e.to_string()))?;

        if read == 0 {
            return Err(ReplayLibError::OperatorInput(
                "end of input reached".into(),
            ));
        }

        Ok(parse_user_count(&input))
    }
}

#[cfg(test)]
#[path = "./prompt_tests.rs"]
mod tests;
