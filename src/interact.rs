// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Talking to the person running the pipeline: manual-mode pauses and
//! corrections of bad settings.

use std::io;

use console::{style, Term};
use log::warn;

/// Something that can ask a question and read back a line.
pub trait Prompter {
    fn ask(&mut self, question: &str) -> io::Result<String>;
}

/// Ask on the terminal.
pub struct TermPrompter {
    term: Term,
}

impl TermPrompter {
    pub fn new() -> TermPrompter {
        TermPrompter {
            term: Term::stdout(),
        }
    }
}

impl Default for TermPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for TermPrompter {
    fn ask(&mut self, question: &str) -> io::Result<String> {
        self.term.write_str(&format!("{} ", style(question).bold()))?;
        self.term.read_line()
    }
}

/// Wait for Enter.
pub fn pause(prompter: &mut dyn Prompter, message: &str) -> io::Result<()> {
    prompter.ask(&format!("{message} Press Enter to continue..."))?;
    Ok(())
}

/// Make sure `1 <= start <= stop <= last`, asking for new values until they
/// are.
pub fn valid_step_range(
    prompter: &mut dyn Prompter,
    mut start: i64,
    mut stop: i64,
    last: i64,
) -> io::Result<(i64, i64)> {
    while !(1 <= start && start <= stop && stop <= last) {
        warn!("Invalid step range {start}..={stop}; steps must satisfy 1 <= start <= stop <= {last}");
        start = ask_int(prompter, &format!("Enter a start step (1-{last}):"))?;
        stop = ask_int(prompter, &format!("Enter a stop step ({start}-{last}):"))?;
    }
    Ok((start, stop))
}

fn ask_int(prompter: &mut dyn Prompter, question: &str) -> io::Result<i64> {
    loop {
        let answer = prompter.ask(question)?;
        match answer.trim().parse() {
            Ok(i) => return Ok(i),
            Err(_) => warn!("'{}' is not a whole number", answer.trim()),
        }
    }
}
