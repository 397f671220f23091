// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/// Pretty printers for reporting information about a run.
use std::{
    borrow::Cow,
    sync::{Mutex, PoisonError},
};

use log::Level;

const VERTICAL: char = '│';
const UP_AND_RIGHT: char = '└';
const VERTICAL_AND_RIGHT: char = '├';

lazy_static::lazy_static! {
    static ref WARNINGS: Mutex<Vec<Vec<Cow<'static, str>>>> = Mutex::new(vec![]);
}

/// Prefix each line of each block with a box-drawing character, so that the
/// blocks hang off a title as a tree.
fn tree_lines(blocks: &[Vec<Cow<'static, str>>]) -> Vec<String> {
    let num_blocks = blocks.len();
    let mut lines = vec![];
    for (i_block, block) in blocks.iter().enumerate() {
        let num_lines = block.len();
        for (i_line, line) in block.iter().enumerate() {
            let symbol = match (i_line, i_line + 1 == num_lines, i_block + 1 == num_blocks) {
                (0, false, _) | (0, _, false) => VERTICAL_AND_RIGHT,
                (0, true, true) => UP_AND_RIGHT,
                _ => VERTICAL,
            };
            lines.push(format!("{symbol} {line}"));
        }
    }
    lines
}

fn print_tree(level: Level, title: &str, blocks: &[Vec<Cow<'static, str>>]) {
    log::log!(level, "{}", console::style(title).bold());
    for line in tree_lines(blocks) {
        log::log!(level, "{line}");
    }
    log::log!(level, "");
}

pub(crate) struct InfoPrinter {
    title: Cow<'static, str>,
    blocks: Vec<Vec<Cow<'static, str>>>,
}

impl InfoPrinter {
    pub(crate) fn new(title: Cow<'static, str>) -> Self {
        Self {
            title,
            blocks: vec![],
        }
    }

    pub(crate) fn push_line(&mut self, line: Cow<'static, str>) {
        self.blocks.push(vec![line]);
    }

    pub(crate) fn push_block(&mut self, block: Vec<Cow<'static, str>>) {
        self.blocks.push(block);
    }

    pub(crate) fn display(self) {
        print_tree(Level::Info, &self.title, &self.blocks);
    }
}

pub(crate) trait Warn {
    fn warn(self);
}

fn push_warning(block: Vec<Cow<'static, str>>) {
    WARNINGS
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(block);
}

impl Warn for &'static str {
    fn warn(self) {
        push_warning(vec![self.into()]);
    }
}

impl Warn for String {
    fn warn(self) {
        push_warning(vec![self.into()]);
    }
}

impl Warn for Vec<Cow<'static, str>> {
    fn warn(self) {
        push_warning(self);
    }
}

/// Print out any warnings that have been collected while the configuration
/// was being read. Warnings are only printed once.
pub(crate) fn display_warnings() {
    log::debug!("Displaying warnings");
    let blocks = std::mem::take(&mut *WARNINGS.lock().unwrap_or_else(PoisonError::into_inner));
    if blocks.is_empty() {
        return;
    }
    print_tree(Level::Warn, "Warnings", &blocks);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_hang_off_a_tree() {
        let blocks = vec![
            vec!["Overwrite: true".into()],
            vec!["Science directories".into(), "NGC4736/Science".into()],
            vec!["Steps: 1-5".into()],
        ];
        assert_eq!(
            tree_lines(&blocks),
            [
                "├ Overwrite: true",
                "├ Science directories",
                "│ NGC4736/Science",
                "└ Steps: 1-5",
            ]
        );
    }

    #[test]
    fn last_block_with_many_lines() {
        let blocks = vec![vec!["Directories".into(), "a".into(), "b".into()]];
        assert_eq!(tree_lines(&blocks), ["├ Directories", "│ a", "│ b"]);
    }
}
