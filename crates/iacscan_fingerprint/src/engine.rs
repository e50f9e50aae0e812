//! Rolling-hash partial fingerprint engine.

use crate::runes::RuneReader;
use std::collections::HashMap;
use std::io::{self, Read};

/// Number of characters in the rolling window.
pub const BLOCK_SIZE: usize = 100;

const MOD: u64 = 37;

/// `MOD` raised to `BLOCK_SIZE`, wrapping at 64 bits.
const FIRST_MOD: u64 = {
    let mut acc: u64 = 1;
    let mut i = 0;
    while i < BLOCK_SIZE {
        acc = acc.wrapping_mul(MOD);
        i += 1;
    }
    acc
};

/// A single `(line, fingerprint)` emission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FingerprintLine {
    /// 1-based line number.
    pub line: usize,
    /// `<16 hex digits>:<occurrence>`.
    pub fingerprint: String,
}

struct Window {
    chars: [u32; BLOCK_SIZE],
    lines: [Option<usize>; BLOCK_SIZE],
    index: usize,
    hash: u64,
    counts: HashMap<u64, usize>,
}

impl Window {
    fn new() -> Self {
        Self {
            chars: [0; BLOCK_SIZE],
            lines: [None; BLOCK_SIZE],
            index: 0,
            hash: 0,
            counts: HashMap::new(),
        }
    }

    /// Emits the current hash for the line owning the slot about to be
    /// overwritten, if that line has not been emitted yet.
    fn emit_pending<F: FnMut(usize, String)>(&mut self, sink: &mut F) {
        let Some(slot) = self.lines.get_mut(self.index) else {
            return;
        };
        if let Some(line) = slot.take() {
            let count = self.counts.entry(self.hash).or_insert(0);
            *count += 1;
            sink(line, format!("{:016x}:{}", self.hash, count));
        }
    }

    fn start_line(&mut self, line: usize) {
        if let Some(slot) = self.lines.get_mut(self.index) {
            *slot = Some(line);
        }
    }

    fn push(&mut self, current: u32) {
        let Some(slot) = self.chars.get_mut(self.index) else {
            return;
        };
        let begin = std::mem::replace(slot, current);
        self.hash = MOD
            .wrapping_mul(self.hash)
            .wrapping_add(u64::from(current))
            .wrapping_sub(FIRST_MOD.wrapping_mul(u64::from(begin)));
        self.index = (self.index + 1) % BLOCK_SIZE;
    }
}

/// Streams `reader` and calls `sink` with `(line, fingerprint)` once per
/// line, in increasing line order.
///
/// Spaces and tabs are ignored, `\r\n` counts as a single newline and a lone
/// `\r` is treated as `\n`. Only the 100-character window is held in memory.
///
/// # Errors
///
/// Propagates any error returned by `reader`.
///
/// # Examples
///
/// ```
/// use iacscan_fingerprint::partial;
///
/// let mut plain = Vec::new();
/// partial("a = 1\n".as_bytes(), |_, fp| plain.push(fp))?;
/// let mut spaced = Vec::new();
/// partial("a=1\n".as_bytes(), |_, fp| spaced.push(fp))?;
/// assert_eq!(plain, spaced);
/// # Ok::<(), std::io::Error>(())
/// ```
pub fn partial<R, F>(reader: R, mut sink: F) -> io::Result<()>
where
    R: Read,
    F: FnMut(usize, String),
{
    let mut runes = RuneReader::new(reader);
    let mut window = Window::new();
    let mut line_number = 0;
    let mut line_start = true;
    let mut prev_cr = false;

    while let Some(mut current) = runes.next_rune()? {
        if current == ' ' || current == '\t' || (prev_cr && current == '\n') {
            continue;
        }
        if current == '\r' {
            current = '\n';
            prev_cr = true;
        } else {
            prev_cr = false;
        }
        window.emit_pending(&mut sink);
        if line_start {
            line_start = false;
            line_number += 1;
            window.start_line(line_number);
        }
        if current == '\n' {
            line_start = true;
        }
        window.push(u32::from(current));
    }

    for _ in 0..BLOCK_SIZE {
        window.emit_pending(&mut sink);
        window.push(0);
    }
    Ok(())
}

/// Collects the emissions of [`partial`] into a vector.
///
/// # Errors
///
/// Propagates any error returned by `reader`.
pub fn partial_lines<R: Read>(reader: R) -> io::Result<Vec<FingerprintLine>> {
    let mut lines = Vec::new();
    partial(reader, |line, fingerprint| {
        lines.push(FingerprintLine { line, fingerprint });
    })?;
    Ok(lines)
}
