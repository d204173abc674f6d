use std::io::{self, Read};

use aho_corasick::packed::Searcher;
use anyhow::Context;
use engine_2048::Direction;

/// Arrow key escape sequences, ordered like the `Direction` discriminants.
const ARROW_KEYS: [&[u8]; 4] = [b"\x1b[A", b"\x1b[B", b"\x1b[C", b"\x1b[D"];
const QUIT_KEYS: [u8; 2] = [b'q', 0x04];

/// Reads arrow keys from a raw terminal. Each read yields at most one direction; further keys
/// pressed within the same read are dropped.
pub struct TerminalInput<R> {
    input: R,
    searcher: Searcher,
    buf: [u8; 128],
    buf_len: usize,
}

impl<R: Read> TerminalInput<R> {
    pub fn new(input: R) -> anyhow::Result<Self> {
        let searcher = Searcher::new(ARROW_KEYS).context("building arrow key searcher")?;

        Ok(Self {
            input,
            searcher,
            buf: [0; 128],
            buf_len: 0,
        })
    }

    /// Blocks until an arrow key is pressed. Returns `None` on end of input or a quit key.
    pub fn next_direction(&mut self) -> io::Result<Option<Direction>> {
        loop {
            let read = self.input.read(&mut self.buf[self.buf_len..])?;

            if read == 0 {
                return Ok(None);
            }

            self.buf_len += read;
            let pending = &self.buf[..self.buf_len];

            let direction = self
                .searcher
                .find_iter(pending)
                .next()
                .and_then(|m| Direction::from_index(m.pattern().as_usize()));

            if direction.is_none() && pending.iter().any(|byte| QUIT_KEYS.contains(byte)) {
                return Ok(None);
            }

            // Keep a partial escape sequence for the next read.
            self.buf_len = match (direction, pending) {
                (None, [.., 0x1b, b'[']) => {
                    self.buf[..2].copy_from_slice(b"\x1b[");
                    2
                }
                (None, [.., 0x1b]) => {
                    self.buf[0] = 0x1b;
                    1
                }
                _ => 0,
            };

            if direction.is_some() {
                return Ok(direction);
            }
        }
    }
}
