use std::{
    io::{self, Write},
    mem::MaybeUninit,
    os::fd::AsRawFd,
};

use engine_2048::Board;

const SQUARE_HEIGHT: usize = 3;
const SQUARE_WIDTH: usize = 7;
const COLOUR_TABLE: [u8; 7] = [90, 33, 31, 32, 33, 36, 35];

fn colour(value: u32) -> u8 {
    let exponent = value.trailing_zeros() as usize;

    COLOUR_TABLE[exponent.saturating_sub(1) % COLOUR_TABLE.len()]
}

fn border_row(width: usize, left: &str, joint: &str, right: &str) -> String {
    let segment = "━".repeat(SQUARE_WIDTH);
    let inner = vec![segment; width].join(joint);

    format!("{left}{inner}{right}\n")
}

/// Redraws the whole board in place on a terminal. Lines drawn by the previous frame are
/// overwritten by moving the cursor back up.
pub struct TerminalRenderer<W> {
    out: W,
    top_row: String,
    separator_row: String,
    bottom_row: String,
    drawn_lines: usize,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W, width: usize) -> Self {
        Self {
            out,
            top_row: border_row(width, "┏", "┳", "┓"),
            separator_row: border_row(width, "┣", "╋", "┫"),
            bottom_row: border_row(width, "┗", "┻", "┛"),
            drawn_lines: 0,
        }
    }

    pub fn out(&mut self) -> &mut W {
        &mut self.out
    }

    fn draw_padding_line(&mut self, row: &[u32]) -> io::Result<()> {
        for &value in row {
            if value == 0 {
                write!(self.out, "┃{:SQUARE_WIDTH$}", "")?;
            } else {
                let background = colour(value) + 10;
                write!(self.out, "┃\x1b[{background}m{:SQUARE_WIDTH$}\x1b[m", "")?;
            }
        }

        self.out.write_all("┃\n".as_bytes())
    }

    fn draw_value_line(&mut self, row: &[u32]) -> io::Result<()> {
        for &value in row {
            if value == 0 {
                write!(self.out, "┃{:SQUARE_WIDTH$}", "")?;
            } else {
                let colour = colour(value);
                write!(self.out, "┃\x1b[7m\x1b[{colour}m{value:^SQUARE_WIDTH$}\x1b[m")?;
            }
        }

        self.out.write_all("┃\n".as_bytes())
    }

    fn draw_board_row(&mut self, row: &[u32]) -> io::Result<()> {
        let above = (SQUARE_HEIGHT - 1) / 2;
        let below = SQUARE_HEIGHT - 1 - above;

        for _ in 0..above {
            self.draw_padding_line(row)?;
        }

        self.draw_value_line(row)?;

        for _ in 0..below {
            self.draw_padding_line(row)?;
        }

        Ok(())
    }

    pub fn draw(&mut self, board: &Board, score: u64) -> io::Result<()> {
        if self.drawn_lines > 0 {
            write!(self.out, "\x1b[{}F\x1b[J", self.drawn_lines)?;
        }

        writeln!(self.out, "Score: {score}")?;
        self.out.write_all(self.top_row.as_bytes())?;

        let rows = board.rows();

        for (i, row) in rows.iter().enumerate() {
            if i != 0 {
                self.out.write_all(self.separator_row.as_bytes())?;
            }

            self.draw_board_row(row)?;
        }

        self.out.write_all(self.bottom_row.as_bytes())?;
        self.out.flush()?;

        self.drawn_lines = 3 + rows.len() * SQUARE_HEIGHT + rows.len().saturating_sub(1);

        Ok(())
    }
}

/// Switches the terminal to unbuffered input without echo, so arrow keys arrive immediately.
pub fn setup_terminal(fd: &impl AsRawFd) -> io::Result<()> {
    let fd = fd.as_raw_fd();
    let mut termios = MaybeUninit::uninit();

    let mut termios = unsafe {
        if libc::tcgetattr(fd, termios.as_mut_ptr()) != 0 {
            return Err(io::Error::last_os_error());
        }

        termios.assume_init()
    };

    termios.c_lflag &= !(libc::ECHO | libc::ICANON);

    if unsafe { libc::tcsetattr(fd, libc::TCSADRAIN, &termios) } != 0 {
        return Err(io::Error::last_os_error());
    }

    Ok(())
}
