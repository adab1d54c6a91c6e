// Single-character input for KEY.
//
// On a real terminal the read happens in raw mode so KEY returns as
// soon as a key is pressed instead of waiting for a newline. When
// stdin is a pipe or a file the byte is read directly.

use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::tty::IsTty;
use std::io::{self, Read};

/// Read one byte from stdin; None at end of input.
pub fn read_key() -> Option<u8> {
    let interactive = io::stdin().is_tty();
    if interactive {
        enable_raw_mode().ok();
    }
    let mut buf = [0u8; 1];
    let result = io::stdin().lock().read(&mut buf);
    if interactive {
        disable_raw_mode().ok();
    }
    match result {
        Ok(0) => None,
        Ok(_) => Some(buf[0]),
        Err(_) => None,
    }
}
