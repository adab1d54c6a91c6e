/// Tokenizer
///
/// The tokenizer is a cursor over NUL-terminated text in the arena,
/// normally the TIB, but EVALUATE can point it at any string. Tokens
/// are copied into two reusable arena buffers: parse() uppercases into
/// the 31-character token buffer, parse_raw() copies verbatim into the
/// 127-character raw buffer. Word names are therefore case-insensitive
/// by convention while string payloads keep their case.
use crate::kernel::{PARSE_LINE_SIZE, WORD_NAME_SIZE};
use crate::runtime::ForthRuntime;

impl ForthRuntime {
    /// parse skips leading whitespace and copies the next token,
    /// uppercased, into the token buffer. Returns the buffer address,
    /// or None when no token remains. A token longer than 31 characters
    /// is truncated; the remainder is picked up by the next call.
    pub fn parse(&mut self) -> Option<usize> {
        let mut cp = self.cp?;
        while self.kernel.byte(cp) != 0 && self.kernel.byte(cp).is_ascii_whitespace() {
            cp += 1;
        }
        if self.kernel.byte(cp) == 0 {
            self.cp = Some(cp);
            return None;
        }
        let mut len = 0;
        while len < WORD_NAME_SIZE - 1 {
            let b = self.kernel.byte(cp);
            if b == 0 || b.is_ascii_whitespace() {
                break;
            }
            let dest = self.token_addr + len;
            self.kernel.set_byte(dest, b.to_ascii_uppercase());
            len += 1;
            cp += 1;
        }
        self.kernel.set_byte(self.token_addr + len, 0);
        self.cp = Some(cp);
        Some(self.token_addr)
    }

    /// parse_raw copies text verbatim into the raw buffer until the
    /// delimiter or the end of input, and consumes the delimiter if it
    /// was found. A single leading blank (the separator after the word
    /// that asked for the text) is skipped. Returns the buffer address;
    /// None only when no input is loaded.
    pub fn parse_raw(&mut self, delim: u8) -> Option<usize> {
        let mut cp = self.cp?;
        if self.kernel.byte(cp) == b' ' {
            cp += 1;
        }
        let mut len = 0;
        while len < PARSE_LINE_SIZE - 1 {
            let b = self.kernel.byte(cp);
            if b == 0 || b == delim {
                break;
            }
            let dest = self.raw_addr + len;
            self.kernel.set_byte(dest, b);
            len += 1;
            cp += 1;
        }
        self.kernel.set_byte(self.raw_addr + len, 0);
        if self.kernel.byte(cp) == delim {
            cp += 1;
        }
        self.cp = Some(cp);
        Some(self.raw_addr)
    }
}
