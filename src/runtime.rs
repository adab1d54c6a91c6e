//////////////////////////////////////////////////////////////////
/// runtime.rs
///
/// Forth Runtime Engine
///
/// This module defines the ForthRuntime struct, which bundles the whole
/// interpreter state: the kernel (arena, stacks, dictionary), the input
/// cursor, the inner-interpreter registers, the reader stack and the
/// output sink. Everything is owned by one value, so tests can spin up
/// isolated engines side by side.
use crate::files::FileHandle;
use crate::kernel::{Kernel, CELL, PARSE_LINE_SIZE, WORD_NAME_SIZE};
use crate::messages::Msg;
use std::io::{self, Write};

pub struct ForthRuntime {
    pub kernel: Kernel,          // arena, stacks and dictionary
    pub msg: Msg,
    pub reader: Vec<FileHandle>, // allows a script file on top of stdin
    out: Box<dyn Write>,         // engine output sink; stdout by default
    pub cp: Option<usize>,       // tokenizer cursor into the arena
    pub ip: usize,               // instruction pointer; 0 = not executing
    pub w: usize,                // index of the word being executed
    pub mode_addr: usize,        // interpret/compile flag cell
    pub token_addr: usize,       // uppercased token buffer
    pub raw_addr: usize,         // verbatim text buffer
    pub tib_addr: usize,         // terminal input buffer
    pub show_stack: bool,        // per-token trace for debugging
    pub exit_flag: bool,         // set when the BYE word is executed
}

impl ForthRuntime {
    pub fn new(memory: usize) -> ForthRuntime {
        let mut runtime = ForthRuntime {
            kernel: Kernel::new(memory),
            msg: Msg::new(),
            reader: Vec::new(),
            out: Box::new(io::stdout()),
            cp: None,
            ip: 0,
            w: 0,
            mode_addr: 0,
            token_addr: 0,
            raw_addr: 0,
            tib_addr: 0,
            show_stack: false,
            exit_flag: false,
        };
        runtime.reader.push(FileHandle::stdin());
        runtime
    }

    /// cold_start lays out the system cells and buffers above the
    /// stacks and installs the primitive word set.
    pub fn cold_start(&mut self) {
        self.mode_addr = self.kernel.allot(CELL as i64);
        self.token_addr = self.kernel.allot(WORD_NAME_SIZE as i64);
        self.raw_addr = self.kernel.allot(PARSE_LINE_SIZE as i64);
        self.tib_addr = self.kernel.allot(PARSE_LINE_SIZE as i64);
        self.kernel.set_cell(self.mode_addr, 0);
        self.install_primitives();
    }

    /// get_compile_mode reads the MODE cell, which is also reachable
    /// from Forth through the MODE constant.
    pub fn get_compile_mode(&self) -> bool {
        self.kernel.get_cell(self.mode_addr) != 0
    }

    pub fn set_compile_mode(&mut self, value: bool) {
        self.kernel.set_cell(self.mode_addr, if value { 1 } else { 0 });
    }

    /// Replace the output sink; tests capture engine output this way.
    pub fn set_output(&mut self, out: Box<dyn Write>) {
        self.out = out;
    }

    pub fn emit_str(&mut self, s: &str) {
        self.out.write_all(s.as_bytes()).ok();
    }

    pub fn emit_line(&mut self, s: &str) {
        self.emit_str(s);
        self.emit_str("\n");
    }

    pub fn emit_byte(&mut self, b: u8) {
        self.out.write_all(&[b]).ok();
    }

    pub fn flush_out(&mut self) {
        self.out.flush().ok();
    }

    // Word installation helpers, used by install_primitives and tests.

    /// add_primitive installs a host-implemented word.
    pub fn add_primitive(&mut self, name: &str, code: fn(&mut ForthRuntime)) -> usize {
        let idx = self.kernel.make_word(name);
        self.kernel.word_mut(idx).code = code;
        idx
    }

    /// add_constant installs a word that pushes a fixed cell.
    pub fn add_constant(&mut self, name: &str, value: i64) -> usize {
        let idx = self.kernel.make_word(name);
        let word = self.kernel.word_mut(idx);
        word.code = ForthRuntime::i_constant;
        word.value = value;
        idx
    }

    /// eval_line copies one input line into the TIB and evaluates it.
    ///     Lines longer than the TIB are truncated to 127 bytes.
    pub fn eval_line(&mut self, line: &str) {
        let bytes = line.as_bytes();
        let len = bytes.len().min(PARSE_LINE_SIZE - 1);
        let tib = self.tib_addr;
        for (i, b) in bytes[..len].iter().enumerate() {
            self.kernel.set_byte(tib + i, *b);
        }
        self.kernel.set_byte(tib + len, 0);
        self.u_evaluate_buffer(tib);
    }

    /// next_line pulls a line from the active reader, popping exhausted
    /// script readers until only stdin remains.
    fn next_line(&mut self) -> Option<String> {
        loop {
            let line = self.reader.last_mut()?.get_line();
            match line {
                Some(line) => return Some(line),
                None => {
                    if self.reader.len() > 1 {
                        self.reader.pop();
                    } else {
                        return None;
                    }
                }
            }
        }
    }

    /// run is the session loop: greeting, then evaluate each line until
    /// EOF or BYE.
    pub fn run(&mut self) {
        self.emit_line("welcome to rs4th");
        while !self.exit_flag {
            match self.next_line() {
                Some(line) => {
                    self.eval_line(&line);
                    self.flush_out();
                }
                None => break,
            }
        }
        self.flush_out();
    }

    pub fn f_bye(&mut self) {
        self.exit_flag = true;
    }

    pub fn should_exit(&self) -> bool {
        self.exit_flag
    }
}

/////////////////////////
/// TESTS
///
#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::DEFAULT_MEMORY;

    fn runtime() -> ForthRuntime {
        let mut rt = ForthRuntime::new(DEFAULT_MEMORY);
        rt.cold_start();
        rt
    }

    #[test]
    fn test_cold_start_installs_the_dictionary() {
        let rt = runtime();
        assert!(rt.kernel.find_word("DUP").is_some());
        assert!(rt.kernel.find_word("EXIT").is_some());
        assert!(rt.kernel.find_word(":").is_some());
        assert!(!rt.get_compile_mode());
    }

    #[test]
    fn test_compile_mode_flag_lives_in_the_arena() {
        let mut rt = runtime();
        rt.set_compile_mode(true);
        assert_eq!(rt.kernel.get_cell(rt.mode_addr), 1);
        rt.set_compile_mode(false);
        assert_eq!(rt.kernel.get_cell(rt.mode_addr), 0);
    }

    #[test]
    fn test_mode_constant_exposes_the_flag_address() {
        let mut rt = runtime();
        rt.eval_line("1 MODE !");
        assert!(rt.get_compile_mode());
        rt.set_compile_mode(false);
        rt.eval_line("MODE @");
        assert_eq!(rt.kernel.pop(), 0);
    }

    #[test]
    fn test_eval_line_truncates_to_the_tib() {
        let mut rt = runtime();
        let long = "1 ".repeat(200);
        rt.eval_line(&long);
        // 127 bytes hold 63 complete "1 " pairs plus a trailing "1"
        assert_eq!(rt.kernel.depth(), 64);
    }

    #[test]
    fn test_f_bye_sets_the_exit_flag() {
        let mut rt = runtime();
        assert!(!rt.should_exit());
        rt.eval_line("BYE");
        assert!(rt.should_exit());
    }

    #[test]
    fn test_add_constant() {
        let mut rt = runtime();
        rt.add_constant("DOZEN", 12);
        rt.eval_line("DOZEN DOZEN +");
        assert_eq!(rt.kernel.pop(), 24);
    }
}
