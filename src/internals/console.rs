/// Input-output words
///
/// Everything the program prints goes through the runtime's output
/// sink, so a session writes to stdout while tests capture the bytes.
/// KEY is the one blocking input word; it reads a single byte through
/// the terminal helper.
use crate::internals::terminal;
use crate::kernel::{CELL, DATA_STACK_SIZE};
use crate::runtime::ForthRuntime;

impl ForthRuntime {
    /// . ( n -- ) prints the cell followed by a space
    pub fn f_dot(&mut self) {
        let n = self.kernel.pop();
        let text = format!("{} ", n);
        self.emit_str(&text);
    }

    /// EMIT ( c -- ) sends one byte to the sink
    pub fn f_emit(&mut self) {
        let c = self.kernel.pop();
        self.emit_byte(c as u8);
    }

    pub fn f_space(&mut self) {
        self.emit_str(" ");
    }

    /// SPACES ( n -- )
    pub fn f_spaces(&mut self) {
        let n = self.kernel.pop();
        for _ in 0..n.max(0) {
            self.emit_str(" ");
        }
    }

    pub fn f_cr(&mut self) {
        self.emit_str("\n");
    }

    /// KEY ( -- c ) reads one byte; 0 at end of input
    pub fn f_key(&mut self) {
        self.flush_out();
        match terminal::read_key() {
            Some(c) => self.kernel.push(c as i64),
            None => self.kernel.push(0),
        }
    }

    /// TYPE ( a -- ) prints the NUL-terminated string at a
    pub fn f_type(&mut self) {
        let addr = self.kernel.pop();
        if self.kernel.byte_addr_ok(addr) {
            let text = self.kernel.string_at(addr as usize);
            self.emit_str(&text);
        } else {
            self.msg.error("TYPE", "address out of range", Some(addr));
        }
    }

    /// WORDS lists the visible dictionary, newest first, with a count.
    pub fn f_words(&mut self) {
        let mut names = Vec::new();
        let mut link = self.kernel.head();
        while let Some(idx) = link {
            let word = self.kernel.word(idx);
            if !word.is_hidden() {
                names.push(word.name.clone());
            }
            link = word.prev;
        }
        for name in &names {
            self.emit_str(name);
            self.emit_str(" ");
        }
        let total = format!("({} total)", names.len());
        self.emit_line(&total);
    }

    /// .S prints the data stack, top first, without disturbing it.
    pub fn f_dot_s(&mut self) {
        self.u_dump_stack(DATA_STACK_SIZE);
    }

    /// u_dump_stack shows up to depth cells from the top, one per line.
    pub fn u_dump_stack(&mut self, depth: usize) {
        let s0 = self.kernel.stack_base();
        let mut p = self.kernel.stack_ptr();
        let mut lines = Vec::new();
        while p > s0 && lines.len() < depth {
            p -= CELL;
            lines.push(format!("[{:02}] {}", lines.len(), self.kernel.get_cell(p)));
        }
        for line in lines {
            self.emit_line(&line);
        }
    }

    /// SHOWSTACK toggles the per-token trace.
    pub fn f_showstack(&mut self) {
        self.show_stack = !self.show_stack;
    }
}
