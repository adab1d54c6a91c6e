/// Inner Interpreter
///
/// A colon word's body is a contiguous run of cells in the arena, each
/// holding the index of another word. Executing a body means walking
/// the instruction pointer across it and dispatching every cell through
/// its header's function.
///
/// There is exactly one dispatch loop. `ip == 0` means no loop is
/// active, and 0 doubles as the sentinel saved on the return stack by
/// the outermost call: every i_colon uniformly pushes the current IP
/// and redirects it, and the invocation that pushed the sentinel owns
/// the loop, running until EXIT pops the sentinel back.
use crate::kernel::CELL;
use crate::runtime::ForthRuntime;

impl ForthRuntime {
    /// Dispatch one word through its header function. The header index
    /// becomes the "current word" register, which the i_* primitives
    /// consult for their value cell.
    pub fn execute_word(&mut self, idx: usize) {
        if idx == 0 || idx >= self.kernel.words_len() {
            panic!("threaded code corruption: word reference {} out of range", idx);
        }
        self.w = idx;
        let code = self.kernel.word(idx).code;
        code(self);
    }

    /// Run a word to completion regardless of whether the dispatch loop
    /// is already active. EXECUTE and the outer interpreter enter here:
    /// the current IP is stashed and a fresh sentinel context is set up,
    /// so a colon word invoked from inside a primitive finishes before
    /// control returns.
    pub fn call_word(&mut self, idx: usize) {
        let saved_ip = self.ip;
        self.ip = 0;
        self.execute_word(idx);
        self.ip = saved_ip;
    }

    /// DOCOLON. Saves IP on the return stack and redirects it to the
    /// body. The outermost call (IP was 0, the sentinel) runs the
    /// dispatch loop; nested calls just redirect and let the active
    /// loop continue.
    pub fn i_colon(&mut self) {
        let body = self.kernel.word(self.w).value as usize;
        self.kernel.push_r(self.ip as i64);
        let outermost = self.ip == 0;
        self.ip = body;
        if outermost {
            while self.ip != 0 {
                let idx = self.kernel.get_cell(self.ip) as usize;
                self.ip += CELL;
                self.execute_word(idx);
            }
        }
    }

    /// EXIT pops the saved IP; popping the sentinel ends the loop.
    pub fn i_exit(&mut self) {
        self.ip = self.kernel.pop_r() as usize;
    }

    /// BRANCH reads its inline cell as the new IP.
    pub fn i_branch(&mut self) {
        self.ip = self.kernel.get_cell(self.ip) as usize;
    }

    /// DOLITERAL pushes its inline cell and steps over it.
    pub fn i_literal(&mut self) {
        let value = self.kernel.get_cell(self.ip);
        self.kernel.push(value);
        self.ip += CELL;
    }

    /// DOCONSTANT pushes the header's value cell.
    pub fn i_constant(&mut self) {
        let value = self.kernel.word(self.w).value;
        self.kernel.push(value);
    }

    /// DOVARIABLE pushes the arena address of the word's storage cell.
    pub fn i_variable(&mut self) {
        let addr = self.kernel.word(self.w).value;
        self.kernel.push(addr);
    }

    /// Placeholder function for the reserved header slot.
    pub fn i_reserved(&mut self) {
        panic!("reserved dictionary slot executed");
    }
}

//////////////////////////////////////////////
/// TESTS
///
#[cfg(test)]
mod tests {
    use crate::kernel::DEFAULT_MEMORY;
    use crate::runtime::ForthRuntime;

    fn runtime() -> ForthRuntime {
        let mut rt = ForthRuntime::new(DEFAULT_MEMORY);
        rt.cold_start();
        rt
    }

    #[test]
    fn test_colon_word_runs_to_completion() {
        let mut rt = runtime();
        rt.eval_line(": SQR DUP * ;");
        rt.eval_line("5 SQR");
        assert_eq!(rt.kernel.pop(), 25);
        assert_eq!(rt.ip, 0);
    }

    #[test]
    fn test_nested_colon_words() {
        let mut rt = runtime();
        rt.eval_line(": ONE 1 ;");
        rt.eval_line(": TWO ONE ONE + ;");
        rt.eval_line(": FOUR TWO TWO + ;");
        rt.eval_line("FOUR");
        assert_eq!(rt.kernel.pop(), 4);
    }

    #[test]
    fn test_execute_runs_a_noname_body() {
        let mut rt = runtime();
        rt.eval_line(":NONAME 6 7 * ; EXECUTE");
        assert_eq!(rt.kernel.pop(), 42);
    }

    #[test]
    fn test_same_word_twice_has_the_same_stack_delta() {
        let mut rt = runtime();
        rt.eval_line(": CUBE DUP DUP * * ;");
        rt.eval_line("3 CUBE");
        let first = rt.kernel.pop();
        rt.eval_line("3 CUBE");
        assert_eq!(rt.kernel.pop(), first);
    }

    #[test]
    fn test_constant_and_variable_dispatch() {
        let mut rt = runtime();
        rt.eval_line("10 CONSTANT TEN");
        rt.eval_line("VARIABLE SLOT");
        rt.eval_line("TEN SLOT !");
        rt.eval_line("SLOT @");
        assert_eq!(rt.kernel.pop(), 10);
    }

    #[test]
    #[should_panic(expected = "threaded code corruption")]
    fn test_invalid_word_reference_panics() {
        let mut rt = runtime();
        rt.execute_word(99999);
    }
}
