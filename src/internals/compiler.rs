// Compiler and Outer Interpreter

use crate::internals::builtin::{FL_HIDDEN, FL_IMMEDIATE};
use crate::kernel::{CELL, DATA_STACK_SIZE};
use crate::runtime::ForthRuntime;

impl ForthRuntime {
    /// EVALUATE ( a -- ) interpret the NUL-terminated text at a.
    pub fn f_evaluate(&mut self) {
        let addr = self.kernel.pop();
        if !self.kernel.byte_addr_ok(addr) {
            self.msg.error("EVALUATE", "address out of range", Some(addr));
            return;
        }
        self.u_evaluate_buffer(addr as usize);
    }

    /// The outer interpreter. Points the tokenizer at the buffer and,
    /// per token: look the word up and execute it (interpret mode or
    /// immediate) or append it to the current definition; unknown
    /// tokens fall back to integer parsing. `ok` is printed only when
    /// the tokens ran out cleanly. The previous tokenizer source is
    /// restored on the way out, so EVALUATE nests; the mode flag is
    /// forced to interpret on entry and left wherever the tokens put it.
    /// Stack health is checked once per call, not per operation.
    pub fn u_evaluate_buffer(&mut self, addr: usize) {
        let old_cp = self.cp;
        self.cp = Some(addr);
        self.set_compile_mode(false);
        loop {
            let token_addr = match self.parse() {
                Some(a) => a,
                None => {
                    self.emit_line("ok");
                    break;
                }
            };
            let token = self.kernel.string_at(token_addr);
            if self.show_stack {
                let trace = format!("-> {}", token);
                self.emit_line(&trace);
            }
            match self.kernel.find_word(&token) {
                Some(idx) => {
                    if !self.get_compile_mode() || self.kernel.word(idx).is_immediate() {
                        self.call_word(idx);
                    } else {
                        self.kernel.comma(idx as i64);
                    }
                }
                None => match token.parse::<i64>() {
                    Ok(value) => {
                        if self.get_compile_mode() {
                            self.u_compile("DOLITERAL");
                            self.kernel.comma(value);
                        } else {
                            self.kernel.push(value);
                        }
                    }
                    Err(_) => {
                        let complaint = format!("{}?", token);
                        self.emit_line(&complaint);
                        break;
                    }
                },
            }
            if self.show_stack {
                self.u_dump_stack(4);
            }
        }
        self.cp = old_cp;
        let s0 = self.kernel.stack_base();
        let sp = self.kernel.stack_ptr();
        if sp < s0 {
            self.emit_line("stack underflow");
        } else if sp > s0 + DATA_STACK_SIZE * CELL {
            self.emit_line("stack overflow");
        }
    }

    /// u_compile appends a reference to a named word to the dictionary.
    ///     The referent must exist; a miss here is an engine-integrity
    ///     failure, not a user error.
    pub fn u_compile(&mut self, name: &str) {
        match self.kernel.find_word(name) {
            Some(idx) => self.kernel.comma(idx as i64),
            None => panic!("COMPILE: {}?", name),
        }
    }

    /// u_compile_string lays down the string-literal idiom:
    ///
    /// ```text
    /// DOLITERAL <text-addr>  BRANCH <past-addr>  text... NUL
    /// ```
    ///
    /// both placeholder cells are back-patched once the text is in
    /// place. Executed, this pushes the text address and jumps over
    /// the bytes.
    pub fn u_compile_string(&mut self, text: &str) {
        self.u_compile("DOLITERAL");
        let literal_patch = self.kernel.here();
        self.kernel.comma(0);
        self.u_compile("BRANCH");
        let branch_patch = self.kernel.here();
        self.kernel.comma(0);
        let text_addr = self.kernel.allot(text.len() as i64 + 1);
        self.kernel.string_set(text_addr, text);
        let past = self.kernel.here() as i64;
        self.kernel.set_cell(literal_patch, text_addr as i64);
        self.kernel.set_cell(branch_patch, past);
    }

    /// u_expect_name reads the defining word's name argument; a missing
    /// name is fatal.
    fn u_expect_name(&mut self) -> String {
        match self.parse() {
            Some(addr) => self.kernel.string_at(addr),
            None => panic!("no name for word!"),
        }
    }

    /// : <name> starts a definition: hidden header, body at HERE,
    /// compile mode on. The HIDDEN flag is what keeps the word from
    /// finding itself until ; completes it.
    pub fn f_colon(&mut self) {
        let name = self.u_expect_name();
        let body = self.kernel.here() as i64;
        let idx = self.kernel.make_word(&name);
        let word = self.kernel.word_mut(idx);
        word.code = ForthRuntime::i_colon;
        word.value = body;
        word.flags = FL_HIDDEN;
        self.set_compile_mode(true);
    }

    /// ; finishes a definition: compile EXIT, reveal the word, back to
    /// interpret mode.
    pub fn f_semicolon(&mut self) {
        self.u_compile("EXIT");
        if let Some(idx) = self.kernel.head() {
            self.kernel.word_mut(idx).flags &= !FL_HIDDEN;
        }
        self.set_compile_mode(false);
    }

    /// CONSTANT <name> ( n -- )
    pub fn f_constant(&mut self) {
        let name = self.u_expect_name();
        let value = self.kernel.pop();
        let idx = self.kernel.make_word(&name);
        let word = self.kernel.word_mut(idx);
        word.code = ForthRuntime::i_constant;
        word.value = value;
    }

    /// VARIABLE <name> ( -- ) The storage is one arena cell, so @ and !
    /// reach it like any other address.
    pub fn f_variable(&mut self) {
        let name = self.u_expect_name();
        let storage = self.kernel.allot(CELL as i64);
        self.kernel.set_cell(storage, 0);
        let idx = self.kernel.make_word(&name);
        let word = self.kernel.word_mut(idx);
        word.code = ForthRuntime::i_variable;
        word.value = storage as i64;
    }

    /// CREATE <name> ( -- ) The new word pushes the address of whatever
    /// the user allots after it.
    pub fn f_create(&mut self) {
        let name = self.u_expect_name();
        let data = self.kernel.here() as i64;
        let idx = self.kernel.make_word(&name);
        let word = self.kernel.word_mut(idx);
        word.code = ForthRuntime::i_constant;
        word.value = data;
    }

    /// :NONAME ( -- xt ) An unnamed definition, reachable only through
    /// the execution token it leaves on the stack. The header is never
    /// linked into the dictionary chain.
    pub fn f_noname(&mut self) {
        let body = self.kernel.here() as i64;
        let idx = self.kernel.make_headless_word();
        let word = self.kernel.word_mut(idx);
        word.code = ForthRuntime::i_colon;
        word.value = body;
        self.kernel.push(idx as i64);
        self.set_compile_mode(true);
    }

    /// IMMEDIATE marks the most recent definition.
    pub fn f_immediate(&mut self) {
        if let Some(idx) = self.kernel.head() {
            self.kernel.word_mut(idx).flags |= FL_IMMEDIATE;
        }
    }

    /// RECURSE reveals the definition under construction so its own
    /// name can be compiled into its body.
    pub fn f_recurse(&mut self) {
        if let Some(idx) = self.kernel.head() {
            self.kernel.word_mut(idx).flags &= !FL_HIDDEN;
        }
    }

    /// [ switches to interpret mode inside a definition.
    pub fn f_lbracket(&mut self) {
        self.set_compile_mode(false);
    }

    /// ] switches back to compile mode.
    pub fn f_rbracket(&mut self) {
        self.set_compile_mode(true);
    }

    /// CHAR <name> ( -- c ) pushes the first character of the next
    /// token. The tokenizer has already uppercased it.
    pub fn f_char(&mut self) {
        let name = self.u_expect_name();
        let c = name.as_bytes().first().copied().unwrap_or(0);
        self.kernel.push(c as i64);
    }

    /// [CHAR] <name> compiles the character as a literal.
    pub fn f_bracket_char(&mut self) {
        let name = self.u_expect_name();
        let c = name.as_bytes().first().copied().unwrap_or(0);
        self.u_compile("DOLITERAL");
        self.kernel.comma(c as i64);
    }

    /// ." prints its text directly in interpret mode; in compile mode
    /// it compiles the string followed by TYPE.
    pub fn f_dot_quote(&mut self) {
        let addr = match self.parse_raw(b'"') {
            Some(addr) => addr,
            None => panic!("no string to compile"),
        };
        let text = self.kernel.string_at(addr);
        if self.get_compile_mode() {
            self.u_compile_string(&text);
            self.u_compile("TYPE");
        } else {
            self.emit_str(&text);
        }
    }

    /// C" compiles its text; executing the fragment leaves the string
    /// address on the stack.
    pub fn f_c_quote(&mut self) {
        let addr = match self.parse_raw(b'"') {
            Some(addr) => addr,
            None => panic!("no string to compile"),
        };
        let text = self.kernel.string_at(addr);
        self.u_compile_string(&text);
    }

    /// ( consumes a comment up to the closing paren.
    pub fn f_paren(&mut self) {
        self.parse_raw(b')');
    }

    /// \ consumes the rest of the line.
    pub fn f_backslash(&mut self) {
        self.parse_raw(b'\n');
    }

    /// .( consumes to the closing paren, echoing the text only in
    /// compile mode.
    pub fn f_dot_paren(&mut self) {
        if let Some(addr) = self.parse_raw(b')') {
            if self.get_compile_mode() {
                let text = self.kernel.string_at(addr);
                self.emit_str(&text);
            }
        }
    }

    /// WORD ( -- a ) exposes the tokenizer; 0 when no token remains.
    pub fn f_word(&mut self) {
        match self.parse() {
            Some(addr) => self.kernel.push(addr as i64),
            None => self.kernel.push(0),
        }
    }

    /// PARSE ( c -- a ) reads delimited text into the raw buffer.
    pub fn f_parse(&mut self) {
        let delim = self.kernel.pop() as u8;
        match self.parse_raw(delim) {
            Some(addr) => self.kernel.push(addr as i64),
            None => self.kernel.push(0),
        }
    }

    /// FIND ( a -- xt | 0 )
    pub fn f_find(&mut self) {
        let addr = self.kernel.pop();
        if !self.kernel.byte_addr_ok(addr) {
            self.msg.error("FIND", "address out of range", Some(addr));
            self.kernel.push(0);
            return;
        }
        let name = self.kernel.string_at(addr as usize);
        match self.kernel.find_word(&name) {
            Some(idx) => self.kernel.push(idx as i64),
            None => self.kernel.push(0),
        }
    }

    /// EXECUTE ( xt -- ) dispatches a word by its execution token,
    /// running colon words to completion before returning.
    pub fn f_execute(&mut self) {
        let xt = self.kernel.pop();
        if xt <= 0 || xt as usize >= self.kernel.words_len() {
            self.msg.error("EXECUTE", "invalid execution token", Some(xt));
            return;
        }
        self.call_word(xt as usize);
    }
}

//////////////////////////////////////////////
/// TESTS
///
#[cfg(test)]
mod tests {
    use crate::kernel::{CELL, DEFAULT_MEMORY};
    use crate::runtime::ForthRuntime;
    use std::cell::RefCell;
    use std::io::Write;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct Capture(Rc<RefCell<Vec<u8>>>);

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Capture {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.borrow()).to_string()
        }
    }

    fn runtime() -> ForthRuntime {
        let mut rt = ForthRuntime::new(DEFAULT_MEMORY);
        rt.cold_start();
        rt
    }

    fn captured_runtime() -> (ForthRuntime, Capture) {
        let mut rt = runtime();
        let capture = Capture::default();
        rt.set_output(Box::new(capture.clone()));
        (rt, capture)
    }

    #[test]
    fn test_interpreting_pushes_numbers() {
        let mut rt = runtime();
        rt.eval_line("1 2 -3");
        assert_eq!(rt.kernel.stack_contents(), vec![1, 2, -3]);
    }

    #[test]
    fn test_unknown_token_aborts_the_line() {
        let (mut rt, out) = captured_runtime();
        rt.eval_line("1 2 GIBBERISH 3");
        assert_eq!(out.text(), "GIBBERISH?\n");
        assert_eq!(rt.kernel.stack_contents(), vec![1, 2]);
    }

    #[test]
    fn test_ok_only_on_clean_lines() {
        let (mut rt, out) = captured_runtime();
        rt.eval_line("1 2 +");
        assert_eq!(out.text(), "ok\n");
    }

    #[test]
    fn test_colon_body_ends_with_exit() {
        let mut rt = runtime();
        rt.eval_line(": SQR DUP * ;");
        let idx = rt.kernel.find_word("SQR").unwrap();
        let body = rt.kernel.word(idx).value as usize;
        let dup = rt.kernel.find_word("DUP").unwrap() as i64;
        let times = rt.kernel.find_word("*").unwrap() as i64;
        let exit = rt.kernel.find_word("EXIT").unwrap() as i64;
        assert_eq!(rt.kernel.get_cell(body), dup);
        assert_eq!(rt.kernel.get_cell(body + CELL), times);
        assert_eq!(rt.kernel.get_cell(body + 2 * CELL), exit);
    }

    #[test]
    fn test_definition_is_hidden_until_semicolon() {
        let (mut rt, out) = captured_runtime();
        // SELF cannot see itself mid-definition, so the token fails
        rt.eval_line(": SELF SELF ;");
        assert_eq!(out.text(), "SELF?\n");
        assert!(rt.kernel.find_word("SELF").is_none());
    }

    #[test]
    fn test_recurse_reveals_the_definition() {
        let mut rt = runtime();
        rt.eval_line(": GCD RECURSE ;");
        let idx = rt.kernel.find_word("GCD").unwrap();
        assert!(!rt.kernel.word(idx).is_hidden());
        // a self-reference compiles once RECURSE has run
        rt.eval_line(": STEP RECURSE STEP ;");
        let step = rt.kernel.find_word("STEP").unwrap();
        let body = rt.kernel.word(step).value as usize;
        assert_eq!(rt.kernel.get_cell(body), step as i64);
    }

    #[test]
    fn test_immediate_word_runs_during_compilation() {
        let mut rt = runtime();
        rt.eval_line(": MARK 42 ; IMMEDIATE");
        rt.eval_line(": USER MARK ;");
        // MARK executed while USER was compiling
        assert_eq!(rt.kernel.stack_contents(), vec![42]);
        rt.eval_line("USER");
        assert_eq!(rt.kernel.stack_contents(), vec![42]);
    }

    #[test]
    fn test_non_immediate_word_is_compiled_instead() {
        let mut rt = runtime();
        rt.eval_line(": MARK 42 ;");
        rt.eval_line(": USER MARK ;");
        assert_eq!(rt.kernel.depth(), 0);
        rt.eval_line("USER");
        assert_eq!(rt.kernel.stack_contents(), vec![42]);
    }

    #[test]
    fn test_constant_round_trip() {
        let mut rt = runtime();
        rt.eval_line("10 CONSTANT TEN");
        rt.eval_line("TEN TEN +");
        assert_eq!(rt.kernel.pop(), 20);
    }

    #[test]
    fn test_variable_round_trip() {
        let mut rt = runtime();
        rt.eval_line("VARIABLE V");
        rt.eval_line("7 V !");
        rt.eval_line("V @");
        assert_eq!(rt.kernel.pop(), 7);
    }

    #[test]
    fn test_create_pushes_the_data_address() {
        let mut rt = runtime();
        let here = rt.kernel.here() as i64;
        rt.eval_line("CREATE BUF 4 CELLS ALLOT");
        rt.eval_line("BUF");
        assert_eq!(rt.kernel.pop(), here);
        assert_eq!(rt.kernel.here() as i64, here + 4 * CELL as i64);
    }

    #[test]
    fn test_noname_leaves_an_xt() {
        let mut rt = runtime();
        rt.eval_line(":NONAME 9 DUP * ;");
        let xt = rt.kernel.pop();
        assert!(xt > 0);
        rt.kernel.push(xt);
        rt.eval_line("EXECUTE");
        assert_eq!(rt.kernel.pop(), 81);
    }

    #[test]
    fn test_brackets_switch_modes_mid_definition() {
        let mut rt = runtime();
        rt.eval_line(": NOTHING [ 1 2 + ] ;");
        // the addition ran at compile time
        assert_eq!(rt.kernel.stack_contents(), vec![3]);
        rt.eval_line("NOTHING");
        assert_eq!(rt.kernel.stack_contents(), vec![3]);
    }

    #[test]
    fn test_compiled_literals() {
        let mut rt = runtime();
        rt.eval_line(": FIVE 5 ;");
        rt.eval_line("FIVE FIVE +");
        assert_eq!(rt.kernel.pop(), 10);
    }

    #[test]
    fn test_string_literal_layout_and_backpatching() {
        let mut rt = runtime();
        rt.eval_line(": GREET .\" AB\" ;");
        let idx = rt.kernel.find_word("GREET").unwrap();
        let body = rt.kernel.word(idx).value as usize;
        let doliteral = rt.kernel.find_word("DOLITERAL").unwrap() as i64;
        let branch = rt.kernel.find_word("BRANCH").unwrap() as i64;
        assert_eq!(rt.kernel.get_cell(body), doliteral);
        let text_addr = rt.kernel.get_cell(body + CELL) as usize;
        assert_eq!(rt.kernel.get_cell(body + 2 * CELL), branch);
        let past = rt.kernel.get_cell(body + 3 * CELL) as usize;
        assert_eq!(rt.kernel.string_at(text_addr), "AB");
        assert_eq!(text_addr, body + 4 * CELL);
        assert_eq!(past, text_addr + 3); // "AB" plus the NUL
        // past the text sits the TYPE reference
        let type_idx = rt.kernel.find_word("TYPE").unwrap() as i64;
        assert_eq!(rt.kernel.get_cell(past), type_idx);
    }

    #[test]
    fn test_dot_quote_prints_immediately_when_interpreting() {
        let (mut rt, out) = captured_runtime();
        rt.eval_line(".\" hello\"");
        assert_eq!(out.text(), "hellook\n");
    }

    #[test]
    fn test_compiled_dot_quote_prints_when_run() {
        let (mut rt, out) = captured_runtime();
        rt.eval_line(": G .\" hi\" ;");
        rt.eval_line("G");
        assert_eq!(out.text(), "ok\nhiok\n");
    }

    #[test]
    fn test_c_quote_leaves_the_string_address() {
        let mut rt = runtime();
        rt.eval_line(": S C\" abc\" ;");
        rt.eval_line("S");
        let addr = rt.kernel.pop() as usize;
        assert_eq!(rt.kernel.string_at(addr), "abc");
    }

    #[test]
    fn test_paren_and_backslash_comments() {
        let mut rt = runtime();
        rt.eval_line("1 ( 2 3 ) 4");
        assert_eq!(rt.kernel.stack_contents(), vec![1, 4]);
        rt.eval_line("5 \\ 6 7");
        assert_eq!(rt.kernel.stack_contents(), vec![1, 4, 5]);
    }

    #[test]
    fn test_dot_paren_echoes_only_in_compile_mode() {
        let (mut rt, out) = captured_runtime();
        rt.eval_line(".( quiet)");
        assert_eq!(out.text(), "ok\n");
        rt.eval_line(": X .( loud) ;");
        assert_eq!(out.text(), "ok\nloudok\n");
    }

    #[test]
    fn test_char_and_bracket_char() {
        let mut rt = runtime();
        rt.eval_line("CHAR a");
        assert_eq!(rt.kernel.pop(), 'A' as i64);
        rt.eval_line(": Q [CHAR] * ;");
        rt.eval_line("Q");
        assert_eq!(rt.kernel.pop(), '*' as i64);
    }

    #[test]
    fn test_find_returns_xt_or_zero() {
        let mut rt = runtime();
        let addr = rt.kernel.allot(16);
        rt.kernel.string_set(addr, "DUP");
        rt.kernel.push(addr as i64);
        rt.eval_line("FIND");
        let xt = rt.kernel.pop();
        assert_eq!(xt, rt.kernel.find_word("DUP").unwrap() as i64);
        rt.kernel.string_set(addr, "NOPE");
        rt.kernel.push(addr as i64);
        rt.eval_line("FIND");
        assert_eq!(rt.kernel.pop(), 0);
    }

    #[test]
    fn test_evaluate_nests_and_restores_the_source() {
        let mut rt = runtime();
        let addr = rt.kernel.allot(32);
        rt.kernel.string_set(addr, "2 3 +");
        rt.kernel.push(addr as i64);
        rt.eval_line("EVALUATE 10 *");
        assert_eq!(rt.kernel.pop(), 50);
    }

    #[test]
    fn test_execute_rejects_a_bad_token() {
        let mut rt = runtime();
        rt.eval_line("0 EXECUTE");
        assert_eq!(rt.kernel.depth(), 0);
    }

    #[test]
    fn test_stack_diagnostics_are_per_line() {
        let (mut rt, out) = captured_runtime();
        rt.eval_line("DROP");
        assert_eq!(out.text(), "ok\nstack underflow\n");
        rt.eval_line("1");
        // one push repairs the single-cell underflow; no new complaint
        assert_eq!(out.text(), "ok\nstack underflow\nok\n");
    }

    #[test]
    fn test_stack_overflow_diagnostic() {
        let (mut rt, out) = captured_runtime();
        rt.eval_line("1 2 3 4 5 6 7 8 9 10 11 12 13 14 15 16 17");
        assert!(out.text().ends_with("ok\nstack overflow\n"));
    }

    #[test]
    #[should_panic(expected = "no name for word!")]
    fn test_colon_without_a_name_is_fatal() {
        let mut rt = runtime();
        rt.eval_line(":");
    }

    #[test]
    #[should_panic(expected = "COMPILE:")]
    fn test_unknown_compile_referent_is_fatal() {
        let mut rt = runtime();
        rt.u_compile("NO-SUCH-WORD");
    }
}
