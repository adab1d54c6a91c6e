/// Word headers and the primitive word table
///
/// Every dictionary entry carries a function pointer from a small
/// closed set: the threaded-code primitives (i_colon, i_exit, i_branch,
/// i_literal, i_constant, i_variable) or a host primitive implementing
/// one of the built-in words. The header's value cell means different
/// things per function: body address for colon words, the constant for
/// constants, storage address for variables, data address for CREATEd
/// words.
use crate::kernel::{FALSE, TRUE, WORD_NAME_SIZE};
use crate::runtime::ForthRuntime;

pub const FL_IMMEDIATE: u8 = 1;
pub const FL_HIDDEN: u8 = 2;

pub struct Word {
    pub name: String,
    pub code: fn(&mut ForthRuntime),
    pub value: i64,
    pub flags: u8,
    pub prev: Option<usize>,
}

impl Word {
    pub fn named(name: &str) -> Word {
        Word {
            name: name.chars().take(WORD_NAME_SIZE - 1).collect(),
            code: ForthRuntime::i_reserved,
            value: 0,
            flags: 0,
            prev: None,
        }
    }

    /// The entry burned at index 0 so that xt 0 never names a word.
    pub fn reserved() -> Word {
        let mut word = Word::named("");
        word.flags = FL_HIDDEN;
        word
    }

    pub fn is_immediate(&self) -> bool {
        self.flags & FL_IMMEDIATE != 0
    }

    pub fn is_hidden(&self) -> bool {
        self.flags & FL_HIDDEN != 0
    }
}

impl ForthRuntime {
    fn add_immediate(&mut self, name: &str, code: fn(&mut ForthRuntime)) {
        self.add_primitive(name, code);
        self.f_immediate();
    }

    /// Install the primitive word set. The order groups related words;
    /// lookup does not depend on it.
    pub fn install_primitives(&mut self) {
        self.add_primitive("DOLITERAL", ForthRuntime::i_literal);
        self.add_primitive("EXIT", ForthRuntime::i_exit);
        self.add_primitive("BRANCH", ForthRuntime::i_branch);

        self.add_primitive(":", ForthRuntime::f_colon);
        self.add_immediate(";", ForthRuntime::f_semicolon);
        self.add_primitive("CONSTANT", ForthRuntime::f_constant);
        self.add_primitive("VARIABLE", ForthRuntime::f_variable);
        self.add_primitive("CREATE", ForthRuntime::f_create);
        self.add_primitive(":NONAME", ForthRuntime::f_noname);
        self.add_primitive("IMMEDIATE", ForthRuntime::f_immediate);
        self.add_immediate("RECURSE", ForthRuntime::f_recurse);

        self.add_primitive("DROP", ForthRuntime::f_drop);
        self.add_primitive("DUP", ForthRuntime::f_dup);
        self.add_primitive("?DUP", ForthRuntime::f_q_dup);
        self.add_primitive("SWAP", ForthRuntime::f_swap);
        self.add_primitive("OVER", ForthRuntime::f_over);
        self.add_primitive("ROT", ForthRuntime::f_rot);
        self.add_primitive("DEPTH", ForthRuntime::f_depth);
        self.add_primitive("CLEAR", ForthRuntime::f_clear);
        self.add_primitive(">R", ForthRuntime::f_to_r);
        self.add_primitive("R>", ForthRuntime::f_r_from);
        self.add_primitive("@R", ForthRuntime::f_r_get);

        self.add_primitive("+", ForthRuntime::f_plus);
        self.add_primitive("-", ForthRuntime::f_minus);
        self.add_primitive("*", ForthRuntime::f_times);
        self.add_primitive("/", ForthRuntime::f_divide);
        self.add_primitive("MOD", ForthRuntime::f_mod);
        self.add_primitive("NEGATE", ForthRuntime::f_negate);
        self.add_primitive("ABS", ForthRuntime::f_abs);
        self.add_primitive("MAX", ForthRuntime::f_max);
        self.add_primitive("MIN", ForthRuntime::f_min);
        self.add_primitive("AND", ForthRuntime::f_and);
        self.add_primitive("OR", ForthRuntime::f_or);
        self.add_primitive("XOR", ForthRuntime::f_xor);
        self.add_primitive("<<", ForthRuntime::f_lshift);
        self.add_primitive(">>", ForthRuntime::f_rshift);
        self.add_primitive("INVERT", ForthRuntime::f_invert);

        self.add_primitive("=", ForthRuntime::f_equal);
        self.add_primitive("<>", ForthRuntime::f_not_equal);
        self.add_primitive("<", ForthRuntime::f_less);
        self.add_primitive("<=", ForthRuntime::f_less_equal);
        self.add_primitive(">", ForthRuntime::f_greater);
        self.add_primitive(">=", ForthRuntime::f_greater_equal);
        self.add_primitive("0=", ForthRuntime::f_0equal);

        self.add_primitive("@", ForthRuntime::f_get);
        self.add_primitive("!", ForthRuntime::f_store);
        self.add_primitive("C@", ForthRuntime::f_c_get);
        self.add_primitive("C!", ForthRuntime::f_c_store);
        self.add_primitive("+!", ForthRuntime::f_plus_store);
        self.add_primitive("HERE", ForthRuntime::f_here);
        self.add_primitive("ALLOT", ForthRuntime::f_allot);
        self.add_primitive(",", ForthRuntime::f_comma);
        self.add_primitive("CHARS", ForthRuntime::f_chars);
        self.add_primitive("CELLS", ForthRuntime::f_cells);
        self.add_primitive("CHAR+", ForthRuntime::f_char_plus);
        self.add_primitive("CELL+", ForthRuntime::f_cell_plus);
        self.add_primitive("FILL", ForthRuntime::f_fill);
        self.add_primitive("ERASE", ForthRuntime::f_erase);
        self.add_primitive("COUNT", ForthRuntime::f_count);
        self.add_primitive("TYPE", ForthRuntime::f_type);

        self.add_immediate(".\"", ForthRuntime::f_dot_quote);
        self.add_immediate("C\"", ForthRuntime::f_c_quote);
        self.add_immediate("(", ForthRuntime::f_paren);
        self.add_immediate("\\", ForthRuntime::f_backslash);
        self.add_immediate(".(", ForthRuntime::f_dot_paren);

        self.add_primitive("WORD", ForthRuntime::f_word);
        self.add_primitive("PARSE", ForthRuntime::f_parse);
        self.add_primitive("FIND", ForthRuntime::f_find);
        self.add_primitive("EVALUATE", ForthRuntime::f_evaluate);
        self.add_primitive("EXECUTE", ForthRuntime::f_execute);
        self.add_immediate("[", ForthRuntime::f_lbracket);
        self.add_immediate("]", ForthRuntime::f_rbracket);
        self.add_primitive("CHAR", ForthRuntime::f_char);
        self.add_immediate("[CHAR]", ForthRuntime::f_bracket_char);

        self.add_primitive(".", ForthRuntime::f_dot);
        self.add_primitive("EMIT", ForthRuntime::f_emit);
        self.add_primitive("SPACE", ForthRuntime::f_space);
        self.add_primitive("SPACES", ForthRuntime::f_spaces);
        self.add_primitive("CR", ForthRuntime::f_cr);
        self.add_primitive("KEY", ForthRuntime::f_key);

        self.add_primitive("WORDS", ForthRuntime::f_words);
        self.add_primitive(".S", ForthRuntime::f_dot_s);
        self.add_primitive("SHOWSTACK", ForthRuntime::f_showstack);
        self.add_primitive("BYE", ForthRuntime::f_bye);

        self.add_constant("FALSE", FALSE);
        self.add_constant("TRUE", TRUE);
        self.add_constant("BL", ' ' as i64);
        self.add_constant("MODE", self.mode_addr as i64);
        self.add_constant("0", 0);
        self.add_constant("1", 1);
        self.add_constant("-1", -1);
    }
}
