// General-purpose builtin words: stack shuffling, arithmetic, logic,
// comparisons and memory access.
//
// Two-operand words pop b then a and push a op b. Comparisons push the
// Forth flags: -1 for true, 0 for false. Memory words take arena byte
// offsets; an out-of-range address is reported and the operation
// produces a zero where a result is owed.

use crate::kernel::{CELL, FALSE, TRUE};
use crate::runtime::ForthRuntime;

impl ForthRuntime {
    // stack words

    pub fn f_drop(&mut self) {
        self.kernel.pop();
    }

    pub fn f_dup(&mut self) {
        let x = self.kernel.pop();
        self.kernel.push(x);
        self.kernel.push(x);
    }

    /// ?DUP ( n -- n n | 0 ) duplicates unless zero
    pub fn f_q_dup(&mut self) {
        let x = self.kernel.pop();
        if x != 0 {
            self.kernel.push(x);
        }
        self.kernel.push(x);
    }

    pub fn f_swap(&mut self) {
        let b = self.kernel.pop();
        let a = self.kernel.pop();
        self.kernel.push(b);
        self.kernel.push(a);
    }

    pub fn f_over(&mut self) {
        let b = self.kernel.pop();
        let a = self.kernel.pop();
        self.kernel.push(a);
        self.kernel.push(b);
        self.kernel.push(a);
    }

    /// ROT ( a b c -- b c a )
    pub fn f_rot(&mut self) {
        let c = self.kernel.pop();
        let b = self.kernel.pop();
        let a = self.kernel.pop();
        self.kernel.push(b);
        self.kernel.push(c);
        self.kernel.push(a);
    }

    pub fn f_depth(&mut self) {
        let depth = self.kernel.depth();
        self.kernel.push(depth);
    }

    pub fn f_clear(&mut self) {
        self.kernel.clear_stack();
    }

    // return stack transfers

    pub fn f_to_r(&mut self) {
        let x = self.kernel.pop();
        self.kernel.push_r(x);
    }

    pub fn f_r_from(&mut self) {
        let x = self.kernel.pop_r();
        self.kernel.push(x);
    }

    /// @R copies the top of the return stack without popping
    pub fn f_r_get(&mut self) {
        let x = self.kernel.top_r();
        self.kernel.push(x);
    }

    // arithmetic and logic

    pub fn f_plus(&mut self) {
        self.kernel.pop2_push1(|a, b| a + b);
    }

    pub fn f_minus(&mut self) {
        self.kernel.pop2_push1(|a, b| a - b);
    }

    pub fn f_times(&mut self) {
        self.kernel.pop2_push1(|a, b| a * b);
    }

    pub fn f_divide(&mut self) {
        self.kernel.pop2_push1(|a, b| a / b);
    }

    pub fn f_mod(&mut self) {
        self.kernel.pop2_push1(|a, b| a % b);
    }

    pub fn f_negate(&mut self) {
        self.kernel.pop1_push1(|x| -x);
    }

    pub fn f_abs(&mut self) {
        self.kernel.pop1_push1(|x| x.abs());
    }

    pub fn f_max(&mut self) {
        self.kernel.pop2_push1(|a, b| a.max(b));
    }

    pub fn f_min(&mut self) {
        self.kernel.pop2_push1(|a, b| a.min(b));
    }

    pub fn f_and(&mut self) {
        self.kernel.pop2_push1(|a, b| a & b);
    }

    pub fn f_or(&mut self) {
        self.kernel.pop2_push1(|a, b| a | b);
    }

    pub fn f_xor(&mut self) {
        self.kernel.pop2_push1(|a, b| a ^ b);
    }

    pub fn f_lshift(&mut self) {
        self.kernel.pop2_push1(|a, b| a.wrapping_shl(b as u32));
    }

    pub fn f_rshift(&mut self) {
        self.kernel.pop2_push1(|a, b| a.wrapping_shr(b as u32));
    }

    pub fn f_invert(&mut self) {
        self.kernel.pop1_push1(|x| !x);
    }

    // comparisons

    pub fn f_equal(&mut self) {
        self.kernel.pop2_push1(|a, b| if a == b { TRUE } else { FALSE });
    }

    pub fn f_not_equal(&mut self) {
        self.kernel.pop2_push1(|a, b| if a != b { TRUE } else { FALSE });
    }

    pub fn f_less(&mut self) {
        self.kernel.pop2_push1(|a, b| if a < b { TRUE } else { FALSE });
    }

    pub fn f_less_equal(&mut self) {
        self.kernel.pop2_push1(|a, b| if a <= b { TRUE } else { FALSE });
    }

    pub fn f_greater(&mut self) {
        self.kernel.pop2_push1(|a, b| if a > b { TRUE } else { FALSE });
    }

    pub fn f_greater_equal(&mut self) {
        self.kernel.pop2_push1(|a, b| if a >= b { TRUE } else { FALSE });
    }

    pub fn f_0equal(&mut self) {
        self.kernel.pop1_push1(|x| if x == 0 { TRUE } else { FALSE });
    }

    // memory words

    /// @ ( a -- n )
    pub fn f_get(&mut self) {
        let addr = self.kernel.pop();
        if self.kernel.cell_addr_ok(addr) {
            let value = self.kernel.get_cell(addr as usize);
            self.kernel.push(value);
        } else {
            self.msg.error("@", "address out of range", Some(addr));
            self.kernel.push(0);
        }
    }

    /// ! ( n a -- )
    pub fn f_store(&mut self) {
        let addr = self.kernel.pop();
        let value = self.kernel.pop();
        if self.kernel.cell_addr_ok(addr) {
            self.kernel.set_cell(addr as usize, value);
        } else {
            self.msg.error("!", "address out of range", Some(addr));
        }
    }

    /// C@ ( a -- c )
    pub fn f_c_get(&mut self) {
        let addr = self.kernel.pop();
        if self.kernel.byte_addr_ok(addr) {
            let value = self.kernel.byte(addr as usize);
            self.kernel.push(value as i64);
        } else {
            self.msg.error("C@", "address out of range", Some(addr));
            self.kernel.push(0);
        }
    }

    /// C! ( c a -- )
    pub fn f_c_store(&mut self) {
        let addr = self.kernel.pop();
        let value = self.kernel.pop();
        if self.kernel.byte_addr_ok(addr) {
            self.kernel.set_byte(addr as usize, value as u8);
        } else {
            self.msg.error("C!", "address out of range", Some(addr));
        }
    }

    /// +! ( n a -- ) adds n into the cell at a
    pub fn f_plus_store(&mut self) {
        let addr = self.kernel.pop();
        let value = self.kernel.pop();
        if self.kernel.cell_addr_ok(addr) {
            let old = self.kernel.get_cell(addr as usize);
            self.kernel.set_cell(addr as usize, old + value);
        } else {
            self.msg.error("+!", "address out of range", Some(addr));
        }
    }

    pub fn f_here(&mut self) {
        let here = self.kernel.here() as i64;
        self.kernel.push(here);
    }

    pub fn f_allot(&mut self) {
        let n = self.kernel.pop();
        self.kernel.allot(n);
    }

    /// , ( n -- ) compiles a cell at HERE
    pub fn f_comma(&mut self) {
        let value = self.kernel.pop();
        self.kernel.comma(value);
    }

    pub fn f_chars(&mut self) {
        self.kernel.pop1_push1(|x| x);
    }

    pub fn f_cells(&mut self) {
        self.kernel.pop1_push1(|x| x * CELL as i64);
    }

    pub fn f_char_plus(&mut self) {
        self.kernel.pop1_push1(|x| x + 1);
    }

    pub fn f_cell_plus(&mut self) {
        self.kernel.pop1_push1(|x| x + CELL as i64);
    }

    /// FILL ( a u c -- )
    pub fn f_fill(&mut self) {
        let c = self.kernel.pop() as u8;
        let len = self.kernel.pop();
        let addr = self.kernel.pop();
        if self.kernel.range_ok(addr, len) {
            for i in 0..len as usize {
                self.kernel.set_byte(addr as usize + i, c);
            }
        } else {
            self.msg.error("FILL", "range out of bounds", Some((addr, len)));
        }
    }

    /// ERASE ( a u -- )
    pub fn f_erase(&mut self) {
        let len = self.kernel.pop();
        let addr = self.kernel.pop();
        if self.kernel.range_ok(addr, len) {
            for i in 0..len as usize {
                self.kernel.set_byte(addr as usize + i, 0);
            }
        } else {
            self.msg.error("ERASE", "range out of bounds", Some((addr, len)));
        }
    }

    /// COUNT ( a -- a u ) measures a NUL-terminated string
    pub fn f_count(&mut self) {
        let addr = self.kernel.pop();
        self.kernel.push(addr);
        if self.kernel.byte_addr_ok(addr) {
            let len = self.kernel.string_at(addr as usize).len() as i64;
            self.kernel.push(len);
        } else {
            self.msg.error("COUNT", "address out of range", Some(addr));
            self.kernel.push(0);
        }
    }
}
