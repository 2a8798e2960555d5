//! Execution of the arithmetic/register-class family (`L & 0x03 == 0b10`).
//!
//! Each of the 32 possible `op_code` values names a fixed `(source, dest)`
//! pair and an ALU operation, applied across the digit span `slice_code`
//! resolves against the live pointer. Three slots (`0x01`, `0x07`, `0x0B`) are
//! not wired to anything in the external design notes; a correct ROM image
//! never emits them, so hitting one is a precondition violation rather than a
//! defined no-op.

use arbitrary_int::u4;

use super::alu::{self, Digit};
use super::decode::Slice;
use super::{Cpu, Register};

fn copy_span(reg: &Register, span: Slice) -> Vec<Digit> {
    reg[span.first..=span.last].to_vec()
}

fn zero_span(len: usize) -> Vec<Digit> {
    vec![u4::new(0); len]
}

impl Cpu {
    /// Execute one arithmetic-family microinstruction.
    ///
    /// The carry register is only updated by operations that actually run
    /// the digit-serial adder; register moves, clears, and shifts leave
    /// `CARRY` at the value [`Cpu::step`] seeded for this cycle (`false`,
    /// except where noted).
    pub(super) fn execute_arith(&mut self, slice_code: u8, op: u8) {
        let span = Slice::resolve(slice_code, self.p);

        match op {
            // 0x00: test C != 0
            0x00 => self.carry = alu::any_nonzero(&copy_span(&self.c, span)),
            // 0x02: A-C -> T
            0x02 => {
                let a = copy_span(&self.a, span);
                let c = copy_span(&self.c, span);
                let mut t = a;
                self.carry = alu::sub_slice(&mut t, &c, false);
                self.t[span.first..=span.last].copy_from_slice(&t);
            }
            // 0x03: test C-1 == 0 (decrement-and-test, result discarded)
            0x03 => self.carry = alu::decrement_is_zero(&copy_span(&self.c, span)),
            // 0x04: B -> C
            0x04 => {
                let b = copy_span(&self.b, span);
                self.c[span.first..=span.last].copy_from_slice(&b);
            }
            // 0x05: 0-C -> C
            0x05 => {
                let c = copy_span(&self.c, span);
                let mut zero = zero_span(c.len());
                self.carry = alu::sub_slice(&mut zero, &c, false);
                self.c[span.first..=span.last].copy_from_slice(&zero);
            }
            // 0x06: 0 -> C
            0x06 => {
                let zero = zero_span(span.last - span.first + 1);
                self.c[span.first..=span.last].copy_from_slice(&zero);
            }
            // 0x08: shift A left (toward more-significant digits) within the span
            0x08 => shift_left(&mut self.a, span),
            // 0x09: A -> B
            0x09 => {
                let a = copy_span(&self.a, span);
                self.b[span.first..=span.last].copy_from_slice(&a);
            }
            // 0x0A: A-C -> C
            0x0A => {
                let c = copy_span(&self.c, span);
                let mut a = copy_span(&self.a, span);
                self.carry = alu::sub_slice(&mut a, &c, false);
                self.c[span.first..=span.last].copy_from_slice(&a);
            }
            // 0x0C: C -> A
            0x0C => {
                let c = copy_span(&self.c, span);
                self.a[span.first..=span.last].copy_from_slice(&c);
            }
            // 0x0D: test A != 0
            0x0D => self.carry = alu::any_nonzero(&copy_span(&self.a, span)),
            // 0x0E: A+C -> C
            0x0E => {
                let a = copy_span(&self.a, span);
                let mut c = copy_span(&self.c, span);
                self.carry = alu::add_slice(&mut c, &a, false);
                self.c[span.first..=span.last].copy_from_slice(&c);
            }
            // 0x0F: C+1 -> C
            0x0F => {
                let mut c = copy_span(&self.c, span);
                let zero = zero_span(c.len());
                self.carry = alu::add_slice(&mut c, &zero, true);
                self.c[span.first..=span.last].copy_from_slice(&c);
            }
            // 0x10: test A-B -> T (discarded outside the span, A and B untouched)
            0x10 => {
                let a = copy_span(&self.a, span);
                let b = copy_span(&self.b, span);
                let mut t = a;
                self.carry = alu::sub_slice(&mut t, &b, false);
                self.t[span.first..=span.last].copy_from_slice(&t);
            }
            // 0x11: B <-> C
            0x11 => swap_span(&mut self.b, &mut self.c, span),
            // 0x12: shift C right (toward less-significant digits)
            0x12 => shift_right(&mut self.c, span),
            // 0x13: test A-1 == 0 (decrement-and-test, result discarded)
            0x13 => self.carry = alu::decrement_is_zero(&copy_span(&self.a, span)),
            // 0x14: shift B right
            0x14 => shift_right(&mut self.b, span),
            // 0x15: C+C -> C
            0x15 => {
                let c_src = copy_span(&self.c, span);
                let mut c = copy_span(&self.c, span);
                self.carry = alu::add_slice(&mut c, &c_src, false);
                self.c[span.first..=span.last].copy_from_slice(&c);
            }
            // 0x16: shift A right
            0x16 => shift_right(&mut self.a, span),
            // 0x17: 0 -> A
            0x17 => {
                let zero = zero_span(span.last - span.first + 1);
                self.a[span.first..=span.last].copy_from_slice(&zero);
            }
            // 0x18: A-B -> A
            0x18 => {
                let b = copy_span(&self.b, span);
                let mut a = copy_span(&self.a, span);
                self.carry = alu::sub_slice(&mut a, &b, false);
                self.a[span.first..=span.last].copy_from_slice(&a);
            }
            // 0x19: A <-> B
            0x19 => swap_span(&mut self.a, &mut self.b, span),
            // 0x1A: A-C -> A
            0x1A => {
                let c = copy_span(&self.c, span);
                let mut a = copy_span(&self.a, span);
                self.carry = alu::sub_slice(&mut a, &c, false);
                self.a[span.first..=span.last].copy_from_slice(&a);
            }
            // 0x1B: A-1 -> A
            0x1B => {
                let mut a = copy_span(&self.a, span);
                let zero = zero_span(a.len());
                self.carry = alu::sub_slice(&mut a, &zero, true);
                self.a[span.first..=span.last].copy_from_slice(&a);
            }
            // 0x1C: A+B -> A
            0x1C => {
                let b = copy_span(&self.b, span);
                let mut a = copy_span(&self.a, span);
                self.carry = alu::add_slice(&mut a, &b, false);
                self.a[span.first..=span.last].copy_from_slice(&a);
            }
            // 0x1D: A <-> C
            0x1D => swap_span(&mut self.a, &mut self.c, span),
            // 0x1E: A+C -> A
            0x1E => {
                let c = copy_span(&self.c, span);
                let mut a = copy_span(&self.a, span);
                self.carry = alu::add_slice(&mut a, &c, false);
                self.a[span.first..=span.last].copy_from_slice(&a);
            }
            // 0x1F: A+1 -> A
            0x1F => {
                let mut a = copy_span(&self.a, span);
                let zero = zero_span(a.len());
                self.carry = alu::add_slice(&mut a, &zero, true);
                self.a[span.first..=span.last].copy_from_slice(&a);
            }
            0x01 | 0x07 | 0x0B => {
                debug_assert!(false, "undefined arithmetic opcode {op:#04x} reached — impossible over a correct ROM image");
            }
            _ => unreachable!("op_code is masked to 5 bits by the decoder"),
        }
    }
}

fn swap_span(a: &mut Register, b: &mut Register, span: Slice) {
    for i in span.first..=span.last {
        std::mem::swap(&mut a[i], &mut b[i]);
    }
}

fn shift_left(reg: &mut Register, span: Slice) {
    for i in (span.first + 1..=span.last).rev() {
        reg[i] = reg[i - 1];
    }
    reg[span.first] = u4::new(0);
}

fn shift_right(reg: &mut Register, span: Slice) {
    for i in span.first..span.last {
        reg[i] = reg[i + 1];
    }
    reg[span.last] = u4::new(0);
}
