use rand::Rng;
use wasm_bindgen::prelude::*;

use crate::cpu::{Cpu, FONT_ADDR, FONT_HEIGHT, STACK_SIZE};
use crate::instruction::Instruction;

#[wasm_bindgen]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// The result of executing a single instruction.
pub enum Outcome {
    /// The instruction completed.
    Ok = 0,
    /// The instruction word is not part of the instruction set. Nothing but PC was changed.
    InvalidInstruction = 1,
    /// A CALL was executed with a full call stack.
    StackOverflow = 2,
    /// A RET was executed with an empty call stack.
    StackUnderflow = 3,
    /// `Fx0A` found no key edge. PC points back at the instruction.
    AwaitKeypress = 4,
    /// `Dxyn` has to wait for the next frame. PC points back at the instruction.
    AwaitRefresh = 5,
}

impl Outcome {
    /// True for outcomes that signal a broken program rather than a request to retry later.
    pub fn is_fault(self) -> bool {
        matches!(
            self,
            Outcome::InvalidInstruction | Outcome::StackOverflow | Outcome::StackUnderflow
        )
    }

    /// True for the outcomes after which no more cycles should run this frame.
    pub fn ends_frame(self) -> bool {
        self != Outcome::Ok
    }
}

impl Cpu {
    /// Execute one decoded instruction. PC must already point past it, as left by
    /// [`Cpu::fetch_and_decode`].
    ///
    /// `key_edge` is the key that was pressed (or released, depending on the quirks) since the
    /// last frame, if any. `refresh_ready` is true while the current frame still allows a draw.
    pub fn execute(
        &mut self,
        instr: Instruction,
        key_edge: Option<u8>,
        refresh_ready: bool,
    ) -> Outcome {
        // The instruction type is determined by the most significant nibble.
        match instr.family {
            0x0 => match instr.raw {
                0x00E0 => self.instr_00e0(),
                0x00EE => self.instr_00ee(),
                _ => Outcome::InvalidInstruction,
            },
            0x1 => self.instr_1nnn(instr),
            0x2 => self.instr_2nnn(instr),
            0x3 => self.instr_3xkk(instr),
            0x4 => self.instr_4xkk(instr),
            0x5 if instr.n == 0 => self.instr_5xy0(instr),
            0x6 => self.instr_6xkk(instr),
            0x7 => self.instr_7xkk(instr),
            0x8 => self.arithmetic(instr),
            0x9 if instr.n == 0 => self.instr_9xy0(instr),
            0xA => self.instr_annn(instr),
            0xB => self.instr_bnnn(instr),
            0xC => self.instr_cxkk(instr),
            0xD => self.instr_dxyn(instr, refresh_ready),
            // Keyboard flow-control instructions: ExTT, where the last byte determines the type.
            0xE => match instr.nn {
                0x9E => self.instr_ex9e(instr),
                0xA1 => self.instr_exa1(instr),
                _ => Outcome::InvalidInstruction,
            },
            0xF => self.transfer(instr, key_edge),
            _ => Outcome::InvalidInstruction,
        }
    }

    /// Arithmetic and logic operations: 8xyT, where the last nibble determines the operation.
    fn arithmetic(&mut self, instr: Instruction) -> Outcome {
        match instr.n {
            0x0 => self.instr_8xy0(instr),
            0x1 => self.instr_8xy1(instr),
            0x2 => self.instr_8xy2(instr),
            0x3 => self.instr_8xy3(instr),
            0x4 => self.instr_8xy4(instr),
            0x5 => self.instr_8xy5(instr),
            0x6 => self.instr_8xy6(instr),
            0x7 => self.instr_8xy7(instr),
            0xE => self.instr_8xye(instr),
            _ => Outcome::InvalidInstruction,
        }
    }

    /// Timer, keyboard and memory transfers: FxTT, where the last byte determines the type.
    fn transfer(&mut self, instr: Instruction, key_edge: Option<u8>) -> Outcome {
        match instr.nn {
            0x07 => self.instr_fx07(instr),
            0x0A => self.instr_fx0a(instr, key_edge),
            0x15 => self.instr_fx15(instr),
            0x18 => self.instr_fx18(instr),
            0x1E => self.instr_fx1e(instr),
            0x29 => self.instr_fx29(instr),
            0x33 => self.instr_fx33(instr),
            0x55 => self.instr_fx55(instr),
            0x65 => self.instr_fx65(instr),
            _ => Outcome::InvalidInstruction,
        }
    }

    /// Point PC back at the instruction that was just fetched, so it runs again next time.
    fn rewind(&mut self) {
        self.pc_register = self.pc_register.wrapping_sub(2);
    }

    fn skip_if(&mut self, condition: bool) {
        if condition {
            self.pc_register = self.pc_register.wrapping_add(2);
        }
    }

    /// Writes VF. Always the last effect of an instruction, so it wins over a result stored in VF.
    fn set_flag(&mut self, flag: bool) {
        self.v_registers[0xF] = flag as u8;
    }

    /// Execute `CLS` instruction
    fn instr_00e0(&mut self) -> Outcome {
        self.screen.clear();
        self.screen_dirty = true;
        Outcome::Ok
    }

    /// Execute `RET` instruction
    fn instr_00ee(&mut self) -> Outcome {
        if self.sp_register == 0 {
            return Outcome::StackUnderflow;
        }

        // Reclaim top of stack
        self.sp_register -= 1;
        self.pc_register = self.call_stack[self.sp_register];
        Outcome::Ok
    }

    /// Execute `JP addr` instruction
    fn instr_1nnn(&mut self, instr: Instruction) -> Outcome {
        self.pc_register = instr.nnn;
        Outcome::Ok
    }

    /// Execute `CALL addr` instruction
    fn instr_2nnn(&mut self, instr: Instruction) -> Outcome {
        if self.sp_register >= STACK_SIZE {
            return Outcome::StackOverflow;
        }

        // PC already points past the CALL, which is where RET has to resume
        self.call_stack[self.sp_register] = self.pc_register;
        self.sp_register += 1;
        self.pc_register = instr.nnn;
        Outcome::Ok
    }

    /// Execute `SE Vx, byte` instruction
    fn instr_3xkk(&mut self, instr: Instruction) -> Outcome {
        self.skip_if(self.v_registers[instr.x] == instr.nn);
        Outcome::Ok
    }

    /// Execute `SNE Vx, byte` instruction
    fn instr_4xkk(&mut self, instr: Instruction) -> Outcome {
        self.skip_if(self.v_registers[instr.x] != instr.nn);
        Outcome::Ok
    }

    /// Execute `SE Vx, Vy` instruction
    fn instr_5xy0(&mut self, instr: Instruction) -> Outcome {
        self.skip_if(self.v_registers[instr.x] == self.v_registers[instr.y]);
        Outcome::Ok
    }

    /// Execute `LD Vx, byte` instruction
    fn instr_6xkk(&mut self, instr: Instruction) -> Outcome {
        self.v_registers[instr.x] = instr.nn;
        Outcome::Ok
    }

    /// Execute `ADD Vx, byte` instruction
    fn instr_7xkk(&mut self, instr: Instruction) -> Outcome {
        self.v_registers[instr.x] = self.v_registers[instr.x].wrapping_add(instr.nn);
        Outcome::Ok
    }

    /// Execute `LD Vx, Vy` instruction
    fn instr_8xy0(&mut self, instr: Instruction) -> Outcome {
        self.v_registers[instr.x] = self.v_registers[instr.y];
        Outcome::Ok
    }

    /// Execute `OR Vx, Vy` instruction
    fn instr_8xy1(&mut self, instr: Instruction) -> Outcome {
        self.v_registers[instr.x] |= self.v_registers[instr.y];
        self.logic_flag_reset();
        Outcome::Ok
    }

    /// Execute `AND Vx, Vy` instruction
    fn instr_8xy2(&mut self, instr: Instruction) -> Outcome {
        self.v_registers[instr.x] &= self.v_registers[instr.y];
        self.logic_flag_reset();
        Outcome::Ok
    }

    /// Execute `XOR Vx, Vy` instruction
    fn instr_8xy3(&mut self, instr: Instruction) -> Outcome {
        self.v_registers[instr.x] ^= self.v_registers[instr.y];
        self.logic_flag_reset();
        Outcome::Ok
    }

    // The COSMAC VIP interpreter clobbers VF in its logic routines
    fn logic_flag_reset(&mut self) {
        if self.quirks.logic_ops_clear_vf {
            self.set_flag(false);
        }
    }

    /// Execute `ADD Vx, Vy` instruction
    fn instr_8xy4(&mut self, instr: Instruction) -> Outcome {
        let (sum, carry) = self.v_registers[instr.x].overflowing_add(self.v_registers[instr.y]);

        // After performing register addition, VF acts as a carry flag
        self.v_registers[instr.x] = sum;
        self.set_flag(carry);
        Outcome::Ok
    }

    /// Execute `SUB Vx, Vy` instruction
    fn instr_8xy5(&mut self, instr: Instruction) -> Outcome {
        let (diff, borrow) = self.v_registers[instr.x].overflowing_sub(self.v_registers[instr.y]);

        // After performing register subtraction, VF acts as a NOT borrow flag
        self.v_registers[instr.x] = diff;
        self.set_flag(!borrow);
        Outcome::Ok
    }

    /// Execute `SHR Vx, Vy` instruction
    fn instr_8xy6(&mut self, instr: Instruction) -> Outcome {
        let source = self.shift_source(instr);

        // After a shift-right, VF holds the LSB that was shifted out
        self.v_registers[instr.x] = source >> 1;
        self.set_flag(source & 1 != 0);
        Outcome::Ok
    }

    /// Execute `SUBN Vx, Vy` instruction
    fn instr_8xy7(&mut self, instr: Instruction) -> Outcome {
        let (diff, borrow) = self.v_registers[instr.y].overflowing_sub(self.v_registers[instr.x]);

        self.v_registers[instr.x] = diff;
        self.set_flag(!borrow);
        Outcome::Ok
    }

    /// Execute `SHL Vx, Vy` instruction
    fn instr_8xye(&mut self, instr: Instruction) -> Outcome {
        let source = self.shift_source(instr);

        // After a shift-left, VF holds the MSB that was shifted out
        self.v_registers[instr.x] = source << 1;
        self.set_flag(source & 0x80 != 0);
        Outcome::Ok
    }

    // S-CHIP ignores Vy and shifts Vx in place
    fn shift_source(&self, instr: Instruction) -> u8 {
        if self.quirks.shift_uses_vx {
            self.v_registers[instr.x]
        } else {
            self.v_registers[instr.y]
        }
    }

    /// Execute `SNE Vx, Vy` instruction
    fn instr_9xy0(&mut self, instr: Instruction) -> Outcome {
        self.skip_if(self.v_registers[instr.x] != self.v_registers[instr.y]);
        Outcome::Ok
    }

    /// Execute `LD I, addr` instruction
    fn instr_annn(&mut self, instr: Instruction) -> Outcome {
        self.i_register = instr.nnn;
        Outcome::Ok
    }

    /// Execute `JP V0, addr` instruction
    fn instr_bnnn(&mut self, instr: Instruction) -> Outcome {
        let offset_register = if self.quirks.jump_offset_uses_vx { instr.x } else { 0 };
        self.pc_register = instr.nnn + self.v_registers[offset_register] as u16;
        Outcome::Ok
    }

    /// Execute `RND Vx, byte` instruction
    fn instr_cxkk(&mut self, instr: Instruction) -> Outcome {
        self.v_registers[instr.x] = rand::thread_rng().gen::<u8>() & instr.nn;
        Outcome::Ok
    }

    /// Execute `DRW Vx, Vy, nibble` instruction
    fn instr_dxyn(&mut self, instr: Instruction, refresh_ready: bool) -> Outcome {
        if self.quirks.display_wait && !refresh_ready {
            self.rewind();
            return Outcome::AwaitRefresh;
        }

        // A sprite is a bit-packed representation of a bitmap, its width is 8 and the number of
        // bytes is its height.
        let height = instr.n as usize;
        let mut sprite = [0u8; 15];
        for (row, byte) in sprite.iter_mut().take(height).enumerate() {
            *byte = self.read_byte(self.i_register.wrapping_add(row as u16));
        }

        let x = self.v_registers[instr.x];
        let y = self.v_registers[instr.y];
        let erased = self
            .screen
            .draw_sprite(x, y, &sprite[..height], self.quirks.clip_sprites);

        self.screen_dirty = true;

        // When drawing sprites, VF acts as collision flag
        self.set_flag(erased);
        Outcome::Ok
    }

    /// Execute `SKP Vx` instruction
    fn instr_ex9e(&mut self, instr: Instruction) -> Outcome {
        let key_digit = self.v_registers[instr.x] & 0xF;
        self.skip_if(self.key_state[key_digit as usize]);
        Outcome::Ok
    }

    /// Execute `SKNP Vx` instruction
    fn instr_exa1(&mut self, instr: Instruction) -> Outcome {
        let key_digit = self.v_registers[instr.x] & 0xF;
        self.skip_if(!self.key_state[key_digit as usize]);
        Outcome::Ok
    }

    /// Execute `LD Vx, DT` instruction
    fn instr_fx07(&mut self, instr: Instruction) -> Outcome {
        self.v_registers[instr.x] = self.dt_register;
        Outcome::Ok
    }

    /// Execute `LD Vx, K` instruction
    fn instr_fx0a(&mut self, instr: Instruction, key_edge: Option<u8>) -> Outcome {
        match key_edge {
            Some(key) => {
                self.v_registers[instr.x] = key & 0xF;
                Outcome::Ok
            }
            None => {
                // Block until a key edge arrives on a later frame
                self.rewind();
                Outcome::AwaitKeypress
            }
        }
    }

    /// Execute `LD DT, Vx` instruction
    fn instr_fx15(&mut self, instr: Instruction) -> Outcome {
        self.dt_register = self.v_registers[instr.x];
        Outcome::Ok
    }

    /// Execute `LD ST, Vx` instruction
    fn instr_fx18(&mut self, instr: Instruction) -> Outcome {
        self.st_register = self.v_registers[instr.x];
        Outcome::Ok
    }

    /// Execute `ADD I, Vx` instruction
    fn instr_fx1e(&mut self, instr: Instruction) -> Outcome {
        self.i_register = self.i_register.wrapping_add(self.v_registers[instr.x] as u16);
        Outcome::Ok
    }

    /// Execute `LD F, Vx` instruction
    fn instr_fx29(&mut self, instr: Instruction) -> Outcome {
        let hex_digit = (self.v_registers[instr.x] & 0xF) as u16;
        self.i_register = FONT_ADDR + hex_digit * FONT_HEIGHT;
        Outcome::Ok
    }

    /// Execute `LD B, Vx` instruction
    fn instr_fx33(&mut self, instr: Instruction) -> Outcome {
        let reg_val = self.v_registers[instr.x];
        let i = self.i_register;
        self.write_byte(i, reg_val / 100);
        self.write_byte(i.wrapping_add(1), (reg_val / 10) % 10);
        self.write_byte(i.wrapping_add(2), reg_val % 10);
        Outcome::Ok
    }

    /// Execute `LD [I], Vx` instruction
    fn instr_fx55(&mut self, instr: Instruction) -> Outcome {
        // Store registers V0 through Vx in memory, starting at address I
        for reg in 0..=instr.x {
            let addr = self.i_register.wrapping_add(reg as u16);
            self.write_byte(addr, self.v_registers[reg]);
        }

        self.bulk_transfer_advance(instr);
        Outcome::Ok
    }

    /// Execute `LD Vx, [I]` instruction
    fn instr_fx65(&mut self, instr: Instruction) -> Outcome {
        // Load registers V0 through Vx from memory, starting at address I
        for reg in 0..=instr.x {
            let addr = self.i_register.wrapping_add(reg as u16);
            self.v_registers[reg] = self.read_byte(addr);
        }

        self.bulk_transfer_advance(instr);
        Outcome::Ok
    }

    // In the original CHIP-8 interpreter, the I register was incremented in the load/store loop.
    // S-CHIP doesn't change the I register.
    fn bulk_transfer_advance(&mut self, instr: Instruction) {
        if self.quirks.index_increment_on_bulk_transfer {
            self.i_register = self.i_register.wrapping_add(instr.x as u16 + 1);
        }
    }
}
