/// A CHIP-8 instruction word split into its fixed operand fields. Every field is always
/// populated, it is up to the execution engine to decide which ones an opcode uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    /// The raw big-endian instruction word.
    pub raw: u16,
    /// Opcode family, the most significant nibble.
    pub family: u8,
    /// First register index.
    pub x: usize,
    /// Second register index.
    pub y: usize,
    /// Nibble-sized immediate, the least significant nibble.
    pub n: u8,
    /// Byte-sized immediate, the least significant byte.
    pub nn: u8,
    /// 12-bit address.
    pub nnn: u16,
}

impl Instruction {
    /// Splits a raw instruction word into its fields. Never fails.
    pub fn decode(instr: u16) -> Instruction {
        Instruction {
            raw: instr,
            family: decode_instr_family(instr),
            x: decode_instr_x_reg(instr),
            y: decode_instr_y_reg(instr),
            n: decode_instr_nibble_imm(instr),
            nn: decode_instr_byte_imm(instr),
            nnn: decode_instr_addr(instr),
        }
    }
}

impl From<u16> for Instruction {
    fn from(instr: u16) -> Self {
        Instruction::decode(instr)
    }
}

/// Decodes the opcode family from a CHIP-8 instruction
fn decode_instr_family(instr: u16) -> u8 {
    ((instr & 0xF000) >> 12) as u8
}

/// Decodes a memory address from a CHIP-8 instruction
fn decode_instr_addr(instr: u16) -> u16 {
    instr & 0x0FFF
}

/// Decodes the first register from a CHIP-8 instruction
fn decode_instr_x_reg(instr: u16) -> usize {
    ((instr & 0x0F00) >> 8) as usize
}

/// Decodes the second register from a CHIP-8 instruction
fn decode_instr_y_reg(instr: u16) -> usize {
    ((instr & 0x00F0) >> 4) as usize
}

/// Decodes a byte-sized immediate from a CHIP-8 instruction
fn decode_instr_byte_imm(instr: u16) -> u8 {
    (instr & 0x00FF) as u8
}

/// Decodes a nibble-sized immediate from a CHIP-8 instruction
fn decode_instr_nibble_imm(instr: u16) -> u8 {
    (instr & 0x000F) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_every_field() {
        let instr = Instruction::decode(0xD3A7);
        assert_eq!(instr.raw, 0xD3A7);
        assert_eq!(instr.family, 0xD);
        assert_eq!(instr.x, 0x3);
        assert_eq!(instr.y, 0xA);
        assert_eq!(instr.n, 0x7);
        assert_eq!(instr.nn, 0xA7);
        assert_eq!(instr.nnn, 0x3A7);
    }

    #[test]
    fn extremes_decode_without_failure() {
        let zero = Instruction::from(0x0000);
        assert_eq!((zero.family, zero.x, zero.y, zero.nnn), (0, 0, 0, 0));

        let ones = Instruction::from(0xFFFF);
        assert_eq!(ones.family, 0xF);
        assert_eq!((ones.x, ones.y), (0xF, 0xF));
        assert_eq!((ones.n, ones.nn, ones.nnn), (0xF, 0xFF, 0xFFF));
    }
}
