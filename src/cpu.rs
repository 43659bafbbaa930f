use crate::error::Chip8Error;
use crate::execute::Outcome;
use crate::instruction::Instruction;
use crate::keypad::KEY_COUNT;
use crate::quirks::Quirks;
use crate::screen::Screen;

pub const MEM_SIZE: usize = 4096;
/// Programs are loaded right after the memory reserved for the interpreter.
pub const PROGRAM_START: u16 = 0x200;
pub const MAX_ROM_SIZE: usize = MEM_SIZE - PROGRAM_START as usize;
pub const FONT_ADDR: u16 = 0x050;
pub const FONT_HEIGHT: u16 = 5;
pub const STACK_SIZE: usize = 16;
/// Only the low 12 bits of an address select a memory cell.
pub const ADDR_MASK: u16 = 0x0FFF;

const FONT: [u8; 16 * FONT_HEIGHT as usize] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // '0'
    0x20, 0x60, 0x20, 0x20, 0x70, // '1'
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // '2'
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // '3'
    0x90, 0x90, 0xF0, 0x10, 0x10, // '4'
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // '5'
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // '6'
    0xF0, 0x10, 0x20, 0x40, 0x40, // '7'
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // '8'
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // '9'
    0xF0, 0x90, 0xF0, 0x90, 0x90, // 'A'
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // 'B'
    0xF0, 0x80, 0x80, 0x80, 0xF0, // 'C'
    0xE0, 0x90, 0x90, 0x90, 0xE0, // 'D'
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // 'E'
    0xF0, 0x80, 0xF0, 0x80, 0x80, // 'F'
];

/// Represents a CHIP-8 CPU and every piece of machine state an instruction can touch.
#[derive(Clone)]
pub struct Cpu {
    // The available CPU memory. While the entire range is addressable, the first 512 bytes are
    // reserved for the interpreter. We only use them to store the font sprites needed for
    // instruction Fx29.
    pub(crate) memory: [u8; MEM_SIZE],

    // Return addresses, i.e. the address of the instruction following each CALL. The original
    // CHIP-8 supports up to 12 nested calls, we allow up to 16.
    pub(crate) call_stack: [u16; STACK_SIZE],

    // The index of first free `call_stack` cell.
    pub(crate) sp_register: usize,

    // 16 available registers named V0 through VF. VF is used as a flag in some instructions.
    pub(crate) v_registers: [u8; 16],

    // The I register is used to address memory in some instructions. Only the low 12 bits are
    // used when it is dereferenced.
    pub(crate) i_register: u16,

    // The address of the next instruction to execute.
    pub(crate) pc_register: u16,

    // The delay timer and the sound timer registers count down once per frame when not zero.
    pub(crate) dt_register: u8,
    pub(crate) st_register: u8,

    pub(crate) screen: Screen,
    // Screen dirty flag. Set whenever the screen is changed by an instruction or a reset. The
    // actual display must update and then clear this flag.
    pub(crate) screen_dirty: bool,

    // Current keyboard state, overwritten by the host once per frame
    pub(crate) key_state: [bool; KEY_COUNT],

    pub(crate) quirks: Quirks,
}

impl Cpu {
    /// Construct a CHIP-8 cpu at the initial entry state.
    pub fn new(quirks: Quirks) -> Self {
        let mut cpu = Cpu {
            memory: [0u8; MEM_SIZE],
            call_stack: [0; STACK_SIZE],
            sp_register: 0,
            v_registers: [0; 16],
            i_register: 0,
            pc_register: PROGRAM_START,
            dt_register: 0,
            st_register: 0,
            screen: Screen::new(),
            screen_dirty: false,
            key_state: [false; KEY_COUNT],
            quirks,
        };
        cpu.reset();
        cpu
    }

    /// Construct a CHIP-8 cpu at the initial entry state, with rom bytes loaded at the entry point
    /// in memory.
    pub fn with_rom(rom: &[u8], quirks: Quirks) -> Result<Self, Chip8Error> {
        let mut cpu = Cpu::new(quirks);
        cpu.load(rom)?;
        Ok(cpu)
    }

    /// Return to the initial entry state: memory, registers, stack, timers, keys and screen are
    /// zeroed and the font sprites are reloaded. The quirks are kept.
    pub fn reset(&mut self) {
        self.memory = [0u8; MEM_SIZE];
        let font_start = FONT_ADDR as usize;
        self.memory[font_start..font_start + FONT.len()].copy_from_slice(&FONT);

        self.call_stack = [0; STACK_SIZE];
        self.sp_register = 0;
        self.v_registers = [0; 16];
        self.i_register = 0;
        self.pc_register = PROGRAM_START;
        self.dt_register = 0;
        self.st_register = 0;
        self.screen.clear();
        self.screen_dirty = true;
        self.key_state = [false; KEY_COUNT];
    }

    /// Copy a program image verbatim to the entry point.
    pub fn load(&mut self, rom: &[u8]) -> Result<(), Chip8Error> {
        if rom.len() > MAX_ROM_SIZE {
            return Err(Chip8Error::RomTooLarge {
                size: rom.len(),
                max_size: MAX_ROM_SIZE,
            });
        }

        let start = PROGRAM_START as usize;
        self.memory[start..start + rom.len()].copy_from_slice(rom);
        Ok(())
    }

    /// Read the big-endian instruction word at PC, advance PC past it and decode it.
    pub fn fetch_and_decode(&mut self) -> Instruction {
        let instr = ((self.read_byte(self.pc_register) as u16) << 8)
            | (self.read_byte(self.pc_register.wrapping_add(1)) as u16);
        self.pc_register = self.pc_register.wrapping_add(2);

        Instruction::decode(instr)
    }

    /// Fetch, decode and execute a single instruction.
    pub fn step(&mut self, key_edge: Option<u8>, refresh_ready: bool) -> Outcome {
        let instr = self.fetch_and_decode();
        self.execute(instr, key_edge, refresh_ready)
    }

    /// Tick internal cpu timers. Must be called once per frame, before that frame's instructions.
    pub fn tick_timers(&mut self) {
        self.dt_register = self.dt_register.saturating_sub(1);
        self.st_register = self.st_register.saturating_sub(1);
    }

    /// Update the held state of a single key.
    pub fn set_key_state(&mut self, key: u8, pressed: bool) -> Result<(), Chip8Error> {
        let slot = self
            .key_state
            .get_mut(key as usize)
            .ok_or(Chip8Error::InvalidKey { key })?;
        *slot = pressed;
        Ok(())
    }

    /// Overwrite the whole key snapshot.
    pub fn set_keys(&mut self, keys: &[bool; KEY_COUNT]) {
        self.key_state = *keys;
    }

    pub fn key_state(&self) -> &[bool; KEY_COUNT] {
        &self.key_state
    }

    pub fn read_display(&self) -> &Screen {
        &self.screen
    }

    /// Returns whether the screen changed since the last call, and clears the flag.
    pub fn take_screen_dirty(&mut self) -> bool {
        let captured_flag = self.screen_dirty;
        self.screen_dirty = false;
        captured_flag
    }

    /// Returns the (delay, sound) timer values.
    pub fn read_timers(&self) -> (u8, u8) {
        (self.dt_register, self.st_register)
    }

    /// Returns true if the host should be playing a tone.
    pub fn sound_active(&self) -> bool {
        self.st_register > 0
    }

    pub fn quirks(&self) -> Quirks {
        self.quirks
    }

    /// Value of register V`index`. Only the low nibble of `index` is used.
    pub fn register(&self, index: usize) -> u8 {
        self.v_registers[index & 0xF]
    }

    pub fn set_register(&mut self, index: usize, value: u8) {
        self.v_registers[index & 0xF] = value;
    }

    pub fn index_register(&self) -> u16 {
        self.i_register
    }

    pub fn set_index_register(&mut self, value: u16) {
        self.i_register = value;
    }

    pub fn program_counter(&self) -> u16 {
        self.pc_register
    }

    pub fn set_program_counter(&mut self, value: u16) {
        self.pc_register = value;
    }

    /// Number of return addresses currently on the call stack.
    pub fn stack_depth(&self) -> usize {
        self.sp_register
    }

    pub fn memory(&self) -> &[u8] {
        &self.memory
    }

    /// Read the byte at `addr`, masked to 12 bits.
    pub(crate) fn read_byte(&self, addr: u16) -> u8 {
        self.memory[(addr & ADDR_MASK) as usize]
    }

    /// Write the byte at `addr`, masked to 12 bits.
    pub(crate) fn write_byte(&mut self, addr: u16, value: u8) {
        self.memory[(addr & ADDR_MASK) as usize] = value;
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Cpu::new(Quirks::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state() {
        let cpu = Cpu::default();
        assert_eq!(cpu.program_counter(), PROGRAM_START);
        assert_eq!(cpu.index_register(), 0);
        assert_eq!(cpu.stack_depth(), 0);
        assert_eq!(cpu.read_timers(), (0, 0));
        assert!(cpu.v_registers.iter().all(|&v| v == 0));
        assert!(cpu.read_display().pixels().iter().all(|&pixel| !pixel));

        let font_start = FONT_ADDR as usize;
        assert_eq!(&cpu.memory()[font_start..font_start + FONT.len()], &FONT[..]);
        assert!(cpu.memory()[PROGRAM_START as usize..].iter().all(|&b| b == 0));
    }

    #[test]
    fn load_copies_rom_to_entry_point() {
        let cpu = Cpu::with_rom(&[0x00, 0xE0, 0x12, 0x00], Quirks::default()).unwrap();
        assert_eq!(&cpu.memory()[0x200..0x204], &[0x00, 0xE0, 0x12, 0x00]);
    }

    #[test]
    fn rom_filling_all_memory_fits() {
        let rom = vec![0xAB; MAX_ROM_SIZE];
        let cpu = Cpu::with_rom(&rom, Quirks::default()).unwrap();
        assert_eq!(cpu.memory()[MEM_SIZE - 1], 0xAB);
    }

    #[test]
    fn oversized_rom_is_rejected() {
        let rom = vec![0; MAX_ROM_SIZE + 1];
        let err = Cpu::with_rom(&rom, Quirks::default()).err();
        assert_eq!(
            err,
            Some(Chip8Error::RomTooLarge {
                size: MAX_ROM_SIZE + 1,
                max_size: MAX_ROM_SIZE
            })
        );
    }

    #[test]
    fn reset_rezeroes_everything_but_font() {
        let mut cpu = Cpu::with_rom(&[0x60, 0x12], Quirks::schip()).unwrap();
        cpu.step(None, true);
        cpu.set_key_state(4, true).unwrap();
        cpu.dt_register = 9;

        cpu.reset();

        assert_eq!(cpu.register(0), 0);
        assert_eq!(cpu.program_counter(), PROGRAM_START);
        assert_eq!(cpu.read_timers(), (0, 0));
        assert!(!cpu.key_state()[4]);
        assert_eq!(cpu.memory()[0x200], 0);
        assert_eq!(cpu.memory()[FONT_ADDR as usize], 0xF0);
        assert_eq!(cpu.quirks(), Quirks::schip());
    }

    #[test]
    fn fetch_reads_big_endian_and_advances() {
        let mut cpu = Cpu::with_rom(&[0xA2, 0x3F], Quirks::default()).unwrap();
        let instr = cpu.fetch_and_decode();
        assert_eq!(instr.raw, 0xA23F);
        assert_eq!(cpu.program_counter(), 0x202);
    }

    #[test]
    fn fetch_wraps_inside_address_space() {
        let mut cpu = Cpu::default();
        cpu.memory[0xFFF] = 0x12;
        cpu.memory[0x000] = 0x34;
        cpu.set_program_counter(0xFFF);
        assert_eq!(cpu.fetch_and_decode().raw, 0x1234);
    }

    #[test]
    fn timers_stop_at_zero() {
        let mut cpu = Cpu::default();
        cpu.dt_register = 2;
        cpu.st_register = 1;
        assert!(cpu.sound_active());

        cpu.tick_timers();
        assert_eq!(cpu.read_timers(), (1, 0));
        assert!(!cpu.sound_active());

        cpu.tick_timers();
        cpu.tick_timers();
        assert_eq!(cpu.read_timers(), (0, 0));
    }

    #[test]
    fn reset_marks_screen_dirty() {
        let mut cpu = Cpu::default();
        assert!(cpu.take_screen_dirty());
        assert!(!cpu.take_screen_dirty());

        cpu.reset();
        assert!(cpu.take_screen_dirty());
    }

    #[test]
    fn key_state_updates() {
        let mut cpu = Cpu::default();
        cpu.set_key_state(0xF, true).unwrap();
        assert!(cpu.key_state()[0xF]);
        assert_eq!(
            cpu.set_key_state(0x10, true),
            Err(Chip8Error::InvalidKey { key: 0x10 })
        );

        cpu.set_keys(&[false; KEY_COUNT]);
        assert!(!cpu.key_state()[0xF]);
    }
}
