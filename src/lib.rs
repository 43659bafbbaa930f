//! A CHIP-8 virtual machine: 4K of memory, 16 8-bit registers, a 16-entry call stack, two
//! countdown timers and a 64x32 monochrome screen, with the CHIP-8/SUPER-CHIP differences
//! selectable at runtime through [`Quirks`].
//!
//! [`Cpu`] is the machine itself and can be driven instruction by instruction. [`Emulator`] wraps
//! it in the per-frame loop a host (usually JS, through `wasm-bindgen`) calls at 60Hz.

#[macro_use]
pub mod utils;

mod cpu;
mod error;
mod execute;
mod instruction;
mod keypad;
mod quirks;
mod screen;

use wasm_bindgen::prelude::*;

pub use crate::cpu::{Cpu, FONT_ADDR, MAX_ROM_SIZE, MEM_SIZE, PROGRAM_START, STACK_SIZE};
pub use crate::error::Chip8Error;
pub use crate::execute::Outcome;
pub use crate::instruction::Instruction;
pub use crate::keypad::{Keypad, KEY_COUNT};
pub use crate::quirks::Quirks;
pub use crate::screen::{Screen, SCREEN_HEIGHT, SCREEN_WIDTH};

/// Instructions executed per frame unless the host asks otherwise.
pub const DEFAULT_CYCLES_PER_FRAME: u32 = 20;

#[wasm_bindgen]
/// Runs a CHIP-8 program one frame at a time.
pub struct Emulator {
    cpu: Cpu,
    keypad: Keypad,
    rom: Vec<u8>,
    cycles_per_frame: u32,

    // The fault that stopped the program, if any. Frames don't execute anything until a reset.
    fault: Option<Outcome>,
}

impl Emulator {
    /// Construct an emulator with the rom loaded at the entry point.
    pub fn with_rom(rom: &[u8], quirks: Quirks) -> Result<Emulator, Chip8Error> {
        let cpu = Cpu::with_rom(rom, quirks)?;
        console_log!("Loaded {} byte ROM with {:?}", rom.len(), quirks);

        Ok(Emulator {
            cpu,
            keypad: Keypad::new(),
            rom: rom.to_vec(),
            cycles_per_frame: DEFAULT_CYCLES_PER_FRAME,
            fault: None,
        })
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn screen(&self) -> &Screen {
        self.cpu.read_display()
    }

    /// The fault that halted the program, if any.
    pub fn fault(&self) -> Option<Outcome> {
        self.fault
    }

    /// Run one frame with the given key snapshot, see [`Emulator::run_frame`].
    pub fn run_frame_with_keys(&mut self, keys: &[bool; KEY_COUNT]) -> Outcome {
        if let Some(fault) = self.fault {
            return fault;
        }

        // Timers and keys are updated exactly once per frame, before any instruction runs
        self.cpu.tick_timers();
        let mut key_edge = self
            .keypad
            .update(keys, self.cpu.quirks().key_wait_on_release);
        self.cpu.set_keys(keys);

        let mut refresh_ready = true;
        for _ in 0..self.cycles_per_frame {
            let pc = self.cpu.program_counter();
            let instr = self.cpu.fetch_and_decode();
            let outcome = self.cpu.execute(instr, key_edge, refresh_ready);

            if outcome == Outcome::Ok {
                match (instr.family, instr.nn) {
                    // One sprite draw per frame
                    (0xD, _) => refresh_ready = false,
                    // A key edge resolves a single wait
                    (0xF, 0x0A) => key_edge = None,
                    _ => {}
                }
            }

            if outcome.is_fault() {
                console_warn!(
                    "Halting on {:?}: instruction {:#06x} at address {:#05x}",
                    outcome,
                    instr.raw,
                    pc
                );
                self.fault = Some(outcome);
            }
            if outcome.ends_frame() {
                return outcome;
            }
        }

        Outcome::Ok
    }
}

#[wasm_bindgen]
impl Emulator {
    /// Construct an emulator from JS. Errors are reported as strings.
    #[wasm_bindgen(constructor)]
    pub fn new(rom: &[u8], quirks: Quirks) -> Result<Emulator, JsValue> {
        utils::set_panic_hook();

        Emulator::with_rom(rom, quirks).map_err(|err| JsValue::from_str(&err.to_string()))
    }

    /// Run one frame: tick the timers, take the key snapshot (16 bytes, non-zero means held) and
    /// execute up to `cycles_per_frame` instructions. Stops early when the program waits for a key
    /// or for the next frame, and halts on a fault; the returned outcome says which happened.
    pub fn run_frame(&mut self, keys: &[u8]) -> Outcome {
        let mut snapshot = [false; KEY_COUNT];
        if keys.len() == KEY_COUNT {
            for (held, &key) in snapshot.iter_mut().zip(keys) {
                *held = key != 0;
            }
        } else {
            console_warn!("{}", Chip8Error::InvalidKeyState { len: keys.len() });
        }

        self.run_frame_with_keys(&snapshot)
    }

    /// Restart the loaded program from a clean machine.
    pub fn reset(&mut self) {
        self.cpu.reset();
        if let Err(err) = self.cpu.load(&self.rom) {
            console_warn!("{}", err);
        }
        self.keypad.clear();
        self.fault = None;
        console_log!("Reset");
    }

    /// Get a pointer to the screen buffer memory, used from the JS side to render the screen.
    pub fn screen_buffer(&self) -> *const bool {
        self.cpu.read_display().pixels().as_ptr()
    }

    /// Returns whether or not the screen is dirty, and if it is, sets it to false.
    pub fn handle_screen_dirty_flag(&mut self) -> bool {
        self.cpu.take_screen_dirty()
    }

    /// Returns true if the emulator should play a tone
    pub fn should_play_tone(&self) -> bool {
        self.cpu.sound_active()
    }

    pub fn delay_timer(&self) -> u8 {
        self.cpu.read_timers().0
    }

    pub fn sound_timer(&self) -> u8 {
        self.cpu.read_timers().1
    }

    pub fn program_counter(&self) -> u16 {
        self.cpu.program_counter()
    }

    /// Returns true if a fault stopped the program.
    pub fn halted(&self) -> bool {
        self.fault.is_some()
    }

    pub fn cycles_per_frame(&self) -> u32 {
        self.cycles_per_frame
    }

    pub fn set_cycles_per_frame(&mut self, cycles: u32) {
        self.cycles_per_frame = cycles.max(1);
    }

    pub fn screen_width() -> usize {
        SCREEN_WIDTH
    }

    pub fn screen_height() -> usize {
        SCREEN_HEIGHT
    }
}
