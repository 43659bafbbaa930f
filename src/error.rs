use thiserror::Error;

/// Errors raised by the host-facing operations of the emulator. Instruction-level problems are
/// never reported through this type, see [`crate::Outcome`] instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Chip8Error {
    #[error("ROM is too large ({size} bytes), max size is {max_size} bytes")]
    RomTooLarge { size: usize, max_size: usize },

    #[error("Key index {key:#X} is out of range, keys are 0x0 through 0xF")]
    InvalidKey { key: u8 },

    #[error("Key snapshot has {len} entries, expected 16")]
    InvalidKeyState { len: usize },
}
