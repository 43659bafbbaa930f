use wasm_bindgen::prelude::*;

#[wasm_bindgen]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Options that change how some instructions operate. Used to emulate ROMs that depend on
/// interpreter quirks from different platforms. Fixed when the cpu is constructed.
pub struct Quirks {
    /// `8xy6`/`8xyE` shift Vx in place instead of shifting Vy into Vx.
    pub shift_uses_vx: bool,
    /// `Bnnn` jumps to `nnn + Vx` instead of `nnn + V0`.
    pub jump_offset_uses_vx: bool,
    /// `8xy1`/`8xy2`/`8xy3` reset VF to zero.
    pub logic_ops_clear_vf: bool,
    /// Sprite pixels falling off the screen are dropped instead of wrapping around.
    pub clip_sprites: bool,
    /// `Dxyn` waits for the next frame boundary before drawing.
    pub display_wait: bool,
    /// `Fx0A` resolves when a key is released rather than when it is pressed.
    pub key_wait_on_release: bool,
    /// `Fx55`/`Fx65` leave I pointing past the last transferred register.
    pub index_increment_on_bulk_transfer: bool,
}

#[wasm_bindgen]
impl Quirks {
    /// Behaviour of the original COSMAC VIP interpreter.
    pub fn chip8() -> Quirks {
        Quirks {
            shift_uses_vx: false,
            jump_offset_uses_vx: false,
            logic_ops_clear_vf: true,
            clip_sprites: true,
            display_wait: true,
            key_wait_on_release: true,
            index_increment_on_bulk_transfer: true,
        }
    }

    /// Behaviour of the SUPER-CHIP interpreter on the HP48 calculators.
    pub fn schip() -> Quirks {
        Quirks {
            shift_uses_vx: true,
            jump_offset_uses_vx: true,
            logic_ops_clear_vf: false,
            clip_sprites: true,
            display_wait: false,
            key_wait_on_release: false,
            index_increment_on_bulk_transfer: false,
        }
    }
}

impl Default for Quirks {
    fn default() -> Self {
        Quirks::chip8()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_original_chip8() {
        assert_eq!(Quirks::default(), Quirks::chip8());
    }

    #[test]
    fn presets_disagree_on_dialect_toggles() {
        let chip8 = Quirks::chip8();
        let schip = Quirks::schip();

        assert!(!chip8.shift_uses_vx && schip.shift_uses_vx);
        assert!(!chip8.jump_offset_uses_vx && schip.jump_offset_uses_vx);
        assert!(chip8.logic_ops_clear_vf && !schip.logic_ops_clear_vf);
        assert!(chip8.index_increment_on_bulk_transfer && !schip.index_increment_on_bulk_transfer);
    }
}
