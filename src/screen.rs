pub const SCREEN_WIDTH: usize = 64;
pub const SCREEN_HEIGHT: usize = 32;

/// Monochromatic 64x32 framebuffer. A pixel is `true` if it is turned on. Pixels are stored one
/// per byte, row-major, so the buffer can be handed to a renderer as is.
#[derive(Clone)]
pub struct Screen {
    pixels: [bool; SCREEN_WIDTH * SCREEN_HEIGHT],
}

impl Screen {
    pub fn new() -> Self {
        Screen {
            pixels: [false; SCREEN_WIDTH * SCREEN_HEIGHT],
        }
    }

    /// Turns every pixel off.
    pub fn clear(&mut self) {
        for pixel in self.pixels.iter_mut() {
            *pixel = false;
        }
    }

    /// Returns whether the pixel at (`x`, `y`) is on. Coordinates outside the screen read as off.
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        x < SCREEN_WIDTH && y < SCREEN_HEIGHT && self.pixels[y * SCREEN_WIDTH + x]
    }

    /// The raw row-major pixel buffer.
    pub fn pixels(&self) -> &[bool] {
        &self.pixels
    }

    /// Iterates the screen one row at a time, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        self.pixels.chunks(SCREEN_WIDTH)
    }

    /// Blits a sprite, one byte per row with the MSB as the leftmost pixel, XOR-ing it onto the
    /// screen with its top-left corner at (`x`, `y`). The origin is always wrapped onto the screen.
    /// Pixels extending past an edge are dropped when `clip` is set and wrap around otherwise.
    ///
    /// Returns true if any pixel was turned off.
    pub fn draw_sprite(&mut self, x: u8, y: u8, rows: &[u8], clip: bool) -> bool {
        let origin_x = (x as usize) % SCREEN_WIDTH;
        let origin_y = (y as usize) % SCREEN_HEIGHT;

        let mut erased = false;
        for (row_offset, sprite_row) in rows.iter().enumerate() {
            let mut pixel_y = origin_y + row_offset;
            if pixel_y >= SCREEN_HEIGHT {
                if clip {
                    break;
                }
                pixel_y %= SCREEN_HEIGHT;
            }

            for col_offset in 0..8 {
                let pixel_on = (sprite_row >> (7 - col_offset)) & 1 != 0;
                if !pixel_on {
                    continue;
                }

                let mut pixel_x = origin_x + col_offset;
                if pixel_x >= SCREEN_WIDTH {
                    if clip {
                        break;
                    }
                    pixel_x %= SCREEN_WIDTH;
                }

                let pixel = &mut self.pixels[pixel_y * SCREEN_WIDTH + pixel_x];
                erased |= *pixel;
                *pixel = !*pixel;
            }
        }

        erased
    }
}

impl Default for Screen {
    fn default() -> Self {
        Screen::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit_columns(screen: &Screen, y: usize) -> Vec<usize> {
        (0..SCREEN_WIDTH).filter(|&x| screen.pixel(x, y)).collect()
    }

    #[test]
    fn drawing_twice_erases_and_reports_collision() {
        let mut screen = Screen::new();

        assert!(!screen.draw_sprite(10, 5, &[0xFF], true));
        assert_eq!(lit_columns(&screen, 5), (10..18).collect::<Vec<_>>());

        assert!(screen.draw_sprite(10, 5, &[0xFF], true));
        assert!(screen.pixels().iter().all(|&pixel| !pixel));
    }

    #[test]
    fn partial_overlap_only_flips_set_bits() {
        let mut screen = Screen::new();
        screen.draw_sprite(0, 0, &[0b1100_0000], true);

        assert!(screen.draw_sprite(0, 0, &[0b0110_0000], true));
        assert_eq!(lit_columns(&screen, 0), vec![0, 2]);
    }

    #[test]
    fn sprites_wrap_horizontally_without_clipping() {
        let mut screen = Screen::new();
        screen.draw_sprite(60, 0, &[0xFF], false);
        assert_eq!(lit_columns(&screen, 0), vec![0, 1, 2, 3, 60, 61, 62, 63]);
    }

    #[test]
    fn sprites_are_cut_at_the_edge_with_clipping() {
        let mut screen = Screen::new();
        screen.draw_sprite(60, 0, &[0xFF], true);
        assert_eq!(lit_columns(&screen, 0), vec![60, 61, 62, 63]);
    }

    #[test]
    fn rows_wrap_or_clip_vertically() {
        let mut wrapped = Screen::new();
        wrapped.draw_sprite(0, 30, &[0x80, 0x80, 0x80, 0x80], false);
        assert!(wrapped.pixel(0, 30) && wrapped.pixel(0, 31));
        assert!(wrapped.pixel(0, 0) && wrapped.pixel(0, 1));

        let mut clipped = Screen::new();
        clipped.draw_sprite(0, 30, &[0x80, 0x80, 0x80, 0x80], true);
        assert!(clipped.pixel(0, 30) && clipped.pixel(0, 31));
        assert!(!clipped.pixel(0, 0) && !clipped.pixel(0, 1));
    }

    #[test]
    fn origin_is_always_wrapped() {
        let mut screen = Screen::new();
        screen.draw_sprite(64 + 3, 32 + 2, &[0x80], true);
        assert!(screen.pixel(3, 2));
    }

    #[test]
    fn clear_turns_everything_off() {
        let mut screen = Screen::new();
        screen.draw_sprite(0, 0, &[0xFF; 15], true);
        screen.clear();
        assert_eq!(screen.rows().count(), SCREEN_HEIGHT);
        assert!(screen.rows().all(|row| row.iter().all(|&pixel| !pixel)));
    }
}
