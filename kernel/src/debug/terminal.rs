//! Framebuffer text terminal: a cell grid blitted glyph by glyph, with a
//! backing text buffer for scrolling and a timer-driven blinking cursor.

use core::fmt;

use noto_sans_mono_bitmap::{FontWeight, RasterHeight, get_raster, get_raster_width};
use spin::Mutex;

const MAX_COLS: usize = 160;
const MAX_ROWS: usize = 100;

const CHAR_HEIGHT: u64 = 16;

/// Timer ticks between cursor phase flips (PIT runs at 100 Hz).
const CURSOR_BLINK_TICKS: u8 = 50;

pub struct DebugWriter {
    frame_buffer_width: u64,
    frame_buffer_height: u64,
    frame_buffer_addr: *mut u32,
    char_width: u64,
    scale: u64,
    terminal_width: u64,
    terminal_height: u64,
    current_row: u64,
    current_col: u64,
    cur_bg_color: u32,
    cur_fg_color: u32,
    cursor_row: u64,
    cursor_col: u64,
    is_cursor_on: bool,
    cursor_blink_interval: u8,
    text_buffer: [[u8; MAX_COLS]; MAX_ROWS],
}

// The framebuffer pointer comes from the multiboot handoff and stays valid
// for the kernel's lifetime.
unsafe impl Send for DebugWriter {}

pub static WRITER: Mutex<DebugWriter> = Mutex::new(DebugWriter {
    frame_buffer_width: 0,
    frame_buffer_height: 0,
    frame_buffer_addr: core::ptr::null_mut(),
    char_width: 8,
    scale: 1,
    terminal_width: 0,
    terminal_height: 0,
    current_row: 0,
    current_col: 0,
    cur_bg_color: 0x000000,
    cur_fg_color: 0xFFFFFF,
    cursor_row: 0,
    cursor_col: 0,
    is_cursor_on: true,
    cursor_blink_interval: CURSOR_BLINK_TICKS,
    text_buffer: [[0; MAX_COLS]; MAX_ROWS],
});

impl DebugWriter {
    /// Points the writer at the framebuffer and sizes the cell grid.
    pub fn configure(&mut self, addr: *mut u32, width: u64, height: u64) {
        self.frame_buffer_addr = addr;
        self.frame_buffer_width = width;
        self.frame_buffer_height = height;
        self.char_width = get_raster_width(FontWeight::Regular, RasterHeight::Size16) as u64;
        self.recompute_grid();
        self.clear();
    }

    fn recompute_grid(&mut self) {
        let cell_w = self.char_width * self.scale;
        let cell_h = CHAR_HEIGHT * self.scale;
        self.terminal_width = (self.frame_buffer_width / cell_w).min(MAX_COLS as u64);
        self.terminal_height = (self.frame_buffer_height / cell_h).min(MAX_ROWS as u64);
    }

    pub fn terminal_size(&self) -> (u64, u64) {
        (self.terminal_width, self.terminal_height)
    }

    pub fn scale(&self) -> u64 {
        self.scale
    }

    /// Changes the glyph scale (1..=4) and starts over on a cleared grid.
    pub fn set_scale(&mut self, scale: u64) {
        self.scale = scale.clamp(1, 4);
        self.recompute_grid();
        self.clear();
    }

    pub fn clear(&mut self) {
        for row in 0..MAX_ROWS {
            self.text_buffer[row] = [0; MAX_COLS];
        }

        let pixels = self.frame_buffer_width * self.frame_buffer_height;
        for offset in 0..pixels {
            unsafe {
                *self.frame_buffer_addr.add(offset as usize) = self.cur_bg_color;
            }
        }

        self.current_row = 0;
        self.current_col = 0;
        self.cursor_row = 0;
        self.cursor_col = 0;
    }

    fn render_char(&mut self, character: u8, row: u64, col: u64) {
        let ch = match character {
            0 => ' ',
            c if c.is_ascii() => c as char,
            _ => '?',
        };
        let Some(raster) = get_raster(ch, FontWeight::Regular, RasterHeight::Size16)
            .or_else(|| get_raster('?', FontWeight::Regular, RasterHeight::Size16))
        else {
            return;
        };

        let x0 = col * self.char_width * self.scale;
        let y0 = row * CHAR_HEIGHT * self.scale;

        for (i, scanline) in raster.raster().iter().enumerate() {
            for (j, &intensity) in scanline.iter().enumerate() {
                let color = if intensity >= 0x80 {
                    self.cur_fg_color
                } else {
                    self.cur_bg_color
                };

                for sy in 0..self.scale {
                    for sx in 0..self.scale {
                        let px = x0 + j as u64 * self.scale + sx;
                        let py = y0 + i as u64 * self.scale + sy;
                        if px >= self.frame_buffer_width || py >= self.frame_buffer_height {
                            continue;
                        }
                        let offset = py * self.frame_buffer_width + px;
                        unsafe {
                            *self.frame_buffer_addr.add(offset as usize) = color;
                        }
                    }
                }
            }
        }
    }

    fn fill_cell(&mut self, row: u64, col: u64, color: u32) {
        let x0 = col * self.char_width * self.scale;
        let y0 = row * CHAR_HEIGHT * self.scale;

        for i in 0..CHAR_HEIGHT * self.scale {
            for j in 0..self.char_width * self.scale {
                let px = x0 + j;
                let py = y0 + i;
                if px >= self.frame_buffer_width || py >= self.frame_buffer_height {
                    continue;
                }
                let offset = py * self.frame_buffer_width + px;
                unsafe {
                    *self.frame_buffer_addr.add(offset as usize) = color;
                }
            }
        }
    }

    /// Timer-driven blink of the cell under the cursor.
    pub fn blink_cursor(&mut self) {
        if self.frame_buffer_addr.is_null() {
            return;
        }

        if self.cursor_blink_interval > 0 {
            self.cursor_blink_interval -= 1;
            return;
        }
        self.cursor_blink_interval = CURSOR_BLINK_TICKS;
        self.is_cursor_on = !self.is_cursor_on;

        if self.is_cursor_on {
            self.fill_cell(self.cursor_row, self.cursor_col, self.cur_fg_color);
        } else {
            self.render_char(
                self.text_buffer[self.cursor_row as usize][self.cursor_col as usize],
                self.cursor_row,
                self.cursor_col,
            );
        }
    }

    /// Reconciles the cursor cell with the write position after output.
    fn update_cursor(&mut self) {
        // repaint whatever the cursor was covering
        self.render_char(
            self.text_buffer[self.cursor_row as usize][self.cursor_col as usize],
            self.cursor_row,
            self.cursor_col,
        );

        self.cursor_row = self.current_row;
        self.cursor_col = self.current_col;
        self.is_cursor_on = false;
        self.cursor_blink_interval = 0;
    }

    /// Moves the cursor cell directly (the editor steers it by hand).
    pub fn set_cursor_cell(&mut self, row: u64, col: u64) {
        self.render_char(
            self.text_buffer[self.cursor_row as usize][self.cursor_col as usize],
            self.cursor_row,
            self.cursor_col,
        );
        self.cursor_row = row.min(self.terminal_height.saturating_sub(1));
        self.cursor_col = col.min(self.terminal_width.saturating_sub(1));
        self.is_cursor_on = false;
        self.cursor_blink_interval = 0;
    }

    fn terminal_moveup(&mut self) {
        for row in 1..self.terminal_height as usize {
            self.text_buffer[row - 1] = self.text_buffer[row];
        }
        self.text_buffer[(self.terminal_height - 1) as usize] = [0; MAX_COLS];

        for row in 0..self.terminal_height {
            for col in 0..self.terminal_width {
                self.render_char(self.text_buffer[row as usize][col as usize], row, col);
            }
        }
    }

    fn terminal_advance(&mut self) {
        self.current_col += 1;
        if self.current_col == self.terminal_width {
            self.terminal_newline();
        }
    }

    fn terminal_newline(&mut self) {
        self.current_col = 0;
        self.current_row += 1;
        if self.current_row == self.terminal_height {
            self.current_row = self.terminal_height - 1;
            self.terminal_moveup();
        }
    }

    fn terminal_putbyte(&mut self, byte: u8) {
        self.render_char(byte, self.current_row, self.current_col);
        self.text_buffer[self.current_row as usize][self.current_col as usize] = byte;
        self.terminal_advance();
    }

    /// Draws one cell for the editor, bypassing the write position.
    pub fn put_char_at(&mut self, row: u64, col: u64, byte: u8) {
        if row >= self.terminal_height || col >= self.terminal_width {
            return;
        }
        self.text_buffer[row as usize][col as usize] = byte;
        self.render_char(byte, row, col);
    }

    /// Erases the cell before the write position (line-edit backspace).
    /// Does not cross the start of the line.
    pub fn backspace_cell(&mut self) {
        if self.current_col == 0 {
            return;
        }
        self.current_col -= 1;
        self.text_buffer[self.current_row as usize][self.current_col as usize] = 0;
        self.render_char(0, self.current_row, self.current_col);
        self.update_cursor();
    }

    pub fn write_string(&mut self, text: &str) {
        if self.frame_buffer_addr.is_null() {
            return;
        }
        for byte in text.bytes() {
            match byte {
                b'\n' => self.terminal_newline(),
                b'\t' => self.terminal_putbyte(b' '),
                0x00..=0x7F => self.terminal_putbyte(byte),
                _ => self.terminal_putbyte(b'?'),
            }
        }
        self.update_cursor();
    }
}

impl fmt::Write for DebugWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write_string(s);
        Ok(())
    }
}

#[doc(hidden)]
pub fn _print(args: fmt::Arguments) {
    use core::fmt::Write;
    use x86_64::instructions::interrupts;

    interrupts::without_interrupts(|| {
        let _ = WRITER.lock().write_fmt(args);
    });
}

#[macro_export]
macro_rules! print {
    ($($arg:tt)*) => ($crate::debug::terminal::_print(format_args!($($arg)*)));
}

#[macro_export]
macro_rules! println {
    () => ($crate::print!("\n"));
    ($($arg:tt)*) => ($crate::print!("{}\n", format_args!($($arg)*)));
}
