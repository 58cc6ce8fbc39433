//! Full-screen file editor. One file at a time: Escape saves the buffer
//! back to disk and returns to the shell.

pub mod buffer;

use alloc::string::String;
use spin::Mutex;
use x86_64::instructions::interrupts::without_interrupts;

use crate::base::{TermMode, set_term_mode, shell};
use crate::debug::terminal::WRITER;
use crate::drivers::ata::FILE_SYSTEM;
use crate::drivers::keyboard::{
    self, KEY_ARROW_DOWN, KEY_ARROW_LEFT, KEY_ARROW_RIGHT, KEY_ARROW_UP, KEY_ESC,
};
use crate::time;

use buffer::EditBuffer;

struct Editor {
    node: u32,
    buffer: EditBuffer,
    /// First document line shown on screen.
    top_line: usize,
}

static EDITOR: Mutex<Option<Editor>> = Mutex::new(None);

/// Enters the editor on a file node whose content is already loaded.
pub fn open(node: u32, content: String) {
    *EDITOR.lock() = Some(Editor {
        node,
        buffer: EditBuffer::from_content(&content),
        top_line: 0,
    });

    set_term_mode(TermMode::Editor);
    without_interrupts(|| WRITER.lock().clear());
    redraw();
}

pub fn handle_key(scancode: u8) {
    if scancode == KEY_ESC {
        save_and_exit();
        return;
    }

    let mut editor = EDITOR.lock();
    let Some(editor) = editor.as_mut() else {
        return;
    };

    match scancode {
        KEY_ARROW_LEFT => {
            editor.buffer.move_left();
        }
        KEY_ARROW_RIGHT => {
            editor.buffer.move_right();
        }
        KEY_ARROW_UP => {
            editor.buffer.move_up();
        }
        KEY_ARROW_DOWN => {
            editor.buffer.move_down();
        }
        _ => {
            let Some(c) = keyboard::scancode_to_char(scancode) else {
                return;
            };
            if c == 0x08 {
                editor.buffer.backspace();
            } else {
                editor.buffer.insert(c);
            }
        }
    }

    drop(editor);
    redraw();
}

/// Repaints the visible window and parks the cell cursor on the caret.
fn redraw() {
    without_interrupts(|| {
        let mut editor_guard = EDITOR.lock();
        let Some(editor) = editor_guard.as_mut() else {
            return;
        };
        let mut writer = WRITER.lock();
        let (term_width, term_height) = writer.terminal_size();
        let rows = term_height as usize;

        // keep the caret inside the window
        let line = editor.buffer.cursor_line();
        if line < editor.top_line {
            editor.top_line = line;
        } else if line >= editor.top_line + rows {
            editor.top_line = line + 1 - rows;
        }

        let line_count = editor.buffer.line_count();
        for row in 0..rows {
            let doc_line = editor.top_line + row;
            let text: &[u8] = if doc_line < line_count {
                editor.buffer.line_at(doc_line)
            } else {
                &[]
            };

            for col in 0..term_width as usize {
                let byte = text.get(col).copied().unwrap_or(0);
                writer.put_char_at(row as u64, col as u64, byte);
            }
        }

        let caret_row = (line - editor.top_line) as u64;
        let caret_col = (editor.buffer.cursor_col() as u64).min(term_width.saturating_sub(1));
        writer.set_cursor_cell(caret_row, caret_col);
    });
}

/// Escape: write the whole buffer through the file system, drop the
/// session, and hand the screen back to the shell.
fn save_and_exit() {
    let session = EDITOR.lock().take();
    let Some(editor) = session else {
        return;
    };

    let result = {
        let mut fs = FILE_SYSTEM.lock();
        fs.file_write(editor.node, editor.buffer.as_bytes(), time::now_packed())
    };

    set_term_mode(TermMode::Shell);
    without_interrupts(|| WRITER.lock().clear());

    if let Err(err) = result {
        crate::println!("{}", err);
    }
    shell::prompt();
}
