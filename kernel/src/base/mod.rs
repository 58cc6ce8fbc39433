//! Cooperative foreground: keystrokes drained from the keyboard queue are
//! routed to the shell's line editor or to the file editor, depending on
//! the terminal mode.

pub mod editor;
pub mod shell;

use core::sync::atomic::{AtomicU8, Ordering};

use alloc::string::String;
use spin::Mutex;
use x86_64::instructions::interrupts::without_interrupts;

use crate::debug::terminal::WRITER;
use crate::drivers::keyboard;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermMode {
    Shell,
    Editor,
}

static MODE: AtomicU8 = AtomicU8::new(0);

pub fn term_mode() -> TermMode {
    match MODE.load(Ordering::Relaxed) {
        0 => TermMode::Shell,
        _ => TermMode::Editor,
    }
}

pub fn set_term_mode(mode: TermMode) {
    MODE.store(mode as u8, Ordering::Relaxed);
}

/// The shell input line being assembled.
static INPUT: Mutex<String> = Mutex::new(String::new());

pub fn route_scancode(scancode: u8) {
    // shift transitions and key releases carry no character
    if keyboard::update_shift(scancode) {
        return;
    }

    match term_mode() {
        TermMode::Editor => editor::handle_key(scancode),
        TermMode::Shell => handle_shell_key(scancode),
    }
}

fn handle_shell_key(scancode: u8) {
    let Some(c) = keyboard::scancode_to_char(scancode) else {
        return;
    };

    match c {
        b'\n' => {
            crate::println!();
            let line = core::mem::take(&mut *INPUT.lock());
            shell::dispatch(line.trim());
            if term_mode() == TermMode::Shell {
                shell::prompt();
            }
        }
        0x08 => {
            let removed = INPUT.lock().pop().is_some();
            if removed {
                without_interrupts(|| WRITER.lock().backspace_cell());
            }
        }
        _ => {
            INPUT.lock().push(c as char);
            crate::print!("{}", c as char);
        }
    }
}
