//! PS/2 keyboard state: the scancode queue bridging interrupt context to
//! the main loop, shift tracking, and the US-QWERTY translation tables.

use core::sync::atomic::{AtomicBool, Ordering};

use heapless::Deque;
use spin::Mutex;
use x86_64::instructions::interrupts::without_interrupts;

pub const KEY_ESC: u8 = 0x01;
pub const KEY_LSHIFT: u8 = 0x2A;
pub const KEY_RSHIFT: u8 = 0x36;
pub const KEY_ARROW_UP: u8 = 0x48;
pub const KEY_ARROW_LEFT: u8 = 0x4B;
pub const KEY_ARROW_RIGHT: u8 = 0x4D;
pub const KEY_ARROW_DOWN: u8 = 0x50;
pub const KEY_RELEASE: u8 = 0x80;

static ASCII: [u8; 58] = [
    0, 0, b'1', b'2', b'3', b'4', b'5', b'6', //
    b'7', b'8', b'9', b'0', b'-', b'=', 0x08, b'\t', //
    b'q', b'w', b'e', b'r', b't', b'y', b'u', b'i', //
    b'o', b'p', b'[', b']', b'\n', 0, b'a', b's', //
    b'd', b'f', b'g', b'h', b'j', b'k', b'l', b';', //
    b'\'', b'`', 0, b'\\', b'z', b'x', b'c', b'v', //
    b'b', b'n', b'm', b',', b'.', b'/', 0, b'*', //
    0, b' ',
];

static ASCII_SHIFT: [u8; 58] = [
    0, 0, b'!', b'@', b'#', b'$', b'%', b'^', //
    b'&', b'*', b'(', b')', b'_', b'+', 0x08, b'\t', //
    b'Q', b'W', b'E', b'R', b'T', b'Y', b'U', b'I', //
    b'O', b'P', b'{', b'}', b'\n', 0, b'A', b'S', //
    b'D', b'F', b'G', b'H', b'J', b'K', b'L', b':', //
    b'"', b'~', 0, b'|', b'Z', b'X', b'C', b'V', //
    b'B', b'N', b'M', b'<', b'>', b'?', 0, b'*', //
    0, b' ',
];

static SHIFT: AtomicBool = AtomicBool::new(false);

/// Scancodes queued by the keyboard IRQ, drained by the main loop. Fixed
/// capacity: interrupt context never allocates.
static SCANCODES: Mutex<Deque<u8, 32>> = Mutex::new(Deque::new());

/// Called from the keyboard IRQ handler (interrupts already disabled).
/// A full queue drops the key.
pub fn push_scancode(scancode: u8) {
    let _ = SCANCODES.lock().push_back(scancode);
}

pub fn pop_scancode() -> Option<u8> {
    without_interrupts(|| SCANCODES.lock().pop_front())
}

/// Tracks shift press/release. Returns true when the scancode was a shift
/// transition (or any release) and carries no character.
pub fn update_shift(scancode: u8) -> bool {
    if scancode & KEY_RELEASE != 0 {
        let key = scancode & 0x7F;
        if key == KEY_LSHIFT || key == KEY_RSHIFT {
            SHIFT.store(false, Ordering::Relaxed);
        }
        return true;
    }

    if scancode == KEY_LSHIFT || scancode == KEY_RSHIFT {
        SHIFT.store(true, Ordering::Relaxed);
        return true;
    }

    false
}

/// Translates a make code through the layout tables.
pub fn scancode_to_char(scancode: u8) -> Option<u8> {
    let table = if SHIFT.load(Ordering::Relaxed) {
        &ASCII_SHIFT
    } else {
        &ASCII
    };

    match table.get(scancode as usize) {
        Some(&c) if c != 0 => Some(c),
        _ => None,
    }
}
