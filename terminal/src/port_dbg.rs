use core::fmt;

use spin::Mutex;
use x86_64::instructions::port::{Port, PortGeneric, PortReadOnly, ReadOnlyAccess, WriteOnlyAccess};

const COM1: u16 = 0x3F8;

/// One-time COM1 setup: 38400 baud, 8N1, FIFO on.
///
/// # Safety
/// Touches the UART I/O ports; call once during early boot.
pub unsafe fn init_serial() {
    let mut int_en: Port<u8> = Port::new(COM1 + 1);
    let mut fifo_ctrl: Port<u8> = Port::new(COM1 + 2);
    let mut line_ctrl: Port<u8> = Port::new(COM1 + 3);
    let mut modem_ctrl: Port<u8> = Port::new(COM1 + 4);
    let mut data: Port<u8> = Port::new(COM1);

    unsafe {
        int_en.write(0x00); // disable interrupts
        line_ctrl.write(0x80); // enable DLAB (set baud rate divisor)
        data.write(0x03); // divisor low byte: 38400 baud
        int_en.write(0x00); // divisor high byte
        line_ctrl.write(0x03); // 8 bits, no parity, one stop bit
        fifo_ctrl.write(0xC7); // enable FIFO, clear, 14-byte threshold
        modem_ctrl.write(0x0B); // IRQs enabled, RTS/DSR set
    }
}

pub struct SerialWriter {
    data: PortGeneric<u8, WriteOnlyAccess>,
    line_status: PortGeneric<u8, ReadOnlyAccess>,
}

impl SerialWriter {
    const fn new() -> Self {
        SerialWriter {
            data: PortGeneric::new(COM1),
            line_status: PortReadOnly::new(COM1 + 5),
        }
    }

    fn is_transmit_empty(&mut self) -> bool {
        unsafe { self.line_status.read() & 0x20 != 0 }
    }
}

impl fmt::Write for SerialWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for &byte in s.as_bytes() {
            while !self.is_transmit_empty() {
                core::hint::spin_loop();
            }
            unsafe {
                self.data.write(byte);
            }
        }
        Ok(())
    }
}

pub static SERIAL_WRITER: Mutex<SerialWriter> = Mutex::new(SerialWriter::new());

#[doc(hidden)]
pub fn _serial_print(args: fmt::Arguments) {
    use core::fmt::Write;
    use x86_64::instructions::interrupts;

    interrupts::without_interrupts(|| {
        let _ = SERIAL_WRITER.lock().write_fmt(args);
    });
}

#[macro_export]
macro_rules! serial_print {
    ($($arg:tt)*) => ($crate::port_dbg::_serial_print(format_args!($($arg)*)));
}

#[macro_export]
macro_rules! log {
    ($($arg:tt)*) => ($crate::serial_print!("{} - line {}, {}\n", file!(), line!(), format_args!($($arg)*)));
}
