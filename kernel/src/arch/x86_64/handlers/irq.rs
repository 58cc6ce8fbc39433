//! Hardware IRQ handlers. These run with interrupts disabled and must not
//! allocate or touch the disk: the timer bumps a counter and the cursor,
//! the keyboard pushes its scancode into a fixed-size queue drained by the
//! main loop, the RTC acks its status register.

use core::sync::atomic::{AtomicU64, Ordering};

use x86_64::instructions::port::Port;
use x86_64::structures::idt::InterruptStackFrame;

use crate::arch::x86_64::pic;
use crate::debug::terminal::WRITER;
use crate::drivers::keyboard;

#[derive(Debug, Clone, Copy)]
#[repr(u8)]
pub enum IrqIndex {
    Timer = 0,
    Keyboard = 1,
    Clock = 8,
}

/// PIT ticks since boot (100 Hz).
pub static PIT_TICKS: AtomicU64 = AtomicU64::new(0);

/// RTC periodic ticks since boot.
pub static RTC_TICKS: AtomicU64 = AtomicU64::new(0);

pub extern "x86-interrupt" fn timer_handler(_frame: InterruptStackFrame) {
    PIT_TICKS.fetch_add(1, Ordering::Relaxed);
    WRITER.lock().blink_cursor();
    pic::end_of_interrupt(IrqIndex::Timer as u8);
}

pub extern "x86-interrupt" fn keyboard_handler(_frame: InterruptStackFrame) {
    let mut port: Port<u8> = Port::new(0x60);
    let scancode = unsafe { port.read() };
    keyboard::push_scancode(scancode);

    pic::end_of_interrupt(IrqIndex::Keyboard as u8);
}

pub extern "x86-interrupt" fn rtc_handler(_frame: InterruptStackFrame) {
    // reading status register C rearms the periodic interrupt
    let mut addr: Port<u8> = Port::new(0x70);
    let mut data: Port<u8> = Port::new(0x71);
    unsafe {
        addr.write(0x0C);
        data.read();
    }

    RTC_TICKS.fetch_add(1, Ordering::Relaxed);
    pic::end_of_interrupt(IrqIndex::Clock as u8);
}

/// Lines without a registered handler only need the PIC ack.
pub extern "x86-interrupt" fn default_irq_handler(_frame: InterruptStackFrame) {
    unsafe {
        pic::get_pic().notify_end_of_interrupt(pic::SECONDARY_ISA_PIC_OFFSET);
    }
}
