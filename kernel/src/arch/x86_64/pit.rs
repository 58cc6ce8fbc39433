use terminal::log;
use x86_64::instructions::port::Port;

const PIT_BASE_HZ: u32 = 1_193_182;

/// Programs channel 0 in rate-generator mode at the given frequency.
pub fn set_frequency(hz: u32) {
    let divisor = (PIT_BASE_HZ / hz) as u16;

    let mut command: Port<u8> = Port::new(0x43);
    let mut channel0: Port<u8> = Port::new(0x40);

    unsafe {
        command.write(0x36);
        channel0.write((divisor & 0xFF) as u8);
        channel0.write((divisor >> 8) as u8);
    }

    log!("PIT running at {} Hz", hz);
}
