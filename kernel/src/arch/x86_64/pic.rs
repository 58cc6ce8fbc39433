use pic8259::ChainedPics;
use terminal::log;

pub const PRIMARY_ISA_PIC_OFFSET: u8 = 32;
pub const SECONDARY_ISA_PIC_OFFSET: u8 = PRIMARY_ISA_PIC_OFFSET + 8;

pub fn get_pic() -> ChainedPics {
    unsafe { ChainedPics::new(PRIMARY_ISA_PIC_OFFSET, SECONDARY_ISA_PIC_OFFSET) }
}

/// Remaps the chained PICs to vectors 32..48 and unmasks the timer,
/// keyboard, cascade, and RTC lines.
pub fn init_pic() {
    let mut pics = get_pic();

    unsafe {
        pics.initialize();
        // set bits stay masked: leave IRQ 0, 1, 2 and IRQ 8 enabled
        pics.write_masks(!0b0000_0111, !0b0000_0001);
    }

    log!("PIC initialization finished");
}

/// Signals end-of-interrupt for an ISA IRQ line.
pub fn end_of_interrupt(irq: u8) {
    unsafe {
        get_pic().notify_end_of_interrupt(PRIMARY_ISA_PIC_OFFSET + irq);
    }
}
