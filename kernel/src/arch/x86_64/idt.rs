use once_cell_no_std::OnceCell;
use terminal::log;
use x86_64::structures::idt::InterruptDescriptorTable;

use crate::arch::x86_64::handlers::irq::{self, IrqIndex};
use crate::arch::x86_64::handlers::isr;
use crate::arch::x86_64::pic::PRIMARY_ISA_PIC_OFFSET;

static IDT: OnceCell<InterruptDescriptorTable> = OnceCell::new();

/// Binds vectors 0-31 to the terminal exception handlers and 32-47 to the
/// IRQ handlers, then loads the table and enables interrupts.
pub fn init_idt() {
    let mut idt = InterruptDescriptorTable::new();

    idt.divide_error.set_handler_fn(isr::divide_error_handler);
    idt.debug.set_handler_fn(isr::debug_handler);
    idt.non_maskable_interrupt.set_handler_fn(isr::nmi_handler);
    idt.breakpoint.set_handler_fn(isr::breakpoint_handler);
    idt.overflow.set_handler_fn(isr::overflow_handler);
    idt.bound_range_exceeded
        .set_handler_fn(isr::bound_range_handler);
    idt.invalid_opcode.set_handler_fn(isr::invalid_opcode_handler);
    idt.device_not_available
        .set_handler_fn(isr::device_not_available_handler);
    idt.double_fault.set_handler_fn(isr::doublefault_handler);
    idt.invalid_tss.set_handler_fn(isr::invalid_tss_handler);
    idt.segment_not_present
        .set_handler_fn(isr::segment_not_present_handler);
    idt.stack_segment_fault
        .set_handler_fn(isr::stack_segment_handler);
    idt.general_protection_fault
        .set_handler_fn(isr::general_protection_handler);
    idt.page_fault.set_handler_fn(isr::pagefault_handler);
    idt.x87_floating_point.set_handler_fn(isr::x87_fpe_handler);
    idt.alignment_check
        .set_handler_fn(isr::alignment_check_handler);
    idt.simd_floating_point.set_handler_fn(isr::simd_fpe_handler);
    idt.virtualization.set_handler_fn(isr::virtualization_handler);

    for line in 0..16u8 {
        idt[PRIMARY_ISA_PIC_OFFSET + line].set_handler_fn(irq::default_irq_handler);
    }
    idt[PRIMARY_ISA_PIC_OFFSET + IrqIndex::Timer as u8].set_handler_fn(irq::timer_handler);
    idt[PRIMARY_ISA_PIC_OFFSET + IrqIndex::Keyboard as u8].set_handler_fn(irq::keyboard_handler);
    idt[PRIMARY_ISA_PIC_OFFSET + IrqIndex::Clock as u8].set_handler_fn(irq::rtc_handler);

    let _ = IDT.set(idt);
    IDT.get().expect("IDT was just set").load();

    x86_64::instructions::interrupts::enable();
    log!("IDT initialization finished");
}
