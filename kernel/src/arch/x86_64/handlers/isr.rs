//! CPU exception handlers. Exceptions are terminal: print a diagnostic to
//! the framebuffer and serial, then halt. The faulting context is never
//! resumed.

use terminal::log;
use x86_64::structures::idt::{InterruptStackFrame, PageFaultErrorCode};

use crate::hcf;

fn exception_dump(name: &str, frame: &InterruptStackFrame, err_code: Option<u64>) -> ! {
    crate::println!("\n!!! EXCEPTION !!!");
    crate::println!("Exception: {}", name);
    if let Some(code) = err_code {
        crate::println!("Error Code: {:#x}", code);
    }
    crate::println!("{:#?}", frame);

    log!("[Exception: {}] code {:?}: {:#?}", name, err_code, frame);
    hcf();
}

macro_rules! exception {
    ($handler:ident, $name:expr) => {
        pub extern "x86-interrupt" fn $handler(frame: InterruptStackFrame) {
            exception_dump($name, &frame, None);
        }
    };
}

macro_rules! exception_errcode {
    ($handler:ident, $name:expr) => {
        pub extern "x86-interrupt" fn $handler(frame: InterruptStackFrame, err_code: u64) {
            exception_dump($name, &frame, Some(err_code));
        }
    };
}

exception!(divide_error_handler, "Divide Error");
exception!(debug_handler, "Debug");
exception!(nmi_handler, "NMI");
exception!(breakpoint_handler, "Breakpoint");
exception!(overflow_handler, "Overflow");
exception!(bound_range_handler, "BOUND Range Exceeded");
exception!(invalid_opcode_handler, "Invalid Opcode");
exception!(device_not_available_handler, "Device Not Available");
exception!(x87_fpe_handler, "x87 FPE");
exception!(simd_fpe_handler, "SIMD FPE");
exception!(virtualization_handler, "Virtualization Exception");

exception_errcode!(invalid_tss_handler, "Invalid TSS");
exception_errcode!(segment_not_present_handler, "Segment Not Present");
exception_errcode!(stack_segment_handler, "Stack-Segment Fault");
exception_errcode!(general_protection_handler, "General Protection Fault");
exception_errcode!(alignment_check_handler, "Alignment Check");

pub extern "x86-interrupt" fn pagefault_handler(
    frame: InterruptStackFrame,
    err_code: PageFaultErrorCode,
) {
    let address = x86_64::registers::control::Cr2::read_raw();
    crate::println!("\n!!! EXCEPTION !!!");
    crate::println!("Exception: Page Fault at {:#x}", address);
    crate::println!("Error Code: {:?}", err_code);
    crate::println!("{:#?}", frame);

    log!("[Exception: Page Fault] at {:#x}: {:?}", address, err_code);
    hcf();
}

pub extern "x86-interrupt" fn doublefault_handler(frame: InterruptStackFrame, err_code: u64) -> ! {
    log!("[Exception: Double Fault] code {:#x}: {:#?}", err_code, frame);
    hcf();
}
