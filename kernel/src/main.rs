//! Mango: a single-tasking kernel with a shell, an on-disk file system, a
//! screen editor, and an embedded scripting language.

#![no_std]
#![no_main]
#![feature(abi_x86_interrupt)]

extern crate alloc;

use core::arch::asm;

use multiboot2::{BootInformation, BootInformationHeader};
use terminal::log;

pub mod arch;
pub mod base;
pub mod debug;
pub mod drivers;
pub mod dyn_mem;
pub mod time;

unsafe extern "C" {
    /// End of the kernel image; the heap window starts here.
    static mut _kernel_end: u8;
}

#[unsafe(no_mangle)]
unsafe extern "C" fn _start(magic: u32, mbi_addr: usize) -> ! {
    unsafe { terminal::port_dbg::init_serial() };

    if magic != multiboot2::MAGIC {
        panic!("invalid boot magic {magic:#x}");
    }

    let boot_info = unsafe { BootInformation::load(mbi_addr as *const BootInformationHeader) }
        .expect("malformed multiboot information");

    kernel_main(&boot_info)
}

fn kernel_main(boot_info: &BootInformation) -> ! {
    let mem_upper_kb = boot_info
        .basic_memory_info_tag()
        .map(|tag| tag.memory_upper())
        .expect("bootloader reported no memory map");

    // the window between the kernel image and the top of upper memory,
    // minus a safety megabyte, becomes the heap
    let heap_bottom = unsafe { &raw mut _kernel_end };
    let memory_top = ((mem_upper_kb as usize) << 10) + (1 << 20);
    let heap_size = memory_top
        .saturating_sub(1 << 20)
        .saturating_sub(heap_bottom.addr());
    dyn_mem::allocator::init_kheap(heap_bottom, heap_size);

    let framebuffer = boot_info
        .framebuffer_tag()
        .and_then(|tag| tag.ok())
        .expect("no framebuffer");
    debug::terminal::WRITER.lock().configure(
        framebuffer.address() as *mut u32,
        framebuffer.width() as u64,
        framebuffer.height() as u64,
    );

    arch::x86_64::idt::init_idt();
    arch::x86_64::pic::init_pic();
    arch::x86_64::pit::set_frequency(100);
    time::init_rtc();

    drivers::ata::init_primary();
    base::shell::init();

    log!("boot complete, entering the input loop");
    crate::println!("Welcome to Mango!");
    base::shell::prompt();

    loop {
        while let Some(scancode) = drivers::keyboard::pop_scancode() {
            base::route_scancode(scancode);
        }
        x86_64::instructions::hlt();
    }
}

#[panic_handler]
fn rust_panic(info: &core::panic::PanicInfo) -> ! {
    terminal::serial_print!("KERNEL PANIC: {}\n", info);
    hcf();
}

fn hcf() -> ! {
    unsafe {
        asm!("cli");
        loop {
            asm!("hlt");
        }
    }
}
