//! The kernel's global allocator: the first-fit free-list heap behind a
//! spin mutex. Every entry runs with interrupts disabled, and interrupt
//! handlers never allocate, so the lock cannot deadlock against an IRQ.

use core::alloc::{GlobalAlloc, Layout};
use core::sync::atomic::{AtomicUsize, Ordering};

use mango_heap::Heap;
use spin::Mutex;
use terminal::log;
use x86_64::instructions::interrupts::without_interrupts;

#[global_allocator]
static ALLOCATOR: HeapAllocator = HeapAllocator::new();

static HEAP_SIZE: AtomicUsize = AtomicUsize::new(0);

pub fn init_kheap(heap_bottom: *mut u8, heap_size: usize) {
    ALLOCATOR.init(heap_bottom, heap_size);
    HEAP_SIZE.store(heap_size, Ordering::Relaxed);

    log!("Kheap initialization finished ({} KB)", heap_size >> 10);
}

/// Bytes in the heap window, as reported by `fetch`.
pub fn heap_size() -> usize {
    HEAP_SIZE.load(Ordering::Relaxed)
}

pub struct HeapAllocator {
    heap: Mutex<Heap>,
}

impl HeapAllocator {
    pub const fn new() -> Self {
        Self {
            heap: Mutex::new(Heap::empty()),
        }
    }

    pub fn init(&self, bottom: *mut u8, size: usize) {
        without_interrupts(|| unsafe {
            self.heap.lock().init(bottom, size);
        });
    }
}

unsafe impl GlobalAlloc for HeapAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        without_interrupts(|| {
            self.heap
                .lock()
                .allocate_first_fit(layout)
                .map(|ptr| ptr.as_ptr())
                .unwrap_or(core::ptr::null_mut())
        })
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        without_interrupts(|| unsafe {
            if let Some(ptr) = core::ptr::NonNull::new(ptr) {
                self.heap.lock().deallocate(ptr, layout);
            }
        })
    }
}
