pub mod handlers;
pub mod idt;
pub mod pic;
pub mod pit;
