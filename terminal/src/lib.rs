//! Serial debug output shared by every kernel crate.

#![no_std]

pub mod port_dbg;
