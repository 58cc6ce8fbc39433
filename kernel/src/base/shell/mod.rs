//! The shell: line dispatch and the command surface.

pub mod commands;

use core::sync::atomic::{AtomicBool, Ordering};

use terminal::log;

use crate::drivers::ata::FILE_SYSTEM;

/// Set while `formatdisk` waits for its confirmation line.
static PENDING_FORMAT: AtomicBool = AtomicBool::new(false);

pub fn init() {
    match FILE_SYSTEM.lock().is_formatted() {
        Ok(true) => log!("disk is formatted, file system ready"),
        Ok(false) => log!("disk is not formatted"),
        Err(err) => log!("superblock read failed: {}", err),
    }
}

pub fn prompt() {
    crate::print!("\n> ");
}

pub fn request_format_confirmation() {
    PENDING_FORMAT.store(true, Ordering::Relaxed);
}

/// Handles one input line: either the pending `formatdisk` confirmation or
/// a command with whitespace-separated arguments (no quoting).
pub fn dispatch(line: &str) {
    if PENDING_FORMAT.swap(false, Ordering::Relaxed) {
        if line == "y" {
            commands::format_confirmed();
        } else {
            crate::println!("Aborted.");
        }
        return;
    }

    let mut parts = line.split_whitespace();
    let Some(cmd) = parts.next() else {
        return;
    };
    let args: alloc::vec::Vec<&str> = parts.collect();

    match cmd {
        "help" => commands::help(),
        "clear" => commands::clear(),
        "shutdown" => commands::shutdown(),
        "fetch" => commands::fetch(),
        "echo" => commands::echo(&args),
        "scaleup" => commands::scaleup(),
        "scaledown" => commands::scaledown(),
        "list" => commands::list(&args),
        "newfile" => commands::newfile(&args),
        "delfile" => commands::delfile(&args),
        "edit" => commands::edit(&args),
        "printfile" => commands::printfile(&args),
        "copyfile" => commands::copyfile(&args),
        "movefile" => commands::movefile(&args),
        "newfolder" => commands::newfolder(&args),
        "delfolder" => commands::delfolder(&args),
        "copyfolder" => commands::copyfolder(&args),
        "movefolder" => commands::movefolder(&args),
        "goto" => commands::goto(&args),
        "goup" => commands::goup(),
        "whereami" => commands::whereami(),
        "formatdisk" => commands::formatdisk(),
        "nodeinfo" => commands::nodeinfo(&args),
        "runscript" => commands::runscript(&args),
        "time" => commands::time(&args),
        "date" => commands::date(&args),
        _ => crate::println!("Unknown command"),
    }
}
