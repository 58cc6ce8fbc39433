//! Command implementations behind the shell dispatch table.

use alloc::string::String;
use alloc::vec::Vec;

use mango_fs::path::split_path;
use mango_fs::structs::SECTOR_ROOT;
use mango_fs::{FsError, MangoFs, StreamMode};
use mango_script::ScriptHost;
use x86_64::instructions::interrupts::without_interrupts;

use crate::arch::x86_64::handlers::irq::PIT_TICKS;
use crate::base::editor;
use crate::debug::terminal::WRITER;
use crate::drivers::ata::{FILE_SYSTEM, PataDevice};
use crate::time::{self, formats};

type Fs = MangoFs<PataDevice>;

/// Disk-dependent commands check the format marker up front.
fn disk_ready() -> bool {
    match FILE_SYSTEM.lock().is_formatted() {
        Ok(true) => true,
        Ok(false) => {
            crate::println!("Disk is not formatted. Run formatdisk first.");
            false
        }
        Err(err) => {
            crate::println!("{}", err);
            false
        }
    }
}

/// Resolves the parent half of a split path; `""` means the current
/// directory.
fn resolve_parent(fs: &mut Fs, parent: &str) -> Result<u32, FsError> {
    if parent.is_empty() {
        Ok(fs.current_dir())
    } else {
        fs.resolve_path(parent)
    }
}

pub fn help() {
    crate::println!("Commands:");
    crate::println!("  help clear shutdown fetch echo scaleup scaledown");
    crate::println!("  list [path]          newfile <path>    delfile <path>");
    crate::println!("  edit <path>          printfile <path>");
    crate::println!("  copyfile <s> <d>     movefile <s> <d>");
    crate::println!("  newfolder <path>     delfolder <path>");
    crate::println!("  copyfolder <s> <d>   movefolder <s> <d>");
    crate::println!("  goto <path>  goup  whereami  formatdisk  nodeinfo <path>");
    crate::println!("  runscript <path>     time [tz]  date [tz]");
}

pub fn clear() {
    without_interrupts(|| WRITER.lock().clear());
}

pub fn shutdown() {
    crate::println!("Halting...");
    crate::hcf();
}

fn cpu_brand() -> String {
    use core::arch::x86_64::{__cpuid, __get_cpuid_max};

    let (max_extended, _) = __get_cpuid_max(0x8000_0000);
    if max_extended < 0x8000_0004 {
        return String::from("unknown");
    }

    let mut bytes = Vec::with_capacity(48);
    for leaf in 0x8000_0002u32..=0x8000_0004 {
        let regs = __cpuid(leaf);
        for value in [regs.eax, regs.ebx, regs.ecx, regs.edx] {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
    }

    let len = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..len]).trim().into()
}

pub fn fetch() {
    crate::println!("==================");
    crate::println!("Kernel: Mango");
    crate::println!("CPU: {}", cpu_brand());
    crate::println!(
        "Memory: {} MB",
        (crate::dyn_mem::allocator::heap_size() >> 20) + 2
    );

    let seconds = PIT_TICKS.load(core::sync::atomic::Ordering::Relaxed) / 100;
    crate::println!(
        "Uptime: {} hours {} minutes {} seconds",
        seconds / 3600,
        (seconds / 60) % 60,
        seconds % 60
    );
    crate::println!("==================");
}

pub fn echo(args: &[&str]) {
    crate::println!("{}", args.join(" "));
}

pub fn scaleup() {
    without_interrupts(|| {
        let mut writer = WRITER.lock();
        let scale = writer.scale();
        writer.set_scale(scale + 1);
    });
}

pub fn scaledown() {
    without_interrupts(|| {
        let mut writer = WRITER.lock();
        let scale = writer.scale();
        writer.set_scale(scale.saturating_sub(1).max(1));
    });
}

pub fn list(args: &[&str]) {
    if !disk_ready() {
        return;
    }

    let mut fs = FILE_SYSTEM.lock();
    let parent = if let Some(path) = args.first() {
        match fs.resolve_path(path) {
            Ok(sector) => sector,
            Err(err) => {
                drop(fs);
                crate::println!("{}", err);
                return;
            }
        }
    } else {
        fs.current_dir()
    };

    let listing = (|| -> Result<Vec<(String, bool)>, FsError> {
        let node = fs.read_node(parent)?;
        if !node.is_folder() {
            return Err(FsError::NotAFolder);
        }

        let mut entries = Vec::new();
        let mut current = node.child_head;
        while current != 0 {
            let child = fs.read_node(current)?;
            entries.push((String::from(child.name()), child.is_folder()));
            current = child.child_next;
        }
        Ok(entries)
    })();
    drop(fs);

    match listing {
        Err(err) => crate::println!("{}", err),
        Ok(entries) if entries.is_empty() => crate::println!("Empty folder."),
        Ok(entries) => {
            crate::println!("List of files:");
            for (name, is_folder) in entries {
                if is_folder {
                    crate::println!("-> {}", name);
                } else {
                    crate::println!("- {}", name);
                }
            }
        }
    }
}

pub fn newfile(args: &[&str]) {
    let Some(path) = args.first() else {
        crate::println!("Usage: newfile <path>");
        return;
    };
    if !disk_ready() {
        return;
    }

    let result = (|| {
        let (parent, name) = split_path(path)?;
        let mut fs = FILE_SYSTEM.lock();
        let parent = resolve_parent(&mut fs, parent)?;
        fs.file_create(parent, name, time::now_packed())?;
        Ok::<_, FsError>(())
    })();

    if let Err(err) = result {
        crate::println!("{}", err);
    }
}

pub fn newfolder(args: &[&str]) {
    let Some(path) = args.first() else {
        crate::println!("Usage: newfolder <path>");
        return;
    };
    if !disk_ready() {
        return;
    }

    let result = (|| {
        let (parent, name) = split_path(path)?;
        let mut fs = FILE_SYSTEM.lock();
        let parent = resolve_parent(&mut fs, parent)?;
        fs.folder_create(parent, name, time::now_packed())?;
        Ok::<_, FsError>(())
    })();

    if let Err(err) = result {
        crate::println!("{}", err);
    }
}

pub fn delfile(args: &[&str]) {
    let Some(path) = args.first() else {
        crate::println!("Usage: delfile <path>");
        return;
    };
    if !disk_ready() {
        return;
    }

    let result = (|| {
        let mut fs = FILE_SYSTEM.lock();
        let sector = fs.resolve_path(path)?;
        let node = fs.read_node(sector)?;
        fs.file_delete(node.parent, node.name())
    })();

    if let Err(err) = result {
        crate::println!("{}", err);
    }
}

pub fn delfolder(args: &[&str]) {
    let Some(path) = args.first() else {
        crate::println!("Usage: delfolder <path>");
        return;
    };
    if !disk_ready() {
        return;
    }

    let result = (|| {
        let mut fs = FILE_SYSTEM.lock();
        let sector = fs.resolve_path(path)?;
        if sector == SECTOR_ROOT {
            return Err(FsError::RootProtected);
        }
        let node = fs.read_node(sector)?;

        // never leave the current directory dangling inside the subtree
        if fs.current_dir() == sector {
            fs.set_current_dir(node.parent)?;
        }
        fs.folder_delete(node.parent, node.name())
    })();

    if let Err(err) = result {
        crate::println!("{}", err);
    }
}

pub fn printfile(args: &[&str]) {
    let Some(path) = args.first() else {
        crate::println!("Usage: printfile <path>");
        return;
    };
    if !disk_ready() {
        return;
    }

    let result = (|| {
        let mut fs = FILE_SYSTEM.lock();
        let sector = fs.resolve_path(path)?;
        fs.file_read(sector)
    })();

    match result {
        Ok(content) => crate::println!("{}", content),
        Err(err) => crate::println!("{}", err),
    }
}

pub fn edit(args: &[&str]) {
    let Some(path) = args.first() else {
        crate::println!("Usage: edit <path>");
        return;
    };
    if !disk_ready() {
        return;
    }

    let loaded = (|| {
        let mut fs = FILE_SYSTEM.lock();
        let sector = fs.resolve_path(path)?;
        let content = fs.file_read(sector)?;
        Ok::<_, FsError>((sector, content))
    })();

    match loaded {
        Ok((sector, content)) => editor::open(sector, content),
        Err(err) => crate::println!("{}", err),
    }
}

/// Copies logical content into a fresh file. When `dst` names an existing
/// folder the file keeps its basename and lands inside it.
fn copy_file_inner(fs: &mut Fs, src: &str, dst: &str) -> Result<(), FsError> {
    let src_sector = fs.resolve_path(src)?;
    let content = fs.file_read(src_sector)?;

    let (dst_parent, dst_name) = match fs.resolve_path(dst) {
        Ok(sector) if fs.read_node(sector)?.is_folder() => {
            let src_node = fs.read_node(src_sector)?;
            (sector, String::from(src_node.name()))
        }
        _ => {
            let (parent, name) = split_path(dst)?;
            (resolve_parent(fs, parent)?, String::from(name))
        }
    };

    let now = time::now_packed();
    let new_file = fs.file_create(dst_parent, &dst_name, now)?;
    fs.file_write(new_file, content.as_bytes(), now)
}

pub fn copyfile(args: &[&str]) {
    let (Some(src), Some(dst)) = (args.first(), args.get(1)) else {
        crate::println!("Usage: copyfile <src> <dst>");
        return;
    };
    if !disk_ready() {
        return;
    }

    let result = copy_file_inner(&mut FILE_SYSTEM.lock(), src, dst);
    if let Err(err) = result {
        crate::println!("{}", err);
    }
}

pub fn movefile(args: &[&str]) {
    let (Some(src), Some(dst)) = (args.first(), args.get(1)) else {
        crate::println!("Usage: movefile <src> <dst>");
        return;
    };
    if !disk_ready() {
        return;
    }

    let result = (|| {
        let mut fs = FILE_SYSTEM.lock();
        copy_file_inner(&mut fs, src, dst)?;
        let sector = fs.resolve_path(src)?;
        let node = fs.read_node(sector)?;
        fs.file_delete(node.parent, node.name())
    })();

    if let Err(err) = result {
        crate::println!("{}", err);
    }
}

fn copy_folder_inner(
    fs: &mut Fs,
    src_sector: u32,
    dst_parent: u32,
    dst_name: &str,
) -> Result<(), FsError> {
    let now = time::now_packed();
    let new_folder = fs.folder_create(dst_parent, dst_name, now)?;

    let mut current = fs.read_node(src_sector)?.child_head;
    while current != 0 {
        let child = fs.read_node(current)?;
        let name = String::from(child.name());

        if child.is_folder() {
            copy_folder_inner(fs, current, new_folder, &name)?;
        } else {
            let content = fs.file_read(current)?;
            let new_file = fs.file_create(new_folder, &name, now)?;
            fs.file_write(new_file, content.as_bytes(), now)?;
        }

        current = child.child_next;
    }

    Ok(())
}

fn copy_folder(fs: &mut Fs, src: &str, dst: &str) -> Result<(), FsError> {
    let src_sector = fs.resolve_path(src)?;
    if !fs.read_node(src_sector)?.is_folder() {
        return Err(FsError::NotAFolder);
    }

    let (dst_parent, dst_name) = match fs.resolve_path(dst) {
        Ok(sector) if fs.read_node(sector)?.is_folder() => {
            let src_node = fs.read_node(src_sector)?;
            (sector, String::from(src_node.name()))
        }
        _ => {
            let (parent, name) = split_path(dst)?;
            (resolve_parent(fs, parent)?, String::from(name))
        }
    };

    // refuse to copy a folder into its own subtree
    let src_path = {
        let mut p = fs.abspath(src_sector)?;
        p.push('/');
        p
    };
    let mut dst_path = fs.abspath(dst_parent)?;
    dst_path.push('/');
    if dst_path.starts_with(&src_path) {
        return Err(FsError::BadPath);
    }

    copy_folder_inner(fs, src_sector, dst_parent, &dst_name)
}

pub fn copyfolder(args: &[&str]) {
    let (Some(src), Some(dst)) = (args.first(), args.get(1)) else {
        crate::println!("Usage: copyfolder <src> <dst>");
        return;
    };
    if !disk_ready() {
        return;
    }

    if let Err(err) = copy_folder(&mut FILE_SYSTEM.lock(), src, dst) {
        crate::println!("{}", err);
    }
}

pub fn movefolder(args: &[&str]) {
    let (Some(src), Some(dst)) = (args.first(), args.get(1)) else {
        crate::println!("Usage: movefolder <src> <dst>");
        return;
    };
    if !disk_ready() {
        return;
    }

    let result = (|| {
        let mut fs = FILE_SYSTEM.lock();
        copy_folder(&mut fs, src, dst)?;
        let sector = fs.resolve_path(src)?;
        let node = fs.read_node(sector)?;
        fs.folder_delete(node.parent, node.name())
    })();

    if let Err(err) = result {
        crate::println!("{}", err);
    }
}

pub fn goto(args: &[&str]) {
    let Some(path) = args.first() else {
        crate::println!("Usage: goto <path>");
        return;
    };
    if !disk_ready() {
        return;
    }

    let result = (|| {
        let mut fs = FILE_SYSTEM.lock();
        let sector = fs.resolve_path(path)?;
        fs.set_current_dir(sector)
    })();

    if let Err(err) = result {
        crate::println!("{}", err);
    }
}

pub fn goup() {
    if !disk_ready() {
        return;
    }

    match FILE_SYSTEM.lock().go_up() {
        Ok(true) => {}
        Ok(false) => crate::println!("Already at topmost folder!"),
        Err(err) => crate::println!("{}", err),
    }
}

pub fn whereami() {
    if !disk_ready() {
        return;
    }

    let result = {
        let mut fs = FILE_SYSTEM.lock();
        let current = fs.current_dir();
        fs.abspath(current)
    };

    match result {
        Ok(path) => crate::println!("{}", path),
        Err(err) => crate::println!("{}", err),
    }
}

pub fn formatdisk() {
    crate::println!("This will erase the entire disk. Type 'y' to continue.");
    super::request_format_confirmation();
}

pub fn format_confirmed() {
    let result = FILE_SYSTEM.lock().format(time::now_packed());
    match result {
        Ok(()) => crate::println!("Disk formatted."),
        Err(err) => crate::println!("{}", err),
    }
}

pub fn nodeinfo(args: &[&str]) {
    let Some(path) = args.first() else {
        crate::println!("Usage: nodeinfo <path>");
        return;
    };
    if !disk_ready() {
        return;
    }

    let info = (|| {
        let mut fs = FILE_SYSTEM.lock();
        let sector = fs.resolve_path(path)?;
        let node = fs.read_node(sector)?;
        Ok::<_, FsError>((sector, node))
    })();

    match info {
        Err(err) => crate::println!("{}", err),
        Ok((sector, node)) => {
            crate::println!("Name:    {}", node.name());
            crate::println!(
                "Kind:    {}",
                if node.is_folder() { "folder" } else { "file" }
            );
            crate::println!("Sector:  {}", sector);
            crate::println!("Parent:  {}", { node.parent });
            crate::println!("Blocks:  {}", { node.size });
            crate::println!("Created: {}", formats::format_datetime(node.time_created));
            crate::println!("Changed: {}", formats::format_datetime(node.time_changed));
        }
    }
}

struct KernelHost;

impl ScriptHost for KernelHost {
    fn print(&mut self, text: &str) {
        crate::print!("{}", text);
    }

    fn exec(&mut self, command: &str) {
        super::dispatch(command);
    }
}

pub fn runscript(args: &[&str]) {
    let Some(path) = args.first() else {
        crate::println!("Usage: runscript <path>");
        return;
    };
    if !disk_ready() {
        return;
    }

    let source = {
        let mut fs = FILE_SYSTEM.lock();
        fs.open(path, StreamMode::Read)
            .and_then(|mut stream| stream.read_to_string(&mut fs))
    };

    // the lock is released: scripts re-enter the shell through exec()
    match source {
        Err(err) => crate::println!("{}", err),
        Ok(source) => {
            let mut host = KernelHost;
            if let Err(err) = mango_script::run_source(&source, &mut host) {
                crate::println!("{}", err);
            }
        }
    }
}

fn tz_offset(args: &[&str]) -> i32 {
    args.first().and_then(|s| s.parse().ok()).unwrap_or(0)
}

pub fn time(args: &[&str]) {
    let dt = formats::apply_tz(&time::now(), tz_offset(args));
    crate::println!("{}", formats::format_time(&dt));
}

pub fn date(args: &[&str]) {
    let dt = formats::apply_tz(&time::now(), tz_offset(args));
    crate::println!("{}", formats::format_date(&dt));
}
