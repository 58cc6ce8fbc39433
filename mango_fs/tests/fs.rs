//! File system behavior against an in-memory disk.

use mango_fs::device::{BlockDevice, IoErr, SECTOR_SIZE, Sector};
use mango_fs::structs::{BLOCK_PAYLOAD, SECTOR_ROOT};
use mango_fs::{FsError, MangoFs, StreamMode};

const DISK_SECTORS: u32 = 4096;
const NOW: u64 = 0x07E8_0801_0C00_0000;

struct MemDisk {
    sectors: Vec<Sector>,
}

impl MemDisk {
    fn new() -> Self {
        MemDisk {
            sectors: vec![[0; SECTOR_SIZE]; DISK_SECTORS as usize],
        }
    }
}

impl BlockDevice for MemDisk {
    fn read_sector(&mut self, lba: u32, buf: &mut Sector) -> Result<(), IoErr> {
        let sector = self
            .sectors
            .get(lba as usize)
            .ok_or(IoErr::SectorOutOfRange)?;
        buf.copy_from_slice(sector);
        Ok(())
    }

    fn write_sector(&mut self, lba: u32, buf: &Sector) -> Result<(), IoErr> {
        let sector = self
            .sectors
            .get_mut(lba as usize)
            .ok_or(IoErr::SectorOutOfRange)?;
        sector.copy_from_slice(buf);
        Ok(())
    }

    fn sector_count(&mut self) -> u32 {
        DISK_SECTORS
    }
}

fn formatted() -> MangoFs<MemDisk> {
    let mut fs = MangoFs::new(MemDisk::new());
    fs.format(NOW).unwrap();
    fs
}

#[test]
fn unformatted_disk_refuses_file_operations() {
    let mut fs = MangoFs::new(MemDisk::new());
    assert!(!fs.is_formatted().unwrap());
    assert_eq!(
        fs.file_create(SECTOR_ROOT, "a", NOW),
        Err(FsError::NotFormatted)
    );
}

#[test]
fn format_writes_superblock_and_root() {
    let mut fs = formatted();

    let sb = fs.read_superblock().unwrap();
    assert!(sb.is_formatted());
    assert_eq!(sb.sectors, DISK_SECTORS);
    assert_eq!(sb.used, 2);
    assert_eq!(sb.free, SECTOR_ROOT + 1);
    assert_eq!(sb.free_list, 0);

    let root = fs.read_node(SECTOR_ROOT).unwrap();
    assert!(root.is_folder());
    assert_eq!({ root.parent }, 0);
    assert_eq!({ root.child_head }, 0);
}

#[test]
fn format_is_idempotent() {
    let mut fs = formatted();
    fs.folder_create(SECTOR_ROOT, "junk", NOW).unwrap();

    fs.format(NOW).unwrap();
    let once = fs.read_superblock().unwrap();

    fs.format(NOW).unwrap();
    let twice = fs.read_superblock().unwrap();

    assert_eq!(once, twice);
    assert_eq!(fs.resolve_path("/junk"), Err(FsError::NotFound));
}

#[test]
fn write_then_read_round_trips() {
    let mut fs = formatted();

    fs.folder_create(SECTOR_ROOT, "a", NOW).unwrap();
    let folder = fs.resolve_path("/a").unwrap();
    let file = fs.file_create(folder, "b", NOW).unwrap();

    fs.file_write(file, b"hello", NOW).unwrap();
    assert_eq!(fs.file_read(file).unwrap(), "hello");

    let resolved = fs.resolve_path("/a/b").unwrap();
    assert_eq!(resolved, file);
}

#[test]
fn multi_block_write_extends_the_chain() {
    let mut fs = formatted();
    let file = fs.file_create(SECTOR_ROOT, "big", NOW).unwrap();

    let data: Vec<u8> = (0..2000u32).map(|i| (i % 251 + 1) as u8).collect();
    fs.file_write(file, &data, NOW).unwrap();

    let node = fs.read_node(file).unwrap();
    assert_eq!({ node.size }, 4); // ceil(2000 / 508)

    let raw = fs.file_read_blocks(file).unwrap();
    assert_eq!(raw.len(), 4 * BLOCK_PAYLOAD);
    assert_eq!(&raw[..2000], &data[..]);
    assert_eq!(raw[2000], 0);
}

#[test]
fn shorter_rewrite_keeps_logical_content_exact() {
    let mut fs = formatted();
    let file = fs.file_create(SECTOR_ROOT, "f", NOW).unwrap();

    let long: Vec<u8> = std::iter::repeat(b'x').take(1200).collect();
    fs.file_write(file, &long, NOW).unwrap();
    fs.file_write(file, b"short", NOW).unwrap();

    assert_eq!(fs.file_read(file).unwrap(), "short");
    // trailing blocks are never reclaimed by a write
    assert_eq!({ fs.read_node(file).unwrap().size }, 3);
}

#[test]
fn create_delete_create_reuses_freed_sectors() {
    let mut fs = formatted();

    let names: Vec<String> = (0..10).map(|i| format!("f{i}")).collect();
    for name in &names {
        fs.file_create(SECTOR_ROOT, name, NOW).unwrap();
    }

    let after_ten = fs.read_superblock().unwrap();
    assert_eq!(after_ten.used, 2 + 10 * 2); // node + data sector each

    for name in &names[3..8] {
        fs.file_delete(SECTOR_ROOT, name).unwrap();
    }
    assert_eq!(fs.read_superblock().unwrap().used, 2 + 5 * 2);

    for i in 10..15 {
        fs.file_create(SECTOR_ROOT, &format!("f{i}"), NOW).unwrap();
    }

    let finished = fs.read_superblock().unwrap();
    assert_eq!(finished.used, 2 + 10 * 2);
    // the five new files were carved entirely out of the free list
    assert_eq!(finished.free, after_ten.free);
    assert_eq!(finished.free_list, 0);
}

#[test]
fn free_list_is_lifo() {
    let mut fs = formatted();

    let a = fs.sector_alloc().unwrap();
    let b = fs.sector_alloc().unwrap();
    assert_ne!(a, b);

    fs.sector_free(a).unwrap();
    fs.sector_free(b).unwrap();

    assert_eq!(fs.sector_alloc().unwrap(), b);
    assert_eq!(fs.sector_alloc().unwrap(), a);
}

#[test]
fn sibling_lists_stay_consistent_after_middle_delete() {
    let mut fs = formatted();

    for name in ["a", "b", "c"] {
        fs.file_create(SECTOR_ROOT, name, NOW).unwrap();
    }
    fs.file_delete(SECTOR_ROOT, "b").unwrap();

    assert!(fs.resolve_path("/a").is_ok());
    assert_eq!(fs.resolve_path("/b"), Err(FsError::NotFound));
    assert!(fs.resolve_path("/c").is_ok());

    // head delete patches child_head
    fs.file_delete(SECTOR_ROOT, "a").unwrap();
    let root = fs.read_node(SECTOR_ROOT).unwrap();
    let head = fs.read_node(root.child_head).unwrap();
    assert_eq!(head.name(), "c");
}

#[test]
fn duplicate_names_and_bad_parents_are_rejected() {
    let mut fs = formatted();

    fs.file_create(SECTOR_ROOT, "x", NOW).unwrap();
    assert_eq!(
        fs.file_create(SECTOR_ROOT, "x", NOW),
        Err(FsError::AlreadyExists)
    );
    // names are unique per parent across kinds
    assert_eq!(
        fs.folder_create(SECTOR_ROOT, "x", NOW),
        Err(FsError::AlreadyExists)
    );

    let file = fs.resolve_path("/x").unwrap();
    assert_eq!(fs.file_create(file, "y", NOW), Err(FsError::NotAFolder));
}

#[test]
fn folder_delete_reclaims_the_whole_subtree() {
    let mut fs = formatted();

    let a = fs.folder_create(SECTOR_ROOT, "a", NOW).unwrap();
    let b = fs.folder_create(a, "b", NOW).unwrap();
    let f1 = fs.file_create(a, "f1", NOW).unwrap();
    let f2 = fs.file_create(b, "f2", NOW).unwrap();
    fs.file_write(f1, &[b'q'; 1000], NOW).unwrap();
    fs.file_write(f2, &[b'r'; 600], NOW).unwrap();

    fs.folder_delete(SECTOR_ROOT, "a").unwrap();

    assert_eq!(fs.read_superblock().unwrap().used, 2);
    assert_eq!(fs.resolve_path("/a"), Err(FsError::NotFound));
}

#[test]
fn root_cannot_be_deleted_and_goup_stops_there() {
    let mut fs = formatted();

    let a = fs.folder_create(SECTOR_ROOT, "a", NOW).unwrap();
    fs.set_current_dir(a).unwrap();
    assert!(fs.go_up().unwrap());
    assert_eq!(fs.current_dir(), SECTOR_ROOT);
    assert!(!fs.go_up().unwrap());
}

#[test]
fn paths_resolve_relative_to_the_current_directory() {
    let mut fs = formatted();

    let a = fs.folder_create(SECTOR_ROOT, "a", NOW).unwrap();
    let b = fs.folder_create(a, "b", NOW).unwrap();
    let c = fs.file_create(b, "c", NOW).unwrap();

    fs.set_current_dir(a).unwrap();
    assert_eq!(fs.resolve_path("b/c").unwrap(), c);
    assert_eq!(fs.resolve_path("/a/b/c").unwrap(), c);
    assert_eq!(fs.resolve_path("b/").unwrap(), b);
    assert_eq!(fs.resolve_path("/").unwrap(), SECTOR_ROOT);
    assert_eq!(fs.resolve_path(""), Err(FsError::BadPath));
}

#[test]
fn abspath_matches_the_resolving_path() {
    let mut fs = formatted();

    let a = fs.folder_create(SECTOR_ROOT, "a", NOW).unwrap();
    let b = fs.folder_create(a, "b", NOW).unwrap();
    fs.file_create(b, "c", NOW).unwrap();

    for path in ["/a", "/a/b", "/a/b/c"] {
        let sector = fs.resolve_path(path).unwrap();
        assert_eq!(fs.abspath(sector).unwrap(), path);
    }
    assert_eq!(fs.abspath(SECTOR_ROOT).unwrap(), "/");
}

#[test]
fn append_stream_continues_where_content_ends() {
    let mut fs = formatted();
    let file = fs.file_create(SECTOR_ROOT, "log", NOW).unwrap();

    let first: Vec<u8> = std::iter::repeat(b'a').take(2000).collect();
    fs.file_write(file, &first, NOW).unwrap();

    let mut stream = fs.open("/log", StreamMode::Append).unwrap();
    assert_eq!(stream.seek(), 2000);
    stream.write(&mut fs, &[b'b'; 100]).unwrap();

    let mut reader = fs.open("/log", StreamMode::Read).unwrap();
    let content = reader.read_to_string(&mut fs).unwrap();
    assert_eq!(content.len(), 2100);
    assert!(content[..2000].bytes().all(|c| c == b'a'));
    assert!(content[2000..].bytes().all(|c| c == b'b'));
}

#[test]
fn append_across_a_full_final_block_chains_a_new_one() {
    let mut fs = formatted();
    let file = fs.file_create(SECTOR_ROOT, "edge", NOW).unwrap();

    // exactly one full block, terminator has no slot
    fs.file_write(file, &[b'x'; BLOCK_PAYLOAD], NOW).unwrap();

    let mut stream = fs.open("/edge", StreamMode::Append).unwrap();
    assert_eq!(stream.seek(), BLOCK_PAYLOAD);
    stream.write(&mut fs, b"more").unwrap();

    let mut reader = fs.open("/edge", StreamMode::Read).unwrap();
    let content = reader.read_to_string(&mut fs).unwrap();
    assert_eq!(content.len(), BLOCK_PAYLOAD + 4);
    assert!(content.ends_with("more"));
}

#[test]
fn stream_getc_and_peek_walk_the_content() {
    let mut fs = formatted();
    let file = fs.file_create(SECTOR_ROOT, "t", NOW).unwrap();
    fs.file_write(file, b"ab", NOW).unwrap();

    let mut stream = fs.open("/t", StreamMode::Read).unwrap();
    assert_eq!(stream.peek(&mut fs).unwrap(), b'a');
    assert_eq!(stream.getc(&mut fs).unwrap(), b'a');
    assert_eq!(stream.getc(&mut fs).unwrap(), b'b');
    // at EOF the cursor stops advancing
    assert_eq!(stream.getc(&mut fs).unwrap(), 0);
    assert_eq!(stream.getc(&mut fs).unwrap(), 0);

    assert_eq!(stream.putc(&mut fs, b'!'), Err(FsError::InvalidMode));
}

#[test]
fn stream_read_nul_terminates_dest() {
    let mut fs = formatted();
    let file = fs.file_create(SECTOR_ROOT, "t", NOW).unwrap();
    fs.file_write(file, b"hello world", NOW).unwrap();

    let mut stream = fs.open("/t", StreamMode::Read).unwrap();
    let mut dest = [0xFFu8; 6];
    let n = stream.read(&mut fs, &mut dest).unwrap();
    assert_eq!(n, 5);
    assert_eq!(&dest[..6], b"hello\0");
}

#[test]
fn writes_are_durable_sector_by_sector() {
    // a freshly mounted view of the same device sees everything
    let mut fs = formatted();
    let file = fs.file_create(SECTOR_ROOT, "persist", NOW).unwrap();
    fs.file_write(file, b"payload", NOW).unwrap();

    let mut sb_buf = [0u8; SECTOR_SIZE];
    fs.device().read_sector(2048, &mut sb_buf).unwrap();
    assert_eq!(&sb_buf[..4], b"MNGO");

    let node = fs.read_node(file).unwrap();
    assert_eq!({ node.time_created }, NOW);
    assert_eq!({ node.time_changed }, NOW);
    assert_eq!(node.name(), "persist");
}
