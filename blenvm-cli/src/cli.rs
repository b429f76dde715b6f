//! Command definitions and their implementation.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use blenvm_adapters::{
    AlwaysPermit, DiscardMode, FlashLayout, NorFlashRecordDb, NvmAdapter, NvmConfig, NvmError,
    RadioTimingGate, RecordType, SeekMode, StoreId, SysTime,
};
use clap::{Args, Parser, Subcommand};
use embedded_storage::nor_flash::ReadNorFlash;

use crate::image::{FileFlash, SECTOR_SIZE};
use crate::record_spec::{format_hex, parse_record_type, HexBytes};

/// The façade over an image file.
pub type ImageNvm = NvmAdapter<NorFlashRecordDb<FileFlash>>;

/// BLE NVM image tool - inspect and edit persisted bonding data
#[derive(Debug, Parser)]
#[command(name = "blenvm")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Store placement within an image.
#[derive(Debug, Clone, Copy, Args)]
pub struct LayoutArgs {
    /// Sectors at the end of the image reserved for the identity store
    #[arg(long, default_value_t = 1)]
    pub identity_sectors: u32,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create an erased image
    Format {
        /// Image file
        image: PathBuf,

        /// Image size in 4 KiB sectors
        #[arg(long, default_value_t = 8)]
        sectors: u32,
    },

    /// Append a record
    Add {
        /// Image file
        image: PathBuf,

        #[command(flatten)]
        layout: LayoutArgs,

        /// Record type (sec, gatt, device-id or a raw tag)
        #[arg(long = "type", value_parser = parse_record_type)]
        record_type: RecordType,

        /// Payload as hex
        #[arg(long)]
        data: HexBytes,

        /// Extra payload as hex, stored after the payload
        #[arg(long, default_value = "")]
        extra: HexBytes,
    },

    /// List records (both stores when no type is given)
    List {
        /// Image file
        image: PathBuf,

        #[command(flatten)]
        layout: LayoutArgs,

        /// Only records of this type
        #[arg(long = "type", value_parser = parse_record_type)]
        record_type: Option<RecordType>,
    },

    /// Compare a record against a byte pattern
    Compare {
        /// Image file
        image: PathBuf,

        #[command(flatten)]
        layout: LayoutArgs,

        /// Record type to walk
        #[arg(long = "type", value_parser = parse_record_type)]
        record_type: RecordType,

        /// Position of the record among those of its type
        #[arg(long, default_value_t = 0)]
        index: usize,

        /// Byte offset into the record
        #[arg(long, default_value_t = 0)]
        offset: usize,

        /// Pattern as hex
        #[arg(long)]
        pattern: HexBytes,
    },

    /// Delete one record, or every security/GATT record
    Discard {
        /// Image file
        image: PathBuf,

        #[command(flatten)]
        layout: LayoutArgs,

        /// Erase the whole security/GATT store
        #[arg(long, conflicts_with = "record_type")]
        all: bool,

        /// Record type to walk
        #[arg(long = "type", value_parser = parse_record_type)]
        record_type: Option<RecordType>,

        /// Position of the record among those of its type
        #[arg(long, default_value_t = 0)]
        index: usize,
    },

    /// Evaluate the radio-timing gate
    Gate {
        /// Ticks the flash operation needs
        #[arg(long, allow_negative_numbers = true)]
        budget: i32,

        /// Current system time in ticks
        #[arg(long)]
        now: u32,

        /// Time of the next radio activity (radio idle when omitted)
        #[arg(long)]
        next: Option<u32>,
    },
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Format { image, sectors } => format_image(&image, sectors),
        Command::Add {
            image,
            layout,
            record_type,
            data,
            extra,
        } => add_record(&image, layout, record_type, &data, &extra),
        Command::List {
            image,
            layout,
            record_type,
        } => list_records(&image, layout, record_type),
        Command::Compare {
            image,
            layout,
            record_type,
            index,
            offset,
            pattern,
        } => compare_record(&image, layout, record_type, index, offset, &pattern),
        Command::Discard {
            image,
            layout,
            all,
            record_type,
            index,
        } => match (all, record_type) {
            (true, _) => discard_all(&image, layout),
            (false, Some(record_type)) => discard_record(&image, layout, record_type, index),
            (false, None) => bail!("either --all or --type is required"),
        },
        Command::Gate { budget, now, next } => evaluate_gate(budget, now, next),
    }
}

/// Open the façade over an existing image.
pub fn open_image(image: &Path, layout: LayoutArgs) -> Result<ImageNvm> {
    let flash = FileFlash::open(image)?;
    let capacity = flash.capacity() as u32;
    let layout = FlashLayout::split(capacity, SECTOR_SIZE as u32, layout.identity_sectors)
        .with_context(|| format!("cannot place stores in {}", image.display()))?;
    let db = NorFlashRecordDb::new(flash, layout, AlwaysPermit)?;
    NvmAdapter::new(db, NvmConfig::default())
        .with_context(|| format!("failed to scan {}", image.display()))
}

fn format_image(image: &Path, sectors: u32) -> Result<()> {
    let flash = FileFlash::create(image, sectors)?;
    println!(
        "Formatted {} ({} sectors, {} bytes)",
        image.display(),
        flash.sectors(),
        flash.capacity()
    );
    Ok(())
}

fn add_record(
    image: &Path,
    layout: LayoutArgs,
    record_type: RecordType,
    data: &HexBytes,
    extra: &HexBytes,
) -> Result<()> {
    let mut nvm = open_image(image, layout)?;
    match nvm.add(record_type, data.as_slice(), extra.as_slice()) {
        Ok(()) => {}
        Err(NvmError::Full) => bail!("{} is full", nvm.current_store()),
        Err(err) => return Err(err).context("add failed"),
    }

    let store = nvm.current_store();
    println!(
        "Added {} record ({} bytes) to {}, {} bytes free",
        record_type,
        data.as_slice().len() + extra.as_slice().len(),
        store,
        nvm.db().free(store)
    );
    Ok(())
}

/// Read the record `get` just found, growing the buffer when it was short.
fn read_found(
    nvm: &mut ImageNvm,
    record_type: RecordType,
    buf: &mut Vec<u8>,
    len: usize,
) -> Result<()> {
    if len > buf.len() {
        buf.resize(len, 0);
        nvm.get(SeekMode::Current, record_type, 0, buf)
            .context("failed to reread record")?;
    }
    buf.truncate(len);
    Ok(())
}

fn list_records(image: &Path, layout: LayoutArgs, filter: Option<RecordType>) -> Result<()> {
    let mut nvm = open_image(image, layout)?;
    let walks = match filter {
        Some(record_type) => vec![record_type],
        None => vec![RecordType::ANY, RecordType::DEVICE_ID],
    };

    for record_type in walks {
        let store = nvm.router().route(record_type);
        println!("{} (walking {}):", store, record_type);

        let mut mode = SeekMode::First;
        let mut index = 0;
        loop {
            let mut buf = vec![0u8; 64];
            let len = match nvm.get(mode, record_type, 0, &mut buf) {
                Ok(len) => len,
                Err(NvmError::EndOfSequence) => break,
                Err(err) => return Err(err).context("walk failed"),
            };
            read_found(&mut nvm, record_type, &mut buf, len)?;

            let cursor = *nvm.handles().get(store).cursor();
            let stored_type = nvm.db_mut().current_record_type(&cursor)?;
            let stored_type = stored_type.map_or_else(|| "?".to_string(), |t| t.to_string());

            println!("  [{index:>3}] {stored_type:<10} {len:>5}  {}", format_hex(&buf));
            index += 1;
            mode = SeekMode::Next;
        }

        if index == 0 {
            println!("  (empty)");
        }
    }

    Ok(())
}

/// Walk to the `index`-th record of `record_type`.
fn seek_to(nvm: &mut ImageNvm, record_type: RecordType, index: usize) -> Result<()> {
    let mut scratch = [0u8; 0];
    let mut mode = SeekMode::First;
    for seen in 0..=index {
        match nvm.get(mode, record_type, 0, &mut scratch) {
            Ok(_) => {}
            Err(NvmError::EndOfSequence) => {
                bail!("only {seen} {record_type} record(s), no index {index}")
            }
            Err(err) => return Err(err).context("walk failed"),
        }
        mode = SeekMode::Next;
    }
    Ok(())
}

fn compare_record(
    image: &Path,
    layout: LayoutArgs,
    record_type: RecordType,
    index: usize,
    offset: usize,
    pattern: &HexBytes,
) -> Result<()> {
    let mut nvm = open_image(image, layout)?;
    seek_to(&mut nvm, record_type, index)?;

    let outcome = nvm.compare(offset, pattern.as_slice());
    let code = nvm.legacy_compare(
        u16::try_from(offset).context("offset exceeds 65535")?,
        pattern.as_slice(),
    );
    println!("{outcome:?} (status {code})");
    Ok(())
}

fn discard_all(image: &Path, layout: LayoutArgs) -> Result<()> {
    let mut nvm = open_image(image, layout)?;
    let before = nvm.db_mut().live_count(StoreId::SecurityGatt)?;

    nvm.discard(DiscardMode::All);

    let after = nvm.db_mut().live_count(StoreId::SecurityGatt)?;
    if after != 0 {
        bail!("{} still holds {} record(s)", StoreId::SecurityGatt, after);
    }
    println!("Erased {} ({} record(s))", StoreId::SecurityGatt, before);
    Ok(())
}

fn discard_record(
    image: &Path,
    layout: LayoutArgs,
    record_type: RecordType,
    index: usize,
) -> Result<()> {
    let mut nvm = open_image(image, layout)?;
    seek_to(&mut nvm, record_type, index)?;

    let store = nvm.current_store();
    let before = nvm.db_mut().live_count(store)?;
    nvm.discard(DiscardMode::Current);
    let after = nvm.db_mut().live_count(store)?;

    if before == after {
        log::warn!("{} records are not deleted one by one", store);
        println!("Kept {record_type} record {index}: {store} is protected");
    } else {
        println!("Deleted {record_type} record {index} from {store}");
    }
    Ok(())
}

fn evaluate_gate(budget: i32, now: u32, next: Option<u32>) -> Result<()> {
    let gate = RadioTimingGate::new(
        move || SysTime::from_ticks(now),
        move || next.map(SysTime::from_ticks),
    );

    let verdict = if gate.permits(budget) { "permit" } else { "defer" };
    match gate.remaining() {
        Some(remaining) => {
            println!("{verdict}: {remaining} ticks to radio activity, {budget} needed")
        }
        None => println!("{verdict}: radio idle"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_args(args: &[&str]) -> Result<()> {
        let mut argv = vec!["blenvm"];
        argv.extend_from_slice(args);
        run(Cli::try_parse_from(argv)?)
    }

    fn image() -> (tempfile::TempDir, String) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nvm.bin").to_string_lossy().into_owned();
        run_args(&["format", &path, "--sectors", "4"]).unwrap();
        (dir, path)
    }

    #[test]
    fn test_add_routes_to_stores() {
        let (_dir, path) = image();
        run_args(&["add", &path, "--type", "sec", "--data", "01:02:03"]).unwrap();
        run_args(&["add", &path, "--type", "gatt", "--data", "0x0a0b", "--extra", "0c"]).unwrap();
        run_args(&["add", &path, "--type", "device-id", "--data", "c0ffee"]).unwrap();
        run_args(&["list", &path]).unwrap();

        let mut nvm = open_image(Path::new(&path), LayoutArgs { identity_sectors: 1 }).unwrap();
        assert_eq!(nvm.db_mut().live_count(StoreId::SecurityGatt).unwrap(), 2);
        assert_eq!(nvm.db_mut().live_count(StoreId::DeviceIdentity).unwrap(), 1);

        let mut buf = [0u8; 8];
        let len = nvm.get(SeekMode::First, RecordType::GATT, 0, &mut buf).unwrap();
        assert_eq!(&buf[..len], &[0x0a, 0x0b, 0x0c]);
    }

    #[test]
    fn test_discard_by_index_and_all() {
        let (_dir, path) = image();
        for data in ["aa", "bb", "cc"] {
            run_args(&["add", &path, "--type", "sec", "--data", data]).unwrap();
        }
        run_args(&["add", &path, "--type", "device-id", "--data", "dd"]).unwrap();

        run_args(&["discard", &path, "--type", "sec", "--index", "1"]).unwrap();
        let mut nvm = open_image(Path::new(&path), LayoutArgs { identity_sectors: 1 }).unwrap();
        let mut buf = [0u8; 1];
        nvm.get(SeekMode::First, RecordType::SECURITY, 0, &mut buf).unwrap();
        assert_eq!(buf, [0xaa]);
        nvm.get(SeekMode::Next, RecordType::SECURITY, 0, &mut buf).unwrap();
        assert_eq!(buf, [0xcc]);
        drop(nvm);

        // Identity records stay put.
        run_args(&["discard", &path, "--type", "device-id"]).unwrap();
        run_args(&["discard", &path, "--all"]).unwrap();

        let mut nvm = open_image(Path::new(&path), LayoutArgs { identity_sectors: 1 }).unwrap();
        assert_eq!(nvm.db_mut().live_count(StoreId::SecurityGatt).unwrap(), 0);
        assert_eq!(nvm.db_mut().live_count(StoreId::DeviceIdentity).unwrap(), 1);
    }

    #[test]
    fn test_seek_past_last_record() {
        let (_dir, path) = image();
        run_args(&["add", &path, "--type", "gatt", "--data", "01"]).unwrap();

        let err = run_args(&["compare", &path, "--type", "gatt", "--index", "1", "--pattern", "01"])
            .unwrap_err();
        assert!(err.to_string().contains("no index 1"));
        run_args(&["compare", &path, "--type", "gatt", "--pattern", "01"]).unwrap();
    }

    #[test]
    fn test_full_store_is_reported() {
        let (_dir, path) = image();
        let big = "ab".repeat(3000);
        run_args(&["add", &path, "--type", "device-id", "--data", &big]).unwrap();

        let err = run_args(&["add", &path, "--type", "device-id", "--data", &big]).unwrap_err();
        assert!(err.to_string().contains("full"));
    }

    #[test]
    fn test_discard_needs_a_target() {
        let (_dir, path) = image();
        assert!(run_args(&["discard", &path]).is_err());
        assert!(run_args(&["discard", &path, "--all", "--type", "sec"]).is_err());
    }

    #[test]
    fn test_gate_command() {
        run_args(&["gate", "--budget", "10", "--now", "100", "--next", "200"]).unwrap();
        run_args(&["gate", "--budget", "-5", "--now", "100"]).unwrap();
    }
}
