//! Executable Image Loader.
//!
//! This module loads ELF firmware into a [`MemoryTarget`]. It performs:
//! 1. **Identification:** Checks the ELF magic, class, data encoding and version.
//! 2. **Header parsing:** Reads the file header and program-header table with `object`, which
//!    rejects tables whose offset, count or entry size disagree with the file length.
//! 3. **Validation pre-pass:** Checks every `PT_LOAD` segment against the target window before
//!    anything is written, so a bad segment cannot leave memory half populated.
//! 4. **Copy pass:** Writes the file-backed bytes of each segment and zero-fills the rest of
//!    its in-memory size.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use object::Endianness;
use object::{elf, pod};
use object::read::elf::{FileHeader, ProgramHeader};
use tracing::{debug, info};

use crate::common::LoadError;
use crate::soc::traits::MemoryTarget;

/// ELF file class.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElfClass {
    /// 32-bit objects (`ELFCLASS32`).
    Elf32,
    /// 64-bit objects (`ELFCLASS64`).
    Elf64,
}

/// One loadable region of an image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Segment {
    /// Index of the program header that described this segment.
    pub index: usize,
    /// Physical load address.
    pub load_address: u64,
    /// Offset of the segment data in the file.
    pub file_offset: u64,
    /// Number of bytes backed by the file.
    pub file_size: u64,
    /// Number of bytes occupied in memory; the excess over `file_size` is zero-filled.
    pub mem_size: u64,
    /// `PF_*` permission flags.
    pub flags: u32,
}

impl Segment {
    /// Returns the exclusive end of the segment in memory, or `None` on overflow.
    pub const fn end(&self) -> Option<u64> {
        self.load_address.checked_add(self.mem_size)
    }

    /// Returns the number of bytes that are zero-filled rather than copied.
    pub const fn zero_fill(&self) -> u64 {
        self.mem_size - self.file_size
    }
}

/// A parsed firmware image.
///
/// Built by the loader, reported to the caller for diagnostics and then dropped. It keeps no
/// reference into the file contents or the memory target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecutableImage {
    /// File class.
    pub class: ElfClass,
    /// `e_machine` value.
    pub machine: u16,
    /// Entry point. Informational only: the core starts from its own reset vector.
    pub entry_point: u64,
    /// Loadable segments in program-header order.
    pub segments: Vec<Segment>,
}

impl ExecutableImage {
    /// Parses `data` as an ELF executable without touching any memory.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Format`] when the identification bytes, header fields or
    /// program headers are inconsistent.
    pub fn parse(data: &[u8]) -> Result<Self, LoadError> {
        match identify(data)? {
            ElfClass::Elf32 => parse_elf::<elf::FileHeader32<Endianness>>(data, ElfClass::Elf32),
            ElfClass::Elf64 => parse_elf::<elf::FileHeader64<Endianness>>(data, ElfClass::Elf64),
        }
    }

    /// Total number of bytes the image occupies in memory.
    pub fn mem_bytes(&self) -> u64 {
        self.segments.iter().map(|s| s.mem_size).sum()
    }
}

/// Loads ELF images into a memory target.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImageLoader;

impl ImageLoader {
    /// Creates a loader.
    pub const fn new() -> Self {
        Self
    }

    /// Reads the image at `path` and loads it into `target`.
    ///
    /// # Errors
    ///
    /// * [`LoadError::Open`] if the file cannot be opened.
    /// * [`LoadError::Io`] if reading it fails.
    /// * [`LoadError::Format`] if it is not a well-formed ELF executable.
    /// * [`LoadError::Range`] if a loadable segment does not fit the target window. No memory
    ///   has been written in that case.
    pub fn load(
        &self,
        path: &Path,
        target: &mut dyn MemoryTarget,
    ) -> Result<ExecutableImage, LoadError> {
        let mut file = File::open(path).map_err(|source| LoadError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let mut data = Vec::new();
        let _ = file
            .read_to_end(&mut data)
            .map_err(|source| LoadError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        debug!(path = %path.display(), bytes = data.len(), "read executable image");
        self.load_bytes(&data, target)
    }

    /// Loads an in-memory image into `target`.
    ///
    /// # Errors
    ///
    /// As for [`load`](Self::load), minus the file-system errors.
    pub fn load_bytes(
        &self,
        data: &[u8],
        target: &mut dyn MemoryTarget,
    ) -> Result<ExecutableImage, LoadError> {
        let image = ExecutableImage::parse(data)?;

        for segment in &image.segments {
            validate_segment(segment, &*target)?;
        }

        for segment in &image.segments {
            copy_segment(segment, data, target)?;
        }

        info!(
            entry = format_args!("{:#x}", image.entry_point),
            segments = image.segments.len(),
            bytes = image.mem_bytes(),
            "image loaded"
        );
        Ok(image)
    }
}

/// Checks the identification bytes and returns the file class.
fn identify(data: &[u8]) -> Result<ElfClass, LoadError> {
    let (ident, _) = pod::from_bytes::<elf::Ident>(data)
        .map_err(|()| LoadError::format(format!("file too short ({} bytes)", data.len())))?;
    if ident.magic != elf::ELFMAG {
        return Err(LoadError::format("bad magic, not an ELF file"));
    }
    let class = match ident.class {
        elf::ELFCLASS32 => ElfClass::Elf32,
        elf::ELFCLASS64 => ElfClass::Elf64,
        other => return Err(LoadError::format(format!("unsupported ELF class {other}"))),
    };
    match ident.data {
        elf::ELFDATA2LSB | elf::ELFDATA2MSB => {}
        other => return Err(LoadError::format(format!("unsupported data encoding {other}"))),
    }
    if ident.version != elf::EV_CURRENT {
        return Err(LoadError::format(format!(
            "unsupported ELF version {}",
            ident.version
        )));
    }
    Ok(class)
}

/// Parses the header and program headers for one ELF class.
fn parse_elf<Elf>(data: &[u8], class: ElfClass) -> Result<ExecutableImage, LoadError>
where
    Elf: FileHeader<Endian = Endianness>,
{
    let header = Elf::parse(data).map_err(|e| LoadError::format(e.to_string()))?;
    let endian = header.endian().map_err(|e| LoadError::format(e.to_string()))?;

    let ehsize = header.e_ehsize(endian) as usize;
    if ehsize != size_of::<Elf>() {
        return Err(LoadError::format(format!(
            "header size {ehsize} does not match {class:?} ({})",
            size_of::<Elf>()
        )));
    }

    let phoff: u64 = header.e_phoff(endian).into();
    let phnum = header.e_phnum(endian);
    if phnum != 0 && phoff < ehsize as u64 {
        return Err(LoadError::format(format!(
            "{phnum} program headers declared at offset {phoff:#x}, inside the file header"
        )));
    }

    let program_headers = header
        .program_headers(endian, data)
        .map_err(|e| LoadError::format(e.to_string()))?;

    let mut segments = Vec::new();
    for (index, ph) in program_headers.iter().enumerate() {
        if ph.p_type(endian) != elf::PT_LOAD {
            continue;
        }
        let segment = Segment {
            index,
            load_address: ph.p_paddr(endian).into(),
            file_offset: ph.p_offset(endian).into(),
            file_size: ph.p_filesz(endian).into(),
            mem_size: ph.p_memsz(endian).into(),
            flags: ph.p_flags(endian),
        };
        check_segment_file_range(&segment, data.len())?;
        segments.push(segment);
    }

    Ok(ExecutableImage {
        class,
        machine: header.e_machine(endian),
        entry_point: header.e_entry(endian).into(),
        segments,
    })
}

/// Checks that a segment's file-backed bytes exist and that it is not smaller in memory.
fn check_segment_file_range(segment: &Segment, file_len: usize) -> Result<(), LoadError> {
    if segment.mem_size < segment.file_size {
        return Err(LoadError::format(format!(
            "segment {} has memsz {:#x} smaller than filesz {:#x}",
            segment.index, segment.mem_size, segment.file_size
        )));
    }
    let in_file = segment
        .file_offset
        .checked_add(segment.file_size)
        .is_some_and(|end| end <= file_len as u64);
    if !in_file {
        return Err(LoadError::format(format!(
            "segment {} data [{:#x}, +{:#x}) extends past end of file ({file_len} bytes)",
            segment.index, segment.file_offset, segment.file_size
        )));
    }
    Ok(())
}

/// Validates one segment against the target window.
///
/// The address space is contiguous, so checking the first and last byte is enough once
/// overflow past the 32-bit bus has been ruled out.
fn validate_segment(segment: &Segment, target: &dyn MemoryTarget) -> Result<(), LoadError> {
    if segment.mem_size == 0 {
        return Ok(());
    }
    let out_of_range = || LoadError::Range {
        index: segment.index,
        start: segment.load_address,
        end: segment.end().unwrap_or(u64::MAX),
        window: target.window(),
    };

    let end = segment.end().ok_or_else(out_of_range)?;
    let first = u32::try_from(segment.load_address).map_err(|_| out_of_range())?;
    let last = u32::try_from(end - 1).map_err(|_| out_of_range())?;
    if !target.is_valid_address(first) || !target.is_valid_address(last) {
        return Err(out_of_range());
    }
    Ok(())
}

/// Copies one validated segment into the target.
fn copy_segment(
    segment: &Segment,
    data: &[u8],
    target: &mut dyn MemoryTarget,
) -> Result<(), LoadError> {
    if segment.mem_size == 0 {
        return Ok(());
    }
    // Both narrowings were proven by validate_segment / check_segment_file_range.
    let base = segment.load_address as u32;
    let start = segment.file_offset as usize;
    let bytes = &data[start..start + segment.file_size as usize];

    target.write_bytes(base, bytes)?;
    if segment.zero_fill() > 0 {
        target.fill(base + bytes.len() as u32, segment.zero_fill() as usize, 0)?;
    }

    debug!(
        segment = segment.index,
        addr = format_args!("{base:#010x}"),
        copied = segment.file_size,
        zeroed = segment.zero_fill(),
        "segment written"
    );
    Ok(())
}
