//! Forward-only reader over ZIP local file headers
//!
//! The archive is walked record by record as it arrives; the central
//! directory at the end is never needed. Entries whose sizes trail the data
//! (flag bit 3, written by streaming writers) are delimited by inflating to
//! the end of their deflate stream and then reading the data descriptor.

use flate2::bufread::DeflateDecoder;
use std::io::{self, BufRead, Read};

use crate::error::ArchiveError;

const LOCAL_FILE_HEADER: u32 = 0x0403_4b50;
const CENTRAL_DIRECTORY_HEADER: u32 = 0x0201_4b50;
const END_OF_CENTRAL_DIRECTORY: u32 = 0x0605_4b50;
const DATA_DESCRIPTOR: u32 = 0x0807_4b50;

const FLAG_ENCRYPTED: u16 = 1;
const FLAG_DATA_DESCRIPTOR: u16 = 1 << 3;

const METHOD_STORED: u16 = 0;
const METHOD_DEFLATED: u16 = 8;

const ZIP64_EXTRA_ID: u16 = 0x0001;
const ZIP64_MARKER: u32 = u32::MAX;

/// Cap on buffer preallocation taken from a declared entry size
const MAX_PREALLOCATION: usize = 1 << 20;

/// One local file header
#[derive(Debug, Clone)]
pub struct LocalHeader {
    pub name: String,
    flags: u16,
    method: u16,
    compressed_size: u64,
    size: u64,
    zip64: bool,
}

impl LocalHeader {
    pub fn is_dir(&self) -> bool {
        self.name.ends_with('/')
    }

    fn has_data_descriptor(&self) -> bool {
        self.flags & FLAG_DATA_DESCRIPTOR != 0
    }
}

/// Local entries of a ZIP stream, in archive order
pub struct LocalEntries<B> {
    inner: B,
}

impl<B: BufRead> LocalEntries<B> {
    pub fn new(inner: B) -> Self {
        Self { inner }
    }

    /// Next local header, or `None` once the central directory starts
    pub fn next_header(&mut self) -> Result<Option<LocalHeader>, ArchiveError> {
        match read_u32(&mut self.inner)? {
            LOCAL_FILE_HEADER => {}
            CENTRAL_DIRECTORY_HEADER | END_OF_CENTRAL_DIRECTORY => return Ok(None),
            other => {
                return Err(format_error(format!(
                    "unexpected record signature {other:#010x}"
                )))
            }
        }

        let mut fixed = [0u8; 26];
        read_exact(&mut self.inner, &mut fixed)?;
        let flags = le_u16(&fixed[2..]);
        let method = le_u16(&fixed[4..]);
        let compressed_size = le_u32(&fixed[14..]);
        let size = le_u32(&fixed[18..]);
        let name_len = usize::from(le_u16(&fixed[22..]));
        let extra_len = usize::from(le_u16(&fixed[24..]));

        let mut name = vec![0u8; name_len];
        read_exact(&mut self.inner, &mut name)?;
        let mut extra = vec![0u8; extra_len];
        read_exact(&mut self.inner, &mut extra)?;

        let mut header = LocalHeader {
            name: String::from_utf8_lossy(&name).into_owned(),
            flags,
            method,
            compressed_size: u64::from(compressed_size),
            size: u64::from(size),
            zip64: false,
        };
        apply_zip64_extra(&mut header, &extra, size, compressed_size);

        Ok(Some(header))
    }

    /// Consume the entry's data, and its descriptor if it has one
    pub fn skip(&mut self, header: &LocalHeader) -> Result<(), ArchiveError> {
        if !header.has_data_descriptor() {
            let skipped = io::copy(
                &mut (&mut self.inner).take(header.compressed_size),
                &mut io::sink(),
            )
            .map_err(|source| ArchiveError::Stream { source })?;
            return expect_len(skipped, header.compressed_size);
        }

        match header.method {
            METHOD_DEFLATED => {
                let inflated = io::copy(&mut DeflateDecoder::new(&mut self.inner), &mut io::sink())
                    .map_err(|source| ArchiveError::Stream { source })?;
                self.read_descriptor(header, inflated)
            }
            _ => Err(no_size_error(header)),
        }
    }

    /// Decompress the entry's data
    pub fn read(&mut self, header: &LocalHeader) -> Result<Vec<u8>, ArchiveError> {
        if header.flags & FLAG_ENCRYPTED != 0 {
            return Err(format_error(format!("entry {} is encrypted", header.name)));
        }

        let capacity = usize::try_from(header.size)
            .unwrap_or(usize::MAX)
            .min(MAX_PREALLOCATION);
        let mut content = Vec::with_capacity(capacity);

        match (header.method, header.has_data_descriptor()) {
            (METHOD_STORED, false) => {
                (&mut self.inner)
                    .take(header.compressed_size)
                    .read_to_end(&mut content)
                    .map_err(|source| ArchiveError::Stream { source })?;
                expect_len(content.len() as u64, header.compressed_size)?;
            }
            (METHOD_DEFLATED, false) => {
                DeflateDecoder::new((&mut self.inner).take(header.compressed_size))
                    .read_to_end(&mut content)
                    .map_err(|source| ArchiveError::Stream { source })?;
            }
            (METHOD_DEFLATED, true) => {
                DeflateDecoder::new(&mut self.inner)
                    .read_to_end(&mut content)
                    .map_err(|source| ArchiveError::Stream { source })?;
                self.read_descriptor(header, content.len() as u64)?;
            }
            (METHOD_STORED, true) => return Err(no_size_error(header)),
            (method, _) => {
                return Err(format_error(format!(
                    "entry {} uses unsupported compression method {method}",
                    header.name
                )))
            }
        }

        Ok(content)
    }

    /// Descriptor after the data: optional signature, CRC, compressed and
    /// uncompressed size (64-bit for ZIP64 entries)
    fn read_descriptor(&mut self, header: &LocalHeader, inflated: u64) -> Result<(), ArchiveError> {
        if read_u32(&mut self.inner)? == DATA_DESCRIPTOR {
            // CRC
            read_u32(&mut self.inner)?;
        }

        let (size, expected) = if header.zip64 {
            read_u64(&mut self.inner)?;
            (read_u64(&mut self.inner)?, inflated)
        } else {
            read_u32(&mut self.inner)?;
            (
                u64::from(read_u32(&mut self.inner)?),
                inflated & u64::from(u32::MAX),
            )
        };

        if size != expected {
            return Err(format_error(format!(
                "entry {} inflated to {inflated} bytes but its descriptor declares {size}",
                header.name
            )));
        }
        Ok(())
    }
}

/// Sizes marked `0xFFFFFFFF` in the fixed header live in the ZIP64 extra field
fn apply_zip64_extra(header: &mut LocalHeader, extra: &[u8], size: u32, compressed_size: u32) {
    let mut rest = extra;
    while rest.len() >= 4 {
        let id = le_u16(rest);
        let end = (4 + usize::from(le_u16(&rest[2..]))).min(rest.len());

        if id == ZIP64_EXTRA_ID {
            header.zip64 = true;
            let mut fields = rest[4..end].chunks_exact(8).map(le_u64);
            if size == ZIP64_MARKER {
                if let Some(value) = fields.next() {
                    header.size = value;
                }
            }
            if compressed_size == ZIP64_MARKER {
                if let Some(value) = fields.next() {
                    header.compressed_size = value;
                }
            }
        }

        rest = &rest[end..];
    }
}

fn no_size_error(header: &LocalHeader) -> ArchiveError {
    format_error(format!(
        "stored entry {} has no size in its local header",
        header.name
    ))
}

fn format_error(reason: String) -> ArchiveError {
    ArchiveError::Format { reason }
}

fn expect_len(actual: u64, expected: u64) -> Result<(), ArchiveError> {
    if actual == expected {
        return Ok(());
    }
    Err(ArchiveError::Stream {
        source: io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("archive ended after {actual} of {expected} entry bytes"),
        ),
    })
}

fn read_exact<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<(), ArchiveError> {
    reader
        .read_exact(buf)
        .map_err(|source| ArchiveError::Stream { source })
}

fn read_u32<R: Read>(reader: &mut R) -> Result<u32, ArchiveError> {
    let mut buf = [0u8; 4];
    read_exact(reader, &mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_u64<R: Read>(reader: &mut R) -> Result<u64, ArchiveError> {
    let mut buf = [0u8; 8];
    read_exact(reader, &mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

fn le_u16(bytes: &[u8]) -> u16 {
    u16::from_le_bytes([bytes[0], bytes[1]])
}

fn le_u32(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

fn le_u64(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[..8]);
    u64::from_le_bytes(buf)
}
