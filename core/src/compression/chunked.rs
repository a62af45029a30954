//! compression/chunked.rs
//!
//! Chunked compressor/decompressor: the concrete implementation of the
//! configure / execute protocol for every codec in `Codec`.
//!
//! Design notes:
//! - Input is split into `chunk_size` pieces compressed independently.
//!   Compressed chunks are staged in the workspace, one worst-case slot per
//!   chunk, then gathered behind the header and chunk table.
//! - Sizing is a pure function of `(input size, options)`; nothing reads
//!   device memory until the kernel runs on the stream.
//! - All argument checks happen before enqueue. Once the kernel is on the
//!   stream, failures are the stream's to report.
//! - The decompressor waits for its metadata read in `configure`, so the
//!   returned sizes are final when it returns. Header and chunk table are
//!   both validated there; corrupt metadata never reaches a stream.
//! - Only payload corruption (undecodable chunk, checksum mismatch) and
//!   input rewritten after `configure` surface as stream faults.
//! - A failed `configure` leaves the instance unconfigured.

use std::sync::{Arc, Mutex};

use crate::compression::codecs::KernelParams;
use crate::compression::types::{
    Codec, CodecOptions, CompressConfig, Compressor, DecompressConfig, Decompressor, OutputSize,
};
use crate::constants::{CHUNK_ENTRY_LEN, CHUNK_OFFSET_LEN, MAX_INPUT_SIZE, NO_ELEMENT_TAG};
use crate::device::{DevicePtr, Stream};
use crate::error::{DevcompError, Result};
use crate::headers::{
    decode_chunk_table_le, decode_header_le, encode_chunk_table_le, encode_header_le, ChunkEntry,
    FormatFlags, HeaderV1,
};
use crate::types::DeviceElement;
use crate::utils::compute_checksum;

/// Per-instance protocol state.
#[derive(Debug, Clone, PartialEq)]
enum Phase<C> {
    Created,
    Configured { input_size: usize, config: C },
    Executed,
}

impl<C: Copy> Phase<C> {
    /// Config for an execute call with `input_size`, or why it is not allowed.
    fn ready_for(&self, input_size: usize) -> Result<C> {
        match self {
            Phase::Configured { input_size: configured, config } if *configured == input_size => Ok(*config),
            Phase::Configured { input_size: configured, .. } => Err(DevcompError::invalid_value(format!(
                "configured for {} input bytes, called with {}",
                configured, input_size
            ))),
            Phase::Executed => Err(DevcompError::invalid_value(
                "instance already executed; configure it again before the next task",
            )),
            Phase::Created => Err(DevcompError::invalid_value("configure must be called before execute")),
        }
    }
}

fn checked_size(value: u64, what: &str) -> Result<usize> {
    usize::try_from(value)
        .map_err(|_| DevcompError::invalid_value(format!("{what} of {value} bytes is not addressable")))
}

// ---------------------------------------------------------------------------
// Compressor
// ---------------------------------------------------------------------------

/// Compressor for any `Codec`, configured once per input size.
#[derive(Debug)]
pub struct ChunkedCompressor {
    options: CodecOptions,
    params: KernelParams,
    phase: Phase<CompressConfig>,
}

impl ChunkedCompressor {
    /// Create a compressor. Options are validated here, not at configure.
    ///
    /// # Errors
    /// - `StatusCode::UnsupportedConfiguration` if the codec cannot satisfy
    ///   the options.
    pub fn new(options: CodecOptions) -> Result<Self> {
        let level = options.validate()?;
        Ok(Self {
            params: KernelParams { level, element: options.element() },
            options,
            phase: Phase::Created,
        })
    }

    /// Delta compressor for element type `T`.
    pub fn typed<T: DeviceElement>() -> Result<Self> {
        Self::new(CodecOptions::delta::<T>())
    }

    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    /// Pure sizing for `input_size` bytes.
    fn sizing(&self, input_size: usize) -> Result<CompressConfig> {
        let codec = self.options.codec();
        let chunk_size = self.options.chunk_size();
        let count = HeaderV1::chunks_for(input_size as u64, chunk_size);
        if count == 0 {
            return Ok(CompressConfig { temp_bytes: 0, max_output_bytes: HeaderV1::LEN });
        }

        let last_len = input_size - (count as usize - 1) * chunk_size;
        let full_bound = codec.max_compressed_chunk(chunk_size) as u64;
        let last_bound = codec.max_compressed_chunk(last_len) as u64;

        let payload = (count - 1) * full_bound + last_bound;
        let max_output = HeaderV1::LEN as u64 + count * CHUNK_ENTRY_LEN as u64 + payload;
        let temp = if codec.needs_staging() { count * full_bound } else { 0 };

        Ok(CompressConfig {
            temp_bytes: checked_size(temp, "workspace")?,
            max_output_bytes: checked_size(max_output, "output")?,
        })
    }
}

impl Compressor for ChunkedCompressor {
    fn configure(&mut self, input_size: usize) -> Result<CompressConfig> {
        self.phase = Phase::Created;

        if input_size as u64 > MAX_INPUT_SIZE {
            return Err(DevcompError::invalid_value(format!(
                "input of {} bytes exceeds the limit of {} bytes",
                input_size, MAX_INPUT_SIZE
            )));
        }

        let config = self.sizing(input_size)?;
        log::debug!(
            "{} compressor configured: input={} temp={} max_output={}",
            self.options.codec().name(),
            input_size,
            config.temp_bytes,
            config.max_output_bytes
        );
        self.phase = Phase::Configured { input_size, config };
        Ok(config)
    }

    fn compress_async(
        &mut self,
        input: &DevicePtr,
        input_size: usize,
        temp: &DevicePtr,
        temp_size: usize,
        output: &DevicePtr,
        output_size: OutputSize<'_>,
        stream: &Stream,
    ) -> Result<()> {
        let config = self.phase.ready_for(input_size)?;

        if temp_size < config.temp_bytes {
            return Err(DevcompError::invalid_value(format!(
                "temp buffer too small: {} < {} bytes",
                temp_size, config.temp_bytes
            )));
        }
        let capacity = output_size.capacity()?;
        if capacity < config.max_output_bytes {
            return Err(DevcompError::invalid_value(format!(
                "output buffer too small: {} < {} bytes",
                capacity, config.max_output_bytes
            )));
        }
        input.check_span(input_size, "input")?;
        temp.check_span(temp_size, "temp")?;
        output.check_span(capacity, "output")?;

        let job = CompressJob {
            codec: self.options.codec(),
            params: self.params,
            chunk_size: self.options.chunk_size(),
            checksum: self.options.checksum(),
            input: input.clone(),
            input_size,
            temp: temp.clone(),
            output: output.clone(),
        };

        match output_size {
            OutputSize::Pageable(out) => {
                *out = stream.enqueue_and_wait("compress", move || job.run())?;
            }
            OutputSize::Pinned(slot) => {
                let slot: Arc<Mutex<usize>> = slot.device_view();
                stream.enqueue("compress", move || {
                    let size = job.run()?;
                    let mut v = slot
                        .lock()
                        .map_err(|_| DevcompError::internal("pinned size slot poisoned"))?;
                    *v = size;
                    Ok(())
                })?;
            }
        }

        self.phase = Phase::Executed;
        Ok(())
    }
}

/// Everything the compression kernel needs, owned so it can cross threads.
struct CompressJob {
    codec: Codec,
    params: KernelParams,
    chunk_size: usize,
    checksum: bool,
    input: DevicePtr,
    input_size: usize,
    temp: DevicePtr,
    output: DevicePtr,
}

impl CompressJob {
    /// Kernel body. Returns the compressed size.
    fn run(self) -> Result<usize> {
        let input = self.input.read(self.input_size)?;
        let chunks: Vec<&[u8]> = input.chunks(self.chunk_size).collect();
        let slot_stride = self.codec.max_compressed_chunk(self.chunk_size);
        let payload_start = HeaderV1::LEN + chunks.len() * CHUNK_ENTRY_LEN;

        // Pass 1: compress every chunk, into its staging slot or straight out.
        let mut entries = Vec::with_capacity(chunks.len());
        let mut cursor = payload_start;
        let mut buf = Vec::with_capacity(slot_stride);
        for (i, chunk) in chunks.iter().enumerate() {
            buf.clear();
            self.codec.compress_chunk(&self.params, chunk, &mut buf)?;
            if buf.len() > self.codec.max_compressed_chunk(chunk.len()) {
                return Err(DevcompError::internal(format!(
                    "{} chunk {} compressed past its bound ({} bytes)",
                    self.codec.name(),
                    i,
                    buf.len()
                )));
            }

            if self.codec.needs_staging() {
                self.temp.add(i * slot_stride).write(&buf)?;
            } else {
                self.output.add(cursor).write(&buf)?;
            }

            entries.push(ChunkEntry {
                compressed_len: buf.len() as u32,
                crc32: if self.checksum { compute_checksum(chunk) } else { 0 },
            });
            cursor += buf.len();
        }

        // Pass 2: gather staged chunks behind the chunk table.
        if self.codec.needs_staging() {
            let mut cursor = payload_start;
            for (i, entry) in entries.iter().enumerate() {
                let len = entry.compressed_len as usize;
                let staged = self.temp.add(i * slot_stride).read(len)?;
                self.output.add(cursor).write(&staged)?;
                cursor += len;
            }
        }

        let mut flags = FormatFlags::empty();
        if self.checksum {
            flags |= FormatFlags::HAS_CHECKSUMS;
        }
        let header = HeaderV1 {
            codec: self.codec as u16,
            element: self.params.element.map(|t| t as u8).unwrap_or(NO_ELEMENT_TAG),
            flags: flags.bits(),
            chunk_size: self.chunk_size as u32,
            uncompressed_size: self.input_size as u64,
            compressed_size: cursor as u64,
            chunk_count: entries.len() as u32,
            ..Default::default()
        };
        self.output.write(&encode_header_le(&header))?;
        self.output.add(HeaderV1::LEN).write(&encode_chunk_table_le(&entries))?;

        log::trace!(
            "{} kernel: {} -> {} bytes in {} chunks",
            self.codec.name(),
            self.input_size,
            cursor,
            entries.len()
        );
        Ok(cursor)
    }
}

// ---------------------------------------------------------------------------
// Decompressor
// ---------------------------------------------------------------------------

/// Decompressor for any stream produced by `ChunkedCompressor`.
/// The codec is read from the stream metadata.
#[derive(Debug)]
pub struct ChunkedDecompressor {
    phase: Phase<DecompressConfig>,
    header: Option<HeaderV1>,
}

impl ChunkedDecompressor {
    pub fn new() -> Self {
        Self { phase: Phase::Created, header: None }
    }

    /// Metadata read by the last successful `configure`.
    pub fn header(&self) -> Option<&HeaderV1> {
        self.header.as_ref()
    }
}

impl Default for ChunkedDecompressor {
    fn default() -> Self {
        Self::new()
    }
}

impl Decompressor for ChunkedDecompressor {
    fn configure(&mut self, input: &DevicePtr, input_size: usize, stream: &Stream) -> Result<DecompressConfig> {
        self.phase = Phase::Created;
        self.header = None;

        if input.is_null() {
            return Err(DevcompError::invalid_value("input pointer is null"));
        }
        if input_size < HeaderV1::LEN {
            return Err(DevcompError::cannot_decompress(format!(
                "input of {} bytes is too small for metadata ({} bytes)",
                input_size,
                HeaderV1::LEN
            )));
        }
        input.check_span(input_size, "input")?;

        // Ordered after prior writes to `input` on this stream; we wait for it.
        let src = input.clone();
        let raw = stream.enqueue_and_wait("read_metadata", move || src.read(HeaderV1::LEN))?;
        let header = decode_header_le(&raw)?;

        if header.compressed_size > input_size as u64 {
            return Err(DevcompError::cannot_decompress(format!(
                "metadata describes {} compressed bytes, input holds {}",
                header.compressed_size, input_size
            )));
        }

        let src = input.add(HeaderV1::LEN);
        let table_len = header.table_len();
        let table = stream.enqueue_and_wait("read_chunk_table", move || src.read(table_len))?;
        let entries = decode_chunk_table_le(&table, header.chunk_count as usize)?;
        check_chunk_table(&header, &entries)?;

        let config = DecompressConfig {
            temp_bytes: header.chunk_count as usize * CHUNK_OFFSET_LEN,
            output_bytes: checked_size(header.uncompressed_size, "output")?,
        };
        log::debug!(
            "decompressor configured: codec={} input={} temp={} output={}",
            header.codec,
            input_size,
            config.temp_bytes,
            config.output_bytes
        );

        self.phase = Phase::Configured { input_size, config };
        self.header = Some(header);
        Ok(config)
    }

    fn decompress_async(
        &mut self,
        input: &DevicePtr,
        input_size: usize,
        temp: &DevicePtr,
        temp_size: usize,
        output: &DevicePtr,
        output_size: usize,
        stream: &Stream,
    ) -> Result<()> {
        let config = self.phase.ready_for(input_size)?;
        let header = self
            .header
            .clone()
            .ok_or_else(|| DevcompError::internal("configured decompressor without metadata"))?;

        if temp_size < config.temp_bytes {
            return Err(DevcompError::invalid_value(format!(
                "temp buffer too small: {} < {} bytes",
                temp_size, config.temp_bytes
            )));
        }
        if output_size < config.output_bytes {
            return Err(DevcompError::invalid_value(format!(
                "output buffer too small: {} < {} bytes",
                output_size, config.output_bytes
            )));
        }
        input.check_span(input_size, "input")?;
        temp.check_span(temp_size, "temp")?;
        output.check_span(output_size, "output")?;

        let job = DecompressJob {
            header,
            input: input.clone(),
            temp: temp.clone(),
            output: output.clone(),
        };
        stream.enqueue("decompress", move || job.run())?;

        self.phase = Phase::Executed;
        Ok(())
    }
}

/// Chunk payloads must exactly fill the stream after the table.
fn check_chunk_table(header: &HeaderV1, entries: &[ChunkEntry]) -> Result<()> {
    let payload: u64 = entries.iter().map(|e| e.compressed_len as u64).sum();
    let covered = (HeaderV1::LEN + header.table_len()) as u64 + payload;
    if covered != header.compressed_size {
        return Err(DevcompError::cannot_decompress(format!(
            "chunk table covers {} bytes, metadata says {}",
            covered, header.compressed_size
        )));
    }
    Ok(())
}

struct DecompressJob {
    header: HeaderV1,
    input: DevicePtr,
    temp: DevicePtr,
    output: DevicePtr,
}

impl DecompressJob {
    fn run(self) -> Result<()> {
        let compressed_size = self.header.compressed_size as usize;
        let compressed = self.input.read(compressed_size)?;

        let header = decode_header_le(&compressed)?;
        if header != self.header {
            return Err(DevcompError::cannot_decompress("metadata changed after configure"));
        }
        let codec = header.codec()?;
        let params = KernelParams { level: 0, element: header.element_type()? };
        let count = header.chunk_count as usize;
        let entries = decode_chunk_table_le(&compressed[HeaderV1::LEN..], count)?;

        // Input may have been rewritten since configure.
        check_chunk_table(&header, &entries)?;

        // Chunk offsets go to the workspace, one u64 per chunk.
        let mut offset = HeaderV1::LEN + header.table_len();
        for (i, entry) in entries.iter().enumerate() {
            self.temp.add(i * CHUNK_OFFSET_LEN).write(&(offset as u64).to_le_bytes())?;
            offset += entry.compressed_len as usize;
        }

        let verify = header.format_flags().contains(FormatFlags::HAS_CHECKSUMS);
        let mut out = Vec::with_capacity(header.chunk_size as usize);
        for (i, entry) in entries.iter().enumerate() {
            let raw_offset = self.temp.add(i * CHUNK_OFFSET_LEN).read(CHUNK_OFFSET_LEN)?;
            let mut b = [0u8; 8];
            b.copy_from_slice(&raw_offset);
            let start = u64::from_le_bytes(b) as usize;
            let src = &compressed[start..start + entry.compressed_len as usize];

            let expected = header.chunk_len(i);
            out.clear();
            codec.decompress_chunk(&params, src, expected, &mut out)?;
            if out.len() != expected {
                return Err(DevcompError::cannot_decompress(format!(
                    "chunk {} decoded to {} bytes, expected {}",
                    i,
                    out.len(),
                    expected
                )));
            }
            if verify && compute_checksum(&out) != entry.crc32 {
                return Err(DevcompError::bad_checksum(format!("chunk {} checksum mismatch", i)));
            }

            self.output.add(i * header.chunk_size as usize).write(&out)?;
        }

        log::trace!(
            "{} kernel: {} -> {} bytes in {} chunks",
            codec.name(),
            compressed_size,
            header.uncompressed_size,
            count
        );
        Ok(())
    }
}
