//! Streaming WAV writer with speculative header patching.
//!
//! The seekable writer emits the container header with zeroed size fields,
//! streams frames, and patches the RIFF and data sizes on [`finalize`].
//! [`write_wav`] is the one-shot alternative for callers who know every
//! sample up front; it needs only `Write` because the sizes are exact from
//! the start.
//!
//! Output is always a classic RIFF container with a 16-byte `fmt ` chunk;
//! use [`max_num_frames`] to size recordings against the 32-bit limit.
//!
//! [`finalize`]: WavWriter::finalize
//! [`write_wav`]: write_wav

use std::io::{Seek, SeekFrom, Write};

use crate::bytes::WriteLe;
use crate::error::{WavError, WavResult};
use crate::fmt::FormatCode;
use crate::sample::{encode_frame, Sample, SampleLayout};
use crate::types::{FormatSpec, SampleEncoding};

// Bytes the RIFF size covers besides the data payload: the WAVE id, the
// fmt chunk with its header, and the data chunk header.
const HEADER_OVERHEAD: u64 = 4 + 24 + 8;

fn derive_encoding(spec: &FormatSpec) -> SampleEncoding {
    if spec.bit_depth == 64 {
        SampleEncoding::IeeeFloat
    } else {
        SampleEncoding::IntegerPcm
    }
}

fn write_fmt_chunk<W: Write>(
    sink: &mut W,
    spec: &FormatSpec,
    encoding: SampleEncoding,
) -> std::io::Result<()> {
    let format_code = match encoding {
        SampleEncoding::IntegerPcm => FormatCode::Pcm,
        SampleEncoding::IeeeFloat => FormatCode::IeeeFloat,
    };
    sink.write_tag(b"fmt ")?;
    sink.write_le_u32(16)?;
    sink.write_le_u16(format_code.as_u16())?;
    sink.write_le_u16(spec.num_channels)?;
    sink.write_le_u32(spec.sample_rate)?;
    sink.write_le_u32((spec.sample_rate as u64 * spec.frame_size() as u64) as u32)?;
    sink.write_le_u16(spec.frame_size() as u16)?;
    sink.write_le_u16(spec.bit_depth)?;
    Ok(())
}

/// Largest frame count a classic RIFF container can hold for `spec`
/// before the 32-bit RIFF size field overflows.
pub fn max_num_frames(spec: &FormatSpec) -> u32 {
    let frame_size = spec.frame_size() as u64;
    if frame_size == 0 {
        return 0;
    }
    ((u32::MAX as u64 - HEADER_OVERHEAD) / frame_size) as u32
}

/// Incremental WAV writer over a seekable sink.
///
/// Created via [`create`] or [`create_with_encoding`]; frames stream out as
/// they are written and the header is completed by [`finalize`]. Dropping
/// an unfinalized writer leaves zeroed size fields in the output.
///
/// [`create`]: WavWriter::create
/// [`create_with_encoding`]: WavWriter::create_with_encoding
/// [`finalize`]: WavWriter::finalize
#[derive(Debug)]
pub struct WavWriter<W: Write + Seek> {
    sink: W,
    spec: FormatSpec,
    layout: SampleLayout,
    frame_buf: Vec<u8>,
    frames_written: u64,
    data_bytes_written: u64,
    riff_size_offset: u64,
    data_size_offset: u64,
    finalized: bool,
}

impl<W: Write + Seek> WavWriter<W> {
    /// Starts a WAV stream on `sink`, deriving the encoding from the bit
    /// depth: 64-bit is IEEE float, everything else integer PCM.
    pub fn create(sink: W, spec: FormatSpec) -> WavResult<Self> {
        let encoding = derive_encoding(&spec);
        Self::create_with_encoding(sink, spec, encoding)
    }

    /// Starts a WAV stream with an explicit encoding, e.g. 32-bit float
    /// output where [`create`] would pick 32-bit PCM.
    ///
    /// [`create`]: WavWriter::create
    pub fn create_with_encoding(
        mut sink: W,
        spec: FormatSpec,
        encoding: SampleEncoding,
    ) -> WavResult<Self> {
        spec.validate()?;
        let layout = SampleLayout::from_format(encoding, spec.bit_depth)?;

        sink.write_tag(b"RIFF")?;
        let riff_size_offset = sink.stream_position()?;
        sink.write_le_u32(0)?;
        sink.write_tag(b"WAVE")?;
        write_fmt_chunk(&mut sink, &spec, encoding)?;
        sink.write_tag(b"data")?;
        let data_size_offset = sink.stream_position()?;
        sink.write_le_u32(0)?;

        Ok(WavWriter {
            sink,
            frame_buf: vec![0u8; spec.frame_size()],
            spec,
            layout,
            frames_written: 0,
            data_bytes_written: 0,
            riff_size_offset,
            data_size_offset,
            finalized: false,
        })
    }

    pub const fn format_spec(&self) -> &FormatSpec {
        &self.spec
    }

    pub const fn frames_written(&self) -> u64 {
        self.frames_written
    }

    pub const fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Encodes and writes one frame.
    ///
    /// Uses `min(frame.len(), num_channels)` input values; extra values are
    /// ignored and missing trailing channels encode as silence.
    pub fn write_frame<T: Sample>(&mut self, frame: &[T]) -> WavResult<()> {
        if self.finalized {
            return Err(WavError::structural(
                "write after finalize",
                self.data_size_offset + 4 + self.data_bytes_written,
            ));
        }
        encode_frame(
            frame,
            self.layout,
            self.spec.num_channels as usize,
            &mut self.frame_buf,
        );
        self.sink.write_all(&self.frame_buf)?;
        self.frames_written += 1;
        self.data_bytes_written += self.frame_buf.len() as u64;
        Ok(())
    }

    /// Writes interleaved frames from a flat slice, whose length must be a
    /// multiple of the channel count.
    pub fn write_frames<T: Sample>(&mut self, samples: &[T]) -> WavResult<()> {
        let channels = self.spec.num_channels as usize;
        if samples.len() % channels != 0 {
            return Err(WavError::structural(
                format!(
                    "{} samples is not a whole number of {}-channel frames",
                    samples.len(),
                    channels
                ),
                self.data_size_offset + 4 + self.data_bytes_written,
            ));
        }
        for frame in samples.chunks(channels) {
            self.write_frame(frame)?;
        }
        Ok(())
    }

    /// Completes the container: appends the pad byte when the data payload
    /// is odd, patches the RIFF and data size fields, and flushes.
    ///
    /// Idempotent; only the first call does any work.
    pub fn finalize(&mut self) -> WavResult<()> {
        if self.finalized {
            return Ok(());
        }

        let pad = self.data_bytes_written & 1;
        if pad == 1 {
            self.sink.write_all(&[0])?;
        }

        let riff_size = HEADER_OVERHEAD + self.data_bytes_written + pad;
        if riff_size > u32::MAX as u64 || self.data_bytes_written > u32::MAX as u64 {
            return Err(WavError::unsupported(format!(
                "{} data bytes overflow a RIFF container",
                self.data_bytes_written
            )));
        }

        let end = self.sink.stream_position()?;
        self.sink.seek(SeekFrom::Start(self.riff_size_offset))?;
        self.sink.write_le_u32(riff_size as u32)?;
        self.sink.seek(SeekFrom::Start(self.data_size_offset))?;
        self.sink.write_le_u32(self.data_bytes_written as u32)?;
        self.sink.seek(SeekFrom::Start(end))?;
        self.sink.flush()?;

        self.finalized = true;
        Ok(())
    }
}

impl<W: Write + Seek> Drop for WavWriter<W> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        if !self.finalized {
            eprintln!("WavWriter dropped without finalize(); output header sizes are zero");
        }
    }
}

/// Writes a complete WAV file in one pass over a plain `Write` sink.
///
/// All sizes are known up front, so no seeking or patching is needed.
/// `samples` are interleaved frames; the length must be a multiple of the
/// channel count, and the encoding is derived as in [`WavWriter::create`].
pub fn write_wav<W: Write, T: Sample>(
    mut sink: W,
    spec: FormatSpec,
    samples: &[T],
) -> WavResult<()> {
    spec.validate()?;
    let encoding = derive_encoding(&spec);
    let layout = SampleLayout::from_format(encoding, spec.bit_depth)?;

    let channels = spec.num_channels as usize;
    if samples.len() % channels != 0 {
        return Err(WavError::structural(
            format!(
                "{} samples is not a whole number of {}-channel frames",
                samples.len(),
                channels
            ),
            0,
        ));
    }

    let data_size = (samples.len() / channels) as u64 * spec.frame_size() as u64;
    if data_size > u32::MAX as u64 - HEADER_OVERHEAD {
        return Err(WavError::unsupported(format!(
            "{} data bytes overflow a RIFF container",
            data_size
        )));
    }
    let pad = data_size & 1;
    let riff_size = (HEADER_OVERHEAD + data_size + pad) as u32;

    sink.write_tag(b"RIFF")?;
    sink.write_le_u32(riff_size)?;
    sink.write_tag(b"WAVE")?;
    write_fmt_chunk(&mut sink, &spec, encoding)?;
    sink.write_tag(b"data")?;
    sink.write_le_u32(data_size as u32)?;

    let mut frame_buf = vec![0u8; spec.frame_size()];
    for frame in samples.chunks(channels) {
        encode_frame(frame, layout, channels, &mut frame_buf);
        sink.write_all(&frame_buf)?;
    }
    if pad == 1 {
        sink.write_all(&[0])?;
    }
    sink.flush()?;
    Ok(())
}
