// Correctness and logic
#![warn(clippy::unit_cmp)] // Detects comparing unit types
#![warn(clippy::match_same_arms)] // Duplicate match arms
#![allow(clippy::result_large_err)] // Allow large error types for comprehensive error handling
#![allow(clippy::collapsible_if)] // Sometimes clearer to have separate conditions
#![allow(clippy::unnecessary_cast)] // Explicit casts for clarity
#![allow(clippy::identity_op)] // Explicit operations for clarity
//
// Performance-focused
#![warn(clippy::inefficient_to_string)] // `format!("{}", x)` vs `x.to_string()`
#![warn(clippy::map_clone)] // Cloning inside `map()` unnecessarily
#![warn(clippy::unnecessary_to_owned)] // Detects redundant `.to_owned()` or `.clone()`
#![warn(clippy::large_stack_arrays)] // Helps avoid stack overflows
#![warn(clippy::needless_collect)] // Avoids `.collect().iter()` chains
//
// Style and idiomatic Rust
#![warn(clippy::redundant_clone)] // Detects unnecessary `.clone()`
#![warn(clippy::needless_return)] // Avoids `return` at the end of functions
#![warn(clippy::manual_map)] // Use `.map()` instead of manual `match`
#![warn(clippy::unwrap_used)] // Avoids using `unwrap()`
#![warn(clippy::panic)] // Avoids using `panic!` in production code
//
// Maintainability
#![warn(clippy::missing_panics_doc)] // Docs for functions that might panic
#![warn(clippy::missing_safety_doc)] // Docs for `unsafe` functions

//! Streaming codec for RIFF and RF64 WAV containers.
//!
//! The reader works over any [`std::io::Read`] source without seeking, so
//! pipes and sockets work the same as files; RF64 `ds64` size overrides,
//! WAVE_FORMAT_EXTENSIBLE sub-format GUIDs and `fact` frame counts are all
//! resolved during [`WavReader::open`]. Samples convert on the fly between
//! the on-disk layout (8/16/24/32-bit PCM, 32/64-bit IEEE float) and the
//! caller's `i16`, `f32` or `f64` buffers.
//!
//! Writing comes in two shapes: [`WavWriter`] streams frames to a seekable
//! sink and patches the header sizes on `finalize`, while [`write_wav`]
//! emits a complete file in one pass over a plain `Write` sink.
//!
//! ```no_run
//! use wavstream::FormatSpec;
//!
//! # fn main() -> wavstream::WavResult<()> {
//! let spec = FormatSpec::new(2, 44_100, 16);
//! let mut writer = wavstream::create("out.wav", spec)?;
//! writer.write_frame(&[1000i16, -1000])?;
//! writer.finalize()?;
//!
//! let mut reader = wavstream::open("out.wav")?;
//! let mut frame = [0i16; 2];
//! while reader.read_frame(&mut frame)? {
//!     // process one frame
//! }
//! # Ok(())
//! # }
//! ```

mod bytes;

pub mod chunks;
pub mod ds64;
pub mod error;
pub mod fmt;
pub mod reader;
pub mod sample;
pub mod types;
pub mod writer;

use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};

pub use crate::{
    chunks::ContainerKind,
    error::{WavError, WavResult},
    reader::{read_all_frames, WavReader},
    sample::{Sample, SampleLayout},
    types::{FormatSpec, SampleEncoding},
    writer::{max_num_frames, write_wav, WavWriter},
};

// Public API

/// Open a WAV file for streaming reads.
pub fn open<P: AsRef<Path>>(path: P) -> WavResult<WavReader<BufReader<File>>> {
    WavReader::open(BufReader::new(File::open(path)?))
}

/// Create a WAV file for streaming writes.
///
/// The encoding is derived from the bit depth as in [`WavWriter::create`];
/// remember to call [`WavWriter::finalize`] before dropping the writer.
pub fn create<P: AsRef<Path>>(path: P, spec: FormatSpec) -> WavResult<WavWriter<BufWriter<File>>> {
    WavWriter::create(BufWriter::new(File::create(path)?), spec)
}

/// Read an entire WAV file into an interleaved sample vector.
pub fn read<P: AsRef<Path>, T: Sample>(path: P) -> WavResult<(FormatSpec, Vec<T>)> {
    let mut reader = open(path)?;
    let spec = *reader.format_spec();
    let channels = spec.num_channels as usize;
    let mut samples = Vec::with_capacity((reader.total_frames() as usize) * channels);
    let mut frame = vec![T::default(); channels];
    while reader.read_frame(&mut frame)? {
        samples.extend_from_slice(&frame);
    }
    Ok((spec, samples))
}

/// Write interleaved samples as a complete WAV file.
pub fn write<P: AsRef<Path>, T: Sample>(
    path: P,
    spec: FormatSpec,
    samples: &[T],
) -> WavResult<()> {
    write_wav(BufWriter::new(File::create(path)?), spec, samples)
}

#[cfg(test)]
mod lib_tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("wavstream_{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_file_roundtrip() {
        let path = temp_path("roundtrip.wav");
        let spec = FormatSpec::new(2, 48_000, 16);
        let samples: Vec<i16> = vec![100, -100, 200, -200, 300, -300];
        write(&path, spec, &samples).unwrap();

        let (read_spec, read_samples) = read::<_, i16>(&path).unwrap();
        assert_eq!(read_spec, spec);
        assert_eq!(read_samples, samples);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_streaming_file_writer() {
        let path = temp_path("streamed.wav");
        let spec = FormatSpec::new(1, 8_000, 24);
        let mut writer = create(&path, spec).unwrap();
        for value in [-1.0f32, -0.5, 0.0, 0.5, 1.0] {
            writer.write_frame(&[value]).unwrap();
        }
        writer.finalize().unwrap();
        drop(writer);

        let mut reader = open(&path).unwrap();
        assert_eq!(reader.total_frames(), 5);
        assert_eq!(reader.encoding(), SampleEncoding::IntegerPcm);
        let mut collected = Vec::new();
        reader
            .read_frames::<f32, 1>(|frame| collected.push(frame[0]))
            .unwrap();
        assert_eq!(collected.len(), 5);
        for (got, want) in collected.iter().zip([-1.0f32, -0.5, 0.0, 0.5, 1.0]) {
            assert!((got - want).abs() < 1.0 / 8_388_607.0, "{} vs {}", got, want);
        }

        std::fs::remove_file(&path).unwrap();
    }
}
