//! WAV encoding and decoding for mono buffers.

use crate::FormatError;
use chirp_ir::SampleBuffer;
use std::io::Write;

const FORMAT_PCM: u16 = 1;
const FORMAT_FLOAT: u16 = 3;

// --- Writing ---

/// Write `buffer` as a 16-bit mono PCM WAV. Samples are clamped to ±1.
///
/// Fails with `InvalidInput` before writing anything if the sizes or the
/// byte rate do not fit the 32-bit header fields.
pub fn write_wav(w: &mut impl Write, buffer: &SampleBuffer) -> std::io::Result<()> {
    let num_channels: u16 = 1;
    let bits_per_sample: u16 = 16;
    let block_align = num_channels * (bits_per_sample / 8);
    let data_size = u32::try_from(buffer.len())
        .ok()
        .and_then(|len| len.checked_mul(block_align as u32))
        .ok_or_else(|| too_large("data size"))?;
    let riff_size = data_size.checked_add(36).ok_or_else(|| too_large("file size"))?;
    let byte_rate = buffer
        .sample_rate()
        .checked_mul(block_align as u32)
        .ok_or_else(|| too_large("byte rate"))?;

    write_riff_header(w, riff_size)?;
    write_fmt_chunk(w, num_channels, buffer.sample_rate(), byte_rate, block_align, bits_per_sample)?;
    write_data_chunk(w, buffer.samples(), data_size)
}

fn too_large(field: &str) -> std::io::Error {
    std::io::Error::new(
        std::io::ErrorKind::InvalidInput,
        format!("{field} does not fit a WAV header"),
    )
}

/// In-memory `write_wav`. A buffer too large for the header yields no bytes.
pub fn buffer_to_wav(buffer: &SampleBuffer) -> Vec<u8> {
    let mut buf = Vec::with_capacity(44 + buffer.len() * 2);
    // Only the header size checks can fail, and they fail before any write.
    let _ = write_wav(&mut buf, buffer);
    buf
}

fn write_riff_header(w: &mut impl Write, riff_size: u32) -> std::io::Result<()> {
    w.write_all(b"RIFF")?;
    w.write_all(&riff_size.to_le_bytes())?;
    w.write_all(b"WAVE")
}

fn write_fmt_chunk(
    w: &mut impl Write,
    num_channels: u16,
    sample_rate: u32,
    byte_rate: u32,
    block_align: u16,
    bits_per_sample: u16,
) -> std::io::Result<()> {
    w.write_all(b"fmt ")?;
    w.write_all(&16u32.to_le_bytes())?;
    w.write_all(&FORMAT_PCM.to_le_bytes())?;
    w.write_all(&num_channels.to_le_bytes())?;
    w.write_all(&sample_rate.to_le_bytes())?;
    w.write_all(&byte_rate.to_le_bytes())?;
    w.write_all(&block_align.to_le_bytes())?;
    w.write_all(&bits_per_sample.to_le_bytes())
}

fn write_data_chunk(w: &mut impl Write, samples: &[f32], data_size: u32) -> std::io::Result<()> {
    w.write_all(b"data")?;
    w.write_all(&data_size.to_le_bytes())?;
    for &s in samples {
        let v = (s.clamp(-1.0, 1.0) * 32767.0).round() as i16;
        w.write_all(&v.to_le_bytes())?;
    }
    Ok(())
}

// --- Reading ---

/// Decode a WAV file into a mono buffer.
///
/// Accepts 8/16/24-bit PCM and 32-bit float. Multi-channel files are
/// mixed down by averaging each frame.
pub fn load_wav(data: &[u8]) -> Result<SampleBuffer, FormatError> {
    let header = parse_header(data)?;
    let samples = read_samples(data, &header)?;
    Ok(SampleBuffer::new(samples, header.sample_rate))
}

struct WavHeader {
    format: u16,
    num_channels: u16,
    sample_rate: u32,
    bits_per_sample: u16,
    data_offset: usize,
    data_size: usize,
}

fn parse_header(data: &[u8]) -> Result<WavHeader, FormatError> {
    if data.len() < 12 {
        return Err(FormatError::UnexpectedEof);
    }
    if &data[0..4] != b"RIFF" || &data[8..12] != b"WAVE" {
        return Err(FormatError::InvalidHeader);
    }

    let mut pos = 12;
    let mut fmt: Option<(u16, u16, u32, u16)> = None;
    let mut data_chunk: Option<(usize, usize)> = None;

    while pos + 8 <= data.len() {
        let chunk_id = &data[pos..pos + 4];
        let chunk_size = read_u32_le(data, pos + 4) as usize;

        if chunk_id == b"fmt " {
            if chunk_size < 16 || pos + 24 > data.len() {
                return Err(FormatError::UnexpectedEof);
            }
            let format = read_u16_le(data, pos + 8);
            let channels = read_u16_le(data, pos + 10);
            let rate = read_u32_le(data, pos + 12);
            let bits = read_u16_le(data, pos + 22);
            fmt = Some((format, channels, rate, bits));
        } else if chunk_id == b"data" {
            data_chunk = Some((pos + 8, chunk_size));
        }

        pos = pos.saturating_add(8).saturating_add(chunk_size);
        if pos % 2 != 0 {
            pos += 1;
        }
    }

    let (format, num_channels, sample_rate, bits_per_sample) =
        fmt.ok_or(FormatError::InvalidHeader)?;
    let (data_offset, data_size) = data_chunk.ok_or(FormatError::InvalidHeader)?;

    if sample_rate == 0 || num_channels == 0 {
        return Err(FormatError::InvalidHeader);
    }
    match (format, bits_per_sample) {
        (FORMAT_PCM, 8 | 16 | 24) | (FORMAT_FLOAT, 32) => {}
        _ => {
            return Err(FormatError::Unsupported(format!(
                "format {} with {} bits per sample",
                format, bits_per_sample
            )))
        }
    }

    Ok(WavHeader {
        format,
        num_channels,
        sample_rate,
        bits_per_sample,
        data_offset,
        data_size,
    })
}

fn read_samples(data: &[u8], header: &WavHeader) -> Result<Vec<f32>, FormatError> {
    let end = header.data_offset.saturating_add(header.data_size).min(data.len());
    let raw = data.get(header.data_offset..end).ok_or(FormatError::UnexpectedEof)?;

    let bytes = (header.bits_per_sample / 8) as usize;
    let channels = header.num_channels as usize;
    let frame_bytes = bytes * channels;

    let decode: fn(&[u8]) -> f32 = match (header.format, header.bits_per_sample) {
        (FORMAT_FLOAT, _) => |b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]),
        (_, 8) => |b| (b[0] as f32 - 128.0) / 128.0,
        (_, 16) => |b| i16::from_le_bytes([b[0], b[1]]) as f32 / 32768.0,
        _ => |b| {
            let v = i32::from_le_bytes([0, b[0], b[1], b[2]]) >> 8;
            v as f32 / 8_388_608.0
        }
    };

    let samples = raw
        .chunks_exact(frame_bytes)
        .map(|frame| {
            let sum: f32 = frame.chunks_exact(bytes).map(decode).sum();
            sum / channels as f32
        })
        .collect();
    Ok(samples)
}

fn read_u16_le(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

fn read_u32_le(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([data[offset], data[offset + 1], data[offset + 2], data[offset + 3]])
}
