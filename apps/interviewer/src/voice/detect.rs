//! Energy-based speech detection over a recorded WAV clip.
//!
//! Mirrors a live microphone listen: the first second calibrates the ambient
//! noise floor, speech must start within the wait window, and the phrase ends
//! at the first sustained pause or at the phrase limit.

use std::io::Cursor;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::voice::ListenError;

const FRAME_MS: u32 = 20;
/// Speech must be this many times louder than the ambient floor.
const ENERGY_RATIO: f32 = 2.0;
/// Floor for the threshold so digital silence never counts as speech.
const MIN_THRESHOLD: f32 = 0.01;
/// Accepted sample rates, inclusive.
const MIN_SAMPLE_RATE: u32 = 8_000;
const MAX_SAMPLE_RATE: u32 = 192_000;

/// Timing bounds of one listen.
#[derive(Debug, Clone, Copy)]
pub struct ListenWindow {
    pub calibration_ms: u32,
    pub wait_timeout_ms: u32,
    pub phrase_limit_ms: u32,
    pub pause_ms: u32,
}

impl Default for ListenWindow {
    fn default() -> Self {
        Self {
            calibration_ms: 1_000,
            wait_timeout_ms: 30_000,
            phrase_limit_ms: 60_000,
            pause_ms: 800,
        }
    }
}

/// The isolated phrase, re-encoded as 16-bit mono WAV.
#[derive(Debug)]
pub struct Phrase {
    pub wav: Vec<u8>,
    pub onset_secs: f32,
    pub duration_secs: f32,
}

fn frames(ms: u32) -> usize {
    (ms / FRAME_MS) as usize
}

/// Finds the spoken phrase in `clip`. `Ok(None)` means no speech started
/// within the wait window.
pub fn isolate_phrase(clip: &[u8], window: &ListenWindow) -> Result<Option<Phrase>, ListenError> {
    let reader = WavReader::new(Cursor::new(clip))
        .map_err(|e| ListenError::InvalidAudio(e.to_string()))?;
    let spec = reader.spec();
    if !(MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&spec.sample_rate) {
        return Err(ListenError::InvalidAudio(format!(
            "unsupported sample rate {} Hz",
            spec.sample_rate
        )));
    }
    let mono = decode_mono(reader)?;

    let frame_len = ((u64::from(spec.sample_rate) * u64::from(FRAME_MS) / 1000) as usize).max(1);
    let energy: Vec<f32> = mono.chunks(frame_len).map(rms).collect();

    let calibration = frames(window.calibration_ms).min(energy.len());
    let ambient = if calibration == 0 {
        0.0
    } else {
        energy[..calibration].iter().sum::<f32>() / calibration as f32
    };
    let threshold = (ambient * ENERGY_RATIO).max(MIN_THRESHOLD);

    let wait_end = (calibration + frames(window.wait_timeout_ms)).min(energy.len());
    let Some(onset) = (calibration..wait_end).find(|&i| energy[i] > threshold) else {
        return Ok(None);
    };

    let limit = (onset + frames(window.phrase_limit_ms)).min(energy.len());
    let pause = frames(window.pause_ms).max(1);
    let mut end = limit;
    let mut silent = 0;
    for (i, e) in energy.iter().enumerate().take(limit).skip(onset) {
        if *e > threshold {
            silent = 0;
        } else {
            silent += 1;
            if silent >= pause {
                end = i + 1 - silent;
                break;
            }
        }
    }

    let start_sample = onset * frame_len;
    let end_sample = (end * frame_len).min(mono.len());
    let wav = encode_wav(&mono[start_sample..end_sample], spec.sample_rate)?;

    Ok(Some(Phrase {
        wav,
        onset_secs: start_sample as f32 / spec.sample_rate as f32,
        duration_secs: (end_sample - start_sample) as f32 / spec.sample_rate as f32,
    }))
}

/// Decodes every sample to f32 in [-1, 1] and averages channels.
fn decode_mono<R: std::io::Read>(mut reader: WavReader<R>) -> Result<Vec<f32>, ListenError> {
    let spec = reader.spec();
    let invalid = |e: hound::Error| ListenError::InvalidAudio(e.to_string());

    let samples: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(invalid)?,
        SampleFormat::Int => {
            if !(1..=32).contains(&spec.bits_per_sample) {
                return Err(ListenError::InvalidAudio(format!(
                    "unsupported sample width {} bits",
                    spec.bits_per_sample
                )));
            }
            let scale = (1_i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()
                .map_err(invalid)?
        }
    };

    let channels = spec.channels.max(1) as usize;
    Ok(samples
        .chunks(channels)
        .map(|c| c.iter().sum::<f32>() / c.len() as f32)
        .collect())
}

fn rms(frame: &[f32]) -> f32 {
    if frame.is_empty() {
        return 0.0;
    }
    (frame.iter().map(|s| s * s).sum::<f32>() / frame.len() as f32).sqrt()
}

fn encode_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>, ListenError> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let invalid = |e: hound::Error| ListenError::InvalidAudio(e.to_string());

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, spec).map_err(invalid)?;
        for s in samples {
            let v = (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            writer.write_sample(v).map_err(invalid)?;
        }
        writer.finalize().map_err(invalid)?;
    }
    Ok(cursor.into_inner())
}
