//! OGG/Opus decoding and WAV encoding.
//!
//! Opus always decodes at 48 kHz; the channel count and the number of
//! priming samples to discard come from the OpusHead packet at the start of
//! the stream.

use std::io::Cursor;

use audiopus::coder::Decoder;
use audiopus::{Channels, SampleRate};
use hound::{SampleFormat, WavSpec, WavWriter};
use ogg::PacketReader;

use parley_core::error::{ParleyError, Result};

/// Opus output sample rate.
const OPUS_SAMPLE_RATE: u32 = 48_000;

/// Largest possible Opus frame: 120 ms at 48 kHz, per channel.
const MAX_FRAME_SAMPLES: usize = 5_760;

/// Fields of the OpusHead identification packet that decoding needs.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct OpusHead {
    pub channels: u8,
    pub pre_skip: u16,
}

/// Parse the OpusHead identification packet (RFC 7845 §5.1).
pub(crate) fn parse_opus_head(data: &[u8]) -> Result<OpusHead> {
    if data.len() < 19 || &data[..8] != b"OpusHead" {
        return Err(ParleyError::Audio(
            "stream does not start with an OpusHead packet".into(),
        ));
    }

    let channels = data[9];
    if channels == 0 || channels > 2 {
        return Err(ParleyError::Audio(format!(
            "unsupported channel count: {}",
            channels
        )));
    }

    let pre_skip = u16::from_le_bytes([data[10], data[11]]);
    Ok(OpusHead { channels, pre_skip })
}

/// Decode an OGG/Opus payload into an in-memory WAV file.
///
/// The output is interleaved 16-bit PCM at 48 kHz with the channel count
/// declared by the stream.
pub fn ogg_opus_to_wav(data: &[u8]) -> Result<Vec<u8>> {
    let mut reader = PacketReader::new(Cursor::new(data));

    let head_packet = reader
        .read_packet()
        .map_err(|e| ParleyError::Audio(format!("invalid ogg stream: {}", e)))?
        .ok_or_else(|| ParleyError::Audio("empty ogg stream".into()))?;
    let head = parse_opus_head(&head_packet.data)?;

    // The comment header (OpusTags) carries no audio; skip it.
    reader
        .read_packet()
        .map_err(|e| ParleyError::Audio(format!("invalid ogg stream: {}", e)))?
        .ok_or_else(|| ParleyError::Audio("truncated ogg stream".into()))?;

    let channels = head.channels as usize;
    let channel_layout = match head.channels {
        1 => Channels::Mono,
        _ => Channels::Stereo,
    };

    let mut decoder = Decoder::new(SampleRate::Hz48000, channel_layout)
        .map_err(|e| ParleyError::Audio(format!("opus decoder init failed: {}", e)))?;

    let mut pcm: Vec<i16> = Vec::new();
    let mut frame = vec![0i16; MAX_FRAME_SAMPLES * channels];

    loop {
        let packet = reader
            .read_packet()
            .map_err(|e| ParleyError::Audio(format!("invalid ogg stream: {}", e)))?;
        let Some(packet) = packet else { break };
        if packet.data.is_empty() {
            continue;
        }

        let samples = decoder
            .decode(Some(packet.data.as_slice()), frame.as_mut_slice(), false)
            .map_err(|e| ParleyError::Audio(format!("opus decode failed: {}", e)))?;
        pcm.extend_from_slice(&frame[..samples * channels]);
    }

    // Drop the encoder priming samples declared in the header.
    let skip = head.pre_skip as usize * channels;
    let pcm = pcm.get(skip..).unwrap_or_default();
    if pcm.is_empty() {
        return Err(ParleyError::Audio("stream contained no audio samples".into()));
    }

    tracing::debug!(
        samples = pcm.len(),
        channels,
        "Decoded voice payload to PCM"
    );

    pcm_to_wav(pcm, head.channels as u16)
}

/// Encode interleaved 16-bit PCM at 48 kHz as a WAV byte buffer.
pub fn pcm_to_wav(samples: &[i16], channels: u16) -> Result<Vec<u8>> {
    let spec = WavSpec {
        channels,
        sample_rate: OPUS_SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    let mut writer = WavWriter::new(&mut cursor, spec)
        .map_err(|e| ParleyError::Audio(format!("wav write failed: {}", e)))?;
    for &sample in samples {
        writer
            .write_sample(sample)
            .map_err(|e| ParleyError::Audio(format!("wav write failed: {}", e)))?;
    }
    writer
        .finalize()
        .map_err(|e| ParleyError::Audio(format!("wav write failed: {}", e)))?;

    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A minimal, valid 19-byte OpusHead packet.
    fn opus_head_bytes(channels: u8, pre_skip: u16) -> Vec<u8> {
        let mut data = Vec::with_capacity(19);
        data.extend_from_slice(b"OpusHead");
        data.push(1); // version
        data.push(channels);
        data.extend_from_slice(&pre_skip.to_le_bytes());
        data.extend_from_slice(&48_000u32.to_le_bytes()); // input sample rate
        data.extend_from_slice(&0u16.to_le_bytes()); // output gain
        data.push(0); // channel mapping family
        data
    }

    // ---- OpusHead parsing ----

    #[test]
    fn test_parse_opus_head_mono() {
        let head = parse_opus_head(&opus_head_bytes(1, 312)).unwrap();
        assert_eq!(head, OpusHead { channels: 1, pre_skip: 312 });
    }

    #[test]
    fn test_parse_opus_head_stereo() {
        let head = parse_opus_head(&opus_head_bytes(2, 0)).unwrap();
        assert_eq!(head.channels, 2);
        assert_eq!(head.pre_skip, 0);
    }

    #[test]
    fn test_parse_opus_head_wrong_magic() {
        let mut data = opus_head_bytes(1, 0);
        data[0] = b'X';
        let err = parse_opus_head(&data).unwrap_err();
        assert!(err.to_string().contains("OpusHead"));
    }

    #[test]
    fn test_parse_opus_head_too_short() {
        assert!(parse_opus_head(b"OpusHead").is_err());
        assert!(parse_opus_head(&[]).is_err());
    }

    #[test]
    fn test_parse_opus_head_rejects_zero_channels() {
        let err = parse_opus_head(&opus_head_bytes(0, 0)).unwrap_err();
        assert!(err.to_string().contains("channel count"));
    }

    #[test]
    fn test_parse_opus_head_rejects_surround() {
        assert!(parse_opus_head(&opus_head_bytes(6, 0)).is_err());
    }

    #[test]
    fn test_parse_opus_head_pre_skip_little_endian() {
        let head = parse_opus_head(&opus_head_bytes(1, 0x0102)).unwrap();
        assert_eq!(head.pre_skip, 0x0102);
    }

    // ---- WAV encoding ----

    #[test]
    fn test_pcm_to_wav_container_shape() {
        let samples = vec![0i16, 1, -1, i16::MAX, i16::MIN, 7];
        let wav = pcm_to_wav(&samples, 1).unwrap();

        // 44-byte canonical header followed by the sample data.
        assert_eq!(wav.len(), 44 + samples.len() * 2);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
    }

    #[test]
    fn test_pcm_to_wav_declares_sample_rate() {
        let wav = pcm_to_wav(&[0i16; 4], 1).unwrap();
        // Sample rate field of the fmt chunk, little-endian at offset 24.
        let rate = u32::from_le_bytes([wav[24], wav[25], wav[26], wav[27]]);
        assert_eq!(rate, 48_000);
    }

    #[test]
    fn test_pcm_to_wav_declares_channel_count() {
        let wav = pcm_to_wav(&[0i16; 4], 2).unwrap();
        let channels = u16::from_le_bytes([wav[22], wav[23]]);
        assert_eq!(channels, 2);
    }

    // ---- Full decode error paths ----

    #[test]
    fn test_decode_empty_input_is_error() {
        assert!(ogg_opus_to_wav(&[]).is_err());
    }

    #[test]
    fn test_decode_garbage_input_is_error() {
        let garbage: Vec<u8> = (0u8..=255).cycle().take(4096).collect();
        assert!(ogg_opus_to_wav(&garbage).is_err());
    }

    #[test]
    fn test_decode_plain_text_is_error() {
        assert!(ogg_opus_to_wav(b"this is not audio at all").is_err());
    }
}
