//! Encoding of per-base timing channels (IPD, pulse width).
//!
//! By default frame counts are stored with the lossy 8-bit `CodecV1`: exact
//! below 64 frames, then in bins of 2, 4 and 8 frames up to a ceiling of
//! 952. Lossless mode keeps the raw 16-bit counts.

/// Largest frame count `CodecV1` can represent
pub const MAX_CODEC_FRAMES: u16 = 952;

/// How timing channels are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameEncoding {
    #[default]
    CodecV1,
    Lossless,
}

impl FrameEncoding {
    /// Read group description entries naming the encoding of `ip` and `pw`
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::CodecV1 => "Ipd:CodecV1=ip;PulseWidth:CodecV1=pw",
            Self::Lossless => "Ipd:Frames=ip;PulseWidth:Frames=pw",
        }
    }
}

/// Encode one frame count with `CodecV1`
#[must_use]
#[allow(clippy::cast_possible_truncation)] // each arm is bounded by its range
pub fn encode_v1(frames: u16) -> u8 {
    match frames {
        0..=63 => frames as u8,
        64..=191 => (64 + (frames - 64) / 2) as u8,
        192..=447 => (128 + (frames - 192) / 4) as u8,
        448..=951 => (192 + (frames - 448) / 8) as u8,
        _ => u8::MAX,
    }
}

/// Decode one `CodecV1` code back to a frame count
#[must_use]
pub fn decode_v1(code: u8) -> u16 {
    let code = u16::from(code);
    match code {
        0..=63 => code,
        64..=127 => 64 + (code - 64) * 2,
        128..=191 => 192 + (code - 128) * 4,
        _ => 448 + (code - 192) * 8,
    }
}

/// Encode a slice of frame counts
#[must_use]
pub fn encode_all(frames: &[u16]) -> Vec<u8> {
    frames.iter().copied().map(encode_v1).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_below_64() {
        for f in 0..64u16 {
            assert_eq!(decode_v1(encode_v1(f)), f);
        }
    }

    #[test]
    fn test_bins() {
        assert_eq!(encode_v1(64), 64);
        assert_eq!(encode_v1(65), 64);
        assert_eq!(encode_v1(66), 65);
        assert_eq!(decode_v1(65), 66);
        assert_eq!(encode_v1(192), 128);
        assert_eq!(encode_v1(448), 192);
        assert_eq!(decode_v1(u8::MAX), MAX_CODEC_FRAMES);
    }

    #[test]
    fn test_saturates() {
        assert_eq!(encode_v1(MAX_CODEC_FRAMES), u8::MAX);
        assert_eq!(encode_v1(u16::MAX), u8::MAX);
    }

    #[test]
    fn test_monotone_and_never_overshoots() {
        let mut last = 0u8;
        for f in 0..=1000u16 {
            let code = encode_v1(f);
            assert!(code >= last);
            assert!(decode_v1(code) <= f);
            last = code;
        }
    }
}
