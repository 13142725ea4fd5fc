//! WAV 编码与输出写入

use std::fs;
use std::path::Path;

use crate::application::ports::BackendError;

/// 将 16 位单声道 PCM 样本编码为 WAV
pub fn encode_wav(samples: &[i16], sample_rate: u32) -> Vec<u8> {
    let bits_per_sample: u16 = 16;
    let num_channels: u16 = 1;
    let byte_rate = sample_rate * num_channels as u32 * (bits_per_sample / 8) as u32;
    let block_align = num_channels * (bits_per_sample / 8);

    let data_size = samples.len() * 2;
    let file_size = 36 + data_size;

    let mut wav = Vec::with_capacity(44 + data_size);

    // RIFF header
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(file_size as u32).to_le_bytes());
    wav.extend_from_slice(b"WAVE");

    // fmt chunk
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes()); // chunk size
    wav.extend_from_slice(&1u16.to_le_bytes()); // PCM format
    wav.extend_from_slice(&num_channels.to_le_bytes());
    wav.extend_from_slice(&sample_rate.to_le_bytes());
    wav.extend_from_slice(&byte_rate.to_le_bytes());
    wav.extend_from_slice(&block_align.to_le_bytes());
    wav.extend_from_slice(&bits_per_sample.to_le_bytes());

    // data chunk
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&(data_size as u32).to_le_bytes());

    for sample in samples {
        wav.extend_from_slice(&sample.to_le_bytes());
    }

    wav
}

/// 是否带有 RIFF/WAVE 头
pub fn is_wav(data: &[u8]) -> bool {
    data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WAVE"
}

/// 写入合成结果，必要时创建父目录
pub(crate) fn write_output(output: &Path, audio: &[u8]) -> Result<(), BackendError> {
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent).map_err(|e| BackendError::IoError(e.to_string()))?;
    }
    fs::write(output, audio).map_err(|e| BackendError::IoError(e.to_string()))
}

/// 0.1 秒静音 WAV
#[cfg(test)]
pub(crate) fn test_wav() -> Vec<u8> {
    encode_wav(&[0i16; 2400], 24000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_wav_header() {
        let wav = encode_wav(&[0, 1, -1, 100], 16000);

        assert_eq!(wav.len(), 44 + 8);
        assert!(is_wav(&wav));
        assert_eq!(u32::from_le_bytes([wav[24], wav[25], wav[26], wav[27]]), 16000);
        assert_eq!(u32::from_le_bytes([wav[40], wav[41], wav[42], wav[43]]), 8);
    }

    #[test]
    fn test_is_wav_rejects_other_formats() {
        assert!(!is_wav(b"ID3\x03\x00\x00\x00"));
        assert!(!is_wav(b"RIFF"));
        assert!(!is_wav(b""));
    }
}
