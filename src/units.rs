//! # Unit Normalization
//!
//! Logs record time in integer microseconds; charts and summaries use
//! floating-point milliseconds. Frame sizes are logged in samples and shown as
//! the audio duration they carry.

use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};

const MICROS_PER_MILLI: f64 = 1000.0;

/// Numeric types that can be read as a microsecond count
pub trait Micros: Copy {
    fn as_micros_f64(self) -> f64;
}

macro_rules! impl_micros {
    ($($t:ty),*) => {
        $(impl Micros for $t {
            fn as_micros_f64(self) -> f64 {
                self as f64
            }
        })*
    };
}

impl_micros!(i32, i64, u32, u64, usize, f32, f64);

/// Convert a single microsecond value to milliseconds
pub fn micros_to_millis_value<T: Micros>(value: T) -> f64 {
    value.as_micros_f64() / MICROS_PER_MILLI
}

/// Convert a microsecond series to milliseconds, element-wise
pub fn micros_to_millis<T: Micros>(values: &[T]) -> Vec<f64> {
    values.iter().map(|&v| micros_to_millis_value(v)).collect()
}

/// PCM layout used to turn a frame size in samples into a duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioFormat {
    sample_rate_hz: u32,
    channel_count: u32,
}

impl AudioFormat {
    pub fn new(sample_rate_hz: u32, channel_count: u32) -> Result<Self, AnalysisError> {
        if sample_rate_hz == 0 {
            return Err(AnalysisError::InvalidParameter(
                "sample rate must be greater than zero".to_string(),
            ));
        }
        if channel_count == 0 {
            return Err(AnalysisError::InvalidParameter(
                "channel count must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            sample_rate_hz,
            channel_count,
        })
    }

    pub fn sample_rate_hz(&self) -> u32 {
        self.sample_rate_hz
    }

    pub fn channel_count(&self) -> u32 {
        self.channel_count
    }
}

impl Default for AudioFormat {
    fn default() -> Self {
        Self {
            sample_rate_hz: crate::defaults::SAMPLE_RATE_HZ,
            channel_count: crate::defaults::CHANNEL_COUNT,
        }
    }
}

/// Audio duration of one frame in milliseconds
///
/// Whole durations stay integral so titles read "10" rather than "10.0";
/// everything else is a float ("1.25").
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AudioDuration {
    Whole(u64),
    Fractional(f64),
}

impl AudioDuration {
    pub fn as_f64(self) -> f64 {
        match self {
            AudioDuration::Whole(ms) => ms as f64,
            AudioDuration::Fractional(ms) => ms,
        }
    }
}

impl std::fmt::Display for AudioDuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AudioDuration::Whole(ms) => write!(f, "{}", ms),
            AudioDuration::Fractional(ms) => write!(f, "{}", ms),
        }
    }
}

/// `frame_size_samples / (sample_rate * channels) * 1000`
pub fn frame_size_to_audio_duration_ms(
    frame_size_samples: u32,
    format: &AudioFormat,
) -> AudioDuration {
    let samples_per_second = u64::from(format.sample_rate_hz) * u64::from(format.channel_count);
    let numerator = u64::from(frame_size_samples) * 1000;

    if numerator % samples_per_second == 0 {
        AudioDuration::Whole(numerator / samples_per_second)
    } else {
        AudioDuration::Fractional(numerator as f64 / samples_per_second as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_micros_to_millis() {
        assert_eq!(micros_to_millis(&[1000i64, 2000, 1500]), vec![1.0, 2.0, 1.5]);
        assert_eq!(micros_to_millis(&[250.0f64]), vec![0.25]);
        assert!(micros_to_millis::<i64>(&[]).is_empty());
    }

    #[test]
    fn test_frame_size_whole_duration() {
        let format = AudioFormat::default();
        assert_eq!(
            frame_size_to_audio_duration_ms(960, &format),
            AudioDuration::Whole(10)
        );
        assert_eq!(
            frame_size_to_audio_duration_ms(1920, &format),
            AudioDuration::Whole(20)
        );
        assert_eq!(frame_size_to_audio_duration_ms(960, &format).to_string(), "10");
    }

    #[test]
    fn test_frame_size_fractional_duration() {
        let format = AudioFormat::default();
        assert_eq!(
            frame_size_to_audio_duration_ms(120, &format),
            AudioDuration::Fractional(1.25)
        );
        assert_eq!(
            frame_size_to_audio_duration_ms(240, &format),
            AudioDuration::Fractional(2.5)
        );
        assert_eq!(frame_size_to_audio_duration_ms(120, &format).to_string(), "1.25");
    }

    #[test]
    fn test_custom_audio_format() {
        let mono = AudioFormat::new(48000, 1).unwrap();
        assert_eq!(
            frame_size_to_audio_duration_ms(120, &mono),
            AudioDuration::Fractional(2.5)
        );
        assert_eq!(
            frame_size_to_audio_duration_ms(480, &mono),
            AudioDuration::Whole(10)
        );
    }

    #[test]
    fn test_audio_format_rejects_zero() {
        assert!(AudioFormat::new(0, 2).is_err());
        assert!(AudioFormat::new(48000, 0).is_err());
    }
}
