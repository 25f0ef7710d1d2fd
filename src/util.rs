//! Utility functions that I don't know where to put else

/// Compute a factor measured in octaves (one octave corresponds to a factor of two).
///
/// # Example
///
/// ```
/// # use synthwave::util::*;
///
/// assert_eq!(from_octaves(3.0), 8.0);
/// assert_eq!(from_octaves(-1.0), 0.5);
/// ```
pub fn from_octaves(octaves: f64) -> f64 {
    2.0f64.powf(octaves)
}

/// Convert seconds to a whole number of samples, rounding to the nearest sample.
/// Negative and non-finite times map to zero.
///
/// # Example
///
/// ```
/// # use synthwave::util::*;
///
/// assert_eq!(seconds_to_samples(0.5, 44100.0), 22050);
/// assert_eq!(seconds_to_samples(-1.0, 44100.0), 0);
/// ```
pub fn seconds_to_samples(seconds: f64, sample_rate: f64) -> usize {
    let samples = (seconds * sample_rate).round();
    if samples.is_finite() && samples > 0.0 {
        samples as usize
    } else {
        0
    }
}
