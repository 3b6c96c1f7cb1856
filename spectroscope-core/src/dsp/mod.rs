pub mod analyzer;
pub mod fft;
