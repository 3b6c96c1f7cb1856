pub mod colors;
pub mod glyphs;
pub mod mapping;
pub mod spectrogram_renderer;
pub mod surface;
pub mod time_markers;
