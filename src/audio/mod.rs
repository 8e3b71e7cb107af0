#[cfg(feature = "cpal-audio")]
pub mod capture;
pub mod decoder;
pub mod recorder;
pub mod wav;
