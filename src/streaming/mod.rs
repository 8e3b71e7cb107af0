//! Live analysis pipeline.
//!
//! ```text
//! ┌─────────────┐  append   ┌──────────────┐  snapshot  ┌──────────────┐
//! │   Capture   │──────────▶│ SampleBuffer │◀───────────│ AnalysisLoop │───▶ Sink
//! │  producer   │           │    (ring)    │  every     │ decode → FFT │
//! └─────────────┘           └──────────────┘  interval  └──────────────┘
//!        │                                                    ▲
//!        └───────────── CancellationToken ────────────────────┘
//! ```

pub mod analysis_loop;
pub mod cancel;
pub mod producer;
pub mod sample_buffer;
pub mod sink;
pub mod window;

pub use analysis_loop::{AnalysisConfig, AnalysisLoop, LoopState, LoopStats};
pub use cancel::CancellationToken;
pub use producer::{CaptureHandle, CaptureOutcome, CaptureProducer};
pub use sample_buffer::{BufferStats, SampleBuffer, Snapshot};
pub use sink::{CollectorSink, PitchSink, StdoutSink, format_result_line};
