//! Voice turn pipeline
//!
//! Wake phrase → recording window → backend exchange → spoken reply:
//!
//! ```text
//! ┌────────────┐    ┌────────────┐    ┌─────────┐    ┌─────────────┐
//! │ Recognizer │───▶│ Turn state │───▶│ Backend │───▶│ Synthesizer │
//! └────────────┘    │  machine   │    └─────────┘    └─────────────┘
//!                   └─────┬──────┘
//!                         │ wake phrase
//!                         ▼
//!                 ┌───────────────┐
//!                 │ Recording     │ (bounded window, audio pull)
//!                 │ session       │
//!                 └───────────────┘
//! ```
//!
//! The recognizer, synthesizer, and capture source are collaborator seams;
//! this module owns only the lifecycle and serialization discipline.

pub mod capture;
pub mod recognizer;
pub mod recording;
pub mod synthesizer;
pub mod turn;

pub use capture::{AudioCaptureSource, AudioFrame, SilentCaptureSource};
pub use recognizer::{ChannelRecognizer, RecognizerEvent, SpeechRecognizer};
pub use recording::{RecordingClose, RecordingSession};
pub use synthesizer::{ConsoleSynthesizer, SpeechSynthesizer};
pub use turn::{spawn_voice_turn, Effect, TurnEvent, TurnMachine, VoiceDeps, VoiceTurnHandle};
