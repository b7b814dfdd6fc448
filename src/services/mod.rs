// Service exports
pub mod gemini;
pub mod inference;

pub use gemini::GenerativeProvider;
pub use inference::{
    build_provider, DisabledProvider, InferenceBackend, InferenceError, InferenceProvider,
};
