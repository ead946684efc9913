// Settings module - user preferences for notes, the model and the relays

pub mod manager;


pub use manager::{NoteTarget, Settings, SettingsManager, API_KEY_ENV, TRANSCRIPT_PLACEHOLDER};
