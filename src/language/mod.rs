// Language identification: trait-based so the moderation core never
// depends on a specific detector.
//
// WhatlangIdentifier is the default backend. Tests swap in fixed-answer
// identifiers without touching the dispatcher.

pub mod detect;
pub mod traits;
