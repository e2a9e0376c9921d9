// Parley: language-aware toxicity moderation for chat messages
//
// This is the library root. Each module corresponds to one stage of the
// moderation decision or the plumbing around it.

pub mod config;
pub mod language;
pub mod moderation;
pub mod output;
pub mod status;
pub mod toxicity;
pub mod web;
