// Toxicity classification: the two language-specific oracles and the
// engines behind them.
//
// Oracles (oracle.rs) own the thresholds and turn raw engine output into a
// ToxicityVerdict. Engines (traits.rs) are swappable: the ONNX backends in
// onnx.rs run locally, tests use in-memory fakes.

pub mod download;
pub mod onnx;
pub mod oracle;
pub mod traits;
