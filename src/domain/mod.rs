// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs, enums and traits describing the problem:
// a movie review, its sentiment label, and a prediction.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O or network calls
//   - Only plain Rust structs, enums, and traits
//
// Reference: Rust Book §5 (Structs), §6 (Enums), §10 (Traits)

// Sentiment label and the two corpus splits
pub mod sentiment;

// A labelled review and a model prediction
pub mod review;

// Core abstractions (traits) that other layers implement
pub mod traits;
