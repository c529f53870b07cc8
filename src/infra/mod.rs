// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting concerns shared by the application layer:
//
//   checkpoint.rs — Saving and loading the classifier head
//                   (CompactRecorder) and the TrainConfig
//                   (JSON) so later runs rebuild the same model.
//
//   metrics.rs    — Per-epoch loss/accuracy CSV log.
//
//   model_hub.rs  — Locating pretrained encoder files, either
//                   in a local directory or on the HuggingFace
//                   hub.
//
// Reference: Rust Book §7 (Modules)
//            Burn Book §5 (Checkpointing)

/// Head checkpoint saving and loading
pub mod checkpoint;

/// Training metrics CSV logger
pub mod metrics;

/// Pretrained encoder file resolution
pub mod model_hub;
