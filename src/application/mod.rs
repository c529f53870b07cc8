// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers; no ML math and no printing.
//
//   train_use_case.rs    — load → split → tokenise → train the
//                          head → test evaluation → examples
//   evaluate_use_case.rs — test-set report from a checkpoint
//   predict_use_case.rs  — classify ad-hoc texts from a checkpoint
//   pipeline.rs          — steps the three workflows share
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

/// The training workflow
pub mod train_use_case;

/// Test-set evaluation of a saved checkpoint
pub mod evaluate_use_case;

/// Manual inference on user-provided reviews
pub mod predict_use_case;

/// Shared data / model loading steps
pub mod pipeline;
