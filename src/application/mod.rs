// ============================================================
// Layer 2 - Application / Use Cases
// ============================================================
// This layer orchestrates all the other layers to accomplish
// one goal per command: training, generating, scoring or
// comparing tables.
//
// Rules for this layer:
//   - No ML math or model code here
//   - No UI or printing here (that's Layer 1)
//   - No direct file parsing (that's Layer 4 and 6)
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

use burn::backend::Autodiff;

/// The training workflow
pub mod train_use_case;

/// Generation and critic scoring with a trained run
pub mod generate_use_case;

/// Real-vs-fake summary statistics
pub mod compare_use_case;

/// Backend the CLI trains and generates on
#[cfg(not(feature = "wgpu"))]
pub type AppBackend = Autodiff<burn::backend::NdArray>;

#[cfg(feature = "wgpu")]
pub type AppBackend = Autodiff<burn::backend::Wgpu>;
