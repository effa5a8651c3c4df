// ============================================================
// Layer 5 - ML / Model Layer (Burn)
// ============================================================
// The networks, their optimizers and the training loop.
//
// What's in this layer:
//
//   config.rs    - TrainConfig and the optimizer / interpolation
//                  choices, with defaults and validation
//
//   layers.rs    - Shared MLP pieces: seeded random streams,
//                  weight init, dropout masks, the forward stack
//
//   generator.rs - (noise, context) → encoded row, with bound
//                  clamping and per-variable softmax
//
//   critic.rs    - (row, context) → score, and the one-sided
//                  gradient penalty
//
//   optimizer.rs - burn's Adam and the hypergradient AdamHD,
//                  behind one enum
//
//   trainer.rs   - Alternating critic/generator updates,
//                  held-out evaluation, checkpoint and resume
//
// Reference: Arjovsky et al. (2017) Wasserstein GAN
//            Gulrajani et al. (2017) Improved Training of WGANs
//            Baydin et al. (2018) Online Learning Rate Adaptation
//            with Hypergradient Descent

/// Training hyperparameters
pub mod config;

/// Shared MLP building blocks
pub mod layers;

/// Generator network
pub mod generator;

/// Critic network and gradient penalty
pub mod critic;

/// Adam and AdamHD optimizers
pub mod optimizer;

/// Full training loop with evaluation and checkpointing
pub mod trainer;
