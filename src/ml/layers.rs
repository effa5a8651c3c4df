// ============================================================
// Layer 5 - Shared Network Building Blocks
// ============================================================
// Both networks are plain MLPs:
//
//   input → [Linear → ReLU → Dropout] × hidden → Linear
//
// burn's nn::Dropout draws its mask from the backend's global
// RNG, so it cannot be replayed from a seed. The mask here is
// drawn from the caller's StdRng instead. It follows the same
// rule as nn::Dropout: active only on an autodiff backend, so
// `model.valid()` copies evaluate without dropout.
//
// Every random stream of a run is derived from the run seed
// with `stream_rng`, which keeps streams independent of each
// other and of how many draws earlier streams made.

use burn::{
    module::Param,
    nn::{Linear, LinearRecord},
    prelude::*,
    tensor::activation::relu,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

// ─── Random streams ───────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Init = 1,
    Split = 2,
    Shuffle = 3,
    Step = 4,
    Evaluation = 5,
    Generation = 6,
}

/// Independent RNG for (`stream`, `index`) under `seed`
pub fn stream_rng(seed: u64, stream: Stream, index: u64) -> StdRng {
    let key = splitmix64(((stream as u64) << 56) ^ index);
    StdRng::seed_from_u64(splitmix64(seed ^ key))
}

fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

// ─── Random tensors ───────────────────────────────────────────────────────────

/// [rows, cols] tensor of N(0, 1) draws
pub fn standard_normal<B: Backend, R: Rng>(shape: [usize; 2], device: &B::Device, rng: &mut R) -> Tensor<B, 2> {
    let values: Vec<f32> = (0..shape[0] * shape[1]).map(|_| rng.sample(StandardNormal)).collect();
    Tensor::from_data(TensorData::new(values, shape), device)
}

/// [rows, cols] tensor of U(low, high) draws
pub fn uniform<B: Backend, R: Rng>(
    shape: [usize; 2],
    low: f64,
    high: f64,
    device: &B::Device,
    rng: &mut R,
) -> Tensor<B, 2> {
    let values: Vec<f32> = (0..shape[0] * shape[1])
        .map(|_| rng.gen_range(low..high) as f32)
        .collect();
    Tensor::from_data(TensorData::new(values, shape), device)
}

/// Inverted dropout mask: 0 with probability `p`, else 1 / (1 - p).
/// None when dropout does not apply (p == 0 or no autodiff).
pub fn dropout_mask<B: Backend, R: Rng>(
    shape: [usize; 2],
    p: f64,
    device: &B::Device,
    rng: &mut R,
) -> Option<Tensor<B, 2>> {
    if !B::ad_enabled() || p <= 0.0 {
        return None;
    }
    let keep = (1.0 / (1.0 - p)) as f32;
    let values: Vec<f32> = (0..shape[0] * shape[1])
        .map(|_| if rng.gen_bool(p) { 0.0 } else { keep })
        .collect();
    Some(Tensor::from_data(TensorData::new(values, shape), device))
}

// ─── Linear layers ────────────────────────────────────────────────────────────

/// Linear layer with weight and bias drawn from
/// U(-1/sqrt(d_input), 1/sqrt(d_input))
pub fn init_linear<B: Backend, R: Rng>(
    d_input:  usize,
    d_output: usize,
    device:   &B::Device,
    rng:      &mut R,
) -> Linear<B> {
    let bound = 1.0 / (d_input.max(1) as f64).sqrt();
    let weight = uniform([d_input, d_output], -bound, bound, device, rng);
    let bias_values: Vec<f32> = (0..d_output).map(|_| rng.gen_range(-bound..bound) as f32).collect();
    let bias = Tensor::<B, 1>::from_data(TensorData::new(bias_values, [d_output]), device);

    Linear {
        weight: Param::from_tensor(weight),
        bias:   Some(Param::from_tensor(bias)),
    }
}

/// (d_input, d_output) of each layer, used to compare architectures
pub fn layer_dims<B: Backend>(layers: &[Linear<B>]) -> Vec<[usize; 2]> {
    layers.iter().map(|l| l.weight.val().dims()).collect()
}

/// `layer_dims` of a saved stack, before it is loaded into a module
pub fn record_layer_dims<B: Backend>(layers: &[LinearRecord<B>]) -> Vec<[usize; 2]> {
    layers.iter().map(|l| l.weight.val().dims()).collect()
}

/// Run the MLP stack: hidden layers use ReLU then dropout,
/// the last layer is linear.
pub fn mlp_forward<B: Backend, R: Rng>(
    layers:  &[Linear<B>],
    input:   Tensor<B, 2>,
    dropout: f64,
    rng:     &mut R,
) -> Tensor<B, 2> {
    let Some((last, hidden)) = layers.split_last() else {
        return input;
    };
    let mut h = input;
    for layer in hidden {
        h = relu(layer.forward(h));
        if let Some(mask) = dropout_mask::<B, R>(h.dims(), dropout, &h.device(), rng) {
            h = h * mask;
        }
    }
    last.forward(h)
}

/// Concatenate two row-aligned blocks, skipping an empty right side
pub fn concat_columns<B: Backend>(left: Tensor<B, 2>, right: Tensor<B, 2>) -> Tensor<B, 2> {
    if right.dims()[1] == 0 {
        left
    } else {
        Tensor::cat(vec![left, right], 1)
    }
}
