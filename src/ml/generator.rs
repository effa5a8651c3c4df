// ============================================================
// Layer 5 - Generator Network
// ============================================================
// Maps (noise, context) to a synthetic encoded row.
//
//   input:   [noise (d_noise) | context (d_context)]
//   hidden:  Linear → ReLU → Dropout, for each hidden width
//   output:  Linear to d_continuous + sum(cat_dims)
//
// Output transform, applied after the last layer:
//   continuous part  → clamped into [lower, upper] per column
//                      (normalised units, from the FeatureSpec)
//   categorical part → softmax within each variable's block,
//                      so every block is a distribution over
//                      that variable's levels

use burn::{
    module::Ignored,
    nn::Linear,
    prelude::*,
    tensor::activation::softmax,
};
use rand::Rng;

use crate::data::codec::FeatureSpec;
use crate::ml::config::TrainConfig;
use crate::ml::layers::{concat_columns, init_linear, layer_dims, mlp_forward, standard_normal};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
#[derive(Config, Debug)]
pub struct GeneratorConfig {
    pub d_noise:      usize,
    pub d_context:    usize,
    pub d_continuous: usize,
    pub cat_dims:     Vec<usize>,
    pub d_hidden:     Vec<usize>,
    #[config(default = 0.1)]
    pub dropout:      f64,
    /// Normalised lower bound per continuous column
    pub lower_bounds: Vec<f32>,
    /// Normalised upper bound per continuous column
    pub upper_bounds: Vec<f32>,
}

impl GeneratorConfig {
    /// Shape the generator after the training config and feature spec.
    /// The noise width defaults to the output width.
    pub fn from_spec(config: &TrainConfig, spec: &FeatureSpec) -> Self {
        Self {
            d_noise:      config.generator_d_noise.unwrap_or_else(|| spec.x_width()),
            d_context:    spec.context_width(),
            d_continuous: spec.continuous_width(),
            cat_dims:     spec.cat_dims(),
            d_hidden:     config.generator_d_hidden.clone(),
            dropout:      config.generator_dropout,
            lower_bounds: spec.normalized_lower_bounds(),
            upper_bounds: spec.normalized_upper_bounds(),
        }
    }

    pub fn d_output(&self) -> usize {
        self.d_continuous + self.cat_dims.iter().sum::<usize>()
    }

    /// (d_input, d_output) of every layer this config builds
    pub fn layer_dims(&self) -> Vec<[usize; 2]> {
        let inputs = std::iter::once(self.d_noise + self.d_context).chain(self.d_hidden.iter().copied());
        let outputs = self.d_hidden.iter().copied().chain(std::iter::once(self.d_output()));
        inputs.zip(outputs).map(|(i, o)| [i, o]).collect()
    }

    pub fn init<B: Backend, R: Rng>(&self, device: &B::Device, rng: &mut R) -> Generator<B> {
        let layers = self
            .layer_dims()
            .into_iter()
            .map(|[i, o]| init_linear(i, o, device, rng))
            .collect();

        Generator {
            layers,
            d_noise:      self.d_noise,
            d_continuous: self.d_continuous,
            dropout:      self.dropout,
            cat_dims:     Ignored(self.cat_dims.clone()),
            bounds:       Ignored(Bounds {
                lower: self.lower_bounds.clone(),
                upper: self.upper_bounds.clone(),
            }),
        }
    }
}

/// Clamp range of the continuous outputs, normalised units
#[derive(Debug, Clone, PartialEq)]
pub struct Bounds {
    pub lower: Vec<f32>,
    pub upper: Vec<f32>,
}

#[derive(Module, Debug)]
pub struct Generator<B: Backend> {
    pub layers:       Vec<Linear<B>>,
    pub d_noise:      usize,
    pub d_continuous: usize,
    pub dropout:      f64,
    pub cat_dims:     Ignored<Vec<usize>>,
    pub bounds:       Ignored<Bounds>,
}

impl<B: Backend> Generator<B> {
    /// context: [rows, d_context] → x_hat: [rows, d_continuous + sum(cat_dims)]
    ///
    /// Fresh standard-normal noise is drawn per row from `rng`.
    pub fn forward<R: Rng>(&self, context: Tensor<B, 2>, rng: &mut R) -> Tensor<B, 2> {
        let device = context.device();
        let rows = context.dims()[0];

        let noise = standard_normal::<B, R>([rows, self.d_noise], &device, rng);
        let input = concat_columns(noise, context);
        let hidden = mlp_forward(&self.layers, input, self.dropout, rng);
        self.transform(hidden)
    }

    /// Clamp continuous columns and softmax each categorical block
    pub fn transform(&self, hidden: Tensor<B, 2>) -> Tensor<B, 2> {
        let [rows, _] = hidden.dims();
        let device = hidden.device();
        let mut parts = Vec::with_capacity(1 + self.cat_dims.len());

        if self.d_continuous > 0 {
            let continuous = hidden.clone().slice([0..rows, 0..self.d_continuous]);
            let lower = self.bound_tensor(&self.bounds.lower, rows, &device);
            let upper = self.bound_tensor(&self.bounds.upper, rows, &device);

            let below = continuous.clone().lower(lower.clone());
            let continuous = continuous.mask_where(below, lower);
            let above = continuous.clone().greater(upper.clone());
            parts.push(continuous.mask_where(above, upper));
        }

        let mut offset = self.d_continuous;
        for &width in self.cat_dims.iter() {
            if width == 0 {
                continue;
            }
            let block = hidden.clone().slice([0..rows, offset..offset + width]);
            parts.push(softmax(block, 1));
            offset += width;
        }

        Tensor::cat(parts, 1)
    }

    /// Per-column bounds repeated for every row
    fn bound_tensor(&self, values: &[f32], rows: usize, device: &B::Device) -> Tensor<B, 2> {
        Tensor::<B, 2>::from_data(TensorData::new(values.to_vec(), [1, values.len()]), device)
            .expand([rows, values.len()])
    }

    pub fn d_output(&self) -> usize {
        self.d_continuous + self.cat_dims.iter().sum::<usize>()
    }

    pub fn layer_dims(&self) -> Vec<[usize; 2]> {
        layer_dims(&self.layers)
    }
}
