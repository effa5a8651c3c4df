// ============================================================
// Layer 5 - Critic Network
// ============================================================
// Scores an encoded row given its context; higher means
// "looks more real". The output is an unbounded scalar.
//
//   input:   [x (d_x) | context (d_context)]
//   hidden:  Linear → ReLU → Dropout, for each hidden width
//   output:  Linear to 1, no activation
//
// Gradient penalty (one-sided):
//   interpolated = alpha * x + (1 - alpha) * x_hat, one alpha per row
//   g            = d sum(critic(interpolated)) / d interpolated
//   penalty      = mean( relu(||g||_2 - 1) )
//
// burn's autodiff is first order, so g is computed with an
// explicit backward pass through the Linear stack. The ReLU
// gates and dropout masks of the forward pass are recorded as
// constants; g is then a product of weight matrices and those
// gates, built from ordinary tensor ops, so the penalty itself
// back-propagates into the critic weights.

use burn::{nn::Linear, prelude::*, tensor::activation::relu};
use rand::Rng;

use crate::data::codec::FeatureSpec;
use crate::ml::config::{InterpolationSampling, TrainConfig};
use crate::ml::layers::{
    concat_columns, dropout_mask, init_linear, layer_dims, mlp_forward, standard_normal, uniform,
};

/// Keeps the norm differentiable when the gradient is zero
const NORM_EPSILON: f64 = 1e-12;

#[derive(Config, Debug)]
pub struct CriticConfig {
    pub d_x:       usize,
    pub d_context: usize,
    pub d_hidden:  Vec<usize>,
    #[config(default = 0.1)]
    pub dropout:   f64,
}

impl CriticConfig {
    pub fn from_spec(config: &TrainConfig, spec: &FeatureSpec) -> Self {
        Self {
            d_x:       spec.x_width(),
            d_context: spec.context_width(),
            d_hidden:  config.critic_d_hidden.clone(),
            dropout:   config.critic_dropout,
        }
    }

    pub fn layer_dims(&self) -> Vec<[usize; 2]> {
        let inputs = std::iter::once(self.d_x + self.d_context).chain(self.d_hidden.iter().copied());
        let outputs = self.d_hidden.iter().copied().chain(std::iter::once(1));
        inputs.zip(outputs).map(|(i, o)| [i, o]).collect()
    }

    pub fn init<B: Backend, R: Rng>(&self, device: &B::Device, rng: &mut R) -> Critic<B> {
        Critic {
            layers: self
                .layer_dims()
                .into_iter()
                .map(|[i, o]| init_linear(i, o, device, rng))
                .collect(),
            d_x:     self.d_x,
            dropout: self.dropout,
        }
    }
}

#[derive(Module, Debug)]
pub struct Critic<B: Backend> {
    pub layers:  Vec<Linear<B>>,
    pub d_x:     usize,
    pub dropout: f64,
}

impl<B: Backend> Critic<B> {
    /// x: [rows, d_x], context: [rows, d_context] → scores: [rows, 1]
    pub fn forward<R: Rng>(&self, x: Tensor<B, 2>, context: Tensor<B, 2>, rng: &mut R) -> Tensor<B, 2> {
        mlp_forward(&self.layers, concat_columns(x, context), self.dropout, rng)
    }

    /// Gradient of the summed critic score with respect to `x`.
    /// Dropout masks are drawn from `rng` exactly as in `forward`.
    pub fn input_gradient<R: Rng>(&self, x: Tensor<B, 2>, context: Tensor<B, 2>, rng: &mut R) -> Tensor<B, 2> {
        let [rows, d_x] = x.dims();
        let device = x.device();
        let Some((last, hidden)) = self.layers.split_last() else {
            return Tensor::ones([rows, d_x], &device);
        };

        // ── Forward trace: gate_k = 1[pre_k > 0] * mask_k ────────────────────
        let mut h = concat_columns(x, context).detach();
        let mut gates = Vec::with_capacity(hidden.len());
        for layer in hidden {
            let pre = layer.forward(h).detach();
            let mut gate = pre.clone().greater_elem(0.0).float();
            if let Some(mask) = dropout_mask::<B, R>(pre.dims(), self.dropout, &device, rng) {
                gate = gate * mask;
            }
            h = pre * gate.clone();
            gates.push(gate);
        }

        // ── Backward: d out / d h = 1 · W_lastᵀ, then through each gate ─────
        let mut grad = Tensor::<B, 2>::ones([rows, 1], &device).matmul(last.weight.val().transpose());
        for (layer, gate) in hidden.iter().zip(gates).rev() {
            grad = (grad * gate).matmul(layer.weight.val().transpose());
        }

        grad.slice([0..rows, 0..d_x])
    }

    /// One-sided gradient penalty on interpolations of real and
    /// generated rows. Returns a [1] tensor; zero rows give 0.
    pub fn gradient_penalty<R: Rng>(
        &self,
        x:        Tensor<B, 2>,
        x_hat:    Tensor<B, 2>,
        context:  Tensor<B, 2>,
        sampling: InterpolationSampling,
        rng:      &mut R,
    ) -> Tensor<B, 1> {
        let [rows, _] = x.dims();
        let device = x.device();
        if rows == 0 {
            return Tensor::zeros([1], &device);
        }

        let alpha = match sampling {
            InterpolationSampling::StandardNormal => standard_normal::<B, R>([rows, 1], &device, rng),
            InterpolationSampling::Uniform => uniform::<B, R>([rows, 1], 0.0, 1.0, &device, rng),
        };
        let one_minus_alpha = alpha.clone().neg().add_scalar(1.0);
        let interpolated = (x * alpha + x_hat * one_minus_alpha).detach();

        let grad = self.input_gradient(interpolated, context, rng);
        let norm = grad.powf_scalar(2.0).sum_dim(1).add_scalar(NORM_EPSILON).sqrt();
        relu(norm.sub_scalar(1.0)).mean()
    }

    pub fn layer_dims(&self) -> Vec<[usize; 2]> {
        layer_dims(&self.layers)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{Autodiff, NdArray};
    use rand::{rngs::StdRng, SeedableRng};

    type TestBackend = Autodiff<NdArray>;

    fn critic(dropout: f64, seed: u64) -> Critic<TestBackend> {
        CriticConfig::new(3, 2, vec![8, 6])
            .with_dropout(dropout)
            .init(&Default::default(), &mut StdRng::seed_from_u64(seed))
    }

    #[test]
    fn test_scores_have_one_column() {
        let critic = critic(0.1, 0);
        let device = Default::default();
        let mut rng = StdRng::seed_from_u64(1);
        let x = standard_normal::<TestBackend, _>([10, 3], &device, &mut rng);
        let context = standard_normal::<TestBackend, _>([10, 2], &device, &mut rng);
        assert_eq!(critic.forward(x, context, &mut rng).dims(), [10, 1]);
    }

    #[test]
    fn test_input_gradient_matches_autodiff() {
        let critic = critic(0.0, 4);
        let device = Default::default();
        let mut rng = StdRng::seed_from_u64(5);
        let x = standard_normal::<TestBackend, _>([12, 3], &device, &mut rng);
        let context = standard_normal::<TestBackend, _>([12, 2], &device, &mut rng);

        let tracked = x.clone().require_grad();
        let grads = critic
            .forward(tracked.clone(), context.clone(), &mut rng)
            .sum()
            .backward();
        let expected = tracked.grad(&grads).unwrap().into_data().to_vec::<f32>().unwrap();

        let analytic = critic.input_gradient(x, context, &mut rng);
        let analytic = analytic.into_data().to_vec::<f32>().unwrap();

        assert_eq!(expected.len(), analytic.len());
        for (e, a) in expected.iter().zip(&analytic) {
            assert!((e - a).abs() < 1e-5, "autodiff {e} vs analytic {a}");
        }
    }

    #[test]
    fn test_penalty_backpropagates_into_weights() {
        use burn::module::Param;

        let device = Default::default();
        let mut rng = StdRng::seed_from_u64(7);
        // Single linear layer with weights 2: the input gradient of every
        // row is [2, 2, 2], norm 2 * sqrt(3), so the penalty is 2 * sqrt(3) - 1
        let mut critic = CriticConfig::new(3, 2, vec![]).init::<TestBackend, _>(&device, &mut rng);
        critic.layers[0].weight = Param::from_tensor(Tensor::full([5, 1], 2.0, &device));

        let x = standard_normal::<TestBackend, _>([16, 3], &device, &mut rng);
        let x_hat = standard_normal::<TestBackend, _>([16, 3], &device, &mut rng);
        let context = standard_normal::<TestBackend, _>([16, 2], &device, &mut rng);

        let penalty = critic.gradient_penalty(x, x_hat, context, InterpolationSampling::Uniform, &mut rng);
        let value = penalty.clone().into_scalar();
        assert!((value - (2.0 * 3f32.sqrt() - 1.0)).abs() < 1e-4, "penalty {value}");

        let grads = penalty.backward();
        assert!(critic.layers[0].weight.grad(&grads).is_some());
    }

    #[test]
    fn test_penalty_zero_rows() {
        let critic = critic(0.1, 8);
        let device = Default::default();
        let empty = Tensor::<TestBackend, 2>::zeros([0, 3], &device);
        let context = Tensor::<TestBackend, 2>::zeros([0, 2], &device);
        let penalty = critic.gradient_penalty(
            empty.clone(),
            empty,
            context,
            InterpolationSampling::StandardNormal,
            &mut StdRng::seed_from_u64(0),
        );
        assert_eq!(penalty.into_scalar(), 0.0);
    }
}
