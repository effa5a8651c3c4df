// ============================================================
// Layer 5 - Optimizers
// ============================================================
// Two optimizers are supported, picked by OptimizerKind:
//
//   Adam   → burn's own Adam
//   AdamHD → Adam with hypergradient descent on the learning rate
//
// AdamHD (Baydin et al., 2018) keeps a learning rate per
// parameter tensor and nudges it each step by the dot product
// of the new gradient with the previous Adam direction:
//
//   u    = m_{t-1} / (sqrt(v_{t-1}) + eps)
//   h    = <g_t, u> * sqrt(1 - b2^(t-1)) / (1 - b1^(t-1))
//   lr  += hypergrad_lr * h
//
// then applies the usual Adam update with that learning rate.
// The rate passed to `step` only seeds the first step.
//
// WganOptimizer is a closed enum over the two, so the trainer
// can hold either without naming the optimizer type.

use burn::{
    module::AutodiffModule,
    optim::{
        adaptor::OptimizerAdaptor, Adam, AdamConfig, GradientsParams, Optimizer, SimpleOptimizer,
    },
    prelude::*,
    record::Record,
    tensor::backend::AutodiffBackend,
    LearningRate,
};

use crate::domain::error;
use crate::infra::checkpoint::{decode_record, encode_record};
use crate::ml::config::OptimizerKind;

// ─── AdamHd ───────────────────────────────────────────────────────────────────
#[derive(Config, Debug)]
pub struct AdamHdConfig {
    #[config(default = 0.9)]
    pub beta_1:       f64,
    #[config(default = 0.999)]
    pub beta_2:       f64,
    #[config(default = 1e-8)]
    pub epsilon:      f64,
    /// Step size of the learning-rate update
    #[config(default = 1e-8)]
    pub hypergrad_lr: f64,
}

impl AdamHdConfig {
    pub fn init<B: AutodiffBackend, M: AutodiffModule<B>>(&self) -> OptimizerAdaptor<AdamHd, M, B> {
        OptimizerAdaptor::from(AdamHd {
            beta_1:       self.beta_1,
            beta_2:       self.beta_2,
            epsilon:      self.epsilon,
            hypergrad_lr: self.hypergrad_lr,
        })
    }
}

#[derive(Clone, Debug)]
pub struct AdamHd {
    beta_1:       f64,
    beta_2:       f64,
    epsilon:      f64,
    hypergrad_lr: f64,
}

/// Per-tensor AdamHD state
#[derive(Record, Clone, Debug)]
pub struct AdamHdState<B: Backend, const D: usize> {
    pub moment_1: Tensor<B, D>,
    pub moment_2: Tensor<B, D>,
    /// Number of steps taken so far
    pub time:     usize,
    /// Current learning rate of this tensor
    pub lr:       f64,
}

impl<B: Backend> SimpleOptimizer<B> for AdamHd {
    type State<const D: usize> = AdamHdState<B, D>;

    fn step<const D: usize>(
        &self,
        lr:     LearningRate,
        tensor: Tensor<B, D>,
        grad:   Tensor<B, D>,
        state:  Option<Self::State<D>>,
    ) -> (Tensor<B, D>, Option<Self::State<D>>) {
        let (b1, b2, eps) = (self.beta_1, self.beta_2, self.epsilon);

        let (moment_1, moment_2, time, lr) = match state {
            Some(state) => {
                // ── Hypergradient update of the learning rate ────────────────
                let previous = state.time as i32;
                let bias_1 = 1.0 - b1.powi(previous);
                let bias_2 = 1.0 - b2.powi(previous);
                let direction = state.moment_1.clone() / state.moment_2.clone().sqrt().add_scalar(eps);
                let h = (grad.clone() * direction).sum().into_scalar().elem::<f64>() * bias_2.sqrt() / bias_1;
                let lr = state.lr + self.hypergrad_lr * h;

                let moment_1 = state.moment_1.mul_scalar(b1) + grad.clone().mul_scalar(1.0 - b1);
                let moment_2 = state.moment_2.mul_scalar(b2) + grad.powf_scalar(2.0).mul_scalar(1.0 - b2);
                (moment_1, moment_2, state.time + 1, lr)
            }
            None => {
                let moment_1 = grad.clone().mul_scalar(1.0 - b1);
                let moment_2 = grad.powf_scalar(2.0).mul_scalar(1.0 - b2);
                (moment_1, moment_2, 1, lr)
            }
        };

        // ── Adam update ──────────────────────────────────────────────────────
        let t = time as i32;
        let step_size = lr * (1.0 - b2.powi(t)).sqrt() / (1.0 - b1.powi(t));
        let update = (moment_1.clone() / moment_2.clone().sqrt().add_scalar(eps)).mul_scalar(step_size);

        let state = AdamHdState { moment_1, moment_2, time, lr };
        (tensor - update, Some(state))
    }

    fn to_device<const D: usize>(mut state: Self::State<D>, device: &B::Device) -> Self::State<D> {
        state.moment_1 = state.moment_1.to_device(device);
        state.moment_2 = state.moment_2.to_device(device);
        state
    }
}

// ─── WganOptimizer ────────────────────────────────────────────────────────────
/// The optimizer of one network
pub enum WganOptimizer<M: AutodiffModule<B>, B: AutodiffBackend> {
    Adam(OptimizerAdaptor<Adam, M, B>),
    AdamHd(OptimizerAdaptor<AdamHd, M, B>),
}

impl<M: AutodiffModule<B>, B: AutodiffBackend> WganOptimizer<M, B> {
    pub fn new(kind: OptimizerKind) -> Self {
        match kind {
            OptimizerKind::Adam => WganOptimizer::Adam(AdamConfig::new().with_epsilon(1e-8).init()),
            OptimizerKind::AdamHd => WganOptimizer::AdamHd(AdamHdConfig::new().init()),
        }
    }

    pub fn kind(&self) -> OptimizerKind {
        match self {
            WganOptimizer::Adam(_) => OptimizerKind::Adam,
            WganOptimizer::AdamHd(_) => OptimizerKind::AdamHd,
        }
    }

    /// One update of `module` from `grads`
    pub fn step(&mut self, lr: LearningRate, module: M, grads: GradientsParams) -> M {
        match self {
            WganOptimizer::Adam(optim) => optim.step(lr, module, grads),
            WganOptimizer::AdamHd(optim) => optim.step(lr, module, grads),
        }
    }

    /// Full-precision record of the optimizer state
    pub fn to_bytes(&self) -> error::Result<Vec<u8>> {
        match self {
            WganOptimizer::Adam(optim) => encode_record::<B, _>(optim.to_record()),
            WganOptimizer::AdamHd(optim) => encode_record::<B, _>(optim.to_record()),
        }
    }

    /// Restore state written by `to_bytes` for the same kind
    pub fn load_bytes(self, bytes: Vec<u8>, device: &B::Device) -> error::Result<Self> {
        Ok(match self {
            WganOptimizer::Adam(optim) => WganOptimizer::Adam(optim.load_record(decode_record::<B, _>(bytes, device)?)),
            WganOptimizer::AdamHd(optim) => {
                WganOptimizer::AdamHd(optim.load_record(decode_record::<B, _>(bytes, device)?))
            }
        })
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::critic::{Critic, CriticConfig};
    use burn::backend::{Autodiff, NdArray};
    use rand::{rngs::StdRng, SeedableRng};

    type TestBackend = Autodiff<NdArray>;

    fn hd(hypergrad_lr: f64) -> AdamHd {
        AdamHd {
            beta_1: 0.9,
            beta_2: 0.999,
            epsilon: 1e-8,
            hypergrad_lr,
        }
    }

    fn values(t: Tensor<NdArray, 1>) -> Vec<f32> {
        t.into_data().to_vec::<f32>().unwrap()
    }

    #[test]
    fn test_first_step_moves_by_lr_times_sign() {
        let device = Default::default();
        let param = Tensor::<NdArray, 1>::from_floats([0.0, 0.0, 0.0], &device);
        let grad = Tensor::<NdArray, 1>::from_floats([1.0, -2.0, 0.5], &device);

        let (param, state) = SimpleOptimizer::<NdArray>::step(&hd(0.01), 0.01, param, grad, None);
        let state = state.unwrap();
        assert_eq!(state.time, 1);
        assert_eq!(state.lr, 0.01);
        for (p, expected) in values(param).iter().zip([-0.01f32, 0.01, -0.01]) {
            assert!((p - expected).abs() < 1e-6, "{p} vs {expected}");
        }
    }

    #[test]
    fn test_learning_rate_adapts_to_gradient_agreement() {
        let device = Default::default();
        let optim = hd(0.01);
        let param = Tensor::<NdArray, 1>::from_floats([0.0, 0.0, 0.0], &device);
        let grad = Tensor::<NdArray, 1>::from_floats([1.0, -2.0, 0.5], &device);

        let (param, state) = SimpleOptimizer::<NdArray>::step(&optim, 0.01, param, grad.clone(), None);

        // Same gradient again: h = sum |g| = 3.5, so lr grows by 0.01 * 3.5
        let (_, agreeing) = SimpleOptimizer::<NdArray>::step(&optim, 0.01, param.clone(), grad.clone(), state.clone());
        let agreeing = agreeing.unwrap();
        assert_eq!(agreeing.time, 2);
        assert!((agreeing.lr - 0.045).abs() < 1e-6, "lr {}", agreeing.lr);

        // Reversed gradient: lr shrinks by the same amount
        let (_, opposing) = SimpleOptimizer::<NdArray>::step(&optim, 0.01, param, grad.neg(), state);
        assert!((opposing.unwrap().lr + 0.025).abs() < 1e-6);
    }

    fn grads(critic: &Critic<TestBackend>) -> GradientsParams {
        let device = Default::default();
        let x = Tensor::<TestBackend, 2>::from_floats([[1.0, 2.0], [3.0, -1.0]], &device);
        let context = Tensor::<TestBackend, 2>::from_floats([[0.5], [-0.5]], &device);
        let loss = critic.forward(x, context, &mut StdRng::seed_from_u64(0)).sum();
        GradientsParams::from_grads(loss.backward(), critic)
    }

    #[test]
    fn test_state_survives_bytes_round_trip() {
        for kind in [OptimizerKind::Adam, OptimizerKind::AdamHd] {
            let device = Default::default();
            let critic = CriticConfig::new(2, 1, vec![4])
                .with_dropout(0.0)
                .init::<TestBackend, _>(&device, &mut StdRng::seed_from_u64(1));

            let mut optim = WganOptimizer::new(kind);
            assert_eq!(optim.kind(), kind);
            let critic = optim.step(1e-2, critic.clone(), grads(&critic));

            let bytes = optim.to_bytes().unwrap();
            let mut restored = WganOptimizer::new(kind).load_bytes(bytes, &device).unwrap();

            let a = optim.step(1e-2, critic.clone(), grads(&critic));
            let b = restored.step(1e-2, critic.clone(), grads(&critic));
            assert_eq!(
                a.layers[0].weight.val().into_data(),
                b.layers[0].weight.val().into_data(),
                "{kind} state differs after restore"
            );
        }
    }
}
