//! Learned fitness surrogate.
//!
//! A small regressor maps a candidate's features to the return of the
//! episode it was seen in. The optimizer fills the pool during rollouts,
//! trains between episodes and scores children with [`Surrogate::infer`]
//! while inferring.

pub mod features;
pub mod model;
pub mod pool;

use burn::backend::{Autodiff, NdArray};
use burn::module::AutodiffModule;
use burn::optim::{AdamConfig, GradientsParams, Optimizer};
use burn::prelude::*;
use burn::tensor::backend::AutodiffBackend;
use burn::tensor::ElementConversion;
use rand::Rng;

use crate::config::Settings;
use crate::lattice::grid::Coord;
use crate::opt::Sample;
use model::{SurrogateConfig, SurrogateModel};
use pool::Pool;

pub type TrainBackend = Autodiff<NdArray>;
pub type InferBackend = NdArray;

pub const N_MINIBATCH: usize = 64;
/// Passes over a finished trajectory per training stage.
pub const N_EPOCH: usize = 2;
pub const POOL_CAPACITY: usize = 16384;
pub const LEARNING_RATE: f64 = 0.01;
pub const BETA_1: f32 = 0.9;
pub const BETA_2: f32 = 0.999;

type StepFn = Box<dyn FnMut(SurrogateModel<TrainBackend>, GradientsParams) -> SurrogateModel<TrainBackend>>;

/// Adam with the surrogate's moment decay rates.
pub fn create_optimizer<B: AutodiffBackend>() -> impl Optimizer<SurrogateModel<B>, B> {
    AdamConfig::new()
        .with_beta_1(BETA_1)
        .with_beta_2(BETA_2)
        .with_epsilon(1e-8)
        .init()
}

pub struct Surrogate {
    model: SurrogateModel<TrainBackend>,
    inference: SurrogateModel<InferBackend>,
    step: StepFn,
    pool: Pool,
    /// Symmetry-reduced coordinates in lexicographic order.
    coords: Vec<Coord>,
    n_features: usize,
    device: <TrainBackend as Backend>::Device,
}

impl Surrogate {
    /// `coords` are the positions whose blocks become features.
    pub fn new<R: Rng>(mut coords: Vec<Coord>, rng: &mut R) -> Self {
        coords.sort_unstable();
        let device = Default::default();
        let n_features = features::n_features(coords.len());
        let model = SurrogateConfig::new(n_features).init::<TrainBackend, _>(rng, &device);
        let mut optimizer = create_optimizer::<TrainBackend>();
        let step: StepFn = Box::new(move |model, grads| optimizer.step(LEARNING_RATE, model, grads));
        Self {
            inference: model.valid(),
            model,
            step,
            pool: Pool::new(POOL_CAPACITY),
            coords,
            n_features,
            device,
        }
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn features(&self, settings: &Settings, sample: &Sample) -> Vec<f32> {
        features::extract(settings, &self.coords, sample)
    }

    pub fn infer(&self, features: &[f32]) -> f64 {
        let input = Tensor::<InferBackend, 2>::from_data(
            TensorData::new(features.to_vec(), [1, self.n_features]),
            &self.device,
        );
        self.inference.forward(input).into_scalar().elem::<f64>()
    }

    pub fn new_trajectory(&mut self) {
        self.pool.new_trajectory();
    }

    pub fn append_trajectory(&mut self, features: Vec<f32>) {
        self.pool.append(features);
    }

    /// Backfill `ret` over the trajectory that just ended.
    pub fn finish_trajectory(&mut self, ret: f64) {
        self.pool.finish_trajectory(ret);
    }

    pub fn trajectory_len(&self) -> usize {
        self.pool.trajectory_len()
    }

    /// Minibatch steps that cover the trajectory `N_EPOCH` times.
    pub fn training_iterations(&self) -> usize {
        (self.trajectory_len() * N_EPOCH).div_ceil(N_MINIBATCH)
    }

    /// One Adam step on a uniformly drawn minibatch. Returns the batch MSE.
    pub fn train<R: Rng>(&mut self, rng: &mut R) -> f64 {
        if self.pool.is_empty() {
            return 0.0;
        }
        let (inputs, targets) = self.pool.sample_batch(rng, N_MINIBATCH);
        let x = Tensor::<TrainBackend, 2>::from_data(
            TensorData::new(inputs, [N_MINIBATCH, self.n_features]),
            &self.device,
        );
        let y = Tensor::<TrainBackend, 2>::from_data(
            TensorData::new(targets, [N_MINIBATCH, 1]),
            &self.device,
        );
        let diff = self.model.forward(x) - y;
        let loss = (diff.clone() * diff).mean();
        let value = loss.clone().into_scalar().elem::<f64>();

        let grads = loss.backward();
        let grads = GradientsParams::from_grads(grads, &self.model);
        self.model = (self.step)(self.model.clone(), grads);
        self.inference = self.model.valid();
        value
    }
}
