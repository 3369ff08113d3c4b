//! Feed-forward fitness regressor.

use burn::config::Config;
use burn::module::{Module, Param};
use burn::nn::{Linear, LinearConfig};
use burn::prelude::*;
use rand::Rng;

#[derive(Config, Debug)]
pub struct SurrogateConfig {
    /// Feature vector length.
    pub d_in: usize,
    #[config(default = 128)]
    pub d_hidden1: usize,
    #[config(default = 64)]
    pub d_hidden2: usize,
    /// Slope outside the clipped unit band of the activation.
    #[config(default = 0.1)]
    pub leak: f64,
}

/// Two hidden layers with the activation `leak * x + clamp(x, -1, 1)`.
#[derive(Module, Debug)]
pub struct SurrogateModel<B: Backend> {
    hidden1: Linear<B>,
    hidden2: Linear<B>,
    output: Linear<B>,
    leak: f64,
}

impl SurrogateConfig {
    /// Initialize with weights drawn from `rng`, so a seeded caller gets a
    /// reproducible network.
    pub fn init<B: Backend, R: Rng>(&self, rng: &mut R, device: &B::Device) -> SurrogateModel<B> {
        SurrogateModel {
            hidden1: seeded_linear(self.d_in, self.d_hidden1, rng, device),
            hidden2: seeded_linear(self.d_hidden1, self.d_hidden2, rng, device),
            output: seeded_linear(self.d_hidden2, 1, rng, device),
            leak: self.leak,
        }
    }
}

/// Uniform weights in `±1/sqrt(d_in)` and zero bias.
fn seeded_linear<B: Backend, R: Rng>(
    d_in: usize,
    d_out: usize,
    rng: &mut R,
    device: &B::Device,
) -> Linear<B> {
    let mut linear = LinearConfig::new(d_in, d_out).init(device);
    let bound = 1.0 / (d_in.max(1) as f32).sqrt();
    let weights: Vec<f32> = (0..d_in * d_out)
        .map(|_| rng.random_range(-bound..=bound))
        .collect();
    linear.weight = Param::from_tensor(Tensor::from_data(
        TensorData::new(weights, [d_in, d_out]),
        device,
    ));
    linear.bias = Some(Param::from_tensor(Tensor::zeros([d_out], device)));
    linear
}

impl<B: Backend> SurrogateModel<B> {
    /// `[batch, d_in]` features to `[batch, 1]` predicted returns.
    pub fn forward(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        let h = self.activate(self.hidden1.forward(x));
        let h = self.activate(self.hidden2.forward(h));
        self.output.forward(h)
    }

    fn activate(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        x.clone().mul_scalar(self.leak) + x.clamp(-1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    type B = NdArray;

    #[test]
    fn forward_shape() {
        let device = Default::default();
        let model = SurrogateConfig::new(12).init::<B, _>(&mut StdRng::seed_from_u64(1), &device);
        let x = Tensor::<B, 2>::zeros([5, 12], &device);
        assert_eq!(model.forward(x).dims(), [5, 1]);
    }

    #[test]
    fn seeded_init_is_reproducible() {
        let device = Default::default();
        let config = SurrogateConfig::new(6).with_d_hidden1(8).with_d_hidden2(4);
        let a = config.init::<B, _>(&mut StdRng::seed_from_u64(9), &device);
        let b = config.init::<B, _>(&mut StdRng::seed_from_u64(9), &device);
        let x = Tensor::<B, 2>::from_data(
            TensorData::new(vec![0.5f32, -1.0, 2.0, 0.0, 0.25, 3.0], [1, 6]),
            &device,
        );
        let ya: Vec<f32> = a.forward(x.clone()).into_data().to_vec().unwrap();
        let yb: Vec<f32> = b.forward(x).into_data().to_vec().unwrap();
        assert_eq!(ya, yb);
    }

    #[test]
    fn activation_is_leaky_outside_the_band() {
        let device = Default::default();
        let model = SurrogateConfig::new(1).init::<B, _>(&mut StdRng::seed_from_u64(0), &device);
        let x = Tensor::<B, 2>::from_data(TensorData::new(vec![-3.0f32, 0.5, 3.0], [1, 3]), &device);
        let y: Vec<f32> = model.activate(x).into_data().to_vec().unwrap();
        let expected = [-1.3f32, 0.55, 1.3];
        for (got, want) in y.iter().zip(expected) {
            assert!((got - want).abs() < 1e-6, "{} vs {}", got, want);
        }
    }
}
