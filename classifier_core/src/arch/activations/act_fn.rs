use super::{Relu, Sigmoid};

/// An element-wise activation function applied on top of a layer's output.
#[derive(Clone, Debug)]
pub enum ActFn {
    Relu(Relu),
    Sigmoid(Sigmoid),
}

impl ActFn {
    pub fn relu() -> Self {
        Self::Relu(Relu)
    }

    pub fn sigmoid(amp: f32) -> Self {
        Self::Sigmoid(Sigmoid::new(amp))
    }

    pub fn f(&self, z: f32) -> f32 {
        match self {
            Self::Relu(a) => a.f(z),
            Self::Sigmoid(a) => a.f(z),
        }
    }

    pub fn df(&self, z: f32) -> f32 {
        match self {
            Self::Relu(a) => a.df(z),
            Self::Sigmoid(a) => a.df(z),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_relu_clamps_negatives() {
        let relu = ActFn::relu();
        assert_eq!(relu.f(-3.), 0.);
        assert_eq!(relu.f(2.5), 2.5);
        assert_eq!(relu.df(-3.), 0.);
        assert_eq!(relu.df(2.5), 1.);
    }

    #[test]
    fn test_sigmoid_midpoint() {
        let sigmoid = ActFn::sigmoid(2.);
        assert!((sigmoid.f(0.) - 1.).abs() < 1e-6);
        assert!((sigmoid.df(0.) - 0.5).abs() < 1e-6);
    }
}
