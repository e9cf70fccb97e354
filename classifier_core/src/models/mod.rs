use crate::{
    MlErr, Result,
    arch::{Sequential, activations::ActFn, layers::Layer},
};

/// The model type `get_model` resolves when a build spec doesn't name one.
pub const DEFAULT_MODEL: &str = "mlp_cifar10";

/// Resolves a model type identifier to a fresh, uninitialized model.
///
/// A pure lookup: the same identifier always produces the same architecture,
/// and nothing here holds state between calls.
///
/// # Arguments
/// * `model_type` - One of the known model identifiers.
///
/// # Returns
/// The model, or `UnknownModel` for an unrecognized identifier.
pub fn get_model(model_type: &str) -> Result<Sequential> {
    match model_type {
        // 32x32 RGB inputs, 10 classes
        "mlp_cifar10" => Ok(Sequential::new([
            Layer::dense((3072, 256), Some(ActFn::relu())),
            Layer::dense((256, 128), Some(ActFn::relu())),
            Layer::dense((128, 10), None),
        ])),
        // 28x28 grayscale inputs, 10 classes
        "mlp_mnist" => Ok(Sequential::new([
            Layer::dense((784, 128), Some(ActFn::relu())),
            Layer::dense((128, 10), None),
        ])),
        _ => Err(MlErr::UnknownModel(model_type.to_string())),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_default_model_resolves() {
        let model = get_model(DEFAULT_MODEL).unwrap();
        assert!(model.size() > 0);
    }

    #[test]
    fn test_known_model_sizes() {
        let mnist = get_model("mlp_mnist").unwrap();
        assert_eq!(mnist.size(), 785 * 128 + 129 * 10);
    }

    #[test]
    fn test_unknown_model_is_rejected() {
        let err = get_model("resnet50_cifar10").unwrap_err();
        assert!(matches!(err, MlErr::UnknownModel(_)));
    }
}
