use crate::nn::{NnError, Parameter};
use crate::tensor::Tensor;

#[test]
fn test_accumulate_and_zero_grad() {
    let mut param = Parameter::new("W2", Tensor::zeros(&[2, 2]));
    assert!(param.grad().is_none());

    let g = Tensor::new(&[1.0, 2.0, 3.0, 4.0], &[2, 2]);
    param.accumulate_grad(&g).unwrap();
    param.accumulate_grad(&g).unwrap();
    assert_eq!(param.grad().unwrap(), &(&g * 2.0));

    param.zero_grad();
    assert!(param.grad().is_none());
}

#[test]
fn test_shape_checks() {
    let mut param = Parameter::new("b", Tensor::zeros(&[3]));
    assert!(matches!(
        param.accumulate_grad(&Tensor::zeros(&[1, 3])),
        Err(NnError::ShapeMismatch { .. })
    ));
    assert!(matches!(
        param.set_value(Tensor::zeros(&[4])),
        Err(NnError::ShapeMismatch { .. })
    ));
    param.set_value(Tensor::ones(&[3])).unwrap();
    assert_eq!(param.value(), &Tensor::ones(&[3]));
    assert_eq!(param.name(), "b");
}
