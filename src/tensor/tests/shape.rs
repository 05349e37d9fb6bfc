use crate::tensor::Tensor;

#[test]
fn test_transpose() {
    let t = Tensor::new(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]);
    let expected = Tensor::new(&[1.0, 4.0, 2.0, 5.0, 3.0, 6.0], &[3, 2]);
    assert_eq!(t.transpose(), expected);
    // 转置结果为标准布局，可直接按行优先拷贝
    assert_eq!(t.transpose().to_vec(), vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
}

#[test]
fn test_reshape_and_flatten() {
    let t = Tensor::new(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]);
    assert_eq!(t.reshape(&[3, 2]).shape(), &[3, 2]);
    assert_eq!(t.transpose().flatten().to_vec(), vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
}

#[test]
#[should_panic(expected = "张量形状不兼容")]
fn test_reshape_panic_on_incompatible_shape() {
    Tensor::new(&[1.0, 2.0, 3.0], &[3]).reshape(&[2, 2]);
}

#[test]
fn test_stack_and_select_first_axis() {
    let p = Tensor::new(&[1.0, 2.0, 3.0, 4.0], &[2, 2]);
    let q = Tensor::new(&[5.0, 6.0, 7.0, 8.0], &[2, 2]);
    let stacked = Tensor::stack(&[&p, &q]);
    assert_eq!(stacked.shape(), &[2, 2, 2]);
    assert_eq!(stacked.select_first_axis(0), p);
    assert_eq!(stacked.select_first_axis(1), q);
}

#[test]
#[should_panic(expected = "形状不兼容，故无法堆叠")]
fn test_stack_panic_on_shape_mismatch() {
    let p = Tensor::new(&[1.0, 2.0], &[2]);
    let q = Tensor::new(&[1.0, 2.0, 3.0], &[3]);
    Tensor::stack(&[&p, &q]);
}

#[test]
fn test_select_rows() {
    let t = Tensor::new(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[3, 2]);
    let picked = t.select_rows(&[2, 0]);
    assert_eq!(picked, Tensor::new(&[5.0, 6.0, 1.0, 2.0], &[2, 2]));
}

#[test]
fn test_can_broadcast_with() {
    let a = Tensor::zeros(&[4, 3]);
    assert!(a.can_broadcast_with(&Tensor::zeros(&[3])));
    assert!(a.can_broadcast_with(&Tensor::zeros(&[1, 3])));
    assert!(a.can_broadcast_with(&Tensor::zeros(&[4, 1])));
    assert!(!a.can_broadcast_with(&Tensor::zeros(&[4])));
}
