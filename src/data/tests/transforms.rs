use approx::assert_abs_diff_eq;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::data::Augment;
use crate::data::transforms::{normalize_pixels, one_hot};
use crate::tensor::Tensor;

#[test]
fn test_normalize_pixels() {
    let t = Tensor::new(&[0.0, 255.0, 51.0], &[3]);
    assert_abs_diff_eq!(
        normalize_pixels(&t),
        Tensor::new(&[0.0, 1.0, 0.2], &[3]),
        epsilon = 1e-7
    );
}

#[test]
fn test_one_hot() {
    let labels = Tensor::new(&[0.0, 2.0, 1.0, 5.0], &[4]);
    let expected = Tensor::new(
        &[1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0],
        &[4, 3],
    );
    // 越界标签得到全零行
    assert_eq!(one_hot(&labels, 3), expected);
}

fn digit_like() -> Vec<f32> {
    // 中间一块亮斑，像素值取 k/255
    (0..784)
        .map(|i| {
            let (r, c) = (i / 28, i % 28);
            if (10..18).contains(&r) && (12..16).contains(&c) {
                200.0 / 255.0
            } else {
                0.0
            }
        })
        .collect()
}

#[test]
fn test_augment_without_pad_and_rotation_is_identity() {
    let augment = Augment::new(28, 0, 0.0);
    let image = digit_like();
    let out = augment.apply(&image, &mut StdRng::seed_from_u64(3));
    assert_eq!(out, image);
}

#[test]
fn test_augment_shift_only_moves_content() {
    // 只平移不旋转：亮像素个数不变（亮斑离边界足够远）
    let augment = Augment::new(28, 2, 0.0);
    let image = digit_like();
    let bright = |v: &[f32]| v.iter().filter(|&&p| p > 0.5).count();
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..10 {
        let out = augment.apply(&image, &mut rng);
        assert_eq!(out.len(), 784);
        assert_eq!(bright(&out), bright(&image));
    }
}

#[test]
fn test_augment_is_reproducible_with_seed() {
    let augment = Augment::mnist();
    let image = digit_like();
    let a = augment.apply(&image, &mut StdRng::seed_from_u64(5));
    let b = augment.apply(&image, &mut StdRng::seed_from_u64(5));
    assert_eq!(a, b);
    assert!(a.iter().all(|&v| (0.0..=1.0).contains(&v)));
}

#[test]
#[should_panic(expected = "像素个数必须为")]
fn test_augment_rejects_wrong_length() {
    Augment::mnist().apply(&[0.0; 10], &mut StdRng::seed_from_u64(0));
}
