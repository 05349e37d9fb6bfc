//! DataLoader 单元测试

use crate::data::{Augment, DataLoader, TensorDataset};
use crate::tensor::Tensor;

fn dataset(n: usize) -> TensorDataset {
    let features = Tensor::new(&(0..2 * n).map(|x| x as f32).collect::<Vec<_>>(), &[n, 2]);
    let labels = Tensor::new(&(0..n).map(|x| x as f32).collect::<Vec<_>>(), &[n, 1]);
    TensorDataset::new(features, labels)
}

fn label_order(loader: &mut DataLoader) -> Vec<f32> {
    loader.iter().flat_map(|(_, y)| y.to_vec()).collect()
}

#[test]
fn test_dataloader_keeps_short_last_batch_by_default() {
    let mut loader = DataLoader::new(dataset(10), 3);
    assert_eq!(loader.num_batches(), 4); // 10 / 3 向上取整 = 4

    let batches: Vec<_> = loader.iter().collect();
    assert_eq!(batches.len(), 4);
    assert_eq!(batches[0].0.shape(), &[3, 2]);
    assert_eq!(batches[3].0.shape(), &[1, 2]);
    // 不打乱时保持原顺序，且特征与标签对应
    assert_eq!(batches[1].0, Tensor::new(&[6.0, 7.0, 8.0, 9.0, 10.0, 11.0], &[3, 2]));
    assert_eq!(batches[1].1, Tensor::new(&[3.0, 4.0, 5.0], &[3, 1]));
}

#[test]
fn test_dataloader_drop_last() {
    let mut loader = DataLoader::new(dataset(10), 3).drop_last(true);
    assert_eq!(loader.num_batches(), 3);
    assert_eq!(loader.iter().count(), 3);
}

#[test]
fn test_shuffle_is_reproducible_and_advances_between_epochs() {
    let mut loader1 = DataLoader::new(dataset(50), 7).shuffle(true).seed(42);
    let mut loader2 = DataLoader::new(dataset(50), 7).shuffle(true).seed(42);

    let epoch1 = label_order(&mut loader1);
    assert_eq!(epoch1, label_order(&mut loader2));

    // 是一个排列
    let mut sorted = epoch1.clone();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert_eq!(sorted, (0..50).map(|x| x as f32).collect::<Vec<_>>());
    assert_ne!(epoch1, sorted);

    // 下一轮顺序不同
    let epoch2 = label_order(&mut loader1);
    assert_ne!(epoch1, epoch2);
    assert_eq!(epoch2, label_order(&mut loader2));
}

#[test]
fn test_shuffle_keeps_feature_label_pairs() {
    let mut loader = DataLoader::new(dataset(20), 6).shuffle(true).seed(7);
    for (x, y) in loader.iter() {
        for r in 0..y.shape()[0] {
            assert_eq!(x[[r, 0]], 2.0 * y[[r, 0]]);
        }
    }
}

#[test]
fn test_augment_is_applied_to_features_only() {
    let n = 3;
    let features = Tensor::new(&vec![1.0; n * 784], &[n, 784]);
    let labels = Tensor::new(&[0.0, 1.0, 2.0], &[n, 1]);
    let mut loader = DataLoader::new(TensorDataset::new(features, labels.clone()), n)
        .seed(1)
        .augment(Augment::mnist());

    let (x, y) = loader.iter().next().unwrap();
    assert_eq!(y, labels);
    assert_eq!(x.shape(), &[n, 784]);
    // 补零后随机裁剪/旋转，多半会带进黑边
    assert!(x.iter().all(|&v| (0.0..=1.0).contains(&v)));
    assert!(x.sum() < (n * 784) as f32);
}

#[test]
#[should_panic(expected = "样本数必须一致")]
fn test_tensor_dataset_length_mismatch() {
    TensorDataset::new(Tensor::zeros(&[3, 2]), Tensor::zeros(&[2, 1]));
}
