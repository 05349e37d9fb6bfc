//! 数据变换函数
//!
//! 提供归一化、one-hot 编码，以及训练集的随机增广。

use image::imageops::crop_imm;
use image::{GrayImage, Luma};
use imageproc::geometric_transformations::{Interpolation, rotate_about_center};
use rand::Rng;

use crate::tensor::Tensor;

/// 将 0-255 像素值归一化到 0-1
pub fn normalize_pixels(tensor: &Tensor) -> Tensor {
    tensor / 255.0
}

/// 将类别索引转换为 one-hot 编码
///
/// # 参数
/// - `labels`: 类别索引 Tensor，形状 [N] 或 [N, 1]，值为 0..num_classes
/// - `num_classes`: 类别总数
///
/// # 返回
/// one-hot 编码 Tensor，形状 [N, num_classes]；越界的索引对应全零行
///
/// # 示例
/// ```ignore
/// let labels = Tensor::new(&[0.0, 2.0, 1.0], &[3]);
/// let one_hot = one_hot(&labels, 3);
/// // 结果: [[1,0,0], [0,0,1], [0,1,0]]
/// ```
pub fn one_hot(labels: &Tensor, num_classes: usize) -> Tensor {
    let flat = labels.flatten();
    let n = flat.size();

    let mut data = vec![0.0; n * num_classes];
    for i in 0..n {
        let class_idx = flat[[i]] as usize;
        if class_idx < num_classes {
            data[i * num_classes + class_idx] = 1.0;
        }
    }

    Tensor::new(&data, &[n, num_classes])
}

/// 训练集随机增广：四周补零`pad`像素后随机裁回原尺寸，再绕中心随机旋转
/// `[-max_rotation_deg, max_rotation_deg]`度（最近邻插值，空白处补0）。
///
/// 作用于展平的单通道方形图像，像素取值[0, 1]
#[derive(Debug, Clone, PartialEq)]
pub struct Augment {
    side: u32,
    pad: u32,
    max_rotation_deg: f32,
}

impl Augment {
    /// # Panics
    /// `side`为0时
    pub fn new(side: u32, pad: u32, max_rotation_deg: f32) -> Self {
        assert!(side > 0, "Augment: 图像边长必须大于 0");
        Self {
            side,
            pad,
            max_rotation_deg: max_rotation_deg.abs(),
        }
    }

    /// MNIST 训练集的设置：28x28，补2像素，±15°
    pub fn mnist() -> Self {
        Self::new(28, 2, 15.0)
    }

    /// 对一张展平的图像做增广，返回同样长度的像素
    pub fn apply<R: Rng + ?Sized>(&self, pixels: &[f32], rng: &mut R) -> Vec<f32> {
        let side = self.side;
        assert_eq!(
            pixels.len(),
            (side * side) as usize,
            "Augment: 像素个数必须为 {side}x{side}"
        );
        let to_u8 = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;

        // 补零
        let padded_side = side + 2 * self.pad;
        let padded = GrayImage::from_fn(padded_side, padded_side, |x, y| {
            let inside = x >= self.pad
                && y >= self.pad
                && x < self.pad + side
                && y < self.pad + side;
            if inside {
                let idx = ((y - self.pad) * side + (x - self.pad)) as usize;
                Luma([to_u8(pixels[idx])])
            } else {
                Luma([0])
            }
        });

        // 随机裁剪
        let left = rng.gen_range(0..=2 * self.pad);
        let top = rng.gen_range(0..=2 * self.pad);
        let cropped = crop_imm(&padded, left, top, side, side).to_image();

        // 随机旋转
        let rotated = if self.max_rotation_deg > 0.0 {
            let degrees = rng.gen_range(-self.max_rotation_deg..=self.max_rotation_deg);
            rotate_about_center(
                &cropped,
                degrees.to_radians(),
                Interpolation::Nearest,
                Luma([0]),
            )
        } else {
            cropped
        };

        rotated.pixels().map(|p| f32::from(p.0[0]) / 255.0).collect()
    }

    /// 对 [batch, side*side] 的批次逐样本增广
    pub fn apply_batch<R: Rng + ?Sized>(&self, images: &Tensor, rng: &mut R) -> Tensor {
        let rows = images.shape()[0];
        let width = images.shape()[1];
        let flat = images.to_vec();
        let data = flat
            .chunks(width.max(1))
            .take(rows)
            .flat_map(|row| self.apply(row, rng))
            .collect::<Vec<_>>();
        Tensor::new(&data, &[rows, width])
    }
}
