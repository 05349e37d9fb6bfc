use approx::assert_abs_diff_eq;
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::tiny_config;
use crate::nn::{
    CrossEntropyLoss, Module, NnError, OdeNet, gamma, integrate_pair, softmax_backward,
    softmax_rows, step_span,
};
use crate::ode::Solver;
use crate::tensor::Tensor;

fn tiny_net() -> OdeNet {
    OdeNet::new(&tiny_config(), &mut StdRng::seed_from_u64(22))
}

fn batch() -> Tensor {
    Tensor::new(
        &[
            1.0, 0.0, 0.5, 0.0, //
            0.9, 0.1, 0.4, 0.0, //
            0.0, 1.0, 0.0, 0.5, //
            0.1, 0.8, 0.0, 0.6,
        ],
        &[4, 4],
    )
}

fn labels() -> Tensor {
    Tensor::new(&[1.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 1.0], &[4, 2])
}

fn set_param(net: &mut OdeNet, name: &str, value: &Tensor) {
    for param in net.parameters_mut() {
        if param.name() == name {
            param.set_value(value.clone()).unwrap();
        }
    }
}

/// 重置后执行第0步，返回交叉熵损失
fn first_step_loss(net: &mut OdeNet, x: &Tensor, labels: &Tensor) -> f32 {
    net.init_state();
    let probs = net.forward(x, 0).unwrap();
    CrossEntropyLoss::new().forward(&probs, labels).unwrap()
}

/// 把状态y经W2投影并做softmax
fn project(net: &OdeNet, y: &Tensor) -> Tensor {
    softmax_rows(&y.mat_mul(&net.w2().value().transpose()))
}

#[test]
fn test_initialization() {
    let net = tiny_net();
    assert_eq!(net.w1().value().shape(), &[8, 4]);
    assert_eq!(net.w2().value().shape(), &[2, 8]);
    assert_eq!(net.b().value(), &Tensor::zeros(&[8]));
    // W1: fan_out = 8，bound = sqrt(6/8)
    assert!(net.w1().value().max_abs() <= (6.0f32 / 8.0).sqrt());
    // W2: fan_out = 2，bound = sqrt(3)
    assert!(net.w2().value().max_abs() <= 3.0f32.sqrt());
    assert_eq!(net.num_params(), 3);
    assert_eq!(net.num_elements(), 32 + 16 + 8);

    // 同一种子得到相同的初始参数
    let other = tiny_net();
    assert_eq!(net.w1().value(), other.w1().value());
    assert_eq!(net.w2().value(), other.w2().value());
}

#[test]
fn test_init_state_is_idempotent() {
    let mut net = tiny_net();
    net.init_state();
    let fresh = net.state().clone();
    assert_eq!(fresh.y, Tensor::zeros(&[4, 8]));
    assert_eq!(fresh.q, Tensor::zeros(&[4, 8]));

    net.forward(&batch(), 0).unwrap();
    net.forward(&batch(), 1).unwrap();
    assert_ne!(net.state(), &fresh);

    net.init_state();
    assert_eq!(net.state(), &fresh);
    assert_eq!(net.next_step(), 0);
    net.init_state();
    assert_eq!(net.state(), &fresh);
}

#[test]
fn test_forward_returns_probabilities_and_advances() {
    let mut net = tiny_net();
    net.init_state();
    let probs = net.forward(&batch(), 0).unwrap();
    assert_eq!(probs.shape(), &[4, 2]);
    assert_abs_diff_eq!(probs.sum_axis(1), Tensor::ones(&[4]), epsilon = 1e-6);
    assert_eq!(net.next_step(), 1);
}

#[test]
fn test_step_order_is_enforced() {
    let mut net = tiny_net();
    net.init_state();
    assert!(matches!(
        net.forward(&batch(), 1),
        Err(NnError::StepOutOfOrder { expected: 0, got: 1 })
    ));
    net.forward(&batch(), 0).unwrap();
    assert!(matches!(
        net.forward(&batch(), 0),
        Err(NnError::StepOutOfOrder { expected: 1, got: 0 })
    ));
    net.forward(&batch(), 1).unwrap();
    assert!(matches!(
        net.forward(&batch(), 2),
        Err(NnError::StepOutOfRange { k: 2, steps: 2 })
    ));
}

#[test]
fn test_forward_rejects_wrong_batch_shape() {
    let mut net = tiny_net();
    net.init_state();
    let err = net.forward(&Tensor::zeros(&[3, 4]), 0).unwrap_err();
    assert!(matches!(err, NnError::ShapeMismatch { .. }));
    // 失败的前向不推进步数
    assert_eq!(net.next_step(), 0);
}

#[test]
fn test_backward_accumulates_all_gradients() {
    let mut net = tiny_net();
    let mut criterion = CrossEntropyLoss::new();
    let labels = Tensor::new(&[1.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 1.0], &[4, 2]);

    assert!(matches!(
        net.backward(&Tensor::zeros(&[4, 2])),
        Err(NnError::EmptyCache(_))
    ));

    net.init_state();
    let probs = net.forward(&batch(), 0).unwrap();
    criterion.forward(&probs, &labels).unwrap();
    net.backward(&criterion.backward().unwrap()).unwrap();

    for param in net.parameters() {
        let grad = param.grad().unwrap();
        assert!(grad.is_same_shape(param.value()));
        assert!(grad.is_all_finite());
    }
}

#[test]
fn test_evaluate_uses_input_rows_and_leaves_state() {
    let mut net = tiny_net();
    net.init_state();
    let before = net.state().clone();
    let probs = net.evaluate(&Tensor::zeros(&[7, 4])).unwrap();
    assert_eq!(probs.shape(), &[7, 2]);
    assert_abs_diff_eq!(probs.sum_axis(1), Tensor::ones(&[7]), epsilon = 1e-6);
    assert_eq!(net.state(), &before);
    assert_eq!(net.next_step(), 0);
}

#[test]
fn test_w2_gradient_matches_finite_difference() {
    let mut net = tiny_net();
    let (x, labels) = (batch(), labels());

    let mut criterion = CrossEntropyLoss::new();
    net.init_state();
    let probs = net.forward(&x, 0).unwrap();
    criterion.forward(&probs, &labels).unwrap();
    net.backward(&criterion.backward().unwrap()).unwrap();
    let analytic = net.w2().grad().unwrap().clone();

    let base = net.w2().value().clone();
    let eps = 1e-2;
    for i in 0..2 {
        for j in 0..8 {
            let mut plus = base.clone();
            plus[[i, j]] += eps;
            set_param(&mut net, "W2", &plus);
            let loss_plus = first_step_loss(&mut net, &x, &labels);

            let mut minus = base.clone();
            minus[[i, j]] -= eps;
            set_param(&mut net, "W2", &minus);
            let loss_minus = first_step_loss(&mut net, &x, &labels);

            let numeric = (loss_plus - loss_minus) / (2.0 * eps);
            assert_abs_diff_eq!(analytic[[i, j]], numeric, epsilon = 1e-4);
        }
    }
    set_param(&mut net, "W2", &base);
}

#[test]
fn test_backward_follows_adjoint_rule_at_every_step() {
    let mut net = tiny_net();
    let mut criterion = CrossEntropyLoss::new();
    let (x, labels) = (batch(), labels());

    net.init_state();
    for k in 0..2 {
        for param in net.parameters_mut() {
            param.zero_grad();
        }
        let probs = net.forward(&x, k).unwrap();
        criterion.forward(&probs, &labels).unwrap();
        let grad_probs = criterion.backward().unwrap();

        // 手工展开：softmax反向 → 投影反向 → ξ = grad_y ⊙ q
        let grad_z = softmax_backward(&probs, &grad_probs).unwrap();
        let grad_y = grad_z.mat_mul(net.w2().value());
        let xi = &grad_y * &net.state().q;
        let expected_w2 = grad_z.transpose().mat_mul(&net.state().y);
        let expected_w1 = xi.transpose().mat_mul(&x);
        let expected_b = xi.sum_axis(0);

        net.backward(&grad_probs).unwrap();
        assert_abs_diff_eq!(net.w2().grad().unwrap().clone(), expected_w2, epsilon = 1e-6);
        assert_abs_diff_eq!(net.w1().grad().unwrap().clone(), expected_w1, epsilon = 1e-6);
        assert_abs_diff_eq!(net.b().grad().unwrap().clone(), expected_b, epsilon = 1e-6);
    }
}

#[test]
fn test_evaluate_integrates_whole_horizon_from_zero() {
    let config = tiny_config();
    let mut net = tiny_net();
    let x = batch();
    let solver = Solver::from_config(&config.solver);
    let g = gamma(&x, net.w1().value(), net.b().value()).unwrap();
    let zeros = Tensor::zeros(&[4, 8]);

    // 先让隐状态非零，evaluate不应受其影响
    net.init_state();
    net.forward(&x, 0).unwrap();

    let horizon = config.steps as f32 * config.tbar;
    let (y, _) = integrate_pair(&solver, &g, (0.0, horizon), &zeros, &zeros).unwrap();
    let probs = net.evaluate(&x).unwrap();
    assert_abs_diff_eq!(probs.clone(), project(&net, &y), epsilon = 1e-6);

    // 只积分一个宏步时结果不同
    let (y_short, _) = integrate_pair(&solver, &g, (0.0, config.tbar), &zeros, &zeros).unwrap();
    assert!((&probs - &project(&net, &y_short)).max_abs() > 1e-5);
}

#[test]
fn test_forward_continues_from_previous_step() {
    let config = tiny_config();
    let mut net = tiny_net();
    let x = batch();
    let solver = Solver::from_config(&config.solver);
    let g = gamma(&x, net.w1().value(), net.b().value()).unwrap();

    net.init_state();
    net.forward(&x, 0).unwrap();
    let after_first = net.state().clone();
    let probs = net.forward(&x, 1).unwrap();

    let span = step_span(1, config.tbar);
    let (y, q) = integrate_pair(&solver, &g, span, &after_first.y, &after_first.q).unwrap();
    assert_abs_diff_eq!(net.state().y.clone(), y.clone(), epsilon = 1e-6);
    assert_abs_diff_eq!(net.state().q.clone(), q, epsilon = 1e-6);
    assert_abs_diff_eq!(probs, project(&net, &y), epsilon = 1e-6);

    // 若从零重新开始，只会重复第0步的结果
    let zeros = Tensor::zeros(&[4, 8]);
    let (y_restart, _) = integrate_pair(&solver, &g, span, &zeros, &zeros).unwrap();
    assert_abs_diff_eq!(y_restart.clone(), after_first.y, epsilon = 1e-6);
    assert!((&net.state().y - &y_restart).max_abs() > 1e-4);
}
