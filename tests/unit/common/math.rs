use trendscan::common::math::{
    average_true_range, ema_alpha, exponential_mean, rolling_mean, true_range_series,
};

#[test]
fn rolling_mean_is_undefined_during_warm_up() {
    let values = [1.0, 2.0, 3.0, 4.0, 5.0];
    let out = rolling_mean(&values, 3);
    assert_eq!(out, vec![None, None, Some(2.0), Some(3.0), Some(4.0)]);
}

#[test]
fn rolling_mean_longer_than_series_is_all_none() {
    assert!(rolling_mean(&[1.0, 2.0], 5).iter().all(Option::is_none));
}

#[test]
fn exponential_mean_seeds_with_first_sample() {
    let values = [10.0, 12.0, 11.0, 15.0, 9.0];
    let out = exponential_mean(&values, 3);
    let alpha = ema_alpha(3);
    assert_eq!(alpha, 0.5);
    assert_eq!(out[0], 10.0);
    for i in 1..values.len() {
        let expected = alpha * values[i] + (1.0 - alpha) * out[i - 1];
        assert!((out[i] - expected).abs() < 1e-12);
    }
}

#[test]
fn atr_averages_gap_aware_true_range() {
    let high = [11.0, 12.0, 16.0, 13.0];
    let low = [9.0, 10.0, 14.0, 8.0];
    let close = [10.0, 11.0, 15.0, 9.0];

    let tr = true_range_series(&high, &low, &close);
    assert_eq!(tr, vec![2.0, 2.0, 5.0, 7.0]);

    let atr = average_true_range(&high, &low, &close, 2);
    assert_eq!(atr, vec![None, Some(2.0), Some(3.5), Some(6.0)]);
}
