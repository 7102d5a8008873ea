//! One-step-ahead forecasting of a noisy two-channel signal.
//!
//! Run with `RUST_LOG=debug cargo run --example forecast` to see the
//! windowing and fitting logs.

use ndarray::Array2;
use rand::prelude::*;
use tracing_subscriber::EnvFilter;
use window_estimator::prelude::*;

fn noisy_signal(n: usize, seed: u64) -> Array2<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    Array2::from_shape_fn((n, 2), |(i, j)| {
        let t = i as f64 * 0.1;
        let clean = if j == 0 { t.sin() } else { 0.5 * (2.0 * t).cos() };
        clean + (rng.gen::<f64>() - 0.5) * 0.05
    })
}

fn report<E: Estimator>(model: &TimeSeriesRegressor<E>, test: &Sequence) -> Result<()> {
    let predictions = model.predict(test)?;
    let truth = align_targets(test, model.window())?;
    let metrics = RegressionMetrics::compute(&truth, &predictions)?;
    println!(
        "{:<70} rmse={:.4} mae={:.4} r2={:.4} (n={})",
        model.to_string(),
        metrics.rmse,
        metrics.mae,
        metrics.r2,
        metrics.n_samples
    );
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let series = Sequence::from(noisy_signal(400, 42));
    let (train, test) = time_series_split(&series, 0.2, SplitOutput::default())?;
    println!("train={} test={}", train.len(), test.len());

    let config = TimeSeriesConfig::default().with_n_prev(6);

    let mut linear = TimeSeriesRegressor::new(LinearRegression::new().with_alpha(1e-3), config.clone());
    linear.fit(&train, None)?;
    report(&linear, &test)?;

    let mut knn = TimeSeriesRegressor::new(KNNRegressor::with_k(5), config.with_parallel_models(true));
    knn.fit(&train, None)?;
    report(&knn, &test)?;

    knn.set_params([("n_neighbors", ParamValue::Int(10)), ("weights", ParamValue::from("distance"))])?;
    knn.fit(&train, None)?;
    report(&knn, &test)?;

    Ok(())
}
