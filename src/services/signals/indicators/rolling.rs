//! Rolling-window primitives shared by the indicators.
//!
//! Every function returns a vector aligned with its input: index `i` only
//! looks at indices `<= i`, and is `None` until the window is full.
//!
//! `mean`, `max` and `min` have two interchangeable implementations: the
//! built-in loops below, or the `ta` crate when the `ta-backend` feature is
//! on. Both agree on alignment and on the undefined prefix.

#[cfg(not(feature = "ta-backend"))]
mod native {
    /// Simple rolling mean.
    pub fn mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
        fold_window(values, window, |w| w.iter().sum::<f64>() / w.len() as f64)
    }

    /// Rolling maximum.
    pub fn max(values: &[f64], window: usize) -> Vec<Option<f64>> {
        fold_window(values, window, |w| {
            w.iter().copied().fold(f64::NEG_INFINITY, f64::max)
        })
    }

    /// Rolling minimum.
    pub fn min(values: &[f64], window: usize) -> Vec<Option<f64>> {
        fold_window(values, window, |w| w.iter().copied().fold(f64::INFINITY, f64::min))
    }

    fn fold_window(
        values: &[f64],
        window: usize,
        f: impl Fn(&[f64]) -> f64,
    ) -> Vec<Option<f64>> {
        if window == 0 {
            return vec![None; values.len()];
        }
        (0..values.len())
            .map(|i| {
                if i + 1 < window {
                    None
                } else {
                    Some(f(&values[i + 1 - window..=i]))
                }
            })
            .collect()
    }
}

#[cfg(feature = "ta-backend")]
mod ta_backend {
    use ta::indicators::{Maximum, Minimum, SimpleMovingAverage};
    use ta::Next;

    pub fn mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
        match SimpleMovingAverage::new(window) {
            Ok(mut sma) => stream(values, window, |v| sma.next(v)),
            Err(_) => vec![None; values.len()],
        }
    }

    pub fn max(values: &[f64], window: usize) -> Vec<Option<f64>> {
        match Maximum::new(window) {
            Ok(mut max) => stream(values, window, |v| max.next(v)),
            Err(_) => vec![None; values.len()],
        }
    }

    pub fn min(values: &[f64], window: usize) -> Vec<Option<f64>> {
        match Minimum::new(window) {
            Ok(mut min) => stream(values, window, |v| min.next(v)),
            Err(_) => vec![None; values.len()],
        }
    }

    fn stream(values: &[f64], window: usize, mut next: impl FnMut(f64) -> f64) -> Vec<Option<f64>> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let out = next(*v);
                (i + 1 >= window).then_some(out)
            })
            .collect()
    }
}

#[cfg(not(feature = "ta-backend"))]
pub use native::{max, mean, min};
#[cfg(feature = "ta-backend")]
pub use ta_backend::{max, mean, min};

/// Rolling mean over a partially defined series; a window containing any
/// undefined entry is undefined.
pub fn mean_defined(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    over_defined(values, window, |w| w.iter().sum::<f64>() / w.len() as f64)
}

/// Rolling sample standard deviation (n - 1 denominator).
pub fn sample_std_defined(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    if window < 2 {
        return vec![None; values.len()];
    }
    over_defined(values, window, |w| {
        let mean = w.iter().sum::<f64>() / w.len() as f64;
        let variance = w.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (w.len() - 1) as f64;
        variance.sqrt()
    })
}

fn over_defined(
    values: &[Option<f64>],
    window: usize,
    f: impl Fn(&[f64]) -> f64,
) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }
    let mut buf = Vec::with_capacity(window);
    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                return None;
            }
            buf.clear();
            for v in &values[i + 1 - window..=i] {
                buf.push((*v)?);
            }
            Some(f(&buf))
        })
        .collect()
}

/// Wrap a fully defined series.
pub fn defined(values: &[f64]) -> Vec<Option<f64>> {
    values.iter().copied().map(Some).collect()
}
