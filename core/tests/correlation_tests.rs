use comsim_core::{
    autocorrelate_complex, autocorrelate_real, correlate_complex, correlate_real, natural_length,
    xcorr_complex, xcorr_real, Complex, ComplexOps, LengthCheck, StopBounds, StopIndicator,
    MAX_THRESHOLD_DISABLED, MIN_THRESHOLD_DISABLED,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

const TOLERANCE: f64 = 1e-9;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn random_real(rng: &mut StdRng, len: usize) -> Vec<f64> {
    let normal = Normal::new(0.0, 1.0).unwrap();
    (0..len).map(|_| normal.sample(rng)).collect()
}

fn random_complex(rng: &mut StdRng, len: usize) -> Vec<Complex> {
    let normal = Normal::new(0.0, 1.0).unwrap();
    (0..len)
        .map(|_| Complex::new(normal.sample(rng), normal.sample(rng)))
        .collect()
}

#[test]
fn test_natural_length_has_no_padding() {
    init_logging();
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..20 {
        let m = rng.gen_range(1..40);
        let n = rng.gen_range(1..40);
        let reference = random_real(&mut rng, m);
        let local = random_real(&mut rng, n);

        let exact = xcorr_real(&reference, &local, m + n - 1);
        assert_eq!(exact.length, LengthCheck::Exact);

        let extra = rng.gen_range(1..10);
        let padded = xcorr_real(&reference, &local, m + n - 1 + extra);
        assert_eq!(padded.length, LengthCheck::Padded { natural: m + n - 1, padding: extra });
        assert_eq!(&padded.values[..m + n - 1], &exact.values[..]);
        assert!(padded.values[m + n - 1..].iter().all(|&v| v == 0.0));
    }
}

#[test]
fn test_real_autocorrelation_is_palindromic() {
    let mut rng = StdRng::seed_from_u64(11);

    for len in [1, 2, 5, 16, 33] {
        let signal = random_real(&mut rng, len);
        let natural = natural_length(len, len);
        let result = autocorrelate_real(&signal, natural, StopBounds::NONE);

        for k in 0..natural {
            let mirrored = result.values[natural - 1 - k];
            assert!(
                (result.values[k] - mirrored).abs() < TOLERANCE,
                "len {}: tap {} = {} but mirror = {}",
                len,
                k,
                result.values[k],
                mirrored
            );
        }

        let energy: f64 = signal.iter().map(|x| x * x).sum();
        assert!((result.values[len - 1] - energy).abs() < TOLERANCE);
    }
}

#[test]
fn test_disabled_bounds_never_stop() {
    let signal = vec![1e15, -3e14, 8e15, -1e16];
    let local = vec![-2e15, 5e15];

    let sentinel_bounds = StopBounds::from_sentinels(MAX_THRESHOLD_DISABLED, MIN_THRESHOLD_DISABLED);
    let real = correlate_real(&signal, &local, 10, sentinel_bounds);
    assert_eq!(real.stop, StopIndicator::Completed);

    let to_complex = |v: &[f64]| v.iter().map(|&x| Complex::new(x, -x)).collect::<Vec<_>>();
    let complex = correlate_complex(&to_complex(&signal), &to_complex(&local), 10, sentinel_bounds).unwrap();
    assert_eq!(complex.stop, StopIndicator::Completed);
}

#[test]
fn test_early_stop_keeps_prefix_and_zeroes_tail() {
    init_logging();
    // unbounded taps: [1, 3, 6, 5, 3]
    let reference = [1.0, 2.0, 3.0];
    let local = [1.0, 1.0, 1.0];
    let unbounded = xcorr_real(&reference, &local, 5);
    assert_eq!(unbounded.values, vec![1.0, 3.0, 6.0, 5.0, 3.0]);

    let bounded = correlate_real(&reference, &local, 5, StopBounds::upper(4.0));
    assert_eq!(bounded.stop, StopIndicator::StoppedAt(2));
    assert_eq!(&bounded.values[..=2], &unbounded.values[..=2]);
    assert_eq!(&bounded.values[3..], &[0.0, 0.0]);
}

#[test]
fn test_early_stop_prefix_on_random_signals() {
    let mut rng = StdRng::seed_from_u64(23);

    for _ in 0..20 {
        let (m, n) = (rng.gen_range(2..30), rng.gen_range(2..30));
        let reference = random_real(&mut rng, m);
        let local = random_real(&mut rng, n);
        let natural = natural_length(reference.len(), local.len());
        let unbounded = xcorr_real(&reference, &local, natural);

        let threshold = 0.5 * unbounded.values.iter().cloned().fold(f64::MIN, f64::max);
        let bounded = correlate_real(&reference, &local, natural, StopBounds::upper(threshold));

        let expected_stop = unbounded.values.iter().position(|&v| v > threshold);
        assert_eq!(bounded.stop.stop_index(), expected_stop);

        let stop = expected_stop.unwrap_or(natural - 1);
        assert_eq!(&bounded.values[..=stop], &unbounded.values[..=stop]);
        assert!(bounded.values[stop + 1..].iter().all(|&v| v == 0.0));
    }
}

#[test]
fn test_complex_conjugation_convention() {
    let mut rng = StdRng::seed_from_u64(31);

    for (m, n) in [(1, 1), (3, 5), (8, 2), (12, 12)] {
        let a = random_complex(&mut rng, m);
        let b = random_complex(&mut rng, n);
        let natural = natural_length(m, n);

        let ab = xcorr_complex(&a, &b, natural).unwrap();
        let ba = xcorr_complex(&b, &a, natural).unwrap();

        for k in 0..natural {
            let expected = ba.values[natural - 1 - k].conjugate();
            let diff = ab.values[k] - expected;
            assert!(diff.magnitude() < TOLERANCE, "m={} n={} tap {}", m, n, k);
        }
    }
}

#[test]
fn test_complex_autocorrelation_is_hermitian() {
    let mut rng = StdRng::seed_from_u64(37);
    let signal = random_complex(&mut rng, 9);
    let natural = natural_length(9, 9);
    let result = autocorrelate_complex(&signal, natural, StopBounds::NONE).unwrap();

    for k in 0..natural {
        let diff = result.values[k] - result.values[natural - 1 - k].conjugate();
        assert!(diff.magnitude() < TOLERANCE);
    }
}

#[test]
fn test_complex_stop_on_magnitude_only() {
    let signal = [Complex::new(0.0, 2.0), Complex::new(0.0, -2.0)];
    // taps: [-4, 8, -4]
    let unbounded = autocorrelate_complex(&signal, 3, StopBounds::NONE).unwrap();
    let magnitudes: Vec<f64> = unbounded.values.iter().map(|v| v.magnitude()).collect();
    assert!((magnitudes[1] - 8.0).abs() < TOLERANCE);

    let bounded = autocorrelate_complex(&signal, 3, StopBounds::new(Some(7.0), Some(1e9))).unwrap();
    assert_eq!(bounded.stop, StopIndicator::StoppedAt(1));
    assert_eq!(bounded.values[2], Complex::default());
}

#[test]
fn test_truncated_request_matches_full_prefix() {
    let mut rng = StdRng::seed_from_u64(41);
    let reference = random_real(&mut rng, 25);
    let local = random_real(&mut rng, 10);
    let full = xcorr_real(&reference, &local, 34);

    let truncated = xcorr_real(&reference, &local, 12);
    assert_eq!(truncated.length, LengthCheck::Truncated { natural: 34, requested: 12 });
    assert_eq!(&truncated.values[..], &full.values[..12]);
}
