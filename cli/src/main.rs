use clap::{Parser, Subcommand};
use comsim_core::sync::{barker_sequence, barker_sequence_complex, detect_sequence, detect_sequence_complex};
use comsim_core::{
    autocorrelate_real, correlate_complex, correlate_real, natural_length, Complex, Correlation,
    LengthCheck, StopBounds, DEFAULT_DETECTION_THRESHOLD,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::Serialize;
use thiserror::Error;

#[derive(Parser)]
#[command(name = "comsim")]
#[command(about = "Windowed correlation toolkit for link simulation")]
struct Cli {
    /// Print a JSON report instead of plain text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Cross-correlate a reference sequence with a local sequence
    Xcorr {
        /// Reference samples (real parts), comma separated
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true, required = true)]
        reference: Vec<f64>,

        /// Local samples (real parts), comma separated
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true, required = true)]
        local: Vec<f64>,

        /// Imaginary parts of the reference; selects the complex path
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        reference_im: Option<Vec<f64>>,

        /// Imaginary parts of the local sequence; selects the complex path
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        local_im: Option<Vec<f64>>,

        #[command(flatten)]
        window: WindowArgs,
    },

    /// Autocorrelate a real sequence
    Autocorr {
        /// Signal samples, comma separated
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true, required = true)]
        signal: Vec<f64>,

        #[command(flatten)]
        window: WindowArgs,
    },

    /// Embed a Barker-11 burst in noise and locate it
    Sync {
        /// Sample index where the burst starts
        #[arg(long, default_value = "100")]
        offset: usize,

        /// Total buffer length in samples
        #[arg(long, default_value = "400")]
        length: usize,

        /// Chip SNR in dB
        #[arg(long, default_value = "10.0", allow_hyphen_values = true)]
        snr_db: f64,

        /// RNG seed for the noise
        #[arg(long, default_value = "1")]
        seed: u64,

        /// Detection threshold on the correlation tap
        #[arg(long, default_value_t = DEFAULT_DETECTION_THRESHOLD)]
        threshold: f64,

        /// Rotate the burst by a random phase and use the complex path
        #[arg(long)]
        complex: bool,
    },
}

#[derive(clap::Args)]
struct WindowArgs {
    /// Output length (defaults to the natural correlation length)
    #[arg(long)]
    len: Option<usize>,

    /// Stop when a tap (or tap magnitude) exceeds this value
    #[arg(long, allow_hyphen_values = true)]
    max: Option<f64>,

    /// Stop when a tap falls below this value (real path only)
    #[arg(long, allow_hyphen_values = true)]
    min: Option<f64>,
}

impl WindowArgs {
    fn bounds(&self) -> StopBounds {
        StopBounds::new(self.max, self.min)
    }

    fn output_len(&self, natural: usize) -> usize {
        self.len.unwrap_or(natural)
    }
}

#[derive(Debug, Error)]
enum CliError {
    #[error("{name} has {actual} imaginary parts but {expected} real parts")]
    LengthMismatch {
        name: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("burst of {burst} samples at offset {offset} does not fit in {length} samples")]
    BurstOutOfRange {
        burst: usize,
        offset: usize,
        length: usize,
    },
}

#[derive(Serialize)]
struct CorrelationReport {
    natural_length: usize,
    output_length: usize,
    length_check: String,
    stopped_at: Option<usize>,
    real: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    imag: Option<Vec<f64>>,
}

impl CorrelationReport {
    fn from_real(natural: usize, result: Correlation<f64>) -> Self {
        Self {
            natural_length: natural,
            output_length: result.values.len(),
            length_check: describe_length(result.length),
            stopped_at: result.stop.stop_index(),
            real: result.values,
            imag: None,
        }
    }

    fn from_complex(natural: usize, result: Correlation<Complex>) -> Self {
        Self {
            natural_length: natural,
            output_length: result.values.len(),
            length_check: describe_length(result.length),
            stopped_at: result.stop.stop_index(),
            real: result.values.iter().map(|v| v.re).collect(),
            imag: Some(result.values.iter().map(|v| v.im).collect()),
        }
    }

    fn print(&self, json: bool) -> Result<(), Box<dyn std::error::Error>> {
        if json {
            println!("{}", serde_json::to_string_pretty(self)?);
            return Ok(());
        }

        println!(
            "Natural length {}, output length {} ({})",
            self.natural_length, self.output_length, self.length_check
        );
        match self.stopped_at {
            Some(k) => println!("Stopped early at index {}", k),
            None => println!("Completed"),
        }
        match &self.imag {
            Some(imag) => {
                for (k, (re, im)) in self.real.iter().zip(imag).enumerate() {
                    println!("{:>5}  {:+.6} {:+.6}i", k, re, im);
                }
            }
            None => {
                for (k, re) in self.real.iter().enumerate() {
                    println!("{:>5}  {:+.6}", k, re);
                }
            }
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct SyncReport {
    offset: usize,
    length: usize,
    snr_db: f64,
    threshold: f64,
    complex: bool,
    detected: Option<usize>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Xcorr {
            reference,
            local,
            reference_im,
            local_im,
            window,
        } => xcorr_command(&reference, &local, reference_im, local_im, &window, cli.json)?,
        Commands::Autocorr { signal, window } => autocorr_command(&signal, &window, cli.json)?,
        Commands::Sync {
            offset,
            length,
            snr_db,
            seed,
            threshold,
            complex,
        } => sync_command(offset, length, snr_db, seed, threshold, complex, cli.json)?,
    }

    Ok(())
}

fn xcorr_command(
    reference: &[f64],
    local: &[f64],
    reference_im: Option<Vec<f64>>,
    local_im: Option<Vec<f64>>,
    window: &WindowArgs,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let natural = natural_length(reference.len(), local.len());
    let output_len = window.output_len(natural);

    let report = if reference_im.is_some() || local_im.is_some() {
        let reference = to_complex("reference", reference, reference_im)?;
        let local = to_complex("local", local, local_im)?;
        let result = correlate_complex(&reference, &local, output_len, window.bounds())?;
        CorrelationReport::from_complex(natural, result)
    } else {
        let result = correlate_real(reference, local, output_len, window.bounds());
        CorrelationReport::from_real(natural, result)
    };

    report.print(json)
}

fn autocorr_command(signal: &[f64], window: &WindowArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let natural = natural_length(signal.len(), signal.len());
    let result = autocorrelate_real(signal, window.output_len(natural), window.bounds());
    CorrelationReport::from_real(natural, result).print(json)
}

fn sync_command(
    offset: usize,
    length: usize,
    snr_db: f64,
    seed: u64,
    threshold: f64,
    complex: bool,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let burst = barker_sequence();
    if offset.checked_add(burst.len()).map_or(true, |end| end > length) {
        return Err(CliError::BurstOutOfRange {
            burst: burst.len(),
            offset,
            length,
        }
        .into());
    }

    // unit-energy chips, so noise variance is 10^(-snr/10) per dimension
    let sigma = 10f64.powf(-snr_db / 20.0);
    let normal = Normal::new(0.0, sigma)?;
    let mut rng = StdRng::seed_from_u64(seed);

    let detected = if complex {
        let phase = rng.gen_range(-std::f64::consts::PI..std::f64::consts::PI);
        let rotation = Complex::new(phase.cos(), phase.sin());
        let mut samples: Vec<Complex> = (0..length)
            .map(|_| Complex::new(normal.sample(&mut rng), normal.sample(&mut rng)))
            .collect();
        for (i, chip) in barker_sequence_complex().into_iter().enumerate() {
            samples[offset + i] += chip * rotation;
        }
        log::info!("burst rotated by {:.3} rad", phase);
        detect_sequence_complex(&samples, &barker_sequence_complex(), threshold)?
    } else {
        let mut samples: Vec<f64> = (0..length).map(|_| normal.sample(&mut rng)).collect();
        for (i, chip) in burst.iter().enumerate() {
            samples[offset + i] += chip;
        }
        detect_sequence(&samples, &burst, threshold)?
    };

    let report = SyncReport {
        offset,
        length,
        snr_db,
        threshold,
        complex,
        detected,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        match detected {
            Some(pos) => println!("Detected burst at {} (embedded at {})", pos, offset),
            None => println!("No burst detected above threshold {}", threshold),
        }
    }

    Ok(())
}

fn to_complex(name: &'static str, re: &[f64], im: Option<Vec<f64>>) -> Result<Vec<Complex>, CliError> {
    let im = im.unwrap_or_else(|| vec![0.0; re.len()]);
    if im.len() != re.len() {
        return Err(CliError::LengthMismatch {
            name,
            expected: re.len(),
            actual: im.len(),
        });
    }
    Ok(re.iter().zip(&im).map(|(&r, &i)| Complex::new(r, i)).collect())
}

fn describe_length(length: LengthCheck) -> String {
    match length {
        LengthCheck::Exact => "exact".to_string(),
        LengthCheck::Truncated { natural, requested } => {
            format!("truncated to {} of {}", requested, natural)
        }
        LengthCheck::Padded { padding, .. } => format!("{} zero-padded", padding),
    }
}
