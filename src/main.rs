use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use weighted_selector::{
    config::AppConfig, metrics, simulation::Simulation, Result, WeightedEntry, WeightedSelector,
};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let args = parse_args()?;
    let config = read_config(&args.config_path)?;

    let weights: Vec<(String, u32)> = config
        .backends
        .iter()
        .map(|b| (b.backend.clone(), b.weight))
        .collect();
    let entries = config.backends.into_iter().map(WeightedEntry::from);
    let selector = Arc::new(WeightedSelector::from_config(&config.selector, entries));

    info!(
        "selector ready: {} backends, policy {:?}, max weight {}, gcd {}",
        selector.len(),
        selector.policy(),
        selector.max_weight(),
        selector.gcd_weight()
    );

    let simulation = Simulation::new(config.simulation, selector);
    let report = simulation.run().await?;

    let total_weight: u32 = weights.iter().map(|(_, w)| w).sum();
    for (backend, weight) in &weights {
        let expected = match total_weight {
            0 => 0.0,
            total => f64::from(*weight) / f64::from(total),
        };
        info!(
            "{backend}: {} picks, share {:.4}, expected {:.4}",
            report.counts.get(backend).copied().unwrap_or(0),
            report.share(backend),
            expected
        );
    }

    if args.print_metrics {
        io::stdout().write_all(&metrics::gather()?)?;
    }

    Ok(())
}

fn init_logging() {
    // RUST_LOG=weighted_selector=debug shows membership changes
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();
}

struct Args {
    config_path: PathBuf,
    print_metrics: bool,
}

fn parse_args() -> Result<Args> {
    let mut config_path = None;
    let mut print_metrics = false;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match &arg[..] {
            "-c" => {
                let value = args.next().ok_or("config file expected")?;
                config_path = Some(PathBuf::from(value));
            }
            "-m" => print_metrics = true,
            _ => {}
        }
    }

    let config_path = config_path.ok_or("provide config file with '-c' option")?;

    Ok(Args {
        config_path,
        print_metrics,
    })
}

fn read_config(config_path: &Path) -> Result<AppConfig> {
    let config = fs::read_to_string(config_path)?;

    Ok(toml::from_str(&config)?)
}
