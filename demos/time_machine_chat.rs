//! Runs the whole chat script: a time-arrow qubit, a time tunnel, and a
//! message encoded into amplitudes and decoded again.
//!
//! `RUST_LOG=chronochat=debug` shows the intermediate values (padded string,
//! character codes, amplitude vector). `CHRONOCHAT_SEED` fixes the random source.

use chronochat::{ChronoError, Decoder, Encoder, MessageConfig, QuantumContext, TimeTunnel};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<(), ChronoError> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chronochat=debug,time_machine_chat=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let seed = std::env::var("CHRONOCHAT_SEED").ok().and_then(|s| s.parse().ok()).unwrap_or(42);
    let mut rng = StdRng::seed_from_u64(seed);
    let mut ctx = QuantumContext::new();

    // 1. Time arrow: one qubit, superposed and measured.
    let time_arrow = ctx.zero()?;
    ctx.h(&[time_arrow])?;
    let measured = ctx.measure(&[time_arrow], &mut rng)?;
    tracing::info!("Measured {} -> {}", time_arrow, measured[0]);
    ctx.release(&[time_arrow])?;

    // 2. Time tunnel: independent direction candidates.
    let config = MessageConfig::default();
    let mut tunnel = TimeTunnel::create(&mut ctx, config.tunnel_attempts())?;
    match tunnel.open(&mut ctx, &mut rng)? {
        Some(attempt) => tracing::info!(attempt, "tunnel points to the past"),
        None => tracing::info!("every attempt pointed to the future"),
    }
    let directions: Vec<String> = tunnel.directions().iter().map(|d| d.to_string()).collect();
    tracing::info!("directions: {}", directions.join(" "));

    // 3. Encode and decode a message.
    let encoder = Encoder::new(config.clone());
    let decoder = Decoder::new(config);
    let encoded = encoder.encode(&mut ctx, "Hello, world!")?;
    tracing::info!("{} prepared, {}", encoded.register(), encoded.amplitudes());

    let decoded = decoder.decode(&mut ctx, &encoded, &mut rng)?;
    tracing::info!(
        "decoded {:?}; register collapsed to position {:?}",
        decoded.text(),
        decoded.measured_index()
    );

    Ok(())
}
