use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser, Clone)]
#[clap(
    version = "0.1.0",
    name = "stockcar-sim",
    about = "A tick-driven stock-car race simulator written in Rust"
)]
pub struct SimOpts {
    // FLAGS ---------------------------------------------------------------------------------------
    /// Activate debug logging (same as RUST_LOG=debug)
    #[clap(short, long)]
    pub debug: bool,

    /// Simulate in real-time and print a live leaderboard
    #[clap(short, long)]
    pub live: bool,

    /// Print the lap times of every car after the race
    #[clap(long)]
    pub print_lap_times: bool,

    // OPTIONS -------------------------------------------------------------------------------------
    /// Set path to the simulation parameter file (OPTIONAL: if not set, a default field races on
    /// the reference track given by --track)
    #[clap(short, long)]
    pub parfile_path: Option<PathBuf>,

    /// Reference track for the default field: bristol, charlotte, daytona or watkins_glen
    #[clap(short, long, default_value = "bristol")]
    pub track: String,

    /// Override the number of laps
    #[clap(short = 'n', long)]
    pub laps: Option<u32>,

    /// Set simulation tick size in milliseconds, should be in the range [1, 1000]
    #[clap(short = 'm', long, default_value = "100")]
    pub tick_ms: f64,

    /// Set real-time factor (only relevant in live mode)
    #[clap(short, long, default_value = "1.0")]
    pub realtime_factor: f64,

    /// Seed for the lap time noise (OPTIONAL: deterministic lap times if not set)
    #[clap(short, long)]
    pub seed: Option<u64>,

    /// Write the classification as JSON to this path
    #[clap(short, long)]
    pub output: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let opts = SimOpts::parse_from(["stockcar-sim"]);
        assert_eq!(opts.track, "bristol");
        assert_eq!(opts.tick_ms, 100.0);
        assert_eq!(opts.realtime_factor, 1.0);
        assert!(opts.laps.is_none());
        assert!(!opts.live);
    }

    #[test]
    fn overrides() {
        let opts = SimOpts::parse_from([
            "stockcar-sim",
            "--track",
            "daytona",
            "-n",
            "12",
            "--tick-ms",
            "50",
            "--seed",
            "7",
            "--live",
        ]);
        assert_eq!(opts.track, "daytona");
        assert_eq!(opts.laps, Some(12));
        assert_eq!(opts.tick_ms, 50.0);
        assert_eq!(opts.seed, Some(7));
        assert!(opts.live);
    }
}
