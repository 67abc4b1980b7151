use clap::ValueEnum;
use kestrel_core::config::WaitStrategy;

pub mod commands;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Pretty,
    Json,
}

/// CLI-facing spelling of the settle strategies
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum WaitArg {
    /// Capture once animations and DOM mutations stop (bounded)
    Stable,
    /// Sleep for the full settle duration, then capture
    Fixed,
}

impl From<WaitArg> for WaitStrategy {
    fn from(arg: WaitArg) -> Self {
        match arg {
            WaitArg::Stable => WaitStrategy::Stable,
            WaitArg::Fixed => WaitStrategy::Fixed,
        }
    }
}
