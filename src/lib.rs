//! png-squeeze - lossless PNG size reduction
//!
//! Runs several external PNG optimizers against the same input, each into its
//! own output file, and keeps the smallest result. A strategy that fails never
//! leaves a partial output behind.

pub mod artifact;
pub mod cli;
pub mod config;
pub mod error;
pub mod executor;
pub mod runner;
pub mod squeeze;
pub mod strategy;

pub use artifact::{Artifact, SizeClass};
pub use config::Config;
pub use error::*;
pub use runner::{Invocation, InvocationError, OutputMode, ProcessRunner, ToolRunner};
pub use squeeze::{SqueezeReport, Squeezer};
pub use strategy::{StrategyKind, StrategySet, ToolPaths};
