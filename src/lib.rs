//! Golden-master verification for the publishmd content pipeline.
//!
//! A declared table of scenarios pairs processor configurations with
//! previously approved output trees. Each scenario runs the processor over a
//! private copy of the input corpus and the [`oracle`] decides whether the
//! result is an exact replica of its golden master.

#![allow(clippy::enum_variant_names)]

pub mod application;
pub mod cli;
pub mod ext;
pub mod oracle;
pub mod processor;
pub mod runner;
pub mod scenarios;
