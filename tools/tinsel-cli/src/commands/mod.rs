pub mod config;
pub mod replay;
pub mod simulate;
pub mod synth;
