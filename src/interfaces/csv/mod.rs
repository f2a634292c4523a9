//! CSV adapters for the command-replay binary.

pub mod command_reader;
pub mod snapshot_writer;
