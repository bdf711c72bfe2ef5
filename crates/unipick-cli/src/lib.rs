//! Library side of the `unipick` binary: the offline preparation steps and
//! the query command, kept out of `main.rs` so they can be tested directly.
pub mod commands;
pub mod util;
