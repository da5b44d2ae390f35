pub mod io;

pub use io::{atomic_write, atomic_write_bytes};
