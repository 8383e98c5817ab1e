// Adapters layer: concrete readers for recordings on disk.

pub mod json_reader;
