// Adapters layer: file formats and record stores behind the domain ports.

pub mod repository;
pub mod sources;
