//! Reading and writing particle snapshots

pub mod particle_file;

pub use particle_file::{
    read_set_from_file, write_set_to_json, FileParticleLoader, InputFormat, LoadError,
    ParticleDocument, ParticleLoader, ParticleRecord,
};
