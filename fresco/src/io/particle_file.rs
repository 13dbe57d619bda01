//! Particle snapshot files.
//!
//! Two on-disk layouts are understood:
//! - `amuse` / `json`: a JSON document `{"particles": [{"x": .., ...}, ...]}`
//! - `csv` / `txt`: a header row naming the columns followed by one particle
//!   per row, comma or whitespace separated, `#` starting a comment
//!
//! Positions and radii are in parsec, masses in solar masses, ages in Myr,
//! luminosities in solar luminosities and temperatures in Kelvin.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};
use shared::units::{
    Length, LengthExt, Luminosity, LuminosityExt, MassExt, Temperature, TemperatureExt, Time,
    TimeExt,
};
use thiserror::Error;

use crate::particles::{Particle, ParticleKind, ParticleSet};
use crate::photometry::Band;

/// Errors that can occur while reading particle files
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("particle file not found: {0}")]
    NotFound(String),
    #[error("unsupported filetype '{0}' (expected amuse, json, csv or txt)")]
    UnsupportedFiletype(String),
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),
    #[error("unknown band '{0}' in particle record")]
    UnknownBand(String),
}

/// On-disk layout of a particle file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Json,
    Table,
}

impl InputFormat {
    pub fn from_filetype(filetype: &str) -> Result<Self, LoadError> {
        match filetype.to_ascii_lowercase().as_str() {
            "amuse" | "json" => Ok(InputFormat::Json),
            "csv" | "txt" => Ok(InputFormat::Table),
            other => Err(LoadError::UnsupportedFiletype(other.to_string())),
        }
    }
}

/// One particle as stored in a JSON snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<u64>,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub mass: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub luminosity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Band letter to luminosity
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub bands: BTreeMap<String, f64>,
}

/// Top-level JSON snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParticleDocument {
    pub particles: Vec<ParticleRecord>,
}

impl ParticleRecord {
    fn into_particle(self, default_key: u64) -> Result<Particle, LoadError> {
        let mut particle = Particle::at_parsecs(
            self.key.unwrap_or(default_key),
            self.x,
            self.y,
            self.z,
            self.mass,
        );
        particle.age = self.age.map(Time::from_megayears);
        particle.radius = self.radius.map(Length::from_parsecs);
        particle.luminosity = self.luminosity.map(Luminosity::from_solar_luminosities);
        particle.temperature = self.temperature.map(Temperature::from_kelvin);
        for (name, value) in self.bands {
            let band = parse_band_name(&name)?;
            particle
                .band_luminosity
                .insert(band, Luminosity::from_solar_luminosities(value));
        }
        Ok(particle)
    }

    /// Record describing `particle` in file units
    pub fn from_particle(particle: &Particle) -> Self {
        Self {
            key: Some(particle.key),
            x: particle.x().as_parsecs(),
            y: particle.y().as_parsecs(),
            z: particle.z().as_parsecs(),
            mass: particle.mass.as_solar_masses(),
            age: particle.age.map(|a| a.as_megayears()),
            radius: particle.radius.map(|r| r.as_parsecs()),
            luminosity: particle.luminosity.map(|l| l.as_solar_luminosities()),
            temperature: particle.temperature.map(|t| t.as_kelvin()),
            bands: particle
                .band_luminosity
                .iter()
                .map(|(band, l)| (band.letter().to_string(), l.as_solar_luminosities()))
                .collect(),
        }
    }
}

/// Accepts `v`, `V`, `v_band` and `V_band`
fn parse_band_name(name: &str) -> Result<Band, LoadError> {
    let trimmed = name.strip_suffix("_band").unwrap_or(name);
    let mut chars = trimmed.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Band::from_char(c).map_err(|_| LoadError::UnknownBand(name.to_string())),
        _ => Err(LoadError::UnknownBand(name.to_string())),
    }
}

/// Parse a JSON snapshot
pub fn parse_json(text: &str, kind: ParticleKind) -> Result<ParticleSet, LoadError> {
    let document: ParticleDocument = serde_json::from_str(text)?;
    let particles = document
        .particles
        .into_iter()
        .enumerate()
        .map(|(i, record)| record.into_particle(i as u64 + 1))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ParticleSet::from_particles(kind, particles))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Key,
    X,
    Y,
    Z,
    Mass,
    Age,
    Radius,
    Luminosity,
    Temperature,
    Band(Band),
    Ignored,
}

impl Column {
    fn from_header(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "key" | "id" => Column::Key,
            "x" => Column::X,
            "y" => Column::Y,
            "z" => Column::Z,
            "mass" => Column::Mass,
            "age" => Column::Age,
            "radius" | "h_smooth" => Column::Radius,
            "luminosity" => Column::Luminosity,
            "temperature" => Column::Temperature,
            other if other.ends_with("_band") => match parse_band_name(other) {
                Ok(band) => Column::Band(band),
                Err(_) => Column::Ignored,
            },
            _ => Column::Ignored,
        }
    }
}

fn split_fields(line: &str) -> Vec<&str> {
    if line.contains(',') {
        line.split(',').map(str::trim).collect()
    } else {
        line.split_whitespace().collect()
    }
}

/// Parse a header-based text table
pub fn parse_table(text: &str, kind: ParticleKind) -> Result<ParticleSet, LoadError> {
    let mut rows = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.split('#').next().unwrap_or("").trim()))
        .filter(|(_, line)| !line.is_empty());

    let columns: Vec<Column> = match rows.next() {
        Some((_, header)) => split_fields(header)
            .into_iter()
            .map(Column::from_header)
            .collect(),
        None => return Ok(ParticleSet::new(kind)),
    };
    for (required, name) in [
        (Column::X, "x"),
        (Column::Y, "y"),
        (Column::Z, "z"),
        (Column::Mass, "mass"),
    ] {
        if !columns.contains(&required) {
            return Err(LoadError::MissingColumn(name));
        }
    }

    let mut set = ParticleSet::new(kind);
    for (row_index, (line_no, line)) in rows.enumerate() {
        let fields = split_fields(line);
        if fields.len() != columns.len() {
            return Err(LoadError::Parse {
                line: line_no,
                message: format!("expected {} fields, found {}", columns.len(), fields.len()),
            });
        }
        let mut record = ParticleRecord {
            key: None,
            x: 0.0,
            y: 0.0,
            z: 0.0,
            mass: 0.0,
            age: None,
            radius: None,
            luminosity: None,
            temperature: None,
            bands: BTreeMap::new(),
        };
        for (column, field) in columns.iter().zip(fields) {
            if *column == Column::Ignored {
                continue;
            }
            let value: f64 = field.parse().map_err(|_| LoadError::Parse {
                line: line_no,
                message: format!("invalid number '{field}'"),
            })?;
            match column {
                Column::Key => record.key = Some(value as u64),
                Column::X => record.x = value,
                Column::Y => record.y = value,
                Column::Z => record.z = value,
                Column::Mass => record.mass = value,
                Column::Age => record.age = Some(value),
                Column::Radius => record.radius = Some(value),
                Column::Luminosity => record.luminosity = Some(value),
                Column::Temperature => record.temperature = Some(value),
                Column::Band(band) => {
                    record.bands.insert(band.letter().to_string(), value);
                }
                Column::Ignored => {}
            }
        }
        set.push(record.into_particle(row_index as u64 + 1)?);
    }
    Ok(set)
}

/// Read a particle set of the given kind from `path`
pub fn read_set_from_file(
    path: &Path,
    filetype: &str,
    kind: ParticleKind,
) -> Result<ParticleSet, LoadError> {
    let format = InputFormat::from_filetype(filetype)?;
    if !path.exists() {
        return Err(LoadError::NotFound(path.display().to_string()));
    }
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let set = match format {
        InputFormat::Json => parse_json(&text, kind)?,
        InputFormat::Table => parse_table(&text, kind)?,
    };
    debug!(
        "read {} {} from {}",
        set.len(),
        kind.label(),
        path.display()
    );
    Ok(set)
}

/// Write a particle set as a JSON snapshot
pub fn write_set_to_json(path: &Path, set: &ParticleSet) -> Result<(), LoadError> {
    let document = ParticleDocument {
        particles: set.iter().map(ParticleRecord::from_particle).collect(),
    };
    let text = serde_json::to_string_pretty(&document)?;
    fs::write(path, text).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Source of particle sets for a run
pub trait ParticleLoader {
    fn load(&self, path: &Path, kind: ParticleKind) -> Result<ParticleSet, LoadError>;
}

/// Loader backed by [`read_set_from_file`] with a fixed filetype
#[derive(Debug, Clone)]
pub struct FileParticleLoader {
    filetype: String,
}

impl FileParticleLoader {
    pub fn new(filetype: impl Into<String>) -> Self {
        Self {
            filetype: filetype.into(),
        }
    }
}

impl ParticleLoader for FileParticleLoader {
    fn load(&self, path: &Path, kind: ParticleKind) -> Result<ParticleSet, LoadError> {
        read_set_from_file(path, &self.filetype, kind)
    }
}
