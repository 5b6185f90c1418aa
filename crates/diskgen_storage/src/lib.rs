pub mod header;

pub use header::{default_attributes, merge_attributes, AttributeValue, Attributes};

use diskgen_core::{DiskError, Result, SNAPSHOT_EXTENSION};
use hdf5::types::TypeDescriptor;
use hdf5::{Container, Group, Location};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Group holding the header attributes
pub const HEADER_GROUP: &str = "Header";

fn codec(e: hdf5::Error) -> DiskError {
    DiskError::Codec(format!("HDF5 error: {e}"))
}

/// One named per-particle array
#[derive(Debug, Clone, PartialEq)]
pub enum Dataset {
    /// N x 3 reals (coordinates, velocities)
    Vec3(Vec<[f64; 3]>),
    Float(Vec<f64>),
    Int(Vec<u64>),
}

impl Dataset {
    pub fn len(&self) -> usize {
        match self {
            Self::Vec3(v) => v.len(),
            Self::Float(v) => v.len(),
            Self::Int(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_vec3(&self) -> Option<&[[f64; 3]]> {
        match self {
            Self::Vec3(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<&[f64]> {
        match self {
            Self::Float(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<&[u64]> {
        match self {
            Self::Int(v) => Some(v),
            _ => None,
        }
    }
}

/// Datasets of one particle species, all of the same length
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParticleGroup {
    pub datasets: BTreeMap<String, Dataset>,
}

impl ParticleGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, data: Dataset) -> Self {
        self.datasets.insert(name.to_string(), data);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Dataset> {
        self.datasets.get(name)
    }

    /// Shared row count; fails if datasets disagree
    pub fn len(&self) -> Result<usize> {
        let mut iter = self.datasets.iter();
        let Some((_, first)) = iter.next() else {
            return Ok(0);
        };
        let expected = first.len();
        for (name, data) in iter {
            if data.len() != expected {
                return Err(DiskError::LengthMismatch {
                    field: name.clone(),
                    len: data.len(),
                    expected,
                });
            }
        }
        Ok(expected)
    }
}

/// Snapshot contents: header attributes plus one group per species
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapshotFile {
    pub header: Attributes,
    /// Keyed `PartType{k}`
    pub groups: BTreeMap<String, ParticleGroup>,
}

impl SnapshotFile {
    pub fn group(&self, species: usize) -> Option<&ParticleGroup> {
        self.groups.get(&group_name(species))
    }
}

pub fn group_name(species: usize) -> String {
    format!("PartType{species}")
}

/// Output path for a file stem: any snapshot suffix is stripped, then enforced
pub fn snapshot_path<P: AsRef<Path>>(fname: P) -> PathBuf {
    let path = fname.as_ref();
    let stem = match path.extension() {
        Some(ext) if ext == SNAPSHOT_EXTENSION => path.with_extension(""),
        _ => path.to_path_buf(),
    };
    let mut name = stem.into_os_string();
    name.push(".");
    name.push(SNAPSHOT_EXTENSION);
    PathBuf::from(name)
}

fn write_attribute(location: &Location, name: &str, value: &AttributeValue) -> hdf5::Result<()> {
    match value {
        AttributeValue::Int(v) => location
            .new_attr::<i32>()
            .shape(())
            .create(name)?
            .write_scalar(v),
        AttributeValue::Float(v) => location
            .new_attr::<f64>()
            .shape(())
            .create(name)?
            .write_scalar(v),
        AttributeValue::IntArray(v) => location
            .new_attr::<i32>()
            .shape(v.len())
            .create(name)?
            .write_raw(v),
        AttributeValue::UIntArray(v) => location
            .new_attr::<u32>()
            .shape(v.len())
            .create(name)?
            .write_raw(v),
        AttributeValue::FloatArray(v) => location
            .new_attr::<f64>()
            .shape(v.len())
            .create(name)?
            .write_raw(v),
    }
}

fn write_dataset(group: &Group, name: &str, data: &Dataset) -> hdf5::Result<()> {
    match data {
        Dataset::Vec3(v) => {
            let ds = group.new_dataset::<f64>().shape((v.len(), 3)).create(name)?;
            if !v.is_empty() {
                ds.write_raw(v.as_flattened())?;
            }
        }
        Dataset::Float(v) => {
            let ds = group.new_dataset::<f64>().shape(v.len()).create(name)?;
            if !v.is_empty() {
                ds.write_raw(v)?;
            }
        }
        Dataset::Int(v) => {
            let ds = group.new_dataset::<u64>().shape(v.len()).create(name)?;
            if !v.is_empty() {
                ds.write_raw(v)?;
            }
        }
    }
    Ok(())
}

fn write_hdf5(
    path: &Path,
    header: &Attributes,
    groups: &BTreeMap<String, &ParticleGroup>,
) -> hdf5::Result<()> {
    let file = hdf5::File::create(path)?;
    let header_group = file.create_group(HEADER_GROUP)?;
    for (name, value) in header {
        write_attribute(&header_group, name, value)?;
    }
    for (name, group) in groups {
        let species_group = file.create_group(name)?;
        for (field, data) in &group.datasets {
            write_dataset(&species_group, field, data)?;
        }
    }
    file.close()
}

/// Write a complete snapshot: a `Header` group of attributes and one
/// `PartType{k}` group of datasets per species. Caller attributes override
/// the defaults.
///
/// The file is written to a temporary sibling and renamed into place, so an
/// existing file is replaced only once the new one is complete.
pub fn write_file<P: AsRef<Path>>(
    fname: P,
    header_attributes: &Attributes,
    particles: &BTreeMap<usize, ParticleGroup>,
) -> Result<PathBuf> {
    let path = snapshot_path(fname);

    let mut groups = BTreeMap::new();
    for (&species, group) in particles {
        let rows = group.len()?;
        log::debug!("{} holds {} particles", group_name(species), rows);
        groups.insert(group_name(species), group);
    }
    let header = merge_attributes(default_attributes(), header_attributes);

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent)?;

    let tmp = tempfile::Builder::new()
        .prefix(".diskgen")
        .suffix(".tmp")
        .tempfile_in(&parent)?;
    write_hdf5(tmp.path(), &header, &groups).map_err(codec)?;
    tmp.as_file().sync_all()?;
    tmp.persist(&path).map_err(|e| DiskError::Io(e.error))?;

    log::info!("Snapshot written: {}", path.display());
    Ok(path)
}

fn read_attribute(location: &Location, name: &str) -> Result<AttributeValue> {
    let attr = location.attr(name).map_err(codec)?;
    let descriptor = attr.dtype().and_then(|t| t.to_descriptor()).map_err(codec)?;
    let value = match (descriptor, attr.ndim()) {
        (TypeDescriptor::Integer(_), 0) => AttributeValue::Int(attr.read_scalar().map_err(codec)?),
        (TypeDescriptor::Float(_), 0) => AttributeValue::Float(attr.read_scalar().map_err(codec)?),
        (TypeDescriptor::Integer(_), 1) => {
            AttributeValue::IntArray(attr.read_raw().map_err(codec)?)
        }
        (TypeDescriptor::Unsigned(_), 1) => {
            AttributeValue::UIntArray(attr.read_raw().map_err(codec)?)
        }
        (TypeDescriptor::Float(_), 1) => {
            AttributeValue::FloatArray(attr.read_raw().map_err(codec)?)
        }
        (descriptor, ndim) => {
            return Err(DiskError::Codec(format!(
                "unsupported header attribute {name}: {descriptor:?} with {ndim} dimensions"
            )));
        }
    };
    Ok(value)
}

fn read_dataset(data: &Container, name: &str) -> Result<Dataset> {
    let descriptor = data.dtype().and_then(|t| t.to_descriptor()).map_err(codec)?;
    let shape = data.shape();
    let dataset = match (descriptor, shape.as_slice()) {
        (TypeDescriptor::Float(_), [_, 3]) => {
            let flat: Vec<f64> = data.read_raw().map_err(codec)?;
            Dataset::Vec3(flat.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect())
        }
        (TypeDescriptor::Float(_), [_]) => Dataset::Float(data.read_raw().map_err(codec)?),
        (TypeDescriptor::Integer(_) | TypeDescriptor::Unsigned(_), [_]) => {
            Dataset::Int(data.read_raw().map_err(codec)?)
        }
        (descriptor, shape) => {
            return Err(DiskError::Codec(format!(
                "unsupported dataset {name}: {descriptor:?} with shape {shape:?}"
            )));
        }
    };
    Ok(dataset)
}

fn read_group(group: &Group) -> Result<ParticleGroup> {
    let mut particles = ParticleGroup::new();
    for name in group.member_names().map_err(codec)? {
        let data = group.dataset(&name).map_err(codec)?;
        particles.datasets.insert(name.clone(), read_dataset(&data, &name)?);
    }
    Ok(particles)
}

/// Read a snapshot back from disk
pub fn read_snapshot<P: AsRef<Path>>(path: P) -> Result<SnapshotFile> {
    let path = path.as_ref();
    // Surface a missing file as an I/O error rather than a library one
    fs::metadata(path)?;
    let file = hdf5::File::open(path).map_err(codec)?;

    let mut snapshot = SnapshotFile::default();
    for name in file.member_names().map_err(codec)? {
        if name == HEADER_GROUP {
            let header = file.group(&name).map_err(codec)?;
            for attr in header.attr_names().map_err(codec)? {
                let value = read_attribute(&header, &attr)?;
                snapshot.header.insert(attr, value);
            }
        } else if name.starts_with("PartType") {
            let group = read_group(&file.group(&name).map_err(codec)?)?;
            snapshot.groups.insert(name, group);
        }
    }
    if snapshot.header.is_empty() {
        return Err(DiskError::Codec(format!(
            "{} has no {HEADER_GROUP} attributes",
            path.display()
        )));
    }
    Ok(snapshot)
}

/// Path of snapshot number `snapshot_index` in `dir`
pub fn numbered_snapshot_path<P: AsRef<Path>>(dir: P, snapshot_index: u32) -> PathBuf {
    dir.as_ref()
        .join(format!("snapshot_{snapshot_index:03}.{SNAPSHOT_EXTENSION}"))
}

/// Load one named array of one species from a numbered snapshot
pub fn load_from_snapshot<P: AsRef<Path>>(
    field: &str,
    species: usize,
    dir: P,
    snapshot_index: u32,
) -> Result<Dataset> {
    let path = numbered_snapshot_path(dir, snapshot_index);
    fs::metadata(&path)?;
    let file = hdf5::File::open(&path).map_err(codec)?;

    let name = group_name(species);
    if !file.link_exists(&name) {
        return Err(DiskError::MissingSpecies { path, species });
    }
    let group = file.group(&name).map_err(codec)?;
    if !group.link_exists(field) {
        return Err(DiskError::MissingField {
            path,
            species,
            field: field.to_string(),
        });
    }
    let data = group.dataset(field).map_err(codec)?;
    read_dataset(&data, field)
}
