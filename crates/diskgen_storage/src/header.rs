use std::collections::BTreeMap;

/// A typed header attribute. Integer widths follow what the simulation
/// engine reads: signed 32-bit counts and flags, unsigned 32-bit totals.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Int(i32),
    Float(f64),
    IntArray(Vec<i32>),
    UIntArray(Vec<u32>),
    FloatArray(Vec<f64>),
}

impl From<i32> for AttributeValue {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for AttributeValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<Vec<i32>> for AttributeValue {
    fn from(v: Vec<i32>) -> Self {
        Self::IntArray(v)
    }
}

impl From<Vec<u32>> for AttributeValue {
    fn from(v: Vec<u32>) -> Self {
        Self::UIntArray(v)
    }
}

impl From<Vec<f64>> for AttributeValue {
    fn from(v: Vec<f64>) -> Self {
        Self::FloatArray(v)
    }
}

/// Header attributes keyed by name
pub type Attributes = BTreeMap<String, AttributeValue>;

/// Attributes the simulation engine requires before it reads its own
/// parameter file. Values are placeholders that the run-time parameters replace.
pub fn default_attributes() -> Attributes {
    let mut attrs = Attributes::new();
    attrs.insert("Time".into(), 0.0.into());
    attrs.insert("Redshift".into(), 0.0.into());
    attrs.insert("BoxSize".into(), 1.0.into());
    attrs.insert("NumFilesPerSnapshot".into(), 1i32.into());
    attrs.insert("Omega0".into(), 1.0.into());
    attrs.insert("OmegaLambda".into(), 0.0.into());
    attrs.insert("HubbleParam".into(), 1.0.into());
    for flag in [
        "Flag_Sfr",
        "Flag_Cooling",
        "Flag_StellarAge",
        "Flag_Metals",
        "Flag_Feedback",
        "Flag_DoublePrecision",
        "Flag_IC_Info",
    ] {
        attrs.insert(flag.into(), 0i32.into());
    }
    attrs
}

/// Merge `overrides` over `base`; on a shared key the override wins
pub fn merge_attributes(base: Attributes, overrides: &Attributes) -> Attributes {
    let mut merged = base;
    for (key, value) in overrides {
        merged.insert(key.clone(), value.clone());
    }
    merged
}
