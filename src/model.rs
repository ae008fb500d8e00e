//! Model documents and the envelope model builder.
//!
//! A [`ModelDocument`] is an ordered list of named objects with named
//! fields, written in the simulator's text input format. The geometry,
//! schedule and HVAC emission of a full model live outside this crate; the
//! builder here emits the envelope materials and their constructions, the
//! ground temperatures, the building object and the output requests.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::building::{BuildingRecord, DEFAULT_WWR};
use crate::catalog::{EnvelopeObject, ParameterSet};
use crate::error::{Error, Result};
use crate::ground::GroundTemperatureProfile;
use crate::preprocess::ResolvedRecord;
use crate::resolver::ConfigurationResolver;
use crate::sampler::{SampledValue, ValueSampler, map_roughness_value};

/// A single field value in a model object.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Number(f64),
    Text(String),
    Autosize,
}

impl From<SampledValue> for FieldValue {
    fn from(v: SampledValue) -> Self {
        match v {
            SampledValue::Number(n) => Self::Number(n),
            SampledValue::Autosize => Self::Autosize,
        }
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
            Self::Autosize => f.write_str(crate::catalog::AUTOSIZE),
        }
    }
}

/// One object of a model document: a class plus ordered named fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelObject {
    pub class: String,
    pub fields: Vec<(String, FieldValue)>,
}

impl ModelObject {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            fields: Vec::new(),
        }
    }

    /// Appends a field, builder style.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Value of the `Name` field, if any.
    pub fn name(&self) -> Option<&str> {
        match self.get("Name") {
            Some(FieldValue::Text(s)) => Some(s),
            _ => None,
        }
    }
}

/// An open model: header comments plus objects in emission order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelDocument {
    comments: Vec<String>,
    objects: Vec<ModelObject>,
}

impl ModelDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn comment(&mut self, line: impl Into<String>) {
        self.comments.push(line.into());
    }

    pub fn add(&mut self, object: ModelObject) {
        self.objects.push(object);
    }

    pub fn objects(&self) -> &[ModelObject] {
        &self.objects
    }

    /// All objects of `class`, compared case-insensitively.
    pub fn objects_of<'a>(&'a self, class: &'a str) -> impl Iterator<Item = &'a ModelObject> + 'a {
        self.objects
            .iter()
            .filter(move |o| o.class.eq_ignore_ascii_case(class))
    }

    /// First object of `class` named `name`.
    pub fn find(&self, class: &str, name: &str) -> Option<&ModelObject> {
        self.objects
            .iter()
            .find(|o| o.class.eq_ignore_ascii_case(class) && o.name() == Some(name))
    }

    /// Writes the document in the simulator's text input format.
    ///
    /// # Errors
    ///
    /// Returns an `io::Error` if writing fails.
    pub fn write_idf(&self, mut writer: impl Write) -> io::Result<()> {
        for line in &self.comments {
            writeln!(writer, "! {line}")?;
        }
        if !self.comments.is_empty() {
            writeln!(writer)?;
        }
        for object in &self.objects {
            if object.fields.is_empty() {
                writeln!(writer, "{};", object.class)?;
                writeln!(writer)?;
                continue;
            }
            writeln!(writer, "{},", object.class)?;
            let last = object.fields.len() - 1;
            for (i, (name, value)) in object.fields.iter().enumerate() {
                let sep = if i == last { ';' } else { ',' };
                let cell = format!("{value}{sep}");
                writeln!(writer, "    {cell:<26}!- {name}")?;
            }
            writeln!(writer)?;
        }
        Ok(())
    }

    pub fn to_idf_string(&self) -> String {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.write_idf(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }
}

/// Shared, read-only inputs for every build in a batch.
#[derive(Debug, Clone, Copy)]
pub struct BuildContext<'a> {
    pub resolver: ConfigurationResolver<'a>,
    pub ground: GroundTemperatureProfile,
}

impl<'a> BuildContext<'a> {
    /// Computes the adjusted ground temperatures once for the batch.
    pub fn new(resolver: ConfigurationResolver<'a>) -> Self {
        Self {
            ground: resolver.ground_temperatures(),
            resolver,
        }
    }
}

/// Fills an open model document for one resolved building.
pub trait ModelBuilder: Sync {
    /// # Errors
    ///
    /// Any error aborts this building only.
    fn build(
        &self,
        record: &ResolvedRecord,
        ctx: &BuildContext<'_>,
        sampler: &mut ValueSampler,
        doc: &mut ModelDocument,
    ) -> Result<()>;
}

enum Source {
    /// Sampled parameter with the value used when the set lacks it.
    Param(&'static str, f64),
    /// Sampled parameter mapped to a roughness category.
    Roughness(&'static str, f64),
    Fixed(&'static str),
    FixedNumber(f64),
}

struct Layout {
    object: EnvelopeObject,
    class: &'static str,
    material: &'static str,
    construction: &'static str,
    fields: &'static [(&'static str, Source)],
}

const MASS_FIELDS_GROUNDFLOOR: &[(&str, Source)] = &[
    ("Roughness", Source::Roughness("roughness", 0.7)),
    ("Thickness", Source::Param("thickness", 0.15)),
    ("Conductivity", Source::Param("thermal conductivity", 1.4)),
    ("Density", Source::Param("density", 2300.0)),
    ("Specific Heat", Source::Param("specific heat", 1000.0)),
];

const MASS_FIELDS_EXT_WALLS: &[(&str, Source)] = &[
    ("Roughness", Source::Roughness("surface roughness", 0.7)),
    ("Thickness", Source::Param("thickness", 0.2)),
    ("Conductivity", Source::Param("thermal conductivity", 1.4)),
    ("Density", Source::Param("density", 2300.0)),
    ("Specific Heat", Source::Param("specific heat", 1000.0)),
];

const NOMASS_FIELDS: &[(&str, Source)] = &[
    ("Roughness", Source::Fixed("MediumRough")),
    ("Thermal Resistance", Source::Param("thermal resistance", 0.2)),
];

const GLAZING_FIELDS: &[(&str, Source)] = &[
    ("U-Factor", Source::Param("u_factor", 2.0)),
    ("Solar Heat Gain Coefficient", Source::FixedNumber(0.7)),
];

const LAYOUTS: &[Layout] = &[
    Layout {
        object: EnvelopeObject::GroundFloor,
        class: "MATERIAL",
        material: "Groundfloor",
        construction: "GroundFloorC",
        fields: MASS_FIELDS_GROUNDFLOOR,
    },
    Layout {
        object: EnvelopeObject::ExtWalls,
        class: "MATERIAL",
        material: "Ext_Walls",
        construction: "Ext_WallsC",
        fields: MASS_FIELDS_EXT_WALLS,
    },
    Layout {
        object: EnvelopeObject::Roof,
        class: "MATERIAL:NOMASS",
        material: "Roof",
        construction: "RoofC",
        fields: NOMASS_FIELDS,
    },
    Layout {
        object: EnvelopeObject::Windows,
        class: "WINDOWMATERIAL:SIMPLEGLAZINGSYSTEM",
        material: "Windowglass",
        construction: "Window1C",
        fields: GLAZING_FIELDS,
    },
    Layout {
        object: EnvelopeObject::IntWalls,
        class: "MATERIAL:NOMASS",
        material: "Int_Walls",
        construction: "Int_WallsC",
        fields: NOMASS_FIELDS,
    },
    Layout {
        object: EnvelopeObject::IntFloors,
        class: "MATERIAL:NOMASS",
        material: "Int_Floors",
        construction: "Int_FloorsC",
        fields: NOMASS_FIELDS,
    },
];

/// Emits envelope materials and constructions, ground temperatures and the
/// building object.
///
/// Parameter sets come from the preprocessed record when present; missing
/// objects are fetched strictly, so a building whose classification the
/// catalog does not cover fails here.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvelopeModelBuilder;

impl EnvelopeModelBuilder {
    fn parameters(
        record: &ResolvedRecord,
        ctx: &BuildContext<'_>,
        object: EnvelopeObject,
    ) -> Result<ParameterSet> {
        if let Some(set) = record.envelope.get(&object) {
            return Ok(set.clone());
        }
        let classification = record.building.classification()?;
        ctx.resolver.fetch_envelope(&classification, record.tier, object)
    }

    fn material(
        layout: &Layout,
        set: &ParameterSet,
        sampler: &mut ValueSampler,
    ) -> Result<ModelObject> {
        let mut obj = ModelObject::new(layout.class).field("Name", layout.material);
        for (field, source) in layout.fields {
            let value: FieldValue = match source {
                Source::Param(param, default) => sampler.sample_or(set, param, *default)?.into(),
                Source::Roughness(param, default) => {
                    let sampled = sampler.sample_or(set, param, *default)?;
                    let x = sampled.as_number().ok_or_else(|| Error::NotAutosizable {
                        param: (*param).to_string(),
                    })?;
                    map_roughness_value(x).as_str().into()
                }
                Source::Fixed(text) => (*text).into(),
                Source::FixedNumber(n) => (*n).into(),
            };
            obj = obj.field(*field, value);
        }
        Ok(obj)
    }
}

impl ModelBuilder for EnvelopeModelBuilder {
    fn build(
        &self,
        record: &ResolvedRecord,
        ctx: &BuildContext<'_>,
        sampler: &mut ValueSampler,
        doc: &mut ModelDocument,
    ) -> Result<()> {
        describe_building(&record.building, doc);
        doc.add(building_object());

        let mut constructions = Vec::with_capacity(LAYOUTS.len());
        for layout in LAYOUTS {
            let set = Self::parameters(record, ctx, layout.object)?;
            doc.add(Self::material(layout, &set, sampler)?);
            constructions.push(
                ModelObject::new("CONSTRUCTION")
                    .field("Name", layout.construction)
                    .field("Outside Layer", layout.material),
            );
        }
        for c in constructions {
            doc.add(c);
        }

        let mut ground = ModelObject::new("SITE:GROUNDTEMPERATURE:BUILDINGSURFACE");
        for (month, value) in ctx.ground.iter() {
            ground = ground.field(format!("{month} Ground Temperature"), value);
        }
        doc.add(ground);

        for variable in OUTPUT_VARIABLES {
            doc.add(
                ModelObject::new("OUTPUT:VARIABLE")
                    .field("Key Value", "*")
                    .field("Variable Name", *variable)
                    .field("Reporting Frequency", "timestep"),
            );
        }
        Ok(())
    }
}

/// Time series requested from the simulator for every model.
pub const OUTPUT_VARIABLES: &[&str] = &[
    "Facility Total Electric Demand Power",
    "Facility Total Gas Demand Power",
    "Electricity:Building",
];

fn building_object() -> ModelObject {
    ModelObject::new("BUILDING")
        .field("Name", "New Building Block")
        .field("North Axis", 0.0)
        .field("Terrain", "Suburbs")
        .field("Loads Convergence Tolerance Value", 0.04)
        .field("Temperature Convergence Tolerance Value", 0.4)
        .field("Solar Distribution", "FullExterior")
        .field("Maximum Number of Warmup Days", 150.0)
        .field("Minimum Number of Warmup Days", 1.0)
}

fn describe_building(b: &BuildingRecord, doc: &mut ModelDocument) {
    doc.comment(format!(
        "building {} ({}, {}, {})",
        b.id, b.function, b.building_type, b.age_range
    ));
    let footprint = b
        .footprint()
        .map_or_else(|| "unknown".to_string(), |(w, l)| format!("{w:.2} x {l:.2} m"));
    doc.comment(format!(
        "footprint {footprint}, {} storey(s), window-to-wall ratio {:.2}",
        b.storeys(),
        b.average_wwr.unwrap_or(DEFAULT_WWR)
    ));
}

/// Persists model documents into one output directory.
#[derive(Debug, Clone)]
pub struct ModelWriter {
    output_dir: PathBuf,
}

impl ModelWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path the model of `building_id` is written to. Distinct ids always
    /// map to distinct paths.
    pub fn artifact_path(&self, building_id: &str) -> PathBuf {
        self.output_dir
            .join(format!("{MODEL_PREFIX}{}.idf", encode_id(building_id)))
    }

    /// Writes `doc`, creating the output directory if absent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the directory or file cannot be written.
    pub fn write(&self, building_id: &str, doc: &ModelDocument) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;
        let path = self.artifact_path(building_id);
        let mut writer = BufWriter::new(File::create(&path)?);
        doc.write_idf(&mut writer)?;
        writer.flush()?;
        Ok(path)
    }
}

/// File name prefix of every written model.
pub const MODEL_PREFIX: &str = "modified_building_";

/// Percent-encodes every byte outside `[A-Za-z0-9_-]`, `%` included, so the
/// encoding is reversible.
pub fn encode_id(id: &str) -> String {
    let mut out = String::with_capacity(id.len());
    for b in id.bytes() {
        if b.is_ascii_alphanumeric() || b == b'-' || b == b'_' {
            out.push(char::from(b));
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}

/// Inverse of [`encode_id`]. Malformed escapes are kept verbatim.
pub fn decode_id(encoded: &str) -> String {
    let bytes = encoded.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let escaped = (bytes[i] == b'%')
            .then(|| encoded.get(i + 1..i + 3))
            .flatten()
            .and_then(|hex| u8::from_str_radix(hex, 16).ok());
        match escaped {
            Some(b) => {
                out.push(b);
                i += 3;
            }
            None => {
                out.push(bytes[i]);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}
