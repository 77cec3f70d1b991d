//! The backing document: five named arrays in one JSON file.
//!
//! Loading is lenient. A missing or unparseable file yields five empty
//! collections. Individual elements that fail to decode are hidden from the
//! collections but kept verbatim and written back after them on save.
//! Saving replaces the whole file through a same-directory temp file, so a
//! crash mid-write leaves the previous document intact.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::models::records::{Education, Experience, PersonalInfo, Skill, SocialMedia};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    pub skill: Vec<Skill>,
    pub social_media: Vec<SocialMedia>,
    pub personal_info: Vec<PersonalInfo>,
    pub unparsed: Unparsed,
}

/// Elements of the loaded file that did not decode as records, per
/// collection, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Unparsed {
    pub experience: Vec<Value>,
    pub education: Vec<Value>,
    pub skill: Vec<Value>,
    pub social_media: Vec<Value>,
    pub personal_info: Vec<Value>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Entry<'a, T> {
    Record(&'a T),
    Raw(&'a Value),
}

fn entries<'a, T>(records: &'a [T], raw: &'a [Value]) -> Vec<Entry<'a, T>> {
    records
        .iter()
        .map(Entry::Record)
        .chain(raw.iter().map(Entry::Raw))
        .collect()
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let raw = &self.unparsed;
        let mut state = serializer.serialize_struct("Document", 5)?;
        state.serialize_field("experience", &entries(&self.experience, &raw.experience))?;
        state.serialize_field("education", &entries(&self.education, &raw.education))?;
        state.serialize_field("skill", &entries(&self.skill, &raw.skill))?;
        state.serialize_field(
            "social_media",
            &entries(&self.social_media, &raw.social_media),
        )?;
        state.serialize_field(
            "personal_info",
            &entries(&self.personal_info, &raw.personal_info),
        )?;
        state.end()
    }
}

/// Undecoded shape of the file; elements are decoded one by one so a bad
/// entry does not take the rest of its collection down with it.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawDocument {
    experience: Vec<Value>,
    education: Vec<Value>,
    skill: Vec<Value>,
    social_media: Vec<Value>,
    personal_info: Vec<Value>,
}

impl Document {
    /// Reads the document at `path`, substituting empty collections when the
    /// file is missing or malformed.
    pub fn load(path: &Path) -> Document {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("Data file {} not found, starting empty", path.display());
                return Document::default();
            }
            Err(e) => {
                warn!("Failed to read {}: {e}, starting empty", path.display());
                return Document::default();
            }
        };

        match Document::parse(&text) {
            Ok(document) => document,
            Err(e) => {
                warn!("Error decoding {}: {e}, starting empty", path.display());
                Document::default()
            }
        }
    }

    pub fn parse(text: &str) -> Result<Document, serde_json::Error> {
        let raw: RawDocument = serde_json::from_str(text)?;
        let mut unparsed = Unparsed::default();
        Ok(Document {
            experience: decode_elements("experience", raw.experience, &mut unparsed.experience),
            education: decode_elements("education", raw.education, &mut unparsed.education),
            skill: decode_elements("skill", raw.skill, &mut unparsed.skill),
            social_media: decode_elements(
                "social_media",
                raw.social_media,
                &mut unparsed.social_media,
            ),
            personal_info: decode_elements(
                "personal_info",
                raw.personal_info,
                &mut unparsed.personal_info,
            ),
            unparsed,
        })
    }

    /// Pretty-printed JSON with four-space indentation.
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut serializer)?;
        Ok(buf)
    }
}

fn decode_elements<T: DeserializeOwned>(
    collection: &str,
    values: Vec<Value>,
    rejected: &mut Vec<Value>,
) -> Vec<T> {
    let mut records = Vec::with_capacity(values.len());
    for (index, value) in values.into_iter().enumerate() {
        match T::deserialize(&value) {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!("Skipping {collection}[{index}]: {e}");
                rejected.push(value);
            }
        }
    }
    records
}

/// Replaces `path` with `bytes` in a single rename.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory {}", dir.display()))?;

    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to replace {}", path.display()))?;

    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}
