use serde::{
    de::{self, DeserializeOwned},
    Deserialize, Deserializer, Serialize,
};
use serde_json::Value;

use crate::store::document::Document;
use crate::store::position::Addressing;

/// A record type stored in one of the document's collections.
///
/// Implementors describe which collection they live in, how that collection
/// is addressed, and which fields a create payload must carry.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Key of the collection in the backing document.
    const COLLECTION: &'static str;
    const ADDRESSING: Addressing;
    const REQUIRED_FIELDS: &'static [&'static str];
    /// Whether records carry a stored `id` assigned on append.
    const ID_BEARING: bool;

    fn collection(document: &Document) -> &Vec<Self>;
    fn collection_mut(document: &mut Document) -> &mut Vec<Self>;

    fn id(&self) -> Option<u64> {
        None
    }

    fn set_id(&mut self, _id: u64) {}
}

fn default_id() -> u64 {
    1
}

/// Reads a text field, accepting JSON numbers and booleans in its place.
/// Hand-edited data files often store years and phone numbers as numbers.
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(de::Error::custom(format!(
            "expected a string, found {other}"
        ))),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Experience {
    #[serde(deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(deserialize_with = "lenient_string")]
    pub company: String,
    #[serde(deserialize_with = "lenient_string")]
    pub start_date: String,
    #[serde(deserialize_with = "lenient_string")]
    pub end_date: String,
    #[serde(deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(deserialize_with = "lenient_string")]
    pub logo: String,
    pub id: u64,
}

impl Default for Experience {
    fn default() -> Self {
        Self {
            title: String::new(),
            company: String::new(),
            start_date: String::new(),
            end_date: String::new(),
            description: String::new(),
            logo: String::new(),
            id: default_id(),
        }
    }
}

impl Record for Experience {
    const COLLECTION: &'static str = "experience";
    const ADDRESSING: Addressing = Addressing::OneBased;
    const REQUIRED_FIELDS: &'static [&'static str] = &[
        "title",
        "company",
        "start_date",
        "end_date",
        "description",
        "logo",
    ];
    const ID_BEARING: bool = true;

    fn collection(document: &Document) -> &Vec<Self> {
        &document.experience
    }

    fn collection_mut(document: &mut Document) -> &mut Vec<Self> {
        &mut document.experience
    }

    fn id(&self) -> Option<u64> {
        Some(self.id)
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Education {
    #[serde(deserialize_with = "lenient_string")]
    pub course: String,
    #[serde(deserialize_with = "lenient_string")]
    pub school: String,
    #[serde(deserialize_with = "lenient_string")]
    pub start_date: String,
    #[serde(deserialize_with = "lenient_string")]
    pub end_date: String,
    #[serde(deserialize_with = "lenient_string")]
    pub grade: String,
    #[serde(deserialize_with = "lenient_string")]
    pub logo: String,
    pub id: u64,
}

impl Default for Education {
    fn default() -> Self {
        Self {
            course: String::new(),
            school: String::new(),
            start_date: String::new(),
            end_date: String::new(),
            grade: String::new(),
            logo: String::new(),
            id: default_id(),
        }
    }
}

impl Record for Education {
    const COLLECTION: &'static str = "education";
    const ADDRESSING: Addressing = Addressing::OneBased;
    const REQUIRED_FIELDS: &'static [&'static str] =
        &["course", "school", "start_date", "end_date", "grade", "logo"];
    const ID_BEARING: bool = true;

    fn collection(document: &Document) -> &Vec<Self> {
        &document.education
    }

    fn collection_mut(document: &mut Document) -> &mut Vec<Self> {
        &mut document.education
    }

    fn id(&self) -> Option<u64> {
        Some(self.id)
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }
}

/// A skill has no stored id; its position in the collection is its identity.
/// All three fields are mandatory, both on create and when loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub proficiency: String,
    #[serde(deserialize_with = "lenient_string")]
    pub logo: String,
}

impl Record for Skill {
    const COLLECTION: &'static str = "skill";
    const ADDRESSING: Addressing = Addressing::ZeroBased;
    const REQUIRED_FIELDS: &'static [&'static str] = &["name", "proficiency", "logo"];
    const ID_BEARING: bool = false;

    fn collection(document: &Document) -> &Vec<Self> {
        &document.skill
    }

    fn collection_mut(document: &mut Document) -> &mut Vec<Self> {
        &mut document.skill
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialMedia {
    #[serde(deserialize_with = "lenient_string")]
    pub linkedin: String,
    #[serde(deserialize_with = "lenient_string")]
    pub github: String,
    #[serde(deserialize_with = "lenient_string")]
    pub twitter: String,
    #[serde(deserialize_with = "lenient_string")]
    pub portfolio: String,
    #[serde(deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(deserialize_with = "lenient_string")]
    pub phone: String,
    pub id: u64,
}

impl Default for SocialMedia {
    fn default() -> Self {
        Self {
            linkedin: String::new(),
            github: String::new(),
            twitter: String::new(),
            portfolio: String::new(),
            email: String::new(),
            phone: String::new(),
            id: default_id(),
        }
    }
}

impl Record for SocialMedia {
    const COLLECTION: &'static str = "social_media";
    const ADDRESSING: Addressing = Addressing::OneBased;
    const REQUIRED_FIELDS: &'static [&'static str] = &[
        "linkedin",
        "github",
        "twitter",
        "portfolio",
        "email",
        "phone",
    ];
    const ID_BEARING: bool = true;

    fn collection(document: &Document) -> &Vec<Self> {
        &document.social_media
    }

    fn collection_mut(document: &mut Document) -> &mut Vec<Self> {
        &mut document.social_media
    }

    fn id(&self) -> Option<u64> {
        Some(self.id)
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalInfo {
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub address: String,
    #[serde(deserialize_with = "lenient_string")]
    pub year_of_birth: String,
    pub id: u64,
}

impl Default for PersonalInfo {
    fn default() -> Self {
        Self {
            name: String::new(),
            address: String::new(),
            year_of_birth: String::new(),
            id: default_id(),
        }
    }
}

impl Record for PersonalInfo {
    const COLLECTION: &'static str = "personal_info";
    const ADDRESSING: Addressing = Addressing::OneBased;
    const REQUIRED_FIELDS: &'static [&'static str] = &["name", "address", "year_of_birth"];
    const ID_BEARING: bool = true;

    fn collection(document: &Document) -> &Vec<Self> {
        &document.personal_info
    }

    fn collection_mut(document: &mut Document) -> &mut Vec<Self> {
        &mut document.personal_info
    }

    fn id(&self) -> Option<u64> {
        Some(self.id)
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }
}
