use crate::listing::ListRecord;
use crate::util::parse_timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Firestore hands back `nullValue` for cleared fields; treat it like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub(crate) struct Flags {
    #[serde(default, deserialize_with = "null_as_default")]
    pub png: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub(crate) struct Currency {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub symbol: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub(crate) struct Language {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

/// One element of `countriesList/allCountries.countries`.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Country {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub alpha3_code: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub region: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub capital: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub population: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub flags: Flags,
    #[serde(default, deserialize_with = "null_as_default")]
    pub currencies: Vec<Currency>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub languages: Vec<Language>,
}

impl ListRecord for Country {
    fn key(&self) -> String {
        self.alpha3_code.clone()
    }

    fn search_field(&self) -> Option<&str> {
        Some(&self.name)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub(crate) struct WonderLinks {
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<String>,
    #[serde(default)]
    pub wiki: Option<String>,
    #[serde(default)]
    pub britannica: Option<String>,
    #[serde(default)]
    pub google_maps: Option<String>,
    #[serde(default)]
    pub trip_advisor: Option<String>,
}

/// One element of `wondersList/allWonders.wonders`. Stored snake_case.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub(crate) struct Wonder {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: String,
    /// Either a number or free text such as `"c. 2560 BC"`.
    #[serde(default)]
    pub build_year: Value,
    #[serde(default, deserialize_with = "null_as_default")]
    pub time_period: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub links: WonderLinks,
}

impl ListRecord for Wonder {
    fn key(&self) -> String {
        self.name.clone()
    }

    fn search_field(&self) -> Option<&str> {
        Some(&self.name)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DeviceInfo {
    #[serde(default)]
    pub device_name: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub os_name: Option<String>,
    #[serde(default)]
    pub os_version: Option<String>,
    #[serde(default)]
    pub created_at: Option<Value>,
}

/// One element of `feedback/userFeedback.feedBacks`.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Feedback {
    #[serde(default, deserialize_with = "null_as_default")]
    pub uuid: String,
    #[serde(default)]
    pub feedback_content: Option<String>,
    #[serde(default)]
    pub device_info: Option<DeviceInfo>,
}

impl Feedback {
    pub fn device(&self) -> DeviceInfo {
        self.device_info.clone().unwrap_or_default()
    }
}

impl ListRecord for Feedback {
    fn key(&self) -> String {
        self.uuid.clone()
    }

    fn search_field(&self) -> Option<&str> {
        self.feedback_content.as_deref()
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.device_info
            .as_ref()?
            .created_at
            .as_ref()
            .and_then(parse_timestamp)
    }
}

/// A document of the `users` collection. `id` is the document id.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserRecord {
    pub id: String,
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub created_at: Option<Value>,
    #[serde(default)]
    pub device_name: Option<String>,
    #[serde(default)]
    pub os_name: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub model_name: Option<String>,

    /// Everything else stored on the document; shown in the details dialog.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl UserRecord {
    /// Every stored field as `(name, value)`, named fields first.
    pub fn all_fields(&self) -> Vec<(String, Value)> {
        let opt = |v: &Option<String>| v.clone().map(Value::String).unwrap_or(Value::Null);
        let mut out = vec![
            ("id".to_string(), Value::String(self.id.clone())),
            ("uuid".to_string(), opt(&self.uuid)),
            (
                "createdAt".to_string(),
                self.created_at.clone().unwrap_or(Value::Null),
            ),
            ("deviceName".to_string(), opt(&self.device_name)),
            ("osName".to_string(), opt(&self.os_name)),
            ("brand".to_string(), opt(&self.brand)),
            ("modelName".to_string(), opt(&self.model_name)),
        ];
        out.extend(self.extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        out
    }
}

impl ListRecord for UserRecord {
    fn key(&self) -> String {
        self.id.clone()
    }

    fn search_field(&self) -> Option<&str> {
        self.uuid.as_deref()
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at.as_ref().and_then(parse_timestamp)
    }
}
