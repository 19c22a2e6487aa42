use crate::messages;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Student {
    pub id: i64,
    pub student_code: String,
    pub full_name: String,
    #[schema(value_type = String, format = Date, example = "2010-05-01")]
    pub birth_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StudentFile {
    pub id: i64,
    pub student_id: i64,
    /// Generated name the blob is stored under
    pub filename: String,
    /// Name as uploaded
    pub original_name: String,
    pub mime_type: String,
    pub storage_path: String,
    #[serde(with = "timestamp")]
    #[schema(value_type = String, format = DateTime)]
    pub upload_date: DateTime<Utc>,
}

/// Body of `POST /api/students` and `PUT /api/students/:id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema, Validate)]
pub struct StudentPayload {
    #[validate(required, length(min = 1))]
    #[serde(default, deserialize_with = "text_or_number")]
    #[schema(example = "2024001")]
    pub student_code: Option<String>,
    #[validate(required, length(min = 1))]
    #[serde(default, deserialize_with = "text_or_number")]
    #[schema(example = "Ana Silva")]
    pub full_name: Option<String>,
    #[validate(required, length(min = 1))]
    #[serde(default, deserialize_with = "text_or_number")]
    #[schema(example = "2010-05-01")]
    pub birth_date: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrNumber {
    Text(String),
    Number(serde_json::Number),
}

/// Forms often send numeric codes unquoted; they are kept as text.
fn text_or_number<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<TextOrNumber>::deserialize(deserializer)?.map(|value| match value {
        TextOrNumber::Text(text) => text,
        TextOrNumber::Number(number) => number.to_string(),
    }))
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PayloadError {
    #[error("{}", messages::REQUIRED_FIELDS)]
    MissingFields,

    #[error("{}", messages::INVALID_BIRTH_DATE)]
    InvalidBirthDate,
}

impl StudentPayload {
    pub fn new(student_code: &str, full_name: &str, birth_date: &str) -> Self {
        Self {
            student_code: Some(student_code.to_string()),
            full_name: Some(full_name.to_string()),
            birth_date: Some(birth_date.to_string()),
        }
    }

    fn trimmed(self) -> Self {
        let trim = |v: Option<String>| v.map(|s| s.trim().to_string());
        Self {
            student_code: trim(self.student_code),
            full_name: trim(self.full_name),
            birth_date: trim(self.birth_date),
        }
    }

    /// Blank fields count as missing. Birth dates must be `YYYY-MM-DD`.
    pub fn into_new_student(self) -> Result<NewStudent, PayloadError> {
        let payload = self.trimmed();
        payload.validate().map_err(|_| PayloadError::MissingFields)?;

        let (Some(student_code), Some(full_name), Some(birth_date)) =
            (payload.student_code, payload.full_name, payload.birth_date)
        else {
            return Err(PayloadError::MissingFields);
        };
        let birth_date = NaiveDate::parse_from_str(&birth_date, "%Y-%m-%d")
            .map_err(|_| PayloadError::InvalidBirthDate)?;

        Ok(NewStudent {
            student_code,
            full_name,
            birth_date,
        })
    }
}

impl From<&Student> for StudentPayload {
    fn from(student: &Student) -> Self {
        Self {
            student_code: Some(student.student_code.clone()),
            full_name: Some(student.full_name.clone()),
            birth_date: Some(student.birth_date.format("%Y-%m-%d").to_string()),
        }
    }
}

/// Fields written when creating or updating a student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewStudent {
    pub student_code: String,
    pub full_name: String,
    pub birth_date: NaiveDate,
}

/// Row inserted after a blob has been stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewStudentFile {
    pub student_id: i64,
    pub filename: String,
    pub original_name: String,
    pub mime_type: String,
    pub storage_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DownloadUrl {
    pub url: String,
}

/// Upload timestamps arrive either with an offset or as a bare
/// `timestamp without time zone`, which is read as UTC.
pub mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp: {raw}")))
    }

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        // Postgres renders offsets as "+00" which RFC 3339 rejects
        if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%#z") {
            return Some(dt.with_timezone(&Utc));
        }
        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .map(|naive| naive.and_utc())
    }
}
