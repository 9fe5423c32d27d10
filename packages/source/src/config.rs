//! Loader configuration: column names, text encoding and CSV dialect.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Text encoding of the CSV bytes.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum Encoding {
    /// UTF-8; invalid sequences become U+FFFD.
    #[serde(rename = "utf-8", alias = "utf8")]
    #[strum(serialize = "utf-8", serialize = "utf8")]
    Utf8,
    /// ISO-8859-1, one byte per character.
    #[default]
    #[serde(rename = "iso-8859-1", alias = "latin1")]
    #[strum(serialize = "iso-8859-1", serialize = "latin1")]
    Latin1,
}

impl Encoding {
    /// Decodes one field.
    #[must_use]
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            Self::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Self::Latin1 => bytes.iter().map(|&b| char::from(b)).collect(),
        }
    }
}

/// Header names of the columns a complaint is read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    /// Offence type. Required.
    pub offence: String,
    /// Combined `"latitude,longitude"` text. Required.
    pub position: String,
    /// Free-text location label. Required.
    pub location: String,
    /// Report time, carried as text.
    pub timestamp: String,
    /// Complaint status.
    pub status: String,
    /// Resolution photo reference.
    pub resolve_image: String,
    /// Offence photo reference.
    pub offence_image: String,
    /// When this column is absent the 0-based row number, counted across
    /// every file of the load, is the id.
    pub id: Option<String>,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            offence: "Offences".to_string(),
            position: "Latitude & Longitude".to_string(),
            location: "Geo Location".to_string(),
            timestamp: "Date and Time".to_string(),
            status: "Status".to_string(),
            resolve_image: "Resolve Image".to_string(),
            offence_image: "Offence Image".to_string(),
            id: Some("Complaint Id".to_string()),
        }
    }
}

/// Configuration for [`crate::load_records`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Header names to read.
    pub columns: ColumnNames,
    /// Text encoding of the files.
    pub encoding: Encoding,
    /// Field delimiter; only the first byte is used.
    pub delimiter: String,
    /// Maximum number of rows read across all files.
    pub max_records: Option<u64>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            columns: ColumnNames::default(),
            encoding: Encoding::default(),
            delimiter: ",".to_string(),
            max_records: None,
        }
    }
}

impl LoaderConfig {
    /// First byte of `delimiter`, or a comma when it is empty.
    #[must_use]
    pub fn delimiter_byte(&self) -> u8 {
        self.delimiter.as_bytes().first().copied().unwrap_or(b',')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn latin1_maps_bytes_to_chars() {
        assert_eq!(Encoding::Latin1.decode(b"Caf\xe9"), "Café");
    }

    #[test]
    fn utf8_is_lossy() {
        assert_eq!(Encoding::Utf8.decode("Café".as_bytes()), "Café");
        assert_eq!(Encoding::Utf8.decode(b"Caf\xe9"), "Caf\u{fffd}");
    }

    #[test]
    fn encoding_parses_from_names() {
        assert_eq!(Encoding::from_str("utf8").unwrap(), Encoding::Utf8);
        assert_eq!(Encoding::from_str("iso-8859-1").unwrap(), Encoding::Latin1);
        assert!(Encoding::from_str("ebcdic").is_err());
        assert_eq!(Encoding::Latin1.to_string(), "iso-8859-1");
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: LoaderConfig = toml::de::from_str(
            r#"
            encoding = "utf-8"
            delimiter = ";"

            [columns]
            offence = "Category"
            "#,
        )
        .unwrap();

        assert_eq!(config.encoding, Encoding::Utf8);
        assert_eq!(config.delimiter_byte(), b';');
        assert_eq!(config.columns.offence, "Category");
        assert_eq!(config.columns.position, "Latitude & Longitude");
        assert_eq!(config.max_records, None);
    }

    #[test]
    fn empty_delimiter_falls_back_to_comma() {
        let config = LoaderConfig {
            delimiter: String::new(),
            ..LoaderConfig::default()
        };
        assert_eq!(config.delimiter_byte(), b',');
    }
}
