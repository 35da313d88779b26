//! XML documents served by the build service's `/build` endpoints.

use serde::Deserialize;

use crate::error::RemoteError;

/// `<status package="portus" code="succeeded" />`
#[derive(Debug, Deserialize)]
pub(crate) struct StatusDoc {
    #[serde(rename = "@code", default)]
    pub code: String,
}

/// `<buildinfo><rev>1234</rev>...</buildinfo>`; every other child is ignored.
#[derive(Debug, Deserialize)]
pub(crate) struct BuildInfoDoc {
    #[serde(default)]
    pub rev: Option<String>,
}

/// `<binarylist><binary filename="..." size="..." mtime="..."/>...</binarylist>`
#[derive(Debug, Deserialize)]
pub(crate) struct BinaryListDoc {
    #[serde(rename = "binary", default)]
    pub binaries: Vec<BinaryDoc>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BinaryDoc {
    #[serde(rename = "@filename")]
    pub filename: String,
}

pub(crate) fn decode<T: for<'de> Deserialize<'de>>(body: &str) -> Result<T, RemoteError> {
    Ok(quick_xml::de::from_str(body)?)
}
