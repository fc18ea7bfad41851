use dicom_object::mem::{InMemDicomObject, InMemElement};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("DICOM JSON conversion error: {0}")]
    Json(String),
}

pub type Result<T> = std::result::Result<T, ConvertError>;

/// Encode a whole dataset as standard DICOM JSON, keyed by `GGGGEEEE`
pub fn identifier_to_json_value(obj: &InMemDicomObject) -> Result<Value> {
    let v = dicom_json::to_value(obj).map_err(|e| ConvertError::Json(format!("{}", e)))?;
    Ok(v)
}

/// Encode a single element as its DICOM JSON attribute object,
/// e.g. `{"vr": "PN", "Value": [{"Alphabetic": "DOE^JANE"}]}`.
pub fn element_to_json_value(element: &InMemElement) -> Result<Value> {
    let obj = InMemDicomObject::from_element_iter([element.clone()]);
    match identifier_to_json_value(&obj)? {
        Value::Object(map) => Ok(map.into_iter().next().map(|(_, v)| v).unwrap_or(Value::Null)),
        other => Err(ConvertError::Json(format!(
            "expected a JSON object for element {}, got {}",
            element.header().tag,
            other
        ))),
    }
}
