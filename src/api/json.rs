//! JSON parsing helpers for the gateway.

/// Parse a JSON body, producing a detail string that names the serde path
/// and location of the failure. A bare `serde_json` error only reports line
/// and column, which is useless for the deeply nested payloads the backend
/// returns; the path (`data[3].fechaViaje`) is what makes reports actionable.
pub fn parse_json<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, String> {
    let deserializer = &mut serde_json::Deserializer::from_str(body);
    match serde_path_to_error::deserialize(deserializer) {
        Ok(value) => Ok(value),
        Err(err) => {
            let inner = err.inner();
            let path = err.path().to_string();
            let location = format!("line {} col {}", inner.line(), inner.column());

            let mut detail = String::new();
            if !path.is_empty() && path != "." {
                detail.push_str(&format!("at path '{path}': "));
            }
            detail.push_str(&format!("{inner} ({location})"));
            Err(detail)
        }
    }
}
