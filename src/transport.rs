//! Utilidades para el límite con el cliente de correo: adjuntos en base64 y
//! detección de documentos Word.

use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::constants::{DOCX_CONTENT_TYPE, DOCX_EXTENSION};
use crate::error::Result;
use crate::office::sanitize_with;
use crate::options::SanitizeOptions;

pub fn decode_attachment(encoded: &str) -> Result<Vec<u8>> {
    Ok(STANDARD.decode(encoded.trim())?)
}

pub fn encode_attachment(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Limpia un adjunto codificado en base64.
///
/// Si no se eliminó nada devuelve la misma cadena recibida.
pub fn sanitize_base64(encoded: &str) -> Result<String> {
    let bytes = decode_attachment(encoded)?;
    let report = sanitize_with(&bytes, &SanitizeOptions::default())?;
    if !report.outcome.is_modified() {
        return Ok(encoded.to_string());
    }
    Ok(encode_attachment(&report.bytes))
}

/// Decide si un adjunto es un documento Word por su extensión o tipo MIME.
pub fn is_word_attachment(name: &str, content_type: Option<&str>) -> bool {
    let by_extension = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(DOCX_EXTENSION));

    let by_content_type = content_type.is_some_and(|value| {
        let essence = value.split(';').next().unwrap_or_default().trim();
        essence.eq_ignore_ascii_case(DOCX_CONTENT_TYPE)
    });

    by_extension || by_content_type
}
