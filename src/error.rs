//! Errores que puede producir la limpieza de un documento.

use thiserror::Error;

/// Resultado de las operaciones de la crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Fallos posibles al sanear un paquete `.docx`.
///
/// Ninguna variante acompaña una salida parcial: si se devuelve un error, el
/// llamador no recibe bytes y decide si envía el documento original.
#[derive(Error, Debug)]
pub enum Error {
    /// El búfer de entrada no es un ZIP legible.
    #[error("no es un documento Office válido: {0}")]
    CorruptArchive(String),

    /// Una parte objetivo existe pero no contiene XML bien formado.
    #[error("XML inválido en {part}: {reason}")]
    MalformedPart { part: String, reason: String },

    /// El contenido base64 de un adjunto no es válido.
    #[error("codificación base64 inválida: {0}")]
    Encoding(String),

    /// Fallo al escribir el archivo de salida.
    #[error("error escribiendo el archivo limpio: {0}")]
    Archive(String),
}

impl Error {
    pub(crate) fn malformed(part: &str, reason: impl ToString) -> Self {
        Error::MalformedPart {
            part: part.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::CorruptArchive(err.to_string())
    }
}

impl From<base64::DecodeError> for Error {
    fn from(err: base64::DecodeError) -> Self {
        Error::Encoding(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_part_names_the_part() {
        let err = Error::malformed("docProps/core.xml", "fin inesperado");
        assert_eq!(
            err.to_string(),
            "XML inválido en docProps/core.xml: fin inesperado"
        );
    }

    #[test]
    fn zip_errors_become_corrupt_archive() {
        let err: Error = zip::result::ZipError::InvalidArchive("bad header".into()).into();
        assert!(matches!(err, Error::CorruptArchive(_)));
    }
}
