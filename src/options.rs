//! Opciones de limpieza.

use serde::Deserialize;

/// Controla qué pasadas se ejecutan y cómo se planifican.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SanitizeOptions {
    /// Elimina autor, último editor y fechas de `docProps/core.xml`.
    pub strip_core_properties: bool,
    /// Vacía la colección de comentarios de `word/comments.xml`.
    pub strip_comments: bool,
    /// Ejecuta ambas pasadas en hilos separados.
    pub parallel: bool,
}

impl Default for SanitizeOptions {
    fn default() -> Self {
        Self {
            strip_core_properties: true,
            strip_comments: true,
            parallel: true,
        }
    }
}
