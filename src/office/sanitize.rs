use serde::Serialize;
use tracing::debug;

use crate::constants::{
    COMMENT_NODE, COMMENTS_PART, COMMENTS_ROOT, CORE_IDENTIFYING_FIELDS, CORE_PROPERTIES_PART,
    CORE_PROPERTIES_ROOT,
};
use crate::error::{Error, Result};

use super::xml::{XmlDocument, decode_part};

/// Resultado de la limpieza de una parte concreta.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PartOutcome {
    /// La parte no existe en el paquete.
    Absent,
    /// La parte existe pero no había nada que eliminar.
    Unchanged,
    /// Se eliminaron `removed` nodos.
    Cleaned { removed: usize },
}

impl PartOutcome {
    pub fn is_cleaned(self) -> bool {
        matches!(self, PartOutcome::Cleaned { .. })
    }
}

/// Clasificación de una pasada junto con el XML reescrito, si lo hubo.
pub(crate) struct PartRewrite {
    pub(crate) outcome: PartOutcome,
    pub(crate) contents: Option<Vec<u8>>,
}

impl PartRewrite {
    pub(crate) fn absent() -> Self {
        Self {
            outcome: PartOutcome::Absent,
            contents: None,
        }
    }

    pub(crate) fn unchanged() -> Self {
        Self {
            outcome: PartOutcome::Unchanged,
            contents: None,
        }
    }

    fn cleaned(removed: usize, contents: Option<Vec<u8>>) -> Self {
        Self {
            outcome: PartOutcome::Cleaned { removed },
            contents,
        }
    }
}

/// Quita autor, último editor, última impresión y fechas de `docProps/core.xml`.
///
/// Con `emit` desactivado solo se clasifica la parte y no se serializa.
pub(crate) fn sanitize_core_properties(contents: &[u8], emit: bool) -> Result<PartRewrite> {
    let mut document = parse_part(CORE_PROPERTIES_PART, contents)?;

    let Some(root_spelling) = document.root.matched_spelling(&CORE_PROPERTIES_ROOT) else {
        debug!(root = %document.root.name, "core.xml sin raíz de propiedades reconocida");
        return Ok(PartRewrite::unchanged());
    };

    let removed: usize = CORE_IDENTIFYING_FIELDS
        .iter()
        .map(|spellings| document.root.remove_children(spellings))
        .sum();

    debug!(root = root_spelling, removed, "core.xml revisado");
    if removed == 0 {
        return Ok(PartRewrite::unchanged());
    }

    let output = emit
        .then(|| write_part(CORE_PROPERTIES_PART, &document))
        .transpose()?;
    Ok(PartRewrite::cleaned(removed, output))
}

/// Vacía la colección de comentarios de `word/comments.xml`, conservando la raíz.
pub(crate) fn sanitize_comments(contents: &[u8], emit: bool) -> Result<PartRewrite> {
    let mut document = parse_part(COMMENTS_PART, contents)?;

    if !document.root.is_named(&COMMENTS_ROOT) || !document.root.has_child(&COMMENT_NODE) {
        debug!(root = %document.root.name, "comments.xml sin comentarios");
        return Ok(PartRewrite::unchanged());
    }

    let removed = document.root.remove_children(&COMMENT_NODE);
    document.root.collapse_blank_content();
    debug!(removed, "comentarios eliminados");

    let output = emit
        .then(|| write_part(COMMENTS_PART, &document))
        .transpose()?;
    Ok(PartRewrite::cleaned(removed, output))
}

fn parse_part(part: &str, contents: &[u8]) -> Result<XmlDocument> {
    let text = decode_part(contents).map_err(|reason| Error::malformed(part, reason))?;
    XmlDocument::parse(&text).map_err(|reason| Error::malformed(part, reason))
}

fn write_part(part: &str, document: &XmlDocument) -> Result<Vec<u8>> {
    document
        .to_xml()
        .map_err(|e| Error::Archive(format!("{}: {}", part, e)))
}
