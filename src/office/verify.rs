use std::io::Cursor;

use serde::Serialize;
use xmltree::{Element, XMLNode};

use crate::constants::{AUDITED_CORE_FIELDS, COMMENTS_PART, CORE_PROPERTIES_PART, W_NS};
use crate::error::{Error, Result};

use super::archive::Package;

/// Lo que queda de metadata identificable en un documento.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    /// Nombres locales de los campos de autoría presentes en `core.xml`.
    pub remaining_core_fields: Vec<String>,
    /// Número de comentarios en `comments.xml`.
    pub remaining_comments: usize,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.remaining_core_fields.is_empty() && self.remaining_comments == 0
    }
}

/// Comprueba, con un analizador que resuelve espacios de nombres, que un
/// documento no conserva autoría ni comentarios.
pub fn audit(bytes: &[u8]) -> Result<AuditReport> {
    let package = Package::open(bytes)?;
    let mut report = AuditReport::default();

    if let Some(contents) = package.entry(CORE_PROPERTIES_PART) {
        let root = parse_tree(CORE_PROPERTIES_PART, contents)?;
        for &(namespace, local_name) in &AUDITED_CORE_FIELDS {
            if count_children(&root, namespace, local_name) > 0 {
                report.remaining_core_fields.push(local_name.to_string());
            }
        }
    }

    if let Some(contents) = package.entry(COMMENTS_PART) {
        let root = parse_tree(COMMENTS_PART, contents)?;
        report.remaining_comments = count_children(&root, W_NS, "comment");
    }

    Ok(report)
}

fn parse_tree(part: &str, contents: &[u8]) -> Result<Element> {
    Element::parse(Cursor::new(contents)).map_err(|e| Error::malformed(part, e))
}

fn count_children(root: &Element, namespace: &str, local_name: &str) -> usize {
    root.children
        .iter()
        .filter(|node| matches!(node, XMLNode::Element(child) if element_matches(child, namespace, local_name)))
        .count()
}

/// Un elemento sin prefijo cuenta aunque viva en el espacio de nombres por defecto de la parte.
fn element_matches(element: &Element, namespace: &str, local_name: &str) -> bool {
    if element.name != local_name {
        return false;
    }

    match (element.prefix.as_deref(), element.namespace.as_deref()) {
        (None, _) => true,
        (Some(_), Some(actual)) => actual == namespace,
        (Some(_), None) => false,
    }
}
