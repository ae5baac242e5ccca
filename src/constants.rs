//! Rutas de partes y nombres de etiqueta que la limpieza toma como objetivo.

pub const CORE_PROPERTIES_PART: &str = "docProps/core.xml";
pub const COMMENTS_PART: &str = "word/comments.xml";

pub const DC_NS: &str = "http://purl.org/dc/elements/1.1/";
pub const CP_NS: &str = "http://schemas.openxmlformats.org/package/2006/metadata/core-properties";
pub const DCTERMS_NS: &str = "http://purl.org/dc/terms/";
pub const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Grafías aceptadas para la raíz de `core.xml`, primero con prefijo y luego sin él.
pub const CORE_PROPERTIES_ROOT: [&str; 2] = ["cp:coreProperties", "coreProperties"];

/// Campos que identifican al autor o la historia del documento.
pub const CORE_IDENTIFYING_FIELDS: [[&str; 2]; 5] = [
    ["dc:creator", "creator"],
    ["cp:lastModifiedBy", "lastModifiedBy"],
    ["cp:lastPrinted", "lastPrinted"],
    ["dcterms:created", "created"],
    ["dcterms:modified", "modified"],
];

/// Los mismos campos expresados por espacio de nombres, para la auditoría.
pub const AUDITED_CORE_FIELDS: [(&str, &str); 5] = [
    (DC_NS, "creator"),
    (CP_NS, "lastModifiedBy"),
    (CP_NS, "lastPrinted"),
    (DCTERMS_NS, "created"),
    (DCTERMS_NS, "modified"),
];

pub const COMMENTS_ROOT: [&str; 2] = ["w:comments", "comments"];
pub const COMMENT_NODE: [&str; 2] = ["w:comment", "comment"];

pub const DOCX_EXTENSION: &str = "docx";
pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
