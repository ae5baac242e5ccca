//! Limpieza de documentos Word: adaptador del ZIP, árbol XML y pasadas de limpieza.

mod archive;
mod clean;
mod sanitize;
mod verify;
mod xml;

pub use archive::Package;
pub use clean::{SanitizeOutcome, SanitizeReport, inspect, sanitize, sanitize_with};
pub use sanitize::PartOutcome;
pub use verify::{AuditReport, audit};
pub use xml::{XmlDocument, XmlElement, XmlNode};
