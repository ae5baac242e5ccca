//! Elimina la metadata de autoría y los comentarios de revisión de documentos
//! Word (`.docx`) y vuelve a empaquetar el resto del archivo sin cambios.
//!
//! ```no_run
//! let original = std::fs::read("informe.docx")?;
//! let limpio = docx_scrub::sanitize(&original)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod constants;
mod error;
pub mod office;
mod options;
pub mod transport;

pub use error::{Error, Result};
pub use office::{
    AuditReport, Package, PartOutcome, SanitizeOutcome, SanitizeReport, audit, inspect, sanitize,
    sanitize_with,
};
pub use options::SanitizeOptions;
