use std::panic;
use std::thread;

use serde::Serialize;
use tracing::debug;

use crate::constants::{COMMENTS_PART, CORE_PROPERTIES_PART};
use crate::error::Result;
use crate::options::SanitizeOptions;

use super::archive::Package;
use super::sanitize::{PartOutcome, PartRewrite, sanitize_comments, sanitize_core_properties};

/// Clasificación de ambas partes tras una limpieza.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SanitizeOutcome {
    pub core_properties: PartOutcome,
    pub comments: PartOutcome,
}

impl SanitizeOutcome {
    /// Indica si se eliminó al menos un campo o comentario.
    pub fn is_modified(&self) -> bool {
        self.core_properties.is_cleaned() || self.comments.is_cleaned()
    }
}

/// Bytes de salida junto con lo que se hizo para obtenerlos.
#[derive(Clone, Debug)]
pub struct SanitizeReport {
    pub outcome: SanitizeOutcome,
    pub bytes: Vec<u8>,
}

/// Elimina metadata de autoría y comentarios de un `.docx` con las opciones por defecto.
///
/// Si no hay nada que eliminar devuelve exactamente los bytes de entrada.
pub fn sanitize(bytes: &[u8]) -> Result<Vec<u8>> {
    sanitize_with(bytes, &SanitizeOptions::default()).map(|report| report.bytes)
}

/// Igual que [`sanitize`], con opciones explícitas y el detalle del resultado.
pub fn sanitize_with(bytes: &[u8], options: &SanitizeOptions) -> Result<SanitizeReport> {
    let mut package = Package::open(bytes)?;
    let (core, comments) = run_passes(&package, options, true)?;
    let outcome = SanitizeOutcome {
        core_properties: core.outcome,
        comments: comments.outcome,
    };

    if !outcome.is_modified() {
        debug!(?outcome, "nada que limpiar; se devuelve el documento original");
        return Ok(SanitizeReport {
            outcome,
            bytes: bytes.to_vec(),
        });
    }

    for (part, rewrite) in [(CORE_PROPERTIES_PART, core), (COMMENTS_PART, comments)] {
        if let Some(contents) = rewrite.contents {
            package.set_entry(part, contents);
        }
    }

    debug!(?outcome, "reempaquetando documento");
    let bytes = package.serialize()?;
    Ok(SanitizeReport { outcome, bytes })
}

/// Clasifica el documento sin generar salida.
pub fn inspect(bytes: &[u8]) -> Result<SanitizeOutcome> {
    let package = Package::open(bytes)?;
    let options = SanitizeOptions {
        parallel: false,
        ..SanitizeOptions::default()
    };
    let (core, comments) = run_passes(&package, &options, false)?;
    Ok(SanitizeOutcome {
        core_properties: core.outcome,
        comments: comments.outcome,
    })
}

/// Ejecuta las dos pasadas; cada una lee una entrada distinta y no comparten estado.
fn run_passes(
    package: &Package<'_>,
    options: &SanitizeOptions,
    emit: bool,
) -> Result<(PartRewrite, PartRewrite)> {
    let core = package.entry(CORE_PROPERTIES_PART);
    let comments = package.entry(COMMENTS_PART);

    let core_pass = move || {
        run_pass(core, options.strip_core_properties, emit, sanitize_core_properties)
    };
    let comments_pass =
        move || run_pass(comments, options.strip_comments, emit, sanitize_comments);

    if !options.parallel {
        return Ok((core_pass()?, comments_pass()?));
    }

    thread::scope(|scope| {
        let core_handle = scope.spawn(core_pass);
        let comments = comments_pass();
        let core = core_handle
            .join()
            .unwrap_or_else(|payload| panic::resume_unwind(payload));
        Ok((core?, comments?))
    })
}

fn run_pass(
    contents: Option<&[u8]>,
    enabled: bool,
    emit: bool,
    pass: fn(&[u8], bool) -> Result<PartRewrite>,
) -> Result<PartRewrite> {
    match contents {
        None => Ok(PartRewrite::absent()),
        Some(_) if !enabled => Ok(PartRewrite::unchanged()),
        Some(contents) => pass(contents, emit),
    }
}
