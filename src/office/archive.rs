use std::io::{Cursor, Read, Write};

use zip::write::FileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::error::{Error, Result};

use super::xml::decode_part;

struct Entry {
    name: String,
    contents: Vec<u8>,
    is_dir: bool,
    replaced: bool,
}

/// Paquete `.docx` abierto en memoria.
///
/// Conserva el ZIP original para copiar sin recomprimir las entradas que no
/// se reemplazan; solo las entradas tocadas con [`Package::set_entry`] se
/// vuelven a escribir.
pub struct Package<'a> {
    archive: ZipArchive<Cursor<&'a [u8]>>,
    entries: Vec<Entry>,
}

impl<'a> Package<'a> {
    /// Abre un búfer ZIP y lee el contenido de todas sus entradas.
    pub fn open(bytes: &'a [u8]) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;

        // `ZipArchive` fusiona los registros con el mismo nombre, así que una
        // ruta repetida solo se detecta comparando con lo que declara el EOCD.
        let declared = declared_entry_count(bytes).ok_or_else(|| {
            Error::CorruptArchive("directorio central ilegible".to_string())
        })?;
        if declared != archive.len() as u64 {
            return Err(Error::CorruptArchive(format!(
                "el directorio central declara {} entradas pero solo hay {} rutas distintas",
                declared,
                archive.len()
            )));
        }

        let mut entries = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let name = file.name().to_string();

            let is_dir = file.is_dir();
            let mut contents = Vec::new();
            if !is_dir {
                file.read_to_end(&mut contents)
                    .map_err(|e| Error::CorruptArchive(format!("error leyendo {}: {}", name, e)))?;
            }

            entries.push(Entry {
                name,
                contents,
                is_dir,
                replaced: false,
            });
        }

        Ok(Self { archive, entries })
    }

    /// Nombres de las entradas en el orden del archivo original.
    pub fn entry_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_str())
    }

    /// Contenido actual de una entrada, o `None` si no existe.
    pub fn entry(&self, path: &str) -> Option<&[u8]> {
        self.find(path).map(|entry| entry.contents.as_slice())
    }

    /// Contenido de una entrada decodificado como texto.
    pub fn entry_text(&self, path: &str) -> Result<Option<String>> {
        self.entry(path)
            .map(|bytes| decode_part(bytes).map_err(|reason| Error::malformed(path, reason)))
            .transpose()
    }

    /// Sustituye el contenido de una entrada existente sin alterar el orden.
    ///
    /// Devuelve `false` si no hay ninguna entrada de archivo con ese nombre.
    pub fn set_entry(&mut self, path: &str, contents: Vec<u8>) -> bool {
        match self
            .entries
            .iter_mut()
            .find(|entry| !entry.is_dir && entry.name == path)
        {
            Some(entry) => {
                entry.contents = contents;
                entry.replaced = true;
                true
            }
            None => false,
        }
    }

    /// Genera el ZIP de salida.
    pub fn serialize(mut self) -> Result<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

        for (index, entry) in self.entries.iter().enumerate() {
            let file = self
                .archive
                .by_index_raw(index)
                .map_err(|e| write_error(&entry.name, e))?;

            if !entry.replaced {
                writer
                    .raw_copy_file(file)
                    .map_err(|e| write_error(&entry.name, e))?;
                continue;
            }

            let mut options =
                FileOptions::<'_, ()>::default().compression_method(file.compression());
            if let Some(mode) = file.unix_mode() {
                options = options.unix_permissions(mode);
            }
            if let Some(time) = file.last_modified() {
                options = options.last_modified_time(time);
            }
            drop(file);

            writer
                .start_file(entry.name.as_str(), options)
                .map_err(|e| write_error(&entry.name, e))?;
            writer
                .write_all(&entry.contents)
                .map_err(|e| write_error(&entry.name, e))?;
        }

        let cursor = writer
            .finish()
            .map_err(|e| Error::Archive(format!("error finalizando archivo: {}", e)))?;
        Ok(cursor.into_inner())
    }

    fn find(&self, path: &str) -> Option<&Entry> {
        self.entries
            .iter()
            .find(|entry| !entry.is_dir && entry.name == path)
    }
}

fn write_error(name: &str, err: impl std::fmt::Display) -> Error {
    Error::Archive(format!("{}: {}", name, err))
}

const EOCD_SIGNATURE: [u8; 4] = [0x50, 0x4b, 0x05, 0x06];
const ZIP64_LOCATOR_SIGNATURE: [u8; 4] = [0x50, 0x4b, 0x06, 0x07];
const ZIP64_EOCD_SIGNATURE: [u8; 4] = [0x50, 0x4b, 0x06, 0x06];
const EOCD_LEN: usize = 22;
const ZIP64_LOCATOR_LEN: usize = 20;

/// Total de registros que declara el fin del directorio central (o su versión zip64).
fn declared_entry_count(bytes: &[u8]) -> Option<u64> {
    let last = bytes.len().checked_sub(EOCD_LEN)?;
    let lowest = last.saturating_sub(usize::from(u16::MAX));
    let eocd = (lowest..=last).rev().find(|&at| {
        bytes[at..at + 4] == EOCD_SIGNATURE
            && read_u16(bytes, at + 20)
                .is_some_and(|comment| at + EOCD_LEN + usize::from(comment) <= bytes.len())
    })?;

    let total = read_u16(bytes, eocd + 10)?;
    if total != u16::MAX {
        return Some(u64::from(total));
    }

    let Some(locator) = eocd.checked_sub(ZIP64_LOCATOR_LEN) else {
        return Some(u64::from(total));
    };
    if bytes[locator..locator + 4] != ZIP64_LOCATOR_SIGNATURE {
        return Some(u64::from(total));
    }
    let record = usize::try_from(read_u64(bytes, locator + 8)?).ok()?;
    if bytes.get(record..record + 4)? != ZIP64_EOCD_SIGNATURE {
        return None;
    }
    read_u64(bytes, record + 32)
}

fn read_u16(bytes: &[u8], at: usize) -> Option<u16> {
    let raw = bytes.get(at..at + 2)?;
    Some(u16::from_le_bytes([raw[0], raw[1]]))
}

fn read_u64(bytes: &[u8], at: usize) -> Option<u64> {
    let raw: [u8; 8] = bytes.get(at..at + 8)?.try_into().ok()?;
    Some(u64::from_le_bytes(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use zip::CompressionMethod;
    use zip::write::SimpleFileOptions;

    fn build_zip(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        for (name, contents) in entries {
            writer.start_file(*name, options).expect("start_file");
            writer.write_all(contents.as_bytes()).expect("write_all");
        }
        writer.finish().expect("finish").into_inner()
    }

    #[test]
    fn missing_entry_is_not_an_error() -> Result<()> {
        let bytes = build_zip(&[("word/document.xml", "<w:document/>")]);
        let package = Package::open(&bytes)?;

        assert_eq!(package.entry("docProps/core.xml"), None);
        assert_eq!(package.entry_text("docProps/core.xml")?, None);
        assert_eq!(
            package.entry_text("word/document.xml")?.as_deref(),
            Some("<w:document/>")
        );
        Ok(())
    }

    #[test]
    fn set_entry_replaces_only_the_named_entry() -> Result<()> {
        let bytes = build_zip(&[("a.xml", "<a/>"), ("b.xml", "<b/>"), ("c.xml", "<c/>")]);
        let mut package = Package::open(&bytes)?;

        assert!(package.set_entry("b.xml", b"<b x=\"1\"/>".to_vec()));
        assert!(!package.set_entry("d.xml", b"<d/>".to_vec()));

        let output = package.serialize()?;
        let reopened = Package::open(&output)?;
        assert_eq!(
            reopened.entry_names().collect::<Vec<_>>(),
            ["a.xml", "b.xml", "c.xml"]
        );
        assert_eq!(reopened.entry("a.xml"), Some(&b"<a/>"[..]));
        assert_eq!(reopened.entry("b.xml"), Some(&b"<b x=\"1\"/>"[..]));
        assert_eq!(reopened.entry("c.xml"), Some(&b"<c/>"[..]));
        Ok(())
    }

    #[test]
    fn replaced_entry_keeps_its_compression_method() -> Result<()> {
        let bytes = build_zip(&[("a.xml", "<a/>")]);
        let mut package = Package::open(&bytes)?;
        package.set_entry("a.xml", b"<a>nuevo</a>".to_vec());

        let output = package.serialize()?;
        let mut archive = ZipArchive::new(Cursor::new(&output[..]))?;
        let file = archive.by_name("a.xml")?;
        assert_eq!(file.compression(), CompressionMethod::Deflated);
        Ok(())
    }

    #[test]
    fn declared_count_matches_a_regular_archive() {
        let bytes = build_zip(&[("a.xml", "<a/>"), ("b.xml", "<b/>")]);
        assert_eq!(declared_entry_count(&bytes), Some(2));
        assert_eq!(declared_entry_count(b"PK"), None);
    }

    #[test]
    fn unreadable_source_entry_while_writing_is_an_archive_error() {
        let err = write_error("word/comments.xml", zip::result::ZipError::FileNotFound);
        assert!(matches!(err, Error::Archive(message) if message.starts_with("word/comments.xml")));
    }

    #[test]
    fn rejects_non_zip_input() {
        let result = Package::open(b"esto no es un zip");
        assert!(matches!(result, Err(Error::CorruptArchive(_))));
    }
}
