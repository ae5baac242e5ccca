//! Árbol XML explícito para las partes que se reescriben.
//!
//! Los nombres se guardan tal como aparecen en el documento (`prefijo:local`)
//! y los valores de atributos y texto se conservan sin decodificar, de modo
//! que todo lo que la limpieza no toca se vuelve a escribir igual.

use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use tracing::trace;

/// Nodo hijo de un elemento.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    /// Texto en su forma escapada original.
    Text(String),
    CData(String),
    Comment(String),
    Instruction(String),
}

/// Elemento con nombre cualificado, atributos ordenados e hijos ordenados.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

/// Parte XML completa: nodos previos a la raíz, la raíz y nodos finales.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XmlDocument {
    pub prolog: Vec<XmlNode>,
    pub root: XmlElement,
    pub epilog: Vec<XmlNode>,
}

impl XmlElement {
    /// Devuelve la grafía de `spellings` que coincide con este elemento, probando en orden.
    pub fn matched_spelling<'s>(&self, spellings: &[&'s str]) -> Option<&'s str> {
        spellings
            .iter()
            .copied()
            .find(|spelling| self.name == *spelling)
    }

    pub fn is_named(&self, spellings: &[&str]) -> bool {
        self.matched_spelling(spellings).is_some()
    }

    pub fn has_child(&self, spellings: &[&str]) -> bool {
        self.children
            .iter()
            .any(|node| matches!(node, XmlNode::Element(child) if child.is_named(spellings)))
    }

    /// Elimina los hijos cuyo nombre coincide con alguna grafía y devuelve cuántos se quitaron.
    ///
    /// El texto de sangría inmediatamente anterior a cada hijo eliminado se quita con él.
    pub fn remove_children(&mut self, spellings: &[&str]) -> usize {
        let mut kept = Vec::with_capacity(self.children.len());
        let mut removed = 0;

        for node in self.children.drain(..) {
            if let XmlNode::Element(child) = &node
                && child.is_named(spellings)
            {
                if matches!(kept.last(), Some(XmlNode::Text(text)) if is_blank(text)) {
                    kept.pop();
                }
                trace!(parent = %self.name, tag = %child.name, "nodo eliminado");
                removed += 1;
                continue;
            }
            kept.push(node);
        }

        self.children = kept;
        removed
    }

    /// Vacía el elemento si solo le queda texto en blanco.
    pub fn collapse_blank_content(&mut self) {
        let only_blank = self
            .children
            .iter()
            .all(|node| matches!(node, XmlNode::Text(text) if is_blank(text)));
        if only_blank {
            self.children.clear();
        }
    }
}

impl XmlDocument {
    /// Analiza una parte ya decodificada a texto.
    pub fn parse(text: &str) -> Result<Self, String> {
        let mut reader = Reader::from_str(text);
        reader.config_mut().trim_text(false);

        let mut prolog = Vec::new();
        let mut epilog = Vec::new();
        let mut open: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            let event = reader.read_event().map_err(|e| e.to_string())?;
            let node = match event {
                Event::Start(start) => {
                    open.push(open_element(&start)?);
                    continue;
                }
                Event::Empty(start) => XmlNode::Element(open_element(&start)?),
                Event::End(end) => {
                    let element = open.pop().ok_or_else(|| {
                        format!(
                            "cierre sin apertura: </{}>",
                            String::from_utf8_lossy(end.name().as_ref())
                        )
                    })?;
                    XmlNode::Element(element)
                }
                Event::Text(text) => {
                    let raw = utf8(&text)?;
                    if open.is_empty() {
                        if !is_blank(&raw) {
                            return Err("texto fuera del elemento raíz".to_string());
                        }
                        continue;
                    }
                    XmlNode::Text(raw)
                }
                Event::CData(data) => {
                    if open.is_empty() {
                        return Err("CDATA fuera del elemento raíz".to_string());
                    }
                    XmlNode::CData(utf8(&data)?)
                }
                Event::Comment(comment) => XmlNode::Comment(utf8(&comment)?),
                Event::PI(instruction) => XmlNode::Instruction(utf8(&instruction)?),
                Event::DocType(_) => {
                    return Err("las partes OPC no admiten declaraciones DOCTYPE".to_string());
                }
                Event::Decl(_) => continue,
                Event::Eof => break,
            };

            match (open.last_mut(), node) {
                (Some(parent), node) => parent.children.push(node),
                (None, XmlNode::Element(element)) => {
                    if root.is_some() {
                        return Err(format!("segundo elemento raíz: <{}>", element.name));
                    }
                    root = Some(element);
                }
                (None, node) if root.is_none() => prolog.push(node),
                (None, node) => epilog.push(node),
            }
        }

        if let Some(unclosed) = open.last() {
            return Err(format!("elemento sin cerrar: <{}>", unclosed.name));
        }
        let root = root.ok_or_else(|| "no hay elemento raíz".to_string())?;

        Ok(Self {
            prolog,
            root,
            epilog,
        })
    }

    /// Serializa el documento como UTF-8 con declaración XML.
    pub fn to_xml(&self) -> Result<Vec<u8>, String> {
        let mut writer = Writer::new(Vec::new());
        emit(
            &mut writer,
            Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))),
        )?;
        emit(&mut writer, Event::Text(BytesText::from_escaped("\n")))?;

        for node in &self.prolog {
            write_node(&mut writer, node)?;
        }
        write_element(&mut writer, &self.root)?;
        for node in &self.epilog {
            write_node(&mut writer, node)?;
        }

        Ok(writer.into_inner())
    }
}

/// Decodifica los bytes de una parte: UTF-8 (con o sin BOM) o UTF-16 con BOM.
pub fn decode_part(bytes: &[u8]) -> Result<String, String> {
    match bytes {
        [0xEF, 0xBB, 0xBF, rest @ ..] => utf8(rest),
        [0xFF, 0xFE, rest @ ..] => decode_utf16(rest, u16::from_le_bytes),
        [0xFE, 0xFF, rest @ ..] => decode_utf16(rest, u16::from_be_bytes),
        _ => utf8(bytes),
    }
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> Result<String, String> {
    if bytes.len() % 2 != 0 {
        return Err("UTF-16 con longitud impar".to_string());
    }
    let units = bytes.chunks_exact(2).map(|pair| unit([pair[0], pair[1]]));
    char::decode_utf16(units)
        .collect::<Result<String, _>>()
        .map_err(|e| e.to_string())
}

fn open_element(start: &BytesStart<'_>) -> Result<XmlElement, String> {
    let mut element = XmlElement {
        name: utf8(start.name().as_ref())?,
        ..XmlElement::default()
    };
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| e.to_string())?;
        let key = utf8(attribute.key.as_ref())?;
        // Los valores entre comillas simples pueden contener comillas dobles literales.
        let value = utf8(&attribute.value)?.replace('"', "&quot;");
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &XmlNode) -> Result<(), String> {
    match node {
        XmlNode::Element(element) => write_element(writer, element),
        XmlNode::Text(raw) => emit(writer, Event::Text(BytesText::from_escaped(raw.as_str()))),
        XmlNode::CData(raw) => emit(writer, Event::CData(BytesCData::new(raw.as_str()))),
        XmlNode::Comment(raw) => {
            emit(writer, Event::Comment(BytesText::from_escaped(raw.as_str())))
        }
        XmlNode::Instruction(raw) => emit(writer, Event::PI(BytesPI::new(raw.as_str()))),
    }
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &XmlElement) -> Result<(), String> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute(Attribute::from((key.as_bytes(), value.as_bytes())));
    }

    if element.children.is_empty() {
        return emit(writer, Event::Empty(start));
    }

    emit(writer, Event::Start(start))?;
    for child in &element.children {
        write_node(writer, child)?;
    }
    emit(writer, Event::End(BytesEnd::new(element.name.as_str())))
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), String> {
    writer.write_event(event).map_err(|e| e.to_string())
}

fn utf8(bytes: &[u8]) -> Result<String, String> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| e.to_string())
}

fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}
