use crate::ifc::model::{Attribute, Entity, IfcModel};
use crate::ifc::value::{IfcValue, PrimitiveValue};
use crate::utils::error::{EpdIfcError, Result};
use chrono::{DateTime, Utc};
use std::fmt::Write;

pub const DEFAULT_VIEW_DEFINITION: &str = "ViewDefinition [CoordinationView]";

/// Contents of the ISO 10303-21 HEADER section.
#[derive(Debug, Clone)]
pub struct SpfHeader {
    pub file_name: String,
    pub timestamp: DateTime<Utc>,
    pub author: String,
    pub organization: String,
    pub preprocessor: String,
    pub originating_system: String,
    pub authorization: String,
    pub view_definition: String,
}

impl SpfHeader {
    pub fn new(file_name: impl Into<String>) -> Self {
        let system = format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        Self {
            file_name: file_name.into(),
            timestamp: Utc::now(),
            author: String::new(),
            organization: String::new(),
            preprocessor: system.clone(),
            originating_system: system,
            authorization: "Nobody".to_string(),
            view_definition: DEFAULT_VIEW_DEFINITION.to_string(),
        }
    }
}

/// Serialises `model` as an IFC-SPF document.
pub fn write_spf(model: &IfcModel, header: &SpfHeader) -> Result<String> {
    let mut out = String::with_capacity(model.len() * 96 + 512);

    out.push_str("ISO-10303-21;\nHEADER;\n");
    let _ = writeln!(
        out,
        "FILE_DESCRIPTION(({}),'2;1');",
        encode_string(&header.view_definition)
    );
    let _ = writeln!(
        out,
        "FILE_NAME({},{},({}),({}),{},{},{});",
        encode_string(&header.file_name),
        encode_string(&header.timestamp.format("%Y-%m-%dT%H:%M:%S").to_string()),
        encode_string(&header.author),
        encode_string(&header.organization),
        encode_string(&header.preprocessor),
        encode_string(&header.originating_system),
        encode_string(&header.authorization),
    );
    let _ = writeln!(out, "FILE_SCHEMA(({}));", encode_string(model.schema()));
    out.push_str("ENDSEC;\nDATA;\n");

    for entity in model.entities() {
        write_entity(&mut out, entity)?;
    }

    out.push_str("ENDSEC;\nEND-ISO-10303-21;\n");
    Ok(out)
}

fn write_entity(out: &mut String, entity: &Entity) -> Result<()> {
    let _ = write!(out, "{}={}(", entity.id, entity.class.to_ascii_uppercase());
    for (i, attribute) in entity.attributes.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_attribute(out, attribute).map_err(|e| EpdIfcError::StepWriteError {
            message: format!("{} {}: {}", entity.class, entity.id, e),
        })?;
    }
    out.push_str(");\n");
    Ok(())
}

fn write_attribute(out: &mut String, attribute: &Attribute) -> std::result::Result<(), String> {
    match attribute {
        Attribute::Unset => out.push('$'),
        Attribute::Derived => out.push('*'),
        Attribute::Ref(id) => {
            let _ = write!(out, "{}", id);
        }
        Attribute::Typed(value) => write_typed(out, value)?,
        Attribute::Enum(literal) => {
            let _ = write!(out, ".{}.", literal.to_ascii_uppercase());
        }
        Attribute::String(s) => out.push_str(&encode_string(s)),
        Attribute::Real(r) => out.push_str(&format_real(*r)?),
        Attribute::Integer(i) => {
            let _ = write!(out, "{}", i);
        }
        Attribute::Boolean(b) => out.push_str(if *b { ".T." } else { ".F." }),
        Attribute::List(items) => {
            out.push('(');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_attribute(out, item)?;
            }
            out.push(')');
        }
    }
    Ok(())
}

fn write_typed(out: &mut String, value: &IfcValue) -> std::result::Result<(), String> {
    let _ = write!(out, "{}(", value.type_name.to_ascii_uppercase());
    match &value.value {
        PrimitiveValue::Boolean(b) => out.push_str(if *b { ".T." } else { ".F." }),
        PrimitiveValue::Logical(Some(b)) => out.push_str(if *b { ".T." } else { ".F." }),
        PrimitiveValue::Logical(None) => out.push_str(".U."),
        PrimitiveValue::Integer(i) => {
            let _ = write!(out, "{}", i);
        }
        PrimitiveValue::Real(r) => out.push_str(&format_real(*r)?),
        PrimitiveValue::String(s) => out.push_str(&encode_string(s)),
    }
    out.push(')');
    Ok(())
}

/// STEP reals always carry a decimal point: `0.`, `-3.`, `14.5`.
pub fn format_real(value: f64) -> std::result::Result<String, String> {
    if !value.is_finite() {
        return Err(format!("non-finite real {}", value));
    }
    let mut text = value.to_string();
    if !text.contains('.') {
        text.push('.');
    }
    Ok(text)
}

/// Quotes a string, doubling `'` and `\` and escaping non-ASCII with
/// `\X2\` (UTF-16 code units) or `\X4\` (code points beyond the BMP).
pub fn encode_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');

    let mut pending_x2: Vec<u16> = Vec::new();
    let flush = |out: &mut String, pending: &mut Vec<u16>| {
        if !pending.is_empty() {
            out.push_str("\\X2\\");
            for unit in pending.drain(..) {
                let _ = write!(out, "{:04X}", unit);
            }
            out.push_str("\\X0\\");
        }
    };

    for c in value.chars() {
        match c {
            '\'' | '\\' => {
                flush(&mut out, &mut pending_x2);
                out.push(c);
                out.push(c);
            }
            ' '..='~' => {
                flush(&mut out, &mut pending_x2);
                out.push(c);
            }
            c if (c as u32) > 0xFFFF => {
                flush(&mut out, &mut pending_x2);
                let _ = write!(out, "\\X4\\{:08X}\\X0\\", c as u32);
            }
            c => {
                let mut buf = [0u16; 2];
                pending_x2.extend_from_slice(c.encode_utf16(&mut buf));
            }
        }
    }
    flush(&mut out, &mut pending_x2);

    out.push('\'');
    out
}
