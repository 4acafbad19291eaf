//! # XML backup documents
//!
//! One document shape serves export and restore:
//!
//! ```text
//! <debt-model>
//!   <characteristic>
//!     <key>PORTABILITY</key>
//!     <name>Portability</name>
//!     <order>1</order>
//!     <sub-characteristic>
//!       <key>COMPILER</key>
//!       <name>Compiler</name>
//!     </sub-characteristic>
//!   </characteristic>
//!   <rule>
//!     <repository>squid</repository>
//!     <key>S1067</key>
//!     <characteristic>COMPILER</characteristic>
//!     <function>LINEAR</function>
//!     <coefficient>30min</coefficient>
//!   </rule>
//! </debt-model>
//! ```
//!
//! Import runs as two independent passes: the characteristics pass ignores
//! `<rule>` blocks and the rule-debt pass ignores characteristic blocks, so
//! either half of a document can be consumed on its own.

mod characteristics;
mod exporter;
mod rules;

pub use characteristics::import_characteristics;
pub use exporter::export_model;
pub use rules::import_rule_debts;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::DebtModelError;

pub(crate) const ELEM_MODEL: &str = "debt-model";
pub(crate) const ELEM_CHARACTERISTIC: &str = "characteristic";
pub(crate) const ELEM_SUB_CHARACTERISTIC: &str = "sub-characteristic";
pub(crate) const ELEM_RULE: &str = "rule";
pub(crate) const ELEM_KEY: &str = "key";
pub(crate) const ELEM_NAME: &str = "name";
pub(crate) const ELEM_ORDER: &str = "order";
pub(crate) const ELEM_REPOSITORY: &str = "repository";
pub(crate) const ELEM_FUNCTION: &str = "function";
pub(crate) const ELEM_COEFFICIENT: &str = "coefficient";
pub(crate) const ELEM_OFFSET: &str = "offset";

pub(crate) fn invalid_xml(err: quick_xml::Error) -> DebtModelError {
    DebtModelError::invalid(format!("malformed XML: {err}"))
}

/// Reads the unescaped text content of the element just opened by `start`
pub(crate) fn read_leaf_text(
    reader: &mut Reader<&[u8]>,
    start: &quick_xml::events::BytesStart<'_>,
) -> Result<String, DebtModelError> {
    let mut text = String::new();
    loop {
        match reader.read_event().map_err(invalid_xml)? {
            Event::Text(t) => text.push_str(&t.unescape().map_err(invalid_xml)?),
            Event::CData(c) => text.push_str(&String::from_utf8_lossy(&c.into_inner())),
            Event::End(end) if end.name() == start.name() => break,
            Event::Start(_) => {
                return Err(DebtModelError::invalid(format!(
                    "unexpected element inside <{}>",
                    String::from_utf8_lossy(start.name().as_ref())
                )));
            }
            Event::Eof => return Err(DebtModelError::invalid("unexpected end of document")),
            _ => {}
        }
    }
    Ok(text)
}

/// Skips the element just opened by `start`, nested content included
pub(crate) fn skip_element(
    reader: &mut Reader<&[u8]>,
    start: &quick_xml::events::BytesStart<'_>,
) -> Result<(), DebtModelError> {
    reader.read_to_end(start.name()).map_err(invalid_xml)?;
    Ok(())
}

/// Walks the document, dispatching top-level elements under `<debt-model>`
/// to `on_element`. Verifies the root element is present.
pub(crate) fn for_each_top_level<F>(xml: &str, mut on_element: F) -> Result<(), DebtModelError>
where
    F: FnMut(&mut Reader<&[u8]>, &quick_xml::events::BytesStart<'_>) -> Result<(), DebtModelError>,
{
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut saw_root = false;
    loop {
        match reader.read_event().map_err(invalid_xml)? {
            Event::Start(start) => {
                if start.name().as_ref() == ELEM_MODEL.as_bytes() {
                    saw_root = true;
                } else if saw_root {
                    on_element(&mut reader, &start)?;
                } else {
                    return Err(DebtModelError::invalid(format!(
                        "expected <{ELEM_MODEL}> document root"
                    )));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    if !saw_root {
        return Err(DebtModelError::invalid(format!(
            "expected <{ELEM_MODEL}> document root"
        )));
    }
    Ok(())
}
