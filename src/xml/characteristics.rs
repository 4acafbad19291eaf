//! Characteristic tree importer.
//!
//! Builds a `DebtModel` from a backup document, ignoring `<rule>` blocks.
//! Structural problems (missing key or name, unparseable order, broken
//! markup) are illegal-input errors; unknown elements are skipped.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::DebtModelError;
use crate::model::{Characteristic, DebtModel};

use super::{
    invalid_xml, read_leaf_text, skip_element, ELEM_CHARACTERISTIC, ELEM_KEY, ELEM_NAME,
    ELEM_ORDER, ELEM_SUB_CHARACTERISTIC,
};

/// Parses the characteristic half of a backup document
pub fn import_characteristics(xml: &str) -> Result<DebtModel, DebtModelError> {
    let mut model = DebtModel::new();
    super::for_each_top_level(xml, |reader, start| {
        if start.name().as_ref() == ELEM_CHARACTERISTIC.as_bytes() {
            let (root, subs) = parse_characteristic(reader)?;
            let root_key = root.key.clone();
            model.add_root(root);
            for sub in subs {
                model.add_sub(sub, &root_key);
            }
        } else {
            // rule entries belong to the other importer
            skip_element(reader, start)?;
        }
        Ok(())
    })?;
    Ok(model)
}

fn parse_characteristic(
    reader: &mut Reader<&[u8]>,
) -> Result<(Characteristic, Vec<Characteristic>), DebtModelError> {
    let mut key: Option<String> = None;
    let mut name: Option<String> = None;
    let mut order: Option<i32> = None;
    let mut subs: Vec<Characteristic> = Vec::new();

    loop {
        match reader.read_event().map_err(invalid_xml)? {
            Event::Start(start) => match start.name().as_ref() {
                n if n == ELEM_KEY.as_bytes() => key = Some(read_leaf_text(reader, &start)?),
                n if n == ELEM_NAME.as_bytes() => name = Some(read_leaf_text(reader, &start)?),
                n if n == ELEM_ORDER.as_bytes() => {
                    let text = read_leaf_text(reader, &start)?;
                    let parsed = text.parse::<i32>().map_err(|_| {
                        DebtModelError::invalid(format!("invalid display order '{text}'"))
                    })?;
                    order = Some(parsed);
                }
                n if n == ELEM_SUB_CHARACTERISTIC.as_bytes() => {
                    subs.push(parse_sub_characteristic(reader, &start)?);
                }
                _ => skip_element(reader, &start)?,
            },
            Event::End(end) if end.name().as_ref() == ELEM_CHARACTERISTIC.as_bytes() => break,
            Event::Eof => {
                return Err(DebtModelError::invalid("unexpected end of document"));
            }
            _ => {}
        }
    }

    let key = key.ok_or_else(|| DebtModelError::invalid("characteristic is missing a <key>"))?;
    let name = name.ok_or_else(|| {
        DebtModelError::invalid(format!("characteristic '{key}' is missing a <name>"))
    })?;
    let mut root = Characteristic::new(key, name);
    root.order = order;
    Ok((root, subs))
}

fn parse_sub_characteristic(
    reader: &mut Reader<&[u8]>,
    open: &BytesStart<'_>,
) -> Result<Characteristic, DebtModelError> {
    let mut key: Option<String> = None;
    let mut name: Option<String> = None;

    loop {
        match reader.read_event().map_err(invalid_xml)? {
            Event::Start(start) => match start.name().as_ref() {
                n if n == ELEM_KEY.as_bytes() => key = Some(read_leaf_text(reader, &start)?),
                n if n == ELEM_NAME.as_bytes() => name = Some(read_leaf_text(reader, &start)?),
                _ => skip_element(reader, &start)?,
            },
            Event::End(end) if end.name() == open.name() => break,
            Event::Eof => {
                return Err(DebtModelError::invalid("unexpected end of document"));
            }
            _ => {}
        }
    }

    let key =
        key.ok_or_else(|| DebtModelError::invalid("sub-characteristic is missing a <key>"))?;
    let name = name.ok_or_else(|| {
        DebtModelError::invalid(format!("sub-characteristic '{key}' is missing a <name>"))
    })?;
    Ok(Characteristic::new(key, name))
}
