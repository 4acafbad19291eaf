//! Backup document writer.
//!
//! Serializes a characteristic tree plus resolved per-rule debt into the
//! document shape the importers read back. Roots are written in display
//! order so successive exports of the same model are byte-identical.

use std::io::Cursor;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::DebtModelError;
use crate::model::{Characteristic, DebtModel, RuleDebt};

use super::{
    ELEM_CHARACTERISTIC, ELEM_COEFFICIENT, ELEM_FUNCTION, ELEM_KEY, ELEM_MODEL, ELEM_NAME,
    ELEM_OFFSET, ELEM_ORDER, ELEM_REPOSITORY, ELEM_RULE, ELEM_SUB_CHARACTERISTIC,
};

type XmlWriter = Writer<Cursor<Vec<u8>>>;

/// Serializes `model` and `rules` to XML text
pub fn export_model(model: &DebtModel, rules: &[RuleDebt]) -> Result<String, DebtModelError> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

    writer.write_event(Event::Start(BytesStart::new(ELEM_MODEL)))?;

    let mut roots: Vec<&Characteristic> = model.root_characteristics().iter().collect();
    roots.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.key.cmp(&b.key)));
    for root in roots {
        write_characteristic(&mut writer, model, root)?;
    }

    for debt in rules {
        write_rule_debt(&mut writer, debt)?;
    }

    writer.write_event(Event::End(BytesEnd::new(ELEM_MODEL)))?;

    let bytes = writer.into_inner().into_inner();
    String::from_utf8(bytes)
        .map_err(|_| DebtModelError::invalid("exported model is not valid UTF-8"))
}

fn write_characteristic(
    writer: &mut XmlWriter,
    model: &DebtModel,
    root: &Characteristic,
) -> Result<(), DebtModelError> {
    writer.write_event(Event::Start(BytesStart::new(ELEM_CHARACTERISTIC)))?;
    write_leaf(writer, ELEM_KEY, &root.key)?;
    write_leaf(writer, ELEM_NAME, &root.name)?;
    if let Some(order) = root.order {
        write_leaf(writer, ELEM_ORDER, &order.to_string())?;
    }
    for sub in model.sub_characteristics(&root.key) {
        writer.write_event(Event::Start(BytesStart::new(ELEM_SUB_CHARACTERISTIC)))?;
        write_leaf(writer, ELEM_KEY, &sub.key)?;
        write_leaf(writer, ELEM_NAME, &sub.name)?;
        writer.write_event(Event::End(BytesEnd::new(ELEM_SUB_CHARACTERISTIC)))?;
    }
    writer.write_event(Event::End(BytesEnd::new(ELEM_CHARACTERISTIC)))?;
    Ok(())
}

fn write_rule_debt(writer: &mut XmlWriter, debt: &RuleDebt) -> Result<(), DebtModelError> {
    writer.write_event(Event::Start(BytesStart::new(ELEM_RULE)))?;
    write_leaf(writer, ELEM_REPOSITORY, debt.rule_key.repository())?;
    write_leaf(writer, ELEM_KEY, debt.rule_key.rule())?;
    write_leaf(writer, ELEM_CHARACTERISTIC, &debt.characteristic_key)?;
    write_leaf(writer, ELEM_FUNCTION, debt.function.kind.as_str())?;
    if let Some(coefficient) = &debt.function.coefficient {
        write_leaf(writer, ELEM_COEFFICIENT, coefficient)?;
    }
    if let Some(offset) = &debt.function.offset {
        write_leaf(writer, ELEM_OFFSET, offset)?;
    }
    writer.write_event(Event::End(BytesEnd::new(ELEM_RULE)))?;
    Ok(())
}

fn write_leaf(writer: &mut XmlWriter, tag: &str, text: &str) -> Result<(), DebtModelError> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}
