use dicom::core::value::{PrimitiveValue, Value};
use dicom::core::{Tag, VR};

const MAX_VALUE_LEN: usize = 120;

pub fn value_to_string<I, P>(value: &Value<I, P>, vr: VR) -> String {
    let rendered = match value {
        Value::Primitive(primitive) => format_primitive_value(primitive, vr),
        Value::Sequence(sequence) => {
            let count = sequence.multiplicity() as usize;
            let suffix = if count == 1 { "" } else { "s" };
            format!("Sequence ({count} item{suffix})")
        }
        Value::PixelSequence(sequence) => {
            let fragments = sequence.fragments().len();
            let fragment_suffix = if fragments == 1 { "" } else { "s" };
            format!("Pixel data ({fragments} fragment{fragment_suffix})")
        }
    };
    truncate(rendered, MAX_VALUE_LEN)
}

/// Cuts `text` to at most `max` characters, marking the cut with an
/// ellipsis.
pub fn truncate(text: String, max: usize) -> String {
    if text.chars().count() > max {
        let mut truncated = text.chars().take(max).collect::<String>();
        truncated.push('…');
        truncated
    } else {
        text
    }
}

pub fn format_tag(tag: Tag) -> String {
    format!("{:04X},{:04X}", tag.group(), tag.element())
}

fn format_primitive_value(value: &PrimitiveValue, vr: VR) -> String {
    match value {
        PrimitiveValue::Empty => String::new(),
        PrimitiveValue::Tags(values) => values
            .iter()
            .map(|tag| format_tag(*tag))
            .collect::<Vec<_>>()
            .join("\\"),
        PrimitiveValue::U8(_) if is_binary_vr(vr) => {
            format!("Binary data ({} bytes)", value.calculate_byte_len())
        }
        _ => value.to_str().into_owned(),
    }
}

fn is_binary_vr(vr: VR) -> bool {
    matches!(
        vr,
        VR::OB | VR::OD | VR::OF | VR::OL | VR::OV | VR::OW | VR::UN
    )
}
