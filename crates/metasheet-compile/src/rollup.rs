use metasheet_model::{Literal, SchemaNode, ValidationKey};

/// Keys that cannot be expressed as a list choice.
const NON_LIST_KEYS: [ValidationKey; 7] = [
    ValidationKey::MinInclusive,
    ValidationKey::MinExclusive,
    ValidationKey::MaxInclusive,
    ValidationKey::MaxExclusive,
    ValidationKey::Forbidden,
    ValidationKey::Regex,
    ValidationKey::Unique,
];

/// Collect every `allowed` value across the `anyof` tree.
///
/// Returns `None` as soon as any level carries a constraint other than an
/// allow-list, or a leaf has no allow-list at all; the field then needs a
/// formula rather than a list choice. Duplicates keep their first position.
pub fn roll_up_allowed(node: &SchemaNode) -> Option<Vec<Literal>> {
    let mut values = Vec::new();
    collect(node, &mut values)?;
    Some(values)
}

fn collect(node: &SchemaNode, values: &mut Vec<Literal>) -> Option<()> {
    if NON_LIST_KEYS.iter().any(|key| node.has(*key)) {
        return None;
    }
    for child in node.alternatives() {
        collect(child, values)?;
    }
    match &node.allowed {
        Some(allowed) => {
            for value in allowed {
                if !values.iter().any(|seen| seen.same_value(value)) {
                    values.push(value.clone());
                }
            }
        }
        None if node.anyof.is_none() => return None,
        None => {}
    }
    Some(())
}
