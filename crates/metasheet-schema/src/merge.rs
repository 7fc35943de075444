//! Group-aware schema merging.

use metasheet_model::FieldSchemas;
use tracing::warn;

/// How modifications are applied by [`merge_schemas`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOptions {
    /// Add fields that are absent from the base instead of skipping them.
    pub add_silently: bool,
    /// Overwrite key by key even for the validation group. Only safe when
    /// the caller guarantees the result stays consistent.
    pub force_piecemeal: bool,
}

impl MergeOptions {
    pub fn adding() -> Self {
        Self {
            add_silently: true,
            ..Self::default()
        }
    }
}

/// Apply `modifications` on top of `base`, returning a new mapping.
///
/// The validation keys and `units` describe a field together, so when a
/// modification sets any of them, the base node's whole group is dropped
/// before the modification is overlaid. `field_desc` and `is_phi` are
/// always overwritten key by key.
pub fn merge_schemas(
    base: &FieldSchemas,
    modifications: &FieldSchemas,
    options: MergeOptions,
) -> FieldSchemas {
    let mut result = base.clone();
    for (name, changes) in modifications {
        match result.get_mut(name) {
            Some(node) => {
                if !options.force_piecemeal && changes.has_group_keys() {
                    *node = node.without_group_keys();
                }
                *node = node.overlaid_with(changes);
            }
            None if options.add_silently => {
                result.insert(name.clone(), changes.clone());
            }
            None => warn!(
                field = %name,
                "field could not be modified as it does not exist in the base schema"
            ),
        }
    }
    result
}
