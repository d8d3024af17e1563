//! Helpers for the `Properties70` block of FBX 7.x objects.

use glam::DVec3;

use crate::fbx::{FbxNode, Property};

pub const LCL_TRANSLATION: &str = "Lcl Translation";
pub const LCL_ROTATION: &str = "Lcl Rotation";
pub const LCL_SCALING: &str = "Lcl Scaling";

const PROPERTIES70: &str = "Properties70";

fn record_name(record: &FbxNode) -> Option<&str> {
    record.properties.first().and_then(Property::as_str)
}

/// Reads a three-component `P` record, e.g. `P: "Lcl Translation", "Lcl Translation", "", "A", x, y, z`.
pub fn read_vector(object: &FbxNode, name: &str) -> Option<DVec3> {
    let record = object
        .child(PROPERTIES70)?
        .children_named("P")
        .find(|record| record_name(record) == Some(name))?;

    let values = record
        .properties
        .get(4..7)?
        .iter()
        .map(Property::as_f64)
        .collect::<Option<Vec<f64>>>()?;

    Some(DVec3::new(values[0], values[1], values[2]))
}

pub fn vector_record(name: &str, value: DVec3) -> FbxNode {
    FbxNode::with_properties(
        "P",
        vec![
            Property::string(name),
            Property::string(name),
            Property::string(""),
            Property::string("A"),
            Property::F64(value.x),
            Property::F64(value.y),
            Property::F64(value.z),
        ],
    )
}

/// Sets a three-component `P` record, creating it (and `Properties70`) if missing. The type,
/// label and flags of an existing record are kept.
pub fn write_vector(object: &mut FbxNode, name: &str, value: DVec3) {
    let properties70 = child_or_insert(object, PROPERTIES70);

    let existing = properties70
        .children
        .iter_mut()
        .find(|record| record.name == "P" && record_name(record) == Some(name));

    match existing {
        Some(record) if record.properties.len() >= 4 => {
            record.properties.truncate(4);
            record.properties.extend(value.to_array().map(Property::F64));
        }
        Some(record) => *record = vector_record(name, value),
        None => properties70.children.push(vector_record(name, value)),
    }
}

pub fn child_or_insert<'a>(node: &'a mut FbxNode, name: &str) -> &'a mut FbxNode {
    let index = match node.children.iter().position(|child| child.name == name) {
        Some(index) => index,
        None => {
            node.children.push(FbxNode::new(name));
            node.children.len() - 1
        }
    };

    &mut node.children[index]
}
