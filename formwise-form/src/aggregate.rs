// Submission aggregation

use crate::{ElementId, FieldKind, FieldValue, FormDocument, Selector};
use formwise_config::RadioPolicy;
use formwise_log::debug;
use once_cell::sync::Lazy;
use serde::ser::{Serialize, SerializeMap, Serializer};

static NAMED_ENABLED: Lazy<Selector> =
    Lazy::new(|| Selector::parse("[name]:not([disabled])").expect("constant selector parses"));
static CHECKED: Lazy<Selector> =
    Lazy::new(|| Selector::parse("input:checked").expect("constant selector parses"));

/// Field name to value, in the order names first appeared
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionRecord {
    entries: Vec<(String, FieldValue)>,
}

impl SubmissionRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    fn get_mut(&mut self, name: &str) -> Option<&mut FieldValue> {
        self.entries
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Set `name`, keeping its position if it was already present
    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) {
        let name = name.into();
        match self.get_mut(&name) {
            Some(slot) => *slot = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Append to the list under `name`, starting a new list if the name is
    /// absent or holds something else
    pub fn push(&mut self, name: &str, value: String) {
        match self.get_mut(name) {
            Some(FieldValue::List(list)) => list.push(value),
            Some(other) => *other = FieldValue::List(vec![value]),
            None => self.entries.push((name.to_string(), FieldValue::List(vec![value]))),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl Serialize for SubmissionRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Collect the named, enabled controls inside `form` into a record.
///
/// A radio group takes its value from whichever radio of that name is
/// checked anywhere in the form, disabled or not.
pub fn aggregate(document: &FormDocument, form: ElementId, policy: RadioPolicy) -> SubmissionRecord {
    let mut record = SubmissionRecord::new();
    let fields: Vec<_> = document
        .select_all(form, &NAMED_ENABLED)
        .into_iter()
        .filter_map(|id| document.element(id))
        .collect();
    let checked_radios: Vec<_> = document
        .select_all(form, &CHECKED)
        .into_iter()
        .filter_map(|id| document.element(id))
        .filter(|element| element.kind() == FieldKind::Radio)
        .collect();

    for element in &fields {
        let Some(name) = element.field_name() else {
            continue;
        };

        match element.kind() {
            FieldKind::Radio => {
                let checked = checked_radios
                    .iter()
                    .find(|other| other.field_name() == Some(name));
                match (checked, policy) {
                    (Some(radio), _) => record.insert(name, FieldValue::Text(radio.value.clone())),
                    (None, RadioPolicy::Null) => record.insert(name, FieldValue::None),
                    (None, RadioPolicy::Omit) => {
                        debug!(target: "formwise::aggregate", "no radio checked for {}, omitted", name);
                    }
                }
            }
            FieldKind::Checkbox => {
                if element.is_checked() {
                    record.push(name, element.value.clone());
                }
            }
            FieldKind::File => record.insert(name, FieldValue::Files(element.files.clone())),
            FieldKind::Text
            | FieldKind::Password
            | FieldKind::Email
            | FieldKind::Hidden
            | FieldKind::Select
            | FieldKind::TextArea => record.insert(name, FieldValue::Text(element.value.clone())),
            FieldKind::Other => {}
        }
    }

    record
}
