// Field kinds and submitted values

use crate::Element;
use serde::Serialize;

/// What kind of control an element is, derived from its tag and `type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Text,
    Password,
    Email,
    Hidden,
    Select,
    TextArea,
    Checkbox,
    Radio,
    File,
    /// Not a value-carrying form control (div, label, button, ...)
    Other,
}

impl FieldKind {
    pub fn of(element: &Element) -> Self {
        match element.tag.as_str() {
            "input" => Self::from_input_type(element.get_attr("type").unwrap_or("text")),
            "select" => FieldKind::Select,
            "textarea" => FieldKind::TextArea,
            _ => FieldKind::Other,
        }
    }

    /// Kind for an `<input>` with the given `type` attribute
    pub fn from_input_type(input_type: &str) -> Self {
        match input_type.to_ascii_lowercase().as_str() {
            "checkbox" => FieldKind::Checkbox,
            "radio" => FieldKind::Radio,
            "file" => FieldKind::File,
            "password" => FieldKind::Password,
            "email" => FieldKind::Email,
            "hidden" => FieldKind::Hidden,
            "submit" | "button" | "reset" | "image" => FieldKind::Other,
            _ => FieldKind::Text,
        }
    }

    /// Checkbox and radio values come from whichever option is checked
    pub fn is_choice(self) -> bool {
        matches!(self, FieldKind::Checkbox | FieldKind::Radio)
    }

    pub fn is_control(self) -> bool {
        !matches!(self, FieldKind::Other)
    }
}

/// A selected file, referenced but never read
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileHandle {
    pub name: String,
    pub size: u64,
    pub mime_type: String,
}

impl FileHandle {
    pub fn new(name: impl Into<String>, size: u64, mime_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size,
            mime_type: mime_type.into(),
        }
    }
}

/// One entry of a submission record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    /// Values of the checked checkboxes sharing a name, in document order
    List(Vec<String>),
    Files(Vec<FileHandle>),
    /// A radio group with nothing checked, under `RadioPolicy::Null`
    None,
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FieldValue::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_files(&self) -> Option<&[FileHandle]> {
        match self {
            FieldValue::Files(files) => Some(files),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, FieldValue::None)
    }
}

impl From<&str> for FieldValue {
    fn from(text: &str) -> Self {
        FieldValue::Text(text.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(text: String) -> Self {
        FieldValue::Text(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_element() {
        assert_eq!(FieldKind::of(&Element::input("checkbox")), FieldKind::Checkbox);
        assert_eq!(FieldKind::of(&Element::input("RADIO")), FieldKind::Radio);
        assert_eq!(FieldKind::of(&Element::new("input")), FieldKind::Text);
        assert_eq!(FieldKind::of(&Element::input("date")), FieldKind::Text);
        assert_eq!(FieldKind::of(&Element::input("submit")), FieldKind::Other);
        assert_eq!(FieldKind::of(&Element::new("select")), FieldKind::Select);
        assert_eq!(FieldKind::of(&Element::new("div")), FieldKind::Other);
    }

    #[test]
    fn test_choice_kinds() {
        assert!(FieldKind::Checkbox.is_choice());
        assert!(FieldKind::Radio.is_choice());
        assert!(!FieldKind::File.is_choice());
    }

    #[test]
    fn test_value_serialization() {
        let values = vec![
            FieldValue::from("alice"),
            FieldValue::List(vec!["red".into(), "blue".into()]),
            FieldValue::Files(vec![FileHandle::new("cv.pdf", 1024, "application/pdf")]),
            FieldValue::None,
        ];

        let json = serde_json::to_value(&values).unwrap();
        assert_eq!(json[0], "alice");
        assert_eq!(json[1][1], "blue");
        assert_eq!(json[2][0]["name"], "cv.pdf");
        assert!(json[3].is_null());
    }
}
