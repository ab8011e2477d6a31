//! Extracted declaration records.

use serde::Serialize;

/// A documented parameter.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// Markdown for the parameter's discussion, if present.
    pub discussion: Option<String>,
}

/// Structured record extracted from one documentation-comment document.
///
/// Fields whose subtree or attribute is absent from the document stay
/// at their default value; an empty record is how extraction failure
/// surfaces.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Declaration {
    /// Declaration kind: the document's outer tag name, verbatim
    /// (e.g. `Function`).
    pub kind: String,
    /// Source file path from the outermost element.
    pub file: Option<String>,
    /// Source line from the outermost element.
    pub line: Option<u32>,
    /// Source column from the outermost element.
    pub column: Option<u32>,
    /// Display name.
    pub name: Option<String>,
    /// Unique symbol identifier.
    pub usr: Option<String>,
    /// Raw signature text.
    pub declaration: Option<String>,
    /// Markdown for the result discussion, if present.
    pub result_discussion: Option<String>,
    /// Documented parameters, in encounter order.
    pub parameters: Vec<Parameter>,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_serializes_to_json() {
        let decl = Declaration {
            kind: "Function".to_owned(),
            line: Some(3),
            name: Some("f()".to_owned()),
            parameters: vec![Parameter {
                name: "x".to_owned(),
                discussion: None,
            }],
            ..Declaration::default()
        };
        let json: serde_json::Value = serde_json::to_value(&decl).unwrap();
        assert_eq!(json["kind"], "Function");
        assert_eq!(json["line"], 3);
        assert_eq!(json["file"], serde_json::Value::Null);
        assert_eq!(json["parameters"][0]["name"], "x");
    }
}
