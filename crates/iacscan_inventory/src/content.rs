//! Shallow decoding of file heads.
//!
//! Detectors only need the top-level keys of a YAML or JSON document, and
//! they only see the first few kilobytes of each file. Decoding therefore
//! never fails: a well-formed head is parsed properly, and a truncated or
//! malformed one falls back to a lenient scan that recovers whatever
//! top-level keys precede the damage.

use serde_json::Value;
use std::cell::OnceCell;
use std::collections::BTreeMap;

/// Shape of a top-level value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Field {
    /// A scalar, rendered as text.
    Text(String),
    /// A nested mapping or JSON object.
    Mapping,
    /// A sequence or JSON array.
    Sequence,
    /// An explicit null or empty value.
    Null,
}

impl Field {
    fn from_value(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(flag) => Self::Text(flag.to_string()),
            Value::Number(number) => Self::Text(number.to_string()),
            Value::String(text) => Self::Text(text.clone()),
            Value::Array(_) => Self::Sequence,
            Value::Object(_) => Self::Mapping,
        }
    }
}

/// Top-level keys of a decoded document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Document {
    fields: BTreeMap<String, Field>,
}

impl Document {
    /// Decodes `head` as YAML when `path` ends in `.yaml` or `.yml`, and as
    /// JSON otherwise.
    #[must_use]
    pub fn decode(path: &str, head: &[u8]) -> Self {
        if path.ends_with(".yaml") || path.ends_with(".yml") {
            Self::decode_yaml(head)
        } else {
            Self::decode_json(head)
        }
    }

    /// Decodes the first YAML document in `head`.
    ///
    /// # Examples
    ///
    /// ```
    /// use iacscan_inventory::Document;
    ///
    /// let doc = Document::decode_yaml(b"apiVersion: v1\nkind: Pod\nspec:\n  containers: [");
    /// assert_eq!(doc.text("kind"), Some("Pod"));
    /// assert!(doc.contains("spec"));
    /// ```
    #[must_use]
    pub fn decode_yaml(head: &[u8]) -> Self {
        let text = String::from_utf8_lossy(head);
        let document = first_yaml_document(&text);
        match serde_yml::from_str::<Value>(document) {
            Ok(Value::Object(map)) => Self::from_map(&map),
            Ok(_) => Self::default(),
            Err(err) => {
                log::trace!("falling back to line scan for YAML head: {err}");
                scan_yaml_keys(document)
            }
        }
    }

    /// Decodes the top-level object of a JSON document.
    ///
    /// # Examples
    ///
    /// ```
    /// use iacscan_inventory::{Document, Field};
    ///
    /// let doc = Document::decode_json(br#"{"provider": {"aws": {}}, "resource": {"x": [1, 2"#);
    /// assert_eq!(doc.field("provider"), Some(&Field::Mapping));
    /// assert_eq!(doc.field("resource"), Some(&Field::Mapping));
    /// ```
    #[must_use]
    pub fn decode_json(head: &[u8]) -> Self {
        match serde_json::from_slice::<serde_json::Map<String, Value>>(head) {
            Ok(map) => Self::from_map(&map),
            Err(err) => {
                log::trace!("falling back to lenient scan for JSON head: {err}");
                LenientJson::new(head).top_level()
            }
        }
    }

    fn from_map(map: &serde_json::Map<String, Value>) -> Self {
        Self {
            fields: map
                .iter()
                .map(|(key, value)| (key.clone(), Field::from_value(value)))
                .collect(),
        }
    }

    /// Returns `true` when `key` is present at the top level.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// The shape of the value stored under `key`.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Field> {
        self.fields.get(key)
    }

    /// The non-empty scalar text stored under `key`.
    #[must_use]
    pub fn text(&self, key: &str) -> Option<&str> {
        match self.fields.get(key) {
            Some(Field::Text(text)) if !text.is_empty() => Some(text),
            _ => None,
        }
    }

    /// Returns `true` when `key` holds a mapping or a sequence.
    #[must_use]
    pub fn is_container(&self, key: &str) -> bool {
        matches!(
            self.fields.get(key),
            Some(Field::Mapping | Field::Sequence)
        )
    }
}

/// The head of one file, decoded on first use and shared by every content
/// check registered for that file.
#[derive(Debug)]
pub struct Content<'a> {
    path: &'a str,
    head: &'a [u8],
    document: OnceCell<Document>,
}

impl<'a> Content<'a> {
    /// Wraps the first bytes of the file at `path`.
    #[must_use]
    pub fn new(path: &'a str, head: &'a [u8]) -> Self {
        Self {
            path,
            head,
            document: OnceCell::new(),
        }
    }

    /// Root-relative path of the file.
    #[must_use]
    pub fn path(&self) -> &str {
        self.path
    }

    /// Raw bytes read from the start of the file.
    #[must_use]
    pub fn head(&self) -> &[u8] {
        self.head
    }

    /// The shallow document decoded from the head.
    pub fn document(&self) -> &Document {
        self.document
            .get_or_init(|| Document::decode(self.path, self.head))
    }
}

fn first_yaml_document(text: &str) -> &str {
    let mut start = 0;
    let mut offset = 0;
    let mut seen_content = false;
    for line in text.split_inclusive('\n') {
        let trimmed = line.trim_end();
        let is_marker = trimmed == "---" || trimmed.starts_with("--- ") || trimmed == "...";
        if is_marker {
            if seen_content {
                return text.get(start..offset).unwrap_or_default();
            }
            start = offset + line.len();
        } else if !trimmed.is_empty() && !trimmed.starts_with('#') {
            seen_content = true;
        }
        offset += line.len();
    }
    text.get(start..).unwrap_or_default()
}

fn scan_yaml_keys(document: &str) -> Document {
    let mut fields = BTreeMap::new();
    for line in document.lines() {
        if line.starts_with([' ', '\t', '#', '-']) || line.trim().is_empty() {
            continue;
        }
        let (key, rest) = match line.split_once(": ") {
            Some(pair) => pair,
            None => match line.trim_end().strip_suffix(':') {
                Some(key) => (key, ""),
                None => continue,
            },
        };
        fields.insert(unquote(key.trim()).to_owned(), yaml_scalar(rest));
    }
    Document { fields }
}

fn yaml_scalar(rest: &str) -> Field {
    let value = match rest.find(" #") {
        Some(comment) => rest.get(..comment).unwrap_or(rest),
        None => rest,
    }
    .trim();
    match value {
        "" | "~" | "null" => Field::Null,
        _ if value.starts_with('[') => Field::Sequence,
        _ if value.starts_with('{') => Field::Mapping,
        _ => Field::Text(unquote(value).to_owned()),
    }
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

/// Recovers top-level keys from JSON that may be truncated or invalid.
struct LenientJson<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> LenientJson<'a> {
    const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        Some(byte)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn top_level(mut self) -> Document {
        let mut fields = BTreeMap::new();
        self.skip_whitespace();
        if self.bump() != Some(b'{') {
            return Document::default();
        }
        loop {
            self.skip_whitespace();
            if self.peek() != Some(b'"') {
                break;
            }
            let Some(key) = self.string() else { break };
            self.skip_whitespace();
            if self.bump() != Some(b':') {
                break;
            }
            self.skip_whitespace();
            let Some(field) = self.value() else { break };
            fields.insert(key, field);
            self.skip_whitespace();
            if self.bump() != Some(b',') {
                break;
            }
        }
        Document { fields }
    }

    /// Reads a string starting at the opening quote. Returns `None` when the
    /// input ends before the closing quote.
    fn string(&mut self) -> Option<String> {
        self.bump()?;
        let mut out = Vec::new();
        loop {
            match self.bump()? {
                b'"' => return Some(String::from_utf8_lossy(&out).into_owned()),
                b'\\' => match self.bump()? {
                    b'n' => out.push(b'\n'),
                    b't' => out.push(b'\t'),
                    b'r' => out.push(b'\r'),
                    b'u' => {
                        let ch = self.unicode_escape()?;
                        let mut buf = [0; 4];
                        out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
                    }
                    other => out.push(other),
                },
                other => out.push(other),
            }
        }
    }

    fn unicode_escape(&mut self) -> Option<char> {
        let digits = self.bytes.get(self.pos..self.pos + 4)?;
        self.pos += 4;
        let code = u32::from_str_radix(std::str::from_utf8(digits).ok()?, 16).ok()?;
        Some(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER))
    }

    fn value(&mut self) -> Option<Field> {
        match self.peek()? {
            b'"' => self.string().map(Field::Text),
            b'{' => {
                self.skip_nested();
                Some(Field::Mapping)
            }
            b'[' => {
                self.skip_nested();
                Some(Field::Sequence)
            }
            _ => {
                let start = self.pos;
                while self
                    .peek()
                    .is_some_and(|b| !matches!(b, b',' | b'}' | b']') && !b.is_ascii_whitespace())
                {
                    self.pos += 1;
                }
                let literal = self.bytes.get(start..self.pos).unwrap_or_default();
                match literal {
                    b"null" => Some(Field::Null),
                    _ => Some(Field::Text(String::from_utf8_lossy(literal).into_owned())),
                }
            }
        }
    }

    /// Skips a balanced object or array, stopping quietly at end of input.
    fn skip_nested(&mut self) {
        let mut depth = 0_usize;
        let mut in_string = false;
        while let Some(byte) = self.bump() {
            if in_string {
                match byte {
                    b'\\' => {
                        self.bump();
                    }
                    b'"' => in_string = false,
                    _ => {}
                }
                continue;
            }
            match byte {
                b'"' => in_string = true,
                b'{' | b'[' => depth += 1,
                b'}' | b']' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return;
                    }
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn yaml_reads_only_the_first_document() {
        let doc = Document::decode_yaml(b"---\napiVersion: v1\nkind: Pod\n---\nkind: Service\n");
        assert_eq!(doc.text("apiVersion"), Some("v1"));
        assert_eq!(doc.text("kind"), Some("Pod"));
    }

    #[rstest]
    fn yaml_scalars_are_rendered_as_text() {
        let doc = Document::decode_yaml(b"AWSTemplateFormatVersion: 2010-09-09\nreplicas: 3\n");
        assert!(doc.contains("AWSTemplateFormatVersion"));
        assert_eq!(doc.text("replicas"), Some("3"));
    }

    #[rstest]
    fn truncated_yaml_keeps_leading_keys() {
        let doc = Document::decode_yaml(b"apiVersion: apps/v1\nkind: Deployment\nmetadata:\n  name: \"unterminated");
        assert_eq!(doc.text("apiVersion"), Some("apps/v1"));
        assert_eq!(doc.text("kind"), Some("Deployment"));
    }

    #[rstest]
    #[case::scalar_root(b"just a string".as_slice())]
    #[case::sequence_root(b"- a\n- b\n".as_slice())]
    #[case::binary(b"\x00\x01\x02".as_slice())]
    fn non_mapping_yaml_has_no_keys(#[case] head: &[u8]) {
        let doc = Document::decode_yaml(head);
        assert!(!doc.contains("apiVersion"));
    }

    #[rstest]
    fn json_recovers_keys_before_truncation() {
        let doc = Document::decode_json(br#"{"AWSTemplateFormatVersion": "2010-09-09", "Resources": {"Bucket": {"Type": "AWS::S3::Buck"#);
        assert_eq!(doc.text("AWSTemplateFormatVersion"), Some("2010-09-09"));
        assert_eq!(doc.field("Resources"), Some(&Field::Mapping));
    }

    #[rstest]
    #[case::array(br#"{"provider": [{"aws": {}}]}"#.as_slice(), Some(Field::Sequence))]
    #[case::object(br#"{"provider": {"aws": {}}}"#.as_slice(), Some(Field::Mapping))]
    #[case::string(br#"{"provider": "aws"}"#.as_slice(), Some(Field::Text("aws".to_owned())))]
    #[case::absent(br#"{"resource": {}}"#.as_slice(), None)]
    #[case::garbage(b"not json".as_slice(), None)]
    fn json_field_shapes(#[case] head: &[u8], #[case] expected: Option<Field>) {
        let document = Document::decode_json(head);
        assert_eq!(
            document.is_container("provider"),
            matches!(expected, Some(Field::Mapping | Field::Sequence))
        );
        assert_eq!(document.field("provider").cloned(), expected);
    }

    #[rstest]
    fn lenient_json_handles_escapes_and_literals() {
        let doc = Document::decode_json(br#"{"a\"b": "xA", "n": 12, "z": null, "t": tru"#);
        assert_eq!(doc.text("a\"b"), Some("xA"));
        assert_eq!(doc.text("n"), Some("12"));
        assert_eq!(doc.field("z"), Some(&Field::Null));
        assert_eq!(doc.text("t"), Some("tru"));
    }

    #[rstest]
    fn content_decodes_once_by_extension() {
        let content = Content::new("k8s/pod.yml", b"kind: Pod\n");
        assert_eq!(content.document().text("kind"), Some("Pod"));
        assert!(std::ptr::eq(content.document(), content.document()));
    }
}
