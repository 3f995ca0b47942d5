//! Parsing of `.int`/`.ucl` descriptor files.
//!
//! Descriptors are INI-like, with structured values on a single line:
//!
//! ```text
//! [Public]
//! Object=(Name=MyMod.MyMutator,Class=Class,MetaClass=Engine.Mutator,Description="My Mutator,Does things.")
//! Mutator=(ClassName=MyMod.MyMutator,FriendlyName=My Mutator,Description=Does things.)
//! ```

use crate::incoming::{FileRole, FileSet, decode_text, decode_utf16le};
use ua_content::MutatorInfo;

/// One `Key=(field=value,...)` or plain `Key=value` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Declaration {
    pub key: String,
    /// Raw value of a plain line; empty for structured lines.
    pub value: String,
    fields: Vec<(String, String)>,
}

impl Declaration {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.iter().find(|(k, _)| k.eq_ignore_ascii_case(name)).map(|(_, v)| v.as_str())
    }

    fn is(&self, key: &str) -> bool {
        self.key.eq_ignore_ascii_case(key)
    }

    fn meta_class(&self) -> Option<&str> {
        self.field("MetaClass").filter(|_| self.is("Object"))
    }

    /// A mutator declaration, in either the UT99 `Object=` or the UT2004
    /// `Mutator=` form.
    pub fn mutator(&self) -> Option<MutatorInfo> {
        if let Some(meta) = self.meta_class()
            && meta.eq_ignore_ascii_case("Engine.Mutator")
        {
            let class = self.field("Name")?.to_string();
            let (name, description) = match self.field("Description") {
                // UT99 packs the display name and description into one value.
                Some(desc) => match desc.split_once(',') {
                    Some((name, rest)) => (name.trim().to_string(), non_empty(rest)),
                    None => (desc.trim().to_string(), None),
                },
                None => (short_class(&class).to_string(), None),
            };
            return Some(MutatorInfo { class, name, description });
        }
        if self.is("Mutator") {
            let class = self.field("ClassName")?.to_string();
            let name = self.field("FriendlyName").map_or_else(|| short_class(&class).to_string(), str::to_string);
            return Some(MutatorInfo { class, name, description: self.field("Description").and_then(non_empty) });
        }
        None
    }

    /// Class name of a voice pack declaration.
    pub fn voice(&self) -> Option<&str> {
        if self.is("VoiceType") && !self.value.is_empty() {
            return Some(&self.value);
        }
        let meta = self.meta_class()?;
        meta.to_ascii_lowercase().contains("voicepack").then(|| self.field("Name")).flatten()
    }
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

/// `MyMutator` for `MyMod.MyMutator`.
fn short_class(class: &str) -> &str {
    class.rsplit('.').next().unwrap_or(class)
}

/// Parses every declaration in a descriptor. Section headers, comments and
/// blank lines are skipped.
pub(crate) fn parse(text: &str) -> Vec<Declaration> {
    text.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<Declaration> {
    let line = line.trim();
    if line.starts_with(';') || line.starts_with('[') {
        return None;
    }
    let (key, value) = line.split_once('=')?;
    let key = key.trim().to_string();
    let value = value.trim();
    let Some(inner) = value.strip_prefix('(').and_then(|v| v.strip_suffix(')')) else {
        let value = value.strip_prefix('"').and_then(|v| v.strip_suffix('"')).unwrap_or(value);
        return Some(Declaration { key, value: value.to_string(), fields: Vec::new() });
    };
    let fields = split_fields(inner)
        .into_iter()
        .filter_map(|field| {
            let (k, v) = field.split_once('=')?;
            let v = v.trim();
            let v = v.strip_prefix('"').and_then(|v| v.strip_suffix('"')).unwrap_or(v);
            Some((k.trim().to_string(), v.to_string()))
        })
        .collect();
    Some(Declaration { key, value: String::new(), fields })
}

/// Splits on commas outside double quotes.
fn split_fields(inner: &str) -> Vec<&str> {
    let mut fields = Vec::new();
    let mut quoted = false;
    let mut start = 0;
    for (i, c) in inner.char_indices() {
        match c {
            '"' => quoted = !quoted,
            ',' if !quoted => {
                fields.push(&inner[start..i]);
                start = i + 1;
            },
            _ => {},
        }
    }
    fields.push(&inner[start..]);
    fields
}

/// Declarations from every descriptor in the submission, in archive order.
pub(crate) fn declarations(files: &FileSet) -> Vec<Declaration> {
    let mut all = Vec::new();
    for file in files.of(&[FileRole::Int]) {
        let text = match decode_utf16le(file.bytes()) {
            Some(text) => text,
            None => decode_text(file.bytes()).0.into_owned(),
        };
        all.extend(parse(&text));
    }
    all
}
