//! Minimal INI reader for buildout versions files and `setup.cfg`.
//!
//! Supports `key = value` / `key: value` pairs, `#` and `;` comment lines, inline
//! comments introduced by whitespace followed by `#` or `;`, and indented
//! continuation lines (joined with `\n`). Keys are lowercased. Repeated sections are
//! merged; a repeated key keeps the last value.

/// One `[section]` of an INI document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IniSection {
    /// Section name as written between the brackets (trimmed)
    pub name: String,
    entries: Vec<(String, String)>,
}

impl IniSection {
    /// Value for `key` (case-insensitive).
    pub fn get(&self, key: &str) -> Option<&str> {
        let key = key.trim().to_lowercase();
        self.entries.iter().rev().find(|(k, _)| *k == key).map(|(_, v)| v.as_str())
    }

    /// All `(key, value)` pairs in file order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn push(&mut self, key: String, value: String) {
        self.entries.retain(|(k, _)| *k != key);
        self.entries.push((key, value));
    }
}

/// A parsed INI document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IniDocument {
    sections: Vec<IniSection>,
}

impl IniDocument {
    /// Parse INI text.
    ///
    /// # Errors
    ///
    /// Returns a line-numbered message for text before the first section header,
    /// malformed headers, and lines that are neither comments nor `key = value`.
    pub fn parse(content: &str) -> Result<Self, String> {
        let mut document = Self::default();
        let mut current: Option<usize> = None;
        let mut last_key: Option<String> = None;

        for (index, raw_line) in content.lines().enumerate() {
            let line_no = index + 1;
            let line = raw_line.trim_end();
            let trimmed = line.trim_start();

            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
                continue;
            }

            // Continuation of the previous value
            if line.starts_with(char::is_whitespace) {
                if let (Some(section), Some(key)) = (current, &last_key) {
                    let section = &mut document.sections[section];
                    if let Some((_, value)) = section.entries.iter_mut().rev().find(|(k, _)| k == key)
                    {
                        if !value.is_empty() {
                            value.push('\n');
                        }
                        value.push_str(strip_inline_comment(trimmed));
                    }
                    continue;
                }
            }

            if trimmed.starts_with('[') {
                let Some(name) = trimmed.strip_prefix('[').and_then(|s| s.strip_suffix(']'))
                else {
                    return Err(format!("line {line_no}: malformed section header '{trimmed}'"));
                };
                let name = name.trim();
                current = Some(match document.sections.iter().position(|s| s.name == name) {
                    Some(position) => position,
                    None => {
                        document.sections.push(IniSection {
                            name: name.to_string(),
                            entries: Vec::new(),
                        });
                        document.sections.len() - 1
                    }
                });
                last_key = None;
                continue;
            }

            let Some(section) = current else {
                return Err(format!(
                    "line {line_no}: '{trimmed}' appears before any section header"
                ));
            };

            let Some(split_at) = trimmed.find(['=', ':']) else {
                return Err(format!("line {line_no}: expected 'name = value', found '{trimmed}'"));
            };
            let key = trimmed[..split_at].trim().to_lowercase();
            if key.is_empty() {
                return Err(format!("line {line_no}: missing name before '='"));
            }
            let value = strip_inline_comment(trimmed[split_at + 1..].trim()).to_string();

            document.sections[section].push(key.clone(), value);
            last_key = Some(key);
        }

        Ok(document)
    }

    /// Section named `name`, if present.
    pub fn section(&self, name: &str) -> Option<&IniSection> {
        self.sections.iter().find(|s| s.name == name)
    }
}

fn strip_inline_comment(value: &str) -> &str {
    let cut = [" #", " ;", "\t#", "\t;"]
        .into_iter()
        .filter_map(|marker| value.find(marker))
        .min();
    match cut {
        Some(position) => value[..position].trim_end(),
        None => value,
    }
}
