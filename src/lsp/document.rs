use ropey::Rope;

use tower_lsp::lsp_types::{Position, TextDocumentContentChangeEvent, Url};

/// Server-side mirror of an open text document.
#[derive(Debug, Clone)]
pub struct LspDocument {
    pub uri: Url,
    pub text: Rope,
    pub version: i32,
}

/// Number of characters on `line`, excluding the line break.
fn line_content_len(text: &Rope, line: usize) -> usize {
    let slice = text.line(line);
    let mut len = slice.len_chars();
    while len > 0 && matches!(slice.char(len - 1), '\n' | '\r') {
        len -= 1;
    }
    len
}

/// Converts an LSP position (UTF-16 code units) to a char index in the Rope,
/// clamped to the line content or the end of the document.
fn position_to_char_idx(position: &Position, text: &Rope) -> usize {
    let line = position.line as usize;
    if line >= text.len_lines() {
        return text.len_chars();
    }
    let line_start = text.line_to_char(line);
    let line_end = line_start + line_content_len(text, line);
    let line_start_cu = text.char_to_utf16_cu(line_start);
    let line_end_cu = text.char_to_utf16_cu(line_end);
    let target_cu = (line_start_cu + position.character as usize).min(line_end_cu);
    text.utf16_cu_to_char(target_cu)
}

impl LspDocument {
    pub fn new(uri: Url, text: &str, version: i32) -> Self {
        Self {
            uri,
            text: Rope::from_str(text),
            version,
        }
    }

    /// Applies a list of content changes in order. Changes without a range
    /// replace the whole text.
    pub fn apply(&mut self, changes: Vec<TextDocumentContentChangeEvent>, version: i32) {
        for change in changes {
            match change.range {
                Some(range) => {
                    let start = position_to_char_idx(&range.start, &self.text);
                    let end = position_to_char_idx(&range.end, &self.text).max(start);
                    self.text.remove(start..end);
                    self.text.insert(start, &change.text);
                }
                None => self.text = Rope::from_str(&change.text),
            }
        }
        self.version = version;
    }

    /// Text of the cursor's line from its start up to the cursor.
    pub fn line_prefix(&self, position: &Position) -> String {
        let line = position.line as usize;
        if line >= self.text.len_lines() {
            return String::new();
        }
        let line_start = self.text.line_to_char(line);
        let cursor = position_to_char_idx(position, &self.text);
        self.text.slice(line_start..cursor).to_string()
    }

    /// Final path segment of the document URI, used for extension matching.
    pub fn file_name(&self) -> String {
        self.uri
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .map(str::to_string)
            .unwrap_or_else(|| self.uri.path().to_string())
    }
}
