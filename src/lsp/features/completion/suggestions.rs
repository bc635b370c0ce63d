//! Segment-aware suggestion construction
//!
//! Matches coming out of the trie are full key names. Users type keys one
//! dotted segment at a time, so a match whose remaining tail still contains a
//! `.` is shortened to the next segment (a *partial* suggestion). Many keys
//! share that segment, so suggestions are deduplicated by their text, keeping
//! the first one in trie order.

use rustc_hash::FxHashSet;
use tower_lsp::lsp_types::{
    Command, CompletionItem, CompletionItemKind, CompletionItemLabelDetails, CompletionTextEdit,
    InsertTextFormat, Range, TextEdit,
};

use crate::settings::KeyEntry;

/// Separator between key segments
pub const SEGMENT_SEPARATOR: char = '.';

/// Appended after a completed key
pub const VALUE_SEPARATOR: char = '=';

/// Tail text marking suggestions that come from user-supplied keys
pub const CUSTOM_SOURCE_MARKER: &str = "  [C]";

/// Client command that reopens the completion popup
pub const TRIGGER_SUGGEST_COMMAND: &str = "editor.action.triggerSuggest";

/// Prefix that sorts after any other completion source
const LOWEST_PRIORITY_SORT_PREFIX: &str = "~~~~";

/// What happens when the user accepts a suggestion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertBehavior {
    /// Insert the partial key and immediately ask for the next segment
    Retrigger,
    /// Insert the full key followed by `=`, cursor right after it
    AppendSeparator,
}

/// A single key suggestion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySuggestion {
    pub display_text: String,
    pub is_partial: bool,
    pub entry: KeyEntry,
}

impl KeySuggestion {
    /// Auxiliary text shown next to complete suggestions
    pub fn description(&self) -> Option<&str> {
        if self.is_partial {
            None
        } else {
            self.entry.description()
        }
    }

    pub fn insert_behavior(&self) -> InsertBehavior {
        if self.is_partial {
            InsertBehavior::Retrigger
        } else {
            InsertBehavior::AppendSeparator
        }
    }

    /// Text written into the document when the suggestion is accepted
    pub fn insert_text(&self) -> String {
        match self.insert_behavior() {
            InsertBehavior::Retrigger => self.display_text.clone(),
            InsertBehavior::AppendSeparator => format!("{}{}", self.display_text, VALUE_SEPARATOR),
        }
    }

    /// Convert to an LSP completion item replacing `replace_range`, the typed prefix.
    ///
    /// `sort_order` is the suggestion's position in the builder output.
    pub fn to_completion_item(&self, replace_range: Range, sort_order: usize) -> CompletionItem {
        let (kind, command) = match self.insert_behavior() {
            InsertBehavior::Retrigger => (
                CompletionItemKind::MODULE,
                Some(Command {
                    title: "Suggest next key segment".to_string(),
                    command: TRIGGER_SUGGEST_COMMAND.to_string(),
                    arguments: None,
                }),
            ),
            InsertBehavior::AppendSeparator => (CompletionItemKind::PROPERTY, None),
        };

        CompletionItem {
            label: self.display_text.clone(),
            label_details: Some(CompletionItemLabelDetails {
                detail: Some(CUSTOM_SOURCE_MARKER.to_string()),
                description: self.description().map(str::to_string),
            }),
            kind: Some(kind),
            detail: self.description().map(str::to_string),
            preselect: Some(false),
            sort_text: Some(format!("{}{:04}", LOWEST_PRIORITY_SORT_PREFIX, sort_order)),
            filter_text: Some(self.display_text.clone()),
            insert_text_format: Some(InsertTextFormat::PLAIN_TEXT),
            text_edit: Some(CompletionTextEdit::Edit(TextEdit {
                range: replace_range,
                new_text: self.insert_text(),
            })),
            command,
            ..Default::default()
        }
    }
}

/// Turn trie matches for `prefix` into deduplicated suggestions, preserving match order.
///
/// Entries that do not start with `prefix` are skipped.
pub fn build_suggestions(prefix: &str, matches: &[KeyEntry]) -> Vec<KeySuggestion> {
    let mut seen: FxHashSet<String> = FxHashSet::default();
    let mut suggestions = Vec::new();

    for entry in matches {
        let Some(remaining) = entry.name().strip_prefix(prefix) else {
            continue;
        };

        let (display_text, is_partial) = match remaining.find(SEGMENT_SEPARATOR) {
            Some(dot) => (
                format!("{}{}", prefix, &remaining[..dot + SEGMENT_SEPARATOR.len_utf8()]),
                true,
            ),
            None => (entry.name().to_string(), false),
        };

        if seen.insert(display_text.clone()) {
            suggestions.push(KeySuggestion {
                display_text,
                is_partial,
                entry: entry.clone(),
            });
        }
    }

    suggestions
}
