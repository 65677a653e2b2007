//! Line editor helper for the register shell
//!
//! Provides verb and macro-name completion, argument hints and colouring.

use colored::Colorize;
use rustyline::completion::{Completer, FilenameCompleter, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{Context, Helper};
use std::borrow::Cow;

use crate::command::{canonical_verb, synopsis, VERBS};
use wmreg_core::macros;
use wmreg_core::number::parse_int;

/// Helper struct for rustyline that provides completion, hints and
/// highlighting for shell commands.
#[derive(Helper)]
pub struct ReplHelper {
    /// Every verb and alias
    verbs: Vec<&'static str>,
    /// Macro names and aliases
    macro_names: Vec<&'static str>,
}

impl ReplHelper {
    /// Create a helper that knows the built-in verbs and macros
    pub fn new() -> Self {
        let mut verbs: Vec<&'static str> = VERBS
            .iter()
            .flat_map(|(verb, aliases, _, _)| std::iter::once(*verb).chain(aliases.iter().copied()))
            .collect();
        verbs.sort_unstable();

        let macro_names = macros::CATALOG
            .iter()
            .flat_map(|m| std::iter::once(m.name).chain(m.aliases.iter().copied()))
            .collect();

        Self { verbs, macro_names }
    }
}

impl Default for ReplHelper {
    fn default() -> Self {
        Self::new()
    }
}

/// Start of the word under the cursor
fn word_start(line: &str, pos: usize) -> usize {
    line[..pos]
        .rfind(char::is_whitespace)
        .map(|i| i + 1)
        .unwrap_or(0)
}

impl Completer for ReplHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Self::Candidate>)> {
        let start = word_start(line, pos);
        let prefix = &line[start..pos];
        let words_before = line[..start].split_whitespace().count();

        let pool: &[&'static str] = match words_before {
            0 => &self.verbs,
            1 if canonical_verb(&line[..start].trim().to_lowercase()) == Some("macro") => {
                &self.macro_names
            }
            _ => return Ok((pos, Vec::new())),
        };

        let candidates = pool
            .iter()
            .filter(|name| name.starts_with(&prefix.to_lowercase()))
            .map(|name| Pair {
                display: name.to_string(),
                replacement: format!("{} ", name),
            })
            .collect();

        Ok((start, candidates))
    }
}

impl Hinter for ReplHelper {
    type Hint = String;

    /// Show the argument synopsis once a known verb has been typed
    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        if pos != line.len() {
            return None;
        }
        let verb = line.strip_suffix(' ')?.trim();
        if verb.contains(char::is_whitespace) {
            return None;
        }
        let args = synopsis(canonical_verb(&verb.to_lowercase())?);
        (!args.is_empty()).then(|| args.to_string())
    }
}

impl Highlighter for ReplHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.trim().is_empty() {
            return Cow::Borrowed(line);
        }

        let mut highlighted = String::with_capacity(line.len() * 2);
        let mut first = true;
        let mut rest = line;

        while !rest.is_empty() {
            let ws = rest.len() - rest.trim_start().len();
            highlighted.push_str(&rest[..ws]);
            rest = &rest[ws..];
            let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            let word = &rest[..end];
            rest = &rest[end..];
            if word.is_empty() {
                continue;
            }

            let colored = if first {
                first = false;
                // Verbs - cyan when known, red otherwise
                if canonical_verb(&word.to_lowercase()).is_some() {
                    word.bright_cyan().bold().to_string()
                } else {
                    word.bright_red().to_string()
                }
            } else if parse_int(word).is_ok() {
                // Numbers - yellow
                word.bright_yellow().to_string()
            } else if self.macro_names.iter().any(|m| *m == word) {
                // Macro names - green
                word.bright_green().to_string()
            } else {
                word.to_string()
            };
            highlighted.push_str(&colored);
        }

        Cow::Owned(highlighted)
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(hint.dimmed().to_string())
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Validator for ReplHelper {
    fn validate(&self, _ctx: &mut ValidationContext) -> rustyline::Result<ValidationResult> {
        // Every command fits on one line
        Ok(ValidationResult::Valid(None))
    }
}

/// Helper for the start-up prompts: file name completion only
#[derive(Helper)]
pub struct PromptHelper {
    files: FilenameCompleter,
}

impl PromptHelper {
    /// Create a prompt helper
    pub fn new() -> Self {
        Self {
            files: FilenameCompleter::new(),
        }
    }
}

impl Default for PromptHelper {
    fn default() -> Self {
        Self::new()
    }
}

impl Completer for PromptHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Self::Candidate>)> {
        self.files.complete(line, pos, ctx)
    }
}

impl Hinter for PromptHelper {
    type Hint = String;
}

impl Highlighter for PromptHelper {}

impl Validator for PromptHelper {}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete(helper: &ReplHelper, line: &str) -> (usize, Vec<String>) {
        let history = rustyline::history::DefaultHistory::new();
        let ctx = Context::new(&history);
        let (start, pairs) = helper.complete(line, line.len(), &ctx).unwrap();
        (start, pairs.into_iter().map(|p| p.display).collect())
    }

    #[test]
    fn test_complete_verbs() {
        let helper = ReplHelper::new();
        let (start, names) = complete(&helper, "wri");
        assert_eq!(start, 0);
        assert_eq!(names, ["write", "writeaddr", "writeall"]);

        let (_, names) = complete(&helper, "");
        assert!(names.contains(&"quit".to_string()));
        assert!(names.contains(&"wa".to_string()));
    }

    #[test]
    fn test_complete_macro_names() {
        let helper = ReplHelper::new();
        let (start, names) = complete(&helper, "macro dac");
        assert_eq!(start, 6);
        assert_eq!(names, ["dac_mute", "dac_unmute"]);

        let (_, names) = complete(&helper, "macro b");
        assert_eq!(names, ["bringup"]);

        // no completion for numeric arguments
        let (_, names) = complete(&helper, "set 1");
        assert!(names.is_empty());
    }

    #[test]
    fn test_hint_shows_arguments() {
        let helper = ReplHelper::new();
        let history = rustyline::history::DefaultHistory::new();
        let ctx = Context::new(&history);
        assert_eq!(
            helper.hint("set ", 4, &ctx),
            Some("<idx> <value>".to_string())
        );
        assert_eq!(
            helper.hint("WA ", 3, &ctx),
            Some("<addr> <val>".to_string())
        );
        assert_eq!(helper.hint("list ", 5, &ctx), None);
        assert_eq!(helper.hint("set", 3, &ctx), None);
        assert_eq!(helper.hint("set 1 ", 6, &ctx), None);
    }

    #[test]
    fn test_highlight_keeps_text() {
        colored::control::set_override(false);
        let helper = ReplHelper::new();
        let line = "  set  2 0x1ff";
        assert_eq!(helper.highlight(line, 0), line);
    }
}
