//! Context assembly: question plus retrieved chunks into a bounded prompt

use std::fmt;

use crate::types::RetrievalResult;

/// A prompt ready for the generator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    text: String,
    included: usize,
    dropped: usize,
}

impl Prompt {
    /// Prompt text
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Number of retrieved chunks kept in the context
    pub fn included(&self) -> usize {
        self.included
    }

    /// Number of lowest-ranked chunks dropped to fit the budget
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Length in characters
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Consume into the prompt text
    pub fn into_string(self) -> String {
        self.text
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Builds question/context prompts within a character budget
pub struct ContextAssembler;

impl ContextAssembler {
    /// Question section, followed by the context label
    fn header(query: &str) -> String {
        format!("Question: {}\n\nContext:\n", query)
    }

    /// Assemble a prompt from results ordered nearest first.
    ///
    /// Results are dropped from the end (most distant first) until the prompt
    /// fits `max_length` characters. Kept results are never cut. If even the
    /// bare question exceeds the budget, the question-only prompt is returned.
    pub fn assemble(query: &str, results: &[RetrievalResult], max_length: usize) -> Prompt {
        let header = Self::header(query);
        let header_len = header.chars().count();
        let text_lens: Vec<usize> = results.iter().map(|r| r.text.chars().count()).collect();

        let mut included = results.len();
        while included > 0 {
            let context_len: usize =
                text_lens[..included].iter().sum::<usize>() + (included - 1);
            if header_len + context_len <= max_length {
                break;
            }
            included -= 1;
        }

        let dropped = results.len() - included;
        if dropped > 0 {
            tracing::debug!(
                "Prompt budget {} chars: kept {} of {} retrieved chunks",
                max_length,
                included,
                results.len()
            );
        }

        let context = results[..included]
            .iter()
            .map(|r| r.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        Prompt {
            text: header + &context,
            included,
            dropped,
        }
    }
}
