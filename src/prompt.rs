//! Interactive prompts for the KYC flow.

use std::collections::VecDeque;

use crate::error::{Error, Result};
use crate::extract::normalize_dob;
use crate::types::StructuredDocument;

/// Asks the user a question and waits for the answer.
///
/// `None` means the user abandoned the prompt.
pub trait Prompter {
    /// Ask `question`.
    fn ask(&mut self, question: &str) -> Option<String>;
}

/// Answers prompts from a fixed script, then abandons.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<Option<String>>,
    asked: Vec<String>,
}

impl ScriptedPrompter {
    /// Creates a prompter that gives `answers` in order.
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(|a| Some(a.into())).collect(),
            asked: Vec::new(),
        }
    }

    /// Creates a prompter that abandons every prompt.
    pub fn abandon() -> Self {
        Self::default()
    }

    /// Questions asked so far.
    pub fn asked(&self) -> &[String] {
        &self.asked
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&mut self, question: &str) -> Option<String> {
        self.asked.push(question.to_string());
        self.answers.pop_front().flatten()
    }
}

/// Questions asked by [`collect_kyc`], in order.
pub const KYC_QUESTIONS: [(&str, &str); 3] = [
    ("Enter full name (e.g., John Doe):", "name"),
    ("Enter national ID (format e.g., GH123456):", "national ID"),
    ("Enter DOB (yyyy-mm-dd or dd-mm-yyyy):", "DOB"),
];

/// Runs the three-question KYC sequence.
///
/// Fails with [`Error::Abort`] as soon as one answer is missing or blank;
/// later questions are not asked.
pub fn collect_kyc(prompter: &mut dyn Prompter) -> Result<StructuredDocument> {
    let mut answers = Vec::with_capacity(KYC_QUESTIONS.len());
    for (question, field) in KYC_QUESTIONS {
        match prompter.ask(question) {
            Some(answer) if !answer.trim().is_empty() => answers.push(answer),
            _ => return Err(Error::abort(format!("KYC cancelled: {field} required."))),
        }
    }
    let [name, national_id, dob]: [String; 3] = answers
        .try_into()
        .map_err(|_| Error::abort("KYC cancelled."))?;
    Ok(StructuredDocument::national_id(
        &name,
        &national_id,
        &normalize_dob(&dob),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_answers_build_document() {
        let mut prompter = ScriptedPrompter::new(["John Doe", "gh123456", "25-12-1990"]);
        let doc = collect_kyc(&mut prompter).unwrap();
        assert_eq!(doc.name, "John Doe");
        assert_eq!(doc.document_number, "GH123456");
        assert_eq!(doc.national_id, "GH123456");
        assert_eq!(doc.dob, "1990-12-25");
        assert_eq!(prompter.asked().len(), 3);
    }

    #[test]
    fn iso_dob_is_kept() {
        let mut prompter = ScriptedPrompter::new(["Ama", "123456", "1990-12-25"]);
        assert_eq!(collect_kyc(&mut prompter).unwrap().dob, "1990-12-25");
    }

    #[test]
    fn abandoning_name_stops_early() {
        let mut prompter = ScriptedPrompter::abandon();
        let err = collect_kyc(&mut prompter).unwrap_err();
        assert!(err.is_abort());
        assert_eq!(err.to_string(), "Cancelled: KYC cancelled: name required.");
        assert_eq!(prompter.asked().len(), 1);
    }

    #[test]
    fn blank_dob_aborts() {
        let mut prompter = ScriptedPrompter::new(["Ama", "123456", "  "]);
        let err = collect_kyc(&mut prompter).unwrap_err();
        assert!(matches!(err, Error::Abort { message } if message == "KYC cancelled: DOB required."));
    }
}
