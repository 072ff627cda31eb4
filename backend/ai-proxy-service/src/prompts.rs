//! Fixed system prompts
//!
//! Each endpoint selects a prompt from a small enum of persona/category
//! values; nothing here is dynamic beyond that choice.

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Persona {
    Assistant,
    Tutor,
    Coach,
    Researcher,
    Creative,
}

impl Default for Persona {
    fn default() -> Self {
        Persona::Assistant
    }
}

impl Persona {
    pub fn system_prompt(&self) -> &'static str {
        match self {
            Persona::Assistant => {
                "You are a helpful, concise assistant. Answer directly and admit uncertainty."
            }
            Persona::Tutor => {
                "You are a patient tutor. Explain step by step, check understanding with short \
                 questions, and prefer worked examples over abstract definitions."
            }
            Persona::Coach => {
                "You are an encouraging coach. Keep answers short, action-oriented and positive; \
                 end with one concrete next step."
            }
            Persona::Researcher => {
                "You are a careful researcher. Cite what is established versus speculative, \
                 quantify where possible, and flag missing information explicitly."
            }
            Persona::Creative => {
                "You are a playful creative partner. Offer unexpected angles and vivid language \
                 while staying on the user's topic."
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscoverCategory {
    Science,
    History,
    Technology,
    Arts,
    Nature,
}

impl DiscoverCategory {
    pub fn system_prompt(&self) -> &'static str {
        match self {
            DiscoverCategory::Science => {
                "Suggest three surprising, accurate science topics worth exploring, one sentence \
                 each."
            }
            DiscoverCategory::History => {
                "Suggest three lesser-known historical events worth exploring, one sentence each."
            }
            DiscoverCategory::Technology => {
                "Suggest three current technology developments worth exploring, one sentence each."
            }
            DiscoverCategory::Arts => {
                "Suggest three artworks or artistic movements worth exploring, one sentence each."
            }
            DiscoverCategory::Nature => {
                "Suggest three remarkable natural phenomena worth exploring, one sentence each."
            }
        }
    }
}

pub const WEB_SEARCH: &str =
    "Answer the query as a concise summary of current public knowledge. List the key facts \
     first, then caveats. Do not fabricate sources.";

pub const QUIZ: &str =
    "Generate a quiz as strict JSON with the shape {\"questions\": [{\"prompt\": string, \
     \"choices\": [string, string, string, string], \"answer_index\": number}]}. Return only \
     the JSON, no prose.";

pub const DOCUMENT: &str =
    "Write a well-structured document in Markdown for the given brief. Use headings and keep \
     sections short.";

pub const CODE: &str =
    "Write clean, idiomatic code for the request. Return a single fenced code block followed \
     by a one-paragraph explanation.";

pub const SUGGEST: &str =
    "Given the conversation so far, propose three short replies the user might send next. \
     Return them as a JSON array of strings, nothing else.";

pub const EXTRACT_TEXT: &str =
    "Extract the readable text from the following document content. Preserve paragraph breaks, \
     drop boilerplate and markup, and return plain text only.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn personas_have_distinct_prompts() {
        let prompts = [
            Persona::Assistant.system_prompt(),
            Persona::Tutor.system_prompt(),
            Persona::Coach.system_prompt(),
            Persona::Researcher.system_prompt(),
            Persona::Creative.system_prompt(),
        ];
        let distinct: std::collections::HashSet<_> = prompts.iter().collect();
        assert_eq!(distinct.len(), prompts.len());
        assert!(prompts.iter().all(|p| !p.is_empty()));
    }

    #[test]
    fn persona_deserializes_from_lowercase() {
        let persona: Persona = serde_json::from_str("\"tutor\"").unwrap();
        assert_eq!(persona, Persona::Tutor);
    }

    #[test]
    fn unknown_persona_is_rejected() {
        assert!(serde_json::from_str::<Persona>("\"wizard\"").is_err());
    }

    #[test]
    fn category_prompts_are_nonempty() {
        for category in [
            DiscoverCategory::Science,
            DiscoverCategory::History,
            DiscoverCategory::Technology,
            DiscoverCategory::Arts,
            DiscoverCategory::Nature,
        ] {
            assert!(!category.system_prompt().is_empty());
        }
    }
}
