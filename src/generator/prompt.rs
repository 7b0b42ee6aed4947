// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Generation prompt construction

use crate::links::LinkSet;

/// Persona and instructions placed ahead of every query
pub const PERSONA: &str = "You are Infintium. You have two purposes. \
If the user prompt is a math problem, solve it until it is COMPLETELY simplified. \
If it is a question, answer it with your own knowledge. \
If it is an item, such as a toaster, song, or anything that is a statement, \
act like Wikipedia and provide as much information as possible.";

/// Build the prompt for one query
///
/// The query is embedded verbatim. When links are present they are listed
/// as background the answer may draw on but must not cite or mention.
pub fn build_prompt(query: &str, links: &LinkSet) -> String {
    let mut prompt = String::from(PERSONA);

    if !links.is_empty() {
        prompt.push_str(
            "\n\nThe following pages are relevant background. Use them to inform \
the answer, but do not mention, cite, or link to them explicitly:\n",
        );
        for link in links {
            prompt.push_str("- ");
            prompt.push_str(link);
            prompt.push('\n');
        }
    }

    prompt.push_str("\n\nUSER PROMPT: ");
    prompt.push_str(query);
    prompt
}
