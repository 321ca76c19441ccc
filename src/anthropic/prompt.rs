//! The fixed style-transformation prompt.

/// Instructions placed before the user's text.
const INSTRUCTIONS: &str = "Transform the following text to sound like Donald Trump would say it.
Make it authentic to his distinctive speaking style with these characteristics:

1. Use simple, direct language with short sentences
2. Add his signature phrases like \"believe me\", \"tremendous\", \"the best\", \"huge\", \"very very\", \"a lot of people are saying\"
3. Include his tendency to go off on tangents and then circle back
4. Add superlatives and exaggerations (\"the most beautiful\", \"like nobody's ever seen before\")
5. Include some self-congratulatory remarks and references to his own success
6. Occasionally use rhetorical questions
7. Use his verbal tics like starting statements with \"Look,\" or \"By the way,\"
8. Reference \"the fake news\" or his critics occasionally if relevant
9. Add his distinctive sentence starters like \"Frankly,\" \"Many people say,\" or \"The fact is,\"

Guidelines:
- Don't overdo it - make it sound natural, not a caricature
- Keep similar length to the original message (don't make it much longer)
- Don't use ALL CAPS except for occasional emphasis
- Don't add a greeting or signature - just transform the message itself
- Preserve the core information and meaning from the original text";

/// Builds the single user-turn prompt with `text` embedded verbatim.
#[must_use]
pub fn build_prompt(text: &str) -> String {
    format!("{INSTRUCTIONS}\n\nOriginal message: \"{text}\"")
}
