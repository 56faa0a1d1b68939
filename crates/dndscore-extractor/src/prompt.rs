//! LLM prompts for decomposition and decontextualization

/// Builds the prompt that splits one sentence into subclaims
///
/// The whole passage is given as context so the model can tell which sentence
/// it is working on; the sentence itself is on its own `Sentence:` line.
pub struct DecompositionPromptBuilder<'a> {
    context: &'a str,
    sentence: &'a str,
}

impl<'a> DecompositionPromptBuilder<'a> {
    /// Create a builder for `sentence` taken from `context`
    pub fn new(context: &'a str, sentence: &'a str) -> Self {
        Self { context, sentence }
    }

    /// Build the complete prompt
    pub fn build(&self) -> String {
        let mut prompt = String::with_capacity(
            DECOMPOSITION_INSTRUCTIONS.len() + self.context.len() + self.sentence.len() + 128,
        );

        prompt.push_str(DECOMPOSITION_INSTRUCTIONS);
        prompt.push_str("\n\n");

        prompt.push_str("Context:\n");
        prompt.push_str(self.context.trim());
        prompt.push_str("\n\n");

        prompt.push_str(&format!("Sentence: {}\n\n", single_line(self.sentence)));

        prompt.push_str("Subclaims (JSON array of strings only, no additional text):\n");
        prompt
    }
}

/// Builds the prompt that rewrites one subclaim into a standalone claim
pub struct DecontextPromptBuilder<'a> {
    context: &'a str,
    sentence: &'a str,
    subclaim: &'a str,
}

impl<'a> DecontextPromptBuilder<'a> {
    /// Create a builder for `subclaim`, decomposed from `sentence` of passage `context`
    pub fn new(context: &'a str, sentence: &'a str, subclaim: &'a str) -> Self {
        Self {
            context,
            sentence,
            subclaim,
        }
    }

    /// Build the complete prompt
    pub fn build(&self) -> String {
        format!(
            "{}\n\nContext: {}\nOriginal sentence: {}\nSubclaim: {}\n\nDecontextualized claim:",
            DECONTEXT_INSTRUCTIONS,
            single_line(self.context),
            single_line(self.sentence),
            single_line(self.subclaim),
        )
    }
}

/// Collapse internal whitespace so a field stays on one prompt line
fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

const DECOMPOSITION_INSTRUCTIONS: &str = r#"Decompose the given sentence into a list of atomic subclaims.

Rules:
- One fact per subclaim
- Keep the wording of the sentence; do not resolve pronouns
- Skip content that is not a verifiable fact (greetings, opinions, advice)
- If the sentence contains no verifiable fact, return []

Example:

Context:
Al Pacino is an American actor. He was born in New York City, on April 25, 1940. Pacino's parents divorced when he was two.

Sentence to decompose:
He was born in New York City, on April 25, 1940.

Subclaims:
["He was born in New York City.", "He was born on April 25, 1940."]"#;

const DECONTEXT_INSTRUCTIONS: &str = r#"Decontextualize the subclaim to make it standalone, ensuring grammatical correctness and maintaining the original meaning.
Replace pronouns and vague references with the entities they refer to in the context. Do not add facts that are not in the subclaim.
For example, in a passage about Al Pacino, "He was born in New York City." becomes "Al Pacino was born in New York City."
Answer with the rewritten claim on a single line."#;
