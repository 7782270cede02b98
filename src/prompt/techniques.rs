use crate::config::{ModelDefaults, NANO_MODEL, TURBO_MODEL};
use crate::prompt::template::{fill_template, TemplateError};
use std::fmt;
use std::str::FromStr;

pub const TRANSLATION_TEMPLATE: &str =
    "Translate the following {source_language} sentence to {target_language}: {sentence}";

pub fn zero_shot_prompt(text: &str) -> String {
    format!("Classify the sentiment of the following text: '{text}'\nSentiment:")
}

pub fn few_shot_prompt(examples: &str, word: &str) -> String {
    format!("{examples}\nEnglish: {word}\nFrench:")
}

pub fn chain_of_thought_prompt(question: &str) -> String {
    format!("{question}\nLet's think step by step.")
}

pub fn context_prompt(context: &str, question: &str) -> String {
    format!("{context}\n{question}")
}

pub fn retrieval_augmented_prompt(retrieved: &str, question: &str) -> String {
    format!("{retrieved}\nQuestion: {question}")
}

pub fn demonstration_prompt(demonstrations: &str, query: &str) -> String {
    format!("{demonstrations}\n{query}")
}

pub fn contrastive_prompt(task: &str, options: &[&str]) -> String {
    let mut lines = vec![task.to_string()];
    for (i, opt) in options.iter().enumerate() {
        lines.push(format!("Explanation {}: {}", i + 1, opt));
    }
    lines.join("\n")
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Technique {
    Simple,
    ZeroShot,
    FewShot,
    ChainOfThought,
    Role,
    Contrastive,
    Template,
    RetrievalAugmented,
    Context,
    Instruction,
    Demonstration,
}

impl Technique {
    pub const ALL: [Technique; 11] = [
        Technique::Simple,
        Technique::ZeroShot,
        Technique::FewShot,
        Technique::ChainOfThought,
        Technique::Role,
        Technique::Contrastive,
        Technique::Template,
        Technique::RetrievalAugmented,
        Technique::Context,
        Technique::Instruction,
        Technique::Demonstration,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Technique::Simple => "simple",
            Technique::ZeroShot => "zero-shot",
            Technique::FewShot => "few-shot",
            Technique::ChainOfThought => "chain-of-thought",
            Technique::Role => "role",
            Technique::Contrastive => "contrastive",
            Technique::Template => "template",
            Technique::RetrievalAugmented => "retrieval-augmented",
            Technique::Context => "context",
            Technique::Instruction => "instruction",
            Technique::Demonstration => "demonstration",
        }
    }

    pub fn defaults(self) -> ModelDefaults {
        match self {
            Technique::Simple => ModelDefaults::new(NANO_MODEL, 0.7, Some(150)),
            Technique::ChainOfThought | Technique::RetrievalAugmented => {
                ModelDefaults::new(TURBO_MODEL, 0.7, Some(200))
            }
            _ => ModelDefaults::new(TURBO_MODEL, 0.7, Some(150)),
        }
    }

    pub fn demo(self) -> Result<TechniqueDemo, TemplateError> {
        let demo = match self {
            Technique::Simple => TechniqueDemo::new(self, None)
                .trim(false)
                .case(
                    PromptCase::new("What is artificial intelligence?")
                        .heading("Example 1: Simple Question"),
                )
                .case(
                    PromptCase::new(
                        "You are a helpful AI assistant. Explain quantum computing in simple terms.",
                    )
                    .heading("Example 2: Role-based Prompt"),
                )
                .case(
                    PromptCase::new(
                        "Please provide a brief explanation of machine learning, including:\n    1. Definition\n    2. Key concepts\n    3. Common applications",
                    )
                    .heading("Example 3: Structured Prompt"),
                ),
            Technique::ZeroShot => {
                let mut d = TechniqueDemo::new(self, Some("Example: Zero-Shot Sentiment Analysis"))
                    .trim(false);
                for text in [
                    "I absolutely loved the movie! It was fantastic.",
                    "The weather today is quite gloomy and dull.",
                ] {
                    d = d.case(PromptCase::new(zero_shot_prompt(text)).show("Text", text));
                }
                d
            }
            Technique::FewShot => {
                let examples = "\n    English: sea otter\n    French: loutre de mer\n    \n    English: peppermint\n    French: menthe poivrée\n    \n    English: plush girafe\n    French: girafe en peluche\n    ";
                let word = "cheese";
                TechniqueDemo::new(self, Some("Example: Few-Shot English to French Translation"))
                    .stop(["\n\n"])
                    .case(
                        PromptCase::new(few_shot_prompt(examples, word))
                            .show("English", word)
                            .response_label("French Translation"),
                    )
            }
            Technique::ChainOfThought => {
                let question = "If there are 3 cars and each car has 4 wheels, how many wheels are there in total?";
                TechniqueDemo::new(self, Some("Example: Chain-of-Thought Reasoning")).case(
                    PromptCase::new(chain_of_thought_prompt(question))
                        .show("Question", question)
                        .response_label("Model's Reasoning and Answer"),
                )
            }
            Technique::Role => TechniqueDemo::new(self, Some("Example: Role-Based Prompting"))
                .case(PromptCase::echoed(
                    "You are a professional chef. Explain how to make a perfect omelette.",
                )),
            Technique::Contrastive => {
                let prompt = contrastive_prompt(
                    "Compare the following two explanations for why the sky is blue and say which is more accurate and why.",
                    &[
                        "The sky is blue because the ocean reflects its color.",
                        "The sky is blue because molecules in the air scatter blue light from the sun more than they scatter red light.",
                    ],
                );
                TechniqueDemo::new(self, Some("Example: Contrastive Prompting"))
                    .case(PromptCase::echoed(prompt))
            }
            Technique::Template => {
                let prompt = fill_template(
                    TRANSLATION_TEMPLATE,
                    &[
                        ("source_language", "English"),
                        ("target_language", "Spanish"),
                        ("sentence", "How are you?"),
                    ],
                )?;
                TechniqueDemo::new(self, Some("Example: Template-Based Prompting")).case(
                    PromptCase::new(prompt)
                        .show("Prompt Template", TRANSLATION_TEMPLATE)
                        .response_label("Model's Response"),
                )
            }
            Technique::RetrievalAugmented => {
                let prompt = retrieval_augmented_prompt(
                    "Wikipedia: The mitochondrion is the powerhouse of the cell.",
                    "What is the function of mitochondria in a cell?",
                );
                TechniqueDemo::new(self, Some("Example: Retrieval-Augmented Prompting"))
                    .case(PromptCase::echoed(prompt))
            }
            Technique::Context => {
                let prompt = context_prompt(
                    "You are helping a student prepare for a biology exam.",
                    "Explain the process of photosynthesis.",
                );
                TechniqueDemo::new(self, Some("Example: Context-Based Prompting"))
                    .case(PromptCase::echoed(prompt))
            }
            Technique::Instruction => {
                let instruction = "Summarize the following text in one sentence: Artificial intelligence is a branch of computer science that aims to create machines capable of intelligent behavior.";
                TechniqueDemo::new(self, Some("Example: Instruction Prompting")).case(
                    PromptCase::new(instruction)
                        .show("Instruction", instruction)
                        .response_label("Model's Response"),
                )
            }
            Technique::Demonstration => {
                let demonstrations =
                    "\n    Input: 2 + 2\n    Output: 4\n    \n    Input: 5 + 7\n    Output: 12\n    ";
                let prompt = demonstration_prompt(demonstrations, "Input: 8 + 6\nOutput:");
                TechniqueDemo::new(self, Some("Example: Demonstration-Based Prompting"))
                    .case(PromptCase::echoed(prompt))
            }
        };
        Ok(demo)
    }
}

impl fmt::Display for Technique {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Technique {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace('_', "-");
        let t = match key.as_str() {
            "simple" | "basic" => Technique::Simple,
            "zero-shot" | "zeroshot" => Technique::ZeroShot,
            "few-shot" | "fewshot" => Technique::FewShot,
            "chain-of-thought" | "cot" => Technique::ChainOfThought,
            "role" => Technique::Role,
            "contrastive" => Technique::Contrastive,
            "template" => Technique::Template,
            "retrieval-augmented" | "rag" => Technique::RetrievalAugmented,
            "context" => Technique::Context,
            "instruction" => Technique::Instruction,
            "demonstration" | "demo" => Technique::Demonstration,
            _ => return Err(()),
        };
        Ok(t)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PromptCase {
    pub heading: Option<String>,
    /// 调用前回显的 (标签, 值)
    pub shown: Vec<(String, String)>,
    pub prompt: String,
    pub response_label: String,
}

impl PromptCase {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            heading: None,
            shown: Vec::new(),
            prompt: prompt.into(),
            response_label: "Response".to_string(),
        }
    }

    /// 回显完整 prompt，回复标签为 "Model's Response"
    pub fn echoed(prompt: impl Into<String>) -> Self {
        let prompt = prompt.into();
        Self::new(prompt.clone())
            .show("Prompt", prompt)
            .response_label("Model's Response")
    }

    pub fn heading(mut self, h: impl Into<String>) -> Self {
        self.heading = Some(h.into());
        self
    }

    pub fn show(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.shown.push((label.into(), value.into()));
        self
    }

    pub fn response_label(mut self, label: impl Into<String>) -> Self {
        self.response_label = label.into();
        self
    }
}

#[derive(Clone, Debug)]
pub struct TechniqueDemo {
    pub technique: Technique,
    pub title: Option<String>,
    pub defaults: ModelDefaults,
    pub stop: Vec<String>,
    pub trim: bool,
    pub cases: Vec<PromptCase>,
}

impl TechniqueDemo {
    fn new(technique: Technique, title: Option<&str>) -> Self {
        Self {
            technique,
            title: title.map(str::to_string),
            defaults: technique.defaults(),
            stop: Vec::new(),
            trim: true,
            cases: Vec::new(),
        }
    }

    fn trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }

    fn stop<const N: usize>(mut self, stop: [&str; N]) -> Self {
        self.stop = stop.iter().map(|s| s.to_string()).collect();
        self
    }

    fn case(mut self, case: PromptCase) -> Self {
        self.cases.push(case);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_match_expected_shapes() {
        assert_eq!(
            zero_shot_prompt("I loved it"),
            "Classify the sentiment of the following text: 'I loved it'\nSentiment:"
        );
        assert_eq!(
            chain_of_thought_prompt("Q?"),
            "Q?\nLet's think step by step."
        );
        assert_eq!(
            retrieval_augmented_prompt("Wikipedia: X.", "What?"),
            "Wikipedia: X.\nQuestion: What?"
        );
        assert_eq!(few_shot_prompt("EX", "cheese"), "EX\nEnglish: cheese\nFrench:");
        assert_eq!(
            contrastive_prompt("Compare.", &["a", "b"]),
            "Compare.\nExplanation 1: a\nExplanation 2: b"
        );
    }

    #[test]
    fn every_technique_builds_a_demo() {
        for t in Technique::ALL {
            let demo = t.demo().unwrap();
            assert!(!demo.cases.is_empty(), "{t}");
            assert_eq!(demo.technique, t);
            assert_eq!(t.name().parse::<Technique>(), Ok(t));
        }
    }

    #[test]
    fn template_demo_uses_filled_prompt() {
        let demo = Technique::Template.demo().unwrap();
        assert_eq!(
            demo.cases[0].prompt,
            "Translate the following English sentence to Spanish: How are you?"
        );
    }

    #[test]
    fn per_technique_defaults() {
        assert_eq!(Technique::Simple.defaults().model, NANO_MODEL);
        assert_eq!(Technique::ChainOfThought.defaults().max_tokens, Some(200));
        assert_eq!(Technique::Role.defaults().max_tokens, Some(150));
        assert_eq!(Technique::FewShot.demo().unwrap().stop, vec!["\n\n"]);
        assert!(!Technique::ZeroShot.demo().unwrap().trim);
        assert!(Technique::Context.demo().unwrap().trim);
    }

    #[test]
    fn parses_aliases() {
        assert_eq!("COT".parse::<Technique>(), Ok(Technique::ChainOfThought));
        assert_eq!("zero_shot".parse::<Technique>(), Ok(Technique::ZeroShot));
        assert_eq!("rag".parse::<Technique>(), Ok(Technique::RetrievalAugmented));
        assert!("telepathy".parse::<Technique>().is_err());
    }
}
