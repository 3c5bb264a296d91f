use crate::llm::prompts;

pub struct PromptPair {
    pub system: String,
    pub user: String,
}

pub fn title_prompt(diff: &str, language: &str) -> PromptPair {
    let user = format!(
        "Generate a short, impactful, and descriptive Pull Request title in {language} \
         for the following diff:\n\n```diff\n{diff}\n```"
    );

    PromptPair {
        system: prompts::TITLE_INSTRUCTIONS.to_owned(),
        user,
    }
}

pub fn description_prompt(diff: &str, template: &str, language: &str) -> PromptPair {
    let user = format!(
        "Generate a Pull Request description in {language} for the following diff, \
         using this template:\n\n\
         Template:\n{template}\n\n\
         Diff:\n```diff\n{diff}\n```"
    );

    PromptPair {
        system: prompts::DESCRIPTION_INSTRUCTIONS.to_owned(),
        user,
    }
}
