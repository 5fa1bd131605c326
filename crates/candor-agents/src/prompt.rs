use candor_knowledge::KnowledgeContext;

use crate::persona::Identity;
use crate::tools::web_search::GOOGLE_SEARCH;

/// Render the role-play system instruction for `identity`, followed by the
/// knowledge context verbatim.
pub fn build_system_prompt(identity: &Identity, knowledge: &KnowledgeContext) -> String {
    format!(
        "You are acting as {name}, a {role}.\n\
         \n\
         ## DUAL GOAL\n\
         1. **Candidate:** Answer impressively using the RESUME CONTEXT.\n\
         2. **Coach:** After the answer, explain WHY it is good.\n\
         \n\
         ## INSTRUCTIONS\n\
         - Speak in First Person (\"I\", \"Me\").\n\
         - Use the STAR Method (Situation, Task, Action, Result) for substantive answers.\n\
         - If asked about a company, use '{search}' first.\n\
         - End with a 'Coach's Note'.\n\
         \n\
         ## RESUME CONTEXT\n\
         {context}",
        name = identity.display_name,
        role = identity.role_title,
        search = GOOGLE_SEARCH,
        context = knowledge.as_str(),
    )
}
