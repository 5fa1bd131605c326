use candor_knowledge::KnowledgeContext;

/// Who the agent is pretending to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub display_name: String,
    pub role_title: String,
}

impl Identity {
    pub fn new(display_name: impl Into<String>, role_title: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            role_title: role_title.into(),
        }
    }
}

/// Process-wide, read-only context the runtime answers from.
#[derive(Debug, Clone)]
pub struct Persona {
    pub identity: Identity,
    pub knowledge: KnowledgeContext,
}

impl Persona {
    pub fn new(identity: Identity, knowledge: KnowledgeContext) -> Self {
        Self {
            identity,
            knowledge,
        }
    }
}
