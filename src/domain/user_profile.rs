use super::{CharacterContext, UserId};

#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub uid: UserId,
    pub display_name: Option<String>,
    pub region: Option<String>,
    pub character: CharacterContext,
    pub active_directives: Vec<String>,
}

impl UserProfile {
    pub fn new(uid: UserId) -> Self {
        Self {
            uid,
            display_name: None,
            region: None,
            character: CharacterContext::default(),
            active_directives: Vec::new(),
        }
    }
}
