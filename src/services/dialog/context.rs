/// One inbound user message plus the replies produced while handling it.
#[derive(Debug, Clone)]
pub struct TurnContext {
    pub conversation_id: String,
    pub text: String,
    replies: Vec<String>,
}

impl TurnContext {
    pub fn new(conversation_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            text: text.into(),
            replies: Vec::new(),
        }
    }

    pub fn send_activity(&mut self, text: impl Into<String>) {
        self.replies.push(text.into());
    }

    pub fn replies(&self) -> &[String] {
        &self.replies
    }

    pub fn into_replies(self) -> Vec<String> {
        self.replies
    }
}
