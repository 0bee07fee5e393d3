use serde::{Deserialize, Serialize};

use crate::access::Role;

/// Portal account row.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Profile {
    pub id: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub nickname: Option<String>,
    pub avatar_url: Option<String>,
    pub role: Role,
}

impl Profile {
    /// Attribution name for outgoing messages: nickname, else first + last
    /// name, else the account email.
    pub fn display_name(&self) -> String {
        if let Some(nick) = self.nickname.as_deref() {
            let nick = nick.trim();
            if !nick.is_empty() {
                return nick.to_string();
            }
        }

        let full_name = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if !full_name.is_empty() {
            return full_name;
        }

        self.email.clone()
    }
}
