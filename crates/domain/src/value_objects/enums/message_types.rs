use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MessageType {
    #[default]
    #[serde(rename = "initial")]
    Initial,
    #[serde(rename = "follow_up_1")]
    FollowUp1,
    #[serde(rename = "follow_up_2")]
    FollowUp2,
    #[serde(rename = "follow_up_3")]
    FollowUp3,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Initial => "initial",
            MessageType::FollowUp1 => "follow_up_1",
            MessageType::FollowUp2 => "follow_up_2",
            MessageType::FollowUp3 => "follow_up_3",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "initial" => Some(MessageType::Initial),
            "follow_up_1" => Some(MessageType::FollowUp1),
            "follow_up_2" => Some(MessageType::FollowUp2),
            "follow_up_3" => Some(MessageType::FollowUp3),
            _ => None,
        }
    }

    pub fn from_sequence(sequence: u8) -> Option<Self> {
        match sequence {
            1 => Some(MessageType::FollowUp1),
            2 => Some(MessageType::FollowUp2),
            3 => Some(MessageType::FollowUp3),
            _ => None,
        }
    }
}

impl Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
