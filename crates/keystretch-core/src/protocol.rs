//! Control messages accepted by the job controller.
//!
//! Transports are free to encode these however they like; [`MessageKind`]
//! gives each logical message a distinct tag for those that need one.

use std::fmt;

use crate::error::StretchError;
use crate::kdf::KdfParameters;
use crate::reply::ReplyChannel;

/// Wire tag for each logical message, requests and replies alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageKind {
    Start = 1,
    GetStatus = 2,
    Status = 3,
    GetResult = 4,
    Result = 5,
    Terminate = 6,
}

impl MessageKind {
    pub const ALL: [MessageKind; 6] = [
        MessageKind::Start,
        MessageKind::GetStatus,
        MessageKind::Status,
        MessageKind::GetResult,
        MessageKind::Result,
        MessageKind::Terminate,
    ];

    pub fn tag(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for MessageKind {
    type Error = StretchError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        MessageKind::ALL
            .into_iter()
            .find(|kind| kind.tag() == tag)
            .ok_or(StretchError::UnknownMessage(tag))
    }
}

/// A request delivered to the controller's dispatch thread.
pub enum ControlMessage {
    Start(KdfParameters),
    GetStatus(Box<dyn ReplyChannel>),
    GetResult(Box<dyn ReplyChannel>),
    Terminate,
}

impl ControlMessage {
    pub fn kind(&self) -> MessageKind {
        match self {
            ControlMessage::Start(_) => MessageKind::Start,
            ControlMessage::GetStatus(_) => MessageKind::GetStatus,
            ControlMessage::GetResult(_) => MessageKind::GetResult,
            ControlMessage::Terminate => MessageKind::Terminate,
        }
    }
}

impl fmt::Debug for ControlMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlMessage::Start(params) => f.debug_tuple("Start").field(params).finish(),
            other => write!(f, "{:?}", other.kind()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_tags_are_distinct() {
        let tags: HashSet<u8> = MessageKind::ALL.iter().map(|kind| kind.tag()).collect();
        assert_eq!(tags.len(), MessageKind::ALL.len());
        assert_ne!(MessageKind::GetResult.tag(), MessageKind::Status.tag());
    }

    #[test]
    fn test_tag_round_trips() {
        for kind in MessageKind::ALL {
            assert_eq!(MessageKind::try_from(kind.tag()).unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_tag_rejected() {
        assert!(matches!(
            MessageKind::try_from(0),
            Err(StretchError::UnknownMessage(0))
        ));
        assert!(MessageKind::try_from(42).is_err());
    }

    #[test]
    fn test_terminate_debug_shows_kind() {
        assert_eq!(format!("{:?}", ControlMessage::Terminate), "Terminate");
    }
}
