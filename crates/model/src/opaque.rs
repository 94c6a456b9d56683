use std::any::Any;
use std::fmt::{self, Debug, Formatter};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// The provider's own representation of an assistant turn, carried through
/// the conversation without being interpreted by the agent.
///
/// Some providers need the exact assistant message they produced (tool call
/// metadata included) to be echoed back on later requests, otherwise they
/// cannot match tool results to their calls. Rebuilding that message from
/// parsed fields is lossy, so providers wrap their wire value in an
/// `OpaqueMessage` and downcast it again when serializing the history.
///
/// Cloning is cheap. Two opaque messages are equal when their ids are.
#[derive(Clone)]
pub struct OpaqueMessage {
    id: Arc<str>,
    payload: Arc<dyn Any + Send + Sync>,
}

impl OpaqueMessage {
    /// Wraps `payload` under `id`.
    ///
    /// The id should be unique within a conversation.
    #[inline]
    pub fn new<ID, T>(id: ID, payload: T) -> Self
    where
        ID: Into<String>,
        T: Send + Sync + 'static,
    {
        let id: String = id.into();
        Self {
            id: id.into(),
            payload: Arc::new(payload),
        }
    }

    /// Returns the id of this message.
    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the wrapped payload if it has type `T`.
    #[inline]
    pub fn to_raw<T: 'static>(&self) -> Option<&T> {
        self.payload.downcast_ref()
    }
}

impl Debug for OpaqueMessage {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpaqueMessage")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl PartialEq for OpaqueMessage {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for OpaqueMessage {}

impl Hash for OpaqueMessage {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[derive(Debug, PartialEq)]
    struct WireMessage {
        role: &'static str,
        tool_call_ids: Vec<String>,
    }

    #[test]
    fn test_downcast() {
        let opaque = OpaqueMessage::new(
            "chatcmpl-1",
            WireMessage {
                role: "assistant",
                tool_call_ids: vec!["call_1".to_owned()],
            },
        );
        let wire = opaque.to_raw::<WireMessage>().unwrap();
        assert_eq!(wire.role, "assistant");
        assert_eq!(wire.tool_call_ids, ["call_1"]);
        assert!(opaque.to_raw::<String>().is_none());
        assert_eq!(opaque.id(), "chatcmpl-1");
    }

    #[test]
    fn test_identity_by_id() {
        let first = OpaqueMessage::new("msg:0", "Hello".to_owned());
        let second = OpaqueMessage::new("msg:1", "Hello".to_owned());
        let same_id = OpaqueMessage::new("msg:0", 42u32);

        assert_eq!(first, first.clone());
        assert_eq!(first, same_id);
        assert_ne!(first, second);

        let set: HashSet<_> = [first, second, same_id].into_iter().collect();
        assert_eq!(set.len(), 2);
    }
}
