use crate::host::Document;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::rc::Rc;

/// Decides which documents get view snapshots.
///
/// Configuration files can only express `Always` or `Never` (as a boolean);
/// a predicate is installed from code.
#[derive(Clone, Default)]
pub enum CapturePolicy {
    Always,
    #[default]
    Never,
    Predicate(Rc<dyn Fn(&Document) -> bool>),
}

impl CapturePolicy {
    pub fn predicate<F>(predicate: F) -> Self
    where
        F: Fn(&Document) -> bool + 'static,
    {
        Self::Predicate(Rc::new(predicate))
    }

    pub fn should_capture(&self, document: &Document) -> bool {
        match self {
            CapturePolicy::Always => true,
            CapturePolicy::Never => false,
            CapturePolicy::Predicate(predicate) => predicate(document),
        }
    }

    pub fn is_never(&self) -> bool {
        matches!(self, CapturePolicy::Never)
    }
}

impl From<bool> for CapturePolicy {
    fn from(enabled: bool) -> Self {
        if enabled {
            CapturePolicy::Always
        } else {
            CapturePolicy::Never
        }
    }
}

impl fmt::Debug for CapturePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapturePolicy::Always => f.write_str("Always"),
            CapturePolicy::Never => f.write_str("Never"),
            CapturePolicy::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl Serialize for CapturePolicy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bool(!self.is_never())
    }
}

impl<'de> Deserialize<'de> for CapturePolicy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        bool::deserialize(deserializer).map(CapturePolicy::from)
    }
}
