//! Draft versus persisted records.

use serde::{Deserialize, Serialize};

/// Something a form can be editing: either a draft that has never been
/// saved, or an existing record the backend already knows about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum Record<T, D> {
    /// Not yet persisted; has no id.
    Draft(D),
    /// Persisted by the backend.
    Existing(T),
}

impl<T, D> Record<T, D> {
    /// Returns `true` for an unsaved draft.
    #[must_use]
    pub const fn is_draft(&self) -> bool {
        matches!(self, Self::Draft(_))
    }

    /// The persisted record, if any.
    #[must_use]
    pub const fn existing(&self) -> Option<&T> {
        match self {
            Self::Existing(item) => Some(item),
            Self::Draft(_) => None,
        }
    }

    /// The draft, if any.
    #[must_use]
    pub const fn draft(&self) -> Option<&D> {
        match self {
            Self::Draft(draft) => Some(draft),
            Self::Existing(_) => None,
        }
    }
}

/// Entities that carry a backend-assigned id.
pub trait Identified {
    type Id: Copy + Eq + core::fmt::Debug + core::fmt::Display + Send + Sync + 'static;

    fn id(&self) -> Self::Id;
}

impl<T: Identified, D> Record<T, D> {
    /// The backend id; `None` for drafts.
    #[must_use]
    pub fn id(&self) -> Option<T::Id> {
        self.existing().map(Identified::id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Category, CategoryId, NewCategory};

    #[test]
    fn test_draft_has_no_id() {
        let record: Record<Category, NewCategory> = Record::Draft(NewCategory::default());
        assert!(record.is_draft());
        assert_eq!(record.id(), None);
    }

    #[test]
    fn test_existing_exposes_backend_id() {
        let category = Category {
            id: CategoryId::new(3),
            name: "Cat food".to_string(),
            description: None,
            image: None,
        };
        let record: Record<Category, NewCategory> = Record::Existing(category);
        assert!(!record.is_draft());
        assert_eq!(record.id(), Some(CategoryId::new(3)));
    }
}
