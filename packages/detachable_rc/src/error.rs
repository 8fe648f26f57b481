use thiserror::Error;

use crate::ObjectKey;

/// Reasons why an object cannot be attached to an owner.
///
/// Each of these is a usage violation. The attachment is never partially applied: when an error
/// is returned, neither the object nor the proposed owner has been modified.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
#[non_exhaustive]
pub enum AttachError {
    /// The object already has an owner. Detach it first to move it to a different owner.
    #[error("object {object} is already attached to owner {owner}")]
    AlreadyAttached {
        /// The object that was to be attached.
        object: ObjectKey,

        /// The owner the object is currently attached to.
        owner: ObjectKey,
    },

    /// The object was asked to become its own owner.
    #[error("object {object} cannot be its own owner")]
    SelfOwnership {
        /// The object that was to be attached.
        object: ObjectKey,
    },

    /// The proposed owner is already attached, directly or indirectly, to the object. Completing
    /// the attachment would make the chain of owners circular and nothing in it could ever be
    /// released.
    #[error("attaching object {object} to owner {owner} would create an ownership cycle")]
    OwnershipCycle {
        /// The object that was to be attached.
        object: ObjectKey,

        /// The proposed owner.
        owner: ObjectKey,
    },

    /// The proposed owner lives in a different pool than the object.
    #[error("the owner of an object must be in the same pool as the object")]
    ForeignPool,
}

/// A specialized `Result` type for attachment operations, returning the crate's
/// [`AttachError`] type as the error value.
pub(crate) type Result<T> = std::result::Result<T, AttachError>;

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::fmt::Debug;

    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(AttachError: Send, Sync, Debug, Copy);

    #[test]
    fn already_attached_names_both_objects() {
        let error = AttachError::AlreadyAttached {
            object: ObjectKey::new(1, 0),
            owner: ObjectKey::new(2, 5),
        };

        assert_eq!(
            error.to_string(),
            "object #1.0 is already attached to owner #2.5"
        );
    }

    #[test]
    fn cycle_is_error() {
        let error = AttachError::OwnershipCycle {
            object: ObjectKey::new(0, 0),
            owner: ObjectKey::new(1, 0),
        };

        let result: Result<()> = Err(error);
        assert!(result.is_err());
    }
}
