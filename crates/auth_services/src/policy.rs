use uuid::Uuid;

use crate::types::SessionUser;

/// A resource with a single owning user.
pub trait Owned {
    /// Id of the user who created the resource.
    fn owner_id(&self) -> Uuid;
}

/// Outcome of an ownership check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// The subject may mutate the resource
    Allow,
    /// The subject may only read it
    Deny,
}

/// Owners and admins may mutate a resource; everyone else is denied.
pub fn authorize<R: Owned + ?Sized>(subject: &SessionUser, resource: &R) -> Access {
    if subject.is_admin || resource.owner_id() == subject.id {
        Access::Allow
    } else {
        Access::Deny
    }
}
