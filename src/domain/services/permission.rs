// src/domain/services/permission.rs
use std::fmt::Debug;

/// Request identifier reserved for the storage-access request of the import flow
pub const REQUEST_STORAGE_WRITE_PERMISSION: i32 = 1;

/// OS-level check-and-request primitive for storage access.
///
/// The answer to `request_permission` arrives later through
/// `PresenterHandle::on_permission_result` with the same request id.
pub trait PermissionGateway: Send + Sync + Debug {
    fn has_storage_write_permission(&self) -> bool;

    /// `false` once the user has denied the capability permanently
    fn can_request_storage_write_permission(&self) -> bool;

    fn request_permission(&self, request_id: i32);
}
