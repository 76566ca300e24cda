//! Typed ID definitions for all domain entities.

pub use super::id::Id;

/// Marker type for Project entities.
pub struct Project;

/// Marker type for RFI entities.
pub struct Rfi;

/// Marker type for responses posted on an RFI.
pub struct RfiResponse;

/// Marker type for file attachments.
pub struct Attachment;

/// Marker type for application users (mirrors the auth user id).
pub struct User;

/// Marker type for role records.
pub struct RoleRecord;

/// Marker type for client/contractor companies.
pub struct Company;

/// Marker type for timed notices.
pub struct Notice;

pub type ProjectId = Id<Project>;
pub type RfiId = Id<Rfi>;
pub type ResponseId = Id<RfiResponse>;
pub type AttachmentId = Id<Attachment>;
pub type UserId = Id<User>;
pub type RoleId = Id<RoleRecord>;
pub type CompanyId = Id<Company>;
pub type NoticeId = Id<Notice>;
