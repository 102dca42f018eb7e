//! # 关系解析模块
//!
//! 引用解析（严格 / 自动创建两种策略）、管理员删除保护、自助档案解析、
//! 统计指标，以及导入与批量对账工具

pub mod guard;
pub mod import;
pub mod metrics;
pub mod profile;
pub mod profile_store;
pub mod reference;
pub mod resolver;
pub mod store;
pub mod sync;

pub use guard::{AdminGuardViolation, check_admin_deletion, guard_admin_deletion};
pub use profile::{ProfileKind, ProfileMatcher, ProfileStore, resolve_own_record};
pub use profile_store::{MentorProfiles, ParentProfiles, StudentProfiles};
pub use reference::{RefInput, ReferenceKind, Resolution, classify};
pub use resolver::{
    CreateIfMissingResolve, RefRequest, ReferenceStore, ResolveStrategy, StrictResolve, resolve_all,
};
pub use store::SeaOrmReferenceStore;
