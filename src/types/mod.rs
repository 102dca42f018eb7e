//! # 通用类型
//!
//! 记录标识与日期解析等跨模块使用的小工具

pub mod choices;
pub mod dates;
pub mod record_id;

pub use choices::{ATTENDANCE_STATUSES, GENDERS, SESSION_STATUSES, check_choice, normalize_choice};
pub use dates::{parse_date, parse_datetime};
pub use record_id::{RECORD_ID_LEN, is_record_id, new_record_id};
