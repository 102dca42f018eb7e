//! # 服务层公共工具
//!
//! 部分更新补丁、按标识加载、引用摘要联表

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use sea_orm::{
    ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, PrimaryKeyTrait, QueryFilter,
    Set, Value as DbValue,
};
use serde::Serialize;
use serde_json::Value;

use crate::error::{PortalError, Result};
use crate::relations::Resolution;
use crate::types::{check_choice, is_record_id, parse_date};

/// 请求体中的可选字段：外层 `None` 表示缺失，内层 `None` 表示显式 `null`
pub type Patch<T> = Option<Option<T>>;

/// 去除首尾空白，空串视为无值
#[must_use]
pub fn clean_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// 创建时的必填文本
#[must_use]
pub fn required_text(patch: &Patch<String>) -> Option<String> {
    patch.as_ref().and_then(|v| v.as_deref()).and_then(clean_text)
}

/// 可选文本：缺失时不变，`null` 或空白时清空
#[must_use]
pub fn text_patch(patch: &Patch<String>) -> Option<Option<String>> {
    patch.as_ref().map(|v| v.as_deref().and_then(clean_text))
}

/// 同 [`text_patch`]，并转为小写（邮箱）
#[must_use]
pub fn lower_patch(patch: &Patch<String>) -> Option<Option<String>> {
    text_patch(patch).map(|v| v.map(|s| s.to_lowercase()))
}

/// 更新时不可清空的文本
pub fn required_patch(patch: &Patch<String>, field: &'static str) -> Result<Option<String>> {
    match patch {
        None => Ok(None),
        Some(value) => match value.as_deref().and_then(clean_text) {
            Some(text) => Ok(Some(text)),
            None => Err(PortalError::validation_field(
                format!("{field} cannot be empty"),
                field,
            )),
        },
    }
}

/// 日期字段，接受 `YYYY-MM-DD` 或 RFC 3339
pub fn date_patch(patch: &Patch<String>, field: &'static str) -> Result<Option<Option<NaiveDate>>> {
    let Some(text) = text_patch(patch) else {
        return Ok(None);
    };
    match text {
        None => Ok(Some(None)),
        Some(raw) => parse_date(&raw).map(|d| Some(Some(d))).ok_or_else(|| {
            PortalError::validation_field(format!("Invalid {field}: {raw}"), field)
        }),
    }
}

/// 枚举文本，空串等同于清空
pub fn choice_patch(
    patch: &Patch<String>,
    field: &'static str,
    allowed: &[&str],
) -> Result<Option<Option<String>>> {
    let Some(text) = text_patch(patch) else {
        return Ok(None);
    };
    if let Some(value) = text.as_deref() {
        check_choice(field, value, allowed)?;
    }
    Ok(Some(text))
}

/// 有值时写入活动模型
pub fn apply<T: Into<DbValue>>(target: &mut ActiveValue<T>, value: Option<T>) {
    if let Some(value) = value {
        *target = Set(value);
    }
}

/// 写入引用解析结果，`NotProvided` 不改动字段
pub fn apply_ref(target: &mut ActiveValue<Option<String>>, resolution: Resolution) {
    apply(target, resolution.into_patch());
}

/// 按标识加载记录，标识格式不合法时同样视为不存在
pub async fn find_or_404<E>(db: &DatabaseConnection, id: &str, resource: &str) -> Result<E::Model>
where
    E: EntityTrait,
    <E::PrimaryKey as PrimaryKeyTrait>::ValueType: From<String>,
{
    if !is_record_id(id) {
        return Err(PortalError::not_found(resource, id));
    }
    E::find_by_id(id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| PortalError::not_found(resource, id))
}

/// 按标识删除记录，没有删除任何行时返回 404
pub async fn delete_or_404<E>(db: &DatabaseConnection, id: &str, resource: &str) -> Result<()>
where
    E: EntityTrait,
    <E::PrimaryKey as PrimaryKeyTrait>::ValueType: From<String>,
{
    if !is_record_id(id) {
        return Err(PortalError::not_found(resource, id));
    }
    let result = E::delete_by_id(id.to_string()).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(PortalError::not_found(resource, id));
    }
    Ok(())
}

/// 收集非空引用标识
pub fn ids_of<'a>(values: impl IntoIterator<Item = Option<&'a str>>) -> HashSet<String> {
    values
        .into_iter()
        .flatten()
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

/// 批量加载被引用的记录
pub async fn load_map<E, F>(
    db: &DatabaseConnection,
    id_column: E::Column,
    ids: HashSet<String>,
    key: F,
) -> Result<HashMap<String, E::Model>>
where
    E: EntityTrait,
    F: Fn(&E::Model) -> String,
{
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let models = E::find().filter(id_column.is_in(ids)).all(db).await?;
    Ok(models.into_iter().map(|m| (key(&m), m)).collect())
}

/// 从映射中取引用摘要，悬空引用得到 `None`
pub fn summary<M>(
    map: &HashMap<String, M>,
    id: Option<&str>,
    render: impl Fn(&M) -> Value,
) -> Option<Value> {
    id.and_then(|id| map.get(id)).map(render)
}

/// 序列化记录，并用摘要替换引用字段
pub fn populate(record: &impl Serialize, fields: Vec<(&str, Option<Value>)>) -> Result<Value> {
    let mut value = serde_json::to_value(record)?;
    if let Value::Object(object) = &mut value {
        for (key, summary) in fields {
            object.insert(key.to_string(), summary.unwrap_or(Value::Null));
        }
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_patch_states() {
        assert_eq!(text_patch(&None), None);
        assert_eq!(text_patch(&Some(None)), Some(None));
        assert_eq!(text_patch(&Some(Some("  ".into()))), Some(None));
        assert_eq!(text_patch(&Some(Some(" 555 ".into()))), Some(Some("555".into())));
        assert_eq!(lower_patch(&Some(Some("A@B.C".into()))), Some(Some("a@b.c".into())));
    }

    #[test]
    fn test_required_patch_rejects_blank() {
        assert_eq!(required_patch(&None, "name").unwrap(), None);
        let err = required_patch(&Some(Some(" ".into())), "name").unwrap_err();
        assert_eq!(err.field(), Some("name"));
    }

    #[test]
    fn test_date_and_choice_patches() {
        let date = date_patch(&Some(Some("2024-02-29".into())), "dob").unwrap();
        assert_eq!(date, Some(NaiveDate::from_ymd_opt(2024, 2, 29)));
        assert!(date_patch(&Some(Some("yesterday".into())), "dob").is_err());

        assert_eq!(
            choice_patch(&Some(Some(String::new())), "gender", crate::types::GENDERS).unwrap(),
            Some(None)
        );
        assert!(
            choice_patch(&Some(Some("robot".into())), "gender", crate::types::GENDERS).is_err()
        );
    }

    #[test]
    fn test_populate_dangling_reference_is_null() {
        let map: HashMap<String, String> = HashMap::from([("d1".to_string(), "CS".to_string())]);
        let found = summary(&map, Some("d1"), |name| json!({ "name": name }));
        let dangling = summary(&map, Some("gone"), |name| json!({ "name": name }));

        let value = populate(
            &json!({ "name": "Bob", "deptId": "d1", "parentId": "gone" }),
            vec![("deptId", found), ("parentId", dangling)],
        )
        .unwrap();
        assert_eq!(value["deptId"]["name"], "CS");
        assert!(value["parentId"].is_null());
        assert_eq!(value["name"], "Bob");
    }

    #[test]
    fn test_ids_of_skips_empty() {
        let ids = ids_of([Some("a"), None, Some(""), Some("a"), Some("b")]);
        assert_eq!(ids.len(), 2);
    }
}
