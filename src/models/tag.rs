use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 知识点ID
pub type TagId = i64;

/// 知识点层级
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TagLevel {
    First,
    Second,
    Third,
}

impl TagLevel {
    pub fn number(self) -> u8 {
        match self {
            TagLevel::First => 1,
            TagLevel::Second => 2,
            TagLevel::Third => 3,
        }
    }

    /// 下一级（三级没有下一级）
    pub fn child(self) -> Option<TagLevel> {
        match self {
            TagLevel::First => Some(TagLevel::Second),
            TagLevel::Second => Some(TagLevel::Third),
            TagLevel::Third => None,
        }
    }
}

impl TryFrom<u8> for TagLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(TagLevel::First),
            2 => Ok(TagLevel::Second),
            3 => Ok(TagLevel::Third),
            other => Err(format!("无效的知识点层级: {}", other)),
        }
    }
}

impl From<TagLevel> for u8 {
    fn from(level: TagLevel) -> Self {
        level.number()
    }
}

impl fmt::Display for TagLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}级", self.number())
    }
}

/// 知识点标签
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    pub level: TagLevel,
    /// 一级知识点没有父节点
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<TagId>,
}

/// 已选择的知识点路径（0~3 级）
///
/// 用一个枚举表达层级约束：不存在"选了三级却没选二级"的状态。
/// 序列化为有序ID数组，例如 `[12, 34]`。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<TagId>", into = "Vec<TagId>")]
pub enum TagSelection {
    #[default]
    None,
    First(TagId),
    Second(TagId, TagId),
    Third(TagId, TagId, TagId),
}

impl TagSelection {
    /// 当前选择的最深层级
    pub fn depth(&self) -> usize {
        match self {
            TagSelection::None => 0,
            TagSelection::First(..) => 1,
            TagSelection::Second(..) => 2,
            TagSelection::Third(..) => 3,
        }
    }

    pub fn first(&self) -> Option<TagId> {
        self.ids().first().copied()
    }

    pub fn second(&self) -> Option<TagId> {
        self.ids().get(1).copied()
    }

    pub fn third(&self) -> Option<TagId> {
        self.ids().get(2).copied()
    }

    /// 最深一级的知识点
    pub fn deepest(&self) -> Option<TagId> {
        self.ids().last().copied()
    }

    /// 按层级顺序返回已选ID
    pub fn ids(&self) -> Vec<TagId> {
        match *self {
            TagSelection::None => Vec::new(),
            TagSelection::First(a) => vec![a],
            TagSelection::Second(a, b) => vec![a, b],
            TagSelection::Third(a, b, c) => vec![a, b, c],
        }
    }

    /// 在第 `level` 级选择知识点
    ///
    /// 保留更浅层级的选择，清空 `level` 以下的所有选择。
    /// 上一级尚未选择时返回 `TagOutOfOrder`。
    pub fn select(self, level: TagLevel, id: TagId) -> Result<TagSelection, ValidationError> {
        match (level, self) {
            (TagLevel::First, _) => Ok(TagSelection::First(id)),
            (TagLevel::Second, TagSelection::First(a))
            | (TagLevel::Second, TagSelection::Second(a, _))
            | (TagLevel::Second, TagSelection::Third(a, _, _)) => Ok(TagSelection::Second(a, id)),
            (TagLevel::Third, TagSelection::Second(a, b))
            | (TagLevel::Third, TagSelection::Third(a, b, _)) => Ok(TagSelection::Third(a, b, id)),
            (level, _) => Err(ValidationError::TagOutOfOrder {
                level: level.number(),
            }),
        }
    }

    /// 清空 `level` 及以下的选择
    pub fn clear_from(self, level: TagLevel) -> TagSelection {
        let keep = usize::from(level.number() - 1);
        let ids = self.ids();
        TagSelection::try_from(ids[..keep.min(ids.len())].to_vec()).unwrap_or_default()
    }

    /// 题目的知识点路径是否落在当前选择之下
    pub fn matches(&self, question_tags: &TagSelection) -> bool {
        let wanted = self.ids();
        let actual = question_tags.ids();
        wanted.len() <= actual.len() && wanted.iter().zip(actual.iter()).all(|(w, a)| w == a)
    }
}

impl TryFrom<Vec<TagId>> for TagSelection {
    type Error = String;

    fn try_from(ids: Vec<TagId>) -> Result<Self, Self::Error> {
        match ids.as_slice() {
            [] => Ok(TagSelection::None),
            [a] => Ok(TagSelection::First(*a)),
            [a, b] => Ok(TagSelection::Second(*a, *b)),
            [a, b, c] => Ok(TagSelection::Third(*a, *b, *c)),
            _ => Err(format!("知识点路径最多 3 级，实际 {} 级", ids.len())),
        }
    }
}

impl From<TagSelection> for Vec<TagId> {
    fn from(selection: TagSelection) -> Self {
        selection.ids()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selecting_a_level_clears_deeper_levels() {
        let sel = TagSelection::Third(1, 2, 3);
        assert_eq!(sel.select(TagLevel::First, 9), Ok(TagSelection::First(9)));
        assert_eq!(sel.select(TagLevel::Second, 8), Ok(TagSelection::Second(1, 8)));
        assert_eq!(sel.select(TagLevel::Third, 7), Ok(TagSelection::Third(1, 2, 7)));
    }

    #[test]
    fn selecting_without_parent_is_rejected() {
        assert_eq!(
            TagSelection::None.select(TagLevel::Second, 4),
            Err(ValidationError::TagOutOfOrder { level: 2 })
        );
        assert_eq!(
            TagSelection::First(1).select(TagLevel::Third, 4),
            Err(ValidationError::TagOutOfOrder { level: 3 })
        );
    }

    #[test]
    fn clear_from_keeps_shallower_levels() {
        let sel = TagSelection::Third(1, 2, 3);
        assert_eq!(sel.clear_from(TagLevel::Third), TagSelection::Second(1, 2));
        assert_eq!(sel.clear_from(TagLevel::Second), TagSelection::First(1));
        assert_eq!(sel.clear_from(TagLevel::First), TagSelection::None);
        assert_eq!(TagSelection::First(1).clear_from(TagLevel::Third), TagSelection::First(1));
    }

    #[test]
    fn prefix_matching() {
        let q = TagSelection::Third(1, 2, 3);
        assert!(TagSelection::None.matches(&q));
        assert!(TagSelection::Second(1, 2).matches(&q));
        assert!(!TagSelection::Second(1, 5).matches(&q));
        assert!(!TagSelection::Second(1, 2).matches(&TagSelection::First(1)));
    }

    #[test]
    fn serializes_as_id_array() {
        let json = serde_json::to_string(&TagSelection::Second(4, 5)).unwrap();
        assert_eq!(json, "[4,5]");
        let back: TagSelection = serde_json::from_str("[]").unwrap();
        assert_eq!(back, TagSelection::None);
        assert!(serde_json::from_str::<TagSelection>("[1,2,3,4]").is_err());
    }
}
