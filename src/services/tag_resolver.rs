//! 知识点层级解析 - 业务能力层
//!
//! 一级知识点在首次使用时加载；子节点只在展开或选择父节点时按父节点加载，
//! 结果在整个编辑会话内缓存，不会一次性加载整棵树。

use crate::clients::QuestionCatalog;
use crate::error::AppResult;
use crate::models::{Tag, TagId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// 知识点层级解析器（每个编辑会话一个）
pub struct TagResolver<C> {
    catalog: Arc<C>,
    first_level: Option<Vec<Tag>>,
    children: HashMap<TagId, Vec<Tag>>,
}

impl<C: QuestionCatalog> TagResolver<C> {
    pub fn new(catalog: Arc<C>) -> Self {
        Self {
            catalog,
            first_level: None,
            children: HashMap::new(),
        }
    }

    /// 一级知识点
    pub async fn list_first_level(&mut self) -> AppResult<Vec<Tag>> {
        if let Some(tags) = &self.first_level {
            return Ok(tags.clone());
        }
        let tags = self.catalog.list_first_level_tags().await?;
        debug!("加载一级知识点 {} 个", tags.len());
        self.first_level = Some(tags.clone());
        Ok(tags)
    }

    /// 某个知识点的子节点（按父节点缓存）
    pub async fn list_children(&mut self, parent_id: TagId) -> AppResult<Vec<Tag>> {
        if let Some(tags) = self.children.get(&parent_id) {
            return Ok(tags.clone());
        }
        let tags = self.catalog.list_child_tags(parent_id).await?;
        debug!("加载知识点 {} 的子节点 {} 个", parent_id, tags.len());
        self.children.insert(parent_id, tags.clone());
        Ok(tags)
    }

    /// 在已加载的节点中查找
    pub fn find_cached(&self, id: TagId) -> Option<&Tag> {
        self.first_level
            .iter()
            .flatten()
            .chain(self.children.values().flatten())
            .find(|t| t.id == id)
    }

    /// 某个父节点的子节点是否已加载
    pub fn is_loaded(&self, parent_id: TagId) -> bool {
        self.children.contains_key(&parent_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::MemoryCatalog;
    use crate::models::{QuestionBank, TagLevel};

    fn tag(id: TagId, level: TagLevel, parent_id: Option<TagId>) -> Tag {
        Tag {
            id,
            name: format!("知识点{}", id),
            level,
            parent_id,
        }
    }

    fn resolver() -> TagResolver<MemoryCatalog> {
        let bank = QuestionBank {
            tags: vec![
                tag(1, TagLevel::First, None),
                tag(2, TagLevel::First, None),
                tag(10, TagLevel::Second, Some(1)),
                tag(100, TagLevel::Third, Some(10)),
            ],
            questions: Vec::new(),
        };
        TagResolver::new(Arc::new(MemoryCatalog::with_seed(bank, 1)))
    }

    #[tokio::test]
    async fn children_are_loaded_per_parent() {
        let mut tags = resolver();
        assert_eq!(tags.list_first_level().await.unwrap().len(), 2);
        assert!(!tags.is_loaded(1));
        assert!(tags.find_cached(10).is_none());

        let children = tags.list_children(1).await.unwrap();
        assert_eq!(children[0].id, 10);
        assert!(tags.is_loaded(1));
        assert!(!tags.is_loaded(10));
        assert_eq!(tags.find_cached(10).map(|t| t.level), Some(TagLevel::Second));

        assert!(tags.list_children(2).await.unwrap().is_empty());
        assert!(tags.is_loaded(2));
    }
}
